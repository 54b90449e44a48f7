//! Job lookup, edits, status and payment lifecycle, and the role-scoped job
//! list.

use crate::error::DocketError;
use chrono::{DateTime, Utc};
use printdesk_access::{Capability, Grant, Role};
use printdesk_store::{
    Branch, Job, JobEdit, JobStatus, JobType, Ledger, LockPolicy, PaymentStatus,
    mutate_ledger_jsonl, read_ledger_jsonl,
};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// How a caller names one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKey {
    Id(u64),
    Docket(String),
}

impl Display for JobKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKey::Id(id) => write!(f, "job {id}"),
            JobKey::Docket(docket) => write!(f, "job with docket {docket}"),
        }
    }
}

/// Optional narrowing applied on top of the role scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub job_type: Option<JobType>,
    pub branch: Option<Branch>,
    pub status: Option<JobStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl JobFilter {
    fn matches(&self, job: &Job) -> bool {
        self.job_type.is_none_or(|wanted| job.job_type == wanted)
            && self.branch.is_none_or(|wanted| job.branch == wanted)
            && self.status.is_none_or(|wanted| job.status == wanted)
            && self
                .payment_status
                .is_none_or(|wanted| job.payment_status == wanted)
    }
}

/// Whether the grant holder's role may see `job` at all.
fn in_scope(grant: &Grant, job: &Job) -> bool {
    match grant.role() {
        Role::Superuser => true,
        Role::SalesRepresentative => job.sales_rep == grant.name(),
        Role::Clerk => job.payment_status == PaymentStatus::NotMarked,
        Role::Designer | Role::Operator => job.status == JobStatus::Pending,
    }
}

pub fn find_job_in(ledger: &Ledger, key: &JobKey) -> Result<Job, DocketError> {
    let job = match key {
        JobKey::Id(id) => ledger.job(*id),
        JobKey::Docket(docket) => ledger.job_by_docket(docket.trim()),
    };
    job.cloned()
        .ok_or_else(|| DocketError::NotFound(key.to_string()))
}

/// Apply `edit` to a job the grant holder may change.
///
/// PRINTED jobs are frozen. Only the job's `order_taken_by` or a SUPERUSER
/// may edit. `total_cost` is recomputed and references are rechecked.
pub fn update_job_in(
    ledger: &mut Ledger,
    grant: &Grant,
    job_id: u64,
    edit: &JobEdit,
    now: DateTime<Utc>,
) -> Result<Job, DocketError> {
    let current = find_job_in(ledger, &JobKey::Id(job_id))?;
    if current.status == JobStatus::Printed {
        return Err(DocketError::ValidationFailed(format!(
            "job {} is PRINTED and can no longer be edited",
            current.docket_number
        )));
    }
    grant.require_owner(&current.order_taken_by, &format!("job {}", current.docket_number))?;
    if edit.is_empty() {
        return Ok(current);
    }

    let edited = edit.applied_to(&current, now)?;
    let job = ledger.replace_job(edited)?.clone();
    tracing::info!(
        docket = %job.docket_number,
        editor = grant.name(),
        total_cost = %job.total_cost,
        "job edited"
    );
    Ok(job)
}

pub fn update_status_in(
    ledger: &mut Ledger,
    job_id: u64,
    status: JobStatus,
    now: DateTime<Utc>,
) -> Result<Job, DocketError> {
    let job = ledger.set_job_status(job_id, status, now)?.clone();
    tracing::info!(docket = %job.docket_number, status = %status, "job status updated");
    Ok(job)
}

/// RECEIPTED and INVOICED require a non-blank reference.
pub fn update_payment_in(
    ledger: &mut Ledger,
    job_id: u64,
    payment_status: PaymentStatus,
    payment_ref: &str,
    now: DateTime<Utc>,
) -> Result<Job, DocketError> {
    let payment_ref = payment_ref.trim();
    if payment_status.requires_reference() && payment_ref.is_empty() {
        return Err(DocketError::ValidationFailed(format!(
            "payment reference is required for {payment_status}"
        )));
    }
    let job = ledger
        .set_job_payment(job_id, payment_status, payment_ref.to_string(), now)?
        .clone();
    tracing::info!(
        docket = %job.docket_number,
        payment_status = %payment_status,
        "job payment updated"
    );
    Ok(job)
}

/// Jobs visible to the grant holder, newest first.
pub fn list_jobs_in(ledger: &Ledger, grant: &Grant, filter: &JobFilter) -> Vec<Job> {
    let mut jobs: Vec<Job> = ledger
        .jobs()
        .filter(|job| in_scope(grant, job) && filter.matches(job))
        .cloned()
        .collect();
    jobs.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.job_id.cmp(&a.job_id))
    });
    jobs
}

/// File-backed job lifecycle operations over one ledger.
#[derive(Debug, Clone)]
pub struct JobBook {
    ledger_path: PathBuf,
    lock: LockPolicy,
}

impl JobBook {
    pub fn new(ledger_path: impl Into<PathBuf>) -> Self {
        Self {
            ledger_path: ledger_path.into(),
            lock: LockPolicy::default(),
        }
    }

    pub fn with_lock_policy(mut self, lock: LockPolicy) -> Self {
        self.lock = lock;
        self
    }

    /// Look one job up by id or docket number. Not role-scoped.
    pub fn get(&self, grant: &Grant, key: &JobKey) -> Result<Job, DocketError> {
        grant.require(Capability::ViewJobs)?;
        let ledger = read_ledger_jsonl(&self.ledger_path)?;
        find_job_in(&ledger, key)
    }

    pub fn update(&self, grant: &Grant, job_id: u64, edit: &JobEdit) -> Result<Job, DocketError> {
        grant.require(Capability::EditJob)?;
        let job = mutate_ledger_jsonl(&self.ledger_path, &self.lock, |ledger| {
            update_job_in(ledger, grant, job_id, edit, Utc::now())
                .map(|job| (job, !edit.is_empty()))
        })?;
        Ok(job)
    }

    pub fn update_status(
        &self,
        grant: &Grant,
        job_id: u64,
        status: JobStatus,
    ) -> Result<Job, DocketError> {
        grant.require(Capability::UpdateJobStatus)?;
        let job = mutate_ledger_jsonl(&self.ledger_path, &self.lock, |ledger| {
            update_status_in(ledger, job_id, status, Utc::now()).map(|job| (job, true))
        })?;
        Ok(job)
    }

    pub fn update_payment(
        &self,
        grant: &Grant,
        job_id: u64,
        payment_status: PaymentStatus,
        payment_ref: &str,
    ) -> Result<Job, DocketError> {
        grant.require(Capability::UpdatePayment)?;
        let job = mutate_ledger_jsonl(&self.ledger_path, &self.lock, |ledger| {
            update_payment_in(ledger, job_id, payment_status, payment_ref, Utc::now())
                .map(|job| (job, true))
        })?;
        Ok(job)
    }

    pub fn list(&self, grant: &Grant, filter: &JobFilter) -> Result<Vec<Job>, DocketError> {
        grant.require(Capability::ViewJobs)?;
        let ledger = read_ledger_jsonl(&self.ledger_path)?;
        Ok(list_jobs_in(&ledger, grant, filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use printdesk_access::{Principal, authorize};
    use printdesk_store::{JobDraft, Money};
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_ledger_path(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let root = std::env::temp_dir().join(format!(
            "printdesk-lifecycle-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&root).expect("temp dir should be created");
        root.join("ledger.jsonl")
    }

    fn add_job(ledger: &mut Ledger, docket: &str, sales_rep: &str, age_minutes: i64) -> u64 {
        let mut draft = JobDraft::new(
            JobType::Local,
            Branch::Avondale,
            "Acme Ltd",
            1,
            10,
            Money::from_cents(1000),
        );
        draft.sales_rep = sales_rep.to_string();
        draft.order_taken_by = sales_rep.to_string();
        let created = Utc::now() - Duration::minutes(age_minutes);
        let job = draft
            .into_job(ledger.next_job_id(), docket.to_string(), created)
            .expect("job should build");
        ledger.insert_job(job).expect("job should insert").job_id
    }

    fn shop() -> Ledger {
        let mut ledger = Ledger::default();
        ledger
            .add_product_type("Flyers", "")
            .expect("product type should add");
        add_job(&mut ledger, "LOC-001", "John", 30);
        add_job(&mut ledger, "LOC-002", "Jane", 20);
        add_job(&mut ledger, "LOC-003", "John", 10);
        ledger
    }

    fn grant(name: &str, role: Role, capability: Capability) -> Grant {
        authorize(&Principal::new(name, role), capability).expect("role should be allowed")
    }

    fn dockets(jobs: &[Job]) -> Vec<&str> {
        jobs.iter().map(|job| job.docket_number.as_str()).collect()
    }

    #[test]
    fn payment_reference_required_for_receipted_and_invoiced() {
        let mut ledger = shop();
        for status in [PaymentStatus::Receipted, PaymentStatus::Invoiced] {
            let err = update_payment_in(&mut ledger, 1, status, "  ", Utc::now())
                .expect_err("blank reference must be rejected");
            assert!(matches!(err, DocketError::ValidationFailed(_)));
        }

        let job = update_payment_in(&mut ledger, 1, PaymentStatus::Receipted, " RC-88 ", Utc::now())
            .expect("payment should update");
        assert_eq!(job.payment_ref, "RC-88");
        assert_eq!(job.payment_status, PaymentStatus::Receipted);
    }

    #[test]
    fn unknown_job_is_not_found() {
        let mut ledger = shop();
        match update_status_in(&mut ledger, 99, JobStatus::Printed, Utc::now()) {
            Err(DocketError::NotFound(message)) => assert!(message.contains("99")),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn list_is_role_scoped_and_newest_first() {
        let mut ledger = shop();
        update_status_in(&mut ledger, 2, JobStatus::Printed, Utc::now())
            .expect("status should update");
        update_payment_in(&mut ledger, 3, PaymentStatus::Invoiced, "INV-1", Utc::now())
            .expect("payment should update");
        let all = JobFilter::default();

        let admin = grant("admin", Role::Superuser, Capability::ViewJobs);
        assert_eq!(
            dockets(&list_jobs_in(&ledger, &admin, &all)),
            vec!["LOC-003", "LOC-002", "LOC-001"]
        );

        let john = grant("John", Role::SalesRepresentative, Capability::ViewJobs);
        assert_eq!(
            dockets(&list_jobs_in(&ledger, &john, &all)),
            vec!["LOC-003", "LOC-001"]
        );

        let clerk = grant("Sarah", Role::Clerk, Capability::ViewJobs);
        assert_eq!(
            dockets(&list_jobs_in(&ledger, &clerk, &all)),
            vec!["LOC-002", "LOC-001"]
        );

        let operator = grant("Mike", Role::Operator, Capability::ViewJobs);
        assert_eq!(
            dockets(&list_jobs_in(&ledger, &operator, &all)),
            vec!["LOC-003", "LOC-001"]
        );
    }

    #[test]
    fn filter_narrows_within_scope() {
        let ledger = shop();
        let admin = grant("admin", Role::Superuser, Capability::ViewJobs);
        let filter = JobFilter {
            job_type: Some(JobType::Foreign),
            ..JobFilter::default()
        };
        assert!(list_jobs_in(&ledger, &admin, &filter).is_empty());
    }

    #[test]
    fn jobs_are_found_by_id_or_docket() {
        let ledger = shop();
        let by_id = find_job_in(&ledger, &JobKey::Id(2)).expect("job 2 should exist");
        assert_eq!(by_id.docket_number, "LOC-002");
        let by_docket = find_job_in(&ledger, &JobKey::Docket(" LOC-003 ".to_string()))
            .expect("LOC-003 should exist");
        assert_eq!(by_docket.job_id, 3);
        match find_job_in(&ledger, &JobKey::Docket("FX-9".to_string())) {
            Err(DocketError::NotFound(message)) => assert!(message.contains("FX-9")),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn edit_recomputes_total_cost_for_the_creator() {
        let mut ledger = shop();
        let john = grant("John", Role::SalesRepresentative, Capability::EditJob);
        let edit = JobEdit {
            quantity: Some(20),
            print_cost: Some(Money::from_cents(2000)),
            design_cost: Some(Money::from_cents(350)),
            ..JobEdit::default()
        };
        let job = update_job_in(&mut ledger, &john, 1, &edit, Utc::now())
            .expect("creator should edit");
        assert_eq!(job.quantity, 20);
        assert_eq!(job.total_cost, Money::from_cents(2350));
        assert_eq!(job.docket_number, "LOC-001");
        assert_eq!(ledger.job(1).map(|job| job.total_cost), Some(Money::from_cents(2350)));
    }

    #[test]
    fn edit_by_someone_else_is_forbidden_unless_superuser() {
        let mut ledger = shop();
        let edit = JobEdit {
            customer: Some("Beta Corp".to_string()),
            ..JobEdit::default()
        };

        let jane = grant("Jane", Role::Designer, Capability::EditJob);
        let err = update_job_in(&mut ledger, &jane, 1, &edit, Utc::now())
            .expect_err("non-creator must not edit");
        assert!(matches!(err, DocketError::Forbidden(_)));
        assert_eq!(ledger.job(1).map(|job| job.customer.as_str()), Some("Acme Ltd"));

        let admin = grant("admin", Role::Superuser, Capability::EditJob);
        let job = update_job_in(&mut ledger, &admin, 1, &edit, Utc::now())
            .expect("superuser may edit any job");
        assert_eq!(job.customer, "Beta Corp");
    }

    #[test]
    fn printed_jobs_cannot_be_edited() {
        let mut ledger = shop();
        update_status_in(&mut ledger, 3, JobStatus::Printed, Utc::now())
            .expect("status should update");
        let admin = grant("admin", Role::Superuser, Capability::EditJob);
        let edit = JobEdit {
            quantity: Some(99),
            ..JobEdit::default()
        };
        match update_job_in(&mut ledger, &admin, 3, &edit, Utc::now()) {
            Err(DocketError::ValidationFailed(message)) => assert!(message.contains("PRINTED")),
            other => panic!("expected printed job to be frozen, got {other:?}"),
        }
        assert_eq!(ledger.job(3).map(|job| job.quantity), Some(10));
    }

    #[test]
    fn edit_rechecks_catalog_references() {
        let mut ledger = shop();
        let john = grant("John", Role::SalesRepresentative, Capability::EditJob);
        let edit = JobEdit {
            product_type_id: Some(77),
            ..JobEdit::default()
        };
        let err = update_job_in(&mut ledger, &john, 1, &edit, Utc::now())
            .expect_err("unknown product type must be rejected");
        assert!(matches!(err, DocketError::ValidationFailed(message) if message.contains("77")));
    }

    #[test]
    fn job_book_edit_persists_and_needs_edit_capability() {
        let path = temp_ledger_path("edit");
        shop().save_jsonl(&path).expect("ledger should save");
        let book = JobBook::new(&path);
        let edit = JobEdit {
            notes: Some("Deliver Friday".to_string()),
            ..JobEdit::default()
        };

        let viewer = grant("John", Role::SalesRepresentative, Capability::ViewJobs);
        assert!(matches!(
            book.update(&viewer, 1, &edit),
            Err(DocketError::Forbidden(_))
        ));

        let john = grant("John", Role::SalesRepresentative, Capability::EditJob);
        book.update(&john, 1, &edit).expect("edit should persist");
        let job = book
            .get(&viewer, &JobKey::Docket("LOC-001".to_string()))
            .expect("job should load");
        assert_eq!(job.notes, "Deliver Friday");
    }

    #[test]
    fn job_book_enforces_capabilities_and_persists() {
        let path = temp_ledger_path("book");
        shop().save_jsonl(&path).expect("ledger should save");
        let book = JobBook::new(&path);

        let clerk_payment = grant("Sarah", Role::Clerk, Capability::UpdatePayment);
        let err = book
            .update_status(&clerk_payment, 1, JobStatus::Printed)
            .expect_err("payment grant must not update status");
        assert!(matches!(err, DocketError::Forbidden(_)));

        let job = book
            .update_payment(&clerk_payment, 1, PaymentStatus::Receipted, "RC-1")
            .expect("payment should update");
        assert_eq!(job.payment_status, PaymentStatus::Receipted);

        let operator = grant("Mike", Role::Operator, Capability::UpdateJobStatus);
        book.update_status(&operator, 1, JobStatus::Printed)
            .expect("status should update");

        let reloaded = read_ledger_jsonl(&path).expect("ledger should reload");
        let job = reloaded.job(1).expect("job should exist");
        assert_eq!(job.status, JobStatus::Printed);
        assert_eq!(job.payment_ref, "RC-1");
    }
}
