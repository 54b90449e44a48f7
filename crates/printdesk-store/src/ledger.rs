//! Canonical in-memory representation of ledger state.
//!
//! This is the persistence boundary for `printdesk-store`:
//! - load/save JSONL
//! - enforce store-level constraints (unique docket numbers, unique
//!   sheet dimensions, unique names, referential integrity on job insert)
//! - expose deterministic queries in id order

use crate::catalog::{
    PaperSize, PaperType, PaperWeight, ProductType, ProductTypeSpecification, SizeSeries,
    dimension_key,
};
use crate::counter::DocketCounter;
use crate::job::{Job, JobStatus, JobType, PaymentStatus};
use crate::jsonl::{JsonlError, Record, read_records_from_path, write_records_to_path};
use crate::units::Millimeters;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Errors raised while loading or mutating the ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Jsonl(#[from] JsonlError),

    #[error("docket number already in use: {0}")]
    DuplicateDocket(String),

    #[error("paper size {width_mm}x{height_mm}mm already exists as {existing}")]
    DuplicateSize {
        width_mm: Millimeters,
        height_mm: Millimeters,
        existing: String,
    },

    #[error("{kind} already exists: {value}")]
    DuplicateName { kind: &'static str, value: String },

    #[error("{kind} name is required")]
    EmptyName { kind: &'static str },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: u64 },

    #[error("{kind} {id} referenced by {referrer} does not exist")]
    MissingReference {
        kind: &'static str,
        id: u64,
        referrer: String,
    },
}

impl LedgerError {
    fn not_found(kind: &'static str, id: u64) -> Self {
        Self::NotFound { kind, id }
    }

    fn missing(kind: &'static str, id: u64, referrer: impl Into<String>) -> Self {
        Self::MissingReference {
            kind,
            id,
            referrer: referrer.into(),
        }
    }
}

/// Canonical in-memory state for jobs, docket counters and the paper catalog.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    counters: BTreeMap<JobType, DocketCounter>,
    product_types: BTreeMap<u64, ProductType>,
    paper_types: BTreeMap<u64, PaperType>,
    paper_weights: BTreeMap<u64, PaperWeight>,
    paper_sizes: BTreeMap<u64, PaperSize>,
    specifications: BTreeMap<u64, ProductTypeSpecification>,
    jobs: BTreeMap<u64, Job>,
    dockets: BTreeMap<String, u64>,
}

impl Ledger {
    /// Build a ledger from persisted records.
    ///
    /// Rows sharing a primary key resolve with last-write-wins semantics.
    /// Unique constraints (docket numbers, sheet dimensions) are then
    /// checked across the surviving rows.
    pub fn from_records(records: Vec<Record>) -> Result<Self, LedgerError> {
        let mut ledger = Self::default();
        for record in records {
            match record {
                Record::Counter(counter) => {
                    ledger.counters.insert(counter.job_type, counter);
                }
                Record::ProductType(item) => {
                    ledger.product_types.insert(item.id, item);
                }
                Record::PaperType(item) => {
                    ledger.paper_types.insert(item.id, item);
                }
                Record::PaperWeight(item) => {
                    ledger.paper_weights.insert(item.id, item);
                }
                Record::PaperSize(item) => {
                    ledger.paper_sizes.insert(item.id, item);
                }
                Record::Specification(item) => {
                    ledger.specifications.insert(item.product_type_id, item);
                }
                Record::Job(job) => {
                    ledger.jobs.insert(job.job_id, job);
                }
            }
        }

        for job in ledger.jobs.values() {
            if ledger
                .dockets
                .insert(job.docket_number.clone(), job.job_id)
                .is_some()
            {
                return Err(LedgerError::DuplicateDocket(job.docket_number.clone()));
            }
        }

        let mut seen: BTreeMap<(Millimeters, Millimeters), &str> = BTreeMap::new();
        for size in ledger.paper_sizes.values() {
            if let Some(existing) = seen.insert(size.dimension_key(), size.name.as_str()) {
                return Err(LedgerError::DuplicateSize {
                    width_mm: size.width_mm,
                    height_mm: size.height_mm,
                    existing: existing.to_string(),
                });
            }
        }

        Ok(ledger)
    }

    /// Load ledger state from a JSONL file.
    pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let records = read_records_from_path(path)?;
        Self::from_records(records)
    }

    /// Persist ledger state to a JSONL file.
    pub fn save_jsonl(&self, path: impl AsRef<Path>) -> Result<(), LedgerError> {
        write_records_to_path(path, &self.records())?;
        Ok(())
    }

    /// All rows in deterministic save order: counters, catalog, jobs.
    pub fn records(&self) -> Vec<Record> {
        let mut records = Vec::new();
        records.extend(self.counters.values().cloned().map(Record::Counter));
        records.extend(self.product_types.values().cloned().map(Record::ProductType));
        records.extend(self.paper_types.values().cloned().map(Record::PaperType));
        records.extend(self.paper_weights.values().cloned().map(Record::PaperWeight));
        records.extend(self.paper_sizes.values().cloned().map(Record::PaperSize));
        records.extend(
            self.specifications
                .values()
                .cloned()
                .map(Record::Specification),
        );
        records.extend(self.jobs.values().cloned().map(Record::Job));
        records
    }

    // ── Docket counters ──

    pub fn counter(&self, job_type: JobType) -> Option<&DocketCounter> {
        self.counters.get(&job_type)
    }

    /// Current counter value, treating an absent row as 0.
    pub fn current_number(&self, job_type: JobType) -> u64 {
        self.counter(job_type)
            .map(|counter| counter.current_number)
            .unwrap_or(0)
    }

    /// Create the counter row at 0 if absent. Returns whether it was created.
    pub fn ensure_counter(&mut self, job_type: JobType, now: DateTime<Utc>) -> bool {
        if self.counters.contains_key(&job_type) {
            return false;
        }
        self.counters
            .insert(job_type, DocketCounter::new(job_type, now));
        true
    }

    /// Move the counter forward to `value`.
    ///
    /// Never moves backward: returns `false` without changing anything when
    /// `value` is not greater than the stored number.
    pub fn advance_counter(&mut self, job_type: JobType, value: u64, now: DateTime<Utc>) -> bool {
        self.ensure_counter(job_type, now);
        let Some(counter) = self.counters.get_mut(&job_type) else {
            return false;
        };
        if value <= counter.current_number {
            return false;
        }
        counter.current_number = value;
        counter.updated_at = now;
        true
    }

    // ── Jobs ──

    pub fn job(&self, job_id: u64) -> Option<&Job> {
        self.jobs.get(&job_id)
    }

    pub fn job_by_docket(&self, docket_number: &str) -> Option<&Job> {
        self.dockets
            .get(docket_number)
            .and_then(|job_id| self.jobs.get(job_id))
    }

    pub fn docket_in_use(&self, docket_number: &str) -> bool {
        self.dockets.contains_key(docket_number)
    }

    /// Iterate all jobs in ascending job id order.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn next_job_id(&self) -> u64 {
        next_id(&self.jobs)
    }

    /// Insert a new job row.
    ///
    /// Enforces docket uniqueness and that every referenced catalog row
    /// exists. Nothing is changed when an error is returned.
    pub fn insert_job(&mut self, job: Job) -> Result<&Job, LedgerError> {
        if self.docket_in_use(&job.docket_number) {
            return Err(LedgerError::DuplicateDocket(job.docket_number));
        }
        if self.jobs.contains_key(&job.job_id) {
            return Err(LedgerError::DuplicateName {
                kind: "job id",
                value: job.job_id.to_string(),
            });
        }

        self.check_job_references(&job)?;

        let job_id = job.job_id;
        self.dockets.insert(job.docket_number.clone(), job_id);
        Ok(self.jobs.entry(job_id).or_insert(job))
    }

    /// Overwrite a stored job with an edited copy.
    ///
    /// Docket number, job type and creation time are kept from the stored
    /// row. References are checked as on insert.
    pub fn replace_job(&mut self, mut job: Job) -> Result<&Job, LedgerError> {
        let stored = self
            .jobs
            .get(&job.job_id)
            .ok_or_else(|| LedgerError::not_found("job", job.job_id))?;
        job.docket_number = stored.docket_number.clone();
        job.job_type = stored.job_type;
        job.created_at = stored.created_at;
        self.check_job_references(&job)?;

        let slot = self
            .jobs
            .get_mut(&job.job_id)
            .ok_or_else(|| LedgerError::not_found("job", job.job_id))?;
        *slot = job;
        Ok(slot)
    }

    fn check_job_references(&self, job: &Job) -> Result<(), LedgerError> {
        let referrer = format!("job {}", job.docket_number);
        if !self.product_types.contains_key(&job.product_type_id) {
            return Err(LedgerError::missing(
                "product type",
                job.product_type_id,
                referrer,
            ));
        }
        if let Some(id) = job.paper_type_id
            && !self.paper_types.contains_key(&id)
        {
            return Err(LedgerError::missing("paper type", id, referrer));
        }
        if let Some(id) = job.paper_weight_id
            && !self.paper_weights.contains_key(&id)
        {
            return Err(LedgerError::missing("paper weight", id, referrer));
        }
        if let Some(id) = job.paper_size_id
            && !self.paper_sizes.contains_key(&id)
        {
            return Err(LedgerError::missing("paper size", id, referrer));
        }
        Ok(())
    }

    pub fn set_job_status(
        &mut self,
        job_id: u64,
        status: JobStatus,
        now: DateTime<Utc>,
    ) -> Result<&Job, LedgerError> {
        let job = self
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| LedgerError::not_found("job", job_id))?;
        job.set_status(status, now);
        Ok(job)
    }

    pub fn set_job_payment(
        &mut self,
        job_id: u64,
        payment_status: PaymentStatus,
        payment_ref: String,
        now: DateTime<Utc>,
    ) -> Result<&Job, LedgerError> {
        let job = self
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| LedgerError::not_found("job", job_id))?;
        job.set_payment(payment_status, payment_ref, now);
        Ok(job)
    }

    // ── Catalog reads ──

    pub fn product_type(&self, id: u64) -> Option<&ProductType> {
        self.product_types.get(&id)
    }

    pub fn paper_type(&self, id: u64) -> Option<&PaperType> {
        self.paper_types.get(&id)
    }

    pub fn paper_weight(&self, id: u64) -> Option<&PaperWeight> {
        self.paper_weights.get(&id)
    }

    pub fn paper_size(&self, id: u64) -> Option<&PaperSize> {
        self.paper_sizes.get(&id)
    }

    pub fn specification(&self, product_type_id: u64) -> Option<&ProductTypeSpecification> {
        self.specifications.get(&product_type_id)
    }

    pub fn product_types(&self) -> impl Iterator<Item = &ProductType> {
        self.product_types.values()
    }

    pub fn paper_types(&self) -> impl Iterator<Item = &PaperType> {
        self.paper_types.values()
    }

    pub fn paper_weights(&self) -> impl Iterator<Item = &PaperWeight> {
        self.paper_weights.values()
    }

    pub fn paper_sizes(&self) -> impl Iterator<Item = &PaperSize> {
        self.paper_sizes.values()
    }

    /// Find a sheet by its dimensions in either orientation.
    pub fn find_size_by_dimensions(
        &self,
        width_mm: Millimeters,
        height_mm: Millimeters,
    ) -> Option<&PaperSize> {
        let key = dimension_key(width_mm, height_mm);
        self.paper_sizes
            .values()
            .find(|size| size.dimension_key() == key)
    }

    // ── Catalog writes ──

    pub fn add_product_type(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<&ProductType, LedgerError> {
        let name = required_name("product type", name)?;
        if self
            .product_types
            .values()
            .any(|item| item.name.eq_ignore_ascii_case(&name))
        {
            return Err(LedgerError::DuplicateName {
                kind: "product type",
                value: name,
            });
        }
        let id = next_id(&self.product_types);
        Ok(self.product_types.entry(id).or_insert(ProductType {
            id,
            name,
            description: description.trim().to_string(),
        }))
    }

    pub fn add_paper_type(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<&PaperType, LedgerError> {
        let name = required_name("paper type", name)?;
        if self
            .paper_types
            .values()
            .any(|item| item.name.eq_ignore_ascii_case(&name))
        {
            return Err(LedgerError::DuplicateName {
                kind: "paper type",
                value: name,
            });
        }
        let id = next_id(&self.paper_types);
        Ok(self.paper_types.entry(id).or_insert(PaperType {
            id,
            name,
            description: description.trim().to_string(),
        }))
    }

    /// Add a weight and its compatibility edges to existing paper types.
    pub fn add_paper_weight(
        &mut self,
        gsm: u32,
        paper_type_ids: &[u64],
    ) -> Result<&PaperWeight, LedgerError> {
        if self.paper_weights.values().any(|item| item.gsm == gsm) {
            return Err(LedgerError::DuplicateName {
                kind: "paper weight",
                value: format!("{gsm} GSM"),
            });
        }
        let referrer = format!("paper weight {gsm} GSM");
        for id in paper_type_ids {
            if !self.paper_types.contains_key(id) {
                return Err(LedgerError::missing("paper type", *id, referrer));
            }
        }
        let id = next_id(&self.paper_weights);
        Ok(self.paper_weights.entry(id).or_insert(PaperWeight {
            id,
            gsm,
            paper_type_ids: paper_type_ids.iter().copied().collect(),
        }))
    }

    /// Add a sheet size with compatibility edges to existing weights.
    ///
    /// Rejects a size whose dimensions match an existing row in either
    /// orientation.
    pub fn add_paper_size(
        &mut self,
        name: &str,
        series: SizeSeries,
        width_mm: Millimeters,
        height_mm: Millimeters,
        paper_weight_ids: &[u64],
    ) -> Result<&PaperSize, LedgerError> {
        let name = required_name("paper size", name)?;
        if let Some(existing) = self.find_size_by_dimensions(width_mm, height_mm) {
            return Err(LedgerError::DuplicateSize {
                width_mm,
                height_mm,
                existing: existing.name.clone(),
            });
        }
        let referrer = format!("paper size {name}");
        for id in paper_weight_ids {
            if !self.paper_weights.contains_key(id) {
                return Err(LedgerError::missing("paper weight", *id, referrer));
            }
        }
        let id = next_id(&self.paper_sizes);
        Ok(self.paper_sizes.entry(id).or_insert(PaperSize {
            id,
            name,
            series,
            width_mm,
            height_mm,
            paper_weight_ids: paper_weight_ids.iter().copied().collect(),
        }))
    }

    /// Rename / reclassify an existing size. Returns whether anything changed.
    pub fn relabel_paper_size(
        &mut self,
        size_id: u64,
        name: &str,
        series: SizeSeries,
    ) -> Result<bool, LedgerError> {
        let size = self
            .paper_sizes
            .get_mut(&size_id)
            .ok_or_else(|| LedgerError::not_found("paper size", size_id))?;
        if size.name == name && size.series == series {
            return Ok(false);
        }
        size.name = name.to_string();
        size.series = series;
        Ok(true)
    }

    /// Add the weight ↔ paper type edge. Returns whether the edge is new.
    pub fn link_weight_to_paper_type(
        &mut self,
        weight_id: u64,
        paper_type_id: u64,
    ) -> Result<bool, LedgerError> {
        if !self.paper_types.contains_key(&paper_type_id) {
            return Err(LedgerError::not_found("paper type", paper_type_id));
        }
        let weight = self
            .paper_weights
            .get_mut(&weight_id)
            .ok_or_else(|| LedgerError::not_found("paper weight", weight_id))?;
        Ok(weight.paper_type_ids.insert(paper_type_id))
    }

    /// Add the size ↔ weight edge. Returns whether the edge is new.
    pub fn link_size_to_weight(
        &mut self,
        size_id: u64,
        weight_id: u64,
    ) -> Result<bool, LedgerError> {
        if !self.paper_weights.contains_key(&weight_id) {
            return Err(LedgerError::not_found("paper weight", weight_id));
        }
        let size = self
            .paper_sizes
            .get_mut(&size_id)
            .ok_or_else(|| LedgerError::not_found("paper size", size_id))?;
        Ok(size.paper_weight_ids.insert(weight_id))
    }

    /// Replace the specification override for a product type.
    pub fn set_specification(
        &mut self,
        spec: ProductTypeSpecification,
    ) -> Result<&ProductTypeSpecification, LedgerError> {
        if !self.product_types.contains_key(&spec.product_type_id) {
            return Err(LedgerError::not_found(
                "product type",
                spec.product_type_id,
            ));
        }
        let referrer = format!("specification for product type {}", spec.product_type_id);
        check_references("paper type", &spec.paper_type_ids, &self.paper_types, &referrer)?;
        check_references(
            "paper weight",
            &spec.paper_weight_ids,
            &self.paper_weights,
            &referrer,
        )?;
        check_references("paper size", &spec.paper_size_ids, &self.paper_sizes, &referrer)?;

        let product_type_id = spec.product_type_id;
        self.specifications.insert(product_type_id, spec);
        self.specifications
            .get(&product_type_id)
            .ok_or_else(|| LedgerError::not_found("specification", product_type_id))
    }
}

fn next_id<T>(rows: &BTreeMap<u64, T>) -> u64 {
    rows.keys().next_back().map(|id| id + 1).unwrap_or(1)
}

fn required_name(kind: &'static str, raw: &str) -> Result<String, LedgerError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(LedgerError::EmptyName { kind });
    }
    Ok(name.to_string())
}

fn check_references<T>(
    kind: &'static str,
    ids: &BTreeSet<u64>,
    rows: &BTreeMap<u64, T>,
    referrer: &str,
) -> Result<(), LedgerError> {
    match ids.iter().find(|id| !rows.contains_key(id)) {
        Some(id) => Err(LedgerError::missing(kind, *id, referrer)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Branch, JobDraft};
    use crate::units::Money;

    fn catalog() -> Ledger {
        let mut ledger = Ledger::default();
        ledger
            .add_product_type("Flyers", "")
            .expect("product type should add");
        ledger
            .add_paper_type("Gloss", "")
            .expect("paper type should add");
        ledger
            .add_paper_weight(130, &[1])
            .expect("weight should add");
        ledger
    }

    fn job(ledger: &Ledger, docket: &str) -> Job {
        JobDraft::new(
            JobType::Local,
            Branch::Eastlea,
            "Acme",
            1,
            10,
            Money::from_cents(500),
        )
        .into_job(ledger.next_job_id(), docket.to_string(), Utc::now())
        .expect("job should build")
    }

    #[test]
    fn insert_job_rejects_duplicate_docket() {
        let mut ledger = catalog();
        let first = job(&ledger, "LOC-001");
        ledger.insert_job(first).expect("first insert should succeed");

        let second = job(&ledger, "LOC-001");
        let err = ledger
            .insert_job(second)
            .expect_err("duplicate docket must error");
        assert!(matches!(err, LedgerError::DuplicateDocket(d) if d == "LOC-001"));
        assert_eq!(ledger.jobs().count(), 1);
    }

    #[test]
    fn insert_job_requires_existing_references() {
        let mut ledger = catalog();
        let mut orphan = job(&ledger, "LOC-001");
        orphan.product_type_id = 99;
        let err = ledger.insert_job(orphan).expect_err("missing product type");
        assert!(matches!(
            err,
            LedgerError::MissingReference { kind: "product type", id: 99, .. }
        ));
        assert!(!ledger.docket_in_use("LOC-001"));
    }

    #[test]
    fn replace_job_keeps_identity_and_checks_references() {
        let mut ledger = catalog();
        let original = job(&ledger, "LOC-001");
        ledger.insert_job(original.clone()).expect("insert should succeed");

        let mut edited = original.clone();
        edited.docket_number = "LOC-999".to_string();
        edited.job_type = JobType::Foreign;
        edited.quantity = 25;
        let stored = ledger.replace_job(edited).expect("replace should succeed");
        assert_eq!(stored.docket_number, "LOC-001");
        assert_eq!(stored.job_type, JobType::Local);
        assert_eq!(stored.quantity, 25);
        assert!(!ledger.docket_in_use("LOC-999"));

        let mut dangling = original.clone();
        dangling.paper_weight_id = Some(42);
        let err = ledger
            .replace_job(dangling)
            .expect_err("missing weight must error");
        assert!(matches!(
            err,
            LedgerError::MissingReference { kind: "paper weight", id: 42, .. }
        ));
        assert_eq!(ledger.job(1).map(|job| job.quantity), Some(25));

        let mut ghost = original;
        ghost.job_id = 7;
        assert!(matches!(
            ledger.replace_job(ghost),
            Err(LedgerError::NotFound { kind: "job", id: 7 })
        ));
    }

    #[test]
    fn advance_counter_never_moves_backward() {
        let mut ledger = Ledger::default();
        let now = Utc::now();
        assert!(ledger.advance_counter(JobType::Local, 5, now));
        assert!(!ledger.advance_counter(JobType::Local, 3, now));
        assert!(!ledger.advance_counter(JobType::Local, 5, now));
        assert_eq!(ledger.current_number(JobType::Local), 5);
        assert_eq!(ledger.current_number(JobType::Foreign), 0);
    }

    #[test]
    fn add_paper_size_rejects_rotated_duplicate() {
        let mut ledger = catalog();
        ledger
            .add_paper_size(
                "Strip",
                SizeSeries::Other,
                Millimeters::whole(100),
                Millimeters::whole(50),
                &[1],
            )
            .expect("first size should add");
        let err = ledger
            .add_paper_size(
                "Strip rotated",
                SizeSeries::Other,
                Millimeters::whole(50),
                Millimeters::whole(100),
                &[],
            )
            .expect_err("rotated duplicate must error");
        assert!(matches!(err, LedgerError::DuplicateSize { existing, .. } if existing == "Strip"));
    }

    #[test]
    fn from_records_rejects_duplicate_dockets_across_rows() {
        let ledger = catalog();
        let first = job(&ledger, "LOC-007");
        let mut second = first.clone();
        second.job_id = first.job_id + 1;

        let mut records = ledger.records();
        records.push(Record::Job(first));
        records.push(Record::Job(second));
        let err = Ledger::from_records(records).expect_err("duplicate docket must error");
        assert!(matches!(err, LedgerError::DuplicateDocket(d) if d == "LOC-007"));
    }

    #[test]
    fn duplicate_ids_use_last_write_wins() {
        let records = vec![
            Record::PaperType(PaperType {
                id: 1,
                name: "Bond".to_string(),
                description: String::new(),
            }),
            Record::PaperType(PaperType {
                id: 1,
                name: "Matt".to_string(),
                description: String::new(),
            }),
        ];
        let ledger = Ledger::from_records(records).expect("ledger should build");
        assert_eq!(
            ledger.paper_type(1).expect("paper type should exist").name,
            "Matt"
        );
    }

    #[test]
    fn set_specification_checks_allow_list_references() {
        let mut ledger = catalog();
        let spec = ProductTypeSpecification {
            product_type_id: 1,
            paper_type_ids: BTreeSet::from([1]),
            paper_weight_ids: BTreeSet::from([1, 2]),
            paper_size_ids: BTreeSet::new(),
        };
        let err = ledger
            .set_specification(spec)
            .expect_err("unknown weight must error");
        assert!(matches!(
            err,
            LedgerError::MissingReference { kind: "paper weight", id: 2, .. }
        ));
        assert!(ledger.specification(1).is_none());
    }
}
