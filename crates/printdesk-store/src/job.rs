//! Job order: the primary record of the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::units::Money;

labelled_enum! {
    /// Job-type namespace: selects the docket allocation strategy.
    pub enum JobType ("job type") {
        Local => "LOCAL",
        Foreign => "FOREIGN",
    }
}

labelled_enum! {
    pub enum Branch ("branch") {
        Borrowdale => "BORROWDALE",
        Eastlea => "EASTLEA",
        Belgravia => "BELGRAVIA",
        Avondale => "AVONDALE",
        Msasa => "MSASA",
        Chitungwiza => "CHITUNGWIZA",
    }
}

labelled_enum! {
    pub enum JobStatus ("job status") {
        Pending => "PENDING",
        Printed => "PRINTED",
        Cancelled => "CANCELLED",
    }
}

labelled_enum! {
    pub enum PaymentStatus ("payment status") {
        NotMarked => "NOT_MARKED",
        Receipted => "RECEIPTED",
        Invoiced => "INVOICED",
    }
}

impl PaymentStatus {
    /// Whether a payment reference must accompany this status.
    pub fn requires_reference(&self) -> bool {
        matches!(self, PaymentStatus::Receipted | PaymentStatus::Invoiced)
    }
}

/// A print job order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    // ── Identification ──
    pub job_id: u64,
    pub docket_number: String,
    pub job_type: JobType,
    pub branch: Branch,

    // ── Personnel ──
    pub sales_rep: String,
    pub order_taken_by: String,

    // ── Customer ──
    pub customer: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contact_person: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mobile_number: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email_address: String,

    // ── Work ──
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub product_type_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_type_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_weight_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_size_id: Option<u64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    // ── Costs ──
    pub print_cost: Money,
    #[serde(default)]
    pub design_cost: Money,
    pub total_cost: Money,

    // ── Lifecycle ──
    #[serde(default = "default_status")]
    pub status: JobStatus,
    #[serde(default = "default_payment_status")]
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub payment_ref: String,

    // ── Timestamps ──
    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_timestamp")]
    pub updated_at: DateTime<Utc>,
}

fn default_status() -> JobStatus {
    JobStatus::Pending
}

fn default_payment_status() -> PaymentStatus {
    PaymentStatus::NotMarked
}

fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

impl Job {
    pub fn set_status(&mut self, status: JobStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    pub fn set_payment(
        &mut self,
        payment_status: PaymentStatus,
        payment_ref: String,
        now: DateTime<Utc>,
    ) {
        self.payment_status = payment_status;
        self.payment_ref = payment_ref;
        self.updated_at = now;
    }
}

/// Changes to an existing job. `None` leaves a field as it is.
///
/// Docket number, job type, personnel and lifecycle fields are not editable
/// here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<Branch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_type_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_weight_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_size_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_cost: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_cost: Option<Money>,
}

impl JobEdit {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Return `job` with the edit applied, revalidated and re-totalled.
    pub fn applied_to(&self, job: &Job, now: DateTime<Utc>) -> Result<Job, DraftError> {
        let mut next = job.clone();
        let text = |edit: &Option<String>, current: &mut String| {
            if let Some(value) = edit {
                *current = value.trim().to_string();
            }
        };
        text(&self.customer, &mut next.customer);
        text(&self.contact_person, &mut next.contact_person);
        text(&self.mobile_number, &mut next.mobile_number);
        text(&self.email_address, &mut next.email_address);
        text(&self.description, &mut next.description);
        text(&self.notes, &mut next.notes);
        next.branch = self.branch.unwrap_or(next.branch);
        next.quantity = self.quantity.unwrap_or(next.quantity);
        next.product_type_id = self.product_type_id.unwrap_or(next.product_type_id);
        next.paper_type_id = self.paper_type_id.or(next.paper_type_id);
        next.paper_weight_id = self.paper_weight_id.or(next.paper_weight_id);
        next.paper_size_id = self.paper_size_id.or(next.paper_size_id);
        next.print_cost = self.print_cost.unwrap_or(next.print_cost);
        next.design_cost = self.design_cost.unwrap_or(next.design_cost);

        check_details(
            [
                ("sales_rep", &next.sales_rep),
                ("order_taken_by", &next.order_taken_by),
                ("customer", &next.customer),
                ("contact_person", &next.contact_person),
                ("mobile_number", &next.mobile_number),
                ("description", &next.description),
            ],
            next.quantity,
            &next.email_address,
        )?;
        next.total_cost = next
            .print_cost
            .checked_add(next.design_cost)
            .ok_or(DraftError::CostOverflow)?;
        next.updated_at = now;
        Ok(next)
    }
}

/// Errors raised while validating a job intake draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("total cost overflowed")]
    CostOverflow,
}

/// Non-blank required text, a positive quantity and a plausible email.
fn check_details(
    required: [(&'static str, &str); 6],
    quantity: u32,
    email: &str,
) -> Result<(), DraftError> {
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(DraftError::MissingField(*field));
    }
    if quantity == 0 {
        return Err(DraftError::InvalidQuantity);
    }
    let email = email.trim();
    if !email.is_empty() {
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid {
            return Err(DraftError::InvalidEmail(email.to_string()));
        }
    }
    Ok(())
}

/// Job intake payload: everything the caller supplies before allocation.
///
/// `docket_number` is only honoured for FOREIGN jobs; LOCAL numbers are
/// always generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDraft {
    pub job_type: JobType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docket_number: Option<String>,
    pub branch: Branch,
    pub sales_rep: String,
    pub order_taken_by: String,
    pub customer: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub email_address: String,
    pub quantity: u32,
    #[serde(default)]
    pub description: String,
    pub product_type_id: u64,
    #[serde(default)]
    pub paper_type_id: Option<u64>,
    #[serde(default)]
    pub paper_weight_id: Option<u64>,
    #[serde(default)]
    pub paper_size_id: Option<u64>,
    #[serde(default)]
    pub notes: String,
    pub print_cost: Money,
    #[serde(default)]
    pub design_cost: Money,
}

impl JobDraft {
    /// Minimal draft with the required fields; optional fields stay empty.
    pub fn new(
        job_type: JobType,
        branch: Branch,
        customer: impl Into<String>,
        product_type_id: u64,
        quantity: u32,
        print_cost: Money,
    ) -> Self {
        Self {
            job_type,
            docket_number: None,
            branch,
            sales_rep: String::new(),
            order_taken_by: String::new(),
            customer: customer.into(),
            contact_person: String::new(),
            mobile_number: String::new(),
            email_address: String::new(),
            quantity,
            description: String::new(),
            product_type_id,
            paper_type_id: None,
            paper_weight_id: None,
            paper_size_id: None,
            notes: String::new(),
            print_cost,
            design_cost: Money::ZERO,
        }
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        check_details(
            [
                ("sales_rep", &self.sales_rep),
                ("order_taken_by", &self.order_taken_by),
                ("customer", &self.customer),
                ("contact_person", &self.contact_person),
                ("mobile_number", &self.mobile_number),
                ("description", &self.description),
            ],
            self.quantity,
            &self.email_address,
        )
    }

    /// Materialize the job row with its final identity.
    ///
    /// `total_cost` is always derived from the two cost components.
    pub fn into_job(
        self,
        job_id: u64,
        docket_number: String,
        now: DateTime<Utc>,
    ) -> Result<Job, DraftError> {
        let total_cost = self
            .print_cost
            .checked_add(self.design_cost)
            .ok_or(DraftError::CostOverflow)?;
        Ok(Job {
            job_id,
            docket_number,
            job_type: self.job_type,
            branch: self.branch,
            sales_rep: self.sales_rep.trim().to_string(),
            order_taken_by: self.order_taken_by.trim().to_string(),
            customer: self.customer.trim().to_string(),
            contact_person: self.contact_person,
            mobile_number: self.mobile_number,
            email_address: self.email_address.trim().to_string(),
            quantity: self.quantity,
            description: self.description,
            product_type_id: self.product_type_id,
            paper_type_id: self.paper_type_id,
            paper_weight_id: self.paper_weight_id,
            paper_size_id: self.paper_size_id,
            notes: self.notes,
            print_cost: self.print_cost,
            design_cost: self.design_cost,
            total_cost,
            status: JobStatus::Pending,
            payment_status: PaymentStatus::NotMarked,
            payment_ref: String::new(),
            created_at: now,
            updated_at: now,
        })
    }
}
