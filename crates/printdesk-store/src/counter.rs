//! Per-namespace docket counter row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::JobType;

/// Highest docket number known to be allocated or reserved in a namespace.
///
/// Rows are created lazily and only ever move forward; see
/// `Ledger::advance_counter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocketCounter {
    pub job_type: JobType,
    #[serde(default)]
    pub current_number: u64,
    #[serde(default = "default_timestamp")]
    pub updated_at: DateTime<Utc>,
}

fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

impl DocketCounter {
    pub fn new(job_type: JobType, now: DateTime<Utc>) -> Self {
        Self {
            job_type,
            current_number: 0,
            updated_at: now,
        }
    }
}
