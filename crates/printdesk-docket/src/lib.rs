//! # printdesk-docket
//!
//! Docket sequence allocation for job intake.
//!
//! LOCAL jobs receive `LOC-%03d` numbers drawn from a per-namespace counter
//! under the ledger lock; FOREIGN jobs carry a caller-supplied number. The
//! same crate owns job lookup, edits and the status and payment lifecycle,
//! which mutate job rows under the same lock.
//!
//! Every operation comes in two layers:
//! - `*_in` functions over an in-memory `Ledger` (pure, deterministic)
//! - file-backed handles (`DocketAllocator`, `JobBook`) that wrap them in one
//!   lock-scoped ledger transaction

pub mod allocator;
pub mod docket;
pub mod error;
pub mod lifecycle;

pub use allocator::{
    CounterView, DEFAULT_MAX_ATTEMPTS, DocketAllocator, allocate_in, counter_view, peek_next_in,
    resync_in,
};
pub use docket::{LOCAL_DOCKET_PREFIX, MAX_DOCKET_LEN, format_local_docket, local_docket_suffix};
pub use error::DocketError;
pub use lifecycle::{
    JobBook, JobFilter, JobKey, find_job_in, list_jobs_in, update_job_in, update_payment_in,
    update_status_in,
};
