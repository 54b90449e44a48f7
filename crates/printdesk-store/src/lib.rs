//! # printdesk-store
//!
//! Ledger layer for job and paper-catalog state.
//!
//! This crate provides:
//! - `Job`, `DocketCounter` and the paper catalog entities
//! - JSONL read/write (portable persistence)
//! - `Ledger` (canonical in-memory state with store-level constraints)
//! - `mutate_ledger_jsonl` (lock-scoped transaction over the ledger file)
//!
//! It intentionally does not allocate docket numbers or resolve paper
//! compatibility. Those concerns live in `printdesk-docket` and
//! `printdesk-catalog`.
//!
//! ## Data model
//!
//! ```text
//! JSONL (on disk, one line per record)
//!     ↕  load / save under <ledger>.lock
//! Ledger (deterministic in-memory projection)
//! ```

#[macro_use]
mod vocab;

pub mod atomic_store;
pub mod catalog;
pub mod counter;
pub mod job;
pub mod jsonl;
pub mod ledger;
pub mod units;

pub use atomic_store::{
    AtomicStoreMutationError, DEFAULT_LOCK_POLL_MS, DEFAULT_LOCK_TIMEOUT_MS, LockPolicy,
    ledger_lock_path, mutate_ledger_jsonl, read_ledger_jsonl,
};
pub use catalog::{
    PaperSize, PaperType, PaperWeight, ProductType, ProductTypeSpecification, SizeSeries,
};
pub use counter::DocketCounter;
pub use job::{Branch, DraftError, Job, JobDraft, JobEdit, JobStatus, JobType, PaymentStatus};
pub use jsonl::{JsonlError, Record, read_records, read_records_from_path, write_records_to_path};
pub use ledger::{Ledger, LedgerError};
pub use units::{Millimeters, Money, UnitParseError};
pub use vocab::UnknownLabel;
