use printdesk_access::AccessError;
use printdesk_store::{AtomicStoreMutationError, DraftError, JobType, LedgerError};

/// Failures surfaced by docket allocation and job lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum DocketError {
    #[error("not found: {0}")]
    NotFound(String),

    /// `generated` marks a collision on a number this crate produced; the
    /// caller must restart the whole allocation rather than reuse it.
    #[error("docket number already in use: {docket_number}")]
    Conflict {
        docket_number: String,
        generated: bool,
    },

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("{job_type} docket numbers are exhausted")]
    Exhausted { job_type: JobType },

    #[error("ledger unavailable: {0}")]
    Infrastructure(String),

    #[error("ledger unreadable: {0}")]
    CorruptLedger(String),

    #[error(transparent)]
    Forbidden(#[from] AccessError),
}

impl DocketError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Infrastructure(_) => true,
            Self::Conflict { generated, .. } => *generated,
            Self::NotFound(_)
            | Self::ValidationFailed(_)
            | Self::Exhausted { .. }
            | Self::CorruptLedger(_)
            | Self::Forbidden(_) => false,
        }
    }
}

impl From<LedgerError> for DocketError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Jsonl(source) if source.is_transient() => {
                Self::Infrastructure(source.to_string())
            }
            LedgerError::Jsonl(source) => Self::CorruptLedger(source.to_string()),
            LedgerError::DuplicateDocket(docket_number) => Self::Conflict {
                docket_number,
                generated: false,
            },
            err @ LedgerError::NotFound { .. } => Self::NotFound(err.to_string()),
            err @ (LedgerError::MissingReference { .. }
            | LedgerError::DuplicateSize { .. }
            | LedgerError::DuplicateName { .. }
            | LedgerError::EmptyName { .. }) => Self::ValidationFailed(err.to_string()),
        }
    }
}

impl From<DraftError> for DocketError {
    fn from(err: DraftError) -> Self {
        Self::ValidationFailed(err.to_string())
    }
}

impl From<AtomicStoreMutationError<DocketError>> for DocketError {
    fn from(err: AtomicStoreMutationError<DocketError>) -> Self {
        match err {
            AtomicStoreMutationError::Mutation(inner) => inner,
            AtomicStoreMutationError::Store(source) => Self::from(source),
            other @ (AtomicStoreMutationError::LockBusy { .. }
            | AtomicStoreMutationError::LockIo { .. }) => Self::Infrastructure(other.to_string()),
        }
    }
}
