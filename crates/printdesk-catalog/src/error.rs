use printdesk_access::AccessError;
use printdesk_store::{AtomicStoreMutationError, LedgerError, UnitParseError};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("ledger unavailable: {0}")]
    Infrastructure(String),

    #[error("ledger unreadable: {0}")]
    CorruptLedger(String),

    #[error(transparent)]
    Forbidden(#[from] AccessError),
}

impl CatalogError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Infrastructure(_))
    }

    pub(crate) fn invalid_dimension(field: &str, raw: &str, err: UnitParseError) -> Self {
        Self::ValidationFailed(format!("{field} {raw:?}: {err}"))
    }
}

impl From<LedgerError> for CatalogError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Jsonl(source) if source.is_transient() => {
                Self::Infrastructure(source.to_string())
            }
            LedgerError::Jsonl(source) => Self::CorruptLedger(source.to_string()),
            err @ LedgerError::NotFound { .. } => Self::NotFound(err.to_string()),
            err @ (LedgerError::DuplicateDocket(_)
            | LedgerError::DuplicateSize { .. }
            | LedgerError::DuplicateName { .. }) => Self::Conflict(err.to_string()),
            err @ (LedgerError::EmptyName { .. } | LedgerError::MissingReference { .. }) => {
                Self::ValidationFailed(err.to_string())
            }
        }
    }
}

impl From<AtomicStoreMutationError<CatalogError>> for CatalogError {
    fn from(err: AtomicStoreMutationError<CatalogError>) -> Self {
        match err {
            AtomicStoreMutationError::Mutation(inner) => inner,
            AtomicStoreMutationError::Store(source) => Self::from(source),
            other @ (AtomicStoreMutationError::LockBusy { .. }
            | AtomicStoreMutationError::LockIo { .. }) => Self::Infrastructure(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printdesk_store::JsonlError;

    #[test]
    fn unreadable_ledger_is_not_retryable() {
        let parse: CatalogError = LedgerError::Jsonl(JsonlError::Parse(3, "eof".into())).into();
        assert!(matches!(parse, CatalogError::CorruptLedger(_)));
        assert!(!parse.is_retryable());

        let io: CatalogError = AtomicStoreMutationError::<CatalogError>::Store(
            LedgerError::Jsonl(JsonlError::Io(0, "disk full".into())),
        )
        .into();
        assert!(matches!(io, CatalogError::Infrastructure(_)));
        assert!(io.is_retryable());
    }
}
