use thiserror::Error;

/// Failure modes surfaced by the storage layer.
///
/// `Conflict`/`Invariant` are defensive: given validated inputs (see
/// [`koel_types::ExchangeRate`]'s documented invariants) they should be
/// unreachable, but encoding them at the type boundary means a bug upstream
/// surfaces here instead of as a opaque Postgres constraint violation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("partition {0} already exists")]
    PartitionExists(String),
}
