use thiserror::Error;

/// Errors the persistence layer can surface. `UniqueViolation` and
/// `SerializationFailure` are distinguishable from a generic database error
/// so engines can react to them specifically (replay, bounded retry)
/// instead of treating every failure as fatal.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("transaction could not be serialized against concurrent writers")]
    SerializationFailure,

    #[error("row not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl PersistenceError {
    /// Classifies a raw `sqlx::Error` returned by an insert/update into the
    /// taxonomy above. Postgres reports unique-constraint violations as
    /// SQLSTATE 23505 and serialization failures as 40001; anything else
    /// passes through opaque.
    pub fn classify(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return PersistenceError::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or_default().to_string(),
                };
            }
            if db_err.code().as_deref() == Some("40001") {
                return PersistenceError::SerializationFailure;
            }
        }
        PersistenceError::Database(err)
    }
}
