use banner_core::error::CoreError;

/// Name of the unique constraint guarding `(feature_id, tag_id)`.
pub const BINDING_CONSTRAINT: &str = "uq_banner_bindings_feature_tag";

/// PostgreSQL SQLSTATE for unique violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Error type for store internals. Converted into [`CoreError`] at the
/// `ContentStore` boundary.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Core(core) => core,
            DbError::Sqlx(err) => CoreError::Storage(err.to_string()),
        }
    }
}

/// `true` if `err` is a unique violation on the named constraint.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
