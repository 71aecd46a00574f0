use sqlx::Error as SqlxError;
use thiserror::Error;

/// SQLSTATE codes Postgres raises when a transaction lost a race and may
/// succeed if replayed.
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
/// Raised when an integer column would leave its range, e.g. restocking past `i32::MAX`.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlx(SqlxError),

    #[error("Transient database failure: {0}")]
    Transient(String),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Custom: {0}")]
    Custom(String),
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound,
            SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => {
                RepositoryError::Transient(err.to_string())
            }
            SqlxError::Database(db_err) => match db_err.code().as_deref() {
                Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
                    RepositoryError::Transient(db_err.message().to_string())
                }
                Some(NUMERIC_VALUE_OUT_OF_RANGE) => {
                    RepositoryError::Conflict(db_err.message().to_string())
                }
                _ if db_err.is_unique_violation() => {
                    RepositoryError::Conflict(db_err.message().to_string())
                }
                _ => RepositoryError::Sqlx(err),
            },
            _ => RepositoryError::Sqlx(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_exhaustion_is_transient() {
        assert!(matches!(
            RepositoryError::from(SqlxError::PoolTimedOut),
            RepositoryError::Transient(_)
        ));
        assert!(matches!(
            RepositoryError::from(SqlxError::PoolClosed),
            RepositoryError::Transient(_)
        ));
    }

    #[test]
    fn missing_row_maps_to_not_found() {
        assert!(matches!(
            RepositoryError::from(SqlxError::RowNotFound),
            RepositoryError::NotFound
        ));
    }
}
