// Error taxonomy for the application, built on thiserror. Handlers return
// AppResult and the conversion to an HTTP response lives in response.rs.
use thiserror::Error;

pub mod mail;
pub mod response;

pub use mail::MailError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("mail error: {0}")]
    Mail(#[from] MailError),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("template error: {0}")]
    Template(#[from] std::io::Error),
}

// RowNotFound and unique-constraint failures carry meaning of their own;
// everything else stays a generic database error. SQLite reports constraint
// violations only through the error message text.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("record not found".into()),
            sqlx::Error::Database(db_err)
                if db_err.message().contains("UNIQUE constraint failed") =>
            {
                AppError::Conflict(db_err.message().to_string())
            }
            other => AppError::Database(other),
        }
    }
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = AppError::Validation("task content must not be empty".into());
        assert_eq!(
            err.to_string(),
            "validation error: task content must not be empty"
        );

        let err = AppError::Auth("not authenticated".into());
        assert_eq!(err.to_string(), "authentication error: not authenticated");

        let err = AppError::NotFound("task 7 not found".into());
        assert_eq!(err.to_string(), "not found: task 7 not found");
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn other_sqlx_errors_stay_database_errors() {
        let err = AppError::from(sqlx::Error::PoolClosed);
        assert!(matches!(err, AppError::Database(_)));
    }
}
