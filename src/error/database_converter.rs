use crate::error::AppError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Converts Diesel errors into `AppError` variants.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error, tagging it with the operation that failed.
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.message(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(kind: DatabaseErrorKind, message: &str, operation: &str) -> AppError {
        match kind {
            DatabaseErrorKind::NotNullViolation | DatabaseErrorKind::CheckViolation => {
                AppError::Validation {
                    field: operation.to_string(),
                    reason: message.to_string(),
                }
            }
            DatabaseErrorKind::ClosedConnection => AppError::ConnectionPool {
                source: anyhow::Error::msg(message.to_string()),
            },
            _ => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(message.to_string()),
            },
        }
    }
}
