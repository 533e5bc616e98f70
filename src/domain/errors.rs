//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! Every failure is raised before the surrounding transaction commits.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or out-of-range input (bad CIDR, address outside its network, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A single-column or composite uniqueness rule was violated
    #[error("Uniqueness violation on {constraint}: {detail}")]
    UniquenessViolation { constraint: String, detail: String },

    /// Deleting a record that dependents still reference
    #[error("Referential integrity error: {0}")]
    ReferentialIntegrity(String),

    /// Unknown custom field datatype token
    #[error("Invalid custom field type: {0}")]
    InvalidFieldType(String),

    /// Resource not found
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// Database/persistence error
    #[error("Database error: {0}")]
    Database(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn duplicate(constraint: &str, detail: impl Into<String>) -> Self {
        DomainError::UniquenessViolation {
            constraint: constraint.to_string(),
            detail: detail.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: i32) -> Self {
        DomainError::NotFound { entity, id }
    }

    /// Short machine-readable tag used in API responses
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation_error",
            DomainError::UniquenessViolation { .. } => "uniqueness_violation",
            DomainError::ReferentialIntegrity(_) => "referential_integrity_error",
            DomainError::InvalidFieldType(_) => "invalid_field_type",
            DomainError::NotFound { .. } => "not_found",
            DomainError::Database(_) => "database_error",
        }
    }
}

// Index and foreign-key violations are the last line of defence behind the
// explicit pre-write checks; surface them with the same taxonomy.
impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => DomainError::UniquenessViolation {
                constraint: unique_constraint_name(&msg),
                detail: msg,
            },
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                DomainError::ReferentialIntegrity(msg)
            }
            _ => DomainError::Database(e.to_string()),
        }
    }
}

/// SQLite reports `UNIQUE constraint failed: table.col, table.col`; keep the
/// column list as the constraint name.
fn unique_constraint_name(msg: &str) -> String {
    msg.rsplit_once("failed:")
        .map(|(_, cols)| cols.trim().to_string())
        .unwrap_or_else(|| "unique".to_string())
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_name_is_extracted_from_sqlite_message() {
        assert_eq!(
            unique_constraint_name("UNIQUE constraint failed: assets.name"),
            "assets.name"
        );
        assert_eq!(unique_constraint_name("something else"), "unique");
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(DomainError::validation("x").kind(), "validation_error");
        assert_eq!(
            DomainError::duplicate("vlans.number", "dup").kind(),
            "uniqueness_violation"
        );
        assert_eq!(DomainError::not_found("IP", 3).to_string(), "IP 3 not found");
    }
}
