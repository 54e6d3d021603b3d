//! Ledger domain errors

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::MoneyError;

/// One structural gap found during account resolution
///
/// Resolution collects every gap before failing, so callers can surface
/// all of them to the user at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingAccount {
    /// The semantic role that could not be resolved, e.g. "customer receivable"
    pub role: String,
    /// Actionable guidance naming the missing structural dependency
    pub guidance: String,
}

fn missing_summary(missing: &[MissingAccount]) -> String {
    missing
        .iter()
        .map(|m| m.role.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Debits do not equal credits within the balance tolerance
    #[error("Unbalanced journal entry: debits={debits}, credits={credits}")]
    UnbalancedEntry { debits: Decimal, credits: Decimal },

    /// Structural hierarchy gaps found during account resolution
    #[error("Missing required ledger accounts: {}", missing_summary(.0))]
    MissingAccounts(Vec<MissingAccount>),

    /// Deletion blocked by a dependent group, account or journal line
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Attempted rename or delete of a protected account
    #[error("System account protection: {0}")]
    SystemAccountProtection(String),

    /// Unknown id within the tenant scope
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Administrative create collides with an existing code
    #[error("Duplicate code: {0}")]
    DuplicateCode(String),

    /// Money arithmetic error
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Should-never-happen failure, e.g. an unbalanced computed line set
    #[error("Internal ledger error: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        LedgerError::Constraint(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unbalanced_entry_display_carries_both_totals() {
        let err = LedgerError::UnbalancedEntry {
            debits: dec!(100),
            credits: dec!(90),
        };
        let text = err.to_string();
        assert!(text.contains("100"));
        assert!(text.contains("90"));
    }

    #[test]
    fn test_missing_accounts_lists_every_role() {
        let err = LedgerError::MissingAccounts(vec![
            MissingAccount {
                role: "customer receivable".into(),
                guidance: "create an Assets branch".into(),
            },
            MissingAccount {
                role: "tax payable".into(),
                guidance: "create a Liabilities branch".into(),
            },
        ]);
        let text = err.to_string();
        assert!(text.contains("customer receivable"));
        assert!(text.contains("tax payable"));
    }
}
