//! Invoicing domain errors

use thiserror::Error;

use domain_ledger::LedgerError;

use crate::invoice::InvoiceStatus;

/// Errors that can occur in the invoicing domain
#[derive(Debug, Error)]
pub enum InvoicingError {
    /// A ledger operation failed; `MissingAccounts` inside this variant
    /// aborts the invoice transition entirely
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The invoice status machine forbids this move
    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidStatusTransition {
        from: InvoiceStatus,
        to: InvoiceStatus,
    },
}
