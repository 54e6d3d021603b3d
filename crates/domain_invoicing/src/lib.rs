//! Invoicing Domain - Invoices, Payments and Ledger Projection
//!
//! This crate holds the invoice and payment models, the invoice status
//! machine, and the projector that turns invoice lifecycle events into
//! balanced journal entries in the ledger domain.
//!
//! The projector is the only writer of invoice-sourced journal entries:
//! approval posts (or re-posts) the invoice's single linked entry,
//! amount-changing edits replace its lines in place, reverting to draft
//! annotates it, and payments post their own independent entries.

pub mod error;
pub mod invoice;
pub mod payment;
pub mod projector;

pub use error::InvoicingError;
pub use invoice::{Invoice, InvoiceField, InvoiceStatus};
pub use payment::{Payment, PaymentMethod};
pub use projector::{InvoicePostingProjector, DRAFT_ANNOTATION};
