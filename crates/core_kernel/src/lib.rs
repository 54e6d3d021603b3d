//! Core Kernel - foundational types for the practice ledger
//!
//! This crate provides the building blocks shared by every domain crate:
//! - Money with precise decimal arithmetic
//! - Strongly-typed identifiers
//! - Pagination types for the reporting read APIs

pub mod identifiers;
pub mod money;
pub mod pagination;

pub use identifiers::{
    AccountId, CustomerId, GroupNodeId, InvoiceId, JournalEntryId, JournalLineId, PaymentId,
    TenantId, UserId,
};
pub use money::{Currency, Money, MoneyError};
pub use pagination::{PageMeta, PageRequest};
