//! Ledger Domain - Chart of Accounts and Double-Entry Journal Posting
//!
//! This crate implements the ledger core of the practice platform: a
//! four-level chart-of-accounts hierarchy with accounts at the leaves, a
//! journal posting engine that enforces the double-entry invariant, a
//! resolver that turns semantic roles into concrete accounts with
//! multi-tier fallback provisioning, and the running-balance read APIs.
//!
//! # Double-entry principles
//!
//! - Every journal entry balances: total debits equal total credits
//!   (within a 0.0001 currency-unit tolerance)
//! - Debits increase asset/expense accounts
//! - Credits increase liability/equity/revenue accounts
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{Ledger, LineInput, NewEntry};
//!
//! let mut ledger = Ledger::new(tenant_id, Currency::USD);
//! // ... create the hierarchy and accounts ...
//! let entry = ledger.create_entry(
//!     NewEntry::new(date, "manual", "Opening adjustment", user).posted(),
//!     vec![
//!         LineInput::debit(cash, amount),
//!         LineInput::credit(capital, amount),
//!     ],
//! )?;
//! ```

pub mod account;
pub mod error;
pub mod events;
pub mod hierarchy;
pub mod import;
pub mod journal;
pub mod ledger;
pub mod query;
pub mod resolver;

pub use account::{Account, AccountType, NewAccount};
pub use error::{LedgerError, MissingAccount};
pub use events::LedgerEvent;
pub use hierarchy::{AccountGroupNode, GroupKind, GroupLevel};
pub use import::{AccountImporter, ImportRow, RowOutcome, RowReport};
pub use journal::{
    EntryUpdate, JournalEntry, JournalEntryLine, LineInput, NewEntry, SourceDocument, SourceRef,
    BALANCE_EPSILON,
};
pub use ledger::Ledger;
pub use query::{AccountFilter, LedgerQueryService, LedgerRow, LedgerView, TrialBalance, TrialBalanceRow};
pub use resolver::{AccountResolver, AccountRole, SettlementChannel};
