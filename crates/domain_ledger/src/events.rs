//! Domain events emitted by the ledger core
//!
//! The core never calls notification or websocket systems directly;
//! it accumulates events on the tenant aggregate and external
//! subscribers drain them via `Ledger::take_events`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, GroupNodeId, JournalEntryId, Money};

use crate::account::AccountType;
use crate::hierarchy::GroupLevel;
use crate::journal::SourceRef;

/// Events emitted by ledger write operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A hierarchy group node was created
    GroupCreated {
        group_id: GroupNodeId,
        level: GroupLevel,
        code: String,
        timestamp: DateTime<Utc>,
    },

    /// An account was created, administratively or by resolver fallback
    AccountCreated {
        account_id: AccountId,
        code: String,
        account_type: AccountType,
        auto_provisioned: bool,
        timestamp: DateTime<Utc>,
    },

    /// A journal entry was created
    EntryPosted {
        entry_id: JournalEntryId,
        source: Option<SourceRef>,
        total_amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// An existing entry's lines were replaced in place
    EntryReplaced {
        entry_id: JournalEntryId,
        total_amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// An entry and its lines were deleted
    EntryDeleted {
        entry_id: JournalEntryId,
        timestamp: DateTime<Utc>,
    },
}
