//! Account types for the chart of accounts
//!
//! Accounts are the leaves of the hierarchy: every account belongs to
//! exactly one DetailedGroup and its type is derived from the MainGroup
//! ancestry, never set independently.

use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, CustomerId, GroupNodeId, Money, TenantId};

/// Types of accounts in the chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Asset accounts (debit normal balance)
    Asset,
    /// Liability accounts (credit normal balance)
    Liability,
    /// Equity accounts (credit normal balance)
    Equity,
    /// Revenue accounts (credit normal balance)
    Revenue,
    /// Expense accounts (debit normal balance)
    Expense,
}

impl AccountType {
    /// Returns true if this account type has a debit normal balance
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }

    /// Signed balance movement of a single journal line for this account type
    ///
    /// Asset and expense accounts increase on debit; liability, equity and
    /// revenue accounts increase on credit.
    pub fn signed_movement(&self, debit: Money, credit: Money) -> Money {
        if self.is_debit_normal() {
            debit - credit
        } else {
            credit - debit
        }
    }
}

/// An account in the chart of accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Owning DetailedGroup (exclusive ownership)
    pub detailed_group_id: GroupNodeId,
    /// Tenant-unique code derived from ancestor codes plus a sequence
    pub code: String,
    /// Account name
    pub name: String,
    /// Derived from the MainGroup ancestry
    pub account_type: AccountType,
    /// Protects against rename and delete
    pub is_system_account: bool,
    /// Whether account is active
    pub is_active: bool,
    /// Balance at the start of bookkeeping
    pub opening_balance: Money,
    /// Cached balance: opening balance plus all signed line movements
    pub current_balance: Money,
    /// Customer this account is linked to, for direct receivable lookup
    pub linked_customer: Option<CustomerId>,
    /// Description
    pub description: Option<String>,
}

/// Input for creating an account under a DetailedGroup
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub opening_balance: Money,
    pub is_system_account: bool,
    pub linked_customer: Option<CustomerId>,
    pub description: Option<String>,
    /// Explicit code overriding the generated `{group}.{seq}` form,
    /// used by the resolver to embed customer ids
    pub code_hint: Option<String>,
    /// Marks the account as created by resolver fallback rather than
    /// an administrative action (event metadata only)
    pub auto_provisioned: bool,
}

impl NewAccount {
    /// Creates input for a plain administrative account
    pub fn new(name: impl Into<String>, opening_balance: Money) -> Self {
        Self {
            name: name.into(),
            opening_balance,
            is_system_account: false,
            linked_customer: None,
            description: None,
            code_hint: None,
            auto_provisioned: false,
        }
    }

    /// Marks the account as a protected system account
    pub fn system(mut self) -> Self {
        self.is_system_account = true;
        self
    }

    /// Links the account to a customer for direct lookup
    pub fn linked_to(mut self, customer_id: CustomerId) -> Self {
        self.linked_customer = Some(customer_id);
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Overrides the generated account code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code_hint = Some(code.into());
        self
    }

    /// Marks the account as resolver-provisioned
    pub fn auto_provisioned(mut self) -> Self {
        self.auto_provisioned = true;
        self
    }
}
