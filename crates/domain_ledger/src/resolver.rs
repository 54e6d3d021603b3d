//! Account resolution
//!
//! Translates a semantic role ("customer receivable", "tax payable") into
//! a concrete account, auto-provisioning it when the hierarchy supports
//! that. The fallback search is an explicit ordered list of tiers so new
//! tiers can be added without touching call sites.
//!
//! Income accounts are the exception: which income account is "default"
//! is ambiguous, so they are resolved only from an explicit selection or
//! the tenant's configured default, never auto-created.

use tracing::{debug, warn};

use core_kernel::{AccountId, CustomerId, Money};

use crate::account::{AccountType, NewAccount};
use crate::error::{LedgerError, MissingAccount};
use crate::hierarchy::{AccountGroupNode, GroupKind, GroupLevel};
use crate::ledger::Ledger;

/// Where a payment settles, for cash/bank account selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementChannel {
    Cash,
    Bank,
}

/// A semantic account role to resolve against a tenant's chart
#[derive(Debug, Clone)]
pub enum AccountRole {
    /// The receivable account for a specific customer
    CustomerReceivable {
        customer_id: CustomerId,
        customer_name: String,
    },
    /// An income account: explicit selection or configured default only
    Income { selected: Option<AccountId> },
    /// The liability account taxes are collected into
    TaxPayable,
    /// The expense account discounts are written off to
    DiscountAllowed,
    /// The cash or bank account a payment settles into
    CashOrBank { channel: SettlementChannel },
}

impl AccountRole {
    /// Short name of the role, used in missing-account reports
    pub fn describe(&self) -> &'static str {
        match self {
            AccountRole::CustomerReceivable { .. } => "customer receivable",
            AccountRole::Income { .. } => "income",
            AccountRole::TaxPayable => "tax payable",
            AccountRole::DiscountAllowed => "discount allowed",
            AccountRole::CashOrBank { .. } => "cash/bank",
        }
    }
}

/// One tier of the fallback search over DetailedGroups
#[derive(Debug, Clone, Copy)]
enum FallbackTier {
    /// DetailedGroup whose own kind matches
    Detailed {
        kinds: &'static [GroupKind],
        keywords: &'static [&'static str],
    },
    /// DetailedGroup whose SubElementGroup parent matches
    UnderParent {
        kinds: &'static [GroupKind],
        keywords: &'static [&'static str],
    },
    /// Any DetailedGroup under a matching MainGroup
    AnyUnderMain {
        kinds: &'static [GroupKind],
        keywords: &'static [&'static str],
    },
}

fn kind_matches(kind: &GroupKind, kinds: &[GroupKind], keywords: &[&str]) -> bool {
    if kinds.contains(kind) {
        return true;
    }
    match kind {
        GroupKind::Custom(name) => {
            let lower = name.to_lowercase();
            keywords.iter().any(|k| lower.contains(k))
        }
        _ => false,
    }
}

impl FallbackTier {
    fn matches(&self, ledger: &Ledger, node: &AccountGroupNode) -> bool {
        match self {
            FallbackTier::Detailed { kinds, keywords } => {
                kind_matches(&node.kind, kinds, keywords)
            }
            FallbackTier::UnderParent { kinds, keywords } => node
                .parent_id
                .and_then(|pid| ledger.groups.get(&pid))
                .is_some_and(|parent| kind_matches(&parent.kind, kinds, keywords)),
            FallbackTier::AnyUnderMain { kinds, keywords } => {
                let main = ledger.main_ancestor(node);
                kind_matches(&main.kind, kinds, keywords)
            }
        }
    }
}

const RECEIVABLE_TIERS: &[FallbackTier] = &[
    FallbackTier::Detailed {
        kinds: &[GroupKind::TradeDebtors],
        keywords: &["debtor", "receivable"],
    },
    FallbackTier::UnderParent {
        kinds: &[GroupKind::CurrentAssets],
        keywords: &["current asset"],
    },
    FallbackTier::AnyUnderMain {
        kinds: &[GroupKind::Assets],
        keywords: &["asset"],
    },
];

const TAX_TIERS: &[FallbackTier] = &[
    FallbackTier::Detailed {
        kinds: &[GroupKind::DutiesAndTaxes],
        keywords: &["tax", "duties", "vat", "gst"],
    },
    FallbackTier::UnderParent {
        kinds: &[GroupKind::CurrentLiabilities],
        keywords: &["current liabilit"],
    },
    FallbackTier::AnyUnderMain {
        kinds: &[GroupKind::Liabilities],
        keywords: &["liabilit"],
    },
];

const DISCOUNT_TIERS: &[FallbackTier] = &[
    FallbackTier::Detailed {
        kinds: &[GroupKind::DiscountsAllowed],
        keywords: &["discount"],
    },
    FallbackTier::UnderParent {
        kinds: &[GroupKind::IndirectExpenses],
        keywords: &["indirect expense"],
    },
    FallbackTier::AnyUnderMain {
        kinds: &[GroupKind::Expenses],
        keywords: &["expense"],
    },
];

const CASH_TIERS: &[FallbackTier] = &[
    FallbackTier::Detailed {
        kinds: &[GroupKind::CashInHand],
        keywords: &["cash"],
    },
    FallbackTier::Detailed {
        kinds: &[GroupKind::BankAccounts],
        keywords: &["bank"],
    },
    FallbackTier::UnderParent {
        kinds: &[GroupKind::CurrentAssets],
        keywords: &["current asset"],
    },
    FallbackTier::AnyUnderMain {
        kinds: &[GroupKind::Assets],
        keywords: &["asset"],
    },
];

const BANK_TIERS: &[FallbackTier] = &[
    FallbackTier::Detailed {
        kinds: &[GroupKind::BankAccounts],
        keywords: &["bank"],
    },
    FallbackTier::Detailed {
        kinds: &[GroupKind::CashInHand],
        keywords: &["cash"],
    },
    FallbackTier::UnderParent {
        kinds: &[GroupKind::CurrentAssets],
        keywords: &["current asset"],
    },
    FallbackTier::AnyUnderMain {
        kinds: &[GroupKind::Assets],
        keywords: &["asset"],
    },
];

/// Resolves semantic roles to concrete accounts
pub struct AccountResolver;

impl AccountResolver {
    /// Resolves a role, auto-provisioning the account if the hierarchy
    /// allows it
    ///
    /// # Errors
    ///
    /// `MissingAccounts` (with one element) when the role cannot be
    /// resolved or provisioned; callers resolving several roles collect
    /// these into a single combined failure.
    pub fn resolve(ledger: &mut Ledger, role: &AccountRole) -> Result<AccountId, LedgerError> {
        match role {
            AccountRole::CustomerReceivable {
                customer_id,
                customer_name,
            } => Self::resolve_receivable(ledger, *customer_id, customer_name),
            AccountRole::Income { selected } => Self::resolve_income(ledger, *selected),
            AccountRole::TaxPayable => Self::resolve_searched(
                ledger,
                role,
                AccountType::Liability,
                &["tax", "duties"],
                TAX_TIERS,
                "Tax Payable",
                "No liability branch exists to hold collected tax. Create a \
                 Liabilities main group with a Duties & Taxes detailed group.",
            ),
            AccountRole::DiscountAllowed => Self::resolve_searched(
                ledger,
                role,
                AccountType::Expense,
                &["discount"],
                DISCOUNT_TIERS,
                "Discount Allowed",
                "No expense branch exists to write discounts off to. Create an \
                 Expenses main group with a Discounts Allowed detailed group.",
            ),
            AccountRole::CashOrBank { channel } => {
                let (keywords, tiers, name): (&[&str], _, _) = match channel {
                    SettlementChannel::Cash => (&["cash"], CASH_TIERS, "Cash"),
                    SettlementChannel::Bank => (&["bank"], BANK_TIERS, "Bank Account"),
                };
                Self::resolve_searched(
                    ledger,
                    role,
                    AccountType::Asset,
                    keywords,
                    tiers,
                    name,
                    "No asset branch exists to receive payments. Create an Assets \
                     main group with Cash In Hand and Bank Accounts detailed groups.",
                )
            }
        }
    }

    fn missing(role: &AccountRole, guidance: &str) -> LedgerError {
        warn!(role = role.describe(), "account resolution failed");
        LedgerError::MissingAccounts(vec![MissingAccount {
            role: role.describe().to_string(),
            guidance: guidance.to_string(),
        }])
    }

    /// First account satisfying the predicate, lowest code first
    fn find_account<F>(ledger: &Ledger, predicate: F) -> Option<AccountId>
    where
        F: Fn(&crate::account::Account) -> bool,
    {
        ledger
            .accounts()
            .filter(|a| predicate(a))
            .min_by(|a, b| a.code.cmp(&b.code))
            .map(|a| a.id)
    }

    /// First DetailedGroup matched by the ordered tier list, searching
    /// groups in creation order within each tier
    fn find_group(ledger: &Ledger, tiers: &[FallbackTier]) -> Option<core_kernel::GroupNodeId> {
        let detailed = ledger.detailed_groups_in_creation_order();
        for tier in tiers {
            for id in &detailed {
                let node = &ledger.groups[id];
                debug_assert_eq!(node.level, GroupLevel::DetailedGroup);
                if tier.matches(ledger, node) {
                    return Some(*id);
                }
            }
        }
        None
    }

    fn resolve_receivable(
        ledger: &mut Ledger,
        customer_id: CustomerId,
        customer_name: &str,
    ) -> Result<AccountId, LedgerError> {
        // Direct lookup via the customer link
        if let Some(id) = ledger.account_by_customer.get(customer_id.as_uuid()) {
            return Ok(*id);
        }

        // An existing asset account carrying the customer's name: adopt it
        if let Some(id) = Self::find_account(ledger, |a| {
            a.account_type == AccountType::Asset && a.name.eq_ignore_ascii_case(customer_name)
        }) {
            ledger.link_account_to_customer(id, *customer_id.as_uuid());
            debug!(account = %id, customer = %customer_id, "linked existing receivable account");
            return Ok(id);
        }

        let role = AccountRole::CustomerReceivable {
            customer_id,
            customer_name: customer_name.to_string(),
        };
        let Some(group_id) = Self::find_group(ledger, RECEIVABLE_TIERS) else {
            return Err(Self::missing(
                &role,
                "No asset branch exists to hold customer receivables. Create an \
                 Assets main group with a Trade Debtors detailed group.",
            ));
        };

        let group_code = ledger.group(group_id)?.code.clone();
        let uuid = customer_id.as_uuid().simple().to_string();
        let code = format!("{group_code}.C{}", &uuid[..8]);
        let account = NewAccount::new(customer_name, Money::zero(ledger.currency()))
            .linked_to(customer_id)
            .with_code(code)
            .auto_provisioned();
        ledger.create_account(group_id, account)
    }

    fn resolve_income(
        ledger: &Ledger,
        selected: Option<AccountId>,
    ) -> Result<AccountId, LedgerError> {
        if let Some(id) = selected {
            let account = ledger.account(id)?;
            if account.account_type != AccountType::Revenue {
                return Err(LedgerError::constraint(format!(
                    "selected income account '{}' is {:?}, not revenue",
                    account.name, account.account_type
                )));
            }
            return Ok(id);
        }
        if let Some(id) = ledger.default_income_account() {
            if ledger.accounts.contains_key(&id) {
                return Ok(id);
            }
        }
        Err(Self::missing(
            &AccountRole::Income { selected: None },
            "Select an income account on the document, or configure a default \
             income account for the tenant.",
        ))
    }

    /// Shared search -> fallback -> auto-create -> fail pattern
    #[allow(clippy::too_many_arguments)]
    fn resolve_searched(
        ledger: &mut Ledger,
        role: &AccountRole,
        account_type: AccountType,
        name_keywords: &[&str],
        tiers: &[FallbackTier],
        new_name: &str,
        guidance: &str,
    ) -> Result<AccountId, LedgerError> {
        if let Some(id) = Self::find_account(ledger, |a| {
            let lower = a.name.to_lowercase();
            a.account_type == account_type && name_keywords.iter().any(|k| lower.contains(k))
        }) {
            return Ok(id);
        }

        let Some(group_id) = Self::find_group(ledger, tiers) else {
            return Err(Self::missing(role, guidance));
        };

        let account =
            NewAccount::new(new_name, Money::zero(ledger.currency())).auto_provisioned();
        let id = ledger.create_account(group_id, account)?;
        debug!(account = %id, role = role.describe(), "auto-provisioned account");
        Ok(id)
    }
}
