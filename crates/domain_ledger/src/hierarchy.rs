//! The account group hierarchy
//!
//! The chart of accounts is a four-level tree of group nodes with accounts
//! hanging off the leaf (DetailedGroup) level:
//!
//! MainGroup -> ElementGroup -> SubElementGroup -> DetailedGroup -> Account
//!
//! Nodes are only ever created by resolving through a parent, so the tree
//! property holds by construction.

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{GroupNodeId, TenantId};

/// The four group levels above the account leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupLevel {
    MainGroup,
    ElementGroup,
    SubElementGroup,
    DetailedGroup,
}

impl GroupLevel {
    /// The level a node's parent must sit at, None for MainGroup
    pub fn parent(&self) -> Option<GroupLevel> {
        match self {
            GroupLevel::MainGroup => None,
            GroupLevel::ElementGroup => Some(GroupLevel::MainGroup),
            GroupLevel::SubElementGroup => Some(GroupLevel::ElementGroup),
            GroupLevel::DetailedGroup => Some(GroupLevel::SubElementGroup),
        }
    }

    /// The level of a node's children, None for DetailedGroup
    pub fn child(&self) -> Option<GroupLevel> {
        match self {
            GroupLevel::MainGroup => Some(GroupLevel::ElementGroup),
            GroupLevel::ElementGroup => Some(GroupLevel::SubElementGroup),
            GroupLevel::SubElementGroup => Some(GroupLevel::DetailedGroup),
            GroupLevel::DetailedGroup => None,
        }
    }
}

impl fmt::Display for GroupLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupLevel::MainGroup => "main group",
            GroupLevel::ElementGroup => "element group",
            GroupLevel::SubElementGroup => "sub-element group",
            GroupLevel::DetailedGroup => "detailed group",
        };
        write!(f, "{name}")
    }
}

/// Semantic name of a group node
///
/// Predefined kinds cover the standard chart; `Custom` carries a free-text
/// name supplied by the tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    Assets,
    Liabilities,
    Equity,
    Income,
    Expenses,
    FixedAssets,
    CurrentAssets,
    CurrentLiabilities,
    LongTermLiabilities,
    CashInHand,
    BankAccounts,
    TradeDebtors,
    TradeCreditors,
    DutiesAndTaxes,
    DirectIncome,
    IndirectIncome,
    DirectExpenses,
    IndirectExpenses,
    DiscountsAllowed,
    Custom(String),
}

impl GroupKind {
    /// Human-readable name of the kind
    pub fn display_name(&self) -> &str {
        match self {
            GroupKind::Assets => "Assets",
            GroupKind::Liabilities => "Liabilities",
            GroupKind::Equity => "Equity",
            GroupKind::Income => "Income",
            GroupKind::Expenses => "Expenses",
            GroupKind::FixedAssets => "Fixed Assets",
            GroupKind::CurrentAssets => "Current Assets",
            GroupKind::CurrentLiabilities => "Current Liabilities",
            GroupKind::LongTermLiabilities => "Long Term Liabilities",
            GroupKind::CashInHand => "Cash In Hand",
            GroupKind::BankAccounts => "Bank Accounts",
            GroupKind::TradeDebtors => "Trade Debtors",
            GroupKind::TradeCreditors => "Trade Creditors",
            GroupKind::DutiesAndTaxes => "Duties & Taxes",
            GroupKind::DirectIncome => "Direct Income",
            GroupKind::IndirectIncome => "Indirect Income",
            GroupKind::DirectExpenses => "Direct Expenses",
            GroupKind::IndirectExpenses => "Indirect Expenses",
            GroupKind::DiscountsAllowed => "Discounts Allowed",
            GroupKind::Custom(name) => name,
        }
    }

    /// Short code mnemonic, None for custom kinds
    pub fn code_fragment(&self) -> Option<&'static str> {
        match self {
            GroupKind::Assets => Some("AST"),
            GroupKind::Liabilities => Some("LIA"),
            GroupKind::Equity => Some("EQT"),
            GroupKind::Income => Some("INC"),
            GroupKind::Expenses => Some("EXP"),
            GroupKind::FixedAssets => Some("FA"),
            GroupKind::CurrentAssets => Some("CA"),
            GroupKind::CurrentLiabilities => Some("CL"),
            GroupKind::LongTermLiabilities => Some("LTL"),
            GroupKind::CashInHand => Some("CSH"),
            GroupKind::BankAccounts => Some("BNK"),
            GroupKind::TradeDebtors => Some("TD"),
            GroupKind::TradeCreditors => Some("TC"),
            GroupKind::DutiesAndTaxes => Some("TAX"),
            GroupKind::DirectIncome => Some("DI"),
            GroupKind::IndirectIncome => Some("II"),
            GroupKind::DirectExpenses => Some("DE"),
            GroupKind::IndirectExpenses => Some("IE"),
            GroupKind::DiscountsAllowed => Some("DA"),
            GroupKind::Custom(_) => None,
        }
    }

    /// Returns true for `Custom` kinds
    pub fn is_custom(&self) -> bool {
        matches!(self, GroupKind::Custom(_))
    }

    /// Resolves a name to a predefined kind where one matches, falling
    /// back to `Custom` with the trimmed name
    pub fn from_name(name: &str) -> GroupKind {
        const PREDEFINED: &[GroupKind] = &[
            GroupKind::Assets,
            GroupKind::Liabilities,
            GroupKind::Equity,
            GroupKind::Income,
            GroupKind::Expenses,
            GroupKind::FixedAssets,
            GroupKind::CurrentAssets,
            GroupKind::CurrentLiabilities,
            GroupKind::LongTermLiabilities,
            GroupKind::CashInHand,
            GroupKind::BankAccounts,
            GroupKind::TradeDebtors,
            GroupKind::TradeCreditors,
            GroupKind::DutiesAndTaxes,
            GroupKind::DirectIncome,
            GroupKind::IndirectIncome,
            GroupKind::DirectExpenses,
            GroupKind::IndirectExpenses,
            GroupKind::DiscountsAllowed,
        ];

        let trimmed = name.trim();
        for kind in PREDEFINED {
            if kind.display_name().eq_ignore_ascii_case(trimmed) {
                return kind.clone();
            }
        }
        GroupKind::Custom(trimmed.to_string())
    }
}

/// A node in the account group hierarchy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountGroupNode {
    /// Unique identifier
    pub id: GroupNodeId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Parent node, None only for MainGroup
    pub parent_id: Option<GroupNodeId>,
    /// Level in the tree
    pub level: GroupLevel,
    /// Semantic kind or custom name
    pub kind: GroupKind,
    /// Mnemonic code built from ancestor codes; traceability only
    pub code: String,
}

impl AccountGroupNode {
    /// Human-readable name of the node
    pub fn name(&self) -> &str {
        self.kind.display_name()
    }
}

/// Short time-based tail for codes of custom groups
///
/// Codes are for traceability, not uniqueness guarantees beyond the
/// tenant scope, so a millisecond clock tail is collision-resistant
/// enough.
pub(crate) fn custom_code_tail() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("X{}", millis % 100_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_navigation() {
        assert_eq!(GroupLevel::MainGroup.parent(), None);
        assert_eq!(
            GroupLevel::DetailedGroup.parent(),
            Some(GroupLevel::SubElementGroup)
        );
        assert_eq!(
            GroupLevel::MainGroup.child(),
            Some(GroupLevel::ElementGroup)
        );
        assert_eq!(GroupLevel::DetailedGroup.child(), None);
    }

    #[test]
    fn test_from_name_matches_predefined_case_insensitively() {
        assert_eq!(GroupKind::from_name("trade debtors"), GroupKind::TradeDebtors);
        assert_eq!(GroupKind::from_name("DUTIES & TAXES"), GroupKind::DutiesAndTaxes);
        assert_eq!(
            GroupKind::from_name("  Plant & Machinery "),
            GroupKind::Custom("Plant & Machinery".to_string())
        );
    }

    #[test]
    fn test_predefined_kinds_have_code_fragments() {
        assert_eq!(GroupKind::Assets.code_fragment(), Some("AST"));
        assert_eq!(GroupKind::Custom("anything".into()).code_fragment(), None);
    }
}
