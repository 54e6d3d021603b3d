//! Integration tests for account resolution and fallback provisioning

use core_kernel::{AccountId, Currency, CustomerId, GroupNodeId, Money, TenantId};
use domain_ledger::{
    AccountResolver, AccountRole, GroupKind, GroupLevel, Ledger, LedgerError, NewAccount,
    SettlementChannel,
};

fn usd_ledger() -> Ledger {
    Ledger::new(TenantId::new(), Currency::USD)
}

fn assets_branch(ledger: &mut Ledger) -> GroupNodeId {
    let assets = ledger
        .create_group(GroupLevel::MainGroup, None, GroupKind::Assets)
        .unwrap();
    let current = ledger
        .create_group(GroupLevel::ElementGroup, Some(assets), GroupKind::CurrentAssets)
        .unwrap();
    ledger
        .create_group(
            GroupLevel::SubElementGroup,
            Some(current),
            GroupKind::CurrentAssets,
        )
        .unwrap()
}

fn receivable_role() -> AccountRole {
    AccountRole::CustomerReceivable {
        customer_id: CustomerId::new(),
        customer_name: "Globex Corp".to_string(),
    }
}

fn group_of(ledger: &Ledger, account: AccountId) -> GroupNodeId {
    ledger.account(account).unwrap().detailed_group_id
}

#[test]
fn test_receivable_provisioned_under_trade_debtors_first() {
    let mut ledger = usd_ledger();
    let sub = assets_branch(&mut ledger);
    // A generic asset leaf created before the debtors leaf: the tier
    // order must still prefer Trade Debtors
    ledger
        .create_group(
            GroupLevel::DetailedGroup,
            Some(sub),
            GroupKind::Custom("Sundry Assets".to_string()),
        )
        .unwrap();
    let debtors = ledger
        .create_group(GroupLevel::DetailedGroup, Some(sub), GroupKind::TradeDebtors)
        .unwrap();

    let account = AccountResolver::resolve(&mut ledger, &receivable_role()).unwrap();
    assert_eq!(group_of(&ledger, account), debtors);

    let resolved = ledger.account(account).unwrap();
    assert_eq!(resolved.name, "Globex Corp");
    assert!(resolved.linked_customer.is_some());
    assert!(resolved.code.contains(".C"));
}

#[test]
fn test_receivable_falls_back_to_any_group_under_current_assets() {
    let mut ledger = usd_ledger();
    let sub = assets_branch(&mut ledger);
    let sundry = ledger
        .create_group(
            GroupLevel::DetailedGroup,
            Some(sub),
            GroupKind::Custom("Sundry Assets".to_string()),
        )
        .unwrap();

    let account = AccountResolver::resolve(&mut ledger, &receivable_role()).unwrap();
    assert_eq!(group_of(&ledger, account), sundry);
}

#[test]
fn test_receivable_adopts_existing_account_by_name() {
    let mut ledger = usd_ledger();
    let sub = assets_branch(&mut ledger);
    let sundry = ledger
        .create_group(
            GroupLevel::DetailedGroup,
            Some(sub),
            GroupKind::Custom("Sundry Assets".to_string()),
        )
        .unwrap();
    let existing = ledger
        .create_account(sundry, NewAccount::new("Globex Corp", Money::zero(Currency::USD)))
        .unwrap();

    let customer_id = CustomerId::new();
    let role = AccountRole::CustomerReceivable {
        customer_id,
        customer_name: "globex corp".to_string(),
    };
    let first = AccountResolver::resolve(&mut ledger, &role).unwrap();
    assert_eq!(first, existing);
    assert_eq!(
        ledger.account(existing).unwrap().linked_customer,
        Some(customer_id)
    );

    // The adopted link makes the second resolution a direct lookup
    let second = AccountResolver::resolve(&mut ledger, &role).unwrap();
    assert_eq!(second, existing);
    assert_eq!(ledger.accounts().count(), 1);
}

#[test]
fn test_receivable_without_asset_branch_reports_guidance() {
    let mut ledger = usd_ledger();
    let err = AccountResolver::resolve(&mut ledger, &receivable_role()).unwrap_err();
    let LedgerError::MissingAccounts(gaps) = err else {
        panic!("expected MissingAccounts");
    };
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].role, "customer receivable");
    assert!(gaps[0].guidance.contains("Trade Debtors"));
}

#[test]
fn test_income_never_auto_created() {
    let mut ledger = usd_ledger();
    assets_branch(&mut ledger);

    let err = AccountResolver::resolve(&mut ledger, &AccountRole::Income { selected: None })
        .unwrap_err();
    assert!(matches!(err, LedgerError::MissingAccounts(_)));
    assert_eq!(ledger.accounts().count(), 0);
}

#[test]
fn test_selected_income_must_be_revenue_typed() {
    let mut ledger = usd_ledger();
    let sub = assets_branch(&mut ledger);
    let cash_group = ledger
        .create_group(GroupLevel::DetailedGroup, Some(sub), GroupKind::CashInHand)
        .unwrap();
    let cash = ledger
        .create_account(cash_group, NewAccount::new("Cash", Money::zero(Currency::USD)))
        .unwrap();

    let err = AccountResolver::resolve(
        &mut ledger,
        &AccountRole::Income {
            selected: Some(cash),
        },
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::Constraint(_)));
}

#[test]
fn test_settlement_channels_prefer_their_own_group() {
    let mut ledger = usd_ledger();
    let sub = assets_branch(&mut ledger);
    let cash_group = ledger
        .create_group(GroupLevel::DetailedGroup, Some(sub), GroupKind::CashInHand)
        .unwrap();
    let bank_group = ledger
        .create_group(GroupLevel::DetailedGroup, Some(sub), GroupKind::BankAccounts)
        .unwrap();

    let cash = AccountResolver::resolve(
        &mut ledger,
        &AccountRole::CashOrBank {
            channel: SettlementChannel::Cash,
        },
    )
    .unwrap();
    assert_eq!(group_of(&ledger, cash), cash_group);

    let bank = AccountResolver::resolve(
        &mut ledger,
        &AccountRole::CashOrBank {
            channel: SettlementChannel::Bank,
        },
    )
    .unwrap();
    assert_eq!(group_of(&ledger, bank), bank_group);
    assert_ne!(cash, bank);
}

#[test]
fn test_tax_resolution_is_idempotent() {
    let mut ledger = usd_ledger();
    let liabilities = ledger
        .create_group(GroupLevel::MainGroup, None, GroupKind::Liabilities)
        .unwrap();
    let current = ledger
        .create_group(
            GroupLevel::ElementGroup,
            Some(liabilities),
            GroupKind::CurrentLiabilities,
        )
        .unwrap();
    let sub = ledger
        .create_group(
            GroupLevel::SubElementGroup,
            Some(current),
            GroupKind::CurrentLiabilities,
        )
        .unwrap();
    ledger
        .create_group(GroupLevel::DetailedGroup, Some(sub), GroupKind::DutiesAndTaxes)
        .unwrap();

    let first = AccountResolver::resolve(&mut ledger, &AccountRole::TaxPayable).unwrap();
    let second = AccountResolver::resolve(&mut ledger, &AccountRole::TaxPayable).unwrap();
    assert_eq!(first, second);
    assert_eq!(ledger.accounts().count(), 1);
    assert_eq!(ledger.account(first).unwrap().name, "Tax Payable");
}

#[test]
fn test_keyword_match_covers_custom_group_names() {
    let mut ledger = usd_ledger();
    let main = ledger
        .create_group(
            GroupLevel::MainGroup,
            None,
            GroupKind::Custom("Company Assets".to_string()),
        )
        .unwrap();
    let el = ledger
        .create_group(
            GroupLevel::ElementGroup,
            Some(main),
            GroupKind::Custom("Liquid".to_string()),
        )
        .unwrap();
    let sub = ledger
        .create_group(
            GroupLevel::SubElementGroup,
            Some(el),
            GroupKind::Custom("Liquid".to_string()),
        )
        .unwrap();
    let debtors = ledger
        .create_group(
            GroupLevel::DetailedGroup,
            Some(sub),
            GroupKind::Custom("Sundry Debtors".to_string()),
        )
        .unwrap();

    // "Sundry Debtors" matches the receivable tier by keyword even though
    // every node in the path is custom
    let account = AccountResolver::resolve(&mut ledger, &receivable_role()).unwrap();
    assert_eq!(group_of(&ledger, account), debtors);
}

#[test]
fn test_provisioned_account_has_zero_opening_balance() {
    let mut ledger = usd_ledger();
    let sub = assets_branch(&mut ledger);
    ledger
        .create_group(GroupLevel::DetailedGroup, Some(sub), GroupKind::TradeDebtors)
        .unwrap();

    let account = AccountResolver::resolve(&mut ledger, &receivable_role()).unwrap();
    let resolved = ledger.account(account).unwrap();
    assert!(resolved.opening_balance.is_zero());
    assert!(resolved.current_balance.is_zero());
    assert!(!resolved.is_system_account);
}
