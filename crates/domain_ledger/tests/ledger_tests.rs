//! Integration tests for the journal engine and read APIs

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AccountId, Currency, Money, PageRequest, TenantId, UserId};
use domain_ledger::{
    AccountFilter, AccountType, GroupKind, GroupLevel, Ledger, LedgerError, LedgerQueryService,
    LineInput, NewAccount, NewEntry,
};

fn usd(amount: Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

/// Minimal chart: a cash asset and an equity capital account
fn setup() -> (Ledger, AccountId, AccountId) {
    let mut ledger = Ledger::new(TenantId::new(), Currency::USD);

    let assets = ledger
        .create_group(GroupLevel::MainGroup, None, GroupKind::Assets)
        .unwrap();
    let current = ledger
        .create_group(GroupLevel::ElementGroup, Some(assets), GroupKind::CurrentAssets)
        .unwrap();
    let current_sub = ledger
        .create_group(
            GroupLevel::SubElementGroup,
            Some(current),
            GroupKind::CurrentAssets,
        )
        .unwrap();
    let cash_group = ledger
        .create_group(
            GroupLevel::DetailedGroup,
            Some(current_sub),
            GroupKind::CashInHand,
        )
        .unwrap();
    let cash = ledger
        .create_account(cash_group, NewAccount::new("Cash", usd(dec!(0))))
        .unwrap();

    let equity = ledger
        .create_group(GroupLevel::MainGroup, None, GroupKind::Equity)
        .unwrap();
    let equity_el = ledger
        .create_group(
            GroupLevel::ElementGroup,
            Some(equity),
            GroupKind::Custom("Owner Equity".to_string()),
        )
        .unwrap();
    let equity_sub = ledger
        .create_group(
            GroupLevel::SubElementGroup,
            Some(equity_el),
            GroupKind::Custom("Owner Equity".to_string()),
        )
        .unwrap();
    let capital_group = ledger
        .create_group(
            GroupLevel::DetailedGroup,
            Some(equity_sub),
            GroupKind::Custom("Capital".to_string()),
        )
        .unwrap();
    let capital = ledger
        .create_account(capital_group, NewAccount::new("Owner Capital", usd(dec!(0))))
        .unwrap();

    (ledger, cash, capital)
}

fn entry_on(day: u32) -> NewEntry {
    NewEntry::new(
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
        "manual",
        format!("entry on day {day}"),
        UserId::new(),
    )
    .posted()
}

#[test]
fn test_failed_entry_leaves_no_partial_state() {
    let (mut ledger, cash, _) = setup();
    let err = ledger
        .create_entry(
            entry_on(1),
            vec![
                LineInput::debit(cash, usd(dec!(100))),
                LineInput::credit(AccountId::new(), usd(dec!(100))),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
    assert_eq!(ledger.account(cash).unwrap().current_balance.amount(), dec!(0));

    let page = LedgerQueryService::get_ledger(&ledger, cash, PageRequest::default()).unwrap();
    assert!(page.rows.is_empty());
}

#[test]
fn test_opening_balance_feeds_running_balance() {
    let mut ledger = Ledger::new(TenantId::new(), Currency::USD);
    let assets = ledger
        .create_group(GroupLevel::MainGroup, None, GroupKind::Assets)
        .unwrap();
    let el = ledger
        .create_group(GroupLevel::ElementGroup, Some(assets), GroupKind::CurrentAssets)
        .unwrap();
    let sub = ledger
        .create_group(GroupLevel::SubElementGroup, Some(el), GroupKind::CurrentAssets)
        .unwrap();
    let detailed = ledger
        .create_group(GroupLevel::DetailedGroup, Some(sub), GroupKind::BankAccounts)
        .unwrap();
    let bank = ledger
        .create_account(detailed, NewAccount::new("Main Bank", usd(dec!(2500))))
        .unwrap();

    assert_eq!(
        ledger.account(bank).unwrap().current_balance.amount(),
        dec!(2500)
    );
    let page = LedgerQueryService::get_ledger(&ledger, bank, PageRequest::default()).unwrap();
    assert_eq!(page.opening_balance.amount(), dec!(2500));
    assert_eq!(page.running_balance.amount(), dec!(2500));
}

#[test]
fn test_delete_group_blocked_by_children_and_accounts() {
    let (mut ledger, cash, _) = setup();
    let cash_group = ledger.account(cash).unwrap().detailed_group_id;

    // Detailed group still holds an account
    let err = ledger.delete_group(cash_group).unwrap_err();
    assert!(matches!(err, LedgerError::Constraint(_)));

    // A parent with children cannot be deleted either
    let parent = ledger.group(cash_group).unwrap().parent_id.unwrap();
    let err = ledger.delete_group(parent).unwrap_err();
    assert!(matches!(err, LedgerError::Constraint(_)));

    // Once the account is gone the leaf group can be removed
    ledger.delete_account(cash).unwrap();
    ledger.delete_group(cash_group).unwrap();
}

#[test]
fn test_deleting_entry_releases_account_for_deletion() {
    let (mut ledger, cash, capital) = setup();
    let entry_id = ledger
        .create_entry(
            entry_on(1),
            vec![
                LineInput::debit(cash, usd(dec!(100))),
                LineInput::credit(capital, usd(dec!(100))),
            ],
        )
        .unwrap();

    ledger.delete_entry(entry_id).unwrap();
    assert_eq!(ledger.account(cash).unwrap().current_balance.amount(), dec!(0));
    ledger.delete_account(cash).unwrap();
}

#[test]
fn test_list_accounts_filters_by_name_and_type() {
    let (ledger, _, _) = setup();
    let filter = AccountFilter {
        name_contains: Some("cash".to_string()),
        ..AccountFilter::default()
    };
    let matches = LedgerQueryService::list_accounts(&ledger, &filter);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name, "Cash");

    let filter = AccountFilter {
        account_type: Some(AccountType::Equity),
        ..AccountFilter::default()
    };
    let equity = LedgerQueryService::list_accounts(&ledger, &filter);
    assert_eq!(equity.len(), 1);
    assert_eq!(equity[0].name, "Owner Capital");
}

#[test]
fn test_trial_balance_flips_negative_balances() {
    let (mut ledger, cash, capital) = setup();
    // Credit the asset without a prior debit: its balance goes negative
    ledger
        .create_entry(
            entry_on(2),
            vec![
                LineInput::debit(capital, usd(dec!(75))),
                LineInput::credit(cash, usd(dec!(75))),
            ],
        )
        .unwrap();

    let trial = LedgerQueryService::trial_balance(&ledger);
    assert!(trial.is_balanced);

    let cash_row = trial
        .entries
        .iter()
        .find(|r| r.account_id == cash)
        .unwrap();
    assert!(cash_row.debit.is_zero());
    assert_eq!(cash_row.credit.amount(), dec!(75));
}

#[test]
fn test_trial_balance_serializes_for_reporting() {
    let (mut ledger, cash, capital) = setup();
    ledger
        .create_entry(
            entry_on(3),
            vec![
                LineInput::debit(cash, usd(dec!(100))),
                LineInput::credit(capital, usd(dec!(100))),
            ],
        )
        .unwrap();

    let trial = LedgerQueryService::trial_balance(&ledger);
    let value = serde_json::to_value(&trial).unwrap();
    assert_eq!(value["is_balanced"], serde_json::json!(true));
    assert_eq!(value["entries"].as_array().unwrap().len(), 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Opening + sum of signed movements always equals the cached balance,
    // and the book as a whole stays in balance
    #[test]
    fn balance_equation_holds_over_random_postings(
        amounts in proptest::collection::vec(1i64..1_000_000i64, 1..12)
    ) {
        let (mut ledger, cash, capital) = setup();
        let mut expected = Decimal::ZERO;

        for (i, minor) in amounts.iter().enumerate() {
            let amount = Money::from_minor(*minor, Currency::USD);
            let day = (i % 27) as u32 + 1;
            ledger
                .create_entry(
                    entry_on(day),
                    vec![
                        LineInput::debit(cash, amount),
                        LineInput::credit(capital, amount),
                    ],
                )
                .unwrap();
            expected += amount.amount();
        }

        prop_assert_eq!(ledger.account(cash).unwrap().current_balance.amount(), expected);
        prop_assert_eq!(ledger.account(capital).unwrap().current_balance.amount(), expected);

        let trial = LedgerQueryService::trial_balance(&ledger);
        prop_assert!(trial.is_balanced);

        // The full ledger view agrees with the cached balance
        let page = LedgerQueryService::get_ledger(
            &ledger,
            cash,
            PageRequest::new(1, amounts.len() as u32),
        ).unwrap();
        prop_assert_eq!(page.running_balance.amount(), expected);
    }
}
