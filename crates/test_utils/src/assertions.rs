//! Custom Test Assertions
//!
//! Specialized assertion helpers for domain types that give more
//! meaningful error messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::{AccountId, Money};
use domain_ledger::{JournalEntry, Ledger, LedgerQueryService};

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies differ or the amounts differ by more than
/// `tolerance`.
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a journal entry's debits equal its credits
pub fn assert_entry_balanced(entry: &JournalEntry) {
    let debits: Decimal = entry.lines.iter().map(|l| l.debit.amount()).sum();
    let credits: Decimal = entry.lines.iter().map(|l| l.credit.amount()).sum();
    assert_eq!(
        debits, credits,
        "Entry {} is unbalanced: debits={}, credits={}",
        entry.id, debits, credits
    );
}

/// Asserts an account's current balance
pub fn assert_account_balance(ledger: &Ledger, account_id: AccountId, expected: Decimal) {
    let account = ledger.account(account_id).expect("account exists");
    assert_eq!(
        account.current_balance.amount(),
        expected,
        "Account '{}' balance mismatch: actual={}, expected={}",
        account.name,
        account.current_balance.amount(),
        expected
    );
}

/// Asserts the trial balance is in balance across the whole ledger
pub fn assert_trial_balance_balanced(ledger: &Ledger) {
    let trial = LedgerQueryService::trial_balance(ledger);
    assert!(
        trial.is_balanced,
        "Trial balance out of balance: debits={}, credits={}",
        trial.total_debits, trial.total_credits
    );
}
