//! Ledger read APIs
//!
//! Paginated running-balance ledger views per account, account listings
//! and the trial balance, consumed by the reporting collaborators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, GroupNodeId, JournalEntryId, Money, PageMeta, PageRequest};

use crate::account::{Account, AccountType};
use crate::error::LedgerError;
use crate::ledger::Ledger;

/// One row of an account's ledger view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRow {
    pub entry_id: JournalEntryId,
    pub entry_date: NaiveDate,
    pub entry_type: String,
    pub reference: Option<String>,
    pub description: String,
    pub debit: Money,
    pub credit: Money,
    /// Balance as of this row, accumulated from the opening balance
    pub running_balance: Money,
}

/// A page of an account's ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerView {
    pub rows: Vec<LedgerRow>,
    pub opening_balance: Money,
    /// Closing balance over the whole history, not just this page
    pub running_balance: Money,
    pub meta: PageMeta,
}

/// Filters for account listings
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub account_type: Option<AccountType>,
    pub is_active: Option<bool>,
    pub detailed_group_id: Option<GroupNodeId>,
    pub name_contains: Option<String>,
}

/// Read-only ledger queries
pub struct LedgerQueryService;

impl LedgerQueryService {
    /// Paginated running-balance ledger for one account
    ///
    /// Rows are ordered by entry date, then by creation order. The running
    /// balance starts at the opening balance and accumulates signed line
    /// movements, so page N's first row carries the correct balance
    /// brought forward.
    pub fn get_ledger(
        ledger: &Ledger,
        account_id: AccountId,
        page: PageRequest,
    ) -> Result<LedgerView, LedgerError> {
        let account = ledger.account(account_id)?;
        let account_type = account.account_type;
        let opening_balance = account.opening_balance;

        // (entry_date, seq, line_order) orders the account's movements
        let mut movements: Vec<(&crate::journal::JournalEntry, &crate::journal::JournalEntryLine)> =
            Vec::new();
        if let Some(entry_ids) = ledger.entries_by_account.get(&account_id) {
            for entry_id in entry_ids {
                let Some(entry) = ledger.entries.get(entry_id) else {
                    continue;
                };
                for line in &entry.lines {
                    if line.account_id == account_id {
                        movements.push((entry, line));
                    }
                }
            }
        }
        movements.sort_by_key(|(entry, line)| (entry.entry_date, entry.seq, line.line_order));

        let mut balance = opening_balance;
        let mut rows = Vec::with_capacity(movements.len());
        for (entry, line) in &movements {
            balance = balance + account_type.signed_movement(line.debit, line.credit);
            rows.push(LedgerRow {
                entry_id: entry.id,
                entry_date: entry.entry_date,
                entry_type: entry.entry_type.clone(),
                reference: entry.reference.clone(),
                description: line
                    .description
                    .clone()
                    .unwrap_or_else(|| entry.description.clone()),
                debit: line.debit,
                credit: line.credit,
                running_balance: balance,
            });
        }

        let total = rows.len() as u64;
        let meta = PageMeta::new(page, total);
        let paged: Vec<LedgerRow> = rows
            .into_iter()
            .skip(page.offset())
            .take(page.limit())
            .collect();

        Ok(LedgerView {
            rows: paged,
            opening_balance,
            running_balance: balance,
            meta,
        })
    }

    /// Accounts matching the filter, ordered by code
    pub fn list_accounts<'a>(ledger: &'a Ledger, filter: &AccountFilter) -> Vec<&'a Account> {
        let mut accounts: Vec<&Account> = ledger
            .accounts()
            .filter(|a| {
                filter
                    .account_type
                    .is_none_or(|t| a.account_type == t)
                    && filter.is_active.is_none_or(|active| a.is_active == active)
                    && filter
                        .detailed_group_id
                        .is_none_or(|g| a.detailed_group_id == g)
                    && filter.name_contains.as_deref().is_none_or(|needle| {
                        a.name.to_lowercase().contains(&needle.to_lowercase())
                    })
            })
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        accounts
    }

    /// Trial balance across all accounts with a non-zero balance
    pub fn trial_balance(ledger: &Ledger) -> TrialBalance {
        let currency = ledger.currency();
        let mut entries = Vec::new();
        let mut total_debits = Money::zero(currency);
        let mut total_credits = Money::zero(currency);

        for account in Self::list_accounts(ledger, &AccountFilter::default()) {
            if account.current_balance.is_zero() {
                continue;
            }
            // A positive balance sits on the account's normal side; a
            // negative balance flips to the other side.
            let magnitude = account.current_balance.abs();
            let on_normal_side = !account.current_balance.is_negative();
            let debit_side = account.account_type.is_debit_normal() == on_normal_side;
            let (debit, credit) = if debit_side {
                (magnitude, Money::zero(currency))
            } else {
                (Money::zero(currency), magnitude)
            };

            total_debits = total_debits + debit;
            total_credits = total_credits + credit;
            entries.push(TrialBalanceRow {
                account_id: account.id,
                account_code: account.code.clone(),
                account_name: account.name.clone(),
                debit,
                credit,
            });
        }

        TrialBalance {
            is_balanced: total_debits == total_credits,
            entries,
            total_debits,
            total_credits,
        }
    }
}

/// Trial balance report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalance {
    pub entries: Vec<TrialBalanceRow>,
    pub total_debits: Money,
    pub total_credits: Money,
    pub is_balanced: bool,
}

/// A single account's row in the trial balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account_id: AccountId,
    pub account_code: String,
    pub account_name: String,
    pub debit: Money,
    pub credit: Money,
}
