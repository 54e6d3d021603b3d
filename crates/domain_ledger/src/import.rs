//! Bulk account import
//!
//! Administrative batch creation of accounts from spreadsheet-style rows.
//! Each row names its four-level group path; groups are resolved or
//! created per row with the same fallback semantics as the resolver, and
//! a group created by one row is reused by later rows naming it. Rows
//! fail independently; the batch never aborts.

use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{AccountId, GroupNodeId, Money};

use crate::account::NewAccount;
use crate::error::LedgerError;
use crate::hierarchy::{GroupKind, GroupLevel};
use crate::ledger::Ledger;

/// One row of a bulk import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRow {
    pub account_name: String,
    pub main_group: String,
    pub element_group: String,
    pub sub_element_group: String,
    pub detailed_group: String,
    pub description: Option<String>,
    pub opening_balance: Money,
}

/// Result of importing one row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RowOutcome {
    Created { account_id: AccountId, code: String },
    Failed { reason: String },
}

/// Per-row report for the whole batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowReport {
    pub row_index: usize,
    pub account_name: String,
    pub outcome: RowOutcome,
}

impl RowReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, RowOutcome::Created { .. })
    }
}

/// Applies bulk imports against a tenant ledger
pub struct AccountImporter;

impl AccountImporter {
    /// Imports rows one at a time, reporting per-row success or failure
    pub fn import(ledger: &mut Ledger, rows: &[ImportRow]) -> Vec<RowReport> {
        rows.iter()
            .enumerate()
            .map(|(row_index, row)| {
                let outcome = match Self::import_row(ledger, row) {
                    Ok((account_id, code)) => RowOutcome::Created { account_id, code },
                    Err(err) => RowOutcome::Failed {
                        reason: err.to_string(),
                    },
                };
                RowReport {
                    row_index,
                    account_name: row.account_name.clone(),
                    outcome,
                }
            })
            .collect()
    }

    fn import_row(
        ledger: &mut Ledger,
        row: &ImportRow,
    ) -> Result<(AccountId, String), LedgerError> {
        for (label, name) in [
            ("account name", &row.account_name),
            ("main group", &row.main_group),
            ("element group", &row.element_group),
            ("sub-element group", &row.sub_element_group),
            ("detailed group", &row.detailed_group),
        ] {
            if name.trim().is_empty() {
                return Err(LedgerError::constraint(format!("{label} must not be empty")));
            }
        }

        let main = Self::resolve_group(ledger, GroupLevel::MainGroup, None, &row.main_group)?;
        let element =
            Self::resolve_group(ledger, GroupLevel::ElementGroup, Some(main), &row.element_group)?;
        let sub = Self::resolve_group(
            ledger,
            GroupLevel::SubElementGroup,
            Some(element),
            &row.sub_element_group,
        )?;
        let detailed = Self::resolve_group(
            ledger,
            GroupLevel::DetailedGroup,
            Some(sub),
            &row.detailed_group,
        )?;

        let name = row.account_name.trim();
        let duplicate = ledger
            .accounts_by_group
            .get(&detailed)
            .is_some_and(|ids| {
                ids.iter().any(|id| {
                    ledger.accounts[id].name.eq_ignore_ascii_case(name)
                })
            });
        if duplicate {
            return Err(LedgerError::DuplicateCode(format!(
                "account '{name}' already exists under '{}'",
                row.detailed_group.trim()
            )));
        }

        let mut account = NewAccount::new(name, row.opening_balance);
        if let Some(description) = &row.description {
            account = account.with_description(description.clone());
        }
        let account_id = ledger.create_account(detailed, account)?;
        let code = ledger.account(account_id)?.code.clone();
        debug!(account = %account_id, %code, "imported account");
        Ok((account_id, code))
    }

    /// Finds a group by name under the parent, creating it when absent
    fn resolve_group(
        ledger: &mut Ledger,
        level: GroupLevel,
        parent_id: Option<GroupNodeId>,
        name: &str,
    ) -> Result<GroupNodeId, LedgerError> {
        let kind = GroupKind::from_name(name);
        let siblings: &[GroupNodeId] = match parent_id {
            Some(pid) => ledger
                .children
                .get(&pid)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            None => ledger.roots.as_slice(),
        };

        let trimmed = name.trim();
        let existing = siblings.iter().copied().find(|id| {
            let node = &ledger.groups[id];
            node.kind == kind || node.kind.display_name().eq_ignore_ascii_case(trimmed)
        });
        match existing {
            Some(id) => Ok(id),
            None => ledger.create_group(level, parent_id, kind),
        }
    }
}
