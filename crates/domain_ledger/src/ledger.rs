//! The per-tenant ledger aggregate
//!
//! One `Ledger` owns a tenant's entire chart of accounts and journal
//! book: the group hierarchy, the accounts, the entries with their lines,
//! and the indexes that make lookups O(1) instead of full scans.
//!
//! # Invariants
//!
//! - Every accepted entry balances: |sum(debits) - sum(credits)| <= 0.0001
//! - `Account::current_balance` equals the opening balance plus the signed
//!   movement of every line touching the account
//! - At most one journal entry per `(source document, id)` pair
//! - Write operations validate completely before mutating, so a failed
//!   operation leaves the aggregate untouched
//!
//! Tenant scoping and write serialization come from ownership: all
//! operations take `&mut self` on the tenant's aggregate, so no two
//! postings for the same tenant can interleave.

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};
use uuid::Uuid;

use core_kernel::{
    AccountId, Currency, GroupNodeId, JournalEntryId, JournalLineId, Money, MoneyError, TenantId,
};

use crate::account::{Account, AccountType, NewAccount};
use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::hierarchy::{custom_code_tail, AccountGroupNode, GroupKind, GroupLevel};
use crate::journal::{
    EntryUpdate, JournalEntry, JournalEntryLine, LineInput, NewEntry, SourceDocument, BALANCE_EPSILON,
};

/// A tenant's chart of accounts and journal book
#[derive(Debug)]
pub struct Ledger {
    tenant_id: TenantId,
    currency: Currency,

    // Hierarchy arena and indexes
    pub(crate) groups: HashMap<GroupNodeId, AccountGroupNode>,
    pub(crate) children: HashMap<GroupNodeId, Vec<GroupNodeId>>,
    pub(crate) roots: Vec<GroupNodeId>,

    // Accounts and indexes
    pub(crate) accounts: HashMap<AccountId, Account>,
    pub(crate) accounts_by_group: HashMap<GroupNodeId, Vec<AccountId>>,
    pub(crate) account_by_code: HashMap<String, AccountId>,
    pub(crate) account_by_customer: HashMap<Uuid, AccountId>,
    default_income_account: Option<AccountId>,

    // Journal book and indexes
    pub(crate) entries: HashMap<JournalEntryId, JournalEntry>,
    pub(crate) entry_by_source: HashMap<(SourceDocument, Uuid), JournalEntryId>,
    pub(crate) entries_by_account: BTreeMap<AccountId, BTreeSet<JournalEntryId>>,
    next_seq: u64,

    events: Vec<LedgerEvent>,
}

impl Ledger {
    /// Creates an empty ledger for a tenant
    pub fn new(tenant_id: TenantId, currency: Currency) -> Self {
        Self {
            tenant_id,
            currency,
            groups: HashMap::new(),
            children: HashMap::new(),
            roots: Vec::new(),
            accounts: HashMap::new(),
            accounts_by_group: HashMap::new(),
            account_by_code: HashMap::new(),
            account_by_customer: HashMap::new(),
            default_income_account: None,
            entries: HashMap::new(),
            entry_by_source: HashMap::new(),
            entries_by_account: BTreeMap::new(),
            next_seq: 0,
            events: Vec::new(),
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Hierarchy
    // ------------------------------------------------------------------

    /// Creates a group node under `parent_id` (None only for MainGroup)
    ///
    /// # Errors
    ///
    /// - `NotFound` if the parent does not exist
    /// - `Constraint` if the parent sits at the wrong level, or a custom
    ///   kind has an empty name
    /// - `DuplicateCode` if the same predefined kind already exists under
    ///   the parent
    pub fn create_group(
        &mut self,
        level: GroupLevel,
        parent_id: Option<GroupNodeId>,
        kind: GroupKind,
    ) -> Result<GroupNodeId, LedgerError> {
        if let GroupKind::Custom(name) = &kind {
            if name.trim().is_empty() {
                return Err(LedgerError::constraint(
                    "custom group requires a human-readable name",
                ));
            }
        }

        let parent_code = match (level.parent(), parent_id) {
            (None, None) => None,
            (None, Some(_)) => {
                return Err(LedgerError::constraint("main group cannot have a parent"))
            }
            (Some(_), None) => {
                return Err(LedgerError::constraint(format!(
                    "{level} requires a parent group"
                )))
            }
            (Some(expected), Some(pid)) => {
                let parent = self
                    .groups
                    .get(&pid)
                    .ok_or_else(|| LedgerError::not_found("group", pid))?;
                if parent.level != expected {
                    return Err(LedgerError::constraint(format!(
                        "parent of a {level} must be a {expected}, got a {}",
                        parent.level
                    )));
                }
                Some(parent.code.clone())
            }
        };

        if !kind.is_custom() {
            let siblings = match parent_id {
                Some(pid) => self.children.get(&pid).map(Vec::as_slice).unwrap_or(&[]),
                None => self.roots.as_slice(),
            };
            if siblings
                .iter()
                .any(|id| self.groups[id].kind == kind)
            {
                return Err(LedgerError::DuplicateCode(format!(
                    "group '{}' already exists at this level",
                    kind.display_name()
                )));
            }
        }

        let fragment = match kind.code_fragment() {
            Some(fragment) => fragment.to_string(),
            None => custom_code_tail(),
        };
        let code = match &parent_code {
            Some(parent_code) => format!("{parent_code}.{fragment}"),
            None => fragment,
        };

        let id = GroupNodeId::new_v7();
        let node = AccountGroupNode {
            id,
            tenant_id: self.tenant_id,
            parent_id,
            level,
            kind,
            code: code.clone(),
        };

        match parent_id {
            Some(pid) => self.children.entry(pid).or_default().push(id),
            None => self.roots.push(id),
        }
        self.groups.insert(id, node);

        debug!(group = %id, %code, "created account group");
        self.events.push(LedgerEvent::GroupCreated {
            group_id: id,
            level,
            code,
            timestamp: Utc::now(),
        });

        Ok(id)
    }

    /// Gets a group node by id
    pub fn group(&self, id: GroupNodeId) -> Result<&AccountGroupNode, LedgerError> {
        self.groups
            .get(&id)
            .ok_or_else(|| LedgerError::not_found("group", id))
    }

    /// Deletes a group node
    ///
    /// # Errors
    ///
    /// `Constraint` if any child group or any account still references it.
    pub fn delete_group(&mut self, id: GroupNodeId) -> Result<(), LedgerError> {
        let node = self.group(id)?;
        let level = node.level;

        if self.children.get(&id).is_some_and(|c| !c.is_empty()) {
            return Err(LedgerError::constraint(format!(
                "cannot delete {level}: child groups exist"
            )));
        }
        if self
            .accounts_by_group
            .get(&id)
            .is_some_and(|a| !a.is_empty())
        {
            return Err(LedgerError::constraint(format!(
                "cannot delete {level}: accounts still reference it"
            )));
        }

        let node = self.groups.remove(&id).expect("checked above");
        match node.parent_id {
            Some(pid) => {
                if let Some(siblings) = self.children.get_mut(&pid) {
                    siblings.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }
        self.children.remove(&id);
        self.accounts_by_group.remove(&id);

        Ok(())
    }

    /// Walks a node's ancestry up to its MainGroup
    pub(crate) fn main_ancestor<'a>(
        &'a self,
        mut node: &'a AccountGroupNode,
    ) -> &'a AccountGroupNode {
        while let Some(parent_id) = node.parent_id {
            match self.groups.get(&parent_id) {
                Some(parent) => node = parent,
                None => break,
            }
        }
        node
    }

    /// Derives the account type from the MainGroup ancestry
    fn derive_account_type(&self, group: &AccountGroupNode) -> Result<AccountType, LedgerError> {
        let main = self.main_ancestor(group);
        let account_type = match &main.kind {
            GroupKind::Assets => AccountType::Asset,
            GroupKind::Liabilities => AccountType::Liability,
            GroupKind::Equity => AccountType::Equity,
            GroupKind::Income => AccountType::Revenue,
            GroupKind::Expenses => AccountType::Expense,
            GroupKind::Custom(name) => {
                let lower = name.to_lowercase();
                if lower.contains("asset") {
                    AccountType::Asset
                } else if lower.contains("liabilit") {
                    AccountType::Liability
                } else if lower.contains("equity") || lower.contains("capital") {
                    AccountType::Equity
                } else if lower.contains("income") || lower.contains("revenue") {
                    AccountType::Revenue
                } else if lower.contains("expense") {
                    AccountType::Expense
                } else {
                    return Err(LedgerError::constraint(format!(
                        "cannot derive account type from main group '{name}'"
                    )));
                }
            }
            other => {
                return Err(LedgerError::constraint(format!(
                    "main group kind '{}' does not map to an account type",
                    other.display_name()
                )))
            }
        };
        Ok(account_type)
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    /// Creates an account under a DetailedGroup
    ///
    /// The account code defaults to `{group code}.{NNN}` where NNN is the
    /// count of accounts already under the group, zero-padded to 3 digits
    /// (bumped past collisions left by deletions).
    pub fn create_account(
        &mut self,
        detailed_group_id: GroupNodeId,
        new: NewAccount,
    ) -> Result<AccountId, LedgerError> {
        let group = self.group(detailed_group_id)?;
        if group.level != GroupLevel::DetailedGroup {
            return Err(LedgerError::constraint(format!(
                "accounts can only be created under a detailed group, got a {}",
                group.level
            )));
        }
        if new.name.trim().is_empty() {
            return Err(LedgerError::constraint("account name must not be empty"));
        }
        if new.opening_balance.currency() != self.currency {
            return Err(LedgerError::Money(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                new.opening_balance.currency().to_string(),
            )));
        }

        let account_type = self.derive_account_type(group)?;
        let group_code = group.code.clone();

        let code = match new.code_hint {
            Some(code) => {
                if self.account_by_code.contains_key(&code) {
                    return Err(LedgerError::DuplicateCode(code));
                }
                code
            }
            None => {
                let mut seq = self
                    .accounts_by_group
                    .get(&detailed_group_id)
                    .map_or(0, Vec::len);
                let mut code = format!("{group_code}.{seq:03}");
                while self.account_by_code.contains_key(&code) {
                    seq += 1;
                    code = format!("{group_code}.{seq:03}");
                }
                code
            }
        };

        let opening = new.opening_balance;
        let id = AccountId::new_v7();
        let account = Account {
            id,
            tenant_id: self.tenant_id,
            detailed_group_id,
            code: code.clone(),
            name: new.name.trim().to_string(),
            account_type,
            is_system_account: new.is_system_account,
            is_active: true,
            opening_balance: opening,
            current_balance: opening,
            linked_customer: new.linked_customer,
            description: new.description,
        };

        if let Some(customer_id) = new.linked_customer {
            self.account_by_customer.insert(customer_id.into(), id);
        }
        self.account_by_code.insert(code.clone(), id);
        self.accounts_by_group
            .entry(detailed_group_id)
            .or_default()
            .push(id);
        self.accounts.insert(id, account);

        info!(account = %id, %code, ?account_type, "created account");
        self.events.push(LedgerEvent::AccountCreated {
            account_id: id,
            code,
            account_type,
            auto_provisioned: new.auto_provisioned,
            timestamp: Utc::now(),
        });

        Ok(id)
    }

    /// Gets an account by id
    pub fn account(&self, id: AccountId) -> Result<&Account, LedgerError> {
        self.accounts
            .get(&id)
            .ok_or_else(|| LedgerError::not_found("account", id))
    }

    /// Renames an account
    ///
    /// # Errors
    ///
    /// `SystemAccountProtection` for system accounts.
    pub fn rename_account(
        &mut self,
        id: AccountId,
        name: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| LedgerError::not_found("account", id))?;
        if account.is_system_account {
            return Err(LedgerError::SystemAccountProtection(format!(
                "account '{}' cannot be renamed",
                account.name
            )));
        }
        account.name = name.into();
        Ok(())
    }

    /// Deletes an account
    ///
    /// # Errors
    ///
    /// - `SystemAccountProtection` for system accounts
    /// - `Constraint` if any journal line references the account, posted
    ///   or draft
    pub fn delete_account(&mut self, id: AccountId) -> Result<(), LedgerError> {
        let account = self.account(id)?;
        if account.is_system_account {
            return Err(LedgerError::SystemAccountProtection(format!(
                "account '{}' cannot be deleted",
                account.name
            )));
        }
        if self
            .entries_by_account
            .get(&id)
            .is_some_and(|e| !e.is_empty())
        {
            return Err(LedgerError::constraint(
                "cannot delete account: journal lines reference it",
            ));
        }

        let account = self.accounts.remove(&id).expect("checked above");
        self.account_by_code.remove(&account.code);
        if let Some(customer_id) = account.linked_customer {
            self.account_by_customer.remove(customer_id.as_uuid());
        }
        if let Some(ids) = self.accounts_by_group.get_mut(&account.detailed_group_id) {
            ids.retain(|a| *a != id);
        }
        self.entries_by_account.remove(&id);
        if self.default_income_account == Some(id) {
            self.default_income_account = None;
        }

        Ok(())
    }

    /// Links an existing account to a customer for direct lookup
    pub(crate) fn link_account_to_customer(&mut self, id: AccountId, customer: Uuid) {
        if let Some(account) = self.accounts.get_mut(&id) {
            account.linked_customer = Some(customer.into());
            self.account_by_customer.insert(customer, id);
        }
    }

    /// Sets the default income account used when the caller supplies none
    ///
    /// # Errors
    ///
    /// `Constraint` unless the account exists and is revenue-typed.
    pub fn set_default_income_account(&mut self, id: AccountId) -> Result<(), LedgerError> {
        let account = self.account(id)?;
        if account.account_type != AccountType::Revenue {
            return Err(LedgerError::constraint(format!(
                "default income account must be revenue-typed, '{}' is {:?}",
                account.name, account.account_type
            )));
        }
        self.default_income_account = Some(id);
        Ok(())
    }

    pub fn default_income_account(&self) -> Option<AccountId> {
        self.default_income_account
    }

    /// All accounts, unordered
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// All group nodes, unordered
    pub fn groups(&self) -> impl Iterator<Item = &AccountGroupNode> {
        self.groups.values()
    }

    /// Detailed groups in creation order, depth-first from the roots
    ///
    /// This is the deterministic order the resolver's fallback tiers
    /// search in.
    pub(crate) fn detailed_groups_in_creation_order(&self) -> Vec<GroupNodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<GroupNodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.groups.get(&id) else {
                continue;
            };
            if node.level == GroupLevel::DetailedGroup {
                out.push(id);
            }
            if let Some(children) = self.children.get(&id) {
                stack.extend(children.iter().rev().copied());
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Journal engine
    // ------------------------------------------------------------------

    /// Validates a line set and returns its (debit, credit) totals
    fn validate_lines(&self, lines: &[LineInput]) -> Result<(Decimal, Decimal), LedgerError> {
        if lines.is_empty() {
            return Err(LedgerError::constraint(
                "journal entry requires at least one line",
            ));
        }

        let mut debits = Decimal::ZERO;
        let mut credits = Decimal::ZERO;
        for line in lines {
            if !self.accounts.contains_key(&line.account_id) {
                return Err(LedgerError::not_found("account", line.account_id));
            }
            if line.debit.currency() != self.currency || line.credit.currency() != self.currency {
                return Err(LedgerError::Money(core_kernel::MoneyError::CurrencyMismatch(
                    self.currency.to_string(),
                    line.debit.currency().to_string(),
                )));
            }
            debits += line.debit.amount();
            credits += line.credit.amount();
        }

        if (debits - credits).abs() > BALANCE_EPSILON {
            return Err(LedgerError::UnbalancedEntry { debits, credits });
        }
        Ok((debits, credits))
    }

    fn build_lines(entry_id: JournalEntryId, lines: Vec<LineInput>) -> Vec<JournalEntryLine> {
        lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| JournalEntryLine {
                id: JournalLineId::new_v7(),
                entry_id,
                account_id: line.account_id,
                debit: line.debit,
                credit: line.credit,
                line_order: line.line_order.unwrap_or(i as u32 + 1),
                description: line.description,
            })
            .collect()
    }

    /// Creates a journal entry with its lines as one atomic unit
    ///
    /// Validation happens entirely before any mutation; on success the
    /// balances of every touched account are recomputed with the writes.
    ///
    /// # Errors
    ///
    /// - `Constraint` on an empty line set, or when an entry already
    ///   exists for the header's source ref
    /// - `UnbalancedEntry` when the totals differ beyond the tolerance
    /// - `NotFound` when a line references an unknown account
    pub fn create_entry(
        &mut self,
        header: NewEntry,
        lines: Vec<LineInput>,
    ) -> Result<JournalEntryId, LedgerError> {
        if let Some(source) = header.source {
            if self
                .entry_by_source
                .contains_key(&(source.document, source.id))
            {
                return Err(LedgerError::constraint(format!(
                    "a journal entry already exists for {} {}",
                    source.document, source.id
                )));
            }
        }
        let (debits, _) = self.validate_lines(&lines)?;

        let id = JournalEntryId::new_v7();
        let now = Utc::now();
        let lines = Self::build_lines(id, lines);
        let touched: BTreeSet<AccountId> = lines.iter().map(|l| l.account_id).collect();
        let total_amount = Money::new(debits, self.currency);

        let entry = JournalEntry {
            id,
            tenant_id: self.tenant_id,
            entry_date: header.entry_date,
            reference: header.reference,
            entry_type: header.entry_type,
            description: header.description,
            is_posted: header.is_posted,
            source: header.source,
            total_amount,
            lines,
            created_by: header.created_by,
            updated_by: header.created_by,
            created_at: now,
            updated_at: now,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        if let Some(source) = entry.source {
            self.entry_by_source.insert((source.document, source.id), id);
        }
        for account_id in &touched {
            self.entries_by_account
                .entry(*account_id)
                .or_default()
                .insert(id);
        }
        let source = entry.source;
        self.entries.insert(id, entry);
        self.recompute_balances(&touched);

        info!(entry = %id, total = %total_amount, "posted journal entry");
        self.events.push(LedgerEvent::EntryPosted {
            entry_id: id,
            source,
            total_amount,
            timestamp: now,
        });

        Ok(id)
    }

    /// Replaces an entry's lines in place, as one atomic unit
    ///
    /// Balances of accounts touched by either the old or the new line set
    /// are recomputed with the swap.
    pub fn replace_lines(
        &mut self,
        entry_id: JournalEntryId,
        lines: Vec<LineInput>,
    ) -> Result<(), LedgerError> {
        if !self.entries.contains_key(&entry_id) {
            return Err(LedgerError::not_found("journal entry", entry_id));
        }
        let (debits, _) = self.validate_lines(&lines)?;

        let new_lines = Self::build_lines(entry_id, lines);
        let total_amount = Money::new(debits, self.currency);
        let now = Utc::now();

        let entry = self.entries.get_mut(&entry_id).expect("checked above");
        let old_touched: BTreeSet<AccountId> = entry.lines.iter().map(|l| l.account_id).collect();
        let new_touched: BTreeSet<AccountId> = new_lines.iter().map(|l| l.account_id).collect();

        entry.lines = new_lines;
        entry.total_amount = total_amount;
        entry.updated_at = now;

        for account_id in old_touched.difference(&new_touched) {
            if let Some(ids) = self.entries_by_account.get_mut(account_id) {
                ids.remove(&entry_id);
            }
        }
        for account_id in &new_touched {
            self.entries_by_account
                .entry(*account_id)
                .or_default()
                .insert(entry_id);
        }

        let touched: BTreeSet<AccountId> = old_touched.union(&new_touched).copied().collect();
        self.recompute_balances(&touched);

        debug!(entry = %entry_id, total = %total_amount, "replaced journal entry lines");
        self.events.push(LedgerEvent::EntryReplaced {
            entry_id,
            total_amount,
            timestamp: now,
        });

        Ok(())
    }

    /// Refreshes header fields of an existing entry
    pub fn update_entry(
        &mut self,
        entry_id: JournalEntryId,
        update: EntryUpdate,
    ) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .get_mut(&entry_id)
            .ok_or_else(|| LedgerError::not_found("journal entry", entry_id))?;

        if let Some(entry_date) = update.entry_date {
            entry.entry_date = entry_date;
        }
        if let Some(reference) = update.reference {
            entry.reference = Some(reference);
        }
        if let Some(description) = update.description {
            entry.description = description;
        }
        if let Some(updated_by) = update.updated_by {
            entry.updated_by = updated_by;
        }
        entry.updated_at = Utc::now();
        Ok(())
    }

    /// Sets the posted flag
    ///
    /// Posting requires at least one line. Un-posting is a status
    /// annotation only: account balances are not reversed.
    pub fn set_posted(&mut self, entry_id: JournalEntryId, posted: bool) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .get_mut(&entry_id)
            .ok_or_else(|| LedgerError::not_found("journal entry", entry_id))?;
        if posted && entry.lines.is_empty() {
            return Err(LedgerError::constraint(
                "cannot post a journal entry without lines",
            ));
        }
        entry.is_posted = posted;
        entry.updated_at = Utc::now();
        Ok(())
    }

    /// Deletes an entry and all its lines, regardless of posted status
    pub fn delete_entry(&mut self, entry_id: JournalEntryId) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .remove(&entry_id)
            .ok_or_else(|| LedgerError::not_found("journal entry", entry_id))?;

        if let Some(source) = entry.source {
            self.entry_by_source.remove(&(source.document, source.id));
        }
        let touched: BTreeSet<AccountId> = entry.lines.iter().map(|l| l.account_id).collect();
        for account_id in &touched {
            if let Some(ids) = self.entries_by_account.get_mut(account_id) {
                ids.remove(&entry_id);
            }
        }
        self.recompute_balances(&touched);

        debug!(entry = %entry_id, "deleted journal entry");
        self.events.push(LedgerEvent::EntryDeleted {
            entry_id,
            timestamp: Utc::now(),
        });

        Ok(())
    }

    /// Gets an entry by id
    pub fn entry(&self, id: JournalEntryId) -> Result<&JournalEntry, LedgerError> {
        self.entries
            .get(&id)
            .ok_or_else(|| LedgerError::not_found("journal entry", id))
    }

    /// Finds the entry linked to a source document, if any
    pub fn find_entry_by_source(
        &self,
        document: SourceDocument,
        id: Uuid,
    ) -> Option<&JournalEntry> {
        self.entry_by_source
            .get(&(document, id))
            .and_then(|entry_id| self.entries.get(entry_id))
    }

    /// Recomputes cached balances for a set of accounts
    ///
    /// Balance = opening balance + signed movement of every line touching
    /// the account, across all entries. The posted flag does not enter
    /// the equation (un-posting an entry does not reverse balances).
    fn recompute_balances(&mut self, touched: &BTreeSet<AccountId>) {
        for account_id in touched {
            let Some(account) = self.accounts.get(account_id) else {
                continue;
            };
            let account_type = account.account_type;
            let mut balance = account.opening_balance;

            if let Some(entry_ids) = self.entries_by_account.get(account_id) {
                for entry_id in entry_ids {
                    let Some(entry) = self.entries.get(entry_id) else {
                        continue;
                    };
                    for line in &entry.lines {
                        if line.account_id == *account_id {
                            balance = balance + account_type.signed_movement(line.debit, line.credit);
                        }
                    }
                }
            }

            if let Some(account) = self.accounts.get_mut(account_id) {
                account.current_balance = balance;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::UserId;
    use rust_decimal_macros::dec;

    fn money(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn setup() -> (Ledger, GroupNodeId, AccountId, AccountId) {
        let mut ledger = Ledger::new(TenantId::new(), Currency::USD);
        let assets = ledger
            .create_group(GroupLevel::MainGroup, None, GroupKind::Assets)
            .unwrap();
        let element = ledger
            .create_group(GroupLevel::ElementGroup, Some(assets), GroupKind::CurrentAssets)
            .unwrap();
        let sub = ledger
            .create_group(
                GroupLevel::SubElementGroup,
                Some(element),
                GroupKind::CurrentAssets,
            )
            .unwrap();
        let detailed = ledger
            .create_group(GroupLevel::DetailedGroup, Some(sub), GroupKind::CashInHand)
            .unwrap();

        let cash = ledger
            .create_account(detailed, NewAccount::new("Cash", money(dec!(0))))
            .unwrap();

        let income_main = ledger
            .create_group(GroupLevel::MainGroup, None, GroupKind::Income)
            .unwrap();
        let income_el = ledger
            .create_group(
                GroupLevel::ElementGroup,
                Some(income_main),
                GroupKind::DirectIncome,
            )
            .unwrap();
        let income_sub = ledger
            .create_group(
                GroupLevel::SubElementGroup,
                Some(income_el),
                GroupKind::DirectIncome,
            )
            .unwrap();
        let income_detail = ledger
            .create_group(
                GroupLevel::DetailedGroup,
                Some(income_sub),
                GroupKind::DirectIncome,
            )
            .unwrap();
        let sales = ledger
            .create_account(income_detail, NewAccount::new("Sales", money(dec!(0))))
            .unwrap();

        (ledger, detailed, cash, sales)
    }

    fn header() -> NewEntry {
        NewEntry::new(
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            "manual",
            "test entry",
            UserId::new(),
        )
        .posted()
    }

    #[test]
    fn test_group_codes_concatenate_ancestors() {
        let (ledger, detailed, _, _) = setup();
        assert_eq!(ledger.group(detailed).unwrap().code, "AST.CA.CA.CSH");
    }

    #[test]
    fn test_account_type_derived_from_main_group() {
        let (ledger, _, cash, sales) = setup();
        assert_eq!(ledger.account(cash).unwrap().account_type, AccountType::Asset);
        assert_eq!(
            ledger.account(sales).unwrap().account_type,
            AccountType::Revenue
        );
    }

    #[test]
    fn test_account_code_sequence_pads_to_three() {
        let (mut ledger, detailed, cash, _) = setup();
        assert!(ledger.account(cash).unwrap().code.ends_with(".000"));

        let second = ledger
            .create_account(detailed, NewAccount::new("Petty Cash", money(dec!(0))))
            .unwrap();
        assert!(ledger.account(second).unwrap().code.ends_with(".001"));
    }

    #[test]
    fn test_foreign_currency_opening_balance_rejected() {
        let (mut ledger, detailed, _, _) = setup();
        let result = ledger.create_account(
            detailed,
            NewAccount::new("Euro Float", Money::new(dec!(100), Currency::EUR)),
        );
        assert!(matches!(
            result,
            Err(LedgerError::Money(MoneyError::CurrencyMismatch(_, _)))
        ));
        // The rejected account must not exist, so later postings cannot
        // trip over a mixed-currency balance
        assert_eq!(ledger.accounts().count(), 2);
    }

    #[test]
    fn test_duplicate_predefined_sibling_rejected() {
        let (mut ledger, _, _, _) = setup();
        let result = ledger.create_group(GroupLevel::MainGroup, None, GroupKind::Assets);
        assert!(matches!(result, Err(LedgerError::DuplicateCode(_))));
    }

    #[test]
    fn test_group_delete_guards() {
        let (mut ledger, detailed, cash, _) = setup();

        // Detailed group still owns an account
        let result = ledger.delete_group(detailed);
        assert!(matches!(result, Err(LedgerError::Constraint(_))));

        ledger.delete_account(cash).unwrap();
        ledger.delete_group(detailed).unwrap();
        assert!(ledger.group(detailed).is_err());
    }

    #[test]
    fn test_balanced_entry_updates_balances() {
        let (mut ledger, _, cash, sales) = setup();
        let lines = vec![
            LineInput::debit(cash, money(dec!(500))),
            LineInput::credit(sales, money(dec!(500))),
        ];
        ledger.create_entry(header(), lines).unwrap();

        assert_eq!(ledger.account(cash).unwrap().current_balance, money(dec!(500)));
        assert_eq!(ledger.account(sales).unwrap().current_balance, money(dec!(500)));
    }

    #[test]
    fn test_unbalanced_entry_rejected_without_mutation() {
        let (mut ledger, _, cash, sales) = setup();
        let lines = vec![
            LineInput::debit(cash, money(dec!(500))),
            LineInput::credit(sales, money(dec!(400))),
        ];
        let result = ledger.create_entry(header(), lines);
        assert!(matches!(
            result,
            Err(LedgerError::UnbalancedEntry { debits, credits })
                if debits == dec!(500) && credits == dec!(400)
        ));
        assert!(ledger.account(cash).unwrap().current_balance.is_zero());
        assert_eq!(ledger.entries.len(), 0);
    }

    #[test]
    fn test_epsilon_tolerance() {
        let (mut ledger, _, cash, sales) = setup();
        let lines = vec![
            LineInput::debit(cash, money(dec!(100.0001))),
            LineInput::credit(sales, money(dec!(100.0000))),
        ];
        // Exactly at the tolerance: accepted
        assert!(ledger.create_entry(header(), lines).is_ok());

        let lines = vec![
            LineInput::debit(cash, money(dec!(100.0002))),
            LineInput::credit(sales, money(dec!(100.0000))),
        ];
        assert!(matches!(
            ledger.create_entry(header(), lines),
            Err(LedgerError::UnbalancedEntry { .. })
        ));
    }

    #[test]
    fn test_line_order_assigned_sequentially() {
        let (mut ledger, _, cash, sales) = setup();
        let lines = vec![
            LineInput::debit(cash, money(dec!(10))),
            LineInput::credit(sales, money(dec!(10))),
        ];
        let id = ledger.create_entry(header(), lines).unwrap();
        let orders: Vec<u32> = ledger.entry(id).unwrap().lines.iter().map(|l| l.line_order).collect();
        assert_eq!(orders, vec![1, 2]);
    }

    #[test]
    fn test_replace_lines_recomputes_old_and_new_accounts() {
        let (mut ledger, detailed, cash, sales) = setup();
        let bank = ledger
            .create_account(detailed, NewAccount::new("Bank", money(dec!(0))))
            .unwrap();

        let id = ledger
            .create_entry(
                header(),
                vec![
                    LineInput::debit(cash, money(dec!(100))),
                    LineInput::credit(sales, money(dec!(100))),
                ],
            )
            .unwrap();

        ledger
            .replace_lines(
                id,
                vec![
                    LineInput::debit(bank, money(dec!(250))),
                    LineInput::credit(sales, money(dec!(250))),
                ],
            )
            .unwrap();

        assert!(ledger.account(cash).unwrap().current_balance.is_zero());
        assert_eq!(ledger.account(bank).unwrap().current_balance, money(dec!(250)));
        assert_eq!(ledger.account(sales).unwrap().current_balance, money(dec!(250)));
        assert_eq!(ledger.entry(id).unwrap().total_amount, money(dec!(250)));
    }

    #[test]
    fn test_unposting_does_not_reverse_balances() {
        // Pinned behavior: "draft" is a status annotation only.
        let (mut ledger, _, cash, sales) = setup();
        let id = ledger
            .create_entry(
                header(),
                vec![
                    LineInput::debit(cash, money(dec!(75))),
                    LineInput::credit(sales, money(dec!(75))),
                ],
            )
            .unwrap();

        ledger.set_posted(id, false).unwrap();
        assert!(!ledger.entry(id).unwrap().is_posted);
        assert_eq!(ledger.account(cash).unwrap().current_balance, money(dec!(75)));
        assert_eq!(ledger.account(sales).unwrap().current_balance, money(dec!(75)));
    }

    #[test]
    fn test_delete_entry_cascades_and_recomputes() {
        let (mut ledger, _, cash, sales) = setup();
        let id = ledger
            .create_entry(
                header(),
                vec![
                    LineInput::debit(cash, money(dec!(75))),
                    LineInput::credit(sales, money(dec!(75))),
                ],
            )
            .unwrap();

        ledger.delete_entry(id).unwrap();
        assert!(ledger.entry(id).is_err());
        assert!(ledger.account(cash).unwrap().current_balance.is_zero());
        assert!(ledger.account(sales).unwrap().current_balance.is_zero());
    }

    #[test]
    fn test_account_delete_blocked_by_lines() {
        let (mut ledger, _, cash, sales) = setup();
        let id = ledger
            .create_entry(
                header(),
                vec![
                    LineInput::debit(cash, money(dec!(75))),
                    LineInput::credit(sales, money(dec!(75))),
                ],
            )
            .unwrap();

        assert!(matches!(
            ledger.delete_account(cash),
            Err(LedgerError::Constraint(_))
        ));

        // Draft status makes no difference
        ledger.set_posted(id, false).unwrap();
        assert!(matches!(
            ledger.delete_account(cash),
            Err(LedgerError::Constraint(_))
        ));
    }

    #[test]
    fn test_source_ref_uniqueness_enforced() {
        let (mut ledger, _, cash, sales) = setup();
        let invoice_id = core_kernel::InvoiceId::new();
        let source = crate::journal::SourceRef::invoice(invoice_id);

        let lines = || {
            vec![
                LineInput::debit(cash, money(dec!(10))),
                LineInput::credit(sales, money(dec!(10))),
            ]
        };
        ledger
            .create_entry(header().with_source(source), lines())
            .unwrap();
        let result = ledger.create_entry(header().with_source(source), lines());
        assert!(matches!(result, Err(LedgerError::Constraint(_))));
    }

    #[test]
    fn test_system_account_protection() {
        let (mut ledger, detailed, _, _) = setup();
        let id = ledger
            .create_account(detailed, NewAccount::new("Opening Balances", money(dec!(0))).system())
            .unwrap();

        assert!(matches!(
            ledger.rename_account(id, "Renamed"),
            Err(LedgerError::SystemAccountProtection(_))
        ));
        assert!(matches!(
            ledger.delete_account(id),
            Err(LedgerError::SystemAccountProtection(_))
        ));
    }

    #[test]
    fn test_events_emitted_for_entry_lifecycle() {
        let (mut ledger, _, cash, sales) = setup();
        ledger.take_events(); // discard setup events

        let id = ledger
            .create_entry(
                header(),
                vec![
                    LineInput::debit(cash, money(dec!(10))),
                    LineInput::credit(sales, money(dec!(10))),
                ],
            )
            .unwrap();
        ledger
            .replace_lines(
                id,
                vec![
                    LineInput::debit(cash, money(dec!(20))),
                    LineInput::credit(sales, money(dec!(20))),
                ],
            )
            .unwrap();
        ledger.delete_entry(id).unwrap();

        let events = ledger.take_events();
        assert!(matches!(events[0], LedgerEvent::EntryPosted { .. }));
        assert!(matches!(events[1], LedgerEvent::EntryReplaced { .. }));
        assert!(matches!(events[2], LedgerEvent::EntryDeleted { .. }));
        assert!(ledger.take_events().is_empty());
    }
}
