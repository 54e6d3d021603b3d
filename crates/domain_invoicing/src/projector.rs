//! Invoice posting projector
//!
//! Maps invoice lifecycle events onto journal engine calls. The projector
//! never duplicates entries: each invoice maps to at most one journal
//! entry via its source ref, found and replaced on re-approval or edit.
//!
//! Failure semantics: a missing required account aborts the whole
//! transition with every gap listed at once; an unbalanced computed line
//! set is a programming error and surfaces as an internal error, not a
//! user-facing validation failure.

use tracing::{info, warn};

use core_kernel::{AccountId, JournalEntryId, Money, UserId};
use domain_ledger::{
    AccountResolver, AccountRole, EntryUpdate, Ledger, LedgerError, LineInput, MissingAccount,
    NewEntry, SourceDocument, SourceRef,
};

use crate::error::InvoicingError;
use crate::invoice::{Invoice, InvoiceField};
use crate::payment::Payment;

/// Prefix marking the linked entry of an invoice reopened to draft
///
/// Reverting to draft annotates the entry's description; it does not
/// delete or reverse the entry.
pub const DRAFT_ANNOTATION: &str = "[draft] ";

/// Collects missing-account gaps across several resolutions so the
/// caller sees all of them at once instead of one at a time
#[derive(Default)]
struct MissingCollector {
    missing: Vec<MissingAccount>,
}

impl MissingCollector {
    fn resolve(
        &mut self,
        ledger: &mut Ledger,
        role: &AccountRole,
    ) -> Result<Option<AccountId>, InvoicingError> {
        match AccountResolver::resolve(ledger, role) {
            Ok(id) => Ok(Some(id)),
            Err(LedgerError::MissingAccounts(mut gaps)) => {
                self.missing.append(&mut gaps);
                Ok(None)
            }
            Err(other) => Err(other.into()),
        }
    }

    fn finish(self) -> Result<(), InvoicingError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            warn!(gaps = self.missing.len(), "posting aborted by missing accounts");
            Err(LedgerError::MissingAccounts(self.missing).into())
        }
    }
}

/// An unbalanced line set computed by the projector can only be a bug in
/// the projection formula, so it is reclassified as internal
fn classify(err: LedgerError) -> InvoicingError {
    match err {
        LedgerError::UnbalancedEntry { debits, credits } => LedgerError::Internal(format!(
            "computed invoice posting is unbalanced: debits={debits}, credits={credits}"
        ))
        .into(),
        other => other.into(),
    }
}

/// Projects invoice lifecycle events into the ledger
pub struct InvoicePostingProjector;

impl InvoicePostingProjector {
    /// Invoice approval (or re-approval after an edit)
    ///
    /// Resolves the receivable, income, tax and discount accounts, builds
    /// the balanced line set and finds-or-creates the invoice's journal
    /// entry, replacing its lines when it already exists.
    ///
    /// # Errors
    ///
    /// `Ledger(MissingAccounts)` listing every unresolvable account; the
    /// invoice keeps its prior status and nothing is posted.
    pub fn on_invoice_approved(
        ledger: &mut Ledger,
        invoice: &Invoice,
        selected_income_account: Option<AccountId>,
        actor: UserId,
    ) -> Result<JournalEntryId, InvoicingError> {
        Self::post_invoice(ledger, invoice, selected_income_account, actor)
    }

    /// Invoice edited while linked to an existing entry
    ///
    /// When a posting-relevant amount changed and a linked entry exists,
    /// its lines are replaced in place; otherwise this is a no-op.
    pub fn on_invoice_edited(
        ledger: &mut Ledger,
        invoice: &Invoice,
        changed_fields: &[InvoiceField],
        actor: UserId,
    ) -> Result<Option<JournalEntryId>, InvoicingError> {
        if !changed_fields.iter().any(|f| f.affects_posting()) {
            return Ok(None);
        }
        if ledger
            .find_entry_by_source(SourceDocument::Invoice, invoice.id.into())
            .is_none()
        {
            return Ok(None);
        }
        Self::post_invoice(ledger, invoice, None, actor).map(Some)
    }

    /// Invoice reverted to draft
    ///
    /// Annotates the linked entry's description; the entry is neither
    /// deleted nor reversed, and the annotation is idempotent so a
    /// revert/re-approve round trip leaves no accumulated artifacts.
    pub fn on_invoice_reverted_to_draft(
        ledger: &mut Ledger,
        invoice: &Invoice,
        actor: UserId,
    ) -> Result<(), InvoicingError> {
        let Some(entry) =
            ledger.find_entry_by_source(SourceDocument::Invoice, invoice.id.into())
        else {
            return Ok(());
        };
        if entry.description.starts_with(DRAFT_ANNOTATION) {
            return Ok(());
        }

        let entry_id = entry.id;
        let description = format!("{DRAFT_ANNOTATION}{}", entry.description);
        ledger.update_entry(
            entry_id,
            EntryUpdate {
                description: Some(description),
                updated_by: Some(actor),
                ..EntryUpdate::default()
            },
        )?;
        Ok(())
    }

    /// Payment received against an invoice
    ///
    /// Independent of the invoice's approval entry: creates a new journal
    /// entry debiting the cash/bank account selected by payment method
    /// and crediting the customer's receivable.
    pub fn on_payment_recorded(
        ledger: &mut Ledger,
        invoice: &Invoice,
        payment: &Payment,
        actor: UserId,
    ) -> Result<JournalEntryId, InvoicingError> {
        let mut collector = MissingCollector::default();
        let settlement = collector.resolve(
            ledger,
            &AccountRole::CashOrBank {
                channel: payment.method.settlement_channel(),
            },
        )?;
        let receivable = collector.resolve(
            ledger,
            &AccountRole::CustomerReceivable {
                customer_id: invoice.customer_id,
                customer_name: invoice.customer_name.clone(),
            },
        )?;
        collector.finish()?;
        let (Some(settlement), Some(receivable)) = (settlement, receivable) else {
            return Err(LedgerError::Internal("account resolution yielded no id".into()).into());
        };

        let description = format!("Payment for invoice {}", invoice.invoice_number);
        let mut header = NewEntry::new(payment.received_on, "payment", description, actor)
            .posted()
            .with_source(SourceRef::payment(payment.id));
        if let Some(reference) = &payment.reference {
            header = header.with_reference(reference.clone());
        }

        let lines = vec![
            LineInput::debit(settlement, payment.amount),
            LineInput::credit(receivable, payment.amount),
        ];
        let entry_id = ledger.create_entry(header, lines).map_err(classify)?;
        info!(invoice = %invoice.id, payment = %payment.id, entry = %entry_id, "payment posted");
        Ok(entry_id)
    }

    /// Shared posting path for approval and amount-changing edits
    fn post_invoice(
        ledger: &mut Ledger,
        invoice: &Invoice,
        selected_income_account: Option<AccountId>,
        actor: UserId,
    ) -> Result<JournalEntryId, InvoicingError> {
        let income_selection = selected_income_account.or(invoice.income_account);
        let has_tax = invoice.tax_amount.is_positive();
        let has_discount = !invoice.discount_amount.is_zero();

        let mut collector = MissingCollector::default();
        let receivable = collector.resolve(
            ledger,
            &AccountRole::CustomerReceivable {
                customer_id: invoice.customer_id,
                customer_name: invoice.customer_name.clone(),
            },
        )?;
        let income = collector.resolve(
            ledger,
            &AccountRole::Income {
                selected: income_selection,
            },
        )?;
        let tax = if has_tax {
            collector.resolve(ledger, &AccountRole::TaxPayable)?
        } else {
            None
        };
        let discount = if has_discount {
            collector.resolve(ledger, &AccountRole::DiscountAllowed)?
        } else {
            None
        };
        collector.finish()?;
        let (Some(receivable), Some(income)) = (receivable, income) else {
            return Err(LedgerError::Internal("account resolution yielded no id".into()).into());
        };

        let lines = Self::build_lines(invoice, receivable, income, tax, discount);
        let description = format!(
            "Invoice {} - {}",
            invoice.invoice_number, invoice.customer_name
        );

        let existing = ledger
            .find_entry_by_source(SourceDocument::Invoice, invoice.id.into())
            .map(|entry| entry.id);
        let entry_id = match existing {
            Some(entry_id) => {
                ledger.replace_lines(entry_id, lines).map_err(classify)?;
                ledger.update_entry(
                    entry_id,
                    EntryUpdate {
                        entry_date: Some(invoice.invoice_date),
                        description: Some(description),
                        updated_by: Some(actor),
                        ..EntryUpdate::default()
                    },
                )?;
                entry_id
            }
            None => {
                let header = NewEntry::new(
                    invoice.invoice_date,
                    "invoice-approval",
                    description,
                    actor,
                )
                .posted()
                .with_source(SourceRef::invoice(invoice.id))
                .with_reference(invoice.invoice_number.clone());
                ledger.create_entry(header, lines).map_err(classify)?
            }
        };

        info!(invoice = %invoice.id, entry = %entry_id, "invoice posting projected");
        Ok(entry_id)
    }

    /// The balanced line set for an invoice approval
    ///
    /// - Debit receivable: total + |discount|
    /// - Credit income: subtotal
    /// - Credit tax payable: tax (when tax > 0)
    /// - Debit discount allowed / credit receivable: |discount| (when
    ///   discount != 0)
    fn build_lines(
        invoice: &Invoice,
        receivable: AccountId,
        income: AccountId,
        tax: Option<AccountId>,
        discount: Option<AccountId>,
    ) -> Vec<LineInput> {
        let discount_amount = invoice.discount_amount.abs();
        let gross: Money = invoice.total_amount + discount_amount;

        let mut lines = vec![
            LineInput::debit(receivable, gross)
                .with_description(format!("Receivable from {}", invoice.customer_name)),
            LineInput::credit(income, invoice.subtotal),
        ];
        if let Some(tax_account) = tax {
            lines.push(LineInput::credit(tax_account, invoice.tax_amount));
        }
        if let Some(discount_account) = discount {
            lines.push(LineInput::debit(discount_account, discount_amount));
            lines.push(LineInput::credit(receivable, discount_amount));
        }
        lines
    }
}
