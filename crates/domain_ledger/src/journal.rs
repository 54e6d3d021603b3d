//! Journal entry and line types
//!
//! A journal entry is a dated, balanced set of debit/credit lines. Lines
//! are exclusively owned by their entry: deleting the entry deletes the
//! lines. The double-entry invariant (total debits equal total credits
//! within [`BALANCE_EPSILON`]) is enforced by the engine before any write.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{AccountId, InvoiceId, JournalEntryId, JournalLineId, Money, PaymentId, TenantId, UserId};

/// Tolerance for the debit/credit balance check, in currency units
pub const BALANCE_EPSILON: Decimal = dec!(0.0001);

/// The kind of business object a journal entry is projected from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceDocument {
    Invoice,
    Payment,
}

impl std::fmt::Display for SourceDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceDocument::Invoice => write!(f, "invoice"),
            SourceDocument::Payment => write!(f, "payment"),
        }
    }
}

/// Link from a journal entry back to the business object that caused it
///
/// At most one journal entry exists per source ref at a time; the
/// projector relies on this to replace lines instead of duplicating
/// entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub document: SourceDocument,
    pub id: Uuid,
}

impl SourceRef {
    pub fn invoice(id: InvoiceId) -> Self {
        Self {
            document: SourceDocument::Invoice,
            id: id.into(),
        }
    }

    pub fn payment(id: PaymentId) -> Self {
        Self {
            document: SourceDocument::Payment,
            id: id.into(),
        }
    }
}

/// A journal entry with its ordered lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier
    pub id: JournalEntryId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Entry date (business date, not creation time)
    pub entry_date: NaiveDate,
    /// External reference (document number, note)
    pub reference: Option<String>,
    /// Free-form classification, e.g. "invoice-approval", "payment", "manual"
    pub entry_type: String,
    /// Description
    pub description: String,
    /// Workflow flag; does not imply immutability or balance effect
    pub is_posted: bool,
    /// Originating business object, if any
    pub source: Option<SourceRef>,
    /// Total debit (= total credit) of the lines
    pub total_amount: Money,
    /// Ordered lines, exclusively owned by this entry
    pub lines: Vec<JournalEntryLine>,
    /// Audit fields
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Creation sequence within the tenant book, for stable ordering
    pub(crate) seq: u64,
}

/// A single line of a journal entry
///
/// By convention exactly one of debit/credit is non-zero per line; the
/// model does not forbid a no-op line with both zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntryLine {
    pub id: JournalLineId,
    pub entry_id: JournalEntryId,
    pub account_id: AccountId,
    pub debit: Money,
    pub credit: Money,
    /// 1-based, stable ordering
    pub line_order: u32,
    pub description: Option<String>,
}

/// Header input for creating a journal entry
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub entry_date: NaiveDate,
    pub reference: Option<String>,
    pub entry_type: String,
    pub description: String,
    pub is_posted: bool,
    pub source: Option<SourceRef>,
    pub created_by: UserId,
}

impl NewEntry {
    pub fn new(
        entry_date: NaiveDate,
        entry_type: impl Into<String>,
        description: impl Into<String>,
        created_by: UserId,
    ) -> Self {
        Self {
            entry_date,
            reference: None,
            entry_type: entry_type.into(),
            description: description.into(),
            is_posted: false,
            source: None,
            created_by,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_source(mut self, source: SourceRef) -> Self {
        self.source = Some(source);
        self
    }

    pub fn posted(mut self) -> Self {
        self.is_posted = true;
        self
    }
}

/// Input for one line of a create/replace operation
#[derive(Debug, Clone)]
pub struct LineInput {
    pub account_id: AccountId,
    pub debit: Money,
    pub credit: Money,
    /// Assigned sequentially starting at 1 when absent
    pub line_order: Option<u32>,
    pub description: Option<String>,
}

impl LineInput {
    /// Creates a debit line
    pub fn debit(account_id: AccountId, amount: Money) -> Self {
        Self {
            account_id,
            credit: Money::zero(amount.currency()),
            debit: amount,
            line_order: None,
            description: None,
        }
    }

    /// Creates a credit line
    pub fn credit(account_id: AccountId, amount: Money) -> Self {
        Self {
            account_id,
            debit: Money::zero(amount.currency()),
            credit: amount,
            line_order: None,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.line_order = Some(order);
        self
    }
}

/// Header fields that may be refreshed on an existing entry
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub entry_date: Option<NaiveDate>,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub updated_by: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_source_ref_constructors() {
        let invoice_id = InvoiceId::new();
        let source = SourceRef::invoice(invoice_id);
        assert_eq!(source.document, SourceDocument::Invoice);
        assert_eq!(source.id, (*invoice_id.as_uuid()));

        let payment_id = PaymentId::new();
        let source = SourceRef::payment(payment_id);
        assert_eq!(source.document, SourceDocument::Payment);
    }

    #[test]
    fn test_line_input_zeroes_the_other_side() {
        let account = AccountId::new();
        let amount = Money::new(dec!(12.50), Currency::USD);

        let debit = LineInput::debit(account, amount);
        assert!(debit.credit.is_zero());
        assert_eq!(debit.debit, amount);

        let credit = LineInput::credit(account, amount);
        assert!(credit.debit.is_zero());
        assert_eq!(credit.credit, amount);
    }

    #[test]
    fn test_source_document_display() {
        assert_eq!(SourceDocument::Invoice.to_string(), "invoice");
        assert_eq!(SourceDocument::Payment.to_string(), "payment");
    }
}
