//! Invoice model and status machine
//!
//! Invoice statuses form a closed state machine: draft leads to approved,
//! approved leads to the post-approval statuses, and editing reopens any
//! invoice back to draft at any time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, Currency, CustomerId, InvoiceId, Money, TenantId};

use crate::error::InvoicingError;

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being drafted or reopened for editing
    Draft,
    /// Approved and projected into the ledger
    Approved,
    /// Sent to the customer
    Sent,
    /// Fully paid
    Paid,
    /// Partial payment received
    PartiallyPaid,
    /// Past its due date
    Overdue,
    /// Canceled
    Canceled,
    /// Voided
    Void,
}

impl InvoiceStatus {
    fn is_post_approval(self) -> bool {
        !matches!(self, InvoiceStatus::Draft)
    }

    /// Whether the status machine allows this transition
    ///
    /// The back-edge to draft is always allowed: editing reopens any
    /// invoice.
    pub fn can_transition_to(self, to: InvoiceStatus) -> bool {
        if to == InvoiceStatus::Draft {
            return true;
        }
        match self {
            InvoiceStatus::Draft => to == InvoiceStatus::Approved,
            from => from.is_post_approval() && to.is_post_approval(),
        }
    }
}

/// A customer invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Customer being billed
    pub customer_id: CustomerId,
    /// Customer display name, used for receivable account resolution
    pub customer_name: String,
    /// Human-readable invoice number
    pub invoice_number: String,
    /// Invoice date
    pub invoice_date: NaiveDate,
    /// Payment due date
    pub due_date: NaiveDate,
    /// Status
    pub status: InvoiceStatus,
    /// Currency
    pub currency: Currency,
    /// Sum of line amounts before tax and discount
    pub subtotal: Money,
    /// Tax charged on top of the subtotal
    pub tax_amount: Money,
    /// Discount granted; may be zero
    pub discount_amount: Money,
    /// Amount the customer owes: subtotal + tax - discount
    pub total_amount: Money,
    /// Income account chosen for this invoice, if any
    pub income_account: Option<AccountId>,
    /// Amount paid so far
    pub amount_paid: Money,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates a draft invoice
    pub fn new(
        tenant_id: TenantId,
        customer_id: CustomerId,
        customer_name: impl Into<String>,
        invoice_date: NaiveDate,
        due_date: NaiveDate,
        currency: Currency,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new_v7(),
            tenant_id,
            customer_id,
            customer_name: customer_name.into(),
            invoice_number: generate_invoice_number(),
            invoice_date,
            due_date,
            status: InvoiceStatus::Draft,
            currency,
            subtotal: Money::zero(currency),
            tax_amount: Money::zero(currency),
            discount_amount: Money::zero(currency),
            total_amount: Money::zero(currency),
            income_account: None,
            amount_paid: Money::zero(currency),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the amounts, recomputing the total
    pub fn with_amounts(mut self, subtotal: Money, tax: Money, discount: Money) -> Self {
        self.subtotal = subtotal;
        self.tax_amount = tax;
        self.discount_amount = discount;
        self.total_amount = subtotal + tax - discount.abs();
        self
    }

    /// Sets the income account for approval posting
    pub fn with_income_account(mut self, account_id: AccountId) -> Self {
        self.income_account = Some(account_id);
        self
    }

    /// Moves the invoice to a new status
    ///
    /// # Errors
    ///
    /// `InvalidStatusTransition` when the status machine forbids the move.
    pub fn transition_to(&mut self, status: InvoiceStatus) -> Result<(), InvoicingError> {
        if !self.status.can_transition_to(status) {
            return Err(InvoicingError::InvalidStatusTransition {
                from: self.status,
                to: status,
            });
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Records a payment and rolls the status forward
    pub fn record_payment(&mut self, amount: Money) {
        self.amount_paid = self.amount_paid + amount;
        self.updated_at = Utc::now();

        if self.amount_paid.amount() >= self.total_amount.amount() {
            self.status = InvoiceStatus::Paid;
        } else if self.amount_paid.is_positive() {
            self.status = InvoiceStatus::PartiallyPaid;
        }
    }

    /// Balance still owed
    pub fn balance_due(&self) -> Money {
        self.total_amount - self.amount_paid
    }

    /// Whether the invoice is past due and still unpaid
    pub fn is_overdue(&self) -> bool {
        let today = Utc::now().date_naive();
        today > self.due_date
            && !matches!(
                self.status,
                InvoiceStatus::Paid | InvoiceStatus::Canceled | InvoiceStatus::Void
            )
    }
}

/// Invoice fields the edit hook reports as changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceField {
    Subtotal,
    TaxAmount,
    DiscountAmount,
    TotalAmount,
    CustomerName,
    InvoiceDate,
    DueDate,
    Description,
}

impl InvoiceField {
    /// Whether a change to this field alters the posted amounts
    pub fn affects_posting(self) -> bool {
        matches!(
            self,
            InvoiceField::Subtotal
                | InvoiceField::TaxAmount
                | InvoiceField::DiscountAmount
                | InvoiceField::TotalAmount
        )
    }
}

/// Generates a unique invoice number
fn generate_invoice_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("INV-{}", duration.as_millis() % 10_000_000_000)
}
