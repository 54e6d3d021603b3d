//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the fields they care about.

use fake::faker::company::en::CompanyName;
use fake::Fake;

use core_kernel::{AccountId, Currency, CustomerId, Money, TenantId};
use domain_invoicing::{Invoice, Payment, PaymentMethod};

use crate::fixtures::{IdFixtures, MoneyFixtures, TemporalFixtures};

/// Builder for test invoices
pub struct TestInvoiceBuilder {
    tenant_id: TenantId,
    customer_id: CustomerId,
    customer_name: String,
    subtotal: Money,
    tax: Money,
    discount: Money,
    income_account: Option<AccountId>,
}

impl Default for TestInvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestInvoiceBuilder {
    /// Creates a builder with a random customer and the standard amounts
    pub fn new() -> Self {
        Self {
            tenant_id: IdFixtures::tenant_id(),
            customer_id: CustomerId::new(),
            customer_name: CompanyName().fake(),
            subtotal: MoneyFixtures::usd_subtotal(),
            tax: MoneyFixtures::usd_tax(),
            discount: MoneyFixtures::usd_zero(),
            income_account: None,
        }
    }

    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    pub fn with_customer(mut self, customer_id: CustomerId, name: impl Into<String>) -> Self {
        self.customer_id = customer_id;
        self.customer_name = name.into();
        self
    }

    pub fn with_subtotal(mut self, subtotal: Money) -> Self {
        self.subtotal = subtotal;
        self
    }

    pub fn with_tax(mut self, tax: Money) -> Self {
        self.tax = tax;
        self
    }

    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_income_account(mut self, account_id: AccountId) -> Self {
        self.income_account = Some(account_id);
        self
    }

    /// Builds a draft invoice
    pub fn build(self) -> Invoice {
        let mut invoice = Invoice::new(
            self.tenant_id,
            self.customer_id,
            self.customer_name,
            TemporalFixtures::invoice_date(),
            TemporalFixtures::due_date(),
            Currency::USD,
        )
        .with_amounts(self.subtotal, self.tax, self.discount);
        if let Some(account_id) = self.income_account {
            invoice = invoice.with_income_account(account_id);
        }
        invoice
    }
}

/// Builder for test payments
pub struct TestPaymentBuilder {
    tenant_id: TenantId,
    amount: Money,
    method: PaymentMethod,
    reference: Option<String>,
}

impl Default for TestPaymentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPaymentBuilder {
    pub fn new() -> Self {
        Self {
            tenant_id: IdFixtures::tenant_id(),
            amount: MoneyFixtures::usd_100(),
            method: PaymentMethod::Cash,
            reference: None,
        }
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Builds a payment against the given invoice
    pub fn build_for(self, invoice: &Invoice) -> Payment {
        let mut payment = Payment::new(
            self.tenant_id,
            invoice.id,
            self.amount,
            self.method,
            TemporalFixtures::payment_date(),
        );
        if let Some(reference) = self.reference {
            payment = payment.with_reference(reference);
        }
        payment
    }

    /// Builds a payment settling the invoice's full balance due
    pub fn build_settling(self, invoice: &Invoice) -> Payment {
        let amount = invoice.balance_due();
        self.with_amount(amount).build_for(invoice)
    }
}
