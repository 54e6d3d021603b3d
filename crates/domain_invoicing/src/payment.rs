//! Payment recording

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{InvoiceId, Money, PaymentId, TenantId};
use domain_ledger::SettlementChannel;

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    CreditCard,
    DebitCard,
    Check,
    DirectDebit,
    DigitalWallet,
}

impl PaymentMethod {
    /// Which asset account family this method settles into
    pub fn settlement_channel(self) -> SettlementChannel {
        match self {
            PaymentMethod::Cash => SettlementChannel::Cash,
            _ => SettlementChannel::Bank,
        }
    }
}

/// A payment received against an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Invoice being paid
    pub invoice_id: InvoiceId,
    /// Payment amount
    pub amount: Money,
    /// Payment method
    pub method: PaymentMethod,
    /// External reference (bank ref, transaction id)
    pub reference: Option<String>,
    /// Date the payment was received
    pub received_on: NaiveDate,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Records a payment against an invoice
    pub fn new(
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        amount: Money,
        method: PaymentMethod,
        received_on: NaiveDate,
    ) -> Self {
        Self {
            id: PaymentId::new_v7(),
            tenant_id,
            invoice_id,
            amount,
            method,
            reference: None,
            received_on,
            created_at: Utc::now(),
        }
    }

    /// Sets the external reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_cash_settles_to_cash() {
        assert_eq!(
            PaymentMethod::Cash.settlement_channel(),
            SettlementChannel::Cash
        );
        for method in [
            PaymentMethod::BankTransfer,
            PaymentMethod::CreditCard,
            PaymentMethod::DebitCard,
            PaymentMethod::Check,
            PaymentMethod::DirectDebit,
            PaymentMethod::DigitalWallet,
        ] {
            assert_eq!(method.settlement_channel(), SettlementChannel::Bank);
        }
    }
}
