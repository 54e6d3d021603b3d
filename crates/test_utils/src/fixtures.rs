//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities across the ledger system.
//! Fixtures are deterministic so tests stay predictable.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::{AccountId, Currency, CustomerId, GroupNodeId, Money, TenantId, UserId};
use domain_ledger::{GroupKind, GroupLevel, Ledger, NewAccount};

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A standard USD amount
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }

    /// A typical invoice subtotal
    pub fn usd_subtotal() -> Money {
        Money::new(dec!(1000.00), Currency::USD)
    }

    /// Tax on the typical subtotal at 15%
    pub fn usd_tax() -> Money {
        Money::new(dec!(150.00), Currency::USD)
    }

    /// A typical invoice discount
    pub fn usd_discount() -> Money {
        Money::new(dec!(50.00), Currency::USD)
    }

    /// A zero amount
    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// A EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }
}

/// Fixture for date test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard invoice date
    pub fn invoice_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date")
    }

    /// Standard due date, 30 days out
    pub fn due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 31).expect("valid date")
    }

    /// A payment date between invoice and due date
    pub fn payment_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).expect("valid date")
    }

    /// A date after the due date, for overdue scenarios
    pub fn past_due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 1).expect("valid date")
    }
}

/// Fixture for deterministic identifiers
pub struct IdFixtures;

impl IdFixtures {
    /// A stable tenant id shared by fixture-built entities
    pub fn tenant_id() -> TenantId {
        TenantId::from_uuid(Uuid::from_u128(0x7e57_0001))
    }

    /// A stable acting user
    pub fn actor() -> UserId {
        UserId::from_uuid(Uuid::from_u128(0x7e57_0002))
    }

    /// A stable customer id
    pub fn customer_id() -> CustomerId {
        CustomerId::from_uuid(Uuid::from_u128(0x7e57_0003))
    }
}

/// Handles into a chart seeded by [`StandardChart::seed`]
pub struct StandardChart {
    pub trade_debtors_group: GroupNodeId,
    pub cash_group: GroupNodeId,
    pub bank_group: GroupNodeId,
    pub duties_group: GroupNodeId,
    pub sales_group: GroupNodeId,
    pub discounts_group: GroupNodeId,
    pub cash: AccountId,
    pub sales: AccountId,
}

impl StandardChart {
    /// Seeds the standard four-level chart: asset branches for debtors,
    /// cash and bank, a liability branch for taxes, an income branch with
    /// a default sales account, and an expense branch for discounts.
    pub fn seed(ledger: &mut Ledger) -> Self {
        let currency = ledger.currency();
        let zero = Money::zero(currency);

        let assets = ledger
            .create_group(GroupLevel::MainGroup, None, GroupKind::Assets)
            .expect("seed assets");
        let current = ledger
            .create_group(GroupLevel::ElementGroup, Some(assets), GroupKind::CurrentAssets)
            .expect("seed current assets");
        let current_sub = ledger
            .create_group(
                GroupLevel::SubElementGroup,
                Some(current),
                GroupKind::CurrentAssets,
            )
            .expect("seed current assets sub");
        let trade_debtors_group = ledger
            .create_group(
                GroupLevel::DetailedGroup,
                Some(current_sub),
                GroupKind::TradeDebtors,
            )
            .expect("seed trade debtors");
        let cash_group = ledger
            .create_group(
                GroupLevel::DetailedGroup,
                Some(current_sub),
                GroupKind::CashInHand,
            )
            .expect("seed cash in hand");
        let bank_group = ledger
            .create_group(
                GroupLevel::DetailedGroup,
                Some(current_sub),
                GroupKind::BankAccounts,
            )
            .expect("seed bank accounts");
        let cash = ledger
            .create_account(cash_group, NewAccount::new("Cash", zero))
            .expect("seed cash account");

        let liabilities = ledger
            .create_group(GroupLevel::MainGroup, None, GroupKind::Liabilities)
            .expect("seed liabilities");
        let current_liab = ledger
            .create_group(
                GroupLevel::ElementGroup,
                Some(liabilities),
                GroupKind::CurrentLiabilities,
            )
            .expect("seed current liabilities");
        let current_liab_sub = ledger
            .create_group(
                GroupLevel::SubElementGroup,
                Some(current_liab),
                GroupKind::CurrentLiabilities,
            )
            .expect("seed current liabilities sub");
        let duties_group = ledger
            .create_group(
                GroupLevel::DetailedGroup,
                Some(current_liab_sub),
                GroupKind::DutiesAndTaxes,
            )
            .expect("seed duties and taxes");

        let income = ledger
            .create_group(GroupLevel::MainGroup, None, GroupKind::Income)
            .expect("seed income");
        let direct = ledger
            .create_group(GroupLevel::ElementGroup, Some(income), GroupKind::DirectIncome)
            .expect("seed direct income");
        let direct_sub = ledger
            .create_group(
                GroupLevel::SubElementGroup,
                Some(direct),
                GroupKind::DirectIncome,
            )
            .expect("seed direct income sub");
        let sales_group = ledger
            .create_group(
                GroupLevel::DetailedGroup,
                Some(direct_sub),
                GroupKind::DirectIncome,
            )
            .expect("seed sales group");
        let sales = ledger
            .create_account(sales_group, NewAccount::new("Sales", zero))
            .expect("seed sales account");
        ledger
            .set_default_income_account(sales)
            .expect("seed default income");

        let expenses = ledger
            .create_group(GroupLevel::MainGroup, None, GroupKind::Expenses)
            .expect("seed expenses");
        let indirect = ledger
            .create_group(
                GroupLevel::ElementGroup,
                Some(expenses),
                GroupKind::IndirectExpenses,
            )
            .expect("seed indirect expenses");
        let indirect_sub = ledger
            .create_group(
                GroupLevel::SubElementGroup,
                Some(indirect),
                GroupKind::IndirectExpenses,
            )
            .expect("seed indirect expenses sub");
        let discounts_group = ledger
            .create_group(
                GroupLevel::DetailedGroup,
                Some(indirect_sub),
                GroupKind::DiscountsAllowed,
            )
            .expect("seed discounts allowed");

        Self {
            trade_debtors_group,
            cash_group,
            bank_group,
            duties_group,
            sales_group,
            discounts_group,
            cash,
            sales,
        }
    }

    /// A fresh USD ledger with the standard chart already seeded
    pub fn ledger() -> (Ledger, Self) {
        let mut ledger = Ledger::new(IdFixtures::tenant_id(), Currency::USD);
        let chart = Self::seed(&mut ledger);
        (ledger, chart)
    }
}
