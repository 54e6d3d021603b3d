//! Property-Based Test Data Generators
//!
//! Provides proptest strategies for generating random ledger test data.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money};

/// Strategy for arbitrary money amounts in minor units
pub fn money_strategy(currency: Currency) -> impl Strategy<Value = Money> {
    (-1_000_000_00i64..1_000_000_00i64).prop_map(move |minor| Money::from_minor(minor, currency))
}

/// Strategy for strictly positive money amounts
pub fn positive_money_strategy(currency: Currency) -> impl Strategy<Value = Money> {
    (1i64..1_000_000_00i64).prop_map(move |minor| Money::from_minor(minor, currency))
}

/// Strategy for invoice amounts: a positive subtotal, tax in 0..=25% of
/// the subtotal, and a discount in 0..=10% of the subtotal
pub fn invoice_amounts_strategy() -> impl Strategy<Value = (Money, Money, Money)> {
    (100i64..1_000_000_00i64, 0u32..=25u32, 0u32..=10u32).prop_map(
        |(subtotal_minor, tax_pct, discount_pct)| {
            let subtotal = Money::from_minor(subtotal_minor, Currency::USD);
            let tax = subtotal.multiply(Decimal::new(tax_pct as i64, 2));
            let discount = subtotal.multiply(Decimal::new(discount_pct as i64, 2));
            (subtotal, tax, discount)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn positive_money_is_positive(money in positive_money_strategy(Currency::USD)) {
            prop_assert!(money.is_positive());
        }

        #[test]
        fn invoice_amounts_keep_total_positive(
            (subtotal, tax, discount) in invoice_amounts_strategy()
        ) {
            let total = subtotal + tax - discount;
            prop_assert!(total.is_positive());
        }
    }
}
