//! Price math using decimal arithmetic.
//!
//! Prices are currency-agnostic `Decimal` amounts in the store's standard
//! unit. A discount price only counts when it is strictly below the base
//! price; a "discount" at or above the base price has no effect anywhere
//! (effective price, badges, buckets).

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// The price a buyer actually pays.
///
/// Returns the discount price when present and strictly less than the base
/// price, otherwise the base price.
#[must_use]
pub fn effective_price(price: Decimal, discount_price: Option<Decimal>) -> Decimal {
    match discount_price {
        Some(discount) if discount < price => discount,
        _ => price,
    }
}

/// Whole-number discount percentage for badge display (e.g., `20` for "20% OFF").
///
/// Returns `None` when there is no genuine discount (absent, equal to, or
/// above the base price) or when the base price is not positive.
#[must_use]
pub fn discount_percent(price: Decimal, discount_price: Option<Decimal>) -> Option<u32> {
    let discount = discount_price?;
    if price <= Decimal::ZERO || discount >= price {
        return None;
    }

    let fraction = (price - discount) / price * Decimal::from(100);
    fraction.round().to_u32()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn test_effective_price_with_genuine_discount() {
        assert_eq!(effective_price(dec(1000), Some(dec(800))), dec(800));
    }

    #[test]
    fn test_effective_price_ignores_non_discount() {
        // Equal to or above base price has no discount effect
        assert_eq!(effective_price(dec(1000), Some(dec(1000))), dec(1000));
        assert_eq!(effective_price(dec(1000), Some(dec(1200))), dec(1000));
        assert_eq!(effective_price(dec(1000), None), dec(1000));
    }

    #[test]
    fn test_discount_percent_badge() {
        assert_eq!(discount_percent(dec(1000), Some(dec(800))), Some(20));
        assert_eq!(discount_percent(dec(1000), Some(dec(750))), Some(25));
    }

    #[test]
    fn test_discount_percent_rounds() {
        // 999 -> 666 is 33.33..% off
        assert_eq!(discount_percent(dec(999), Some(dec(666))), Some(33));
    }

    #[test]
    fn test_discount_percent_absent_for_non_discount() {
        assert_eq!(discount_percent(dec(1000), Some(dec(1200))), None);
        assert_eq!(discount_percent(dec(1000), Some(dec(1000))), None);
        assert_eq!(discount_percent(dec(1000), None), None);
        assert_eq!(discount_percent(dec(0), Some(dec(0))), None);
    }
}
