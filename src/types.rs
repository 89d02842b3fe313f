//! Core identifier, price, and trade types shared across the engine.
//!
//! Prices are fixed-point tick counts (scale 100, i.e. two decimal places).
//! All comparisons on the matching path are exact integer comparisons.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Monotone order identifier, assigned by the engine at arrival.
pub type OrderId = u64;

/// Order quantity in units.
pub type Quantity = u32;

/// Logical timestamp drawn from the engine's monotone counter.
/// Not a clock: it is the sole source of ordering.
pub type Timestamp = u64;

/// Fixed-point price in ticks. E.g. 150.25 -> 15025.
pub type Price = i64;

/// Ticks per whole unit (two decimal places).
pub const PRICE_SCALE: i64 = 100;

/// Convert a decimal price string to ticks, rounding to nearest
/// (add 0.5 before truncation, matching the reference conversion).
pub fn price_from_decimal(s: &str) -> Option<Price> {
    let d = Decimal::from_str(s.trim()).ok()?;
    let scaled = d * Decimal::from(PRICE_SCALE) + Decimal::new(5, 1);
    scaled.floor().to_i64()
}

/// Render a tick price with two decimal places.
pub fn price_to_string(p: Price) -> String {
    let whole = p / PRICE_SCALE;
    let frac = (p % PRICE_SCALE).abs();
    format!("{whole}.{frac:02}")
}

/// Order side (buy = bid, sell = ask)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    /// Returns the opposite side
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Decode a wire-protocol side byte.
    #[inline]
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }
}

/// Order type determines matching behavior: limit orders rest, market
/// orders never do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OrderType {
    Limit = 0,
    Market = 1,
}

impl OrderType {
    /// Decode a wire-protocol order-type byte.
    #[inline]
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(OrderType::Limit),
            1 => Some(OrderType::Market),
            _ => None,
        }
    }
}

/// An executed trade. `buyer_order_id` always refers to the buy-side order
/// and `seller_order_id` to the sell-side order, regardless of which one
/// was the aggressor. Price is the resting order's price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trade {
    pub buyer_order_id: OrderId,
    pub seller_order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
    pub timestamp: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_side_from_u8() {
        assert_eq!(Side::from_u8(0), Some(Side::Buy));
        assert_eq!(Side::from_u8(1), Some(Side::Sell));
        assert_eq!(Side::from_u8(2), None);
    }

    #[test]
    fn test_price_from_decimal() {
        assert_eq!(price_from_decimal("150.25"), Some(15025));
        assert_eq!(price_from_decimal("100"), Some(10000));
        assert_eq!(price_from_decimal("100.00"), Some(10000));
        assert_eq!(price_from_decimal("0.01"), Some(1));
        // Rounds to nearest tick
        assert_eq!(price_from_decimal("99.999"), Some(10000));
        assert_eq!(price_from_decimal("99.991"), Some(9999));
        assert_eq!(price_from_decimal(" 42.50 "), Some(4250));
        assert_eq!(price_from_decimal("abc"), None);
        assert_eq!(price_from_decimal(""), None);
    }

    #[test]
    fn test_price_to_string() {
        assert_eq!(price_to_string(15025), "150.25");
        assert_eq!(price_to_string(10000), "100.00");
        assert_eq!(price_to_string(7), "0.07");
        assert_eq!(price_to_string(100), "1.00");
    }

    #[test]
    fn test_price_round_trip() {
        for s in ["100.00", "99.95", "0.01", "1234.56"] {
            let ticks = price_from_decimal(s).unwrap();
            assert_eq!(price_to_string(ticks), s);
        }
    }
}
