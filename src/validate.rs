//! Client-side parameter checks
//!
//! Only superficial checks live here: enumerated sets, numeric ranges and
//! mandatory fields. Anything deeper is left to the exchange.

use std::fmt::Display;
use std::ops::RangeInclusive;

use crate::error::{FapiError, Result};

/// Accepted `limit` values for `/fapi/v1/depth`
pub const DEPTH_LIMITS: [u32; 7] = [5, 10, 20, 50, 100, 500, 1000];

/// `limit` bounds for trade listings (recent, historical, aggregate, user trades)
pub const TRADES_LIMIT: RangeInclusive<u32> = 1..=1000;

/// `limit` bounds for kline endpoints
pub const KLINES_LIMIT: RangeInclusive<u32> = 1..=1500;

/// `limit` bounds for leveraged-token klines
pub const LVT_KLINES_LIMIT: RangeInclusive<u32> = 1..=1000;

/// `limit` bounds for funding rate history
pub const FUNDING_RATE_LIMIT: RangeInclusive<u32> = 1..=1000;

/// `limit` bounds for `/futures/data` statistics
pub const STATS_LIMIT: RangeInclusive<u32> = 1..=500;

/// `limit` bounds for order listings and income history
pub const ORDERS_LIMIT: RangeInclusive<u32> = 1..=1000;

/// `limit` bounds for order amendment history and force orders
pub const AMENDMENT_LIMIT: RangeInclusive<u32> = 1..=100;

/// `limit` bounds for isolated margin change history
pub const MARGIN_HISTORY_LIMIT: RangeInclusive<u32> = 1..=500;

/// `limit` bounds for wallet account snapshots
pub const SNAPSHOT_LIMIT: RangeInclusive<u32> = 7..=30;

/// Leverage accepted by `/fapi/v1/leverage`
pub const LEVERAGE_RANGE: RangeInclusive<u32> = 1..=125;

/// Maximum orders in one batch place/modify call
pub const MAX_BATCH_ORDERS: usize = 5;

/// Maximum ids in one batch cancel list
pub const MAX_BATCH_CANCEL: usize = 10;

/// Reject empty or whitespace-only mandatory strings
pub fn require_non_empty(param: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FapiError::validation(param, "is mandatory and must not be empty"));
    }
    Ok(())
}

/// Require `value` to be one of `allowed`
pub fn check_one_of<T>(param: &'static str, value: T, allowed: &[T]) -> Result<()>
where
    T: PartialEq + Display + std::fmt::Debug,
{
    if !allowed.contains(&value) {
        return Err(FapiError::validation(
            param,
            format!("{} is not one of {:?}", value, allowed),
        ));
    }
    Ok(())
}

/// Require `value` to fall inside `range`
pub fn check_range<T>(param: &'static str, value: T, range: &RangeInclusive<T>) -> Result<()>
where
    T: PartialOrd + Display,
{
    if !range.contains(&value) {
        return Err(FapiError::validation(
            param,
            format!(
                "{} is outside the allowed range {}..={}",
                value,
                range.start(),
                range.end()
            ),
        ));
    }
    Ok(())
}

/// Range check applied only when the optional value is present
pub fn check_range_opt<T>(
    param: &'static str,
    value: Option<T>,
    range: &RangeInclusive<T>,
) -> Result<()>
where
    T: PartialOrd + Display,
{
    match value {
        Some(value) => check_range(param, value, range),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("symbol", "BTCUSDT").is_ok());
        assert!(require_non_empty("symbol", "").is_err());
        assert!(require_non_empty("symbol", "   ").is_err());
    }

    #[test]
    fn test_depth_limits() {
        for limit in DEPTH_LIMITS {
            assert!(check_one_of("limit", limit, &DEPTH_LIMITS).is_ok());
        }
        for limit in [0, 1, 7, 25, 499, 5000] {
            assert!(check_one_of("limit", limit, &DEPTH_LIMITS).is_err());
        }
    }

    #[test]
    fn test_check_range_bounds_inclusive() {
        assert!(check_range("limit", 1, &KLINES_LIMIT).is_ok());
        assert!(check_range("limit", 1500, &KLINES_LIMIT).is_ok());
        assert!(check_range("limit", 0, &KLINES_LIMIT).is_err());
        assert!(check_range("limit", 1501, &KLINES_LIMIT).is_err());
    }

    #[test]
    fn test_check_range_opt_skips_none() {
        assert!(check_range_opt::<u32>("limit", None, &STATS_LIMIT).is_ok());
        assert!(check_range_opt("limit", Some(501), &STATS_LIMIT).is_err());
    }

    #[test]
    fn test_error_names_the_parameter() {
        let err = check_range("leverage", 200, &LEVERAGE_RANGE).unwrap_err();
        match err {
            FapiError::Validation { param, reason } => {
                assert_eq!(param, "leverage");
                assert!(reason.contains("1..=125"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
