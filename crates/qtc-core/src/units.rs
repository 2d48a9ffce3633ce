//! QTC amounts
//!
//! The node works in base units; 1 QTC = 100 000 000 base units.

/// Base units per QTC
pub const BASE_UNITS_PER_QTC: u64 = 100_000_000;

/// Fee used when the caller does not pick one (0.001 QTC)
pub const DEFAULT_FEE: u64 = 100_000;

/// Convert a QTC amount to base units, rounding down.
///
/// Returns `None` for negative, non-finite or out-of-range amounts.
pub fn to_base_units(qtc: f64) -> Option<u64> {
    if !qtc.is_finite() || qtc < 0.0 {
        return None;
    }
    let units = (qtc * BASE_UNITS_PER_QTC as f64).floor();
    // u64::MAX as f64 rounds up to 2^64, which does not fit
    if units >= u64::MAX as f64 {
        return None;
    }
    Some(units as u64)
}
