//! Result formatting.

use crate::value::{NumericValue, ValueKind};
use std::fmt;

/// Significant digits used by `Display`.
pub const DEFAULT_SIGNIFICANT_DIGITS: u32 = 6;

/// Rounds `num` to `digits` significant digits, ties to even.
///
/// Very small magnitudes need a scaling factor beyond `f64` range; the
/// factor is then applied in two steps so only the product is formed.
#[must_use]
pub fn round_to_significant_digits(num: f64, digits: u32) -> f64 {
    if num == 0.0 || !num.is_finite() {
        return num;
    }
    let max_power_of_ten = f64::MAX.log10().floor();
    let magnitude = num.abs().log10().ceil();
    let power = f64::from(digits) - magnitude;

    if power < 0.0 {
        let factor = 10f64.powf(-power);
        return (num / factor).round_ties_even() * factor;
    }
    let (first, second) = if power > max_power_of_ten {
        (10f64.powf(max_power_of_ten), 10f64.powf(power - max_power_of_ten))
    } else {
        (10f64.powf(power), 1.0)
    };
    let shifted = (num * first * second).round_ties_even();
    shifted / first / second
}

fn format_part(value: f64, digits: u32, explicit_plus: bool) -> String {
    if value.is_infinite() {
        return match (value < 0.0, explicit_plus) {
            (true, _) => "-∞".to_string(),
            (false, true) => "+∞".to_string(),
            (false, false) => "∞".to_string(),
        };
    }
    let rounded = round_to_significant_digits(value, digits);
    if explicit_plus && rounded >= 0.0 {
        format!("+{rounded}")
    } else {
        format!("{rounded}")
    }
}

impl NumericValue {
    /// Formats the value with `digits` significant digits.
    ///
    /// Complex values print as `re±imi`. Units are not included.
    #[must_use]
    pub fn format(&self, digits: u32) -> String {
        match self.kind() {
            ValueKind::Invalid => "NaN".to_string(),
            ValueKind::Real if self.re().is_nan() => "NaN".to_string(),
            ValueKind::Real => format_part(self.re(), digits, false),
            ValueKind::Complex if self.re().is_nan() || self.im().is_nan() => "NaN".to_string(),
            ValueKind::Complex => format!(
                "{}{}i",
                format_part(self.re(), digits, false),
                format_part(self.im(), digits, true)
            ),
        }
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(DEFAULT_SIGNIFICANT_DIGITS))?;
        match self.unit() {
            Some(unit) if !self.is_invalid() => write!(f, " {unit}"),
            _ => Ok(()),
        }
    }
}
