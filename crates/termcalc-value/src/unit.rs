//! Units of measure.
//!
//! A unit is a vector of SI base-dimension exponents plus a scale factor
//! relative to the SI coherent unit of that dimension. Literals are converted
//! to their standard unit when they are read, so every value in flight
//! carries a unit with scale 1 and two units compare equal iff their
//! dimensions agree.
//!
//! | Operation | Rule |
//! |-----------|------|
//! | `a + b`, `a - b` | dimensions must match |
//! | `a * b`, `a / b` | exponents add / subtract |
//! | `a ^ n` | exponents scale by the integer `n` |
//! | `root(a, n)` | every exponent must be divisible by `n` |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of SI base dimensions tracked.
pub const BASE_DIMENSIONS: usize = 7;

const SYMBOLS: [&str; BASE_DIMENSIONS] = ["m", "kg", "s", "K", "A", "mol", "cd"];

/// SI base-dimension exponents in the order length, mass, time,
/// temperature, current, amount of substance, luminous intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensions([i8; BASE_DIMENSIONS]);

impl Dimensions {
    /// All exponents zero.
    pub const NONE: Dimensions = Dimensions([0; BASE_DIMENSIONS]);

    /// Length (m).
    pub const LENGTH: Dimensions = Dimensions([1, 0, 0, 0, 0, 0, 0]);
    /// Mass (kg).
    pub const MASS: Dimensions = Dimensions([0, 1, 0, 0, 0, 0, 0]);
    /// Time (s).
    pub const TIME: Dimensions = Dimensions([0, 0, 1, 0, 0, 0, 0]);
    /// Temperature (K).
    pub const TEMPERATURE: Dimensions = Dimensions([0, 0, 0, 1, 0, 0, 0]);
    /// Electric current (A).
    pub const CURRENT: Dimensions = Dimensions([0, 0, 0, 0, 1, 0, 0]);
    /// Amount of substance (mol).
    pub const AMOUNT: Dimensions = Dimensions([0, 0, 0, 0, 0, 1, 0]);
    /// Luminous intensity (cd).
    pub const LUMINOSITY: Dimensions = Dimensions([0, 0, 0, 0, 0, 0, 1]);

    /// Creates dimensions from raw exponents.
    #[must_use]
    pub const fn from_exponents(exponents: [i8; BASE_DIMENSIONS]) -> Self {
        Self(exponents)
    }

    /// Returns the raw exponents.
    #[must_use]
    pub const fn exponents(&self) -> [i8; BASE_DIMENSIONS] {
        self.0
    }

    /// Returns true if all exponents are zero.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.0.iter().all(|&e| e == 0)
    }

    fn zip_with(&self, other: &Dimensions, f: impl Fn(i8, i8) -> i8) -> Dimensions {
        let mut out = [0; BASE_DIMENSIONS];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = f(self.0[i], other.0[i]);
        }
        Dimensions(out)
    }

    /// Adds exponents.
    #[must_use]
    pub fn multiply(&self, other: &Dimensions) -> Dimensions {
        self.zip_with(other, |a, b| a.saturating_add(b))
    }

    /// Subtracts exponents.
    #[must_use]
    pub fn divide(&self, other: &Dimensions) -> Dimensions {
        self.zip_with(other, |a, b| a.saturating_sub(b))
    }

    /// Multiplies every exponent by `n`, or `None` on overflow.
    #[must_use]
    pub fn pow(&self, n: i32) -> Option<Dimensions> {
        let mut out = [0; BASE_DIMENSIONS];
        for (slot, &e) in out.iter_mut().zip(self.0.iter()) {
            *slot = i8::try_from(i32::from(e).checked_mul(n)?).ok()?;
        }
        Some(Dimensions(out))
    }

    /// Divides every exponent by `n`, or `None` if any exponent is not a multiple of `n`.
    #[must_use]
    pub fn root(&self, n: i32) -> Option<Dimensions> {
        if n == 0 {
            return None;
        }
        let mut out = [0; BASE_DIMENSIONS];
        for (slot, &e) in out.iter_mut().zip(self.0.iter()) {
            let e = i32::from(e);
            if e % n != 0 {
                return None;
            }
            *slot = i8::try_from(e / n).ok()?;
        }
        Some(Dimensions(out))
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "1");
        }
        let mut first = true;
        for (symbol, &e) in SYMBOLS.iter().zip(self.0.iter()) {
            if e == 0 {
                continue;
            }
            if !first {
                write!(f, "·")?;
            }
            first = false;
            if e == 1 {
                write!(f, "{symbol}")?;
            } else {
                write!(f, "{symbol}^{e}")?;
            }
        }
        Ok(())
    }
}

/// A unit of measure: dimensions plus a scale relative to the SI coherent unit.
///
/// Equality only looks at dimensions. Scale is value-level metadata that
/// is folded into the number by [`crate::NumericValue::convert_unit`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Unit {
    dims: Dimensions,
    scale: f64,
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims
    }
}

impl Unit {
    /// The dimensionless unit.
    pub const ONE: Unit = Unit::new(Dimensions::NONE, 1.0);

    /// Creates a unit with the given dimensions and scale.
    #[must_use]
    pub const fn new(dims: Dimensions, scale: f64) -> Self {
        Self { dims, scale }
    }

    /// Returns the dimensions.
    #[must_use]
    pub const fn dims(&self) -> Dimensions {
        self.dims
    }

    /// Returns the scale relative to the SI coherent unit.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the SI coherent unit of the same dimension.
    #[must_use]
    pub const fn standard(&self) -> Unit {
        Unit::new(self.dims, 1.0)
    }

    /// Returns this unit with its scale multiplied by `factor` (e.g. kilo = 1000).
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Unit {
        Unit::new(self.dims, self.scale * factor)
    }

    /// Returns true if all dimension exponents are zero.
    #[must_use]
    pub fn is_dimensionless(&self) -> bool {
        self.dims.is_none()
    }

    /// Metre.
    #[must_use]
    pub const fn meter() -> Self {
        Self::new(Dimensions::LENGTH, 1.0)
    }

    /// Kilometre.
    #[must_use]
    pub const fn kilometer() -> Self {
        Self::new(Dimensions::LENGTH, 1000.0)
    }

    /// Kilogram.
    #[must_use]
    pub const fn kilogram() -> Self {
        Self::new(Dimensions::MASS, 1.0)
    }

    /// Gram.
    #[must_use]
    pub const fn gram() -> Self {
        Self::new(Dimensions::MASS, 0.001)
    }

    /// Second.
    #[must_use]
    pub const fn second() -> Self {
        Self::new(Dimensions::TIME, 1.0)
    }

    /// Minute.
    #[must_use]
    pub const fn minute() -> Self {
        Self::new(Dimensions::TIME, 60.0)
    }

    /// Hour.
    #[must_use]
    pub const fn hour() -> Self {
        Self::new(Dimensions::TIME, 3600.0)
    }

    /// Kelvin.
    #[must_use]
    pub const fn kelvin() -> Self {
        Self::new(Dimensions::TEMPERATURE, 1.0)
    }

    /// Ampere.
    #[must_use]
    pub const fn ampere() -> Self {
        Self::new(Dimensions::CURRENT, 1.0)
    }

    /// Mole.
    #[must_use]
    pub const fn mole() -> Self {
        Self::new(Dimensions::AMOUNT, 1.0)
    }

    /// Candela.
    #[must_use]
    pub const fn candela() -> Self {
        Self::new(Dimensions::LUMINOSITY, 1.0)
    }

    /// Newton: kg·m/s².
    #[must_use]
    pub const fn newton() -> Self {
        Self::new(Dimensions::from_exponents([1, 1, -2, 0, 0, 0, 0]), 1.0)
    }

    /// Joule: kg·m²/s².
    #[must_use]
    pub const fn joule() -> Self {
        Self::new(Dimensions::from_exponents([2, 1, -2, 0, 0, 0, 0]), 1.0)
    }

    /// Watt: kg·m²/s³.
    #[must_use]
    pub const fn watt() -> Self {
        Self::new(Dimensions::from_exponents([2, 1, -3, 0, 0, 0, 0]), 1.0)
    }

    /// Pascal: kg/(m·s²).
    #[must_use]
    pub const fn pascal() -> Self {
        Self::new(Dimensions::from_exponents([-1, 1, -2, 0, 0, 0, 0]), 1.0)
    }

    /// Product of two units (exponents add, scales multiply).
    #[must_use]
    pub fn multiply(&self, other: &Unit) -> Unit {
        Unit::new(self.dims.multiply(&other.dims), self.scale * other.scale)
    }

    /// Quotient of two units (exponents subtract, scales divide).
    #[must_use]
    pub fn divide(&self, other: &Unit) -> Unit {
        Unit::new(self.dims.divide(&other.dims), self.scale / other.scale)
    }

    /// Integer power of a unit.
    #[must_use]
    pub fn pow(&self, n: i32) -> Option<Unit> {
        Some(Unit::new(self.dims.pow(n)?, self.scale.powi(n)))
    }

    /// `n`-th root of a unit, if all exponents divide evenly.
    #[must_use]
    pub fn root(&self, n: i32) -> Option<Unit> {
        Some(Unit::new(self.dims.root(n)?, self.scale.powf(1.0 / f64::from(n))))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.scale - 1.0).abs() > f64::EPSILON {
            write!(f, "{}·", self.scale)?;
        }
        write!(f, "{}", self.dims)
    }
}

/// Combines two optional units under multiplication; a dimensionless product is `None`.
#[must_use]
pub fn multiply_units(a: Option<Unit>, b: Option<Unit>) -> Option<Unit> {
    let product = match (a, b) {
        (None, None) => return None,
        (Some(u), None) | (None, Some(u)) => u,
        (Some(u), Some(v)) => u.multiply(&v),
    };
    (!product.is_dimensionless()).then_some(product)
}

/// Combines two optional units under division; a dimensionless quotient is `None`.
#[must_use]
pub fn divide_units(a: Option<Unit>, b: Option<Unit>) -> Option<Unit> {
    let quotient = match (a, b) {
        (None, None) => return None,
        (Some(u), None) => u,
        (None, Some(v)) => Unit::ONE.divide(&v),
        (Some(u), Some(v)) => u.divide(&v),
    };
    (!quotient.is_dimensionless()).then_some(quotient)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_units() {
        let velocity = Unit::meter().divide(&Unit::second());
        assert_eq!(velocity.dims().exponents(), [1, 0, -1, 0, 0, 0, 0]);

        let force = Unit::kilogram()
            .multiply(&velocity)
            .divide(&Unit::second());
        assert_eq!(force, Unit::newton());
    }

    #[test]
    fn test_scale_is_ignored_by_equality() {
        assert_eq!(Unit::meter(), Unit::kilometer());
        assert_eq!(Unit::kilometer().standard().scale(), 1.0);
    }

    #[test]
    fn test_root_requires_even_exponents() {
        let area = Unit::meter().pow(2).unwrap();
        assert_eq!(area.root(2), Some(Unit::meter()));
        assert_eq!(Unit::meter().root(2), None);
    }

    #[test]
    fn test_optional_unit_algebra() {
        assert_eq!(multiply_units(None, None), None);
        assert_eq!(multiply_units(Some(Unit::meter()), None), Some(Unit::meter()));
        // m / m is dimensionless
        assert_eq!(divide_units(Some(Unit::meter()), Some(Unit::meter())), None);
        let per_second = divide_units(None, Some(Unit::second())).unwrap();
        assert_eq!(per_second.dims().exponents(), [0, 0, -1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Unit::newton().to_string(), "m·kg·s^-2");
        assert_eq!(Unit::ONE.to_string(), "1");
    }
}
