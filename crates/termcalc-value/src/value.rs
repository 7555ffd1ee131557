//! The tagged real/complex scalar used throughout evaluation.

use crate::unit::{divide_units, multiply_units, Unit};
use num_complex::Complex64;
use num_traits::{One, Zero};
use std::ops::Neg;
use thiserror::Error;

/// Classification of a [`NumericValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// No usable number; both parts are NaN.
    Invalid,
    /// Imaginary part is zero.
    Real,
    /// Both parts are meaningful.
    Complex,
}

/// Why a value is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ValueError {
    /// The term content is not valid yet.
    #[error("term is not ready")]
    TermNotReady,
    /// The computation produced no number.
    #[error("not a number")]
    NotANumber,
    /// A real number was required but a complex one was found.
    #[error("not a real number")]
    NotAReal,
    /// A complex value was passed where only reals are accepted.
    #[error("complex value passed")]
    PassedComplex,
    /// Two operands carry units that cannot be combined.
    #[error("incompatible units")]
    IncompatibleUnit,
}

/// A real or complex number with an optional unit and an invalidity reason.
///
/// Every binary operation reads two operands by value and writes into
/// `self`, so `v.add(v, w)` is fine. An invalid operand always yields an
/// invalid result carrying the operand's reason.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericValue {
    kind: ValueKind,
    real: f64,
    imaginary: f64,
    unit: Option<Unit>,
    error: Option<ValueError>,
}

impl Default for NumericValue {
    fn default() -> Self {
        Self::invalid(ValueError::TermNotReady)
    }
}

impl NumericValue {
    /// Real zero without unit.
    pub const ZERO: NumericValue = NumericValue::real(0.0);
    /// Real one without unit.
    pub const ONE: NumericValue = NumericValue::real(1.0);

    /// Creates a real value.
    #[must_use]
    pub const fn real(value: f64) -> Self {
        Self {
            kind: ValueKind::Real,
            real: value,
            imaginary: 0.0,
            unit: None,
            error: None,
        }
    }

    /// Creates a complex value; a zero imaginary part yields a real value.
    #[must_use]
    pub fn complex(real: f64, imaginary: f64) -> Self {
        let mut v = Self::ZERO;
        v.set_complex(real, imaginary);
        v
    }

    /// Creates an invalid value.
    #[must_use]
    pub const fn invalid(reason: ValueError) -> Self {
        Self {
            kind: ValueKind::Invalid,
            real: f64::NAN,
            imaginary: f64::NAN,
            unit: None,
            error: Some(reason),
        }
    }

    /// Returns this value tagged with `unit`, converted to the standard unit.
    ///
    /// This is how literals such as `2 km` enter the engine: the number is
    /// scaled so that the carried unit always has scale 1.
    #[must_use]
    pub fn with_unit(mut self, unit: Unit) -> Self {
        if self.kind == ValueKind::Invalid {
            return self;
        }
        let scale = unit.scale();
        self.real *= scale;
        self.imaginary *= scale;
        self.unit = (!unit.is_dimensionless()).then(|| unit.standard());
        self
    }

    /// Returns the kind.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Returns the real part.
    #[must_use]
    pub const fn re(&self) -> f64 {
        self.real
    }

    /// Returns the imaginary part.
    #[must_use]
    pub const fn im(&self) -> f64 {
        self.imaginary
    }

    /// Returns the carried unit, `None` for unit-less values.
    #[must_use]
    pub const fn unit(&self) -> Option<Unit> {
        self.unit
    }

    /// Replaces the carried unit. A dimensionless unit is stored as `None`.
    pub fn set_unit(&mut self, unit: Option<Unit>) {
        self.unit = unit.filter(|u| !u.is_dimensionless());
    }

    /// Returns the invalidity reason, if any.
    #[must_use]
    pub const fn error(&self) -> Option<ValueError> {
        self.error
    }

    /// Returns the invalidity reason, defaulting to [`ValueError::NotANumber`].
    #[must_use]
    pub fn reason(&self) -> ValueError {
        self.error.unwrap_or(ValueError::NotANumber)
    }

    /// Returns the value as a complex number.
    #[must_use]
    pub fn to_complex(&self) -> Complex64 {
        Complex64::new(self.real, self.imaginary)
    }

    /// Returns the real part truncated toward zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_integer(&self) -> i64 {
        self.real as i64
    }

    /// Returns true for `Real` values.
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.kind == ValueKind::Real
    }

    /// Returns true for `Complex` values.
    #[must_use]
    pub fn is_complex(&self) -> bool {
        self.kind == ValueKind::Complex
    }

    /// Returns true for `Invalid` values.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.kind == ValueKind::Invalid
    }

    /// Returns true if the value is invalid or any read component is NaN or infinite.
    #[must_use]
    pub fn is_nan(&self) -> bool {
        match self.kind {
            ValueKind::Real => !self.real.is_finite(),
            ValueKind::Complex => !self.real.is_finite() || !self.imaginary.is_finite(),
            ValueKind::Invalid => true,
        }
    }

    /// Returns true for an exact zero; invalid values are never zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self.kind {
            ValueKind::Real => self.real == 0.0,
            ValueKind::Complex => self.real == 0.0 && self.imaginary == 0.0,
            ValueKind::Invalid => false,
        }
    }

    /// Copies `other` into `self`.
    pub fn assign(&mut self, other: NumericValue) -> ValueKind {
        *self = other;
        self.kind
    }

    /// Sets a unit-less real value.
    pub fn set_real(&mut self, value: f64) -> ValueKind {
        *self = Self::real(value);
        self.kind
    }

    /// Sets a real value carrying `unit`.
    pub fn set_real_with_unit(&mut self, value: f64, unit: Option<Unit>) -> ValueKind {
        self.set_real(value);
        self.set_unit(unit);
        self.kind
    }

    /// Sets a unit-less complex value; a zero imaginary part demotes to real.
    pub fn set_complex(&mut self, real: f64, imaginary: f64) -> ValueKind {
        self.real = real;
        self.imaginary = imaginary;
        self.kind = if imaginary == 0.0 {
            ValueKind::Real
        } else {
            ValueKind::Complex
        };
        self.unit = None;
        self.error = None;
        self.kind
    }

    pub(crate) fn set_complex_from(&mut self, c: Complex64) -> ValueKind {
        self.set_complex(c.re, c.im)
    }

    /// Marks the value invalid with the given reason.
    pub fn invalidate(&mut self, reason: ValueError) -> ValueKind {
        *self = Self::invalid(reason);
        self.kind
    }

    /// Scales both parts by a real factor, keeping kind and unit.
    pub fn scale(&mut self, factor: f64) -> ValueKind {
        if self.kind != ValueKind::Invalid {
            self.real *= factor;
            self.imaginary *= factor;
        }
        self.kind
    }

    /// Writes `f + g`.
    pub fn add(&mut self, f: NumericValue, g: NumericValue) -> ValueKind {
        let unit = match Self::additive_unit(&f, &g) {
            Ok(unit) => unit,
            Err(reason) => return self.invalidate(reason),
        };
        if f.is_complex() || g.is_complex() {
            self.set_complex(f.real + g.real, f.imaginary + g.imaginary);
        } else {
            self.set_real(f.real + g.real);
        }
        self.set_unit(unit);
        self.kind
    }

    /// Writes `f - g`.
    pub fn subtract(&mut self, f: NumericValue, g: NumericValue) -> ValueKind {
        let unit = match Self::additive_unit(&f, &g) {
            Ok(unit) => unit,
            Err(reason) => return self.invalidate(reason),
        };
        if f.is_complex() || g.is_complex() {
            self.set_complex(f.real - g.real, f.imaginary - g.imaginary);
        } else {
            self.set_real(f.real - g.real);
        }
        self.set_unit(unit);
        self.kind
    }

    /// Writes `f * g`.
    pub fn multiply(&mut self, f: NumericValue, g: NumericValue) -> ValueKind {
        if let Some(reason) = Self::invalid_operand(&f, &g) {
            return self.invalidate(reason);
        }
        if f.is_complex() || g.is_complex() {
            self.set_complex(
                f.real * g.real - f.imaginary * g.imaginary,
                f.real * g.imaginary + f.imaginary * g.real,
            );
        } else {
            self.set_real(f.real * g.real);
        }
        self.set_unit(multiply_units(f.unit, g.unit));
        self.kind
    }

    /// Writes `f / g`.
    ///
    /// Complex division uses Smith's algorithm, branching on the larger
    /// component of the denominator to avoid overflow.
    pub fn divide(&mut self, f: NumericValue, g: NumericValue) -> ValueKind {
        if let Some(reason) = Self::invalid_operand(&f, &g) {
            return self.invalidate(reason);
        }
        if f.is_complex() || g.is_complex() {
            let (c, d) = (g.real, g.imaginary);
            if c.abs() < d.abs() {
                let q = c / d;
                let denominator = c * q + d;
                self.set_complex(
                    (f.real * q + f.imaginary) / denominator,
                    (f.imaginary * q - f.real) / denominator,
                );
            } else {
                let q = d / c;
                let denominator = d * q + c;
                self.set_complex(
                    (f.imaginary * q + f.real) / denominator,
                    (f.imaginary - f.real * q) / denominator,
                );
            }
        } else {
            self.set_real(f.real / g.real);
        }
        self.set_unit(divide_units(f.unit, g.unit));
        self.kind
    }

    /// Writes `f ^ g`.
    ///
    /// A base with a unit needs a real integer exponent without unit.
    pub fn pow(&mut self, f: NumericValue, g: NumericValue) -> ValueKind {
        if let Some(reason) = Self::invalid_operand(&f, &g) {
            return self.invalidate(reason);
        }
        if g.unit.is_some() {
            return self.invalidate(ValueError::IncompatibleUnit);
        }
        let unit = match f.unit {
            None => None,
            Some(u) => {
                #[allow(clippy::cast_possible_truncation)]
                let exponent = if g.is_real() && g.real.fract() == 0.0 && g.real.abs() <= f64::from(i8::MAX) {
                    u.pow(g.real as i32)
                } else {
                    None
                };
                match exponent {
                    Some(unit) => Some(unit),
                    None => return self.invalidate(ValueError::IncompatibleUnit),
                }
            }
        };
        if f.is_complex() || g.is_complex() {
            self.set_complex_from(f.to_complex().powc(g.to_complex()));
        } else {
            self.set_real(f.real.powf(g.real));
        }
        self.set_unit(unit);
        self.kind
    }

    /// Writes `-f`.
    pub fn negate(&mut self, f: NumericValue) -> ValueKind {
        *self = f;
        if self.kind != ValueKind::Invalid {
            self.real = -self.real;
            self.imaginary = -self.imaginary;
        }
        self.kind
    }

    fn invalid_operand(f: &NumericValue, g: &NumericValue) -> Option<ValueError> {
        if f.is_invalid() {
            Some(f.reason())
        } else if g.is_invalid() {
            Some(g.reason())
        } else {
            None
        }
    }

    fn additive_unit(f: &NumericValue, g: &NumericValue) -> Result<Option<Unit>, ValueError> {
        if let Some(reason) = Self::invalid_operand(f, g) {
            return Err(reason);
        }
        match (f.unit, g.unit) {
            (Some(u), Some(v)) if u != v => Err(ValueError::IncompatibleUnit),
            (u, v) => Ok(u.or(v)),
        }
    }
}

impl From<f64> for NumericValue {
    fn from(value: f64) -> Self {
        Self::real(value)
    }
}

impl From<Complex64> for NumericValue {
    fn from(c: Complex64) -> Self {
        Self::complex(c.re, c.im)
    }
}

macro_rules! binary_operator {
    ($trait:path, $method:ident, $op:ident) => {
        impl $trait for NumericValue {
            type Output = NumericValue;

            fn $method(self, rhs: NumericValue) -> NumericValue {
                let mut out = NumericValue::ZERO;
                NumericValue::$op(&mut out, self, rhs);
                out
            }
        }
    };
}

binary_operator!(std::ops::Add, add, add);
binary_operator!(std::ops::Sub, sub, subtract);
binary_operator!(std::ops::Mul, mul, multiply);
binary_operator!(std::ops::Div, div, divide);

impl Neg for NumericValue {
    type Output = NumericValue;

    fn neg(self) -> NumericValue {
        let mut out = NumericValue::ZERO;
        out.negate(self);
        out
    }
}

impl Zero for NumericValue {
    fn zero() -> Self {
        Self::ZERO
    }

    fn is_zero(&self) -> bool {
        NumericValue::is_zero(self)
    }
}

impl One for NumericValue {
    fn one() -> Self {
        Self::ONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_arithmetic() {
        let mut v = NumericValue::ZERO;
        assert_eq!(v.add(2.0.into(), 3.0.into()), ValueKind::Real);
        assert_eq!(v.re(), 5.0);
        v.multiply(v, 4.0.into());
        assert_eq!(v.re(), 20.0);
        v.divide(v, 8.0.into());
        assert_eq!(v.re(), 2.5);
    }

    #[test]
    fn test_complex_promotion() {
        let mut v = NumericValue::ZERO;
        v.add(NumericValue::real(1.0), NumericValue::complex(2.0, 3.0));
        assert!(v.is_complex());
        assert_eq!((v.re(), v.im()), (3.0, 3.0));

        // (1 + 2i)(3 - i) = 5 + 5i
        v.multiply(NumericValue::complex(1.0, 2.0), NumericValue::complex(3.0, -1.0));
        assert_eq!((v.re(), v.im()), (5.0, 5.0));
    }

    #[test]
    fn test_zero_imaginary_demotes() {
        let v = NumericValue::complex(1.0, 2.0) + NumericValue::complex(1.0, -2.0);
        assert!(v.is_real());
        assert_eq!(v.re(), 2.0);
    }

    #[test]
    fn test_smith_division() {
        // (5 + 5i) / (3 - i) = 1 + 2i
        let q = NumericValue::complex(5.0, 5.0) / NumericValue::complex(3.0, -1.0);
        assert!((q.re() - 1.0).abs() < 1e-12);
        assert!((q.im() - 2.0).abs() < 1e-12);

        // branch with |c| < |d|
        let q = NumericValue::complex(5.0, 5.0) / NumericValue::complex(1.0, -3.0);
        let expected = Complex64::new(5.0, 5.0) / Complex64::new(1.0, -3.0);
        assert!((q.re() - expected.re).abs() < 1e-12);
        assert!((q.im() - expected.im).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_propagates_reason() {
        let bad = NumericValue::invalid(ValueError::NotAReal);
        let v = bad + NumericValue::ONE;
        assert!(v.is_invalid());
        assert_eq!(v.error(), Some(ValueError::NotAReal));
        assert!(v.is_nan());
        assert!(!v.is_zero());
        assert!(v.re().is_nan() && v.im().is_nan());
    }

    #[test]
    fn test_unit_rules() {
        let a = NumericValue::real(1.0).with_unit(Unit::kilometer());
        assert_eq!(a.re(), 1000.0);
        assert_eq!(a.unit(), Some(Unit::meter()));

        let b = NumericValue::real(2.0).with_unit(Unit::second());
        let sum = a + b;
        assert_eq!(sum.error(), Some(ValueError::IncompatibleUnit));

        // unit-less zero combines with anything
        let c = a + NumericValue::ZERO;
        assert_eq!(c.unit(), Some(Unit::meter()));

        let speed = a / b;
        assert_eq!(speed.re(), 500.0);
        assert_eq!(speed.unit(), Some(Unit::meter().divide(&Unit::second())));

        let ratio = a / a;
        assert_eq!(ratio.unit(), None);
    }

    #[test]
    fn test_pow_units() {
        let mut v = NumericValue::ZERO;
        let m = NumericValue::real(3.0).with_unit(Unit::meter());
        v.pow(m, 2.0.into());
        assert_eq!(v.re(), 9.0);
        assert_eq!(v.unit(), Unit::meter().pow(2));

        v.pow(m, 0.5.into());
        assert_eq!(v.error(), Some(ValueError::IncompatibleUnit));
    }

    #[test]
    fn test_real_pow_and_complex_pow() {
        let mut v = NumericValue::ZERO;
        v.pow(2.0.into(), 10.0.into());
        assert_eq!(v.re(), 1024.0);

        v.pow(NumericValue::complex(0.0, 1.0), 2.0.into());
        assert!((v.re() + 1.0).abs() < 1e-12);
        assert!(v.im().abs() < 1e-12);
    }

    #[test]
    fn test_nan_detection() {
        assert!(NumericValue::real(f64::INFINITY).is_nan());
        assert!(NumericValue::complex(1.0, f64::NAN).is_nan());
        assert!(!NumericValue::real(1.0).is_nan());
    }
}
