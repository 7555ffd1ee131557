//! Built-in functions on [`NumericValue`].
//!
//! Real arguments stay on the real line whenever the result is real; a
//! complex result is produced only for complex arguments or when the real
//! function leaves its domain (`sqrt(-1)`, `log(-1)`).

use crate::unit::Unit;
use crate::value::{NumericValue, ValueError, ValueKind};
use num_complex::Complex64;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Roots of `nth_root` whose imaginary part is below this are taken as real.
pub const NTH_ROOT_TOLERANCE: f64 = 1e-15;

/// The catalog of built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum FunctionKind {
    Sin,
    Cos,
    Tan,
    Csc,
    Sec,
    Cot,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Csch,
    Sech,
    Coth,
    Exp,
    Log,
    Log10,
    Sqrt,
    Abs,
    Ceil,
    Floor,
    Conj,
    Random,
    /// `pow(f, g)`
    Pow,
    /// `nthRoot(n, f)`
    NthRoot,
}

const NAMES: &[(FunctionKind, &str)] = &[
    (FunctionKind::Sin, "sin"),
    (FunctionKind::Cos, "cos"),
    (FunctionKind::Tan, "tan"),
    (FunctionKind::Csc, "csc"),
    (FunctionKind::Sec, "sec"),
    (FunctionKind::Cot, "cot"),
    (FunctionKind::Asin, "asin"),
    (FunctionKind::Acos, "acos"),
    (FunctionKind::Atan, "atan"),
    (FunctionKind::Sinh, "sinh"),
    (FunctionKind::Cosh, "cosh"),
    (FunctionKind::Tanh, "tanh"),
    (FunctionKind::Csch, "csch"),
    (FunctionKind::Sech, "sech"),
    (FunctionKind::Coth, "coth"),
    (FunctionKind::Exp, "exp"),
    (FunctionKind::Log, "log"),
    (FunctionKind::Log10, "log10"),
    (FunctionKind::Sqrt, "sqrt"),
    (FunctionKind::Abs, "abs"),
    (FunctionKind::Ceil, "ceil"),
    (FunctionKind::Floor, "floor"),
    (FunctionKind::Conj, "conj"),
    (FunctionKind::Random, "random"),
    (FunctionKind::Pow, "pow"),
    (FunctionKind::NthRoot, "nthRoot"),
];

impl FunctionKind {
    /// Looks up a function by its name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        NAMES.iter().find(|(_, n)| *n == name).map(|(k, _)| *k)
    }

    /// Returns the function name.
    #[must_use]
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(k, _)| *k == self)
            .map_or("?", |(_, n)| n)
    }

    /// Number of arguments.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::Pow | Self::NthRoot => 2,
            _ => 1,
        }
    }

    /// Returns true if the function has an analytic derivative.
    #[must_use]
    pub fn is_smooth(self) -> bool {
        !matches!(
            self,
            Self::Abs | Self::Ceil | Self::Floor | Self::Conj | Self::Random | Self::NthRoot
        )
    }

    /// Returns true if the result keeps the argument's unit.
    #[must_use]
    pub fn keeps_unit(self) -> bool {
        matches!(
            self,
            Self::Abs | Self::Ceil | Self::Floor | Self::Conj | Self::Random
        )
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl NumericValue {
    /// Applies a one-argument function to `g`, writing the result into `self`.
    ///
    /// `Pow` and `NthRoot` take two arguments and are rejected here; use
    /// [`NumericValue::pow`] and [`NumericValue::nth_root`].
    pub fn apply(&mut self, kind: FunctionKind, g: NumericValue) -> ValueKind {
        if g.is_invalid() {
            return self.invalidate(g.reason());
        }
        let unit = match Self::unary_unit(kind, g.unit()) {
            Ok(unit) => unit,
            Err(reason) => return self.invalidate(reason),
        };
        let x = g.re();
        let z = g.to_complex();
        let complex = g.is_complex();
        match kind {
            FunctionKind::Sin => self.real_or(complex, || x.sin(), || z.sin()),
            FunctionKind::Cos => self.real_or(complex, || x.cos(), || z.cos()),
            FunctionKind::Tan => self.real_or(complex, || x.tan(), || z.tan()),
            FunctionKind::Csc => self.real_or(complex, || x.sin().recip(), || z.sin().inv()),
            FunctionKind::Sec => self.real_or(complex, || x.cos().recip(), || z.cos().inv()),
            FunctionKind::Cot => self.real_or(complex, || x.tan().recip(), || z.tan().inv()),
            FunctionKind::Asin => self.real_or(complex, || x.asin(), || z.asin()),
            FunctionKind::Acos => self.real_or(complex, || x.acos(), || z.acos()),
            FunctionKind::Atan => self.real_or(complex, || x.atan(), || z.atan()),
            FunctionKind::Sinh => self.real_or(complex, || x.sinh(), || z.sinh()),
            FunctionKind::Cosh => self.real_or(complex, || x.cosh(), || z.cosh()),
            FunctionKind::Tanh => self.real_or(complex, || x.tanh(), || z.tanh()),
            FunctionKind::Csch => self.real_or(complex, || x.sinh().recip(), || z.sinh().inv()),
            FunctionKind::Sech => self.real_or(complex, || x.cosh().recip(), || z.cosh().inv()),
            FunctionKind::Coth => self.real_or(complex, || x.tanh().recip(), || z.tanh().inv()),
            FunctionKind::Exp => self.real_or(complex, || x.exp(), || z.exp()),
            FunctionKind::Log => self.real_or(complex || x <= 0.0, || x.ln(), || z.ln()),
            FunctionKind::Log10 => {
                self.real_or(complex || x <= 0.0, || x.log10(), || z.ln() / 10f64.ln())
            }
            FunctionKind::Sqrt => self.real_or(complex || x < 0.0, || x.sqrt(), || z.sqrt()),
            FunctionKind::Abs => self.set_real(if complex { x.hypot(g.im()) } else { x.abs() }),
            FunctionKind::Ceil => self.set_complex(x.ceil(), g.im().ceil()),
            FunctionKind::Floor => self.set_complex(x.floor(), g.im().floor()),
            FunctionKind::Conj => self.set_complex(x, -g.im()),
            FunctionKind::Random => {
                let mut rng = rand::thread_rng();
                let re = rng.gen::<f64>() * x;
                let im = if complex { rng.gen::<f64>() * g.im() } else { 0.0 };
                self.set_complex(re, im)
            }
            FunctionKind::Pow | FunctionKind::NthRoot => {
                return self.invalidate(ValueError::NotANumber)
            }
        };
        self.set_unit(unit);
        self.kind()
    }

    /// Writes the `n`-th root of `g`.
    ///
    /// A real `g` keeps its real root when one exists: `g^(1/n)` for
    /// `g ≥ 0` and `-|g|^(1/n)` for odd `n`. Otherwise the principal root
    /// is written, as a real value when its imaginary part is within
    /// [`NTH_ROOT_TOLERANCE`] of zero.
    pub fn nth_root(&mut self, g: NumericValue, n: i32) -> ValueKind {
        if g.is_invalid() {
            return self.invalidate(g.reason());
        }
        if n <= 0 {
            return self.invalidate(ValueError::NotANumber);
        }
        let unit = match g.unit() {
            None => None,
            Some(u) => match u.root(n) {
                Some(root) => Some(root),
                None => return self.invalidate(ValueError::IncompatibleUnit),
            },
        };
        let exponent = 1.0 / f64::from(n);
        let real_root = if g.is_real() && g.re() >= 0.0 {
            Some(g.re().powf(exponent))
        } else if g.is_real() && n % 2 == 1 {
            Some(-(-g.re()).powf(exponent))
        } else {
            None
        };
        match real_root {
            Some(root) => {
                self.set_real(root);
            }
            None => {
                let (r, theta) = g.to_complex().to_polar();
                let root = Complex64::from_polar(r.powf(exponent), theta * exponent);
                if root.im.abs() < NTH_ROOT_TOLERANCE {
                    self.set_real(root.re);
                } else {
                    self.set_complex_from(root);
                }
            }
        }
        self.set_unit(unit);
        self.kind()
    }

    fn real_or(
        &mut self,
        complex: bool,
        real: impl FnOnce() -> f64,
        complex_fn: impl FnOnce() -> Complex64,
    ) -> ValueKind {
        if complex {
            self.set_complex_from(complex_fn())
        } else {
            self.set_real(real())
        }
    }

    fn unary_unit(kind: FunctionKind, unit: Option<Unit>) -> Result<Option<Unit>, ValueError> {
        let Some(unit) = unit else {
            return Ok(None);
        };
        if kind.keeps_unit() {
            Ok(Some(unit))
        } else if kind == FunctionKind::Sqrt {
            unit.root(2).map(Some).ok_or(ValueError::IncompatibleUnit)
        } else {
            Err(ValueError::IncompatibleUnit)
        }
    }
}

macro_rules! unary_methods {
    ($($method:ident => $kind:ident),* $(,)?) => {
        impl NumericValue {
            $(
                #[doc = concat!("Writes `", stringify!($method), "(g)`.")]
                pub fn $method(&mut self, g: NumericValue) -> ValueKind {
                    self.apply(FunctionKind::$kind, g)
                }
            )*
        }
    };
}

unary_methods! {
    sin => Sin, cos => Cos, tan => Tan,
    csc => Csc, sec => Sec, cot => Cot,
    asin => Asin, acos => Acos, atan => Atan,
    sinh => Sinh, cosh => Cosh, tanh => Tanh,
    csch => Csch, sech => Sech, coth => Coth,
    exp => Exp, log => Log, log10 => Log10, sqrt => Sqrt,
    abs => Abs, ceil => Ceil, floor => Floor, conj => Conj, random => Random,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_names_round_trip() {
        for &(kind, name) in NAMES {
            assert_eq!(FunctionKind::from_name(name), Some(kind));
            assert_eq!(kind.name(), name);
        }
        assert_eq!(FunctionKind::from_name("nope"), None);
        assert_eq!(FunctionKind::Pow.arity(), 2);
    }

    #[test]
    fn test_real_domain_escapes_to_complex() {
        let mut v = NumericValue::ZERO;
        v.sqrt((-4.0).into());
        assert!(v.is_complex());
        assert!(close(v.re(), 0.0) && close(v.im(), 2.0));

        v.log((-1.0).into());
        assert!(close(v.re(), 0.0) && close(v.im(), PI));

        v.log(std::f64::consts::E.into());
        assert!(v.is_real() && close(v.re(), 1.0));
    }

    #[test]
    fn test_reciprocal_functions() {
        let mut v = NumericValue::ZERO;
        v.sec(0.0.into());
        assert!(close(v.re(), 1.0));
        v.coth(1.0.into());
        assert!(close(v.re(), 1.0 / 1f64.tanh()));
    }

    #[test]
    fn test_abs_of_complex() {
        let mut v = NumericValue::ZERO;
        v.abs(NumericValue::complex(3.0, 4.0));
        assert!(v.is_real());
        assert_eq!(v.re(), 5.0);
    }

    #[test]
    fn test_nth_root_prefers_real_root() {
        let mut v = NumericValue::ZERO;
        v.nth_root((-8.0).into(), 3);
        assert!(v.is_real());
        assert!(close(v.re(), -2.0));

        v.nth_root(16.0.into(), 4);
        assert!(v.is_real());
        assert!(close(v.re(), 2.0));

        v.nth_root((-4.0).into(), 2);
        assert!(v.is_complex());
        assert!(close(v.re(), 0.0) && close(v.im(), 2.0));

        v.nth_root(4.0.into(), 0);
        assert_eq!(v.error(), Some(ValueError::NotANumber));
    }

    #[test]
    fn test_nth_root_of_huge_degree() {
        let n = 400_000_001;
        let mut v = NumericValue::ZERO;
        v.nth_root((-2.0).into(), n);
        assert!(v.is_real());
        assert!((v.re() + 1.000_000_001_7).abs() < 1e-10);

        v.nth_root(2.0.into(), i32::MAX - 1);
        assert!(v.is_real());
        assert!((v.re() - 1.0).abs() < 1e-9);

        // even degree of a negative number: principal root e^(iπ/n)·|g|^(1/n)
        v.nth_root((-1.0).into(), i32::MAX - 1);
        assert!(v.is_complex());
        assert!((v.re() - 1.0).abs() < 1e-9 && v.im().abs() < 1e-8);
    }

    #[test]
    fn test_units_through_functions() {
        let mut v = NumericValue::ZERO;
        let area = NumericValue::real(9.0).with_unit(Unit::meter().pow(2).unwrap());
        v.sqrt(area);
        assert_eq!(v.re(), 3.0);
        assert_eq!(v.unit(), Some(Unit::meter()));

        let length = NumericValue::real(-2.0).with_unit(Unit::meter());
        v.abs(length);
        assert_eq!(v.unit(), Some(Unit::meter()));

        v.sin(length);
        assert_eq!(v.error(), Some(ValueError::IncompatibleUnit));
    }

    #[test]
    fn test_random_is_bounded_by_argument() {
        let mut v = NumericValue::ZERO;
        for _ in 0..32 {
            v.random(10.0.into());
            assert!((0.0..10.0).contains(&v.re()));
        }
    }
}
