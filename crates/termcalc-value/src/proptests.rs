//! Property-based tests for numeric values.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::unit::Unit;
    use crate::value::{NumericValue, ValueError};

    fn finite() -> impl Strategy<Value = f64> {
        -1.0e6..1.0e6
    }

    fn nonzero_imaginary() -> impl Strategy<Value = f64> {
        prop_oneof![-1.0e6..-0.5, 0.5..1.0e6]
    }

    fn complex_value() -> impl Strategy<Value = NumericValue> {
        (finite(), nonzero_imaginary()).prop_map(|(re, im)| NumericValue::complex(re, im))
    }

    fn any_value() -> impl Strategy<Value = NumericValue> {
        prop_oneof![finite().prop_map(NumericValue::real), complex_value()]
    }

    fn nonzero_value() -> impl Strategy<Value = NumericValue> {
        prop_oneof![
            prop_oneof![-1.0e3..-1.0e-3, 1.0e-3..1.0e3].prop_map(NumericValue::real),
            complex_value(),
        ]
    }

    fn close(a: f64, b: f64, scale: f64) -> bool {
        (a - b).abs() <= 1e-9 * scale.max(1.0)
    }

    proptest! {
        #[test]
        fn real_addition_is_exact(a in finite(), b in finite()) {
            let mut v = NumericValue::ZERO;
            v.add(a.into(), b.into());
            prop_assert!(v.is_real());
            prop_assert_eq!(v.re(), a + b);
        }

        #[test]
        fn complex_operand_promotes(a in finite(), b in finite(), im in nonzero_imaginary()) {
            let mut v = NumericValue::ZERO;
            v.add(a.into(), NumericValue::complex(b, im));
            prop_assert!(v.is_complex());
            prop_assert_eq!(v.re(), a + b);
            prop_assert_eq!(v.im(), im);

            v.add(NumericValue::complex(b, im), a.into());
            prop_assert!(v.is_complex());
            prop_assert_eq!(v.re(), b + a);
        }

        #[test]
        fn divide_undoes_multiply(a in any_value(), b in nonzero_value()) {
            let product = a * b;
            let back = product / b;
            let scale = a.re().abs().max(a.im().abs());
            prop_assert!(close(back.re(), a.re(), scale));
            prop_assert!(close(back.im(), a.im(), scale));
        }

        #[test]
        fn mismatched_units_never_add(a in finite(), b in finite()) {
            let m = NumericValue::real(a).with_unit(Unit::meter());
            let s = NumericValue::real(b).with_unit(Unit::second());
            prop_assert_eq!((m + s).error(), Some(ValueError::IncompatibleUnit));
            prop_assert_eq!((m - s).error(), Some(ValueError::IncompatibleUnit));
            prop_assert!((m * s).unit().is_some());
        }
    }
}
