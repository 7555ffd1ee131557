//! Property-based tests for the loop algorithms.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::integrate::integrate;
    use crate::roots::ridders_root;
    use crate::sampler::{CalculationStatus, FnSampler};
    use crate::series::{product, summation};
    use termcalc_value::NumericValue;

    proptest! {
        #[test]
        fn arithmetic_series(n in 1i64..200) {
            let mut s = FnSampler::new(|i| i);
            let mut out = NumericValue::ZERO;
            summation(&mut s, 1, n, &mut out).unwrap();
            #[allow(clippy::cast_precision_loss)]
            let expected = (n * (n + 1) / 2) as f64;
            prop_assert_eq!(out.re(), expected);
        }

        #[test]
        fn factorial(n in 1i64..15) {
            let mut s = FnSampler::new(|i| i);
            let mut out = NumericValue::ZERO;
            product(&mut s, 1, n, &mut out).unwrap();
            #[allow(clippy::cast_precision_loss)]
            let expected = (1..=n).product::<i64>() as f64;
            prop_assert_eq!(out.re(), expected);
        }

        #[test]
        fn linear_integrals_are_exact(a in -10.0f64..10.0, b in -10.0f64..10.0, lo in -5.0f64..0.0, hi in 0.0f64..5.0) {
            let mut s = FnSampler::new(move |x: NumericValue| NumericValue::real(a * x.re() + b));
            let mut out = NumericValue::ZERO;
            integrate(&mut s, &lo.into(), &hi.into(), 1e-9, &mut out).unwrap();
            let expected = 0.5 * a * (hi * hi - lo * lo) + b * (hi - lo);
            prop_assert!((out.re() - expected).abs() < 1e-8);
        }

        #[test]
        fn bracketed_linear_roots(root in -5.0f64..5.0, slope in 0.5f64..4.0) {
            let mut s = FnSampler::new(move |x: NumericValue| NumericValue::real(slope * (x.re() - root)));
            let estimate = ridders_root(&mut s, -10.0, 10.0, 1e-10, None).unwrap();
            prop_assert_eq!(estimate.status, CalculationStatus::None);
            prop_assert!((estimate.value - root).abs() < 1e-8);
        }
    }
}
