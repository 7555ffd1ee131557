//! Summation and product over an integer range, and their derivatives.
//!
//! The first term is assigned rather than combined with a seed, so the
//! accumulator takes over its unit and kind. An empty range gives 0 for
//! sums and 1 for products. Iteration stops early once the accumulator
//! is no longer a finite number.

use termcalc_value::{NumericValue, ValueKind};
use tracing::trace;

use crate::sampler::Sampler;

#[allow(clippy::cast_precision_loss)]
fn index(i: i64) -> NumericValue {
    NumericValue::real(i as f64)
}

/// Writes `Σ_{i=min}^{max} f(i)` into `out`.
///
/// # Errors
///
/// Returns the sampler's interruption signal.
pub fn summation<S: Sampler>(
    sampler: &mut S,
    min: i64,
    max: i64,
    out: &mut NumericValue,
) -> Result<ValueKind, S::Error> {
    accumulate(sampler, min, max, out, Accumulation::Sum, false)
}

/// Writes `Σ_{i=min}^{max} f'(i)` into `out`.
///
/// # Errors
///
/// Returns the sampler's interruption signal.
pub fn summation_derivative<S: Sampler>(
    sampler: &mut S,
    min: i64,
    max: i64,
    out: &mut NumericValue,
) -> Result<ValueKind, S::Error> {
    accumulate(sampler, min, max, out, Accumulation::Sum, true)
}

/// Writes `∏_{i=min}^{max} f(i)` into `out`.
///
/// # Errors
///
/// Returns the sampler's interruption signal.
pub fn product<S: Sampler>(
    sampler: &mut S,
    min: i64,
    max: i64,
    out: &mut NumericValue,
) -> Result<ValueKind, S::Error> {
    accumulate(sampler, min, max, out, Accumulation::Product, false)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Accumulation {
    Sum,
    Product,
}

fn accumulate<S: Sampler>(
    sampler: &mut S,
    min: i64,
    max: i64,
    out: &mut NumericValue,
    accumulation: Accumulation,
    derivative: bool,
) -> Result<ValueKind, S::Error> {
    match accumulation {
        Accumulation::Sum => out.set_real(0.0),
        Accumulation::Product => out.set_real(1.0),
    };
    let mut term = NumericValue::ZERO;
    for i in min..=max {
        sampler.checkpoint()?;
        if derivative {
            sampler.sample_derivative(index(i), &mut term)?;
        } else {
            sampler.sample(index(i), &mut term)?;
        }
        if i == min {
            out.assign(term);
        } else if accumulation == Accumulation::Sum {
            out.add(*out, term);
        } else {
            out.multiply(*out, term);
        }
        if out.is_nan() {
            trace!(index = i, "accumulator is not a number, stopping");
            break;
        }
    }
    Ok(out.kind())
}

/// Writes the derivative of `∏_{i=min}^{max} f(i)` into `out`.
///
/// Uses the product rule over all factors: for each `k` the term is
/// `∏_{i<k} f(i) · f'(k) · ∏_{i>k} f(i)`. The prefix product is carried
/// along; the suffix product is recomputed for each `k`.
///
/// # Errors
///
/// Returns the sampler's interruption signal.
pub fn product_derivative<S: Sampler>(
    sampler: &mut S,
    min: i64,
    max: i64,
    out: &mut NumericValue,
) -> Result<ValueKind, S::Error> {
    out.set_real(0.0);
    let mut prefix = NumericValue::ONE;
    let mut suffix = NumericValue::ONE;
    let mut term = NumericValue::ZERO;
    for k in min..=max {
        sampler.checkpoint()?;
        suffix.set_real(1.0);
        for m in k.saturating_add(1)..=max {
            sampler.sample(index(m), &mut term)?;
            suffix.multiply(suffix, term);
            if suffix.is_nan() {
                break;
            }
        }
        sampler.sample_derivative(index(k), &mut term)?;
        term.multiply(term, prefix);
        term.multiply(term, suffix);
        out.add(*out, term);
        if out.is_nan() {
            trace!(index = k, "accumulator is not a number, stopping");
            break;
        }
        sampler.sample(index(k), &mut term)?;
        prefix.multiply(prefix, term);
    }
    Ok(out.kind())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::FnSampler;
    use termcalc_value::{Unit, ValueError};

    #[test]
    fn test_sum_and_product_of_index() {
        let mut s = FnSampler::new(|i| i);
        let mut out = NumericValue::ZERO;

        summation(&mut s, 1, 5, &mut out).unwrap();
        assert_eq!(out.re(), 15.0);

        product(&mut s, 1, 4, &mut out).unwrap();
        assert_eq!(out.re(), 24.0);
    }

    #[test]
    fn test_empty_ranges() {
        let mut s = FnSampler::new(|i| i);
        let mut out = NumericValue::default();

        summation(&mut s, 3, 1, &mut out).unwrap();
        assert_eq!(out.re(), 0.0);

        product(&mut s, 3, 1, &mut out).unwrap();
        assert_eq!(out.re(), 1.0);
    }

    #[test]
    fn test_first_term_keeps_unit() {
        let mut s = FnSampler::new(|i: NumericValue| NumericValue::real(i.re()).with_unit(Unit::meter()));
        let mut out = NumericValue::ZERO;
        summation(&mut s, 1, 3, &mut out).unwrap();
        assert_eq!(out.re(), 6.0);
        assert_eq!(out.unit(), Some(Unit::meter()));
    }

    #[test]
    fn test_stops_on_invalid_term() {
        let mut calls = 0;
        let mut s = FnSampler::new(|i: NumericValue| {
            calls += 1;
            if i.re() >= 3.0 {
                NumericValue::invalid(ValueError::NotANumber)
            } else {
                i
            }
        });
        let mut out = NumericValue::ZERO;
        summation(&mut s, 1, 100, &mut out).unwrap();
        assert!(out.is_invalid());
        drop(s);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_product_rule() {
        // f_i(x) = x + i at x = 2, i = 1..3: d/dx ∏ (x + i) = Σ_k ∏_{i≠k} (x + i)
        let x = 2.0;
        let mut s = FnSampler::with_derivative(
            move |i: NumericValue| NumericValue::real(x + i.re()),
            |_| NumericValue::ONE,
        );
        let mut out = NumericValue::ZERO;
        product_derivative(&mut s, 1, 3, &mut out).unwrap();
        // (4·5) + (3·5) + (3·4) = 47
        assert_eq!(out.re(), 47.0);

        summation_derivative(&mut s, 1, 3, &mut out).unwrap();
        assert_eq!(out.re(), 3.0);
    }
}
