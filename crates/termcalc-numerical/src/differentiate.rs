//! Numerical derivatives by Ridders' extrapolation.
//!
//! Central differences at geometrically shrinking step sizes are
//! extrapolated to zero step in a Neville tableau; the entry with the
//! smallest error estimate wins.

use num_complex::Complex64;
use termcalc_value::{NumericValue, ValueError, ValueKind};
use tracing::trace;

use crate::sampler::{CalculationStatus, Estimate, Part, Sampler};

/// Size of the extrapolation tableau.
pub const RIDDERS_MAX_ITERATIONS: usize = 10;

/// Step shrink factor per tableau column.
pub const RIDDERS_SHRINK: f64 = 1.4;

/// Initial step size.
pub const RIDDERS_INITIAL_STEP: f64 = 0.05;

fn central_difference<S: Sampler>(
    sampler: &mut S,
    part: Part,
    z: Complex64,
    h: f64,
    complex: &mut bool,
) -> Result<f64, S::Error> {
    let mut right = NumericValue::ZERO;
    let mut left = NumericValue::ZERO;
    sampler.sample(NumericValue::complex(z.re + h, z.im), &mut right)?;
    sampler.sample(NumericValue::complex(z.re - h, z.im), &mut left)?;
    *complex |= right.is_complex() || left.is_complex();
    Ok((part.of(&right) - part.of(&left)) / (2.0 * h))
}

/// Derivative of one component of the sampled function at `z` along the real axis.
///
/// `h` need not be small; it should be a step over which the function
/// changes substantially. Stops once the error estimate grows to twice
/// the best one seen.
///
/// # Errors
///
/// Returns the sampler's interruption signal.
pub fn ridders_derivative<S: Sampler>(
    sampler: &mut S,
    part: Part,
    z: Complex64,
    h: f64,
) -> Result<Estimate, S::Error> {
    const N: usize = RIDDERS_MAX_ITERATIONS;
    let con2 = RIDDERS_SHRINK * RIDDERS_SHRINK;
    let mut err = 1.0e30;
    let mut hh = h;
    let mut a = [[0.0_f64; N]; N];
    let mut estimate = Estimate::new();
    let mut complex = false;

    a[0][0] = central_difference(sampler, part, z, hh, &mut complex)?;
    for i in 1..N {
        sampler.checkpoint()?;
        estimate.iterations = i;
        hh /= RIDDERS_SHRINK;
        a[0][i] = central_difference(sampler, part, z, hh, &mut complex)?;
        let mut fac = con2;
        for j in 1..=i {
            a[j][i] = (a[j - 1][i] * fac - a[j - 1][i - 1]) / (fac - 1.0);
            fac *= con2;
            let errt = (a[j][i] - a[j - 1][i])
                .abs()
                .max((a[j][i] - a[j - 1][i - 1]).abs());
            if errt <= err {
                err = errt;
                estimate.value = a[j][i];
            }
        }
        trace!(stage = i, error = err, "ridders tableau column");
        if (a[i][i] - a[i - 1][i - 1]).abs() >= 2.0 * err {
            break;
        }
    }
    if complex {
        estimate.status = CalculationStatus::IsComplex;
    }
    Ok(estimate)
}

/// Writes the numerical derivative of the sampled function at `at` into `out`.
///
/// The imaginary part is differentiated separately when a complex sample was seen.
///
/// # Errors
///
/// Returns the sampler's interruption signal.
pub fn numerical_derivative<S: Sampler>(
    sampler: &mut S,
    at: &NumericValue,
    out: &mut NumericValue,
) -> Result<ValueKind, S::Error> {
    if at.is_nan() {
        return Ok(out.invalidate(ValueError::NotANumber));
    }
    let z = at.to_complex();
    let re = ridders_derivative(sampler, Part::Re, z, RIDDERS_INITIAL_STEP)?;
    if re.is_complex() {
        let im = ridders_derivative(sampler, Part::Im, z, RIDDERS_INITIAL_STEP)?;
        Ok(out.set_complex(re.value, im.value))
    } else {
        Ok(out.set_real(re.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::FnSampler;

    #[test]
    fn test_polynomial() {
        let mut s = FnSampler::new(|x: NumericValue| x * x * x);
        let mut out = NumericValue::ZERO;
        numerical_derivative(&mut s, &2.0.into(), &mut out).unwrap();
        assert!(out.is_real());
        assert!((out.re() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_exponential() {
        let mut s = FnSampler::new(|x: NumericValue| NumericValue::real(x.re().exp()));
        let estimate = ridders_derivative(&mut s, Part::Re, Complex64::new(1.0, 0.0), 0.05).unwrap();
        assert!((estimate.value - std::f64::consts::E).abs() < 1e-9);
        assert_eq!(estimate.status, CalculationStatus::None);
    }

    #[test]
    fn test_complex_function() {
        // d/dx (x² + i·x) = 2x + i
        let mut s = FnSampler::new(|x: NumericValue| NumericValue::complex(x.re() * x.re(), x.re()));
        let mut out = NumericValue::ZERO;
        numerical_derivative(&mut s, &3.0.into(), &mut out).unwrap();
        assert!(out.is_complex());
        assert!((out.re() - 6.0).abs() < 1e-9);
        assert!((out.im() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_point() {
        let mut s = FnSampler::new(|x: NumericValue| x);
        let mut out = NumericValue::ZERO;
        numerical_derivative(&mut s, &NumericValue::invalid(ValueError::NotAReal), &mut out).unwrap();
        assert_eq!(out.error(), Some(ValueError::NotANumber));
    }
}
