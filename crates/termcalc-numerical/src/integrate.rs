//! Definite integrals by Simpson's rule on refined trapezoids.
//!
//! Stage 0 is the two-point trapezoid. Stage `n` adds `2^(n-1)` midpoints
//! and halves the spacing, reusing the previous stage's sum. Each stage
//! yields a Simpson estimate `(4·T_n − T_{n-1}) / 3`; two consecutive
//! estimates within the accuracy end the refinement.

use termcalc_value::{NumericValue, Unit, ValueError};
use tracing::{debug, trace};

use crate::sampler::{CalculationStatus, Estimate, Part, Sampler};

/// Maximum number of trapezoid refinement stages.
pub const SIMPSON_MAX_ITERATIONS: usize = 15;

struct Trapezoid {
    value: f64,
    unit: Option<Unit>,
}

fn point(x: f64, unit: Option<Unit>) -> NumericValue {
    let mut at = NumericValue::ZERO;
    at.set_real_with_unit(x, unit);
    at
}

/// Runs stage `n` of the trapezoid rule, updating `trap`.
///
/// Returns true if any sample was complex.
fn trapezoid_stage<S: Sampler>(
    sampler: &mut S,
    part: Part,
    min: f64,
    max: f64,
    n: usize,
    arg_unit: Option<Unit>,
    trap: &mut Trapezoid,
) -> Result<bool, S::Error> {
    let mut sample = NumericValue::ZERO;
    if n == 0 {
        let mut lower = NumericValue::ZERO;
        sampler.sample(point(min, arg_unit), &mut lower)?;
        sampler.sample(point(max, arg_unit), &mut sample)?;
        trap.value = 0.5 * (max - min) * (part.of(&lower) + part.of(&sample));
        trap.unit = match (lower.unit(), sample.unit()) {
            (Some(u), Some(v)) if u == v => Some(u),
            _ => None,
        };
        return Ok(lower.is_complex() || sample.is_complex());
    }

    let mut complex = false;
    let np = 1u64 << (n - 1);
    #[allow(clippy::cast_precision_loss)]
    let spacing = (max - min) / np as f64;
    let mut x = min + 0.5 * spacing;
    let mut sum = 0.0;
    for _ in 0..np {
        sampler.sample(point(x, arg_unit), &mut sample)?;
        sum += part.of(&sample);
        complex |= sample.is_complex();
        x += spacing;
    }
    trap.value = 0.5 * (trap.value + sum * spacing);
    Ok(complex)
}

/// Integrates one component of the sampled function over `[min, max]`.
///
/// The returned unit is the integrand's unit, taken from the first stage.
///
/// # Errors
///
/// Returns the sampler's interruption signal.
pub fn integrate_simpson<S: Sampler>(
    sampler: &mut S,
    part: Part,
    min: f64,
    max: f64,
    accuracy: f64,
    arg_unit: Option<Unit>,
) -> Result<(Estimate, Option<Unit>), S::Error> {
    let mut estimate = Estimate::new();
    let mut trap = Trapezoid {
        value: 0.0,
        unit: None,
    };
    if trapezoid_stage(sampler, part, min, max, 0, arg_unit, &mut trap)? {
        estimate.status = CalculationStatus::IsComplex;
    }
    let unit = trap.unit;
    let mut old_t = trap.value;
    let mut old_s = 0.0;
    for iter in 1..=SIMPSON_MAX_ITERATIONS {
        sampler.checkpoint()?;
        if trapezoid_stage(sampler, part, min, max, iter, arg_unit, &mut trap)? {
            estimate.status = CalculationStatus::IsComplex;
        }
        estimate.iterations = iter;
        let t = trap.value;
        if !t.is_finite() {
            return Ok((Estimate::new().with_status(CalculationStatus::None), unit));
        }
        let s = (4.0 * t - old_t) / 3.0;
        trace!(stage = iter, estimate = s, "simpson stage");
        if iter > 1 && (s - old_s).abs() <= accuracy {
            return Ok((estimate.with_value(s), unit));
        }
        old_s = s;
        old_t = t;
    }
    debug!(
        accuracy,
        stages = estimate.iterations,
        "simpson refinement did not converge, using last estimate"
    );
    estimate.converged = false;
    Ok((estimate.with_value(old_s), unit))
}

/// Writes `∫_{min}^{max} f` into `out`.
///
/// Bounds must be real; their units must agree when both are present.
/// The integration variable carries the lower bound's unit and the result
/// is the integrand's unit times that unit. The imaginary part is only
/// integrated when a complex sample was seen.
///
/// Returns `MaxIterations` when either part did not reach the accuracy;
/// `out` then holds the last estimate.
///
/// # Errors
///
/// Returns the sampler's interruption signal.
pub fn integrate<S: Sampler>(
    sampler: &mut S,
    min: &NumericValue,
    max: &NumericValue,
    accuracy: f64,
    out: &mut NumericValue,
) -> Result<CalculationStatus, S::Error> {
    if let (Some(u), Some(v)) = (min.unit(), max.unit()) {
        if u != v {
            out.invalidate(ValueError::IncompatibleUnit);
            return Ok(CalculationStatus::None);
        }
    }
    let arg_unit = min.unit();
    let (re, unit) = integrate_simpson(sampler, Part::Re, min.re(), max.re(), accuracy, arg_unit)?;
    if re.value.is_nan() {
        out.invalidate(ValueError::NotANumber);
        return Ok(CalculationStatus::None);
    }
    let mut converged = re.converged;
    let mut result = NumericValue::ZERO;
    if re.is_complex() {
        let (im, _) = integrate_simpson(sampler, Part::Im, min.re(), max.re(), accuracy, arg_unit)?;
        converged &= im.converged;
        result.set_complex(re.value, im.value);
    } else {
        result.set_real(re.value);
    }
    result.set_unit(unit);
    let mut scale = NumericValue::ONE;
    scale.set_unit(arg_unit);
    out.multiply(result, scale);
    Ok(if converged {
        CalculationStatus::None
    } else {
        CalculationStatus::MaxIterations
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::FnSampler;

    #[test]
    fn test_square() {
        let mut s = FnSampler::new(|x: NumericValue| x * x);
        let mut out = NumericValue::ZERO;
        integrate(&mut s, &0.0.into(), &1.0.into(), 1e-6, &mut out).unwrap();
        assert!(out.is_real());
        assert!((out.re() - 1.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_sine_over_half_period() {
        let mut s = FnSampler::new(|x: NumericValue| NumericValue::real(x.re().sin()));
        let (estimate, _) =
            integrate_simpson(&mut s, Part::Re, 0.0, std::f64::consts::PI, 1e-10, None).unwrap();
        assert!((estimate.value - 2.0).abs() < 1e-8);
        assert!(estimate.iterations <= SIMPSON_MAX_ITERATIONS);
    }

    #[test]
    fn test_complex_integrand() {
        // ∫_0^1 (x + i·2x) dx = 0.5 + i
        let mut s = FnSampler::new(|x: NumericValue| NumericValue::complex(x.re(), 2.0 * x.re()));
        let mut out = NumericValue::ZERO;
        integrate(&mut s, &0.0.into(), &1.0.into(), 1e-9, &mut out).unwrap();
        assert!(out.is_complex());
        assert!((out.re() - 0.5).abs() < 1e-9);
        assert!((out.im() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_units() {
        // ∫_0^2 s (3 m/s) ds = 6 m
        let velocity = Unit::meter().divide(&Unit::second());
        let mut s = FnSampler::new(move |t: NumericValue| {
            assert_eq!(t.unit(), Some(Unit::second()));
            NumericValue::real(3.0).with_unit(velocity)
        });
        let mut out = NumericValue::ZERO;
        let lo = NumericValue::real(0.0).with_unit(Unit::second());
        let hi = NumericValue::real(2.0).with_unit(Unit::second());
        integrate(&mut s, &lo, &hi, 1e-9, &mut out).unwrap();
        assert!((out.re() - 6.0).abs() < 1e-12);
        assert_eq!(out.unit(), Some(Unit::meter()));

        let bad = NumericValue::real(2.0).with_unit(Unit::meter());
        integrate(&mut s, &lo, &bad, 1e-9, &mut out).unwrap();
        assert_eq!(out.error(), Some(ValueError::IncompatibleUnit));
    }

    #[test]
    fn test_reports_exhausted_refinement() {
        // sin(1/x) oscillates too fast near 0 for 15 stages at this accuracy
        let mut s = FnSampler::new(|x: NumericValue| NumericValue::real((1.0 / x.re()).sin()));
        let mut out = NumericValue::ZERO;
        let status = integrate(&mut s, &1e-4.into(), &1.0.into(), 1e-14, &mut out).unwrap();
        assert_eq!(status, CalculationStatus::MaxIterations);
        assert!(out.is_real());

        let mut square = FnSampler::new(|x: NumericValue| x * x);
        let status = integrate(&mut square, &0.0.into(), &1.0.into(), 1e-6, &mut out).unwrap();
        assert_eq!(status, CalculationStatus::None);
    }

    #[test]
    fn test_non_finite_integrand() {
        let mut s = FnSampler::new(|x: NumericValue| NumericValue::real(1.0 / x.re()));
        let mut out = NumericValue::ZERO;
        integrate(&mut s, &0.0.into(), &1.0.into(), 1e-6, &mut out).unwrap();
        assert_eq!(out.error(), Some(ValueError::NotANumber));
    }
}
