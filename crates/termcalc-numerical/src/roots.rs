//! Bracketed root finding by Ridders' method.

use termcalc_value::{NumericValue, Unit, ValueError};
use tracing::{debug, trace};

use crate::sampler::{CalculationStatus, Estimate, Sampler};

/// Maximum number of Ridders iterations.
pub const ROOT_MAX_ITERATIONS: usize = 60;

const UNUSED: f64 = -1.11e30;

/// `|a|` with the sign of `b`.
fn sign(a: f64, b: f64) -> f64 {
    if b >= 0.0 {
        a.abs()
    } else {
        -a.abs()
    }
}

/// Samples the function at `x`, `None` if the sample is complex.
fn real_sample<S: Sampler>(
    sampler: &mut S,
    x: f64,
    unit: Option<Unit>,
) -> Result<Option<f64>, S::Error> {
    let mut at = NumericValue::ZERO;
    at.set_real_with_unit(x, unit);
    let mut value = NumericValue::ZERO;
    sampler.sample(at, &mut value)?;
    Ok((!value.is_complex()).then(|| value.re()))
}

/// Finds a root of the sampled function between `x1` and `x2` to within `xacc`.
///
/// The function must change sign over the bracket unless it vanishes at
/// one of the ends.
///
/// # Errors
///
/// Returns the sampler's interruption signal.
pub fn ridders_root<S: Sampler>(
    sampler: &mut S,
    x1: f64,
    x2: f64,
    xacc: f64,
    unit: Option<Unit>,
) -> Result<Estimate, S::Error> {
    let complex = Estimate::new().with_status(CalculationStatus::IsComplex);
    let Some(mut fl) = real_sample(sampler, x1, unit)? else {
        return Ok(complex);
    };
    let Some(mut fh) = real_sample(sampler, x2, unit)? else {
        return Ok(complex);
    };

    if !((fl > 0.0 && fh < 0.0) || (fl < 0.0 && fh > 0.0)) {
        if fl == 0.0 {
            return Ok(Estimate::new().with_value(x1));
        }
        if fh == 0.0 {
            return Ok(Estimate::new().with_value(x2));
        }
        return Ok(Estimate::new().with_status(CalculationStatus::RootNotBracketed));
    }

    let (mut xl, mut xh) = (x1, x2);
    let mut ans = UNUSED;
    let mut estimate = Estimate::new();
    for j in 1..=ROOT_MAX_ITERATIONS {
        sampler.checkpoint()?;
        estimate.iterations = j;
        let xm = 0.5 * (xl + xh);
        let Some(fm) = real_sample(sampler, xm, unit)? else {
            return Ok(complex);
        };
        let s = (fm * fm - fl * fh).sqrt();
        if s == 0.0 {
            return Ok(estimate.with_value(ans));
        }
        let direction = if fl >= fh { 1.0 } else { -1.0 };
        let xnew = xm + (xm - xl) * (direction * fm / s);
        if (xnew - ans).abs() <= xacc {
            return Ok(estimate.with_value(ans));
        }
        ans = xnew;
        let Some(fnew) = real_sample(sampler, ans, unit)? else {
            return Ok(complex);
        };
        if fnew == 0.0 {
            return Ok(estimate.with_value(ans));
        }
        if sign(fm, fnew) != fm {
            xl = xm;
            fl = fm;
            xh = ans;
            fh = fnew;
        } else if sign(fl, fnew) != fl {
            xh = ans;
            fh = fnew;
        } else if sign(fh, fnew) != fh {
            xl = ans;
            fl = fnew;
        }
        trace!(iteration = j, root = ans, width = (xh - xl).abs(), "ridders bracket");
        if (xh - xl).abs() <= xacc {
            return Ok(estimate.with_value(ans));
        }
    }
    estimate.converged = false;
    Ok(estimate.with_status(CalculationStatus::MaxIterations))
}

/// Writes the root of the sampled function within `[min, max]` into `out`.
///
/// Complex bounds give `PassedComplex`; a failed search gives `NotAReal`.
/// The index is bound with the lower bound's unit, which the root keeps.
///
/// # Errors
///
/// Returns the sampler's interruption signal.
pub fn solve<S: Sampler>(
    sampler: &mut S,
    min: &NumericValue,
    max: &NumericValue,
    accuracy: f64,
    out: &mut NumericValue,
) -> Result<CalculationStatus, S::Error> {
    if min.is_complex() || max.is_complex() {
        out.invalidate(ValueError::PassedComplex);
        return Ok(CalculationStatus::IsComplex);
    }
    if let (Some(u), Some(v)) = (min.unit(), max.unit()) {
        if u != v {
            out.invalidate(ValueError::IncompatibleUnit);
            return Ok(CalculationStatus::None);
        }
    }
    let unit = min.unit();
    let root = ridders_root(sampler, min.re(), max.re(), accuracy, unit)?;
    match root.status {
        CalculationStatus::None => {
            out.set_real_with_unit(root.value, unit);
        }
        status => {
            debug!(%status, iterations = root.iterations, "cannot solve");
            out.invalidate(ValueError::NotAReal);
        }
    }
    Ok(root.status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::FnSampler;

    fn square_minus_four() -> FnSampler<impl FnMut(NumericValue) -> NumericValue> {
        FnSampler::new(|x: NumericValue| NumericValue::real(x.re() * x.re() - 4.0))
    }

    #[test]
    fn test_bracketed_root() {
        let mut s = square_minus_four();
        let mut out = NumericValue::ZERO;
        let status = solve(&mut s, &0.0.into(), &3.0.into(), 1e-8, &mut out).unwrap();
        assert_eq!(status, CalculationStatus::None);
        assert!((out.re() - 2.0).abs() < 1e-8);
    }

    #[test]
    fn test_not_bracketed() {
        let mut s = square_minus_four();
        let mut out = NumericValue::ZERO;
        let status = solve(&mut s, &3.0.into(), &5.0.into(), 1e-8, &mut out).unwrap();
        assert_eq!(status, CalculationStatus::RootNotBracketed);
        assert_eq!(out.error(), Some(ValueError::NotAReal));
    }

    #[test]
    fn test_root_at_bound() {
        let mut s = square_minus_four();
        let estimate = ridders_root(&mut s, 2.0, 5.0, 1e-8, None).unwrap();
        assert_eq!(estimate.status, CalculationStatus::None);
        assert_eq!(estimate.value, 2.0);
    }

    #[test]
    fn test_complex_bounds_and_samples() {
        let mut s = square_minus_four();
        let mut out = NumericValue::ZERO;
        let status = solve(&mut s, &NumericValue::complex(0.0, 1.0), &3.0.into(), 1e-8, &mut out).unwrap();
        assert_eq!(status, CalculationStatus::IsComplex);
        assert_eq!(out.error(), Some(ValueError::PassedComplex));

        let mut c = FnSampler::new(|x: NumericValue| NumericValue::complex(x.re(), 1.0));
        let estimate = ridders_root(&mut c, -1.0, 1.0, 1e-8, None).unwrap();
        assert!(estimate.is_complex());
    }

    #[test]
    fn test_cosine_root() {
        let mut s = FnSampler::new(|x: NumericValue| NumericValue::real(x.re().cos()));
        let estimate = ridders_root(&mut s, 0.0, 3.0, 1e-12, None).unwrap();
        assert!((estimate.value - std::f64::consts::FRAC_PI_2).abs() < 1e-10);
        assert!(estimate.iterations < ROOT_MAX_ITERATIONS);
    }
}
