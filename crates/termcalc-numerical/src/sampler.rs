//! The interface between loop algorithms and the expression they iterate.

use std::convert::Infallible;
use std::fmt;

use termcalc_value::{NumericValue, ValueError};

/// Outcome of a loop algorithm, shown next to the loop term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CalculationStatus {
    /// Completed normally.
    #[default]
    None,
    /// A sample was complex where a real function was required.
    IsComplex,
    /// The iteration cap was reached without convergence.
    MaxIterations,
    /// The function has no sign change between the bounds.
    RootNotBracketed,
}

impl fmt::Display for CalculationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::None => "ok",
            Self::IsComplex => "complex result",
            Self::MaxIterations => "maximum number of iterations reached",
            Self::RootNotBracketed => "root is not bracketed",
        };
        f.write_str(text)
    }
}

/// Real or imaginary component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    /// Real part.
    Re,
    /// Imaginary part.
    Im,
}

impl Part {
    /// Reads this component of `value`.
    #[must_use]
    pub fn of(self, value: &NumericValue) -> f64 {
        match self {
            Self::Re => value.re(),
            Self::Im => value.im(),
        }
    }
}

/// A scalar result of one algorithm run.
#[derive(Debug, Clone, Copy)]
pub struct Estimate {
    /// The computed value; NaN if nothing usable was found.
    pub value: f64,
    /// Algorithm outcome.
    pub status: CalculationStatus,
    /// Number of refinement stages or iterations used.
    pub iterations: usize,
    /// Whether the accuracy was reached before the iteration cap.
    pub converged: bool,
}

impl Estimate {
    pub(crate) fn new() -> Self {
        Self {
            value: f64::NAN,
            status: CalculationStatus::None,
            iterations: 0,
            converged: true,
        }
    }

    pub(crate) fn with_status(mut self, status: CalculationStatus) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    /// Returns true if a complex sample was seen.
    #[must_use]
    pub fn is_complex(&self) -> bool {
        self.status == CalculationStatus::IsComplex
    }
}

/// Evaluates the body of a loop with the loop index bound to a point.
///
/// `Error` is the interruption signal of the caller (cancellation); the
/// algorithms propagate it untouched.
pub trait Sampler {
    /// Interruption signal.
    type Error;

    /// Writes the body's value at `at` into `out`.
    ///
    /// # Errors
    ///
    /// Returns the caller's interruption signal.
    fn sample(&mut self, at: NumericValue, out: &mut NumericValue) -> Result<(), Self::Error>;

    /// Writes the body's derivative (in the outer variable) at `at` into `out`.
    ///
    /// # Errors
    ///
    /// Returns the caller's interruption signal.
    fn sample_derivative(
        &mut self,
        at: NumericValue,
        out: &mut NumericValue,
    ) -> Result<(), Self::Error> {
        let _ = at;
        out.invalidate(ValueError::NotANumber);
        Ok(())
    }

    /// Called once per outer iteration.
    ///
    /// # Errors
    ///
    /// Returns the caller's interruption signal.
    fn checkpoint(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A [`Sampler`] over plain closures that cannot be interrupted.
pub struct FnSampler<F, D = fn(NumericValue) -> NumericValue> {
    f: F,
    derivative: Option<D>,
}

impl<F> FnSampler<F>
where
    F: FnMut(NumericValue) -> NumericValue,
{
    /// Wraps a value closure.
    pub fn new(f: F) -> Self {
        Self { f, derivative: None }
    }
}

impl<F, D> FnSampler<F, D>
where
    F: FnMut(NumericValue) -> NumericValue,
    D: FnMut(NumericValue) -> NumericValue,
{
    /// Wraps a value closure and its derivative.
    pub fn with_derivative(f: F, derivative: D) -> Self {
        Self {
            f,
            derivative: Some(derivative),
        }
    }
}

impl<F, D> Sampler for FnSampler<F, D>
where
    F: FnMut(NumericValue) -> NumericValue,
    D: FnMut(NumericValue) -> NumericValue,
{
    type Error = Infallible;

    fn sample(&mut self, at: NumericValue, out: &mut NumericValue) -> Result<(), Infallible> {
        *out = (self.f)(at);
        Ok(())
    }

    fn sample_derivative(&mut self, at: NumericValue, out: &mut NumericValue) -> Result<(), Infallible> {
        match self.derivative.as_mut() {
            Some(d) => *out = d(at),
            None => {
                out.invalidate(ValueError::NotANumber);
            }
        }
        Ok(())
    }
}
