//! # termcalc-numerical
//!
//! The numeric algorithms behind loop terms.
//!
//! Every algorithm pulls samples of the loop body through the [`Sampler`]
//! trait, so it knows nothing about terms, scopes or cancellation; the
//! sampler's error type carries interruption back to the caller.
//!
//! | Loop | Algorithm | Cap |
//! |------|-----------|-----|
//! | Σ, ∏ | direct accumulation, product rule for derivatives | range size |
//! | ∫ | Simpson's rule on refined trapezoids | [`SIMPSON_MAX_ITERATIONS`] stages |
//! | d/dx | Ridders' extrapolation | [`RIDDERS_MAX_ITERATIONS`] columns |
//! | solve | Ridders' bracketed root finder | [`ROOT_MAX_ITERATIONS`] iterations |
//!
//! Integrals and roots that hit their cap report
//! [`CalculationStatus::MaxIterations`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod differentiate;
pub mod integrate;
pub mod roots;
pub mod sampler;
pub mod series;

mod proptests;

pub use differentiate::{
    numerical_derivative, ridders_derivative, RIDDERS_INITIAL_STEP, RIDDERS_MAX_ITERATIONS,
    RIDDERS_SHRINK,
};
pub use integrate::{integrate, integrate_simpson, SIMPSON_MAX_ITERATIONS};
pub use roots::{ridders_root, solve, ROOT_MAX_ITERATIONS};
pub use sampler::{CalculationStatus, Estimate, FnSampler, Part, Sampler};
pub use series::{product, product_derivative, summation, summation_derivative};
pub use termcalc_value::NTH_ROOT_TOLERANCE;
