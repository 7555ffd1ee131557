//! # termcalc
//!
//! The evaluation engine of a mathematical worksheet.
//!
//! A document is a list of equations (functions, arrays and intervals)
//! whose bodies are term trees. termcalc validates the references between
//! equations, evaluates terms to real or complex values with physical
//! units, and runs summations, products, integrals, derivatives and root
//! solving as cancellable numeric loops.
//!
//! ## Features
//!
//! - **Values with units**: real, complex or invalid values carrying SI dimensions
//! - **Arena terms**: immutable term trees addressed by 32-bit handles
//! - **Analytic derivatives**: chain, product and quotient rules, with a
//!   numerical fallback chosen by differentiability rank
//! - **Background calculation**: a new calculation supersedes the running one
//!
//! ## Quick Start
//!
//! ```rust
//! use termcalc::prelude::*;
//!
//! let mut doc = Document::new();
//! let arena = doc.arena_mut();
//! let i = arena.argument("i");
//! let sum = arena.summation("i", 1.0.into(), 5.0.into(), i);
//! let s = doc.add_constant("s", sum);
//!
//! let outcome = Calculator::new(doc).calculate_now(Targets::All);
//! assert_eq!(outcome.value_of(s).map(|v| v.re()), Some(15.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use termcalc_core as core;
pub use termcalc_eval as eval;
pub use termcalc_numerical as numerical;
pub use termcalc_value as value;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use termcalc_core::{
        DifferentiabilityType, Document, DocumentSettings, EquationId, TermArena, TermField,
        TermHandle,
    };
    pub use termcalc_eval::{
        validate, CalculationOutcome, Calculator, CancelToken, ContentError, Evaluator, Targets,
        ValidationReport,
    };
    pub use termcalc_numerical::CalculationStatus;
    pub use termcalc_value::{FunctionKind, NumericValue, Unit, ValueError};
}
