//! # termcalc-eval
//!
//! Validation and evaluation of termcalc documents.
//!
//! This crate provides:
//! - Name resolution of calls, indexes and variables with redefinition rules
//! - Reference cycle detection over the equation dependency graph
//! - Differentiability ranking and analytic derivatives of terms
//! - Recursive evaluation of values, loops and derivatives
//! - Cancellable background calculation with supersession
//!
//! ## Pipeline
//!
//! 1. [`validate`] turns a [`Document`](termcalc_core::Document) version into a
//!    [`ValidationReport`]: resolved links, content issues and derivative ranks.
//! 2. An [`Evaluator`] walks the immutable term tree against the report,
//!    keeping scopes and loop statuses in its [`EvalContext`].
//! 3. A [`Calculator`] runs the evaluator on a worker thread and cancels
//!    the previous calculation whenever a new one starts.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod calculator;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod rank;
pub mod resolver;
pub mod validate;

mod functions;
mod loops;
mod operators;
mod proptests;
mod user_functions;

pub use calculator::{CalculationHandle, CalculationOutcome, CalculationResult, Calculator, Targets};
pub use context::{CancelToken, EvalContext};
pub use error::{Cancelled, ContentError, ContentIssue};
pub use evaluator::Evaluator;
pub use graph::DependencyGraph;
pub use rank::Ranker;
pub use resolver::{search_linked_equation, Arity, Resolution};
pub use validate::{validate, ValidationReport};
