//! Validation issues and the cancellation signal.

use termcalc_core::{EquationId, TermHandle};
use thiserror::Error;

/// Why a term's content is not valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ContentError {
    /// No function equation with this name and argument count.
    #[error("unknown function")]
    UnknownFunction,
    /// No array or interval with this name.
    #[error("unknown array")]
    UnknownArray,
    /// A name is neither bound in scope nor a constant equation.
    #[error("unknown variable")]
    UnknownVariable,
    /// The reference leads back to the equation it occurs in.
    #[error("recursive call")]
    RecursiveCall,
    /// A call `f(…)` names an array or interval.
    #[error("not a function")]
    NotAFunction,
    /// An index `a[…]` names a function.
    #[error("not an array")]
    NotAnArray,
    /// A derivative whose body cannot be differentiated in its index.
    #[error("not differentiable")]
    NotDifferentiable,
}

/// A content error attached to the place it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentIssue {
    /// Equation containing the offending term.
    pub equation: EquationId,
    /// The offending node, or `None` for a leaf directly in the equation body.
    pub term: Option<TermHandle>,
    /// What is wrong.
    pub error: ContentError,
}

/// The calculation was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("calculation cancelled")]
pub struct Cancelled;
