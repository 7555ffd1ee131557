//! Named equations.

use smallvec::SmallVec;

use crate::handle::EquationId;
use crate::intern::SymbolId;
use crate::term::TermField;

/// What kind of definition an equation is, which decides how it may be called.
#[derive(Clone, Debug, PartialEq)]
pub enum EquationKind {
    /// `f(x, y) := body`, or a constant `c := body` without parameters.
    /// Called with `f(…)` links or referenced as a variable.
    Function,
    /// `a[i] := body`. Called with `a[…]` indices.
    Array,
    /// `x := [min, min + step .. max]`: the arithmetic progression used
    /// to drive plots and tables. Indexed with `x[i]`.
    Interval {
        /// First point.
        min: TermField,
        /// Distance between points.
        step: TermField,
        /// Last point.
        max: TermField,
    },
}

/// A named equation of a document.
#[derive(Clone, Debug, PartialEq)]
pub struct Equation {
    /// Identity within the document.
    pub id: EquationId,
    /// Equation name.
    pub name: SymbolId,
    /// Parameter names, in call order.
    pub params: SmallVec<[SymbolId; 2]>,
    /// Definition kind.
    pub kind: EquationKind,
    /// Right-hand side; [`TermField::Empty`] for intervals.
    pub body: TermField,
}

impl Equation {
    /// Number of parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Returns true for functions and constants.
    #[must_use]
    pub fn is_function(&self) -> bool {
        matches!(self.kind, EquationKind::Function)
    }

    /// Returns true for arrays.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.kind, EquationKind::Array)
    }

    /// Returns true for intervals.
    #[must_use]
    pub fn is_interval(&self) -> bool {
        matches!(self.kind, EquationKind::Interval { .. })
    }

    /// Position of a parameter, if `name` is one.
    #[must_use]
    pub fn param_position(&self, name: SymbolId) -> Option<usize> {
        self.params.iter().position(|&p| p == name)
    }
}
