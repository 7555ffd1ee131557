//! Term node definitions.
//!
//! A term tree is made of [`TermNode`]s stored in the arena and connected
//! through [`TermField`] child slots. Trees are immutable once built.

use smallvec::SmallVec;
use termcalc_value::{FunctionKind, NumericValue};

use crate::handle::TermHandle;
use crate::intern::SymbolId;

/// Argument list of a function or link call.
pub type Args = SmallVec<[TermField; 2]>;

/// A child slot of a term node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TermField {
    /// Nothing entered yet. Evaluates to `TermNotReady`.
    Empty,
    /// A literal, already converted to its standard unit.
    Number(NumericValue),
    /// A name bound in scope: an equation parameter or a loop index.
    Argument(SymbolId),
    /// A reference to a constant equation of the document.
    Variable(SymbolId),
    /// A nested term node.
    Term(TermHandle),
}

impl TermField {
    /// Returns true for [`TermField::Empty`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the nested term handle, if any.
    #[must_use]
    pub fn term(&self) -> Option<TermHandle> {
        match self {
            Self::Term(handle) => Some(*handle),
            _ => None,
        }
    }
}

impl From<TermHandle> for TermField {
    fn from(handle: TermHandle) -> Self {
        Self::Term(handle)
    }
}

impl From<f64> for TermField {
    fn from(value: f64) -> Self {
        Self::Number(NumericValue::real(value))
    }
}

impl From<NumericValue> for TermField {
    fn from(value: NumericValue) -> Self {
        Self::Number(value)
    }
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// `a + b`
    Plus,
    /// `a - b`
    Minus,
    /// `a * b`
    Mult,
    /// `a / b`
    Divide,
}

/// The call form of a user function node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UserFunctionKind {
    /// Parentheses: the value of the single argument.
    Identity,
    /// `f(a, b)`: call of a function equation.
    Link,
    /// `a[i]`: lookup into an array or interval equation.
    Index,
}

/// Loop operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoopKind {
    /// `Σ_{i=min}^{max} body`
    Summation,
    /// `∏_{i=min}^{max} body`
    Product,
    /// `∫_{min}^{max} body d(index)`
    Integral,
    /// `d/d(index) body`, evaluated at the current value of `index`.
    Derivative,
    /// Root of `body` in `index` bracketed by `[min, max]`.
    Solve,
}

impl LoopKind {
    /// Returns true if the loop has `min`/`max` bounds.
    #[must_use]
    pub fn has_bounds(self) -> bool {
        self != Self::Derivative
    }
}

/// A term node.
#[derive(Clone, Debug, PartialEq)]
pub enum TermNode {
    /// Binary arithmetic.
    Operator {
        /// Which operator.
        kind: OperatorKind,
        /// Left operand.
        left: TermField,
        /// Right operand.
        right: TermField,
    },
    /// Built-in function call.
    Function {
        /// Which function.
        kind: FunctionKind,
        /// Arguments; `kind.arity()` of them.
        args: Args,
    },
    /// Grouping, equation call or array index.
    UserFunction {
        /// Call form.
        kind: UserFunctionKind,
        /// Target equation name; `None` for `Identity`.
        name: Option<SymbolId>,
        /// Call arguments.
        args: Args,
    },
    /// Summation, product, integral, derivative or solve.
    Loop {
        /// Which loop operator.
        kind: LoopKind,
        /// Name bound inside `body`.
        index: SymbolId,
        /// Lower bound; absent for derivatives.
        min: Option<TermField>,
        /// Upper bound; absent for derivatives.
        max: Option<TermField>,
        /// The looped expression.
        body: TermField,
    },
}

impl TermNode {
    /// Returns every child slot of this node.
    #[must_use]
    pub fn children(&self) -> SmallVec<[TermField; 4]> {
        match self {
            Self::Operator { left, right, .. } => SmallVec::from_slice(&[*left, *right]),
            Self::Function { args, .. } | Self::UserFunction { args, .. } => {
                args.iter().copied().collect()
            }
            Self::Loop { min, max, body, .. } => {
                min.iter().chain(max.iter()).copied().chain([*body]).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_children() {
        let op = TermNode::Operator {
            kind: OperatorKind::Plus,
            left: 1.0.into(),
            right: TermField::Empty,
        };
        assert_eq!(op.children().len(), 2);

        let call = TermNode::Function {
            kind: FunctionKind::Sin,
            args: smallvec![TermField::from(0.5)],
        };
        assert_eq!(call.children().as_slice(), &[TermField::from(0.5)]);
    }

    #[test]
    fn test_derivative_has_no_bounds() {
        assert!(!LoopKind::Derivative.has_bounds());
        assert!(LoopKind::Solve.has_bounds());
    }
}
