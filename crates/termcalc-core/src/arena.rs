//! Arena storage and builders for term trees.
//!
//! Nodes are appended to a contiguous `Vec` and never removed or
//! deduplicated: two structurally equal subtrees at different places of a
//! document are distinct terms with their own calculation status.

use smallvec::SmallVec;
use termcalc_value::{FunctionKind, NumericValue, Unit};

use crate::error::DocumentError;
use crate::handle::TermHandle;
use crate::intern::{SymbolId, SymbolTable};
use crate::term::{Args, LoopKind, OperatorKind, TermField, TermNode, UserFunctionKind};

/// The arena holding every term node and name of a document.
#[derive(Debug, Default, Clone)]
pub struct TermArena {
    nodes: Vec<TermNode>,
    symbols: SymbolTable,
}

impl TermArena {
    /// Creates a new empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an arena with pre-allocated node capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            symbols: SymbolTable::new(),
        }
    }

    /// Appends a node, returning its handle.
    ///
    /// # Panics
    ///
    /// Panics if the arena already holds `u32::MAX` nodes.
    pub fn push(&mut self, node: TermNode) -> TermHandle {
        let index = self.nodes.len();
        assert!(index < u32::MAX as usize, "arena capacity exceeded");

        #[allow(clippy::cast_possible_truncation)]
        let handle = TermHandle::new(index as u32);
        self.nodes.push(node);
        handle
    }

    /// Gets the node at the given handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this arena.
    #[must_use]
    pub fn get(&self, handle: TermHandle) -> &TermNode {
        &self.nodes[handle.index() as usize]
    }

    /// Gets the node at the given handle, if it exists.
    #[must_use]
    pub fn try_get(&self, handle: TermHandle) -> Option<&TermNode> {
        self.nodes.get(handle.index() as usize)
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Interns a name.
    pub fn symbol(&mut self, name: &str) -> SymbolId {
        self.symbols.intern(name)
    }

    /// Returns the name of a symbol.
    #[must_use]
    pub fn symbol_name(&self, id: SymbolId) -> Option<&str> {
        self.symbols.name(id)
    }

    /// Returns the symbol table.
    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    // === Leaves ===

    /// A real literal.
    #[must_use]
    pub fn number(&self, value: f64) -> TermField {
        TermField::Number(NumericValue::real(value))
    }

    /// A complex literal.
    #[must_use]
    pub fn complex(&self, re: f64, im: f64) -> TermField {
        TermField::Number(NumericValue::complex(re, im))
    }

    /// A literal with a unit, converted to the standard unit.
    #[must_use]
    pub fn quantity(&self, value: f64, unit: Unit) -> TermField {
        TermField::Number(NumericValue::real(value).with_unit(unit))
    }

    /// A reference to a name bound in scope.
    pub fn argument(&mut self, name: &str) -> TermField {
        TermField::Argument(self.symbol(name))
    }

    /// A reference to a constant equation.
    pub fn variable(&mut self, name: &str) -> TermField {
        TermField::Variable(self.symbol(name))
    }

    // === Operators ===

    /// A binary operator node.
    pub fn operator(&mut self, kind: OperatorKind, left: TermField, right: TermField) -> TermField {
        self.push(TermNode::Operator { kind, left, right }).into()
    }

    /// `left + right`
    pub fn plus(&mut self, left: TermField, right: TermField) -> TermField {
        self.operator(OperatorKind::Plus, left, right)
    }

    /// `left - right`
    pub fn minus(&mut self, left: TermField, right: TermField) -> TermField {
        self.operator(OperatorKind::Minus, left, right)
    }

    /// `left * right`
    pub fn mult(&mut self, left: TermField, right: TermField) -> TermField {
        self.operator(OperatorKind::Mult, left, right)
    }

    /// `left / right`
    pub fn divide(&mut self, left: TermField, right: TermField) -> TermField {
        self.operator(OperatorKind::Divide, left, right)
    }

    // === Functions ===

    /// A built-in function call.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::ArityMismatch`] if the argument count does
    /// not match the function.
    pub fn function(
        &mut self,
        kind: FunctionKind,
        args: impl Into<Args>,
    ) -> Result<TermField, DocumentError> {
        let args = args.into();
        if args.len() != kind.arity() {
            return Err(DocumentError::ArityMismatch {
                name: kind.name().to_owned(),
                expected: kind.arity(),
                found: args.len(),
            });
        }
        Ok(self.push(TermNode::Function { kind, args }).into())
    }

    /// A one-argument built-in function call.
    pub fn call(&mut self, kind: FunctionKind, arg: TermField) -> Result<TermField, DocumentError> {
        self.function(kind, SmallVec::from_slice(&[arg]))
    }

    /// Parentheses around `arg`.
    pub fn identity(&mut self, arg: TermField) -> TermField {
        self.push(TermNode::UserFunction {
            kind: UserFunctionKind::Identity,
            name: None,
            args: SmallVec::from_slice(&[arg]),
        })
        .into()
    }

    /// A call `name(args…)` of a function equation.
    pub fn link(&mut self, name: &str, args: impl Into<Args>) -> TermField {
        let name = self.symbol(name);
        self.push(TermNode::UserFunction {
            kind: UserFunctionKind::Link,
            name: Some(name),
            args: args.into(),
        })
        .into()
    }

    /// An index `name[args…]` into an array or interval equation.
    pub fn index(&mut self, name: &str, args: impl Into<Args>) -> TermField {
        let name = self.symbol(name);
        self.push(TermNode::UserFunction {
            kind: UserFunctionKind::Index,
            name: Some(name),
            args: args.into(),
        })
        .into()
    }

    // === Loops ===

    fn bounded_loop(
        &mut self,
        kind: LoopKind,
        index: &str,
        min: TermField,
        max: TermField,
        body: TermField,
    ) -> TermField {
        let index = self.symbol(index);
        self.push(TermNode::Loop {
            kind,
            index,
            min: Some(min),
            max: Some(max),
            body,
        })
        .into()
    }

    /// `Σ_{index=min}^{max} body`
    pub fn summation(&mut self, index: &str, min: TermField, max: TermField, body: TermField) -> TermField {
        self.bounded_loop(LoopKind::Summation, index, min, max, body)
    }

    /// `∏_{index=min}^{max} body`
    pub fn product(&mut self, index: &str, min: TermField, max: TermField, body: TermField) -> TermField {
        self.bounded_loop(LoopKind::Product, index, min, max, body)
    }

    /// `∫_{min}^{max} body d(index)`
    pub fn integral(&mut self, index: &str, min: TermField, max: TermField, body: TermField) -> TermField {
        self.bounded_loop(LoopKind::Integral, index, min, max, body)
    }

    /// Root of `body` in `index` within `[min, max]`.
    pub fn solve(&mut self, index: &str, min: TermField, max: TermField, body: TermField) -> TermField {
        self.bounded_loop(LoopKind::Solve, index, min, max, body)
    }

    /// `d/d(index) body` at the current value of `index`.
    pub fn derivative(&mut self, index: &str, body: TermField) -> TermField {
        let index = self.symbol(index);
        self.push(TermNode::Loop {
            kind: LoopKind::Derivative,
            index,
            min: None,
            max: None,
            body,
        })
        .into()
    }
}
