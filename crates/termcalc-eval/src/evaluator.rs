//! Recursive evaluation of terms.
//!
//! [`Evaluator::value`] and [`Evaluator::derivative`] dispatch on the field
//! and node kind; the per-kind rules live in the `operators`, `functions`,
//! `user_functions` and `loops` modules. Every descent checks the
//! cancellation token.

use smallvec::SmallVec;
use termcalc_core::{Document, Equation, EquationId, SymbolId, TermField, TermHandle, TermNode};
use termcalc_value::{NumericValue, ValueError, ValueKind};

use crate::context::{CancelToken, EvalContext};
use crate::error::Cancelled;
use crate::rank::Ranker;
use crate::validate::ValidationReport;

pub(crate) type Values = SmallVec<[NumericValue; 4]>;

/// Evaluates terms of a validated document.
#[derive(Debug)]
pub struct Evaluator<'a> {
    pub(crate) document: &'a Document,
    pub(crate) report: &'a ValidationReport,
    pub(crate) ctx: EvalContext,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator observing `token`.
    ///
    /// `report` must come from validating this version of `document`.
    #[must_use]
    pub fn new(document: &'a Document, report: &'a ValidationReport, token: CancelToken) -> Self {
        Self {
            document,
            report,
            ctx: EvalContext::new(token),
        }
    }

    /// The evaluation state.
    #[must_use]
    pub fn context(&self) -> &EvalContext {
        &self.ctx
    }

    /// The evaluation state, mutably.
    pub fn context_mut(&mut self) -> &mut EvalContext {
        &mut self.ctx
    }

    /// A ranker over the same document and report.
    #[must_use]
    pub fn ranker(&self) -> Ranker<'a> {
        Ranker::new(self.document, self.report)
    }

    /// Evaluates a constant or parameterless array.
    ///
    /// Equations with parameters and intervals have no value of their own
    /// and give `TermNotReady`.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the calculation was cancelled.
    pub fn evaluate_equation(&mut self, id: EquationId) -> Result<NumericValue, Cancelled> {
        self.evaluate_call(id, &[])
    }

    /// Evaluates an equation with its parameters bound to `args`.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the calculation was cancelled.
    pub fn evaluate_call(
        &mut self,
        id: EquationId,
        args: &[NumericValue],
    ) -> Result<NumericValue, Cancelled> {
        let mut out = NumericValue::invalid(ValueError::TermNotReady);
        let document = self.document;
        if let Ok(equation) = document.equation(id) {
            if !equation.is_interval() && equation.arity() == args.len() {
                self.call(equation, args, &mut out)?;
            }
        }
        Ok(out)
    }

    /// Writes the value of `field` into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the calculation was cancelled.
    pub fn value(&mut self, field: &TermField, out: &mut NumericValue) -> Result<ValueKind, Cancelled> {
        self.ctx.checkpoint()?;
        match *field {
            TermField::Empty => Ok(out.invalidate(ValueError::TermNotReady)),
            TermField::Number(value) => Ok(out.assign(value)),
            TermField::Argument(name) => match self.ctx.argument(name) {
                Some(value) => Ok(out.assign(value)),
                None => Ok(out.invalidate(ValueError::TermNotReady)),
            },
            TermField::Variable(name) => self.variable_value(name, out),
            TermField::Term(handle) => self.node_value(handle, out),
        }
    }

    /// Writes the analytic derivative of `field` with respect to `var` into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the calculation was cancelled.
    pub fn derivative(
        &mut self,
        field: &TermField,
        var: SymbolId,
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        self.ctx.checkpoint()?;
        match *field {
            TermField::Empty => Ok(out.invalidate(ValueError::TermNotReady)),
            TermField::Number(_) | TermField::Variable(_) => Ok(out.set_real(0.0)),
            TermField::Argument(name) => Ok(out.set_real(if name == var { 1.0 } else { 0.0 })),
            TermField::Term(handle) => self.node_derivative(handle, var, out),
        }
    }

    fn node_value(&mut self, handle: TermHandle, out: &mut NumericValue) -> Result<ValueKind, Cancelled> {
        let document = self.document;
        match document.arena().get(handle) {
            TermNode::Operator { kind, left, right } => self.operator_value(*kind, left, right, out),
            TermNode::Function { kind, args } => self.function_value(*kind, args, out),
            TermNode::UserFunction { kind, args, .. } => {
                self.user_function_value(handle, *kind, args, out)
            }
            TermNode::Loop { .. } => self.loop_value(handle, out),
        }
    }

    fn node_derivative(
        &mut self,
        handle: TermHandle,
        var: SymbolId,
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        let document = self.document;
        match document.arena().get(handle) {
            TermNode::Operator { kind, left, right } => {
                self.operator_derivative(*kind, left, right, var, out)
            }
            TermNode::Function { kind, args } => self.function_derivative(*kind, args, var, out),
            TermNode::UserFunction { kind, args, .. } => {
                self.user_function_derivative(handle, *kind, args, var, out)
            }
            TermNode::Loop { .. } => self.loop_derivative(handle, var, out),
        }
    }

    /// A constant referenced by name from the current equation.
    fn variable_value(&mut self, name: SymbolId, out: &mut NumericValue) -> Result<ValueKind, Cancelled> {
        let document = self.document;
        let target = self
            .ctx
            .current_equation()
            .and_then(|equation| self.report.variable(equation, name))
            .and_then(|id| document.equation(id).ok());
        match target {
            Some(equation) if !equation.is_interval() => self.call(equation, &[], out),
            _ => Ok(out.invalidate(ValueError::TermNotReady)),
        }
    }

    /// A name bound in scope, or else a constant of the document.
    pub(crate) fn name_value(&mut self, name: SymbolId, out: &mut NumericValue) -> Result<ValueKind, Cancelled> {
        match self.ctx.argument(name) {
            Some(value) => Ok(out.assign(value)),
            None => self.variable_value(name, out),
        }
    }

    pub(crate) fn values(&mut self, fields: &[TermField]) -> Result<Values, Cancelled> {
        let mut values = Values::new();
        for field in fields {
            let mut value = NumericValue::ZERO;
            self.value(field, &mut value)?;
            values.push(value);
        }
        Ok(values)
    }

    /// Evaluates the body of `equation` with its parameters bound to `args`.
    pub(crate) fn call(
        &mut self,
        equation: &Equation,
        args: &[NumericValue],
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        self.ctx
            .push_call(equation.id, equation.params.iter().copied().zip(args.iter().copied()));
        let result = self.value(&equation.body, out);
        self.ctx.pop();
        result
    }

    /// Differentiates the body of `equation` in `param` with its parameters bound to `args`.
    pub(crate) fn call_derivative(
        &mut self,
        equation: &Equation,
        args: &[NumericValue],
        param: SymbolId,
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        self.ctx
            .push_call(equation.id, equation.params.iter().copied().zip(args.iter().copied()));
        let result = self.derivative(&equation.body, param, out);
        self.ctx.pop();
        result
    }

    /// The equation a call or index node was resolved to.
    pub(crate) fn target(&self, handle: TermHandle) -> Option<&'a Equation> {
        let document = self.document;
        self.report
            .link(handle)
            .and_then(|id| document.equation(id).ok())
    }
}
