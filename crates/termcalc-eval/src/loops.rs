//! Loop nodes: Σ, ∏, ∫, d/dx and solve.
//!
//! The numeric algorithms sample the loop body through [`BodySampler`],
//! which rebinds the loop index in the innermost scope frame before each
//! sample and turns cancellation into the sampler's error.

use termcalc_core::{DifferentiabilityType, LoopKind, SymbolId, TermField, TermHandle, TermNode};
use termcalc_numerical::{
    integrate, numerical_derivative, product, product_derivative, solve, summation,
    summation_derivative, CalculationStatus, Sampler,
};
use termcalc_value::{NumericValue, ValueError, ValueKind};
use tracing::debug;

use crate::error::Cancelled;
use crate::evaluator::Evaluator;

struct BodySampler<'e, 'a> {
    evaluator: &'e mut Evaluator<'a>,
    body: TermField,
    /// Variable of `sample_derivative`.
    var: Option<SymbolId>,
}

impl Sampler for BodySampler<'_, '_> {
    type Error = Cancelled;

    fn sample(&mut self, at: NumericValue, out: &mut NumericValue) -> Result<(), Cancelled> {
        self.evaluator.ctx.rebind(at);
        self.evaluator.value(&self.body, out)?;
        Ok(())
    }

    fn sample_derivative(&mut self, at: NumericValue, out: &mut NumericValue) -> Result<(), Cancelled> {
        self.evaluator.ctx.rebind(at);
        match self.var {
            Some(var) => {
                self.evaluator.derivative(&self.body, var, out)?;
            }
            None => {
                out.invalidate(ValueError::NotANumber);
            }
        }
        Ok(())
    }

    fn checkpoint(&mut self) -> Result<(), Cancelled> {
        self.evaluator.ctx.checkpoint()
    }
}

struct LoopNode {
    kind: LoopKind,
    index: SymbolId,
    min: Option<TermField>,
    max: Option<TermField>,
    body: TermField,
}

fn is_real_bound(bound: &NumericValue) -> bool {
    bound.is_real() && !bound.is_nan()
}

impl Evaluator<'_> {
    fn loop_node(&self, handle: TermHandle) -> Option<LoopNode> {
        match self.document.arena().get(handle) {
            TermNode::Loop {
                kind,
                index,
                min,
                max,
                body,
            } => Some(LoopNode {
                kind: *kind,
                index: *index,
                min: *min,
                max: *max,
                body: *body,
            }),
            _ => None,
        }
    }

    /// Evaluates both bounds in the enclosing scope.
    ///
    /// Returns `None` after invalidating `out` when a bound is unusable.
    fn bounds(
        &mut self,
        node: &LoopNode,
        out: &mut NumericValue,
    ) -> Result<Option<(NumericValue, NumericValue)>, Cancelled> {
        let (Some(min), Some(max)) = (node.min, node.max) else {
            out.invalidate(ValueError::TermNotReady);
            return Ok(None);
        };
        let mut lo = NumericValue::ZERO;
        let mut hi = NumericValue::ZERO;
        self.value(&min, &mut lo)?;
        self.value(&max, &mut hi)?;

        let complex_solve = node.kind == LoopKind::Solve && (lo.is_complex() || hi.is_complex());
        if !complex_solve && !(is_real_bound(&lo) && is_real_bound(&hi)) {
            out.invalidate(ValueError::NotAReal);
            return Ok(None);
        }
        Ok(Some((lo, hi)))
    }

    fn record_status(&mut self, handle: TermHandle, status: CalculationStatus) {
        if status != CalculationStatus::None {
            debug!(term = %handle, %status, "loop did not complete");
        }
        self.ctx.set_status(handle, status);
    }

    pub(crate) fn loop_value(
        &mut self,
        handle: TermHandle,
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        let Some(node) = self.loop_node(handle) else {
            return Ok(out.invalidate(ValueError::TermNotReady));
        };
        if node.kind == LoopKind::Derivative {
            return self.derivative_loop(handle, &node, out);
        }
        let Some((lo, hi)) = self.bounds(&node, out)? else {
            return Ok(out.kind());
        };

        let precision = self.document.settings().precision;
        self.ctx.push_binding(node.index, lo);
        let mut sampler = BodySampler {
            evaluator: self,
            body: node.body,
            var: None,
        };
        let result = match node.kind {
            LoopKind::Summation => summation(&mut sampler, lo.to_integer(), hi.to_integer(), out),
            LoopKind::Product => product(&mut sampler, lo.to_integer(), hi.to_integer(), out),
            LoopKind::Integral => integrate(&mut sampler, &lo, &hi, precision, out).map(|status| {
                sampler.evaluator.record_status(handle, status);
                out.kind()
            }),
            LoopKind::Solve => solve(&mut sampler, &lo, &hi, precision, out).map(|status| {
                sampler.evaluator.record_status(handle, status);
                out.kind()
            }),
            LoopKind::Derivative => Ok(out.invalidate(ValueError::TermNotReady)),
        };
        self.ctx.pop();
        result
    }

    /// `d/d(index) body` at the current value of `index`.
    ///
    /// The point is the value bound to `index` in scope, or else the
    /// constant of that name.
    fn derivative_loop(
        &mut self,
        handle: TermHandle,
        node: &LoopNode,
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        let mut point = NumericValue::ZERO;
        self.name_value(node.index, &mut point)?;
        if point.is_nan() {
            return Ok(out.invalidate(ValueError::NotANumber));
        }

        let rank = match self.report.derivative_rank(handle) {
            Some(DifferentiabilityType::None) => return Ok(out.invalidate(ValueError::NotANumber)),
            Some(DifferentiabilityType::Independent) => return Ok(out.set_real(0.0)),
            Some(rank) => rank,
            None => return Ok(out.invalidate(ValueError::TermNotReady)),
        };

        self.ctx.push_binding(node.index, point);
        let result = if rank == DifferentiabilityType::Analytical {
            self.derivative(&node.body, node.index, out)
        } else {
            let mut sampler = BodySampler {
                evaluator: self,
                body: node.body,
                var: None,
            };
            numerical_derivative(&mut sampler, &point, out)
        };
        self.ctx.pop();
        result
    }

    /// Analytic derivative of a loop in an outer variable.
    ///
    /// Only sums and products over bounds that do not depend on `var`
    /// have one; every other loop is differentiated numerically from the
    /// outside.
    pub(crate) fn loop_derivative(
        &mut self,
        handle: TermHandle,
        var: SymbolId,
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        let Some(node) = self.loop_node(handle) else {
            return Ok(out.invalidate(ValueError::TermNotReady));
        };
        if self.ranker().rank(&TermField::Term(handle), var) == DifferentiabilityType::Independent {
            return Ok(out.set_real(0.0));
        }
        if !matches!(node.kind, LoopKind::Summation | LoopKind::Product) {
            return Ok(out.invalidate(ValueError::NotANumber));
        }
        let ranker = self.ranker();
        let dependent_bounds = node
            .min
            .iter()
            .chain(node.max.iter())
            .any(|bound| ranker.rank(bound, var) != DifferentiabilityType::Independent);
        if dependent_bounds {
            return Ok(out.invalidate(ValueError::NotANumber));
        }
        let Some((lo, hi)) = self.bounds(&node, out)? else {
            return Ok(out.kind());
        };

        self.ctx.push_binding(node.index, lo);
        let mut sampler = BodySampler {
            evaluator: self,
            body: node.body,
            var: Some(var),
        };
        let result = if node.kind == LoopKind::Summation {
            summation_derivative(&mut sampler, lo.to_integer(), hi.to_integer(), out)
        } else {
            product_derivative(&mut sampler, lo.to_integer(), hi.to_integer(), out)
        };
        self.ctx.pop();
        result
    }
}
