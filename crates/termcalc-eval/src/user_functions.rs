//! Grouping, equation calls and array indexes.

use termcalc_core::{
    DifferentiabilityType, Equation, EquationKind, SymbolId, TermField, TermHandle,
    UserFunctionKind,
};
use termcalc_value::{NumericValue, ValueError, ValueKind};

use crate::error::Cancelled;
use crate::evaluator::Evaluator;

impl Evaluator<'_> {
    pub(crate) fn user_function_value(
        &mut self,
        handle: TermHandle,
        kind: UserFunctionKind,
        args: &[TermField],
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        if kind == UserFunctionKind::Identity {
            return match args.first() {
                Some(arg) => self.value(arg, out),
                None => Ok(out.invalidate(ValueError::TermNotReady)),
            };
        }
        let Some(target) = self.target(handle) else {
            return Ok(out.invalidate(ValueError::TermNotReady));
        };
        let values = self.values(args)?;
        match &target.kind {
            EquationKind::Interval { min, step, max } => match values.as_slice() {
                [index] => self.interval_point(target, [min, step, max], *index, out),
                _ => Ok(out.invalidate(ValueError::TermNotReady)),
            },
            EquationKind::Function | EquationKind::Array => self.call(target, &values, out),
        }
    }

    pub(crate) fn user_function_derivative(
        &mut self,
        handle: TermHandle,
        kind: UserFunctionKind,
        args: &[TermField],
        var: SymbolId,
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        match kind {
            UserFunctionKind::Identity => match args.first() {
                Some(arg) => self.derivative(arg, var, out),
                None => Ok(out.invalidate(ValueError::TermNotReady)),
            },
            UserFunctionKind::Link => self.link_derivative(handle, args, var, out),
            UserFunctionKind::Index => {
                let ranker = self.ranker();
                let independent = args
                    .iter()
                    .all(|arg| ranker.rank(arg, var) == DifferentiabilityType::Independent);
                Ok(if independent {
                    out.set_real(0.0)
                } else {
                    out.invalidate(ValueError::NotANumber)
                })
            }
        }
    }

    /// `Σ_i ∂f/∂p_i · arg_i'` over the arguments that depend on `var`.
    fn link_derivative(
        &mut self,
        handle: TermHandle,
        args: &[TermField],
        var: SymbolId,
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        let Some(target) = self.target(handle) else {
            return Ok(out.invalidate(ValueError::TermNotReady));
        };
        if target.arity() != args.len() {
            return Ok(out.set_real(0.0));
        }
        let values = self.values(args)?;
        let mut sum = NumericValue::ZERO;
        let mut d_arg = NumericValue::ZERO;
        let mut d_param = NumericValue::ZERO;
        for (arg, &param) in args.iter().zip(&target.params) {
            self.derivative(arg, var, &mut d_arg)?;
            if d_arg.is_zero() {
                continue;
            }
            self.call_derivative(target, &values, param, &mut d_param)?;
            sum.add(sum, d_param * d_arg);
        }
        Ok(out.assign(sum))
    }

    /// The `index`-th point `min + index·step` of an interval.
    fn interval_point(
        &mut self,
        interval: &Equation,
        fields: [&TermField; 3],
        index: NumericValue,
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        if index.is_invalid() {
            return Ok(out.invalidate(index.reason()));
        }
        if !index.is_real() || index.re().fract() != 0.0 || index.unit().is_some() {
            return Ok(out.invalidate(ValueError::NotANumber));
        }

        let mut bounds = [NumericValue::ZERO; 3];
        self.ctx.push_call(interval.id, []);
        let mut result = Ok(ValueKind::Real);
        for (field, bound) in fields.into_iter().zip(&mut bounds) {
            result = self.value(field, bound);
            if result.is_err() {
                break;
            }
        }
        self.ctx.pop();
        result?;

        let [min, step, max] = bounds;
        if bounds.iter().any(|b| !b.is_real() || b.is_nan()) {
            return Ok(out.invalidate(ValueError::NotAReal));
        }
        let point = min + NumericValue::real(index.re()) * step;
        let (lo, hi) = if min.re() <= max.re() {
            (min.re(), max.re())
        } else {
            (max.re(), min.re())
        };
        let slack = step.re().abs() * 1e-9;
        if point.re() < lo - slack || point.re() > hi + slack {
            return Ok(out.invalidate(ValueError::NotANumber));
        }
        Ok(out.assign(point))
    }
}
