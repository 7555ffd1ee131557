//! Built-in function nodes.

use std::f64::consts::LN_10;

use termcalc_core::{DifferentiabilityType, SymbolId, TermField};
use termcalc_value::{FunctionKind, NumericValue, ValueError, ValueKind};

use crate::error::Cancelled;
use crate::evaluator::Evaluator;

impl Evaluator<'_> {
    pub(crate) fn function_value(
        &mut self,
        kind: FunctionKind,
        args: &[TermField],
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        let values = self.values(args)?;
        if values.len() != kind.arity() {
            return Ok(out.invalidate(ValueError::TermNotReady));
        }
        Ok(match kind {
            FunctionKind::Pow => out.pow(values[0], values[1]),
            FunctionKind::NthRoot => {
                let n = values[0];
                if n.is_invalid() {
                    out.invalidate(n.reason())
                } else if !n.is_real() || n.unit().is_some() {
                    out.invalidate(ValueError::NotANumber)
                } else {
                    let n = i32::try_from(n.to_integer()).unwrap_or(0);
                    out.nth_root(values[1], n)
                }
            }
            _ => out.apply(kind, values[0]),
        })
    }

    /// Chain rule over the built-in derivative table.
    ///
    /// Non-smooth functions only have the trivial derivative of an
    /// argument that does not depend on `var`.
    pub(crate) fn function_derivative(
        &mut self,
        kind: FunctionKind,
        args: &[TermField],
        var: SymbolId,
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        if args.len() != kind.arity() {
            return Ok(out.invalidate(ValueError::TermNotReady));
        }
        if !kind.is_smooth() {
            let ranker = self.ranker();
            let independent = args
                .iter()
                .all(|arg| ranker.rank(arg, var) == DifferentiabilityType::Independent);
            return Ok(if independent {
                out.set_real(0.0)
            } else {
                out.invalidate(ValueError::NotANumber)
            });
        }
        if kind == FunctionKind::Pow {
            return self.power_derivative(&args[0], &args[1], var, out);
        }

        let mut f = NumericValue::ZERO;
        let mut df = NumericValue::ZERO;
        self.value(&args[0], &mut f)?;
        self.derivative(&args[0], var, &mut df)?;
        Ok(out.assign(derivative_factor(kind, f) * df))
    }

    /// `(f^g)'`: `g·f^(g-1)·f'` for a constant exponent, else `f^g·(g'·ln f + g·f'/f)`.
    fn power_derivative(
        &mut self,
        base: &TermField,
        exponent: &TermField,
        var: SymbolId,
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        let mut f = NumericValue::ZERO;
        let mut g = NumericValue::ZERO;
        let mut df = NumericValue::ZERO;
        self.value(base, &mut f)?;
        self.value(exponent, &mut g)?;
        self.derivative(base, var, &mut df)?;

        let mut power = NumericValue::ZERO;
        if self.ranker().rank(exponent, var) == DifferentiabilityType::Independent {
            power.pow(f, g - NumericValue::ONE);
            return Ok(out.assign(g * power * df));
        }
        let mut dg = NumericValue::ZERO;
        self.derivative(exponent, var, &mut dg)?;
        power.pow(f, g);
        let mut ln = NumericValue::ZERO;
        ln.apply(FunctionKind::Log, f);
        Ok(out.assign(power * (dg * ln + g * df / f)))
    }
}

/// `d/df kind(f)`.
fn derivative_factor(kind: FunctionKind, f: NumericValue) -> NumericValue {
    let one = NumericValue::ONE;
    let at = |kind: FunctionKind| {
        let mut value = NumericValue::ZERO;
        value.apply(kind, f);
        value
    };
    let square_root = |value: NumericValue| {
        let mut root = NumericValue::ZERO;
        root.sqrt(value);
        root
    };
    match kind {
        FunctionKind::Sin => at(FunctionKind::Cos),
        FunctionKind::Cos => -at(FunctionKind::Sin),
        FunctionKind::Tan => {
            let c = at(FunctionKind::Cos);
            one / (c * c)
        }
        FunctionKind::Csc => -(at(FunctionKind::Csc) * at(FunctionKind::Cot)),
        FunctionKind::Sec => at(FunctionKind::Sec) * at(FunctionKind::Tan),
        FunctionKind::Cot => {
            let s = at(FunctionKind::Sin);
            -(one / (s * s))
        }
        FunctionKind::Asin => one / square_root(one - f * f),
        FunctionKind::Acos => -(one / square_root(one - f * f)),
        FunctionKind::Atan => one / (one + f * f),
        FunctionKind::Sinh => at(FunctionKind::Cosh),
        FunctionKind::Cosh => at(FunctionKind::Sinh),
        FunctionKind::Tanh => {
            let c = at(FunctionKind::Cosh);
            one / (c * c)
        }
        FunctionKind::Csch => -(at(FunctionKind::Csch) * at(FunctionKind::Coth)),
        FunctionKind::Sech => -(at(FunctionKind::Sech) * at(FunctionKind::Tanh)),
        FunctionKind::Coth => {
            let s = at(FunctionKind::Sinh);
            -(one / (s * s))
        }
        FunctionKind::Exp => at(FunctionKind::Exp),
        FunctionKind::Log => one / f,
        FunctionKind::Log10 => one / (f * NumericValue::real(LN_10)),
        FunctionKind::Sqrt => one / (NumericValue::real(2.0) * at(FunctionKind::Sqrt)),
        FunctionKind::Abs
        | FunctionKind::Ceil
        | FunctionKind::Floor
        | FunctionKind::Conj
        | FunctionKind::Random
        | FunctionKind::Pow
        | FunctionKind::NthRoot => NumericValue::invalid(ValueError::NotANumber),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(kind: FunctionKind, x: f64) -> f64 {
        let h = 1e-6;
        let mut hi = NumericValue::ZERO;
        let mut lo = NumericValue::ZERO;
        hi.apply(kind, NumericValue::real(x + h));
        lo.apply(kind, NumericValue::real(x - h));
        (hi.re() - lo.re()) / (2.0 * h)
    }

    #[test]
    fn test_factors_match_central_differences() {
        let smooth = [
            FunctionKind::Sin,
            FunctionKind::Cos,
            FunctionKind::Tan,
            FunctionKind::Csc,
            FunctionKind::Sec,
            FunctionKind::Cot,
            FunctionKind::Asin,
            FunctionKind::Acos,
            FunctionKind::Atan,
            FunctionKind::Sinh,
            FunctionKind::Cosh,
            FunctionKind::Tanh,
            FunctionKind::Csch,
            FunctionKind::Sech,
            FunctionKind::Coth,
            FunctionKind::Exp,
            FunctionKind::Log,
            FunctionKind::Log10,
            FunctionKind::Sqrt,
        ];
        for kind in smooth {
            let x = 0.4;
            let exact = derivative_factor(kind, NumericValue::real(x)).re();
            assert!((exact - numeric(kind, x)).abs() < 1e-6, "{kind}: {exact}");
        }
    }

    #[test]
    fn test_non_smooth_factor_is_invalid() {
        assert!(derivative_factor(FunctionKind::Abs, NumericValue::ONE).is_invalid());
    }
}
