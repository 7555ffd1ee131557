//! Binary arithmetic nodes.

use termcalc_core::{OperatorKind, SymbolId, TermField};
use termcalc_value::{NumericValue, ValueKind};

use crate::error::Cancelled;
use crate::evaluator::Evaluator;

impl Evaluator<'_> {
    pub(crate) fn operator_value(
        &mut self,
        kind: OperatorKind,
        left: &TermField,
        right: &TermField,
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        let mut f = NumericValue::ZERO;
        let mut g = NumericValue::ZERO;
        self.value(left, &mut f)?;
        self.value(right, &mut g)?;
        Ok(match kind {
            OperatorKind::Plus => out.add(f, g),
            OperatorKind::Minus => out.subtract(f, g),
            OperatorKind::Mult => out.multiply(f, g),
            OperatorKind::Divide => out.divide(f, g),
        })
    }

    /// Sum, product and quotient rules.
    pub(crate) fn operator_derivative(
        &mut self,
        kind: OperatorKind,
        left: &TermField,
        right: &TermField,
        var: SymbolId,
        out: &mut NumericValue,
    ) -> Result<ValueKind, Cancelled> {
        let mut df = NumericValue::ZERO;
        let mut dg = NumericValue::ZERO;
        self.derivative(left, var, &mut df)?;
        self.derivative(right, var, &mut dg)?;
        match kind {
            OperatorKind::Plus => return Ok(out.add(df, dg)),
            OperatorKind::Minus => return Ok(out.subtract(df, dg)),
            OperatorKind::Mult | OperatorKind::Divide => {}
        }

        let mut f = NumericValue::ZERO;
        let mut g = NumericValue::ZERO;
        self.value(left, &mut f)?;
        self.value(right, &mut g)?;
        Ok(match kind {
            // f'g + fg'
            OperatorKind::Mult => out.assign(df * g + f * dg),
            // (f'g - fg') / g²
            _ => out.assign((df * g - f * dg) / (g * g)),
        })
    }
}
