//! Per-calculation mutable state: cancellation, scopes and loop statuses.
//!
//! The term tree is shared and read-only; everything a calculation writes
//! lives here, so one context per worker makes concurrent calculations
//! over the same document safe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use smallvec::SmallVec;
use termcalc_core::{EquationId, FxHashMap, SymbolId, TermHandle};
use termcalc_numerical::CalculationStatus;
use termcalc_value::NumericValue;

use crate::error::Cancelled;

/// A shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Fails with [`Cancelled`] once cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the token was cancelled.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Names bound by one equation call or one loop.
#[derive(Debug)]
struct Frame {
    /// `Some` for an equation call; name lookup does not look past it.
    equation: Option<EquationId>,
    bindings: SmallVec<[(SymbolId, NumericValue); 2]>,
}

/// Mutable evaluation state.
#[derive(Debug, Default)]
pub struct EvalContext {
    token: CancelToken,
    frames: Vec<Frame>,
    statuses: FxHashMap<TermHandle, CalculationStatus>,
}

impl EvalContext {
    /// Creates a context observing `token`.
    #[must_use]
    pub fn new(token: CancelToken) -> Self {
        Self {
            token,
            ..Self::default()
        }
    }

    /// Returns the cancellation token.
    #[must_use]
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Fails fast once the calculation was cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the token was cancelled.
    #[inline]
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        self.token.check()
    }

    /// Enters the body of `equation` with its parameters bound.
    pub(crate) fn push_call(
        &mut self,
        equation: EquationId,
        bindings: impl IntoIterator<Item = (SymbolId, NumericValue)>,
    ) {
        self.frames.push(Frame {
            equation: Some(equation),
            bindings: bindings.into_iter().collect(),
        });
    }

    /// Enters a loop body binding `name`.
    pub(crate) fn push_binding(&mut self, name: SymbolId, value: NumericValue) {
        let mut bindings = SmallVec::new();
        bindings.push((name, value));
        self.frames.push(Frame {
            equation: None,
            bindings,
        });
    }

    /// Updates the value bound by the innermost loop.
    pub(crate) fn rebind(&mut self, value: NumericValue) {
        if let Some((_, slot)) = self
            .frames
            .last_mut()
            .and_then(|frame| frame.bindings.first_mut())
        {
            *slot = value;
        }
    }

    /// Leaves the innermost frame.
    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    /// Looks up a bound name, innermost first, up to the enclosing call.
    #[must_use]
    pub fn argument(&self, name: SymbolId) -> Option<NumericValue> {
        for frame in self.frames.iter().rev() {
            if let Some((_, value)) = frame.bindings.iter().find(|(n, _)| *n == name) {
                return Some(*value);
            }
            if frame.equation.is_some() {
                break;
            }
        }
        None
    }

    /// The equation whose body is being evaluated.
    #[must_use]
    pub fn current_equation(&self) -> Option<EquationId> {
        self.frames.iter().rev().find_map(|frame| frame.equation)
    }

    /// Records the outcome of a loop algorithm.
    pub fn set_status(&mut self, term: TermHandle, status: CalculationStatus) {
        self.statuses.insert(term, status);
    }

    /// Returns the recorded outcome of a loop algorithm.
    #[must_use]
    pub fn status(&self, term: TermHandle) -> CalculationStatus {
        self.statuses.get(&term).copied().unwrap_or_default()
    }

    /// Takes all recorded statuses, sorted by term.
    pub fn take_statuses(&mut self) -> Vec<(TermHandle, CalculationStatus)> {
        let mut statuses: Vec<_> = self.statuses.drain().collect();
        statuses.sort_unstable_by_key(|(term, _)| *term);
        statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcalc_core::SymbolTable;

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert_eq!(token.check(), Ok(()));
        clone.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.check(), Err(Cancelled));
    }

    #[test]
    fn test_scope_lookup_stops_at_call() {
        let mut symbols = SymbolTable::new();
        let x = symbols.intern("x");
        let i = symbols.intern("i");
        let mut ctx = EvalContext::default();

        ctx.push_call(EquationId::new(0), [(x, NumericValue::real(1.0))]);
        ctx.push_binding(i, NumericValue::real(2.0));
        assert_eq!(ctx.argument(x).map(|v| v.re()), Some(1.0));
        assert_eq!(ctx.argument(i).map(|v| v.re()), Some(2.0));

        ctx.rebind(NumericValue::real(3.0));
        assert_eq!(ctx.argument(i).map(|v| v.re()), Some(3.0));

        // a nested call hides the caller's names
        ctx.push_call(EquationId::new(1), []);
        assert_eq!(ctx.argument(x), None);
        assert_eq!(ctx.current_equation(), Some(EquationId::new(1)));

        ctx.pop();
        ctx.pop();
        ctx.pop();
        assert_eq!(ctx.current_equation(), None);
    }
}
