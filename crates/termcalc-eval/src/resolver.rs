//! Name resolution of calls, indexes and variables.

use termcalc_core::{Document, Equation, EquationId, SymbolId};

/// What kind of equation a reference may resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// A function or array with exactly this many parameters.
    Exact(usize),
    /// Any function or array.
    Any,
    /// An interval.
    Interval,
}

impl Arity {
    fn accepts(self, equation: &Equation) -> bool {
        match self {
            Self::Exact(n) => !equation.is_interval() && equation.arity() == n,
            Self::Any => !equation.is_interval(),
            Self::Interval => equation.is_interval(),
        }
    }
}

/// Result of a name search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The reference names this equation.
    Resolved(EquationId),
    /// Nothing matches.
    Unknown,
    /// The only eligible match is the referring equation itself.
    Recursive,
}

impl Resolution {
    /// Returns the resolved equation, if any.
    #[must_use]
    pub fn equation(self) -> Option<EquationId> {
        match self {
            Self::Resolved(id) => Some(id),
            Self::Unknown | Self::Recursive => None,
        }
    }
}

/// Finds the equation a reference to `name` in the body of `root` names.
///
/// Without redefinition only the first matching equation in document order
/// is eligible. With redefinition the nearest match defined before `root`
/// wins, falling back to the first match anywhere.
#[must_use]
pub fn search_linked_equation(
    document: &Document,
    name: SymbolId,
    arity: Arity,
    root: EquationId,
) -> Resolution {
    let mut matches = document
        .equations()
        .iter()
        .filter(|e| e.name == name && arity.accepts(e));
    let chosen = if document.settings().redefine_allowed {
        let first = matches.clone().next();
        matches
            .take_while(|e| e.id < root)
            .last()
            .or(first)
    } else {
        matches.next()
    };
    match chosen {
        Some(e) if e.id == root => Resolution::Recursive,
        Some(e) => Resolution::Resolved(e.id),
        None => Resolution::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcalc_core::DocumentSettings;

    fn document(redefine_allowed: bool) -> (Document, [EquationId; 4]) {
        let settings = DocumentSettings::default().with_redefine_allowed(redefine_allowed);
        let mut doc = Document::with_settings(settings);
        let one = doc.arena().number(1.0);
        let a0 = doc.add_constant("a", one);
        let a1 = doc.add_function("a", &["x"], one);
        let b = doc.add_constant("b", one);
        let a2 = doc.add_constant("a", one);
        (doc, [a0, a1, b, a2])
    }

    #[test]
    fn test_first_definition_wins() {
        let (doc, [a0, a1, b, a2]) = document(false);
        let a = doc.arena().symbols().get("a").unwrap();
        assert_eq!(search_linked_equation(&doc, a, Arity::Exact(0), b), Resolution::Resolved(a0));
        assert_eq!(search_linked_equation(&doc, a, Arity::Exact(1), b), Resolution::Resolved(a1));
        assert_eq!(search_linked_equation(&doc, a, Arity::Exact(2), b), Resolution::Unknown);
        assert_eq!(search_linked_equation(&doc, a, Arity::Interval, b), Resolution::Unknown);
        assert_eq!(search_linked_equation(&doc, a, Arity::Exact(0), a2), Resolution::Resolved(a0));
        assert_eq!(search_linked_equation(&doc, a, Arity::Exact(0), a0), Resolution::Recursive);
    }

    #[test]
    fn test_redefinition_uses_nearest_preceding() {
        let (doc, [a0, _, b, a2]) = document(true);
        let a = doc.arena().symbols().get("a").unwrap();
        assert_eq!(search_linked_equation(&doc, a, Arity::Exact(0), b), Resolution::Resolved(a0));
        assert_eq!(search_linked_equation(&doc, a, Arity::Exact(0), a2), Resolution::Resolved(a0));
        // a0 has no predecessor and falls back to itself
        assert_eq!(search_linked_equation(&doc, a, Arity::Exact(0), a0), Resolution::Recursive);
        assert_eq!(
            search_linked_equation(&doc, a, Arity::Any, EquationId::new(99)),
            Resolution::Resolved(a2)
        );
    }
}
