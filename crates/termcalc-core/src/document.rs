//! Documents: an ordered set of equations sharing one arena and settings.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use termcalc_value::NumericValue;

use crate::arena::TermArena;
use crate::equation::{Equation, EquationKind};
use crate::error::DocumentError;
use crate::handle::EquationId;
use crate::term::TermField;

/// Per-document calculation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Significant digits of displayed results.
    pub significant_digits: u32,
    /// Absolute accuracy of integrals and root solving.
    pub precision: f64,
    /// Whether a name may be defined more than once.
    pub redefine_allowed: bool,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            significant_digits: 6,
            precision: 1e-8,
            redefine_allowed: false,
        }
    }
}

impl DocumentSettings {
    /// Sets the number of significant digits.
    #[must_use]
    pub fn with_significant_digits(mut self, digits: u32) -> Self {
        self.significant_digits = digits;
        self
    }

    /// Sets the integration and solve accuracy.
    #[must_use]
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    /// Allows or forbids redefinition of names.
    #[must_use]
    pub fn with_redefine_allowed(mut self, allowed: bool) -> Self {
        self.redefine_allowed = allowed;
        self
    }

    /// Formats a result with these settings.
    #[must_use]
    pub fn describe(&self, value: &NumericValue) -> String {
        value.format(self.significant_digits)
    }
}

/// A document.
///
/// Every structural change bumps [`Document::version`], which is what
/// validation results are keyed by.
#[derive(Clone, Debug, Default)]
pub struct Document {
    arena: TermArena,
    equations: Vec<Equation>,
    settings: DocumentSettings,
    version: u64,
}

impl Document {
    /// Creates an empty document with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty document with the given settings.
    #[must_use]
    pub fn with_settings(settings: DocumentSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Returns the term arena.
    #[must_use]
    pub fn arena(&self) -> &TermArena {
        &self.arena
    }

    /// Returns the term arena for building terms.
    pub fn arena_mut(&mut self) -> &mut TermArena {
        self.version += 1;
        &mut self.arena
    }

    /// Returns the settings.
    #[must_use]
    pub fn settings(&self) -> &DocumentSettings {
        &self.settings
    }

    /// Replaces the settings.
    pub fn set_settings(&mut self, settings: DocumentSettings) {
        self.version += 1;
        self.settings = settings;
    }

    /// Returns the structural version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns all equations in document order.
    #[must_use]
    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    /// Looks up an equation by id.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnknownEquation`] for a foreign id.
    pub fn equation(&self, id: EquationId) -> Result<&Equation, DocumentError> {
        self.equations
            .get(id.index() as usize)
            .ok_or(DocumentError::UnknownEquation(id))
    }

    /// Returns the first equation with this name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Equation> {
        let symbol = self.arena.symbols().get(name)?;
        self.equations.iter().find(|e| e.name == symbol)
    }

    /// Returns the name of an equation.
    #[must_use]
    pub fn equation_name(&self, id: EquationId) -> &str {
        self.equations
            .get(id.index() as usize)
            .and_then(|e| self.arena.symbol_name(e.name))
            .unwrap_or("?")
    }

    fn push(&mut self, name: &str, params: &[&str], kind: EquationKind, body: TermField) -> EquationId {
        self.version += 1;
        #[allow(clippy::cast_possible_truncation)]
        let id = EquationId::new(self.equations.len() as u32);
        let name = self.arena.symbol(name);
        let params: SmallVec<[_; 2]> = params.iter().map(|p| self.arena.symbol(p)).collect();
        self.equations.push(Equation {
            id,
            name,
            params,
            kind,
            body,
        });
        id
    }

    /// Appends `name(params…) := body`. Without parameters this is a constant.
    pub fn add_function(&mut self, name: &str, params: &[&str], body: TermField) -> EquationId {
        self.push(name, params, EquationKind::Function, body)
    }

    /// Appends the constant `name := body`.
    pub fn add_constant(&mut self, name: &str, body: TermField) -> EquationId {
        self.push(name, &[], EquationKind::Function, body)
    }

    /// Appends the array `name[params…] := body`.
    pub fn add_array(&mut self, name: &str, params: &[&str], body: TermField) -> EquationId {
        self.push(name, params, EquationKind::Array, body)
    }

    /// Appends the interval `name := [min, min + step .. max]`.
    pub fn add_interval(
        &mut self,
        name: &str,
        min: TermField,
        step: TermField,
        max: TermField,
    ) -> EquationId {
        self.push(
            name,
            &[],
            EquationKind::Interval { min, step, max },
            TermField::Empty,
        )
    }

    /// Replaces the body of an equation.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnknownEquation`] for a foreign id.
    pub fn set_body(&mut self, id: EquationId, body: TermField) -> Result<(), DocumentError> {
        let equation = self
            .equations
            .get_mut(id.index() as usize)
            .ok_or(DocumentError::UnknownEquation(id))?;
        equation.body = body;
        self.version += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_and_serde() {
        let settings = DocumentSettings::default();
        assert_eq!(settings.significant_digits, 6);
        assert_eq!(settings.precision, 1e-8);
        assert!(!settings.redefine_allowed);

        let parsed: DocumentSettings =
            serde_json::from_str(r#"{ "redefine_allowed": true }"#).unwrap();
        assert!(parsed.redefine_allowed);
        assert_eq!(parsed.significant_digits, 6);

        let json = serde_json::to_string(&settings.clone().with_precision(1e-6)).unwrap();
        let back: DocumentSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.precision, 1e-6);
    }

    #[test]
    fn test_version_bumps() {
        let mut doc = Document::new();
        let v0 = doc.version();
        let x = doc.arena_mut().argument("x");
        let f = doc.add_function("f", &["x"], x);
        assert!(doc.version() > v0);

        let v1 = doc.version();
        doc.set_body(f, TermField::from(1.0)).unwrap();
        assert!(doc.version() > v1);
        assert_eq!(doc.equation(f).unwrap().body, TermField::from(1.0));
    }

    #[test]
    fn test_lookup() {
        let mut doc = Document::new();
        let one = doc.arena().number(1.0);
        let a = doc.add_constant("a", one);
        doc.add_interval("t", 0.0.into(), 0.5.into(), 2.0.into());

        assert_eq!(doc.find("a").map(|e| e.id), Some(a));
        assert!(doc.find("t").is_some_and(Equation::is_interval));
        assert_eq!(doc.equation_name(a), "a");
        assert_eq!(
            doc.equation(EquationId::new(9)),
            Err(DocumentError::UnknownEquation(EquationId::new(9)))
        );
    }

    #[test]
    fn test_describe_uses_significant_digits() {
        let settings = DocumentSettings::default().with_significant_digits(3);
        assert_eq!(settings.describe(&NumericValue::real(1.234_56)), "1.23");
    }
}
