//! Symbol interning.
//!
//! Every name in a document (equation names, parameters, loop indices) is
//! stored once and referred to by a [`SymbolId`].

use crate::FxHashMap;
use std::fmt;

/// An interned name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sym({})", self.0)
    }
}

/// Maps names to [`SymbolId`]s and back.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    ids: FxHashMap<String, SymbolId>,
    names: Vec<String>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a name, returning the existing id if it was seen before.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = SymbolId(u32::try_from(self.names.len()).unwrap_or(u32::MAX));
        self.ids.insert(name.to_owned(), id);
        self.names.push(name.to_owned());
        id
    }

    /// Returns the id of a name without interning it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.ids.get(name).copied()
    }

    /// Returns the name of an id.
    #[must_use]
    pub fn name(&self, id: SymbolId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    /// Returns the number of interned names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_table() {
        let mut table = SymbolTable::new();

        let x = table.intern("x");
        let y = table.intern("y");
        let x2 = table.intern("x");

        assert_eq!(x, x2);
        assert_ne!(x, y);
        assert_eq!(table.name(y), Some("y"));
        assert_eq!(table.get("z"), None);
        assert_eq!(table.len(), 2);
    }
}
