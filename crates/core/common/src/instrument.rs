//! Symbol interning for fast per-instrument lookups

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Dense symbol identifier handed out by a [`SymbolRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(pub u32);

impl Symbol {
    /// Create a new symbol with the given id
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SYM_{}", self.0)
    }
}

/// Maps symbol names to dense ids
///
/// Owned by whoever needs interning (the tick engine keeps one); there
/// is deliberately no process-wide instance.
#[derive(Debug, Default)]
pub struct SymbolRegistry {
    names: Vec<String>,
    ids: HashMap<String, Symbol>,
}

impl SymbolRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `name`, registering it on first sight
    #[allow(clippy::cast_possible_truncation)]
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(&symbol) = self.ids.get(name) {
            return symbol;
        }
        let symbol = Symbol::new(self.names.len() as u32);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), symbol);
        symbol
    }

    /// Look up a previously interned name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.ids.get(name).copied()
    }

    /// Resolve an id back to its name
    #[must_use]
    pub fn name(&self, symbol: Symbol) -> Option<&str> {
        self.names.get(symbol.0 as usize).map(String::as_str)
    }

    /// Number of registered symbols
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no symbols have been registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
