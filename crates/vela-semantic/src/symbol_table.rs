//! Symbol table for identifier resolution.
//!
//! Scopes live in a flat vector and link to the scope they were opened
//! from, so any scope can outlive its creator: record-field scopes must
//! stay addressable long after their `data` definition finished, because
//! member access resolves against them. Only one chain is active at a
//! time; `find` walks current -> previous -> root.
//!
//! Each name maps to a list of resolutions in insertion order -- the
//! overload set. Overload legality is the analyzer's business (it needs
//! the definitions arena to compare function types); the table only
//! provides the storage operations.

use std::collections::HashMap;
use vela_hir::{Expr, Resolved};

/// One lexical scope.
#[derive(Debug, Default)]
pub struct Scope {
    symbols: HashMap<String, Vec<Resolved>>,
    previous: usize,
}

/// The scope vector, the active-scope cursor, and the preferred-scope
/// slot used during relational query analysis.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: usize,
    /// Query operand whose record scope is consulted before the lexical
    /// chain. Set and cleared by the relational visitors.
    pub preferred: Option<Expr>,
}

impl SymbolTable {
    /// Creates a table with the root scope (0) and the startup scope (1),
    /// which receives the built-ins and stays active for user code.
    #[must_use]
    pub fn new() -> Self {
        let mut table = Self {
            scopes: vec![Scope::default()],
            current: 0,
            preferred: None,
        };
        table.push_scope();
        table
    }

    /// Opens a new scope chained to the current one and activates it.
    pub fn push_scope(&mut self) -> usize {
        self.scopes.push(Scope {
            symbols: HashMap::new(),
            previous: self.current,
        });
        self.current = self.scopes.len() - 1;
        self.current
    }

    /// Deactivates the current scope. The scope itself persists.
    pub fn pop_scope(&mut self) {
        self.current = self.scopes[self.current].previous;
    }

    #[must_use]
    pub fn current_scope(&self) -> usize {
        self.current
    }

    /// Re-activates an existing scope (function bodies store their name in
    /// the outer scope while their arguments live in the inner one).
    pub fn set_current(&mut self, scope: usize) {
        self.current = scope;
    }

    /// Walks the active chain for a name; returns its overload list.
    #[must_use]
    pub fn find(&self, name: &str) -> Vec<Resolved> {
        let mut idx = self.current;
        loop {
            if let Some(found) = self.scopes[idx].symbols.get(name) {
                return found.clone();
            }
            if idx == 0 {
                return Vec::new();
            }
            idx = self.scopes[idx].previous;
        }
    }

    /// Looks a name up in one scope only.
    #[must_use]
    pub fn find_in(&self, name: &str, scope: usize) -> Vec<Resolved> {
        self.scopes[scope]
            .symbols
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether the current scope already has an entry for the name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.scopes[self.current].symbols.contains_key(name)
    }

    /// Inserts a fresh name into the current scope.
    pub fn insert(&mut self, name: &str, res: Resolved) {
        self.scopes[self.current]
            .symbols
            .insert(name.to_string(), vec![res]);
    }

    /// The overload list of a name in the current scope.
    pub fn entries_mut(&mut self, name: &str) -> Option<&mut Vec<Resolved>> {
        self.scopes[self.current].symbols.get_mut(name)
    }

    /// Appends a resolution without legality checks (built-in setup).
    pub fn append(&mut self, name: &str, res: Resolved) {
        self.scopes[self.current]
            .symbols
            .entry(name.to_string())
            .or_default()
            .push(res);
    }

    /// Removes a name from the current scope.
    pub fn remove(&mut self, name: &str) -> bool {
        self.scopes[self.current].symbols.remove(name).is_some()
    }

    /// Removes one specific resolution of a name from the current scope;
    /// used to unwind a definition that accumulated errors.
    pub fn remove_ref(&mut self, name: &str, res: &Resolved) {
        if let Some(entries) = self.scopes[self.current].symbols.get_mut(name) {
            if let Some(pos) = entries.iter().position(|r| r == res) {
                entries.remove(pos);
            }
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
