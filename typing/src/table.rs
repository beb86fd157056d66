//! Ordered symbol tables.

use indexmap::map::{Iter, Keys};
use indexmap::IndexMap;
use nomos_contract::{Contract, Violation};

use crate::contracts::{SymbolMustBeInTable, SymbolMustBeUnique, SymbolMustMatchKind};
use crate::id::{SymbolId, SymbolKind};
use crate::symbol::Symbol;

/// An ordered mapping from [`SymbolId`] to [`Symbol`].
///
/// Insertion order is preserved for deterministic traversal. Namespace-like
/// identifiers (namespaces, types, tags) share one name space: a table never
/// holds a type and a namespace under the same name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    entries: IndexMap<SymbolId, Symbol>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new entry.
    ///
    /// # Errors
    ///
    /// Returns `SymbolMustMatchKind` if the identifier's declared kind does
    /// not admit `symbol`, and `SymbolMustBeUnique` if the identifier is
    /// already present.
    pub fn add(&mut self, id: SymbolId, symbol: Symbol) -> Result<(), Violation> {
        SymbolMustMatchKind::new(id.kind()).enforce("SymbolTable::add", &symbol)?;
        SymbolMustBeUnique::new(self).enforce("SymbolTable::add", &id)?;
        self.entries.insert(id, symbol);
        Ok(())
    }

    /// Inserts or overwrites an entry, returning the symbol it replaced.
    ///
    /// This is the only sanctioned form of replacement. Only the exact
    /// identifier is overwritten; a namespace-like entry of the same name
    /// under another kind still blocks the insertion.
    ///
    /// # Errors
    ///
    /// Returns `SymbolMustMatchKind` if the identifier's declared kind does
    /// not admit `symbol`, and `SymbolMustBeUnique` if a different entry
    /// holds the name.
    pub fn set(&mut self, id: SymbolId, symbol: Symbol) -> Result<Option<Symbol>, Violation> {
        SymbolMustMatchKind::new(id.kind()).enforce("SymbolTable::set", &symbol)?;
        if !self.entries.contains_key(&id) {
            SymbolMustBeUnique::new(self).enforce("SymbolTable::set", &id)?;
        }
        Ok(self.entries.insert(id, symbol))
    }

    pub(crate) fn put(&mut self, id: SymbolId, symbol: Symbol) {
        self.entries.insert(id, symbol);
    }

    pub(crate) fn evict(&mut self, id: &SymbolId) -> Option<Symbol> {
        self.entries.shift_remove(id)
    }

    /// Removes an entry, preserving the order of the rest.
    ///
    /// A namespace-like identifier also removes the entry holding its name
    /// under another namespace-like kind.
    ///
    /// # Errors
    ///
    /// Returns `SymbolMustBeInTable` if nothing is stored under `id`.
    pub fn remove(&mut self, id: &SymbolId) -> Result<Symbol, Violation> {
        let in_table = SymbolMustBeInTable::new(self);
        in_table.enforce("SymbolTable::remove", id)?;
        let key = self.key_of(id).cloned();
        let removed = key.and_then(|key| self.entries.shift_remove(&key));
        removed.ok_or_else(|| SymbolMustBeInTable::new(self).violation("SymbolTable::remove", id))
    }

    fn key_of(&self, id: &SymbolId) -> Option<&SymbolId> {
        if let Some((key, _)) = self.entries.get_key_value(id) {
            return Some(key);
        }
        if !id.kind().is_namespace_like() {
            return None;
        }
        SymbolKind::Namespace.admitted().iter().find_map(|kind| {
            self.entries
                .get_key_value(&SymbolId::unchecked(id.name(), *kind))
                .map(|(key, _)| key)
        })
    }

    /// Appends every entry of `other` after the existing ones.
    ///
    /// The merge is all-or-nothing: conflicts are checked before anything is
    /// inserted.
    ///
    /// # Errors
    ///
    /// Returns `SymbolMustBeUnique` for the first conflicting identifier.
    pub fn add_all(&mut self, other: &SymbolTable) -> Result<(), Violation> {
        let unique = SymbolMustBeUnique::new(self);
        for id in other.entries.keys() {
            unique.enforce("SymbolTable::add_all", id)?;
        }
        self.entries
            .extend(other.entries.iter().map(|(id, symbol)| (id.clone(), symbol.clone())));
        Ok(())
    }

    /// Returns true if `id`, or a namespace-like entry of the same name for
    /// namespace-like identifiers, is present.
    #[must_use]
    pub fn contains_symbol(&self, id: &SymbolId) -> bool {
        if self.entries.contains_key(id) {
            return true;
        }
        id.kind().is_namespace_like()
            && SymbolKind::Namespace
                .admitted()
                .iter()
                .any(|kind| self.entries.contains_key(&SymbolId::unchecked(id.name(), *kind)))
    }

    /// Looks up `id`, keeping only symbols whose kind the identifier's
    /// declared kind admits.
    #[must_use]
    pub fn symbol(&self, id: &SymbolId) -> Option<&Symbol> {
        id.kind()
            .admitted()
            .iter()
            .filter_map(|kind| {
                if *kind == id.kind() {
                    self.entries.get(id)
                } else {
                    self.entries.get(&SymbolId::unchecked(id.name(), *kind))
                }
            })
            .find(|symbol| id.kind().admits(symbol.kind()))
    }

    /// Looks up `id` like [`SymbolTable::symbol`], treating absence as a
    /// violation.
    ///
    /// # Errors
    ///
    /// Returns `SymbolMustBeInTable` if no entry the identifier's kind
    /// admits is stored under its name.
    pub fn require(&self, id: &SymbolId) -> Result<&Symbol, Violation> {
        let in_table = SymbolMustBeInTable::new(self);
        in_table.enforce("SymbolTable::require", id)?;
        self.symbol(id)
            .ok_or_else(|| in_table.violation("SymbolTable::require", id))
    }

    /// Identifiers whose declared kind `kind` admits, in insertion order.
    ///
    /// The returned iterator is `Clone`, so the sequence can be restarted.
    #[must_use]
    pub fn symbol_ids(&self, kind: SymbolKind) -> SymbolIds<'_> {
        SymbolIds {
            keys: self.entries.keys(),
            kind,
        }
    }

    /// The distinct declared kinds present, in order of first appearance.
    #[must_use]
    pub fn symbol_kinds(&self) -> Vec<SymbolKind> {
        let mut kinds = Vec::new();
        for id in self.entries.keys() {
            if !kinds.contains(&id.kind()) {
                kinds.push(id.kind());
            }
        }
        kinds
    }

    /// A copy without namespace-like entries.
    ///
    /// Back-references and child links are bound by the registry; detached
    /// copies never carry them.
    #[must_use]
    pub fn without_structure(&self) -> SymbolTable {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(id, _)| !id.kind().is_namespace_like())
                .map(|(id, symbol)| (id.clone(), symbol.clone()))
                .collect(),
        }
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> Iter<'_, SymbolId, Symbol> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a SymbolTable {
    type Item = (&'a SymbolId, &'a Symbol);
    type IntoIter = Iter<'a, SymbolId, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy, restartable sequence of identifiers of one kind.
#[derive(Debug, Clone)]
pub struct SymbolIds<'a> {
    keys: Keys<'a, SymbolId, Symbol>,
    kind: SymbolKind,
}

impl<'a> Iterator for SymbolIds<'a> {
    type Item = &'a SymbolId;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = self.kind;
        self.keys.by_ref().find(|id| kind.admits(id.kind()))
    }
}
