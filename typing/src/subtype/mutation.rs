//! Mutations: how one symbol is kept, replaced or dropped while a sub-type
//! is derived.

use core::fmt;
use std::sync::Arc;

use nomos_contract::{Contract, Violation};
use tracing::trace;

use crate::contracts::SymbolMustNotBeNamespace;
use crate::id::SymbolId;
use crate::symbol::Symbol;
use crate::table::SymbolTable;

/// One symbol on its way into a sub-type's table.
///
/// A present symbol overwrites the entry; an absent one removes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    symbol_id: SymbolId,
    symbol: Option<Symbol>,
}

/// What applying a [`Mutation`] did to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationEffect {
    /// A new entry was added.
    Inserted,
    /// An existing entry was overwritten.
    Replaced,
    /// An existing entry was removed.
    Removed,
    /// Nothing changed.
    Unchanged,
}

impl Mutation {
    /// A mutation that carries `symbol` through under `id`.
    #[must_use]
    pub fn keep(symbol_id: SymbolId, symbol: Symbol) -> Self {
        Self {
            symbol_id,
            symbol: Some(symbol),
        }
    }

    /// A mutation that removes `id`.
    #[must_use]
    pub fn remove(symbol_id: SymbolId) -> Self {
        Self {
            symbol_id,
            symbol: None,
        }
    }

    /// The identifier affected.
    #[must_use]
    pub fn symbol_id(&self) -> &SymbolId {
        &self.symbol_id
    }

    /// The symbol carried, or `None` for a removal.
    #[must_use]
    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    /// Returns true if this mutation removes its symbol.
    #[must_use]
    pub fn is_removal(&self) -> bool {
        self.symbol.is_none()
    }

    /// Applies the mutation to `table`.
    ///
    /// # Errors
    ///
    /// Returns `SymbolMustNotBeNamespace` if the carried symbol is
    /// namespace-like, and `SymbolMustMatchKind` if the identifier's kind
    /// does not admit it.
    pub fn apply_to(&self, table: &mut SymbolTable) -> Result<MutationEffect, Violation> {
        let effect = match &self.symbol {
            Some(symbol) => {
                SymbolMustNotBeNamespace.enforce("Mutation::apply_to", symbol)?;
                match table.set(self.symbol_id.clone(), symbol.clone())? {
                    Some(previous) if previous == *symbol => MutationEffect::Unchanged,
                    Some(_) => MutationEffect::Replaced,
                    None => MutationEffect::Inserted,
                }
            }
            None if table.contains_symbol(&self.symbol_id) => {
                table.remove(&self.symbol_id)?;
                MutationEffect::Removed
            }
            None => MutationEffect::Unchanged,
        };
        trace!(id = %self.symbol_id, ?effect, "applied mutation");
        Ok(effect)
    }
}

type MutatorFn = Arc<dyn Fn(Mutation) -> Mutation + Send + Sync>;

/// A named transformation of mutations contributed by a tag.
#[derive(Clone)]
pub struct Mutator {
    name: Arc<str>,
    mutate: MutatorFn,
}

impl Mutator {
    /// Creates a mutator from a closure.
    pub fn new<F>(name: impl Into<Arc<str>>, mutate: F) -> Self
    where
        F: Fn(Mutation) -> Mutation + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            mutate: Arc::new(mutate),
        }
    }

    /// Drops the symbol `id` whenever it passes through.
    #[must_use]
    pub fn drop_symbol(id: SymbolId) -> Self {
        let name = format!("drop {id}");
        Self::new(name, move |mutation| {
            if mutation.symbol_id == id {
                Mutation::remove(id.clone())
            } else {
                mutation
            }
        })
    }

    /// Replaces the symbol `id` with `symbol` whenever it passes through.
    #[must_use]
    pub fn replace(id: SymbolId, symbol: Symbol) -> Self {
        let name = format!("replace {id}");
        Self::new(name, move |mutation| {
            if mutation.symbol_id == id {
                Mutation::keep(id.clone(), symbol.clone())
            } else {
                mutation
            }
        })
    }

    /// The mutator's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transforms `mutation`.
    #[must_use]
    pub fn mutate(&self, mutation: Mutation) -> Mutation {
        (self.mutate)(mutation)
    }
}

impl fmt::Debug for Mutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Mutator").field(&self.name).finish()
    }
}
