//! Tags: symbols that contribute constraints, symbols and mutators to the
//! types they are applied to.

use nomos_contract::{Constraint, Contract, Violation};

use crate::contracts::SymbolMustNotBeNamespace;
use crate::id::{SymbolId, SymbolKind};
use crate::namespace::{merge_preferring, ConstraintBearing, Identified, Renamable, Scope};
use crate::subtype::{Mutation, Mutator};
use crate::symbol::Symbol;
use crate::table::SymbolTable;
use crate::types::Type;
use crate::value::Value;

/// A tag.
///
/// A tag carrying a type constraint only applies to types that constraint
/// keeps; the check runs when a sub-type is derived.
#[derive(Debug, Clone)]
pub struct Tag {
    id: SymbolId,
    table: SymbolTable,
    constraints: Vec<Constraint<Value>>,
    mutators: Vec<Mutator>,
    type_constraint: Option<Constraint<Type>>,
}

impl Tag {
    /// Creates a tag without constraints, symbols or mutators.
    ///
    /// # Errors
    ///
    /// Returns a `NameMustBeWellFormed` violation if `name` is malformed.
    pub fn new(name: &str) -> Result<Self, Violation> {
        Ok(Self {
            id: SymbolId::try_new(name, SymbolKind::Tag)?,
            table: SymbolTable::new(),
            constraints: Vec::new(),
            mutators: Vec::new(),
            type_constraint: None,
        })
    }

    /// Adds a value constraint, ignoring one already present by name.
    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint<Value>) -> Self {
        if !self.constraints.contains(&constraint) {
            self.constraints.push(constraint);
        }
        self
    }

    /// Appends a mutator.
    #[must_use]
    pub fn with_mutator(mut self, mutator: Mutator) -> Self {
        self.mutators.push(mutator);
        self
    }

    /// Restricts the tag to types kept by `constraint`.
    #[must_use]
    pub fn with_type_constraint(mut self, constraint: Constraint<Type>) -> Self {
        self.type_constraint = Some(constraint);
        self
    }

    /// Adds a symbol the tag contributes to sub-types.
    ///
    /// # Errors
    ///
    /// Returns `SymbolMustNotBeNamespace` for namespace-like symbols and the
    /// violations of [`SymbolTable::add`].
    pub fn with_symbol(mut self, id: SymbolId, symbol: Symbol) -> Result<Self, Violation> {
        SymbolMustNotBeNamespace.enforce("Tag::with_symbol", &symbol)?;
        self.table.add(id, symbol)?;
        Ok(self)
    }

    /// The tag's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// The tag's mutators in application order.
    #[must_use]
    pub fn mutators(&self) -> &[Mutator] {
        &self.mutators
    }

    /// The type constraint, if any.
    #[must_use]
    pub fn type_constraint(&self) -> Option<&Constraint<Type>> {
        self.type_constraint.as_ref()
    }

    /// Passes `mutation` through every mutator of the tag.
    #[must_use]
    pub fn mutate(&self, mutation: Mutation) -> Mutation {
        self.mutators
            .iter()
            .fold(mutation, |mutation, mutator| mutator.mutate(mutation))
    }

    /// Checks that the tag may be applied to `ty`.
    ///
    /// # Errors
    ///
    /// Returns the violation of the type constraint when it discards `ty`.
    pub fn check_type(&self, plaintiff: &str, ty: &Type) -> Result<(), Violation> {
        match &self.type_constraint {
            Some(constraint) => constraint.enforce(plaintiff, ty),
            None => Ok(()),
        }
    }

    pub(crate) fn table_mut(&mut self) -> &mut SymbolTable {
        &mut self.table
    }
}

impl Identified for Tag {
    fn symbol_id(&self) -> SymbolId {
        self.id.clone()
    }
}

impl Scope for Tag {
    fn table(&self) -> &SymbolTable {
        &self.table
    }
}

impl ConstraintBearing for Tag {
    fn constraints(&self) -> &[Constraint<Value>] {
        &self.constraints
    }
}

impl Renamable for Tag {
    fn rename(&self, name: &str) -> Result<Self, Violation> {
        self.rename_with(name, &SymbolTable::new())
    }

    fn rename_with(&self, name: &str, table: &SymbolTable) -> Result<Self, Violation> {
        Ok(Self {
            id: self.id.renamed(name)?,
            table: merge_preferring(table, &self.table),
            constraints: self.constraints.clone(),
            mutators: self.mutators.clone(),
            type_constraint: self.type_constraint.clone(),
        })
    }
}
