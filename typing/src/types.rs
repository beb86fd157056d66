//! Types and type builders.

use core::fmt;

use nomos_contract::{Constraint, Contract, Evidence, Filter, Inspect, Violation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::contracts::SymbolMustNotBeNamespace;
use crate::id::{NamespaceKey, SymbolId, TypeId, Visibility};
use crate::namespace::{merge_preferring, ConstraintBearing, Identified, Renamable, Scope};
use crate::symbol::Symbol;
use crate::table::SymbolTable;
use crate::value::{Value, ValueClass};

/// The variants of [`Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeVariant {
    /// An ordinary type.
    Standard,
    /// The type of constraints.
    Constraint,
    /// The type of tags.
    Tag,
    /// The kind: the type of types, which starts new type builders.
    Kind,
    /// The unknown-type marker, used when no type could be resolved.
    NoSymbol,
}

impl fmt::Display for TypeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "standard",
            Self::Constraint => "constraint",
            Self::Tag => "tag",
            Self::Kind => "kind",
            Self::NoSymbol => "no_symbol",
        })
    }
}

/// A materialised type.
///
/// Types are immutable once registered; only the registry rebinds their
/// structural entries. Each type carries a value class and a `none`
/// sentinel that is always an instance of that class.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    id: TypeId,
    variant: TypeVariant,
    value_class: ValueClass,
    none: Value,
    constraints: Vec<Constraint<Value>>,
    root_type: Option<NamespaceKey>,
    table: SymbolTable,
}

impl Type {
    /// The type's identity.
    #[must_use]
    pub fn id(&self) -> &TypeId {
        &self.id
    }

    /// The type's variant.
    #[must_use]
    pub fn variant(&self) -> TypeVariant {
        self.variant
    }

    /// The class of values the type admits.
    #[must_use]
    pub fn value_class(&self) -> &ValueClass {
        &self.value_class
    }

    /// The value returned in place of a result when an operation fails.
    #[must_use]
    pub fn none(&self) -> &Value {
        &self.none
    }

    /// The untagged ancestor of a sub-type; `None` for untagged types.
    #[must_use]
    pub fn root_type(&self) -> Option<NamespaceKey> {
        self.root_type
    }

    /// Returns true for the unknown-type marker.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.variant == TypeVariant::NoSymbol
    }

    /// Returns true if `value` belongs to the value class and every
    /// accumulated constraint keeps it.
    #[must_use]
    pub fn is_instance(&self, value: &Value) -> bool {
        self.value_class.admits(value) && self.constraints.iter().all(|c| c.filter(value).is_kept())
    }

    pub(crate) fn table_mut(&mut self) -> &mut SymbolTable {
        &mut self.table
    }
}

impl Identified for Type {
    fn symbol_id(&self) -> SymbolId {
        self.id.symbol_id()
    }
}

impl Scope for Type {
    fn table(&self) -> &SymbolTable {
        &self.table
    }
}

impl ConstraintBearing for Type {
    fn constraints(&self) -> &[Constraint<Value>] {
        &self.constraints
    }
}

impl Renamable for Type {
    /// Produces an untagged copy under a fresh raw name.
    fn rename(&self, name: &str) -> Result<Self, Violation> {
        self.rename_with(name, &SymbolTable::new())
    }

    fn rename_with(&self, name: &str, table: &SymbolTable) -> Result<Self, Violation> {
        Ok(Self {
            id: TypeId::try_new(name)?.with_visibility(self.id.visibility()),
            variant: self.variant,
            value_class: self.value_class.clone(),
            none: self.none.clone(),
            constraints: self.constraints.clone(),
            root_type: None,
            table: merge_preferring(table, &self.table),
        })
    }
}

impl Inspect for Type {
    fn evidence(&self) -> Evidence {
        Evidence::Snapshot(json!({
            "type": self.id,
            "variant": self.variant,
            "value_class": self.value_class,
        }))
    }
}

/// Where an in-progress builder currently sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Not placed anywhere.
    Detached,
    /// In a throwaway staging namespace private to one derivation.
    Staging(SymbolId),
    /// Bound to the namespace it will be registered in.
    Destination(NamespaceKey),
}

/// Mutable state of a type under construction.
///
/// A builder owns its table outright; the registry turns it into an
/// immutable [`Type`] when it is registered.
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    id: TypeId,
    variant: TypeVariant,
    value_class: ValueClass,
    none: Value,
    constraints: Vec<Constraint<Value>>,
    root_type: Option<NamespaceKey>,
    table: SymbolTable,
    placement: Placement,
    disabled: Option<Violation>,
}

impl TypeBuilder {
    /// Starts a standard type.
    ///
    /// # Errors
    ///
    /// Returns a `NameMustBeWellFormed` violation if `raw_name` is malformed.
    pub fn new(raw_name: &str, value_class: ValueClass, none: Value) -> Result<Self, Violation> {
        Ok(Self::from_parts(TypeId::try_new(raw_name)?, TypeVariant::Standard, value_class, none))
    }

    pub(crate) fn from_parts(
        id: TypeId,
        variant: TypeVariant,
        value_class: ValueClass,
        none: Value,
    ) -> Self {
        Self {
            id,
            variant,
            value_class,
            none,
            constraints: Vec::new(),
            root_type: None,
            table: SymbolTable::new(),
            placement: Placement::Detached,
            disabled: None,
        }
    }

    /// Sets the variant.
    #[must_use]
    pub fn with_variant(mut self, variant: TypeVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets the visibility of the type's identity.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.id = self.id.with_visibility(visibility);
        self
    }

    /// Replaces the table with the non-structural entries of `table`.
    #[must_use]
    pub fn with_table(mut self, table: &SymbolTable) -> Self {
        self.table = table.without_structure();
        self
    }

    /// Adds a value constraint; constraints are deduplicated by name.
    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint<Value>) -> Self {
        self.push_constraint(constraint);
        self
    }

    /// Adds a symbol to the builder's table.
    ///
    /// # Errors
    ///
    /// Returns `SymbolMustNotBeNamespace` for namespace-like symbols and the
    /// violations of [`SymbolTable::add`].
    pub fn with_symbol(mut self, id: SymbolId, symbol: Symbol) -> Result<Self, Violation> {
        self.add_symbol(id, symbol)?;
        Ok(self)
    }

    /// Adds a symbol to the builder's table.
    ///
    /// # Errors
    ///
    /// Returns `SymbolMustNotBeNamespace` for namespace-like symbols and the
    /// violations of [`SymbolTable::add`].
    pub fn add_symbol(&mut self, id: SymbolId, symbol: Symbol) -> Result<(), Violation> {
        SymbolMustNotBeNamespace.enforce("TypeBuilder::add_symbol", &symbol)?;
        self.table.add(id, symbol)
    }

    /// The identity the built type will have.
    #[must_use]
    pub fn id(&self) -> &TypeId {
        &self.id
    }

    /// The variant of the built type.
    #[must_use]
    pub fn variant(&self) -> TypeVariant {
        self.variant
    }

    /// The value class of the built type.
    #[must_use]
    pub fn value_class(&self) -> &ValueClass {
        &self.value_class
    }

    /// The none sentinel of the built type.
    #[must_use]
    pub fn none(&self) -> &Value {
        &self.none
    }

    /// Constraints accumulated so far.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint<Value>] {
        &self.constraints
    }

    /// The recorded untagged ancestor.
    #[must_use]
    pub fn root_type(&self) -> Option<NamespaceKey> {
        self.root_type
    }

    /// The builder's table.
    #[must_use]
    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// Where the builder currently sits.
    #[must_use]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// The violation that disabled the builder, if any.
    #[must_use]
    pub fn disabled(&self) -> Option<&Violation> {
        self.disabled.as_ref()
    }

    pub(crate) fn set_id(&mut self, id: TypeId) {
        self.id = id;
    }

    pub(crate) fn set_root_type(&mut self, root_type: Option<NamespaceKey>) {
        self.root_type = root_type;
    }

    pub(crate) fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
    }

    pub(crate) fn table_mut(&mut self) -> &mut SymbolTable {
        &mut self.table
    }

    pub(crate) fn push_constraint(&mut self, constraint: Constraint<Value>) {
        if !self.constraints.contains(&constraint) {
            self.constraints.push(constraint);
        }
    }

    pub(crate) fn disable(&mut self, violation: Violation) {
        self.disabled.get_or_insert(violation);
    }

    pub(crate) fn into_type(self) -> Type {
        Type {
            id: self.id,
            variant: self.variant,
            value_class: self.value_class,
            none: self.none,
            constraints: self.constraints,
            root_type: self.root_type,
            table: self.table,
        }
    }
}

impl From<&Type> for TypeBuilder {
    fn from(ty: &Type) -> Self {
        Self {
            id: ty.id.clone(),
            variant: ty.variant,
            value_class: ty.value_class.clone(),
            none: ty.none.clone(),
            constraints: ty.constraints.clone(),
            root_type: ty.root_type,
            table: ty.table.without_structure(),
            placement: Placement::Detached,
            disabled: None,
        }
    }
}
