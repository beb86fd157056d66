//! Namespaces and the capability traits shared by every namespace-like node.

use indexmap::IndexMap;
use nomos_contract::{Constraint, Contract, Filter, Violation};
use std::sync::Arc;

use crate::contracts::{SymbolMustBeUnique, SymbolMustNotBeNamespace, ValueClassMustBeUnbound};
use crate::id::{NamespaceKey, SymbolId, SymbolKind};
use crate::symbol::Symbol;
use crate::table::SymbolTable;
use crate::tag::Tag;
use crate::types::Type;
use crate::value::{Value, ValueClass};

/// Something with a symbol identifier.
pub trait Identified {
    /// The identifier the entity is registered under.
    fn symbol_id(&self) -> SymbolId;
}

/// Something owning a symbol table.
///
/// Lookups search the receiver's own table only. Parent access is explicit
/// through the `..` back-reference.
pub trait Scope: Identified {
    /// The owned table.
    fn table(&self) -> &SymbolTable;

    /// Returns true if `id` is present in the owned table.
    fn contains_symbol(&self, id: &SymbolId) -> bool {
        self.table().contains_symbol(id)
    }

    /// Looks up `id` in the owned table.
    fn symbol(&self, id: &SymbolId) -> Option<&Symbol> {
        self.table().symbol(id)
    }

    /// The key bound to `..`, once registered.
    fn parent_key(&self) -> Option<NamespaceKey> {
        self.symbol(&SymbolId::parent_ref())
            .and_then(Symbol::namespace_key)
    }
}

/// Something that can be copied under a fresh identity.
pub trait Renamable: Scope + Sized {
    /// Copies the receiver under `name`, carrying over its non-structural
    /// symbols.
    ///
    /// # Errors
    ///
    /// Returns a `NameMustBeWellFormed` violation if `name` is malformed.
    fn rename(&self, name: &str) -> Result<Self, Violation>;

    /// Like [`Renamable::rename`], with `table` merged in. Entries of
    /// `table` win over the receiver's on conflicting identifiers.
    ///
    /// # Errors
    ///
    /// Returns a `NameMustBeWellFormed` violation if `name` is malformed.
    fn rename_with(&self, name: &str, table: &SymbolTable) -> Result<Self, Violation>;
}

/// Something carrying value constraints.
pub trait ConstraintBearing {
    /// The constraints, in the order they were attached.
    fn constraints(&self) -> &[Constraint<Value>];

    /// Checks `value` against every constraint.
    ///
    /// # Errors
    ///
    /// Returns the violation of the first constraint that discards `value`.
    fn check_constraints(&self, plaintiff: &str, value: &Value) -> Result<(), Violation> {
        self.constraints()
            .iter()
            .try_for_each(|constraint| constraint.enforce(plaintiff, value))
    }
}

/// Merges two tables, `preferred` winning on conflicts. Structural entries
/// of either table are dropped.
pub(crate) fn merge_preferring(preferred: &SymbolTable, rest: &SymbolTable) -> SymbolTable {
    let mut merged = preferred.without_structure();
    for (id, symbol) in rest.without_structure().iter() {
        if !merged.contains_symbol(id) {
            merged.put(id.clone(), symbol.clone());
        }
    }
    merged
}

/// A plain namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    id: SymbolId,
    table: SymbolTable,
}

impl Namespace {
    /// Creates an empty, unregistered namespace.
    ///
    /// # Errors
    ///
    /// Returns a `NameMustBeWellFormed` violation if `name` is malformed.
    pub fn new(name: &str) -> Result<Self, Violation> {
        Ok(Self {
            id: SymbolId::try_new(name, SymbolKind::Namespace)?,
            table: SymbolTable::new(),
        })
    }

    pub(crate) fn with_id(id: SymbolId) -> Self {
        Self {
            id,
            table: SymbolTable::new(),
        }
    }

    /// Adds a non-namespace symbol.
    ///
    /// # Errors
    ///
    /// Returns `SymbolMustNotBeNamespace` for namespace-like symbols and the
    /// violations of [`SymbolTable::add`].
    pub fn add_symbol(&mut self, id: SymbolId, symbol: Symbol) -> Result<(), Violation> {
        SymbolMustNotBeNamespace.enforce("Namespace::add_symbol", &symbol)?;
        self.table.add(id, symbol)
    }

    pub(crate) fn table_mut(&mut self) -> &mut SymbolTable {
        &mut self.table
    }
}

impl Identified for Namespace {
    fn symbol_id(&self) -> SymbolId {
        self.id.clone()
    }
}

impl Scope for Namespace {
    fn table(&self) -> &SymbolTable {
        &self.table
    }
}

impl Renamable for Namespace {
    fn rename(&self, name: &str) -> Result<Self, Violation> {
        self.rename_with(name, &SymbolTable::new())
    }

    fn rename_with(&self, name: &str, table: &SymbolTable) -> Result<Self, Violation> {
        Ok(Self {
            id: self.id.renamed(name)?,
            table: merge_preferring(table, &self.table),
        })
    }
}

impl ConstraintBearing for Namespace {
    fn constraints(&self) -> &[Constraint<Value>] {
        &[]
    }
}

/// The root of a namespace tree.
///
/// Besides its table, a root tracks which type each value class resolves
/// to. A class is bound to at most one type per root.
#[derive(Debug, Clone, PartialEq)]
pub struct RootNamespace {
    namespace: Namespace,
    bindings: IndexMap<ValueClass, NamespaceKey>,
}

impl RootNamespace {
    pub(crate) fn with_id(id: SymbolId) -> Self {
        Self {
            namespace: Namespace::with_id(id),
            bindings: IndexMap::new(),
        }
    }

    /// The type bound to `class`, if any.
    #[must_use]
    pub fn type_of(&self, class: &ValueClass) -> Option<NamespaceKey> {
        self.bindings.get(class).copied()
    }

    /// All class bindings in registration order.
    pub fn bindings(&self) -> impl Iterator<Item = (&ValueClass, NamespaceKey)> {
        self.bindings.iter().map(|(class, key)| (class, *key))
    }

    /// Checks that the type `id` of class `class` may be bound here.
    ///
    /// # Errors
    ///
    /// Returns `SymbolMustBeUnique` caused by `ValueClassMustBeUnbound` when
    /// the class is already bound.
    pub fn check_binding(&self, id: &SymbolId, class: &ValueClass) -> Result<(), Violation> {
        let unbound = ValueClassMustBeUnbound::new(self);
        if unbound.filter(class).is_kept() {
            return Ok(());
        }
        let cause = unbound.violation("RootNamespace::bind", class);
        Err(SymbolMustBeUnique::new(self.namespace.table()).violation_with_cause(
            "RootNamespace::bind",
            id,
            Arc::new(cause),
        ))
    }

    pub(crate) fn bind(&mut self, class: ValueClass, key: NamespaceKey) {
        self.bindings.insert(class, key);
    }

    pub(crate) fn unbind(&mut self, key: NamespaceKey) {
        self.bindings.retain(|_, bound| *bound != key);
    }

    pub(crate) fn table_mut(&mut self) -> &mut SymbolTable {
        self.namespace.table_mut()
    }
}

impl Identified for RootNamespace {
    fn symbol_id(&self) -> SymbolId {
        self.namespace.symbol_id()
    }
}

impl Scope for RootNamespace {
    fn table(&self) -> &SymbolTable {
        self.namespace.table()
    }
}

impl ConstraintBearing for RootNamespace {
    fn constraints(&self) -> &[Constraint<Value>] {
        &[]
    }
}

/// A node of the namespace tree held by the registry.
#[derive(Debug, Clone)]
pub enum Node {
    /// A plain namespace.
    Namespace(Namespace),
    /// A root namespace.
    Root(RootNamespace),
    /// A type.
    Type(Type),
    /// A tag.
    Tag(Tag),
}

impl Node {
    /// The kind the node is registered as.
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        match self {
            Self::Namespace(_) | Self::Root(_) => SymbolKind::Namespace,
            Self::Type(_) => SymbolKind::Type,
            Self::Tag(_) => SymbolKind::Tag,
        }
    }

    /// The type, if the node is one.
    #[must_use]
    pub fn as_type(&self) -> Option<&Type> {
        match self {
            Self::Type(ty) => Some(ty),
            _ => None,
        }
    }

    /// The tag, if the node is one.
    #[must_use]
    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            Self::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    /// The root namespace, if the node is one.
    #[must_use]
    pub fn as_root(&self) -> Option<&RootNamespace> {
        match self {
            Self::Root(root) => Some(root),
            _ => None,
        }
    }

    pub(crate) fn as_root_mut(&mut self) -> Option<&mut RootNamespace> {
        match self {
            Self::Root(root) => Some(root),
            _ => None,
        }
    }

    pub(crate) fn table_mut(&mut self) -> &mut SymbolTable {
        match self {
            Self::Namespace(namespace) => namespace.table_mut(),
            Self::Root(root) => root.table_mut(),
            Self::Type(ty) => ty.table_mut(),
            Self::Tag(tag) => tag.table_mut(),
        }
    }
}

impl Identified for Node {
    fn symbol_id(&self) -> SymbolId {
        match self {
            Self::Namespace(namespace) => namespace.symbol_id(),
            Self::Root(root) => root.symbol_id(),
            Self::Type(ty) => ty.symbol_id(),
            Self::Tag(tag) => tag.symbol_id(),
        }
    }
}

impl Scope for Node {
    fn table(&self) -> &SymbolTable {
        match self {
            Self::Namespace(namespace) => namespace.table(),
            Self::Root(root) => root.table(),
            Self::Type(ty) => ty.table(),
            Self::Tag(tag) => tag.table(),
        }
    }
}

impl ConstraintBearing for Node {
    fn constraints(&self) -> &[Constraint<Value>] {
        match self {
            Self::Namespace(_) | Self::Root(_) => &[],
            Self::Type(ty) => ty.constraints(),
            Self::Tag(tag) => tag.constraints(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Constant;

    fn constant(value: i64) -> Symbol {
        Symbol::Constant(Constant::new(NamespaceKey(1), Value::Int(value)))
    }

    #[test]
    fn namespace_rejects_namespace_symbols() {
        let mut ns = Namespace::new("math").expect("valid name");
        let child = SymbolId::unchecked("sub", SymbolKind::Namespace);
        assert!(ns.add_symbol(child, Symbol::Namespace(NamespaceKey(4))).is_err());
        let pi = SymbolId::unchecked("pi", SymbolKind::Constant);
        assert!(ns.add_symbol(pi.clone(), constant(3)).is_ok());
        assert!(ns.contains_symbol(&pi));
        assert_eq!(ns.parent_key(), None);
    }

    #[test]
    fn rename_is_independent() {
        let mut ns = Namespace::new("math").expect("valid name");
        let pi = SymbolId::unchecked("pi", SymbolKind::Constant);
        assert!(ns.add_symbol(pi.clone(), constant(3)).is_ok());
        let mut copy = ns.rename("maths").expect("valid name");
        assert_eq!(copy.symbol_id().name(), "maths");
        copy.table_mut().remove(&pi).expect("copied");
        assert!(ns.contains_symbol(&pi));
    }

    #[test]
    fn root_binding_conflict_is_uniqueness_violation() {
        let mut root = RootNamespace::with_id(SymbolId::unchecked("root", SymbolKind::Namespace));
        let id = SymbolId::unchecked("text", SymbolKind::Type);
        assert!(root.check_binding(&id, &ValueClass::Text).is_ok());
        root.bind(ValueClass::Text, NamespaceKey(3));
        let violation = root.check_binding(&id, &ValueClass::Text).err();
        assert!(violation
            .as_ref()
            .is_some_and(|v| v.is_violation_of("SymbolMustBeUnique")));
        let chain = violation.map(|v| v.cause_chain()).unwrap_or_default();
        assert!(chain.iter().any(|m| m.contains("ValueClassMustBeUnbound")));
    }
}
