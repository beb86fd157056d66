//! Concrete contracts guarding registration, lookup and sub-typing.
//!
//! Stateless contracts are unit structs. Contracts bound to a table, a root
//! namespace or a registry compare by what they are bound to.

use core::ptr;

use nomos_contract::{Contract, Evidence, Filter, FilterState, Inspect};
use serde_json::json;

use crate::id::{NamespaceKey, SymbolId, SymbolKind, PARENT_REF, ROOT_REF, SELF_REF};
use crate::namespace::{RootNamespace, Scope};
use crate::registry::{Registration, Registry};
use crate::subtype::SubTypeStage;
use crate::symbol::Symbol;
use crate::table::SymbolTable;
use crate::types::{Type, TypeBuilder, TypeVariant};
use crate::value::ValueClass;

/// Characters never allowed in a symbol name.
pub const RESERVED_CHARS: [char; 4] = ['/', '[', ']', ','];

/// Keeps identifiers not yet present in a table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolMustBeUnique<'t> {
    table: &'t SymbolTable,
}

impl<'t> SymbolMustBeUnique<'t> {
    /// Binds the contract to `table`.
    #[must_use]
    pub fn new(table: &'t SymbolTable) -> Self {
        Self { table }
    }
}

impl Filter<SymbolId> for SymbolMustBeUnique<'_> {
    fn filter(&self, id: &SymbolId) -> FilterState {
        FilterState::from_bool(!self.table.contains_symbol(id))
    }
}

impl Contract<SymbolId> for SymbolMustBeUnique<'_> {
    fn name(&self) -> &str {
        "SymbolMustBeUnique"
    }

    fn terms(&self) -> String {
        "the identifier must not already be present in the symbol table".to_string()
    }
}

/// Keeps identifiers present in a table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolMustBeInTable<'t> {
    table: &'t SymbolTable,
}

impl<'t> SymbolMustBeInTable<'t> {
    /// Binds the contract to `table`.
    #[must_use]
    pub fn new(table: &'t SymbolTable) -> Self {
        Self { table }
    }
}

impl Filter<SymbolId> for SymbolMustBeInTable<'_> {
    fn filter(&self, id: &SymbolId) -> FilterState {
        FilterState::from_bool(self.table.contains_symbol(id))
    }
}

impl Contract<SymbolId> for SymbolMustBeInTable<'_> {
    fn name(&self) -> &str {
        "SymbolMustBeInTable"
    }

    fn terms(&self) -> String {
        "the identifier must be present in the symbol table".to_string()
    }
}

/// Keeps symbols whose kind a declared kind admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolMustMatchKind {
    declared: SymbolKind,
}

impl SymbolMustMatchKind {
    /// Binds the contract to the declared kind.
    #[must_use]
    pub fn new(declared: SymbolKind) -> Self {
        Self { declared }
    }
}

impl Filter<Symbol> for SymbolMustMatchKind {
    fn filter(&self, symbol: &Symbol) -> FilterState {
        FilterState::from_bool(self.declared.admits(symbol.kind()))
    }
}

impl Contract<Symbol> for SymbolMustMatchKind {
    fn name(&self) -> &str {
        "SymbolMustMatchKind"
    }

    fn terms(&self) -> String {
        format!("the symbol must be admitted by declared kind `{}`", self.declared)
    }
}

/// Keeps symbols that are not namespace-like.
///
/// Namespaces, types and tags enter the tree through the registry only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymbolMustNotBeNamespace;

impl Filter<Symbol> for SymbolMustNotBeNamespace {
    fn filter(&self, symbol: &Symbol) -> FilterState {
        FilterState::from_bool(!symbol.kind().is_namespace_like())
    }
}

impl Contract<Symbol> for SymbolMustNotBeNamespace {
    fn name(&self) -> &str {
        "SymbolMustNotBeNamespace"
    }

    fn terms(&self) -> String {
        "namespaces, types and tags must be added through the registry".to_string()
    }
}

/// Keeps names usable as symbol names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameMustBeWellFormed;

impl Filter<str> for NameMustBeWellFormed {
    fn filter(&self, name: &str) -> FilterState {
        FilterState::from_bool(
            !name.trim().is_empty()
                && !matches!(name, SELF_REF | PARENT_REF | ROOT_REF)
                && !name.contains(RESERVED_CHARS),
        )
    }
}

impl Contract<str> for NameMustBeWellFormed {
    fn name(&self) -> &str {
        "NameMustBeWellFormed"
    }

    fn terms(&self) -> String {
        format!(
            "a name must be non-blank, not a back-reference, and free of {RESERVED_CHARS:?}"
        )
    }
}

/// Keeps keys of live registry nodes.
#[derive(Debug, Clone, Copy)]
pub struct NamespaceMustBeRegistered<'r> {
    registry: &'r Registry,
}

impl<'r> NamespaceMustBeRegistered<'r> {
    /// Binds the contract to `registry`.
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }
}

impl PartialEq for NamespaceMustBeRegistered<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.registry, other.registry)
    }
}

impl Filter<NamespaceKey> for NamespaceMustBeRegistered<'_> {
    fn filter(&self, key: &NamespaceKey) -> FilterState {
        FilterState::from_bool(self.registry.is_registered(*key))
    }
}

impl Contract<NamespaceKey> for NamespaceMustBeRegistered<'_> {
    fn name(&self) -> &str {
        "NamespaceMustBeRegistered"
    }

    fn terms(&self) -> String {
        "the key must address a registered namespace".to_string()
    }
}

/// Keeps keys lying outside the subtree rooted at `ancestor`.
#[derive(Debug, Clone, Copy)]
pub struct NamespaceMustNotBeWithin<'r> {
    registry: &'r Registry,
    ancestor: NamespaceKey,
}

impl<'r> NamespaceMustNotBeWithin<'r> {
    /// Binds the contract to the subtree of `ancestor`.
    #[must_use]
    pub fn new(registry: &'r Registry, ancestor: NamespaceKey) -> Self {
        Self { registry, ancestor }
    }
}

impl PartialEq for NamespaceMustNotBeWithin<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.registry, other.registry) && self.ancestor == other.ancestor
    }
}

impl Filter<NamespaceKey> for NamespaceMustNotBeWithin<'_> {
    fn filter(&self, key: &NamespaceKey) -> FilterState {
        FilterState::from_bool(!self.registry.is_within(*key, self.ancestor))
    }
}

impl Contract<NamespaceKey> for NamespaceMustNotBeWithin<'_> {
    fn name(&self) -> &str {
        "NamespaceMustNotBeWithin"
    }

    fn terms(&self) -> String {
        format!("the namespace must lie outside the subtree of {}", self.ancestor)
    }
}

/// Keeps registrations that are live right now.
///
/// Dynamic: the result is recomputed against the registry on every call, so
/// moving or removing a symbol flips it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymbolMustBeRegistered;

impl<'r> Filter<Registration<'r>> for SymbolMustBeRegistered {
    fn filter(&self, registration: &Registration<'r>) -> FilterState {
        FilterState::from_bool(registration.is_registered())
    }
}

impl<'r> Contract<Registration<'r>> for SymbolMustBeRegistered {
    fn name(&self) -> &str {
        "SymbolMustBeRegistered"
    }

    fn terms(&self) -> String {
        "the symbol must currently be registered in the namespace".to_string()
    }
}

/// A type builder together with the namespace it is about to enter.
#[derive(Debug, Clone, Copy)]
pub struct BuildTarget<'a> {
    /// The registry holding the destination.
    pub registry: &'a Registry,
    /// Where the type will be registered.
    pub destination: NamespaceKey,
    /// The builder being checked.
    pub builder: &'a TypeBuilder,
}

impl Inspect for BuildTarget<'_> {
    fn evidence(&self) -> Evidence {
        Evidence::Snapshot(json!({
            "destination": self.destination,
            "type": self.builder.id(),
            "value_class": self.builder.value_class(),
            "none": self.builder.none(),
            "disabled": self.builder.disabled().map(|v| v.contract().to_string()),
        }))
    }
}

/// Keeps builders that may be materialised into their destination.
///
/// Requires a registered destination that does not already hold the
/// builder's identity, a builder not disabled by a failed tag check, and a
/// none sentinel admitted by the builder's value class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeMustBeValid;

impl Filter<BuildTarget<'_>> for TypeMustBeValid {
    fn filter(&self, target: &BuildTarget<'_>) -> FilterState {
        let Some(destination) = target.registry.node(target.destination) else {
            return FilterState::Discarded;
        };
        let builder = target.builder;
        FilterState::from_bool(
            builder.disabled().is_none()
                && !destination.contains_symbol(&builder.id().symbol_id())
                && builder.value_class().admits(builder.none()),
        )
    }
}

impl Contract<BuildTarget<'_>> for TypeMustBeValid {
    fn name(&self) -> &str {
        "TypeMustBeValid"
    }

    fn terms(&self) -> String {
        "the type must be new to its destination and its value class must admit its none"
            .to_string()
    }
}

/// Discards missing types and the unknown-type marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeMustNotBeUnknown;

impl<'a> Filter<Option<&'a Type>> for TypeMustNotBeUnknown {
    fn filter(&self, ty: &Option<&'a Type>) -> FilterState {
        FilterState::from_bool(matches!(ty, Some(ty) if ty.variant() != TypeVariant::NoSymbol))
    }
}

impl<'a> Contract<Option<&'a Type>> for TypeMustNotBeUnknown {
    fn name(&self) -> &str {
        "TypeMustNotBeUnknown"
    }

    fn terms(&self) -> String {
        "a type must be resolved and must not be the unknown type".to_string()
    }
}

/// Keeps value classes not yet bound to a type in a root namespace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueClassMustBeUnbound<'r> {
    root: &'r RootNamespace,
}

impl<'r> ValueClassMustBeUnbound<'r> {
    /// Binds the contract to `root`.
    #[must_use]
    pub fn new(root: &'r RootNamespace) -> Self {
        Self { root }
    }
}

impl Filter<ValueClass> for ValueClassMustBeUnbound<'_> {
    fn filter(&self, class: &ValueClass) -> FilterState {
        FilterState::from_bool(self.root.type_of(class).is_none())
    }
}

impl Contract<ValueClass> for ValueClassMustBeUnbound<'_> {
    fn name(&self) -> &str {
        "ValueClassMustBeUnbound"
    }

    fn terms(&self) -> String {
        "a value class may be bound to one type per root namespace".to_string()
    }
}

/// Keeps work benches that have reached an expected stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkBenchMustBeAt {
    stage: SubTypeStage,
}

impl WorkBenchMustBeAt {
    /// Binds the contract to the expected stage.
    #[must_use]
    pub fn new(stage: SubTypeStage) -> Self {
        Self { stage }
    }
}

impl Filter<SubTypeStage> for WorkBenchMustBeAt {
    fn filter(&self, stage: &SubTypeStage) -> FilterState {
        FilterState::from_bool(*stage == self.stage)
    }
}

impl Contract<SubTypeStage> for WorkBenchMustBeAt {
    fn name(&self) -> &str {
        "WorkBenchMustBeAt"
    }

    fn terms(&self) -> String {
        format!("the work bench must be at stage `{}`", self.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_names() {
        let contract = NameMustBeWellFormed;
        assert!(contract.filter("length").is_kept());
        assert!(contract.filter("  ").is_discarded());
        assert!(contract.filter("..").is_discarded());
        assert!(contract.filter("a,b").is_discarded());
    }

    #[test]
    fn stateless_contracts_are_equal() {
        assert_eq!(TypeMustBeValid, TypeMustBeValid);
        assert_eq!(SymbolMustNotBeNamespace, SymbolMustNotBeNamespace::default());
    }

    #[test]
    fn table_bound_contracts_compare_by_table() {
        let empty = SymbolTable::new();
        let mut other = SymbolTable::new();
        other.put(SymbolId::self_ref(), Symbol::Namespace(NamespaceKey(0)));
        assert_eq!(SymbolMustBeUnique::new(&empty), SymbolMustBeUnique::new(&SymbolTable::new()));
        assert_ne!(SymbolMustBeUnique::new(&empty), SymbolMustBeUnique::new(&other));
    }

    #[test]
    fn stage_contract_names_expected_stage() {
        let contract = WorkBenchMustBeAt::new(SubTypeStage::Renamed);
        assert!(contract.filter(&SubTypeStage::Renamed).is_kept());
        let violation = contract.violation("test", &SubTypeStage::Initialized);
        assert!(violation.terms().contains("renamed"));
    }
}
