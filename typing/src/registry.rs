//! The registry: an arena of namespace-like nodes and the explicit
//! initialisation context every factory receives.
//!
//! Construction creates the root namespace and the four meta types
//! (`none`, `type`, `tag`, `constraint`). Nodes refer to each other by
//! [`NamespaceKey`]; every registered node carries the back-references
//! `.`, `..` and `/`, and the root's `..` points at itself.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nomos_contract::{Contract, Evidence, Filter, Inspect, Violation};
use serde_json::json;
use tracing::debug;

use crate::config::{ConfigError, TypingConfig};
use crate::contracts::{
    BuildTarget, NamespaceMustBeRegistered, NamespaceMustNotBeWithin, SymbolMustBeUnique,
    SymbolMustMatchKind, SymbolMustNotBeNamespace, TypeMustBeValid,
};
use crate::failure::{Failure, Outcome};
use crate::id::{NamespaceKey, SymbolId, SymbolKind, TypeId, Visibility, PARENT_REF, SELF_REF};
use crate::kind::Kind;
use crate::namespace::{Identified, Namespace, Node, RootNamespace, Scope};
use crate::subtype::{SubTypePipeline, SubTypeWorkBench};
use crate::symbol::Symbol;
use crate::tag::Tag;
use crate::types::{Placement, Type, TypeBuilder, TypeVariant};
use crate::value::{Value, ValueClass};

/// Name of the unknown-type marker.
pub const UNKNOWN_TYPE: &str = "none";
/// Name of the root kind.
pub const KIND_TYPE: &str = "type";
/// Name of the type of tags.
pub const TAG_TYPE: &str = "tag";
/// Name of the type of constraints.
pub const CONSTRAINT_TYPE: &str = "constraint";

/// The arena of namespace-like nodes.
///
/// Unregistering a node drops it and leaves its slot vacant. Slots are
/// never reused, so a stale [`NamespaceKey`] stays dead instead of
/// resolving to a later node. Sub-typing stages its builder under a staging
/// name and only takes a slot once finalisation succeeds.
#[derive(Debug)]
pub struct Registry {
    config: TypingConfig,
    nodes: Vec<Option<Node>>,
    root: NamespaceKey,
    kind: NamespaceKey,
    unknown: NamespaceKey,
    tag: NamespaceKey,
    constraint: NamespaceKey,
    staging: AtomicUsize,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies every node. The copy keeps numbering staging namespaces where the
/// original left off.
impl Clone for Registry {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            nodes: self.nodes.clone(),
            root: self.root,
            kind: self.kind,
            unknown: self.unknown,
            tag: self.tag,
            constraint: self.constraint,
            staging: AtomicUsize::new(self.staging.load(Ordering::Relaxed)),
        }
    }
}

impl Registry {
    /// Creates a registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::bootstrap(TypingConfig::default())
    }

    /// Creates a registry with `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration does not
    /// validate.
    pub fn with_config(config: TypingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::bootstrap(config))
    }

    fn bootstrap(config: TypingConfig) -> Self {
        let root = NamespaceKey(0);
        let root_id = SymbolId::unchecked(config.root_name.as_str(), SymbolKind::Namespace);
        let mut root_node = Node::Root(RootNamespace::with_id(root_id));
        let table = root_node.table_mut();
        for back_reference in [SymbolId::self_ref(), SymbolId::parent_ref(), SymbolId::root_ref()] {
            table.put(back_reference, Symbol::Namespace(root));
        }
        let mut registry = Self {
            config,
            nodes: vec![Some(root_node)],
            root,
            kind: root,
            unknown: root,
            tag: root,
            constraint: root,
            staging: AtomicUsize::new(0),
        };
        registry.unknown = registry.insert_meta(
            UNKNOWN_TYPE,
            TypeVariant::NoSymbol,
            ValueClass::Unit,
            Value::Unit,
        );
        registry.kind = registry.insert_meta(
            KIND_TYPE,
            TypeVariant::Kind,
            ValueClass::Type,
            Value::Type(TypeId::unchecked(UNKNOWN_TYPE)),
        );
        registry.tag = registry.insert_meta(
            TAG_TYPE,
            TypeVariant::Tag,
            ValueClass::Symbol,
            Value::Symbol(SymbolId::unchecked("no_tag", SymbolKind::Tag)),
        );
        registry.constraint = registry.insert_meta(
            CONSTRAINT_TYPE,
            TypeVariant::Constraint,
            ValueClass::named(CONSTRAINT_TYPE),
            Value::opaque(CONSTRAINT_TYPE, nomos_contract::constraint::NO_CONSTRAINT),
        );
        debug!(root = %registry.root, name = %registry.config.root_name, "bootstrapped registry");
        registry
    }

    fn insert_meta(
        &mut self,
        name: &str,
        variant: TypeVariant,
        value_class: ValueClass,
        none: Value,
    ) -> NamespaceKey {
        let ty =
            TypeBuilder::from_parts(TypeId::unchecked(name), variant, value_class.clone(), none)
                .into_type();
        let key = self.insert_node(self.root, Node::Type(ty));
        self.bind(self.root, value_class, key);
        key
    }

    /// Links `node` under `parent`. Callers have run every check.
    fn insert_node(&mut self, parent: NamespaceKey, mut node: Node) -> NamespaceKey {
        let key = NamespaceKey(self.nodes.len());
        let id = node.symbol_id();
        let kind = node.kind();
        let parent_kind = self.node(parent).map_or(SymbolKind::Namespace, Node::kind);
        let table = node.table_mut();
        table.put(SymbolId::self_ref(), Symbol::for_node(kind, key));
        table.put(SymbolId::parent_ref(), Symbol::for_node(parent_kind, parent));
        table.put(SymbolId::root_ref(), Symbol::Namespace(self.root));
        self.nodes.push(Some(node));
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.table_mut().put(id.clone(), Symbol::for_node(kind, key));
        }
        debug!(%key, %id, %parent, "registered node");
        key
    }

    fn bind(&mut self, root: NamespaceKey, class: ValueClass, key: NamespaceKey) {
        if let Some(root) = self.node_mut(root).and_then(Node::as_root_mut) {
            root.bind(class, key);
        }
    }

    fn unbind(&mut self, root: NamespaceKey, key: NamespaceKey) {
        if let Some(root) = self.node_mut(root).and_then(Node::as_root_mut) {
            root.unbind(key);
        }
    }

    /// The configuration the registry was built with.
    #[must_use]
    pub fn config(&self) -> &TypingConfig {
        &self.config
    }

    /// The root namespace.
    #[must_use]
    pub fn root(&self) -> NamespaceKey {
        self.root
    }

    /// The root kind, `type`.
    #[must_use]
    pub fn kind(&self) -> NamespaceKey {
        self.kind
    }

    /// The unknown-type marker, `none`.
    #[must_use]
    pub fn unknown_type(&self) -> NamespaceKey {
        self.unknown
    }

    /// The type of tags.
    #[must_use]
    pub fn tag_type(&self) -> NamespaceKey {
        self.tag
    }

    /// The type of constraints.
    #[must_use]
    pub fn constraint_type(&self) -> NamespaceKey {
        self.constraint
    }

    /// The root kind as a [`Kind`], while it is registered.
    #[must_use]
    pub fn root_kind(&self) -> Option<Kind<'_>> {
        self.get_type(self.kind).and_then(Kind::of)
    }

    /// The none sentinel of the unknown type.
    #[must_use]
    pub fn unknown_none(&self) -> Value {
        self.get_type(self.unknown)
            .map_or(Value::Unit, |ty| ty.none().clone())
    }

    /// The node at `key`, if registered.
    #[must_use]
    pub fn node(&self, key: NamespaceKey) -> Option<&Node> {
        self.nodes.get(key.index()).and_then(Option::as_ref)
    }

    pub(crate) fn node_mut(&mut self, key: NamespaceKey) -> Option<&mut Node> {
        self.nodes.get_mut(key.index()).and_then(Option::as_mut)
    }

    /// The type at `key`, if registered.
    #[must_use]
    pub fn get_type(&self, key: NamespaceKey) -> Option<&Type> {
        self.node(key).and_then(Node::as_type)
    }

    /// The tag at `key`, if registered.
    #[must_use]
    pub fn get_tag(&self, key: NamespaceKey) -> Option<&Tag> {
        self.node(key).and_then(Node::as_tag)
    }

    /// Returns true if `key` addresses a live node.
    #[must_use]
    pub fn is_registered(&self, key: NamespaceKey) -> bool {
        self.node(key).is_some()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Returns true if no node is live, which only happens after the root
    /// itself was lost.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The node bound to `..` of `key`. The root is its own parent.
    #[must_use]
    pub fn parent_of(&self, key: NamespaceKey) -> Option<NamespaceKey> {
        self.node(key).and_then(|node| node.parent_key())
    }

    /// The namespace-like entries of `key` in declaration order, without the
    /// back-references. Keys are returned even if they no longer resolve.
    #[must_use]
    pub fn children(&self, key: NamespaceKey) -> Vec<NamespaceKey> {
        self.node(key)
            .map(|node| {
                node.table()
                    .iter()
                    .filter(|(id, _)| !id.is_back_reference())
                    .filter_map(|(_, symbol)| symbol.namespace_key())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns true if `key` is `ancestor` or lies in its subtree.
    #[must_use]
    pub fn is_within(&self, key: NamespaceKey, ancestor: NamespaceKey) -> bool {
        let mut current = key;
        for _ in 0..=self.nodes.len() {
            if current == ancestor {
                return true;
            }
            match self.parent_of(current) {
                Some(parent) if parent != current => current = parent,
                _ => return false,
            }
        }
        false
    }

    /// Looks `id` up in the own table of `namespace`.
    #[must_use]
    pub fn lookup(&self, namespace: NamespaceKey, id: &SymbolId) -> Option<&Symbol> {
        self.node(namespace).and_then(|node| node.symbol(id))
    }

    /// Navigates `path` from `from`.
    ///
    /// Segments are separated by `/`; a leading `/` starts at the root, `.`
    /// stays and `..` goes to the parent. Names resolve in the current
    /// node's own table only.
    #[must_use]
    pub fn resolve_path(&self, from: NamespaceKey, path: &str) -> Option<NamespaceKey> {
        let (mut current, rest) = match path.strip_prefix('/') {
            Some(rest) => (self.root, rest),
            None => (from, path),
        };
        self.node(current)?;
        for segment in rest.split('/').filter(|s| !s.is_empty()) {
            current = match segment {
                SELF_REF => current,
                PARENT_REF => self.parent_of(current)?,
                name => {
                    let id = SymbolId::unchecked(name, SymbolKind::Namespace);
                    self.lookup(current, &id)?.namespace_key()?
                }
            };
        }
        self.node(current).map(|_| current)
    }

    /// The type bound to `class` in the root namespace at `root`.
    #[must_use]
    pub fn type_of(&self, root: NamespaceKey, class: &ValueClass) -> Option<NamespaceKey> {
        self.node(root)
            .and_then(Node::as_root)
            .and_then(|root| root.type_of(class))
    }

    /// The untagged ancestor of the type at `key`; an untagged type is its
    /// own root type.
    #[must_use]
    pub fn root_type_of(&self, key: NamespaceKey) -> Option<NamespaceKey> {
        self.get_type(key).map(|ty| ty.root_type().unwrap_or(key))
    }

    /// A liveness check for `id` in `namespace`, checked by
    /// [`SymbolMustBeRegistered`](crate::contracts::SymbolMustBeRegistered).
    #[must_use]
    pub fn registration(&self, namespace: NamespaceKey, id: SymbolId) -> Registration<'_> {
        Registration {
            registry: self,
            namespace,
            id,
        }
    }

    /// Creates and registers an empty namespace.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_namespace`]; also `NameMustBeWellFormed`.
    pub fn create_namespace(
        &mut self,
        parent: NamespaceKey,
        name: &str,
    ) -> Result<NamespaceKey, Violation> {
        self.add_namespace(parent, Namespace::new(name)?)
    }

    /// Registers `namespace` under `parent`.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceMustBeRegistered` for a dead parent and
    /// `SymbolMustBeUnique` if the parent already holds the name.
    pub fn add_namespace(
        &mut self,
        parent: NamespaceKey,
        namespace: Namespace,
    ) -> Result<NamespaceKey, Violation> {
        self.check_slot(parent, &namespace.symbol_id(), "Registry::add_namespace")?;
        Ok(self.insert_node(parent, Node::Namespace(namespace)))
    }

    /// Registers `tag` under `parent`.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceMustBeRegistered` for a dead parent and
    /// `SymbolMustBeUnique` if the parent already holds the name.
    pub fn add_tag(&mut self, parent: NamespaceKey, tag: Tag) -> Result<NamespaceKey, Violation> {
        self.check_slot(parent, &tag.symbol_id(), "Registry::add_tag")?;
        Ok(self.insert_node(parent, Node::Tag(tag)))
    }

    fn check_slot(
        &self,
        parent: NamespaceKey,
        id: &SymbolId,
        plaintiff: &str,
    ) -> Result<(), Violation> {
        NamespaceMustBeRegistered::new(self).enforce(plaintiff, &parent)?;
        match self.node(parent) {
            Some(node) => SymbolMustBeUnique::new(node.table()).enforce(plaintiff, id),
            None => Ok(()),
        }
    }

    /// Materialises `builder` and registers it under `parent`.
    ///
    /// # Errors
    ///
    /// Fails with the builder's none sentinel and a `TypeMustBeValid`
    /// violation (caused by the violation that disabled the builder, if
    /// any), or with `SymbolMustBeUnique` when `parent` is a root whose
    /// value class binding is taken.
    pub fn add_type(
        &mut self,
        parent: NamespaceKey,
        mut builder: TypeBuilder,
    ) -> Outcome<NamespaceKey> {
        let target = BuildTarget {
            registry: self,
            destination: parent,
            builder: &builder,
        };
        if TypeMustBeValid.filter(&target).is_discarded() {
            let mut violation = TypeMustBeValid.violation("Registry::add_type", &target);
            if let Some(cause) = builder.disabled() {
                violation.attach_cause(Arc::new(cause.clone()));
            }
            return Err(Failure::new(builder.none().clone(), violation));
        }
        let id = builder.id().symbol_id();
        let is_root = self.node(parent).and_then(Node::as_root).is_some();
        if let Some(root) = self.node(parent).and_then(Node::as_root) {
            root.check_binding(&id, builder.value_class())
                .map_err(|violation| Failure::new(builder.none().clone(), violation))?;
        }
        builder.set_placement(Placement::Destination(parent));
        let class = builder.value_class().clone();
        let key = self.insert_node(parent, Node::Type(builder.into_type()));
        if is_root {
            self.bind(parent, class, key);
        }
        Ok(key)
    }

    /// Adds a constant, operation or constraint to a registered node.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceMustBeRegistered`, `SymbolMustNotBeNamespace`, or
    /// the violations of [`SymbolTable::add`](crate::SymbolTable::add).
    pub fn add_symbol(
        &mut self,
        node: NamespaceKey,
        id: SymbolId,
        symbol: Symbol,
    ) -> Result<(), Violation> {
        self.check_symbol(node, &symbol, "Registry::add_symbol")?;
        match self.node_mut(node) {
            Some(target) => target.table_mut().add(id, symbol),
            None => Ok(()),
        }
    }

    /// Inserts or overwrites a constant, operation or constraint.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceMustBeRegistered`, `SymbolMustNotBeNamespace`, or
    /// `SymbolMustMatchKind`.
    pub fn set_symbol(
        &mut self,
        node: NamespaceKey,
        id: SymbolId,
        symbol: Symbol,
    ) -> Result<Option<Symbol>, Violation> {
        self.check_symbol(node, &symbol, "Registry::set_symbol")?;
        match self.node_mut(node) {
            Some(target) => target.table_mut().set(id, symbol),
            None => Ok(None),
        }
    }

    fn check_symbol(
        &self,
        node: NamespaceKey,
        symbol: &Symbol,
        plaintiff: &str,
    ) -> Result<(), Violation> {
        NamespaceMustBeRegistered::new(self).enforce(plaintiff, &node)?;
        SymbolMustNotBeNamespace.enforce(plaintiff, symbol)
    }

    /// Removes a constant, operation or constraint.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceMustBeRegistered` for a dead node,
    /// `SymbolMustNotBeNamespace` if `id` names a namespace-like entry
    /// (those leave through [`Registry::unregister`]) and
    /// `SymbolMustBeInTable` if the node holds nothing under `id`.
    pub fn remove_symbol(
        &mut self,
        node: NamespaceKey,
        id: &SymbolId,
    ) -> Result<Symbol, Violation> {
        let plaintiff = "Registry::remove_symbol";
        NamespaceMustBeRegistered::new(self).enforce(plaintiff, &node)?;
        if let Some(symbol) = self.lookup(node, id) {
            SymbolMustNotBeNamespace.enforce(plaintiff, symbol)?;
        }
        let Some(target) = self.node_mut(node) else {
            return Err(NamespaceMustBeRegistered::new(self).violation(plaintiff, &node));
        };
        let removed = target.table_mut().remove(id)?;
        debug!(%node, %id, "removed symbol");
        Ok(removed)
    }

    /// Re-homes the node at `key` under `new_parent`.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceMustBeRegistered` for dead keys,
    /// `NamespaceMustNotBeWithin` if `new_parent` lies in the moved subtree,
    /// and `SymbolMustBeUnique` if the new parent holds the name already or
    /// is a root whose class binding is taken.
    pub fn move_to(
        &mut self,
        key: NamespaceKey,
        new_parent: NamespaceKey,
    ) -> Result<(), Violation> {
        let plaintiff = "Registry::move_to";
        let registered = NamespaceMustBeRegistered::new(self);
        registered.enforce(plaintiff, &key)?;
        registered.enforce(plaintiff, &new_parent)?;
        NamespaceMustNotBeWithin::new(self, key).enforce(plaintiff, &new_parent)?;

        let old_parent = self.parent_of(key);
        if old_parent == Some(new_parent) {
            return Ok(());
        }
        let Some(node) = self.node(key) else {
            return Ok(());
        };
        let id = node.symbol_id();
        let kind = node.kind();
        let class = node.as_type().map(|ty| ty.value_class().clone());
        self.check_slot(new_parent, &id, plaintiff)?;
        let new_parent_node = self.node(new_parent);
        let parent_kind = new_parent_node.map_or(SymbolKind::Namespace, Node::kind);
        let binds = match (new_parent_node.and_then(Node::as_root), &class) {
            (Some(root), Some(class)) => {
                root.check_binding(&id, class)?;
                true
            }
            _ => false,
        };

        if let Some(old_parent) = old_parent {
            if let Some(old) = self.node_mut(old_parent) {
                old.table_mut().evict(&id);
            }
            self.unbind(old_parent, key);
        }
        if let Some(target) = self.node_mut(new_parent) {
            target.table_mut().put(id.clone(), Symbol::for_node(kind, key));
        }
        if let Some(moved) = self.node_mut(key) {
            moved
                .table_mut()
                .put(SymbolId::parent_ref(), Symbol::for_node(parent_kind, new_parent));
        }
        if let (true, Some(class)) = (binds, class) {
            self.bind(new_parent, class, key);
        }
        debug!(%key, %id, parent = %new_parent, "moved node");
        Ok(())
    }

    /// Removes the node at `key` with its whole subtree, returning the keys
    /// removed.
    ///
    /// The removed nodes are dropped; their slots stay vacant.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceMustBeRegistered` for a dead key and
    /// `NamespaceMustNotBeWithin` when asked to remove the root.
    pub fn unregister(&mut self, key: NamespaceKey) -> Result<Vec<NamespaceKey>, Violation> {
        let plaintiff = "Registry::unregister";
        NamespaceMustBeRegistered::new(self).enforce(plaintiff, &key)?;
        NamespaceMustNotBeWithin::new(self, key).enforce(plaintiff, &self.root)?;

        let mut removed = Vec::new();
        let mut pending = vec![key];
        while let Some(next) = pending.pop() {
            if removed.contains(&next) || !self.is_registered(next) {
                continue;
            }
            removed.push(next);
            pending.extend(self.children(next));
        }

        if let Some(parent) = self.parent_of(key) {
            if let Some(id) = self.node(key).map(|node| node.symbol_id()) {
                if let Some(parent_node) = self.node_mut(parent) {
                    parent_node.table_mut().evict(&id);
                }
            }
            self.unbind(parent, key);
        }
        for gone in &removed {
            if let Some(slot) = self.nodes.get_mut(gone.index()) {
                *slot = None;
            }
        }
        debug!(%key, count = removed.len(), "unregistered subtree");
        Ok(removed)
    }

    /// Derives a sub-type of `parent` by applying the registered tags at
    /// `tags` in order, using the standard pipeline.
    ///
    /// # Errors
    ///
    /// Fails with the parent's none sentinel when derivation is rejected;
    /// see [`SubTypePipeline::derive`].
    pub fn sub_type(
        &mut self,
        parent: NamespaceKey,
        tags: &[NamespaceKey],
    ) -> Outcome<NamespaceKey> {
        let bench = SubTypeWorkBench::from_keys(self, parent, tags)
            .map_err(|violation| Failure::new(self.unknown_none(), violation))?;
        SubTypePipeline::standard().derive(self, bench)
    }

    /// Resolves the tags at `keys`.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceMustBeRegistered` for dead keys and
    /// `SymbolMustMatchKind` for nodes that are not tags.
    pub fn tags(&self, keys: &[NamespaceKey]) -> Result<Vec<Tag>, Violation> {
        keys.iter()
            .map(|key| {
                NamespaceMustBeRegistered::new(self).enforce("Registry::tags", key)?;
                match self.node(*key) {
                    Some(Node::Tag(tag)) => Ok(tag.clone()),
                    other => {
                        let kind = other.map_or(SymbolKind::Namespace, Node::kind);
                        Err(SymbolMustMatchKind::new(SymbolKind::Tag)
                            .violation("Registry::tags", &Symbol::for_node(kind, *key)))
                    }
                }
            })
            .collect()
    }

    pub(crate) fn next_staging_id(&self) -> SymbolId {
        let n = self.staging.fetch_add(1, Ordering::Relaxed);
        SymbolId::unchecked(
            format!("{}-{n}", self.config.staging_prefix),
            SymbolKind::Namespace,
        )
        .with_visibility(Visibility::Invisible)
    }
}

/// A symbol identifier paired with the namespace it is expected in.
///
/// Holding a registration does not keep anything alive; every check
/// consults the registry again.
#[derive(Debug, Clone)]
pub struct Registration<'r> {
    registry: &'r Registry,
    namespace: NamespaceKey,
    id: SymbolId,
}

impl Registration<'_> {
    /// The namespace checked.
    #[must_use]
    pub fn namespace(&self) -> NamespaceKey {
        self.namespace
    }

    /// The identifier checked.
    #[must_use]
    pub fn id(&self) -> &SymbolId {
        &self.id
    }

    /// Returns true if the namespace is live and holds the identifier.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registry.lookup(self.namespace, &self.id).is_some()
    }
}

impl Inspect for Registration<'_> {
    fn evidence(&self) -> Evidence {
        Evidence::Snapshot(json!({ "namespace": self.namespace, "id": self.id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::SymbolMustBeRegistered;
    use crate::symbol::Constant;

    fn text_builder(name: &str) -> TypeBuilder {
        TypeBuilder::new(name, ValueClass::Text, Value::text("")).expect("valid name")
    }

    #[test]
    fn bootstrap_registers_meta_types() {
        let registry = Registry::new();
        let root = registry.root();
        assert_eq!(registry.parent_of(root), Some(root));
        assert_eq!(registry.children(root), [
            registry.unknown_type(),
            registry.kind(),
            registry.tag_type(),
            registry.constraint_type(),
        ]);
        assert_eq!(registry.type_of(root, &ValueClass::Type), Some(registry.kind()));
        assert!(registry.root_kind().is_some());
        assert!(registry.get_type(registry.unknown_type()).is_some_and(Type::is_unknown));
    }

    #[test]
    fn add_type_binds_value_class() {
        let mut registry = Registry::new();
        let root = registry.root();
        let string = registry.add_type(root, text_builder("string")).expect("registers");
        assert_eq!(registry.type_of(root, &ValueClass::Text), Some(string));

        let failure = registry.add_type(root, text_builder("text")).err();
        assert!(failure.as_ref().is_some_and(|f| f.is_violation_of("SymbolMustBeUnique")));
        assert_eq!(failure.map(|f| f.none().clone()), Some(Value::text("")));
    }

    #[test]
    fn duplicate_type_is_invalid() {
        let mut registry = Registry::new();
        let ns = registry.create_namespace(registry.root(), "lib").expect("registers");
        assert!(registry.add_type(ns, text_builder("string")).is_ok());
        let failure = registry.add_type(ns, text_builder("string")).err();
        assert!(failure.is_some_and(|f| f.is_violation_of("TypeMustBeValid")));
    }

    #[test]
    fn none_must_be_instance_of_class() {
        let mut registry = Registry::new();
        let ns = registry.create_namespace(registry.root(), "lib").expect("registers");
        let builder =
            TypeBuilder::new("int", ValueClass::Int, Value::text("")).expect("valid name");
        let failure = registry.add_type(ns, builder).err();
        assert!(failure.is_some_and(|f| f.is_violation_of("TypeMustBeValid")));
    }

    #[test]
    fn resolve_path_navigates_explicitly() {
        let mut registry = Registry::new();
        let root = registry.root();
        let a = registry.create_namespace(root, "a").expect("registers");
        let b = registry.create_namespace(a, "b").expect("registers");
        assert_eq!(registry.resolve_path(root, "a/b"), Some(b));
        assert_eq!(registry.resolve_path(b, ".."), Some(a));
        assert_eq!(registry.resolve_path(b, "/a"), Some(a));
        assert_eq!(registry.resolve_path(b, "./../b"), Some(b));
        assert_eq!(registry.resolve_path(b, "a"), None);
        assert_eq!(registry.resolve_path(root, "/type"), Some(registry.kind()));
    }

    #[test]
    fn namespace_symbols_only_enter_through_registration() {
        let mut registry = Registry::new();
        let root = registry.root();
        let id = SymbolId::try_new("alias", SymbolKind::Namespace).expect("valid name");
        let err = registry.add_symbol(root, id, Symbol::Namespace(root)).err();
        assert!(err.is_some_and(|v| v.is_violation_of("SymbolMustNotBeNamespace")));

        let kind = SymbolId::unchecked(KIND_TYPE, SymbolKind::Type);
        let err = registry.remove_symbol(root, &kind).err();
        assert!(err.is_some_and(|v| v.is_violation_of("SymbolMustNotBeNamespace")));
    }

    #[test]
    fn registration_is_rechecked_after_move() {
        let mut registry = Registry::new();
        let root = registry.root();
        let a = registry.create_namespace(root, "a").expect("registers");
        let b = registry.create_namespace(root, "b").expect("registers");
        let c = registry.create_namespace(a, "c").expect("registers");
        let c_id = SymbolId::unchecked("c", SymbolKind::Namespace);

        assert!(SymbolMustBeRegistered.filter(&registry.registration(a, c_id.clone())).is_kept());
        registry.move_to(c, b).expect("moves");
        assert!(SymbolMustBeRegistered
            .filter(&registry.registration(a, c_id.clone()))
            .is_discarded());
        assert!(SymbolMustBeRegistered.filter(&registry.registration(b, c_id)).is_kept());
        assert_eq!(registry.parent_of(c), Some(b));
    }

    #[test]
    fn move_into_own_subtree_is_rejected() {
        let mut registry = Registry::new();
        let root = registry.root();
        let a = registry.create_namespace(root, "a").expect("registers");
        let b = registry.create_namespace(a, "b").expect("registers");
        let err = registry.move_to(a, b).err();
        assert!(err.is_some_and(|v| v.is_violation_of("NamespaceMustNotBeWithin")));
        assert!(registry.move_to(root, a).is_err());
    }

    #[test]
    fn unregister_removes_subtree_and_binding() {
        let mut registry = Registry::new();
        let root = registry.root();
        let string = registry.add_type(root, text_builder("string")).expect("registers");
        let pi = SymbolId::unchecked("empty", SymbolKind::Constant);
        registry
            .add_symbol(string, pi, Symbol::Constant(Constant::new(string, Value::text(""))))
            .expect("adds");
        let nested = registry.create_namespace(string, "ops").expect("registers");

        let removed = registry.unregister(string).expect("unregisters");
        assert_eq!(removed.len(), 2);
        assert!(!registry.is_registered(nested));
        assert_eq!(registry.type_of(root, &ValueClass::Text), None);
        assert!(registry.add_type(root, text_builder("string")).is_ok());
        assert!(registry.unregister(root).is_err());
    }

    #[test]
    fn vacated_slots_stay_dead() {
        let mut registry = Registry::new();
        let root = registry.root();
        let a = registry.create_namespace(root, "a").expect("registers");
        let slots = registry.nodes.len();
        registry.unregister(a).expect("unregisters");
        assert_eq!(registry.nodes.len(), slots);

        let b = registry.create_namespace(root, "b").expect("registers");
        assert_ne!(a, b);
        assert!(!registry.is_registered(a));
        assert!(registry.node(a).is_none());
    }

    #[test]
    fn failed_sub_typing_takes_no_slot() {
        let mut registry = Registry::new();
        let root = registry.root();
        let string = registry.add_type(root, text_builder("string")).expect("registers");
        let trimmed = Tag::new("trimmed").expect("valid name");
        let tag = registry.add_tag(root, trimmed).expect("registers");
        registry.sub_type(string, &[tag]).expect("derives");
        let slots = registry.nodes.len();

        let failure = registry.sub_type(string, &[registry.kind()]).err();
        assert!(failure.is_some_and(|f| f.is_violation_of("SymbolMustMatchKind")));
        let bench = SubTypeWorkBench::from_keys(&registry, string, &[tag]).expect("bench");
        let bench = SubTypePipeline::standard().prepare(&registry, bench).expect("prepares");
        let conflict = crate::subtype::finalize(&mut registry, bench).err();
        assert!(conflict.is_some_and(|f| f.is_violation_of("TypeMustBeValid")));
        assert_eq!(registry.nodes.len(), slots);
    }

    #[test]
    fn tags_must_be_tags() {
        let registry = Registry::new();
        let err = registry.tags(&[registry.kind()]).err();
        assert!(err.is_some_and(|v| v.is_violation_of("SymbolMustMatchKind")));
    }

    #[test]
    fn clones_are_independent() {
        let mut registry = Registry::new();
        let root = registry.root();
        let snapshot = registry.clone();
        let a = registry.create_namespace(root, "a").expect("registers");
        assert!(registry.is_registered(a));
        assert!(!snapshot.is_registered(a));
        assert_eq!(snapshot.len() + 1, registry.len());
    }
}
