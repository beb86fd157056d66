//! Identity model: symbol identifiers, visibility, and arena keys.
//!
//! A [`SymbolId`] is immutable. Renaming produces a new identifier; equality
//! and hashing use the name and the declared [`SymbolKind`] only, so the
//! visibility of an identifier never affects table lookups.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use nomos_contract::{Contract, Evidence, Inspect, Violation};
use serde::{Deserialize, Serialize};

use crate::contracts::NameMustBeWellFormed;

/// Name of the self back-reference present in every registered namespace.
pub const SELF_REF: &str = ".";
/// Name of the parent back-reference present in every registered namespace.
pub const PARENT_REF: &str = "..";
/// Name of the root back-reference present in every registered namespace.
pub const ROOT_REF: &str = "/";

/// Who may see a symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible everywhere and inherited by sub-types.
    #[default]
    Public,
    /// Visible to the owner only; not inherited by sub-types.
    Private,
    /// Structural entries such as back-references.
    Invisible,
    /// No visibility recorded.
    None,
}

/// The declared symbol-type of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// A plain namespace.
    Namespace,
    /// A type.
    Type,
    /// A tag.
    Tag,
    /// A constant value.
    Constant,
    /// An operation.
    Operation,
    /// A named value constraint.
    Constraint,
}

impl SymbolKind {
    /// Returns true if a symbol of kind `other` may be stored or looked up
    /// under an identifier declared with this kind.
    ///
    /// Types and tags are namespaces, so `Namespace` admits both.
    #[must_use]
    pub const fn admits(self, other: SymbolKind) -> bool {
        matches!(
            (self, other),
            (Self::Namespace, Self::Namespace | Self::Type | Self::Tag)
                | (Self::Type, Self::Type)
                | (Self::Tag, Self::Tag)
                | (Self::Constant, Self::Constant)
                | (Self::Operation, Self::Operation)
                | (Self::Constraint, Self::Constraint)
        )
    }

    /// The kinds this kind admits, in lookup order.
    #[must_use]
    pub const fn admitted(self) -> &'static [SymbolKind] {
        match self {
            Self::Namespace => &[Self::Namespace, Self::Type, Self::Tag],
            Self::Type => &[Self::Type],
            Self::Tag => &[Self::Tag],
            Self::Constant => &[Self::Constant],
            Self::Operation => &[Self::Operation],
            Self::Constraint => &[Self::Constraint],
        }
    }

    /// Returns true for kinds that form the namespace tree.
    #[must_use]
    pub const fn is_namespace_like(self) -> bool {
        matches!(self, Self::Namespace | Self::Type | Self::Tag)
    }

    /// Lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Namespace => "namespace",
            Self::Type => "type",
            Self::Tag => "tag",
            Self::Constant => "constant",
            Self::Operation => "operation",
            Self::Constraint => "constraint",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Inspect for SymbolKind {
    fn evidence(&self) -> Evidence {
        Evidence::capture(self)
    }
}

/// The identifier keying every symbol table entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolId {
    name: Arc<str>,
    visibility: Visibility,
    kind: SymbolKind,
}

impl SymbolId {
    /// Creates a public identifier after checking the name is well formed.
    ///
    /// # Errors
    ///
    /// Returns a `NameMustBeWellFormed` violation for empty names, the
    /// reserved back-reference names, and names containing `/`, `[`, `]`
    /// or `,`.
    pub fn try_new(name: &str, kind: SymbolKind) -> Result<Self, Violation> {
        NameMustBeWellFormed.enforce("SymbolId::try_new", name)?;
        Ok(Self::unchecked(name, kind))
    }

    pub(crate) fn unchecked(name: impl Into<Arc<str>>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            kind,
        }
    }

    /// The self back-reference `.`.
    #[must_use]
    pub fn self_ref() -> Self {
        Self::unchecked(SELF_REF, SymbolKind::Namespace).with_visibility(Visibility::Invisible)
    }

    /// The parent back-reference `..`.
    #[must_use]
    pub fn parent_ref() -> Self {
        Self::unchecked(PARENT_REF, SymbolKind::Namespace).with_visibility(Visibility::Invisible)
    }

    /// The root back-reference `/`.
    #[must_use]
    pub fn root_ref() -> Self {
        Self::unchecked(ROOT_REF, SymbolKind::Namespace).with_visibility(Visibility::Invisible)
    }

    /// Returns a copy carrying `visibility`.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Returns a new identifier with the same kind and visibility.
    ///
    /// # Errors
    ///
    /// Returns a `NameMustBeWellFormed` violation if `name` is malformed.
    pub fn renamed(&self, name: &str) -> Result<Self, Violation> {
        Ok(Self::try_new(name, self.kind)?.with_visibility(self.visibility))
    }

    /// The identifier's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The identifier's visibility.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// The declared symbol kind.
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// Returns true for `.`, `..` and `/`.
    #[must_use]
    pub fn is_back_reference(&self) -> bool {
        self.kind == SymbolKind::Namespace
            && matches!(&*self.name, SELF_REF | PARENT_REF | ROOT_REF)
    }

    /// Returns true if the identifier is private.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }
}

impl PartialEq for SymbolId {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name == other.name
    }
}

impl Eq for SymbolId {}

impl Hash for SymbolId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.kind.hash(state);
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

impl Inspect for SymbolId {
    fn evidence(&self) -> Evidence {
        Evidence::capture(self)
    }
}

/// Index of a namespace-like node in a [`Registry`](crate::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceKey(pub(crate) usize);

impl NamespaceKey {
    /// The arena slot this key addresses.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NamespaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Inspect for NamespaceKey {
    fn evidence(&self) -> Evidence {
        Evidence::capture(self)
    }
}

/// Identity of a type: a raw name plus the tags applied by sub-typing.
///
/// The raw name is shared by a type and all of its sub-types. `tag_names`
/// is the separator-joined record of applied tags, empty for root types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeId {
    raw_name: Arc<str>,
    tag_names: Arc<str>,
    visibility: Visibility,
}

impl TypeId {
    /// Creates an untagged type identity.
    ///
    /// # Errors
    ///
    /// Returns a `NameMustBeWellFormed` violation if `raw_name` is malformed.
    pub fn try_new(raw_name: &str) -> Result<Self, Violation> {
        NameMustBeWellFormed.enforce("TypeId::try_new", raw_name)?;
        Ok(Self::unchecked(raw_name))
    }

    pub(crate) fn unchecked(raw_name: impl Into<Arc<str>>) -> Self {
        Self {
            raw_name: raw_name.into(),
            tag_names: Arc::from(""),
            visibility: Visibility::Public,
        }
    }

    /// Returns a copy carrying `tag_names`.
    #[must_use]
    pub fn with_tags(mut self, tag_names: impl Into<Arc<str>>) -> Self {
        self.tag_names = tag_names.into();
        self
    }

    /// Returns a copy carrying `visibility`.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// The raw name, invariant across sub-typing.
    #[must_use]
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// The joined tag names; empty when untagged.
    #[must_use]
    pub fn tag_names(&self) -> &str {
        &self.tag_names
    }

    /// The visibility of the type.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Returns true if no tags have been applied.
    #[must_use]
    pub fn is_untagged(&self) -> bool {
        self.tag_names.is_empty()
    }

    /// The full name: `raw` or `raw[tags]`.
    #[must_use]
    pub fn name(&self) -> String {
        if self.is_untagged() {
            self.raw_name.to_string()
        } else {
            format!("{}[{}]", self.raw_name, self.tag_names)
        }
    }

    /// The symbol identifier the type is registered under.
    #[must_use]
    pub fn symbol_id(&self) -> SymbolId {
        SymbolId::unchecked(self.name(), SymbolKind::Type).with_visibility(self.visibility)
    }
}

impl PartialEq for TypeId {
    fn eq(&self, other: &Self) -> bool {
        self.raw_name == other.raw_name && self.tag_names == other.tag_names
    }
}

impl Eq for TypeId {}

impl Hash for TypeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw_name.hash(state);
        self.tag_names.hash(state);
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl Inspect for TypeId {
    fn evidence(&self) -> Evidence {
        Evidence::capture(self)
    }
}
