//! Work benches: the transient state of one sub-type derivation.

use core::fmt;

use nomos_contract::{Contract, Evidence, Inspect, Violation};
use serde::{Deserialize, Serialize};

use crate::contracts::{TypeMustNotBeUnknown, WorkBenchMustBeAt};
use crate::id::{NamespaceKey, TypeId};
use crate::registry::Registry;
use crate::tag::Tag;
use crate::types::TypeBuilder;
use crate::value::Value;

use super::Mutation;

/// Progress of a work bench through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubTypeStage {
    /// Created, nothing run yet.
    Initialized,
    /// Identity derived and builder staged.
    Renamed,
    /// Parent symbols inherited.
    NamespaceUpdated,
    /// Tag mutations applied.
    SymbolsMutated,
    /// Registered in the destination.
    Finalized,
}

impl fmt::Display for SubTypeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initialized => "initialized",
            Self::Renamed => "renamed",
            Self::NamespaceUpdated => "namespace_updated",
            Self::SymbolsMutated => "symbols_mutated",
            Self::Finalized => "finalized",
        })
    }
}

impl Inspect for SubTypeStage {
    fn evidence(&self) -> Evidence {
        Evidence::capture(self)
    }
}

/// Transient state of one sub-type derivation.
#[derive(Debug, Clone)]
pub struct SubTypeWorkBench {
    parent: NamespaceKey,
    parent_id: TypeId,
    parent_none: Value,
    builder: TypeBuilder,
    tags: Vec<Tag>,
    tag_names: String,
    mutations: Vec<Mutation>,
    stage: SubTypeStage,
}

impl SubTypeWorkBench {
    /// Starts deriving a sub-type of the type at `parent` with `tags`, in
    /// application order.
    ///
    /// # Errors
    ///
    /// Returns `TypeMustNotBeUnknown` if `parent` is not a registered type
    /// or is the unknown type.
    pub fn new(
        registry: &Registry,
        parent: NamespaceKey,
        tags: Vec<Tag>,
    ) -> Result<Self, Violation> {
        let parent_type = registry.get_type(parent);
        TypeMustNotBeUnknown.enforce("SubTypeWorkBench::new", &parent_type)?;
        let Some(parent_type) = parent_type else {
            return Err(TypeMustNotBeUnknown.violation("SubTypeWorkBench::new", &parent_type));
        };
        let tag_names = tags
            .iter()
            .map(Tag::name)
            .collect::<Vec<_>>()
            .join(registry.config().tag_separator.as_str());
        let builder = TypeBuilder::from_parts(
            parent_type.id().clone(),
            parent_type.variant(),
            parent_type.value_class().clone(),
            parent_type.none().clone(),
        );
        Ok(Self {
            parent,
            parent_id: parent_type.id().clone(),
            parent_none: parent_type.none().clone(),
            builder,
            tags,
            tag_names,
            mutations: Vec::new(),
            stage: SubTypeStage::Initialized,
        })
    }

    /// Like [`SubTypeWorkBench::new`] with the registered tags at `tags`.
    ///
    /// # Errors
    ///
    /// Returns the violations of [`Registry::tags`] and
    /// [`SubTypeWorkBench::new`].
    pub fn from_keys(
        registry: &Registry,
        parent: NamespaceKey,
        tags: &[NamespaceKey],
    ) -> Result<Self, Violation> {
        Self::new(registry, parent, registry.tags(tags)?)
    }

    /// Queues an extra mutation, applied after those the tags produce.
    ///
    /// # Errors
    ///
    /// Returns `WorkBenchMustBeAt` once symbols have been mutated.
    pub fn push_mutation(&mut self, mutation: Mutation) -> Result<(), Violation> {
        if self.stage >= SubTypeStage::SymbolsMutated {
            return Err(WorkBenchMustBeAt::new(SubTypeStage::NamespaceUpdated)
                .violation("SubTypeWorkBench::push_mutation", &self.stage));
        }
        self.mutations.push(mutation);
        Ok(())
    }

    /// The parent type's key.
    #[must_use]
    pub fn parent(&self) -> NamespaceKey {
        self.parent
    }

    /// The parent type's identity.
    #[must_use]
    pub fn parent_id(&self) -> &TypeId {
        &self.parent_id
    }

    /// The parent's none sentinel, returned when derivation fails.
    #[must_use]
    pub fn parent_none(&self) -> &Value {
        &self.parent_none
    }

    /// The builder in progress.
    #[must_use]
    pub fn builder(&self) -> &TypeBuilder {
        &self.builder
    }

    /// The tags being applied.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// The joined names of the tags being applied.
    #[must_use]
    pub fn tag_names(&self) -> &str {
        &self.tag_names
    }

    /// Mutations queued so far.
    #[must_use]
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// The current stage.
    #[must_use]
    pub fn stage(&self) -> SubTypeStage {
        self.stage
    }

    pub(crate) fn builder_mut(&mut self) -> &mut TypeBuilder {
        &mut self.builder
    }

    pub(crate) fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    pub(crate) fn set_stage(&mut self, stage: SubTypeStage) {
        self.stage = stage;
    }

    pub(crate) fn into_builder(self) -> TypeBuilder {
        self.builder
    }
}
