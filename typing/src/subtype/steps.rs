//! The sub-typing steps and the pipeline that runs them.

use core::fmt;

use nomos_contract::{Contract, Violation};
use tracing::{debug, trace};

use crate::contracts::{TypeMustNotBeUnknown, WorkBenchMustBeAt};
use crate::failure::{Failure, Outcome};
use crate::id::{NamespaceKey, TypeId};
use crate::namespace::{ConstraintBearing, Scope};
use crate::registry::Registry;
use crate::table::SymbolTable;
use crate::types::{Placement, Type};

use super::{Mutation, SubTypeStage, SubTypeWorkBench};

/// Joins the tag names of a parent and of the tags being applied.
///
/// An empty side yields the other; identical lists are already fully
/// qualified and are kept as they are.
///
/// ```
/// use nomos_typing::subtype::combine_tag_names;
///
/// assert_eq!(combine_tag_names("", "nonempty", ","), "nonempty");
/// assert_eq!(combine_tag_names("nonempty", "nonempty", ","), "nonempty");
/// assert_eq!(combine_tag_names("nonempty", "trimmed", ","), "nonempty,trimmed");
/// ```
#[must_use]
pub fn combine_tag_names(parent: &str, child: &str, separator: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else if child.is_empty() || parent == child {
        parent.to_string()
    } else {
        format!("{parent}{separator}{child}")
    }
}

/// One stage of the pipeline.
pub trait SubTypeStep: fmt::Debug + Send + Sync {
    /// Short name used as plaintiff and in logs.
    fn name(&self) -> &'static str;

    /// The stage a work bench must be at for this step to run.
    fn from_stage(&self) -> SubTypeStage;

    /// The stage a work bench is at after this step.
    fn to_stage(&self) -> SubTypeStage;

    /// Does the step's work.
    ///
    /// # Errors
    ///
    /// Returns the violation that stops the derivation.
    fn run(&self, registry: &Registry, bench: &mut SubTypeWorkBench) -> Result<(), Violation>;

    /// Checks the stage, runs the step and advances the stage.
    ///
    /// # Errors
    ///
    /// Returns `WorkBenchMustBeAt` when invoked out of order, otherwise the
    /// violations of [`SubTypeStep::run`].
    fn apply(&self, registry: &Registry, bench: &mut SubTypeWorkBench) -> Result<(), Violation> {
        WorkBenchMustBeAt::new(self.from_stage()).enforce(self.name(), &bench.stage())?;
        self.run(registry, bench)?;
        bench.set_stage(self.to_stage());
        trace!(
            step = self.name(),
            stage = %self.to_stage(),
            id = %bench.builder().id(),
            "sub-typing stage"
        );
        Ok(())
    }
}

fn parent_type<'r>(
    registry: &'r Registry,
    bench: &SubTypeWorkBench,
    plaintiff: &str,
) -> Result<&'r Type, Violation> {
    let parent = registry.get_type(bench.parent());
    TypeMustNotBeUnknown.enforce(plaintiff, &parent)?;
    parent.ok_or_else(|| TypeMustNotBeUnknown.violation(plaintiff, &parent))
}

fn root_type_of(parent: &Type, key: NamespaceKey) -> NamespaceKey {
    parent.root_type().unwrap_or(key)
}

/// Derives the sub-type's identity and stages the builder.
///
/// Tags carrying a type constraint are checked against the parent here; a
/// rejection disables the builder rather than stopping the pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rename;

impl SubTypeStep for Rename {
    fn name(&self) -> &'static str {
        "Rename"
    }

    fn from_stage(&self) -> SubTypeStage {
        SubTypeStage::Initialized
    }

    fn to_stage(&self) -> SubTypeStage {
        SubTypeStage::Renamed
    }

    fn run(&self, registry: &Registry, bench: &mut SubTypeWorkBench) -> Result<(), Violation> {
        let parent = parent_type(registry, bench, self.name())?;
        let rejection = bench
            .tags()
            .iter()
            .find_map(|tag| tag.check_type(self.name(), parent).err());

        let tag_names = combine_tag_names(
            parent.id().tag_names(),
            bench.tag_names(),
            &registry.config().tag_separator,
        );
        let id = TypeId::unchecked(parent.id().raw_name())
            .with_tags(tag_names)
            .with_visibility(parent.id().visibility());
        let staging = registry.next_staging_id();
        let root_type = root_type_of(parent, bench.parent());

        let builder = bench.builder_mut();
        if let Some(violation) = rejection {
            builder.disable(violation);
        }
        builder.set_id(id);
        builder.set_placement(Placement::Staging(staging));
        builder.set_root_type(Some(root_type));
        Ok(())
    }
}

/// Copies the parent's symbols and constraints into the builder and binds
/// it to its destination.
///
/// Private symbols are skipped unless the configuration inherits them;
/// namespace-like entries are structural and never copied.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateNamespace;

impl SubTypeStep for UpdateNamespace {
    fn name(&self) -> &'static str {
        "UpdateNamespace"
    }

    fn from_stage(&self) -> SubTypeStage {
        SubTypeStage::Renamed
    }

    fn to_stage(&self) -> SubTypeStage {
        SubTypeStage::NamespaceUpdated
    }

    fn run(&self, registry: &Registry, bench: &mut SubTypeWorkBench) -> Result<(), Violation> {
        let parent = parent_type(registry, bench, self.name())?;
        let inherit_private = registry.config().inherit_private_symbols;
        let mut inherited = SymbolTable::new();
        for (id, symbol) in parent.table() {
            if id.kind().is_namespace_like() || (id.is_private() && !inherit_private) {
                continue;
            }
            inherited.put(id.clone(), symbol.clone());
        }
        let root_type = root_type_of(parent, bench.parent());
        let destination = bench.parent();

        let builder = bench.builder_mut();
        builder.table_mut().add_all(&inherited)?;
        for constraint in parent.constraints() {
            builder.push_constraint(constraint.clone());
        }
        builder.set_root_type(Some(root_type));
        builder.set_placement(Placement::Destination(destination));
        Ok(())
    }
}

/// Applies the tags' constraints and mutations to the builder.
///
/// Every inherited symbol passes through the mutators of each tag in
/// application order; every symbol a tag contributes passes through the
/// mutators of the tags applied after it. Queued mutations run last.
/// Private symbols a tag contributes are skipped unless the registry is
/// configured to inherit private symbols.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutateSymbols;

impl SubTypeStep for MutateSymbols {
    fn name(&self) -> &'static str {
        "MutateSymbols"
    }

    fn from_stage(&self) -> SubTypeStage {
        SubTypeStage::NamespaceUpdated
    }

    fn to_stage(&self) -> SubTypeStage {
        SubTypeStage::SymbolsMutated
    }

    fn run(&self, registry: &Registry, bench: &mut SubTypeWorkBench) -> Result<(), Violation> {
        let inherit_private = registry.config().inherit_private_symbols;
        let tags = bench.tags().to_vec();
        let mut mutations: Vec<Mutation> = bench
            .builder()
            .table()
            .iter()
            .map(|(id, symbol)| {
                tags.iter()
                    .fold(Mutation::keep(id.clone(), symbol.clone()), |m, tag| tag.mutate(m))
            })
            .collect();
        for (i, tag) in tags.iter().enumerate() {
            for (id, symbol) in tag.table().without_structure().iter() {
                if id.is_private() && !inherit_private {
                    continue;
                }
                let contributed = Mutation::keep(id.clone(), symbol.clone());
                mutations.push(tags[i + 1..].iter().fold(contributed, |m, later| later.mutate(m)));
            }
        }
        mutations.extend(bench.take_mutations());

        let builder = bench.builder_mut();
        for tag in &tags {
            for constraint in tag.constraints() {
                builder.push_constraint(constraint.clone());
            }
        }
        for mutation in &mutations {
            mutation.apply_to(builder.table_mut())?;
        }
        trace!(count = mutations.len(), "applied tag mutations");
        Ok(())
    }
}

/// Materialises a mutated work bench into its destination.
///
/// When the derived identity equals the parent's, the tags were already
/// applied and the parent itself is returned.
///
/// # Errors
///
/// Fails with the parent's none sentinel and `WorkBenchMustBeAt` if the
/// bench has not been mutated, or with the failures of
/// [`Registry::add_type`], notably `TypeMustBeValid` when the destination
/// already holds the derived identity.
pub fn finalize(registry: &mut Registry, bench: SubTypeWorkBench) -> Outcome<NamespaceKey> {
    WorkBenchMustBeAt::new(SubTypeStage::SymbolsMutated)
        .enforce("finalize", &bench.stage())
        .map_err(|violation| Failure::new(bench.parent_none().clone(), violation))?;
    let parent = bench.parent();
    if bench.builder().disabled().is_none() && bench.builder().id() == bench.parent_id() {
        debug!(key = %parent, id = %bench.parent_id(), "sub-type already derived");
        return Ok(parent);
    }
    let destination = match bench.builder().placement() {
        Placement::Destination(destination) => *destination,
        Placement::Detached | Placement::Staging(_) => parent,
    };
    let id = bench.builder().id().clone();
    let key = registry.add_type(destination, bench.into_builder())?;
    debug!(
        %key,
        %id,
        parent = %destination,
        stage = %SubTypeStage::Finalized,
        "finalised sub-type"
    );
    Ok(key)
}

/// An ordered sequence of steps ending in [`finalize`].
#[derive(Debug)]
pub struct SubTypePipeline {
    steps: Vec<Box<dyn SubTypeStep>>,
}

impl SubTypePipeline {
    /// `Rename`, `UpdateNamespace`, `MutateSymbols`.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(Rename),
            Box::new(UpdateNamespace),
            Box::new(MutateSymbols),
        ])
    }

    /// A pipeline running `steps` in order.
    #[must_use]
    pub fn new(steps: Vec<Box<dyn SubTypeStep>>) -> Self {
        Self { steps }
    }

    /// Names of the steps in order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Runs every step on `bench` without registering anything.
    ///
    /// Only reads the registry, so several benches may be prepared
    /// concurrently behind a shared reference.
    ///
    /// # Errors
    ///
    /// Fails with the parent's none sentinel and the violation of the step
    /// that stopped.
    pub fn prepare(
        &self,
        registry: &Registry,
        mut bench: SubTypeWorkBench,
    ) -> Result<SubTypeWorkBench, Failure> {
        for step in &self.steps {
            if let Err(violation) = step.apply(registry, &mut bench) {
                return Err(Failure::new(bench.parent_none().clone(), violation));
            }
        }
        Ok(bench)
    }

    /// Prepares `bench` and finalises it.
    ///
    /// # Errors
    ///
    /// See [`SubTypePipeline::prepare`] and [`finalize`].
    pub fn derive(
        &self,
        registry: &mut Registry,
        bench: SubTypeWorkBench,
    ) -> Outcome<NamespaceKey> {
        let bench = self.prepare(registry, bench)?;
        finalize(registry, bench)
    }
}

impl Default for SubTypePipeline {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Tag;
    use crate::types::TypeBuilder;
    use crate::value::{Value, ValueClass};

    fn registry_with_string() -> (Registry, NamespaceKey) {
        let mut registry = Registry::new();
        let builder =
            TypeBuilder::new("string", ValueClass::Text, Value::text("")).expect("valid name");
        let string = registry.add_type(registry.root(), builder).expect("registers");
        (registry, string)
    }

    #[test]
    fn combine_appends_distinct_lists() {
        assert_eq!(combine_tag_names("a", "", "+"), "a");
        assert_eq!(combine_tag_names("a", "b", "+"), "a+b");
    }

    #[test]
    fn steps_out_of_order_are_rejected() {
        let (registry, string) = registry_with_string();
        let tag = Tag::new("nonempty").expect("valid name");
        let mut bench = SubTypeWorkBench::new(&registry, string, vec![tag]).expect("bench");
        let err = UpdateNamespace.apply(&registry, &mut bench).err();
        assert!(err.is_some_and(|v| v.is_violation_of("WorkBenchMustBeAt")));
        assert_eq!(bench.stage(), SubTypeStage::Initialized);
    }

    #[test]
    fn rename_stages_builder() {
        let (registry, string) = registry_with_string();
        let tag = Tag::new("nonempty").expect("valid name");
        let mut bench = SubTypeWorkBench::new(&registry, string, vec![tag]).expect("bench");
        Rename.apply(&registry, &mut bench).expect("renames");
        assert_eq!(bench.builder().id().name(), "string[nonempty]");
        assert_eq!(bench.builder().root_type(), Some(string));
        assert!(matches!(
            bench.builder().placement(),
            Placement::Staging(id) if id.name().starts_with("staging-")
        ));
    }

    #[test]
    fn finalize_requires_mutated_bench() {
        let (mut registry, string) = registry_with_string();
        let bench = SubTypeWorkBench::new(&registry, string, Vec::new()).expect("bench");
        let failure = finalize(&mut registry, bench).err();
        assert!(failure.as_ref().is_some_and(|f| f.is_violation_of("WorkBenchMustBeAt")));
        assert_eq!(failure.map(|f| f.none().clone()), Some(Value::text("")));
    }

    #[test]
    fn standard_pipeline_order() {
        assert_eq!(
            SubTypePipeline::standard().step_names(),
            ["Rename", "UpdateNamespace", "MutateSymbols"]
        );
    }
}
