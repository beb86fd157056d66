//! Contracts observed through the public registry surface.

use std::sync::Arc;

use nomos_contract::{Contract, Filter, FilterState};
use nomos_test_helpers::{init_tracing, Fixture};
use nomos_typing::contracts::{NamespaceMustBeRegistered, SymbolMustBeRegistered};
use nomos_typing::{
    audit, Cast, Constant, Operation, Scope, Symbol, SymbolId, SymbolKind, TypeBuilder, Value,
    ValueClass,
};

#[test]
fn registration_checks_follow_moves_and_removals() -> anyhow::Result<()> {
    init_tracing();
    let mut registry = Fixture::new()?.registry;
    let root = registry.root();
    let home = registry.create_namespace(root, "home")?;
    let away = registry.create_namespace(root, "away")?;
    let item = registry.create_namespace(home, "item")?;
    let id = SymbolId::try_new("item", SymbolKind::Namespace)?;

    assert!(SymbolMustBeRegistered.filter(&registry.registration(home, id.clone())).is_kept());
    registry.move_to(item, away)?;
    assert!(SymbolMustBeRegistered.filter(&registry.registration(home, id.clone())).is_discarded());
    assert!(SymbolMustBeRegistered.filter(&registry.registration(away, id.clone())).is_kept());

    registry.unregister(away)?;
    let violation = SymbolMustBeRegistered
        .enforce("test", &registry.registration(away, id))
        .err()
        .ok_or_else(|| anyhow::anyhow!("removed symbol must be rejected"))?;
    assert_eq!(violation.contract(), "SymbolMustBeRegistered");
    assert!(!registry.is_registered(item), "the subtree goes with its parent");
    assert_eq!(NamespaceMustBeRegistered::new(&registry).filter(&item), FilterState::Discarded);
    Ok(())
}

#[test]
fn structural_edits_are_guarded() -> anyhow::Result<()> {
    let mut registry = Fixture::new()?.registry;
    let root = registry.root();
    let outer = registry.create_namespace(root, "outer")?;
    let inner = registry.create_namespace(outer, "inner")?;

    let cycle = registry.move_to(outer, inner).err();
    assert!(cycle.is_some_and(|v| v.is_violation_of("NamespaceMustNotBeWithin")));
    let root_removal = registry.unregister(root).err();
    assert!(root_removal.is_some_and(|v| v.is_violation_of("NamespaceMustNotBeWithin")));
    let duplicate = registry.create_namespace(root, "outer").err();
    assert!(duplicate.is_some_and(|v| v.is_violation_of("SymbolMustBeUnique")));
    let malformed = registry.create_namespace(root, "a/b").err();
    assert!(malformed.is_some_and(|v| v.is_violation_of("NameMustBeWellFormed")));
    let namespace_as_symbol = registry
        .add_symbol(outer, SymbolId::try_new("x", SymbolKind::Namespace)?, Symbol::Namespace(inner))
        .err();
    assert!(namespace_as_symbol.is_some_and(|v| v.is_violation_of("SymbolMustNotBeNamespace")));
    Ok(())
}

#[test]
fn value_classes_bind_one_root_type() -> anyhow::Result<()> {
    let Fixture { mut registry, .. } = Fixture::new()?;
    let root = registry.root();
    let text = TypeBuilder::new("text", ValueClass::Text, Value::text(""))?;
    let failure = registry
        .add_type(root, text)
        .err()
        .ok_or_else(|| anyhow::anyhow!("text is already bound to string"))?;
    assert!(failure.is_violation_of("SymbolMustBeUnique"));
    assert!(failure
        .violation()
        .cause_chain()
        .iter()
        .any(|cause| cause.contains("ValueClassMustBeUnbound")));
    Ok(())
}

#[test]
fn casts_check_their_source() -> anyhow::Result<()> {
    let Fixture {
        mut registry,
        string,
        int,
        nonempty,
    } = Fixture::new()?;
    let filled = registry.sub_type(string, &[nonempty])?;
    let parse = Cast::new("parse", filled, int, |value| match value {
        Value::Text(text) => Ok(Value::Int(text.parse().unwrap_or(0))),
        other => Ok(Value::Int(other.length().map_or(0, |n| n as i64))),
    })?;
    registry.add_symbol(int, parse.id().clone(), Symbol::Operation(Arc::new(parse.clone())))?;

    assert_eq!(registry.cast(&parse, &Value::text("42"))?, Value::Int(42));
    let failure = registry
        .cast(&parse, &Value::text(""))
        .err()
        .ok_or_else(|| anyhow::anyhow!("empty text is not a nonempty string"))?;
    assert!(failure.is_violation_of("CastSourceMustBeValid"));
    assert_eq!(failure.none(), &Value::Int(0));

    let stored = registry
        .lookup(int, parse.id())
        .and_then(Symbol::as_operation)
        .map(|op| op.id().name().to_string());
    assert_eq!(stored.as_deref(), Some("parse"));
    Ok(())
}

#[test]
fn constants_must_be_unique_per_namespace() -> anyhow::Result<()> {
    let Fixture {
        mut registry,
        string,
        ..
    } = Fixture::new()?;
    let empty = SymbolId::try_new("empty", SymbolKind::Constant)?;
    let text = |value: &str| Symbol::Constant(Constant::new(string, Value::text(value)));
    registry.add_symbol(string, empty.clone(), text(""))?;
    let second = registry.add_symbol(string, empty.clone(), text("x")).err();
    assert!(second.is_some_and(|v| v.is_violation_of("SymbolMustBeUnique")));

    registry.set_symbol(string, empty.clone(), text("x"))?;
    let value = registry
        .lookup(string, &empty)
        .and_then(Symbol::as_constant)
        .map(|c| c.value().clone());
    assert_eq!(value, Some(Value::text("x")));
    Ok(())
}

#[test]
fn removals_and_required_lookups_need_a_present_symbol() -> anyhow::Result<()> {
    let Fixture {
        mut registry,
        string,
        ..
    } = Fixture::new()?;
    let empty = SymbolId::try_new("empty", SymbolKind::Constant)?;
    let missing = registry
        .get_type(string)
        .map(|ty| ty.table().require(&empty).err());
    let violation = missing
        .flatten()
        .ok_or_else(|| anyhow::anyhow!("an absent constant must be reported"))?;
    assert_eq!(violation.contract(), "SymbolMustBeInTable");
    assert_eq!(violation.plaintiff(), "SymbolTable::require");

    let constant = Symbol::Constant(Constant::new(string, Value::text("")));
    registry.add_symbol(string, empty.clone(), constant.clone())?;
    let found = registry.get_type(string).map(|ty| ty.table().require(&empty).is_ok());
    assert_eq!(found, Some(true));
    assert_eq!(registry.remove_symbol(string, &empty)?, constant);

    let again = registry.remove_symbol(string, &empty).err();
    assert!(again.is_some_and(|v| v.is_violation_of("SymbolMustBeInTable")));
    assert!(registry.lookup(string, &empty).is_none());
    Ok(())
}

#[test]
fn a_derived_registry_still_audits_clean() -> anyhow::Result<()> {
    let Fixture {
        mut registry,
        string,
        nonempty,
        ..
    } = Fixture::new()?;
    let filled = registry.sub_type(string, &[nonempty])?;
    let root = registry.root();
    let scratch = registry.create_namespace(root, "scratch")?;
    registry.move_to(filled, scratch)?;
    assert_eq!(registry.root_type_of(filled), Some(string));

    let report = audit(&registry);
    assert!(report.all_passed(), "{}", serde_json::to_string_pretty(&report)?);
    assert_eq!(report.warning_count(), 0);
    Ok(())
}
