//! Sub-type derivation scenarios.

use std::sync::Arc;

use nomos_contract::Constraint;
use nomos_test_helpers::{init_tracing, Fixture};
use nomos_typing::{
    Constant, Mutator, NamespaceKey, Operation, Registry, Scope, Signature, StandardOperation,
    Symbol, SymbolId, SymbolKind, SymbolTable, Tag, Type, TypeBuilder, TypeVariant, TypingConfig,
    Value, ValueClass, Visibility,
};

fn text(owner: NamespaceKey, value: &str) -> Symbol {
    Symbol::Constant(Constant::new(owner, Value::text(value)))
}

fn private_constant(name: &str) -> anyhow::Result<SymbolId> {
    Ok(SymbolId::try_new(name, SymbolKind::Constant)?.with_visibility(Visibility::Private))
}

fn string_builder() -> anyhow::Result<TypeBuilder> {
    Ok(TypeBuilder::new("string", ValueClass::Text, Value::text(""))?)
}

#[test]
fn nonempty_string_scenario() -> anyhow::Result<()> {
    init_tracing();
    let Fixture {
        mut registry,
        string,
        nonempty,
        ..
    } = Fixture::new()?;

    let derived = registry.sub_type(string, &[nonempty])?;
    let ty = registry.get_type(derived).ok_or_else(|| anyhow::anyhow!("missing type"))?;
    assert_eq!(ty.id().raw_name(), "string");
    assert_eq!(ty.id().tag_names(), "nonempty");
    assert_eq!(ty.none(), &Value::text(""));
    assert!(ty.is_instance(&Value::text("a")));
    assert!(!ty.is_instance(&Value::text("")));
    assert_eq!(registry.parent_of(derived), Some(string));
    assert_eq!(registry.root_type_of(derived), Some(string));

    let again = registry.sub_type(derived, &[nonempty])?;
    assert_eq!(again, derived);
    let tag_names = registry.get_type(again).map(|t| t.id().tag_names().to_string());
    assert_eq!(tag_names.as_deref(), Some("nonempty"));
    Ok(())
}

#[test]
fn deriving_an_existing_sub_type_is_rejected() -> anyhow::Result<()> {
    init_tracing();
    let Fixture {
        mut registry,
        string,
        nonempty,
        ..
    } = Fixture::new()?;
    registry.sub_type(string, &[nonempty])?;

    let failure = registry
        .sub_type(string, &[nonempty])
        .err()
        .ok_or_else(|| anyhow::anyhow!("second derivation must fail"))?;
    assert!(failure.is_violation_of("TypeMustBeValid"));
    assert_eq!(failure.none(), &Value::text(""));
    Ok(())
}

#[test]
fn tags_stack_in_order() -> anyhow::Result<()> {
    let Fixture {
        mut registry,
        string,
        nonempty,
        ..
    } = Fixture::new()?;
    let root = registry.root();
    let trimmed = registry.add_tag(
        root,
        Tag::new("trimmed")?.with_constraint(Constraint::new("trimmed", |v: &Value| {
            matches!(v, Value::Text(t) if t.trim() == t.as_str())
        })),
    )?;

    let once = registry.sub_type(string, &[nonempty])?;
    let twice = registry.sub_type(once, &[trimmed])?;
    let ty = registry.get_type(twice).ok_or_else(|| anyhow::anyhow!("missing type"))?;
    assert_eq!(ty.id().name(), "string[nonempty,trimmed]");
    assert_eq!(registry.root_type_of(twice), Some(string));
    assert!(ty.is_instance(&Value::text("ok")));
    assert!(!ty.is_instance(&Value::text(" padded ")));
    assert!(!ty.is_instance(&Value::text("")));

    let both = registry.sub_type(string, &[nonempty, trimmed]);
    assert!(both.is_ok(), "a sibling with the same tags lives under string, not under `once`");
    Ok(())
}

#[test]
fn symbols_are_inherited_except_private_ones() -> anyhow::Result<()> {
    let Fixture {
        mut registry,
        string,
        nonempty,
        ..
    } = Fixture::new()?;
    let empty = SymbolId::try_new("empty", SymbolKind::Constant)?;
    let secret = private_constant("secret")?;
    let value = text(string, "");
    registry.add_symbol(string, empty.clone(), value.clone())?;
    registry.add_symbol(string, secret.clone(), value)?;

    let derived = registry.sub_type(string, &[nonempty])?;
    let ty = registry.get_type(derived).ok_or_else(|| anyhow::anyhow!("missing type"))?;
    assert!(ty.contains_symbol(&empty));
    assert!(!ty.contains_symbol(&secret));
    Ok(())
}

#[test]
fn private_symbols_follow_configuration() -> anyhow::Result<()> {
    let config =
        TypingConfig::from_toml_str("inherit_private_symbols = true\ntag_separator = \"+\"")?;
    let mut registry = Registry::with_config(config)?;
    let root = registry.root();
    let string = registry.add_type(root, string_builder()?)?;
    let secret = private_constant("secret")?;
    registry.add_symbol(string, secret.clone(), text(string, "s"))?;
    let a = registry.add_tag(root, Tag::new("a")?)?;
    let b = registry.add_tag(root, Tag::new("b")?)?;

    let derived = registry.sub_type(string, &[a, b])?;
    let ty = registry.get_type(derived).ok_or_else(|| anyhow::anyhow!("missing type"))?;
    assert_eq!(ty.id().name(), "string[a+b]");
    assert!(ty.contains_symbol(&secret));
    Ok(())
}

fn derive_with_private_tag_constant(config: TypingConfig) -> anyhow::Result<bool> {
    let mut registry = Registry::with_config(config)?;
    let root = registry.root();
    let string = registry.add_type(root, string_builder()?)?;
    let secret = private_constant("secret")?;
    let sealed = registry.add_tag(
        root,
        Tag::new("sealed")?
            .with_symbol(secret.clone(), text(string, "s"))?,
    )?;

    let derived = registry.sub_type(string, &[sealed])?;
    let ty = registry.get_type(derived).ok_or_else(|| anyhow::anyhow!("missing type"))?;
    assert_eq!(ty.id().tag_names(), "sealed");
    Ok(ty.contains_symbol(&secret))
}

#[test]
fn private_tag_symbols_follow_configuration() -> anyhow::Result<()> {
    assert!(!derive_with_private_tag_constant(TypingConfig::default())?);
    let inheriting = TypingConfig::from_toml_str("inherit_private_symbols = true")?;
    assert!(derive_with_private_tag_constant(inheriting)?);
    Ok(())
}

#[test]
fn mutators_drop_replace_and_contribute() -> anyhow::Result<()> {
    let Fixture {
        mut registry,
        string,
        ..
    } = Fixture::new()?;
    let root = registry.root();
    let empty = SymbolId::try_new("empty", SymbolKind::Constant)?;
    let unit = SymbolId::try_new("unit", SymbolKind::Constant)?;
    let limit = SymbolId::try_new("limit", SymbolKind::Constant)?;
    registry.add_symbol(string, empty.clone(), text(string, ""))?;
    registry.add_symbol(string, unit.clone(), text(string, "u"))?;

    let bounded = registry.add_tag(
        root,
        Tag::new("bounded")?
            .with_mutator(Mutator::drop_symbol(empty.clone()))
            .with_symbol(limit.clone(), text(string, "10"))?,
    )?;
    let strict = registry.add_tag(
        root,
        Tag::new("strict")?.with_mutator(Mutator::replace(limit.clone(), text(string, "5"))),
    )?;

    let derived = registry.sub_type(string, &[bounded, strict])?;
    let ty = registry.get_type(derived).ok_or_else(|| anyhow::anyhow!("missing type"))?;
    assert!(!ty.contains_symbol(&empty), "dropped by `bounded`");
    assert!(ty.contains_symbol(&unit), "inherited untouched");
    let limit_value = ty
        .symbol(&limit)
        .and_then(Symbol::as_constant)
        .map(|c| c.value().clone());
    assert_eq!(
        limit_value,
        Some(Value::text("5")),
        "contributed by `bounded`, replaced by `strict`"
    );

    let parent = registry.get_type(string).ok_or_else(|| anyhow::anyhow!("missing type"))?;
    assert!(parent.contains_symbol(&empty), "the parent is never mutated");
    Ok(())
}

#[test]
fn tag_type_constraint_disables_derivation() -> anyhow::Result<()> {
    let Fixture {
        mut registry,
        int,
        ..
    } = Fixture::new()?;
    let root = registry.root();
    let textual = registry.add_tag(
        root,
        Tag::new("textual")?.with_type_constraint(Constraint::new("type is text", |ty: &Type| {
            *ty.value_class() == ValueClass::Text
        })),
    )?;

    let failure = registry
        .sub_type(int, &[textual])
        .err()
        .ok_or_else(|| anyhow::anyhow!("tag must be rejected"))?;
    assert!(failure.is_violation_of("TypeMustBeValid"));
    assert_eq!(failure.none(), &Value::Int(0));
    assert!(failure
        .violation()
        .cause_chain()
        .iter()
        .any(|cause| cause.contains("type is text")));
    Ok(())
}

#[test]
fn operations_check_sub_type_inputs() -> anyhow::Result<()> {
    let Fixture {
        mut registry,
        string,
        int,
        nonempty,
    } = Fixture::new()?;
    let filled = registry.sub_type(string, &[nonempty])?;
    let length = StandardOperation::new("length", Signature::new(vec![filled], int), |inputs| {
        Ok(Value::Int(inputs.first().and_then(Value::length).unwrap_or(0) as i64))
    })?;
    registry.add_symbol(string, length.id().clone(), Symbol::Operation(Arc::new(length.clone())))?;

    assert_eq!(registry.evaluate(&length, &[Value::text("abc")])?, Value::Int(3));
    let failure = registry
        .evaluate(&length, &[Value::text("")])
        .err()
        .ok_or_else(|| anyhow::anyhow!("empty input must be rejected"))?;
    assert!(failure.is_violation_of("OperationInputMustBeValid"));
    assert_eq!(failure.none(), &Value::Int(0));

    let failure = registry.evaluate(&length, &[]).err();
    assert!(failure.is_some_and(|f| f.is_violation_of("InputCountMustMatch")));
    Ok(())
}

#[test]
fn the_root_kind_builds_registrable_types() -> anyhow::Result<()> {
    let mut registry = Registry::new();
    let root = registry.root();
    let zero = SymbolId::try_new("zero", SymbolKind::Constant)?;
    let mut table = SymbolTable::new();
    table.add(zero.clone(), Symbol::Constant(Constant::new(registry.kind(), Value::Int(0))))?;

    let builder = registry
        .root_kind()
        .ok_or_else(|| anyhow::anyhow!("the root kind is bootstrapped"))?
        .type_builder("count", ValueClass::Int, Value::Int(0), &table)?;
    let count = registry.add_type(root, builder)?;

    let ty = registry.get_type(count).ok_or_else(|| anyhow::anyhow!("missing type"))?;
    assert_eq!(ty.id().name(), "count");
    assert_eq!(ty.id().raw_name(), "count");
    assert_eq!(ty.id().tag_names(), "");
    assert_eq!(ty.variant(), TypeVariant::Standard);
    assert!(ty.contains_symbol(&zero));
    assert!(ty.is_instance(&Value::Int(7)));
    assert_eq!(registry.type_of(root, &ValueClass::Int), Some(count));
    assert_eq!(registry.parent_of(count), Some(root));
    Ok(())
}
