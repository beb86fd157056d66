//! Property-based tests for tables, contracts, sub-typing and traversal.

use nomos_contract::Filter;
use nomos_test_helpers::Fixture;
use nomos_typing::contracts::NameMustBeWellFormed;
use nomos_typing::{
    Constant, NamespaceKey, NamespaceWalker, Registry, Symbol, SymbolId, SymbolKind, SymbolTable,
    Tag, Value,
};
use proptest::prelude::*;

const TAG_POOL: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

fn fail(error: impl std::fmt::Display) -> TestCaseError {
    TestCaseError::fail(error.to_string())
}

fn name() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

// =============================================================================
// Symbol tables
// =============================================================================

proptest! {
    /// Every name lands in a table at most once, and re-adding it is refused.
    #[test]
    fn prop_table_names_are_unique(names in prop::collection::vec(name(), 1..24)) {
        let mut table = SymbolTable::new();
        let owner = Registry::new().root();
        let mut accepted = Vec::new();
        for n in &names {
            let id = SymbolId::try_new(n, SymbolKind::Constant).map_err(fail)?;
            let result = table.add(id, Symbol::Constant(Constant::new(owner, Value::Int(0))));
            if accepted.contains(n) {
                prop_assert!(result.is_err(), "duplicate {} was accepted", n);
            } else {
                prop_assert!(result.is_ok());
                accepted.push(n.clone());
            }
        }
        prop_assert_eq!(table.len(), accepted.len());
        let listed: Vec<String> = table
            .symbol_ids(SymbolKind::Constant)
            .map(|id| id.name().to_string())
            .collect();
        prop_assert_eq!(listed, accepted);
    }

    /// Filters are pure: the same input always yields the same state, and
    /// identifiers accept exactly the names the filter keeps.
    #[test]
    fn prop_name_filter_is_pure(candidate in ".{0,8}") {
        let first = NameMustBeWellFormed.filter(candidate.as_str());
        let second = NameMustBeWellFormed.filter(candidate.as_str());
        prop_assert_eq!(first, second);
        let accepted = SymbolId::try_new(&candidate, SymbolKind::Constant).is_ok();
        prop_assert_eq!(first.is_kept(), accepted);
    }
}

// =============================================================================
// Sub-typing
// =============================================================================

fn tag_selection() -> impl Strategy<Value = Vec<usize>> {
    prop::sample::subsequence((0..TAG_POOL.len()).collect::<Vec<_>>(), 1..=TAG_POOL.len())
}

fn registry_with_tags() -> Result<(Registry, NamespaceKey, Vec<NamespaceKey>), TestCaseError> {
    let Fixture {
        mut registry,
        string,
        ..
    } = Fixture::new().map_err(fail)?;
    let root = registry.root();
    let mut tags = Vec::new();
    for name in TAG_POOL {
        let tag = Tag::new(name).map_err(fail)?;
        tags.push(registry.add_tag(root, tag).map_err(fail)?);
    }
    Ok((registry, string, tags))
}

proptest! {
    /// Re-applying a type's own tag set returns the type itself.
    #[test]
    fn prop_sub_typing_is_idempotent(selection in tag_selection()) {
        let (mut registry, string, pool) = registry_with_tags()?;
        let tags: Vec<NamespaceKey> = selection.iter().map(|&i| pool[i]).collect();
        let derived = registry.sub_type(string, &tags).map_err(fail)?;
        let again = registry.sub_type(derived, &tags).map_err(fail)?;
        prop_assert_eq!(again, derived);

        let expected: Vec<&str> = selection.iter().map(|&i| TAG_POOL[i]).collect();
        let ty = registry
            .get_type(derived)
            .ok_or_else(|| TestCaseError::fail("derived type missing"))?;
        let expected_joined = expected.join(",");
        prop_assert_eq!(ty.id().tag_names(), expected_joined.as_str());
        prop_assert_eq!(ty.id().raw_name(), "string");
        prop_assert_eq!(registry.root_type_of(derived), Some(string));
    }

    /// Derived types keep every public symbol of their parent.
    #[test]
    fn prop_public_symbols_are_inherited(
        names in prop::collection::hash_set(name(), 0..8),
        selection in tag_selection(),
    ) {
        let (mut registry, string, pool) = registry_with_tags()?;
        let mut ids = Vec::new();
        for n in &names {
            let id = SymbolId::try_new(n, SymbolKind::Constant).map_err(fail)?;
            let constant = Constant::new(string, Value::text(n.as_str()));
            registry
                .add_symbol(string, id.clone(), Symbol::Constant(constant))
                .map_err(fail)?;
            ids.push(id);
        }
        let tags: Vec<NamespaceKey> = selection.iter().map(|&i| pool[i]).collect();
        let derived = registry.sub_type(string, &tags).map_err(fail)?;
        for id in &ids {
            prop_assert!(registry.lookup(derived, id).is_some(), "{} was not inherited", id);
        }
    }
}

// =============================================================================
// Traversal
// =============================================================================

fn preorder(children: &[Vec<usize>], at: usize, out: &mut Vec<usize>) {
    out.push(at);
    for &child in &children[at] {
        preorder(children, child, out);
    }
}

proptest! {
    /// The walker visits a random tree in first-child-first pre-order.
    #[test]
    fn prop_walk_is_preorder(
        parents in prop::collection::vec(any::<prop::sample::Index>(), 0..20),
    ) {
        let mut registry = Registry::new();
        let root = registry.root();
        let top = registry.create_namespace(root, "tree").map_err(fail)?;
        let mut keys = vec![top];
        let mut children = vec![Vec::new()];
        for (i, index) in parents.iter().enumerate() {
            let parent = index.index(keys.len());
            let key = registry
                .create_namespace(keys[parent], &format!("n{i}"))
                .map_err(fail)?;
            children[parent].push(keys.len());
            children.push(Vec::new());
            keys.push(key);
        }
        let mut expected = Vec::new();
        preorder(&children, 0, &mut expected);
        let expected: Vec<NamespaceKey> = expected.into_iter().map(|i| keys[i]).collect();
        prop_assert_eq!(NamespaceWalker::new(&registry, top).keys(), expected);
    }
}
