//! Structural audit of a registry: results, severity levels, and report
//! aggregation.

use serde::Serialize;

use crate::namespace::{Identified, Node};
use crate::registry::Registry;
use crate::walker::{NamespaceWalker, Visit, WalkStatus};

/// Severity level of an audit check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The check passed.
    Pass,
    /// The check found something recoverable.
    Warning,
    /// The check failed.
    Failure,
}

/// A single audit check result.
#[derive(Debug, Clone, Serialize)]
pub struct AuditResult {
    /// Short identifier of the check that produced this result.
    pub check: String,
    /// Human-readable message describing the outcome.
    pub message: String,
    /// Severity of the result.
    pub severity: Severity,
    /// Optional additional detail lines.
    pub details: Vec<String>,
}

impl AuditResult {
    /// Creates a passing result.
    pub fn pass(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_severity(check, message, Severity::Pass, Vec::new())
    }

    /// Creates a warning result with detail lines.
    pub fn warn(
        check: impl Into<String>,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self::with_severity(check, message, Severity::Warning, details)
    }

    /// Creates a failure result with detail lines.
    pub fn fail(
        check: impl Into<String>,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self::with_severity(check, message, Severity::Failure, details)
    }

    fn with_severity(
        check: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        details: Vec<String>,
    ) -> Self {
        Self {
            check: check.into(),
            message: message.into(),
            severity,
            details,
        }
    }

    /// Returns true if this result represents a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.severity == Severity::Failure
    }
}

/// Aggregated results of every audit check.
#[derive(Debug, Default, Serialize)]
pub struct AuditReport {
    /// All individual results.
    pub results: Vec<AuditResult>,
}

impl AuditReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result.
    pub fn push(&mut self, result: AuditResult) {
        self.results.push(result);
    }

    /// Returns the count of failed checks.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }

    /// Returns the count of warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.severity == Severity::Warning)
            .count()
    }

    /// Returns true if no check failed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failure_count() == 0
    }

    /// Results of the named check.
    pub fn check<'a>(&'a self, check: &'a str) -> impl Iterator<Item = &'a AuditResult> + 'a {
        self.results.iter().filter(move |r| r.check == check)
    }
}

#[derive(Default)]
struct Findings {
    back_references: Vec<String>,
    dangling: Vec<String>,
    invalid_none: Vec<String>,
    root_types: Vec<String>,
    bindings: Vec<String>,
    nodes: usize,
}

impl Findings {
    fn inspect(&mut self, visit: &Visit<'_>) {
        let registry = visit.registry;
        self.nodes += 1;
        for child in registry.children(visit.key) {
            match registry.node(child) {
                None => self
                    .dangling
                    .push(format!("{} lists unregistered {child}", visit.node.symbol_id())),
                Some(node) if registry.parent_of(child) != Some(visit.key) => {
                    self.back_references.push(format!(
                        "{} is listed by {} but its `..` is {:?}",
                        node.symbol_id(),
                        visit.node.symbol_id(),
                        registry.parent_of(child)
                    ));
                }
                Some(_) => {}
            }
        }
        match visit.node {
            Node::Type(ty) => {
                if !ty.value_class().admits(ty.none()) {
                    self.invalid_none.push(format!(
                        "{}: none {} is not a {}",
                        ty.id(),
                        ty.none(),
                        ty.value_class()
                    ));
                }
                let root_type = registry
                    .root_type_of(visit.key)
                    .and_then(|key| registry.get_type(key));
                if !root_type.is_some_and(|root| root.id().is_untagged()) {
                    self.root_types.push(format!(
                        "{}: root type does not resolve to an untagged type",
                        ty.id()
                    ));
                }
            }
            Node::Root(root) => {
                for (class, key) in root.bindings() {
                    match registry.get_type(key) {
                        Some(ty) if ty.value_class() == class => {}
                        Some(ty) => self.bindings.push(format!(
                            "{class} is bound to {} of class {}",
                            ty.id(),
                            ty.value_class()
                        )),
                        None => self
                            .bindings
                            .push(format!("{class} is bound to unregistered {key}")),
                    }
                }
            }
            Node::Namespace(_) | Node::Tag(_) => {}
        }
    }

    fn into_report(self) -> AuditReport {
        let mut report = AuditReport::new();
        let checks = [
            (
                "back_references",
                "child `..` entries name their listing parent",
                self.back_references,
                Severity::Failure,
            ),
            (
                "type_validity",
                "every none is an instance of its value class",
                self.invalid_none,
                Severity::Failure,
            ),
            (
                "root_types",
                "every root type resolves to an untagged type",
                self.root_types,
                Severity::Failure,
            ),
            (
                "bindings",
                "root bindings point at registered types of the bound class",
                self.bindings,
                Severity::Failure,
            ),
            (
                "dangling",
                "no namespace lists an unregistered node",
                self.dangling,
                Severity::Warning,
            ),
        ];
        for (check, passed, details, severity) in checks {
            if details.is_empty() {
                report.push(AuditResult::pass(check, format!("{passed} ({} nodes)", self.nodes)));
            } else {
                let message = format!("{} finding(s)", details.len());
                report.push(AuditResult::with_severity(check, message, severity, details));
            }
        }
        report
    }
}

/// Walks the whole tree and checks its structural invariants.
#[must_use]
pub fn audit(registry: &Registry) -> AuditReport {
    let mut findings = Findings::default();
    NamespaceWalker::from_root(registry).walk(&mut |visit: &Visit<'_>| {
        findings.inspect(visit);
        WalkStatus::Continue
    });
    findings.into_report()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{NamespaceKey, SymbolId, SymbolKind};
    use crate::symbol::Symbol;

    #[test]
    fn fresh_registry_passes() {
        let report = audit(&Registry::new());
        assert!(report.all_passed());
        assert_eq!(report.warning_count(), 0);
        assert_eq!(report.results.len(), 5);
    }

    #[test]
    fn dangling_reference_is_a_warning() {
        let mut registry = Registry::new();
        let root = registry.root();
        if let Some(node) = registry.node_mut(root) {
            node.table_mut().put(
                SymbolId::unchecked("ghost", SymbolKind::Namespace),
                Symbol::Namespace(NamespaceKey(404)),
            );
        }
        let report = audit(&registry);
        assert!(report.all_passed());
        assert_eq!(report.warning_count(), 1);
        assert!(report.check("dangling").all(|r| r.severity == Severity::Warning));
    }

    #[test]
    fn foreign_child_breaks_back_references() {
        let mut registry = Registry::new();
        let root = registry.root();
        let a = registry.create_namespace(root, "a").expect("registers");
        let b = registry.create_namespace(root, "b").expect("registers");
        if let Some(node) = registry.node_mut(a) {
            node.table_mut()
                .put(SymbolId::unchecked("b", SymbolKind::Namespace), Symbol::Namespace(b));
        }
        let report = audit(&registry);
        assert_eq!(report.failure_count(), 1);
        assert!(report.check("back_references").all(AuditResult::is_failure));
    }
}
