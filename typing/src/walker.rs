//! Depth-first traversal of the namespace tree.

use std::collections::HashSet;

use tracing::warn;

use crate::id::NamespaceKey;
use crate::namespace::Node;
use crate::registry::Registry;

/// What a visitor asks the walker to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalkStatus {
    /// Descend into the visited node's children.
    Continue,
    /// Skip the visited node's children but keep walking.
    Pop,
    /// Stop immediately.
    Abort,
}

/// A node being visited.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'r> {
    /// Key of the node.
    pub key: NamespaceKey,
    /// The node.
    pub node: &'r Node,
    /// Distance from the node the walk started at.
    pub depth: usize,
    /// The registry being walked.
    pub registry: &'r Registry,
}

/// Receives every node a [`NamespaceWalker`] reaches.
pub trait NamespaceVisitor {
    /// Visits one node.
    fn visit(&mut self, visit: &Visit<'_>) -> WalkStatus;
}

impl<F> NamespaceVisitor for F
where
    F: FnMut(&Visit<'_>) -> WalkStatus,
{
    fn visit(&mut self, visit: &Visit<'_>) -> WalkStatus {
        self(visit)
    }
}

/// Walks a namespace tree depth first, first declared child first.
///
/// The three back-references are never followed. Child keys that no longer
/// resolve, and nodes reached a second time, are skipped with a warning.
#[derive(Debug, Clone, Copy)]
pub struct NamespaceWalker<'r> {
    registry: &'r Registry,
    start: NamespaceKey,
}

impl<'r> NamespaceWalker<'r> {
    /// A walker starting at `start`.
    #[must_use]
    pub fn new(registry: &'r Registry, start: NamespaceKey) -> Self {
        Self { registry, start }
    }

    /// A walker starting at the registry's root.
    #[must_use]
    pub fn from_root(registry: &'r Registry) -> Self {
        Self::new(registry, registry.root())
    }

    /// Drives `visitor` over the tree and returns the status of the last
    /// visit; `Continue` if nothing was visited.
    pub fn walk<V: NamespaceVisitor + ?Sized>(&self, visitor: &mut V) -> WalkStatus {
        let mut pending = vec![(self.start, 0)];
        let mut visited = HashSet::new();
        let mut status = WalkStatus::Continue;
        while let Some((key, depth)) = pending.pop() {
            if !visited.insert(key) {
                warn!(%key, "namespace reached twice, skipping");
                continue;
            }
            let Some(node) = self.registry.node(key) else {
                warn!(%key, "unregistered namespace reference, skipping");
                continue;
            };
            status = visitor.visit(&Visit {
                key,
                node,
                depth,
                registry: self.registry,
            });
            match status {
                WalkStatus::Continue => {
                    let children = self.registry.children(key);
                    pending.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
                }
                WalkStatus::Pop => {}
                WalkStatus::Abort => {
                    pending.clear();
                    break;
                }
            }
        }
        status
    }

    /// Keys of every reachable node in visiting order.
    #[must_use]
    pub fn keys(&self) -> Vec<NamespaceKey> {
        let mut keys = Vec::new();
        self.walk(&mut |visit: &Visit<'_>| {
            keys.push(visit.key);
            WalkStatus::Continue
        });
        keys
    }
}
