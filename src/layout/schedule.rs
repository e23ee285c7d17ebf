//! Topological scheduler.
//!
//! Orders a container's children so every element is resolved after the
//! elements its expressions read.
//!
//! # Algorithm
//!
//! 1. **Kahn's pass**: repeatedly take a node with no incoming edges, emit
//!    it, and drop its outgoing edges.
//! 2. **Leftovers**: when no node is free but edges remain, classify the
//!    first remaining edge:
//!    - self-loop: tolerated, the node is placed and the edge dropped
//!    - same parent (sibling cycle): tolerated, both nodes placed
//!    - target is an ancestor of the dependent: already resolved by an
//!      outer pass, edge dropped
//!    - target is a descendant of the dependent: fatal
//!    - anything else (cross-branch reference, missing element): fatal
//! 3. Resume Kahn's pass; repeat until no edges remain.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};

use crate::engine::{ElementId, ElementTree};
use crate::error::LayoutError;

use super::graph::{Edge, LayoutGraph};

struct Scheduler<'a> {
    tree: &'a ElementTree,
    container: ElementId,
    nodes: HashSet<ElementId>,
    remaining: Vec<Edge>,
    ready: VecDeque<ElementId>,
    placed: HashSet<ElementId>,
    order: Vec<ElementId>,
}

impl Scheduler<'_> {
    fn has_incoming(&self, node: ElementId) -> bool {
        self.remaining.iter().any(|e| e.dependent == node)
    }

    fn enqueue_if_free(&mut self, node: ElementId) {
        if self.nodes.contains(&node)
            && !self.placed.contains(&node)
            && !self.ready.contains(&node)
            && !self.has_incoming(node)
        {
            self.ready.push_back(node);
        }
    }

    /// Emit a node and release the nodes waiting on it.
    fn place(&mut self, node: ElementId) {
        if !self.placed.insert(node) {
            return;
        }
        if node != self.container {
            self.order.push(node);
        }

        let mut freed = Vec::new();
        self.remaining.retain(|e| {
            if e.target == node {
                freed.push(e.dependent);
                false
            } else {
                true
            }
        });
        for dependent in freed {
            self.enqueue_if_free(dependent);
        }
    }

    fn drain_ready(&mut self) {
        while let Some(node) = self.ready.pop_front() {
            self.place(node);
        }
    }

    /// Decide what to do with an edge Kahn's pass could not remove.
    fn settle(&mut self, edge: Edge) -> Result<(), LayoutError> {
        let Edge { target, dependent } = edge;
        let tree = self.tree;

        if target == dependent {
            warn!(element = %tree.display_name(dependent), "layout self-reference ignored");
            self.place(dependent);
            return Ok(());
        }

        let same_parent = tree.contains(target)
            && tree.parent(target).is_some()
            && tree.parent(target) == tree.parent(dependent);
        if same_parent {
            warn!(
                target = %tree.display_name(target),
                dependent = %tree.display_name(dependent),
                "sibling layout cycle broken"
            );
            self.place(target);
            self.place(dependent);
            return Ok(());
        }

        if tree.is_ancestor_of(target, dependent) {
            debug!(
                target = %tree.display_name(target),
                dependent = %tree.display_name(dependent),
                "reference to an ancestor resolved by an outer pass"
            );
            self.enqueue_if_free(dependent);
            return Ok(());
        }

        let container = tree.display_name(self.container);
        if tree.is_ancestor_of(dependent, target) {
            return Err(LayoutError::ReferencesSubview {
                container,
                target: tree.display_name(target),
                dependent: tree.display_name(dependent),
            });
        }
        Err(LayoutError::UnresolvedReference {
            container,
            target: tree.display_name(target),
            dependent: tree.display_name(dependent),
        })
    }
}

/// Order `graph`'s nodes for resolution inside `container`.
pub fn topological_sort(
    tree: &ElementTree,
    container: ElementId,
    graph: LayoutGraph,
) -> Result<Vec<ElementId>, LayoutError> {
    let LayoutGraph { nodes, edges } = graph;

    let mut scheduler = Scheduler {
        tree,
        container,
        nodes: nodes.iter().copied().collect(),
        remaining: edges,
        ready: VecDeque::new(),
        placed: HashSet::new(),
        order: Vec::with_capacity(nodes.len()),
    };

    // Set of all nodes with no incoming edges, in child order
    for &node in &nodes {
        scheduler.enqueue_if_free(node);
    }

    loop {
        scheduler.drain_ready();
        if scheduler.remaining.is_empty() {
            break;
        }
        let edge = scheduler.remaining.remove(0);
        scheduler.settle(edge)?;
    }

    // Nodes that were neither free nor part of a settled edge cannot exist once
    // every edge is gone, but keep the result total.
    for node in nodes {
        if !scheduler.placed.contains(&node) && node != container {
            scheduler.place(node);
        }
    }

    Ok(scheduler.order)
}
