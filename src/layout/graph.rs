//! Layout dependency graph.
//!
//! One graph per container per pass. Nodes are the container's direct
//! children; an edge `(target, dependent)` means `target` must be resolved
//! before `dependent` because one of the dependent's expressions reads the
//! target's frame. The graph is rebuilt every pass and never stored.

use std::collections::HashSet;

use crate::engine::{ElementId, ElementTree};
use crate::error::LayoutError;

/// "`target` resolves before `dependent`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub target: ElementId,
    pub dependent: ElementId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutGraph {
    /// Direct children, in insertion order.
    pub nodes: Vec<ElementId>,
    /// Deduplicated edges, in discovery order.
    pub edges: Vec<Edge>,
}

impl LayoutGraph {
    /// Collect nodes and edges for one container.
    ///
    /// Fixed children (all four expressions `Absolute`) contribute no edges.
    /// References to the container itself are not edges: the container is
    /// always resolved before its children.
    pub fn build(tree: &ElementTree, container: ElementId) -> Result<Self, LayoutError> {
        let parent = tree.require(container)?;

        let mut graph = LayoutGraph {
            nodes: parent.children().to_vec(),
            edges: Vec::new(),
        };
        let mut seen: HashSet<Edge> = HashSet::new();
        let mut refs = Vec::new();

        for &child in parent.children() {
            let element = tree.require(child)?;
            if element.is_fixed() {
                continue;
            }

            refs.clear();
            element.x().collect_references(&mut refs);
            element.y().collect_references(&mut refs);
            element.width().collect_references(&mut refs);
            element.height().collect_references(&mut refs);

            for &target in &refs {
                if target == container {
                    continue;
                }
                let edge = Edge {
                    target,
                    dependent: child,
                };
                if seen.insert(edge) {
                    graph.edges.push(edge);
                }
            }
        }

        Ok(graph)
    }
}
