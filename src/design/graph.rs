//! Design graph implementation using petgraph.
//!
//! Provides an in-memory graph of design entities linked by two kinds of
//! edges: containment (package -> class -> member) and usage (A uses B).
//! The [`DesignProvider`] trait is the narrow query interface the coupling
//! engine consumes; [`DesignGraph`] is the provider shipped with this crate.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{EdgeFiltered, EdgeRef};
use petgraph::Direction;
use std::collections::HashMap;

use super::types::{DesignEntity, EntityKind};

/// Errors raised at the design graph boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesignError {
    /// No entity with the given qualified name exists.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// The child already has a different containment parent.
    #[error("Entity '{child}' is already contained in '{existing}', cannot move it to '{parent}'")]
    MultipleParents {
        child: String,
        existing: String,
        parent: String,
    },

    /// An entity was asked to contain itself.
    #[error("Entity cannot contain itself: {0}")]
    SelfContainment(String),
}

/// Result type alias for design graph operations.
pub type DesignResult<T> = Result<T, DesignError>;

/// Query interface over a design graph.
///
/// Implementations own the entities; every returned reference borrows from
/// the provider. Queries on an entity the provider does not know return
/// empty collections.
pub trait DesignProvider {
    /// Resolves a qualified name, failing with [`DesignError::NotFound`].
    fn lookup(&self, qualified_name: &str) -> DesignResult<&DesignEntity>;

    /// Entities that `entity` references.
    fn used_by(&self, entity: &DesignEntity) -> Vec<&DesignEntity>;

    /// Entities that reference `entity`.
    fn users_of(&self, entity: &DesignEntity) -> Vec<&DesignEntity>;

    /// Immediate containment children of `entity`, in declaration order.
    fn children(&self, entity: &DesignEntity) -> Vec<&DesignEntity>;
}

/// The relationship an edge of the design graph represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Source contains target (e.g., class contains method).
    Contains,
    /// Source references target.
    Uses,
}

/// A directed graph of design entities.
///
/// Containment edges point from container to member, usage edges from the
/// referencing entity to the referenced one.
///
/// # Example
///
/// ```rust
/// use designmetrics::design::{DesignGraph, DesignProvider, EntityKind};
///
/// let mut graph = DesignGraph::new();
/// graph.add_entity("shop", EntityKind::Package);
/// graph.add_entity("shop.Cart", EntityKind::Class);
/// graph.add_entity("shop.Item", EntityKind::Class);
/// graph.add_containment("shop", "shop.Cart").unwrap();
/// graph.add_containment("shop", "shop.Item").unwrap();
/// graph.add_usage("shop.Cart", "shop.Item");
///
/// let cart = graph.lookup("shop.Cart").unwrap();
/// assert_eq!(graph.used_by(cart).len(), 1);
/// assert_eq!(graph.entity_count(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DesignGraph {
    /// The underlying directed graph
    graph: DiGraph<DesignEntity, EdgeKind>,
    /// Maps qualified names to their node indices for O(1) lookup
    node_indices: HashMap<String, NodeIndex>,
}

impl DesignGraph {
    /// Creates a new empty design graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
        }
    }

    /// Creates a new graph with pre-allocated capacity.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            node_indices: HashMap::with_capacity(nodes),
        }
    }

    /// Adds an entity to the graph.
    ///
    /// If an entity with the same qualified name already exists, returns
    /// its existing node index without modification.
    pub fn add_entity(&mut self, qualified_name: &str, kind: EntityKind) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(qualified_name) {
            return idx;
        }

        let idx = self.graph.add_node(DesignEntity::new(qualified_name, kind));
        self.node_indices.insert(qualified_name.to_string(), idx);
        idx
    }

    /// Records that `parent` directly contains `child`.
    ///
    /// Containment is a tree: a child may only ever have one parent.
    /// Re-adding an existing containment is a no-op.
    ///
    /// # Example
    ///
    /// ```rust
    /// use designmetrics::design::{DesignError, DesignGraph, EntityKind};
    ///
    /// let mut graph = DesignGraph::new();
    /// graph.add_entity("a", EntityKind::Package);
    /// graph.add_entity("b", EntityKind::Package);
    /// graph.add_entity("a.K", EntityKind::Class);
    ///
    /// assert!(graph.add_containment("a", "a.K").is_ok());
    /// assert!(matches!(
    ///     graph.add_containment("b", "a.K"),
    ///     Err(DesignError::MultipleParents { .. })
    /// ));
    /// ```
    pub fn add_containment(&mut self, parent: &str, child: &str) -> DesignResult<()> {
        if parent == child {
            return Err(DesignError::SelfContainment(child.to_string()));
        }
        let parent_idx = self.index_of(parent)?;
        let child_idx = self.index_of(child)?;

        let node = &mut self.graph[child_idx];
        match node.containment_parent.as_deref() {
            Some(existing) if existing == parent => return Ok(()),
            Some(existing) => {
                return Err(DesignError::MultipleParents {
                    child: child.to_string(),
                    existing: existing.to_string(),
                    parent: parent.to_string(),
                })
            }
            None => node.containment_parent = Some(parent.to_string()),
        }

        self.graph.add_edge(parent_idx, child_idx, EdgeKind::Contains);
        Ok(())
    }

    /// Records that `from` uses `to`.
    ///
    /// Duplicate edges and self-loops are kept as given.
    ///
    /// # Returns
    ///
    /// `true` if the edge was added, `false` if either entity doesn't exist.
    pub fn add_usage(&mut self, from: &str, to: &str) -> bool {
        let (Some(&from_idx), Some(&to_idx)) =
            (self.node_indices.get(from), self.node_indices.get(to))
        else {
            return false;
        };

        self.graph.add_edge(from_idx, to_idx, EdgeKind::Uses);
        true
    }

    /// Gets an entity by qualified name.
    pub fn get_entity(&self, qualified_name: &str) -> Option<&DesignEntity> {
        self.node_indices
            .get(qualified_name)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Gets all entities of the given kind, in insertion order.
    pub fn entities_of_kind(&self, kind: EntityKind) -> Vec<&DesignEntity> {
        self.graph
            .node_weights()
            .filter(|entity| entity.kind == kind)
            .collect()
    }

    /// Gets all entities in the graph.
    pub fn get_all_entities(&self) -> Vec<&DesignEntity> {
        self.graph.node_weights().collect()
    }

    /// Checks whether containment edges form a cycle.
    ///
    /// A well-formed design never does; the coupling engine assumes this.
    pub fn has_containment_cycles(&self) -> bool {
        let containment =
            EdgeFiltered::from_fn(&self.graph, |edge| *edge.weight() == EdgeKind::Contains);
        is_cyclic_directed(&containment)
    }

    /// Returns the number of entities in the graph.
    pub fn entity_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of usage edges in the graph.
    pub fn usage_count(&self) -> usize {
        self.graph
            .edge_weights()
            .filter(|&&kind| kind == EdgeKind::Uses)
            .count()
    }

    /// Checks if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    fn index_of(&self, qualified_name: &str) -> DesignResult<NodeIndex> {
        self.node_indices
            .get(qualified_name)
            .copied()
            .ok_or_else(|| DesignError::NotFound(qualified_name.to_string()))
    }

    /// Neighbours of `entity` over edges of one kind, ordered by edge insertion.
    fn neighbours(
        &self,
        entity: &DesignEntity,
        kind: EdgeKind,
        direction: Direction,
    ) -> Vec<&DesignEntity> {
        let Some(&idx) = self.node_indices.get(&entity.qualified_name) else {
            return Vec::new();
        };

        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, direction)
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| match direction {
                Direction::Outgoing => (edge.id(), edge.target()),
                Direction::Incoming => (edge.id(), edge.source()),
            })
            .collect();
        edges.sort_by_key(|&(id, _)| id);

        edges
            .into_iter()
            .filter_map(|(_, other)| self.graph.node_weight(other))
            .collect()
    }
}

impl DesignProvider for DesignGraph {
    fn lookup(&self, qualified_name: &str) -> DesignResult<&DesignEntity> {
        self.get_entity(qualified_name)
            .ok_or_else(|| DesignError::NotFound(qualified_name.to_string()))
    }

    fn used_by(&self, entity: &DesignEntity) -> Vec<&DesignEntity> {
        self.neighbours(entity, EdgeKind::Uses, Direction::Outgoing)
    }

    fn users_of(&self, entity: &DesignEntity) -> Vec<&DesignEntity> {
        self.neighbours(entity, EdgeKind::Uses, Direction::Incoming)
    }

    fn children(&self, entity: &DesignEntity) -> Vec<&DesignEntity> {
        self.neighbours(entity, EdgeKind::Contains, Direction::Outgoing)
    }
}
