//! Coupling engine over a design provider.
//!
//! Computes, for a design entity, the set of other entities it is coupled
//! to. Coupling is counted between classes: a method, field or relation
//! declared in a class stands for that class at both ends of a usage edge.
//! Usage edges are merged in both directions; containment is aggregated so
//! that a container reports what its members are coupled to, minus the
//! container's own members.

use std::collections::HashSet;

use tracing::debug;

use crate::design::{DesignEntity, DesignProvider, EntityKind};

/// Stateless coupling queries over a borrowed [`DesignProvider`].
///
/// Every returned reference borrows from the provider, so sets computed for
/// different entities of the same graph can be compared and merged freely.
///
/// # Example
///
/// ```rust
/// use designmetrics::design::{DesignGraph, DesignProvider, EntityKind};
/// use designmetrics::metrics::CouplingEngine;
///
/// let mut graph = DesignGraph::new();
/// graph.add_entity("a.Cart", EntityKind::Class);
/// graph.add_entity("a.Cart.items", EntityKind::Field);
/// graph.add_entity("a.Item", EntityKind::Class);
/// graph.add_containment("a.Cart", "a.Cart.items").unwrap();
/// graph.add_usage("a.Cart.items", "a.Item");
///
/// let engine = CouplingEngine::new(&graph);
/// let cart = graph.lookup("a.Cart").unwrap();
/// let item = graph.lookup("a.Item").unwrap();
///
/// assert!(engine.direct_related_entities(cart).contains(item));
/// assert_eq!(engine.related_entities(cart).len(), 1);
/// ```
pub struct CouplingEngine<'g, P: ?Sized> {
    provider: &'g P,
}

impl<P: ?Sized> Clone for CouplingEngine<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: ?Sized> Copy for CouplingEngine<'_, P> {}

impl<'g, P: DesignProvider + ?Sized> CouplingEngine<'g, P> {
    /// Creates an engine querying `provider`.
    pub fn new(provider: &'g P) -> Self {
        Self { provider }
    }

    /// The provider this engine queries.
    pub fn provider(&self) -> &'g P {
        self.provider
    }

    /// The class a method, field or relation is declared in.
    ///
    /// Packages and classes are their own unit and yield `None`, as do
    /// members declared outside any class.
    pub fn enclosing_class(&self, entity: &DesignEntity) -> Option<&'g DesignEntity> {
        if matches!(entity.kind, EntityKind::Package | EntityKind::Class) {
            return None;
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut parent = entity.containment_parent.as_deref();
        while let Some(name) = parent {
            if !seen.insert(name) {
                return None;
            }
            let container = self.provider.lookup(name).ok()?;
            if container.kind == EntityKind::Class {
                return Some(container);
            }
            parent = container.containment_parent.as_deref();
        }
        None
    }

    /// Entities related to `entity` by a usage edge incident on it.
    ///
    /// Both directions count: everything `entity` uses and everything that
    /// uses `entity`, merged into one set. Endpoints declared in a class are
    /// replaced by that class, and the edges of a class include those of its
    /// own methods, fields and relations. `entity` and its enclosing class
    /// are never part of the result, even when it uses itself.
    pub fn direct_related_entities(&self, entity: &DesignEntity) -> HashSet<&'g DesignEntity> {
        let mut related = HashSet::new();
        self.collect_endpoints(entity, &mut related);

        if entity.kind == EntityKind::Class {
            for member in self.descendants(entity) {
                if self
                    .enclosing_class(member)
                    .is_some_and(|class| class == entity)
                {
                    self.collect_endpoints(member, &mut related);
                }
            }
        }

        let own_class = self.enclosing_class(entity);
        related.retain(|other| *other != entity && Some(*other) != own_class);

        debug!(
            entity = %entity.qualified_name,
            related = related.len(),
            "Computed direct related entities"
        );
        related
    }

    /// Every entity transitively contained in `entity`, excluding `entity`.
    ///
    /// Members are listed depth-first in declaration order. Each member is
    /// visited once.
    pub fn descendants(&self, entity: &DesignEntity) -> Vec<&'g DesignEntity> {
        let mut members = Vec::new();
        let mut seen: HashSet<&'g DesignEntity> = HashSet::new();

        let mut pending = self.provider.children(entity);
        pending.reverse();
        while let Some(member) = pending.pop() {
            if member == entity || !seen.insert(member) {
                continue;
            }
            members.push(member);

            let mut children = self.provider.children(member);
            children.reverse();
            pending.extend(children);
        }

        members
    }

    /// Entities related to `entity` or to anything it contains.
    ///
    /// The direct related sets of `entity` and of each of its descendants
    /// are merged, then `entity`, its enclosing class and its descendants
    /// are removed. Usage edges are followed one hop only.
    pub fn related_entities(&self, entity: &DesignEntity) -> HashSet<&'g DesignEntity> {
        let descendants = self.descendants(entity);
        let internal: HashSet<&'g DesignEntity> = descendants.iter().copied().collect();

        let mut related = self.direct_related_entities(entity);
        for member in &descendants {
            related.extend(self.direct_related_entities(member));
        }
        let own_class = self.enclosing_class(entity);
        related.retain(|other| {
            *other != entity && Some(*other) != own_class && !internal.contains(other)
        });

        debug!(
            entity = %entity.qualified_name,
            members = descendants.len(),
            related = related.len(),
            "Computed related entities"
        );
        related
    }

    /// Adds both ends of every usage edge on `entity`, lifted to classes.
    fn collect_endpoints(&self, entity: &DesignEntity, into: &mut HashSet<&'g DesignEntity>) {
        let neighbours = self
            .provider
            .used_by(entity)
            .into_iter()
            .chain(self.provider.users_of(entity));
        for other in neighbours {
            into.insert(self.enclosing_class(other).unwrap_or(other));
        }
    }
}

/// Orders a related-entity set by qualified name, for display.
pub fn sorted_by_name<'a>(entities: &HashSet<&'a DesignEntity>) -> Vec<&'a DesignEntity> {
    let mut sorted: Vec<&'a DesignEntity> = entities.iter().copied().collect();
    sorted.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{DesignGraph, EntityKind};

    fn names(entities: &HashSet<&DesignEntity>) -> Vec<String> {
        sorted_by_name(entities)
            .into_iter()
            .map(|e| e.qualified_name.clone())
            .collect()
    }

    fn class_with_field(graph: &mut DesignGraph, class: &str, field: &str, field_type: &str) {
        let field_name = format!("{}.{}", class, field);
        graph.add_entity(class, EntityKind::Class);
        graph.add_entity(&field_name, EntityKind::Field);
        graph.add_containment(class, &field_name).unwrap();
        graph.add_usage(&field_name, field_type);
    }

    /// Package `p` holds class `p.K` with method `p.K.run()` and field
    /// `p.K.count`. `run()` reads `q.Q.f` and `p.K.count`; `p.K` extends
    /// `x.X`.
    fn package_graph() -> DesignGraph {
        let mut graph = DesignGraph::new();
        graph.add_entity("p", EntityKind::Package);
        graph.add_entity("p.K", EntityKind::Class);
        graph.add_entity("p.K.run()", EntityKind::Method);
        graph.add_entity("p.K.count", EntityKind::Field);
        graph.add_entity("q", EntityKind::Package);
        graph.add_entity("q.Q", EntityKind::Class);
        graph.add_entity("q.Q.f", EntityKind::Field);
        graph.add_entity("x.X", EntityKind::Class);

        graph.add_containment("p", "p.K").unwrap();
        graph.add_containment("p.K", "p.K.run()").unwrap();
        graph.add_containment("p.K", "p.K.count").unwrap();
        graph.add_containment("q", "q.Q").unwrap();
        graph.add_containment("q.Q", "q.Q.f").unwrap();

        graph.add_usage("p.K.run()", "q.Q.f");
        graph.add_usage("p.K.run()", "p.K.count");
        graph.add_usage("p.K", "x.X");
        graph
    }

    #[test]
    fn test_empty_class_has_no_relations() {
        let mut graph = DesignGraph::new();
        graph.add_entity("m.A", EntityKind::Class);
        let engine = CouplingEngine::new(&graph);
        let a = graph.get_entity("m.A").unwrap();

        assert!(engine.direct_related_entities(a).is_empty());
        assert!(engine.related_entities(a).is_empty());
        assert!(engine.descendants(a).is_empty());
    }

    #[test]
    fn test_direct_relations_merge_both_directions() {
        let mut graph = DesignGraph::new();
        graph.add_entity("m.A", EntityKind::Class);
        graph.add_entity("m.B", EntityKind::Class);
        graph.add_entity("m.C", EntityKind::Class);
        graph.add_usage("m.B", "m.A");
        graph.add_usage("m.C", "m.B");
        graph.add_usage("m.B", "m.C");

        let engine = CouplingEngine::new(&graph);
        let b = graph.get_entity("m.B").unwrap();
        assert_eq!(
            names(&engine.direct_related_entities(b)),
            vec!["m.A", "m.C"]
        );
    }

    #[test]
    fn test_direct_relations_deduplicate_parallel_edges() {
        let mut graph = DesignGraph::new();
        graph.add_entity("m.A", EntityKind::Class);
        graph.add_entity("m.B", EntityKind::Class);
        graph.add_usage("m.B", "m.A");
        graph.add_usage("m.B", "m.A");
        graph.add_usage("m.A", "m.B");

        let engine = CouplingEngine::new(&graph);
        let b = graph.get_entity("m.B").unwrap();
        assert_eq!(engine.direct_related_entities(b).len(), 1);
    }

    #[test]
    fn test_self_loop_is_excluded() {
        let mut graph = DesignGraph::new();
        graph.add_entity("m.A", EntityKind::Class);
        graph.add_entity("m.B", EntityKind::Class);
        graph.add_usage("m.A", "m.A");
        graph.add_usage("m.A", "m.B");

        let engine = CouplingEngine::new(&graph);
        let a = graph.get_entity("m.A").unwrap();
        let direct = engine.direct_related_entities(a);
        assert!(!direct.contains(a));
        assert_eq!(names(&direct), vec!["m.B"]);
        assert!(!engine.related_entities(a).contains(a));
    }

    #[test]
    fn test_class_relations_include_own_fields() {
        let mut graph = DesignGraph::new();
        graph.add_entity("m.A", EntityKind::Class);
        class_with_field(&mut graph, "m.B", "a", "m.A");

        let engine = CouplingEngine::new(&graph);
        let a = graph.get_entity("m.A").unwrap();
        let b = graph.get_entity("m.B").unwrap();
        let field = graph.get_entity("m.B.a").unwrap();

        assert_eq!(names(&engine.direct_related_entities(b)), vec!["m.A"]);
        assert_eq!(names(&engine.related_entities(b)), vec!["m.A"]);
        assert_eq!(names(&engine.direct_related_entities(field)), vec!["m.A"]);

        // The field's user is reported as its class.
        assert_eq!(names(&engine.direct_related_entities(a)), vec!["m.B"]);
        assert_eq!(names(&engine.related_entities(a)), vec!["m.B"]);
    }

    #[test]
    fn test_method_reading_field_relates_classes() {
        let mut graph = DesignGraph::new();
        graph.add_entity("m.K", EntityKind::Class);
        graph.add_entity("m.K.run()", EntityKind::Method);
        graph.add_entity("m.Q", EntityKind::Class);
        graph.add_entity("m.Q.f", EntityKind::Field);
        graph.add_containment("m.K", "m.K.run()").unwrap();
        graph.add_containment("m.Q", "m.Q.f").unwrap();
        graph.add_usage("m.K.run()", "m.Q.f");

        let engine = CouplingEngine::new(&graph);
        let k = graph.get_entity("m.K").unwrap();
        let q = graph.get_entity("m.Q").unwrap();
        let run = graph.get_entity("m.K.run()").unwrap();

        assert_eq!(names(&engine.related_entities(k)), vec!["m.Q"]);
        assert_eq!(names(&engine.related_entities(q)), vec!["m.K"]);
        assert_eq!(names(&engine.related_entities(run)), vec!["m.Q"]);
    }

    #[test]
    fn test_chain_is_not_transitive() {
        let mut graph = DesignGraph::new();
        graph.add_entity("m.A", EntityKind::Class);
        graph.add_entity("m.B", EntityKind::Class);
        class_with_field(&mut graph, "m.C", "a", "m.A");
        graph.add_entity("m.C.b", EntityKind::Field);
        graph.add_containment("m.C", "m.C.b").unwrap();
        graph.add_usage("m.C.b", "m.B");

        let engine = CouplingEngine::new(&graph);
        let c = graph.get_entity("m.C").unwrap();
        assert_eq!(names(&engine.related_entities(c)), vec!["m.A", "m.B"]);

        class_with_field(&mut graph, "m.D", "c", "m.C");
        let engine = CouplingEngine::new(&graph);
        let d = graph.get_entity("m.D").unwrap();
        assert_eq!(names(&engine.related_entities(d)), vec!["m.C"]);

        // D's field now uses C, which C sees as an incoming relation.
        let c = graph.get_entity("m.C").unwrap();
        assert_eq!(
            names(&engine.related_entities(c)),
            vec!["m.A", "m.B", "m.D"]
        );
    }

    #[test]
    fn test_package_aggregates_members() {
        let graph = package_graph();
        let engine = CouplingEngine::new(&graph);
        let p = graph.get_entity("p").unwrap();

        let related = engine.related_entities(p);
        assert_eq!(names(&related), vec!["q.Q", "x.X"]);
        for internal in ["p.K", "p.K.run()", "p.K.count"] {
            assert!(!related.contains(graph.get_entity(internal).unwrap()));
        }
    }

    #[test]
    fn test_class_excludes_own_members() {
        let graph = package_graph();
        let engine = CouplingEngine::new(&graph);
        let k = graph.get_entity("p.K").unwrap();

        assert_eq!(names(&engine.related_entities(k)), vec!["q.Q", "x.X"]);
        assert_eq!(names(&engine.direct_related_entities(k)), vec!["q.Q", "x.X"]);
    }

    #[test]
    fn test_usage_between_siblings_stays_inside_class() {
        let graph = package_graph();
        let engine = CouplingEngine::new(&graph);
        let count = graph.get_entity("p.K.count").unwrap();
        let run = graph.get_entity("p.K.run()").unwrap();

        assert!(engine.related_entities(count).is_empty());
        assert_eq!(names(&engine.related_entities(run)), vec!["q.Q"]);
    }

    #[test]
    fn test_leaf_related_equals_direct() {
        let graph = package_graph();
        let engine = CouplingEngine::new(&graph);
        for name in ["p.K.run()", "p.K.count", "q.Q.f", "x.X"] {
            let leaf = graph.get_entity(name).unwrap();
            assert_eq!(
                engine.related_entities(leaf),
                engine.direct_related_entities(leaf),
                "leaf {}",
                name
            );
        }
    }

    #[test]
    fn test_container_of_used_members() {
        let graph = package_graph();
        let engine = CouplingEngine::new(&graph);
        let q = graph.get_entity("q").unwrap();

        assert_eq!(names(&engine.related_entities(q)), vec!["p.K"]);
    }

    #[test]
    fn test_descendants_depth_first() {
        let graph = package_graph();
        let engine = CouplingEngine::new(&graph);
        let p = graph.get_entity("p").unwrap();

        let members: Vec<&str> = engine
            .descendants(p)
            .iter()
            .map(|e| e.qualified_name.as_str())
            .collect();
        assert_eq!(members, vec!["p.K", "p.K.run()", "p.K.count"]);
    }

    #[test]
    fn test_relation_entities_are_uniform() {
        let mut graph = DesignGraph::new();
        graph.add_entity("m.A", EntityKind::Class);
        graph.add_entity("m.B", EntityKind::Class);
        graph.add_entity("m.A->m.B", EntityKind::Relation);
        graph.add_usage("m.A->m.B", "m.A");
        graph.add_usage("m.A->m.B", "m.B");

        let engine = CouplingEngine::new(&graph);
        let relation = graph.get_entity("m.A->m.B").unwrap();
        assert_eq!(names(&engine.related_entities(relation)), vec!["m.A", "m.B"]);

        let a = graph.get_entity("m.A").unwrap();
        assert_eq!(names(&engine.related_entities(a)), vec!["m.A->m.B"]);
    }

    #[test]
    fn test_relation_inside_class_counts_for_class() {
        let mut graph = DesignGraph::new();
        graph.add_entity("m.A", EntityKind::Class);
        graph.add_entity("m.A.extends", EntityKind::Relation);
        graph.add_entity("m.B", EntityKind::Class);
        graph.add_containment("m.A", "m.A.extends").unwrap();
        graph.add_usage("m.A.extends", "m.A");
        graph.add_usage("m.A.extends", "m.B");

        let engine = CouplingEngine::new(&graph);
        let a = graph.get_entity("m.A").unwrap();
        let b = graph.get_entity("m.B").unwrap();
        let relation = graph.get_entity("m.A.extends").unwrap();

        assert_eq!(names(&engine.related_entities(a)), vec!["m.B"]);
        assert_eq!(names(&engine.related_entities(b)), vec!["m.A"]);
        assert_eq!(names(&engine.direct_related_entities(relation)), vec!["m.B"]);
    }

    #[test]
    fn test_enclosing_class() {
        let mut graph = package_graph();
        graph.add_entity("p.K.run().tmp", EntityKind::Relation);
        graph.add_containment("p.K.run()", "p.K.run().tmp").unwrap();
        graph.add_entity("p.loose", EntityKind::Method);
        graph.add_containment("p", "p.loose").unwrap();

        let engine = CouplingEngine::new(&graph);
        let class_of = |name: &str| {
            engine
                .enclosing_class(graph.get_entity(name).unwrap())
                .map(|e| e.qualified_name.as_str())
        };

        assert_eq!(class_of("p.K.run()"), Some("p.K"));
        assert_eq!(class_of("p.K.count"), Some("p.K"));
        assert_eq!(class_of("p.K.run().tmp"), Some("p.K"));
        assert_eq!(class_of("p.K"), None);
        assert_eq!(class_of("p"), None);
        assert_eq!(class_of("p.loose"), None);
    }

    #[test]
    fn test_repeated_queries_are_equal() {
        let graph = package_graph();
        let engine = CouplingEngine::new(&graph);
        let p = graph.get_entity("p").unwrap();

        let first = engine.related_entities(p);
        let second = engine.related_entities(p);
        assert_eq!(first, second);
    }

    #[test]
    fn test_usage_cycles_terminate() {
        let mut graph = DesignGraph::new();
        class_with_field(&mut graph, "m.A", "b", "m.B");
        class_with_field(&mut graph, "m.B", "a", "m.A");

        let engine = CouplingEngine::new(&graph);
        let a = graph.get_entity("m.A").unwrap();
        assert_eq!(names(&engine.related_entities(a)), vec!["m.B"]);
    }

    #[test]
    fn test_sorted_by_name() {
        let graph = package_graph();
        let engine = CouplingEngine::new(&graph);
        let p = graph.get_entity("p").unwrap();

        let sorted = sorted_by_name(&engine.related_entities(p));
        let sorted_names: Vec<&str> = sorted.iter().map(|e| e.qualified_name.as_str()).collect();
        assert_eq!(sorted_names, vec!["q.Q", "x.X"]);
    }
}
