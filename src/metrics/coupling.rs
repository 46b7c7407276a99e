//! Coupling façade.
//!
//! [`Coupling`] is the entry point reporting layers use: it exposes the
//! Ce value of an entity together with the related-entity sets behind it.

use std::collections::HashSet;

use super::efferent::EfferentCouplingMetric;
use super::engine::CouplingEngine;
use super::Metric;
use crate::design::{DesignEntity, DesignProvider, DesignResult};

/// Coupling metrics over one design.
///
/// # Example
///
/// ```rust
/// use designmetrics::design::{DesignError, DesignGraph, EntityKind};
/// use designmetrics::metrics::Coupling;
///
/// let mut graph = DesignGraph::new();
/// graph.add_entity("m.A", EntityKind::Class);
/// graph.add_entity("m.B", EntityKind::Class);
/// graph.add_usage("m.B", "m.A");
///
/// let coupling = Coupling::new(&graph);
/// assert_eq!(coupling.efferent_coupling_of("m.B").unwrap(), 1);
/// assert!(matches!(
///     coupling.efferent_coupling_of("m.Missing"),
///     Err(DesignError::NotFound(_))
/// ));
/// ```
pub struct Coupling<'g, P: ?Sized> {
    engine: CouplingEngine<'g, P>,
    efferent: EfferentCouplingMetric<'g, P>,
}

impl<'g, P: DesignProvider + ?Sized> Coupling<'g, P> {
    /// Creates the façade over `provider`.
    pub fn new(provider: &'g P) -> Self {
        let engine = CouplingEngine::new(provider);
        Self {
            engine,
            efferent: EfferentCouplingMetric::with_engine(engine),
        }
    }

    /// Efferent coupling of `entity`; 0 when `entity` is `None`.
    pub fn efferent_coupling(&self, entity: Option<&DesignEntity>) -> usize {
        self.efferent.calculate(entity)
    }

    /// Resolves `qualified_name` and returns its efferent coupling.
    ///
    /// An unknown name is a lookup failure, never a silent 0.
    pub fn efferent_coupling_of(&self, qualified_name: &str) -> DesignResult<usize> {
        let entity = self.engine.provider().lookup(qualified_name)?;
        Ok(self.efferent_coupling(Some(entity)))
    }

    /// Entities related to `entity` by edges incident on it directly.
    pub fn direct_related_entities(&self, entity: &DesignEntity) -> HashSet<&'g DesignEntity> {
        self.engine.direct_related_entities(entity)
    }

    /// Entities related to `entity` or its members, excluding its members.
    pub fn related_entities(&self, entity: &DesignEntity) -> HashSet<&'g DesignEntity> {
        self.engine.related_entities(entity)
    }

    /// The metrics this façade computes.
    pub fn metrics(&self) -> [&dyn Metric; 1] {
        [&self.efferent]
    }
}
