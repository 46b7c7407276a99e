//! Efferent coupling (Ce).
//!
//! Ce counts the distinct entities a design entity is coupled to through
//! usage relations. The uses relationship can go either way: both uses and
//! used-by relations are taken into account, each related entity only once.
//! Members of the entity's own containment subtree are never counted.

use tracing::debug;

use super::engine::CouplingEngine;
use super::Metric;
use crate::design::{DesignEntity, DesignProvider};

/// The Ce metric, backed by a [`CouplingEngine`].
pub struct EfferentCouplingMetric<'g, P: ?Sized> {
    engine: CouplingEngine<'g, P>,
}

impl<'g, P: DesignProvider + ?Sized> EfferentCouplingMetric<'g, P> {
    /// Creates the metric over `provider`.
    pub fn new(provider: &'g P) -> Self {
        Self::with_engine(CouplingEngine::new(provider))
    }

    /// Creates the metric sharing an existing engine.
    pub fn with_engine(engine: CouplingEngine<'g, P>) -> Self {
        Self { engine }
    }
}

impl<P: DesignProvider + ?Sized> Metric for EfferentCouplingMetric<'_, P> {
    fn abbreviation(&self) -> &'static str {
        "Ce"
    }

    fn name(&self) -> &'static str {
        "Efferent Coupling"
    }

    fn calculate(&self, entity: Option<&DesignEntity>) -> usize {
        let Some(entity) = entity else {
            return 0;
        };

        let value = self.engine.related_entities(entity).len();
        debug!(entity = %entity.qualified_name, ce = value, "Computed efferent coupling");
        value
    }
}
