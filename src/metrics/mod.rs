//! Design-quality metrics over object-oriented designs.
//!
//! This module provides the coupling engine and the metrics derived from
//! it. Every metric implements [`Metric`]: it maps an optional design
//! entity to a count, and an absent entity always counts as zero.
//!
//! # Supported Metrics
//!
//! - **Ce** (efferent coupling) - Fully supported
//!
//! # Example
//!
//! ```rust
//! use designmetrics::design::{DesignGraph, DesignProvider, EntityKind};
//! use designmetrics::metrics::Coupling;
//!
//! let mut graph = DesignGraph::new();
//! graph.add_entity("shop.Cart", EntityKind::Class);
//! graph.add_entity("shop.Item", EntityKind::Class);
//! graph.add_usage("shop.Cart", "shop.Item");
//!
//! let coupling = Coupling::new(&graph);
//! let cart = graph.lookup("shop.Cart").unwrap();
//! assert_eq!(coupling.efferent_coupling(Some(cart)), 1);
//! assert_eq!(coupling.efferent_coupling(None), 0);
//! ```

pub mod coupling;
pub mod efferent;
pub mod engine;

use crate::design::DesignEntity;

// Re-export main types for convenience
pub use coupling::Coupling;
pub use efferent::EfferentCouplingMetric;
pub use engine::{sorted_by_name, CouplingEngine};

/// A named scalar metric over design entities.
pub trait Metric {
    /// Short identifier used in reports (e.g., "Ce").
    fn abbreviation(&self) -> &'static str;

    /// Human-readable metric name.
    fn name(&self) -> &'static str;

    /// Computes the metric; `None` yields 0.
    fn calculate(&self, entity: Option<&DesignEntity>) -> usize;
}
