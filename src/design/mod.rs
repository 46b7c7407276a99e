//! Design module for the analyzed software model.
//!
//! This module provides the [`DesignProvider`] query interface consumed by
//! the coupling engine, the in-memory [`DesignGraph`] implementing it, and a
//! loader for JSON design documents produced by an extractor.
//!
//! # Example
//!
//! ```rust
//! use designmetrics::design::{loader, DesignProvider};
//!
//! let json = r#"{
//!     "entities": [
//!         {"name": "shop", "kind": "package"},
//!         {"name": "shop.Cart", "kind": "class", "parent": "shop"}
//!     ]
//! }"#;
//! let doc = loader::parse_str(json).unwrap();
//! let graph = loader::build_graph(&doc).unwrap();
//!
//! let cart = graph.lookup("shop.Cart").unwrap();
//! assert_eq!(cart.containment_parent.as_deref(), Some("shop"));
//! ```

mod graph;
pub mod loader;
pub mod types;

pub use graph::{DesignError, DesignGraph, DesignProvider, DesignResult, EdgeKind};
pub use loader::{LoadError, LoadResult};
pub use types::{DesignDocument, DesignEntity, EntityKind, EntityRecord, UsageRecord};
