//! designmetrics - Object-oriented design metrics over a static design graph
//!
//! This crate computes Chidamber & Kemerer style coupling metrics for the
//! packages, classes, methods and fields of an analyzed design, as provided
//! by an external extractor.

pub mod design;
pub mod metrics;
