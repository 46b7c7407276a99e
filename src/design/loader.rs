//! Loader for JSON design documents.
//!
//! This module reads a [`DesignDocument`] produced by an extractor, checks
//! that it describes a well-formed design and builds a [`DesignGraph`]
//! from it.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::graph::DesignGraph;
use super::types::DesignDocument;

/// Errors that can occur while loading a design document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Failed to read the file from disk.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse JSON content.
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The document does not describe a well-formed design.
    #[error("Invalid design: {0}")]
    Invalid(String),
}

/// Result type alias for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Parses a design document from a file path.
pub fn parse_file(path: &Path) -> LoadResult<DesignDocument> {
    let content = fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parses a design document from a string.
///
/// # Example
///
/// ```
/// use designmetrics::design::loader::parse_str;
///
/// let json = r#"{"name": "shop", "entities": [{"name": "shop", "kind": "package"}]}"#;
/// let doc = parse_str(json).unwrap();
/// assert_eq!(doc.name.as_deref(), Some("shop"));
/// ```
pub fn parse_str(content: &str) -> LoadResult<DesignDocument> {
    let doc: DesignDocument = serde_json::from_str(content)?;
    Ok(doc)
}

/// Validates a parsed design document.
///
/// Rejects duplicate entity names, parents or usage endpoints that name no
/// entity, and containment cycles.
pub fn validate(doc: &DesignDocument) -> LoadResult<()> {
    let mut parents: HashMap<&str, Option<&str>> = HashMap::with_capacity(doc.entities.len());
    for record in &doc.entities {
        if parents
            .insert(record.name.as_str(), record.parent.as_deref())
            .is_some()
        {
            return Err(LoadError::Invalid(format!(
                "duplicate entity '{}'",
                record.name
            )));
        }
    }

    for record in &doc.entities {
        if let Some(parent) = record.parent.as_deref() {
            if parent == record.name {
                return Err(LoadError::Invalid(format!(
                    "entity '{}' contains itself",
                    record.name
                )));
            }
            if !parents.contains_key(parent) {
                return Err(LoadError::Invalid(format!(
                    "entity '{}' names unknown parent '{}'",
                    record.name, parent
                )));
            }
        }
    }

    for usage in &doc.usages {
        for endpoint in [&usage.from, &usage.to] {
            if !parents.contains_key(endpoint.as_str()) {
                return Err(LoadError::Invalid(format!(
                    "usage '{}' -> '{}' names unknown entity '{}'",
                    usage.from, usage.to, endpoint
                )));
            }
        }
    }

    // Each entity has at most one parent, so a cycle shows up as a parent
    // chain that revisits an entity.
    let mut acyclic: HashSet<&str> = HashSet::new();
    for record in &doc.entities {
        let mut chain: HashSet<&str> = HashSet::new();
        let mut current = Some(record.name.as_str());
        while let Some(name) = current {
            if acyclic.contains(name) {
                break;
            }
            if !chain.insert(name) {
                return Err(LoadError::Invalid(format!(
                    "containment cycle through '{}'",
                    name
                )));
            }
            current = parents.get(name).copied().flatten();
        }
        acyclic.extend(chain);
    }

    Ok(())
}

/// Builds a design graph from a document, validating it first.
///
/// Entities are added in declaration order, so children are reported in
/// the order the document lists them.
pub fn build_graph(doc: &DesignDocument) -> LoadResult<DesignGraph> {
    validate(doc)?;

    let mut graph = DesignGraph::with_capacity(
        doc.entities.len(),
        doc.entities.len() + doc.usages.len(),
    );
    for record in &doc.entities {
        graph.add_entity(&record.name, record.kind);
    }
    for record in &doc.entities {
        if let Some(parent) = record.parent.as_deref() {
            graph
                .add_containment(parent, &record.name)
                .map_err(|e| LoadError::Invalid(e.to_string()))?;
        }
    }
    for usage in &doc.usages {
        if !graph.add_usage(&usage.from, &usage.to) {
            warn!(from = %usage.from, to = %usage.to, "Skipping usage between unknown entities");
        }
    }

    info!(
        design = doc.name.as_deref().unwrap_or("<unnamed>"),
        entities = graph.entity_count(),
        usages = graph.usage_count(),
        "Loaded design graph"
    );
    Ok(graph)
}

/// Reads, validates and builds a design graph from a file.
pub fn load_file(path: &Path) -> LoadResult<DesignGraph> {
    let doc = parse_file(path)?;
    build_graph(&doc)
}
