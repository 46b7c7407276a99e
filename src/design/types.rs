//! Shared types for design graphs.
//!
//! This module defines the entities of an analyzed design (packages,
//! classes, methods, fields and reified relations) together with the
//! serializable document format a design is loaded from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorizes a design entity.
///
/// Containment and usage are queried the same way regardless of kind. The
/// coupling engine reports methods, fields and relations declared in a class
/// as that class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A package, optionally nested in another package.
    Package,

    /// A class (or interface), contained in a package.
    Class,

    /// A method, contained in a class.
    Method,

    /// A field, contained in a class.
    Field,

    /// A usage edge reified as a node by the extractor.
    Relation,
}

impl EntityKind {
    /// Returns a short label for the entity kind.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Package => "package",
            EntityKind::Class => "class",
            EntityKind::Method => "method",
            EntityKind::Field => "field",
            EntityKind::Relation => "relation",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "package" => Ok(EntityKind::Package),
            "class" => Ok(EntityKind::Class),
            "method" => Ok(EntityKind::Method),
            "field" => Ok(EntityKind::Field),
            "relation" => Ok(EntityKind::Relation),
            _ => Err(format!(
                "Unknown entity kind: '{}'. Valid kinds: package, class, method, field, relation",
                s
            )),
        }
    }
}

/// A node of the design graph.
///
/// Entities are immutable once the graph is built; two entities are equal
/// when all their fields are equal, and qualified names are unique within
/// a graph.
///
/// # Example
///
/// ```rust
/// use designmetrics::design::{DesignEntity, EntityKind};
///
/// let entity = DesignEntity::new("shop.Cart", EntityKind::Class);
/// assert_eq!(entity.qualified_name, "shop.Cart");
/// assert!(entity.containment_parent.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DesignEntity {
    /// Unique, stable identifier (e.g., "shop.Cart.total()")
    pub qualified_name: String,
    /// What sort of design element this is
    pub kind: EntityKind,
    /// Qualified name of the enclosing entity, if any
    pub containment_parent: Option<String>,
}

impl DesignEntity {
    /// Creates a new top-level entity.
    pub fn new(qualified_name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            kind,
            containment_parent: None,
        }
    }

    /// Returns true if this entity has no containment parent.
    pub fn is_top_level(&self) -> bool {
        self.containment_parent.is_none()
    }
}

impl fmt::Display for DesignEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.qualified_name, self.kind)
    }
}

/// Serialized form of a whole design, as produced by an extractor.
///
/// # Example
///
/// ```
/// use designmetrics::design::DesignDocument;
///
/// let json = r#"{"entities": [{"name": "shop", "kind": "package"}]}"#;
/// let doc: DesignDocument = serde_json::from_str(json).unwrap();
/// assert_eq!(doc.entities.len(), 1);
/// assert!(doc.usages.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DesignDocument {
    /// Optional human-readable name of the analyzed artifact set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Every entity of the design, in declaration order.
    #[serde(default)]
    pub entities: Vec<EntityRecord>,

    /// Directed usage edges (`from` uses `to`).
    #[serde(default)]
    pub usages: Vec<UsageRecord>,
}

/// One entity entry of a [`DesignDocument`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityRecord {
    /// Qualified name of the entity.
    pub name: String,

    /// Entity kind.
    pub kind: EntityKind,

    /// Qualified name of the containing entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// One usage entry of a [`DesignDocument`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageRecord {
    /// The entity doing the referencing.
    pub from: String,

    /// The entity being referenced.
    pub to: String,
}
