//! The configuration tree.
//!
//! An [`Object`] is a node in a recursive tree whose payload is a [`Node`]:
//! a map of resolved keys, an ordered array, or a single [`Scalar`]. Every
//! node also records the [`Origin`]s it was built from and whether it holds a
//! secret. Decoders produce one tree per source; the merge engine folds those
//! trees into the final configuration.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use strata_config::{Object, Origin};
//!
//! let mut tree = Object::default();
//! tree.add(".", "server.port", json!(8080), &[Origin::new("defaults")])?;
//! assert_eq!(tree.to_raw(), json!({"server": {"port": 8080}}));
//! assert_eq!(tree.fetch("server.port", ".")?.origins()[0].file, "defaults");
//! # Ok::<_, strata_config::ConfigError>(())
//! ```

mod arrays;
mod expand;
mod path;
mod raw;
mod scalar;
mod serialize;

use std::collections::BTreeMap;

pub use expand::{Expansion, REDACTED};
pub use scalar::Scalar;

use crate::Origin;

/// Render a diagnostic path; segments are always joined with `.`.
pub(crate) fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_owned()
    } else {
        format!("{parent}.{key}")
    }
}

/// Children of a map node, keyed by resolved key.
pub type Map = BTreeMap<String, Object>;

/// Discriminant of a [`Node`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    /// Keyed children.
    Map,
    /// Ordered children.
    Array,
    /// A single scalar.
    Value,
}

/// Payload of a tree node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Keyed children.
    Map(Map),
    /// Ordered children.
    Array(Vec<Object>),
    /// A single scalar.
    Value(Scalar),
}

impl Node {
    /// Returns the discriminant of this payload.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Map(_) => Kind::Map,
            Self::Array(_) => Kind::Array,
            Self::Value(_) => Kind::Value,
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::Map(Map::new())
    }
}

/// A configuration tree node.
///
/// The default `Object` is an empty map with no origins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Object {
    node: Node,
    origins: Vec<Origin>,
    secret: bool,
}

impl Object {
    /// Construct a node from a payload with no origins.
    #[must_use]
    pub const fn new(node: Node) -> Self {
        Self {
            node,
            origins: Vec::new(),
            secret: false,
        }
    }

    /// Construct a map node.
    #[must_use]
    pub const fn from_map(map: Map) -> Self {
        Self::new(Node::Map(map))
    }

    /// Construct an array node.
    #[must_use]
    pub const fn from_array(items: Vec<Self>) -> Self {
        Self::new(Node::Array(items))
    }

    /// Construct a value node.
    #[must_use]
    pub fn from_scalar(value: impl Into<Scalar>) -> Self {
        Self::new(Node::Value(value.into()))
    }

    /// Replace the origins of this node.
    #[must_use]
    pub fn with_origins(mut self, origins: Vec<Origin>) -> Self {
        self.origins = origins;
        self
    }

    /// Set the secret flag of this node.
    #[must_use]
    pub fn with_secret(mut self, secret: bool) -> Self {
        self.secret = secret;
        self
    }

    /// Returns the kind of this node.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.node.kind()
    }

    /// Borrow the payload.
    #[must_use]
    pub const fn node(&self) -> &Node {
        &self.node
    }

    /// Mutably borrow the payload.
    pub const fn node_mut(&mut self) -> &mut Node {
        &mut self.node
    }

    /// Origins recorded for this node, oldest first.
    #[must_use]
    pub fn origins(&self) -> &[Origin] {
        &self.origins
    }

    /// Whether the node holds a secret.
    #[must_use]
    pub const fn is_secret(&self) -> bool {
        self.secret
    }

    /// Mark or unmark the node as secret.
    pub const fn set_secret(&mut self, secret: bool) {
        self.secret = secret;
    }

    /// Append an origin.
    pub fn push_origin(&mut self, origin: Origin) {
        self.origins.push(origin);
    }

    /// Returns the map children, if this is a map.
    #[must_use]
    pub const fn as_map(&self) -> Option<&Map> {
        match &self.node {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the array items, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match &self.node {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the scalar, if this is a value.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match &self.node {
            Node::Value(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Look up a direct child of a map node.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Returns `true` for an empty map or array. Values are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.node {
            Node::Map(map) => map.is_empty(),
            Node::Array(items) => items.is_empty(),
            Node::Value(_) => false,
        }
    }

    /// Decompose into payload, origins and secret flag.
    #[must_use]
    pub fn into_parts(self) -> (Node, Vec<Origin>, bool) {
        (self.node, self.origins, self.secret)
    }
}

impl From<Scalar> for Object {
    fn from(value: Scalar) -> Self {
        Self::new(Node::Value(value))
    }
}

#[cfg(test)]
mod tests;
