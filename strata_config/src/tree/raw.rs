//! Conversion between native JSON values and configuration trees.

use serde::Serialize;
use serde_json::{Map as JsonMap, Value};

use super::{Map, Node, Object, Scalar};
use crate::{ConfigError, Origin, StrataResult};

impl Object {
    /// Build a tree from a native value, stamping every node with `origins`.
    ///
    /// Arrays become [`Node::Array`], objects become [`Node::Map`] and
    /// everything else becomes a [`Node::Value`]. Keys are copied verbatim, so
    /// command syntax survives until the tree is resolved or merged.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use strata_config::{Kind, Object};
    ///
    /// let tree = Object::from_raw(json!({"hosts": ["a", "b"]}), &[]);
    /// assert_eq!(tree.get("hosts").map(Object::kind), Some(Kind::Array));
    /// ```
    #[must_use]
    pub fn from_raw(value: Value, origins: &[Origin]) -> Self {
        let node = match value {
            Value::Object(entries) => Node::Map(
                entries
                    .into_iter()
                    .map(|(key, child)| (key, Self::from_raw(child, origins)))
                    .collect(),
            ),
            Value::Array(items) => Node::Array(
                items
                    .into_iter()
                    .map(|item| Self::from_raw(item, origins))
                    .collect(),
            ),
            Value::Null => Node::Value(Scalar::Null),
            Value::Bool(b) => Node::Value(Scalar::Bool(b)),
            Value::Number(n) => Node::Value(Scalar::from_number(&n)),
            Value::String(s) => Node::Value(Scalar::String(s)),
        };
        Self::new(node).with_origins(origins.to_vec())
    }

    /// Like [`Object::from_raw`], then nest the result under `prefix`.
    ///
    /// `prefix` is split on `delimiter`; each segment wraps the tree in a
    /// single-key map carrying the same origins. An empty prefix leaves the
    /// tree unwrapped.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use strata_config::Object;
    ///
    /// let tree = Object::from_raw_with_prefix(json!(1), &[], "a.b", ".");
    /// assert_eq!(tree.to_raw(), json!({"a": {"b": 1}}));
    /// ```
    #[must_use]
    pub fn from_raw_with_prefix(
        value: Value,
        origins: &[Origin],
        prefix: &str,
        delimiter: &str,
    ) -> Self {
        let tree = Self::from_raw(value, origins);
        if prefix.is_empty() {
            return tree;
        }
        prefix.rsplit(delimiter).fold(tree, |inner, segment| {
            let mut map = Map::new();
            map.insert(segment.to_owned(), inner);
            Self::from_map(map).with_origins(origins.to_vec())
        })
    }

    /// Serialise any value through serde and build a tree from the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonSerializable`] when serde cannot represent the
    /// value, for example a map whose keys are not strings.
    pub fn from_serializable<T: Serialize + ?Sized>(
        value: &T,
        origins: &[Origin],
    ) -> StrataResult<Self> {
        let raw = serde_json::to_value(value).map_err(|e| ConfigError::NonSerializable {
            reason: e.to_string(),
        })?;
        Ok(Self::from_raw(raw, origins))
    }

    /// Strip origins and secret flags, returning the native value.
    #[must_use]
    pub fn to_raw(&self) -> Value {
        match &self.node {
            Node::Map(map) => Value::Object(
                map.iter()
                    .map(|(key, child)| (key.clone(), child.to_raw()))
                    .collect::<JsonMap<String, Value>>(),
            ),
            Node::Array(items) => Value::Array(items.iter().map(Self::to_raw).collect()),
            Node::Value(scalar) => scalar.to_json(),
        }
    }
}

impl From<&Object> for Value {
    fn from(tree: &Object) -> Self {
        tree.to_raw()
    }
}
