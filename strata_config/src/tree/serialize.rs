//! `serde::Serialize` for trees, so encoders can render them directly.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use super::{Node, Object};

/// Serialises the payload only; origins and secret flags are dropped.
impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.node {
            Node::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, child) in map {
                    out.serialize_entry(key, child)?;
                }
                out.end()
            }
            Node::Array(items) => {
                let mut out = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    out.serialize_element(item)?;
                }
                out.end()
            }
            Node::Value(scalar) => scalar.serialize(serializer),
        }
    }
}
