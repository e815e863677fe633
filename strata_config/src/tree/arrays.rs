//! Normalisation of positional maps into arrays.

use super::{Map, Node, Object};

/// Keys must be exactly the decimal strings `0..n`; map keys are unique, so
/// each index appears once.
fn positional(map: &Map) -> bool {
    !map.is_empty()
        && map.keys().all(|key| {
            key.parse::<usize>()
                .is_ok_and(|index| index < map.len() && index.to_string() == *key)
        })
}

impl Object {
    /// Replace every map whose keys are exactly `"0"` to `"n-1"` with an
    /// array ordered by index, working bottom-up.
    ///
    /// Maps with gaps, duplicates in disguise (`"01"`) or no keys at all are
    /// left alone. Origins and secret flags of converted nodes are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use strata_config::Object;
    ///
    /// let tree = Object::from_raw(json!({"0": "zero", "1": "one"}), &[]);
    /// assert_eq!(tree.convert_maps_to_arrays().to_raw(), json!(["zero", "one"]));
    /// ```
    #[must_use]
    pub fn convert_maps_to_arrays(self) -> Self {
        let Self {
            node,
            origins,
            secret,
        } = self;
        let node = match node {
            Node::Map(map) => {
                let map: Map = map
                    .into_iter()
                    .map(|(key, child)| (key, child.convert_maps_to_arrays()))
                    .collect();
                if positional(&map) {
                    let mut indexed: Vec<(usize, Self)> = map
                        .into_iter()
                        .filter_map(|(key, child)| key.parse().ok().map(|i| (i, child)))
                        .collect();
                    indexed.sort_by_key(|(index, _)| *index);
                    Node::Array(indexed.into_iter().map(|(_, child)| child).collect())
                } else {
                    Node::Map(map)
                }
            }
            Node::Array(items) => Node::Array(
                items
                    .into_iter()
                    .map(Self::convert_maps_to_arrays)
                    .collect(),
            ),
            value @ Node::Value(_) => value,
        };
        Self {
            node,
            origins,
            secret,
        }
    }
}
