//! Path-based insertion and lookup.

use serde_json::Value;

use super::{Map, Node, Object};
use crate::{ConfigError, Origin, StrataResult};

fn join(segments: &[&str], separator: &str) -> String {
    segments.join(separator)
}

fn parse_index(segment: &str, walked: &[&str], separator: &str) -> StrataResult<usize> {
    segment.parse().map_err(|_| ConfigError::InvalidIndex {
        path: join(walked, separator),
        segment: segment.to_owned(),
    })
}

impl Object {
    /// Insert `value` at the dotted `key`, creating intermediate maps.
    ///
    /// `key` is split on `delimiter`. Segments beneath an array must be an
    /// existing index (replace) or exactly the array length (append). A value
    /// node in the middle of the path is replaced by a map. New nodes, both
    /// intermediate and leaf, carry `origins`.
    ///
    /// Intermediate maps created before a failing segment are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidIndex`] for a non-numeric segment under an
    /// array and [`ConfigError::ArrayOutOfBounds`] for an index past the end.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use strata_config::Object;
    ///
    /// let mut tree = Object::default();
    /// tree.add(".", "Foo.Bar", json!("abc"), &[])?;
    /// assert_eq!(tree.to_raw(), json!({"Foo": {"Bar": "abc"}}));
    /// # Ok::<_, strata_config::ConfigError>(())
    /// ```
    pub fn add(
        &mut self,
        delimiter: &str,
        key: &str,
        value: Value,
        origins: &[Origin],
    ) -> StrataResult<()> {
        let segments: Vec<&str> = key.split(delimiter).collect();
        let leaf = Self::from_raw(value, origins);
        insert(self, &segments, 0, leaf, origins, delimiter)
    }

    /// Look up the node at `path`, split on `separator`.
    ///
    /// An empty path returns `self`.
    ///
    /// # Errors
    ///
    /// See [`Object::fetch_segments`].
    pub fn fetch(&self, path: &str, separator: &str) -> StrataResult<&Self> {
        if path.is_empty() {
            return Ok(self);
        }
        let segments: Vec<&str> = path.split(separator).collect();
        self.fetch_segments(&segments, separator)
    }

    /// Look up the node reached by walking `segments`.
    ///
    /// Map nodes are indexed by key and array nodes by numeric index.
    /// `separator` is only used to render paths in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] when a key is missing or a value node
    /// is traversed, [`ConfigError::InvalidIndex`] when an array segment is
    /// not numeric and [`ConfigError::ArrayOutOfBounds`] when it is past the
    /// end of the array.
    pub fn fetch_segments<S: AsRef<str>>(
        &self,
        segments: &[S],
        separator: &str,
    ) -> StrataResult<&Self> {
        let mut current = self;
        let mut walked: Vec<&str> = Vec::with_capacity(segments.len());
        for segment in segments {
            let segment = segment.as_ref();
            current = match &current.node {
                Node::Map(map) => map.get(segment).ok_or_else(|| {
                    walked.push(segment);
                    ConfigError::not_found(join(&walked, separator))
                })?,
                Node::Array(items) => {
                    let index = parse_index(segment, &walked, separator)?;
                    items.get(index).ok_or_else(|| ConfigError::ArrayOutOfBounds {
                        path: join(&walked, separator),
                        index,
                        len: items.len(),
                    })?
                }
                Node::Value(_) => {
                    walked.push(segment);
                    return Err(ConfigError::not_found(join(&walked, separator)));
                }
            };
            walked.push(segment);
        }
        Ok(current)
    }
}

fn insert(
    node: &mut Object,
    segments: &[&str],
    depth: usize,
    leaf: Object,
    origins: &[Origin],
    delimiter: &str,
) -> StrataResult<()> {
    let Some(segment) = segments.get(depth).copied() else {
        *node = leaf;
        return Ok(());
    };
    let fresh = || Object::default().with_origins(origins.to_vec());
    let child = match &mut node.node {
        Node::Array(items) => {
            let walked = segments.get(..depth).unwrap_or_default();
            let index = parse_index(segment, walked, delimiter)?;
            if index > items.len() {
                return Err(ConfigError::ArrayOutOfBounds {
                    path: join(walked, delimiter),
                    index,
                    len: items.len(),
                });
            }
            if index == items.len() {
                items.push(fresh());
            }
            let len = items.len();
            items.get_mut(index).ok_or_else(|| ConfigError::ArrayOutOfBounds {
                path: join(walked, delimiter),
                index,
                len,
            })?
        }
        Node::Map(map) => map.entry(segment.to_owned()).or_insert_with(fresh),
        Node::Value(_) => {
            // A scalar in the way is overwritten by a map.
            let mut child = fresh();
            insert(&mut child, segments, depth + 1, leaf, origins, delimiter)?;
            node.node = Node::Map(Map::from([(segment.to_owned(), child)]));
            return Ok(());
        }
    };
    insert(child, segments, depth + 1, leaf, origins, delimiter)
}
