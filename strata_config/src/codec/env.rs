//! Environment variables as a configuration source.
//!
//! Wraps `figment::providers::Env` for prefix filtering and key mapping, then
//! builds an origin-annotated tree from the selected variables. Values
//! containing commas become arrays unless they look like structured data
//! (starting with `[`, `{` or a quote). Bracketed and quoted values are parsed
//! as JSON; everything else goes through [`Scalar::infer`].

use std::fmt;

use figment::providers::Env;
use serde_json::Value;

use crate::{Object, Origin, Scalar, StrataResult};

/// Environment source with CSV list support.
///
/// Keys are lowercased and nested on `.` once the split pattern has been
/// applied, so `APP_DB__PORT=5432` read through
/// `EnvSource::prefixed("APP_").split("__")` yields `{"db": {"port": 5432}}`.
#[derive(Clone)]
pub struct EnvSource {
    inner: Env,
}

impl EnvSource {
    /// Read every variable in the environment.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use strata_config::codec::EnvSource;
    /// let tree = EnvSource::raw().read()?;
    /// # Ok::<_, strata_config::ConfigError>(())
    /// ```
    #[must_use]
    pub fn raw() -> Self {
        Env::raw().into()
    }

    /// Read variables starting with `prefix`, with the prefix removed.
    #[must_use]
    pub fn prefixed(prefix: &str) -> Self {
        Env::prefixed(prefix).into()
    }

    /// Nest keys at `pattern`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use strata_config::codec::EnvSource;
    /// // APP_DB__PORT=5432 becomes db.port
    /// let tree = EnvSource::prefixed("APP_").split("__").read()?;
    /// println!("{}", tree.fetch("db.port", ".")?.to_raw());
    /// # Ok::<_, strata_config::ConfigError>(())
    /// ```
    #[must_use]
    pub fn split(self, pattern: &str) -> Self {
        self.inner.split(pattern).into()
    }

    /// Only read the listed keys, matched after prefix removal.
    #[must_use]
    pub fn only(self, keys: &[&str]) -> Self {
        self.inner.only(keys).into()
    }

    /// Skip the listed keys, matched after prefix removal.
    #[must_use]
    pub fn ignore(self, keys: &[&str]) -> Self {
        self.inner.ignore(keys).into()
    }

    /// Whether keys are lowercased before use. Enabled by default.
    #[must_use]
    pub fn lowercase(self, lowercase: bool) -> Self {
        self.inner.lowercase(lowercase).into()
    }

    /// The selected variables as `(key, value)` pairs, sorted by key.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .inner
            .iter()
            .map(|(key, value)| (key.as_str().to_owned(), value))
            .collect();
        entries.sort();
        entries
    }

    /// Build a tree from the current environment.
    ///
    /// Each value records an `env:<key>` origin. Maps whose keys are all
    /// positional indices become arrays.
    ///
    /// # Errors
    ///
    /// Returns a path error when two variables address incompatible nodes,
    /// such as an index segment beneath a list value.
    pub fn read(&self) -> StrataResult<Object> {
        let mut tree = Object::default();
        for (key, raw) in self.entries() {
            let origin = Origin::new(format!("env:{key}"));
            tree.add(".", &key, parse_value(&raw), &[origin])?;
        }
        Ok(tree.convert_maps_to_arrays())
    }
}

/// Determine if a value should be split on commas rather than treated as
/// structured data.
fn should_parse_as_csv(value: &str) -> bool {
    value.contains(',') && !matches!(value.chars().next(), Some('[' | '{' | '"' | '\''))
}

fn parse_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if should_parse_as_csv(trimmed) {
        return Value::Array(
            trimmed
                .split(',')
                .map(|item| Scalar::infer(item.trim()).to_json())
                .collect(),
        );
    }
    if matches!(trimmed.chars().next(), Some('[' | '{' | '"'))
        && let Ok(value) = serde_json::from_str::<Value>(trimmed)
    {
        return value;
    }
    Scalar::infer(trimmed).to_json()
}

impl From<Env> for EnvSource {
    fn from(inner: Env) -> Self {
        Self { inner }
    }
}

impl fmt::Debug for EnvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvSource").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, ensure};
    use rstest::rstest;
    use serde_json::{Value, json};
    use serial_test::serial;
    use test_helpers::env;

    use super::{EnvSource, parse_value};
    use crate::Origin;

    #[rstest]
    #[case("a,b,c", json!(["a", "b", "c"]))]
    #[case("1, 2", json!([1, 2]))]
    #[case("[1, 2]", json!([1, 2]))]
    #[case("{\"a\": 1}", json!({"a": 1}))]
    #[case("\"a,b\"", json!("a,b"))]
    #[case("'a,b'", json!("'a,b'"))]
    #[case("[not json", json!("[not json"))]
    #[case("8080", json!(8080))]
    #[case("true", json!(true))]
    #[case("plain", json!("plain"))]
    fn values_are_interpreted(#[case] raw: &str, #[case] expected: Value) {
        assert_eq!(parse_value(raw), expected);
    }

    #[test]
    #[serial]
    fn prefixed_variables_become_nested_tree() -> Result<()> {
        let _scope = env::scope_with(|lock| {
            vec![
                lock.set_var("STRATA_TEST_DB__PORT", "5432"),
                lock.set_var("STRATA_TEST_DB__HOSTS", "a,b"),
                lock.set_var("STRATA_TEST_NAME", "svc"),
            ]
        });
        let tree = EnvSource::prefixed("STRATA_TEST_").split("__").read()?;
        ensure!(
            tree.to_raw() == json!({"db": {"port": 5432, "hosts": ["a", "b"]}, "name": "svc"}),
            "{:?}",
            tree.to_raw()
        );
        ensure!(tree.fetch("db.port", ".")?.origins() == [Origin::new("env:db.port")]);
        Ok(())
    }

    #[test]
    #[serial]
    fn indexed_variables_become_arrays() -> Result<()> {
        let _scope = env::scope_with(|lock| {
            vec![
                lock.set_var("STRATA_IDX_SERVERS__0__HOST", "a"),
                lock.set_var("STRATA_IDX_SERVERS__1__HOST", "b"),
            ]
        });
        let tree = EnvSource::prefixed("STRATA_IDX_").split("__").read()?;
        ensure!(tree.to_raw() == json!({"servers": [{"host": "a"}, {"host": "b"}]}));
        Ok(())
    }

    #[test]
    #[serial]
    fn ignored_keys_are_skipped() -> Result<()> {
        let _scope = env::scope_with(|lock| {
            vec![
                lock.set_var("STRATA_IGN_KEEP", "1"),
                lock.set_var("STRATA_IGN_DROP", "2"),
            ]
        });
        let tree = EnvSource::prefixed("STRATA_IGN_").ignore(&["drop"]).read()?;
        ensure!(tree.to_raw() == json!({"keep": 1}));
        Ok(())
    }
}
