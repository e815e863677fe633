//! Layered configuration trees with in-key merge commands.
//!
//! Every source (defaults, files, environment variables, programmatic
//! values) is decoded into an origin-annotated [`Object`] tree. Trees are
//! folded in priority order by [`merge`]; a key may steer how it is merged
//! with a suffix such as `hosts((prepend))` or `token((replace, secret))`.
//! Secret values survive merging and are masked by [`Object::redacted`] and
//! whenever a [`Config`] is encoded.
//!
//! ```rust
//! use serde_json::json;
//! use strata_config::{ConfigBuilder, REDACTED};
//!
//! let mut builder = ConfigBuilder::new();
//! builder
//!     .push_value(json!({"hosts": ["a"], "db": {"port": 5432}}), "defaults")
//!     .push_value(json!({"hosts((prepend))": ["z"], "password((secret))": "hunter2"}), "local");
//! let config = builder.build()?;
//!
//! assert_eq!(config.fetch("hosts")?.to_raw(), json!(["z", "a"]));
//! assert_eq!(config.redacted().fetch("password", ".")?.to_raw(), json!(REDACTED));
//! # Ok::<_, strata_config::ConfigError>(())
//! ```

pub mod codec;
pub mod command;
mod config;
mod error;
mod layer;
mod merge;
mod origin;
mod resolve;
mod result_ext;
mod tree;

pub use config::{Config, ConfigBuilder};
pub use error::{ConfigError, StrataResult};
pub use layer::{Layer, LayerProvenance};
pub use merge::merge;
pub use origin::Origin;
pub use resolve::resolve_commands;
pub use result_ext::{IoResultExt, JsonResultExt};
pub use tree::{Expansion, Kind, Map, Node, Object, REDACTED, Scalar};
