//! Unit tests for `Config` and `ConfigBuilder`.

use std::sync::Arc;

use anyhow::{Result, ensure};
use rstest::{fixture, rstest};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Config, ConfigBuilder};
use crate::codec::{CodecRegistry, DecodeContext, Decoder};
use crate::{ConfigError, Expansion, Object, Origin, StrataResult};

#[derive(Debug, Deserialize, PartialEq, Serialize)]
struct Database {
    host: String,
    port: u16,
}

#[fixture]
fn layered() -> Config {
    let mut builder = ConfigBuilder::new();
    builder
        .push_value(
            json!({"db": {"host": "localhost", "port": 5432}, "hosts": ["a"]}),
            "defaults",
        )
        .push_bytes(
            "site.json",
            br#"{"db": {"port": 6543}, "hosts": ["b"], "token((secret))": "t0ps3cret"}"#
                .as_slice(),
        );
    builder.build().expect("layers merge")
}

#[rstest]
fn later_layers_win(layered: Config) -> Result<()> {
    ensure!(layered.fetch("db.port")?.to_raw() == json!(6543));
    ensure!(layered.fetch("hosts")?.to_raw() == json!(["a", "b"]));
    ensure!(layered.fetch("db.port")?.origins() == [Origin::new("site.json")]);
    ensure!(layered.fetch("db.host")?.origins() == [Origin::new("defaults")]);
    Ok(())
}

#[rstest]
fn unmarshal_reads_subtrees(layered: Config) -> Result<()> {
    let db: Database = layered.unmarshal("db")?;
    ensure!(
        db == Database {
            host: "localhost".into(),
            port: 6543
        }
    );
    let hosts: Vec<String> = layered.unmarshal("hosts")?;
    ensure!(hosts == ["a", "b"]);
    Ok(())
}

#[rstest]
fn unmarshal_reports_type_mismatches(layered: Config) {
    let err = layered
        .unmarshal::<Database>("hosts")
        .expect_err("an array is not a database");
    assert!(
        matches!(err, ConfigError::Unmarshal { ref path, .. } if path == "hosts"),
        "{err:?}"
    );
    let err = layered.unmarshal::<u16>("db.missing").expect_err("no such key");
    assert!(err.is_path_error(), "{err:?}");
}

#[rstest]
fn encoding_redacts_secrets(layered: Config) -> Result<()> {
    let rendered: serde_json::Value = serde_json::from_slice(&layered.encode("json")?)?;
    ensure!(rendered.get("token") == Some(&json!(crate::REDACTED)));
    ensure!(layered.tree().fetch("token", ".")?.to_raw() == json!("t0ps3cret"));

    let extended = String::from_utf8(layered.encode_extended("properties")?)?;
    ensure!(extended.contains("token = REDACTED # site.json"), "{extended}");
    ensure!(!extended.contains("t0ps3cret"));
    Ok(())
}

#[rstest]
fn set_replaces_and_records_origin(mut layered: Config) -> Result<()> {
    layered.set("db.port", json!(7000))?;
    ensure!(layered.fetch("db.port")?.to_raw() == json!(7000));
    ensure!(layered.fetch("db.port")?.origins() == [Origin::new("set")]);

    layered.set("extra", json!({"key((secret))": "k"}))?;
    ensure!(layered.fetch("extra.key")?.is_secret());
    Ok(())
}

#[rstest]
fn failed_set_leaves_config_untouched(mut layered: Config) {
    let before = layered.tree().clone();
    let err = layered
        .set("hosts.7", json!("z"))
        .expect_err("index past the end");
    assert!(matches!(err, ConfigError::ArrayOutOfBounds { .. }), "{err:?}");
    assert_eq!(layered.tree(), &before);
}

#[rstest]
fn apply_merges_with_commands(mut layered: Config) -> Result<()> {
    layered.apply(Object::from_raw(json!({"hosts((replace))": ["only"]}), &[]))?;
    ensure!(layered.fetch("hosts")?.to_raw() == json!(["only"]));

    let err = layered
        .apply(Object::from_raw(json!({"hosts((fail))": ["x"]}), &[]))
        .expect_err("fail conflicts");
    ensure!(matches!(err, ConfigError::Conflict { .. }));
    ensure!(layered.fetch("hosts")?.to_raw() == json!(["only"]));
    Ok(())
}

#[test]
fn custom_delimiter_applies_to_fetch_and_flat_keys() -> Result<()> {
    let mut builder = Config::builder();
    builder
        .delimiter("/")
        .push_bytes("app.properties", b"db/port = 1\nlog.level = info\n".as_slice());
    let config = builder.build()?;
    ensure!(config.delimiter() == "/");
    ensure!(config.fetch("db/port")?.to_raw() == json!(1));
    ensure!(config.fetch("log.level")?.to_raw() == json!("info"));
    Ok(())
}

#[test]
fn defaults_come_from_serialisable_values() -> Result<()> {
    let mut builder = ConfigBuilder::new();
    builder.push_defaults(&Database {
        host: "db".into(),
        port: 1,
    })?;
    let config = builder.build()?;
    ensure!(config.fetch("host")?.origins() == [Origin::new("defaults")]);
    Ok(())
}

#[test]
fn expansion_runs_after_merging() -> Result<()> {
    let mut builder = ConfigBuilder::new();
    builder
        .push_value(json!({"url": "http://${{ HOST }}:${{ PORT }}/"}), "defaults")
        .push_value(json!({"other": "${{ MISSING }}"}), "site")
        .expand(Expansion::default(), |name| match name {
            "HOST" => Some("example.org".to_owned()),
            "PORT" => Some("8080".to_owned()),
            _ => None,
        });
    let config = builder.build()?;
    let url = config.fetch("url")?;
    ensure!(url.to_raw() == json!("http://example.org:8080/"));
    ensure!(url.origins() == [Origin::new("defaults"), Origin::new("expanded")]);
    ensure!(config.fetch("other")?.to_raw() == json!("${{ MISSING }}"));
    Ok(())
}

#[test]
fn clear_layer_resets_earlier_layers() -> Result<()> {
    let mut builder = ConfigBuilder::new();
    builder
        .push_value(json!({"a": 1}), "first")
        .push_value(json!({"reset((clear))": true, "b": 2}), "second")
        .push_value(json!({"c": 3}), "third");
    let config = builder.build()?;
    ensure!(config.tree().to_raw() == json!({"c": 3}));
    Ok(())
}

struct Upper;

impl Decoder for Upper {
    fn decode(&self, ctx: &DecodeContext<'_>, bytes: &[u8]) -> StrataResult<Object> {
        let text = String::from_utf8_lossy(bytes).to_uppercase();
        Ok(Object::from_raw(json!({"text": text}), &[ctx.origin()]))
    }
}

#[test]
fn custom_registries_decode_custom_formats() -> Result<()> {
    let registry = Arc::new(CodecRegistry::new());
    registry.register_decoder("txt", Upper);
    let mut builder = ConfigBuilder::new();
    builder.registry(registry).push_bytes("note.txt", b"hi".as_slice());
    let config = builder.build()?;
    ensure!(config.fetch("text")?.to_raw() == json!("HI"));

    let err = config.encode("json").expect_err("no encoders registered");
    ensure!(matches!(err, ConfigError::UnknownFormat { .. }));
    Ok(())
}
