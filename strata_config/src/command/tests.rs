//! Unit tests for key command parsing.

use rstest::rstest;

use super::{Command, KeyCommand, parse_key};
use crate::ConfigError;
use crate::tree::Kind;

fn parsed(key: &str, command: Option<&str>, secret: bool) -> KeyCommand {
    KeyCommand {
        key: key.to_owned(),
        command: command.map(str::to_owned),
        secret,
    }
}

#[rstest]
#[case("foo", parsed("foo", None, false))]
#[case("foo((bar, secret))", parsed("foo", Some("bar"), true))]
#[case("foo ((replace))", parsed("foo", Some("replace"), false))]
#[case("foo((secret append))  ", parsed("foo", Some("append"), true))]
#[case("foo(( secret ))", parsed("foo", None, true))]
#[case("foo(())", parsed("foo", None, false))]
#[case("0(())0", parsed("0(())0", None, false))]
#[case("foo(bar)", parsed("foo(bar)", None, false))]
#[case("foo))", parsed("foo))", None, false))]
fn parses_keys(#[case] raw: &str, #[case] expected: KeyCommand) {
    let actual = parse_key(raw).unwrap_or_else(|err| panic!("{raw}: {err}"));
    assert_eq!(actual, expected);
}

#[rstest]
#[case("foo((secret,secret))")]
#[case("foo((replace keep))")]
#[case("foo((rep!ace))")]
#[case("a((b))((replace))")]
#[case("foo((((replace))))")]
fn rejects_malformed_commands(#[case] raw: &str) {
    let err = parse_key(raw).expect_err("command should be rejected");
    assert!(
        matches!(err, ConfigError::InvalidCommand { .. }),
        "{raw}: unexpected {err:?}"
    );
}

#[rstest]
#[case(Command::Replace, Kind::Map, true)]
#[case(Command::Splice, Kind::Map, true)]
#[case(Command::Splice, Kind::Array, false)]
#[case(Command::Append, Kind::Array, true)]
#[case(Command::Prepend, Kind::Value, false)]
#[case(Command::Keep, Kind::Value, true)]
#[case(Command::Clear, Kind::Map, false)]
fn legality_per_kind(#[case] command: Command, #[case] kind: Kind, #[case] legal: bool) {
    assert_eq!(command.applies_to(kind), legal);
}

#[test]
fn keywords_round_trip_through_from_str() {
    for command in [
        Command::Replace,
        Command::Keep,
        Command::Fail,
        Command::Append,
        Command::Prepend,
        Command::Splice,
        Command::Clear,
    ] {
        assert_eq!(command.as_str().parse::<Command>().ok(), Some(command));
    }
}

#[test]
fn unknown_keyword_is_rejected_when_applied() {
    let key = parse_key("foo((bar))").expect("parses");
    let err = key
        .command_for("foo((bar))", Kind::Value)
        .expect_err("bar is not a command");
    assert!(err.to_string().contains("unknown command `bar`"));
}
