//! Unit tests for Role parsing and serialisation.

use crate::history::domain::Role;
use rstest::rstest;

#[rstest]
#[case(Role::System, "system")]
#[case(Role::User, "user")]
#[case(Role::Assistant, "assistant")]
#[case(Role::Tool, "tool")]
fn role_as_str_and_display_agree(#[case] role: Role, #[case] expected: &str) {
    assert_eq!(role.as_str(), expected);
    assert_eq!(role.to_string(), expected);
    assert_eq!(Role::try_from(expected), Ok(role));
}

#[rstest]
#[case("")]
#[case("User")]
#[case("human")]
#[case(" user")]
fn role_try_from_rejects_unknown_names(#[case] input: &str) {
    let err = Role::try_from(input).expect_err("unknown role should be rejected");
    assert!(err.to_string().contains("invalid role"));
}

#[test]
fn role_serialises_lowercase() {
    let json = serde_json::to_string(&Role::Assistant).expect("role should serialise");
    assert_eq!(json, "\"assistant\"");
    let parsed: Role = serde_json::from_str("\"tool\"").expect("role should parse");
    assert_eq!(parsed, Role::Tool);
}

#[test]
fn role_from_str_parses() {
    let role: Role = "system".parse().expect("role should parse");
    assert_eq!(role, Role::System);
}
