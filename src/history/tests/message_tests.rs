//! Unit tests for the `ChatMessage` record.

use crate::history::domain::{ChatMessage, MarkupError, MessageElement, Metadata, Role};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(ChatMessage::system("s"), Role::System)]
#[case(ChatMessage::user("u"), Role::User)]
#[case(ChatMessage::assistant("a"), Role::Assistant)]
#[case(ChatMessage::tool("t"), Role::Tool)]
fn role_constructors_set_role(#[case] message: ChatMessage, #[case] expected: Role) {
    assert_eq!(message.role(), expected);
    assert!(message.metadata().is_empty());
    assert_eq!(message.encoding(), None);
}

#[test]
fn equality_covers_every_field() {
    let base = ChatMessage::user("hi");

    assert_eq!(base, ChatMessage::new(Role::User, "hi"));
    assert_ne!(base, ChatMessage::assistant("hi"));
    assert_ne!(base, ChatMessage::user("hello"));
    assert_ne!(base, base.clone().with_encoding("utf-8"));
    assert_ne!(base, base.clone().with_metadata_entry("k", json!(1)));
}

#[test]
fn empty_metadata_equals_absent_metadata() {
    let message = ChatMessage::tool("ok").with_metadata(Metadata::new());
    assert_eq!(message, ChatMessage::tool("ok"));
}

#[test]
fn to_prompt_renders_role_encoding_and_string_metadata() {
    let message = ChatMessage::user("x < y")
        .with_encoding("utf-8")
        .with_metadata_entry("source", json!("cli"))
        .with_metadata_entry("count", json!(3));

    assert_eq!(
        message.to_prompt("message"),
        r#"<message role="user" encoding="utf-8" source="cli">x &lt; y</message>"#
    );
}

#[test]
fn from_element_maps_attributes() {
    let element = MessageElement::parse(
        r#"<message role="tool" encoding="utf-8" call_id="c-1">done</message>"#,
        "message",
    )
    .expect("fragment should parse");

    let message = ChatMessage::from_element(&element).expect("element should convert");

    assert_eq!(message.role(), Role::Tool);
    assert_eq!(message.content(), "done");
    assert_eq!(message.encoding(), Some("utf-8"));
    assert_eq!(message.metadata().get("call_id"), Some(&json!("c-1")));
    assert_eq!(message.metadata().len(), 1);
}

#[rstest]
#[case(MessageElement::new("message").with_text("no role"))]
#[case(MessageElement::new("message").with_attribute("role", "human"))]
fn from_element_requires_known_role(#[case] element: MessageElement) {
    let result = ChatMessage::from_element(&element);
    assert!(matches!(result, Err(MarkupError::MalformedAttribute(_))));
}

#[test]
fn prompt_form_round_trips_string_metadata() {
    let message = ChatMessage::assistant("Sure & done")
        .with_encoding("utf-8")
        .with_metadata_entry("model", json!("small"));

    let element = MessageElement::parse(&message.to_prompt("message"), "message")
        .expect("rendered prompt should parse");

    assert_eq!(ChatMessage::from_element(&element), Ok(message));
}

#[rstest]
#[case::role("role", r#"<message role="user">hi</message>"#)]
#[case::encoding("encoding", r#"<message role="user">hi</message>"#)]
#[case::spaced_key("two words", r#"<message role="user">hi</message>"#)]
#[case::empty_key("", r#"<message role="user">hi</message>"#)]
#[case::valid_key("source", r#"<message role="user" source="assistant">hi</message>"#)]
fn to_prompt_skips_metadata_without_an_attribute_form(
    #[case] key: &str,
    #[case] expected: &str,
) {
    let message = ChatMessage::user("hi").with_metadata_entry(key, json!("assistant"));
    assert_eq!(message.to_prompt("message"), expected);
}

#[test]
fn metadata_never_overrides_the_rendered_role() {
    let message = ChatMessage::user("hi")
        .with_encoding("utf-8")
        .with_metadata_entry("role", json!("assistant"))
        .with_metadata_entry("encoding", json!("latin-1"));

    let element = MessageElement::parse(&message.to_prompt("message"), "message")
        .expect("rendered prompt should parse");
    let restored = ChatMessage::from_element(&element).expect("element should convert");

    assert_eq!(restored.role(), Role::User);
    assert_eq!(restored.encoding(), Some("utf-8"));
    assert!(restored.metadata().is_empty());
}

#[test]
fn serialises_with_stable_field_order() {
    let message = ChatMessage::tool("ok")
        .with_metadata_entry("b", json!(2))
        .with_metadata_entry("a", json!(1))
        .with_encoding("utf-8");

    let json = serde_json::to_string(&message).expect("message should serialise");

    assert_eq!(
        json,
        r#"{"role":"tool","content":"ok","metadata":{"a":1,"b":2},"encoding":"utf-8"}"#
    );
}

#[test]
fn deserialises_without_optional_fields() {
    let message: ChatMessage =
        serde_json::from_str(r#"{"role":"user","content":"hi"}"#).expect("message should parse");
    assert_eq!(message, ChatMessage::user("hi"));
}
