//! Unit tests for the tagged element reader and writer.

use crate::history::domain::{MarkupError, MessageElement, escape, is_attribute_name, unescape};
use rstest::rstest;

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn parses_element_with_attributes_and_text() {
    let element = MessageElement::parse(
        r#"<message role="tool" call_id='c-1'>done</message>"#,
        "message",
    )
    .expect("fragment should parse");

    assert_eq!(element.name(), "message");
    assert_eq!(element.attribute("role"), Some("tool"));
    assert_eq!(element.attribute("call_id"), Some("c-1"));
    assert_eq!(element.text(), "done");
    let names: Vec<_> = element.attributes().map(|(key, _)| key).collect();
    assert_eq!(names, vec!["role", "call_id"]);
}

#[test]
fn parses_self_closing_element_with_empty_text() {
    let element = MessageElement::parse(r#"<message role="user" />"#, "message")
        .expect("self-closing fragment should parse");

    assert_eq!(element.attribute("role"), Some("user"));
    assert_eq!(element.text(), "");
}

#[test]
fn parse_ignores_surrounding_whitespace_and_keeps_inner_whitespace() {
    let element = MessageElement::parse("  <message role=\"user\">  hi\n</message>\n", "message")
        .expect("fragment should parse");

    assert_eq!(element.text(), "  hi\n");
}

#[test]
fn parse_decodes_entities_in_text_and_attributes() {
    let element = MessageElement::parse(
        r#"<message role="user" note="&quot;q&quot; &amp; a">1 &lt; 2 &#38; 3 &#x3E; 2</message>"#,
        "message",
    )
    .expect("fragment should parse");

    assert_eq!(element.attribute("note"), Some("\"q\" & a"));
    assert_eq!(element.text(), "1 < 2 & 3 > 2");
}

#[rstest]
#[case::wrong_root(r#"<turn role="user">x</turn>"#)]
#[case::longer_name(r#"<messages role="user">x</messages>"#)]
#[case::not_a_tag("plain text")]
fn parse_rejects_other_roots(#[case] fragment: &str) {
    let result = MessageElement::parse(fragment, "message");
    assert!(matches!(result, Err(MarkupError::UnexpectedRoot { .. })));
}

#[rstest]
#[case::unterminated_start(r#"<message role="user""#, MarkupError::UnterminatedStartTag)]
#[case::missing_end(
    r#"<message role="user">text"#,
    MarkupError::MissingEndTag("message".to_owned())
)]
#[case::nested(r#"<message role="user">a <b>c</b></message>"#, MarkupError::NestedMarkup)]
#[case::duplicate(
    r#"<message role="user" role="tool">x</message>"#,
    MarkupError::DuplicateAttribute("role".to_owned())
)]
fn parse_reports_structural_errors(#[case] fragment: &str, #[case] expected: MarkupError) {
    assert_eq!(MessageElement::parse(fragment, "message"), Err(expected));
}

#[rstest]
#[case::unquoted(r#"<message role=user>x</message>"#)]
#[case::missing_equals(r#"<message role "user">x</message>"#)]
#[case::no_separator(r#"<message role="user"tone="calm">x</message>"#)]
#[case::unterminated_value(r#"<message role="user>x</message>"#)]
fn parse_rejects_malformed_attributes(#[case] fragment: &str) {
    let result = MessageElement::parse(fragment, "message");
    assert!(
        matches!(result, Err(MarkupError::MalformedAttribute(_))),
        "unexpected result {result:?}"
    );
}

#[test]
fn parse_rejects_mismatched_end_tag() {
    let result = MessageElement::parse(r#"<message role="user">x</msg>"#, "message");
    assert!(matches!(result, Err(MarkupError::MismatchedEndTag { .. })));
}

#[rstest]
#[case(r#"<message role="user">x</message>tail"#)]
#[case(r#"<message role="user"/>tail"#)]
fn parse_rejects_trailing_content(#[case] fragment: &str) {
    let result = MessageElement::parse(fragment, "message");
    assert!(matches!(result, Err(MarkupError::TrailingContent(_))));
}

// ============================================================================
// Entities
// ============================================================================

#[rstest]
#[case("a & b")]
#[case("&bogus;")]
#[case("&#xZZ;")]
#[case("&#1114112;")]
fn unescape_rejects_invalid_references(#[case] text: &str) {
    assert!(matches!(unescape(text), Err(MarkupError::InvalidEntity(_))));
}

#[test]
fn escape_only_quotes_in_attributes() {
    assert_eq!(escape(r#"<a href="x">&"#, false), r#"&lt;a href="x"&gt;&amp;"#);
    assert_eq!(escape(r#"say "hi""#, true), "say &quot;hi&quot;");
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn render_escapes_and_parses_back() {
    let element = MessageElement::new("message")
        .with_attribute("role", "user")
        .with_attribute("note", "a \"quoted\" <value>")
        .with_text("if a < b && c > d");

    let rendered = element.render();
    assert_eq!(
        rendered,
        r#"<message role="user" note="a &quot;quoted&quot; &lt;value&gt;">if a &lt; b &amp;&amp; c &gt; d</message>"#
    );
    assert_eq!(MessageElement::parse(&rendered, "message"), Ok(element));
}

#[test]
fn with_attribute_replaces_existing_value() {
    let element = MessageElement::new("message")
        .with_attribute("role", "user")
        .with_attribute("role", "tool");

    assert_eq!(element.attribute("role"), Some("tool"));
    assert_eq!(element.attributes().count(), 1);
}

#[rstest]
#[case::plain("source", true)]
#[case::namespaced("xml:lang", true)]
#[case::dashed("call-id", true)]
#[case::empty("", false)]
#[case::spaced("two words", false)]
#[case::quoted("a\"b", false)]
fn attribute_names_follow_the_reader(#[case] name: &str, #[case] valid: bool) {
    assert_eq!(is_attribute_name(name), valid);
}
