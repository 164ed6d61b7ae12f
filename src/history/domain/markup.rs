//! Reader and writer for the tagged message form used inside rendered prompts.
//!
//! Only the subset of XML needed for a single, flat element is understood:
//! one root element with quoted attributes and either text content or a
//! self-closing end. Nested elements, comments, and processing instructions
//! are rejected.

use thiserror::Error;

/// Element name used for tagged messages unless configured otherwise.
pub const DEFAULT_ROOT_KEY: &str = "message";

/// Errors raised while reading a tagged message fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    /// The fragment does not start with the expected element.
    #[error("expected <{expected}> element, found '{found}'")]
    UnexpectedRoot {
        /// The element name that was required.
        expected: String,
        /// The text found where the element should start.
        found: String,
    },

    /// The start tag never reached `>` or `/>`.
    #[error("unterminated start tag")]
    UnterminatedStartTag,

    /// An attribute is not of the form `name="value"`.
    #[error("malformed attribute near '{0}'")]
    MalformedAttribute(String),

    /// An attribute appears more than once.
    #[error("duplicate attribute '{0}'")]
    DuplicateAttribute(String),

    /// An entity or character reference could not be decoded.
    #[error("invalid entity reference '&{0}'")]
    InvalidEntity(String),

    /// The element text contains another element.
    #[error("nested markup is not supported")]
    NestedMarkup,

    /// The element is opened but never closed.
    #[error("missing </{0}> end tag")]
    MissingEndTag(String),

    /// The end tag names a different element.
    #[error("mismatched end tag: expected </{expected}>, found '{found}'")]
    MismatchedEndTag {
        /// The element name that was required.
        expected: String,
        /// The text found in place of the end tag.
        found: String,
    },

    /// Text follows the closed element.
    #[error("unexpected content after element: '{0}'")]
    TrailingContent(String),
}

/// A single parsed (or to-be-rendered) tagged element.
///
/// # Examples
///
/// ```
/// use parley::history::domain::MessageElement;
///
/// let element = MessageElement::parse(r#"<message role="user">1 &lt; 2</message>"#, "message")
///     .expect("well-formed fragment");
/// assert_eq!(element.attribute("role"), Some("user"));
/// assert_eq!(element.text(), "1 < 2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
}

impl MessageElement {
    /// Creates an element with no attributes and empty text.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: String::new(),
        }
    }

    /// Appends an attribute, replacing any earlier value for the same name.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let attribute_name = name.into();
        let attribute_value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(existing, _)| *existing == attribute_name)
        {
            Some(slot) => slot.1 = attribute_value,
            None => self.attributes.push((attribute_name, attribute_value)),
        }
        self
    }

    /// Sets the element text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Returns the element name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value of the named attribute, if present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns all attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the decoded element text. Self-closing elements have empty text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Renders the element with an explicit end tag, escaping text and
    /// attribute values.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.text.len() + self.name.len() * 2 + 16);
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value, true));
            out.push('"');
        }
        out.push('>');
        out.push_str(&escape(&self.text, false));
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
        out
    }

    /// Parses exactly one `<root_key ...>text</root_key>` or
    /// `<root_key .../>` element. Leading and trailing whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError`] when the fragment is not a single well-formed
    /// element named `root_key`.
    pub fn parse(fragment: &str, root_key: &str) -> Result<Self, MarkupError> {
        let mut cursor = Cursor::new(fragment.trim());
        let name = parse_open_name(&mut cursor, root_key)?;
        let mut element = Self::new(name);

        if parse_attributes(&mut cursor, &mut element.attributes)? == TagEnd::SelfClosing {
            return expect_end_of_input(&cursor).map(|()| element);
        }

        let raw_text = cursor.take_while(|character| character != '<');
        if cursor.is_at_end() {
            return Err(MarkupError::MissingEndTag(root_key.to_owned()));
        }
        element.text = unescape(raw_text)?;

        if !cursor.eat("</") {
            return Err(MarkupError::NestedMarkup);
        }
        let closing = cursor.take_while(is_name_char);
        cursor.skip_whitespace();
        if closing != root_key || !cursor.eat(">") {
            return Err(MarkupError::MismatchedEndTag {
                expected: root_key.to_owned(),
                found: preview(closing),
            });
        }
        expect_end_of_input(&cursor)?;
        Ok(element)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagEnd {
    Open,
    SelfClosing,
}

fn parse_open_name(cursor: &mut Cursor<'_>, root_key: &str) -> Result<String, MarkupError> {
    let unexpected = |found: &str| MarkupError::UnexpectedRoot {
        expected: root_key.to_owned(),
        found: preview(found),
    };
    if !cursor.eat("<") {
        return Err(unexpected(cursor.rest()));
    }
    let name = cursor.take_while(is_name_char);
    if name != root_key {
        return Err(unexpected(name));
    }
    Ok(name.to_owned())
}

fn parse_attributes(
    cursor: &mut Cursor<'_>,
    attributes: &mut Vec<(String, String)>,
) -> Result<TagEnd, MarkupError> {
    loop {
        let separated = cursor.skip_whitespace();
        if cursor.eat("/>") {
            return Ok(TagEnd::SelfClosing);
        }
        if cursor.eat(">") {
            return Ok(TagEnd::Open);
        }
        if cursor.is_at_end() {
            return Err(MarkupError::UnterminatedStartTag);
        }
        if !separated {
            return Err(MarkupError::MalformedAttribute(preview(cursor.rest())));
        }

        let (name, value) = parse_attribute(cursor)?;
        if attributes.iter().any(|(existing, _)| *existing == name) {
            return Err(MarkupError::DuplicateAttribute(name));
        }
        attributes.push((name, value));
    }
}

fn parse_attribute(cursor: &mut Cursor<'_>) -> Result<(String, String), MarkupError> {
    let start = cursor.rest();
    let malformed = || MarkupError::MalformedAttribute(preview(start));

    let name = cursor.take_while(is_name_char);
    if name.is_empty() {
        return Err(malformed());
    }
    cursor.skip_whitespace();
    if !cursor.eat("=") {
        return Err(malformed());
    }
    cursor.skip_whitespace();
    let quote = match cursor.peek() {
        Some(quote @ ('"' | '\'')) => quote,
        _ => return Err(malformed()),
    };
    cursor.advance(quote.len_utf8());
    let raw_value = cursor.take_while(|character| character != quote && character != '<');
    if !cursor.eat_char(quote) {
        return Err(malformed());
    }
    Ok((name.to_owned(), unescape(raw_value)?))
}

fn expect_end_of_input(cursor: &Cursor<'_>) -> Result<(), MarkupError> {
    if cursor.is_at_end() {
        Ok(())
    } else {
        Err(MarkupError::TrailingContent(preview(cursor.rest())))
    }
}

/// Returns `true` when `name` can be written as an attribute name.
#[must_use]
pub fn is_attribute_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char)
}

fn is_name_char(character: char) -> bool {
    character.is_alphanumeric() || matches!(character, '-' | '_' | '.' | ':')
}

fn preview(text: &str) -> String {
    text.chars().take(32).collect()
}

/// Escapes markup-significant characters. Attribute values additionally
/// escape double quotes.
#[must_use]
pub fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(character),
        }
    }
    out
}

/// Decodes the five predefined entities and numeric character references.
///
/// # Errors
///
/// Returns [`MarkupError::InvalidEntity`] for unknown or unterminated
/// references.
pub fn unescape(text: &str) -> Result<String, MarkupError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        let (before, reference) = rest.split_at(amp);
        out.push_str(before);
        let body = reference.trim_start_matches('&');
        let Some(semicolon) = body.find(';') else {
            return Err(MarkupError::InvalidEntity(preview(body)));
        };
        let (entity, tail) = body.split_at(semicolon);
        out.push(decode_entity(entity)?);
        rest = tail.strip_prefix(';').unwrap_or(tail);
    }
    out.push_str(rest);
    Ok(out)
}

fn decode_entity(entity: &str) -> Result<char, MarkupError> {
    let invalid = || MarkupError::InvalidEntity(format!("{entity};"));
    match entity {
        "lt" => Ok('<'),
        "gt" => Ok('>'),
        "amp" => Ok('&'),
        "quot" => Ok('"'),
        "apos" => Ok('\''),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).map_err(|_| invalid())?
            } else if let Some(decimal) = entity.strip_prefix('#') {
                decimal.parse::<u32>().map_err(|_| invalid())?
            } else {
                return Err(invalid());
            };
            char::from_u32(code).ok_or_else(invalid)
        }
    }
}

/// Byte cursor over a string that only ever stops on character boundaries.
struct Cursor<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Cursor<'a> {
    const fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn rest(&self) -> &'a str {
        self.input.get(self.position..).unwrap_or_default()
    }

    fn is_at_end(&self) -> bool {
        self.rest().is_empty()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    const fn advance(&mut self, bytes: usize) {
        self.position += bytes;
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.advance(prefix.len());
            true
        } else {
            false
        }
    }

    fn eat_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance(expected.len_utf8());
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let length = rest
            .char_indices()
            .find(|&(_, character)| !predicate(character))
            .map_or(rest.len(), |(index, _)| index);
        self.advance(length);
        rest.get(..length).unwrap_or_default()
    }

    /// Skips whitespace and reports whether any was consumed.
    fn skip_whitespace(&mut self) -> bool {
        !self.take_while(char::is_whitespace).is_empty()
    }
}
