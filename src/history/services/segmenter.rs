//! Splits a rendered prompt back into chat messages.
//!
//! A rendered prompt mixes plain text with tagged blocks such as
//! `<message role="user">Hi</message>` or `<message role="user"/>`. The
//! segmenter walks the text once, emitting one message per plain-text run or
//! tagged block. Blocks that cannot be read are kept verbatim as plain text,
//! so segmentation never fails.

use crate::history::{
    config::SegmenterConfig,
    domain::{ChatHistory, ChatMessage, MessageElement, Role},
    error::ParseRecoveryWarning,
    ports::record::PromptRecord,
};
use tracing::{debug, warn};

const SELF_CLOSING_MARKER: &str = "/>";

/// Messages recovered from a rendered prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedPrompt<R> {
    /// Messages in prompt order.
    pub messages: Vec<R>,
    /// Tagged fragments that were kept as literal text.
    pub recoveries: Vec<ParseRecoveryWarning>,
}

impl<R> SegmentedPrompt<R> {
    const fn new() -> Self {
        Self {
            messages: Vec::new(),
            recoveries: Vec::new(),
        }
    }
}

/// Turns rendered prompts into ordered messages.
///
/// # Examples
///
/// ```
/// use parley::history::domain::{ChatMessage, Role};
/// use parley::history::services::PromptSegmenter;
///
/// let segmenter = PromptSegmenter::default();
/// let segmented = segmenter.segment::<ChatMessage>(
///     r#"Be helpful.<message role="user">Hi there</message>"#,
/// );
///
/// assert_eq!(segmented.messages.len(), 2);
/// assert_eq!(segmented.messages[0].role(), Role::System);
/// assert_eq!(segmented.messages[1].content(), "Hi there");
/// ```
#[derive(Debug, Clone)]
pub struct PromptSegmenter {
    root_key: String,
    open_marker: String,
    end_tag: String,
}

impl Default for PromptSegmenter {
    fn default() -> Self {
        Self::new(&SegmenterConfig::default())
    }
}

struct Step<'a, R> {
    message: R,
    recovery: Option<ParseRecoveryWarning>,
    remainder: Option<&'a str>,
}

impl PromptSegmenter {
    /// Creates a segmenter recognising `config.root_key` blocks.
    #[must_use]
    pub fn new(config: &SegmenterConfig) -> Self {
        let root_key = config.root_key.clone();
        Self {
            open_marker: format!("<{root_key}"),
            end_tag: format!("</{root_key}>"),
            root_key,
        }
    }

    /// Returns the element name this segmenter recognises.
    #[must_use]
    pub fn root_key(&self) -> &str {
        &self.root_key
    }

    /// Segments `prompt` into records of type `R`.
    ///
    /// Whitespace-only input yields no messages. Plain text before the first
    /// tagged block becomes a system message; any later plain text becomes a
    /// user message.
    pub fn segment<R: PromptRecord>(&self, prompt: &str) -> SegmentedPrompt<R> {
        let mut segmented = SegmentedPrompt::new();
        let mut remainder = Some(prompt);
        let mut first = true;

        while let Some(text) = remainder {
            let Some(step) = self.step::<R>(text, first) else {
                break;
            };
            first = false;
            segmented.messages.push(step.message);
            segmented.recoveries.extend(step.recovery);
            remainder = step.remainder;
        }

        debug!(
            messages = segmented.messages.len(),
            recoveries = segmented.recoveries.len(),
            "segmented rendered prompt"
        );
        segmented
    }

    fn step<'a, R: PromptRecord>(&self, text: &'a str, first: bool) -> Option<Step<'a, R>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let default_role = if first { Role::System } else { Role::User };

        let start = trimmed.find(self.open_marker.as_str());
        let (Some(start), Some((end, end_of_tag))) = (start, self.find_close(trimmed)) else {
            return Some(Step {
                message: R::from_plain_text(default_role, trimmed),
                recovery: None,
                remainder: None,
            });
        };

        if start > 0 && end > 0 {
            let (leading, rest) = trimmed.split_at(start);
            return Some(Step {
                message: R::from_plain_text(default_role, leading),
                recovery: None,
                remainder: Some(rest),
            });
        }

        // Either the block opens at 0, or a stray closing marker leads the text.
        // A stray marker is kept up to and including itself, so the literal
        // recovered is never empty.
        let (fragment, rest) = trimmed.split_at(end_of_tag);
        let parsed = MessageElement::parse(fragment, &self.root_key)
            .and_then(|element| R::from_element(&element));
        Some(match parsed {
            Ok(message) => Step {
                message,
                recovery: None,
                remainder: Some(rest),
            },
            Err(error) => {
                warn!(%fragment, %error, "unable to parse message fragment, keeping it as content");
                Step {
                    message: R::from_plain_text(default_role, fragment),
                    recovery: Some(ParseRecoveryWarning {
                        fragment: fragment.to_owned(),
                        error,
                    }),
                    remainder: Some(rest),
                }
            }
        })
    }

    /// Locates the closing marker, returning its start and end offsets.
    ///
    /// The paired end tag wins wherever it occurs; `/>` is only consulted
    /// when the text holds no end tag at all.
    fn find_close(&self, text: &str) -> Option<(usize, usize)> {
        text.find(self.end_tag.as_str())
            .map(|position| (position, position + self.end_tag.len()))
            .or_else(|| {
                text.find(SELF_CLOSING_MARKER)
                    .map(|position| (position, position + SELF_CLOSING_MARKER.len()))
            })
    }
}

impl ChatHistory {
    /// Builds a history from a rendered prompt using the default segmenter.
    ///
    /// Only messages found in the prompt are added; no system message is
    /// synthesised.
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::history::domain::ChatHistory;
    ///
    /// let history = ChatHistory::from_rendered_prompt("Hello");
    /// assert_eq!(history.len(), 1);
    /// assert_eq!(history[0].content(), "Hello");
    /// ```
    #[must_use]
    pub fn from_rendered_prompt(rendered_prompt: &str) -> Self {
        Self::from_rendered_prompt_with(rendered_prompt, &PromptSegmenter::default())
    }

    /// Builds a history from a rendered prompt using `segmenter`.
    #[must_use]
    pub fn from_rendered_prompt_with(rendered_prompt: &str, segmenter: &PromptSegmenter) -> Self {
        Self::from_messages(segmenter.segment::<ChatMessage>(rendered_prompt).messages)
    }
}
