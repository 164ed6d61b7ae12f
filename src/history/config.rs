//! Configuration for segmentation and JSON persistence.

use super::domain::DEFAULT_ROOT_KEY;

/// Controls how histories are rendered as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializationConfig {
    /// Spaces per indentation level. Zero produces compact single-line JSON.
    pub indent_width: usize,
}

impl Default for SerializationConfig {
    fn default() -> Self {
        Self { indent_width: 4 }
    }
}

impl SerializationConfig {
    /// Creates a configuration producing compact JSON.
    #[must_use]
    pub const fn compact() -> Self {
        Self { indent_width: 0 }
    }

    /// Creates a configuration with the given indentation width.
    #[must_use]
    pub const fn indented(indent_width: usize) -> Self {
        Self { indent_width }
    }
}

/// Controls which element the prompt segmenter recognises as a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmenterConfig {
    /// Element name of a tagged message block, `message` by default.
    pub root_key: String,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            root_key: DEFAULT_ROOT_KEY.to_owned(),
        }
    }
}

impl SegmenterConfig {
    /// Creates a configuration recognising `<root_key ...>` blocks.
    #[must_use]
    pub fn with_root_key(root_key: impl Into<String>) -> Self {
        Self {
            root_key: root_key.into(),
        }
    }
}
