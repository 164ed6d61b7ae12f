//! Stateless services over chat histories.

mod segmenter;

pub use segmenter::{PromptSegmenter, SegmentedPrompt};
