//! Document summarization pipeline: extraction dispatch, validation, prompting, and shaping.

pub mod markup;
pub mod prompt;
mod service;
pub mod types;

pub use markup::{SummarySegment, parse_highlights};
pub use prompt::{LengthSelector, PROMPT_SEPARATOR, UnknownLength, build_prompt};
pub use service::{ProcessingApi, SummaryService};
pub use types::{PREVIEW_CHAR_LIMIT, ProcessingError, SummaryResult, UploadedFile};
