mod prompt;
mod time;
mod writer;

pub use prompt::{is_affirmative, is_negative, prompt_line, prompt_with_default};
pub use time::{format_utc, now_utc, utc_rfc3339};
pub use writer::ArtifactWriter;
