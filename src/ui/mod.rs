pub mod ansi;
pub mod text_width;
pub mod transcript;

pub use ansi::write_fragment;
pub use transcript::{run_transcript, TranscriptSummary, MAX_EVENT_LINE_BYTES};
