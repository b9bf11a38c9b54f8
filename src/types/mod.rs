pub mod events;

pub use events::{EventTimestamp, ToolInvocationEvent, ToolResultEvent, TranscriptEvent};
