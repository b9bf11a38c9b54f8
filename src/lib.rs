pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod state;
pub mod types;
pub mod ui;
pub mod util;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{RenderError, RenderResult};
pub use render::{CompletedTool, RenderedFragment, ToolOutputRenderer};
pub use state::ActiveToolIndex;
pub use types::{EventTimestamp, ToolInvocationEvent, ToolResultEvent, TranscriptEvent};
