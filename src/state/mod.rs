pub mod active_tools;

pub use active_tools::{ActiveTool, ActiveToolIndex, DEFAULT_MAX_ACTIVE_TOOLS};
