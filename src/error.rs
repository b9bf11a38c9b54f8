use thiserror::Error;

/// Failures surfaced while turning transcript events into fragments.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The event payload could not be turned into text. Never retried.
    #[error("failed to serialize tool payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A tool invocation arrived without a usable tool name.
    #[error("tool invocation is missing a tool name")]
    MissingIdentifier,
}

pub type RenderResult<T> = Result<T, RenderError>;
