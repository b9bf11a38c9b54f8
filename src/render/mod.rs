pub mod code_block;
pub mod fragment;
pub mod highlight;
pub mod payload;
pub mod renderer;
pub mod timestamp;

pub use fragment::{CodeBlock, Fence, FragmentKind, RenderedFragment, Segment};
pub use highlight::{BoxedHighlighter, Highlight, PlainHighlighter, SyntectHighlighter};
pub use renderer::{CompletedTool, ToolOutputRenderer};
pub use timestamp::{DisplayZone, TimeOfDayFormatter};
