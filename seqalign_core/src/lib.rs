pub mod input;
pub mod chunking;
pub mod classify;
pub mod layout;
pub mod timer;
pub mod clipboard;
pub mod renderer;

pub use input::{sanitize, InputStage, Sequence, SequencePair, Slot};
pub use chunking::{chunk_pair, truncation_length, Chunk};
pub use classify::{
    classify_char, compare_positions, mismatch_positions, style_row, ComparisonSummary, Highlight,
    PositionStatus, StyledCell,
};
pub use layout::{measure_chunk_width, FontMetrics, LayoutBus, LayoutSubscription, SurfaceSize};
pub use timer::{ConfirmationTimer, TimerHandle};
pub use clipboard::{ClipboardSink, MemoryClipboard, SelectionSource};
#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;
pub use renderer::{ComparisonRenderer, CopyOutcome, RenderedChunk, RenderedView, RendererOptions};
