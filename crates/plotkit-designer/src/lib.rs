//! # PlotKit Designer
//!
//! Interactive side of the plot commands: the host's input and drawing
//! interfaces, two-corner window selection, and the frame jig with its
//! scoped Tab interception.

pub mod host;
pub mod jig;
pub mod keys;
pub mod selector;

pub use host::{
    match_keyword, BlockId, DragSampler, DrawingDatabase, FrameEntity, InputService,
    JigPromptOptions, PointPromptOptions, PromptResult, PromptStatus, SamplerStatus,
    TransactionId, TransactionScope,
};
pub use jig::{frame_outline, frame_window, FrameEvent, FrameJig, FrameSession, FrameState, FramedWindow};
pub use keys::{FilterAction, FilterId, InterceptGuard, Key, KeyEvent, KeyEventKind, KeyFilter};
pub use selector::WindowSelector;
