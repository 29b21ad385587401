//! Inkwash - raster drawing engine for coloring line art
//!
//! The crate is the interactive core of a coloring tool: brush algorithms
//! that turn pointer segments into pixels, flood and pattern fills, and a
//! snapshot-based history manager with smart grouped undo/redo. It has no
//! network or storage surface of its own; a UI layer feeds it segments and
//! asks for encoded frames.
//!
//! The engine is single-threaded and synchronous: `apply_stroke`, `fill` and
//! `record` run to completion on the calling thread, and operations on one
//! surface/history pair must be serialized by the caller.

pub mod brush;
pub mod core;
pub mod effects;
pub mod fill;
pub mod history;
pub mod surface;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use crate::brush::{BrushEngine, BrushKind, BrushSpec, Segment, StrokeMode};
pub use crate::core::color::Rgb;
pub use crate::core::errors::EngineError;
pub use crate::core::geometry::Point;
pub use crate::fill::{fill, flood_fill, FillOptions};
pub use crate::history::{HistoryManager, HistoryState, RecordOutcome, StepReport};
pub use crate::surface::Surface;

/// Initialize logging for binaries embedding the engine.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkwash=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("inkwash initializing...");
}
