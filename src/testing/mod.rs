//! Headless testing support: a recording canvas, fixtures, snapshot helpers.
//!
//! Use [`RecordingCanvas`] to capture draw calls without a real surface, and
//! [`tree_to_string`] to dump a retained tree as plain text for snapshot-style
//! assertions.

pub mod canvas;
pub mod fixtures;
pub mod snapshot;

pub use canvas::{CanvasOp, RecordingCanvas};
pub use snapshot::tree_to_string;
