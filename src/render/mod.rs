//! Draw pipeline: the canvas contract and the draw traversal.

pub mod canvas;
pub mod draw;

pub use canvas::{Canvas, DrawFn, Saved};
