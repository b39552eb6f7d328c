//! A canvas that records calls instead of painting.

use std::fmt::Write as _;

use crate::geometry::{Point, Region};
use crate::render::canvas::Canvas;

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    Save,
    Restore,
    Translate(f64, f64),
    BeginPath,
    Rect { x: f64, y: f64, w: f64, h: f64 },
    Arc { x: f64, y: f64, r: f64 },
    Fill(String),
    Stroke(String),
}

/// Records every call, tracks save depth and the accumulated translation.
///
/// Rectangles are also kept in absolute coordinates, which is what most
/// assertions about draw placement want.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    ops: Vec<CanvasOp>,
    offset: Point,
    saved: Vec<Point>,
    rects: Vec<Region>,
    /// Restores without a matching save.
    underflows: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, in order.
    pub fn ops(&self) -> &[CanvasOp] {
        &self.ops
    }

    /// Open `save` calls.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Current accumulated translation.
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Rectangles drawn, translated to absolute coordinates.
    pub fn rects(&self) -> &[Region] {
        &self.rects
    }

    /// Number of `restore` calls that had no matching `save`.
    pub fn underflows(&self) -> usize {
        self.underflows
    }

    /// Forget everything recorded; depth and offset reset too.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// One op per line, indented by save depth.
    pub fn log_to_string(&self) -> String {
        let mut out = String::new();
        let mut depth = 0usize;
        for op in &self.ops {
            if *op == CanvasOp::Restore {
                depth = depth.saturating_sub(1);
            }
            let _ = writeln!(out, "{}{}", "  ".repeat(depth), describe(op));
            if *op == CanvasOp::Save {
                depth += 1;
            }
        }
        out
    }
}

fn describe(op: &CanvasOp) -> String {
    match op {
        CanvasOp::Save => "save".into(),
        CanvasOp::Restore => "restore".into(),
        CanvasOp::Translate(x, y) => format!("translate {x} {y}"),
        CanvasOp::BeginPath => "begin_path".into(),
        CanvasOp::Rect { x, y, w, h } => format!("rect {x} {y} {w} {h}"),
        CanvasOp::Arc { x, y, r } => format!("arc {x} {y} r={r}"),
        CanvasOp::Fill(color) => format!("fill {color}"),
        CanvasOp::Stroke(color) => format!("stroke {color}"),
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.saved.push(self.offset);
        self.ops.push(CanvasOp::Save);
    }

    fn restore(&mut self) {
        match self.saved.pop() {
            Some(offset) => self.offset = offset,
            None => self.underflows += 1,
        }
        self.ops.push(CanvasOp::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.offset = self.offset + Point::new(x, y);
        self.ops.push(CanvasOp::Translate(x, y));
    }

    fn begin_path(&mut self) {
        self.ops.push(CanvasOp::BeginPath);
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.rects.push(Region::new(x, y, w, h).translate(self.offset));
        self.ops.push(CanvasOp::Rect { x, y, w, h });
    }

    fn arc(&mut self, x: f64, y: f64, r: f64, _start: f64, _end: f64, _ccw: bool) {
        self.ops.push(CanvasOp::Arc { x, y, r });
    }

    fn fill(&mut self, color: &str) {
        self.ops.push(CanvasOp::Fill(color.to_owned()));
    }

    fn stroke(&mut self, color: &str) {
        self.ops.push(CanvasOp::Stroke(color.to_owned()));
    }
}
