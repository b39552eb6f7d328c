//! Canvas: the drawing context threaded through the draw pass.
//!
//! There is no global drawing surface. The screen owns one `Box<dyn Canvas>`
//! from `attach` until `detach` and lends it to [`Tree::draw`] each frame.
//! [`Saved`] scopes a `save`/`restore` pair so a translation applied for one
//! node can never leak into its siblings, even when drawing bails out early.
//!
//! [`Tree::draw`]: crate::dom::Tree::draw

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// A 2D drawing context with a transform stack.
pub trait Canvas {
    /// Push the current transform and style state.
    fn save(&mut self);

    /// Pop the state pushed by the matching [`Canvas::save`].
    fn restore(&mut self);

    /// Shift the origin by `(x, y)` in the current coordinate space.
    fn translate(&mut self, x: f64, y: f64);

    /// Start a new path.
    fn begin_path(&mut self);

    /// Add a rectangle to the current path.
    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64);

    /// Add an arc to the current path. Angles are in radians.
    fn arc(&mut self, x: f64, y: f64, r: f64, start: f64, end: f64, ccw: bool);

    /// Fill the current path.
    fn fill(&mut self, color: &str);

    /// Stroke the current path.
    fn stroke(&mut self, color: &str);
}

// ---------------------------------------------------------------------------
// DrawFn
// ---------------------------------------------------------------------------

/// A primitive's drawing closure: the leaf output of a render.
#[derive(Clone)]
pub struct DrawFn(Rc<dyn Fn(&mut dyn Canvas)>);

impl DrawFn {
    /// Wrap a drawing closure.
    pub fn new(f: impl Fn(&mut dyn Canvas) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Draw into `canvas`.
    pub fn call(&self, canvas: &mut dyn Canvas) {
        (self.0)(canvas);
    }

    /// A closure that draws nothing (grouping primitives such as layers).
    pub fn empty() -> Self {
        Self::new(|_| {})
    }
}

impl fmt::Debug for DrawFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DrawFn(..)")
    }
}

// ---------------------------------------------------------------------------
// Saved
// ---------------------------------------------------------------------------

/// `save` on creation, `restore` on drop.
pub struct Saved<'a> {
    canvas: &'a mut dyn Canvas,
}

impl<'a> Saved<'a> {
    /// Save `canvas` and guard the matching restore.
    pub fn new(canvas: &'a mut dyn Canvas) -> Self {
        canvas.save();
        Self { canvas }
    }
}

impl<'a> Deref for Saved<'a> {
    type Target = dyn Canvas + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.canvas
    }
}

impl<'a> DerefMut for Saved<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.canvas
    }
}

impl Drop for Saved<'_> {
    fn drop(&mut self) {
        self.canvas.restore();
    }
}
