//! Canvas geometry: Point, Size, Region.
//!
//! Coordinates are canvas pixels as `f64`. Local offsets (`x`, `y`) and absolute
//! screen positions are both [`Point`]s; inherited sizes are [`Size`]s; hit-testing
//! works on [`Region`]s.

use std::ops::{Add, Neg, Sub};

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D position or displacement on the canvas.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The canvas origin.
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linearly interpolate between `self` and `other` by `factor`.
    ///
    /// `factor = 0.0` returns `self`, `factor = 1.0` returns `other`.
    #[inline]
    pub fn lerp(self, other: Point, factor: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * factor,
            y: self.y + (other.y - self.y) * factor,
        }
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Neg for Point {
    type Output = Point;
    #[inline]
    fn neg(self) -> Point {
        Point { x: -self.x, y: -self.y }
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A 2D size in canvas pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Total area (width * height).
    #[inline]
    pub fn area(self) -> f64 {
        self.width * self.height
    }

    /// Place this size at `origin`.
    #[inline]
    pub const fn at(self, origin: Point) -> Region {
        Region { x: origin.x, y: origin.y, width: self.width, height: self.height }
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle on the canvas.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    /// An empty region at the origin.
    pub const EMPTY: Region = Region { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };

    /// Create a new region.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// The right edge (exclusive).
    #[inline]
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    /// The bottom edge (exclusive).
    #[inline]
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    /// The top-left corner.
    #[inline]
    pub const fn origin(self) -> Point {
        Point { x: self.x, y: self.y }
    }

    /// The dimensions.
    #[inline]
    pub const fn size(self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Whether `point` lies inside this region.
    #[inline]
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Whether `other` overlaps this region (non-zero intersection area).
    #[inline]
    pub fn overlaps(self, other: Region) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Intersection of two regions, or [`Region::EMPTY`] when disjoint.
    pub fn intersection(self, other: Region) -> Region {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 <= x1 || y2 <= y1 {
            Region::EMPTY
        } else {
            Region { x: x1, y: y1, width: x2 - x1, height: y2 - y1 }
        }
    }

    /// Translate the region by `offset`.
    #[inline]
    pub fn translate(self, offset: Point) -> Region {
        Region { x: self.x + offset.x, y: self.y + offset.y, ..self }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
