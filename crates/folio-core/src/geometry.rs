/// Axis-aligned rectangle in canvas coordinates, `(x0, y0)` inclusive top-left
/// and `(x1, y1)` exclusive bottom-right.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// True if `(x, y)` lies strictly inside the rectangle (edges excluded).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.x0 < x && x < self.x1 && self.y0 < y && y < self.y1
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }

    /// Overlap of two rectangles; `None` when they share less than a whole pixel on an axis.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        );
        if r.width() as i64 > 0 && r.height() as i64 > 0 {
            Some(r)
        } else {
            None
        }
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// Scale the rectangle about `(px, py)`.
    pub fn scaled_about(&self, px: f64, py: f64, factor: f64) -> Rect {
        Rect::new(
            px + (self.x0 - px) * factor,
            py + (self.y0 - py) * factor,
            px + (self.x1 - px) * factor,
            py + (self.y1 - py) * factor,
        )
    }

    /// Grow to whole pixels: floor the top-left, ceil the bottom-right.
    pub fn snapped_outward(&self) -> Rect {
        Rect::new(
            self.x0.floor(),
            self.y0.floor(),
            self.x1.ceil(),
            self.y1.ceil(),
        )
    }
}

/// Point in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scaled_about(&self, px: f64, py: f64, factor: f64) -> Point {
        Point::new(px + (self.x - px) * factor, py + (self.y - py) * factor)
    }
}
