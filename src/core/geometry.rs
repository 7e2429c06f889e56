//! Axis-aligned rectangles in playfield units (y grows downward).

/// An axis-aligned rectangle. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Strict AABB overlap. Rectangles that only share an edge do not overlap,
    /// and a zero-height rectangle never overlaps anything.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Half-open point test: the left and top edges are inside, the right and
    /// bottom edges are not.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink uniformly about the centre by `fraction` of each dimension.
    pub fn shrink(&self, fraction: f64) -> Rect {
        let dw = self.width * fraction;
        let dh = self.height * fraction;
        Rect {
            x: self.x + dw / 2.0,
            y: self.y + dh / 2.0,
            width: self.width - dw,
            height: self.height - dh,
        }
    }
}
