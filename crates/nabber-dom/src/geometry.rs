//! Geometry
//!
//! `DOMRect` as returned by `getBoundingClientRect`.

/// DOMRect - rectangle geometry in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DOMRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DOMRect {
    /// Create with dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top edge (same as y)
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Left edge (same as x)
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Same rect shifted by a scroll offset, i.e. in document coordinates
    pub fn to_document(&self, scroll_x: f64, scroll_y: f64) -> DOMRect {
        DOMRect::from_xywh(self.x + scroll_x, self.y + scroll_y, self.width, self.height)
    }
}
