//! Pixel-space rectangles
//!
//! Every drawable occupies one axis-aligned rectangle whose position is its
//! top-left corner, with Y pointing down the screen.

use glam::Vec2;

/// An axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left corner
    pub position: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Rectangle of `size` whose center sits at `center`
    #[must_use]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            position: center - size / 2.0,
            size,
        }
    }

    /// Half of the size
    #[must_use]
    pub fn half_extents(&self) -> Vec2 {
        self.size / 2.0
    }

    /// Center point
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.half_extents()
    }

    /// Move the rectangle so its center sits at `center`
    pub fn set_center(&mut self, center: Vec2) {
        self.position = center - self.half_extents();
    }
}
