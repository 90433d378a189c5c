//! Math utilities and types
//!
//! Provides the small set of 2D math types the engine hands to renderables
//! and to the external rasterizer.

use serde::{Deserialize, Serialize};

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// Axis-aligned rectangle in world or screen space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub origin: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.x
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.y
    }

    /// Check if this rectangle contains a point
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.origin.x && point.x < self.right() &&
        point.y >= self.origin.y && point.y < self.bottom()
    }

    /// Check if this rectangle overlaps another
    pub fn intersects(&self, other: &Rect) -> bool {
        self.origin.x < other.right() && self.right() > other.origin.x &&
        self.origin.y < other.bottom() && self.bottom() > other.origin.y
    }

    /// Return the rectangle moved by `offset`
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            origin: self.origin + offset,
            size: self.size,
        }
    }
}

/// RGBA color with float components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Opaque black
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    /// Create an opaque color
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color with alpha
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Return this color with its alpha replaced
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Math utility functions
pub mod utils {
    use super::Vec2;

    /// Wrap a position into `[0, bounds)` on both axes (toroidal playfield)
    pub fn wrap(position: Vec2, bounds: Vec2) -> Vec2 {
        Vec2::new(
            position.x.rem_euclid(bounds.x),
            position.y.rem_euclid(bounds.y),
        )
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}
