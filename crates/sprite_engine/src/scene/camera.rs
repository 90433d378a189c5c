//! 2D camera

use crate::foundation::math::{Rect, Vec2};
use crate::render::{RenderContext, Transform};

/// Viewport into a world
///
/// Binding the camera offsets everything drawn by `-position`, so world
/// coordinates at `position` land on the top-left of the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// World coordinate shown at the top-left of the viewport
    pub position: Vec2,
    /// Size of the visible area
    pub viewport: Vec2,
}

impl Camera {
    /// Create a camera at the origin
    pub fn new(viewport: Vec2) -> Self {
        Self {
            position: Vec2::zeros(),
            viewport,
        }
    }

    /// Move the camera by `delta`
    pub fn pan(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Center the view on `target`
    pub fn look_at(&mut self, target: Vec2) {
        self.position = target - self.viewport * 0.5;
    }

    /// Visible world-space rectangle
    pub fn bounds(&self) -> Rect {
        Rect {
            origin: self.position,
            size: self.viewport,
        }
    }

    /// Whether `rect` overlaps the visible area
    pub fn can_see(&self, rect: &Rect) -> bool {
        self.bounds().intersects(rect)
    }
}

impl Transform for Camera {
    fn bind(&self, ctx: &mut RenderContext) {
        ctx.push_offset(-self.position);
    }

    fn release(&self, ctx: &mut RenderContext) {
        ctx.pop_offset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_look_at_centers_target() {
        let mut camera = Camera::new(Vec2::new(200.0, 100.0));
        camera.look_at(Vec2::new(500.0, 500.0));
        assert_relative_eq!(camera.position.x, 400.0);
        assert_relative_eq!(camera.position.y, 450.0);
        assert!(camera.can_see(&Rect::new(495.0, 495.0, 10.0, 10.0)));
        assert!(!camera.can_see(&Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_bind_offsets_by_negative_position() {
        let mut camera = Camera::new(Vec2::new(10.0, 10.0));
        camera.pan(Vec2::new(3.0, -2.0));
        let mut ctx = RenderContext::new(camera.viewport);
        camera.bind(&mut ctx);
        assert_relative_eq!(ctx.offset().x, -3.0);
        assert_relative_eq!(ctx.offset().y, 2.0);
        camera.release(&mut ctx);
        assert_eq!(ctx.bind_depth(), (0, 0));
    }
}
