//! Camera module for pan/zoom transforms.

use crate::zoom::ZoomLevel;
use kurbo::{Affine, Point, Vec2};

/// Camera manages the view transform for the canvas.
///
/// The zoom factor always follows the shell's [`ZoomLevel`], so it stays
/// inside the zoom bar's range.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Current translation offset (pan)
    pub offset: Vec2,
    /// Current scale factor (1.0 = 100%)
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: ZoomLevel::default().scale(),
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// World to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen to world transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Apply a zoom level, keeping the given screen point fixed.
    pub fn zoom_to(&mut self, level: ZoomLevel, screen_point: Point) {
        let new_zoom = level.scale();
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        // Keep world_point under screen_point
        let new_screen = self.world_to_screen(world_point);
        self.offset += Vec2::new(screen_point.x - new_screen.x, screen_point.y - new_screen.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_offset() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(50.0, 100.0);
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(30.0, -20.0);
        camera.zoom = 1.5;

        let original = Point::new(123.0, 456.0);
        let back = camera.world_to_screen(camera.screen_to_world(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_to_keeps_anchor_fixed() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(10.0, 20.0));
        let anchor = Point::new(400.0, 300.0);
        let world_before = camera.screen_to_world(anchor);

        camera.zoom_to(ZoomLevel::from_percent(250), anchor);

        assert!((camera.zoom - 2.5).abs() < f64::EPSILON);
        let world_after = camera.screen_to_world(anchor);
        assert!((world_after.x - world_before.x).abs() < 1e-9);
        assert!((world_after.y - world_before.y).abs() < 1e-9);
    }
}
