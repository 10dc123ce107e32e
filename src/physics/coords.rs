//! Conversion between pixel space and physics space
//!
//! The physics engine works in its own units. Pixel coordinates are shifted by
//! half the viewport and divided by a fixed scale factor, so that the origin of
//! pixel space sits at `(W/2, H/2) / S` in physics space.

use glam::Vec2;

/// Maps points and scalars between pixel space and physics space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    /// Pixels per physics unit
    scale: f32,
    /// Half of the viewport size in pixels
    half_viewport: Vec2,
}

impl CoordinateMapper {
    /// Create a mapper for the given scale factor and viewport size
    pub fn new(scale: f32, viewport: Vec2) -> Self {
        debug_assert!(scale > 0.0, "unit scale must be positive");
        Self {
            scale,
            half_viewport: viewport / 2.0,
        }
    }

    /// Pixels per physics unit
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Convert a pixel-space point to physics space
    pub fn to_sim_space(&self, pixel: Vec2) -> Vec2 {
        (self.half_viewport + pixel) / self.scale
    }

    /// Convert a physics-space point to pixel space
    pub fn to_pixel_space(&self, sim: Vec2) -> Vec2 {
        sim * self.scale - self.half_viewport
    }

    /// Convert a pixel-space length to physics space
    pub fn scalar_to_sim(&self, value: f32) -> f32 {
        value / self.scale
    }

    /// Convert a physics-space length to pixel space
    pub fn scalar_to_pixel(&self, value: f32) -> f32 {
        value * self.scale
    }

    /// Convert a pixel-space extent (width, height) to physics space
    pub fn extent_to_sim(&self, extent: Vec2) -> Vec2 {
        extent / self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(100.0, Vec2::new(800.0, 600.0))
    }

    #[test]
    fn test_origin_maps_to_viewport_center() {
        let sim = mapper().to_sim_space(Vec2::ZERO);
        assert!((sim.x - 4.0).abs() < 1e-6);
        assert!((sim.y - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_to_pixel_space() {
        let pixel = mapper().to_pixel_space(Vec2::new(5.5, 1.0));
        assert!((pixel.x - 150.0).abs() < 1e-4);
        assert!((pixel.y + 200.0).abs() < 1e-4);
    }

    #[test]
    fn test_point_round_trip() {
        let mapper = mapper();
        let points = [
            Vec2::ZERO,
            Vec2::new(123.5, -77.25),
            Vec2::new(-400.0, -300.0),
            Vec2::new(2500.0, 1800.0),
            Vec2::new(-9999.0, 4321.0),
        ];

        for p in points {
            let back = mapper.to_pixel_space(mapper.to_sim_space(p));
            assert!((back - p).abs().max_element() < 1e-3, "{p} -> {back}");
        }
    }

    #[test]
    fn test_scalar_round_trip() {
        let mapper = mapper();
        for v in [0.0, 1.0, 25.0, -50.0, 333.3, 1.0e4] {
            let back = mapper.scalar_to_pixel(mapper.scalar_to_sim(v));
            assert!((back - v).abs() <= v.abs() * 1e-6 + 1e-6);
        }
        assert!((mapper.scalar_to_sim(50.0) - 0.5).abs() < 1e-6);
        assert!((mapper.scalar_to_pixel(0.25) - 25.0).abs() < 1e-6);
    }
}
