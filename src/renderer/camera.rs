//! Camera system for 2D rendering
//!
//! The camera is a translation that keeps a target centered in the viewport,
//! composed with an orthographic projection whose Y axis points down.

use glam::{Mat4, Vec2, Vec3};
use smallvec::SmallVec;

/// Ordered stack of transforms, composed so the last pushed applies last.
///
/// Stacks are plain values: cloning one never aliases another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformStack {
    matrices: SmallVec<[Mat4; 4]>,
}

impl TransformStack {
    /// Create an empty stack (composes to identity)
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new stack with `matrix` pushed on top
    #[must_use]
    pub fn pushed(&self, matrix: Mat4) -> Self {
        let mut matrices = self.matrices.clone();
        matrices.push(matrix);
        Self { matrices }
    }

    /// Number of transforms on the stack
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    /// Whether the stack is empty
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// Compose the stack into a single matrix.
    ///
    /// For pushes `a` then `b` this is `b * a`.
    pub fn compose(&self) -> Mat4 {
        self.matrices
            .iter()
            .fold(Mat4::IDENTITY, |acc, matrix| *matrix * acc)
    }
}

/// Orthographic camera following a target
#[derive(Debug, Clone)]
pub struct Camera2D {
    /// Viewport size in pixels
    viewport: Vec2,
    /// Current whole-pixel translation
    translation: Vec2,
}

impl Camera2D {
    /// Create a camera for the given viewport, with no translation
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            translation: Vec2::ZERO,
        }
    }

    /// Translation that centers a box at `position` with `half_extents`.
    ///
    /// Floored to whole pixels so textured quads do not shimmer.
    pub fn centering_translation(position: Vec2, half_extents: Vec2, viewport: Vec2) -> Vec2 {
        (-position - half_extents + viewport / 2.0).floor()
    }

    /// Center the camera on a box at `position` with `half_extents`
    pub fn follow(&mut self, position: Vec2, half_extents: Vec2) {
        self.translation = Self::centering_translation(position, half_extents, self.viewport);
    }

    /// Current translation
    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    /// Viewport size in pixels
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Projection mapping `[0, W] x [H, 0]` and depth `[0, 1]` to clip space
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::orthographic_lh(0.0, self.viewport.x, self.viewport.y, 0.0, 0.0, 1.0)
    }

    /// Translation matrix for the current translation
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.translation.x, self.translation.y, 0.0))
    }

    /// Stack holding the view translation followed by the projection
    pub fn transform_stack(&self) -> TransformStack {
        TransformStack::new()
            .pushed(self.view_matrix())
            .pushed(self.projection_matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn test_centering_translation() {
        let t = Camera2D::centering_translation(
            Vec2::new(100.0, 200.0),
            Vec2::new(25.0, 50.0),
            VIEWPORT,
        );
        assert_eq!(t, Vec2::new(275.0, 50.0));
    }

    #[test]
    fn test_translation_is_floored() {
        let t = Camera2D::centering_translation(
            Vec2::new(100.4, -10.6),
            Vec2::new(25.0, 50.0),
            VIEWPORT,
        );
        // -100.4 - 25 + 400 = 274.6, 10.6 - 50 + 300 = 260.6
        assert_eq!(t, Vec2::new(274.0, 260.0));

        let negative = Camera2D::centering_translation(
            Vec2::new(1000.5, 0.0),
            Vec2::new(25.0, 50.0),
            VIEWPORT,
        );
        assert_eq!(negative.x, -626.0);
    }

    #[test]
    fn test_followed_target_lands_in_center() {
        let mut camera = Camera2D::new(VIEWPORT);
        let position = Vec2::new(100.0, 200.0);
        let half = Vec2::new(25.0, 50.0);
        camera.follow(position, half);

        let center = (position + half).extend(0.0).extend(1.0);
        let clip = camera.transform_stack().compose() * center;
        assert!(clip.x.abs() < 1e-5);
        assert!(clip.y.abs() < 1e-5);
    }

    #[test]
    fn test_projection_flips_y_and_maps_depth() {
        let camera = Camera2D::new(VIEWPORT);
        let proj = camera.projection_matrix();

        let top_left = proj * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((top_left.x + 1.0).abs() < 1e-5);
        assert!((top_left.y - 1.0).abs() < 1e-5);
        assert!(top_left.z.abs() < 1e-5);

        let bottom_right = proj * Vec4::new(800.0, 600.0, 0.9, 1.0);
        assert!((bottom_right.x - 1.0).abs() < 1e-5);
        assert!((bottom_right.y + 1.0).abs() < 1e-5);
        assert!((bottom_right.z - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_stack_clone_is_independent() {
        let base = TransformStack::new().pushed(Mat4::from_scale(Vec3::splat(2.0)));
        let extended = base.pushed(Mat4::from_translation(Vec3::X));

        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);

        // Scale first, then translate.
        let p = extended.compose() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!((p.x - 3.0).abs() < 1e-6);
        assert_eq!(TransformStack::new().compose(), Mat4::IDENTITY);
    }
}
