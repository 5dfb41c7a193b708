use glam::{Mat4, Vec3};

use crate::shading::FINAL_Z_SCALE;

const V3: f32 = 1.732_050_8; // sqrt(3)

/// Orthographic isometric camera.
///
/// World x and y span the floor and z is the height. Tiles further along
/// x + y appear higher on screen and further away in depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pos: Vec3,
    aspect_ratio: f32,
    y_ratio: f32,
    z_ratio: f32,
}

impl Camera {
    /// Creates a camera looking at the origin.
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            pos: Vec3::ZERO,
            aspect_ratio: sanitize_aspect(aspect_ratio),
            y_ratio: 5.0,
            z_ratio: 2.5,
        }
    }

    pub fn pos(&self) -> Vec3 {
        self.pos
    }

    pub fn set_pos(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.pos = Vec3::new(x, y, z);
        self
    }

    /// Moves the camera along the floor plane.
    pub fn pan(&mut self, dx: f32, dy: f32) -> &mut Self {
        self.pos.x += dx;
        self.pos.y += dy;
        self
    }

    pub fn ratio(&self) -> f32 {
        self.y_ratio
    }

    /// Sets the approximate number of visible tiles (zoom in/out).
    pub fn set_ratio(&mut self, ratio: f32) -> &mut Self {
        let ratio = ratio.max(1.0);
        self.y_ratio = ratio;
        self.z_ratio = 0.5 * ratio;
        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) -> &mut Self {
        self.aspect_ratio = sanitize_aspect(aspect_ratio);
        self
    }

    /// Isometric projection.
    ///
    /// The depth row maps the visible volume into `0..1`, which is the
    /// clip-space depth range wgpu expects.
    pub fn perspective(&self) -> Mat4 {
        let s = self.y_ratio + self.z_ratio;
        Mat4::from_cols_array_2d(&[
            [V3 / (2.0 * self.aspect_ratio), 0.5, 0.25 / s, 0.0],
            [-V3 / (2.0 * self.aspect_ratio), 0.5, 0.25 / s, 0.0],
            [0.0, 1.0, -0.5 / s, 0.0],
            [0.0, 0.0, 0.5, 1.0],
        ])
    }

    /// Scales the world down to the visible range and centres it on the
    /// camera position.
    pub fn view(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&[
            [1.0 / self.y_ratio, 0.0, 0.0, 0.0],
            [0.0, 1.0 / self.y_ratio, 0.0, 0.0],
            [0.0, 0.0, 1.0 / self.z_ratio, 0.0],
            [
                -self.pos.x / self.y_ratio,
                -self.pos.y / self.y_ratio,
                -self.pos.z / self.z_ratio,
                1.0,
            ],
        ])
    }

    /// Depth of `point` in the scale consumed by the lit vertex stage's
    /// `final_z` attribute.
    pub fn final_z(&self, point: Vec3) -> f32 {
        let clip = self.perspective() * self.view() * point.extend(1.0);
        clip.z / clip.w * FINAL_Z_SCALE
    }
}

fn sanitize_aspect(aspect_ratio: f32) -> f32 {
    if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
        aspect_ratio
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn clip(camera: &Camera, point: Vec3) -> glam::Vec4 {
        camera.perspective() * camera.view() * point.extend(1.0)
    }

    #[test]
    fn camera_position_projects_to_centre() {
        let mut camera = Camera::new(4.0 / 3.0);
        camera.set_pos(5.0, 3.0, 1.0);
        let c = clip(&camera, Vec3::new(5.0, 3.0, 1.0));
        assert_relative_eq!(c.x, 0.0);
        assert_relative_eq!(c.y, 0.0);
        assert_relative_eq!(c.z, 0.5);
        assert_relative_eq!(c.w, 1.0);
    }

    #[test]
    fn farther_tiles_are_deeper() {
        let camera = Camera::new(1.0);
        let near = camera.final_z(Vec3::new(0.0, 0.0, 0.0));
        let far = camera.final_z(Vec3::new(2.0, 2.0, 0.0));
        let raised = camera.final_z(Vec3::new(0.0, 0.0, 1.0));
        assert!(far > near);
        assert!(raised < near);
        assert_relative_eq!(near, 500.0);
    }

    #[test]
    fn ratio_keeps_half_height() {
        let mut camera = Camera::new(1.0);
        camera.set_ratio(8.0);
        assert_eq!(camera.ratio(), 8.0);
        let c = clip(&camera, Vec3::new(0.0, 0.0, 2.0));
        // z_ratio is half the ratio: two units up is half the screen height
        assert_relative_eq!(c.y, 0.5);
        camera.set_ratio(0.1);
        assert_eq!(camera.ratio(), 1.0);
    }

    #[test]
    fn invalid_aspect_falls_back_to_square() {
        assert_eq!(Camera::new(0.0).aspect_ratio(), 1.0);
        assert_eq!(Camera::new(f32::NAN).aspect_ratio(), 1.0);
    }
}
