//! Pick rays from a perspective camera.

use nalgebra::{Isometry3, Perspective3, Point3, Vector3};
use parry3d::query::Ray;

/// Perspective camera as the renderer describes it.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Eye position.
    pub eye: Point3<f32>,
    /// Point the camera looks at.
    pub target: Point3<f32>,
    /// Up direction.
    pub up: Vector3<f32>,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Viewport width over height.
    pub aspect: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            eye: Point3::new(10.0, 8.0, 12.0),
            target: Point3::origin(),
            up: Vector3::y(),
            fov_y: 50.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl PerspectiveCamera {
    /// Camera at `eye` looking at `target` with the default lens.
    pub fn looking_at(eye: Point3<f32>, target: Point3<f32>) -> Self {
        Self {
            eye,
            target,
            ..Self::default()
        }
    }

    /// Follow a viewport resize. Zero-sized viewports are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// World-space ray through a normalized device coordinate.
    ///
    /// `x` and `y` are in `[-1, 1]` with `y` pointing up. The ray starts on
    /// the near plane.
    pub fn ray_from_ndc(&self, x: f32, y: f32) -> Ray {
        let projection = Perspective3::new(self.aspect, self.fov_y, self.near, self.far);
        let view = Isometry3::look_at_rh(&self.eye, &self.target, &self.up);

        let near = projection.unproject_point(&Point3::new(x, y, -1.0));
        let far = projection.unproject_point(&Point3::new(x, y, 1.0));
        let origin = view.inverse_transform_point(&near);
        let end = view.inverse_transform_point(&far);

        Ray::new(origin, (end - origin).normalize())
    }
}

/// Convert a pixel position to normalized device coordinates.
pub fn pixel_to_ndc(x: f32, y: f32, width: f32, height: f32) -> (f32, f32) {
    ((x / width) * 2.0 - 1.0, -((y / height) * 2.0 - 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_center_ray_hits_target() {
        let camera = PerspectiveCamera::looking_at(Point3::new(0.0, 0.0, 10.0), Point3::origin());
        let ray = camera.ray_from_ndc(0.0, 0.0);

        assert_relative_eq!(ray.dir, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
        assert_relative_eq!(ray.origin, Point3::new(0.0, 0.0, 9.9), epsilon = 1e-3);
    }

    #[test]
    fn test_corner_rays_diverge() {
        let camera = PerspectiveCamera::looking_at(Point3::new(0.0, 0.0, 10.0), Point3::origin());
        let right = camera.ray_from_ndc(1.0, 0.0);
        let up = camera.ray_from_ndc(0.0, 1.0);

        assert!(right.dir.x > 0.0);
        assert!(up.dir.y > 0.0);
        // Half the vertical field of view between the center and top rays.
        assert_relative_eq!(up.dir.angle(&-Vector3::z()), camera.fov_y / 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_viewport_resize() {
        let mut camera = PerspectiveCamera::default();
        camera.set_viewport(800, 400);
        assert_relative_eq!(camera.aspect, 2.0);
        camera.set_viewport(800, 0);
        assert_relative_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn test_pixel_to_ndc() {
        assert_eq!(pixel_to_ndc(0.0, 0.0, 800.0, 600.0), (-1.0, 1.0));
        assert_eq!(pixel_to_ndc(400.0, 300.0, 800.0, 600.0), (0.0, 0.0));
        assert_eq!(pixel_to_ndc(800.0, 600.0, 800.0, 600.0), (1.0, -1.0));
    }
}
