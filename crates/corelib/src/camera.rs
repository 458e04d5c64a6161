use crate::{Mat4, Vec3};

/// Perspective camera, right-handed and Y-up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Width over height; kept in sync with the window by [`crate::viewport::Viewport`].
    pub aspect: f32,
}

impl Camera {
    /// Camera at `eye` looking at the origin, with a vertical fov in degrees.
    pub fn looking_at_origin(eye: Vec3, fov_y_deg: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            eye,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_rad: fov_y_deg.to_radians(),
            z_near,
            z_far,
            aspect: 1.0,
        }
    }

    #[inline]
    pub fn distance_to_target(&self) -> f32 {
        self.eye.distance(self.target)
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Depth maps to [0, 1].
    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_rad, self.aspect.max(1e-6), self.z_near, self.z_far)
    }

    #[inline]
    pub fn proj_view(&self) -> Mat4 {
        self.proj() * self.view()
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.aspect = width / height.max(1e-6);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_moves_eye_to_origin() {
        let cam = Camera::looking_at_origin(Vec3::new(12.0, -2.0, -4.0), 25.0, 0.1, 100.0);
        let p = cam.view().transform_point3(cam.eye);
        assert!(p.length() < 1e-5);
        // the target sits straight ahead, down -Z
        let t = cam.view().transform_point3(Vec3::ZERO);
        assert!((t.z + cam.distance_to_target()).abs() < 1e-4);
    }

    #[test]
    fn projection_is_finite_for_wide_windows() {
        let mut cam = Camera::looking_at_origin(Vec3::new(0.0, 0.0, 2.0), 75.0, 0.1, 100.0);
        cam.set_aspect(1920.0, 1080.0);
        assert!((cam.aspect - 16.0 / 9.0).abs() < 1e-6);
        assert!(cam.proj_view().to_cols_array().iter().all(|f| f.is_finite()));
    }

    #[test]
    fn near_plane_maps_to_zero_depth() {
        let cam = Camera::looking_at_origin(Vec3::new(0.0, 0.0, 2.0), 75.0, 0.1, 100.0);
        let clip = cam.proj().project_point3(Vec3::new(0.0, 0.0, -0.1));
        assert!(clip.z.abs() < 1e-5);
    }
}
