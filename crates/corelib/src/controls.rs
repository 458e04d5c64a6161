//! Orbit controls: rotate the camera around a target with the mouse.

use std::f32::consts::PI;

use crate::{Vec3, camera::Camera, spherical::Spherical};

/// Radians of rotation per pixel of drag, for a viewport `height` pixels tall.
const ROTATE_SPEED: f32 = 1.0;
const ZOOM_STEP: f32 = 0.95;

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    spherical: Spherical,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    dragging: bool,
    last_cursor: Option<(f32, f32)>,
}

impl OrbitControls {
    /// Controls orbiting `camera.target`, starting from the camera's current eye.
    pub fn new(camera: &Camera) -> Self {
        Self {
            target: camera.target,
            enable_damping: false,
            damping_factor: 0.05,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            spherical: Spherical::from_vec3(camera.eye - camera.target),
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            dragging: false,
            last_cursor: None,
        }
    }

    pub fn with_damping(mut self, factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = factor;
        self
    }

    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
        if !dragging {
            self.last_cursor = None;
        }
    }

    /// Feed a cursor position in physical pixels; rotates while dragging.
    pub fn cursor_moved(&mut self, x: f32, y: f32, viewport_height: f32) {
        if let Some((lx, ly)) = self.last_cursor.filter(|_| self.dragging) {
            let h = viewport_height.max(1.0);
            self.rotate_left(2.0 * PI * (x - lx) / h * ROTATE_SPEED);
            self.rotate_up(2.0 * PI * (y - ly) / h * ROTATE_SPEED);
        }
        self.last_cursor = Some((x, y));
    }

    /// Positive `lines` zooms in.
    pub fn scroll(&mut self, lines: f32) {
        if lines > 0.0 {
            self.scale *= ZOOM_STEP.powf(lines);
        } else if lines < 0.0 {
            self.scale /= ZOOM_STEP.powf(-lines);
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Apply pending input to `camera`. Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let before = camera.eye;

        if self.enable_damping {
            self.spherical.theta += self.delta_theta * self.damping_factor;
            self.spherical.phi += self.delta_phi * self.damping_factor;
        } else {
            self.spherical.theta += self.delta_theta;
            self.spherical.phi += self.delta_phi;
        }
        self.spherical.make_safe();
        self.spherical.radius =
            (self.spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.scale = 1.0;

        camera.target = self.target;
        camera.eye = self.target + self.spherical.to_vec3();
        (camera.eye - before).length_squared() > 1e-12
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::looking_at_origin(Vec3::new(0.0, 0.0, 2.0), 75.0, 0.1, 100.0)
    }

    #[test]
    fn update_without_input_keeps_eye() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(&cam);
        assert!(!controls.update(&mut cam));
        assert!((cam.eye - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn drag_rotates_around_target_at_constant_distance() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(&cam);
        controls.set_dragging(true);
        controls.cursor_moved(100.0, 100.0, 600.0);
        controls.cursor_moved(160.0, 100.0, 600.0);
        assert!(controls.update(&mut cam));
        assert!((cam.eye.length() - 2.0).abs() < 1e-4);
        assert!(cam.eye.x.abs() > 0.1);
    }

    #[test]
    fn cursor_without_drag_does_nothing() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(&cam);
        controls.cursor_moved(0.0, 0.0, 600.0);
        controls.cursor_moved(300.0, 0.0, 600.0);
        assert!(!controls.update(&mut cam));
    }

    #[test]
    fn damping_spreads_rotation_over_frames() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(&cam).with_damping(0.05);
        controls.rotate_left(1.0);
        controls.update(&mut cam);
        let first = Spherical::from_vec3(cam.eye).theta;
        controls.update(&mut cam);
        let second = Spherical::from_vec3(cam.eye).theta;
        assert!(first.abs() < 1.0);
        assert!(second.abs() > first.abs());
    }

    #[test]
    fn scroll_zooms_within_limits() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(&cam);
        controls.min_distance = 1.5;
        controls.scroll(100.0);
        controls.update(&mut cam);
        assert!((controls.distance() - 1.5).abs() < 1e-5);
    }
}
