//! Window size bookkeeping shared by the camera and the render targets.

use crate::{CoreError, CoreResult, camera::Camera};

/// Anything whose backing storage follows the window size.
pub trait Resize {
    fn resize(&mut self, width: u32, height: u32);
}

/// Logical window size plus the device pixel ratio used for rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> CoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidSize { width, height });
        }
        Ok(Self {
            width,
            height,
            pixel_ratio,
        })
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Size of the render targets in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }

    /// Record a new size, update `camera` and resize `target` to match.
    ///
    /// Zero-sized windows (minimised) are ignored.
    pub fn apply(
        &mut self,
        width: u32,
        height: u32,
        camera: &mut Camera,
        target: &mut impl Resize,
    ) -> bool {
        if width == 0 || height == 0 {
            log::debug!("Ignoring zero-sized resize {}x{}", width, height);
            return false;
        }
        self.width = width;
        self.height = height;
        camera.set_aspect(width as f32, height as f32);
        let (pw, ph) = self.physical_size();
        target.resize(pw, ph);
        true
    }
}

/// Effective pixel ratio: the window's scale factor capped at `cap`.
#[inline]
pub fn capped_pixel_ratio(scale_factor: f64, cap: f32) -> f32 {
    (scale_factor as f32).min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;

    #[derive(Default)]
    struct Recorder(Vec<(u32, u32)>);

    impl Resize for Recorder {
        fn resize(&mut self, width: u32, height: u32) {
            self.0.push((width, height));
        }
    }

    fn camera() -> Camera {
        Camera::looking_at_origin(Vec3::new(0.0, 0.0, 2.0), 75.0, 0.1, 100.0)
    }

    #[test]
    fn resize_updates_aspect_and_target() {
        let mut vp = Viewport::new(800, 600, 1.0).unwrap();
        let mut cam = camera();
        let mut target = Recorder::default();
        for &(w, h) in &[(1u32, 1u32), (1920, 1080), (333, 777), (4096, 17)] {
            assert!(vp.apply(w, h, &mut cam, &mut target));
            assert!((cam.aspect - w as f32 / h as f32).abs() < 1e-6);
            assert_eq!(target.0.last(), Some(&(w, h)));
        }
    }

    #[test]
    fn resize_scales_target_by_pixel_ratio() {
        let mut vp = Viewport::new(800, 600, 1.5).unwrap();
        let mut cam = camera();
        let mut target = Recorder::default();
        vp.apply(1000, 500, &mut cam, &mut target);
        assert_eq!(target.0, vec![(1500, 750)]);
        assert!((cam.aspect - 2.0).abs() < 1e-6);
    }

    #[test]
    fn zero_size_is_ignored() {
        let mut vp = Viewport::new(800, 600, 1.0).unwrap();
        let mut cam = camera();
        cam.set_aspect(4.0, 3.0);
        let mut target = Recorder::default();
        assert!(!vp.apply(0, 600, &mut cam, &mut target));
        assert!(target.0.is_empty());
        assert_eq!(vp.width, 800);
    }

    #[test]
    fn new_rejects_empty_viewport() {
        assert_eq!(
            Viewport::new(0, 10, 1.0),
            Err(CoreError::InvalidSize { width: 0, height: 10 })
        );
    }

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(capped_pixel_ratio(3.0, 1.5), 1.5);
        assert_eq!(capped_pixel_ratio(1.0, 2.0), 1.0);
    }
}
