//! Spherical coordinates (Y-up), used for orbit controls and the sun direction.

use crate::Vec3;

/// `phi` is the polar angle from +Y, `theta` the azimuth around Y from +Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub const fn new(radius: f32, phi: f32, theta: f32) -> Self {
        Self { radius, phi, theta }
    }

    pub fn from_vec3(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_vec3(&self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keep `phi` strictly inside (0, PI) so the up vector stays well defined.
    pub fn make_safe(&mut self) {
        const EPS: f32 = 1e-6;
        self.phi = self.phi.clamp(EPS, std::f32::consts::PI - EPS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn equator_at_zero_azimuth_points_to_z() {
        let v = Spherical::new(1.0, FRAC_PI_2, 0.0).to_vec3();
        assert!((v - Vec3::Z).length() < 1e-6, "{v:?}");
    }

    #[test]
    fn from_vec3_inverts_to_vec3() {
        let p = Vec3::new(12.0, -2.0, -4.0);
        let s = Spherical::from_vec3(p);
        assert!((s.to_vec3() - p).length() < 1e-4);
    }

    #[test]
    fn make_safe_clamps_poles() {
        let mut s = Spherical::new(1.0, 0.0, 0.0);
        s.make_safe();
        assert!(s.phi > 0.0);
    }
}
