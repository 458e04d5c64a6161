use crate::{Mat4, Quat, Vec3};

/// Placement of a mesh in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Same shape, `scale` times larger (e.g. a shell around a sphere).
    pub fn from_uniform_scale(scale: f32) -> Self {
        Self {
            scale: Vec3::splat(scale),
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Model matrix, T * R * S.
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Inverse transpose of the model matrix, for normals.
    #[inline]
    pub fn normal_matrix(&self) -> Mat4 {
        self.matrix().inverse().transpose()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn scale_applies_before_translation() {
        let t = Transform {
            scale: Vec3::splat(2.0),
            ..Transform::from_translation(Vec3::new(1.0, 2.0, 3.0))
        };
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(3.0, 2.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn uniform_scale_keeps_normals_direction() {
        let t = Transform::from_uniform_scale(1.04);
        let n = t.normal_matrix().transform_vector3(Vec3::Z).normalize();
        assert!((n - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn rotation_turns_normals_with_the_mesh() {
        let t = Transform::IDENTITY.with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let n = t.normal_matrix().transform_vector3(Vec3::Z);
        assert!((n - Vec3::X).length() < 1e-6);
    }
}
