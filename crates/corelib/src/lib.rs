//! Scene-side math shared by the demos: camera, transforms, time, colors,
//! spherical coordinates, orbit controls and viewport bookkeeping.

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

pub mod camera;
pub mod clock;
pub mod color;
pub mod controls;
pub mod error;
pub mod spherical;
pub mod transform;
pub mod viewport;

pub use error::{CoreError, CoreResult};
