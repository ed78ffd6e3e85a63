pub mod math;
pub(crate) mod transform;
pub(crate) mod vec3d;

pub use transform::Transform3;
pub use vec3d::{Vec3D, Vector3};
