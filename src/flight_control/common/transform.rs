use super::vec3d::Vector3;
use crate::error::GuidanceResult;
use std::ops::Mul;

/// A 3x3 linear frame transform acting on [`Vector3`]s.
///
/// Rotations compose by multiplication (`a * b` applies `b` first) so frame conversions can
/// be assembled from elementary rotations and tested on their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3 {
    m: [[f64; 3]; 3],
}

impl Transform3 {
    pub const fn new(m: [[f64; 3]; 3]) -> Self { Self { m } }

    pub const fn identity() -> Self { Self::new([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]) }

    /// Right-handed rotation by `angle` radians about the x-axis.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new([[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]])
    }

    /// Right-handed rotation by `angle` radians about the z-axis.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Rotation by `angle` radians about an arbitrary axis (matrix form of Rodrigues' formula).
    ///
    /// # Errors
    /// [`crate::GuidanceError::DivisionByZero`] if `axis` has zero length.
    pub fn about_axis(axis: Vector3, angle: f64) -> GuidanceResult<Self> {
        let k = axis.normalize()?;
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = k.to_tuple();
        Ok(Self::new([
            [t * x * x + c, t * x * y - s * z, t * x * z + s * y],
            [t * x * y + s * z, t * y * y + c, t * y * z - s * x],
            [t * x * z - s * y, t * y * z + s * x, t * z * z + c],
        ]))
    }

    /// Maps the classical right-handed, z-up equatorial frame onto the simulation's y-up
    /// body frame by exchanging the y and z axes.
    pub const fn equatorial_to_body() -> Self {
        Self::new([[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]])
    }

    /// Classical perifocal-to-equatorial rotation `Rz(Ω) · Rx(i) · Rz(ω)`.
    pub fn perifocal_to_equatorial(arg_periapsis: f64, inclination: f64, lan: f64) -> Self {
        Self::rotation_z(lan) * Self::rotation_x(inclination) * Self::rotation_z(arg_periapsis)
    }

    /// Perifocal frame straight into the simulation's body-centred inertial frame.
    pub fn perifocal_to_body(arg_periapsis: f64, inclination: f64, lan: f64) -> Self {
        Self::equatorial_to_body() * Self::perifocal_to_equatorial(arg_periapsis, inclination, lan)
    }

    pub fn transpose(&self) -> Self {
        let mut t = [[0.0; 3]; 3];
        for (i, row) in self.m.iter().enumerate() {
            for (j, val) in row.iter().enumerate() {
                t[j][i] = *val;
            }
        }
        Self::new(t)
    }

    pub fn apply(&self, v: Vector3) -> Vector3 {
        let row = |r: &[f64; 3]| r[0] * v.x() + r[1] * v.y() + r[2] * v.z();
        Vector3::new(row(&self.m[0]), row(&self.m[1]), row(&self.m[2]))
    }

    pub fn get(&self, row: usize, col: usize) -> f64 { self.m[row][col] }
}

impl Mul for Transform3 {
    type Output = Transform3;

    fn mul(self, rhs: Self) -> Self::Output {
        let mut out = [[0.0; 3]; 3];
        for (i, out_row) in out.iter_mut().enumerate() {
            for (j, cell) in out_row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }
        Transform3::new(out)
    }
}

impl Mul<Vector3> for Transform3 {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Self::Output { self.apply(rhs) }
}
