use crate::error::{GuidanceError, GuidanceResult};
use num::Float;
use std::{
    fmt::{Display, Formatter},
    ops::{Add, Div, Mul, Neg, Sub},
};

/// A 3D vector generic over any floating point type.
///
/// Used for positions, velocities and attitude directions in whatever reference frame the
/// caller works in. The simulation's frames are y-up, so the orbital plane of an equatorial
/// orbit is the X/Z plane (see [`Vec3D::angle_2d`]).
///
/// # Type Parameters
/// * `T` - The scalar type, usually `f64` (see [`Vector3`]).
#[derive(Debug, PartialEq, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct Vec3D<T> {
    /// The x-component of the vector.
    x: T,
    /// The y-component of the vector.
    y: T,
    /// The z-component of the vector.
    z: T,
}

/// Double precision vector used throughout the orbital code.
pub type Vector3 = Vec3D<f64>;

impl<T: Copy> Vec3D<T> {
    /// Creates a new vector with the given components.
    pub const fn new(x: T, y: T, z: T) -> Self { Self { x, y, z } }

    pub const fn x(&self) -> T { self.x }

    pub const fn y(&self) -> T { self.y }

    pub const fn z(&self) -> T { self.z }

    /// Returns the components as an `(x, y, z)` tuple, the shape actuator calls expect.
    pub const fn to_tuple(self) -> (T, T, T) { (self.x, self.y, self.z) }
}

impl<T: Float> Vec3D<T> {
    /// Creates a zero vector.
    pub fn zero() -> Self { Self::new(T::zero(), T::zero(), T::zero()) }

    /// Computes the dot product with another vector.
    pub fn dot(self, other: Self) -> T { self.x * other.x + self.y * other.y + self.z * other.z }

    /// Computes the cross product `self × other`.
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Computes the euclidean length of the vector.
    pub fn length(self) -> T { self.dot(self).sqrt() }

    /// Scales the vector to unit length.
    ///
    /// # Errors
    /// [`GuidanceError::DivisionByZero`] if the vector has zero length.
    pub fn normalize(self) -> GuidanceResult<Self> {
        let len = self.length();
        if len.is_zero() || !len.is_finite() {
            return Err(GuidanceError::DivisionByZero);
        }
        Ok(self / len)
    }

    /// Signed angle between the projections of `self` and `other` onto the X/Z plane.
    ///
    /// Computed as `atan2(cross_y, dot)` of the planar components, the result lies in
    /// `(-π, π]` and is positive when `other` lies counter-clockwise of `self` looking down
    /// the y-axis of a y-up frame.
    pub fn angle_2d(self, other: Self) -> T {
        let dot = self.x * other.x + self.z * other.z;
        let det = self.x * other.z - self.z * other.x;
        det.atan2(dot)
    }

    /// Unsigned angle between two vectors in `[0, π]`.
    ///
    /// # Errors
    /// [`GuidanceError::DivisionByZero`] if either vector has zero length.
    pub fn angle_3d(self, other: Self) -> GuidanceResult<T> {
        let cos = self.normalize()?.dot(other.normalize()?);
        Ok(cos.max(-T::one()).min(T::one()).acos())
    }

    /// Rotates the vector about `axis` by `angle` radians using Rodrigues' formula.
    ///
    /// # Errors
    /// [`GuidanceError::DivisionByZero`] if `axis` has zero length.
    pub fn rotate(self, axis: Self, angle: T) -> GuidanceResult<Self> {
        let k = axis.normalize()?;
        let (sin, cos) = angle.sin_cos();
        Ok(self * cos + k.cross(self) * sin + k * (k.dot(self) * (T::one() - cos)))
    }

    /// Projects `self` onto the direction of `onto`.
    ///
    /// # Errors
    /// [`GuidanceError::DivisionByZero`] if `onto` has zero length.
    pub fn projection(self, onto: Self) -> GuidanceResult<Self> {
        let denom = onto.dot(onto);
        if denom.is_zero() {
            return Err(GuidanceError::DivisionByZero);
        }
        Ok(onto * (onto.dot(self) / denom))
    }

    /// Removes the component along `normal`, leaving the projection onto the plane `normal`
    /// is orthogonal to.
    ///
    /// # Errors
    /// [`GuidanceError::DivisionByZero`] if `normal` has zero length.
    pub fn projection_on_plane(self, normal: Self) -> GuidanceResult<Self> {
        Ok(self - self.projection(normal)?)
    }

    /// Component-wise comparison within an absolute tolerance.
    pub fn approx_eq(self, other: Self, tol: T) -> bool {
        (self.x - other.x).abs() <= tol
            && (self.y - other.y).abs() <= tol
            && (self.z - other.z).abs() <= tol
    }
}

impl<T: Float> Add for Vec3D<T> {
    type Output = Vec3D<T>;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<T: Float> Sub for Vec3D<T> {
    type Output = Vec3D<T>;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<T: Float> Neg for Vec3D<T> {
    type Output = Vec3D<T>;

    fn neg(self) -> Self::Output { Self::new(-self.x, -self.y, -self.z) }
}

impl<T: Float> Mul<T> for Vec3D<T> {
    type Output = Vec3D<T>;

    /// Scales the vector by `rhs`.
    fn mul(self, rhs: T) -> Self::Output { Self::new(self.x * rhs, self.y * rhs, self.z * rhs) }
}

impl<T: Float> Div<T> for Vec3D<T> {
    type Output = Vec3D<T>;

    /// Divides every component by `rhs`. No zero check; use [`Vec3D::normalize`] for that.
    fn div(self, rhs: T) -> Self::Output { Self::new(self.x / rhs, self.y / rhs, self.z / rhs) }
}

impl<T: Copy> From<(T, T, T)> for Vec3D<T> {
    fn from(tuple: (T, T, T)) -> Self { Self::new(tuple.0, tuple.1, tuple.2) }
}

impl<T: Display> Display for Vec3D<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}
