use std::f64::consts::{PI, TAU};

/// Converts radians to degrees.
pub fn rad_to_deg(radians: f64) -> f64 { radians * (180.0 / PI) }

/// Converts degrees to radians.
pub fn deg_to_rad(degrees: f64) -> f64 { degrees * (PI / 180.0) }

/// Wraps an angle into `[0, 2π)`.
pub fn wrap_angle(angle: f64) -> f64 { angle.rem_euclid(TAU) }

/// Wraps a value into `[0, period)`.
///
/// # Arguments
/// - `value`: The value to wrap, may be negative.
/// - `period`: The (positive) period to wrap around.
pub fn wrap_into(value: f64, period: f64) -> f64 { value.rem_euclid(period) }
