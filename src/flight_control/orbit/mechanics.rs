use super::orbit_snapshot::OrbitSnapshot;
use crate::error::{GuidanceError, GuidanceResult};
use crate::flight_control::common::Vector3;

/// Standard gravity used to convert specific impulse to exhaust velocity (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Vis-viva speed `sqrt(mu · (2/r − 1/a))`.
///
/// # Errors
/// [`GuidanceError::InvalidOrbit`] if `a` or `r` is not positive or `r` lies beyond the
/// apoapsis of an orbit with semi-major axis `a`.
pub fn vis_viva(mu: f64, radius: f64, semi_major_axis: f64) -> GuidanceResult<f64> {
    if radius <= 0.0 || semi_major_axis <= 0.0 {
        return Err(GuidanceError::InvalidOrbit);
    }
    let energy_term = 2.0 / radius - 1.0 / semi_major_axis;
    if energy_term < 0.0 {
        return Err(GuidanceError::InvalidOrbit);
    }
    Ok((mu * energy_term).sqrt())
}

/// Speed at `altitude` on the orbit with the given apsis altitudes.
///
/// The semi-major axis is `(apoapsis + periapsis) / 2 + body_radius`, with both apsides given
/// as altitudes above the equatorial radius. Passing the same value three times yields the
/// circular speed at that altitude.
///
/// # Errors
/// See [`vis_viva`].
pub fn circular_or_elliptical_speed(
    mu: f64,
    body_radius: f64,
    apoapsis_altitude: f64,
    periapsis_altitude: f64,
    altitude: f64,
) -> GuidanceResult<f64> {
    let sma = (apoapsis_altitude + periapsis_altitude) / 2.0 + body_radius;
    vis_viva(mu, body_radius + altitude, sma)
}

/// Orbital velocity at `ut` in the body-centred inertial frame.
pub fn velocity_vector_at_time(orbit: &OrbitSnapshot, ut: f64) -> Vector3 { orbit.state_at(ut).1 }

/// Gravitational acceleration `mu / (radius + altitude)²`.
pub fn local_gravity(mu: f64, body_radius: f64, altitude: f64) -> f64 {
    mu / (body_radius + altitude).powi(2)
}

/// Net upward acceleration of a vertically thrusting vehicle.
pub fn vertical_acceleration(thrust: f64, mass: f64, mu: f64, body_radius: f64, altitude: f64) -> f64 {
    thrust / mass - local_gravity(mu, body_radius, altitude)
}

/// Thrust-to-weight ratio.
///
/// # Errors
/// [`GuidanceError::DivisionByZero`] if `mass` or `g` is zero.
pub fn thrust_to_weight(thrust: f64, mass: f64, g: f64) -> GuidanceResult<f64> {
    let weight = mass * g;
    if weight == 0.0 {
        return Err(GuidanceError::DivisionByZero);
    }
    Ok(thrust / weight)
}

/// Time to deliver `delta_v` with a rocket-equation burn.
///
/// `mass_delta = mass · (1 − e^(−Δv / (g·Isp)))`, `time = mass_delta · g · Isp / thrust`.
///
/// # Arguments
/// - `mass`: Vehicle mass at ignition (kg).
/// - `isp`: Effective specific impulse (s).
/// - `g`: Standard gravity for the Isp conversion.
/// - `delta_v`: Velocity change to deliver (m/s).
/// - `thrust`: Thrust at the commanded throttle (N).
///
/// # Errors
/// [`GuidanceError::DivisionByZero`] if thrust, Isp or `g` is not positive.
pub fn burn_time(mass: f64, isp: f64, g: f64, delta_v: f64, thrust: f64) -> GuidanceResult<f64> {
    if thrust <= 0.0 || isp <= 0.0 || g <= 0.0 || !thrust.is_finite() || !isp.is_finite() {
        return Err(GuidanceError::DivisionByZero);
    }
    let exhaust_vel = g * isp;
    let mass_delta = mass * (1.0 - (-delta_v / exhaust_vel).exp());
    Ok(mass_delta * exhaust_vel / thrust)
}
