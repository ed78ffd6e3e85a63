use std::f64::consts::PI;

/// Half-period of the transfer ellipse between two circular radii.
pub fn transfer_time(r1: f64, r2: f64, mu: f64) -> f64 { PI * ((r1 + r2).powi(3) / (8.0 * mu)).sqrt() }

/// Phase angle the target must lead the vessel by at departure.
pub fn intercept_angle(r1: f64, r2: f64, mu: f64) -> f64 {
    PI - (mu / r2).sqrt() * (transfer_time(r1, r2, mu) / r2)
}

/// Departure burn of the transfer (negative when descending to a lower orbit).
pub fn transfer_delta_v(r1: f64, r2: f64, mu: f64) -> f64 {
    (mu / r1).sqrt() * ((2.0 * r2 / (r1 + r2)).sqrt() - 1.0)
}
