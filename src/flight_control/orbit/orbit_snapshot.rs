use crate::error::{GuidanceError, GuidanceResult};
use crate::flight_control::common::{Transform3, Vector3, math::wrap_angle};
use std::f64::consts::{PI, TAU};

/// Read-only Keplerian snapshot of an elliptical orbit, as pulled from telemetry.
///
/// All angles are in radians, lengths in metres, times in seconds of simulation universal
/// time. The snapshot is never refreshed by the core; callers fetch a new one whenever a
/// blocking wait may have invalidated it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrbitSnapshot {
    /// Semi-major axis measured from the body centre.
    semi_major_axis: f64,
    eccentricity: f64,
    inclination: f64,
    /// Longitude of the ascending node.
    lan: f64,
    arg_periapsis: f64,
    /// Mean anomaly at `epoch`.
    mean_anomaly_at_epoch: f64,
    epoch: f64,
    /// Gravitational parameter of the orbited body.
    mu: f64,
    /// Equatorial radius of the orbited body.
    body_radius: f64,
}

impl OrbitSnapshot {
    const KEPLER_MAX_ITER: usize = 64;
    const KEPLER_TOL: f64 = 1e-12;

    /// Creates a new snapshot.
    ///
    /// # Errors
    /// [`GuidanceError::InvalidOrbit`] if the elements do not describe a bound, elliptical
    /// orbit (`0 <= e < 1`, `a > 0`, `mu > 0`).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        lan: f64,
        arg_periapsis: f64,
        mean_anomaly_at_epoch: f64,
        epoch: f64,
        mu: f64,
        body_radius: f64,
    ) -> GuidanceResult<Self> {
        let all_finite = [
            semi_major_axis,
            eccentricity,
            inclination,
            lan,
            arg_periapsis,
            mean_anomaly_at_epoch,
            epoch,
            mu,
            body_radius,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite || semi_major_axis <= 0.0 || mu <= 0.0 || !(0.0..1.0).contains(&eccentricity) {
            return Err(GuidanceError::InvalidOrbit);
        }
        Ok(Self {
            semi_major_axis,
            eccentricity,
            inclination,
            lan,
            arg_periapsis,
            mean_anomaly_at_epoch,
            epoch,
            mu,
            body_radius,
        })
    }

    /// Builds an orbit from apsis altitudes above the body surface, with the vessel at
    /// periapsis at `epoch`.
    ///
    /// # Errors
    /// [`GuidanceError::InvalidOrbit`] if the apsides are inconsistent or below the centre.
    #[allow(clippy::too_many_arguments)]
    pub fn from_apsides(
        apoapsis_altitude: f64,
        periapsis_altitude: f64,
        inclination: f64,
        lan: f64,
        arg_periapsis: f64,
        epoch: f64,
        mu: f64,
        body_radius: f64,
    ) -> GuidanceResult<Self> {
        let r_a = apoapsis_altitude + body_radius;
        let r_p = periapsis_altitude + body_radius;
        if r_p <= 0.0 || r_a < r_p {
            return Err(GuidanceError::InvalidOrbit);
        }
        let sma = (r_a + r_p) / 2.0;
        let ecc = (r_a - r_p) / (r_a + r_p);
        Self::new(sma, ecc, inclination, lan, arg_periapsis, 0.0, epoch, mu, body_radius)
    }

    pub fn semi_major_axis(&self) -> f64 { self.semi_major_axis }
    pub fn eccentricity(&self) -> f64 { self.eccentricity }
    pub fn inclination(&self) -> f64 { self.inclination }
    pub fn longitude_of_ascending_node(&self) -> f64 { self.lan }
    pub fn argument_of_periapsis(&self) -> f64 { self.arg_periapsis }
    pub fn mu(&self) -> f64 { self.mu }
    pub fn body_radius(&self) -> f64 { self.body_radius }

    pub fn apoapsis(&self) -> f64 { self.semi_major_axis * (1.0 + self.eccentricity) }
    pub fn periapsis(&self) -> f64 { self.semi_major_axis * (1.0 - self.eccentricity) }
    pub fn apoapsis_altitude(&self) -> f64 { self.apoapsis() - self.body_radius }
    pub fn periapsis_altitude(&self) -> f64 { self.periapsis() - self.body_radius }

    /// Mean angular rate `sqrt(mu / a³)`.
    pub fn mean_motion(&self) -> f64 { (self.mu / self.semi_major_axis.powi(3)).sqrt() }

    pub fn period(&self) -> f64 { TAU / self.mean_motion() }

    /// Speed of a circular orbit with this orbit's semi-major axis.
    pub fn circular_speed(&self) -> f64 { (self.mu / self.semi_major_axis).sqrt() }

    /// Mean anomaly at `ut`, wrapped into `[0, 2π)`.
    pub fn mean_anomaly_at(&self, ut: f64) -> f64 {
        wrap_angle(self.mean_anomaly_at_epoch + self.mean_motion() * (ut - self.epoch))
    }

    /// Eccentric anomaly at `ut`, solving Kepler's equation `M = E - e·sin E` by Newton
    /// iteration.
    pub fn eccentric_anomaly_at(&self, ut: f64) -> f64 {
        let m = self.mean_anomaly_at(ut);
        let e = self.eccentricity;
        let mut ecc_anom = if e < 0.8 { m } else { PI };
        for _ in 0..Self::KEPLER_MAX_ITER {
            let f = ecc_anom - e * ecc_anom.sin() - m;
            ecc_anom -= f / (1.0 - e * ecc_anom.cos());
            if f.abs() < Self::KEPLER_TOL {
                break;
            }
        }
        ecc_anom
    }

    pub fn true_anomaly_at(&self, ut: f64) -> f64 {
        let half_e = self.eccentric_anomaly_at(ut) / 2.0;
        let e = self.eccentricity;
        wrap_angle(2.0 * ((1.0 + e).sqrt() * half_e.sin()).atan2((1.0 - e).sqrt() * half_e.cos()))
    }

    /// Distance from the body centre at `ut`.
    pub fn radius_at(&self, ut: f64) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentric_anomaly_at(ut).cos())
    }

    pub fn time_to_apoapsis(&self, ut: f64) -> f64 {
        wrap_angle(PI - self.mean_anomaly_at(ut)) / self.mean_motion()
    }

    pub fn time_to_periapsis(&self, ut: f64) -> f64 {
        wrap_angle(TAU - self.mean_anomaly_at(ut)) / self.mean_motion()
    }

    /// Perifocal-to-body-frame transform of this orbit.
    pub fn perifocal_transform(&self) -> Transform3 {
        Transform3::perifocal_to_body(self.arg_periapsis, self.inclination, self.lan)
    }

    /// Position and velocity at `ut` in the body-centred, non-rotating, y-up frame.
    pub fn state_at(&self, ut: f64) -> (Vector3, Vector3) {
        let a = self.semi_major_axis;
        let e = self.eccentricity;
        let ecc_anom = self.eccentric_anomaly_at(ut);
        let (sin_e, cos_e) = ecc_anom.sin_cos();
        let root = (1.0 - e * e).sqrt();
        let r = a * (1.0 - e * cos_e);
        let pos = Vector3::new(a * (cos_e - e), a * root * sin_e, 0.0);
        let vel = Vector3::new(-sin_e, root * cos_e, 0.0) * ((self.mu * a).sqrt() / r);
        let rot = self.perifocal_transform();
        (rot * pos, rot * vel)
    }

    /// Angle between the orbital planes of `self` and `other`.
    ///
    /// # Errors
    /// [`GuidanceError::DivisionByZero`] only for degenerate (zero-size) snapshots.
    pub fn relative_inclination(&self, other: &OrbitSnapshot) -> GuidanceResult<f64> {
        let n_self = self.perifocal_transform() * Vector3::new(0.0, 0.0, 1.0);
        let n_other = other.perifocal_transform() * Vector3::new(0.0, 0.0, 1.0);
        n_self.angle_3d(n_other)
    }
}
