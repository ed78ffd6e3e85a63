use strum_macros::{Display, EnumIter, EnumString};

/// Reference frames the provider understands for attitude commands.
#[derive(
    Debug, Display, EnumString, EnumIter, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub enum ReferenceFrame {
    /// Prograde / normal / radial axes of the vessel's orbit.
    VesselOrbital,
    /// North / east / up axes at the vessel's position.
    VesselSurface,
    /// Body-centred, non-rotating inertial frame.
    BodyNonRotating,
    /// Body-centred frame rotating with the body.
    BodyRotating,
}

/// Flight-state telemetry the guidance loops sample every iteration.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct FlightTelemetry {
    /// Altitude above sea level (m).
    pub mean_altitude: f64,
    /// Altitude above the terrain (m).
    pub surface_altitude: f64,
    /// Speed relative to the rotating surface (m/s).
    pub surface_speed: f64,
    /// Vertical speed relative to the surface, positive up (m/s).
    pub vertical_speed: f64,
    /// Highest decouple stage still attached.
    pub current_stage: i32,
}

/// Predicates the provider can block on.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TelemetryCondition {
    AltitudeAbove(f64),
    SurfaceAltitudeBelow(f64),
    PeriapsisAbove(f64),
    PeriapsisBelow(f64),
    ApoapsisAbove(f64),
    TimeToApoapsisBelow(f64),
}

impl TelemetryCondition {
    /// Evaluates the condition against sampled values.
    ///
    /// # Arguments
    /// - `flight`: Current flight telemetry.
    /// - `apoapsis_altitude`, `periapsis_altitude`: Apsis altitudes of the current orbit.
    /// - `time_to_apoapsis`: Seconds until the next apoapsis passage.
    pub fn holds(
        &self,
        flight: &FlightTelemetry,
        apoapsis_altitude: f64,
        periapsis_altitude: f64,
        time_to_apoapsis: f64,
    ) -> bool {
        match *self {
            TelemetryCondition::AltitudeAbove(alt) => flight.mean_altitude > alt,
            TelemetryCondition::SurfaceAltitudeBelow(alt) => flight.surface_altitude < alt,
            TelemetryCondition::PeriapsisAbove(alt) => periapsis_altitude > alt,
            TelemetryCondition::PeriapsisBelow(alt) => periapsis_altitude < alt,
            TelemetryCondition::ApoapsisAbove(alt) => apoapsis_altitude > alt,
            TelemetryCondition::TimeToApoapsisBelow(t) => time_to_apoapsis < t,
        }
    }
}
