use strum_macros::Display;

/// Failure conditions of the guidance core.
///
/// Every variant is fatal to the maneuver that raised it: callers abort and do not retry.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum GuidanceError {
    /// A zero-length vector was normalized, or a burn was requested with no thrust.
    DivisionByZero,
    /// Orbital-element math was fed a parabolic or hyperbolic orbit.
    InvalidOrbit,
    /// The stage walk ran out of stages before covering the required delta-v.
    PlanningExhausted,
    /// The telemetry/actuation provider reported a failure.
    #[strum(to_string = "LinkFailure: {0}")]
    LinkFailure(String),
}

impl std::error::Error for GuidanceError {}

pub type GuidanceResult<T> = Result<T, GuidanceError>;
