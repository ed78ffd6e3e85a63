#[cfg(test)]
pub(crate) mod mock_link;
mod telemetry;
#[allow(clippy::module_inception)]
mod vessel_link;

pub use telemetry::{FlightTelemetry, ReferenceFrame, TelemetryCondition};
pub use vessel_link::VesselLink;
