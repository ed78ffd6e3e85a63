use super::telemetry::{FlightTelemetry, ReferenceFrame, TelemetryCondition};
use crate::error::GuidanceResult;
use crate::flight_control::{
    common::Vector3,
    maneuver::{ManeuverNode, NodePlan},
    orbit::OrbitSnapshot,
    propulsion::{PartInfo, ResourceKind},
};
use async_trait::async_trait;
use tokio::sync::watch;

/// Telemetry and actuation contract of the simulation the guidance core flies against.
///
/// Every call may fail with [`crate::GuidanceError::LinkFailure`]. The two blocking operations,
/// [`VesselLink::warp_to`] and [`VesselLink::wait_until`], return only once the simulation
/// reached the requested state; they have no timeout and cannot be cancelled.
#[async_trait]
pub trait VesselLink: Sync {
    /// Current simulation universal time (s).
    async fn ut(&self) -> GuidanceResult<f64>;
    /// Subscription to simulation universal time.
    fn ut_stream(&self) -> watch::Receiver<f64>;

    async fn mass(&self) -> GuidanceResult<f64>;
    /// Thrust of all active engines at full throttle (N).
    async fn available_thrust(&self) -> GuidanceResult<f64>;
    /// Combined specific impulse of all active engines (s).
    async fn specific_impulse(&self) -> GuidanceResult<f64>;
    async fn parts(&self) -> GuidanceResult<Vec<PartInfo>>;
    async fn orbit(&self) -> GuidanceResult<OrbitSnapshot>;
    async fn flight(&self) -> GuidanceResult<FlightTelemetry>;
    /// Remaining fraction (0..=1) of `kind` in the parts decoupled at `decouple_stage`.
    async fn resource_fraction(&self, decouple_stage: i32, kind: ResourceKind) -> GuidanceResult<f64>;

    async fn set_throttle(&self, throttle: f64) -> GuidanceResult<()>;
    async fn engage_autopilot(&self, frame: ReferenceFrame) -> GuidanceResult<()>;
    async fn disengage_autopilot(&self) -> GuidanceResult<()>;
    async fn set_target_direction(&self, direction: Vector3, frame: ReferenceFrame) -> GuidanceResult<()>;
    /// Pitch above the horizon and compass heading, both in degrees.
    async fn set_target_pitch_heading(&self, pitch: f64, heading: f64) -> GuidanceResult<()>;
    async fn activate_next_stage(&self) -> GuidanceResult<()>;

    async fn add_node(&self, plan: &NodePlan) -> GuidanceResult<ManeuverNode>;
    async fn remove_node(&self, node: &ManeuverNode) -> GuidanceResult<()>;
    /// Direction and magnitude of the Δv still owed to `node`, in [`ReferenceFrame::VesselOrbital`].
    async fn remaining_burn_vector(&self, node: &ManeuverNode) -> GuidanceResult<Vector3>;
    async fn remaining_delta_v(&self, node: &ManeuverNode) -> GuidanceResult<f64>;

    async fn warp_to(&self, ut: f64) -> GuidanceResult<()>;
    async fn wait_until(&self, condition: TelemetryCondition) -> GuidanceResult<()>;
}
