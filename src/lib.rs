//! Closed-loop guidance for staged rockets flown in an external physics simulation.
//!
//! The crate plans orbital maneuvers, predicts multi-stage burns and drives throttle,
//! attitude and staging through a [`VesselLink`] implemented by the simulation bridge.
#![allow(clippy::doc_markdown)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod logger;

mod config;
mod error;
mod flight_control;
mod vessel_link;

pub use config::{AscentConfig, ExecutorConfig};
pub use error::{GuidanceError, GuidanceResult};
pub use flight_control::{
    common::{Transform3, Vec3D, Vector3, math},
    control::{PidController, SimTimer},
    guidance::{AscentGuidance, HoverslamGuidance, HoverslamInputs},
    maneuver::{
        Apsis, ManeuverNode, ManeuverPlanner, NodePlan, hohmann, plan_change_opposite_apsis, plan_circularize,
        plan_inclination_change, plan_transfer,
    },
    node_exec::{BurnPlan, BurnSegment, ExecEvent, ExecReport, ExecState, NodeExecutor},
    orbit::{
        OrbitSnapshot, STANDARD_GRAVITY, burn_time, circular_or_elliptical_speed, local_gravity, thrust_to_weight,
        vertical_acceleration, velocity_vector_at_time, vis_viva,
    },
    propulsion::{EngineInfo, PartInfo, ResourceAmount, ResourceKind, Stage, StageAnalyzer},
};
pub use vessel_link::{FlightTelemetry, ReferenceFrame, TelemetryCondition, VesselLink};
