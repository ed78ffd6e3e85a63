use crate::flight_control::common::Vector3;
use strum_macros::{Display, EnumIter, EnumString};

/// Orbit apsis at which a maneuver is placed.
#[derive(
    Debug, Display, EnumString, EnumIter, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub enum Apsis {
    Apoapsis,
    Periapsis,
}

/// A maneuver computed by the planner but not yet handed to the vehicle.
///
/// Δv is expressed in the orbital frame at `ut`: prograde, orbit-normal and radial.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodePlan {
    ut: f64,
    prograde: f64,
    normal: f64,
    radial: f64,
}

impl NodePlan {
    pub fn new(ut: f64, prograde: f64, normal: f64, radial: f64) -> Self {
        Self { ut, prograde, normal, radial }
    }

    pub fn prograde_only(ut: f64, prograde: f64) -> Self { Self::new(ut, prograde, 0.0, 0.0) }

    pub fn ut(&self) -> f64 { self.ut }
    pub fn prograde(&self) -> f64 { self.prograde }
    pub fn normal(&self) -> f64 { self.normal }
    pub fn radial(&self) -> f64 { self.radial }

    /// Δv components as `(prograde, normal, radial)`.
    pub fn components(&self) -> Vector3 { Vector3::new(self.prograde, self.normal, self.radial) }

    pub fn delta_v(&self) -> f64 { self.components().length() }
}

/// A maneuver node registered with the vehicle.
///
/// Created by the provider from a [`NodePlan`] and owned by exactly one execution attempt; the
/// executor removes it from the vehicle once it completes.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ManeuverNode {
    id: u64,
    plan: NodePlan,
}

impl ManeuverNode {
    pub fn new(id: u64, plan: NodePlan) -> Self { Self { id, plan } }

    /// Provider handle of the node.
    pub fn id(&self) -> u64 { self.id }
    pub fn ut(&self) -> f64 { self.plan.ut() }
    pub fn plan(&self) -> &NodePlan { &self.plan }
    pub fn delta_v(&self) -> f64 { self.plan.delta_v() }
}
