pub mod hohmann;
mod maneuver_node;
mod maneuver_planner;

pub use maneuver_node::{Apsis, ManeuverNode, NodePlan};
pub use maneuver_planner::{
    ManeuverPlanner, plan_change_opposite_apsis, plan_circularize, plan_inclination_change, plan_transfer,
};
