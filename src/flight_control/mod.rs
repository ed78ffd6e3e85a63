pub mod common;
pub mod control;
pub mod guidance;
pub mod maneuver;
pub mod node_exec;
pub mod orbit;
pub mod propulsion;
