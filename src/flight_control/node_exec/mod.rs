mod burn_plan;
mod exec_state;
mod node_executor;
#[cfg(test)]
mod tests;

pub use burn_plan::{BurnPlan, BurnSegment};
pub use exec_state::{ExecEvent, ExecState};
pub use node_executor::{ExecReport, NodeExecutor};
