use strum_macros::{Display, EnumIter};

/// Phases of a node execution, in the order they are entered.
#[derive(Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ExecState {
    Idle,
    Planning,
    Warping,
    CoastingToIgnition,
    BurningFull,
    BurningTrim,
    Complete,
}

/// Structured progress reports of an executor.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecEvent {
    PhaseChanged { from: ExecState, to: ExecState },
    StageSeparated { stage: i32, ut: f64 },
    /// The node held less Δv than is worth burning and was dropped untouched.
    Skipped { remaining_delta_v: f64 },
    Aborted { state: ExecState, reason: String },
    Completed { residual_delta_v: f64 },
}
