mod part;
mod stage_analyzer;

pub use part::{EngineInfo, PartInfo, ResourceAmount, ResourceKind};
pub use stage_analyzer::{Stage, StageAnalyzer};
