use super::part::{PartInfo, ResourceKind};
use crate::flight_control::orbit::STANDARD_GRAVITY;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Aggregated propulsion figures of one decouple stage at a fixed throttle.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stage {
    index: i32,
    mass: f64,
    dry_mass: f64,
    mass_above: f64,
    dry_mass_above: f64,
    thrust: f64,
    mass_flow: f64,
    isp: f64,
    delta_v: f64,
    burn_time: f64,
}

impl Stage {
    pub fn index(&self) -> i32 { self.index }
    pub fn mass(&self) -> f64 { self.mass }
    pub fn dry_mass(&self) -> f64 { self.dry_mass }
    pub fn mass_above(&self) -> f64 { self.mass_above }
    pub fn dry_mass_above(&self) -> f64 { self.dry_mass_above }
    pub fn thrust(&self) -> f64 { self.thrust }
    pub fn mass_flow(&self) -> f64 { self.mass_flow }
    pub fn isp(&self) -> f64 { self.isp }
    pub fn delta_v(&self) -> f64 { self.delta_v }
    pub fn burn_time(&self) -> f64 { self.burn_time }

    /// Total vehicle mass while this stage is the active one.
    pub fn ignition_mass(&self) -> f64 { self.mass + self.mass_above }
}

/// Per-decouple-stage view over a vehicle part list.
///
/// Stages that have no parts are not an error; every figure is zero for them.
#[derive(Debug, Clone)]
pub struct StageAnalyzer {
    parts: Vec<PartInfo>,
}

impl StageAnalyzer {
    pub fn new(parts: Vec<PartInfo>) -> Self { Self { parts } }

    pub fn parts(&self) -> &[PartInfo] { &self.parts }

    fn parts_in(&self, stage: i32) -> impl Iterator<Item = &PartInfo> {
        self.parts.iter().filter(move |p| p.decouple_stage() == stage)
    }

    pub fn stage_mass(&self, stage: i32) -> f64 { self.parts_in(stage).map(PartInfo::mass).sum() }

    pub fn dry_mass(&self, stage: i32) -> f64 { self.parts_in(stage).map(PartInfo::dry_mass).sum() }

    /// Mass of every part that stays attached once `stage` is decoupled.
    pub fn mass_above(&self, stage: i32) -> f64 {
        self.parts.iter().filter(|p| p.decouple_stage() < stage).map(PartInfo::mass).sum()
    }

    pub fn dry_mass_above(&self, stage: i32) -> f64 {
        self.parts.iter().filter(|p| p.decouple_stage() < stage).map(PartInfo::dry_mass).sum()
    }

    /// Wet mass per decouple stage.
    pub fn all_stage_masses(&self) -> BTreeMap<i32, f64> {
        self.parts.iter().fold(BTreeMap::new(), |mut acc, p| {
            *acc.entry(p.decouple_stage()).or_insert(0.0) += p.mass();
            acc
        })
    }

    /// Available thrust of the engines decoupled at `stage`, scaled by `throttle`.
    pub fn thrust(&self, stage: i32, throttle: f64) -> f64 {
        self.parts_in(stage)
            .filter_map(PartInfo::engine)
            .map(|e| e.available_thrust() * throttle)
            .sum()
    }

    /// Thrust-per-Isp flow term of the engines decoupled at `stage`.
    pub fn mass_flow(&self, stage: i32, throttle: f64) -> f64 {
        self.parts_in(stage).filter_map(PartInfo::engine).map(|e| e.mass_flow(throttle)).sum()
    }

    /// Effective specific impulse, zero if the stage has no flowing engine.
    pub fn isp(&self, stage: i32, throttle: f64) -> f64 {
        let flow = self.mass_flow(stage, throttle);
        if flow > 0.0 { self.thrust(stage, throttle) / flow } else { 0.0 }
    }

    /// Tsiolkovsky Δv of `stage` carrying everything above it.
    pub fn delta_v(&self, stage: i32, throttle: f64) -> f64 {
        let isp = self.isp(stage, throttle);
        let mass_above = self.mass_above(stage);
        let wet = self.stage_mass(stage) + mass_above;
        let dry = self.dry_mass(stage) + mass_above;
        if isp <= 0.0 || dry <= 0.0 || wet <= dry {
            return 0.0;
        }
        STANDARD_GRAVITY * isp * (wet / dry).ln()
    }

    /// Propellant mass of `stage`: solid fuel if there is any, otherwise liquid fuel plus
    /// oxidizer. Mixed stages and off-ratio tanks are not accounted for.
    pub fn propellant_mass(&self, stage: i32) -> f64 {
        let mass_of = |kind: ResourceKind| -> f64 {
            self.parts_in(stage).map(|p| p.amount_of(kind)).sum::<f64>() * kind.density()
        };
        let solid = mass_of(ResourceKind::SolidFuel);
        if solid > 0.0 { solid } else { mass_of(ResourceKind::LiquidFuel) + mass_of(ResourceKind::Oxidizer) }
    }

    /// Vacuum burn time of the whole stage propellant load.
    pub fn burn_time(&self, stage: i32, throttle: f64) -> f64 {
        let flow = self.mass_flow(stage, throttle);
        if flow > 0.0 { self.propellant_mass(stage) * STANDARD_GRAVITY / flow } else { 0.0 }
    }

    /// Highest decouple stage present on the vehicle, or `-1` without parts.
    pub fn current_stage(&self) -> i32 {
        self.parts.iter().map(PartInfo::decouple_stage).max().unwrap_or(-1).max(-1)
    }

    /// Every decouple stage index present, highest first.
    pub fn stage_indices(&self) -> Vec<i32> {
        self.parts.iter().map(PartInfo::decouple_stage).unique().sorted().rev().collect()
    }

    pub fn stage(&self, stage: i32, throttle: f64) -> Stage {
        Stage {
            index: stage,
            mass: self.stage_mass(stage),
            dry_mass: self.dry_mass(stage),
            mass_above: self.mass_above(stage),
            dry_mass_above: self.dry_mass_above(stage),
            thrust: self.thrust(stage, throttle),
            mass_flow: self.mass_flow(stage, throttle),
            isp: self.isp(stage, throttle),
            delta_v: self.delta_v(stage, throttle),
            burn_time: self.burn_time(stage, throttle),
        }
    }
}
