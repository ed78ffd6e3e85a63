use crate::error::{GuidanceError, GuidanceResult};
use crate::flight_control::{
    orbit::{STANDARD_GRAVITY, burn_time},
    propulsion::StageAnalyzer,
};

/// Δv below this counts as covered.
const DV_EPS: f64 = 1e-6;

/// One stage's share of a burn.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BurnSegment {
    stage_index: i32,
    delta_v: f64,
    duration: f64,
    /// Burn time elapsed at the end of this segment, measured from ignition.
    cumulative_time: f64,
}

impl BurnSegment {
    pub fn stage_index(&self) -> i32 { self.stage_index }
    pub fn delta_v(&self) -> f64 { self.delta_v }
    pub fn duration(&self) -> f64 { self.duration }
    pub fn cumulative_time(&self) -> f64 { self.cumulative_time }
}

/// Open-loop prediction of a multi-stage burn.
///
/// Computed once before ignition and never revised; all times are relative to ignition.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BurnPlan {
    throttle: f64,
    segments: Vec<BurnSegment>,
    /// Ignition happens this long before the node so half the Δv lies on either side.
    lead_time: f64,
    total_burn_time: f64,
    /// Burn times at which the exhausted stage is dropped, paired with its index.
    decouple_times: Vec<(f64, i32)>,
}

impl BurnPlan {
    /// Plans a burn of `delta_v` at `throttle`, walking down from the current stage.
    ///
    /// Burns shorter than `min_burn_time` are replanned once at the throttle that stretches
    /// them to exactly `min_burn_time`.
    ///
    /// # Errors
    /// - [`GuidanceError::PlanningExhausted`] if all stages together cannot deliver `delta_v`.
    /// - [`GuidanceError::DivisionByZero`] if a stage with Δv reports no thrust.
    pub fn compute(
        analyzer: &StageAnalyzer,
        delta_v: f64,
        throttle: f64,
        min_burn_time: f64,
    ) -> GuidanceResult<Self> {
        let plan = Self::walk(analyzer, delta_v, throttle)?;
        if plan.total_burn_time > 0.0 && plan.total_burn_time < min_burn_time {
            let reduced = throttle * plan.total_burn_time / min_burn_time;
            return Self::walk(analyzer, delta_v, reduced);
        }
        Ok(plan)
    }

    fn walk(analyzer: &StageAnalyzer, delta_v: f64, throttle: f64) -> GuidanceResult<Self> {
        let half = delta_v / 2.0;
        let mut remaining = delta_v;
        let mut delivered = 0.0;
        let mut elapsed = 0.0;
        let mut lead_time = None;
        let mut segments = Vec::new();
        let mut decouple_times = Vec::new();

        for index in (-1..=analyzer.current_stage()).rev() {
            if remaining <= DV_EPS {
                break;
            }
            let stage = analyzer.stage(index, throttle);
            if stage.delta_v() <= 0.0 {
                // dead weight still attached; drop it as soon as the walk reaches it
                if index >= 0 {
                    decouple_times.push((elapsed, index));
                }
                continue;
            }
            let finishes_here = stage.delta_v() >= remaining;
            let (dv, duration) = if finishes_here {
                let t = burn_time(stage.ignition_mass(), stage.isp(), STANDARD_GRAVITY, remaining, stage.thrust())?;
                (remaining, t)
            } else {
                (stage.delta_v(), stage.burn_time())
            };
            if lead_time.is_none() && delivered + dv >= half {
                let to_half = half - delivered;
                let t = burn_time(stage.ignition_mass(), stage.isp(), STANDARD_GRAVITY, to_half, stage.thrust())?;
                lead_time = Some(elapsed + t);
            }
            elapsed += duration;
            delivered += dv;
            remaining -= dv;
            segments.push(BurnSegment { stage_index: index, delta_v: dv, duration, cumulative_time: elapsed });
            if !finishes_here {
                decouple_times.push((elapsed, index));
            }
        }

        if remaining > DV_EPS {
            return Err(GuidanceError::PlanningExhausted);
        }
        Ok(Self { throttle, segments, lead_time: lead_time.unwrap_or(0.0), total_burn_time: elapsed, decouple_times })
    }

    pub fn throttle(&self) -> f64 { self.throttle }
    pub fn segments(&self) -> &[BurnSegment] { &self.segments }
    pub fn lead_time(&self) -> f64 { self.lead_time }
    pub fn total_burn_time(&self) -> f64 { self.total_burn_time }
    pub fn decouple_times(&self) -> &[(f64, i32)] { &self.decouple_times }
}
