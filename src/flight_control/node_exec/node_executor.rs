use super::{
    burn_plan::BurnPlan,
    exec_state::{ExecEvent, ExecState},
};
use crate::config::ExecutorConfig;
use crate::error::GuidanceResult;
use crate::flight_control::{
    maneuver::ManeuverNode,
    orbit::{STANDARD_GRAVITY, burn_time},
    propulsion::StageAnalyzer,
};
use crate::vessel_link::{ReferenceFrame, VesselLink};
use crate::{error, event, info, log, warn};
use std::collections::VecDeque;
use tokio::sync::mpsc;

/// Outcome of a finished execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecReport {
    final_state: ExecState,
    plan: Option<BurnPlan>,
    stages_separated: usize,
    residual_delta_v: f64,
}

impl ExecReport {
    pub fn final_state(&self) -> ExecState { self.final_state }
    /// `None` if the node was skipped without planning.
    pub fn plan(&self) -> Option<&BurnPlan> { self.plan.as_ref() }
    pub fn stages_separated(&self) -> usize { self.stages_separated }
    pub fn residual_delta_v(&self) -> f64 { self.residual_delta_v }
}

/// Drives one maneuver node from planning to removal.
///
/// The executor owns its node for exactly one attempt. Any error ends the attempt: throttle
/// is cut, the autopilot released, and the error handed back without retrying.
pub struct NodeExecutor {
    node: ManeuverNode,
    config: ExecutorConfig,
    state: ExecState,
    events: Option<mpsc::UnboundedSender<ExecEvent>>,
    plan: Option<BurnPlan>,
    stages_separated: usize,
    actuated: bool,
}

impl NodeExecutor {
    /// Coasting ends this long before the planned ignition.
    const IGNITION_MARGIN: f64 = 0.01;

    pub fn new(node: ManeuverNode, config: ExecutorConfig) -> Self {
        Self {
            node,
            config,
            state: ExecState::Idle,
            events: None,
            plan: None,
            stages_separated: 0,
            actuated: false,
        }
    }

    #[must_use]
    pub fn with_event_sink(mut self, events: mpsc::UnboundedSender<ExecEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> ExecState { self.state }
    pub fn node(&self) -> &ManeuverNode { &self.node }

    /// Executes the node at `throttle`.
    ///
    /// # Errors
    /// Any [`crate::GuidanceError`] raised while planning or by the link aborts the execution.
    pub async fn execute<L: VesselLink + ?Sized>(&mut self, link: &L, throttle: f64) -> GuidanceResult<ExecReport> {
        let remaining = link.remaining_delta_v(&self.node).await?;
        if remaining < self.config.negligible_delta_v {
            log!("Node {} holds only {remaining:.4} m/s, skipping", self.node.id());
            self.emit(ExecEvent::Skipped { remaining_delta_v: remaining });
            link.remove_node(&self.node).await?;
            self.transition(ExecState::Complete);
            return Ok(self.report(remaining));
        }

        match self.run(link, throttle, remaining).await {
            Ok(residual) => {
                self.emit(ExecEvent::Completed { residual_delta_v: residual });
                Ok(self.report(residual))
            }
            Err(e) => {
                error!("Node {} aborted in {}: {e}", self.node.id(), self.state);
                if self.actuated {
                    self.safe_vehicle(link).await;
                }
                self.emit(ExecEvent::Aborted { state: self.state, reason: e.to_string() });
                Err(e)
            }
        }
    }

    async fn run<L: VesselLink + ?Sized>(&mut self, link: &L, throttle: f64, delta_v: f64) -> GuidanceResult<f64> {
        self.transition(ExecState::Planning);
        let analyzer = StageAnalyzer::new(link.parts().await?);
        let plan = BurnPlan::compute(&analyzer, delta_v, throttle, self.config.min_burn_time)?;
        let start = self.node.ut() - plan.lead_time();
        let stop = start + plan.total_burn_time();
        info!(
            "Node {}: {delta_v:.2} m/s over {:.2} s at throttle {:.3}, {} stage(s)",
            self.node.id(),
            plan.total_burn_time(),
            plan.throttle(),
            plan.segments().len()
        );
        let burn_throttle = plan.throttle();
        let decouple_offsets: Vec<(f64, i32)> = plan.decouple_times().to_vec();
        self.plan = Some(plan);

        self.transition(ExecState::Warping);
        link.warp_to(start - self.config.warp_lead).await?;

        self.transition(ExecState::CoastingToIgnition);
        tokio::time::sleep(self.config.settle_delay).await;
        self.actuated = true;
        link.set_throttle(0.0).await?;
        link.engage_autopilot(ReferenceFrame::VesselOrbital).await?;
        tokio::time::sleep(self.config.settle_delay).await;
        while link.ut().await? < start - Self::IGNITION_MARGIN {
            self.track(link).await?;
            tokio::time::sleep(self.config.coarse_poll).await;
        }

        self.transition(ExecState::BurningFull);
        link.set_throttle(burn_throttle).await?;
        let ignition = link.ut().await?;
        let mut decouples: VecDeque<(f64, i32)> =
            decouple_offsets.into_iter().map(|(t, stage)| (ignition + t, stage)).collect();
        loop {
            let now = link.ut().await?;
            if now >= stop - self.config.full_burn_cutoff {
                break;
            }
            self.track(link).await?;
            self.check_staging(link, now, &mut decouples).await?;
            tokio::time::sleep(self.config.coarse_poll).await;
        }

        self.transition(ExecState::BurningTrim);
        link.set_throttle(0.0).await?;
        let now = link.ut().await?;
        self.check_staging(link, now, &mut decouples).await?;
        let trim_throttle = burn_throttle * 0.5;
        let remaining = link.remaining_delta_v(&self.node).await?;
        let thrust = link.available_thrust().await? * trim_throttle;
        let trim_time = burn_time(link.mass().await?, link.specific_impulse().await?, STANDARD_GRAVITY, remaining, thrust)?;
        let trim_stop = link.ut().await? + trim_time;
        event!("Trimming {remaining:.3} m/s over {trim_time:.3} s");
        link.set_throttle(trim_throttle).await?;
        loop {
            let now = link.ut().await?;
            if now >= trim_stop - self.config.trim_tolerance {
                break;
            }
            self.track(link).await?;
            self.check_staging(link, now, &mut decouples).await?;
            tokio::time::sleep(self.config.fine_poll).await;
        }

        link.set_throttle(0.0).await?;
        tokio::time::sleep(self.config.settle_delay).await;
        link.disengage_autopilot().await?;
        tokio::time::sleep(self.config.settle_delay).await;
        let residual = link.remaining_delta_v(&self.node).await?;
        link.remove_node(&self.node).await?;
        self.transition(ExecState::Complete);
        info!("Node {} done, residual {residual:.3} m/s", self.node.id());
        Ok(residual)
    }

    /// Points the vessel along the Δv the node still asks for.
    async fn track<L: VesselLink + ?Sized>(&self, link: &L) -> GuidanceResult<()> {
        let burn_vector = link.remaining_burn_vector(&self.node).await?;
        link.set_target_direction(burn_vector, ReferenceFrame::VesselOrbital).await
    }

    /// Drops every stage whose scheduled decouple time has passed.
    async fn check_staging<L: VesselLink + ?Sized>(
        &mut self,
        link: &L,
        now: f64,
        decouples: &mut VecDeque<(f64, i32)>,
    ) -> GuidanceResult<()> {
        while let Some(&(at, stage)) = decouples.front() {
            if now < at {
                break;
            }
            decouples.pop_front();
            link.activate_next_stage().await?;
            self.stages_separated += 1;
            info!("Separated stage {stage} at UT {now:.2}");
            self.emit(ExecEvent::StageSeparated { stage, ut: now });
        }
        Ok(())
    }

    async fn safe_vehicle<L: VesselLink + ?Sized>(&self, link: &L) {
        if let Err(e) = link.set_throttle(0.0).await {
            warn!("Could not cut throttle after abort: {e}");
        }
        if let Err(e) = link.disengage_autopilot().await {
            warn!("Could not release autopilot after abort: {e}");
        }
    }

    fn transition(&mut self, to: ExecState) {
        let from = self.state;
        self.state = to;
        event!("Node {}: {from} -> {to}", self.node.id());
        self.emit(ExecEvent::PhaseChanged { from, to });
    }

    fn emit(&self, event: ExecEvent) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                warn!("Executor event receiver dropped");
            }
        }
    }

    fn report(&self, residual_delta_v: f64) -> ExecReport {
        ExecReport {
            final_state: self.state,
            plan: self.plan.clone(),
            stages_separated: self.stages_separated,
            residual_delta_v,
        }
    }
}
