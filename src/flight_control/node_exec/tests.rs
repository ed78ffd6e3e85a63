use super::{BurnPlan, ExecEvent, ExecState, NodeExecutor};
use crate::config::ExecutorConfig;
use crate::error::GuidanceError;
use crate::flight_control::{
    maneuver::NodePlan,
    orbit::{STANDARD_GRAVITY, burn_time},
    propulsion::{EngineInfo, PartInfo, ResourceKind, StageAnalyzer},
};
use crate::vessel_link::{
    VesselLink,
    mock_link::{Command, MockLink, parking_orbit, single_stage_vehicle, two_stage_vehicle},
};
use rand::Rng;
use tokio::sync::mpsc;

const BOOSTER_BURN: f64 = 1_000.0 * STANDARD_GRAVITY / (100_000.0 / 280.0);

fn drain(rx: &mut mpsc::UnboundedReceiver<ExecEvent>) -> Vec<ExecEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn phases(events: &[ExecEvent]) -> Vec<ExecState> {
    events
        .iter()
        .filter_map(|e| if let ExecEvent::PhaseChanged { to, .. } = e { Some(*to) } else { None })
        .collect()
}

#[test]
fn test_single_stage_plan() {
    let analyzer = StageAnalyzer::new(single_stage_vehicle());
    let plan = BurnPlan::compute(&analyzer, 100.0, 1.0, 2.0).unwrap();
    let expect_total = burn_time(10_000.0, 300.0, STANDARD_GRAVITY, 100.0, 60_000.0).unwrap();
    let expect_lead = burn_time(10_000.0, 300.0, STANDARD_GRAVITY, 50.0, 60_000.0).unwrap();
    assert_eq!(plan.segments().len(), 1);
    assert_eq!(plan.segments()[0].stage_index(), 0);
    assert!((plan.total_burn_time() - expect_total).abs() < 1e-9);
    assert!((plan.lead_time() - expect_lead).abs() < 1e-9);
    assert!(plan.lead_time() > plan.total_burn_time() / 2.0);
    assert!(plan.decouple_times().is_empty());
    assert!((plan.throttle() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_multi_stage_plan() {
    let analyzer = StageAnalyzer::new(two_stage_vehicle());
    let plan = BurnPlan::compute(&analyzer, 400.0, 1.0, 2.0).unwrap();
    let stages: Vec<i32> = plan.segments().iter().map(|s| s.stage_index()).collect();
    assert_eq!(stages, vec![1, 0]);
    assert_eq!(plan.decouple_times().len(), 1);
    let (at, stage) = plan.decouple_times()[0];
    assert_eq!(stage, 1);
    assert!((at - BOOSTER_BURN).abs() < 1e-9);
    let covered: f64 = plan.segments().iter().map(|s| s.delta_v()).sum();
    assert!((covered - 400.0).abs() < 1e-6);
    // half of 400 m/s lies inside the 203 m/s booster
    assert!(plan.lead_time() < BOOSTER_BURN);
    let last = plan.segments()[1];
    assert!((last.cumulative_time() - plan.total_burn_time()).abs() < 1e-9);
}

#[test]
fn test_stage_without_delta_v_is_passed_over() {
    let mut parts = single_stage_vehicle();
    parts.push(PartInfo::new("fairing", 1, 500.0, 500.0));
    parts.push(PartInfo::new("inert-engine", 2, 300.0, 300.0).with_engine(EngineInfo::new(0.0, 10_000.0, 200.0)));
    let analyzer = StageAnalyzer::new(parts);
    assert_eq!(analyzer.current_stage(), 2);
    let plan = BurnPlan::compute(&analyzer, 100.0, 1.0, 2.0).unwrap();
    assert_eq!(plan.segments().len(), 1);
    assert_eq!(plan.segments()[0].stage_index(), 0);
    // both dead stages are dropped at ignition, so stage 0 flies without their mass
    assert_eq!(plan.decouple_times(), &[(0.0, 2), (0.0, 1)]);
    let expect_total = burn_time(10_000.0, 300.0, STANDARD_GRAVITY, 100.0, 60_000.0).unwrap();
    assert!((plan.total_burn_time() - expect_total).abs() < 1e-9);
}

#[test]
fn test_dead_middle_stage_is_dropped() {
    let mut parts = vec![PartInfo::new("probe-core", -1, 1_000.0, 1_000.0)];
    parts.extend(single_stage_vehicle());
    parts.push(PartInfo::new("adapter", 1, 200.0, 200.0));
    parts.push(
        PartInfo::new("fl-t200", 2, 2_000.0, 1_000.0)
            .with_resource(ResourceKind::LiquidFuel, 90.0)
            .with_resource(ResourceKind::Oxidizer, 110.0),
    );
    parts.push(PartInfo::new("lv-t30", 2, 1_000.0, 1_000.0).with_engine(EngineInfo::new(100_000.0, 100_000.0, 280.0)));
    let analyzer = StageAnalyzer::new(parts);
    let plan = BurnPlan::compute(&analyzer, 400.0, 1.0, 2.0).unwrap();
    let stages: Vec<i32> = plan.segments().iter().map(|s| s.stage_index()).collect();
    assert_eq!(stages, vec![2, 0]);
    let decouples = plan.decouple_times();
    assert_eq!(decouples.len(), 2);
    assert_eq!((decouples[0].1, decouples[1].1), (2, 1));
    assert!((decouples[0].0 - decouples[1].0).abs() < f64::EPSILON);
}

#[test]
fn test_plan_exhausted() {
    let analyzer = StageAnalyzer::new(single_stage_vehicle());
    assert_eq!(BurnPlan::compute(&analyzer, 2_000.0, 1.0, 2.0), Err(GuidanceError::PlanningExhausted));
    assert_eq!(
        BurnPlan::compute(&StageAnalyzer::new(Vec::new()), 10.0, 1.0, 2.0),
        Err(GuidanceError::PlanningExhausted)
    );
}

#[test]
fn test_short_burn_runs_at_reduced_throttle() {
    let analyzer = StageAnalyzer::new(single_stage_vehicle());
    let plan = BurnPlan::compute(&analyzer, 5.0, 1.0, 2.0).unwrap();
    assert!(plan.throttle() < 0.5);
    assert!((plan.total_burn_time() - 2.0).abs() < 1e-9);
}

#[test]
fn test_burn_time_monotonic() {
    let mut rng = rand::rng();
    let analyzer = StageAnalyzer::new(two_stage_vehicle());
    for _ in 0..100 {
        let dv = rng.random_range(10.0..1_000.0);
        let throttle = rng.random_range(0.2..1.0);
        let base = BurnPlan::compute(&analyzer, dv, throttle, 0.0).unwrap().total_burn_time();
        let more_dv = BurnPlan::compute(&analyzer, dv + 50.0, throttle, 0.0).unwrap().total_burn_time();
        let more_throttle = BurnPlan::compute(&analyzer, dv, throttle * 1.2, 0.0).unwrap().total_burn_time();
        assert!(more_dv > base);
        assert!(more_throttle < base);
    }
}

#[tokio::test(start_paused = true)]
async fn test_executes_single_stage_node() {
    let link = MockLink::new(single_stage_vehicle(), parking_orbit(1_000.0), 1_000.0);
    let node = link.add_node(&NodePlan::prograde_only(1_200.0, 100.0)).await.unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut executor = NodeExecutor::new(node, ExecutorConfig::default()).with_event_sink(tx);

    let report = executor.execute(&link, 1.0).await.unwrap();

    assert_eq!(report.final_state(), ExecState::Complete);
    assert!(report.residual_delta_v() < 1.0, "residual {}", report.residual_delta_v());
    assert_eq!(report.stages_separated(), 0);
    assert_eq!(link.node_count(), 0);
    assert!(link.throttle().abs() < f64::EPSILON);
    assert_eq!(link.autopilot(), None);
    assert!(link.staging_times().is_empty());

    let lead = report.plan().unwrap().lead_time();
    let commands = link.commands();
    assert!(commands.iter().any(|c| matches!(c, Command::WarpTo(ut) if (ut - (1_200.0 - lead - 60.0)).abs() < 1e-6)));
    let ignition = commands
        .iter()
        .find_map(|c| if let Command::Throttle { ut, value } = c { (*value > 0.0).then_some(*ut) } else { None })
        .unwrap();
    assert!((ignition - (1_200.0 - lead)).abs() < 0.02, "ignition at {ignition}");

    let events = drain(&mut rx);
    assert_eq!(
        phases(&events),
        vec![
            ExecState::Planning,
            ExecState::Warping,
            ExecState::CoastingToIgnition,
            ExecState::BurningFull,
            ExecState::BurningTrim,
            ExecState::Complete
        ]
    );
    assert!(matches!(events.last(), Some(ExecEvent::Completed { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_multi_stage_node_separates_once() {
    let link = MockLink::new(two_stage_vehicle(), parking_orbit(0.0), 0.0);
    let node = link.add_node(&NodePlan::prograde_only(200.0, 400.0)).await.unwrap();
    let mut executor = NodeExecutor::new(node, ExecutorConfig::default());

    let report = executor.execute(&link, 1.0).await.unwrap();

    assert_eq!(report.stages_separated(), 1);
    assert!(report.residual_delta_v() < 1.0, "residual {}", report.residual_delta_v());
    let ignition = link
        .commands()
        .iter()
        .find_map(|c| if let Command::Throttle { ut, value } = c { (*value > 0.0).then_some(*ut) } else { None })
        .unwrap();
    let staged = link.staging_times();
    assert_eq!(staged.len(), 1);
    assert!((staged[0] - (ignition + BOOSTER_BURN)).abs() < 0.05, "staged at {}", staged[0]);
}

#[tokio::test(start_paused = true)]
async fn test_spent_booster_is_dropped_at_ignition() {
    let mut parts = two_stage_vehicle();
    parts.retain(|p| p.name() != "fl-t200");
    parts.push(PartInfo::new("fl-t200-empty", 1, 1_000.0, 1_000.0));
    let link = MockLink::new(parts, parking_orbit(0.0), 0.0);
    let node = link.add_node(&NodePlan::prograde_only(200.0, 100.0)).await.unwrap();
    let mut executor = NodeExecutor::new(node, ExecutorConfig::default());

    let report = executor.execute(&link, 1.0).await.unwrap();

    assert_eq!(report.final_state(), ExecState::Complete);
    assert_eq!(report.plan().unwrap().decouple_times(), &[(0.0, 1)]);
    assert_eq!(report.stages_separated(), 1);
    assert!(report.residual_delta_v() < 1.0, "residual {}", report.residual_delta_v());
    let ignition = link
        .commands()
        .iter()
        .find_map(|c| if let Command::Throttle { ut, value } = c { (*value > 0.0).then_some(*ut) } else { None })
        .unwrap();
    let staged = link.staging_times();
    assert_eq!(staged.len(), 1);
    assert!((staged[0] - ignition).abs() < 0.02, "staged at {}", staged[0]);
}

#[tokio::test(start_paused = true)]
async fn test_negligible_node_is_skipped() {
    let link = MockLink::new(single_stage_vehicle(), parking_orbit(0.0), 0.0);
    let node = link.add_node(&NodePlan::new(50.0, 0.01, 0.02, 0.0)).await.unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut executor = NodeExecutor::new(node, ExecutorConfig::default()).with_event_sink(tx);

    let report = executor.execute(&link, 1.0).await.unwrap();

    assert_eq!(report.final_state(), ExecState::Complete);
    assert!(report.plan().is_none());
    assert_eq!(link.node_count(), 0);
    assert!(link.commands().iter().all(|c| !c.is_actuation()));
    let events = drain(&mut rx);
    assert!(matches!(events.first(), Some(ExecEvent::Skipped { .. })));
    assert_eq!(phases(&events), vec![ExecState::Complete]);
}

#[tokio::test(start_paused = true)]
async fn test_link_failure_leaves_vehicle_safe() {
    let link = MockLink::new(single_stage_vehicle(), parking_orbit(0.0), 0.0).fail_burn_vector_after(3);
    let node = link.add_node(&NodePlan::prograde_only(100.0, 100.0)).await.unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut executor = NodeExecutor::new(node, ExecutorConfig::default()).with_event_sink(tx);

    let result = executor.execute(&link, 1.0).await;

    assert!(matches!(result, Err(GuidanceError::LinkFailure(_))));
    assert!(link.throttle().abs() < f64::EPSILON);
    assert_eq!(link.autopilot(), None);
    assert_eq!(link.node_count(), 1);
    let events = drain(&mut rx);
    let reason = events
        .iter()
        .find_map(|e| match e {
            ExecEvent::Aborted { state: ExecState::CoastingToIgnition, reason } => Some(reason.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(reason, "LinkFailure: connection lost");
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_delta_v_aborts_before_actuation() {
    let link = MockLink::new(single_stage_vehicle(), parking_orbit(0.0), 0.0);
    let node = link.add_node(&NodePlan::prograde_only(100.0, 3_000.0)).await.unwrap();
    let mut executor = NodeExecutor::new(node, ExecutorConfig::default());

    assert_eq!(executor.execute(&link, 1.0).await, Err(GuidanceError::PlanningExhausted));
    assert_eq!(executor.state(), ExecState::Planning);
    assert!(link.commands().iter().all(|c| !c.is_actuation()));
}
