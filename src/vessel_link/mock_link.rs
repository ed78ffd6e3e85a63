use super::{FlightTelemetry, ReferenceFrame, TelemetryCondition, VesselLink};
use crate::error::{GuidanceError, GuidanceResult};
use crate::flight_control::{
    common::Vector3,
    maneuver::{ManeuverNode, NodePlan},
    orbit::{OrbitSnapshot, STANDARD_GRAVITY},
    propulsion::{EngineInfo, PartInfo, ResourceKind, StageAnalyzer},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Actuator commands recorded by [`MockLink`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    Throttle { ut: f64, value: f64 },
    Engage(ReferenceFrame),
    Disengage,
    Direction(Vector3),
    PitchHeading { pitch: f64, heading: f64 },
    Stage { ut: f64 },
    AddNode(u64),
    RemoveNode(u64),
    WarpTo(f64),
}

impl Command {
    /// Whether the command moves the vehicle (as opposed to bookkeeping).
    pub(crate) fn is_actuation(&self) -> bool {
        !matches!(self, Command::AddNode(_) | Command::RemoveNode(_) | Command::WarpTo(_))
    }
}

type FlightProfile = Box<dyn Fn(f64) -> FlightTelemetry + Send + Sync>;
type OrbitProfile = Box<dyn Fn(f64) -> OrbitSnapshot + Send + Sync>;

struct NodeState {
    node: ManeuverNode,
    delivered: f64,
}

struct MockState {
    parts: Vec<PartInfo>,
    ignited: bool,
    /// Propellant mass burned from the current stage.
    burned: f64,
    throttle: f64,
    warp_offset: f64,
    last_update: f64,
    nodes: HashMap<u64, NodeState>,
    next_id: u64,
    autopilot: Option<ReferenceFrame>,
    commands: Vec<Command>,
    fail_burn_vector_after: Option<usize>,
}

/// In-process simulation used by the test suites.
///
/// Simulation time follows tokio's clock (run tests with paused time) plus any warp offset.
/// Active engines are those of the highest decouple stage; thrust is integrated lazily with
/// the rocket equation whenever the link is touched, and every node is credited with the
/// delivered Δv as if the vessel pointed perfectly along it.
pub(crate) struct MockLink {
    state: Mutex<MockState>,
    profile: FlightProfile,
    orbit: OrbitProfile,
    ut_tx: watch::Sender<f64>,
    started: Instant,
    base_ut: f64,
}

impl MockLink {
    pub(crate) fn new(parts: Vec<PartInfo>, orbit: OrbitSnapshot, base_ut: f64) -> Self {
        let (ut_tx, _) = watch::channel(base_ut);
        Self {
            state: Mutex::new(MockState {
                parts,
                ignited: true,
                burned: 0.0,
                throttle: 0.0,
                warp_offset: 0.0,
                last_update: base_ut,
                nodes: HashMap::new(),
                next_id: 1,
                autopilot: None,
                commands: Vec::new(),
                fail_burn_vector_after: None,
            }),
            profile: Box::new(|_| FlightTelemetry::default()),
            orbit: Box::new(move |_| orbit),
            ut_tx,
            started: Instant::now(),
            base_ut,
        }
    }

    /// Engines stay cold until the first staging command.
    pub(crate) fn on_pad(mut self) -> Self {
        self.state.get_mut().unwrap().ignited = false;
        self
    }

    pub(crate) fn with_flight_profile(
        mut self,
        profile: impl Fn(f64) -> FlightTelemetry + Send + Sync + 'static,
    ) -> Self {
        self.profile = Box::new(profile);
        self
    }

    pub(crate) fn with_orbit_profile(mut self, orbit: impl Fn(f64) -> OrbitSnapshot + Send + Sync + 'static) -> Self {
        self.orbit = Box::new(orbit);
        self
    }

    /// Lets `calls` burn-vector queries succeed and fails every later one.
    pub(crate) fn fail_burn_vector_after(mut self, calls: usize) -> Self {
        self.state.get_mut().unwrap().fail_burn_vector_after = Some(calls);
        self
    }

    pub(crate) fn commands(&self) -> Vec<Command> { self.state.lock().unwrap().commands.clone() }

    pub(crate) fn throttle(&self) -> f64 { self.state.lock().unwrap().throttle }

    pub(crate) fn autopilot(&self) -> Option<ReferenceFrame> { self.state.lock().unwrap().autopilot }

    pub(crate) fn node_count(&self) -> usize { self.state.lock().unwrap().nodes.len() }

    pub(crate) fn staging_times(&self) -> Vec<f64> {
        self.commands()
            .into_iter()
            .filter_map(|c| if let Command::Stage { ut } = c { Some(ut) } else { None })
            .collect()
    }

    pub(crate) fn delivered(&self, node: &ManeuverNode) -> f64 {
        self.state.lock().unwrap().nodes.get(&node.id()).map_or(0.0, |n| n.delivered)
    }

    fn now(&self, state: &MockState) -> f64 {
        self.base_ut + self.started.elapsed().as_secs_f64() + state.warp_offset
    }

    fn current_stage(state: &MockState) -> i32 { StageAnalyzer::new(state.parts.clone()).current_stage() }

    fn active_engines(state: &MockState) -> Vec<EngineInfo> {
        let stage = Self::current_stage(state);
        state
            .parts
            .iter()
            .filter(|p| p.decouple_stage() == stage)
            .filter_map(|p| p.engine().copied())
            .collect()
    }

    fn propellant_left(state: &MockState) -> f64 {
        let analyzer = StageAnalyzer::new(state.parts.clone());
        (analyzer.propellant_mass(analyzer.current_stage()) - state.burned).max(0.0)
    }

    fn total_mass(state: &MockState) -> f64 {
        state.parts.iter().map(PartInfo::mass).sum::<f64>() - state.burned
    }

    /// Integrates thrust from the last update up to now.
    fn advance(&self, state: &mut MockState) -> f64 {
        let now = self.now(state);
        let dt = now - state.last_update;
        if dt > 0.0 && state.ignited && state.throttle > 0.0 {
            let engines = Self::active_engines(state);
            let thrust: f64 = engines.iter().map(|e| e.available_thrust() * state.throttle).sum();
            let flow: f64 = engines.iter().map(|e| e.mass_flow(state.throttle)).sum::<f64>() / STANDARD_GRAVITY;
            if thrust > 0.0 && flow > 0.0 {
                let burn_dt = dt.min(Self::propellant_left(state) / flow);
                let m0 = Self::total_mass(state);
                let m1 = m0 - flow * burn_dt;
                let dv = thrust / flow * (m0 / m1).ln();
                state.burned += flow * burn_dt;
                for node in state.nodes.values_mut() {
                    node.delivered += dv;
                }
            }
        }
        state.last_update = now;
        self.ut_tx.send_replace(now);
        now
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MockState, f64) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        let now = self.advance(&mut state);
        f(&mut state, now)
    }
}

#[async_trait]
impl VesselLink for MockLink {
    async fn ut(&self) -> GuidanceResult<f64> { Ok(self.with_state(|_, now| now)) }

    fn ut_stream(&self) -> watch::Receiver<f64> { self.ut_tx.subscribe() }

    async fn mass(&self) -> GuidanceResult<f64> { Ok(self.with_state(|s, _| Self::total_mass(s))) }

    async fn available_thrust(&self) -> GuidanceResult<f64> {
        Ok(self.with_state(|s, _| {
            if Self::propellant_left(s) <= 0.0 {
                return 0.0;
            }
            Self::active_engines(s).iter().map(EngineInfo::available_thrust).sum()
        }))
    }

    async fn specific_impulse(&self) -> GuidanceResult<f64> {
        Ok(self.with_state(|s, _| {
            let engines = Self::active_engines(s);
            let thrust: f64 = engines.iter().map(EngineInfo::available_thrust).sum();
            let flow: f64 = engines.iter().map(|e| e.mass_flow(1.0)).sum();
            if flow > 0.0 { thrust / flow } else { 0.0 }
        }))
    }

    async fn parts(&self) -> GuidanceResult<Vec<PartInfo>> { Ok(self.with_state(|s, _| s.parts.clone())) }

    async fn orbit(&self) -> GuidanceResult<OrbitSnapshot> { Ok(self.with_state(|_, now| (self.orbit)(now))) }

    async fn flight(&self) -> GuidanceResult<FlightTelemetry> {
        Ok(self.with_state(|s, now| FlightTelemetry { current_stage: Self::current_stage(s), ..(self.profile)(now) }))
    }

    async fn resource_fraction(&self, decouple_stage: i32, kind: ResourceKind) -> GuidanceResult<f64> {
        Ok(self.with_state(|s, _| {
            let analyzer = StageAnalyzer::new(s.parts.clone());
            let amount: f64 = analyzer
                .parts()
                .iter()
                .filter(|p| p.decouple_stage() == decouple_stage)
                .map(|p| p.amount_of(kind))
                .sum();
            if amount <= 0.0 {
                return 0.0;
            }
            let propellant = analyzer.propellant_mass(decouple_stage);
            if decouple_stage != analyzer.current_stage() || propellant <= 0.0 {
                return 1.0;
            }
            (1.0 - s.burned / propellant).max(0.0)
        }))
    }

    async fn set_throttle(&self, throttle: f64) -> GuidanceResult<()> {
        self.with_state(|s, now| {
            s.throttle = throttle.clamp(0.0, 1.0);
            s.commands.push(Command::Throttle { ut: now, value: throttle });
        });
        Ok(())
    }

    async fn engage_autopilot(&self, frame: ReferenceFrame) -> GuidanceResult<()> {
        self.with_state(|s, _| {
            s.autopilot = Some(frame);
            s.commands.push(Command::Engage(frame));
        });
        Ok(())
    }

    async fn disengage_autopilot(&self) -> GuidanceResult<()> {
        self.with_state(|s, _| {
            s.autopilot = None;
            s.commands.push(Command::Disengage);
        });
        Ok(())
    }

    async fn set_target_direction(&self, direction: Vector3, _frame: ReferenceFrame) -> GuidanceResult<()> {
        self.with_state(|s, _| s.commands.push(Command::Direction(direction)));
        Ok(())
    }

    async fn set_target_pitch_heading(&self, pitch: f64, heading: f64) -> GuidanceResult<()> {
        self.with_state(|s, _| s.commands.push(Command::PitchHeading { pitch, heading }));
        Ok(())
    }

    async fn activate_next_stage(&self) -> GuidanceResult<()> {
        self.with_state(|s, now| {
            if s.ignited {
                let stage = Self::current_stage(s);
                s.parts.retain(|p| p.decouple_stage() != stage);
                s.burned = 0.0;
            } else {
                s.ignited = true;
            }
            s.commands.push(Command::Stage { ut: now });
        });
        Ok(())
    }

    async fn add_node(&self, plan: &NodePlan) -> GuidanceResult<ManeuverNode> {
        Ok(self.with_state(|s, _| {
            let node = ManeuverNode::new(s.next_id, *plan);
            s.next_id += 1;
            s.nodes.insert(node.id(), NodeState { node, delivered: 0.0 });
            s.commands.push(Command::AddNode(node.id()));
            node
        }))
    }

    async fn remove_node(&self, node: &ManeuverNode) -> GuidanceResult<()> {
        self.with_state(|s, _| {
            s.nodes.remove(&node.id());
            s.commands.push(Command::RemoveNode(node.id()));
        });
        Ok(())
    }

    async fn remaining_burn_vector(&self, node: &ManeuverNode) -> GuidanceResult<Vector3> {
        self.with_state(|s, _| {
            if let Some(left) = s.fail_burn_vector_after.as_mut() {
                if *left == 0 {
                    return Err(GuidanceError::LinkFailure("connection lost".to_string()));
                }
                *left -= 1;
            }
            let state = s.nodes.get(&node.id()).ok_or(GuidanceError::LinkFailure("unknown node".to_string()))?;
            let full = state.node.plan().components();
            let remaining = full.length() - state.delivered;
            Ok(full.normalize().map_or(Vector3::zero(), |dir| dir * remaining))
        })
    }

    async fn remaining_delta_v(&self, node: &ManeuverNode) -> GuidanceResult<f64> {
        self.with_state(|s, _| {
            let state = s.nodes.get(&node.id()).ok_or(GuidanceError::LinkFailure("unknown node".to_string()))?;
            Ok((state.node.delta_v() - state.delivered).abs())
        })
    }

    async fn warp_to(&self, ut: f64) -> GuidanceResult<()> {
        self.with_state(|s, now| {
            if ut > now {
                s.warp_offset += ut - now;
                s.last_update = ut;
                self.ut_tx.send_replace(ut);
            }
            s.commands.push(Command::WarpTo(ut));
        });
        Ok(())
    }

    async fn wait_until(&self, condition: TelemetryCondition) -> GuidanceResult<()> {
        loop {
            let reached = self.with_state(|_, now| {
                let flight = (self.profile)(now);
                let orbit = (self.orbit)(now);
                condition.holds(&flight, orbit.apoapsis_altitude(), orbit.periapsis_altitude(), orbit.time_to_apoapsis(now))
            });
            if reached {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

pub(crate) const KERBIN_MU: f64 = 3.5316e12;
pub(crate) const KERBIN_RADIUS: f64 = 600_000.0;

/// 80 km × 150 km equatorial orbit with the vessel at periapsis at `epoch`.
pub(crate) fn parking_orbit(epoch: f64) -> OrbitSnapshot {
    OrbitSnapshot::from_apsides(150_000.0, 80_000.0, 0.0, 0.0, 0.0, epoch, KERBIN_MU, KERBIN_RADIUS).unwrap()
}

/// 10 t vehicle with a single 60 kN / 300 s stage holding 4 t of propellant.
pub(crate) fn single_stage_vehicle() -> Vec<PartInfo> {
    vec![
        PartInfo::new("fl-t800", 0, 9_000.0, 5_000.0)
            .with_resource(ResourceKind::LiquidFuel, 360.0)
            .with_resource(ResourceKind::Oxidizer, 440.0),
        PartInfo::new("lv-909", 0, 1_000.0, 1_000.0).with_engine(EngineInfo::new(60_000.0, 60_000.0, 300.0)),
    ]
}

/// The single-stage vehicle with a 1 t payload on top and a small 100 kN / 280 s booster below.
pub(crate) fn two_stage_vehicle() -> Vec<PartInfo> {
    let mut parts = vec![PartInfo::new("probe-core", -1, 1_000.0, 1_000.0)];
    parts.extend(single_stage_vehicle());
    parts.push(
        PartInfo::new("fl-t200", 1, 2_000.0, 1_000.0)
            .with_resource(ResourceKind::LiquidFuel, 90.0)
            .with_resource(ResourceKind::Oxidizer, 110.0),
    );
    parts.push(PartInfo::new("lv-t30", 1, 1_000.0, 1_000.0).with_engine(EngineInfo::new(100_000.0, 100_000.0, 280.0)));
    parts
}
