use super::{
    hohmann,
    maneuver_node::{Apsis, NodePlan},
};
use crate::config::ExecutorConfig;
use crate::error::{GuidanceError, GuidanceResult};
use crate::flight_control::{
    common::math::{wrap_angle, wrap_into},
    node_exec::{ExecEvent, ExecReport, NodeExecutor},
    orbit::{OrbitSnapshot, circular_or_elliptical_speed},
};
use crate::vessel_link::VesselLink;
use crate::{info, log};
use std::f64::consts::PI;
use tokio::sync::mpsc;

/// Relative inclinations below this are treated as coplanar.
const COPLANAR_EPS: f64 = 1e-6;

fn time_to(orbit: &OrbitSnapshot, now: f64, apsis: Apsis) -> f64 {
    match apsis {
        Apsis::Apoapsis => orbit.time_to_apoapsis(now),
        Apsis::Periapsis => orbit.time_to_periapsis(now),
    }
}

fn speed(orbit: &OrbitSnapshot, apoapsis: f64, periapsis: f64, altitude: f64) -> GuidanceResult<f64> {
    circular_or_elliptical_speed(orbit.mu(), orbit.body_radius(), apoapsis, periapsis, altitude)
}

/// Prograde burn at `apsis` that makes the orbit circular at that apsis altitude.
///
/// # Errors
/// [`GuidanceError::InvalidOrbit`] if vis-viva has no solution for the snapshot.
pub fn plan_circularize(orbit: &OrbitSnapshot, now: f64, apsis: Apsis) -> GuidanceResult<NodePlan> {
    let (apo, peri) = (orbit.apoapsis_altitude(), orbit.periapsis_altitude());
    let target = match apsis {
        Apsis::Apoapsis => apo,
        Apsis::Periapsis => peri,
    };
    let current_v = speed(orbit, apo, peri, target)?;
    let target_v = speed(orbit, target, target, target)?;
    Ok(NodePlan::prograde_only(now + time_to(orbit, now, apsis), target_v - current_v))
}

/// Burn at `burn_at` that moves the opposite apsis to `target_altitude`.
///
/// Burning at apoapsis sets a new periapsis, burning at periapsis sets a new apoapsis.
///
/// # Errors
/// [`GuidanceError::InvalidOrbit`] if the resulting orbit has no vis-viva solution.
pub fn plan_change_opposite_apsis(
    orbit: &OrbitSnapshot,
    now: f64,
    burn_at: Apsis,
    target_altitude: f64,
) -> GuidanceResult<NodePlan> {
    let (apo, peri) = (orbit.apoapsis_altitude(), orbit.periapsis_altitude());
    let (current_v, target_v) = match burn_at {
        Apsis::Apoapsis => (speed(orbit, apo, peri, apo)?, speed(orbit, apo, target_altitude, apo)?),
        Apsis::Periapsis => (speed(orbit, apo, peri, peri)?, speed(orbit, target_altitude, peri, peri)?),
    };
    Ok(NodePlan::prograde_only(now + time_to(orbit, now, burn_at), target_v - current_v))
}

/// Plane change onto the orbital plane of `target`, placed at the next usable node.
///
/// The node lies at the line of nodes of the two orbital planes. A negative planar angle to
/// that line puts the burn at the ascending node half an orbit ahead, otherwise at the
/// descending node with the inclination change reversed. Δv is `2·v·sin(Δi/2)`, split into a
/// retrograde and an anti-normal component.
///
/// # Errors
/// [`GuidanceError::DivisionByZero`] for degenerate state vectors.
pub fn plan_inclination_change(
    own: &OrbitSnapshot,
    target: &OrbitSnapshot,
    now: f64,
) -> GuidanceResult<NodePlan> {
    let mut inclination_change = own.relative_inclination(target)?;
    if inclination_change.abs() < COPLANAR_EPS {
        return Ok(NodePlan::new(now, 0.0, 0.0, 0.0));
    }
    let (pos, vel) = own.state_at(now);
    let (target_pos, target_vel) = target.state_at(now);

    let orbital_speed = own.circular_speed();
    let angular_speed = orbital_speed / own.semi_major_axis();

    let own_normal = vel.cross(pos).normalize()?;
    let target_normal = target_vel.cross(target_pos).normalize()?;
    let line_of_nodes = target_normal.cross(own_normal).normalize()?;
    let angle = pos.angle_2d(line_of_nodes);

    let time_to_node = if angle < 0.0 {
        (angle + PI) / angular_speed
    } else {
        inclination_change = -inclination_change;
        angle / angular_speed
    };

    let half = inclination_change / 2.0;
    let delta_v = 2.0 * orbital_speed * half.sin();
    let prograde = delta_v * half.sin();
    let normal = delta_v * half.cos();
    Ok(NodePlan::new(now + time_to_node, -prograde.abs(), -normal, 0.0))
}

/// Hohmann departure towards the orbit of `target`, timed by phase angle.
///
/// # Errors
/// [`GuidanceError::DivisionByZero`] if both orbits share a period, so the phase never drifts.
pub fn plan_transfer(own: &OrbitSnapshot, target: &OrbitSnapshot, now: f64) -> GuidanceResult<NodePlan> {
    let r1 = own.semi_major_axis();
    let r2 = target.semi_major_axis();
    let mu = own.mu();
    let target_angle = hohmann::intercept_angle(r1, r2, mu);
    let own_rate = own.mean_motion();
    let target_rate = target.mean_motion();
    if (own_rate - target_rate).abs() < f64::EPSILON {
        return Err(GuidanceError::DivisionByZero);
    }

    let (own_pos, _) = own.state_at(now);
    let (target_pos, _) = target.state_at(now);
    let current_angle = own_pos.angle_2d(target_pos);

    let time_to_transfer = if current_angle < 0.0 {
        wrap_angle(target_angle - current_angle) / (target_rate - own_rate)
    } else {
        wrap_angle(current_angle - target_angle) / (own_rate - target_rate)
    };
    let time_to_transfer = wrap_into(time_to_transfer, own.period());
    Ok(NodePlan::prograde_only(now + time_to_transfer, hohmann::transfer_delta_v(r1, r2, mu)))
}

/// Plans maneuvers against live telemetry, registers them with the vehicle and executes them
/// at full throttle.
pub struct ManeuverPlanner<'a, L: VesselLink + ?Sized> {
    link: &'a L,
    config: ExecutorConfig,
    events: Option<mpsc::UnboundedSender<ExecEvent>>,
}

impl<'a, L: VesselLink + ?Sized> ManeuverPlanner<'a, L> {
    pub fn new(link: &'a L, config: ExecutorConfig) -> Self { Self { link, config, events: None } }

    #[must_use]
    pub fn with_event_sink(mut self, events: mpsc::UnboundedSender<ExecEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub async fn circularize(&self, apsis: Apsis) -> GuidanceResult<ExecReport> {
        let (orbit, now) = self.snapshot().await?;
        info!("Circularizing at {apsis}");
        self.submit(plan_circularize(&orbit, now, apsis)?).await
    }

    pub async fn change_opposite_apsis(&self, burn_at: Apsis, target_altitude: f64) -> GuidanceResult<ExecReport> {
        let (orbit, now) = self.snapshot().await?;
        info!("Moving apsis opposite {burn_at} to {target_altitude:.0} m");
        self.submit(plan_change_opposite_apsis(&orbit, now, burn_at, target_altitude)?).await
    }

    pub async fn change_inclination(&self, target: &OrbitSnapshot) -> GuidanceResult<ExecReport> {
        let (orbit, now) = self.snapshot().await?;
        info!("Matching plane of target orbit");
        self.submit(plan_inclination_change(&orbit, target, now)?).await
    }

    pub async fn transfer_to(&self, target: &OrbitSnapshot) -> GuidanceResult<ExecReport> {
        let (orbit, now) = self.snapshot().await?;
        info!("Planning transfer to orbit with a = {:.0} m", target.semi_major_axis());
        self.submit(plan_transfer(&orbit, target, now)?).await
    }

    async fn snapshot(&self) -> GuidanceResult<(OrbitSnapshot, f64)> {
        let orbit = self.link.orbit().await?;
        let now = self.link.ut().await?;
        Ok((orbit, now))
    }

    async fn submit(&self, plan: NodePlan) -> GuidanceResult<ExecReport> {
        log!("Node at UT {:.2}: {:.3} m/s", plan.ut(), plan.delta_v());
        let node = self.link.add_node(&plan).await?;
        let mut executor = NodeExecutor::new(node, self.config);
        if let Some(events) = &self.events {
            executor = executor.with_event_sink(events.clone());
        }
        executor.execute(self.link, 1.0).await
    }
}
