use crate::error::GuidanceResult;
use crate::flight_control::{control::PidController, orbit::local_gravity};
use crate::vessel_link::VesselLink;
use crate::{info, warn};

/// Vehicle and body state for one hover-slam evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverslamInputs {
    pub mu: f64,
    pub body_radius: f64,
    pub mass: f64,
    pub sea_level_altitude: f64,
    pub surface_altitude: f64,
    /// Speed towards the surface (m/s).
    pub surface_speed: f64,
    /// Distance from the vessel's reference point down to the landing legs.
    pub ship_height: f64,
    /// Height above ground at which the vertical speed should reach zero.
    pub target_height: f64,
    /// Thrust the burn is planned with (N).
    pub target_thrust: f64,
}

impl HoverslamInputs {
    /// Net deceleration available at full planned thrust.
    pub fn deceleration(&self) -> f64 {
        self.target_thrust / self.mass - local_gravity(self.mu, self.body_radius, self.sea_level_altitude)
    }

    /// Altitude needed to cancel the current speed at [`HoverslamInputs::deceleration`].
    pub fn burn_altitude(&self) -> f64 { self.surface_speed.powi(2) / (2.0 * self.deceleration()) }

    /// Height of the landing legs above the target height.
    pub fn ship_altitude(&self) -> f64 { self.surface_altitude - self.ship_height - self.target_height }
}

/// Suicide-burn throttle law: no thrust until the burn altitude is reached, then a PID keeps
/// the altitude margin at zero.
#[derive(Debug, Clone, Default)]
pub struct HoverslamGuidance {
    pid_started: bool,
    /// Set while the vehicle cannot decelerate, so the warning is logged once per occurrence.
    underpowered: bool,
}

impl HoverslamGuidance {
    pub fn new() -> Self { Self::default() }

    pub fn pid_started(&self) -> bool { self.pid_started }

    pub fn underpowered(&self) -> bool { self.underpowered }

    /// Throttle in `[0, 1]` for the given state.
    ///
    /// The PID is started exactly once, on the first call that finds the vessel inside the
    /// burn altitude. A vehicle whose thrust cannot overcome gravity gets full throttle.
    pub fn throttle(&mut self, pid: &mut PidController, inputs: &HoverslamInputs) -> f64 {
        if inputs.deceleration() <= 0.0 {
            if !self.underpowered {
                warn!("Thrust-to-weight below one, hover-slam not possible");
                self.underpowered = true;
            }
            return 1.0;
        }
        self.underpowered = false;
        let altitude_delta = inputs.ship_altitude() - inputs.burn_altitude();
        if !self.pid_started {
            if altitude_delta >= 0.0 {
                return 0.0;
            }
            info!("Hover-slam burn started {:.1} m above target", inputs.ship_altitude());
            pid.start();
            self.pid_started = true;
        }
        pid.step(0.0, altitude_delta, 1.0).clamp(0.0, 1.0)
    }

    /// Samples telemetry, computes the throttle and commands it.
    ///
    /// # Returns
    /// The commanded throttle.
    pub async fn step<L: VesselLink + ?Sized>(
        &mut self,
        link: &L,
        pid: &mut PidController,
        ship_height: f64,
        target_height: f64,
    ) -> GuidanceResult<f64> {
        let orbit = link.orbit().await?;
        let flight = link.flight().await?;
        let inputs = HoverslamInputs {
            mu: orbit.mu(),
            body_radius: orbit.body_radius(),
            mass: link.mass().await?,
            sea_level_altitude: flight.mean_altitude,
            surface_altitude: flight.surface_altitude,
            surface_speed: flight.surface_speed,
            ship_height,
            target_height,
            target_thrust: link.available_thrust().await?,
        };
        let throttle = self.throttle(pid, &inputs);
        link.set_throttle(throttle).await?;
        Ok(throttle)
    }
}
