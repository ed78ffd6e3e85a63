use crate::config::AscentConfig;
use crate::error::GuidanceResult;
use crate::flight_control::{common::math::rad_to_deg, propulsion::ResourceKind};
use crate::vessel_link::{TelemetryCondition, VesselLink};
use crate::{event, info};
use std::collections::HashMap;
use std::time::Duration;

/// Gravity-turn launch steering with fuel-triggered staging.
///
/// Pitch stays vertical until the vehicle first exceeds the turn speed; the altitude at that
/// moment is latched and the pitch then follows `atan2(alt, f'(alt)·alt)` with
/// `f'(alt) = (alt − turn) / (reference − turn)`, never below the horizon.
#[derive(Debug, Clone)]
pub struct AscentGuidance {
    config: AscentConfig,
    /// Target orbital inclination in degrees.
    inclination: f64,
    /// Suborbital hops never pitch over.
    orbital: bool,
    turn_altitude: Option<f64>,
    /// Current stage -> (decouple stage, resource) whose depletion triggers staging.
    monitored: HashMap<i32, (i32, ResourceKind)>,
}

impl AscentGuidance {
    const POLL: Duration = Duration::from_millis(10);

    pub fn new(config: AscentConfig, inclination: f64, orbital: bool) -> Self {
        Self { config, inclination, orbital, turn_altitude: None, monitored: HashMap::new() }
    }

    /// Drops the stage once `resource` in `decouple_stage` runs low while `current_stage` is
    /// the active one.
    #[must_use]
    pub fn monitor(mut self, current_stage: i32, decouple_stage: i32, resource: ResourceKind) -> Self {
        self.monitored.insert(current_stage, (decouple_stage, resource));
        self
    }

    pub fn turn_altitude(&self) -> Option<f64> { self.turn_altitude }

    /// Pitch and heading in degrees for the given altitude and surface speed.
    pub fn target_attitude(&mut self, altitude: f64, speed: f64) -> (f64, f64) {
        if self.orbital && self.turn_altitude.is_none() && speed > self.config.turn_speed {
            info!("Starting gravity turn at {altitude:.0} m");
            self.turn_altitude = Some(altitude);
        }
        let pitch = match self.turn_altitude {
            // latched at or above the reference altitude: nothing left to ramp over
            Some(turn) if turn >= self.config.reference_altitude => 0.0,
            Some(turn) => {
                let slope = (altitude - turn) / (self.config.reference_altitude - turn);
                rad_to_deg(altitude.atan2(slope * altitude)).clamp(0.0, 90.0)
            }
            None => 90.0,
        };
        (pitch, 90.0 + self.inclination)
    }

    /// Sets throttle and fires the first stage.
    pub async fn launch<L: VesselLink + ?Sized>(&self, link: &L, throttle: f64) -> GuidanceResult<()> {
        info!("Launch");
        link.set_throttle(throttle).await?;
        link.activate_next_stage().await
    }

    /// One guidance iteration: steers and stages if the monitored fuel ran low.
    ///
    /// # Returns
    /// `true` if a stage was dropped in this iteration.
    pub async fn step<L: VesselLink + ?Sized>(
        &mut self,
        link: &L,
        current_stage: i32,
        altitude: f64,
        speed: f64,
    ) -> GuidanceResult<bool> {
        let (pitch, heading) = self.target_attitude(altitude, speed);
        link.set_target_pitch_heading(pitch, heading).await?;

        let Some(&(decouple_stage, resource)) = self.monitored.get(&current_stage) else {
            return Ok(false);
        };
        let fraction = link.resource_fraction(decouple_stage, resource).await?;
        if fraction < self.config.staging_fraction {
            event!("{resource} of stage {decouple_stage} at {:.1}%, staging", fraction * 100.0);
            link.activate_next_stage().await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Flies the gravity turn until the apoapsis reaches `target_apoapsis`, cuts the engines and
    /// coasts until `coast_altitude` is passed.
    ///
    /// # Returns
    /// Number of stages dropped on the way up.
    pub async fn ascend<L: VesselLink + ?Sized>(
        &mut self,
        link: &L,
        target_apoapsis: f64,
        coast_altitude: f64,
    ) -> GuidanceResult<usize> {
        let mut staged = 0;
        while link.orbit().await?.apoapsis_altitude() < target_apoapsis {
            let flight = link.flight().await?;
            if self.step(link, flight.current_stage, flight.mean_altitude, flight.surface_speed).await? {
                staged += 1;
            }
            tokio::time::sleep(Self::POLL).await;
        }
        link.set_throttle(0.0).await?;
        info!("Apoapsis target reached, coasting to {coast_altitude:.0} m");
        link.wait_until(TelemetryCondition::AltitudeAbove(coast_altitude)).await?;
        Ok(staged)
    }
}
