use crate::warn;
use std::{env, str::FromStr, time::Duration};

/// Tunables of the node execution state machine.
///
/// Defaults reproduce the nominal timings; every field can be overridden through a
/// `GUIDANCE_*` environment variable via [`ExecutorConfig::from_env`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExecutorConfig {
    /// Seconds before ignition the simulation is warped to.
    pub warp_lead: f64,
    /// Polling interval while coasting and during the full-throttle burn.
    pub coarse_poll: Duration,
    /// Polling interval during the trim burn.
    pub fine_poll: Duration,
    /// The full-throttle phase ends this many seconds before the planned stop.
    pub full_burn_cutoff: f64,
    /// The trim phase ends this many seconds before its recomputed stop.
    pub trim_tolerance: f64,
    /// Nodes with less remaining delta-v than this (m/s) are not executed.
    pub negligible_delta_v: f64,
    /// Burns shorter than this (s) are replanned at a reduced throttle.
    pub min_burn_time: f64,
    /// Pause after each autopilot command before the next is issued.
    pub settle_delay: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            warp_lead: 60.0,
            coarse_poll: Duration::from_millis(10),
            fine_poll: Duration::from_millis(1),
            full_burn_cutoff: 1.0,
            trim_tolerance: 0.001,
            negligible_delta_v: 0.05,
            min_burn_time: 2.0,
            settle_delay: Duration::from_millis(100),
        }
    }
}

impl ExecutorConfig {
    /// Builds the default configuration and applies any `GUIDANCE_*` overrides found in the
    /// process environment. Unparseable values are reported and ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        override_from_env("GUIDANCE_WARP_LEAD_S", &mut cfg.warp_lead);
        override_from_env("GUIDANCE_FULL_BURN_CUTOFF_S", &mut cfg.full_burn_cutoff);
        override_from_env("GUIDANCE_TRIM_TOLERANCE_S", &mut cfg.trim_tolerance);
        override_from_env("GUIDANCE_NEGLIGIBLE_DV", &mut cfg.negligible_delta_v);
        override_from_env("GUIDANCE_MIN_BURN_S", &mut cfg.min_burn_time);
        let mut coarse_ms = u64::try_from(cfg.coarse_poll.as_millis()).unwrap_or(10);
        let mut fine_ms = u64::try_from(cfg.fine_poll.as_millis()).unwrap_or(1);
        let mut settle_ms = u64::try_from(cfg.settle_delay.as_millis()).unwrap_or(100);
        override_from_env("GUIDANCE_COARSE_POLL_MS", &mut coarse_ms);
        override_from_env("GUIDANCE_FINE_POLL_MS", &mut fine_ms);
        override_from_env("GUIDANCE_SETTLE_MS", &mut settle_ms);
        cfg.coarse_poll = Duration::from_millis(coarse_ms);
        cfg.fine_poll = Duration::from_millis(fine_ms);
        cfg.settle_delay = Duration::from_millis(settle_ms);
        cfg
    }
}

/// Tunables of the gravity-turn ascent.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AscentConfig {
    /// Surface speed (m/s) at which the pitch-over starts.
    pub turn_speed: f64,
    /// Altitude (m) the pitch ramp is referenced to.
    pub reference_altitude: f64,
    /// Fuel fraction below which a monitored stage is dropped.
    pub staging_fraction: f64,
}

impl Default for AscentConfig {
    fn default() -> Self {
        Self { turn_speed: 120.0, reference_altitude: 10_000.0, staging_fraction: 0.1 }
    }
}

impl AscentConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        override_from_env("GUIDANCE_TURN_SPEED", &mut cfg.turn_speed);
        override_from_env("GUIDANCE_TURN_REF_ALT", &mut cfg.reference_altitude);
        override_from_env("GUIDANCE_STAGING_FRACTION", &mut cfg.staging_fraction);
        cfg
    }
}

fn override_from_env<T: FromStr>(key: &str, field: &mut T) {
    if let Ok(raw) = env::var(key) {
        match raw.parse::<T>() {
            Ok(val) => *field = val,
            Err(_) => warn!("Ignoring unparseable {key}={raw}"),
        }
    }
}
