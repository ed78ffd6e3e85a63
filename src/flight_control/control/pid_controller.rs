use super::sim_timer::SimTimer;
use tokio::sync::watch;

/// Discrete PID controller stepped against simulation time.
///
/// The integrator is reset only through [`PidController::start`] or
/// [`PidController::reset_error`]; everything else is driven by [`PidController::step`].
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    last_error: f64,
    total_error: f64,
    previous_output: f64,
    timer: SimTimer,
}

impl PidController {
    /// Errors smaller than this leave the output untouched.
    pub const DEAD_ZONE: f64 = 0.002;

    pub fn new(kp: f64, ki: f64, kd: f64, ut: watch::Receiver<f64>) -> Self {
        Self {
            kp,
            ki,
            kd,
            last_error: 0.0,
            total_error: 0.0,
            previous_output: 0.0,
            timer: SimTimer::new(ut),
        }
    }

    /// Arms the controller: clears the integrator, the error history and the timer so the
    /// next [`PidController::step`] produces a pure proportional response.
    pub fn start(&mut self) {
        self.timer.reset();
        self.last_error = 0.0;
        self.previous_output = 0.0;
        self.reset_error();
    }

    /// Computes the next controller output.
    ///
    /// # Arguments
    /// - `target`: Setpoint.
    /// - `current`: Measured value.
    /// - `integral_bound`: Bound on the integral contribution; the accumulated error is
    ///   clamped to `±integral_bound / ki` when `ki > 0`.
    ///
    /// # Returns
    /// `kp·e + ki·I + kd·D`, or the previous output if `|e|` is inside the dead zone.
    pub fn step(&mut self, target: f64, current: f64, integral_bound: f64) -> f64 {
        let error = target - current;
        self.timer.sample();

        if error.abs() < Self::DEAD_ZONE {
            return self.previous_output;
        }

        let (mut integral, derivative) = match self.timer.dt() {
            Some(dt) if dt > 0.0 => (
                self.total_error + (error + self.last_error) / 2.0 * dt,
                (error - self.last_error) / dt,
            ),
            Some(_) => (self.total_error, 0.0),
            None => (0.0, 0.0),
        };

        if self.ki > 0.0 {
            let bound = (integral_bound / self.ki).abs();
            integral = integral.max(-bound).min(bound);
        }

        self.last_error = error;
        self.total_error = integral;
        let output = error * self.kp + integral * self.ki + derivative * self.kd;
        self.previous_output = output;
        output
    }

    /// Zeroes the integrator only.
    pub fn reset_error(&mut self) { self.total_error = 0.0; }

    pub fn integral(&self) -> f64 { self.total_error }
    pub fn previous_output(&self) -> f64 { self.previous_output }
    pub fn timer(&self) -> &SimTimer { &self.timer }
}
