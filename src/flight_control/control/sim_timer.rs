use tokio::sync::watch;

/// Samples simulation universal time from the provider's subscription.
///
/// Keeps the two most recent samples so controllers can derive their step length from
/// simulation time instead of wall-clock time.
#[derive(Debug, Clone)]
pub struct SimTimer {
    ut: watch::Receiver<f64>,
    current_time: Option<f64>,
    last_time: Option<f64>,
}

impl SimTimer {
    pub fn new(ut: watch::Receiver<f64>) -> Self { Self { ut, current_time: None, last_time: None } }

    /// Latest simulation time published by the provider.
    pub fn now(&self) -> f64 { *self.ut.borrow() }

    /// Shifts the current sample into the last slot and takes a new one.
    pub fn sample(&mut self) -> f64 {
        let now = self.now();
        self.last_time = self.current_time.replace(now);
        now
    }

    /// Forgets both samples.
    pub fn reset(&mut self) {
        self.current_time = None;
        self.last_time = None;
    }

    pub fn current_time(&self) -> Option<f64> { self.current_time }
    pub fn last_time(&self) -> Option<f64> { self.last_time }

    /// Time between the last two samples, `None` until two samples were taken.
    pub fn dt(&self) -> Option<f64> {
        match (self.current_time, self.last_time) {
            (Some(cur), Some(last)) => Some(cur - last),
            _ => None,
        }
    }
}
