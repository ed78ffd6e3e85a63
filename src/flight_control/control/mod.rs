mod pid_controller;
mod sim_timer;

pub use pid_controller::PidController;
pub use sim_timer::SimTimer;
