mod ascent;
mod descent;

pub use ascent::AscentGuidance;
pub use descent::{HoverslamGuidance, HoverslamInputs};
