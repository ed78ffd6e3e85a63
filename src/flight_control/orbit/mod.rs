mod mechanics;
mod orbit_snapshot;

pub use mechanics::{
    STANDARD_GRAVITY, burn_time, circular_or_elliptical_speed, local_gravity, thrust_to_weight,
    vertical_acceleration, velocity_vector_at_time, vis_viva,
};
pub use orbit_snapshot::OrbitSnapshot;
