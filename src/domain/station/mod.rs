pub mod model;

pub use model::{normalize_direction, Station, MIN_COST_EPSILON};
