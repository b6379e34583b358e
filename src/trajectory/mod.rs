//! Trajectory derivation from two-line element sets.
//!
//! Element sets are resolved from a small catalog of well-known objects or synthesized
//! from inclination and period, propagated with SGP4 and converted to geodetic samples.

mod elements;
mod engine;
mod propagator;
mod series;

pub use elements::{ElementSource, ElementsError, OrbitalElementSet};
pub use engine::TrajectoryEngine;
pub use propagator::{gmst, PropagationError, Propagator};
pub use series::{Trajectory, TrajectoryPoint, TrajectoryRequest};

#[cfg(test)]
mod tests;
