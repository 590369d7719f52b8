//! Greedy 3D container loading.
//!
//! Items are ordered by a priority key, then each one is placed at the best
//! feasible position and orientation found by a raster search of the
//! container. Items that fit nowhere are reported back, never treated as
//! errors.

pub mod container;
pub mod error;
pub mod plan;
pub mod render;
pub mod search;
pub mod solver;
pub mod types;

pub use container::{Container, Placement};
pub use error::{Error, Result};
pub use plan::{LoadPlan, LoadReport};
pub use solver::{Outcome, PackingConfig, Solver, optimize, place_all_in_order};
pub use types::{Dims, Item, OrientationPolicy, Position};
