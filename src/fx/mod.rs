//! Cosmetic effects
//!
//! Visual-only simulations. Nothing here feeds back into gameplay.

pub mod dot_grid;
pub mod easing;
pub mod spark;

pub use dot_grid::{DotGrid, GridDot, Shockwave};
pub use spark::{Spark, SparkField, SparkSample};
