//! Home-screen icon layout optimizer.
//!
//! Items are assigned to grid and dock slots by a binary integer program that
//! maximizes `slot weight * usage`, optionally grouping same-genre items into
//! folders and pushing same-colored items apart. The program is solved to
//! optimality by a MIP backend selected through Cargo features.

pub mod geometry;
mod optimizer;
pub mod types;

pub use geometry::{SlotCoord, SlotGeometry};
pub use optimizer::{solve_layout, LayoutOptimizer, ModelStats};
pub use types::*;
