//! **mazegen** is a maze generation library built around a boolean occupancy
//! grid: `true` is wall, `false` is open floor.
//!
//! Six interchangeable algorithms carve perfect mazes over the lattice of
//! odd coordinate cells, all driven through `generators::generate`.

pub mod cells;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod union_find;
pub mod units;
mod utils;
