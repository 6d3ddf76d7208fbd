//! **maze3d** generates perfect rectangular mazes with Eller's row-merging algorithm
//! and exports them as watertight 3D solids in the STL interchange format.

pub mod generator;
pub mod mesh;
pub mod pathing;
pub mod stl;
pub mod units;
pub mod walls;
mod utils;
