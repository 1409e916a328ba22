//! path_tiler
//! ==========
//!
//! A path tiler: fits a sequence of pre-authored terrain "template
//! segments" onto a user-supplied grid path, connecting end-to-end with
//! compatible terminal types while staying within a bounded deviation
//! from the target path and minimizing total accumulated deviation.
//!
//! The core pipeline is linear: path conditioning (validation, loop
//! rotation, edge/inertial extension, chirality normalization) feeds a
//! geometric conditioning pass (per-cell deviation and progress fields
//! over a padded bounding box around the path), which feeds a
//! Dijkstra-style best-first search over a three-dimensional cost
//! lattice `(x, y, connection-type)`, which feeds a randomized
//! optimal-traceback that paints the chosen template chain onto a
//! caller-supplied map.
//!
//! Three collaborator traits keep the crate free of any compiled-in
//! dependency on a specific map, catalog, or RNG implementation:
//! [TileMap], [TemplateCatalog], and [TileRandom].

mod cell;
mod direction;
mod error;
mod flood_fill;
mod geometry;
mod map;
mod matrix;
mod permitted;
mod priority_array;
mod random;
mod search;
mod segment;
mod template;
mod tiling_path;
mod traceback;

pub use self::{
    cell::*, direction::*, error::*, flood_fill::*, map::*, matrix::*, permitted::*, priority_array::*, random::*,
    segment::*, template::*, tiling_path::*,
};
