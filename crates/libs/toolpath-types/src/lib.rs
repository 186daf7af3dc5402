//! Data model for the tool-path planning core: fixed-point points, the
//! polygon aliases built from them, per-layer move configuration, and the
//! mutable grouped-move record the planner appends into.

pub mod config;
pub mod path;
pub mod point;

pub use config::{GCodePathConfig, COMMENT_BRIDGE, COMMENT_WALL_INNER, COMMENT_WALL_OUTER};
pub use path::GCodePath;
pub use point::{IntPoint, Polygon, Polygons};
