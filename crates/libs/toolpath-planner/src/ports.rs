//! Trait boundaries to the collaborators spec.md treats as external: the
//! G-code writer, the boundary-routing helper, and the tour-ordering
//! optimiser. Concrete implementations are an application concern — see
//! the `toolpath-plan` binary for minimal ones wired up end to end.

use toolpath_types::{IntPoint, Polygon, Polygons};

/// Serial, stateful sink for machine motion. Implementations track their own
/// position, Z, extruder index and accumulated print time.
pub trait GCodeWriter {
  fn position(&self) -> IntPoint;
  fn position_xy(&self) -> IntPoint;
  fn position_z(&self) -> i64;
  fn extruder_index(&self) -> i32;
  fn current_z(&self) -> i64;
  fn switch_extruder(&mut self, index: i32);
  fn write_retraction(&mut self);
  fn write_fan_command(&mut self, percent: f64);
  fn write_comment(&mut self, text: &str);
  fn write_move(&mut self, point: IntPoint, speed_mm_per_s: f64, width_um: i64);
  fn update_total_print_time(&mut self, seconds: f64);
}

/// Point-in-polygon and path-through-polygon queries over the outer
/// perimeter, used to avoid crossing the print boundary on travel moves.
pub trait BoundaryHelper {
  fn point_is_inside(&self, point: IntPoint) -> bool;

  /// Attempts to push `point` inward by `distance`. Returns `None` when the
  /// helper cannot move the point (e.g. no boundary nearby).
  fn move_point_inside(&self, point: IntPoint, distance: i64) -> Option<IntPoint>;

  /// Returns a waypoint path from `from` to `to` that stays inside the
  /// boundary, or `None` if no such path exists.
  fn path_inside_boundary(&self, from: IntPoint, to: IntPoint) -> Option<Polygon>;
}

/// Result of running the external tour-ordering optimiser over a batch of
/// polygons: an island visiting order plus, for each polygon, the vertex
/// index to start from.
#[derive(Debug, Clone)]
pub struct OptimizedOrder {
  pub island_order: Vec<usize>,
  pub start_index_in_polygon: Vec<usize>,
}

pub trait PathOrderOptimizer {
  fn optimize(&self, polygons: &Polygons) -> OptimizedOrder;
}
