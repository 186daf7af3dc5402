//! A minimal text G-code sink, plus the no-op boundary/order collaborators
//! this binary wires up in place of a slicer's real boundary mesh and
//! nesting optimiser.

use toolpath_planner::{BoundaryHelper, GCodeWriter, OptimizedOrder, PathOrderOptimizer};
use toolpath_types::{IntPoint, Polygon, Polygons};

pub struct TextGCodeWriter {
  position: IntPoint,
  extruder_index: i32,
  buffer: String,
}

impl TextGCodeWriter {
  pub fn new(z_um: i64) -> Self {
    TextGCodeWriter { position: IntPoint::new(0, 0).at_z(z_um), extruder_index: 0, buffer: String::new() }
  }

  pub fn into_gcode(self) -> String {
    self.buffer
  }
}

impl GCodeWriter for TextGCodeWriter {
  fn position(&self) -> IntPoint {
    self.position
  }

  fn position_xy(&self) -> IntPoint {
    self.position.with_width(0)
  }

  fn position_z(&self) -> i64 {
    self.position.z
  }

  fn extruder_index(&self) -> i32 {
    self.extruder_index
  }

  fn current_z(&self) -> i64 {
    self.position.z
  }

  fn switch_extruder(&mut self, index: i32) {
    self.extruder_index = index;
    self.buffer.push_str(&format!("T{index}\n"));
  }

  fn write_retraction(&mut self) {
    self.buffer.push_str("G10\n");
  }

  fn write_fan_command(&mut self, percent: f64) {
    let speed = (percent.clamp(0.0, 100.0) / 100.0 * 255.0).round() as i64;
    self.buffer.push_str(&format!("M106 S{speed}\n"));
  }

  fn write_comment(&mut self, text: &str) {
    self.buffer.push_str(&format!(";{text}\n"));
  }

  fn write_move(&mut self, point: IntPoint, speed_mm_per_s: f64, width_um: i64) {
    let x = point.x as f64 / 1000.0;
    let y = point.y as f64 / 1000.0;
    let z = point.z as f64 / 1000.0;
    let feedrate_mm_per_min = speed_mm_per_s * 60.0;
    if width_um > 0 {
      self.buffer.push_str(&format!("G1 X{x:.3} Y{y:.3} Z{z:.3} F{feedrate_mm_per_min:.1} ; width {width_um}um\n"));
    } else {
      self.buffer.push_str(&format!("G0 X{x:.3} Y{y:.3} Z{z:.3} F{feedrate_mm_per_min:.1}\n"));
    }
    self.position = point;
  }

  fn update_total_print_time(&mut self, seconds: f64) {
    self.buffer.push_str(&format!("; total print time {seconds:.1}s\n"));
  }
}

/// No boundary mesh is available in this standalone binary; every point is
/// reported inside and no waypoint routing is offered, so the planner falls
/// back to straight-line travel gated only by `alwaysRetract`.
pub struct NoBoundary;

impl BoundaryHelper for NoBoundary {
  fn point_is_inside(&self, _point: IntPoint) -> bool {
    true
  }

  fn move_point_inside(&self, _point: IntPoint, _distance: i64) -> Option<IntPoint> {
    None
  }

  fn path_inside_boundary(&self, _from: IntPoint, _to: IntPoint) -> Option<Polygon> {
    None
  }
}

/// Visits islands in input order starting each at its first vertex, in
/// place of a real nearest-neighbour or travelling-salesman optimiser.
pub struct SequentialOrder;

impl PathOrderOptimizer for SequentialOrder {
  fn optimize(&self, polygons: &Polygons) -> OptimizedOrder {
    OptimizedOrder { island_order: (0..polygons.len()).collect(), start_index_in_polygon: vec![0; polygons.len()] }
  }
}
