//! End-to-end planner scenarios: queue a layer's polygons through a
//! `Planner` and check the writer calls `write_queued_gcode` produces.

use toolpath_geometry::IdentityCleaner;
use toolpath_planner::Planner;
use toolpath_types::{GCodePathConfig, IntPoint};

mod support {
  use toolpath_planner::GCodeWriter;
  use toolpath_types::IntPoint;

  #[derive(Debug, Default)]
  pub struct VecWriter {
    position: IntPoint,
    extruder_index: i32,
    pub points: Vec<IntPoint>,
    pub widths: Vec<i64>,
  }

  impl GCodeWriter for VecWriter {
    fn position(&self) -> IntPoint {
      self.position
    }
    fn position_xy(&self) -> IntPoint {
      self.position.with_width(0).at_z(0)
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
    }
    fn write_retraction(&mut self) {}
    fn write_fan_command(&mut self, _percent: f64) {}
    fn write_comment(&mut self, _text: &str) {}
    fn write_move(&mut self, point: IntPoint, _speed_mm_per_s: f64, width_um: i64) {
      self.position = point;
      self.points.push(point);
      self.widths.push(width_um);
    }
    fn update_total_print_time(&mut self, _seconds: f64) {}
  }
}

use support::VecWriter;

fn planner_with_overlap_ratio(ratio: f64) -> Planner<VecWriter> {
  Planner::new(VecWriter::default(), 150.0, 1_000, ratio, true).unwrap()
}

fn planner() -> Planner<VecWriter> {
  planner_with_overlap_ratio(0.5)
}

#[test]
fn rectangle_closed_perimeter_emits_four_walls_and_a_close_back_move() {
  // ratio = 1.0 disables seam trimming so the scenario is exactly the
  // narrative's "4 walls + 1 close-back move", untouched by overlap merge.
  let mut p = planner_with_overlap_ratio(1.0);
  let square = vec![IntPoint::new(0, 0), IntPoint::new(10_000, 0), IntPoint::new(10_000, 10_000), IntPoint::new(0, 10_000)];
  let wall = GCodePathConfig::new(40.0, 400, "WALL-OUTER").closed();
  p.queue_polygon(&square, 0, &wall);
  p.write_queued_gcode(200, 100.0, -1.0, &IdentityCleaner);

  let points = &p.writer().points;
  assert_eq!(points.len(), 4);
  assert_eq!(*points.last().unwrap(), IntPoint::new(0, 0));
}

#[test]
fn hairpin_overlap_collapses_into_a_single_variable_width_stroke() {
  let mut p = planner();
  // Prime the planner's position away from the hairpin's start so the open
  // polygon is queued behind a travel move, matching how a real layer
  // arrives at a wall's first vertex rather than starting there cold.
  p.queue_travel(IntPoint::new(-5_000, 0));
  let hairpin =
    vec![IntPoint::new(0, 0), IntPoint::new(10_000, 0), IntPoint::new(10_000, 200), IntPoint::new(0, 200)];
  let wall = GCodePathConfig::new(40.0, 400, "WALL-OUTER");
  p.queue_polygon(&hairpin, 0, &wall);
  p.write_queued_gcode(200, 100.0, -1.0, &IdentityCleaner);

  let writer = p.writer();
  // The merge path travels to the nearer merged endpoint (width 0) then
  // extrudes through the rest at a non-zero, overlap-derived width.
  assert!(writer.widths.iter().any(|&w| w == 600));
  assert!(writer.points.iter().any(|pt| pt.y == 100));
}

#[test]
fn two_point_closed_loop_does_not_duplicate_the_closing_vertex() {
  let mut p = planner();
  let wall = GCodePathConfig::new(40.0, 400, "WALL-OUTER").closed();
  let segment = vec![IntPoint::new(0, 0), IntPoint::new(10_000, 0)];
  p.queue_polygon(&segment, 0, &wall);
  assert_eq!(p.queue().paths().iter().find(|path| !path.config.is_travel()).unwrap().points.len(), 1);
}
