//! A minimal `GCodeWriter` used only by this crate's own tests.

use toolpath_types::IntPoint;

use crate::ports::GCodeWriter;

#[derive(Debug, Clone)]
pub struct Move {
  pub point: IntPoint,
  pub speed: f64,
  pub width_um: i64,
}

#[derive(Debug, Default)]
pub struct RecordingWriter {
  position: IntPoint,
  extruder_index: i32,
  pub moves: Vec<Move>,
  pub comments: Vec<String>,
  pub retractions: u32,
  pub fan_commands: Vec<f64>,
  pub extruder_switches: Vec<i32>,
  pub total_print_time: f64,
}

impl GCodeWriter for RecordingWriter {
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
    self.extruder_switches.push(index);
  }

  fn write_retraction(&mut self) {
    self.retractions += 1;
  }

  fn write_fan_command(&mut self, percent: f64) {
    self.fan_commands.push(percent);
  }

  fn write_comment(&mut self, text: &str) {
    self.comments.push(text.to_string());
  }

  fn write_move(&mut self, point: IntPoint, speed_mm_per_s: f64, width_um: i64) {
    self.position = point;
    self.moves.push(Move { point, speed: speed_mm_per_s, width_um });
  }

  fn update_total_print_time(&mut self, seconds: f64) {
    self.total_print_time += seconds;
  }
}
