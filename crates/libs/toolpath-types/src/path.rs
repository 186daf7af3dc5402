use crate::config::GCodePathConfig;
use crate::point::{IntPoint, Polygon};

/// A grouped move: an ordered run of destinations sharing one `config`.
/// `done` marks the path as closed to further appends (§4.3/§4.4 grouping
/// rule); `retract` requests a retraction be emitted before this path's
/// first move.
#[derive(Debug, Clone)]
pub struct GCodePath {
  pub config: GCodePathConfig,
  pub extruder_index: i32,
  pub done: bool,
  pub retract: bool,
  pub points: Polygon,
}

impl GCodePath {
  pub fn new(config: GCodePathConfig, extruder_index: i32) -> Self {
    GCodePath { config, extruder_index, done: false, retract: false, points: Vec::new() }
  }

  pub fn push(&mut self, point: IntPoint) {
    self.points.push(point);
  }

  /// Sum of segment lengths, plus the closing edge when the path is a closed
  /// loop (`config.closed_loop`).
  pub fn length(&self) -> f64 {
    if self.points.len() < 2 {
      return 0.0;
    }
    let mut total: f64 = self.points.windows(2).map(|w| w[0].distance(w[1])).sum();
    if self.config.closed_loop {
      total += self.points.last().unwrap().distance(self.points[0]);
    }
    total
  }
}
