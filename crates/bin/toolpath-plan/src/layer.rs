//! JSON schema for a planning job: one document per print, one entry per
//! layer, one entry per path within a layer.

use serde::Deserialize;

use toolpath_types::{GCodePathConfig, IntPoint};

#[derive(Debug, Deserialize)]
pub struct PlanDocument {
  pub travel_speed: f64,
  #[serde(default = "default_retraction_minimum_distance_um")]
  pub retraction_minimum_distance_um: i64,
  #[serde(default = "default_perimeter_start_end_overlap")]
  pub perimeter_start_end_overlap: f64,
  #[serde(default = "default_true")]
  pub merge_overlapping_lines: bool,
  #[serde(default = "default_fan_percent")]
  pub fan_percent: f64,
  #[serde(default = "default_bridge_fan_percent")]
  pub bridge_fan_percent: f64,
  #[serde(default = "default_min_layer_time")]
  pub minimum_layer_time_s: f64,
  #[serde(default = "default_min_layer_time_speed")]
  pub minimum_layer_time_speed: f64,
  pub layers: Vec<LayerSpec>,
}

fn default_retraction_minimum_distance_um() -> i64 {
  1_500
}
fn default_perimeter_start_end_overlap() -> f64 {
  0.5
}
fn default_true() -> bool {
  true
}
fn default_fan_percent() -> f64 {
  100.0
}
fn default_bridge_fan_percent() -> f64 {
  -1.0
}
fn default_min_layer_time() -> f64 {
  5.0
}
fn default_min_layer_time_speed() -> f64 {
  10.0
}

#[derive(Debug, Deserialize)]
pub struct LayerSpec {
  pub z_um: i64,
  pub layer_thickness_um: i64,
  pub paths: Vec<PathSpec>,
}

#[derive(Debug, Deserialize)]
pub struct PathSpec {
  pub points: Vec<[i64; 2]>,
  pub speed: f64,
  pub line_width_um: i64,
  #[serde(default)]
  pub comment: String,
  #[serde(default)]
  pub closed: bool,
  #[serde(default)]
  pub spiralize: bool,
}

impl PathSpec {
  pub fn config(&self) -> GCodePathConfig {
    let mut config = GCodePathConfig::new(self.speed, self.line_width_um, self.comment.clone());
    if self.closed {
      config = config.closed();
    }
    if self.spiralize {
      config = config.spiraling();
    }
    config
  }

  pub fn polygon(&self) -> Vec<IntPoint> {
    self.points.iter().map(|[x, y]| IntPoint::new(*x, *y)).collect()
  }
}
