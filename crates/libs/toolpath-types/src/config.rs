use serde::{Deserialize, Serialize};

/// Comment tags that carry semantic meaning to the emission pass.
pub const COMMENT_WALL_OUTER: &str = "WALL-OUTER";
pub const COMMENT_WALL_INNER: &str = "WALL-INNER";
pub const COMMENT_BRIDGE: &str = "BRIDGE";

/// Immutable per-layer move configuration. Two configs are considered the
/// "same" by the grouping rule when they compare equal with `PartialEq`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GCodePathConfig {
  pub speed: f64,
  pub line_width_um: i64,
  pub gcode_comment: String,
  pub closed_loop: bool,
  pub spiralize: bool,
}

impl GCodePathConfig {
  pub fn new(speed: f64, line_width_um: i64, gcode_comment: impl Into<String>) -> Self {
    GCodePathConfig {
      speed,
      line_width_um,
      gcode_comment: gcode_comment.into(),
      closed_loop: false,
      spiralize: false,
    }
  }

  pub fn travel(speed: f64) -> Self {
    GCodePathConfig::new(speed, 0, "")
  }

  pub fn closed(mut self) -> Self {
    self.closed_loop = true;
    self
  }

  pub fn spiraling(mut self) -> Self {
    self.spiralize = true;
    self
  }

  /// `line_width_um == 0` is the definition of a travel move.
  pub fn is_travel(&self) -> bool {
    self.line_width_um == 0
  }

  pub fn is_bridge(&self) -> bool {
    self.gcode_comment == COMMENT_BRIDGE
  }

  pub fn is_wall(&self) -> bool {
    self.gcode_comment == COMMENT_WALL_OUTER || self.gcode_comment == COMMENT_WALL_INNER
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn travel_config_has_zero_width() {
    let travel = GCodePathConfig::travel(150.0);
    assert!(travel.is_travel());
    assert!(!travel.is_bridge());
  }

  #[test]
  fn wall_detection_matches_either_inner_or_outer() {
    let outer = GCodePathConfig::new(40.0, 400, COMMENT_WALL_OUTER);
    let inner = GCodePathConfig::new(40.0, 400, COMMENT_WALL_INNER);
    let infill = GCodePathConfig::new(60.0, 400, "FILL");
    assert!(outer.is_wall() && inner.is_wall());
    assert!(!infill.is_wall());
  }
}
