use log::warn;

use toolpath_types::{GCodePath, GCodePathConfig, IntPoint, Polygon, Polygons};

use crate::error::PlannerError;
use crate::ports::{BoundaryHelper, GCodeWriter, PathOrderOptimizer};
use crate::queue::PathQueue;

/// Public façade over the path queue: queues extrusion/travel/polygon
/// moves, makes boundary-avoidance and retraction decisions, tracks the
/// per-layer speed factors, and (via the `emit` module) walks the queue
/// once to produce writer calls.
pub struct Planner<W: GCodeWriter> {
  pub(crate) writer: W,
  pub(crate) queue: PathQueue,
  pub(crate) travel_config: GCodePathConfig,

  pub(crate) last_position: IntPoint,
  pub(crate) current_extruder_index: i32,
  pub(crate) extrude_speed_factor: i64,
  pub(crate) travel_speed_factor: i64,
  pub(crate) force_retraction: bool,
  pub(crate) always_retract: bool,
  pub(crate) retraction_minimum_distance_um: i64,
  pub(crate) perimeter_start_end_overlap_ratio: f64,
  pub(crate) merge_overlapping_lines: bool,
  pub(crate) boundary: Option<Box<dyn BoundaryHelper>>,
  pub(crate) total_print_time: f64,
  pub(crate) extra_time: f64,
}

impl<W: GCodeWriter + std::fmt::Debug> std::fmt::Debug for Planner<W> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Planner")
      .field("writer", &self.writer)
      .field("queue", &self.queue)
      .field("travel_config", &self.travel_config)
      .field("last_position", &self.last_position)
      .field("current_extruder_index", &self.current_extruder_index)
      .field("extrude_speed_factor", &self.extrude_speed_factor)
      .field("travel_speed_factor", &self.travel_speed_factor)
      .field("force_retraction", &self.force_retraction)
      .field("always_retract", &self.always_retract)
      .field("retraction_minimum_distance_um", &self.retraction_minimum_distance_um)
      .field("perimeter_start_end_overlap_ratio", &self.perimeter_start_end_overlap_ratio)
      .field("merge_overlapping_lines", &self.merge_overlapping_lines)
      .field("boundary", &self.boundary.as_ref().map(|_| "<BoundaryHelper>"))
      .field("total_print_time", &self.total_print_time)
      .field("extra_time", &self.extra_time)
      .finish()
  }
}

impl<W: GCodeWriter> Planner<W> {
  pub fn new(
    writer: W,
    travel_speed: f64,
    retraction_minimum_distance_um: i64,
    perimeter_start_end_overlap: f64,
    merge_overlapping_lines: bool,
  ) -> Result<Self, PlannerError> {
    if !(travel_speed > 0.0) {
      return Err(PlannerError::NonPositiveSpeed(travel_speed));
    }
    if retraction_minimum_distance_um < 0 {
      return Err(PlannerError::NegativeRetractionDistance(retraction_minimum_distance_um));
    }
    if !(0.0..=1.0).contains(&perimeter_start_end_overlap) {
      return Err(PlannerError::OverlapRatioOutOfRange(perimeter_start_end_overlap));
    }

    let last_position = writer.position_xy();
    let current_extruder_index = writer.extruder_index();
    Ok(Planner {
      travel_config: GCodePathConfig::travel(travel_speed),
      writer,
      queue: PathQueue::new(),
      last_position,
      current_extruder_index,
      extrude_speed_factor: 100,
      travel_speed_factor: 100,
      force_retraction: false,
      always_retract: false,
      retraction_minimum_distance_um,
      perimeter_start_end_overlap_ratio: perimeter_start_end_overlap,
      merge_overlapping_lines,
      boundary: None,
      total_print_time: 0.0,
      extra_time: 0.0,
    })
  }

  pub fn queue(&self) -> &PathQueue {
    &self.queue
  }

  pub fn total_print_time(&self) -> f64 {
    self.total_print_time
  }

  pub fn extra_time(&self) -> f64 {
    self.extra_time
  }

  pub fn writer(&self) -> &W {
    &self.writer
  }

  pub fn writer_mut(&mut self) -> &mut W {
    &mut self.writer
  }

  pub fn into_writer(self) -> W {
    self.writer
  }

  pub fn last_position(&self) -> IntPoint {
    self.last_position
  }

  pub fn get_extruder(&self) -> i32 {
    self.current_extruder_index
  }

  pub fn set_extruder(&mut self, index: i32) {
    self.current_extruder_index = index;
  }

  pub fn get_extrude_speed_factor(&self) -> i64 {
    self.extrude_speed_factor
  }

  pub fn set_extrude_speed_factor(&mut self, factor: i64) {
    self.extrude_speed_factor = factor.max(1);
  }

  pub fn get_travel_speed_factor(&self) -> i64 {
    self.travel_speed_factor
  }

  pub fn set_travel_speed_factor(&mut self, factor: i64) {
    self.travel_speed_factor = factor.max(1);
  }

  pub fn set_always_retract(&mut self, always_retract: bool) {
    self.always_retract = always_retract;
  }

  pub fn set_outer_perimeters_to_avoid_crossing(&mut self, boundary: Option<Box<dyn BoundaryHelper>>) {
    self.boundary = boundary;
  }

  pub fn force_retract(&mut self) {
    self.force_retraction = true;
  }

  pub fn queue_extrusion_move(&mut self, dst: IntPoint, config: &GCodePathConfig) {
    let z = self.writer.current_z();
    let extruder = self.current_extruder_index;
    let path = self.queue.get_latest_path_with_config(config, extruder);
    path.push(dst.at_z(z));
    self.last_position = dst;
  }

  pub fn queue_travel(&mut self, dst: IntPoint) {
    let travel_config = self.travel_config.clone();
    let z = self.writer.current_z();
    let extruder = self.current_extruder_index;
    let last = self.last_position;
    let min_distance = self.retraction_minimum_distance_um as f64;

    let mut retract = false;
    let mut waypoints: Vec<IntPoint> = Vec::new();

    if self.force_retraction {
      self.force_retraction = false;
      retract = true;
    } else if let Some(boundary) = self.boundary.as_deref() {
      match boundary.path_inside_boundary(last, dst) {
        Some(path) => {
          let mut total_len = 0.0;
          let mut prev = last;
          for wp in &path {
            total_len += prev.distance(*wp);
            prev = *wp;
          }
          total_len += prev.distance(dst);
          if total_len > min_distance {
            retract = true;
          }
          waypoints = path;
        }
        None => {
          if last.distance(dst) > min_distance {
            retract = true;
          }
        }
      }
    } else if self.always_retract && last.distance(dst) > min_distance {
      retract = true;
    }

    let path = self.queue.get_latest_path_with_config(&travel_config, extruder);
    if retract {
      path.retract = true;
    }
    for wp in waypoints {
      path.push(wp.at_z(z).with_width(0));
    }
    path.push(dst.at_z(z).with_width(0));
    self.last_position = dst;
  }

  /// Queues one polygon as a sequence of extrusion moves, travelling to the
  /// start vertex first unless already there or spiralising. No-ops on an
  /// empty polygon.
  pub fn queue_polygon(&mut self, polygon: &Polygon, start_index: usize, config: &GCodePathConfig) {
    let n = polygon.len();
    if n == 0 {
      return;
    }
    let start_index = start_index % n;
    let start_point = polygon[start_index];
    if start_point != self.last_position && !config.spiralize {
      self.queue_travel(start_point);
    }

    if config.closed_loop {
      for step in 1..n {
        let idx = (start_index + step) % n;
        self.queue_extrusion_move(polygon[idx], config);
      }
      if n > 2 {
        self.queue_extrusion_move(start_point, config);
      }
    } else if start_index == 0 {
      for idx in 1..n {
        self.queue_extrusion_move(polygon[idx], config);
      }
    } else {
      for idx in (1..n).rev() {
        self.queue_extrusion_move(polygon[idx], config);
      }
    }
  }

  pub fn queue_polygons(&mut self, polygons: &Polygons, config: &GCodePathConfig) {
    for polygon in polygons {
      self.queue_polygon(polygon, 0, config);
    }
  }

  /// No-ops on an empty batch; otherwise consults `optimizer` for island
  /// order and per-polygon start indices (indexed by original polygon
  /// index, not visiting order).
  pub fn queue_polygons_by_optimizer(
    &mut self,
    polygons: &Polygons,
    config: &GCodePathConfig,
    optimizer: &dyn PathOrderOptimizer,
  ) {
    if polygons.is_empty() {
      return;
    }
    let order = optimizer.optimize(polygons);
    for &island in &order.island_order {
      let start = order.start_index_in_polygon.get(island).copied().unwrap_or(0);
      self.queue_polygon(&polygons[island], start, config);
    }
  }

  /// If `LastPosition` is outside the boundary, pushes it inward twice (the
  /// second attempt escapes tight 90-degree corners a single push cannot
  /// clear) and, if now inside, travels there and force-starts a new path so
  /// the retraction lands after this recovery move.
  pub fn move_inside_the_outer_perimeter(&mut self, distance: i64) {
    let target = {
      let Some(boundary) = self.boundary.as_deref() else {
        return;
      };
      if boundary.point_is_inside(self.last_position) {
        return;
      }
      let mut point = self.last_position;
      for _ in 0..2 {
        if let Some(moved) = boundary.move_point_inside(point, distance) {
          point = moved;
        }
      }
      if boundary.point_is_inside(point) {
        Some(point)
      } else {
        None
      }
    };
    if let Some(point) = target {
      self.queue_travel(point);
      self.queue.force_new_path_start();
    }
  }

  /// Rescales `extrudeSpeedFactor` so the layer takes at least `min_time`
  /// seconds, never dropping any extrusion path below `min_speed` mm/s.
  /// Preserves the documented "final factor wins" loop behaviour (§9 open
  /// question) rather than tracking a running maximum.
  pub fn force_minimum_layer_time(&mut self, min_time: f64, min_speed: f64) {
    let mut position = self.writer.position();
    let mut extrude_time = 0.0;
    let mut travel_time = 0.0;

    for path in self.queue.paths() {
      if path.points.is_empty() {
        continue;
      }
      let mut prev = position;
      for &point in &path.points {
        let length_mm = prev.distance(point) / 1000.0;
        let time = length_mm / path.config.speed;
        if path.config.is_travel() {
          travel_time += time;
        } else {
          extrude_time += time;
        }
        prev = point;
      }
      if path.config.closed_loop {
        let length_mm = prev.distance(path.points[0]) / 1000.0;
        extrude_time += length_mm / path.config.speed;
      }
      position = *path.points.last().unwrap();
    }

    let total = extrude_time + travel_time;
    if total < min_time && extrude_time > 0.0 {
      let min_extrude = (min_time - travel_time).max(1.0);
      let mut factor = extrude_time / min_extrude;
      for path in self.queue.paths() {
        if path.config.is_travel() {
          continue;
        }
        if path.config.speed * factor < min_speed {
          factor = min_speed / path.config.speed;
        }
      }
      if factor * 100.0 < self.extrude_speed_factor as f64 {
        self.extrude_speed_factor = (factor * 100.0) as i64;
      } else {
        factor = self.extrude_speed_factor as f64 / 100.0;
      }
      let shortfall = min_time - extrude_time / factor - travel_time;
      if shortfall > 0.1 {
        self.extra_time = shortfall;
        warn!("layer underfilled by {shortfall:.2}s at the rescaled speed; no circle-around emitted");
      }
      self.total_print_time = extrude_time / factor + travel_time;
    } else {
      self.total_print_time = total;
    }

    self.extrude_speed_factor = self.extrude_speed_factor.max(1);
    self.travel_speed_factor = self.travel_speed_factor.max(1);
  }

  /// Returns a copy of `path` with its trailing seam-overlap length removed
  /// (target = `lineWidth * (1 - ratio)`). `ratio >= 1.0` is a no-op.
  pub fn trim_perimeter(path: &GCodePath, ratio: f64) -> GCodePath {
    let target = path.config.line_width_um as f64 * (1.0 - ratio);
    if target <= 0.0 || path.points.len() < 2 {
      return path.clone();
    }

    let mut trimmed = path.clone();
    trimmed.config.closed_loop = false;
    let mut removed = 0.0;

    while trimmed.points.len() >= 2 {
      let end = trimmed.points.len() - 1;
      let far = trimmed.points[end];
      let near = trimmed.points[end - 1];
      let segment_length = far.distance(near);
      if segment_length == 0.0 {
        trimmed.points.pop();
        continue;
      }
      if removed + segment_length >= target {
        if target > 50.0 {
          let length_to_remove = target - removed;
          let fraction_kept = ((segment_length - length_to_remove) / segment_length).clamp(0.0, 1.0);
          let dir = far - near;
          let new_point = IntPoint::new(
            near.x + (dir.x as f64 * fraction_kept).round() as i64,
            near.y + (dir.y as f64 * fraction_kept).round() as i64,
          )
          .at_z(far.z)
          .with_width(far.width);
          trimmed.points[end] = new_point;
        }
        break;
      }
      removed += segment_length;
      trimmed.points.pop();
    }
    trimmed
  }
}
