use log::{debug, trace};

use toolpath_geometry::{merge_perimeter_overlaps, PolygonCleaner};
use toolpath_types::GCodePathConfig;

use crate::planner::Planner;
use crate::ports::GCodeWriter;

fn effective_speed(config: &GCodePathConfig, extrude_factor: i64, travel_factor: i64) -> f64 {
  if config.is_travel() {
    config.speed * travel_factor as f64 / 100.0
  } else if config.is_bridge() {
    config.speed
  } else {
    config.speed * extrude_factor as f64 / 100.0
  }
}

impl<W: GCodeWriter> Planner<W> {
  /// Walks the queue once, in queue order, issuing writer calls. Consumes
  /// no queue state itself — coalescing, spiralising and overlap-merge all
  /// operate on local copies of the traversed paths.
  pub fn write_queued_gcode(
    &mut self,
    layer_thickness: i64,
    fan_pct: f64,
    bridge_fan_pct: f64,
    cleaner: &dyn PolygonCleaner,
  ) {
    let paths = self.queue.paths().to_vec();
    self.last_position = self.writer.position_xy();
    let mut previous_comment: Option<String> = None;
    let mut fan_is_bridge = false;
    let mut index = 0;

    while index < paths.len() {
      let path = &paths[index];

      if path.extruder_index != self.writer.extruder_index() {
        self.writer.switch_extruder(path.extruder_index);
      } else if path.retract {
        self.writer.write_retraction();
      }

      if !path.config.is_travel() {
        let changed = previous_comment.as_deref() != Some(path.config.gcode_comment.as_str());
        if changed {
          if path.config.is_bridge() && bridge_fan_pct >= 0.0 {
            self.writer.write_fan_command(bridge_fan_pct);
            fan_is_bridge = true;
          } else if fan_is_bridge {
            self.writer.write_fan_command(fan_pct);
            fan_is_bridge = false;
          }
          self.writer.write_comment(&format!("TYPE:{}", path.config.gcode_comment));
          previous_comment = Some(path.config.gcode_comment.clone());
        }
      }

      let speed = effective_speed(&path.config, self.extrude_speed_factor, self.travel_speed_factor);

      if path.points.len() == 1 && !path.config.is_travel() {
        let threshold = 2.0 * path.config.line_width_um as f64;
        if self.last_position.distance(path.points[0]) < threshold {
          let mut run_end = index;
          let mut last_point = path.points[0];
          let mut j = index + 1;
          while j < paths.len() {
            let next = &paths[j];
            if next.points.len() == 1 && !next.config.is_travel() {
              let candidate = next.points[0];
              if last_point.distance(candidate) < threshold {
                last_point = candidate;
                run_end = j;
                j += 1;
                continue;
              }
            }
            break;
          }

          if run_end - index + 1 >= 3 {
            trace!("coalescing {} small moves starting at queue index {index}", run_end - index + 1);
            let mut running = self.last_position;
            for k in index..run_end {
              let a = paths[k].points[0];
              let b = paths[k + 1].points[0];
              let mid = a.midpoint(b);
              let old_len = running.distance(a);
              let new_len = running.distance(mid);
              if new_len != 0.0 {
                let eff_width = (paths[k].config.line_width_um as f64 * old_len / new_len).round() as i64;
                self.writer.write_move(mid, speed, eff_width);
                running = mid;
                self.last_position = mid;
              }
            }
            let last = paths[run_end].points[0];
            let width =
              if last.width != 0 { last.width } else { paths[run_end].config.line_width_um };
            self.writer.write_move(last, speed, width);
            self.last_position = last;
            index = run_end + 1;
            continue;
          }
        }
      }

      let mut working = path.clone();

      if working.config.spiralize && paths[(index + 1)..].iter().any(|p| p.config.spiralize) {
        working.config.spiralize = false;
      }
      if working.config.spiralize {
        let total_len = working.length();
        if total_len > 0.0 {
          let z0 = self.writer.current_z();
          let mut progress = 0.0;
          let mut prev = self.last_position;
          for point in working.points.iter_mut() {
            progress += prev.distance(*point);
            prev = *point;
            let z = z0 + (layer_thickness as f64 * (progress / total_len)).round() as i64;
            *point = point.at_z(z);
          }
        }
      }

      let mut emitted_via_merge = false;
      if self.merge_overlapping_lines && working.config.is_wall() {
        if self.perimeter_start_end_overlap_ratio < 1.0 {
          working = Planner::<W>::trim_perimeter(&working, self.perimeter_start_end_overlap_ratio);
        }
        if working.config.line_width_um > 0 && working.points.len() > 2 {
          let mut perimeter = Vec::with_capacity(working.points.len() + 1);
          perimeter.push(self.last_position);
          perimeter.extend(working.points.iter().copied());
          let (changed, chains) = merge_perimeter_overlaps(
            &perimeter,
            working.config.line_width_um,
            working.config.closed_loop,
            cleaner,
          );
          if changed && !chains.is_empty() {
            debug!(
              "overlap-merge produced {} chain(s) for a {} path",
              chains.len(),
              working.config.gcode_comment
            );
            for mut chain in chains {
              if chain.len() == 2 {
                let d0 = self.last_position.distance_squared(chain[0]);
                let d1 = self.last_position.distance_squared(chain[1]);
                if d1 < d0 {
                  chain.swap(0, 1);
                }
              }
              let first = chain[0];
              self.writer.write_move(first, self.travel_config.speed, 0);
              self.last_position = first;
              let mut predecessor_width = first.width;
              for point in chain.iter().skip(1) {
                let width =
                  if predecessor_width != 0 { predecessor_width } else { working.config.line_width_um };
                self.writer.write_move(*point, speed, width);
                self.last_position = *point;
                predecessor_width = point.width;
              }
            }
            emitted_via_merge = true;
          }
        }
      }

      if !emitted_via_merge {
        for point in &working.points {
          let width = if point.width != 0 { point.width } else { working.config.line_width_um };
          self.writer.write_move(*point, speed, width);
          self.last_position = *point;
        }
      }

      index += 1;
    }

    self.writer.update_total_print_time(self.total_print_time);
  }
}
