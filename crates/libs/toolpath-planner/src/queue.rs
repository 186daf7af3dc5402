use toolpath_types::{GCodePath, GCodePathConfig};

/// Append-only list of grouped moves sharing a config, with the grouping
/// invariant that no two adjacent open paths share a config at the moment
/// of lookup — `get_latest_path_with_config` coalesces on append.
#[derive(Debug, Default)]
pub struct PathQueue {
  paths: Vec<GCodePath>,
}

impl PathQueue {
  pub fn new() -> Self {
    PathQueue { paths: Vec::new() }
  }

  pub fn len(&self) -> usize {
    self.paths.len()
  }

  pub fn is_empty(&self) -> bool {
    self.paths.is_empty()
  }

  pub fn paths(&self) -> &[GCodePath] {
    &self.paths
  }

  pub fn into_paths(self) -> Vec<GCodePath> {
    self.paths
  }

  /// Returns the tail path if it exists, shares `config`, and is not yet
  /// `done`; otherwise appends and returns a fresh path.
  pub fn get_latest_path_with_config(
    &mut self,
    config: &GCodePathConfig,
    extruder_index: i32,
  ) -> &mut GCodePath {
    let needs_new = match self.paths.last() {
      Some(last) => last.done || &last.config != config,
      None => true,
    };
    if needs_new {
      self.paths.push(GCodePath::new(config.clone(), extruder_index));
    }
    self.paths.last_mut().expect("a path was just pushed if the queue was empty")
  }

  /// Marks the tail path `done` so the next append allocates a fresh path,
  /// guaranteeing a pending retraction is emitted after the current run.
  pub fn force_new_path_start(&mut self) {
    if let Some(last) = self.paths.last_mut() {
      last.done = true;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_config_appends_to_tail() {
    let mut queue = PathQueue::new();
    let config = GCodePathConfig::new(40.0, 400, "WALL-OUTER");
    queue.get_latest_path_with_config(&config, 0).push(toolpath_types::IntPoint::new(0, 0));
    queue.get_latest_path_with_config(&config, 0).push(toolpath_types::IntPoint::new(1, 0));
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.paths()[0].points.len(), 2);
  }

  #[test]
  fn config_change_starts_new_path() {
    let mut queue = PathQueue::new();
    let wall = GCodePathConfig::new(40.0, 400, "WALL-OUTER");
    let travel = GCodePathConfig::travel(150.0);
    queue.get_latest_path_with_config(&wall, 0);
    queue.get_latest_path_with_config(&travel, 0);
    assert_eq!(queue.len(), 2);
  }

  #[test]
  fn force_new_path_start_splits_same_config_runs() {
    let mut queue = PathQueue::new();
    let wall = GCodePathConfig::new(40.0, 400, "WALL-OUTER");
    queue.get_latest_path_with_config(&wall, 0);
    queue.force_new_path_start();
    queue.get_latest_path_with_config(&wall, 0);
    assert_eq!(queue.len(), 2);
  }
}
