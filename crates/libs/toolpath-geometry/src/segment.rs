use std::collections::BTreeMap;

use toolpath_types::{IntPoint, Polygon, Polygons};

/// Directed pair of points. Equality is pairwise and — because `IntPoint`
/// equality ignores Z/width — positional only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
  pub start: IntPoint,
  pub end: IntPoint,
}

impl Segment {
  pub fn new(start: IntPoint, end: IntPoint) -> Self {
    Segment { start, end }
  }

  pub fn direction(&self) -> IntPoint {
    self.end - self.start
  }

  pub fn length_squared(&self) -> i64 {
    self.direction().length_squared()
  }

  pub fn length(&self) -> f64 {
    self.direction().length()
  }
}

/// `n` segments if `closed`, `n - 1` if open.
pub fn to_segments(polygon: &Polygon, closed: bool) -> Vec<Segment> {
  let n = polygon.len();
  if n < 2 {
    return Vec::new();
  }
  let count = if closed { n } else { n - 1 };
  (0..count).map(|i| Segment::new(polygon[i], polygon[(i + 1) % n])).collect()
}

/// Flattening overload of [`to_segments`] over a batch of polygons.
pub fn to_segments_many(polygons: &Polygons, closed: bool) -> Vec<Segment> {
  polygons.iter().flat_map(|p| to_segments(p, closed)).collect()
}

/// Same as [`to_segments`] but lifts every endpoint to `z_height`, used to
/// carry 2D intermediates (e.g. overlap-merge output) back onto a layer
/// plane.
pub fn convert_path_to_segments(path: &Polygon, z_height: i64, closed: bool) -> Vec<Segment> {
  to_segments(path, closed)
    .into_iter()
    .map(|s| Segment::new(s.start.at_z(z_height), s.end.at_z(z_height)))
    .collect()
}

/// The subdivision primitive: splits `segment` at every vertex in
/// `split_points` that lies close enough to the segment's infinite line
/// (within `max_distance`, using a length-scaled threshold to stay in
/// integers) and strictly inside the open segment.
///
/// Returns `None` when no vertex qualifies, so callers can detect "no
/// change" per spec.
///
/// Ordering key: rather than dividing by the segment's (irrational) integer
/// length to get a micrometre offset `t`, this keys the sorted map by the
/// raw dot product `along = d . u`. `along` is proportional to `t` by the
/// segment's fixed length, so it sorts identically and produces identical
/// tie-breaks, while keeping every step in exact 64-bit integer arithmetic.
pub fn get_split_segment_for_vertices(
  segment: Segment,
  split_points: &[IntPoint],
  max_distance: i64,
) -> Option<Vec<IntPoint>> {
  let s = segment.start;
  let e = segment.end;
  let d = e - s;
  let l_sq = d.length_squared();
  if l_sq == 0 {
    return None;
  }
  let l = (l_sq as f64).sqrt();
  let n_r = d.perpendicular_right();
  let tau = max_distance as f64 * l;

  let mut by_along: BTreeMap<i64, IntPoint> = BTreeMap::new();
  for &v in split_points {
    let u = v - s;
    let side = n_r.dot(u);
    if (side as f64).abs() >= tau {
      continue;
    }
    let along = d.dot(u);
    if !(along > 0 && along < l_sq) {
      continue;
    }
    let frac = along as f64 / l_sq as f64;
    let point = IntPoint::new(
      s.x + (d.x as f64 * frac).round() as i64,
      s.y + (d.y as f64 * frac).round() as i64,
    )
    .at_z(s.z);
    by_along.entry(along).or_insert(point);
  }

  if by_along.is_empty() {
    return None;
  }
  by_along.entry(0).or_insert(s);
  by_along.entry(l_sq).or_insert(e);
  Some(by_along.into_values().collect())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn to_segments_counts_match_closedness() {
    let square: Polygon =
      vec![IntPoint::new(0, 0), IntPoint::new(10, 0), IntPoint::new(10, 10), IntPoint::new(0, 10)];
    assert_eq!(to_segments(&square, true).len(), 4);
    assert_eq!(to_segments(&square, false).len(), 3);
  }

  #[test]
  fn split_rejects_vertex_off_the_line() {
    let seg = Segment::new(IntPoint::new(0, 0), IntPoint::new(10_000, 0));
    let far = IntPoint::new(5_000, 5_000);
    assert!(get_split_segment_for_vertices(seg, &[far], 100).is_none());
  }

  #[test]
  fn split_rejects_vertex_outside_open_segment() {
    let seg = Segment::new(IntPoint::new(0, 0), IntPoint::new(10_000, 0));
    let beyond_end = IntPoint::new(15_000, 0);
    assert!(get_split_segment_for_vertices(seg, &[beyond_end], 100).is_none());
  }

  #[test]
  fn split_inserts_interior_vertex_and_keeps_endpoints() {
    let seg = Segment::new(IntPoint::new(0, 0), IntPoint::new(10_000, 0));
    let mid = IntPoint::new(4_000, 10);
    let chain = get_split_segment_for_vertices(seg, &[mid], 200).unwrap();
    assert_eq!(chain.first().unwrap(), &seg.start);
    assert_eq!(chain.last().unwrap(), &seg.end);
    assert_eq!(chain.len(), 3);
    // The inserted point lies on the original line within 1 um.
    assert!((chain[1].x - 4_000).abs() <= 1);
    assert_eq!(chain[1].y, 0);
  }

  #[test]
  fn duplicate_projection_keys_keep_first_insertion() {
    let seg = Segment::new(IntPoint::new(0, 0), IntPoint::new(10_000, 0));
    let a = IntPoint::new(5_000, 1);
    let b = IntPoint::new(5_000, -1);
    let chain = get_split_segment_for_vertices(seg, &[a, b], 200).unwrap();
    assert_eq!(chain.len(), 3);
    assert_eq!(chain[1].y, 1);
  }
}
