use log::{debug, trace};

use toolpath_types::{IntPoint, Polygon, Polygons};

use crate::cleaner::PolygonCleaner;
use crate::segment::{get_split_segment_for_vertices, to_segments, to_segments_many, Segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
  None,
  Merged,
  Remove,
}

/// Subdivides `target` wherever any point of `split_on` lies near one of
/// its segments, so that a long segment on one side of a doubled-back path
/// gains the same vertex density as the shorter segments on the other side.
pub fn make_close_segments_mergable_one(
  target: &Polygon,
  split_on: &Polygon,
  max_distance: i64,
  closed: bool,
) -> Polygon {
  let mut segs = to_segments(target, closed);
  for i in (0..segs.len()).rev() {
    if let Some(chain) = get_split_segment_for_vertices(segs[i], split_on, max_distance) {
      let replacement: Vec<Segment> = chain.windows(2).map(|w| Segment::new(w[0], w[1])).collect();
      segs.splice(i..=i, replacement);
    }
  }
  let mut rebuilt: Polygon = segs.iter().map(|s| s.start).collect();
  if !closed {
    if let Some(last) = segs.last() {
      rebuilt.push(last.end);
    }
  }
  rebuilt
}

/// Whole-polygons overload: every polygon is split against every polygon in
/// the input batch, including itself — self-splitting subdivides a
/// perimeter at its own vertices when it doubles back on itself.
pub fn make_close_segments_mergable(
  polygons: &Polygons,
  max_distance: i64,
  closed: bool,
) -> Polygons {
  polygons
    .iter()
    .map(|target| {
      let mut current = target.clone();
      for split_on in polygons {
        current = make_close_segments_mergable_one(&current, split_on, max_distance, closed);
      }
      current
    })
    .collect()
}

/// Reconstructs polygons from a tagged, ordered segment list. A new chain
/// starts whenever the next kept segment does not connect end-to-end with
/// the previous one; a merged segment contributes both endpoints, a
/// connected follow-on segment contributes only its end.
fn reconstruct_chains(tagged: &[(Segment, Tag)], keep: impl Fn(Tag) -> bool) -> Polygons {
  let mut result = Polygons::new();
  let mut current: Polygon = Vec::new();
  for (seg, tag) in tagged {
    if !keep(*tag) {
      continue;
    }
    match current.last() {
      Some(last) if *last == seg.start => current.push(seg.end),
      _ => {
        if !current.is_empty() {
          result.push(std::mem::take(&mut current));
        }
        current.push(seg.start);
        current.push(seg.end);
      }
    }
  }
  if !current.is_empty() {
    result.push(current);
  }
  result
}

/// One merge attempt for segment `i` against candidate `j`. Returns the new
/// merged endpoints (with width set) on acceptance.
struct MergeOutcome {
  new_start: IntPoint,
  new_end: IntPoint,
}

#[allow(clippy::too_many_arguments)]
fn try_merge(
  segs: &[Segment],
  i: usize,
  j: usize,
  merge_d: f64,
  min_width: Option<f64>,
  require_left_normal: bool,
  require_opposite_direction: bool,
  extra_width: i64,
) -> Option<MergeOutcome> {
  let si = segs[i];
  let sj = segs[j];

  if require_opposite_direction && si.direction().dot(sj.direction()) >= 0 {
    return None;
  }

  let start_delta = si.start.distance(sj.end);
  if !(start_delta < merge_d) {
    return None;
  }
  let end_delta = si.end.distance(sj.start);
  if !(end_delta < merge_d) {
    return None;
  }

  let narrow = start_delta.min(end_delta);
  if let Some(min_width) = min_width {
    if !(narrow > min_width) {
      return None;
    }
  }
  let width = (narrow.round() as i64) + extra_width;

  if require_left_normal {
    let p = si.start.midpoint(sj.end);
    let n_l = si.direction().perpendicular_left();
    let delta = p - si.start;
    if n_l.dot(delta) <= 0 {
      return None;
    }
  }

  Some(MergeOutcome {
    new_start: si.start.midpoint(sj.end).with_width(width),
    new_end: si.end.midpoint(sj.start).with_width(width),
  })
}

/// Finds thin-line cores: pairs of near-antiparallel segments whose
/// endpoints lie within `merge_d` of each other and whose apparent width
/// exceeds `min_width`, on the inside of the existing curve. Returns only
/// the merged centrelines (§4.2.2).
pub fn find_thin_lines(
  polygons: &Polygons,
  merge_d: i64,
  min_width: i64,
  closed: bool,
) -> (bool, Polygons) {
  let preprocessed = make_close_segments_mergable(polygons, merge_d, closed);
  let mut segs = to_segments_many(&preprocessed, closed);
  let mut tags = vec![Tag::None; segs.len()];

  for i in 0..segs.len() {
    if tags[i] != Tag::None {
      continue;
    }
    for j in (i + 1)..segs.len() {
      if tags[j] != Tag::None {
        continue;
      }
      if let Some(outcome) =
        try_merge(&segs, i, j, merge_d as f64, Some(min_width as f64), true, false, 0)
      {
        segs[i].start = outcome.new_start;
        segs[i].end = outcome.new_end;
        tags[i] = Tag::Merged;
        tags[j] = Tag::Remove;
        break;
      }
    }
  }

  let has_merge = tags.iter().any(|t| *t == Tag::Merged);
  let tagged: Vec<(Segment, Tag)> = segs.into_iter().zip(tags).collect();
  let merged = reconstruct_chains(&tagged, |t| t == Tag::Merged);
  debug!("find_thin_lines: {} segment(s) merged into {} chain(s)", merged.len(), merged.len());
  (has_merge, merged)
}

/// Merges genuinely opposed perimeter segments into a variable-width path,
/// keeping the unmerged runs at the seeded nominal `line_width` so the
/// result is a full path rather than only the thin cores (§4.2.3).
pub fn merge_perimeter_overlaps(
  perimeter: &Polygon,
  line_width: i64,
  closed: bool,
  cleaner: &dyn PolygonCleaner,
) -> (bool, Polygons) {
  let cleaned = cleaner.clean(&vec![perimeter.clone()], line_width / 40);
  let Some(cleaned_poly) = cleaned.into_iter().next() else {
    return (false, Vec::new());
  };
  if cleaned_poly.is_empty() {
    return (false, Vec::new());
  }

  let seeded: Polygon = cleaned_poly.iter().map(|p| p.with_width(line_width)).collect();
  let split = make_close_segments_mergable_one(&seeded, &seeded, line_width, closed);
  let mut segs = to_segments(&split, closed);
  let mut tags = vec![Tag::None; segs.len()];

  for i in 0..segs.len() {
    if tags[i] != Tag::None {
      continue;
    }
    for j in (i + 1)..segs.len() {
      if tags[j] != Tag::None {
        continue;
      }
      if let Some(outcome) =
        try_merge(&segs, i, j, line_width as f64, None, false, true, line_width)
      {
        segs[i].start = outcome.new_start;
        segs[i].end = outcome.new_end;
        tags[i] = Tag::Merged;
        tags[j] = Tag::Remove;
        break;
      }
    }
  }

  let has_merge = tags.iter().any(|t| *t == Tag::Merged);
  let tagged: Vec<(Segment, Tag)> = segs.into_iter().zip(tags).collect();
  let result = reconstruct_chains(&tagged, |t| t != Tag::Remove);
  trace!("merge_perimeter_overlaps: optimised={has_merge}, {} polygon(s) out", result.len());
  (has_merge, result)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rect(w: i64, h: i64) -> Polygon {
    vec![IntPoint::new(0, 0), IntPoint::new(w, 0), IntPoint::new(w, h), IntPoint::new(0, h)]
  }

  #[test]
  fn rectangle_perimeter_has_no_overlap() {
    let (optimised, _) = merge_perimeter_overlaps(&rect(10_000, 10_000), 400, true, &crate::cleaner::IdentityCleaner);
    assert!(!optimised);
  }

  #[test]
  fn hairpin_perimeter_merges_into_variable_width_stroke() {
    let hairpin = vec![
      IntPoint::new(0, 0),
      IntPoint::new(10_000, 0),
      IntPoint::new(10_000, 200),
      IntPoint::new(0, 200),
    ];
    let (optimised, polys) =
      merge_perimeter_overlaps(&hairpin, 400, false, &crate::cleaner::IdentityCleaner);
    assert!(optimised);
    // The two antiparallel strands collapse into one variable-width
    // centreline near (0,100)-(10000,100) at width ~600 (200 overlap gap +
    // 400 nominal width); the short turnaround cap at x=10000 has no
    // opposite partner and survives untouched at the seeded nominal width.
    let merged_chain = polys
      .iter()
      .find(|c| c.len() == 2 && (c[0].width - 600).abs() <= 2)
      .expect("expected one merged centreline in the output");
    assert_eq!(merged_chain[0].y, 100);
    assert_eq!(merged_chain[1].y, 100);
  }

  #[test]
  fn thin_line_detection_finds_single_centreline() {
    let top: Polygon = vec![IntPoint::new(0, 0), IntPoint::new(10_000, 0)];
    let bottom: Polygon = vec![IntPoint::new(10_000, 50), IntPoint::new(0, 50)];
    let (has_merge, chains) = find_thin_lines(&vec![top, bottom], 200, 10, false);
    assert!(has_merge);
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].len(), 2);
    assert_eq!(chains[0][0].y, 25);
    assert_eq!(chains[0][1].y, 25);
    assert_eq!(chains[0][0].width, 50);
  }

  #[test]
  fn thin_line_detection_rejects_outside_of_curve_matches() {
    // Same antiparallel, close-endpoint shape as the accepted hairpin, but
    // mirrored to the opposite side of the first segment: the merged
    // centreline would land outside the existing curve, so the left-normal
    // gate must reject it even though endpoints and width both qualify.
    let top: Polygon = vec![IntPoint::new(0, 0), IntPoint::new(10_000, 0)];
    let bottom: Polygon = vec![IntPoint::new(10_000, -50), IntPoint::new(0, -50)];
    let (has_merge, chains) = find_thin_lines(&vec![top, bottom], 200, 10, false);
    assert!(!has_merge);
    assert!(chains.is_empty());
  }

  #[test]
  fn no_close_pairs_yields_no_merge() {
    let a: Polygon = vec![IntPoint::new(0, 0), IntPoint::new(10_000, 0)];
    let b: Polygon = vec![IntPoint::new(0, 50_000), IntPoint::new(10_000, 50_000)];
    let (has_merge, chains) = find_thin_lines(&vec![a, b], 200, 10, false);
    assert!(!has_merge);
    assert!(chains.is_empty());
  }

  #[test]
  fn make_close_segments_mergable_is_idempotent() {
    let hairpin = vec![
      IntPoint::new(0, 0),
      IntPoint::new(10_000, 0),
      IntPoint::new(10_000, 200),
      IntPoint::new(0, 200),
    ];
    let once = make_close_segments_mergable(&vec![hairpin.clone()], 300, false);
    let twice = make_close_segments_mergable(&once, 300, false);
    assert_eq!(once, twice);
  }
}
