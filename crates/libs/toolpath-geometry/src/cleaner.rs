use toolpath_types::Polygons;

/// External polygon clipping/cleaning collaborator (spec: "a geometric
/// library", out of scope for this crate). `MergePerimeterOverlaps` runs the
/// cleaner before segmenting so that the overlap search never trips over
/// self-intersections or near-duplicate vertices left by upstream slicing.
pub trait PolygonCleaner {
  fn clean(&self, polygons: &Polygons, tolerance_um: i64) -> Polygons;
}

/// Cleaner that returns its input unchanged. Useful for tests and for
/// callers that have already cleaned their geometry upstream.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityCleaner;

impl PolygonCleaner for IdentityCleaner {
  fn clean(&self, polygons: &Polygons, _tolerance_um: i64) -> Polygons {
    polygons.clone()
  }
}
