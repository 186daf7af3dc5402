//! Segment algebra and the overlap-detection/perimeter-merge algorithms
//! that turn per-layer polygons into thin-line and perimeter-overlap
//! corrected segment chains.

pub mod cleaner;
pub mod overlap;
pub mod segment;

pub use cleaner::{IdentityCleaner, PolygonCleaner};
pub use overlap::{find_thin_lines, make_close_segments_mergable, merge_perimeter_overlaps};
pub use segment::{
  convert_path_to_segments, get_split_segment_for_vertices, to_segments, to_segments_many, Segment,
};
