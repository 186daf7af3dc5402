use derive_more::{Add, Neg, Sub};

/// Fixed-point 2D/3D point in micrometres, with an extra `width` channel used
/// to carry a per-vertex extrusion width override once overlap merging has
/// run. `width == 0` means "use the path's config width".
#[derive(Debug, Default, Clone, Copy, Add, Sub, Neg)]
pub struct IntPoint {
  pub x: i64,
  pub y: i64,
  pub z: i64,
  pub width: i64,
}

impl PartialEq for IntPoint {
  /// Equality is componentwise on X/Y only — Z and width do not participate
  /// in positional equality, matching how segment dedup and path-closing
  /// checks compare points.
  fn eq(&self, other: &Self) -> bool {
    self.x == other.x && self.y == other.y
  }
}

impl IntPoint {
  pub fn new(x: i64, y: i64) -> Self {
    IntPoint { x, y, z: 0, width: 0 }
  }

  pub fn with_z(x: i64, y: i64, z: i64) -> Self {
    IntPoint { x, y, z, width: 0 }
  }

  pub fn at_z(self, z: i64) -> Self {
    IntPoint { z, ..self }
  }

  pub fn with_width(self, width: i64) -> Self {
    IntPoint { width, ..self }
  }

  pub fn dot(self, other: Self) -> i64 {
    self.x * other.x + self.y * other.y
  }

  /// Squared planar length; callers needing an exact comparison should prefer
  /// `shorter_than`/`longer_than` to avoid a square root.
  pub fn length_squared(self) -> i64 {
    self.x * self.x + self.y * self.y
  }

  pub fn length(self) -> f64 {
    (self.length_squared() as f64).sqrt()
  }

  pub fn length_mm(self) -> f64 {
    self.length() / 1000.0
  }

  pub fn shorter_than(self, d: i64) -> bool {
    self.length_squared() < d * d
  }

  pub fn longer_than(self, d: i64) -> bool {
    self.length_squared() > d * d
  }

  /// Planar distance between two points (ignores Z).
  pub fn distance(self, other: Self) -> f64 {
    (other - self).length()
  }

  pub fn distance_squared(self, other: Self) -> i64 {
    (other - self).length_squared()
  }

  /// Rotates the vector 90 degrees to the left: `(x, y) -> (-y, x)`.
  pub fn perpendicular_left(self) -> Self {
    IntPoint { x: -self.y, y: self.x, z: self.z, width: self.width }
  }

  /// Rotates the vector 90 degrees to the right: `(x, y) -> (y, -x)`.
  pub fn perpendicular_right(self) -> Self {
    IntPoint { x: self.y, y: -self.x, z: self.z, width: self.width }
  }

  /// Returns a vector of length `d` along the same direction as `self`.
  pub fn normal(self, d: i64) -> Self {
    let len = self.length();
    if len == 0.0 {
      return IntPoint::new(0, 0);
    }
    let scale = d as f64 / len;
    IntPoint::new((self.x as f64 * scale).round() as i64, (self.y as f64 * scale).round() as i64)
  }

  /// Integer midpoint; truncates toward zero by at most 1 micrometre, as
  /// spec'd for overlap-merge midpoints.
  pub fn midpoint(self, other: Self) -> Self {
    IntPoint::new((self.x + other.x) / 2, (self.y + other.y) / 2)
  }
}

/// Ordered sequence of points. May represent a closed or open polygon
/// depending on the caller's `closed` flag — the data type itself carries no
/// closedness bit.
pub type Polygon = Vec<IntPoint>;
pub type Polygons = Vec<Polygon>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn equality_ignores_z_and_width() {
    let a = IntPoint { x: 1, y: 2, z: 10, width: 50 };
    let b = IntPoint { x: 1, y: 2, z: 99, width: 0 };
    assert_eq!(a, b);
  }

  #[test]
  fn shorter_than_avoids_sqrt_but_matches_length() {
    let p = IntPoint::new(3, 4);
    assert!(p.shorter_than(6));
    assert!(!p.shorter_than(5));
    assert!(p.longer_than(4));
  }

  #[test]
  fn perpendiculars_are_orthogonal_and_opposite() {
    let p = IntPoint::new(5, 0);
    let left = p.perpendicular_left();
    let right = p.perpendicular_right();
    assert_eq!(left, IntPoint::new(0, 5));
    assert_eq!(right, IntPoint::new(0, -5));
    assert_eq!(left.dot(right), -25);
  }

  #[test]
  fn normal_preserves_direction_and_sets_length() {
    let p = IntPoint::new(30, 40);
    let n = p.normal(100);
    assert!((n.length() - 100.0).abs() < 1.0);
  }
}
