//! Per-scope polygon table.
//!
//! Shapes are stored once as point lists and referenced from records by a
//! compact [`PolygonIndex`]. The table is append-only.

use std::fmt;

/// A layout coordinate in database units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Construct a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Compact handle to a stored polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolygonIndex(pub u32);

impl fmt::Display for PolygonIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Append-only store of point lists.
#[derive(Clone, Debug, Default)]
pub struct PolygonTable {
    polygons: Vec<Vec<Point>>,
}

impl PolygonTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a polygon and return its index.
    pub fn add_polygon(&mut self, points: Vec<Point>) -> PolygonIndex {
        self.polygons.push(points);
        PolygonIndex((self.polygons.len() - 1) as u32)
    }

    /// Points of the polygon at `index`.
    pub fn polygon(&self, index: PolygonIndex) -> Option<&[Point]> {
        self.polygons.get(index.0 as usize).map(Vec::as_slice)
    }

    /// Number of stored polygons.
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Approximate heap bytes held.
    pub fn memory(&self) -> usize {
        self.polygons
            .iter()
            .map(|p| p.capacity() * std::mem::size_of::<Point>())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygons_keep_their_points() {
        let mut t = PolygonTable::new();
        let square = vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        let a = t.add_polygon(square.clone());
        let b = t.add_polygon(vec![Point::new(1, 1)]);
        assert_eq!(a, PolygonIndex(0));
        assert_eq!(b, PolygonIndex(1));
        assert_eq!(t.polygon(a), Some(square.as_slice()));
        assert_eq!(t.polygon(PolygonIndex(2)), None);
        assert_eq!(t.len(), 2);
    }
}
