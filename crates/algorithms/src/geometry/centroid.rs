//! Polygon centroid by the first-moment (shoelace) formula

use geo_types::{Coord, LineString, MultiPolygon, Polygon};

/// Signed area and first moments of a closed ring.
///
/// Returns `(2A, Σ(xi + xi+1)·cross, Σ(yi + yi+1)·cross)`. The ring is
/// treated as closed even if the last vertex does not repeat the first.
fn ring_moments(ring: &LineString<f64>) -> (f64, f64, f64) {
    let coords = &ring.0;
    let n = coords.len();
    if n < 3 {
        return (0.0, 0.0, 0.0);
    }

    let (mut a2, mut mx, mut my) = (0.0, 0.0, 0.0);
    for i in 0..n {
        let p = coords[i];
        let q = coords[(i + 1) % n];
        let cross = p.x * q.y - q.x * p.y;
        a2 += cross;
        mx += (p.x + q.x) * cross;
        my += (p.y + q.y) * cross;
    }
    (a2, mx, my)
}

fn moments_to_centroid(a2: f64, mx: f64, my: f64) -> Option<Coord<f64>> {
    if a2.abs() < f64::EPSILON || !a2.is_finite() {
        return None;
    }
    Some(Coord {
        x: mx / (3.0 * a2),
        y: my / (3.0 * a2),
    })
}

/// Signed area of a ring (positive when counter-clockwise)
pub fn ring_area(ring: &LineString<f64>) -> f64 {
    ring_moments(ring).0 / 2.0
}

/// Centroid of a single ring, `None` for zero area
pub fn ring_centroid(ring: &LineString<f64>) -> Option<Coord<f64>> {
    let (a2, mx, my) = ring_moments(ring);
    moments_to_centroid(a2, mx, my)
}

/// Centroid of a polygon with holes.
///
/// Exterior and interior moments are combined with orientation-normalized
/// signs, so rings may come in either winding order.
pub fn polygon_centroid(polygon: &Polygon<f64>) -> Option<Coord<f64>> {
    let (a2, mx, my) = polygon_moments(polygon);
    moments_to_centroid(a2, mx, my)
}

/// Centroid of a set of disjoint polygons
pub fn multipolygon_centroid(polygons: &MultiPolygon<f64>) -> Option<Coord<f64>> {
    let (a2, mx, my) = polygons.0.iter().map(polygon_moments).fold(
        (0.0, 0.0, 0.0),
        |acc, m| (acc.0 + m.0, acc.1 + m.1, acc.2 + m.2),
    );
    moments_to_centroid(a2, mx, my)
}

fn polygon_moments(polygon: &Polygon<f64>) -> (f64, f64, f64) {
    let oriented = |ring: &LineString<f64>, sign: f64| {
        let (a2, mx, my) = ring_moments(ring);
        let s = if a2 < 0.0 { -sign } else { sign };
        (s * a2, s * mx, s * my)
    };

    let mut total = oriented(polygon.exterior(), 1.0);
    for hole in polygon.interiors() {
        let h = oriented(hole, -1.0);
        total = (total.0 + h.0, total.1 + h.1, total.2 + h.2);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(x0: f64, y0: f64, side: f64) -> LineString<f64> {
        LineString::from(vec![
            (x0, y0),
            (x0 + side, y0),
            (x0 + side, y0 + side),
            (x0, y0 + side),
            (x0, y0),
        ])
    }

    #[test]
    fn test_unit_square() {
        let c = ring_centroid(&square(0.0, 0.0, 1.0)).unwrap();
        assert_relative_eq!(c.x, 0.5);
        assert_relative_eq!(c.y, 0.5);
        assert_relative_eq!(ring_area(&square(0.0, 0.0, 1.0)), 1.0);
    }

    #[test]
    fn test_clockwise_ring() {
        let mut ring = square(2.0, 2.0, 2.0);
        ring.0.reverse();
        let c = ring_centroid(&ring).unwrap();
        assert_relative_eq!(c.x, 3.0);
        assert_relative_eq!(c.y, 3.0);
        assert!(ring_area(&ring) < 0.0);
    }

    #[test]
    fn test_unclosed_ring() {
        let ring = LineString::from(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let c = ring_centroid(&ring).unwrap();
        assert_relative_eq!(c.x, 1.0);
        assert_relative_eq!(c.y, 1.0);
    }

    #[test]
    fn test_degenerate_ring() {
        let line = LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.0, 0.0)]);
        assert!(ring_centroid(&line).is_none());
    }

    #[test]
    fn test_polygon_with_hole() {
        // 4x4 square with the 2x2 upper-right quadrant cut out
        let mut hole = square(2.0, 2.0, 2.0);
        hole.0.reverse();
        let poly = Polygon::new(square(0.0, 0.0, 4.0), vec![hole]);
        let c = polygon_centroid(&poly).unwrap();
        // (16·2 − 4·3) / 12
        assert_relative_eq!(c.x, 20.0 / 12.0, epsilon = 1e-12);
        assert_relative_eq!(c.y, 20.0 / 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_multipolygon_weights_by_area() {
        let mp = MultiPolygon(vec![
            Polygon::new(square(0.0, 0.0, 1.0), vec![]),
            Polygon::new(square(3.0, 0.0, 1.0), vec![]),
        ]);
        let c = multipolygon_centroid(&mp).unwrap();
        assert_relative_eq!(c.x, 2.0);
        assert_relative_eq!(c.y, 0.5);
    }
}
