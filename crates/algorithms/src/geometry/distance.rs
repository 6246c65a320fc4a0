//! Geodesic distance on an ellipsoidal Earth
//!
//! Flat-Earth ellipsoidal approximation (FCC, 47 CFR 73.208), accurate to
//! within a few meters for separations up to about 475 km. Points are
//! geographic coordinates with `x` = longitude and `y` = latitude in
//! decimal degrees.

use geo_types::Coord;

/// Distance in kilometers between two geographic points.
///
/// ```text
/// φ  = (lat1 + lat2) / 2
/// k1 = 111.13209 − 0.56605·cos(2φ) + 0.00120·cos(4φ)
/// k2 = 111.41513·cos(φ) − 0.09455·cos(3φ) + 0.00120·cos(5φ)
/// d  = sqrt(k1²·Δlat² + k2²·Δlon²)
/// ```
pub fn geodesic_distance_km(p1: Coord<f64>, p2: Coord<f64>) -> f64 {
    let dphi = p1.y - p2.y;
    let dlam = p1.x - p2.x;
    let phim = (0.5 * (p1.y + p2.y)).to_radians();

    let k1 = 111.13209 - 0.56605 * (2.0 * phim).cos() + 0.00120 * (4.0 * phim).cos();
    let k2 = 111.41513 * phim.cos() - 0.09455 * (3.0 * phim).cos() + 0.00120 * (5.0 * phim).cos();

    (k1 * k1 * dphi * dphi + k2 * k2 * dlam * dlam).sqrt()
}

/// Planar squared distance in degrees², used where only ranking matters
#[inline]
pub fn planar_distance_sq(p1: Coord<f64>, p2: Coord<f64>) -> f64 {
    let dx = p1.x - p2.x;
    let dy = p1.y - p2.y;
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn test_zero_distance() {
        let p = c(-82.53, 35.61);
        assert_eq!(geodesic_distance_km(p, p), 0.0);
    }

    #[test]
    fn test_one_degree_longitude_at_equator() {
        let d = geodesic_distance_km(c(0.0, 0.0), c(1.0, 0.0));
        assert_relative_eq!(d, 111.19, epsilon = 0.5);
        assert_relative_eq!(d, 111.41513 - 0.09455 + 0.00120, epsilon = 1e-9);
    }

    #[test]
    fn test_one_degree_latitude_at_equator() {
        let d = geodesic_distance_km(c(0.0, 0.0), c(0.0, 1.0));
        assert_relative_eq!(d, 110.57, epsilon = 0.01);
    }

    #[test]
    fn test_symmetric() {
        let a = c(-76.9, 39.1);
        let b = c(-77.4, 38.6);
        assert_relative_eq!(geodesic_distance_km(a, b), geodesic_distance_km(b, a));
    }

    #[test]
    fn test_longitude_shrinks_with_latitude() {
        let equator = geodesic_distance_km(c(0.0, 0.0), c(0.1, 0.0));
        let north = geodesic_distance_km(c(0.0, 60.0), c(0.1, 60.0));
        assert!(north < equator * 0.55);
    }

    #[test]
    fn test_planar_distance_sq() {
        assert_relative_eq!(planar_distance_sq(c(0.0, 0.0), c(3.0, 4.0)), 25.0);
    }
}
