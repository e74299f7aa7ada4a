// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Point;

/// Mean radius of Earth, in meters.
/// Source: https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius
const EARTH_RADIUS: f64 = 6_371_008.8;

/// Mean diameter of Earth, in meters.
const EARTH_DIAMETER: f64 = EARTH_RADIUS + EARTH_RADIUS;

const VINCENTY_MAX_ITERATIONS: usize = 200;
const VINCENTY_EPSILON: f64 = 1e-12;

/// Reference ellipsoid, described by its semi-major axis (meters) and flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub a: f64,
    pub f: f64,
}

impl Ellipsoid {
    /// The [WGS84](https://en.wikipedia.org/wiki/World_Geodetic_System) ellipsoid.
    pub const WGS84: Self = Self {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    /// Semi-minor axis, in meters.
    pub fn b(&self) -> f64 {
        (1.0 - self.f) * self.a
    }
}

/// Ellipsoidal distance measurement service over geodetic (lon, lat) [Points](Point).
///
/// A `DistanceArea` is constructed once and handed to every component
/// which needs to measure distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceArea {
    ellipsoid: Ellipsoid,
}

impl Default for DistanceArea {
    fn default() -> Self {
        Self::new(Ellipsoid::WGS84)
    }
}

impl DistanceArea {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    /// Length of the geodesic between two points, in meters.
    ///
    /// Uses [Vincenty's inverse formula](https://en.wikipedia.org/wiki/Vincenty%27s_formulae).
    /// For nearly antipodal points, where the iteration does not converge,
    /// the great-circle distance is returned instead.
    pub fn measure_line(&self, p1: Point, p2: Point) -> f64 {
        vincenty(&self.ellipsoid, p1, p2).unwrap_or_else(|| earth_distance(p1, p2))
    }

    /// Sum of geodesic lengths of consecutive segments of a polyline, in meters.
    pub fn measure_length(&self, pts: &[Point]) -> f64 {
        pts.windows(2)
            .map(|pair| self.measure_line(pair[0], pair[1]))
            .sum()
    }
}

fn vincenty(e: &Ellipsoid, p1: Point, p2: Point) -> Option<f64> {
    let a = e.a;
    let f = e.f;
    let b = e.b();

    let l = (p2.x - p1.x).to_radians();
    let u1 = ((1.0 - f) * p1.y.to_radians().tan()).atan();
    let u2 = ((1.0 - f) * p2.y.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut converged = false;

    let mut sin_sigma = 0.0;
    let mut cos_sigma = 0.0;
    let mut sigma = 0.0;
    let mut cos_sq_alpha = 0.0;
    let mut cos_2sigma_m = 0.0;

    for _ in 0..VINCENTY_MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let t1 = cos_u2 * sin_lambda;
        let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        sin_sigma = (t1 * t1 + t2 * t2).sqrt();
        if sin_sigma == 0.0 {
            return Some(0.0);
        }

        cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;

        // Equatorial line: cos_sq_alpha == 0
        cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };

        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if (lambda - previous).abs() < VINCENTY_EPSILON {
            converged = true;
            break;
        }
    }

    if !converged {
        return None;
    }

    let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let delta_sigma = big_b
        * sin_sigma
        * (cos_2sigma_m
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                    - big_b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));

    Some(b * big_a * (sigma - delta_sigma))
}

/// Calculates the great-circle distance between two (lon, lat) positions
/// on Earth using the `haversine formula <https://en.wikipedia.org/wiki/Haversine_formula>`_.
/// Returns the result in meters.
pub fn earth_distance(p1: Point, p2: Point) -> f64 {
    let lat1 = p1.y.to_radians();
    let lon1 = p1.x.to_radians();
    let lat2 = p2.y.to_radians();
    let lon2 = p2.x.to_radians();

    let sin_dlat_half = ((lat2 - lat1) * 0.5).sin();
    let sin_dlon_half = ((lon2 - lon1) * 0.5).sin();

    let h = sin_dlat_half * sin_dlat_half + lat1.cos() * lat2.cos() * sin_dlon_half * sin_dlon_half;

    EARTH_DIAMETER * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr, $eps:expr) => {
            assert!(
                (($a - $b).abs() < $eps),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    #[test]
    fn measure_line_meridian() {
        let d = DistanceArea::default();
        assert_almost_eq!(
            d.measure_line(Point::new(0.0, 0.0), Point::new(0.0, 1.0)),
            110_574.388_6,
            1e-3
        );
    }

    #[test]
    fn measure_line_equator() {
        let d = DistanceArea::default();
        assert_almost_eq!(
            d.measure_line(Point::new(0.0, 0.0), Point::new(1.0, 0.0)),
            111_319.490_8,
            1e-3
        );
    }

    #[test]
    fn measure_line_symmetric_and_zero() {
        let d = DistanceArea::default();
        let a = Point::new(19.9383, 50.0614);
        let b = Point::new(21.0122, 52.2297);
        assert_eq!(d.measure_line(a, a), 0.0);
        assert_almost_eq!(d.measure_line(a, b), d.measure_line(b, a), 1e-6);
        // Kraków - Warsaw, ~252 km
        assert_almost_eq!(d.measure_line(a, b), 252_000.0, 2_000.0);
    }

    #[test]
    fn measure_line_near_antipodal() {
        let d = DistanceArea::default();
        let m = d.measure_line(Point::new(0.0, 0.0), Point::new(180.0, 0.5));
        assert!(m.is_finite());
        assert!(m > 19_900_000.0);
    }

    #[test]
    fn measure_length() {
        let d = DistanceArea::default();
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        assert_almost_eq!(d.measure_length(&pts), 2.0 * 111_319.490_8, 1e-3);
        assert_eq!(d.measure_length(&pts[..1]), 0.0);
    }

    #[test]
    fn haversine() {
        let centrum = Point::new(21.00724, 52.23024);
        let stadion = Point::new(21.04262, 52.23852);
        assert_almost_eq!(earth_distance(centrum, stadion), 2_579.28, 0.01);
    }
}
