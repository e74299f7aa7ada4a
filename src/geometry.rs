// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Semi-major axis of the WGS84 ellipsoid, in meters. Also used as the sphere radius
/// of the [Web Mercator](https://epsg.io/3857) projection.
const WGS84_A: f64 = 6_378_137.0;

/// Maximum latitude representable in Web Mercator.
const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// A 2D coordinate. Which coordinate reference system it belongs to
/// is carried by the owner (usually a [Layer](crate::Layer)).
///
/// For [Crs::Wgs84], `x` is the longitude and `y` is the latitude, both in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Planar (euclidean) distance in the units of the coordinate system.
    pub fn planar_distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Coordinate reference systems understood by the built-in [Reprojector].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Crs {
    /// Geodetic WGS84, [EPSG:4326](https://epsg.io/4326). This is the working CRS
    /// of the road network graph.
    #[default]
    Wgs84,

    /// Spherical ("pseudo") Mercator, [EPSG:3857](https://epsg.io/3857).
    WebMercator,
}

impl Crs {
    pub fn epsg(&self) -> u32 {
        match self {
            Self::Wgs84 => 4326,
            Self::WebMercator => 3857,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported coordinate reference system: {0:?}")]
pub struct UnsupportedCrs(pub String);

impl FromStr for Crs {
    type Err = UnsupportedCrs;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        match code.strip_prefix("EPSG:").unwrap_or(&code) {
            "4326" => Ok(Self::Wgs84),
            "3857" | "900913" => Ok(Self::WebMercator),
            _ => Err(UnsupportedCrs(s.to_string())),
        }
    }
}

/// Pure, deterministic coordinate transformation between two [Crs].
pub trait Reproject {
    fn reproject(&self, pt: Point, from: Crs, to: Crs) -> Point;

    fn reproject_all(&self, pts: &[Point], from: Crs, to: Crs) -> Vec<Point> {
        pts.iter().map(|&pt| self.reproject(pt, from, to)).collect()
    }
}

/// Closed-form transformations between all supported [Crs] variants.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reprojector;

impl Reproject for Reprojector {
    fn reproject(&self, pt: Point, from: Crs, to: Crs) -> Point {
        match (from, to) {
            (Crs::Wgs84, Crs::Wgs84) | (Crs::WebMercator, Crs::WebMercator) => pt,
            (Crs::Wgs84, Crs::WebMercator) => {
                let lat = pt.y.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT).to_radians();
                Point {
                    x: WGS84_A * pt.x.to_radians(),
                    y: WGS84_A * (PI / 4.0 + lat / 2.0).tan().ln(),
                }
            }
            (Crs::WebMercator, Crs::Wgs84) => Point {
                x: (pt.x / WGS84_A).to_degrees(),
                y: (2.0 * (pt.y / WGS84_A).exp().atan() - PI / 2.0).to_degrees(),
            },
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn of_point(pt: Point) -> Self {
        Self { min: pt, max: pt }
    }

    pub fn of_points(pts: &[Point]) -> Option<Self> {
        let (first, rest) = pts.split_first()?;
        let mut bbox = Self::of_point(*first);
        rest.iter().for_each(|&pt| bbox.extend(pt));
        Some(bbox)
    }

    pub fn extend(&mut self, pt: Point) {
        self.min.x = self.min.x.min(pt.x);
        self.min.y = self.min.y.min(pt.y);
        self.max.x = self.max.x.max(pt.x);
        self.max.y = self.max.y.max(pt.y);
    }

    pub fn combine(&mut self, other: &BBox) {
        self.extend(other.min);
        self.extend(other.max);
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point {
            x: (self.min.x + self.max.x) * 0.5,
            y: (self.min.y + self.max.y) * 0.5,
        }
    }
}

/// Projects `pt` onto the segment `a`-`b` (planar geometry).
/// Returns the closest point on the segment and its squared distance to `pt`.
pub(crate) fn closest_point_on_segment(pt: Point, a: Point, b: Point) -> (Point, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;

    let closest = if len_sq == 0.0 {
        a
    } else {
        let t = (((pt.x - a.x) * dx + (pt.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
        Point {
            x: a.x + t * dx,
            y: a.y + t * dy,
        }
    };

    let ex = pt.x - closest.x;
    let ey = pt.y - closest.y;
    (closest, ex * ex + ey * ey)
}
