// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{CostModel, Graph, Point, VertexId};

/// A found path, ready to be written out.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathRecord {
    pub vertices: Vec<VertexId>,

    /// Polyline of the path, in the working CRS.
    pub geometry: Vec<Point>,

    /// Geodesic length of the polyline, in meters.
    pub length_2d: f64,

    /// Length including elevation differences, in meters.
    /// This is the quantity minimized by the search.
    pub length_3d: f64,
}

impl PathRecord {
    /// Returns the [formatted](format_km) 3D length.
    pub fn label(&self) -> String {
        format_km(self.length_3d)
    }
}

/// Turns a sequence of vertices returned by the search into a [PathRecord].
pub fn assemble(g: &Graph, cost: &CostModel, vertices: Vec<VertexId>) -> PathRecord {
    let geometry: Vec<Point> = vertices.iter().filter_map(|&v| g.vertex(v)).collect();
    let length_2d = cost.distance_area().measure_length(&geometry);
    let length_3d = vertices
        .windows(2)
        .map(|pair| cost.vertex_distance(g, pair[0], pair[1]))
        .sum();

    PathRecord {
        vertices,
        geometry,
        length_2d,
        length_3d,
    }
}

/// Formats a distance in meters as kilometers, as printed on signs.
///
/// Distances of 10 km and more are truncated to whole kilometers,
/// shorter distances are rounded to one decimal place with a trailing `.0` removed.
pub fn format_km(meters: f64) -> String {
    let km = meters / 1000.0;
    if km >= 10.0 {
        format!("{}", km.trunc() as i64)
    } else {
        let s = format!("{:.1}", km);
        match s.strip_suffix(".0") {
            Some(whole) => whole.to_string(),
            None => s,
        }
    }
}
