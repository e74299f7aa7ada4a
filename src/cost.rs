// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{DistanceArea, EdgeId, ElevationSampler, Graph, NoElevation, VertexId};

/// Travel cost over a [Graph]: the hypotenuse of the geodesic distance
/// and the absolute elevation difference, both in meters.
///
/// Elevations are sampled once per vertex, when the model is created.
/// A vertex without an elevation sample contributes no elevation penalty
/// to any of its edges.
#[derive(Debug, Clone)]
pub struct CostModel {
    distance: DistanceArea,
    elevations: Vec<Option<f64>>,
}

impl CostModel {
    pub fn new<E: ElevationSampler + ?Sized>(
        g: &Graph,
        distance: DistanceArea,
        elevation: &E,
    ) -> Self {
        let elevations: Vec<Option<f64>> = g
            .vertices()
            .iter()
            .map(|&pt| elevation.elevation_at(pt).filter(|h| h.is_finite()))
            .collect();

        let missing = elevations.iter().filter(|h| h.is_none()).count();
        if missing > 0 && missing < elevations.len() {
            log::warn!(
                "{} of {} vertices have no elevation sample",
                missing,
                elevations.len()
            );
        }

        Self {
            distance,
            elevations,
        }
    }

    /// Creates a cost model ignoring the terrain.
    pub fn flat(g: &Graph, distance: DistanceArea) -> Self {
        Self::new(g, distance, &NoElevation)
    }

    pub fn distance_area(&self) -> &DistanceArea {
        &self.distance
    }

    pub fn elevation(&self, v: VertexId) -> Option<f64> {
        self.elevations.get(v).copied().flatten()
    }

    /// Returns the 3D distance between two vertices of `g`.
    /// Also used as the search heuristic.
    pub fn vertex_distance(&self, g: &Graph, a: VertexId, b: VertexId) -> f64 {
        // Measure in a fixed order, so that the cost is exactly symmetric
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        let (Some(pa), Some(pb)) = (g.vertex(a), g.vertex(b)) else {
            return f64::INFINITY;
        };

        let planar = self.distance.measure_line(pa, pb);
        let delta = match (self.elevation(a), self.elevation(b)) {
            (Some(ha), Some(hb)) => (ha - hb).abs(),
            _ => 0.0,
        };
        planar.hypot(delta)
    }

    /// Returns the cost of traversing an edge, in either direction.
    pub fn edge_cost(&self, g: &Graph, e: EdgeId) -> f64 {
        match g.edge(e) {
            Some(edge) => self.vertex_distance(g, edge.from, edge.to),
            None => f64::INFINITY,
        }
    }
}
