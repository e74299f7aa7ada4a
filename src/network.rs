// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{
    Crs, Geometry, Graph, Layer, Point, Reproject, Reprojector, SnappingTopologyBuilder,
    TopologyBuilder, VertexId,
};

/// Coordinate reference system of the routing graph.
pub const WORKING_CRS: Crs = Crs::Wgs84;

/// Controls for building a [RoadNetwork].
pub struct Options<'a> {
    /// Maximum distance (in working CRS units) at which two line vertices
    /// are considered the same graph vertex.
    pub tolerance: f64,

    /// Service building the initial topology graph out of road lines.
    pub topology: &'a dyn TopologyBuilder,

    /// Transformation of input layers into the [WORKING_CRS].
    pub reprojector: &'a dyn Reproject,
}

impl Default for Options<'static> {
    fn default() -> Self {
        Self {
            tolerance: 0.0,
            topology: &SnappingTopologyBuilder,
            reprojector: &Reprojector,
        }
    }
}

impl std::fmt::Debug for Options<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}

/// Routable road network: a [Graph] built out of road lines, with additional points
/// (signs and points of interest) attached by tie-in edges.
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    graph: Graph,
    extra_points: Vec<Point>,
    extra_vertices: Vec<VertexId>,
    tie_vertices: Vec<Option<VertexId>>,
}

impl RoadNetwork {
    /// Builds the network out of lines and points already in the [WORKING_CRS].
    ///
    /// Lines are not deduplicated; overlapping lines produce coincident edges.
    /// Every extra point gets a brand-new vertex (even if one already exists at
    /// the same position) and exactly one tie-in edge to the vertex the topology
    /// service tied it to.
    pub fn build(lines: &[Vec<Point>], extra_points: Vec<Point>, options: &Options) -> Self {
        log::info!(
            "building graph out of {} line(s) and {} additional point(s)",
            lines.len(),
            extra_points.len()
        );

        let (mut graph, tied_positions) =
            options
                .topology
                .build(lines, &extra_points, options.tolerance);
        log::debug!(
            "initial graph: {} vertices, {} edges",
            graph.vertex_count(),
            graph.edge_count()
        );

        let mut extra_vertices = Vec::with_capacity(extra_points.len());
        let mut tie_vertices = Vec::with_capacity(extra_points.len());

        for (&pt, &tied) in extra_points.iter().zip(tied_positions.iter()) {
            let added = graph.add_vertex(pt);
            let tie = graph.find_vertex(tied);
            match tie {
                Some(tie) => {
                    graph.add_edge(added, tie);
                }
                None => log::warn!(
                    "point ({}, {}) was tied to ({}, {}), which is not a graph vertex",
                    pt.x,
                    pt.y,
                    tied.x,
                    tied.y
                ),
            }
            extra_vertices.push(added);
            tie_vertices.push(tie);
        }

        log::info!(
            "graph built: {} vertices, {} edges",
            graph.vertex_count(),
            graph.edge_count()
        );

        Self {
            graph,
            extra_points,
            extra_vertices,
            tie_vertices,
        }
    }

    /// Merges all road layers and all point layers, reprojects them into the
    /// [WORKING_CRS] and [builds](RoadNetwork::build) the network.
    ///
    /// Point features are taken from every feature of `point_layers`, in order.
    pub fn from_layers(road_layers: &[&Layer], point_layers: &[&Layer], options: &Options) -> Self {
        let lines = merge_lines(road_layers, options.reprojector);
        let points = collect_points(point_layers, options.reprojector);
        Self::build(&lines, points, options)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns the additional points (in the working CRS), in insertion order.
    pub fn extra_points(&self) -> &[Point] {
        &self.extra_points
    }

    /// Returns the vertex created for the n-th additional point.
    pub fn extra_vertex(&self, n: usize) -> Option<VertexId> {
        self.extra_vertices.get(n).copied()
    }

    /// Returns the vertex the n-th additional point was tied to.
    pub fn tie_vertex(&self, n: usize) -> Option<VertexId> {
        self.tie_vertices.get(n).copied().flatten()
    }
}

/// Collects all lines from all layers, reprojected into the [WORKING_CRS].
/// Point features and lines with fewer than 2 vertices are skipped.
pub fn merge_lines(layers: &[&Layer], reprojector: &dyn Reproject) -> Vec<Vec<Point>> {
    let mut lines = Vec::default();
    for layer in layers {
        if layer.is_empty() {
            log::warn!("road layer {} is empty", layer.name());
        }

        for feature in layer.features() {
            match &feature.geometry {
                Geometry::LineString(pts) if pts.len() >= 2 => {
                    lines.push(reprojector.reproject_all(pts, layer.crs(), WORKING_CRS))
                }
                _ => log::debug!(
                    "skipping feature {} of {}: not a line",
                    feature.id,
                    layer.name()
                ),
            }
        }
    }
    lines
}

/// Collects the position of every feature from all layers, reprojected into the [WORKING_CRS].
pub fn collect_points(layers: &[&Layer], reprojector: &dyn Reproject) -> Vec<Point> {
    layers
        .iter()
        .flat_map(|layer| {
            layer.features().filter_map(move |f| {
                f.geometry
                    .as_point()
                    .map(|pt| reprojector.reproject(pt, layer.crs(), WORKING_CRS))
            })
        })
        .collect()
}
