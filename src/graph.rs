// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io::{self, Write};

use crate::Point;

/// Dense identifier of a vertex in a [Graph].
pub type VertexId = usize;

/// Dense identifier of an edge in a [Graph].
pub type EdgeId = usize;

/// Represents a connection between two vertices of a [Graph].
///
/// Edges are traversable in both directions; `from` and `to`
/// only record the order in which the endpoints were given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: VertexId,
    pub to: VertexId,
}

impl Edge {
    /// Returns the endpoint of this edge opposite to `v`.
    pub fn other(&self, v: VertexId) -> VertexId {
        if self.from == v {
            self.to
        } else {
            self.from
        }
    }
}

/// Arena of vertices (positions in the working CRS) and undirected [Edges](Edge),
/// with adjacency lists maintained on insertion.
///
/// Ids are assigned densely on insertion and never reused, as there is no way
/// to remove vertices or edges.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph {
    vertices: Vec<Point>,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<EdgeId>>,
    lookup: HashMap<(u64, u64), VertexId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of vertices in the graph.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Adds a new vertex, even if another vertex already exists at the same position.
    pub fn add_vertex(&mut self, pt: Point) -> VertexId {
        let id = self.vertices.len();
        self.vertices.push(pt);
        self.adjacency.push(Vec::default());
        self.lookup.entry(position_key(pt)).or_insert(id);
        id
    }

    /// Adds an edge between two existing vertices.
    ///
    /// Panics if any of the endpoints does not exist.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId) -> EdgeId {
        assert!(from < self.vertices.len(), "invalid vertex: {}", from);
        assert!(to < self.vertices.len(), "invalid vertex: {}", to);

        let id = self.edges.len();
        self.edges.push(Edge { from, to });
        self.adjacency[from].push(id);
        if to != from {
            self.adjacency[to].push(id);
        }
        id
    }

    pub fn vertex(&self, id: VertexId) -> Option<Point> {
        self.vertices.get(id).copied()
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn edge(&self, id: EdgeId) -> Option<Edge> {
        self.edges.get(id).copied()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns ids of all edges incident to the given vertex,
    /// regardless of their stored direction.
    pub fn incident_edges(&self, v: VertexId) -> &[EdgeId] {
        self.adjacency
            .get(v)
            .map(|e| e.as_slice())
            .unwrap_or_default()
    }

    /// Iterates over `(edge, neighbor)` pairs of a vertex.
    pub fn neighbors(&self, v: VertexId) -> impl Iterator<Item = (EdgeId, VertexId)> + '_ {
        self.incident_edges(v)
            .iter()
            .map(move |&e| (e, self.edges[e].other(v)))
    }

    /// Returns true if any edge connects the two vertices.
    pub fn are_connected(&self, a: VertexId, b: VertexId) -> bool {
        self.neighbors(a).any(|(_, n)| n == b)
    }

    /// Finds the first inserted vertex at exactly the given position.
    pub fn find_vertex(&self, pt: Point) -> Option<VertexId> {
        self.lookup.get(&position_key(pt)).copied()
    }

    /// Returns every edge as a two-point line.
    pub fn edge_lines(&self) -> impl Iterator<Item = [Point; 2]> + '_ {
        self.edges
            .iter()
            .map(|e| [self.vertices[e.from], self.vertices[e.to]])
    }

    /// Writes the graph as a GeoJSON FeatureCollection: one point feature
    /// with a `vertex_id` property per vertex, then one line feature
    /// with an `edge_id` property per edge.
    pub fn write_geojson<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "{{\"type\": \"FeatureCollection\", \"features\": [")?;

        let vertices = self.vertices.iter().enumerate().map(|(vertex_id, pt)| {
            format!(
                "{{\"type\": \"Feature\", \"properties\": {{\"vertex_id\": {}}}, \
                 \"geometry\": {{\"type\": \"Point\", \"coordinates\": [{}, {}]}}}}",
                vertex_id, pt.x, pt.y
            )
        });
        let edges = self.edge_lines().enumerate().map(|(edge_id, [a, b])| {
            format!(
                "{{\"type\": \"Feature\", \"properties\": {{\"edge_id\": {}}}, \
                 \"geometry\": {{\"type\": \"LineString\", \"coordinates\": [[{}, {}], [{}, {}]]}}}}",
                edge_id, a.x, a.y, b.x, b.y
            )
        });

        let mut features = vertices.chain(edges).peekable();
        while let Some(feature) = features.next() {
            let suffix = if features.peek().is_some() { "," } else { "" };
            writeln!(w, "{}{}", feature, suffix)?;
        }

        writeln!(w, "]}}")?;
        w.flush()
    }
}

/// Key for exact position lookup. `-0.0` and `0.0` are considered equal.
fn position_key(pt: Point) -> (u64, u64) {
    ((pt.x + 0.0).to_bits(), (pt.y + 0.0).to_bits())
}
