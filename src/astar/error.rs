// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Point, VertexId};

/// Error conditions which may occur during [shortest_path](crate::shortest_path)
/// or [shortest_path_between](crate::shortest_path_between).
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// The start or the goal point is not exactly at any graph vertex.
    #[error("point ({}, {}) is not on the graph", .0.x, .0.y)]
    PointNotOnGraph(Point),

    /// The start or the goal vertex doesn't exist in the graph.
    #[error("invalid vertex: {0}")]
    InvalidVertex(VertexId),
}
