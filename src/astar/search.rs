// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};

use crate::{CostModel, Graph, Point, SearchError, VertexId};

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: VertexId,
    cost: f64,
    score: f64,
    seq: usize,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for QueueItem {}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores (and earlier insertions) are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn reconstruct_path(
    came_from: &HashMap<VertexId, VertexId>,
    start: VertexId,
    mut last: VertexId,
) -> Option<Vec<VertexId>> {
    let mut path = vec![last];

    while last != start {
        let &before = came_from.get(&last)?;
        path.push(before);
        last = before;

        // Every vertex may appear at most once; a longer chain must be cyclic
        if path.len() > came_from.len() + 1 {
            return None;
        }
    }

    path.reverse();
    Some(path)
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the cheapest path between two points, which must lie exactly
/// at graph vertices.
///
/// Returns [SearchError::PointNotOnGraph] if any of the points isn't a graph vertex.
/// See [shortest_path_between] for the description of the result.
pub fn shortest_path(
    g: &Graph,
    cost: &CostModel,
    start: Point,
    goal: Point,
) -> Result<Option<Vec<VertexId>>, SearchError> {
    let start_id = g
        .find_vertex(start)
        .ok_or(SearchError::PointNotOnGraph(start))?;
    let goal_id = g
        .find_vertex(goal)
        .ok_or(SearchError::PointNotOnGraph(goal))?;
    shortest_path_between(g, cost, start_id, goal_id)
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the cheapest path between two vertices of the provided graph.
/// Edges are traversed in both directions, with costs given by [CostModel::edge_cost].
///
/// Returns the sequence of vertices from `start` to `goal` (inclusive),
/// or `None` if the vertices are disconnected. Concluding that no path exists
/// requires visiting every vertex reachable from `start`; there is no step limit.
///
/// [CostModel::vertex_distance] is used as the heuristic. With a non-zero elevation
/// component it might overestimate the remaining cost, in which case the returned
/// path is not guaranteed to be optimal.
pub fn shortest_path_between(
    g: &Graph,
    cost: &CostModel,
    start: VertexId,
    goal: VertexId,
) -> Result<Option<Vec<VertexId>>, SearchError> {
    if start >= g.vertex_count() {
        return Err(SearchError::InvalidVertex(start));
    }
    if goal >= g.vertex_count() {
        return Err(SearchError::InvalidVertex(goal));
    }

    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<VertexId, VertexId> = HashMap::default();
    let mut known_costs: HashMap<VertexId, f64> = HashMap::default();
    let mut seq: usize = 0;

    queue.push(QueueItem {
        at: start,
        cost: 0.0,
        score: cost.vertex_distance(g, start, goal),
        seq,
    });
    known_costs.insert(start, 0.0);

    while let Some(item) = queue.pop() {
        if item.at == goal {
            let path = reconstruct_path(&came_from, start, goal);
            if path.is_none() {
                log::error!("broken predecessor chain from {} to {}", goal, start);
            }
            return Ok(path);
        }

        // Contrary to the wikipedia definition, we might keep multiple items in the queue for the same vertex.
        if item.cost > known_costs.get(&item.at).copied().unwrap_or(f64::INFINITY) {
            continue;
        }

        for (edge, neighbor) in g.neighbors(item.at) {
            // Check if this is the cheapest way to the neighbor
            let neighbor_cost = item.cost + cost.edge_cost(g, edge);
            if neighbor_cost >= known_costs.get(&neighbor).copied().unwrap_or(f64::INFINITY) {
                continue;
            }

            // Push the new item into the queue
            seq += 1;
            came_from.insert(neighbor, item.at);
            known_costs.insert(neighbor, neighbor_cost);
            queue.push(QueueItem {
                at: neighbor,
                cost: neighbor_cost,
                score: neighbor_cost + cost.vertex_distance(g, neighbor, goal),
                seq,
            });
        }
    }

    Ok(None)
}
