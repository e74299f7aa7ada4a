// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::spatial::SegmentIndex;
use crate::{Graph, Point, VertexId};

/// Service turning a set of polylines into a topological [Graph].
///
/// Implementations must return the graph and, for every extra point,
/// the position of the graph vertex the point was tied to. Each returned
/// position must be findable with [Graph::find_vertex].
pub trait TopologyBuilder {
    fn build(&self, lines: &[Vec<Point>], extra_points: &[Point], tolerance: f64)
        -> (Graph, Vec<Point>);
}

/// Default [TopologyBuilder].
///
/// - every line vertex becomes a graph vertex, with vertices closer than
///   `tolerance` (planar, in units of the coordinate system) merged into one;
///   a tolerance of zero requires exactly equal coordinates,
/// - every pair of consecutive line vertices becomes an edge,
/// - every extra point is projected onto its closest segment, and that segment
///   is split at the projected ("tie") point.
///
/// Lines are not split at crossings, only at shared (snapped) vertices.
/// Closest segments are looked up in a [SegmentIndex].
#[derive(Debug, Clone, Copy, Default)]
pub struct SnappingTopologyBuilder;

impl TopologyBuilder for SnappingTopologyBuilder {
    fn build(
        &self,
        lines: &[Vec<Point>],
        extra_points: &[Point],
        tolerance: f64,
    ) -> (Graph, Vec<Point>) {
        let tolerance = if tolerance.is_finite() && tolerance > 0.0 {
            tolerance
        } else {
            0.0
        };

        let ties = find_ties(lines, extra_points);
        let mut snapper = Snapper::new(tolerance);
        let mut tie_vertices: Vec<Option<VertexId>> = vec![None; extra_points.len()];

        for (line_idx, line) in lines.iter().enumerate() {
            for (seg_idx, pair) in line.windows(2).enumerate() {
                let mut prev = snapper.snap(pair[0]);

                if let Some(on_segment) = ties.on_segment.get(&(line_idx, seg_idx)) {
                    for &(_, extra_idx, pt) in on_segment {
                        let v = snapper.snap(pt);
                        tie_vertices[extra_idx] = Some(v);
                        if v != prev {
                            snapper.graph.add_edge(prev, v);
                            prev = v;
                        }
                    }
                }

                let next = snapper.snap(pair[1]);
                if next != prev {
                    snapper.graph.add_edge(prev, next);
                }
            }
        }

        let tied_positions = extra_points
            .iter()
            .zip(tie_vertices)
            .map(|(&pt, v)| match v {
                Some(v) => snapper.graph.vertex(v).unwrap_or(pt),
                None => pt,
            })
            .collect();

        (snapper.graph, tied_positions)
    }
}

/// Tie points of extra points, grouped by segment.
struct Ties {
    /// (line, segment) -> [(distance from segment start, extra point index, tie point)],
    /// sorted along the segment.
    on_segment: HashMap<(usize, usize), Vec<(f64, usize, Point)>>,
}

fn find_ties(lines: &[Vec<Point>], extra_points: &[Point]) -> Ties {
    let mut on_segment: HashMap<(usize, usize), Vec<(f64, usize, Point)>> = HashMap::default();
    if extra_points.is_empty() {
        return Ties { on_segment };
    }

    let index = SegmentIndex::new(lines.iter().enumerate().flat_map(|(line_idx, line)| {
        line.windows(2)
            .enumerate()
            .map(move |(seg_idx, pair)| (pair[0], pair[1], (line_idx, seg_idx)))
    }));

    for (extra_idx, &pt) in extra_points.iter().enumerate() {
        if !pt.is_finite() {
            continue;
        }
        if let Some(segment) = index.nearest(pt) {
            let tie = segment.closest_point(pt);
            on_segment
                .entry(segment.key)
                .or_default()
                .push((segment.start.planar_distance(tie), extra_idx, tie));
        }
    }

    on_segment
        .values_mut()
        .for_each(|v| v.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))));

    Ties { on_segment }
}

/// Adds vertices to a graph, merging positions closer than the tolerance.
struct Snapper {
    graph: Graph,
    tolerance: f64,
    cells: HashMap<(i64, i64), Vec<VertexId>>,
}

impl Snapper {
    fn new(tolerance: f64) -> Self {
        Self {
            graph: Graph::new(),
            tolerance,
            cells: HashMap::default(),
        }
    }

    fn cell(&self, pt: Point) -> (i64, i64) {
        (
            (pt.x / self.tolerance).floor() as i64,
            (pt.y / self.tolerance).floor() as i64,
        )
    }

    fn snap(&mut self, pt: Point) -> VertexId {
        if self.tolerance == 0.0 {
            return match self.graph.find_vertex(pt) {
                Some(v) => v,
                None => self.graph.add_vertex(pt),
            };
        }

        let (cx, cy) = self.cell(pt);
        let mut best: Option<(f64, VertexId)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(candidates) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &v in candidates {
                    let Some(pos) = self.graph.vertex(v) else {
                        continue;
                    };
                    let d = pos.planar_distance(pt);
                    if d <= self.tolerance && best.map_or(true, |(best_d, _)| d < best_d) {
                        best = Some((d, v));
                    }
                }
            }
        }

        if let Some((_, v)) = best {
            return v;
        }

        let v = self.graph.add_vertex(pt);
        self.cells.entry((cx, cy)).or_default().push(v);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(pts: &[(f64, f64)]) -> Vec<Point> {
        pts.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn shared_vertices_are_merged() {
        //  0────1────2
        //       │
        //       3
        let lines = vec![
            line(&[(0.0, 1.0), (1.0, 1.0), (2.0, 1.0)]),
            line(&[(1.0, 1.0), (1.0, 0.0)]),
        ];
        let (g, tied) = SnappingTopologyBuilder.build(&lines, &[], 0.0);
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.edge_count(), 3);
        assert!(tied.is_empty());
        let center = g.find_vertex(Point::new(1.0, 1.0)).unwrap();
        assert_eq!(g.incident_edges(center).len(), 3);
    }

    #[test]
    fn crossings_are_not_split() {
        let lines = vec![
            line(&[(0.0, 1.0), (2.0, 1.0)]),
            line(&[(1.0, 0.0), (1.0, 2.0)]),
        ];
        let (g, _) = SnappingTopologyBuilder.build(&lines, &[], 0.0);
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn tolerance_snapping() {
        let lines = vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(1.0005, 0.0003), (2.0, 0.0)]),
        ];

        let (exact, _) = SnappingTopologyBuilder.build(&lines, &[], 0.0);
        assert_eq!(exact.vertex_count(), 4);

        let (snapped, _) = SnappingTopologyBuilder.build(&lines, &[], 0.001);
        assert_eq!(snapped.vertex_count(), 3);
        assert_eq!(snapped.edge_count(), 2);
        let v = snapped.find_vertex(Point::new(1.0, 0.0)).unwrap();
        assert_eq!(snapped.incident_edges(v).len(), 2);
    }

    #[test]
    fn collapsed_segments_are_skipped() {
        let lines = vec![line(&[(0.0, 0.0), (0.0001, 0.0), (1.0, 0.0)])];
        let (g, _) = SnappingTopologyBuilder.build(&lines, &[], 0.001);
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn overlapping_lines_make_coincident_edges() {
        let lines = vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(0.0, 0.0), (1.0, 0.0)]),
        ];
        let (g, _) = SnappingTopologyBuilder.build(&lines, &[], 0.0);
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn extra_points_split_segments() {
        // 0─────a──b──────1
        //       ·  ·
        //       p  q
        let lines = vec![line(&[(0.0, 0.0), (10.0, 0.0)])];
        let extra = [Point::new(6.0, -1.0), Point::new(3.0, -2.0)];
        let (g, tied) = SnappingTopologyBuilder.build(&lines, &extra, 0.0);

        assert_eq!(tied, vec![Point::new(6.0, 0.0), Point::new(3.0, 0.0)]);
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.edge_count(), 3);

        let start = g.find_vertex(Point::new(0.0, 0.0)).unwrap();
        let a = g.find_vertex(Point::new(3.0, 0.0)).unwrap();
        let b = g.find_vertex(Point::new(6.0, 0.0)).unwrap();
        let end = g.find_vertex(Point::new(10.0, 0.0)).unwrap();
        assert!(g.are_connected(start, a));
        assert!(g.are_connected(a, b));
        assert!(g.are_connected(b, end));
        assert!(!g.are_connected(start, end));
    }

    #[test]
    fn extra_point_beyond_line_end_ties_to_endpoint() {
        let lines = vec![line(&[(0.0, 0.0), (10.0, 0.0)])];
        let (g, tied) = SnappingTopologyBuilder.build(&lines, &[Point::new(12.0, 1.0)], 0.0);
        assert_eq!(tied, vec![Point::new(10.0, 0.0)]);
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn equidistant_extra_point_ties_to_first_segment() {
        let lines = vec![
            line(&[(0.0, 1.0), (10.0, 1.0)]),
            line(&[(0.0, -1.0), (10.0, -1.0)]),
        ];
        let (g, tied) = SnappingTopologyBuilder.build(&lines, &[Point::new(5.0, 0.0)], 0.0);
        assert_eq!(tied, vec![Point::new(5.0, 1.0)]);
        assert_eq!(g.vertex_count(), 5);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn extra_points_without_lines() {
        let (g, tied) = SnappingTopologyBuilder.build(&[], &[Point::new(1.0, 1.0)], 0.0);
        assert_eq!(g.vertex_count(), 0);
        assert_eq!(tied, vec![Point::new(1.0, 1.0)]);
    }
}
