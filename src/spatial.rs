// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::geometry::closest_point_on_segment;
use crate::{FeatureId, Layer, Point};

/// Line segment stored in a [SegmentIndex], together with a caller-provided key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedSegment<K> {
    pub start: Point,
    pub end: Point,
    pub key: K,

    /// Insertion order, used to break distance ties.
    seq: usize,
}

impl<K> IndexedSegment<K> {
    /// Returns the point of the segment closest to `pt`.
    pub fn closest_point(&self, pt: Point) -> Point {
        closest_point_on_segment(pt, self.start, self.end).0
    }
}

impl<K> RTreeObject for IndexedSegment<K> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.start.x, self.start.y], [self.end.x, self.end.y])
    }
}

impl<K> PointDistance for IndexedSegment<K> {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        closest_point_on_segment(Point::new(point[0], point[1]), self.start, self.end).1
    }
}

/// Planar nearest-segment lookup over an R-tree.
///
/// Single points are stored as zero-length segments. Segments with
/// non-finite coordinates are never returned.
#[derive(Debug, Clone)]
pub struct SegmentIndex<K> {
    tree: RTree<IndexedSegment<K>>,
}

impl<K> Default for SegmentIndex<K> {
    fn default() -> Self {
        Self {
            tree: RTree::new(),
        }
    }
}

impl<K> SegmentIndex<K> {
    /// Bulk-loads the index from `(start, end, key)` triples.
    pub fn new<I: IntoIterator<Item = (Point, Point, K)>>(segments: I) -> Self {
        let segments: Vec<IndexedSegment<K>> = segments
            .into_iter()
            .filter(|(a, b, _)| a.is_finite() && b.is_finite())
            .enumerate()
            .map(|(seq, (start, end, key))| IndexedSegment {
                start,
                end,
                key,
                seq,
            })
            .collect();

        Self {
            tree: RTree::bulk_load(segments),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Finds the segment closest to `pt`. Among equally close segments,
    /// the one inserted first is returned.
    pub fn nearest(&self, pt: Point) -> Option<&IndexedSegment<K>> {
        let query = [pt.x, pt.y];
        let mut candidates = self.tree.nearest_neighbor_iter(&query);
        let mut best = candidates.next()?;
        let best_distance = best.distance_2(&query);

        for candidate in candidates {
            if candidate.distance_2(&query) > best_distance {
                break;
            }
            if candidate.seq < best.seq {
                best = candidate;
            }
        }
        Some(best)
    }
}

impl SegmentIndex<FeatureId> {
    /// Indexes every segment (or point) of every feature of a layer,
    /// in the layer's coordinate system.
    pub fn from_layer(layer: &Layer) -> Self {
        Self::new(layer.features().flat_map(|f| {
            let pts = f.geometry.points();
            let segments: Vec<(Point, Point, FeatureId)> = if pts.len() == 1 {
                vec![(pts[0], pts[0], f.id)]
            } else {
                pts.windows(2).map(|pair| (pair[0], pair[1], f.id)).collect()
            };
            segments
        }))
    }

    /// Finds the feature closest to `pt`.
    pub fn nearest_feature(&self, pt: Point) -> Option<FeatureId> {
        self.nearest(pt).map(|s| s.key)
    }
}
