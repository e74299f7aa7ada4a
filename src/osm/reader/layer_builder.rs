// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use super::model;
use crate::{Crs, Feature, Geometry, Layer, Point};

/// LayerBuilder turns a stream of [OSM features](model::Feature) into a [Layer].
///
/// Tagged nodes become point features, ways become line features.
/// The layer schema is the union of all tag keys, in first-seen order.
pub(super) struct LayerBuilder {
    name: String,
    nodes: HashMap<i64, Point>,
    fields: Vec<String>,
    features: Vec<Feature>,
    unknown_refs: usize,
}

impl LayerBuilder {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: HashMap::default(),
            fields: Vec::default(),
            features: Vec::default(),
            unknown_refs: 0,
        }
    }

    pub(super) fn add_features<E, I>(mut self, features: I) -> Result<Layer, E>
    where
        I: IntoIterator<Item = Result<model::Feature, E>>,
    {
        for f in features {
            match f? {
                model::Feature::Node(n) => self.add_node(n),
                model::Feature::Way(w) => self.add_way(w),
            }
        }
        Ok(self.finish())
    }

    fn add_node(&mut self, n: model::Node) {
        let pt = Point::new(n.lon, n.lat);
        self.nodes.insert(n.id, pt);
        if !n.tags.is_empty() {
            self.add_feature(Geometry::Point(pt), n.tags);
        }
    }

    fn add_way(&mut self, w: model::Way) {
        let pts: Vec<Point> = w
            .nodes
            .iter()
            .filter_map(|id| {
                let pt = self.nodes.get(id).copied();
                if pt.is_none() {
                    self.unknown_refs += 1;
                }
                pt
            })
            .collect();

        if pts.len() < 2 {
            log::debug!("{}: skipping way {} with less than 2 nodes", self.name, w.id);
            return;
        }

        self.add_feature(Geometry::LineString(pts), w.tags);
    }

    fn add_feature(&mut self, geometry: Geometry, tags: model::Tags) {
        let mut feature = Feature::new(geometry);
        for (k, v) in tags {
            if !self.fields.contains(&k) {
                self.fields.push(k.clone());
            }
            feature.set_attribute(&k, v);
        }
        self.features.push(feature);
    }

    fn finish(self) -> Layer {
        if self.unknown_refs > 0 {
            log::warn!(
                "{}: ways reference {} unknown node(s)",
                self.name,
                self.unknown_refs
            );
        }

        let mut layer = Layer::new(self.name, Crs::Wgs84, self.fields);
        for f in self.features {
            layer.add_feature(f);
        }
        log::info!("loaded {} feature(s) into layer {}", layer.len(), layer.name());
        layer
    }
}
