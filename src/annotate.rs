// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::VecDeque;

use crate::fields::Slot;
use crate::network::WORKING_CRS;
use crate::spatial::SegmentIndex;
use crate::{
    assemble, shortest_path, CostModel, Crs, EditSession, Error, Feature, FeatureId, Feedback,
    FieldNames, Layer, PathRecord, Point, Reproject, Reprojector, RoadNetwork, Value,
};

/// Controls for [Annotator].
pub struct Options<'a> {
    pub fields: FieldNames,

    /// Maximum geodesic distance, in meters, between any two members of a service group.
    pub service_radius: f64,

    /// Sentinel written into sign fields which can't be filled.
    pub not_available: String,

    /// Transformation of layer geometries into the working CRS.
    pub reprojector: &'a dyn Reproject,
}

impl Default for Options<'static> {
    fn default() -> Self {
        Self {
            fields: FieldNames::default(),
            service_radius: 100.0,
            not_available: "N/A".to_string(),
            reprojector: &Reprojector,
        }
    }
}

impl std::fmt::Debug for Options<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("fields", &self.fields)
            .field("service_radius", &self.service_radius)
            .field("not_available", &self.not_available)
            .finish_non_exhaustive()
    }
}

/// Fills destination distances on signs.
///
/// The sign and point-of-interest layers must have been used as the additional
/// points of the [RoadNetwork], so that every sign and point of interest
/// is a vertex of the graph.
pub struct Annotator<'a> {
    pois: Vec<&'a Layer>,
    route_roads: &'a Layer,
    road_index: SegmentIndex<FeatureId>,
    network: &'a RoadNetwork,
    cost: &'a CostModel,
    options: Options<'a>,
}

impl<'a> Annotator<'a> {
    /// Creates an annotator, ensuring that the route layer has the route code field.
    ///
    /// Point-of-interest layers without the required fields are logged and left out.
    /// `route_roads` is the layer whose nearest feature provides the route code of a sign.
    pub fn new(
        pois: &'a [&'a Layer],
        route_roads: &'a Layer,
        network: &'a RoadNetwork,
        cost: &'a CostModel,
        options: Options<'a>,
    ) -> Result<Self, Error> {
        options.fields.validate_roads(route_roads)?;
        let pois = pois
            .iter()
            .copied()
            .filter(|layer| match options.fields.validate_pois(layer) {
                Ok(()) => true,
                Err(e) => {
                    log::error!("skipping points of interest: {}", e);
                    false
                }
            })
            .collect();

        Ok(Self {
            pois,
            route_roads,
            road_index: SegmentIndex::from_layer(route_roads),
            network,
            cost,
            options,
        })
    }

    /// Starts annotating the sign layer. Signs are processed lazily,
    /// as the returned [Annotation] is advanced.
    ///
    /// The sign layer is held in a single edit session until the [Annotation]
    /// is exhausted, canceled or dropped, at which point all changes are committed.
    pub fn run(self, signs: &'a mut Layer, feedback: &'a dyn Feedback) -> Result<Annotation<'a>, Error> {
        self.options.fields.validate_signs(signs)?;
        let slots = self.options.fields.slots(signs);
        let total = signs.len();
        log::info!(
            "annotating {} sign(s) of {} with {} slot(s) each",
            total,
            signs.name(),
            slots.len()
        );

        feedback.set_progress(0.0);
        Ok(Annotation {
            annotator: self,
            session: Some(signs.edit()),
            feedback,
            slots,
            next_sign: 0,
            total,
            queue: VecDeque::default(),
        })
    }

    /// Returns the position of a feature in the working CRS.
    fn position(&self, feature: &Feature, crs: Crs) -> Option<Point> {
        feature
            .geometry
            .as_point()
            .map(|pt| self.options.reprojector.reproject(pt, crs, WORKING_CRS))
    }

    /// Copies the route code of the closest route road onto the sign.
    fn copy_route_code(&self, sign: &mut Feature, crs: Crs) {
        let nearest = sign
            .geometry
            .as_point()
            .map(|pt| {
                self.options
                    .reprojector
                    .reproject(pt, crs, self.route_roads.crs())
            })
            .and_then(|pt| self.road_index.nearest_feature(pt))
            .and_then(|id| self.route_roads.feature(id));

        match nearest {
            Some(road) => {
                let code = self.options.fields.route_code(road).clone();
                sign.set_attribute(&self.options.fields.sign_route_code, code);
            }
            None => log::warn!("no route road close to sign {}", sign.id),
        }
    }

    /// Finds the first point of interest (in layer order, then feature order)
    /// with any name field equal to `name`.
    fn find_poi(&self, name: &str) -> Option<(&'a Layer, &'a Feature)> {
        let fields = &self.options.fields;
        self.pois.iter().find_map(|&layer| {
            layer
                .features()
                .find(|f| fields.names(layer, f).any(|n| n == name))
                .map(|f| (layer, f))
        })
    }

    /// Finds the shortest path between two points of the graph.
    fn route(&self, from: Point, to: Point) -> Option<PathRecord> {
        let g = self.network.graph();
        match shortest_path(g, self.cost, from, to) {
            Ok(Some(vertices)) => Some(assemble(g, self.cost, vertices)),
            Ok(None) => {
                log::info!("no path from ({}, {}) to ({}, {})", from.x, from.y, to.x, to.y);
                None
            }
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        }
    }

    fn not_available(&self) -> Value {
        Value::from(self.options.not_available.as_str())
    }

    /// Fills the derived fields of a single slot, returning the found path (if any).
    fn annotate_slot(&self, sign: &mut Feature, from: Option<Point>, slot: &Slot) -> Option<PathRecord> {
        let fields = &self.options.fields;
        let english_field = fields.sign_english_name(slot);
        let pictogram_field = fields.sign_pictogram(slot);
        let distance_field = fields.sign_distance(slot);

        let name = sign.attribute(&slot.name_field);
        if name.is_empty() {
            let pictogram = sign.attribute(&pictogram_field);
            if pictogram.is_empty() {
                log::debug!("sign {}: no value for {}", sign.id, slot.name_field);
                return None;
            }

            let services = pictogram.to_string();
            let path = from.and_then(|from| self.route_service_group(from, &services));
            let label = path.as_ref().map_or_else(|| self.not_available(), |p| p.label().into());
            sign.set_attribute(&distance_field, label);
            return path;
        }

        let name = name.to_string();
        let Some((poi_layer, poi)) = self.find_poi(&name) else {
            log::info!("sign {}: destination {:?} not found", sign.id, name);
            sign.set_attribute(&english_field, self.not_available());
            sign.set_attribute(&pictogram_field, self.not_available());
            sign.set_attribute(&distance_field, self.not_available());
            return None;
        };

        sign.set_attribute(&english_field, poi.attribute(&fields.poi_english_name).clone());
        sign.set_attribute(&pictogram_field, poi.attribute(&fields.poi_pictogram).clone());

        let to = self.position(poi, poi_layer.crs());
        let path = match (from, to) {
            (Some(from), Some(to)) => self.route(from, to),
            _ => None,
        };

        match &path {
            Some(p) => {
                log::debug!("sign {}: {:?} is {:.0} m away", sign.id, name, p.length_3d);
                sign.set_attribute(&distance_field, p.label());
            }
            None => sign.set_attribute(&distance_field, self.not_available()),
        }
        path
    }

    /// Routes to the closest member of a service group, given as
    /// whitespace-separated names. Returns `None` if the group is rejected:
    /// when any member can't be found or reached, or when two members
    /// are further apart than the service radius.
    fn route_service_group(&self, from: Point, services: &str) -> Option<PathRecord> {
        let mut locations: Vec<Point> = Vec::default();
        for name in services.split_whitespace() {
            let Some((layer, poi)) = self.find_poi(name) else {
                log::info!("service {:?} not found, rejecting {:?}", name, services);
                return None;
            };
            locations.push(self.position(poi, layer.crs())?);
        }

        let distance = self.cost.distance_area();
        for (i, &a) in locations.iter().enumerate() {
            for &b in &locations[i + 1..] {
                if distance.measure_line(a, b) > self.options.service_radius {
                    log::info!(
                        "services {:?} are further than {} m apart, rejecting",
                        services,
                        self.options.service_radius
                    );
                    return None;
                }
            }
        }

        let mut best: Option<PathRecord> = None;
        for to in locations {
            let path = self.route(from, to)?;
            if best.as_ref().map_or(true, |b| path.length_3d < b.length_3d) {
                best = Some(path);
            }
        }
        best
    }
}

/// Lazy sequence of paths found while annotating signs, created by [Annotator::run].
///
/// Every call to [Iterator::next] processes as many signs as required to produce
/// the next path. Cancellation is checked before every sign.
pub struct Annotation<'a> {
    annotator: Annotator<'a>,
    session: Option<EditSession<'a>>,
    feedback: &'a dyn Feedback,
    slots: Vec<Slot>,
    next_sign: FeatureId,
    total: usize,
    queue: VecDeque<PathRecord>,
}

impl Annotation<'_> {
    /// Returns the number of already processed signs.
    pub fn processed(&self) -> usize {
        self.next_sign
    }

    fn process_sign(&mut self, id: FeatureId) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(mut sign) = session.feature(id).cloned() else {
            return;
        };
        let crs = session.layer().crs();

        log::debug!("processing sign {}", id);
        let a = &self.annotator;
        a.copy_route_code(&mut sign, crs);

        let from = a.position(&sign, crs);
        for slot in &self.slots {
            if let Some(path) = a.annotate_slot(&mut sign, from, slot) {
                self.queue.push_back(path);
            }
        }

        session.update_feature(sign);
    }

    fn finish(&mut self) {
        if let Some(session) = self.session.take() {
            session.commit();
            log::info!("annotated {} of {} sign(s)", self.next_sign, self.total);
        }
    }
}

impl Iterator for Annotation<'_> {
    type Item = PathRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(path) = self.queue.pop_front() {
                return Some(path);
            }

            if self.session.is_none() {
                return None;
            }

            if self.next_sign >= self.total {
                self.finish();
                return None;
            }

            if self.feedback.is_canceled() {
                log::warn!("annotation canceled");
                self.finish();
                return None;
            }

            self.process_sign(self.next_sign);
            self.next_sign += 1;
            self.feedback
                .set_progress(100.0 * self.next_sign as f64 / self.total as f64);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::atomic::AtomicBool;

    use super::*;
    use crate::{DistanceArea, Geometry, NoFeedback};

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn road(code: &str, from: (f64, f64), to: (f64, f64)) -> Feature {
        Feature::new(Geometry::LineString(vec![
            Point::new(from.0, from.1),
            Point::new(to.0, to.1),
        ]))
        .with_attribute("CODE", code)
    }

    fn sign(x: f64, y: f64, dest: &str) -> Feature {
        Feature::new(Geometry::Point(Point::new(x, y))).with_attribute("NameRU1L", dest)
    }

    fn poi(x: f64, y: f64, name: &str, en: &str, pic: &str) -> Feature {
        Feature::new(Geometry::Point(Point::new(x, y)))
            .with_attribute("NameRU", name)
            .with_attribute("NameEN", en)
            .with_attribute("pic", pic)
    }

    struct Fixture {
        roads: Layer,
        signs: Layer,
        pois: Layer,
    }

    impl Fixture {
        fn new() -> Self {
            let mut roads = Layer::new("roads", Crs::Wgs84, fields(&["CODE"]));
            roads.add_feature(road("VR1", (0.0, 0.0), (0.03, 0.0)));
            roads.add_feature(road("VR2", (0.0, 0.01), (0.03, 0.01)));

            let mut signs = Layer::new(
                "123_DIR",
                Crs::Wgs84,
                fields(&["routcode", "NameRU1L", "NameEN1L", "PIC_1L", "km_1L"]),
            );
            signs.add_feature(sign(0.0, 0.0001, "Музей"));
            signs.add_feature(sign(0.0, 0.0099, "Нигде"));
            signs.add_feature(sign(0.0, 0.0002, ""));

            let mut pois = Layer::new("poi", Crs::Wgs84, fields(&["NameRU", "NameEN", "pic"]));
            pois.add_feature(poi(0.02, -0.0001, "Музей", "Museum", "museum"));

            Self { roads, signs, pois }
        }
    }

    #[test]
    fn named_destinations() {
        let Fixture {
            roads,
            mut signs,
            pois,
        } = Fixture::new();
        let network =
            RoadNetwork::from_layers(&[&roads], &[&signs, &pois], &crate::network::Options::default());
        let cost = CostModel::flat(network.graph(), DistanceArea::default());
        let poi_layers = [&pois];

        let annotator =
            Annotator::new(&poi_layers, &roads, &network, &cost, Options::default()).unwrap();
        let paths: Vec<PathRecord> = annotator.run(&mut signs, &NoFeedback).unwrap().collect();

        assert_eq!(paths.len(), 1);
        assert!(paths[0].length_3d > 2200.0 && paths[0].length_3d < 2300.0);
        assert_eq!(paths[0].geometry.first(), Some(&Point::new(0.0, 0.0001)));
        assert_eq!(paths[0].geometry.last(), Some(&Point::new(0.02, -0.0001)));

        let found = signs.feature(0).unwrap();
        assert_eq!(found.attribute("routcode"), &Value::from("VR1"));
        assert_eq!(found.attribute("NameEN1L"), &Value::from("Museum"));
        assert_eq!(found.attribute("PIC_1L"), &Value::from("museum"));
        assert_eq!(found.attribute("km_1L"), &Value::from("2.2"));

        let not_found = signs.feature(1).unwrap();
        assert_eq!(not_found.attribute("routcode"), &Value::from("VR2"));
        assert_eq!(not_found.attribute("NameEN1L"), &Value::from("N/A"));
        assert_eq!(not_found.attribute("PIC_1L"), &Value::from("N/A"));
        assert_eq!(not_found.attribute("km_1L"), &Value::from("N/A"));

        let empty = signs.feature(2).unwrap();
        assert_eq!(empty.attribute("km_1L"), &Value::Null);
    }

    #[test]
    fn unreachable_destination() {
        let Fixture {
            roads,
            mut signs,
            pois,
        } = Fixture::new();

        // Only the sign road; the museum is tied to a disconnected road
        let mut sign_road = Layer::new("roads", Crs::Wgs84, fields(&["CODE"]));
        sign_road.add_feature(road("VR1", (0.0, 0.0), (0.01, 0.0)));
        sign_road.add_feature(road("VR3", (0.015, 0.0), (0.03, 0.0)));

        let network = RoadNetwork::from_layers(
            &[&sign_road],
            &[&signs, &pois],
            &crate::network::Options::default(),
        );
        let cost = CostModel::flat(network.graph(), DistanceArea::default());
        let poi_layers = [&pois];

        let annotator =
            Annotator::new(&poi_layers, &roads, &network, &cost, Options::default()).unwrap();
        assert_eq!(annotator.run(&mut signs, &NoFeedback).unwrap().count(), 0);

        let f = signs.feature(0).unwrap();
        assert_eq!(f.attribute("NameEN1L"), &Value::from("Museum"));
        assert_eq!(f.attribute("km_1L"), &Value::from("N/A"));
    }

    #[test]
    fn sign_not_on_graph() {
        let Fixture {
            roads,
            mut signs,
            pois,
        } = Fixture::new();

        // The network was built without the signs
        let network =
            RoadNetwork::from_layers(&[&roads], &[&pois], &crate::network::Options::default());
        let cost = CostModel::flat(network.graph(), DistanceArea::default());
        let poi_layers = [&pois];

        let annotator =
            Annotator::new(&poi_layers, &roads, &network, &cost, Options::default()).unwrap();
        assert_eq!(annotator.run(&mut signs, &NoFeedback).unwrap().count(), 0);
        assert_eq!(signs.feature(0).unwrap().attribute("km_1L"), &Value::from("N/A"));
    }

    fn service_fixture(services: &str, second_offset: f64) -> (Layer, Layer, Layer) {
        let mut roads = Layer::new("roads", Crs::Wgs84, fields(&["CODE"]));
        roads.add_feature(road("VR1", (0.0, 0.0), (0.03, 0.0)));

        let mut signs = Layer::new(
            "123_DIR",
            Crs::Wgs84,
            fields(&["routcode", "NameRU1L", "NameEN1L", "PIC_1L", "km_1L"]),
        );
        signs.add_feature(sign(0.0, 0.0001, "").with_attribute("PIC_1L", services));

        let mut pois = Layer::new("poi", Crs::Wgs84, fields(&["NameRU", "NameEN", "pic"]));
        pois.add_feature(poi(0.02, -0.0001, "cafe", "Cafe", "cafe"));
        pois.add_feature(poi(0.02 + second_offset, -0.0001, "atm", "ATM", "atm"));
        pois.add_feature(poi(0.0204, -0.0001, "wc", "WC", "wc"));

        (roads, signs, pois)
    }

    fn annotate_services(services: &str, second_offset: f64) -> (Layer, Vec<PathRecord>) {
        let (roads, mut signs, pois) = service_fixture(services, second_offset);
        let network =
            RoadNetwork::from_layers(&[&roads], &[&signs, &pois], &crate::network::Options::default());
        let cost = CostModel::flat(network.graph(), DistanceArea::default());
        let poi_layers = [&pois];

        let annotator =
            Annotator::new(&poi_layers, &roads, &network, &cost, Options::default()).unwrap();
        let paths = annotator.run(&mut signs, &NoFeedback).unwrap().collect();
        (signs, paths)
    }

    #[test]
    fn service_group_within_radius() {
        let (signs, paths) = annotate_services("cafe  atm wc", 0.0002);

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].geometry.last(), Some(&Point::new(0.02, -0.0001)));

        let f = signs.feature(0).unwrap();
        assert_eq!(f.attribute("km_1L"), &Value::from("2.2"));
        assert_eq!(f.attribute("PIC_1L"), &Value::from("cafe  atm wc"));
        assert_eq!(f.attribute("NameEN1L"), &Value::Null);
    }

    #[test]
    fn service_group_picks_closest_member() {
        let (signs, paths) = annotate_services("wc atm cafe", 0.0002);
        let (_, to_wc) = annotate_services("wc", 0.0002);

        assert_eq!(paths.len(), 1);
        assert_eq!(to_wc.len(), 1);
        assert_eq!(paths[0].geometry.last(), Some(&Point::new(0.02, -0.0001)));
        assert!(paths[0].length_3d < to_wc[0].length_3d);
        assert_eq!(signs.feature(0).unwrap().attribute("km_1L"), &Value::from("2.2"));
    }

    #[test]
    fn service_group_with_one_distant_member() {
        // The cafe and the wc are 45 m apart, the atm is about 150 m from the cafe
        let (signs, paths) = annotate_services("cafe atm wc", 0.0013475);
        assert!(paths.is_empty());
        assert_eq!(signs.feature(0).unwrap().attribute("km_1L"), &Value::from("N/A"));
    }

    #[test]
    fn service_group_too_spread() {
        // About 150 m between the cafe and the atm
        let (signs, paths) = annotate_services("cafe atm", 0.0013475);
        assert!(paths.is_empty());
        assert_eq!(signs.feature(0).unwrap().attribute("km_1L"), &Value::from("N/A"));
    }

    #[test]
    fn service_group_with_unknown_member() {
        let (signs, paths) = annotate_services("cafe bank", 0.0002);
        assert!(paths.is_empty());
        assert_eq!(signs.feature(0).unwrap().attribute("km_1L"), &Value::from("N/A"));
    }

    #[test]
    fn missing_fields() {
        let Fixture {
            roads,
            signs: _,
            pois,
        } = Fixture::new();
        let network = RoadNetwork::default();
        let cost = CostModel::flat(network.graph(), DistanceArea::default());
        let poi_layers = [&pois];

        let bad_roads = Layer::new("roads", Crs::Wgs84, fields(&["name"]));
        match Annotator::new(&poi_layers, &bad_roads, &network, &cost, Options::default()) {
            Err(Error::MissingRequiredAttribute { layer, field }) => {
                assert_eq!(layer, "roads");
                assert_eq!(field, "CODE");
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected an error"),
        }

        let mut bad_signs = Layer::new("123_DIR", Crs::Wgs84, fields(&["routcode", "NameRU1L"]));
        let annotator =
            Annotator::new(&poi_layers, &roads, &network, &cost, Options::default()).unwrap();
        assert!(matches!(
            annotator.run(&mut bad_signs, &NoFeedback),
            Err(Error::MissingRequiredAttribute { .. })
        ));
    }

    #[test]
    fn poi_layer_without_fields_is_skipped() {
        let Fixture {
            roads,
            mut signs,
            pois,
        } = Fixture::new();

        let mut bad_pois = Layer::new("shops", Crs::Wgs84, fields(&["NameRU", "NameEN"]));
        bad_pois.add_feature(
            Feature::new(Geometry::Point(Point::new(0.01, 0.0001)))
                .with_attribute("NameRU", "Музей")
                .with_attribute("NameEN", "Shop"),
        );

        let network = RoadNetwork::from_layers(
            &[&roads],
            &[&signs, &bad_pois, &pois],
            &crate::network::Options::default(),
        );
        let cost = CostModel::flat(network.graph(), DistanceArea::default());
        let poi_layers = [&bad_pois, &pois];

        let annotator =
            Annotator::new(&poi_layers, &roads, &network, &cost, Options::default()).unwrap();
        let paths: Vec<PathRecord> = annotator.run(&mut signs, &NoFeedback).unwrap().collect();

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].geometry.last(), Some(&Point::new(0.02, -0.0001)));
        let f = signs.feature(0).unwrap();
        assert_eq!(f.attribute("NameEN1L"), &Value::from("Museum"));
        assert_eq!(f.attribute("km_1L"), &Value::from("2.2"));
    }

    #[test]
    fn destination_names_are_matched_exactly() {
        let Fixture {
            roads,
            mut signs,
            pois,
        } = Fixture::new();
        signs.add_feature(sign(0.0, 0.0003, " Музей "));

        let network =
            RoadNetwork::from_layers(&[&roads], &[&signs, &pois], &crate::network::Options::default());
        let cost = CostModel::flat(network.graph(), DistanceArea::default());
        let poi_layers = [&pois];

        let annotator =
            Annotator::new(&poi_layers, &roads, &network, &cost, Options::default()).unwrap();
        assert_eq!(annotator.run(&mut signs, &NoFeedback).unwrap().count(), 1);

        let padded = signs.feature(3).unwrap();
        assert_eq!(padded.attribute("NameEN1L"), &Value::from("N/A"));
        assert_eq!(padded.attribute("km_1L"), &Value::from("N/A"));
    }

    #[test]
    fn cancellation_commits_processed_signs() {
        struct CancelAfterFirst(Cell<usize>);

        impl Feedback for CancelAfterFirst {
            fn is_canceled(&self) -> bool {
                let polls = self.0.get();
                self.0.set(polls + 1);
                polls >= 1
            }
        }

        let Fixture {
            roads,
            mut signs,
            pois,
        } = Fixture::new();
        let network =
            RoadNetwork::from_layers(&[&roads], &[&signs, &pois], &crate::network::Options::default());
        let cost = CostModel::flat(network.graph(), DistanceArea::default());
        let poi_layers = [&pois];
        let feedback = CancelAfterFirst(Cell::new(0));

        let annotator =
            Annotator::new(&poi_layers, &roads, &network, &cost, Options::default()).unwrap();
        let mut annotation = annotator.run(&mut signs, &feedback).unwrap();
        assert!(annotation.next().is_some());
        assert!(annotation.next().is_none());
        assert_eq!(annotation.processed(), 1);
        drop(annotation);

        assert_eq!(feedback.0.get(), 2);
        assert_eq!(signs.feature(0).unwrap().attribute("km_1L"), &Value::from("2.2"));
        assert_eq!(signs.feature(1).unwrap().attribute("km_1L"), &Value::Null);
    }

    #[test]
    fn canceled_before_start() {
        let Fixture {
            roads,
            mut signs,
            pois,
        } = Fixture::new();
        let network =
            RoadNetwork::from_layers(&[&roads], &[&signs, &pois], &crate::network::Options::default());
        let cost = CostModel::flat(network.graph(), DistanceArea::default());
        let poi_layers = [&pois];
        let canceled = AtomicBool::new(true);

        let annotator =
            Annotator::new(&poi_layers, &roads, &network, &cost, Options::default()).unwrap();
        assert_eq!(annotator.run(&mut signs, &canceled).unwrap().count(), 0);
        assert_eq!(signs.feature(0).unwrap().attribute("routcode"), &Value::Null);
    }

    #[test]
    fn dropped_annotation_commits() {
        let Fixture {
            roads,
            mut signs,
            pois,
        } = Fixture::new();
        let network =
            RoadNetwork::from_layers(&[&roads], &[&signs, &pois], &crate::network::Options::default());
        let cost = CostModel::flat(network.graph(), DistanceArea::default());
        let poi_layers = [&pois];

        let annotator =
            Annotator::new(&poi_layers, &roads, &network, &cost, Options::default()).unwrap();
        {
            let mut annotation = annotator.run(&mut signs, &NoFeedback).unwrap();
            assert!(annotation.next().is_some());
        }
        assert_eq!(signs.feature(0).unwrap().attribute("km_1L"), &Value::from("2.2"));
    }
}
