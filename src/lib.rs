// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Tools for preparing route information plans of bicycle route networks.
//!
//! The core of the crate is a road-network shortest-path engine. Road lines from
//! multiple [Layers](Layer) are merged into a routable [Graph], off-road points
//! (signs and points of interest) are attached to it with tie-in edges,
//! and paths are found with A* using a cost blending the geodesic distance
//! with elevation differences (see [CostModel]).
//!
//! On top of that, the [Annotator] fills distances to destinations on signs,
//! the [export] module writes sign tables as CSV and the [pages] module plans
//! one printed page per sign.
//!
//! # Example
//!
//! ```no_run
//! let roads = infoplan::osm::read_layer_from_file("path/to/roads.osm").unwrap();
//! let mut signs = infoplan::osm::read_layer_from_file("path/to/123_DIR.osm").unwrap();
//! let pois = infoplan::osm::read_layer_from_file("path/to/poi.osm").unwrap();
//!
//! let network = infoplan::RoadNetwork::from_layers(
//!     &[&roads],
//!     &[&signs, &pois],
//!     &infoplan::network::Options::default(),
//! );
//! let cost = infoplan::CostModel::flat(network.graph(), infoplan::DistanceArea::default());
//!
//! let poi_layers = [&pois];
//! let annotator = infoplan::Annotator::new(
//!     &poi_layers,
//!     &roads,
//!     &network,
//!     &cost,
//!     infoplan::annotate::Options::default(),
//! )
//! .expect("missing fields");
//!
//! for path in annotator.run(&mut signs, &infoplan::NoFeedback).unwrap() {
//!     println!("{} m", path.length_3d);
//! }
//! ```

pub mod annotate;
mod astar;
mod cost;
mod distance;
mod elevation;
mod error;
pub mod export;
mod feedback;
pub mod fields;
mod geometry;
mod graph;
mod layer;
pub mod network;
pub mod osm;
pub mod pages;
mod path;
mod spatial;
mod topology;

pub use annotate::{Annotation, Annotator};
pub use astar::{shortest_path, shortest_path_between, SearchError};
pub use cost::CostModel;
pub use distance::{earth_distance, DistanceArea, Ellipsoid};
pub use elevation::{parse_hgt_filename, ElevationSampler, NoElevation, SrtmTile, SrtmTiles};
pub use error::Error;
pub use feedback::{Feedback, NoFeedback};
pub use fields::FieldNames;
pub use geometry::{BBox, Crs, Point, Reproject, Reprojector, UnsupportedCrs};
pub use graph::{Edge, EdgeId, Graph, VertexId};
pub use layer::{EditSession, Feature, FeatureId, Geometry, Layer, Value};
pub use network::RoadNetwork;
pub use path::{assemble, format_km, PathRecord};
pub use spatial::{IndexedSegment, SegmentIndex};
pub use topology::{SnappingTopologyBuilder, TopologyBuilder};
