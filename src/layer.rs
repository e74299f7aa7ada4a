// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::{BBox, Crs, Point, Reproject};

/// Dense identifier of a [Feature] within its [Layer].
pub type FeatureId = usize;

/// Value of a single feature attribute.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Int(i64),
    Double(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for [Value::Null] and blank strings.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int(i) => write!(f, "{}", i),
            Self::Double(d) => write!(f, "{}", d),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

/// Geometry of a [Feature], in the coordinate system of its [Layer].
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(Vec<Point>),
}

impl Geometry {
    /// Returns the point of a point geometry, or the first vertex of a line.
    pub fn as_point(&self) -> Option<Point> {
        match self {
            Self::Point(pt) => Some(*pt),
            Self::LineString(pts) => pts.first().copied(),
        }
    }

    pub fn points(&self) -> &[Point] {
        match self {
            Self::Point(pt) => std::slice::from_ref(pt),
            Self::LineString(pts) => pts.as_slice(),
        }
    }

    pub fn bbox(&self) -> Option<BBox> {
        BBox::of_points(self.points())
    }

    pub fn reprojected<R: Reproject + ?Sized>(&self, r: &R, from: Crs, to: Crs) -> Self {
        match self {
            Self::Point(pt) => Self::Point(r.reproject(*pt, from, to)),
            Self::LineString(pts) => Self::LineString(r.reproject_all(pts, from, to)),
        }
    }
}

/// A single record of a [Layer]: a geometry and named attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Geometry,
    pub attributes: HashMap<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: 0,
            geometry,
            attributes: HashMap::default(),
        }
    }

    pub fn with_attribute<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Returns the value of an attribute, or [Value::Null] if the attribute is not set.
    pub fn attribute(&self, name: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.attributes.get(name).unwrap_or(&NULL)
    }

    pub fn set_attribute<V: Into<Value>>(&mut self, name: &str, value: V) {
        self.attributes.insert(name.to_string(), value.into());
    }
}

/// In-memory vector layer: a named, ordered collection of [Features](Feature)
/// sharing a [Crs] and a list of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    name: String,
    crs: Crs,
    fields: Vec<String>,
    features: Vec<Feature>,
}

impl Layer {
    pub fn new<S: Into<String>>(name: S, crs: Crs, fields: Vec<String>) -> Self {
        Self {
            name: name.into(),
            crs,
            fields,
            features: Vec::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// Returns the names of fields of this layer (the layer schema).
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Appends a feature, assigning it the next [FeatureId].
    /// Attributes not present in the layer schema are discarded.
    pub fn add_feature(&mut self, mut feature: Feature) -> FeatureId {
        feature.id = self.features.len();
        feature.attributes.retain(|k, _| self.fields.contains(k));
        self.features.push(feature);
        self.features.len() - 1
    }

    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(id)
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Starts an edit session on this layer.
    pub fn edit(&mut self) -> EditSession<'_> {
        log::debug!("starting edit session on layer {}", self.name);
        EditSession {
            layer: self,
            pending: BTreeMap::default(),
            committed: false,
        }
    }
}

/// Scoped edit transaction over a [Layer].
///
/// Updated features are buffered and written into the layer on [EditSession::commit].
/// Dropping an uncommitted session commits it, so the changes are applied
/// on every exit path.
#[derive(Debug)]
pub struct EditSession<'a> {
    layer: &'a mut Layer,
    pending: BTreeMap<FeatureId, Feature>,
    committed: bool,
}

impl<'a> EditSession<'a> {
    pub fn layer(&self) -> &Layer {
        self.layer
    }

    /// Returns a feature as seen by this session, including uncommitted changes.
    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.pending.get(&id).or_else(|| self.layer.feature(id))
    }

    /// Stages an updated feature. Returns false if no feature with such id exists.
    pub fn update_feature(&mut self, feature: Feature) -> bool {
        if feature.id >= self.layer.features.len() {
            return false;
        }
        self.pending.insert(feature.id, feature);
        true
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Writes all staged features into the layer.
    pub fn commit(mut self) {
        self.flush();
    }

    fn flush(&mut self) {
        if self.committed {
            return;
        }
        self.committed = true;

        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        let layer = &mut *self.layer;
        for (id, mut feature) in pending {
            feature.attributes.retain(|k, _| layer.fields.contains(k));
            layer.features[id] = feature;
        }
        log::debug!("committed {} feature(s) to layer {}", count, layer.name);
    }
}

impl Drop for EditSession<'_> {
    fn drop(&mut self) {
        self.flush();
    }
}
