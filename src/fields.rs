// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Error, Feature, Layer, Value};

/// Maps logical attribute roles onto physical field names of the sign,
/// road and POI layers.
///
/// Per-slot sign fields are templates, where `{p}` is replaced by the slot
/// position and `{d}` by the slot direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    /// Route code of a sign, filled from the nearest road.
    pub sign_route_code: String,

    /// Route code of a road feature.
    pub road_route_code: String,

    /// Case-insensitive prefix of destination name fields
    /// (on signs, one per slot; on POIs, any number).
    pub name_prefix: String,

    /// English name of a POI.
    pub poi_english_name: String,

    /// Pictogram code of a POI.
    pub poi_pictogram: String,

    /// Per-slot English destination name on a sign.
    pub sign_english_name: String,

    /// Per-slot pictogram code on a sign.
    pub sign_pictogram: String,

    /// Per-slot formatted distance on a sign.
    pub sign_distance: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            sign_route_code: "routcode".to_string(),
            road_route_code: "CODE".to_string(),
            name_prefix: "nameru".to_string(),
            poi_english_name: "NameEN".to_string(),
            poi_pictogram: "pic".to_string(),
            sign_english_name: "NameEN{p}{d}".to_string(),
            sign_pictogram: "PIC_{p}{d}".to_string(),
            sign_distance: "km_{p}{d}".to_string(),
        }
    }
}

/// A directional slot of a sign, e.g. `NameRU1L` is position `1`, direction `L`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Physical name of the destination name field.
    pub name_field: String,
    pub position: char,
    pub direction: char,
}

impl Slot {
    /// Builds a slot out of a name field; the last two characters
    /// are the position and the direction.
    pub fn from_field(name_field: &str) -> Option<Self> {
        let mut chars = name_field.chars().rev();
        let direction = chars.next()?;
        let position = chars.next()?;
        Some(Self {
            name_field: name_field.to_string(),
            position,
            direction,
        })
    }

    pub fn field(&self, template: &str) -> String {
        template
            .replace("{p}", &self.position.to_string())
            .replace("{d}", &self.direction.to_string())
    }
}

impl FieldNames {
    pub fn is_name_field(&self, field: &str) -> bool {
        field
            .to_lowercase()
            .starts_with(&self.name_prefix.to_lowercase())
    }

    /// Returns all destination slots of a sign layer, in schema order.
    pub fn slots(&self, sign_layer: &Layer) -> Vec<Slot> {
        sign_layer
            .fields()
            .iter()
            .filter(|f| self.is_name_field(f) && f.chars().count() >= self.name_prefix.chars().count() + 2)
            .filter_map(|f| Slot::from_field(f))
            .collect()
    }

    /// Iterates over non-empty name values of a feature, in schema order.
    pub fn names<'a>(
        &'a self,
        layer: &'a Layer,
        feature: &'a Feature,
    ) -> impl Iterator<Item = &'a str> + 'a {
        layer
            .fields()
            .iter()
            .filter(|f| self.is_name_field(f))
            .filter_map(|f| feature.attribute(f).as_str())
            .filter(|v| !v.trim().is_empty())
    }

    pub fn sign_english_name(&self, slot: &Slot) -> String {
        slot.field(&self.sign_english_name)
    }

    pub fn sign_pictogram(&self, slot: &Slot) -> String {
        slot.field(&self.sign_pictogram)
    }

    pub fn sign_distance(&self, slot: &Slot) -> String {
        slot.field(&self.sign_distance)
    }

    /// Ensures that all fields needed to annotate the sign layer exist.
    pub fn validate_signs(&self, signs: &Layer) -> Result<(), Error> {
        require(signs, &self.sign_route_code)?;
        for slot in self.slots(signs) {
            require(signs, &self.sign_english_name(&slot))?;
            require(signs, &self.sign_pictogram(&slot))?;
            require(signs, &self.sign_distance(&slot))?;
        }
        Ok(())
    }

    pub fn validate_roads(&self, roads: &Layer) -> Result<(), Error> {
        require(roads, &self.road_route_code)
    }

    pub fn validate_pois(&self, pois: &Layer) -> Result<(), Error> {
        require(pois, &self.poi_english_name)?;
        require(pois, &self.poi_pictogram)
    }

    pub fn route_code<'f>(&self, road: &'f Feature) -> &'f Value {
        road.attribute(&self.road_route_code)
    }
}

fn require(layer: &Layer, field: &str) -> Result<(), Error> {
    if layer.has_field(field) {
        Ok(())
    } else {
        Err(Error::MissingRequiredAttribute {
            layer: layer.name().to_string(),
            field: field.to_string(),
        })
    }
}
