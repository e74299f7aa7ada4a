// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{SearchError, UnsupportedCrs};

/// Errors raised while loading, annotating or exporting layers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A field needed by the annotation or export is missing from a layer schema.
    #[error("layer {layer} is missing required field {field:?}")]
    MissingRequiredAttribute { layer: String, field: String },

    /// A named resource (point of interest, route, layer) does not exist.
    #[error("not found: {0}")]
    ResourceNotFound(String),

    #[error("search: {0}")]
    Search(#[from] SearchError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    UnsupportedCrs(#[from] UnsupportedCrs),
}
