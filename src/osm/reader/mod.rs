// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use layer_builder::LayerBuilder;

use crate::{Error, Layer};

mod layer_builder;
mod model;
mod xml;

/// Format of the input OSM file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    #[default]
    Unknown,

    /// Force uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the format from the file extension, returning [FileFormat::Unknown]
    /// for unrecognized extensions.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let name = path
            .as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        if name.ends_with(".gz") {
            Self::XmlGz
        } else if name.ends_with(".bz2") {
            Self::XmlBz2
        } else if name.ends_with(".osm") || name.ends_with(".xml") {
            Self::Xml
        } else {
            Self::Unknown
        }
    }

    /// Guesses the format from the first bytes of the data.
    pub fn from_magic(data: &[u8]) -> Self {
        if data.starts_with(&[0x1F, 0x8B]) {
            Self::XmlGz
        } else if data.starts_with(b"BZh") {
            Self::XmlBz2
        } else {
            Self::Xml
        }
    }
}

/// Parse OSM features from a reader into a new [Layer] in EPSG:4326.
///
/// Tagged nodes become point features and ways become line features.
/// The layer fields are all tag keys, in the order of first appearance.
/// The provided stream will be automatically wrapped in a buffered reader.
pub fn read_layer<R: io::Read>(name: &str, reader: R, format: FileFormat) -> Result<Layer, Error> {
    let mut b = io::BufReader::new(reader);
    let format = match format {
        FileFormat::Unknown => {
            let detected = FileFormat::from_magic(b.fill_buf()?);
            log::debug!("{}: detected format {:?}", name, detected);
            detected
        }
        f => f,
    };

    match format {
        FileFormat::Unknown | FileFormat::Xml => {
            let r = xml::Reader::from_io(b);
            Ok(LayerBuilder::new(name).add_features(r)?)
        }

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(b);
            let b = io::BufReader::new(d);
            let r = xml::Reader::from_io(b);
            Ok(LayerBuilder::new(name).add_features(r)?)
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            let b = io::BufReader::new(d);
            let r = xml::Reader::from_io(b);
            Ok(LayerBuilder::new(name).add_features(r)?)
        }
    }
}

/// Parse OSM features from a file at the provided path into a new [Layer].
///
/// The layer is named after the file name, up to the first dot
/// (`123_DIR.osm.gz` becomes `123_DIR`). The format is guessed
/// from the extension, falling back to the content.
pub fn read_layer_from_file<P: AsRef<Path>>(path: P) -> Result<Layer, Error> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name.split('.').next().unwrap_or_default();

    let f = File::open(path)?;
    read_layer(name, f, FileFormat::from_path(path))
}

/// Parse OSM features from a static buffer into a new [Layer].
pub fn read_layer_from_buffer(name: &str, data: &[u8], format: FileFormat) -> Result<Layer, Error> {
    let format = match format {
        FileFormat::Unknown => FileFormat::from_magic(data),
        f => f,
    };

    if format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        let r = xml::Reader::from_buffer(data);
        Ok(LayerBuilder::new(name).add_features(r)?)
    } else {
        // Wrap the buffer in a cursor and use the IO path
        let cursor = io::Cursor::new(data);
        read_layer(name, cursor, format)
    }
}
