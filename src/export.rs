// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::{Error, Layer};

/// Returns true if the layer with the given name is a sign table
/// to be exported, that is if the name looks like `123_DIR`
/// (ASCII digits, an underscore and uppercase ASCII letters).
pub fn is_export_layer(name: &str) -> bool {
    let Some((number, kind)) = name.split_once('_') else {
        return false;
    };
    !number.is_empty()
        && !kind.is_empty()
        && number.bytes().all(|b| b.is_ascii_digit())
        && kind.bytes().all(|b| b.is_ascii_uppercase())
}

/// Replacement table for pictogram codes, applied to every exported cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PictogramTable(HashMap<String, String>);

impl PictogramTable {
    /// Loads the table from a headerless, two-column CSV file (`from,to`).
    /// Rows with fewer than two columns are skipped; later rows take precedence.
    pub fn load<R: io::Read>(reader: R) -> Result<Self, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut table = HashMap::default();
        for record in reader.records() {
            let record = record?;
            match (record.get(0), record.get(1)) {
                (Some(from), Some(to)) => {
                    table.insert(from.to_string(), to.to_string());
                }
                _ => log::warn!("skipping pictogram table row: {:?}", record),
            }
        }

        log::debug!("loaded {} pictogram replacement(s)", table.len());
        Ok(Self(table))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let f = fs::File::open(path)?;
        Self::load(io::BufReader::new(f))
    }

    pub fn insert<S: Into<String>>(&mut self, from: S, to: S) {
        self.0.insert(from.into(), to.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the replacement of a cell, or the cell itself.
    pub fn replace<'a>(&'a self, cell: &'a str) -> &'a str {
        self.0.get(cell).map(|s| s.as_str()).unwrap_or(cell)
    }
}

/// Writes the attribute table of a layer as comma-delimited CSV,
/// encoded in UTF-16 (little-endian, with a byte order mark).
///
/// The header contains all field names of the layer. If a [PictogramTable]
/// is given, every cell is passed through [PictogramTable::replace].
pub fn export_layer<W: Write>(
    layer: &Layer,
    mut writer: W,
    table: Option<&PictogramTable>,
) -> Result<(), Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::default());

    csv_writer.write_record(layer.fields())?;
    for feature in layer.features() {
        let row: Vec<String> = layer
            .fields()
            .iter()
            .map(|field| {
                let cell = feature.attribute(field).to_string();
                match table {
                    Some(table) => table.replace(&cell).to_string(),
                    None => cell,
                }
            })
            .collect();
        csv_writer.write_record(&row)?;
    }

    let utf8 = csv_writer.into_inner().map_err(|e| e.into_error())?;
    let text = String::from_utf8_lossy(&utf8);

    writer.write_all(&[0xFF, 0xFE])?;
    for unit in text.encode_utf16() {
        writer.write_all(&unit.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Exports every layer for which [is_export_layer] holds into
/// `<folder>/<layer name>.csv`, creating the folder if necessary.
/// Returns the paths of written files.
pub fn export_layers<P: AsRef<Path>>(
    layers: &[&Layer],
    folder: P,
    table: Option<&PictogramTable>,
) -> Result<Vec<PathBuf>, Error> {
    let folder = folder.as_ref();
    fs::create_dir_all(folder)?;

    let mut written = Vec::default();
    for layer in layers {
        if !is_export_layer(layer.name()) {
            log::debug!("not exporting layer {}", layer.name());
            continue;
        }

        let path = folder.join(format!("{}.csv", layer.name()));
        let f = fs::File::create(&path)?;
        export_layer(layer, io::BufWriter::new(f), table)?;
        log::info!("exported {} feature(s) to {}", layer.len(), path.display());
        written.push(path);
    }
    Ok(written)
}
