// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::Point;

/// Void/no-data marker in SRTM tiles.
const SRTM_VOID: i16 = -32768;

/// Source of terrain heights.
///
/// Points are always given in the working CRS (geodetic WGS84, `x` = lon, `y` = lat).
/// `None` means that no height is known at the given position; callers must treat
/// that as "no elevation penalty".
pub trait ElevationSampler {
    fn elevation_at(&self, pt: Point) -> Option<f64>;
}

/// [ElevationSampler] used when no elevation raster is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoElevation;

impl ElevationSampler for NoElevation {
    fn elevation_at(&self, _: Point) -> Option<f64> {
        None
    }
}

impl<F: Fn(Point) -> Option<f64>> ElevationSampler for F {
    fn elevation_at(&self, pt: Point) -> Option<f64> {
        self(pt)
    }
}

/// A single [SRTM](https://www2.jpl.nasa.gov/srtm/) tile, covering 1°×1°.
///
/// Samples are stored row-major, with row 0 being the northernmost one.
#[derive(Debug, Clone)]
pub struct SrtmTile {
    lat_sw: i16,
    lon_sw: i16,
    samples_per_side: usize,
    data: Vec<i16>,
}

impl SrtmTile {
    pub fn new(lat_sw: i16, lon_sw: i16, samples_per_side: usize, data: Vec<i16>) -> Self {
        assert!(samples_per_side >= 2);
        assert_eq!(data.len(), samples_per_side * samples_per_side);
        Self {
            lat_sw,
            lon_sw,
            samples_per_side,
            data,
        }
    }

    /// Returns the value of the raster cell containing the given position,
    /// without any interpolation.
    fn sample(&self, lat: f64, lon: f64) -> Option<f64> {
        let frac_lat = lat - self.lat_sw as f64;
        let frac_lon = lon - self.lon_sw as f64;
        if !(0.0..=1.0).contains(&frac_lat) || !(0.0..=1.0).contains(&frac_lon) {
            return None;
        }

        let intervals = (self.samples_per_side - 1) as f64;
        let row = ((1.0 - frac_lat) * intervals).round() as usize;
        let col = (frac_lon * intervals).round() as usize;

        match self.data[row * self.samples_per_side + col] {
            SRTM_VOID => None,
            v => Some(v as f64),
        }
    }
}

/// Parses the south-west corner encoded in an SRTM file name, like `N50E004.hgt`.
pub fn parse_hgt_filename(filename: &str) -> Option<(i16, i16)> {
    let stem = filename
        .strip_suffix(".hgt")
        .or_else(|| filename.strip_suffix(".HGT"))
        .unwrap_or(filename);
    if stem.len() != 7 || !stem.is_ascii() {
        return None;
    }

    let lat_sign: i16 = match &stem[0..1] {
        "N" | "n" => 1,
        "S" | "s" => -1,
        _ => return None,
    };
    let lon_sign: i16 = match &stem[3..4] {
        "E" | "e" => 1,
        "W" | "w" => -1,
        _ => return None,
    };

    let lat: i16 = stem[1..3].parse().ok()?;
    let lon: i16 = stem[4..7].parse().ok()?;
    Some((lat_sign * lat, lon_sign * lon))
}

/// [ElevationSampler] over a set of SRTM1/SRTM3 `.hgt` tiles.
#[derive(Debug, Clone, Default)]
pub struct SrtmTiles {
    tiles: HashMap<(i16, i16), SrtmTile>,
}

impl SrtmTiles {
    pub fn from_tiles<I: IntoIterator<Item = SrtmTile>>(tiles: I) -> Self {
        Self {
            tiles: tiles
                .into_iter()
                .map(|t| ((t.lat_sw, t.lon_sw), t))
                .collect(),
        }
    }

    /// Loads all `.hgt` files from a directory (non-recursively).
    /// Unreadable tiles are logged and skipped; only a failure to list the directory is an error.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        let mut tiles = HashMap::default();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_hgt = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("hgt"))
                .unwrap_or(false);

            if !path.is_file() || !is_hgt {
                continue;
            }

            match load_tile(&path) {
                Ok(tile) => {
                    log::debug!(
                        "loaded SRTM tile {} ({} samples per side)",
                        path.display(),
                        tile.samples_per_side
                    );
                    tiles.insert((tile.lat_sw, tile.lon_sw), tile);
                }
                Err(e) => log::warn!("skipping SRTM tile {}: {}", path.display(), e),
            }
        }

        log::info!("loaded {} SRTM tile(s)", tiles.len());
        Ok(Self { tiles })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl ElevationSampler for SrtmTiles {
    fn elevation_at(&self, pt: Point) -> Option<f64> {
        let (lat, lon) = (pt.y, pt.x);
        let key = (lat.floor() as i16, lon.floor() as i16);

        // Positions on the north/east edge of a tile are also covered
        // by the tile to the south/west.
        [key, (key.0 - 1, key.1), (key.0, key.1 - 1)]
            .iter()
            .filter_map(|k| self.tiles.get(k))
            .find_map(|tile| tile.sample(lat, lon))
    }
}

fn load_tile(path: &Path) -> io::Result<SrtmTile> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let (lat_sw, lon_sw) = parse_hgt_filename(name).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not an SRTM tile name: {:?}", name),
        )
    })?;

    let mut buf = Vec::default();
    fs::File::open(path)?.read_to_end(&mut buf)?;

    let samples_per_side = match buf.len() {
        25_934_402 => 3601,
        2_884_802 => 1201,
        n => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unexpected .hgt file size: {} bytes", n),
            ))
        }
    };

    let data = buf
        .chunks_exact(2)
        .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
        .collect();

    Ok(SrtmTile::new(lat_sw, lon_sw, samples_per_side, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hgt_filename() {
        assert_eq!(parse_hgt_filename("N50E004.hgt"), Some((50, 4)));
        assert_eq!(parse_hgt_filename("S12W077.hgt"), Some((-12, -77)));
        assert_eq!(parse_hgt_filename("N50E004"), Some((50, 4)));
        assert_eq!(parse_hgt_filename("X50E004.hgt"), None);
        assert_eq!(parse_hgt_filename("N5E4.hgt"), None);
    }

    #[test]
    fn srtm_lookup() {
        // 3x3 tile at 49°N 19°E:
        //   100 110 120
        //   200 210 220
        //   300 VOID 320
        let tile = SrtmTile::new(
            49,
            19,
            3,
            vec![100, 110, 120, 200, 210, 220, 300, SRTM_VOID, 320],
        );
        let tiles = SrtmTiles::from_tiles([tile]);

        assert_eq!(tiles.elevation_at(Point::new(19.0, 50.0)), Some(100.0));
        assert_eq!(tiles.elevation_at(Point::new(19.5, 49.5)), Some(210.0));
        assert_eq!(tiles.elevation_at(Point::new(19.9, 49.1)), Some(320.0));
        assert_eq!(tiles.elevation_at(Point::new(19.5, 49.0)), None);
        assert_eq!(tiles.elevation_at(Point::new(21.0, 49.5)), None);
    }

    #[test]
    fn load_from_dir_skips_bad_tiles() {
        let dir = tempfile::tempdir().unwrap();

        let mut srtm3 = vec![0u8; 2 * 1201 * 1201];
        srtm3[..2].copy_from_slice(&300i16.to_be_bytes());
        fs::write(dir.path().join("N50E020.hgt"), &srtm3).unwrap();
        fs::write(dir.path().join("N51E020.hgt"), b"garbage").unwrap();
        fs::write(dir.path().join("tiles.hgt"), &srtm3).unwrap();
        fs::write(dir.path().join("readme.txt"), b"not a tile").unwrap();

        let tiles = SrtmTiles::load_from_dir(dir.path()).unwrap();
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles.elevation_at(Point::new(20.0, 51.0)), Some(300.0));
        assert_eq!(tiles.elevation_at(Point::new(20.5, 50.5)), Some(0.0));

        assert!(SrtmTiles::load_from_dir(dir.path().join("missing")).is_err());
    }

    #[test]
    fn no_elevation_and_closures() {
        assert_eq!(NoElevation.elevation_at(Point::new(1.0, 2.0)), None);
        let flat = |_: Point| Some(12.5);
        assert_eq!(flat.elevation_at(Point::new(1.0, 2.0)), Some(12.5));
    }
}
