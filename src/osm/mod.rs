// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Loading of vector [Layers](crate::Layer) from [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML) files.

mod reader;

pub use reader::{read_layer, read_layer_from_buffer, read_layer_from_file, FileFormat};

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::{Crs, Geometry, Point, Value};

    const DATA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="1" lat="50.0" lon="20.0" />
  <node id="2" lat="50.0" lon="20.01" />
  <node id="3" lat="50.001" lon="20.005">
    <tag k="NameRU" v="Музей" />
    <tag k="NameEN" v="Museum" />
    <tag k="pic" v="museum" />
  </node>
  <way id="10">
    <nd ref="1" />
    <nd ref="2" />
    <tag k="CODE" v="VR1" />
  </way>
</osm>
"#;

    fn check_layer(l: &crate::Layer, name: &str) {
        assert_eq!(l.name(), name);
        assert_eq!(l.crs(), Crs::Wgs84);
        assert_eq!(l.fields(), &["NameRU", "NameEN", "pic", "CODE"]);
        assert_eq!(l.len(), 2);
        assert_eq!(
            l.feature(0).unwrap().geometry,
            Geometry::Point(Point::new(20.005, 50.001))
        );
        assert_eq!(
            l.feature(1).unwrap().geometry,
            Geometry::LineString(vec![Point::new(20.0, 50.0), Point::new(20.01, 50.0)])
        );
        assert_eq!(l.feature(1).unwrap().attribute("CODE"), &Value::from("VR1"));
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut e = flate2::write::GzEncoder::new(Vec::default(), flate2::Compression::default());
        e.write_all(data).unwrap();
        e.finish().unwrap()
    }

    fn bzip(data: &[u8]) -> Vec<u8> {
        let mut e = bzip2::write::BzEncoder::new(Vec::default(), bzip2::Compression::default());
        e.write_all(data).unwrap();
        e.finish().unwrap()
    }

    #[test]
    fn xml() {
        let l = read_layer_from_buffer("poi", DATA.as_bytes(), FileFormat::Xml).unwrap();
        check_layer(&l, "poi");
    }

    #[test]
    fn xml_io() {
        let l = read_layer("poi", DATA.as_bytes(), FileFormat::Xml).unwrap();
        check_layer(&l, "poi");
    }

    #[test]
    fn gz() {
        let data = gzip(DATA.as_bytes());
        let l = read_layer("poi", data.as_slice(), FileFormat::XmlGz).unwrap();
        check_layer(&l, "poi");
    }

    #[test]
    fn bz2() {
        let data = bzip(DATA.as_bytes());
        let l = read_layer_from_buffer("poi", &data, FileFormat::XmlBz2).unwrap();
        check_layer(&l, "poi");
    }

    #[test]
    fn detection() {
        let gz = gzip(DATA.as_bytes());
        let bz = bzip(DATA.as_bytes());
        assert_eq!(FileFormat::from_magic(&gz), FileFormat::XmlGz);
        assert_eq!(FileFormat::from_magic(&bz), FileFormat::XmlBz2);
        assert_eq!(FileFormat::from_magic(DATA.as_bytes()), FileFormat::Xml);

        check_layer(&read_layer("a", gz.as_slice(), FileFormat::Unknown).unwrap(), "a");
        check_layer(&read_layer_from_buffer("b", &bz, FileFormat::Unknown).unwrap(), "b");

        assert_eq!(FileFormat::from_path("x/123_DIR.osm.gz"), FileFormat::XmlGz);
        assert_eq!(FileFormat::from_path("roads.OSM.BZ2"), FileFormat::XmlBz2);
        assert_eq!(FileFormat::from_path("roads.osm"), FileFormat::Xml);
        assert_eq!(FileFormat::from_path("roads"), FileFormat::Unknown);
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("123_DIR.osm.gz");
        std::fs::write(&path, gzip(DATA.as_bytes())).unwrap();
        check_layer(&read_layer_from_file(&path).unwrap(), "123_DIR");
    }

    #[test]
    fn malformed() {
        let r = read_layer_from_buffer("bad", b"<osm><node id=\"1\"></way></osm>", FileFormat::Xml);
        assert!(matches!(r, Err(crate::Error::Xml(_))));
    }
}
