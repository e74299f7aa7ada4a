// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::{BBox, Crs, Error, Feature, FeatureId, Feedback, Layer, Point, Reproject, Reprojector};

/// Controls for page planning.
pub struct Options<'a> {
    /// Sequential feature number, assigned by [assign_ids].
    pub id_field: String,

    /// Route code of a sign.
    pub route_code_field: String,

    /// Route code of a road.
    pub road_route_code_field: String,

    /// Fields left out of [data_table_html].
    pub nonprint_fields: Vec<String>,

    /// Margin added on every side of the route extent,
    /// as a fraction of the extent's height.
    pub extent_margin: f64,

    pub reprojector: &'a dyn Reproject,
}

impl Default for Options<'static> {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            route_code_field: "routcode".to_string(),
            road_route_code_field: "CODE".to_string(),
            nonprint_fields: ["id", "Num", "type", "routcode", "degree"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            extent_margin: 0.05,
            reprojector: &Reprojector,
        }
    }
}

/// A single page of the route information plan, describing one sign.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Page number, starting from 1.
    pub number: usize,

    /// Name of the layer of the sign.
    pub layer: String,

    pub feature: FeatureId,

    /// Position of the sign, in WGS84.
    pub center: Point,

    /// Position of the sign, formatted as `"lon, lat"`.
    pub coords_label: String,

    pub route_code: String,

    /// Extent (in WGS84) of the overview map, covering the whole route of the sign.
    pub general_extent: Option<BBox>,

    /// File name of the sign type picture.
    pub picture: String,

    /// Attribute table of the sign, see [data_table_html].
    pub table_html: String,
}

impl Page {
    /// Returns the file name under which the page is exported.
    pub fn file_name(&self) -> String {
        format!("{:05}.png", self.number)
    }
}

/// Host service turning a [Page] into an image.
pub trait LayoutRenderer {
    fn render(&mut self, page: &Page, path: &Path) -> Result<(), Error>;
}

/// Numbers features of a layer sequentially (from 1) in the id field.
pub fn assign_ids(layer: &mut Layer, options: &Options) -> Result<(), Error> {
    if !layer.has_field(&options.id_field) {
        return Err(Error::MissingRequiredAttribute {
            layer: layer.name().to_string(),
            field: options.id_field.clone(),
        });
    }

    let mut session = layer.edit();
    for id in 0..session.layer().len() {
        if let Some(mut f) = session.feature(id).cloned() {
            f.set_attribute(&options.id_field, (id + 1) as i64);
            session.update_feature(f);
        }
    }
    session.commit();
    Ok(())
}

/// Returns the bounding box (in WGS84) of all roads with the given route code,
/// grown by `extent_margin` times its height on every side.
pub fn route_extent(route_layer: &Layer, code: &str, options: &Options) -> Result<BBox, Error> {
    let mut extent: Option<BBox> = None;
    for road in route_layer.features() {
        if road.attribute(&options.road_route_code_field).to_string() != code {
            continue;
        }

        if let Some(bbox) = road.geometry.bbox() {
            extent = Some(match extent {
                Some(mut e) => {
                    e.combine(&bbox);
                    e
                }
                None => bbox,
            });
        }
    }

    let bbox =
        extent.ok_or_else(|| Error::ResourceNotFound(format!("roads with code {:?}", code)))?;

    let r = options.reprojector;
    let mut extent = BBox::of_point(r.reproject(bbox.min, route_layer.crs(), Crs::Wgs84));
    extent.extend(r.reproject(bbox.max, route_layer.crs(), Crs::Wgs84));

    // NOTE: Both margins are derived from the height
    let margin = extent.height() * options.extent_margin;
    extent.min.x -= margin;
    extent.min.y -= margin;
    extent.max.x += margin;
    extent.max.y += margin;
    Ok(extent)
}

/// Renders the printable attributes of a feature as an HTML table.
pub fn data_table_html(layer: &Layer, feature: &Feature, options: &Options) -> String {
    let mut html = String::from("<table>");
    for field in layer.fields() {
        if options.nonprint_fields.contains(field) {
            continue;
        }
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape_html(field),
            escape_html(&feature.attribute(field).to_string())
        );
    }
    html.push_str("</table>");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Plans one page for every sign (in layer order, then feature order)
/// whose route code is one of `route_codes`.
///
/// A route without roads in `route_layer` is logged and results in pages
/// without the [general extent](Page::general_extent). Layers without
/// the route code field are logged and skipped.
pub fn plan_pages(
    layers: &[&Layer],
    route_layer: &Layer,
    route_codes: &[String],
    options: &Options,
) -> Result<Vec<Page>, Error> {
    let mut pages = Vec::default();

    for layer in layers {
        if !layer.has_field(&options.route_code_field) {
            let e = Error::MissingRequiredAttribute {
                layer: layer.name().to_string(),
                field: options.route_code_field.clone(),
            };
            log::error!("skipping layer: {}", e);
            continue;
        }

        for feature in layer.features() {
            let route_code = feature.attribute(&options.route_code_field).to_string();
            if !route_codes.contains(&route_code) {
                continue;
            }

            let Some(pt) = feature.geometry.as_point() else {
                log::warn!("{}: feature {} has no position", layer.name(), feature.id);
                continue;
            };
            let center = options.reprojector.reproject(pt, layer.crs(), Crs::Wgs84);

            let general_extent = match route_extent(route_layer, &route_code, options) {
                Ok(extent) => Some(extent),
                Err(e) => {
                    log::error!("{}: feature {}: {}", layer.name(), feature.id, e);
                    None
                }
            };

            let number = pages.len() + 1;
            log::debug!("page {}: {} feature {}", number, layer.name(), feature.id);
            pages.push(Page {
                number,
                layer: layer.name().to_string(),
                feature: feature.id,
                center,
                coords_label: format!("{:.6}, {:.6}", center.x, center.y),
                route_code,
                general_extent,
                picture: format!("{}.jpg", layer.name()),
                table_html: data_table_html(layer, feature, options),
            });
        }
    }

    log::info!("planned {} page(s)", pages.len());
    Ok(pages)
}

/// Renders all pages into `<folder>/<number>.png`.
///
/// Render errors are logged and don't stop the export.
/// Returns paths of successfully rendered pages.
pub fn export_pages(
    pages: &[Page],
    renderer: &mut dyn LayoutRenderer,
    folder: &Path,
    feedback: &dyn Feedback,
) -> Result<Vec<PathBuf>, Error> {
    std::fs::create_dir_all(folder)?;

    let mut written = Vec::default();
    for (i, page) in pages.iter().enumerate() {
        if feedback.is_canceled() {
            log::warn!("page export canceled");
            break;
        }

        let path = folder.join(page.file_name());
        log::info!("saving {}", path.display());
        match renderer.render(page, &path) {
            Ok(()) => written.push(path),
            Err(e) => log::error!("{}: {}", path.display(), e),
        }
        feedback.set_progress(100.0 * (i + 1) as f64 / pages.len() as f64);
    }
    Ok(written)
}

/// Returns all distinct route codes of roads, in first-seen order.
pub fn route_codes(route_layer: &Layer, options: &Options) -> Vec<String> {
    let mut codes: Vec<String> = Vec::default();
    for road in route_layer.features() {
        let code = road.attribute(&options.road_route_code_field);
        if code.is_empty() {
            continue;
        }
        let code = code.to_string();
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}
