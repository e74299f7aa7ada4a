// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use infoplan::{self, pages, Layer, Point};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct LayerLoadError(PathBuf, #[source] infoplan::Error);

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct HeightsLoadError(PathBuf, #[source] io::Error);

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fill destination distances on a sign layer and print found paths as GeoJSON
    Distances {
        /// The OSM file with signs
        #[arg(long)]
        signs: PathBuf,

        /// OSM files with points of interest
        #[arg(long, required = true, num_args = 1..)]
        pois: Vec<PathBuf>,

        /// OSM files with roads
        #[arg(long, required = true, num_args = 1..)]
        roads: Vec<PathBuf>,

        /// The OSM file with route roads, providing route codes of signs
        #[arg(long)]
        route_roads: PathBuf,

        /// Directory with SRTM .hgt tiles
        #[arg(long)]
        heights: Option<PathBuf>,

        /// Snapping tolerance for road endpoints, in degrees
        #[arg(long, default_value_t = 0.0)]
        tolerance: f64,

        /// Write the annotated sign table to this CSV file
        #[arg(long)]
        signs_csv: Option<PathBuf>,

        /// Write vertices and edges of the routing graph to this GeoJSON file
        #[arg(long)]
        graph_dump: Option<PathBuf>,
    },

    /// Export sign tables (layers named like 123_DIR) as UTF-16 CSV files
    ExportCsv {
        /// OSM files with sign tables
        #[arg(long, required = true, num_args = 1..)]
        layers: Vec<PathBuf>,

        /// Output directory
        #[arg(long)]
        output: PathBuf,

        /// Headerless CSV file with pictogram replacements
        #[arg(long)]
        pictograms: Option<PathBuf>,
    },

    /// Plan route information plan pages and print them as GeoJSON
    Pages {
        /// OSM files with signs
        #[arg(long, required = true, num_args = 1..)]
        layers: Vec<PathBuf>,

        /// The OSM file with route roads
        #[arg(long)]
        roads: PathBuf,

        /// Route codes to plan pages for; all codes of the route roads if not given
        #[arg(long, num_args = 1..)]
        route_code: Vec<String>,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Distances {
            signs,
            pois,
            roads,
            route_roads,
            heights,
            tolerance,
            signs_csv,
            graph_dump,
        } => {
            let mut signs = load_layer(&signs)?;
            let pois = load_layers(&pois)?;
            let roads = load_layers(&roads)?;
            let route_roads = load_layer(&route_roads)?;

            let road_refs: Vec<&Layer> = roads.iter().collect();
            let poi_refs: Vec<&Layer> = pois.iter().collect();
            let mut point_refs: Vec<&Layer> = vec![&signs];
            point_refs.extend(poi_refs.iter().copied());

            let options = infoplan::network::Options {
                tolerance,
                ..Default::default()
            };
            let network = infoplan::RoadNetwork::from_layers(&road_refs, &point_refs, &options);
            log::info!(
                "routing graph has {} vertices and {} edges",
                network.graph().vertex_count(),
                network.graph().edge_count()
            );

            if let Some(path) = graph_dump {
                network
                    .graph()
                    .write_geojson(BufWriter::new(fs::File::create(&path)?))?;
            }

            let distance = infoplan::DistanceArea::default();
            let cost = match heights {
                Some(dir) => {
                    let tiles = infoplan::SrtmTiles::load_from_dir(&dir)
                        .map_err(|e| HeightsLoadError(dir.clone(), e))?;
                    infoplan::CostModel::new(network.graph(), distance, &tiles)
                }
                None => infoplan::CostModel::flat(network.graph(), distance),
            };

            let annotator = infoplan::Annotator::new(
                &poi_refs,
                &route_roads,
                &network,
                &cost,
                infoplan::annotate::Options::default(),
            )?;
            let paths: Vec<infoplan::PathRecord> =
                annotator.run(&mut signs, &infoplan::NoFeedback)?.collect();
            print_paths(&paths);

            if let Some(path) = signs_csv {
                let f = fs::File::create(&path)?;
                infoplan::export::export_layer(&signs, BufWriter::new(f), None)?;
            }
        }

        Command::ExportCsv {
            layers,
            output,
            pictograms,
        } => {
            let layers = load_layers(&layers)?;
            let table = match pictograms {
                Some(path) => Some(
                    infoplan::export::PictogramTable::load_from_file(&path)
                        .map_err(|e| LayerLoadError(path.clone(), e))?,
                ),
                None => None,
            };

            let refs: Vec<&Layer> = layers.iter().collect();
            for path in infoplan::export::export_layers(&refs, &output, table.as_ref())? {
                println!("{}", path.display());
            }
        }

        Command::Pages {
            layers,
            roads,
            route_code,
        } => {
            let layers = load_layers(&layers)?;
            let roads = load_layer(&roads)?;
            let options = pages::Options::default();

            let codes = if route_code.is_empty() {
                pages::route_codes(&roads, &options)
            } else {
                route_code
            };

            let refs: Vec<&Layer> = layers.iter().collect();
            let planned = pages::plan_pages(&refs, &roads, &codes, &options)?;
            print_pages(&planned);
        }
    }

    Ok(())
}

fn load_layer<P: AsRef<Path>>(path: P) -> Result<Layer, LayerLoadError> {
    match infoplan::osm::read_layer_from_file(path.as_ref()) {
        Ok(layer) => Ok(layer),
        Err(e) => Err(LayerLoadError(PathBuf::from(path.as_ref()), e)),
    }
}

fn load_layers(paths: &[PathBuf]) -> Result<Vec<Layer>, LayerLoadError> {
    paths.iter().map(load_layer).collect()
}

fn json_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn print_paths(paths: &[infoplan::PathRecord]) {
    println!("{{");
    println!("  \"type\": \"FeatureCollection\",");
    println!("  \"features\": [");

    for (i, path) in paths.iter().enumerate() {
        println!("    {{");
        println!("      \"type\": \"Feature\",");
        println!("      \"properties\": {{");
        println!("        \"id\": {},", i + 1);
        println!("        \"length_2d\": {},", path.length_2d);
        println!("        \"length_3d\": {},", path.length_3d);
        println!("        \"label\": {}", json_string(&path.label()));
        println!("      }},");

        println!("      \"geometry\": {{");
        println!("        \"type\": \"LineString\",");
        println!("        \"coordinates\": [");

        let mut points = path.geometry.iter().peekable();
        while let Some(pt) = points.next() {
            let suffix = if points.peek().is_some() { "," } else { "" };
            println!("          [{}, {}]{}", pt.x, pt.y, suffix);
        }

        println!("        ]");
        println!("      }}");
        let suffix = if i + 1 < paths.len() { "," } else { "" };
        println!("    }}{}", suffix);
    }

    println!("  ]");
    println!("}}");
}

fn print_pages(planned: &[pages::Page]) {
    println!("{{");
    println!("  \"type\": \"FeatureCollection\",");
    println!("  \"features\": [");

    for (i, page) in planned.iter().enumerate() {
        let Point { x, y } = page.center;
        println!("    {{");
        println!("      \"type\": \"Feature\",");
        println!("      \"properties\": {{");
        println!("        \"page\": {},", page.number);
        println!("        \"file\": {},", json_string(&page.file_name()));
        println!("        \"layer\": {},", json_string(&page.layer));
        println!("        \"route_code\": {},", json_string(&page.route_code));
        match page.general_extent {
            Some(e) => println!(
                "        \"extent\": [{}, {}, {}, {}],",
                e.min.x, e.min.y, e.max.x, e.max.y
            ),
            None => println!("        \"extent\": null,"),
        }
        println!("        \"picture\": {},", json_string(&page.picture));
        println!("        \"table\": {}", json_string(&page.table_html));
        println!("      }},");
        println!("      \"geometry\": {{");
        println!("        \"type\": \"Point\",");
        println!("        \"coordinates\": [{}, {}]", x, y);
        println!("      }}");
        let suffix = if i + 1 < planned.len() { "," } else { "" };
        println!("    }}{}", suffix);
    }

    println!("  ]");
    println!("}}");
}
