//! POI clustering tool
//!
//! Reads points of interest from a CSV file, clusters them for one map
//! viewport and writes one row per cluster: the cluster's anchor point and
//! how many points it stands for.

use clap::{Parser, ValueEnum};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use poi_cluster::cluster::{
    Algorithm, Cluster, ClusterEngine, ClusterFrame, ClusterKind, Coordinate, EngineConfig, Item,
    ItemSet, ItemStore, PassOutcome, Viewport,
};


#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Fixed grid of 2*radius cells
    Grid,
    /// First-match boxes around anchor points
    Point,
}

impl From<Strategy> for Algorithm {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Grid => Algorithm::GridBased,
            Strategy::Point => Algorithm::PointBased,
        }
    }
}

#[derive(Parser)]
#[command(name = "poi_cluster")]
#[command(about = "Viewport-adaptive POI clustering tool", long_about = None)]
struct Args {
    /// Input CSV file with latitude,longitude columns
    #[arg(short, long, default_value = "points.csv")]
    input: PathBuf,

    /// Output CSV file with one row per cluster (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 768)]
    height: u32,

    /// Zoom level
    #[arg(short, long, default_value_t = 12)]
    zoom: u8,

    /// Viewport center as LAT,LON (default: mean of the input points)
    #[arg(short, long, value_parser = parse_center)]
    center: Option<Coordinate>,

    /// Clustering radius in pixels
    #[arg(short, long, default_value_t = 40.0)]
    radius: f64,

    /// Clustering strategy
    #[arg(short, long, value_enum, default_value_t = Strategy::Grid)]
    algorithm: Strategy,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.debug);

    // Read items and CSV records from file (read once, reuse for output)
    let (items, csv_records) = match read_items_and_csv(&args.input) {
        Ok(result) => result,
        Err(e) => {
            error!("Error reading CSV: {}", e);
            std::process::exit(1);
        }
    };

    if items.is_empty() {
        error!("No points found in CSV file");
        std::process::exit(1);
    }

    debug!("Read {} points from {:?}", items.len(), args.input);

    let center = args
        .center
        .or_else(|| mean_location(&items))
        .unwrap_or(Coordinate::new(0.0, 0.0));
    let config = EngineConfig {
        viewport: Viewport::new(args.width, args.height, args.zoom, center),
        radius: args.radius,
        algorithm: args.algorithm.into(),
    };

    debug!(
        "Clustering with radius={} px, zoom={}, center=({:.5}, {:.5})",
        args.radius, args.zoom, center.latitude, center.longitude
    );

    let store = Arc::new(ItemStore::from_set(items));
    let engine = match ClusterEngine::new(Arc::clone(&store), log_frame, &Handle::current(), config)
    {
        Ok(engine) => engine,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let frame = match engine.recluster().await {
        Ok(PassOutcome::Delivered(frame)) => frame,
        Ok(PassOutcome::Skipped { .. }) => {
            error!("Zoom {} is beyond the clusterable range", args.zoom);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Clustering failed: {}", e);
            std::process::exit(1);
        }
    };

    let items = store.snapshot();

    // Write clusters to output (stdout or file)
    match args.output {
        None => {
            if let Err(e) = write_clusters_to_stdout(&frame.clusters) {
                error!("Error writing clusters: {}", e);
                std::process::exit(1);
            }
        }
        Some(output_file) => {
            if let Err(e) =
                write_clusters_to_csv(&output_file, &items, &csv_records, &frame.clusters)
            {
                error!("Error writing CSV: {}", e);
                std::process::exit(1);
            }
            debug!("Clusters written to {:?}", output_file);
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Render dispatch for the command line: a summary line per frame
fn log_frame(frame: &ClusterFrame) {
    let singles = frame
        .clusters
        .iter()
        .filter(|c| matches!(c.kind(), ClusterKind::Single(_)))
        .count();

    info!(
        clusters = frame.clusters.len(),
        singles,
        groups = frame.clusters.len() - singles,
        zoom = frame.viewport.zoom,
        "clusters ready"
    );
}

/// Parses `LAT,LON`
fn parse_center(s: &str) -> Result<Coordinate, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {s:?}"))?;
    let lat = lat.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let lon = lon.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok(Coordinate::new(lat, lon))
}

/// CSV records type alias for readability
type CsvRecords = Vec<Vec<String>>;

/// Reads items and CSV records from a file in a single pass
///
/// Expected format: `latitude,longitude` (header row is optional). Each
/// item's payload is the index of its record.
///
/// # Returns
///
/// A tuple `(items, records)` where:
/// - `items` are parsed items for clustering
/// - `records` are raw CSV records for output preservation
fn read_items_and_csv(
    filename: &PathBuf,
) -> Result<(ItemSet<usize>, CsvRecords), Box<dyn std::error::Error>> {
    let file = File::open(filename)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut items = ItemSet::new();
    let mut records = Vec::new();

    for result in reader.records() {
        let record = result?;
        let record_vec: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        records.push(record_vec);
    }

    let start_idx = if has_header(&records) { 1 } else { 0 };

    for (idx, record) in records.iter().enumerate().skip(start_idx) {
        if record.len() < 2 {
            continue;
        }

        let lat = record[0].trim().parse::<f64>();
        let lon = record[1].trim().parse::<f64>();
        if let (Ok(lat), Ok(lon)) = (lat, lon) {
            items.push(Item::new(idx, Coordinate::new(lat, lon)));
        }
    }

    Ok((items, records))
}

/// Whether the first record is a header rather than a data row
fn has_header(records: &[Vec<String>]) -> bool {
    records
        .first()
        .and_then(|r| r.first())
        .is_some_and(|cell| cell.trim().parse::<f64>().is_err())
}

/// Mean of all finite item locations
fn mean_location(items: &ItemSet<usize>) -> Option<Coordinate> {
    let finite: Vec<Coordinate> = items
        .iter()
        .map(|i| i.location)
        .filter(Coordinate::is_finite)
        .collect();
    if finite.is_empty() {
        return None;
    }

    let n = finite.len() as f64;
    let latitude = finite.iter().map(|c| c.latitude).sum::<f64>() / n;
    let longitude = finite.iter().map(|c| c.longitude).sum::<f64>() / n;
    Some(Coordinate::new(latitude, longitude))
}

/// Writes one row per cluster: `cluster,count` followed by the anchor's
/// original record
fn write_clusters_to_csv(
    output_file: &PathBuf,
    items: &ItemSet<usize>,
    csv_records: &[Vec<String>],
    clusters: &[Cluster],
) -> Result<(), Box<dyn std::error::Error>> {
    let out_file = File::create(output_file)?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(out_file);

    if has_header(csv_records) {
        let mut header = vec!["cluster".to_string(), "count".to_string()];
        header.extend(csv_records[0].iter().cloned());
        writer.write_record(&header)?;
    }

    for cluster in clusters {
        let Some(record) = cluster
            .anchor()
            .and_then(|i| items.get(i))
            .and_then(|item| csv_records.get(item.payload))
        else {
            continue;
        };

        let mut row = vec![cluster.id.to_string(), cluster.len().to_string()];
        row.extend(record.iter().cloned());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes clusters to stdout as a simple list
///
/// Format: `latitude,longitude,count` (one cluster per line), located where
/// the cluster's marker is drawn
fn write_clusters_to_stdout(clusters: &[Cluster]) -> std::io::Result<()> {
    write_cluster_rows(&mut std::io::stdout().lock(), clusters)
}

fn write_cluster_rows<W: Write>(out: &mut W, clusters: &[Cluster]) -> std::io::Result<()> {
    for cluster in clusters {
        writeln!(
            out,
            "{},{},{}",
            cluster.location.latitude,
            cluster.location.longitude,
            cluster.len()
        )?;
    }
    out.flush()
}
