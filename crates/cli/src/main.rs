//! hydrodiv CLI - watershed subdivision for hydrologic model assembly

mod io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geo::Coord;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use hydrodiv_algorithms::delineation::{
    delineate, extract_watershed, outlet_records, summarize, upstream_updown, ConnectivityParams,
    DelineationParams, GagedFlowlines, Linkage, OutletParams, OutletRecord, OutletSources, SubbasinSummary,
    SubdivideParams,
};
use hydrodiv_algorithms::geometry::{default_strategies, geodesic_distance_km, FlowlineIndex};
use hydrodiv_algorithms::overland::{
    flow_planes_from_samples, CatchmentGeometry, OverlandParams, SubbasinFlowPlane,
};
use hydrodiv_core::{Comid, DamRecord, FlowlineNode, FlowlineShape, GageRecord, Network};

use crate::io::{read_json, read_optional, write_json};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "hydrodiv")]
#[command(author, version, about = "Watershed subdivision into linked subbasins", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Subdivide a flowline network into linked subbasins
    Delineate {
        /// Flowline attribute records (JSON array)
        #[arg(long)]
        network: PathBuf,
        /// Flowline geometries used to place gages, dams and extra outlets
        #[arg(long)]
        flowlines: Option<PathBuf>,
        /// Stream gages
        #[arg(long)]
        gages: Option<PathBuf>,
        /// Dams
        #[arg(long)]
        dams: Option<PathBuf>,
        /// Extra outlet coordinates ({"x": lon, "y": lat})
        #[arg(long)]
        extras: Option<PathBuf>,
        /// Region code gages must carry
        #[arg(long)]
        huc: Option<String>,
        /// Year range gage records must overlap, as FIRST-LAST
        #[arg(long)]
        years: Option<String>,
        /// Largest drainage-area span per subbasin (km²)
        #[arg(short, long)]
        drainmax: Option<f64>,
        /// Bound every tributary joining the main channel
        #[arg(long)]
        force_junctions: bool,
        /// Precomputed flow planes to attach to the subbasin summaries
        #[arg(long)]
        flow_planes: Option<PathBuf>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Extract the watershed upstream of one flowline
    Extract {
        /// Flowline attribute records (JSON array)
        #[arg(long)]
        network: PathBuf,
        /// Outlet flowline
        #[arg(long)]
        comid: u64,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Subbasin overland flow planes from sampled catchments
    FlowPlanes {
        /// Catchments with elevation samples (JSON array)
        #[arg(long)]
        catchments: PathBuf,
        /// Subbasin membership: outlet comid → member comids
        #[arg(long)]
        subbasins: PathBuf,
        /// Separation (km) below which sample pairs are clamped
        #[arg(long, default_value = "0.1")]
        tolerance: f64,
        /// Slope assigned to clamped sample pairs
        #[arg(long, default_value = "0.00001")]
        min_slope: f64,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Geodesic distance between two points (km)
    #[command(allow_negative_numbers = true)]
    Distance {
        lon1: f64,
        lat1: f64,
        lon2: f64,
        lat2: f64,
    },
}

// ─── Output documents ───────────────────────────────────────────────────

#[derive(Serialize)]
struct DelineationReport {
    outlets: Vec<OutletRecord>,
    subbasins: Vec<SubbasinSummary>,
    membership: BTreeMap<Comid, Vec<Comid>>,
    linkage: BTreeMap<Comid, Linkage>,
    inlets: Vec<Comid>,
    headwaters: Vec<Comid>,
    exits: Vec<Comid>,
}

#[derive(Serialize)]
struct ExtractReport {
    outlet: Comid,
    updown: BTreeMap<Comid, Option<Comid>>,
    flowlines: Vec<FlowlineNode>,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")
}

pub(crate) fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_network(path: &PathBuf) -> Result<Network> {
    let records: Vec<FlowlineNode> = read_json(path, "network")?;
    let network = Network::from_records(records).context("Failed to build network")?;
    info!("Network: {} flowlines, {} inlets", network.len(), network.inlets().len());
    Ok(network)
}

fn done(name: &str, path: Option<&PathBuf>, elapsed: std::time::Duration) {
    match path {
        Some(path) => eprintln!("{} saved to: {}", name, path.display()),
        None => eprintln!("{} written to stdout", name),
    }
    eprintln!("  Processing time: {:.2?}", elapsed);
}

fn parse_years(s: &str) -> Result<(i32, i32)> {
    let (first, last) = s
        .split_once('-')
        .with_context(|| format!("Year range must be 'FIRST-LAST', got: {}", s))?;
    let first: i32 = first.trim().parse().context("Invalid first year")?;
    let last: i32 = last.trim().parse().context("Invalid last year")?;
    Ok((first, last))
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Delineate {
            network,
            flowlines,
            gages,
            dams,
            extras,
            huc,
            years,
            drainmax,
            force_junctions,
            flow_planes,
            out,
        } => {
            let network = read_network(&network)?;
            let shapes: Vec<FlowlineShape> = read_optional(flowlines.as_deref(), "flowlines")?;
            let sources = OutletSources {
                flowlines: FlowlineIndex::new(shapes),
                gages: read_optional::<Vec<GageRecord>>(gages.as_deref(), "gages")?,
                dams: read_optional::<Vec<DamRecord>>(dams.as_deref(), "dams")?,
                extras: read_optional::<Vec<Coord<f64>>>(extras.as_deref(), "extra outlets")?,
            };
            let planes: Vec<SubbasinFlowPlane> = read_optional(flow_planes.as_deref(), "flow planes")?;
            let params = DelineationParams {
                outlets: OutletParams {
                    huc,
                    years: years.as_deref().map(parse_years).transpose()?,
                },
                connectivity: ConnectivityParams {
                    force_junction_outlets: force_junctions,
                },
                subdivide: SubdivideParams { drainmax },
            };

            let start = Instant::now();
            let pb = spinner("Delineating subbasins...");
            let watershed = delineate(&network, &sources, &params).context("Failed to delineate")?;
            let gaged = GagedFlowlines::match_gages(&network, &sources);
            let outlets = outlet_records(&network, &watershed.outlets, &sources, &gaged)
                .context("Failed to build outlet records")?;
            let subbasins =
                summarize(&network, &watershed, &planes).context("Failed to summarize subbasins")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            let report = DelineationReport {
                outlets,
                subbasins,
                membership: watershed.membership(),
                linkage: watershed.linkage(),
                inlets: watershed.inlets(),
                headwaters: watershed.headwaters(),
                exits: watershed.exits(),
            };
            write_json(&report, out.as_deref())?;
            done("Watershed", out.as_ref(), elapsed);
        }

        Commands::Extract { network, comid, out } => {
            let network = read_network(&network)?;
            let start = Instant::now();
            let outlet = Comid(comid);
            let updown = upstream_updown(&network, outlet).context("Failed to extract watershed")?;
            let subset = extract_watershed(&network, outlet).context("Failed to extract watershed")?;
            let elapsed = start.elapsed();

            let report = ExtractReport {
                outlet,
                updown,
                flowlines: subset.iter().cloned().collect(),
            };
            write_json(&report, out.as_deref())?;
            done("Extracted watershed", out.as_ref(), elapsed);
        }

        Commands::FlowPlanes {
            catchments,
            subbasins,
            tolerance,
            min_slope,
            out,
        } => {
            let geometries: Vec<CatchmentGeometry> = read_json(&catchments, "catchments")?;
            let membership: BTreeMap<Comid, Vec<Comid>> = read_json(&subbasins, "subbasins")?;
            let params = OverlandParams {
                tolerance_km: tolerance,
                min_slope,
            };

            let start = Instant::now();
            let pb = spinner("Estimating flow planes...");
            let planes =
                flow_planes_from_samples(&membership, &geometries, &params, &default_strategies())
                    .context("Failed to estimate flow planes")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();
            info!("Flow planes: {} of {} subbasins", planes.len(), membership.len());

            write_json(&planes, out.as_deref())?;
            done("Flow planes", out.as_ref(), elapsed);
        }

        Commands::Distance {
            lon1,
            lat1,
            lon2,
            lat2,
        } => {
            let d = geodesic_distance_km(Coord { x: lon1, y: lat1 }, Coord { x: lon2, y: lat2 });
            println!("{:.6} km", d);
        }
    }

    Ok(())
}
