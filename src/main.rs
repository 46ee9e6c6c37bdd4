use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use signal_origin::catalog::{CatalogSnapshot, SnapshotSource};
use signal_origin::config::AppConfig;
use signal_origin::estimator::{self, LongitudeAnchor};
use signal_origin::geo::{AngularPosition, GeoPosition, RangeMeasurement};
use signal_origin::report::{render_text, EstimateReport};
use signal_origin::sidereal::{self, ObserverFrame};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// sigorigin — signal origin estimation from three reference satellites
///
/// Estimates where a signal came from, given the observer, the current
/// angular positions of three satellites and the range measured via each.
///
/// Examples:
///   sigorigin estimate --lat 34.7304 --lon -86.5861 --time 2024-01-30T12:00:00Z \
///       --ref 0.10,0.20 --ref 0.15,0.25 --ref 0.05,0.30 --range 5000 --range 6000 --range 7000
///   sigorigin catalog --offline
///   sigorigin catalog --select 25544U --select 48274U
///   sigorigin serve --port 8080
#[derive(Parser)]
#[command(name = "sigorigin", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.sigorigin/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG overrides).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate the signal origin.
    Estimate(EstimateArgs),
    /// List satellites in the element catalog.
    Catalog(CatalogArgs),
    /// Start the HTTP API.
    Serve(ServeArgs),
}

#[derive(Args)]
struct EstimateArgs {
    /// Observer latitude (-90 to 90).
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Observer longitude (-180 to 180).
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Observer elevation in meters.
    #[arg(long, allow_hyphen_values = true)]
    elev: Option<f64>,

    /// Observation time: RFC 3339, or "YYYY-MM-DD HH:MM:SS" read in --tz. Defaults to now.
    #[arg(long, short = 't')]
    time: Option<String>,

    /// IANA timezone for naive --time values (e.g. America/Chicago).
    #[arg(long)]
    tz: Option<String>,

    /// Local sidereal time in radians. Overrides --time.
    #[arg(long, allow_hyphen_values = true)]
    lst: Option<f64>,

    /// Reference direction "ra,dec" in radians. Give exactly three.
    #[arg(long = "ref", value_parser = parse_angular, allow_hyphen_values = true, required = true)]
    refs: Vec<AngularPosition>,

    /// Range measured via each reference, same order as --ref.
    #[arg(long = "range", allow_hyphen_values = true, required = true)]
    ranges: Vec<f64>,

    /// Degeneracy threshold on |denominator| (0 = exact zero only).
    #[arg(long)]
    epsilon: Option<f64>,

    /// Longitude anchor: "sidereal" (observer LST) or "pivot" (first reference).
    #[arg(long)]
    anchor: Option<LongitudeAnchor>,

    /// Print the JSON report to stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CatalogArgs {
    /// Element feed URL.
    #[arg(long)]
    url: Option<String>,

    /// Offline mode: only use the cached snapshot.
    #[arg(long)]
    offline: bool,

    /// Print full element sets for these catalog numbers.
    #[arg(long)]
    select: Vec<String>,
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, short = 'p', default_value_t = 3000)]
    port: u16,

    /// Serve the catalog from cache only.
    #[arg(long)]
    offline: bool,
}

fn parse_angular(s: &str) -> Result<AngularPosition, String> {
    let (ra, dec) = s
        .split_once(',')
        .ok_or_else(|| format!("Expected 'ra,dec', got '{}'", s))?;
    let ra: f64 = ra.trim().parse().map_err(|e| format!("Invalid ra '{}': {}", ra, e))?;
    let dec: f64 = dec.trim().parse().map_err(|e| format!("Invalid dec '{}': {}", dec, e))?;
    Ok(AngularPosition::new(ra, dec))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let config = loaded.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    debug!(?config, "configuration loaded");

    match cli.command {
        Command::Estimate(args) => run_estimate(&config, args),
        Command::Catalog(args) => run_catalog(config, args),
        Command::Serve(args) => run_serve(config, args),
    }
}

fn run_estimate(config: &AppConfig, args: EstimateArgs) {
    // ── Observer frame ──────────────────────────────────────────

    let mut position = GeoPosition::new(args.lat, args.lon);
    if let Some(elev) = args.elev {
        position = position.with_elevation(elev);
    }
    if !(-90.0..=90.0).contains(&args.lat) || !(-180.0..=180.0).contains(&args.lon) {
        eprintln!("Error: Invalid coordinates. Lat: -90..90, Lon: -180..180");
        std::process::exit(1);
    }

    let observer = match (args.lst, &args.time) {
        (Some(lst), _) => ObserverFrame::with_sidereal_time(position, lst),
        (None, Some(t)) => {
            let at = sidereal::parse_observation_time(t, args.tz.as_deref()).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });
            ObserverFrame::at(position, &at)
        }
        (None, None) => ObserverFrame::at(position, &Utc::now()),
    };

    eprintln!("  \u{1F4CD} Observer {}", observer.position());
    eprintln!("     LST {:.6} rad", observer.sidereal_time());

    // ── Solve ───────────────────────────────────────────────────

    let mut solver = config.solver();
    if let Some(eps) = args.epsilon {
        solver = solver.with_epsilon(eps);
    }
    if let Some(anchor) = args.anchor {
        solver = solver.with_anchor(anchor);
    }

    let ranges: Vec<RangeMeasurement> = args.ranges.iter().copied().map(RangeMeasurement::from).collect();
    let result = estimator::estimate_slices(&solver, &observer, &args.refs, &ranges);
    let report = EstimateReport::from(&result);

    eprint!("{}", render_text(&report));

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    if !report.is_ok() {
        std::process::exit(1);
    }
}

fn run_catalog(mut config: AppConfig, args: CatalogArgs) {
    if let Some(url) = args.url {
        config.catalog_url = url;
    }
    config.offline |= args.offline;

    let mut resolver = config.catalog_resolver();
    let snapshot = resolver.current_snapshot().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    eprintln!("  {} satellites ({})", snapshot.len(), snapshot.origin);

    if args.select.is_empty() {
        print_listing(&snapshot);
        return;
    }

    let records = snapshot.select(&args.select).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    print!("{}", signal_origin::catalog::tle::to_feed(&records));
}

fn print_listing(snapshot: &CatalogSnapshot) {
    for (i, (name, catno)) in snapshot.listing().into_iter().enumerate() {
        println!("{}. {} - Catalog Number: {}", i + 1, name, catno);
    }
}

fn run_serve(mut config: AppConfig, args: ServeArgs) {
    config.offline |= args.offline;

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Error: Cannot start runtime: {}", e);
        std::process::exit(1);
    });
    runtime.block_on(signal_origin::server::start(config, &args.host, args.port));
}
