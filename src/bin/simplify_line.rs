extern crate clap;

use std::fmt;
use std::path::PathBuf;

use clap::Parser;
use error_stack::{Report, Result, ResultExt};
use log::info;

use linesimp::config::SimplifyConfig;
use linesimp::douglas_peucker::simplify;
use linesimp::export::{write_esri_json, write_geojson, write_vertex_csv, SimplifySummary};
use linesimp::polyline_io::{read_polyline, InputFormat};

#[derive(Parser)]
#[clap(version, about = "Simplify a polyline with the Douglas-Peucker algorithm")]
struct Opts {
    /// Path to the Esri JSON or GeoJSON file holding the line
    input: PathBuf,

    /// Maximum deviation of a dropped point, in input coordinate units [default: 50]
    #[clap(short, long)]
    epsilon: Option<f64>,

    /// Index of the feature to read
    #[clap(long)]
    feature: Option<usize>,

    /// Index of the path (or MultiLineString part) to read
    #[clap(long)]
    path: Option<usize>,

    /// Input format, detected from the document when omitted
    #[clap(long, value_enum)]
    format: Option<InputFormat>,

    /// JSON config file; flags given on the command line take precedence
    #[clap(long)]
    config: Option<PathBuf>,

    /// Where to write the simplified line
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Format of the written line, same as the input when omitted
    #[clap(long, value_enum)]
    output_format: Option<InputFormat>,

    /// Write input and output vertices to this CSV file
    #[clap(long)]
    csv: Option<PathBuf>,
}

#[derive(Debug)]
struct RunError;

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("line simplification failed")
    }
}

impl std::error::Error for RunError {}

fn resolve_config(opts: &Opts) -> Result<SimplifyConfig, RunError> {
    let mut config = match &opts.config {
        Some(path) => SimplifyConfig::read(path).change_context(RunError)?,
        None => SimplifyConfig::default(),
    };

    if let Some(epsilon) = opts.epsilon {
        config.epsilon = epsilon;
    }
    if let Some(feature) = opts.feature {
        config.feature = feature;
    }
    if let Some(path) = opts.path {
        config.path = path;
    }
    if opts.format.is_some() {
        config.format = opts.format;
    }

    config.validate().change_context(RunError)?;
    Ok(config)
}

fn run(opts: &Opts) -> Result<(), RunError> {
    let config = resolve_config(opts)?;

    let line = read_polyline(&opts.input, config.format, config.selector())
        .change_context(RunError)?;
    let simplified = simplify(&line.points, config.epsilon)
        .change_context(RunError)
        .attach_printable_lazy(|| format!("file: {}", opts.input.display()))?;

    let summary = SimplifySummary::new(config.epsilon, &line.points, &simplified);
    info!(
        "epsilon {}: kept {} of {} points ({:.1}% removed)",
        summary.epsilon,
        summary.output_points,
        summary.input_points,
        summary.reduction() * 100.0
    );

    if let Some(output) = &opts.output {
        let written = match opts.output_format.unwrap_or(line.format) {
            InputFormat::GeoJson => write_geojson(output, &simplified, &summary),
            InputFormat::EsriJson => {
                write_esri_json(output, &simplified, line.spatial_reference.as_ref())
            }
        };
        written.change_context(RunError)?;
    }

    if let Some(csv_path) = &opts.csv {
        write_vertex_csv(csv_path, &line.points, &simplified).change_context(RunError)?;
    }

    if opts.output.is_none() && opts.csv.is_none() {
        for p in &simplified {
            println!("{} {}", p.x, p.y);
        }
    }

    Ok(())
}

fn main() -> std::result::Result<(), Report<RunError>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts: Opts = Opts::parse();
    run(&opts)
}
