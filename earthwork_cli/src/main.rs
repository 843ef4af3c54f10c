use std::process::ExitCode;

use clap::{Parser, Subcommand};
use earthwork::{
    curve::balance_level,
    dtm::Mesh,
    io::{curve_to_csv, read_surface, write_curve_csv, write_json},
    cut_fill, volume_above_datum, volume_curve, volume_curve_auto, DegeneratePolicy, LevelRange,
    Query, VolumeConfig, VolumeCurve, VolumeOptions,
};

/// Cut/fill earthwork volumes from survey surfaces.
///
/// Surfaces are read from LandXML (`.xml`) or from CSV files of `x,y,z`
/// points, which are triangulated on the XY plane.
#[derive(Parser)]
#[command(name = "earthwork_cli", version)]
struct Cli {
    /// JSON configuration file with the query and engine options
    #[arg(long, global = true)]
    config: Option<String>,
    /// Bulking factor applied to fill volumes
    #[arg(long, global = true)]
    swell_factor: Option<f64>,
    /// Handling of facets without a usable plane: skip or fail
    #[arg(long, global = true)]
    policy: Option<DegeneratePolicy>,
    /// Absolute elevation tolerance
    #[arg(long, global = true)]
    tolerance: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cut and fill against a single reference level.
    Volume {
        surface: String,
        #[arg(long, allow_negative_numbers = true)]
        level: Option<f64>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Cut and fill over a sweep of levels.
    ///
    /// Without `--min`/`--max` the sweep comes from the configuration, or
    /// spans the surface from its lowest to its highest point.
    Curve {
        surface: String,
        #[arg(long, allow_negative_numbers = true)]
        min: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        max: Option<f64>,
        #[arg(long)]
        step: Option<f64>,
        /// Output file; `.json` writes JSON, anything else CSV
        #[arg(long)]
        output: Option<String>,
        /// Print JSON instead of CSV when writing to stdout
        #[arg(long)]
        json: bool,
    },
    /// Net volume between the surface and a datum elevation.
    DatumVolume {
        surface: String,
        #[arg(long, allow_negative_numbers = true)]
        datum: f64,
    },
    /// Level at which cut balances swelled fill.
    Balance {
        surface: String,
        #[arg(long, default_value_t = 0.1)]
        step: f64,
    },
    /// Write a configuration file with the current options.
    WriteConfig { output: String },
}

fn load_config(path: Option<&str>) -> Result<VolumeConfig, String> {
    match path {
        Some(path) => {
            VolumeConfig::load(path).map_err(|e| format!("Error reading {}: {}", path, e))
        }
        None => Ok(VolumeConfig::default()),
    }
}

/// Applies command line overrides on top of the loaded configuration.
fn apply_overrides(cli: &Cli, mut config: VolumeConfig) -> VolumeConfig {
    if let Some(swell_factor) = cli.swell_factor {
        config.swell_factor = swell_factor;
    }
    if let Some(policy) = cli.policy {
        config.degenerate_policy = policy;
    }
    if let Some(tolerance) = cli.tolerance {
        config.tolerance = tolerance;
    }
    config
}

fn load_mesh(path: &str) -> Result<Mesh, String> {
    let tin = read_surface(path).map_err(|e| format!("Error reading {}: {}", path, e))?;
    let mesh = tin.to_mesh().map_err(|e| format!("Error reading {}: {}", path, e))?;
    log::info!("{}: {} facets", path, mesh.len());
    Ok(mesh)
}

fn print_curve(curve: &VolumeCurve, output: Option<&str>, json: bool) -> Result<(), String> {
    match output {
        Some(path) => {
            let written = if path.to_ascii_lowercase().ends_with(".json") {
                write_json(path, curve)
            } else {
                write_curve_csv(path, curve)
            };
            written.map_err(|e| format!("Error writing {}: {}", path, e))?;
            println!("Wrote {} levels to {}", curve.len(), path);
        }
        None if json => {
            let text = serde_json::to_string_pretty(curve).map_err(|e| format!("Error: {}", e))?;
            println!("{}", text);
        }
        None => print!("{}", curve_to_csv(curve)),
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = apply_overrides(cli, load_config(cli.config.as_deref())?);
    let options: VolumeOptions = config.options().map_err(|e| format!("Error: {}", e))?;
    log::debug!("{:?}", options);
    match &cli.command {
        Commands::Volume {
            surface,
            level,
            json,
        } => {
            let level = match (level, config.query()) {
                (Some(level), _) => *level,
                (None, Ok(Query::Single { level })) => level,
                (None, Ok(Query::Curve(_))) => {
                    return Err("Error: configuration describes a curve, pass --level".into())
                }
                (None, Err(e)) => return Err(format!("Error: {}", e)),
            };
            let mesh = load_mesh(surface)?;
            let report = cut_fill(&mesh, level, &options).map_err(|e| format!("Error: {}", e))?;
            if *json {
                let text =
                    serde_json::to_string_pretty(&report).map_err(|e| format!("Error: {}", e))?;
                println!("{}", text);
            } else {
                println!("Level: {:.3}", report.level);
                println!("Cut: {:.3}", report.result.cut);
                println!("Fill: {:.3}", report.result.fill);
                println!("Net: {:.3}", report.result.net);
                println!("Skipped facets: {}", report.skipped_count());
            }
        }
        Commands::Curve {
            surface,
            min,
            max,
            step,
            output,
            json,
        } => {
            let mesh = load_mesh(surface)?;
            let curve = match (min, max, step) {
                (Some(min), Some(max), Some(step)) => LevelRange::new(*min, *max, *step)
                    .and_then(|range| volume_curve(&mesh, &range, &options)),
                (None, None, step) => match (config.query(), step) {
                    (Ok(Query::Curve(range)), None) => volume_curve(&mesh, &range, &options),
                    (_, Some(step)) => volume_curve_auto(&mesh, *step, &options),
                    (_, None) => {
                        return Err("Error: pass --step or a configured level range".into())
                    }
                },
                _ => return Err("Error: --min and --max need --step and each other".into()),
            }
            .map_err(|e| format!("Error: {}", e))?;
            print_curve(&curve, output.as_deref(), *json)?;
        }
        Commands::DatumVolume { surface, datum } => {
            let mesh = load_mesh(surface)?;
            let volume =
                volume_above_datum(&mesh, *datum, &options).map_err(|e| format!("Error: {}", e))?;
            println!("Volume: {:.3}", volume);
        }
        Commands::Balance { surface, step } => {
            let mesh = load_mesh(surface)?;
            let curve =
                volume_curve_auto(&mesh, *step, &options).map_err(|e| format!("Error: {}", e))?;
            match balance_level(&curve) {
                Some(level) => println!("Balance level: {:.3}", level),
                None => println!("No balance level within the surface range"),
            }
        }
        Commands::WriteConfig { output } => {
            config
                .save(output)
                .map_err(|e| format!("Error writing {}: {}", output, e))?;
            println!("Wrote {}", output);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{}", msg);
            ExitCode::FAILURE
        }
    }
}
