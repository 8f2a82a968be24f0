//! Command line front end for meteoforge.
//!
//! Validates locations, converts units, inspects configured models and
//! runs fetches against payload files.

mod commands;
mod downloader;
mod registry;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use registry::Settings;

#[derive(Parser, Debug)]
#[command(name = "meteoforge")]
#[command(about = "Meteorological model registry, unit harmonization and location checks")]
struct Args {
    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Configuration directory (contains providers/*.yaml)
    #[arg(long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Parameter catalog file (default: built-in ECCODES entries)
    #[arg(long, env = "CATALOG_FILE")]
    catalog_file: Option<PathBuf>,

    /// Directory with `{provider}/{model}.json` payload files
    #[arg(long, env = "PAYLOAD_DIR", default_value = "payloads")]
    payload_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a coordinate pair in a coordinate reference system
    Location {
        /// First axis value (latitude for EPSG:4326)
        #[arg(allow_hyphen_values = true)]
        x: String,
        /// Second axis value
        #[arg(allow_hyphen_values = true)]
        y: String,
        #[arg(long, default_value = "EPSG:4326")]
        crs: String,
    },

    /// List the supported coordinate reference systems
    Crs,

    /// Convert values between units, e.g. `convert --from degC --to K 20 25`
    Convert {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
    },

    /// Convert values of a catalog parameter between unit systems
    Harmonize {
        /// Catalog short name, e.g. 2t
        #[arg(long)]
        parameter: String,
        #[arg(long, default_value = "si")]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
    },

    /// Show the parameter catalog
    Catalog,

    /// Inspect configured models
    Models {
        #[command(subcommand)]
        command: ModelsCommand,
    },

    /// Check whether a location lies in a model's allowed area
    Area {
        /// Model path as `provider/model`
        model: String,
        #[arg(allow_hyphen_values = true)]
        x: String,
        #[arg(allow_hyphen_values = true)]
        y: String,
        #[arg(long, default_value = "EPSG:4326")]
        crs: String,
    },

    /// Fetch harmonized data from a model
    Fetch(commands::FetchArgs),
}

#[derive(Subcommand, Debug)]
enum ModelsCommand {
    /// List every configured model
    List,
    /// Describe one model
    Describe {
        /// Model path as `provider/model`
        model: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let settings = Settings {
        config_dir: args.config_dir,
        catalog_file: args.catalog_file,
        payload_dir: args.payload_dir,
    };
    debug!(?settings, "Starting meteoforge");

    let output = match args.command {
        Command::Location { x, y, crs } => commands::validate_location(&x, &y, &crs)?,
        Command::Crs => commands::list_crs(),
        Command::Convert { from, to, values } => commands::convert(&from, &to, &values)?,
        Command::Harmonize {
            parameter,
            from,
            to,
            values,
        } => commands::harmonize(&settings, &parameter, &from, &to, &values)?,
        Command::Catalog => commands::show_catalog(&settings)?,
        Command::Models { command } => match command {
            ModelsCommand::List => commands::list_models(&settings)?,
            ModelsCommand::Describe { model } => commands::describe_model(&settings, &model)?,
        },
        Command::Area { model, x, y, crs } => commands::check_area(&settings, &model, &x, &y, &crs)?,
        Command::Fetch(fetch) => commands::fetch(&settings, fetch).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
