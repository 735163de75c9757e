use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod report;

use gcsdest_core::{config, AvroFormatConfig};
use report::{CheckReport, FormatReport};

#[derive(Parser, Debug)]
#[command(name = "gcsdest")]
#[command(about = "Validate Avro-to-GCS destination configuration", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a destination config file and print the resolved settings
    Check {
        /// Destination config file (JSON, YAML or TOML)
        #[arg(long, env = "GCSDEST_CONFIG")]
        config: PathBuf,

        /// Object key used to derive the multipart upload settings
        /// (defaults to `<bucket_path>/check.<format extension>`)
        #[arg(long)]
        object_key: Option<String>,
    },

    /// Resolve an inline format block
    Format {
        /// Format block as JSON, e.g. '{"codec":"xz","part_size_mb":8}'
        #[arg(long)]
        json: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            config: path,
            object_key,
        } => {
            info!(path = %path.display(), "Checking destination configuration");

            let destination = config::load(&path).map_err(|e| {
                error!(error = %e, "Destination configuration rejected");
                e
            })?;
            let object_key =
                object_key.unwrap_or_else(|| report::default_object_key(&destination));
            let report = CheckReport::build(&destination, &object_key)?;

            info!(
                bucket = destination.bucket_name(),
                codec = %report.format.codec_factory,
                part_size_bytes = report.upload.part_size_bytes(),
                "Destination configuration is valid"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }

        Commands::Format { json } => {
            let document: serde_json::Value = serde_json::from_str(&json)?;
            let format = AvroFormatConfig::from_config(&document)?;

            println!(
                "{}",
                serde_json::to_string_pretty(&FormatReport::from(&format))?
            );
            Ok(())
        }
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
