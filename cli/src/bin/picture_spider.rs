use clap::{Parser, Subcommand};
use cli::RunArgs;
use color_eyre::eyre::Result;
use spider::{GeoJsonSource, Pipeline, SpiderConfig};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Picture spider for WMS services", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and annotate one picture per feature from command-line arguments
    Run(RunArgs),
    /// Fetch and annotate pictures using a configuration file
    Process {
        /// Path to the TOML or JSON configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = args.into_config()?;
            run(config)?;
        }
        Commands::Process { config } => {
            process(&config)?;
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&SpiderConfig::schema())?);
        }
    }

    Ok(())
}

fn process(config_path: &Path) -> Result<()> {
    let config = SpiderConfig::from_file(config_path)?;
    info!(config = %config_path.display(), "loaded configuration");
    run(config)
}

fn run(config: SpiderConfig) -> Result<()> {
    let source = GeoJsonSource::open(&config.vector_path)?;
    let pipeline = Pipeline::builder(config).build()?;
    info!("{}", pipeline.info());

    let summary = pipeline.run(&source)?;
    info!("✅ Wrote {} pictures", summary.written.len());
    Ok(())
}
