//! Command-line interface.

use crosslist::config::CompareFileConfig;
use crosslist::data::load_csv;
use crosslist::error::Result;
use crosslist::pipeline::{self, InputPaths};
use crosslist::viz::{Renderer, SvgRenderer, TerminalRenderer};

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Compare a stock listed on two exchanges: rebased prices and log returns.
#[derive(Parser)]
#[command(name = "crosslist")]
#[command(version)]
#[command(about = "Compare a dual-listed stock across exchanges")]
#[command(long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, align and chart both listings (the default command)
    Run(RunArgs),

    /// Generate an example configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "crosslist.toml")]
        output: PathBuf,
    },

    /// Load a single price file and report what was read
    Validate {
        /// Path to CSV data file
        #[arg(short, long)]
        data: PathBuf,

        /// Date format tried before the built-in ones
        #[arg(long)]
        date_format: Option<String>,
    },
}

#[derive(clap::Args, Default)]
pub struct RunArgs {
    /// TOML configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Primary listing CSV (converted through FX)
    #[arg(long)]
    primary: Option<PathBuf>,

    /// Secondary listing CSV
    #[arg(long)]
    secondary: Option<PathBuf>,

    /// FX rate CSV
    #[arg(long, conflicts_with = "no_fx")]
    fx: Option<PathBuf>,

    /// Compare both listings in their own currencies
    #[arg(long)]
    no_fx: bool,

    /// Date format tried before the built-in ones
    #[arg(long)]
    date_format: Option<String>,

    /// Directory for SVG charts
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Where to draw the charts
    #[arg(short, long, value_enum, default_value = "both")]
    renderer: RendererArg,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default)]
pub enum RendererArg {
    /// SVG files in the output directory
    Svg,
    /// Sparklines and statistics on stdout
    Terminal,
    #[default]
    Both,
}

impl Cli {
    /// Initialize logging based on verbosity level.
    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };

        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging();

    match cli.command {
        None => run_compare(RunArgs::default()),
        Some(Commands::Run(args)) => run_compare(args),
        Some(Commands::Init { output }) => init_config(&output),
        Some(Commands::Validate { data, date_format }) => validate_data(&data, date_format),
    }
}

/// Merge the optional config file with command-line overrides.
fn resolve_config(args: &RunArgs) -> Result<CompareFileConfig> {
    let mut config = match &args.config {
        Some(path) => CompareFileConfig::load(path)?,
        None => CompareFileConfig::default(),
    };

    if let Some(primary) = &args.primary {
        config.inputs.primary = primary.clone();
    }
    if let Some(secondary) = &args.secondary {
        config.inputs.secondary = secondary.clone();
    }
    if let Some(fx) = &args.fx {
        config.inputs.fx = fx.clone();
        config.inputs.convert = true;
    }
    if args.no_fx {
        config.inputs.convert = false;
    }
    if let Some(fmt) = &args.date_format {
        config.inputs.date_format = Some(fmt.clone());
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

fn run_compare(args: RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let paths = InputPaths::from_config(&config);
    info!(
        "Comparing {} and {} (fx: {})",
        paths.primary.display(),
        paths.secondary.display(),
        paths
            .fx
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    let svg = SvgRenderer::new(&config.output.dir);
    let terminal = TerminalRenderer::default();
    let renderers: Vec<&dyn Renderer> = match args.renderer {
        RendererArg::Svg => vec![&svg as &dyn Renderer],
        RendererArg::Terminal => vec![&terminal as &dyn Renderer],
        RendererArg::Both => vec![&terminal as &dyn Renderer, &svg],
    };

    pipeline::run(&paths, &config.data_config(), &renderers)?;
    Ok(())
}

fn init_config(output: &PathBuf) -> Result<()> {
    fs::write(output, CompareFileConfig::example())?;
    println!("Created example configuration file: {}", output.display());
    println!("\nEdit this file to choose input files, then run:");
    println!("  crosslist run -c {}", output.display());
    Ok(())
}

fn validate_data(data_path: &PathBuf, date_format: Option<String>) -> Result<()> {
    let config = crosslist::data::DataConfig {
        date_format,
        ..Default::default()
    };
    let series = load_csv(data_path, &config)?;

    println!("Data file: {}", data_path.display());
    println!("  Prices:     {}", series.len());
    if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
        println!("  Date range: {} to {}", first, last);
    }
    let non_positive = series.iter().filter(|(_, p)| **p <= 0.0).count();
    if non_positive > 0 {
        println!("  Warning:    {} non-positive prices", non_positive);
    }
    println!("\nData validation passed.");
    Ok(())
}
