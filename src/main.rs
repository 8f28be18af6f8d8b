use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use depmap::config::{Config, OutputFormat};
use depmap::core::ProjectAnalyzer;
use depmap::formatters::{DotFormatter, JsonReportFormatter};
use depmap::parsers::cache::ParseCache;

const REPORT_FILE_NAME: &str = "analysis.json";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "depmap",
    version,
    about = "Static dependency mapper for Python projects"
)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    /// Output format, overrides `output_format` from the configuration
    #[arg(short, long, value_name = "FORMAT", value_enum)]
    format: Option<FormatArg>,

    /// Output directory, overrides `output_directory` from the configuration
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Disable the parse cache
    #[arg(long)]
    no_cache: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum FormatArg {
    Json,
    Dot,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Dot => OutputFormat::Dot,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let start_time = Instant::now();

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;
    if let Some(format) = cli.format {
        config.output_format = format.into();
    }
    if let Some(output) = cli.output {
        config.output_directory = output;
    }

    info!("root: {}", config.root_directory.display());
    info!("output: {}", config.output_directory.display());
    info!("format: {}", config.output_format.as_str());

    let mut analyzer = ProjectAnalyzer::new(&config)?;
    if !cli.no_cache {
        let cache = ParseCache::new(config.cache_directory.clone()).unwrap_or_else(|err| {
            warn!("failed to initialize parse cache: {err}");
            ParseCache::in_memory_only()
        });
        analyzer = analyzer.with_cache(cache);
    }

    let result = analyzer.analyze()?;
    info!(
        "analysis completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    fs::create_dir_all(&config.output_directory).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_directory.display()
        )
    })?;

    let written = match config.output_format {
        OutputFormat::Json => {
            let path = config.output_directory.join(REPORT_FILE_NAME);
            JsonReportFormatter::new().format_to_file(&result, &path)?;
            vec![path]
        }
        OutputFormat::Dot => {
            DotFormatter::new(config.graph.clone()).write_outputs(&result, &config)?
        }
    };

    let function_count: usize = result.files.values().map(|file| file.functions.len()).sum();
    println!("Files analyzed: {}", result.files.len());
    println!("Classes found: {}", result.classes.len());
    println!("Functions found: {}", function_count);
    println!("Dependency edges: {}", result.edge_count());
    println!("External libraries: {}", result.external_libraries.len());
    for (library, count) in result.external_libraries.iter().take(10) {
        println!("  {library}: {count}");
    }
    if !result.warnings.is_empty() {
        println!("Skipped files: {}", result.warnings.len());
        for warning in &result.warnings {
            println!("  {}: {}", warning.path, warning.message);
        }
    }
    for path in written {
        println!("Generated {}", path.display());
    }
    println!(
        "Total execution time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
