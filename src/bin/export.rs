//! Document Export CLI
//!
//! Loads metadata catalogs, assembles the OpenAPI document and writes it as
//! JSON or YAML.

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use routedoc::config::{ExportFormat, OutputStyle};
use routedoc::{DocumentAssembler, MetadataCatalog, RoutedocConfig};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "routedoc-export")]
#[command(about = "Assemble an OpenAPI document from route metadata catalogs")]
struct Cli {
    /// Config file (defaults to routedoc.toml lookup)
    #[arg(short, long)]
    config: Option<String>,

    /// Catalog files or directories, added to the configured ones
    #[arg(short = 'C', long = "catalog")]
    catalogs: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Compact JSON output
    #[arg(long)]
    compact: bool,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit empty operations for routes without operation metadata
    #[arg(long)]
    include_undescribed: bool,

    /// Fail on component name collisions
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = RoutedocConfig::load_from(cli.config.as_deref()).context("loading config")?;
    if cli.include_undescribed {
        config.assembly.include_undescribed_operations = true;
    }
    if cli.strict {
        config.assembly.strict_component_names = true;
    }
    match cli.format {
        Some(Format::Json) => config.export.format = ExportFormat::Json,
        Some(Format::Yaml) => config.export.format = ExportFormat::Yaml,
        None => {}
    }
    if cli.compact {
        config.export.style = OutputStyle::Compact;
    }

    let mut paths = config.catalog_paths();
    paths.extend(cli.catalogs);
    if paths.is_empty() {
        bail!("no catalogs given; pass --catalog or set [catalog] paths");
    }

    let mut catalog = MetadataCatalog::new();
    catalog.load_paths(&paths).context("loading catalogs")?;
    let routes = catalog.routes().to_vec();
    eprintln!("📂 Loaded {} routes from {} catalog path(s)", routes.len(), paths.len());

    let mut assembler = DocumentAssembler::from_config(&config, Arc::new(catalog));
    assembler.add_routes(routes);

    let rendered = match (config.export.format, config.export.style) {
        (ExportFormat::Yaml, _) => assembler.to_yaml()?,
        (ExportFormat::Json, OutputStyle::Pretty) => assembler.to_json()?,
        (ExportFormat::Json, OutputStyle::Compact) => assembler.to_json_compact()?,
    };

    match cli.output {
        Some(path) => {
            fs::write(&path, &rendered).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("✅ Wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
