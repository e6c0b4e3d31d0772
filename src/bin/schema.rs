//! Schema Fragment CLI
//!
//! Prints the JSON-Schema fragment of one operation section and validates
//! data files against it.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use routedoc::validation::{coerce_scalars, media_type_essence};
use routedoc::{DocumentAssembler, FragmentValidator, MetadataCatalog, RoutedocConfig};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "routedoc-schema")]
#[command(about = "Extract and apply per-operation JSON-Schema fragments")]
struct Cli {
    /// Config file (defaults to routedoc.toml lookup)
    #[arg(short, long)]
    config: Option<String>,

    /// Catalog files or directories, added to the configured ones
    #[arg(short = 'C', long = "catalog")]
    catalogs: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List operation ids
    List,

    /// Print the fragment for one section of an operation
    Fragment(Target),

    /// Validate a JSON data file against a fragment
    Validate {
        #[command(flatten)]
        target: Target,

        /// JSON file holding the data to validate
        data: PathBuf,

        /// Convert string values to the scalar types the fragment asks for
        #[arg(long)]
        coerce: bool,
    },
}

#[derive(Args)]
struct Target {
    /// Operation id
    operation: String,

    /// Section of the operation
    #[arg(value_enum)]
    section: Section,

    /// Content type for body and response sections
    #[arg(long, default_value = "application/json")]
    content_type: String,

    /// Status code for the response section
    #[arg(long, default_value = "200")]
    status: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Section {
    Cookie,
    Header,
    Query,
    Body,
    Response,
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

fn fragment(assembler: &DocumentAssembler, target: &Target) -> anyhow::Result<Option<Value>> {
    let content_type = media_type_essence(&target.content_type);
    let fragment = match target.section {
        Section::Cookie => assembler.request_cookie_json_schema(&target.operation)?,
        Section::Header => assembler.request_header_json_schema(&target.operation)?,
        Section::Query => assembler.request_query_json_schema(&target.operation)?,
        Section::Body => assembler.request_body_json_schema(&target.operation, &content_type)?,
        Section::Response => {
            assembler.response_body_json_schema(&target.operation, &target.status, &content_type)?
        }
    };
    Ok(fragment)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = RoutedocConfig::load_from(cli.config.as_deref()).context("loading config")?;

    let mut paths = config.catalog_paths();
    paths.extend(cli.catalogs);
    if paths.is_empty() {
        bail!("no catalogs given; pass --catalog or set [catalog] paths");
    }

    let mut catalog = MetadataCatalog::new();
    catalog.load_paths(&paths).context("loading catalogs")?;
    let routes = catalog.routes().to_vec();

    let mut assembler = DocumentAssembler::from_config(&config, Arc::new(catalog));
    assembler.add_routes(routes);

    match cli.command {
        Commands::List => {
            for id in assembler.operation_ids()? {
                println!("{}", id);
            }
        }

        Commands::Fragment(target) => match fragment(&assembler, &target)? {
            Some(fragment) => println!("{}", serde_json::to_string_pretty(&fragment)?),
            None => eprintln!("⚠️  Nothing to validate for {}", target.operation),
        },

        Commands::Validate {
            target,
            data,
            coerce,
        } => {
            let Some(fragment) = fragment(&assembler, &target)? else {
                eprintln!("⚠️  Nothing to validate for {}", target.operation);
                return Ok(());
            };

            let content =
                fs::read_to_string(&data).with_context(|| format!("reading {}", data.display()))?;
            let mut instance: Value = serde_json::from_str(&content)?;
            if coerce {
                coerce_scalars(&fragment, &mut instance);
            }

            let report = FragmentValidator::new(&fragment)?.validate(&instance);
            if report.is_valid() {
                println!("✅ {} is valid", data.display());
            } else {
                println!("❌ {} failed validation:", data.display());
                print!("{}", report);
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
