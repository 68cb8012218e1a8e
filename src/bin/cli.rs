//! Trellis CLI - inspect traversal graphs and run normalization from the shell.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use trellis::{Registry, Trellis, TrellisConfig};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Trellis CLI - Permission-filtered entity graphs", long_about = None)]
struct Cli {
    /// Path to the config file (default: ./trellis.toml)
    #[arg(short, long, default_value = "trellis.toml")]
    config: PathBuf,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the traversal graph as JSON
    Describe {
        /// Schema file (.toml, .yaml, .json)
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Show node and edge counts
    Stats {
        /// Schema file (.toml, .yaml, .json)
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Denormalize a JSON document into entities, then normalize it back
    Normalize {
        /// Schema file (.toml, .yaml, .json)
        #[arg(short, long)]
        schema: PathBuf,

        /// Entity type of the document root
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// Input JSON file (or - for stdin)
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Depth budget (default: from config, unbounded if unset)
        #[arg(short, long)]
        depth: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open(config_path: &Path, schema: &Path) -> Result<Trellis> {
    let config = TrellisConfig::load(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let registry = Registry::load(schema)
        .with_context(|| format!("loading schema {}", schema.display()))?;
    Ok(Trellis::from_config(registry, &config))
}

fn read_input(input: &str) -> Result<serde_json::Value> {
    let source = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input))?
    };
    serde_json::from_str(&source).context("parsing input JSON")
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Describe { schema } => {
            let trellis = open(&cli.config, &schema)?;
            let graph = trellis.graph()?;
            println!("{}", serde_json::to_string_pretty(&graph.describe())?);
        }

        Commands::Stats { schema } => {
            let trellis = open(&cli.config, &schema)?;
            let stats = trellis.graph()?.stats();

            println!("Traversal Graph");
            println!("───────────────");
            println!("Registered types: {}", trellis.registry().len());
            println!("Exposed nodes:    {}", stats.nodes);
            println!("Value edges:      {}", stats.value_edges);
            println!("Relation edges:   {}", stats.relation_edges);
            println!("Collection edges: {}", stats.collection_edges);
        }

        Commands::Normalize {
            schema,
            type_name,
            input,
            depth,
        } => {
            let trellis = open(&cli.config, &schema)?;
            let tree = read_input(&input)?;
            let entity = trellis
                .denormalize(&tree, &type_name)
                .with_context(|| format!("denormalizing input as {}", type_name))?;
            let depth = depth.or(trellis.default_depth());
            let output = trellis.normalize_with_depth(&entity, depth)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
