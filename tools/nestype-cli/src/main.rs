use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use nestype::{expand_paths, Flattener, NestedType, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "nestype")]
#[command(about = "Inspect the structure of nested JSON documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema derived from a document.
    Schema { file: PathBuf },

    /// Print the leaves of a document, depth-first, as a JSON array.
    Leaves { file: PathBuf },

    /// Print one `path = value` line per leaf.
    Flatten {
        file: PathBuf,

        /// Walk shared sub-objects every time instead of reporting repeats
        #[arg(long, default_value_t = false)]
        keep_repeats: bool,
    },

    /// Check that a document has the same type as a sample.
    Check {
        #[arg(long)]
        sample: PathBuf,

        file: PathBuf,
    },

    /// Rebuild a document shaped like a sample from a JSON array of leaves.
    Fill {
        #[arg(long)]
        sample: PathBuf,

        #[arg(long)]
        leaves: PathBuf,

        /// Accept leaves whose types differ from the sample's
        #[arg(long, default_value_t = false)]
        no_check_types: bool,
    },

    /// Expand a JSON object of path keys into a nested document.
    Expand { file: PathBuf },
}

fn read_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let json: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "read document");
    Ok(Value::from_json(&json)?)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&value.to_json())?);
    Ok(())
}

fn run(cmd: Commands) -> Result<ExitCode> {
    match cmd {
        Commands::Schema { file } => {
            let nested = NestedType::from_sample(&read_document(&file)?)?;
            println!("{}", nested.schema());
        }
        Commands::Leaves { file } => {
            let doc = read_document(&file)?;
            let nested = NestedType::from_sample(&doc)?;
            print_json(&Value::from(nested.leaves_of(&doc)?))?;
        }
        Commands::Flatten { file, keep_repeats } => {
            let doc = read_document(&file)?;
            let entries = Flattener::new().detect_repeats(!keep_repeats).flatten(&doc)?;
            for entry in entries {
                println!("{} = {}", entry.path_string(), entry.value);
            }
        }
        Commands::Check { sample, file } => {
            let nested = NestedType::from_sample(&read_document(&sample)?)?;
            if let Err(err) = nested.check(&read_document(&file)?) {
                eprintln!("{}", err);
                return Ok(ExitCode::FAILURE);
            }
            println!("ok");
        }
        Commands::Fill {
            sample,
            leaves,
            no_check_types,
        } => {
            let nested = NestedType::from_sample(&read_document(&sample)?)?;
            let leaves = match read_document(&leaves)? {
                Value::List(items) => items.as_ref().clone(),
                other => bail!("expected a JSON array of leaves, got {}", other.type_tag()),
            };
            print_json(&nested.fill(leaves, !no_check_types)?)?;
        }
        Commands::Expand { file } => {
            let text = std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            let json: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(&text).with_context(|| format!("parsing {}", file.display()))?;
            let mut entries = Vec::with_capacity(json.len());
            for (path, leaf) in &json {
                entries.push((path.as_str(), Value::from_json(leaf)?));
            }
            print_json(&expand_paths(entries)?)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nestype=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    run(cli.cmd)
}
