use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use designmetrics::design::{loader, DesignGraph, DesignProvider, EntityKind};
use designmetrics::metrics::{sorted_by_name, Coupling};

#[derive(Parser)]
#[command(name = "designmetrics")]
#[command(version)]
#[command(about = "Object-oriented design metrics over a static design graph", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the efferent coupling (Ce) of design entities
    Ce {
        /// Design document (JSON) to analyze
        design: PathBuf,

        /// Qualified names to report (defaults to every entity of --kind)
        entities: Vec<String>,

        /// Entity kind reported when no names are given
        #[arg(short, long, default_value = "class")]
        kind: EntityKind,

        /// Emit JSON instead of tab-separated lines
        #[arg(long)]
        json: bool,
    },
    /// List the entities a design entity is coupled to
    Related {
        /// Design document (JSON) to analyze
        design: PathBuf,

        /// Qualified name of the entity
        entity: String,

        /// Only relations incident on the entity itself, not its members
        #[arg(short, long)]
        direct: bool,

        /// Emit JSON instead of one name per line
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct MetricRow<'a> {
    entity: &'a str,
    kind: EntityKind,
    metric: &'static str,
    value: usize,
}

#[derive(Serialize)]
struct RelatedRow<'a> {
    entity: &'a str,
    kind: EntityKind,
}

fn load(path: &Path) -> Result<DesignGraph> {
    loader::load_file(path).with_context(|| format!("Cannot load design {}", path.display()))
}

fn run_ce(design: &Path, names: &[String], kind: EntityKind, json: bool) -> Result<()> {
    let graph = load(design)?;
    let coupling = Coupling::new(&graph);

    let entities = if names.is_empty() {
        let mut entities = graph.entities_of_kind(kind);
        entities.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        entities
    } else {
        names
            .iter()
            .map(|name| graph.lookup(name))
            .collect::<Result<Vec<_>, _>>()?
    };

    let [metric] = coupling.metrics();
    let rows: Vec<MetricRow<'_>> = entities
        .iter()
        .map(|entity| MetricRow {
            entity: &entity.qualified_name,
            kind: entity.kind,
            metric: metric.abbreviation(),
            value: metric.calculate(Some(*entity)),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            println!("{}\t{}", row.entity, row.value);
        }
    }
    Ok(())
}

fn run_related(design: &Path, name: &str, direct: bool, json: bool) -> Result<()> {
    let graph = load(design)?;
    let coupling = Coupling::new(&graph);
    let entity = graph.lookup(name)?;

    let related = if direct {
        coupling.direct_related_entities(entity)
    } else {
        coupling.related_entities(entity)
    };
    let related = sorted_by_name(&related);

    if json {
        let rows: Vec<RelatedRow<'_>> = related
            .iter()
            .map(|e| RelatedRow {
                entity: &e.qualified_name,
                kind: e.kind,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for e in related {
            println!("{}\t{}", e.qualified_name, e.kind);
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (_, 0) => "warn",
        (_, 1) => "info",
        (_, 2) => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Ce {
            design,
            entities,
            kind,
            json,
        } => run_ce(design, entities, *kind, *json),
        Commands::Related {
            design,
            entity,
            direct,
            json,
        } => run_related(design, entity, *direct, *json),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
