//! Pycograph CLI - load a Python project's object graph into a graph store

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use pycograph::config::{self, Settings};
use pycograph::ui::{self, Spinner};
use pycograph::{GraphDocument, SqliteStore, parse_project};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "pycograph")]
#[command(version)]
#[command(about = "Build a graph of the objects of a Python project and their relationships")]
#[command(long_about = r#"
Pycograph parses a Python project without running it and stores its
packages, modules, classes, functions and constants as nodes, connected by
contains, imports and calls edges.

Example usage:
  pycograph load --project-dir ./my_project
  pycograph load --graph-name demo --overwrite --test-types
  pycograph export --output graph.json
  pycograph stats --graph-name demo
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a project and store its graph in the database
    Load {
        /// Project directory (defaults to the current directory)
        #[arg(short, long)]
        project_dir: Option<String>,

        /// Graph name (defaults to the project directory's name)
        #[arg(short, long)]
        graph_name: Option<String>,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Replace an existing graph of the same name
        #[arg(long)]
        overwrite: bool,

        /// Record the test type of test objects
        #[arg(long)]
        test_types: bool,

        /// Additional gitignore-style pattern to skip (repeatable)
        #[arg(long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,

        /// Path to the config file (defaults to pycograph.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Parse a project and write its graph as JSON
    Export {
        /// Project directory (defaults to the current directory)
        #[arg(short, long)]
        project_dir: Option<String>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Record the test type of test objects
        #[arg(long)]
        test_types: bool,

        /// Path to the config file (defaults to pycograph.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show node and edge counts of stored graphs
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Only this graph
        #[arg(short, long)]
        graph_name: Option<String>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Load {
            project_dir,
            graph_name,
            database,
            overwrite,
            test_types,
            exclude,
            format,
            config: config_path,
        } => {
            let file = config::load_config(config_path.as_deref())?.unwrap_or_default();
            let project_dir =
                config::resolve_project_dir(project_dir.as_deref().or(file.project_dir.as_deref()))?;
            let graph_name =
                config::resolve_graph_name(graph_name.as_deref().or(file.graph_name.as_deref()), &project_dir);
            let database = database
                .or_else(|| file.database.as_ref().map(PathBuf::from))
                .unwrap_or_else(config::default_database_path);
            let overwrite = overwrite || file.overwrite.unwrap_or(false);
            let settings = merge_settings(file.analysis, test_types, exclude);

            let spinner = Spinner::new(&format!("Parsing {}", project_dir.display()));
            let result = parse_project(&project_dir, settings)
                .with_context(|| format!("Failed to parse project {}", project_dir.display()))?;
            debug!("{}", result.stats);
            let document = GraphDocument::from_parse_result(&result);

            spinner.set_message(&format!("Populating graph {}", graph_name));
            config::ensure_db_dir(&database)?;
            let mut store = SqliteStore::open(&database)?;
            let summary = store.populate(&graph_name, &document, overwrite)?;
            let elapsed = spinner.finish();

            match format {
                OutputFormat::Human => {
                    ui::graph_updated(&summary);
                    ui::summary_row("database", &database.display().to_string());
                    ui::timing(&elapsed);
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
            }
        }

        Commands::Export {
            project_dir,
            output,
            test_types,
            config: config_path,
        } => {
            let file = config::load_config(config_path.as_deref())?.unwrap_or_default();
            let project_dir =
                config::resolve_project_dir(project_dir.as_deref().or(file.project_dir.as_deref()))?;
            let settings = merge_settings(file.analysis, test_types, Vec::new());

            let result = parse_project(&project_dir, settings)
                .with_context(|| format!("Failed to parse project {}", project_dir.display()))?;
            let json = GraphDocument::from_parse_result(&result).to_json_pretty()?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    ui::success(&format!("Graph written to {}", path.display()));
                }
                None => println!("{}", json),
            }
        }

        Commands::Stats {
            database,
            graph_name,
        } => {
            let database = database.unwrap_or_else(config::default_database_path);
            show_stats(&database, graph_name.as_deref())?;
        }
    }

    Ok(())
}

/// Command line flags on top of the `[analysis]` table of the config file
fn merge_settings(file: Option<Settings>, test_types: bool, exclude: Vec<String>) -> Settings {
    let mut settings = file.unwrap_or_default();
    settings.determine_test_types |= test_types;
    settings.exclude.extend(exclude);
    settings
}

fn show_stats(database: &Path, graph_name: Option<&str>) -> anyhow::Result<()> {
    if !database.exists() {
        bail!("Database {} does not exist", database.display());
    }
    let store = SqliteStore::open(database)?;

    let names = match graph_name {
        Some(name) => vec![name.to_string()],
        None => store.graph_names()?,
    };
    if names.is_empty() {
        ui::warn("No graphs stored");
        return Ok(());
    }

    ui::header(&format!("Graphs in {}", database.display()));
    for name in names {
        let Some(stats) = store.stats(&name)? else {
            bail!("Graph {} not found", name);
        };
        ui::section(&stats.graph_name);
        ui::info("nodes", &stats.total_nodes().to_string());
        println!("{}", ui::count_table(&stats.nodes_by_label));
        ui::info("edges", &stats.total_edges().to_string());
        println!("{}", ui::count_table(&stats.edges_by_relation));
    }
    Ok(())
}
