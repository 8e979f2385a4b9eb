//! subway CLI: manage stations, lines, and the sections that connect them.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use subway_core::Distance;
use subway_store::{FileStore, StoreError};
use tracing_subscriber::EnvFilter;

use commands::line::OutputFormat;
use manifest::SubwayManifest;

/// Overrides every other log filter source.
const LOG_ENV: &str = "SUBWAY_LOG";

#[derive(Parser)]
#[command(name = "subway", version, about = "Subway line topology manager")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new network project
    Init {
        /// Project name
        name: String,
    },
    /// Manage stations
    Station {
        #[command(subcommand)]
        action: StationAction,
    },
    /// Manage lines
    Line {
        #[command(subcommand)]
        action: LineAction,
    },
    /// Change the sections of a line
    Section {
        #[command(subcommand)]
        action: SectionAction,
    },
}

#[derive(Subcommand)]
enum StationAction {
    /// Register a station
    Add {
        /// Station name
        name: String,
    },
    /// List stations
    List,
    /// Delete a station that is on no line
    Remove {
        /// Station ID
        id: u64,
    },
}

#[derive(Subcommand)]
enum LineAction {
    /// Create a line with its first section
    Create {
        /// Line name
        name: String,
        #[arg(long)]
        color: String,
        /// Up station ID of the first section
        #[arg(long)]
        up: u64,
        /// Down station ID of the first section
        #[arg(long)]
        down: u64,
        #[arg(long)]
        distance: Distance,
    },
    /// List lines
    List,
    /// Show a line's stations in travel order
    Show {
        /// Line ID
        id: u64,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Rename or recolor a line
    Update {
        /// Line ID
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a line and all its sections
    Remove {
        /// Line ID
        id: u64,
    },
}

#[derive(Subcommand)]
enum SectionAction {
    /// Insert a section, splitting or extending the line
    Add {
        /// Line ID
        line: u64,
        #[arg(long)]
        up: u64,
        #[arg(long)]
        down: u64,
        #[arg(long)]
        distance: Distance,
    },
    /// Take a station off a line
    Remove {
        /// Line ID
        line: u64,
        /// Station ID
        #[arg(long)]
        station: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(exit_code(&e));
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let found = SubwayManifest::find_and_load(&cwd)?;

    let env = std::env::var(LOG_ENV).ok();
    let manifest_level = found.as_ref().and_then(|(m, _)| m.log_level());
    init_logging(&filter_directive(env.as_deref(), cli.verbose, manifest_level));

    match cli.command {
        Commands::Init { name } => commands::init::run(&name),

        Commands::Station { action } => {
            let store = open_store(found, &cwd)?;
            match action {
                StationAction::Add { name } => commands::station::add(&store, &name),
                StationAction::List => commands::station::list(&store),
                StationAction::Remove { id } => commands::station::remove(&store, id),
            }
        }

        Commands::Line { action } => {
            let store = open_store(found, &cwd)?;
            match action {
                LineAction::Create {
                    name,
                    color,
                    up,
                    down,
                    distance,
                } => commands::line::create(&store, &name, &color, up, down, distance),
                LineAction::List => commands::line::list(&store),
                LineAction::Show { id, format } => commands::line::show(&store, id, format),
                LineAction::Update { id, name, color } => {
                    commands::line::update(&store, id, name.as_deref(), color.as_deref())
                }
                LineAction::Remove { id } => commands::line::remove(&store, id),
            }
        }

        Commands::Section { action } => {
            let store = open_store(found, &cwd)?;
            match action {
                SectionAction::Add {
                    line,
                    up,
                    down,
                    distance,
                } => commands::section::add(&store, line, up, down, distance),
                SectionAction::Remove { line, station } => {
                    commands::section::remove(&store, line, station)
                }
            }
        }
    }
}

/// Resolve the store of the enclosing project, failing if there is none.
fn open_store(
    found: Option<(SubwayManifest, PathBuf)>,
    cwd: &Path,
) -> anyhow::Result<FileStore> {
    match found {
        Some((manifest, dir)) => {
            let path = manifest.store_path(&dir);
            tracing::debug!(network = %manifest.network.name, store = %path.display(), "opening store");
            Ok(FileStore::new(path))
        }
        None => anyhow::bail!(
            "no subway.toml found in {} or its parents (run `subway init` first)",
            cwd.display()
        ),
    }
}

/// Filter precedence: `SUBWAY_LOG`, then `-v` flags, then the manifest, then `warn`.
fn filter_directive(env: Option<&str>, verbose: u8, manifest: Option<&str>) -> String {
    if let Some(env) = env.filter(|e| !e.trim().is_empty()) {
        return env.to_string();
    }
    match verbose {
        0 => manifest.unwrap_or("warn").to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn init_logging(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("warning: invalid log filter '{directive}': {e}");
        EnvFilter::new("warn")
    });
    // Also routes `log` records from the library crates.
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("warning: logging disabled: {e}");
    }
}

/// 2 for errors the caller can fix, 3 for corrupted stored state, 1 otherwise.
fn exit_code(e: &anyhow::Error) -> i32 {
    match e.chain().find_map(|c| c.downcast_ref::<StoreError>()) {
        Some(err) if err.is_client_error() => 2,
        Some(err) if err.is_corruption() => 3,
        _ => 1,
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use anyhow::Context;
    use subway_core::{LineId, StationId, TopologyError, ValidationError};

    fn project(dir: &Path, name: &str) -> (PathBuf, FileStore) {
        let project_path = dir.join(name);
        commands::init::create_project(&project_path, name).unwrap();
        let found = SubwayManifest::find_and_load(&project_path).unwrap();
        let store = open_store(found, &project_path).unwrap();
        (project_path, store)
    }

    /// Full workflow: init → stations → line → sections → show → teardown.
    #[test]
    fn init_build_line_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let (_, store) = project(dir.path(), "metro");

        for name in ["Gangnam", "Yeoksam", "Seolleung", "Samseong"] {
            commands::station::add(&store, name).unwrap();
        }
        commands::line::create(&store, "Line 2", "green", 1, 2, 10).unwrap();
        commands::section::add(&store, 1, 2, 4, 6).unwrap();
        commands::section::add(&store, 1, 2, 3, 2).unwrap();
        commands::line::show(&store, 1, OutputFormat::Json).unwrap();

        let line = store.read(|svc| svc.load_line(LineId(1))).unwrap();
        assert_eq!(
            commands::line::path_string(&line),
            "Gangnam -(10)-> Yeoksam -(2)-> Seolleung -(4)-> Samseong"
        );

        commands::section::remove(&store, 1, 3).unwrap();
        let line = store.read(|svc| svc.load_line(LineId(1))).unwrap();
        assert_eq!(line.sections().total_distance(), 16);

        // Still on the line.
        let err = commands::station::remove(&store, 2).unwrap_err();
        assert_eq!(exit_code(&err), 2);
        // Off every line now.
        commands::station::remove(&store, 3).unwrap();

        commands::line::remove(&store, 1).unwrap();
        commands::station::remove(&store, 2).unwrap();
    }

    /// Commands run from a nested directory find the project's store.
    #[test]
    fn nested_directory_finds_store() {
        let dir = tempfile::tempdir().unwrap();
        let (project_path, store) = project(dir.path(), "nested");
        commands::station::add(&store, "Gangnam").unwrap();

        let nested = project_path.join("docs").join("maps");
        std::fs::create_dir_all(&nested).unwrap();
        let found = SubwayManifest::find_and_load(&nested).unwrap();
        let store = open_store(found, &nested).unwrap();
        assert_eq!(store.read(|svc| svc.stations()).unwrap().len(), 1);
    }

    #[test]
    fn missing_manifest_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_store(None, dir.path()).unwrap_err();
        assert!(err.to_string().contains("subway init"));
    }

    #[test]
    fn exit_codes() {
        let client: anyhow::Error = StoreError::StationNotFound(StationId(1)).into();
        assert_eq!(exit_code(&client), 2);

        let validation: anyhow::Error =
            StoreError::from(ValidationError::NonPositiveDistance).into();
        assert_eq!(exit_code(&validation), 2);

        let corrupt: anyhow::Error = StoreError::from(TopologyError::Cycle(StationId(1))).into();
        assert_eq!(exit_code(&corrupt), 3);

        let wrapped = Err::<(), _>(StoreError::InvalidMagic)
            .context("loading network")
            .unwrap_err();
        assert_eq!(exit_code(&wrapped), 3);

        assert_eq!(exit_code(&anyhow::anyhow!("something else")), 1);
    }

    #[test]
    fn log_filter_precedence() {
        assert_eq!(filter_directive(Some("trace"), 1, Some("info")), "trace");
        assert_eq!(filter_directive(Some("  "), 1, Some("info")), "debug");
        assert_eq!(filter_directive(None, 2, None), "trace");
        assert_eq!(filter_directive(None, 0, Some("info")), "info");
        assert_eq!(filter_directive(None, 0, None), "warn");
    }

    #[test]
    fn logging_initializes_more_than_once() {
        init_logging("warn");
        init_logging("not a [valid filter");
        tracing::debug!("still usable after a repeated install");
    }

    #[test]
    fn cli_parses_commands() {
        let cli = Cli::try_parse_from([
            "subway", "-vv", "line", "show", "3", "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Line {
                action: LineAction::Show {
                    id: 3,
                    format: OutputFormat::Json
                }
            }
        ));

        let cli = Cli::try_parse_from(["subway", "section", "remove", "1", "--station", "2"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Section {
                action: SectionAction::Remove { line: 1, station: 2 }
            }
        ));

        assert!(Cli::try_parse_from(["subway", "line", "create", "L"]).is_err());
    }
}
