//! CLI entry point for the evacuation registry.
//!
//! Every invocation loads the stored snapshot (seeding the demonstration
//! data on first run), performs one command, and persists the result before
//! exiting.
//!
//! # Usage
//!
//! ```bash
//! evac [OPTIONS] <COMMAND>
//!
//! # Register a citizen and place them
//! evac citizen add C010 --name Dao --age 8 --health Healthy
//! evac assign C010 S003
//!
//! # Occupancy overview
//! evac status --format json
//!
//! # Bulk transfer
//! evac export shelters --output shelters.csv
//! evac import shelters shelters.csv
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{WrapErr, eyre};
use evac_core::types::format_date;
use evac_core::{CollectionKind, Config, MirrorConfig, NewCitizen, NewShelter, Table, today};
use evac_engine::{AssignmentPolicy, RecordStore, Registry};
use evac_persist::{FileMirror, JsonFileGateway, PersistenceWorker, csv};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Evacuation registry: citizens, shelters, and who is placed where.
#[derive(Parser)]
#[command(name = "evac", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Snapshot file (overrides `storage.snapshot_path`).
    #[arg(short, long, global = true, env = "EVAC_DATA")]
    data: Option<Utf8PathBuf>,

    /// JSON configuration file.
    #[arg(short, long, global = true, env = "EVAC_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Mirror every collection as `<dir>/<kind>.csv`.
    #[arg(long, global = true)]
    mirror_dir: Option<Utf8PathBuf>,

    /// Keep changes in memory only.
    #[arg(long, global = true)]
    no_autosave: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Manage citizens.
    Citizen {
        #[command(subcommand)]
        action: CitizenCommand,
    },

    /// Manage shelters.
    Shelter {
        #[command(subcommand)]
        action: ShelterCommand,
    },

    /// Place a citizen in a shelter (or move them).
    Assign {
        /// Citizen id.
        citizen_id: String,

        /// Shelter id.
        shelter_id: String,

        /// Check-in date, `YYYY-MM-DD` (defaults to today).
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Check the rules without changing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove a citizen's assignment.
    Unassign {
        /// Citizen id.
        citizen_id: String,
    },

    /// Replace a collection with the rows of a CSV file.
    Import {
        /// `citizens`, `shelters`, or `assignments`.
        kind: CollectionKind,

        /// CSV file with a header row.
        file: Utf8PathBuf,
    },

    /// Write a collection as CSV.
    Export {
        /// `citizens`, `shelters`, or `assignments`.
        kind: CollectionKind,

        /// Output file (defaults to stdout).
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },

    /// Show collection sizes and shelter occupancy.
    Status {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = StatusFormat::Text)]
        format: StatusFormat,
    },

    /// Discard everything and restore the demonstration data.
    Reset,
}

#[derive(Subcommand)]
enum CitizenCommand {
    /// Register a citizen.
    Add(CitizenArgs),
    /// Remove a citizen and their assignment.
    Delete {
        /// Citizen id.
        id: String,
    },
    /// List citizens with their shelter.
    List,
}

#[derive(Args)]
struct CitizenArgs {
    /// Citizen id.
    id: String,
    #[arg(long, default_value = "")]
    name: String,
    /// Age in years; leave out if unknown.
    #[arg(long, default_value = "")]
    age: String,
    /// e.g. Healthy, Chronic, Injured, Disabled.
    #[arg(long, default_value = "")]
    health: String,
    /// `YYYY-MM-DD` (defaults to today).
    #[arg(long, default_value = "")]
    register_date: String,
    /// Group marker.
    #[arg(long = "type", default_value = "")]
    citizen_type: String,
}

impl From<CitizenArgs> for NewCitizen {
    fn from(args: CitizenArgs) -> Self {
        Self {
            citizen_id: args.id,
            name: args.name,
            age: args.age,
            health_status: args.health,
            register_date: args.register_date,
            citizen_type: args.citizen_type,
        }
    }
}

#[derive(Subcommand)]
enum ShelterCommand {
    /// Register a shelter.
    Add(ShelterArgs),
    /// Remove a shelter and every assignment to it.
    Delete {
        /// Shelter id.
        id: String,
    },
    /// List shelters with occupancy.
    List,
}

#[derive(Args)]
struct ShelterArgs {
    /// Shelter id.
    id: String,
    #[arg(long, default_value = "")]
    name: String,
    /// Number of places.
    #[arg(long, default_value = "")]
    capacity: String,
    /// e.g. Low, Medium.
    #[arg(long, default_value = "")]
    risk: String,
}

impl From<ShelterArgs> for NewShelter {
    fn from(args: ShelterArgs) -> Self {
        Self {
            shelter_id: args.id,
            name: args.name,
            capacity: args.capacity,
            risk_level: args.risk,
        }
    }
}

/// Status output format.
#[derive(Clone, Copy, ValueEnum)]
enum StatusFormat {
    /// Human-readable summary.
    Text,
    /// JSON document.
    Json,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects `RUST_LOG` if set. Otherwise uses `debug` with `--verbose` and
/// `info` by default. Logs go to stderr so command output stays clean.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(level)
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the optional config file and CLI overrides.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).wrap_err_with(|| format!("loading config {path}"))?,
        None => Config::default(),
    };

    if let Some(data) = &cli.data {
        config.storage.snapshot_path.clone_from(data);
    }
    if let Some(dir) = &cli.mirror_dir {
        config.storage.mirrors = MirrorConfig::in_directory(dir);
    }
    if cli.no_autosave {
        config.storage.autosave = false;
    }

    Ok(config)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs one command against the registry.
fn run_command(registry: &mut Registry, command: Commands) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Citizen { action } => match action {
            CitizenCommand::Add(args) => {
                let citizen = registry.add_citizen(args.into())?;
                writeln!(out, "Added citizen {}", citizen.citizen_id)?;
            }
            CitizenCommand::Delete { id } => {
                let cascaded = registry.delete_citizen(&id)?;
                writeln!(out, "Deleted citizen {} ({cascaded} assignment(s) removed)", id.trim())?;
            }
            CitizenCommand::List => write_table(&mut out, &citizen_listing(registry))?,
        },

        Commands::Shelter { action } => match action {
            ShelterCommand::Add(args) => {
                let shelter = registry.add_shelter(args.into())?;
                writeln!(out, "Added shelter {}", shelter.shelter_id)?;
            }
            ShelterCommand::Delete { id } => {
                let cascaded = registry.delete_shelter(&id)?;
                writeln!(out, "Deleted shelter {} ({cascaded} assignment(s) removed)", id.trim())?;
            }
            ShelterCommand::List => write_table(&mut out, &shelter_listing(registry))?,
        },

        Commands::Assign {
            citizen_id,
            shelter_id,
            date,
            dry_run,
        } => {
            if dry_run {
                let placement = registry.propose(&citizen_id, &shelter_id, date)?;
                writeln!(
                    out,
                    "{} may be placed in {}",
                    placement.citizen_id, placement.shelter_id
                )?;
                return Ok(());
            }
            let placement = registry.assign(&citizen_id, &shelter_id, date)?;
            let verb = if placement.is_move() {
                "Moved"
            } else if placement.is_reconfirmation() {
                "Re-confirmed"
            } else {
                "Assigned"
            };
            writeln!(
                out,
                "{verb} {} to {} on {}",
                placement.citizen_id,
                placement.shelter_id,
                format_date(placement.check_in_date)
            )?;
        }

        Commands::Unassign { citizen_id } => {
            if registry.unassign(&citizen_id) {
                writeln!(out, "Unassigned {}", citizen_id.trim())?;
            } else {
                writeln!(out, "{} has no assignment", citizen_id.trim())?;
            }
        }

        Commands::Import { kind, file } => {
            let text = std::fs::read_to_string(file.as_std_path())
                .wrap_err_with(|| format!("reading {file}"))?;
            let table = csv::decode(&text).wrap_err_with(|| format!("decoding {file}"))?;
            let count = registry.import_collection(kind, &table)?;
            writeln!(out, "Imported {count} {kind} from {file}")?;
        }

        Commands::Export { kind, output } => {
            let text = csv::encode(&registry.export_collection(kind));
            if let Some(path) = output {
                std::fs::write(path.as_std_path(), &text)
                    .wrap_err_with(|| format!("writing {path}"))?;
                info!(%kind, path = %path, "Collection exported");
            } else {
                writeln!(out, "{text}")?;
            }
        }

        Commands::Status { format } => match format {
            StatusFormat::Text => write_status(&mut out, registry)?,
            StatusFormat::Json => {
                #[derive(serde::Serialize)]
                struct Status {
                    stats: evac_engine::RegistryStats,
                    shelters: Vec<evac_engine::ShelterOccupancy>,
                }

                let status = Status {
                    stats: registry.stats(),
                    shelters: registry.occupancy(),
                };
                let json = serde_json::to_string_pretty(&status)
                    .map_err(|e| eyre!("Failed to serialize JSON: {e}"))?;
                writeln!(out, "{json}")?;
            }
        },

        Commands::Reset => {
            registry.reset();
            writeln!(out, "Registry reset to demonstration data")?;
        }
    }

    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Citizens with an extra column for their shelter.
fn citizen_listing(registry: &Registry) -> Table {
    let snapshot = registry.snapshot();
    let mut table = snapshot.to_table(CollectionKind::Citizens);
    table.headers.push("shelter".to_owned());
    for (row, citizen) in table.rows.iter_mut().zip(&snapshot.citizens) {
        let shelter = snapshot
            .assignment_for(&citizen.citizen_id)
            .map_or("-", |a| a.shelter_id.as_str());
        row.push(shelter.to_owned());
    }
    table
}

/// Shelters with occupancy columns.
fn shelter_listing(registry: &Registry) -> Table {
    let mut table = Table::new(
        ["shelterId", "name", "riskLevel", "capacity", "occupancy", "free"]
            .map(str::to_owned)
            .to_vec(),
    );
    for view in registry.occupancy() {
        table.push_row(vec![
            view.shelter_id.clone(),
            view.name.clone(),
            view.risk_level.clone(),
            view.capacity.to_string(),
            view.occupancy.to_string(),
            view.free_slots().to_string(),
        ]);
    }
    table
}

/// Writes `table` with columns padded to a common width.
fn write_table(out: &mut impl Write, table: &Table) -> std::io::Result<()> {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_padded(out, &table.headers, &widths)?;
    for row in &table.rows {
        write_padded(out, row, &widths)?;
    }
    if table.is_empty() {
        writeln!(out, "(none)")?;
    }
    Ok(())
}

fn write_padded(out: &mut impl Write, cells: &[String], widths: &[usize]) -> std::io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}

/// Prints the status summary.
fn write_status(out: &mut impl Write, registry: &Registry) -> std::io::Result<()> {
    let stats = registry.stats();

    writeln!(out)?;
    writeln!(out, "Registry Status")?;
    writeln!(out, "===============")?;
    writeln!(out)?;
    writeln!(out, "Citizens:        {}", stats.citizens)?;
    writeln!(out, "  Assigned:      {}", stats.assigned)?;
    writeln!(out, "  Unassigned:    {}", stats.unassigned)?;
    writeln!(out, "Shelters:        {}", stats.shelters)?;
    writeln!(out, "  Capacity:      {}", stats.total_capacity)?;
    writeln!(out, "  Free slots:    {}", stats.free_slots)?;
    writeln!(out)?;
    write_table(out, &shelter_listing(registry))?;

    let over: Vec<_> = registry
        .occupancy()
        .into_iter()
        .filter(evac_engine::ShelterOccupancy::is_over_capacity)
        .collect();
    if !over.is_empty() {
        writeln!(out)?;
        for view in over {
            writeln!(
                out,
                "warning: {} holds {} of {} places",
                view.shelter_id, view.occupancy, view.capacity
            )?;
        }
    }
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Load configuration and the stored snapshot
    let config = build_config(&cli)?;
    let gateway = JsonFileGateway::new(config.storage.snapshot_path.clone());
    let (mut store, outcome) = RecordStore::load(&gateway, today());

    // 5. Start persistence before any change is made
    let worker = if config.storage.autosave {
        let events = store.subscribe();
        if outcome.needs_save() {
            store.request_save();
        }
        Some(PersistenceWorker::spawn(
            events,
            gateway,
            FileMirror::new(config.storage.mirrors.clone()),
        ))
    } else {
        info!("Autosave disabled, changes will not be written");
        None
    };

    // 6. Run the command
    let mut registry = Registry::new(store, AssignmentPolicy::new(config.rules));
    let result = run_command(&mut registry, cli.command);

    // 7. Flush pending saves even when the command was refused
    drop(registry);
    if let Some(worker) = worker {
        let report = worker.shutdown().await;
        if report.failed > 0 || report.mirror_failed > 0 {
            warn!(
                failed = report.failed,
                mirror_failed = report.mirror_failed,
                "Some changes could not be written"
            );
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use evac_core::demo_snapshot;

    use super::*;

    fn demo() -> Registry {
        let day = NaiveDate::from_ymd_opt(2024, 11, 2).unwrap();
        Registry::new(RecordStore::new(demo_snapshot(day)), AssignmentPolicy::default())
            .with_fixed_date(day)
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assign_with_date() {
        let cli = Cli::try_parse_from(["evac", "assign", "C001", "S003", "--date", "2024-11-05"])
            .unwrap();
        match cli.command {
            Commands::Assign { date, dry_run, .. } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 11, 5));
                assert!(!dry_run);
            }
            _ => panic!("expected assign"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["evac", "export", "tents"]).is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::try_parse_from([
            "evac",
            "--data",
            "x.json",
            "--mirror-dir",
            "out",
            "--no-autosave",
            "status",
        ])
        .unwrap();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.storage.snapshot_path, "x.json");
        assert_eq!(
            config.storage.mirrors.target(CollectionKind::Citizens),
            Some(camino::Utf8Path::new("out/citizens.csv"))
        );
        assert!(!config.storage.autosave);
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cli = Cli::try_parse_from(["evac", "--config", "/nonexistent/evac.json", "status"])
            .unwrap();
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_citizen_listing_shows_shelter() {
        let table = citizen_listing(&demo());
        assert_eq!(table.headers.last().map(String::as_str), Some("shelter"));
        assert_eq!(table.cell(1, "shelter"), Some("S001"));
        assert_eq!(table.cell(0, "shelter"), Some("-"));
    }

    #[test]
    fn test_write_table_pads_columns() {
        let mut table = Table::new(vec!["id".into(), "name".into()]);
        table.push_row(vec!["C1".into(), "A".into()]);
        table.push_row(vec!["C100".into(), "Bee".into()]);

        let mut buf = Vec::new();
        write_table(&mut buf, &table).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "id    name\nC1    A\nC100  Bee\n"
        );
    }

    #[test]
    fn test_rejection_surfaces_as_error() {
        let mut registry = demo();
        let result = run_command(
            &mut registry,
            Commands::Assign {
                citizen_id: "C002".into(),
                shelter_id: "S002".into(),
                date: None,
                dry_run: false,
            },
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("low-risk"));
    }
}
