//! # Takeoff CLI
//!
//! Terminal front end for the quantity and cost estimators and for cost
//! reports kept in a JSON report file.
//!
//! ```text
//! takeoff concrete --area 100 --floors 1 --foundation-depth 1 --wall-thickness 0.2 --slab-thickness 0.15
//! takeoff --json steel --concrete-volume 146.08
//! takeoff --store reports.json report create --file report.json
//! takeoff --store reports.json report list tower-a
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use takeoff_core::calculations::{
    estimate_block_volume, estimate_building, estimate_concrete, estimate_cost, estimate_rebar_weight,
    estimate_steel, BlockInput, BuildingInput, ConcreteInput, ConcreteVolumeBreakdown, CostBreakdown, CostInput,
    RebarInput, SteelInput, SteelWeightBreakdown,
};
use takeoff_core::project::ProjectRef;
use takeoff_core::report::{self, CostReport, CreateReportRequest};
use takeoff_core::store::FileReportStore;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_STORE: &str = "takeoff_reports.json";
const STORE_PATH_ENV: &str = "TAKEOFF_STORE_PATH";

#[derive(Parser, Debug)]
#[command(author, version, about = "Construction quantity and cost estimator", long_about = None)]
struct Cli {
    /// Print machine-readable JSON instead of a formatted summary
    #[arg(long, global = true)]
    json: bool,

    /// JSON report file (defaults to $TAKEOFF_STORE_PATH, then ./takeoff_reports.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Concrete volume breakdown for a building
    Concrete(ConcreteArgs),
    /// Steel weight breakdown for a concrete volume
    Steel(SteelArgs),
    /// Material cost with labor, equipment and overhead allocation
    Cost(CostArgs),
    /// Volume and truck count for one rectangular pour
    Block(BlockArgs),
    /// Rebar weight for one element
    Rebar(RebarArgs),
    /// Concrete, steel and cost in one run
    Building(BuildingArgs),
    /// Cost reports
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Args, Debug, Clone)]
struct ConcreteArgs {
    /// Plan area of one floor (m²)
    #[arg(long)]
    area: f64,
    /// Number of floors
    #[arg(long)]
    floors: f64,
    /// Foundation depth (m)
    #[arg(long)]
    foundation_depth: f64,
    /// Wall thickness (m)
    #[arg(long)]
    wall_thickness: f64,
    /// Slab thickness (m)
    #[arg(long)]
    slab_thickness: f64,
}

impl From<ConcreteArgs> for ConcreteInput {
    fn from(args: ConcreteArgs) -> Self {
        ConcreteInput {
            area: args.area,
            floors: args.floors,
            foundation_depth: args.foundation_depth,
            wall_thickness: args.wall_thickness,
            slab_thickness: args.slab_thickness,
        }
    }
}

#[derive(Args, Debug)]
struct SteelArgs {
    /// Concrete volume (m³)
    #[arg(long)]
    concrete_volume: f64,
    /// kg/m³, or a fraction of steel density when below 1
    #[arg(long)]
    steel_ratio: Option<f64>,
}

#[derive(Args, Debug)]
struct CostArgs {
    /// Concrete volume (m³)
    #[arg(long)]
    concrete_volume: f64,
    /// Steel weight (kg)
    #[arg(long)]
    steel_weight: f64,
    /// Concrete price per m³
    #[arg(long)]
    concrete_price: f64,
    /// Steel price per kg
    #[arg(long)]
    steel_price: f64,
}

#[derive(Args, Debug)]
struct BlockArgs {
    #[arg(long)]
    length: f64,
    #[arg(long)]
    width: f64,
    #[arg(long)]
    height: f64,
}

#[derive(Args, Debug)]
struct RebarArgs {
    #[arg(long)]
    length: f64,
    #[arg(long)]
    width: f64,
    #[arg(long)]
    height: f64,
    /// Steel density (kg/m³), 7850 when omitted
    #[arg(long)]
    density: Option<f64>,
    /// Reinforcement percentage, 2 when omitted
    #[arg(long)]
    percentage: Option<f64>,
}

#[derive(Args, Debug)]
struct BuildingArgs {
    #[command(flatten)]
    concrete: ConcreteArgs,
    #[arg(long)]
    steel_ratio: Option<f64>,
    #[arg(long)]
    concrete_price: f64,
    #[arg(long)]
    steel_price: f64,
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Create a report from a JSON request file
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    /// List reports filed under a project (canonical or legacy id)
    List { project_ref: String },
    /// Show one report
    Show { id: Uuid },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    match cli.command {
        Command::Concrete(args) => {
            let input: ConcreteInput = args.into();
            emit(json, &estimate_concrete(&input)?, print_concrete)
        }
        Command::Steel(args) => {
            let input = SteelInput {
                concrete_volume: args.concrete_volume,
                steel_ratio: args.steel_ratio,
            };
            emit(json, &estimate_steel(&input)?, print_steel)
        }
        Command::Cost(args) => {
            let input = CostInput {
                concrete_volume: args.concrete_volume,
                steel_weight: args.steel_weight,
                concrete_price_per_m3: args.concrete_price,
                steel_price_per_kg: args.steel_price,
            };
            emit(json, &estimate_cost(&input)?, print_cost)
        }
        Command::Block(args) => {
            let input = BlockInput {
                length: args.length,
                width: args.width,
                height: args.height,
            };
            emit(json, &estimate_block_volume(&input)?, |v| {
                println!("Volume: {:.2} m³", v.volume);
                println!("Trucks: {}", v.trucks);
            })
        }
        Command::Rebar(args) => {
            let input = RebarInput {
                length: args.length,
                width: args.width,
                height: args.height,
                density: args.density,
                percentage: args.percentage,
            };
            emit(json, &estimate_rebar_weight(&input)?, |r| {
                println!("Volume:       {:.2} m³", r.volume);
                println!("Density:      {} kg/m³", r.density);
                println!("Percentage:   {}%", r.percentage);
                println!("Steel weight: {:.2} kg ({:.2} t)", r.steel_weight, r.steel_weight_tons);
            })
        }
        Command::Building(args) => {
            let input = BuildingInput {
                concrete: args.concrete.into(),
                steel_ratio: args.steel_ratio,
                concrete_price_per_m3: args.concrete_price,
                steel_price_per_kg: args.steel_price,
            };
            emit(json, &estimate_building(&input)?, |estimate| {
                print_concrete(&estimate.concrete);
                println!();
                print_steel(&estimate.steel);
                println!();
                print_cost(&estimate.cost);
            })
        }
        Command::Report(command) => {
            let store = FileReportStore::new(resolve_store_path(cli.store));
            debug!(path = %store.path().display(), "using report file");
            run_report(&store, command, json)
        }
    }
}

fn resolve_store_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var(STORE_PATH_ENV).ok().filter(|p| !p.trim().is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE))
}

fn run_report(store: &FileReportStore, command: ReportCommand, json: bool) -> Result<()> {
    match command {
        ReportCommand::Create { file } => {
            let raw = fs::read_to_string(&file).with_context(|| format!("failed to read {}", file.display()))?;
            let body: serde_json::Value =
                serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", file.display()))?;
            let request = CreateReportRequest::from_json(body)?;
            let created = report::create_report(store, request)?;
            emit(json, &created, print_report)
        }
        ReportCommand::List { project_ref } => {
            let reports = report::list_reports_for_project(store, &ProjectRef::either(project_ref))?;
            emit(json, &reports, |reports| {
                if reports.is_empty() {
                    println!("No cost reports found.");
                }
                for r in reports {
                    let summary = r.summary();
                    println!(
                        "{}  {}  {:<24} {:>3} items  {:>14.2}",
                        r.created_at.format("%Y-%m-%d %H:%M"),
                        r.id,
                        r.report_name.as_deref().unwrap_or("(unnamed)"),
                        summary.item_count,
                        summary.total_cost
                    );
                }
            })
        }
        ReportCommand::Show { id } => {
            let found = report::get_report(store, &id)?;
            emit(json, &found, print_report)
        }
    }
}

fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

fn print_concrete(b: &ConcreteVolumeBreakdown) {
    println!("═══════════════════════════════════════");
    println!("  CONCRETE VOLUME (m³)");
    println!("═══════════════════════════════════════");
    println!("  Foundation: {:>10.2}", b.foundation_volume);
    println!("  Columns:    {:>10.2}", b.columns_volume);
    println!("  Slabs:      {:>10.2}", b.slabs_volume);
    println!("  Beams:      {:>10.2}", b.beams_volume);
    println!("  Stairs:     {:>10.2}", b.stairs_volume);
    println!("  Walls:      {:>10.2}", b.walls_volume);
    println!("  Total:      {:>10.2}", b.total_volume);
}

fn print_steel(s: &SteelWeightBreakdown) {
    println!("═══════════════════════════════════════");
    println!("  STEEL WEIGHT (kg)");
    println!("═══════════════════════════════════════");
    println!("  Main:       {:>10.2}", s.main_steel_weight);
    println!("  Secondary:  {:>10.2}", s.secondary_steel_weight);
    println!("  Columns:    {:>10.2}", s.columns_steel);
    println!("  Beams:      {:>10.2}", s.beams_steel);
    println!("  Slabs:      {:>10.2}", s.slabs_steel);
    println!("  Foundation: {:>10.2}", s.foundation_steel);
    println!("  Total:      {:>10.2}", s.total_weight);
}

fn print_cost(c: &CostBreakdown) {
    println!("═══════════════════════════════════════");
    println!("  COST");
    println!("═══════════════════════════════════════");
    println!("  Concrete:   {:>12.2}", c.concrete_cost);
    println!("  Steel:      {:>12.2}", c.steel_cost);
    println!("  Total:      {:>12.2}", c.total_cost);
    println!();
    println!("{}", allocation_line(c));
}

fn allocation_line(c: &CostBreakdown) -> String {
    format!(
        "  Allocation: concrete {:.2}, steel {:.2}, labor {:.2}, equipment {:.2}, overhead {:.2}",
        c.cost_breakdown.concrete,
        c.cost_breakdown.steel,
        c.cost_breakdown.labor,
        c.cost_breakdown.equipment,
        c.cost_breakdown.overhead
    )
}

fn print_report(r: &CostReport) {
    let project = r.project.key().map(|k| k.as_str().to_string()).unwrap_or_default();
    println!("Report {} ({})", r.id, r.report_name.as_deref().unwrap_or("unnamed"));
    println!("Project:  {}", project);
    println!("Engineer: {}", r.engineer().name.unwrap_or_else(|| r.engineer_id.clone()));
    println!("Created:  {}", r.created_at.to_rfc3339());
    println!();
    for item in &r.items {
        println!(
            "  {:<8} {:<24} {:>10.2} {:<6} × {:>10.2} = {:>12.2}",
            item.id, item.name, item.quantity, item.unit, item.price_per_unit, item.total_cost
        );
    }
    println!();
    for (unit, quantity) in &r.summary().quantity_by_unit {
        println!("  Σ {:<6} {:>10.2}", unit, quantity);
    }
    println!("  Total: {:.2}", r.total_cost);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_concrete() {
        let cli = Cli::try_parse_from([
            "takeoff",
            "--json",
            "concrete",
            "--area",
            "100",
            "--floors",
            "2",
            "--foundation-depth",
            "1",
            "--wall-thickness",
            "0.2",
            "--slab-thickness",
            "0.15",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Concrete(args) => {
                let input: ConcreteInput = args.into();
                assert_eq!(input.floors, 2.0);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_report_list() {
        let cli = Cli::try_parse_from(["takeoff", "report", "list", "tower-a", "--store", "/tmp/r.json"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/r.json")));
        assert!(matches!(cli.command, Command::Report(ReportCommand::List { ref project_ref }) if project_ref == "tower-a"));
    }

    #[test]
    fn test_missing_argument_rejected() {
        assert!(Cli::try_parse_from(["takeoff", "steel"]).is_err());
        assert!(Cli::try_parse_from(["takeoff", "report", "show", "not-a-uuid"]).is_err());
    }

    #[test]
    fn test_allocation_line() {
        let cost = estimate_cost(&CostInput {
            concrete_volume: 10.0,
            steel_weight: 800.0,
            concrete_price_per_m3: 500.0,
            steel_price_per_kg: 5.0,
        })
        .unwrap();
        assert_eq!(
            allocation_line(&cost),
            "  Allocation: concrete 5000.00, steel 4000.00, labor 2250.00, equipment 1350.00, overhead 900.00"
        );
    }

    #[test]
    fn test_store_flag_wins() {
        assert_eq!(resolve_store_path(Some(PathBuf::from("x.json"))), PathBuf::from("x.json"));
    }
}
