use std::path::PathBuf;
use std::time::Instant;

use box_loader::render;
use box_loader::search::PositionSearch;
use box_loader::solver::{ItemOrder, Solver, TieBreak};
use box_loader::{Container, Dims, Item, LoadPlan, LoadReport, OrientationPolicy};
use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(name = "box_loader", about = "Greedy 3D container loading optimizer")]
struct Cli {
    /// Container dimensions (WxHxD, e.g. 8x8x8)
    #[arg(long, required_unless_present = "input")]
    container: Option<String>,

    /// Items as WxHxD:value:weight[:id] (e.g. 3x4x2:100:20:crate-1)
    #[arg(long = "items", num_args = 1..)]
    items: Vec<String>,

    /// Load plan JSON file, used instead of --container and --items
    #[arg(long, conflicts_with_all = ["container", "items"])]
    input: Option<PathBuf>,

    /// Orientation policy: fixed, upright, or all
    #[arg(long, value_parser = parse_orientations)]
    orientations: Option<OrientationPolicy>,

    /// Item priority: weight, value, value-density, or volume
    #[arg(long, value_parser = parse_order)]
    order: Option<ItemOrder>,

    /// Tie-break among equal-waste candidates: ground-first or first-found
    #[arg(long, value_parser = parse_tie_break)]
    tie_break: Option<TieBreak>,

    /// Candidate positions: lattice, legacy-lattice, or corner-points
    #[arg(long, value_parser = parse_search)]
    search: Option<PositionSearch>,

    /// Show ASCII layout of each layer
    #[arg(long)]
    layout: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log every placement decision to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_orientations(s: &str) -> Result<OrientationPolicy, String> {
    s.parse()
}

fn parse_order(s: &str) -> Result<ItemOrder, String> {
    s.parse()
}

fn parse_tie_break(s: &str) -> Result<TieBreak, String> {
    s.parse()
}

fn parse_search(s: &str) -> Result<PositionSearch, String> {
    s.parse()
}

fn parse_dimensions(s: &str) -> Result<Dims, String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 3 {
        return Err(format!("invalid dimensions '{}', expected WxHxD", s));
    }
    let mut sides = [0u32; 3];
    for (side, (part, name)) in sides
        .iter_mut()
        .zip(parts.iter().zip(["width", "height", "depth"]))
    {
        *side = part
            .parse::<u32>()
            .map_err(|_| format!("invalid {} in '{}'", name, s))?;
    }
    let dims = Dims::new(sides[0], sides[1], sides[2]);
    if dims.is_degenerate() {
        return Err(format!("dimensions must be non-zero in '{}'", s));
    }
    Ok(dims)
}

fn parse_item(s: &str, index: usize) -> Result<Item, String> {
    let parts: Vec<&str> = s.splitn(4, ':').collect();
    if parts.len() < 3 {
        return Err(format!("invalid item '{}', expected WxHxD:value:weight[:id]", s));
    }
    let dims = parse_dimensions(parts[0])?;
    let value = parts[1]
        .parse::<f64>()
        .map_err(|_| format!("invalid value in '{}'", s))?;
    let weight = parts[2]
        .parse::<f64>()
        .map_err(|_| format!("invalid weight in '{}'", s))?;
    let id = match parts.get(3) {
        Some(id) => id.to_string(),
        None => format!("item-{}", index + 1),
    };
    Item::new(id, dims, value, weight).map_err(|e| e.to_string())
}

fn build_plan(cli: &Cli) -> Result<LoadPlan, String> {
    let mut plan = match &cli.input {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
            LoadPlan::from_json(&json).map_err(|e| e.to_string())?
        }
        None => {
            let container = parse_dimensions(cli.container.as_deref().unwrap_or_default())?;
            let items = cli
                .items
                .iter()
                .enumerate()
                .map(|(i, s)| parse_item(s, i))
                .collect::<Result<Vec<_>, _>>()?;
            LoadPlan::new(container, items)
        }
    };

    if let Some(orientations) = cli.orientations {
        plan.config.orientations = orientations;
    }
    if let Some(order) = cli.order {
        plan.config.order = order;
    }
    if let Some(tie_break) = cli.tie_break {
        plan.config.tie_break = tie_break;
    }
    if let Some(search) = cli.search {
        plan.config.search = search;
    }

    plan.validated().map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let plan = build_plan(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let mut container = Container::new(plan.container).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let solver = Solver::new(plan.config);
    let start = Instant::now();
    let outcome = solver.optimize(&mut container, &plan.items);
    let elapsed = start.elapsed();
    let report = LoadReport::new(&container, &outcome.not_placed);

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!("Container {}:", report.container);
    for p in &report.placements {
        let rot = if p.rotated { " [rotated]" } else { "" };
        println!("  {} {} @ {}{}", p.id, p.orientation, p.position, rot);
    }
    if !report.not_placed.is_empty() {
        println!("Not placed: {}", report.not_placed.join(", "));
    }
    if cli.layout {
        println!();
        print!("{}", render::render_layers(&container));
    }
    println!();

    println!(
        "Summary: {} box{} placed, {} not placed, total value {}, {:.1}% volume used",
        report.placed_count(),
        if report.placed_count() == 1 { "" } else { "es" },
        report.not_placed.len(),
        report.total_value,
        report.utilization_percent,
    );
    println!("Elapsed: {:.2}s", elapsed.as_secs_f64());
}
