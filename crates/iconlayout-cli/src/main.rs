use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use iconlayout_core::{
    FolderOptions, GridGeometry, LayoutOptimizer, LayoutOutcome, LayoutRequest, Occupant,
    PlacementMode, SlotGeometry, SolvedLayout, SolverBackend, MAX_SLOTS,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "iconlayout")]
#[command(about = "Home screen layout optimizer - place app icons where they are used most", long_about = None)]
struct Cli {
    /// Log model construction and solver timing
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the optimal layout
    Optimize {
        /// Input file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for result (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the same-color repulsion weight
        #[arg(long)]
        color_penalty: Option<f64>,

        /// Enable folders with this penalty (overrides the file)
        #[arg(long)]
        folder_penalty: Option<f64>,

        /// Allow items to stay off the screen when slots run out
        #[arg(long)]
        at_most_one: bool,

        /// Solver backend: microlp, coin_cbc or highs
        #[arg(long)]
        backend: Option<SolverBackend>,
    },

    /// Validate an input file and report the model size
    Check {
        /// Input file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print slot coordinates for a grid
    Distances {
        #[arg(long, default_value_t = 6)]
        rows: u32,
        #[arg(long, default_value_t = 4)]
        cols: u32,
        #[arg(long, default_value_t = 4)]
        dock: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Optimize {
            input,
            output,
            color_penalty,
            folder_penalty,
            at_most_one,
            backend,
        } => {
            let mut request = load_request(&input)?;
            if let Some(penalty) = color_penalty {
                request.color_penalty = penalty;
            }
            if let Some(penalty) = folder_penalty {
                let capacity = request
                    .folders
                    .map(|f| f.capacity)
                    .unwrap_or(iconlayout_core::DEFAULT_FOLDER_CAPACITY);
                request.folders = Some(FolderOptions::new(penalty).with_capacity(capacity));
            }
            if at_most_one {
                request.placement = PlacementMode::AtMostOne;
            }
            if let Some(backend) = backend {
                request.solver.backend = backend;
            }
            optimize_command(request, output)?;
        }
        Commands::Check { input } => {
            check_command(&input)?;
        }
        Commands::Distances { rows, cols, dock } => {
            distances_command(GridGeometry::new(rows, cols, dock))?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_request(input: &Path) -> Result<LayoutRequest> {
    println!("{}", "🔍 Loading input...".bright_blue());

    let content = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let extension = input.extension().and_then(|s| s.to_str());
    let request: LayoutRequest = if matches!(extension, Some("yaml") | Some("yml")) {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    println!(
        "  {} items",
        request.items.len().to_string().bright_white().bold()
    );
    println!(
        "  {} slots ({}x{} grid + {} dock)",
        request.geometry.slot_count().to_string().bright_white().bold(),
        request.geometry.rows,
        request.geometry.cols,
        request.geometry.dock_size
    );
    println!();

    Ok(request)
}

fn optimize_command(request: LayoutRequest, output: Option<PathBuf>) -> Result<()> {
    let geometry = request.geometry;

    println!(
        "{} (backend: {})",
        "🚀 Running optimization...".bright_blue(),
        request.solver.backend
    );

    let optimizer = LayoutOptimizer::new(request)?;
    let outcome = optimizer.optimize()?;

    println!();
    match &outcome.layout {
        Some(layout) => {
            println!("{}", "✅ Optimal layout found!".bright_green().bold());
            println!();
            print_layout(&geometry, layout);
        }
        None => {
            println!(
                "{} status: {}",
                "❌ No optimal layout.".bright_red().bold(),
                outcome.status.to_string().bright_white()
            );
            println!("  Constraints may be too tight: remove items, add slots or use --at-most-one.");
        }
    }
    println!();

    write_outcome(&outcome, output)
}

fn print_layout(geometry: &GridGeometry, layout: &SolvedLayout) {
    println!("{}", "📊 Results:".bright_yellow().bold());
    println!(
        "  Objective: {}",
        format!("{:.2}", layout.objective).bright_white().bold()
    );
    println!();

    let label = |slot: u32| -> String {
        match layout.slots.get(&slot) {
            Some(Occupant::Item(name)) => name.clone(),
            Some(Occupant::Folder(genre)) => format!("[{}]", genre),
            Some(Occupant::Empty) | None => "·".to_string(),
        }
    };

    for row in 0..geometry.rows {
        let cells: Vec<String> = (1..=geometry.cols)
            .map(|col| format!("{:^16}", label(row * geometry.cols + col)))
            .collect();
        println!("  {}", cells.join("").bright_white());
    }
    if geometry.dock_size > 0 {
        let dock: Vec<String> = (1..=geometry.dock_size)
            .map(|i| format!("{:^16}", label(geometry.main_slots() + i)))
            .collect();
        println!("  {}", "─".repeat(16 * geometry.cols.max(geometry.dock_size) as usize));
        println!("  {}", dock.join("").bright_cyan());
    }

    let open: Vec<_> = layout
        .folders
        .iter()
        .filter(|(_, members)| !members.is_empty())
        .collect();
    if !open.is_empty() {
        println!();
        println!("  Folders:");
        for (genre, members) in open {
            println!("    • {}: {}", genre.bright_cyan(), members.join(", "));
        }
    }
}

fn write_outcome(outcome: &LayoutOutcome, output: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(outcome)?;
    if let Some(output_path) = output {
        std::fs::write(&output_path, json)?;
        println!(
            "💾 Saved result to {}",
            output_path.display().to_string().bright_white()
        );
    } else {
        println!("{}", json);
    }
    Ok(())
}

fn check_command(input: &Path) -> Result<()> {
    let request = load_request(input)?;
    let optimizer = LayoutOptimizer::new(request)?;
    let stats = optimizer.model_stats();

    println!("{}", "✅ Input is valid".bright_green().bold());
    if !optimizer.folder_keys().is_empty() {
        println!("  Folders: {}", optimizer.folder_keys().join(", "));
    }
    println!("  Variables: {}", stats.variables().to_string().bright_white().bold());
    println!("    placement:    {}", stats.placement_vars);
    println!("    folder slot:  {}", stats.folder_slot_vars);
    println!("    membership:   {}", stats.membership_vars);
    println!("    folder link:  {}", stats.folder_link_vars);
    println!("    color pair:   {}", stats.color_pair_vars);
    println!("  Constraints: {}", stats.constraints.to_string().bright_white().bold());

    Ok(())
}

fn distances_command(grid: GridGeometry) -> Result<()> {
    match grid.checked_slot_count() {
        Some(n) if n <= MAX_SLOTS => {}
        _ => anyhow::bail!(
            "grid {}x{} + {} dock exceeds {} slots",
            grid.rows,
            grid.cols,
            grid.dock_size,
            MAX_SLOTS
        ),
    }
    let geometry = SlotGeometry::new(&grid);

    println!("{}", "📐 Slot coordinates:".bright_yellow().bold());
    for coord in geometry.coords() {
        let place = if grid.is_dock(coord.slot) { "dock" } else { "grid" };
        println!(
            "  {:>3}  row {:>2}  col {:>2}  {}",
            coord.slot, coord.row, coord.col, place
        );
    }

    let farthest = geometry
        .pairs()
        .fold(None, |best: Option<(u32, u32, f64)>, (a, b, d)| match best {
            Some((_, _, bd)) if bd >= d => best,
            _ => Some((a, b, d)),
        });
    if let Some((a, b, d)) = farthest {
        println!();
        println!("  Farthest pair: {} ↔ {} ({:.3})", a, b, d);
    }

    Ok(())
}
