mod bot;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jigsaw_core::grid::{build_grid_choices, grid_choice_label};
use jigsaw_core::partition::TRIANGLE_LAYOUTS;
use jigsaw_core::{
    adjacency_tolerance, EngineRules, NoRaster, PartitionSpec, PieceShape, Puzzle, PuzzleSession,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "jigsaw-cli", version, about = "Developer tools for the jigsaw engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cut a puzzle and report its pieces and neighbor graph.
    Generate {
        #[command(flatten)]
        puzzle: PuzzleArgs,
        /// Print the full puzzle as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Let a bot solve a puzzle through the pointer API.
    Solve {
        #[command(flatten)]
        puzzle: PuzzleArgs,
        #[command(flatten)]
        bot: bot::BotArgs,
        /// JSON file with engine rules; missing fields use defaults.
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Use exact-slot placement instead of neighbor snapping.
        #[arg(long)]
        exact_slot: bool,
    },
    /// List the piece counts each shape offers for an image size.
    Layouts {
        #[arg(long, default_value_t = 800)]
        width: u32,
        #[arg(long, default_value_t = 600)]
        height: u32,
    },
}

#[derive(Args)]
struct PuzzleArgs {
    #[arg(long, default_value_t = 800)]
    width: u32,
    #[arg(long, default_value_t = 600)]
    height: u32,
    #[arg(long, default_value = "tabbed")]
    shape: PieceShape,
    /// Target piece count; grid shapes pick the nearest fitting layout.
    #[arg(long, default_value_t = 48)]
    pieces: u32,
    /// Decimal or 0x-prefixed hex; random when omitted.
    #[arg(long, env = "JIGSAW_SEED")]
    seed: Option<String>,
}

impl PuzzleArgs {
    fn resolve(&self) -> Result<(PartitionSpec, u64), Box<dyn std::error::Error>> {
        let spec = PartitionSpec::for_target(self.shape, self.width, self.height, self.pieces)?;
        let seed = match self.seed.as_deref() {
            Some(raw) => parse_seed_arg(raw)?,
            None => rand::rng().random(),
        };
        Ok((spec, seed))
    }
}

#[derive(Serialize)]
struct GenerateReport<'a> {
    seed: u64,
    spec: PartitionSpec,
    puzzle: &'a Puzzle,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { puzzle, json } => {
            let (spec, seed) = puzzle.resolve()?;
            let mut rng = StdRng::seed_from_u64(seed);
            let generated =
                Puzzle::generate(puzzle.width as f32, puzzle.height as f32, &spec, &mut rng)?;
            if json {
                let report = GenerateReport {
                    seed,
                    spec,
                    puzzle: &generated,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_summary(&generated, &spec, seed);
            }
        }
        Commands::Solve {
            puzzle,
            bot,
            rules,
            exact_slot,
        } => {
            let (spec, seed) = puzzle.resolve()?;
            let mut rules = match rules {
                Some(path) => serde_json::from_str::<EngineRules>(&std::fs::read_to_string(path)?)?,
                None => EngineRules::default(),
            };
            if exact_slot {
                rules = EngineRules {
                    snap_threshold: rules.snap_threshold,
                    board_margin_ratio: rules.board_margin_ratio,
                    ..EngineRules::exact_slot()
                };
            }
            let mut session = PuzzleSession::initialize(
                &(puzzle.width, puzzle.height),
                &spec,
                rules,
                &mut NoRaster,
                seed,
            )?;
            println!("seed: {seed}");
            println!("spec: {}", serde_json::to_string(&spec)?);
            println!("rules: {}", serde_json::to_string(session.rules())?);
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
            let report = bot::solve(&mut session, &bot.config(), &mut rng)?;
            println!(
                "moves: {}, rejected: {}, returned: {}, groups: {}, solved: {}",
                report.moves,
                report.rejected,
                report.returned,
                session.board_group_count(),
                report.solved
            );
        }
        Commands::Layouts { width, height } => print_layouts(width, height),
    }

    Ok(())
}

fn print_layouts(width: u32, height: u32) {
    println!("image: {width}x{height}");
    println!("rectangular / tabbed:");
    for choice in build_grid_choices(width, height) {
        println!("  {}", grid_choice_label(&choice));
    }
    println!("triangular:");
    for layout in TRIANGLE_LAYOUTS {
        println!(
            "  {} pieces ({}x{}, {:?})",
            layout.pieces, layout.cols, layout.rows, layout.split
        );
    }
}

fn print_summary(puzzle: &Puzzle, spec: &PartitionSpec, seed: u64) {
    let degrees: Vec<usize> = puzzle
        .pieces()
        .iter()
        .map(|piece| piece.neighbors.len())
        .collect();
    let min_degree = degrees.iter().copied().min().unwrap_or(0);
    let max_degree = degrees.iter().copied().max().unwrap_or(0);
    let vertices: usize = puzzle.pieces().iter().map(|piece| piece.polygon.len()).sum();
    println!("seed: {seed}");
    println!("spec: {spec:?}");
    println!("image: {}x{}", puzzle.width(), puzzle.height());
    println!("pieces: {}", puzzle.len());
    println!("shared edges: {}", puzzle.edge_count());
    println!("neighbors per piece: {min_degree}..={max_degree}");
    println!("vertices: {vertices}");
    println!("smallest piece side: {:.2}", puzzle.min_piece_dimension());
    println!("adjacency tolerance: {:.3}", adjacency_tolerance(puzzle.pieces()));
}

fn parse_seed_arg(raw: &str) -> Result<u64, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    let value = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16)?
    } else {
        trimmed.parse::<u64>()?
    };
    Ok(value)
}
