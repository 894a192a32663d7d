use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anstream::println;
use clap::Parser;
use human_duration::human_duration;
use owo_colors::OwoColorize;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use thousands::Separable;

use eight_puzzle::algorithms::astar::SearchOutcome;
use eight_puzzle::problems::eight_puzzle::Board;
use eight_puzzle::problems::eight_puzzle::HeuristicKind;
use eight_puzzle::problems::eight_puzzle::TILES;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// The classic instances, run when no start is given.
const EXPERIMENTS: [(&str, [u8; TILES], [u8; TILES]); 2] = [
    (
        "Experiment 1",
        [2, 8, 3, 1, 6, 4, 0, 7, 5],
        [1, 2, 3, 8, 0, 4, 7, 6, 5],
    ),
    (
        "Experiment 2",
        [7, 2, 4, 5, 0, 6, 8, 3, 1],
        [1, 2, 3, 4, 5, 6, 7, 8, 0],
    ),
];

/// Solves 8-puzzle instances with A*
#[derive(Parser, Debug)]
#[clap(long_version = eight_puzzle::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Start board, like "283/164/_75". Runs the classic experiments if
    /// missing.
    #[arg(short, long)]
    pub start: Option<Board>,

    #[arg(short, long, default_value = "123/456/78_")]
    pub goal: Board,

    /// Scrambles the goal with this seed to get the start board.
    #[arg(long, conflicts_with = "start")]
    pub random_seed: Option<u64>,
    #[arg(long, default_value_t = 30usize)]
    pub scramble_steps: usize,

    #[arg(long = "heuristic", value_enum, default_values = ["misplaced", "manhattan"])]
    pub heuristics: Vec<HeuristicKind>,

    /// Also writes an org-mode report of every run.
    #[arg(short, long, env = "EIGHT_PUZZLE_REPORT")]
    pub output: Option<PathBuf>,

    /// Skips printing the boards along the path.
    #[arg(short, long)]
    pub quiet: bool,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

struct Instance {
    name: String,
    start: Board,
    goal: Board,
}

fn invalid_input<E>(e: E) -> std::io::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
}

fn instances(args: &Args) -> std::io::Result<Vec<Instance>> {
    if let Some(start) = args.start {
        return Ok(vec![Instance {
            name: "Custom instance".to_string(),
            start,
            goal: args.goal,
        }]);
    }

    if let Some(seed) = args.random_seed {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let start =
            Board::scramble(&args.goal, &mut rng, args.scramble_steps).map_err(invalid_input)?;
        return Ok(vec![Instance {
            name: format!(
                "Random instance (seed {seed}, {} steps)",
                args.scramble_steps
            ),
            start,
            goal: args.goal,
        }]);
    }

    EXPERIMENTS
        .iter()
        .map(|(name, start, goal)| {
            Ok(Instance {
                name: name.to_string(),
                start: Board::new(*start).map_err(invalid_input)?,
                goal: Board::new(*goal).map_err(invalid_input)?,
            })
        })
        .collect()
}

fn print_run(instance: &Instance, heuristic: HeuristicKind, outcome: &SearchOutcome, quiet: bool) {
    println!();
    println!("{} - {}:", instance.name.bold(), heuristic.cyan());
    println!(
        "Nodes explored: {}, Time: {:.4} seconds ({})",
        outcome.nodes_explored().separate_with_commas().yellow(),
        outcome.elapsed_seconds(),
        human_duration(&outcome.elapsed()),
    );

    let Some(moves) = outcome.moves() else {
        println!("{}", "No solution found".red());
        return;
    };
    if !quiet {
        println!("Path to the solution:");
        for step in outcome.path.steps() {
            println!("{:#}\n", step.board);
        }
    }
    println!("g(n): {}", moves.green());
}

fn write_run<W: Write>(
    out: &mut W,
    instance: &Instance,
    heuristic: HeuristicKind,
    outcome: &SearchOutcome,
) -> std::io::Result<()> {
    writeln!(out, "* {} - {heuristic}", instance.name)?;
    writeln!(out, "- Start: {:?}", instance.start)?;
    writeln!(out, "- Goal: {:?}", instance.goal)?;
    writeln!(out, "** Stats\n#+begin_src text")?;
    outcome.stats.write_stats(&mut *out)?;
    writeln!(out, "#+end_src")?;

    writeln!(out, "** Path {}", outcome.path)?;
    for step in outcome.path.steps() {
        match step.action {
            Some(a) => writeln!(out, "*** g={} {a}", step.g)?,
            None => writeln!(out, "*** g={} start", step.g)?,
        }
        writeln!(out, "#+begin_src text\n{:#}\n#+end_src", step.board)?;
    }

    Ok(())
}

fn main() -> std::io::Result<()> {
    #[cfg(feature = "coz_profile")]
    coz::thread_init();

    let args = Args::parse();
    args.color.write_global();

    let instances = instances(&args)?;

    let mut report = match &args.output {
        Some(path) => {
            println!("Writing report to {}", path.display().green());
            let mut out = BufWriter::new(File::create(path)?);
            writeln!(out, "#+title: 8-puzzle experiments")?;
            writeln!(out, ":PROPERTIES:")?;
            writeln!(out, ":VERSION: {:?}", eight_puzzle::build::PKG_VERSION)?;
            writeln!(out, ":END:")?;
            Some(out)
        }
        None => None,
    };

    for instance in &instances {
        for &heuristic in &args.heuristics {
            let outcome = heuristic
                .solve(instance.start, instance.goal)
                .map_err(invalid_input)?;
            log::info!(
                "{} - {heuristic}: {} moves, {} states explored",
                instance.name,
                outcome.moves().unwrap_or_default(),
                outcome.nodes_explored()
            );

            print_run(instance, heuristic, &outcome, args.quiet);
            if let Some(out) = report.as_mut() {
                write_run(out, instance, heuristic, &outcome)?;
            }
        }
    }

    if let Some(mut out) = report {
        out.flush()?;
    }

    Ok(())
}
