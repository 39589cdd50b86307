mod error;
mod input;

use clap::{Parser, Subcommand};
use serde::Serialize;
use sn_core::timing::{self, sweep_timing};
use sn_solver::{EigenManager, FixedSourceManager, TransportProblem, TransportSolution};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use error::CliResult;
use input::{Mode, load_deck};

#[derive(Parser)]
#[command(name = "sn-cli")]
#[command(about = "SnFlow CLI - Discrete ordinates neutron transport", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a problem deck without solving it
    Validate {
        /// Path to the deck YAML file
        deck_path: PathBuf,
    },
    /// Solve a problem deck
    Run {
        /// Path to the deck YAML file
        deck_path: PathBuf,
        /// Write the solution as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print sweep and operator timing
        #[arg(long)]
        timing: bool,
    },
}

#[derive(Serialize)]
struct RunOutput<'a> {
    name: Option<&'a str>,
    mode: Mode,
    number_cells: usize,
    number_groups: usize,
    solve_time_s: f64,
    /// Volume-weighted mean scalar flux per group
    group_mean_flux: Vec<f64>,
    solution: &'a TransportSolution,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Validate { deck_path } => cmd_validate(&deck_path),
        Commands::Run {
            deck_path,
            output,
            timing,
        } => cmd_run(&deck_path, output.as_deref(), timing),
    }
}

fn cmd_validate(deck_path: &Path) -> CliResult<()> {
    println!("Validating deck: {}", deck_path.display());
    let deck = load_deck(deck_path)?;
    let problem = deck.problem()?;
    println!("✓ Deck is valid");
    println!(
        "  {} cells, {} groups, {} angles",
        problem.mesh.number_cells(),
        problem.material.number_groups(),
        problem.quadrature.number_angles()
    );
    Ok(())
}

fn cmd_run(deck_path: &Path, output: Option<&Path>, show_timing: bool) -> CliResult<()> {
    let deck = load_deck(deck_path)?;
    let problem = deck.problem()?;
    println!(
        "Running {} problem: {}",
        match deck.mode {
            Mode::Fixed => "fixed-source",
            Mode::Eigen => "eigenvalue",
        },
        deck.name.as_deref().unwrap_or("unnamed")
    );

    if show_timing {
        timing::enable_timing();
        sweep_timing::reset_all();
    }

    let start = Instant::now();
    let solution = match deck.mode {
        Mode::Fixed => FixedSourceManager::new(&problem)?.solve()?,
        Mode::Eigen => EigenManager::new(&problem)?.solve()?,
    };
    let solve_time_s = start.elapsed().as_secs_f64();

    if solution.converged() {
        println!("✓ Solve converged in {solve_time_s:.3}s");
    } else {
        println!("✗ Solve did not converge ({solve_time_s:.3}s)");
    }
    for report in &solution.reports {
        println!(
            "  {:<22} {:>5} iterations, residual {:.3e} ({:?})",
            report.solver, report.iterations, report.residual, report.status
        );
    }
    if let Some(k) = solution.eigenvalue {
        println!("  k = {k:.8}");
    }

    let group_mean_flux = group_mean_flux(&problem, &solution);
    println!("  Mean flux by group:");
    for (g, phi) in group_mean_flux.iter().enumerate() {
        println!("    {g:>3}  {phi:.6e}");
    }

    if show_timing {
        if let Some(summary) = sweep_timing::summary() {
            print!("{summary}");
        }
    }

    if let Some(path) = output {
        let out = RunOutput {
            name: deck.name.as_deref(),
            mode: deck.mode,
            number_cells: problem.mesh.number_cells(),
            number_groups: problem.material.number_groups(),
            solve_time_s,
            group_mean_flux,
            solution: &solution,
        };
        std::fs::write(path, serde_json::to_string_pretty(&out)?)?;
        println!("✓ Solution written to {}", path.display());
    }
    Ok(())
}

fn group_mean_flux(problem: &TransportProblem, solution: &TransportSolution) -> Vec<f64> {
    let mesh = &problem.mesh;
    let volume: f64 = (0..mesh.number_cells()).map(|c| mesh.volume(c)).sum();
    solution
        .phi
        .iter()
        .map(|phi| {
            let total: f64 = phi.iter().enumerate().map(|(c, v)| v * mesh.volume(c)).sum();
            total / volume
        })
        .collect()
}
