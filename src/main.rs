use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use lcg_seed::catalog::Catalog;
use lcg_seed::error::Result;
use lcg_seed::graph::StateGraph;
use lcg_seed::solve::{solve, Outcome, SolveOptions};
use lcg_seed::solver::BddSolver;

const EXIT_UNSAT: u8 = 1;
const EXIT_FAILURE: u8 = 2;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Give up after this many milliseconds.
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Also report how many root assignments satisfy the script.
    #[arg(long)]
    count: bool,

    /// Print the full slot-by-slot replay of the solution to stderr.
    #[arg(long)]
    trace: bool,

    /// Raise the log level (repeat for more).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Process exit status for a finished run. Any library error is a failure,
/// never confused with an infeasible script.
fn exit_code(result: &Result<Outcome>) -> u8 {
    match result {
        Ok(Outcome::Sat(_)) => 0,
        Ok(Outcome::Unsat(_)) => EXIT_UNSAT,
        Err(_) => EXIT_FAILURE,
    }
}

fn report(args: &Cli, graph: &StateGraph, catalog: &Catalog, outcome: &Outcome) -> Result<()> {
    match outcome {
        Outcome::Sat(assignment) => {
            if let Some(count) = assignment.count() {
                eprintln!("{} satisfying root assignments", count);
            }
            if args.trace {
                for row in assignment.trace(graph, catalog)? {
                    eprintln!("{}", row);
                }
            }
            println!("{}", assignment);
        }
        Outcome::Unsat(labels) => {
            eprintln!("unsatisfiable, conflicting predicates:");
            for label in labels {
                println!("{}", label);
            }
        }
    }
    Ok(())
}

fn run(args: &Cli) -> Result<Outcome> {
    let graph = StateGraph::script();
    let catalog = Catalog::script(&graph)?;
    let options = SolveOptions {
        deadline: args.timeout.map(Duration::from_millis),
        count: args.count,
    };

    let outcome = solve(&mut BddSolver::new(), &graph, &catalog, &options)?;
    report(args, &graph, &catalog, &outcome)?;
    Ok(outcome)
}

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let args = Cli::parse();

    let level = match args.verbose {
        0 => simplelog::LevelFilter::Warn,
        1 => simplelog::LevelFilter::Info,
        2 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    // stdout is reserved for the result.
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;
    info!("args = {:?}", args);

    let time_total = std::time::Instant::now();
    let result = run(&args);
    match &result {
        Ok(_) => info!("done in {:.3} s", time_total.elapsed().as_secs_f64()),
        Err(e) => error!("{}", e),
    }

    Ok(ExitCode::from(exit_code(&result)))
}

#[cfg(test)]
mod tests {
    use lcg_seed::error::Error;
    use lcg_seed::solve::Assignment;

    use super::*;

    #[test]
    fn test_exit_code_of_outcomes() {
        assert_eq!(exit_code(&Ok(Outcome::Sat(Assignment::new(vec![0])))), 0);
        assert_eq!(exit_code(&Ok(Outcome::Unsat(vec!["a".to_string()]))), EXIT_UNSAT);
    }

    #[test]
    fn test_every_error_is_a_failure() {
        for e in [
            Error::InvalidGraph("slot 30 out of range for 24 slots".to_string()),
            Error::DuplicateLabel("Turn 1: P1 Leech Seed hit".to_string()),
            Error::UnknownVariable(3),
            Error::Timeout,
            Error::Backend("no path".to_string()),
        ] {
            assert_eq!(exit_code(&Err(e)), EXIT_FAILURE);
        }
    }

    #[test]
    fn test_run_times_out() {
        let args = Cli::parse_from(["lcg-seed", "--timeout", "0"]);
        let result = run(&args);
        assert_eq!(result, Err(Error::Timeout));
        assert_eq!(exit_code(&result), EXIT_FAILURE);
    }
}
