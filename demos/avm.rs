//! Alternating variable method over a recorded integer branch condition.
//!
//! The condition `x * x + a * x == target` is recorded once with the starting
//! value of `x`, then the search probes new values of `x` through assignments,
//! following the branch distance downhill.
//!
//! Run with:
//! ```bash
//! cargo run --example avm -- --start 0 --a 3 --target 108
//! ```

use std::time::Instant;

use clap::Parser;
use log::{debug, info};

use symexpr_rs::arena::ExprArena;
use symexpr_rs::comparator::Comparator;
use symexpr_rs::constraint::{Constraint, ConstraintConfig};
use symexpr_rs::distance::DistanceCalculator;
use symexpr_rs::eval::Assignment;
use symexpr_rs::operator::Operator;
use symexpr_rs::types::VarId;

#[derive(Debug, Parser)]
#[command(author, version, about = "Alternating variable method on `x * x + a * x == target`")]
struct Cli {
    /// Initial value of x
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    start: i64,

    /// Linear coefficient
    #[arg(long, default_value = "3", allow_negative_numbers = true)]
    a: i64,

    /// Right-hand side of the condition
    #[arg(long, default_value = "108", allow_negative_numbers = true)]
    target: i64,

    /// Maximum number of distance evaluations
    #[arg(long, default_value = "10000")]
    max_evals: usize,

    /// Write the recorded expression in DOT format to this file
    #[arg(long)]
    dot: Option<std::path::PathBuf>,

    /// Show debug output
    #[arg(short, long)]
    verbose: bool,
}

struct Search<'a> {
    calc: DistanceCalculator<'a>,
    constraint: Constraint,
    var: VarId,
    evals: usize,
}

impl Search<'_> {
    fn fitness(&mut self, x: i64) -> f64 {
        self.evals += 1;
        let d = self.calc.distance_with(&self.constraint, &Assignment::new().with(self.var, x));
        debug!("x = {} => {}", x, d);
        d
    }

    /// Runs exploratory moves from `x`, accelerating along an improving direction.
    fn run(&mut self, mut x: i64, max_evals: usize) -> (i64, f64) {
        let mut best = self.fitness(x);
        while best > 0.0 && self.evals < max_evals {
            let mut improved = false;
            for direction in [-1i64, 1] {
                let mut step = direction;
                loop {
                    let candidate = x.wrapping_add(step);
                    let d = self.fitness(candidate);
                    if d >= best || self.evals >= max_evals {
                        break;
                    }
                    x = candidate;
                    best = d;
                    improved = true;
                    step = step.saturating_mul(2);
                }
                if improved {
                    break;
                }
            }
            if !improved {
                info!("local optimum at x = {} (distance {})", x, best);
                break;
            }
        }
        (x, best)
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    simplelog::TermLogger::init(
        if cli.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = Instant::now();

    let mut arena = ExprArena::new();
    let x = arena.mk_var("x", cli.start)?;
    let a = arena.mk_int(cli.a);
    let sq = arena.mk_binary(Operator::Mul, x, x)?;
    let ax = arena.mk_binary(Operator::Mul, a, x)?;
    let lhs = arena.mk_binary(Operator::Plus, sq, ax)?;
    let target = arena.mk_int(cli.target);
    let constraint = Constraint::new(&arena, lhs, Comparator::Eq, target, &ConstraintConfig::default())?;
    info!("constraint: {}", constraint.display(&arena));

    if let Some(path) = &cli.dot {
        std::fs::write(path, symexpr_rs::dot::to_dot(&arena, &[lhs, target])?)?;
        info!("wrote {}", path.display());
    }

    let var = arena
        .get(x)
        .var()
        .ok_or_else(|| color_eyre::eyre::eyre!("x is not a variable"))?;
    let mut search = Search {
        calc: DistanceCalculator::new(&arena),
        constraint,
        var,
        evals: 0,
    };
    let (x, distance) = search.run(cli.start, cli.max_evals);

    if distance == 0.0 {
        println!("solved: x = {} after {} evaluations", x, search.evals);
    } else {
        println!(
            "not solved: best x = {} with distance {} after {} evaluations",
            x, distance, search.evals
        );
    }
    println!("Total time: {:.3}s", time_total.elapsed().as_secs_f64());

    Ok(())
}
