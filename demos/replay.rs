//  REPLAY.rs
//    by Lut99
//
//  Created:
//    13 Mar 2025, 16:20:44
//  Last edited:
//    24 Mar 2025, 16:11:37
//  Auto updated?
//    Yes
//
//  Description:
//!   Replays a plan in the household world of the built-in robot domain,
//!   printing what every step changes.
//

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, bail};
use clap::Parser;
use console::style;
use log::{debug, error, info};
use roboplan::formula::Formula;
use roboplan::pddl::{self, Plan};
use roboplan::robot::{self, DOMAIN_NAME};
use tracing_subscriber::EnvFilter;


/***** CONSTANTS *****/
/// The goal used if none is given.
const DEFAULT_GOAL: &str = "(and (isInSpace key kitchen) (not (isLocked safe)) (isOpen safe))";

/// The plan replayed if none is given.
const DEFAULT_PLAN: &str = "\
(open-door r1 d1)
(move r1 kitchen hall)
(pick-two-hands r1 box left right)
(move r1 hall kitchen)
(place-on-floor r1 box left kitchen)
(pick-one-hand r1 key left)
(move r1 kitchen pantry)
(unlock r1 safe key)
(open-container r1 safe)
; cost = 14 (general cost)
";





/***** ARGUMENTS *****/
/// Defines arguments to the replayer.
#[derive(Debug, Parser)]
pub struct Arguments {
    /// If given, enables more verbose logging.
    #[clap(long, global = true)]
    debug: bool,
    /// If given, uses the variant of the domain where artifact locations are base facts.
    #[clap(long)]
    propagating: bool,

    /// The path to a plan as output by a solver. If omitted, a built-in plan is replayed.
    #[clap(name = "PLAN")]
    plan: Option<PathBuf>,
    /// The goal to check after replaying.
    #[clap(short, long, default_value = DEFAULT_GOAL)]
    goal: String,
    /// If given, writes `domain.pddl` and `problem.pddl` for an external solver to this directory.
    #[clap(long)]
    pddl: Option<PathBuf>,
}





/***** ENTRYPOINT *****/
fn run(args: Arguments) -> anyhow::Result<()> {
    // Build the world
    let schema = (if args.propagating { robot::propagating_schema() } else { robot::schema() }).context("Failed to build robot domain")?;
    let (engine, state) = robot::kitchen_world(schema).context("Failed to build household world")?;
    let goal: Formula = robot::normalize_goal(&pddl::read_formula(&args.goal).with_context(|| format!("Failed to parse goal {:?}", args.goal))?);
    debug!("Goal: {goal}");

    // Write the solver input, if asked
    if let Some(dir) = &args.pddl {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory '{}'", dir.display()))?;
        let domain_path: PathBuf = dir.join("domain.pddl");
        fs::write(&domain_path, pddl::domain(&engine, DOMAIN_NAME).to_string())
            .with_context(|| format!("Failed to write domain file '{}'", domain_path.display()))?;
        let problem_path: PathBuf = dir.join("problem.pddl");
        fs::write(&problem_path, pddl::problem(&engine, &state, &goal, "household", DOMAIN_NAME).to_string())
            .with_context(|| format!("Failed to write problem file '{}'", problem_path.display()))?;
        println!("Wrote {} and {}", style(domain_path.display()).bold(), style(problem_path.display()).bold());
    }

    // Read the plan
    let text: String = match &args.plan {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read plan file '{}'", path.display()))?,
        None => DEFAULT_PLAN.into(),
    };
    let plan: Plan = pddl::read_plan(&engine, &text).context("Failed to read plan")?;
    info!("Replaying plan of {} action(s)", plan.actions.len());

    // Replay it
    println!("{}", engine.display(&state));
    let (end, steps) = engine.replay(&state, &plan.actions).context("Failed to replay plan")?;
    for (i, step) in steps.iter().enumerate() {
        println!("{} {} {}", style(format!("[{:>2}]", i + 1)).dim(), style(engine.display(&step.action)).bold(), style(format!("(+{})", step.cost)).yellow());
        for fact in &step.deleted {
            println!("       {} {}", style("-").red().bold(), style(engine.display(fact)).red());
        }
        for fact in &step.added {
            println!("       {} {}", style("+").green().bold(), style(engine.display(fact)).green());
        }
    }
    println!();
    println!("Total cost: {}", style(end.cost()).bold());
    if let Some(cost) = plan.cost {
        if cost != end.cost() {
            println!("{}", style(format!("Solver reported cost {cost}, but replaying cost {}", end.cost())).yellow());
        }
    }

    // Check the goal
    if !engine.satisfies(&end, &goal).context("Failed to evaluate goal")? {
        bail!("Plan does not reach goal {goal}");
    }
    println!("Goal {} {}", style(&goal).bold(), style("reached").green().bold());
    Ok(())
}

fn main() {
    // Parse the CLI arguments
    let args = Arguments::parse();

    // Setup the logger
    let filter: EnvFilter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(if args.debug { "debug" } else { "info" }));
    if let Err(err) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("WARNING: Failed to setup logger: {err} (no logging for this session)");
    }
    info!("roboplan {} - v{}", env!("CARGO_CRATE_NAME"), env!("CARGO_PKG_VERSION"));

    // Run
    if let Err(err) = run(args) {
        error!("{err:?}");
        std::process::exit(1);
    }
}
