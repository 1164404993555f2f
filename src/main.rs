//! orbitsim - headless orbit propagation runs
//!
//! Propagates JSON scenarios and checks the integrator against two-body
//! circular orbits.

use anyhow::Result;
use clap::{Parser, Subcommand};

use orbitsim::analysis::{run_scenario, validate_orbit, RunArgs, ValidateOrbitArgs};

#[derive(Parser, Debug)]
#[command(name = "orbitsim", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Propagate a scenario file and write a JSON report
    Run(RunArgs),
    /// Propagate a two-body circular orbit and report drift per orbit
    ValidateOrbit(ValidateOrbitArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run_scenario(args),
        Command::ValidateOrbit(args) => validate_orbit(args),
    }
}
