//! CLI entry point

use sim_lib::cli::{RunArgs, SimArgs};
use sim_lib::error::SimulatorResult;
use sim_lib::runner;

fn main() {
    let args = SimArgs::from_env_or_exit();
    if let Err(e) = run(args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: SimArgs) -> SimulatorResult<()> {
    let run_args: RunArgs = args.into();
    runner::run(&run_args)
}
