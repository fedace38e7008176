use std::process::ExitCode;

use clap::Parser;
use ldvw::{env::Environment, logging, Cli};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbosity())?;

    let env = Environment::from_process();
    env.apply();

    ldvw::run(cli, &env)
}
