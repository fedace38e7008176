use std::process::ExitCode;

use clap::{Parser, Subcommand};
use coherence::CoherenceArgs;
use coherencegram::CoherencegramArgs;
use spectrogram::SpectrogramArgs;
use spectrum::SpectrumArgs;
use timeseries::TimeSeriesArgs;
use tracing::warn;

pub use product::{coherence, coherencegram, spectrogram, spectrum, timeseries};

pub mod args;
pub mod data;
pub mod env;
pub mod error;
pub mod io;
pub mod logging;
pub mod product;
pub mod signal;

use args::CommonArgs;
use env::Environment;
use error::LdvwError;
use product::{Product, Session};

/// Command line interface to GWpy-style plotting functions
#[derive(Debug, Clone, Parser)]
#[clap(
    name = "ldvw",
    version,
    subcommand_help_heading = "Actions",
    subcommand_value_name = "ACTION"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Verbosity of the chosen action, or the default when none was given.
    pub fn verbosity(&self) -> u8 {
        match &self.command {
            Some(command) => command.common().verbosity(),
            None => CommonArgs::default().verbosity(),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Plot the amplitude of channels against time
    #[clap(name = timeseries::ACTION)]
    TimeSeries(TimeSeriesArgs),
    /// Plot the coherence between a reference channel and others
    #[clap(name = coherence::ACTION)]
    Coherence(CoherenceArgs),
    /// Plot the amplitude spectral density of channels
    #[clap(name = spectrum::ACTION)]
    Spectrum(SpectrumArgs),
    /// Plot the time-frequency amplitude of one channel
    #[clap(name = spectrogram::ACTION)]
    Spectrogram(SpectrogramArgs),
    /// Plot the coherence of two channels over time
    #[clap(name = coherencegram::ACTION)]
    Coherencegram(CoherencegramArgs),
}

impl Command {
    pub fn product(self) -> Box<dyn Product> {
        match self {
            Command::TimeSeries(args) => Box::new(args),
            Command::Coherence(args) => Box::new(args),
            Command::Spectrum(args) => Box::new(args),
            Command::Spectrogram(args) => Box::new(args),
            Command::Coherencegram(args) => Box::new(args),
        }
    }

    pub fn common(&self) -> &CommonArgs {
        match self {
            Command::TimeSeries(args) => &args.product.common,
            Command::Coherence(args) => &args.product.common,
            Command::Spectrum(args) => &args.product.common,
            Command::Spectrogram(args) => &args.product.common,
            Command::Coherencegram(args) => &args.product.common,
        }
    }
}

/// Runs the chosen action and returns its exit status.
pub fn run(cli: Cli, env: &Environment) -> anyhow::Result<ExitCode> {
    let Some(command) = cli.command else {
        return Err(LdvwError::MissingAction.into());
    };
    let mut session = Session::new(command.product());
    session.log(2, &format!("{} called", session.action()));
    let code = session.make_plot()?;

    if session.is_interactive() {
        match &session.plot {
            Some(plot) if !env.is_headless() => plot.show(),
            _ => warn!(
                path = %session.output().display(),
                "no display available, plot only written to file"
            ),
        }
    }
    Ok(ExitCode::from(code))
}
