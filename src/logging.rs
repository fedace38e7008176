use std::io::IsTerminal;

use tracing::{debug, error, info, level_filters::LevelFilter, trace, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Maps a verbosity count onto a tracing level.
pub fn level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 | 4 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over the verbosity flags.
pub fn init(verbosity: u8) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level(verbosity)).into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Emits `message` when the verbosity is at least `level`.
pub fn log(level: u8, message: &str) {
    match level {
        0 => error!("{message}"),
        1 => warn!("{message}"),
        2 => info!("{message}"),
        3 | 4 => debug!("{message}"),
        _ => trace!("{message}"),
    }
}
