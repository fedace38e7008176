//! Error types for the plot dispatcher.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised before or while building a plot product.
#[derive(Debug, Error)]
pub enum LdvwError {
    /// No subcommand was given on the command line.
    #[error("Must specify action. Please try again with --help.")]
    MissingAction,

    /// The product got a channel list of the wrong length.
    #[error("`{action}` needs {expected} channel(s), got {got}")]
    ChannelCount {
        action: &'static str,
        expected: String,
        got: usize,
    },

    /// Not enough samples to fill one FFT (or one stride).
    #[error("Channel `{channel}` has {got} samples, need at least {need}")]
    TooFewSamples {
        channel: String,
        got: usize,
        need: usize,
    },

    /// The time column cannot yield a sample rate.
    #[error("Bad time column `{column}`: {reason}")]
    TimeColumn { column: String, reason: String },

    /// FFT or stride parameters out of range.
    #[error("Invalid FFT parameter: {0}")]
    FftParameter(String),

    /// Input file with no reader for its extension.
    #[error("Unsupported input file: {}", path.display())]
    UnsupportedInput { path: PathBuf },
}

impl LdvwError {
    pub fn channel_count(action: &'static str, min: usize, max: Option<usize>, got: usize) -> Self {
        let expected = match max {
            Some(max) if max == min => min.to_string(),
            Some(max) => format!("{min} to {max}"),
            None => format!("at least {min}"),
        };
        Self::ChannelCount {
            action,
            expected,
            got,
        }
    }

    pub fn time_column(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TimeColumn {
            column: column.into(),
            reason: reason.into(),
        }
    }
}
