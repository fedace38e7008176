use std::path::PathBuf;

use clap::{ArgAction, Args};

use crate::data::Crop;

/// Flags every action accepts.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Increase verbose output
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    /// Show only fatal errors
    #[clap(short, long)]
    pub silent: bool,
}

impl CommonArgs {
    /// 0 = errors only, 1 = warnings, 2 = info, 3-4 = debug, 5+ = everything.
    pub fn verbosity(&self) -> u8 {
        if self.silent {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ProductArgs {
    /// Data file (`.csv`, `.json`, `.ndjson`) with a time column and one column per channel
    pub input: PathBuf,
    /// Channel to plot; repeat for more channels
    #[clap(short, long = "chan", value_name = "NAME", required = true)]
    pub chan: Vec<String>,
    /// Column holding GPS times
    #[clap(long, default_value = "time")]
    pub time_column: String,
    /// GPS start time
    #[clap(long)]
    pub start: Option<f64>,
    /// Seconds of data to plot
    #[clap(long)]
    pub duration: Option<f64>,
    /// Output HTML file
    #[clap(short, long, default_value = "gwpy.html")]
    pub out: PathBuf,
    /// Plot title
    #[clap(long)]
    pub title: Option<String>,
    /// Open the plot in a browser after writing it
    #[clap(short, long)]
    pub interactive: bool,
    #[clap(flatten)]
    pub axes: AxisArgs,
    #[clap(flatten)]
    pub common: CommonArgs,
}

impl ProductArgs {
    pub fn crop(&self) -> Crop {
        Crop {
            start: self.start,
            duration: self.duration,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct AxisArgs {
    /// Logarithmic x axis
    #[clap(long, conflicts_with = "nologx")]
    pub logx: bool,
    /// Linear x axis
    #[clap(long)]
    pub nologx: bool,
    /// Logarithmic y axis
    #[clap(long, conflicts_with = "nology")]
    pub logy: bool,
    /// Linear y axis
    #[clap(long)]
    pub nology: bool,
    #[clap(long)]
    pub xmin: Option<f64>,
    #[clap(long)]
    pub xmax: Option<f64>,
    #[clap(long)]
    pub ymin: Option<f64>,
    #[clap(long)]
    pub ymax: Option<f64>,
}

impl AxisArgs {
    pub fn log_x(&self, default: bool) -> bool {
        resolve(self.logx, self.nologx, default)
    }

    pub fn log_y(&self, default: bool) -> bool {
        resolve(self.logy, self.nology, default)
    }
}

fn resolve(on: bool, off: bool, default: bool) -> bool {
    match (on, off) {
        (true, _) => true,
        (_, true) => false,
        _ => default,
    }
}

#[derive(Debug, Clone, Args)]
pub struct FftArgs {
    /// Seconds per FFT
    #[clap(long, default_value_t = 1.0)]
    pub secpfft: f64,
    /// Overlap fraction of consecutive FFTs, in [0, 1)
    #[clap(long, default_value_t = 0.5)]
    pub overlap: f64,
}

#[derive(Debug, Clone, Args)]
pub struct StrideArgs {
    /// Seconds per spectrogram column [default: 2 * secpfft]
    #[clap(long)]
    pub stride: Option<f64>,
}

impl StrideArgs {
    pub fn seconds(&self, fft: &FftArgs) -> f64 {
        self.stride.unwrap_or(2.0 * fft.secpfft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_overrides_verbose() {
        let args = CommonArgs {
            verbose: 3,
            silent: true,
        };
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn verbosity_starts_at_one() {
        assert_eq!(CommonArgs::default().verbosity(), 1);
        let args = CommonArgs {
            verbose: 2,
            silent: false,
        };
        assert_eq!(args.verbosity(), 3);
    }

    #[test]
    fn axis_scale_falls_back_to_product_default() {
        let mut axes = AxisArgs::default();
        assert!(axes.log_x(true));
        assert!(!axes.log_y(false));
        axes.nologx = true;
        axes.logy = true;
        assert!(!axes.log_x(true));
        assert!(axes.log_y(false));
    }

    #[test]
    fn stride_defaults_to_two_ffts() {
        let fft = FftArgs {
            secpfft: 0.5,
            overlap: 0.5,
        };
        assert_eq!(StrideArgs { stride: None }.seconds(&fft), 1.0);
        assert_eq!(StrideArgs { stride: Some(4.0) }.seconds(&fft), 4.0);
    }
}
