//! Plot products: one per action, driven through [`Session`].

use std::path::Path;

use itertools::Itertools;
use plotly::{
    common::Title,
    layout::{Axis, AxisType},
    Layout, Plot,
};
use tracing::warn;

use crate::{
    args::ProductArgs,
    data::{load_channels, TimeSeries},
    error::LdvwError,
    io::output_plot,
    logging,
};

pub mod coherence;
pub mod coherencegram;
mod grid;
pub mod spectrogram;
pub mod spectrum;
pub mod timeseries;

/// Contract between the dispatcher and a plot product.
pub trait Product {
    /// Name of the subcommand selecting this product.
    fn action(&self) -> &'static str;
    fn args(&self) -> &ProductArgs;
    fn channel_count(&self) -> ChannelCount;
    /// Builds the figure from the loaded channels, in command-line order.
    fn figure(&self, data: &[TimeSeries]) -> anyhow::Result<Plot>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelCount {
    pub min: usize,
    pub max: Option<usize>,
}

impl ChannelCount {
    pub const fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    pub const fn at_least(n: usize) -> Self {
        Self { min: n, max: None }
    }

    pub fn check(&self, action: &'static str, got: usize) -> Result<(), LdvwError> {
        let too_many = matches!(self.max, Some(max) if got > max);
        if got < self.min || too_many {
            return Err(LdvwError::channel_count(action, self.min, self.max, got));
        }
        Ok(())
    }
}

/// A product together with what it produced.
pub struct Session {
    product: Box<dyn Product>,
    pub plot: Option<Plot>,
    pub timeseries: Vec<TimeSeries>,
}

impl Session {
    pub fn new(product: Box<dyn Product>) -> Self {
        Self {
            product,
            plot: None,
            timeseries: vec![],
        }
    }

    pub fn action(&self) -> &'static str {
        self.product.action()
    }

    pub fn is_interactive(&self) -> bool {
        self.product.args().interactive
    }

    pub fn output(&self) -> &Path {
        &self.product.args().out
    }

    pub fn log(&self, level: u8, message: &str) {
        logging::log(level, message);
    }

    /// Loads the channels, builds the figure and writes it. Returns the exit status.
    pub fn make_plot(&mut self) -> anyhow::Result<u8> {
        let args = self.product.args();
        self.product
            .channel_count()
            .check(self.product.action(), args.chan.len())?;

        let data = load_channels(&args.input, &args.time_column, &args.chan, args.crop())?;
        for ch in &data {
            self.log(
                3,
                &format!(
                    "{}: {} samples at {} Hz from GPS {}",
                    ch.name,
                    ch.len(),
                    ch.sample_rate,
                    ch.t0
                ),
            );
        }

        let plot = self.product.figure(&data)?;
        output_plot(&plot, &args.out)?;
        self.plot = Some(plot);
        self.timeseries = data;
        Ok(0)
    }
}

pub(crate) struct AxisSpec<'a> {
    pub label: &'a str,
    pub log: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AxisSpec<'_> {
    fn build(&self) -> Axis {
        let mut axis = Axis::default().title(Title::with_text(self.label));
        if self.log {
            axis = axis.type_(AxisType::Log);
        }
        // plotly takes log axis ranges as exponents
        let scale = |v: f64| if self.log { v.log10() } else { v };
        match (self.min, self.max) {
            (Some(min), Some(max)) => axis = axis.range(vec![scale(min), scale(max)]),
            (None, None) => {}
            _ => warn!(axis = self.label, "both limits are needed, using autorange"),
        }
        axis
    }
}

pub(crate) fn layout(title: &str, x: AxisSpec, y: AxisSpec) -> Layout {
    Layout::default()
        .title(Title::with_text(title))
        .x_axis(x.build())
        .y_axis(y.build())
}

pub(crate) fn title(args: &ProductArgs, default: impl FnOnce() -> String) -> String {
    args.title.clone().unwrap_or_else(default)
}

pub(crate) fn channel_names(data: &[TimeSeries]) -> String {
    data.iter().map(|ch| ch.name.as_str()).join(", ")
}
