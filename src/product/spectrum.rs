use clap::Args;
use plotly::{common::Mode, Plot, Scatter};

use super::{channel_names, layout, title, AxisSpec, ChannelCount, Product};
use crate::{
    args::{FftArgs, ProductArgs},
    data::TimeSeries,
    signal::{welch_asd, Segmenting},
};

pub const ACTION: &str = "spectrum";

#[derive(Debug, Clone, Args)]
pub struct SpectrumArgs {
    #[clap(flatten)]
    pub product: ProductArgs,
    #[clap(flatten)]
    pub fft: FftArgs,
}

impl Product for SpectrumArgs {
    fn action(&self) -> &'static str {
        ACTION
    }

    fn args(&self) -> &ProductArgs {
        &self.product
    }

    fn channel_count(&self) -> ChannelCount {
        ChannelCount::at_least(1)
    }

    fn figure(&self, data: &[TimeSeries]) -> anyhow::Result<Plot> {
        let axes = &self.product.axes;
        let log_x = axes.log_x(true);
        // DC has no place on a log axis
        let first = usize::from(log_x);

        let mut plot = Plot::new();
        for ch in data {
            let seg = Segmenting::new(self.fft.secpfft, self.fft.overlap, ch.sample_rate)?;
            let asd = welch_asd(&ch.name, &ch.values, ch.sample_rate, seg)?;
            let frequencies = seg.frequencies(ch.sample_rate);
            let trace = Scatter::new(frequencies[first..].to_vec(), asd[first..].to_vec())
                .name(&ch.name)
                .mode(Mode::Lines);
            plot.add_trace(trace);
        }

        let title = title(&self.product, || format!("{} spectrum", channel_names(data)));
        plot.set_layout(layout(
            &title,
            AxisSpec {
                label: "Frequency (Hz)",
                log: log_x,
                min: axes.xmin,
                max: axes.xmax,
            },
            AxisSpec {
                label: "ASD (1/√Hz)",
                log: axes.log_y(true),
                min: axes.ymin,
                max: axes.ymax,
            },
        ));
        Ok(plot)
    }
}
