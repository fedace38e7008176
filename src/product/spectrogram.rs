use clap::Args;
use plotly::Plot;

use super::{grid::TimeFrequency, layout, title, AxisSpec, ChannelCount, Product};
use crate::{
    args::{FftArgs, ProductArgs, StrideArgs},
    data::TimeSeries,
    signal::welch_asd,
};

pub const ACTION: &str = "spectrogram";

#[derive(Debug, Clone, Args)]
pub struct SpectrogramArgs {
    #[clap(flatten)]
    pub product: ProductArgs,
    #[clap(flatten)]
    pub fft: FftArgs,
    #[clap(flatten)]
    pub stride: StrideArgs,
}

impl Product for SpectrogramArgs {
    fn action(&self) -> &'static str {
        ACTION
    }

    fn args(&self) -> &ProductArgs {
        &self.product
    }

    fn channel_count(&self) -> ChannelCount {
        ChannelCount::exactly(1)
    }

    fn figure(&self, data: &[TimeSeries]) -> anyhow::Result<Plot> {
        self.channel_count().check(ACTION, data.len())?;
        let ch = &data[0];
        let tf = TimeFrequency::compute(ch, &self.fft, &self.stride, |range, seg| {
            welch_asd(&ch.name, &ch.values[range], ch.sample_rate, seg)
        })?;

        let axes = &self.product.axes;
        let log_y = axes.log_y(true);
        let mut plot = Plot::new();
        plot.add_trace(tf.heatmap(&ch.name, log_y));

        let x_label = format!("Time (s) from GPS {}", ch.t0);
        let title = title(&self.product, || format!("{} spectrogram", ch.name));
        plot.set_layout(layout(
            &title,
            AxisSpec {
                label: &x_label,
                log: axes.log_x(false),
                min: axes.xmin,
                max: axes.xmax,
            },
            AxisSpec {
                label: "Frequency (Hz)",
                log: log_y,
                min: axes.ymin,
                max: axes.ymax,
            },
        ));
        Ok(plot)
    }
}
