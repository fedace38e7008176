use clap::Args;
use plotly::Plot;

use super::{grid::TimeFrequency, layout, title, AxisSpec, ChannelCount, Product};
use crate::{
    args::{FftArgs, ProductArgs, StrideArgs},
    data::TimeSeries,
    signal::coherence,
};

pub const ACTION: &str = "coherencegram";

#[derive(Debug, Clone, Args)]
pub struct CoherencegramArgs {
    #[clap(flatten)]
    pub product: ProductArgs,
    #[clap(flatten)]
    pub fft: FftArgs,
    #[clap(flatten)]
    pub stride: StrideArgs,
}

impl Product for CoherencegramArgs {
    fn action(&self) -> &'static str {
        ACTION
    }

    fn args(&self) -> &ProductArgs {
        &self.product
    }

    fn channel_count(&self) -> ChannelCount {
        ChannelCount::exactly(2)
    }

    fn figure(&self, data: &[TimeSeries]) -> anyhow::Result<Plot> {
        self.channel_count().check(ACTION, data.len())?;
        let (reference, other) = (&data[0], &data[1]);
        let tf = TimeFrequency::compute(reference, &self.fft, &self.stride, |range, seg| {
            let end = range.end.min(other.len());
            let start = range.start.min(end);
            coherence(
                &other.name,
                &reference.values[range],
                &other.values[start..end],
                reference.sample_rate,
                seg,
            )
        })?;

        let axes = &self.product.axes;
        let log_y = axes.log_y(true);
        let name = format!("{} / {}", other.name, reference.name);
        let mut plot = Plot::new();
        plot.add_trace(tf.heatmap(&name, log_y));

        let x_label = format!("Time (s) from GPS {}", reference.t0);
        let title = title(&self.product, || {
            format!("Coherence of {} with {}", other.name, reference.name)
        });
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
