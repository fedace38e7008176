use clap::Args;
use plotly::{common::Mode, Plot, Scatter};

use super::{layout, title, AxisSpec, ChannelCount, Product};
use crate::{
    args::{FftArgs, ProductArgs},
    data::TimeSeries,
    signal::{coherence, Segmenting},
};

pub const ACTION: &str = "coherence";

#[derive(Debug, Clone, Args)]
pub struct CoherenceArgs {
    #[clap(flatten)]
    pub product: ProductArgs,
    #[clap(flatten)]
    pub fft: FftArgs,
}

impl Product for CoherenceArgs {
    fn action(&self) -> &'static str {
        ACTION
    }

    fn args(&self) -> &ProductArgs {
        &self.product
    }

    /// The first channel is the reference.
    fn channel_count(&self) -> ChannelCount {
        ChannelCount::at_least(2)
    }

    fn figure(&self, data: &[TimeSeries]) -> anyhow::Result<Plot> {
        let axes = &self.product.axes;
        let log_x = axes.log_x(true);
        let first = usize::from(log_x);
        let (reference, others) = data
            .split_first()
            .ok_or_else(|| anyhow::anyhow!("no reference channel"))?;

        let seg = Segmenting::new(self.fft.secpfft, self.fft.overlap, reference.sample_rate)?;
        seg.require(&reference.name, reference.len())?;
        let frequencies = seg.frequencies(reference.sample_rate);
        let mut plot = Plot::new();
        for ch in others {
            let coh = coherence(
                &ch.name,
                &reference.values,
                &ch.values,
                reference.sample_rate,
                seg,
            )?;
            let trace = Scatter::new(frequencies[first..].to_vec(), coh[first..].to_vec())
                .name(&ch.name)
                .mode(Mode::Lines);
            plot.add_trace(trace);
        }

        let title = title(&self.product, || format!("Coherence with {}", reference.name));
        let (ymin, ymax) = match (axes.ymin, axes.ymax) {
            (None, None) => (Some(0.0), Some(1.0)),
            limits => limits,
        };
        plot.set_layout(layout(
            &title,
            AxisSpec {
                label: "Frequency (Hz)",
                log: log_x,
                min: axes.xmin,
                max: axes.xmax,
            },
            AxisSpec {
                label: "Coherence",
                log: axes.log_y(false),
                min: ymin,
                max: ymax,
            },
        ));
        Ok(plot)
    }
}
