use clap::Args;
use plotly::{common::Mode, Plot, Scatter, Trace};

use super::{channel_names, layout, title, AxisSpec, ChannelCount, Product};
use crate::{args::ProductArgs, data::TimeSeries};

pub const ACTION: &str = "timeseries";

#[derive(Debug, Clone, Args)]
pub struct TimeSeriesArgs {
    #[clap(flatten)]
    pub product: ProductArgs,
}

impl Product for TimeSeriesArgs {
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
        let mut plot = Plot::new();
        for ch in data {
            plot.add_trace(trace(ch));
        }

        let axes = &self.product.axes;
        let t0 = data.first().map(|ch| ch.t0).unwrap_or_default();
        let x_label = format!("Time (s) from GPS {t0}");
        let title = title(&self.product, || channel_names(data));
        plot.set_layout(layout(
            &title,
            AxisSpec {
                label: &x_label,
                log: axes.log_x(false),
                min: axes.xmin,
                max: axes.xmax,
            },
            AxisSpec {
                label: "Amplitude",
                log: axes.log_y(false),
                min: axes.ymin,
                max: axes.ymax,
            },
        ));
        Ok(plot)
    }
}

fn trace(ch: &TimeSeries) -> Box<dyn Trace> {
    // channels share t0, so relative times line up
    Scatter::new(ch.times(), ch.values.clone())
        .name(&ch.name)
        .mode(Mode::Lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::tests::{product_args, sine};

    #[test]
    fn one_line_per_channel() {
        let args = TimeSeriesArgs {
            product: product_args(&["H1:STRAIN", "L1:STRAIN"]),
        };
        let data = [
            sine("H1:STRAIN", 4.0, 32.0, 1.0),
            sine("L1:STRAIN", 2.0, 32.0, 1.0),
        ];
        let json = args.figure(&data).unwrap().to_json();
        assert!(json.contains("H1:STRAIN, L1:STRAIN"));
        assert_eq!(json.matches("\"type\":\"scatter\"").count(), 2);
        assert!(json.contains("Time (s) from GPS 1000000000"));
    }
}
