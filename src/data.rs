use std::path::Path;

use anyhow::Context;
use itertools::Itertools;
use polars::{
    frame::DataFrame,
    lazy::{
        dsl::{col, lit, Expr},
        frame::LazyFrame,
    },
    prelude::{Column, DataType},
};
use tracing::debug;

use crate::{error::LdvwError, io::read_df_file};

/// Uniformly sampled data of one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub name: String,
    /// GPS time of the first sample.
    pub t0: f64,
    pub sample_rate: f64,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.values.len() as f64 / self.sample_rate
    }

    /// Sample times relative to `t0`.
    pub fn times(&self) -> Vec<f64> {
        (0..self.values.len())
            .map(|i| i as f64 / self.sample_rate)
            .collect()
    }

    /// Number of samples spanning `seconds`, rounded to the nearest sample.
    pub fn samples_in(&self, seconds: f64) -> usize {
        (seconds * self.sample_rate).round() as usize
    }
}

/// GPS interval kept from the input. Open ends keep everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crop {
    pub start: Option<f64>,
    pub duration: Option<f64>,
}

impl Crop {
    fn apply(&self, df: LazyFrame, time_column: &str) -> LazyFrame {
        let time = || col(time_column);
        let mut df = df;
        if let Some(start) = self.start {
            df = df.filter(time().gt_eq(lit(start)));
        }
        if let Some(duration) = self.duration {
            let start: Expr = match self.start {
                Some(start) => lit(start),
                None => time().min(),
            };
            df = df.filter(time().lt(start + lit(duration)));
        }
        df
    }
}

pub fn load_channels(
    input: impl AsRef<Path>,
    time_column: &str,
    channels: &[String],
    crop: Crop,
) -> anyhow::Result<Vec<TimeSeries>> {
    let df = read_df_file(input, None)?;
    let df = crop.apply(df, time_column).collect()?;
    channels_from_df(&df, time_column, channels)
}

pub fn channels_from_df(
    df: &DataFrame,
    time_column: &str,
    channels: &[String],
) -> anyhow::Result<Vec<TimeSeries>> {
    let times = cont_f64_values(df.column(time_column)?)?;
    let (t0, sample_rate) = sample_rate(&times, time_column)?;
    debug!(t0, sample_rate, samples = times.len(), "time column parsed");

    let mut series = vec![];
    for name in channels {
        let column = df
            .column(name)
            .with_context(|| format!("No channel `{name}` in the input"))?;
        let values = cont_f64_values(column)?;
        series.push(TimeSeries {
            name: name.clone(),
            t0,
            sample_rate,
            values,
        });
    }
    Ok(series)
}

pub fn cont_f64_values(column: &Column) -> anyhow::Result<Vec<f64>> {
    let series = column
        .as_materialized_series()
        .strict_cast(&DataType::Float64)
        .with_context(|| format!("Column `{}` is not numeric", column.name()))?;
    let values = series
        .f64()?
        .into_iter()
        .map(|x| x.with_context(|| format!("Missing sample in the column `{}`", column.name())))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(values)
}

/// Relative deviation from the mean sample spacing still read as uniform.
const SPACING_TOLERANCE: f64 = 0.01;

/// Start time and rate of an increasing, evenly spaced time axis.
fn sample_rate(times: &[f64], column: &str) -> Result<(f64, f64), LdvwError> {
    let (Some(&first), Some(&last)) = (times.first(), times.last()) else {
        return Err(LdvwError::time_column(column, "no samples"));
    };
    if times.len() < 2 {
        return Err(LdvwError::time_column(column, "need at least two samples"));
    }
    if times.iter().tuple_windows().any(|(a, b)| b <= a) {
        return Err(LdvwError::time_column(column, "times must be increasing"));
    }
    let spacing = (last - first) / (times.len() - 1) as f64;
    let uneven = times
        .iter()
        .tuple_windows()
        .any(|(a, b)| ((b - a) - spacing).abs() > SPACING_TOLERANCE * spacing);
    if uneven {
        return Err(LdvwError::time_column(
            column,
            format!("times must be evenly spaced, expected steps of {spacing} s"),
        ));
    }
    Ok((first, 1.0 / spacing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use polars::{df, lazy::frame::IntoLazy};

    fn frame() -> DataFrame {
        df!(
            "time" => [100.0, 100.25, 100.5, 100.75, 101.0, 101.25],
            "H1:STRAIN" => [1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            "L1:STRAIN" => [1i64, 0, 1, 0, 1, 0],
        )
        .unwrap()
    }

    #[test]
    fn reads_rate_and_start() {
        let df = frame();
        let series =
            channels_from_df(&df, "time", &["H1:STRAIN".into(), "L1:STRAIN".into()]).unwrap();
        assert_eq!(series.len(), 2);
        assert_relative_eq!(series[0].sample_rate, 4.0);
        assert_relative_eq!(series[0].t0, 100.0);
        assert_eq!(series[1].values, vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
        assert_relative_eq!(series[0].duration(), 1.5);
    }

    #[test]
    fn missing_channel_is_named() {
        let err = channels_from_df(&frame(), "time", &["V1:STRAIN".into()]).unwrap_err();
        assert!(err.to_string().contains("V1:STRAIN"));
    }

    #[test]
    fn crop_keeps_half_open_interval() {
        let crop = Crop {
            start: Some(100.5),
            duration: Some(0.5),
        };
        let df = crop.apply(frame().lazy(), "time").collect().unwrap();
        let series = channels_from_df(&df, "time", &["H1:STRAIN".into()]).unwrap();
        assert_eq!(series[0].values, vec![3.0, 4.0]);
        assert_relative_eq!(series[0].t0, 100.5);
    }

    #[test]
    fn duration_without_start_counts_from_first_sample() {
        let crop = Crop {
            start: None,
            duration: Some(0.75),
        };
        let df = crop.apply(frame().lazy(), "time").collect().unwrap();
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn rejects_unordered_times() {
        let err = sample_rate(&[0.0, 2.0, 1.0], "time").unwrap_err();
        assert!(err.to_string().contains("increasing"));
        assert!(sample_rate(&[0.0], "time").is_err());
    }

    #[test]
    fn rejects_jittered_times() {
        let err = sample_rate(&[0.0, 1.0, 2.5, 3.0], "time").unwrap_err();
        assert!(err.to_string().contains("evenly spaced"));

        let (t0, rate) = sample_rate(&[10.0, 10.5, 11.0001, 11.5], "time").unwrap();
        assert_relative_eq!(t0, 10.0);
        assert_relative_eq!(rate, 2.0);
    }

    #[test]
    fn string_column_is_not_numeric() {
        let df = df!(
            "time" => [0.0, 1.0, 2.0],
            "H1" => ["1", "x", "3"],
        )
        .unwrap();
        let err = channels_from_df(&df, "time", &["H1".into()]).unwrap_err();
        assert!(err.to_string().contains("Column `H1` is not numeric"));
    }

    #[test]
    fn null_sample_is_an_error() {
        let df = df!(
            "time" => [0.0, 1.0, 2.0],
            "H1" => [Some(1.0), None, Some(3.0)],
        )
        .unwrap();
        let err = channels_from_df(&df, "time", &["H1".into()]).unwrap_err();
        assert!(err.to_string().contains("Missing sample in the column `H1`"));
    }
}
