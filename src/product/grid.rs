use std::ops::Range;

use plotly::{
    common::{ColorScale, ColorScalePalette},
    HeatMap,
};

use crate::{
    args::{FftArgs, StrideArgs},
    data::TimeSeries,
    error::LdvwError,
    signal::{strides, Segmenting},
};

/// Per-stride spectra of one channel, laid out for a heatmap.
#[derive(Debug, Clone)]
pub(crate) struct TimeFrequency {
    /// Stride start times relative to the first sample.
    pub times: Vec<f64>,
    pub frequencies: Vec<f64>,
    /// One column per stride, one value per frequency.
    pub columns: Vec<Vec<f64>>,
}

impl TimeFrequency {
    pub fn compute(
        ch: &TimeSeries,
        fft: &FftArgs,
        stride: &StrideArgs,
        mut column: impl FnMut(Range<usize>, Segmenting) -> Result<Vec<f64>, LdvwError>,
    ) -> Result<Self, LdvwError> {
        let seconds = stride.seconds(fft);
        if seconds < fft.secpfft {
            return Err(LdvwError::FftParameter(format!(
                "stride {seconds} s is shorter than secpfft {} s",
                fft.secpfft
            )));
        }
        let seg = Segmenting::new(fft.secpfft, fft.overlap, ch.sample_rate)?;
        let stride_len = ch.samples_in(seconds).max(seg.nfft);
        if ch.len() < stride_len {
            return Err(LdvwError::TooFewSamples {
                channel: ch.name.clone(),
                got: ch.len(),
                need: stride_len,
            });
        }

        let mut times = vec![];
        let mut columns = vec![];
        for range in strides(ch.len(), stride_len) {
            times.push(range.start as f64 / ch.sample_rate);
            columns.push(column(range, seg)?);
        }
        Ok(Self {
            times,
            frequencies: seg.frequencies(ch.sample_rate),
            columns,
        })
    }

    /// Rows per frequency, starting at bin `first`.
    pub fn rows(&self, first: usize) -> Vec<Vec<f64>> {
        (first..self.frequencies.len())
            .map(|k| self.columns.iter().map(|c| c[k]).collect())
            .collect()
    }

    pub fn heatmap(&self, name: &str, skip_dc: bool) -> Box<HeatMap<f64, f64, Vec<f64>>> {
        let first = usize::from(skip_dc);
        HeatMap::new(
            self.times.clone(),
            self.frequencies[first..].to_vec(),
            self.rows(first),
        )
        .name(name)
        .color_scale(ColorScale::Palette(ColorScalePalette::Viridis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::tests::sine;

    fn fft() -> FftArgs {
        FftArgs {
            secpfft: 0.5,
            overlap: 0.5,
        }
    }

    #[test]
    fn one_column_per_stride() {
        let ch = sine("H1", 8.0, 64.0, 5.5);
        let tf = TimeFrequency::compute(&ch, &fft(), &StrideArgs { stride: None }, |r, _| {
            Ok(vec![r.start as f64; 17])
        })
        .unwrap();
        assert_eq!(tf.times, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(tf.frequencies.len(), 17);
        let rows = tf.rows(1);
        assert_eq!(rows.len(), 16);
        assert_eq!(rows[0], vec![0.0, 64.0, 128.0, 192.0, 256.0]);
    }

    #[test]
    fn stride_shorter_than_fft_is_rejected() {
        let ch = sine("H1", 8.0, 64.0, 4.0);
        let err = TimeFrequency::compute(
            &ch,
            &fft(),
            &StrideArgs { stride: Some(0.25) },
            |_, _| Ok(vec![]),
        )
        .unwrap_err();
        assert!(matches!(err, LdvwError::FftParameter(_)));
    }

    #[test]
    fn needs_one_full_stride() {
        let ch = sine("H1", 8.0, 64.0, 0.75);
        let err = TimeFrequency::compute(&ch, &fft(), &StrideArgs { stride: None }, |_, _| {
            Ok(vec![])
        })
        .unwrap_err();
        assert!(matches!(err, LdvwError::TooFewSamples { need: 64, .. }));
    }
}
