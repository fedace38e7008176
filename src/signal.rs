//! Welch-averaged spectral estimates over real-valued channel data.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::LdvwError;

/// Segment length and hop, in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmenting {
    pub nfft: usize,
    pub step: usize,
}

impl Segmenting {
    /// `secpfft` seconds per FFT, consecutive FFTs sharing `overlap` of their length.
    pub fn new(secpfft: f64, overlap: f64, sample_rate: f64) -> Result<Self, LdvwError> {
        if !(secpfft > 0.0) {
            return Err(LdvwError::FftParameter(format!(
                "secpfft must be positive, got {secpfft}"
            )));
        }
        if !(0.0..1.0).contains(&overlap) {
            return Err(LdvwError::FftParameter(format!(
                "overlap must be in [0, 1), got {overlap}"
            )));
        }
        let nfft = (secpfft * sample_rate).round() as usize;
        if nfft < 2 {
            return Err(LdvwError::FftParameter(format!(
                "{secpfft} s at {sample_rate} Hz is shorter than two samples"
            )));
        }
        let step = nfft - (overlap * nfft as f64).round() as usize;
        Ok(Self {
            nfft,
            step: step.max(1),
        })
    }

    /// Start offsets of every full segment in `len` samples.
    pub fn starts(&self, len: usize) -> impl Iterator<Item = usize> {
        let last = len.checked_sub(self.nfft);
        (0..).step_by(self.step).take_while(move |&s| matches!(last, Some(last) if s <= last))
    }

    /// Fails unless `len` samples of channel `name` fill at least one FFT.
    pub fn require(&self, name: &str, len: usize) -> Result<(), LdvwError> {
        if len < self.nfft {
            return Err(LdvwError::TooFewSamples {
                channel: name.to_string(),
                got: len,
                need: self.nfft,
            });
        }
        Ok(())
    }

    /// Bin frequencies. Call [`Segmenting::require`] first: `nfft` is unbounded.
    pub fn frequencies(&self, sample_rate: f64) -> Vec<f64> {
        (0..=self.nfft / 2)
            .map(|k| k as f64 * sample_rate / self.nfft as f64)
            .collect()
    }
}

/// Periodic Hann window (for FFT/STFT, COLA)
/// w[i] = 0.5 * (1 - cos(2πi/N))
pub fn hann_window(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let two_pi = std::f64::consts::PI * 2.0;
            (0..n)
                .map(|i| 0.5 * (1.0 - (two_pi * i as f64 / n as f64).cos()))
                .collect()
        }
    }
}

/// One-sided spectra of the windowed, mean-removed segments of a channel.
struct SegmentSpectra {
    spectra: Vec<Vec<Complex<f64>>>,
    /// `fs * sum(w^2)`, the density normalisation.
    norm: f64,
}

impl SegmentSpectra {
    fn compute(x: &[f64], fs: f64, seg: Segmenting, planner: &mut FftPlanner<f64>) -> Self {
        let window = hann_window(seg.nfft);
        let fft = planner.plan_fft_forward(seg.nfft);
        let bins = seg.nfft / 2 + 1;
        let mut spectra = vec![];
        for start in seg.starts(x.len()) {
            let chunk = &x[start..start + seg.nfft];
            let mean = chunk.iter().sum::<f64>() / seg.nfft as f64;
            let mut buf: Vec<Complex<f64>> = chunk
                .iter()
                .zip(&window)
                .map(|(&v, &w)| Complex::new((v - mean) * w, 0.0))
                .collect();
            fft.process(&mut buf);
            buf.truncate(bins);
            spectra.push(buf);
        }
        let norm = fs * window.iter().map(|w| w * w).sum::<f64>();
        Self { spectra, norm }
    }

    /// Averaged one-sided cross density `<conj(X) Y>`.
    fn cross(&self, other: &Self, nfft: usize) -> Vec<Complex<f64>> {
        let bins = nfft / 2 + 1;
        let count = self.spectra.len().min(other.spectra.len());
        let mut out = vec![Complex::new(0.0, 0.0); bins];
        if count == 0 {
            return out;
        }
        for (a, b) in self.spectra.iter().zip(&other.spectra) {
            for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b)) {
                *o += x.conj() * y;
            }
        }
        let scale = 1.0 / (count as f64 * self.norm);
        for (k, o) in out.iter_mut().enumerate() {
            let nyquist = nfft % 2 == 0 && k == nfft / 2;
            let one_sided = if k == 0 || nyquist { 1.0 } else { 2.0 };
            *o *= scale * one_sided;
        }
        out
    }
}

/// Welch power spectral density, one value per bin of `seg.frequencies`.
pub fn welch_psd(name: &str, x: &[f64], fs: f64, seg: Segmenting) -> Result<Vec<f64>, LdvwError> {
    seg.require(name, x.len())?;
    let mut planner = FftPlanner::new();
    let spectra = SegmentSpectra::compute(x, fs, seg, &mut planner);
    Ok(spectra.cross(&spectra, seg.nfft).iter().map(|c| c.re).collect())
}

pub fn welch_asd(name: &str, x: &[f64], fs: f64, seg: Segmenting) -> Result<Vec<f64>, LdvwError> {
    Ok(welch_psd(name, x, fs, seg)?
        .into_iter()
        .map(f64::sqrt)
        .collect())
}

/// Welch cross spectral density of `x` against `y`.
pub fn welch_csd(
    name: &str,
    x: &[f64],
    y: &[f64],
    fs: f64,
    seg: Segmenting,
) -> Result<Vec<Complex<f64>>, LdvwError> {
    seg.require(name, x.len().min(y.len()))?;
    let mut planner = FftPlanner::new();
    let sx = SegmentSpectra::compute(x, fs, seg, &mut planner);
    let sy = SegmentSpectra::compute(y, fs, seg, &mut planner);
    Ok(sx.cross(&sy, seg.nfft))
}

/// Magnitude-squared coherence `|Pxy|^2 / (Pxx Pyy)`, zero where either power vanishes.
pub fn coherence(
    name: &str,
    x: &[f64],
    y: &[f64],
    fs: f64,
    seg: Segmenting,
) -> Result<Vec<f64>, LdvwError> {
    seg.require(name, x.len().min(y.len()))?;
    let mut planner = FftPlanner::new();
    let sx = SegmentSpectra::compute(x, fs, seg, &mut planner);
    let sy = SegmentSpectra::compute(y, fs, seg, &mut planner);
    let pxx = sx.cross(&sx, seg.nfft);
    let pyy = sy.cross(&sy, seg.nfft);
    let pxy = sx.cross(&sy, seg.nfft);
    Ok(pxy
        .iter()
        .zip(pxx.iter().zip(&pyy))
        .map(|(xy, (xx, yy))| {
            let denom = xx.re * yy.re;
            if denom > 0.0 {
                (xy.norm_sqr() / denom).min(1.0)
            } else {
                0.0
            }
        })
        .collect())
}

/// Consecutive non-overlapping windows of `stride` samples; a short tail is dropped.
pub fn strides(len: usize, stride: usize) -> impl Iterator<Item = std::ops::Range<usize>> {
    let count = if stride == 0 { 0 } else { len / stride };
    (0..count).map(move |i| i * stride..(i + 1) * stride)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sine(freq: f64, fs: f64, n: usize, amp: f64) -> Vec<f64> {
        (0..n)
            .map(|i| amp * (2.0 * std::f64::consts::PI * freq * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn hann_window_mean_square() {
        let w = hann_window(1024);
        assert_relative_eq!(w[0], 0.0);
        let u = w.iter().map(|x| x * x).sum::<f64>() / 1024.0;
        assert_relative_eq!(u, 0.375, epsilon = 1e-9);
    }

    #[test]
    fn segmenting_from_seconds() {
        let seg = Segmenting::new(0.5, 0.5, 256.0).unwrap();
        assert_eq!(seg, Segmenting { nfft: 128, step: 64 });
        assert_eq!(seg.starts(320).collect::<Vec<_>>(), vec![0, 64, 128, 192]);
        assert_eq!(seg.starts(100).count(), 0);
        assert_eq!(seg.frequencies(256.0).len(), 65);
        assert_relative_eq!(seg.frequencies(256.0)[64], 128.0);
    }

    #[test]
    fn segmenting_rejects_bad_parameters() {
        assert!(Segmenting::new(0.0, 0.5, 256.0).is_err());
        assert!(Segmenting::new(1.0, 1.0, 256.0).is_err());
        assert!(Segmenting::new(1.0, -0.1, 256.0).is_err());
        assert!(Segmenting::new(0.001, 0.0, 256.0).is_err());
    }

    #[test]
    fn psd_peaks_at_sine_and_integrates_to_power() {
        let fs = 256.0;
        let x = sine(32.0, fs, 256 * 8, 2.0);
        let seg = Segmenting::new(1.0, 0.5, fs).unwrap();
        let psd = welch_psd("x", &x, fs, seg).unwrap();
        let peak = psd
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| k)
            .unwrap();
        assert_eq!(peak, 32);
        // Mean square of a sine of amplitude 2 is 2.
        let df = fs / seg.nfft as f64;
        let power: f64 = psd.iter().sum::<f64>() * df;
        assert_relative_eq!(power, 2.0, max_relative = 1e-6);
    }

    #[test]
    fn asd_is_root_of_psd() {
        let fs = 64.0;
        let x = sine(8.0, fs, 256, 1.0);
        let seg = Segmenting::new(1.0, 0.0, fs).unwrap();
        let psd = welch_psd("x", &x, fs, seg).unwrap();
        let asd = welch_asd("x", &x, fs, seg).unwrap();
        assert_relative_eq!(asd[8] * asd[8], psd[8], max_relative = 1e-12);
    }

    #[test]
    fn csd_of_a_channel_with_itself_is_its_psd() {
        let fs = 64.0;
        let x = sine(5.0, fs, 512, 1.0);
        let seg = Segmenting::new(1.0, 0.5, fs).unwrap();
        let psd = welch_psd("x", &x, fs, seg).unwrap();
        let csd = welch_csd("x", &x, &x, fs, seg).unwrap();
        for (p, c) in psd.iter().zip(&csd) {
            assert_relative_eq!(*p, c.re, max_relative = 1e-12, epsilon = 1e-18);
            assert_relative_eq!(c.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn coherence_of_scaled_copy_is_one() {
        let fs = 128.0;
        let x: Vec<f64> = sine(10.0, fs, 1024, 1.0)
            .iter()
            .zip(sine(23.0, fs, 1024, 0.5))
            .map(|(a, b)| a + b)
            .collect();
        let y: Vec<f64> = x.iter().map(|v| -3.0 * v).collect();
        let seg = Segmenting::new(1.0, 0.5, fs).unwrap();
        let coh = coherence("y", &x, &y, fs, seg).unwrap();
        assert_relative_eq!(coh[10], 1.0, epsilon = 1e-9);
        assert_relative_eq!(coh[23], 1.0, epsilon = 1e-9);
        assert!(coh.iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn too_few_samples_names_the_channel() {
        let seg = Segmenting::new(1.0, 0.5, 64.0).unwrap();
        let err = welch_psd("H1:LOSC", &[0.0; 10], 64.0, seg).unwrap_err();
        assert!(err.to_string().contains("H1:LOSC"));
        assert!(err.to_string().contains("64"));
    }

    #[test]
    fn strides_drop_the_tail() {
        let s: Vec<_> = strides(10, 4).collect();
        assert_eq!(s, vec![0..4, 4..8]);
        assert_eq!(strides(10, 0).count(), 0);
    }

    #[test]
    fn huge_fft_length_is_rejected_not_allocated() {
        let seg = Segmenting::new(1e30, 0.5, 64.0).unwrap();
        let err = seg.require("H1:STRAIN", 256).unwrap_err();
        assert!(matches!(err, LdvwError::TooFewSamples { got: 256, .. }));
    }
}
