//! Spectrum analyzer widget
//!
//! Hann-windowed FFT folded into log-spaced bands, with a slow fall so
//! short notes stay readable.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

const BANDS: usize = 48;
const FLOOR_DB: f64 = -100.0;
/// dB lost per UI frame when the signal drops.
const FALL_DB: f64 = 1.5;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// FFT bin range `[lo, hi)` for each band.
    bands: Vec<(usize, usize)>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 Hz, dB) per band
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    /// `buffer_len` is the FFT size and must match what [`Self::update`] gets.
    pub fn new(buffer_len: usize, sample_rate: u32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(buffer_len);

        let denom = buffer_len.saturating_sub(1).max(1) as f32;
        let window = (0..buffer_len)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        let nyquist = (sample_rate as f64 / 2.0).min(20_000.0).max(40.0);
        let half = (buffer_len / 2).max(1);
        let hz_per_bin = sample_rate as f64 / buffer_len.max(1) as f64;
        let edge = |i: usize| 20.0 * (nyquist / 20.0).powf(i as f64 / BANDS as f64);

        let mut bands = Vec::with_capacity(BANDS);
        let mut spectrum = Vec::with_capacity(BANDS);
        for i in 0..BANDS {
            let (lo_hz, hi_hz) = (edge(i), edge(i + 1));
            let lo = ((lo_hz / hz_per_bin) as usize).min(half - 1);
            let hi = ((hi_hz / hz_per_bin).ceil() as usize).clamp(lo + 1, half);
            bands.push((lo, hi));
            spectrum.push(((lo_hz * hi_hz).sqrt().log10(), FLOOR_DB));
        }

        Self {
            window,
            bands,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            spectrum,
        }
    }

    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }
        for ((dst, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *dst = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (&(lo, hi), (_, db)) in self.bands.iter().zip(self.spectrum.iter_mut()) {
            let power = self.scratch[lo..hi].iter().map(|c| c.norm_sqr()).sum::<f32>() / (hi - lo) as f32;
            let level = (10.0 * (power.max(1e-12) as f64).log10()).max(FLOOR_DB);
            *db = level.max(*db - FALL_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let (lo, hi) = match (spectrum.first(), spectrum.last()) {
        (Some(first), Some(last)) => (first.0, last.0.max(first.0 + 0.1)),
        _ => (1.3, 4.3),
    };
    let top = spectrum.iter().map(|&(_, db)| db).fold(0.0, f64::max) + 10.0;

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([lo, hi])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, top])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_peaks_in_its_band() {
        let rate = 8000;
        let mut analyzer = SpectrumAnalyzer::new(1024, rate);
        let tone: Vec<f32> = (0..1024)
            .map(|i| (std::f32::consts::TAU * 1000.0 * i as f32 / rate as f32).sin())
            .collect();
        analyzer.update(&tone);
        let (loudest, _) = analyzer
            .data()
            .iter()
            .copied()
            .fold((0.0, f64::MIN), |best, (hz, db)| if db > best.1 { (hz, db) } else { best });
        let hz = 10f64.powf(loudest);
        assert!((800.0..1250.0).contains(&hz), "{hz}");
    }

    #[test]
    fn wrong_length_is_ignored() {
        let mut analyzer = SpectrumAnalyzer::new(256, 8000);
        analyzer.update(&[1.0; 100]);
        assert!(analyzer.data().iter().all(|&(_, db)| db == FLOOR_DB));
    }
}
