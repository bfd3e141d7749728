//! Spectrum analyzer widget: FFT of the visualization buffer with
//! log-spaced display bins.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Number of display bins across the frequency axis.
const SPECTRUM_BINS: usize = 48;

const MIN_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    /// Hann window, precomputed for the fixed buffer length.
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (fft_bin_index, display_frequency) per display bin, log-spaced
    /// from 20 Hz to Nyquist.
    bins: Vec<(usize, f64)>,
    /// Current display data: (frequency_hz, magnitude_db).
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(buffer_len: usize, sample_rate: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(buffer_len);

        let window: Vec<f32> = (0..buffer_len)
            .map(|i| {
                let denom = buffer_len.saturating_sub(1).max(1) as f32;
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos())
            })
            .collect();

        let nyquist = (sample_rate as f64 / 2.0).max(1.0);
        let min_freq = 20.0f64.min(nyquist);
        let ratio = nyquist / min_freq;
        let half = (buffer_len / 2).max(1);

        let bins: Vec<(usize, f64)> = (0..SPECTRUM_BINS)
            .map(|i| {
                let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
                let freq = min_freq * ratio.powf(t);
                let index = ((freq * buffer_len as f64 / sample_rate as f64).round() as usize)
                    .min(half - 1);
                (index, freq)
            })
            .collect();

        let spectrum = bins.iter().map(|&(_, f)| (f, MIN_DB)).collect();

        Self {
            window,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            bins,
            spectrum,
        }
    }

    /// Recompute the spectrum from the latest audio buffer. Ignores
    /// buffers that do not match the planned FFT size.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for (slot, (&sample, &w)) in self
            .scratch
            .iter_mut()
            .zip(buffer.iter().zip(self.window.iter()))
        {
            slot.re = sample * w;
            slot.im = 0.0;
        }

        self.fft.process(&mut self.scratch);

        for (out, &(index, freq)) in self.spectrum.iter_mut().zip(self.bins.iter()) {
            let bin = self.scratch[index];
            let power = (bin.re * bin.re + bin.im * bin.im).max(1e-12);
            *out = (freq, (10.0 * (power as f64).log10()).max(MIN_DB));
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

/// Render the spectrum chart.
pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let max_freq = spectrum.iter().map(|(f, _)| *f).fold(1.0, f64::max);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, max_freq])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([MIN_DB, 10.0])
                .labels(vec!["-100", "-60", "-20", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
