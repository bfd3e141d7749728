#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f32::consts::TAU;

/// Audible frequency floor/ceiling. Out-of-range requests are clamped,
/// never rejected; the instrument keeps playing.
const MIN_FREQ: f32 = 20.0;
const MAX_FREQ: f32 = 20_000.0;

/// The waveform a voice generates.
///
/// `Disabled` is a real variant, not a missing value: a disabled voice is
/// disconnected from the signal path and never sounds, regardless of what
/// its gain automation says.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Triangle,
    Square,
    Disabled,
}

impl Waveform {
    /// All variants, in UI cycling order.
    pub const ALL: [Waveform; 5] = [
        Waveform::Sine,
        Waveform::Saw,
        Waveform::Triangle,
        Waveform::Square,
        Waveform::Disabled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Saw => "saw",
            Waveform::Triangle => "tri",
            Waveform::Square => "sqr",
            Waveform::Disabled => "off",
        }
    }
}

/// Phase-accumulator oscillator: one sample per call, no allocation.
///
/// Stands in for the browser's native oscillator node. Frequency changes
/// are instantaneous (no ramp) and only audible once the voice's gain
/// curve lets sound through.
pub struct Oscillator {
    waveform: Waveform,
    frequency: f32,
    /// Normalized phase in [0, 1).
    phase: f32,
}

impl Oscillator {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            frequency: 440.0,
            phase: 0.0,
        }
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Set the pitch, clamped to the audible range. Non-finite input is
    /// ignored and the previous frequency stands.
    pub fn set_frequency(&mut self, hz: f32) {
        if hz.is_finite() {
            self.frequency = hz.clamp(MIN_FREQ, MAX_FREQ);
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Produce the next sample and advance the phase.
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let sample = match self.waveform {
            Waveform::Sine => (TAU * self.phase).sin(),
            Waveform::Saw => 2.0 * self.phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (self.phase - 0.5).abs(),
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Disabled => 0.0,
        };

        self.phase += self.frequency / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }

    /// Reset phase to the cycle start (used when a voice reconnects, so a
    /// re-enabled square does not begin mid-edge).
    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn sine_matches_closed_form() {
        let mut osc = Oscillator::new(Waveform::Sine);
        osc.set_frequency(440.0);

        let mut samples = vec![0.0f32; 128];
        for s in samples.iter_mut() {
            *s = osc.next_sample(SAMPLE_RATE);
        }

        // sample n should be sin(2pi f n / sr)
        let n = 12;
        let expected = (TAU * 440.0 * n as f32 / SAMPLE_RATE).sin();
        assert!(
            (samples[n] - expected).abs() < 1e-5,
            "expected {expected}, got {}",
            samples[n]
        );
    }

    #[test]
    fn disabled_renders_silence() {
        let mut osc = Oscillator::new(Waveform::Disabled);
        for _ in 0..64 {
            assert_eq!(osc.next_sample(SAMPLE_RATE), 0.0);
        }
    }

    #[test]
    fn square_swings_full_scale() {
        let mut osc = Oscillator::new(Waveform::Square);
        osc.set_frequency(1_000.0);
        let samples: Vec<f32> = (0..96).map(|_| osc.next_sample(SAMPLE_RATE)).collect();
        assert!(samples.contains(&1.0));
        assert!(samples.contains(&-1.0));
        assert!(samples.iter().all(|s| *s == 1.0 || *s == -1.0));
    }

    #[test]
    fn frequency_is_clamped_to_audible_range() {
        let mut osc = Oscillator::new(Waveform::Sine);
        osc.set_frequency(-5.0);
        assert_eq!(osc.frequency(), MIN_FREQ);
        osc.set_frequency(1.0e9);
        assert_eq!(osc.frequency(), MAX_FREQ);
        osc.set_frequency(f32::NAN);
        assert_eq!(osc.frequency(), MAX_FREQ); // unchanged
    }
}
