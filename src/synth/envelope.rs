#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// ADSR parameters shared by every voice.
///
/// This is a value object: it holds durations and a level, nothing else.
/// Voices read it at the moment a trigger occurs; changing it afterwards
/// never rewrites a ramp that is already scheduled.
///
/// All setters clamp instead of rejecting. A slider can hand us anything
/// and the instrument must keep playing.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    /// Seconds to ramp from the trigger value up to 1.0.
    pub attack: f32,
    /// Seconds to ramp from 1.0 down to the sustain level.
    pub decay: f32,
    /// Level held while the key stays down (0.0 - 1.0).
    pub sustain: f32,
    /// Seconds to ramp from the release value down to 0.0.
    pub release: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        // Punchy pluck-ish defaults: near-instant attack, audible decay,
        // low sustain, long tail.
        Self {
            attack: 0.001,
            decay: 0.5,
            sustain: 0.1,
            release: 0.8,
        }
    }
}

impl EnvelopeParams {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: clamp_time(attack),
            decay: clamp_time(decay),
            sustain: clamp_level(sustain),
            release: clamp_time(release),
        }
    }

    /// Replace the whole tuple at once, clamping each field.
    ///
    /// Replacing atomically means a reader on another turn of the event
    /// loop never observes a half-updated envelope.
    pub fn set(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        *self = Self::new(attack, decay, sustain, release);
    }

    /// The (time, level) polyline of one full envelope cycle, normalized
    /// to the unit square for plotting.
    ///
    /// The sustain plateau has no natural duration (it lasts as long as
    /// the key is held), so it is drawn as a third of the timed total.
    pub fn curve_points(&self) -> [(f64, f64); 5] {
        let attack = self.attack as f64;
        let decay = self.decay as f64;
        let release = self.release as f64;
        let sustain = self.sustain as f64;

        let timed = (attack + decay + release).max(1e-3);
        let hold = timed / 3.0;
        let total = timed + hold;

        [
            (0.0, 0.0),
            (attack / total, 1.0),
            ((attack + decay) / total, sustain),
            ((attack + decay + hold) / total, sustain),
            (1.0, 0.0),
        ]
    }
}

fn clamp_time(seconds: f32) -> f32 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}

fn clamp_level(level: f32) -> f32 {
    if level.is_finite() {
        level.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_fields_are_clamped() {
        let mut env = EnvelopeParams::default();
        env.set(-1.0, 2.0, 1.5, 0.3);

        assert_eq!(env.attack, 0.0);
        assert_eq!(env.decay, 2.0);
        assert_eq!(env.sustain, 1.0);
        assert_eq!(env.release, 0.3);
    }

    #[test]
    fn non_finite_inputs_fall_back_to_zero() {
        let env = EnvelopeParams::new(f32::NAN, f32::INFINITY, f32::NAN, 0.5);
        assert_eq!(env.attack, 0.0);
        assert_eq!(env.sustain, 0.0);
        assert_eq!(env.release, 0.5);
    }

    #[test]
    fn curve_peaks_then_settles_at_sustain() {
        let env = EnvelopeParams::new(0.1, 0.1, 0.6, 0.2);
        let points = env.curve_points();

        assert_eq!(points[0], (0.0, 0.0));
        assert_eq!(points[1].1, 1.0);
        assert!((points[2].1 - 0.6).abs() < 1e-6);
        assert!((points[3].1 - 0.6).abs() < 1e-6);
        assert_eq!(points[4], (1.0, 0.0));

        for pair in points.windows(2) {
            assert!(pair[0].0 < pair[1].0, "curve x must advance");
        }
    }

    #[test]
    fn all_zero_envelope_still_plots() {
        let env = EnvelopeParams::new(0.0, 0.0, 0.0, 0.0);
        let points = env.curve_points();
        assert!(points.iter().all(|(x, y)| x.is_finite() && y.is_finite()));
    }
}
