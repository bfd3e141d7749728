use crate::automation::AutomatedParam;
use crate::synth::envelope::EnvelopeParams;
use crate::synth::oscillator::{Oscillator, Waveform};

/*
Voice Triggering
================

A voice is one oscillator plus one automated gain parameter. Pressing a
key does not "play a note" imperatively; it schedules the note's future
on the gain timeline and lets rendering catch up:

  trigger_attack:   anchor at the current gain value, ramp to 1.0 over
                    `attack`, then to `sustain` over `decay`.

  trigger_release:  anchor at the current gain value, ramp to 0.0 over
                    `release`.

Both triggers follow the same cancel / read-current / anchor / ramp
sequence (see automation::param). That sequence is what makes rapid
key mashing glitch-free: an attack landing mid-release departs from the
release's in-flight value, and a release landing mid-attack departs
from wherever the attack had climbed to.

Stage Tracking
--------------

    Idle ──attack──▶ Attacking ──decay ends──▶ Sustaining
      ▲                  │                         │
      │                  └───────release───────────┤
      └──────release ramp ends──── Releasing ◀─────┘

There are no timers. The stage boundaries are timestamps recorded when
the trigger scheduled its ramps; rendering compares the clock against
them as it walks the block.

Disconnection
-------------

Setting the waveform to `Disabled` disconnects the signal path: the
schedule is cancelled, gain is pinned to zero, and the voice is forced
Idle. This guarantees true silence rather than trusting a zero gain
value to already be in effect. Re-enabling reconnects without touching
envelope state, so the next trigger behaves normally.
*/

/// Where a voice currently is in its envelope lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    /// Silent, no pending automation.
    Idle,
    /// Ramping toward the attack peak, then down to sustain.
    Attacking,
    /// Holding at the sustain level while the key is down.
    Sustaining,
    /// Ramping toward zero after key release.
    Releasing,
}

/// One sound-generating unit: oscillator + scheduled gain.
pub struct Voice {
    osc: Oscillator,
    gain: AutomatedParam,
    state: VoiceState,
    /// Signal path connected. False exactly while the waveform is Disabled.
    connected: bool,
    held: bool,
    /// When the decay segment ends and Sustaining begins.
    sustain_at: f64,
    /// When the release segment ends and Idle begins.
    idle_at: f64,
}

impl Voice {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            osc: Oscillator::new(waveform),
            gain: AutomatedParam::new(0.0),
            state: VoiceState::Idle,
            connected: waveform != Waveform::Disabled,
            held: false,
            sustain_at: 0.0,
            idle_at: 0.0,
        }
    }

    /// Schedule the attack/decay curve starting at `now`.
    ///
    /// Valid from any state; a disabled voice ignores the trigger
    /// entirely. Any scheduled future (a release in progress, say) is
    /// superseded.
    pub fn trigger_attack(&mut self, env: &EnvelopeParams, now: f64) {
        if !self.connected {
            return;
        }

        let current = self.gain.value_at(now);
        self.gain.cancel_scheduled(now);
        self.gain.set_value_at(now, current);

        let peak_at = now + env.attack as f64;
        self.sustain_at = peak_at + env.decay as f64;
        self.gain.ramp_to(1.0, peak_at);
        self.gain.ramp_to(env.sustain, self.sustain_at);

        self.state = VoiceState::Attacking;
        self.held = true;
    }

    /// Schedule the release curve starting at `now`.
    ///
    /// A release on an idle or disabled voice is a no-op, not an error;
    /// key-up events arrive whether or not we ever sounded.
    pub fn trigger_release(&mut self, env: &EnvelopeParams, now: f64) {
        self.held = false;
        if self.state == VoiceState::Idle || !self.connected {
            return;
        }

        let current = self.gain.value_at(now);
        self.gain.cancel_scheduled(now);
        self.gain.set_value_at(now, current);

        self.idle_at = now + env.release as f64;
        self.gain.ramp_to(0.0, self.idle_at);

        self.state = VoiceState::Releasing;
    }

    /// Change the waveform. `Disabled` disconnects and silences
    /// immediately; anything else (re)connects, preserving envelope state.
    pub fn set_waveform(&mut self, waveform: Waveform, now: f64) {
        let was_connected = self.connected;
        self.osc.set_waveform(waveform);

        if waveform == Waveform::Disabled {
            self.connected = false;
            self.held = false;
            self.gain.cancel_scheduled(now);
            self.gain.set_value_at(now, 0.0);
            self.state = VoiceState::Idle;
        } else {
            self.connected = true;
            if !was_connected {
                self.osc.reset_phase();
            }
        }
    }

    /// Set pitch instantaneously. Valid in any state; inaudible while
    /// silent, effective the moment sound resumes.
    pub fn set_frequency(&mut self, hz: f32) {
        self.osc.set_frequency(hz);
    }

    /// Render into `out`, overwriting, starting at engine time `now`.
    pub fn render_block(&mut self, out: &mut [f32], now: f64, sample_rate: f32) {
        if !self.connected {
            out.fill(0.0);
            return;
        }

        let dt = 1.0 / sample_rate as f64;
        let mut t = now;
        for sample in out.iter_mut() {
            self.advance_state(t);
            let gain = self.gain.value_at(t);
            *sample = self.osc.next_sample(sample_rate) * gain;
            t += dt;
        }

        self.gain.prune(t);
    }

    /// Stage transitions are implicit in the schedule: compare the clock
    /// against the boundary timestamps the triggers recorded.
    fn advance_state(&mut self, t: f64) {
        match self.state {
            VoiceState::Attacking if t >= self.sustain_at => {
                self.state = VoiceState::Sustaining;
            }
            VoiceState::Releasing if t >= self.idle_at => {
                self.state = VoiceState::Idle;
            }
            _ => {}
        }
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn waveform(&self) -> Waveform {
        self.osc.waveform()
    }

    pub fn frequency(&self) -> f32 {
        self.osc.frequency()
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Instantaneous gain, for metering and state snapshots.
    pub fn level_at(&self, now: f64) -> f32 {
        self.gain.value_at(now)
    }

    pub fn is_active(&self) -> bool {
        self.state != VoiceState::Idle
    }

    #[cfg(test)]
    pub(crate) fn gain(&self) -> &AutomatedParam {
        &self.gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(attack: f32, decay: f32, sustain: f32, release: f32) -> EnvelopeParams {
        EnvelopeParams::new(attack, decay, sustain, release)
    }

    #[test]
    fn attack_schedules_peak_then_sustain() {
        let mut voice = Voice::new(Waveform::Sine);
        let env = env(0.1, 0.2, 0.5, 0.3);

        voice.trigger_attack(&env, 1.0);

        assert_eq!(voice.state(), VoiceState::Attacking);
        assert!((voice.level_at(1.1) - 1.0).abs() < 1e-6);
        assert!((voice.level_at(1.3) - 0.5).abs() < 1e-6);
        assert!((voice.level_at(9.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn release_mid_decay_starts_from_in_flight_value() {
        let mut voice = Voice::new(Waveform::Sine);
        let env = env(0.1, 0.2, 0.5, 0.4);

        voice.trigger_attack(&env, 0.0);
        // Halfway through decay: 1.0 -> 0.5 over 0.2s, so 0.75 at t=0.2.
        let mid_decay = 0.2;
        let expected = 0.75;
        assert!((voice.level_at(mid_decay) - expected).abs() < 1e-5);

        voice.trigger_release(&env, mid_decay);

        // No discontinuity at the handoff...
        assert!((voice.level_at(mid_decay) - expected).abs() < 1e-5);
        // ...and the release ramps linearly from there to zero.
        assert!((voice.level_at(mid_decay + 0.2) - expected / 2.0).abs() < 1e-5);
        assert!(voice.level_at(mid_decay + 0.4).abs() < 1e-6);
    }

    #[test]
    fn retrigger_mid_release_starts_from_release_value() {
        let mut voice = Voice::new(Waveform::Sine);
        let env = env(0.1, 0.1, 0.8, 1.0);

        voice.trigger_attack(&env, 0.0);
        voice.trigger_release(&env, 0.5); // sustaining at 0.8 by then

        // Halfway through release: 0.8 -> 0 over 1.0s, so 0.4 at t=1.0.
        let retrigger_at = 1.0;
        assert!((voice.level_at(retrigger_at) - 0.4).abs() < 1e-5);

        voice.trigger_attack(&env, retrigger_at);

        assert!((voice.level_at(retrigger_at) - 0.4).abs() < 1e-5);
        assert!((voice.level_at(retrigger_at + 0.1) - 1.0).abs() < 1e-5);
        assert_eq!(voice.state(), VoiceState::Attacking);
    }

    #[test]
    fn double_release_on_idle_voice_schedules_nothing() {
        let mut voice = Voice::new(Waveform::Sine);
        let env = env(0.01, 0.01, 0.5, 0.1);

        voice.trigger_release(&env, 0.0);
        let count_after_first = voice.gain().event_count();
        voice.trigger_release(&env, 0.1);

        assert_eq!(voice.gain().event_count(), count_after_first);
        assert!(!voice.gain().has_pending(0.1));
        assert_eq!(voice.state(), VoiceState::Idle);
    }

    #[test]
    fn disable_mid_sustain_silences_immediately() {
        let mut voice = Voice::new(Waveform::Saw);
        let env = env(0.01, 0.01, 0.7, 0.5);

        voice.trigger_attack(&env, 0.0);
        assert!((voice.level_at(1.0) - 0.7).abs() < 1e-5);

        voice.set_waveform(Waveform::Disabled, 1.0);

        assert_eq!(voice.state(), VoiceState::Idle);
        assert_eq!(voice.level_at(1.0), 0.0);

        // Releases while disabled are no-ops.
        voice.trigger_release(&env, 1.1);
        assert!(!voice.gain().has_pending(1.1));

        // Re-enabling preserves (idle) envelope state; a fresh attack works.
        voice.set_waveform(Waveform::Saw, 1.2);
        voice.trigger_attack(&env, 1.2);
        assert_eq!(voice.state(), VoiceState::Attacking);
        assert!((voice.level_at(1.22) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn disabled_voice_ignores_attack() {
        let mut voice = Voice::new(Waveform::Disabled);
        let env = EnvelopeParams::default();

        voice.trigger_attack(&env, 0.0);
        assert_eq!(voice.state(), VoiceState::Idle);
        assert!(!voice.gain().has_pending(0.0));

        let mut out = [1.0f32; 32];
        voice.render_block(&mut out, 0.0, 1_000.0);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn rendering_crosses_stage_boundaries() {
        let sample_rate = 1_000.0;
        let mut voice = Voice::new(Waveform::Sine);
        let env = env(0.01, 0.02, 0.5, 0.05);

        voice.trigger_attack(&env, 0.0);
        let mut out = vec![0.0f32; 100]; // 0.1s, past attack+decay
        voice.render_block(&mut out, 0.0, sample_rate);
        assert_eq!(voice.state(), VoiceState::Sustaining);

        voice.trigger_release(&env, 0.1);
        let mut out = vec![0.0f32; 100];
        voice.render_block(&mut out, 0.1, sample_rate);
        assert_eq!(voice.state(), VoiceState::Idle);
        assert!(voice.level_at(0.2).abs() < 1e-6);
    }

    #[test]
    fn envelope_change_does_not_rewrite_in_flight_ramp() {
        let mut voice = Voice::new(Waveform::Sine);
        let mut shared = env(0.2, 0.1, 0.5, 0.3);

        voice.trigger_attack(&shared, 0.0);
        shared.set(0.001, 0.001, 0.9, 0.001); // later UI edit

        // The attack still peaks at the originally scheduled time.
        assert!((voice.level_at(0.1) - 0.5).abs() < 1e-5);
        assert!((voice.level_at(0.2) - 1.0).abs() < 1e-5);
    }
}
