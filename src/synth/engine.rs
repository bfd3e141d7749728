use crate::synth::command::{Command, CommandReceiver};
use crate::synth::envelope::EnvelopeParams;
use crate::synth::oscillator::Waveform;
use crate::synth::voice::{Voice, VoiceState};

/// Fixed voice count: four layered oscillator slots, as on the original
/// instrument panel.
pub const NUM_VOICES: usize = 4;

/// Allocation-free engine status for the UI thread. Sent over a ring
/// buffer once per audio callback.
#[derive(Debug, Clone, Copy)]
pub struct EngineSnapshot {
    pub activated: bool,
    pub envelope: EnvelopeParams,
    pub clock: f64,
    pub voices: [VoiceStatus; NUM_VOICES],
}

#[derive(Debug, Clone, Copy)]
pub struct VoiceStatus {
    pub waveform: Waveform,
    pub state: VoiceState,
    pub level: f32,
}

/// The synthesizer: a fixed array of voices, one shared envelope, and a
/// sample clock.
///
/// All triggering happens through [`Command`]s drained at the top of
/// each render block, so exactly one logical writer ever touches a
/// voice's schedule. The startup gate models the host's
/// gesture-before-audio policy: until `Activate` arrives the engine
/// renders silence and ignores everything else. That is degraded
/// behavior, not an error, so nothing here can throw back into the
/// input path.
pub struct SynthEngine<R: CommandReceiver> {
    voices: Vec<Voice>,
    envelope: EnvelopeParams,
    rx: R,
    sample_rate: f32,
    clock: f64,
    activated: bool,
    temp_buffer: Vec<f32>,
}

impl<R: CommandReceiver> SynthEngine<R> {
    pub fn new(sample_rate: f32, rx: R) -> Self {
        // Slot 0 starts audible so the first key press makes sound;
        // the rest start disconnected, as the original panel did.
        let voices = (0..NUM_VOICES)
            .map(|slot| {
                let waveform = if slot == 0 {
                    Waveform::Sine
                } else {
                    Waveform::Disabled
                };
                Voice::new(waveform)
            })
            .collect();

        Self {
            voices,
            envelope: EnvelopeParams::default(),
            rx,
            sample_rate,
            clock: 0.0,
            activated: false,
            temp_buffer: vec![0.0; crate::MAX_BLOCK_SIZE],
        }
    }

    /// Drain pending commands, then render and sum all voices into `out`.
    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Some(cmd) = self.rx.pop() {
            self.apply(cmd);
        }

        out.fill(0.0);

        if self.activated {
            let now = self.clock;
            for voice in &mut self.voices {
                if !voice.is_active() {
                    continue;
                }
                let block = &mut self.temp_buffer[..out.len()];
                voice.render_block(block, now, self.sample_rate);
                for (o, v) in out.iter_mut().zip(block.iter()) {
                    *o += v;
                }
            }
        }

        self.clock += out.len() as f64 / self.sample_rate as f64;
    }

    /// Apply one command at the current clock position.
    pub fn apply(&mut self, cmd: Command) {
        if !self.activated {
            // Everything before the gate opens is a silent no-op.
            if cmd == Command::Activate {
                self.activated = true;
            }
            return;
        }

        let now = self.clock;
        match cmd {
            Command::Activate => {}
            Command::Attack { freq } => {
                for voice in &mut self.voices {
                    voice.set_frequency(freq);
                    voice.trigger_attack(&self.envelope, now);
                }
            }
            Command::Release | Command::AllNotesOff => {
                for voice in &mut self.voices {
                    voice.trigger_release(&self.envelope, now);
                }
            }
            Command::SetWaveform { slot, waveform } => {
                if let Some(voice) = self.voices.get_mut(slot) {
                    voice.set_waveform(waveform, now);
                }
            }
            Command::SetEnvelope {
                attack,
                decay,
                sustain,
                release,
            } => {
                self.envelope.set(attack, decay, sustain, release);
            }
        }
    }

    /// Trigger one slot directly (the per-voice surface of the engine;
    /// the command path fans out over all slots).
    pub fn trigger_attack(&mut self, slot: usize, freq: f32) {
        if !self.activated {
            return;
        }
        let now = self.clock;
        if let Some(voice) = self.voices.get_mut(slot) {
            voice.set_frequency(freq);
            voice.trigger_attack(&self.envelope, now);
        }
    }

    pub fn trigger_release(&mut self, slot: usize) {
        if !self.activated {
            return;
        }
        let now = self.clock;
        if let Some(voice) = self.voices.get_mut(slot) {
            voice.trigger_release(&self.envelope, now);
        }
    }

    /// Read-only envelope access for curve plotting.
    pub fn envelope(&self) -> &EnvelopeParams {
        &self.envelope
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let now = self.clock;
        let mut voices = [VoiceStatus {
            waveform: Waveform::Disabled,
            state: VoiceState::Idle,
            level: 0.0,
        }; NUM_VOICES];

        for (status, voice) in voices.iter_mut().zip(&self.voices) {
            status.waveform = voice.waveform();
            status.state = voice.state();
            status.level = voice.level_at(now);
        }

        EngineSnapshot {
            activated: self.activated,
            envelope: self.envelope,
            clock: now,
            voices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn engine_with(commands: &[Command]) -> SynthEngine<VecDeque<Command>> {
        let queue: VecDeque<Command> = commands.iter().copied().collect();
        SynthEngine::new(SAMPLE_RATE, queue)
    }

    fn render_seconds(engine: &mut SynthEngine<VecDeque<Command>>, seconds: f64) -> Vec<f32> {
        let samples = (seconds * SAMPLE_RATE as f64).round() as usize;
        let mut out = vec![0.0f32; samples];
        engine.render_block(&mut out);
        out
    }

    #[test]
    fn commands_before_activation_are_ignored() {
        let mut engine = engine_with(&[Command::Attack { freq: 440.0 }]);
        let out = render_seconds(&mut engine, 0.1);

        assert!(out.iter().all(|s| *s == 0.0));
        assert!(!engine.is_activated());
        assert_eq!(engine.snapshot().voices[0].state, VoiceState::Idle);
    }

    #[test]
    fn activation_gate_opens_once() {
        let mut engine = engine_with(&[
            Command::Activate,
            Command::Attack { freq: 440.0 },
        ]);
        let out = render_seconds(&mut engine, 0.1);

        assert!(engine.is_activated());
        assert!(out.iter().any(|s| s.abs() > 0.0));
    }

    #[test]
    fn attack_drives_only_connected_voices() {
        let mut engine = engine_with(&[
            Command::Activate,
            Command::SetWaveform {
                slot: 1,
                waveform: Waveform::Square,
            },
            Command::Attack { freq: 220.0 },
        ]);
        render_seconds(&mut engine, 0.05);

        let snap = engine.snapshot();
        assert_ne!(snap.voices[0].state, VoiceState::Idle);
        assert_ne!(snap.voices[1].state, VoiceState::Idle);
        assert_eq!(snap.voices[2].state, VoiceState::Idle); // still disabled
        assert_eq!(snap.voices[3].state, VoiceState::Idle);
    }

    #[test]
    fn set_envelope_clamps_through_the_command_path() {
        let mut engine = engine_with(&[
            Command::Activate,
            Command::SetEnvelope {
                attack: -1.0,
                decay: 2.0,
                sustain: 1.5,
                release: 0.3,
            },
        ]);
        render_seconds(&mut engine, 0.01);

        let env = engine.snapshot().envelope;
        assert_eq!(env.attack, 0.0);
        assert_eq!(env.decay, 2.0);
        assert_eq!(env.sustain, 1.0);
        assert_eq!(env.release, 0.3);
    }

    #[test]
    fn out_of_range_slot_is_a_no_op() {
        let mut engine = engine_with(&[
            Command::Activate,
            Command::SetWaveform {
                slot: 99,
                waveform: Waveform::Saw,
            },
        ]);
        render_seconds(&mut engine, 0.01);
        // Nothing to assert beyond "did not panic"; slot table unchanged.
        assert_eq!(engine.snapshot().voices[0].waveform, Waveform::Sine);
    }

    #[test]
    fn all_notes_off_releases_everything() {
        let mut engine = engine_with(&[
            Command::Activate,
            Command::Attack { freq: 330.0 },
        ]);
        render_seconds(&mut engine, 0.05);

        engine.apply(Command::AllNotesOff);
        assert_eq!(engine.snapshot().voices[0].state, VoiceState::Releasing);
    }
}
