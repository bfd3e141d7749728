use crate::synth::oscillator::Waveform;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Control messages flowing from the UI thread to the engine.
///
/// The input router turns raw key/pointer events into these; the engine
/// consumes them at the top of each render block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// First user gesture observed: open the startup gate. Until this
    /// arrives every other command is a silent no-op.
    Activate,
    /// Key down: set every voice to `freq` and trigger its attack.
    Attack { freq: f32 },
    /// Key up: trigger every voice's release.
    Release,
    /// Change one voice's waveform (Disabled disconnects it).
    SetWaveform { slot: usize, waveform: Waveform },
    /// Replace the shared envelope tuple (fields are clamped on receipt).
    SetEnvelope {
        attack: f32,
        decay: f32,
        sustain: f32,
        release: f32,
    },
    /// Release everything, held or not.
    AllNotesOff,
}

pub trait CommandReceiver {
    fn pop(&mut self) -> Option<Command>;
}

#[cfg(feature = "rtrb")]
impl CommandReceiver for Consumer<Command> {
    fn pop(&mut self) -> Option<Command> {
        Consumer::pop(self).ok()
    }
}

/// In-process receiver for tests and offline rendering.
impl CommandReceiver for std::collections::VecDeque<Command> {
    fn pop(&mut self) -> Option<Command> {
        self.pop_front()
    }
}
