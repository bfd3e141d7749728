// Purpose: envelope parameters, oscillators, voice triggering, engine.
// This layer turns key events into scheduled gain curves and renders them.

pub mod command;
pub mod engine;
pub mod envelope;
pub mod oscillator;
pub mod voice;

pub use command::Command;
pub use engine::{SynthEngine, NUM_VOICES};
pub use envelope::EnvelopeParams;
pub use oscillator::Waveform;
pub use voice::VoiceState;
