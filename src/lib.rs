pub mod automation; // Scheduled parameter timelines (gain ramps)
pub mod keys; // Static note/key bindings for the on-screen keyboard
pub mod synth; // Envelope, oscillators, voices, engine

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f64 = 1.0 / 48_000.0;
