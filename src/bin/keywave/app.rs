//! Keywave - application wiring: audio stream, ring buffers, terminal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use rtrb::RingBuffer;

use keywave::synth::engine::EngineSnapshot;
use keywave::synth::{Command, SynthEngine};
use keywave::MAX_BLOCK_SIZE;

use crate::ui::UiApp;

const COMMAND_CAPACITY: usize = 256;
const AUDIO_RING_CAPACITY: usize = 1 << 14;
const SNAPSHOT_CAPACITY: usize = 64;

/// Fallback rate for display when no audio device exists.
const FALLBACK_SAMPLE_RATE: f32 = 48_000.0;

/// Main application: owns the audio stream and runs the TUI on the
/// calling thread.
pub struct Keywave;

impl Keywave {
    pub fn new() -> Self {
        Self
    }

    pub fn run(self) -> EyreResult<()> {
        let (cmd_tx, cmd_rx) = RingBuffer::<Command>::new(COMMAND_CAPACITY);
        let (audio_tx, audio_rx) = RingBuffer::<f32>::new(AUDIO_RING_CAPACITY);
        let (snap_tx, snap_rx) = RingBuffer::<EngineSnapshot>::new(SNAPSHOT_CAPACITY);

        let stream_error = Arc::new(AtomicBool::new(false));

        // Audio is optional: with no usable output device the UI still
        // runs and every voice operation degrades to a silent no-op.
        let audio = start_audio(cmd_rx, audio_tx, snap_tx, stream_error.clone());
        let (_stream, sample_rate) = match audio {
            Ok((stream, rate)) => (Some(stream), rate),
            Err(_) => {
                stream_error.store(true, Ordering::Relaxed);
                (None, FALLBACK_SAMPLE_RATE)
            }
        };

        let mut terminal = ratatui::init();
        // Mouse for on-screen keys; enhancement flags get real key-release
        // events on terminals that support them. Both are best effort.
        let _ = execute!(
            std::io::stdout(),
            EnableMouseCapture,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        );

        let app_result =
            UiApp::new(cmd_tx, audio_rx, snap_rx, sample_rate, stream_error).run(&mut terminal);

        let _ = execute!(
            std::io::stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture
        );
        ratatui::restore();

        app_result
    }
}

impl Default for Keywave {
    fn default() -> Self {
        Self::new()
    }
}

/// Open the default output device and run the engine in its callback.
fn start_audio(
    cmd_rx: rtrb::Consumer<Command>,
    mut audio_tx: rtrb::Producer<f32>,
    mut snap_tx: rtrb::Producer<EngineSnapshot>,
    stream_error: Arc<AtomicBool>,
) -> EyreResult<(cpal::Stream, f32)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let mut engine = SynthEngine::new(sample_rate, cmd_rx);
    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let block = &mut render_buf[..frames];
                engine.render_block(block);

                // Mono fan-out to all output channels
                let out_off = frames_written * channels;
                for (i, &s) in block.iter().enumerate() {
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = s;
                    }
                }

                // Feed the visualizer. Dropping samples when the UI lags
                // is fine; blocking here is not.
                for &s in block.iter() {
                    if audio_tx.push(s).is_err() {
                        break;
                    }
                }

                frames_written += frames;
            }

            let _ = snap_tx.push(engine.snapshot());
        },
        move |_err| {
            // Raw-mode terminal owns stdout, so surface the failure
            // through the status bar instead of printing.
            stream_error.store(true, Ordering::Relaxed);
        },
        None,
    )?;

    stream.play().wrap_err("failed to start output stream")?;

    Ok((stream, sample_rate))
}
