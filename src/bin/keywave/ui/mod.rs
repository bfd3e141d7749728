//! TUI for keywave.
//!
//! Layout mirrors the instrument panel: oscilloscope, spectrum, and
//! envelope curve up top, the control strip in the middle, and the
//! piano keyboard along the bottom.

pub mod controls;
pub mod envelope;
pub mod keyboard;
pub mod spectrum;
pub mod status;
pub mod waveform;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use keywave::synth::engine::EngineSnapshot;
use keywave::synth::{Command, EnvelopeParams, Waveform, NUM_VOICES};

use crate::input::InputRouter;

use controls::{render_controls, Focus};
use envelope::render_envelope;
use keyboard::{render_keyboard, KeyRect};
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::render_status;
use waveform::render_waveform;

/// Audio visualization buffer size (also the FFT size).
const VIS_BUFFER_SIZE: usize = 1024;

/// Arrow-key step for envelope time fields, in seconds.
const TIME_STEP: f32 = 0.02;
/// Arrow-key step for the sustain level.
const LEVEL_STEP: f32 = 0.05;

pub struct UiApp {
    cmd_tx: Producer<Command>,
    audio_rx: Consumer<f32>,
    snap_rx: Consumer<EngineSnapshot>,
    router: InputRouter,
    /// Latest engine snapshot, if any has arrived yet.
    snapshot: Option<EngineSnapshot>,
    /// UI-side copies driving the controls; the engine clamps its own.
    env: EnvelopeParams,
    waveforms: [Waveform; NUM_VOICES],
    focus: Focus,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    key_rects: Vec<KeyRect>,
    pending: Vec<Command>,
    stream_error: Arc<AtomicBool>,
    sample_rate: f32,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        cmd_tx: Producer<Command>,
        audio_rx: Consumer<f32>,
        snap_rx: Consumer<EngineSnapshot>,
        sample_rate: f32,
        stream_error: Arc<AtomicBool>,
    ) -> Self {
        // Matches the engine's startup defaults: slot 0 audible.
        let mut waveforms = [Waveform::Disabled; NUM_VOICES];
        waveforms[0] = Waveform::Sine;

        Self {
            cmd_tx,
            audio_rx,
            snap_rx,
            router: InputRouter::new(),
            snapshot: None,
            env: EnvelopeParams::default(),
            waveforms,
            focus: Focus::Osc(0),
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            key_rects: Vec::new(),
            pending: Vec::new(),
            stream_error,
            sample_rate,
            should_quit: false,
        }
    }

    /// Run the UI event loop (~60fps).
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_snapshots();
            self.spectrum.update(&self.audio_buffer);

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(Duration::from_millis(16))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Mouse(mouse) => {
                        self.router.handle_mouse(
                            mouse,
                            Instant::now(),
                            &self.key_rects,
                            &mut self.pending,
                        );
                    }
                    _ => {}
                }
            }

            self.router.tick(Instant::now(), &mut self.pending);
            self.flush_commands();
        }

        Ok(())
    }

    /// Read new audio samples, keeping the last VIS_BUFFER_SIZE.
    fn poll_audio(&mut self) {
        let mut received = 0;
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            received += 1;
        }
        if received > 0 && self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    /// Keep only the latest engine snapshot.
    fn poll_snapshots(&mut self) {
        while let Ok(snapshot) = self.snap_rx.pop() {
            self.snapshot = Some(snapshot);
        }
    }

    fn flush_commands(&mut self) {
        for cmd in self.pending.drain(..) {
            // A full ring means the audio thread is far behind; dropping
            // a control message is the lesser evil.
            let _ = self.cmd_tx.push(cmd);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Navigation keys are handled on press only; note keys need
        // press, repeat, and release routed through the input router.
        match key.code {
            KeyCode::Esc => {
                if key.kind == KeyEventKind::Press {
                    self.should_quit = true;
                }
            }
            KeyCode::Tab => {
                if key.kind == KeyEventKind::Press {
                    self.focus = self.focus.next();
                }
            }
            KeyCode::BackTab => {
                if key.kind == KeyEventKind::Press {
                    self.focus = self.focus.prev();
                }
            }
            KeyCode::Left => {
                if key.kind == KeyEventKind::Press {
                    self.adjust(-1.0);
                }
            }
            KeyCode::Right => {
                if key.kind == KeyEventKind::Press {
                    self.adjust(1.0);
                }
            }
            _ => self
                .router
                .handle_key(key, Instant::now(), &mut self.pending),
        }
    }

    /// Adjust the focused control and send the matching command.
    fn adjust(&mut self, direction: f32) {
        // Touching a control is a qualifying gesture too.
        self.router.ensure_activated(&mut self.pending);

        match self.focus {
            Focus::Osc(slot) => {
                let all = Waveform::ALL;
                let index = all
                    .iter()
                    .position(|w| *w == self.waveforms[slot])
                    .unwrap_or(0);
                let next =
                    (index as i32 + direction as i32).rem_euclid(all.len() as i32) as usize;
                self.waveforms[slot] = all[next];
                self.pending.push(Command::SetWaveform {
                    slot,
                    waveform: all[next],
                });
            }
            Focus::Attack => {
                let value = (self.env.attack + direction * TIME_STEP).clamp(0.0, 1.0);
                self.env.set(value, self.env.decay, self.env.sustain, self.env.release);
                self.push_envelope();
            }
            Focus::Decay => {
                let value = (self.env.decay + direction * TIME_STEP).clamp(0.0, 1.0);
                self.env.set(self.env.attack, value, self.env.sustain, self.env.release);
                self.push_envelope();
            }
            Focus::Sustain => {
                let value = (self.env.sustain + direction * LEVEL_STEP).clamp(0.0, 1.0);
                self.env.set(self.env.attack, self.env.decay, value, self.env.release);
                self.push_envelope();
            }
            Focus::Release => {
                let value = (self.env.release + direction * TIME_STEP).clamp(0.0, 1.0);
                self.env.set(self.env.attack, self.env.decay, self.env.sustain, value);
                self.push_envelope();
            }
        }
    }

    fn push_envelope(&mut self) {
        self.pending.push(Command::SetEnvelope {
            attack: self.env.attack,
            decay: self.env.decay,
            sustain: self.env.sustain,
            release: self.env.release,
        });
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Status bar
                Constraint::Min(8),     // Scopes
                Constraint::Length(3),  // Controls
                Constraint::Length(12), // Keyboard
                Constraint::Length(1),  // Help bar
            ])
            .split(area);

        render_status(
            frame,
            chunks[0],
            self.snapshot.as_ref(),
            self.stream_error.load(Ordering::Relaxed),
            self.sample_rate,
        );

        let scopes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(50),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ])
            .split(chunks[1]);

        render_waveform(frame, scopes[0], &self.audio_buffer);
        render_spectrum(frame, scopes[1], self.spectrum.data());
        render_envelope(frame, scopes[2], &self.env);

        render_controls(frame, chunks[2], &self.waveforms, &self.env, self.focus);

        let router = &self.router;
        render_keyboard(
            frame,
            chunks[3],
            |c| router.is_held(c),
            &mut self.key_rects,
        );

        let help = Paragraph::new(
            " [Tab] Focus  [\u{2190}/\u{2192}] Adjust  [Esc] Quit  |  play with q..] a..\\ z../ or the mouse",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}
