//! Control strip: per-voice waveform selectors and the four envelope
//! values, with a focus cursor. Tab moves focus; arrows adjust.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use keywave::synth::{EnvelopeParams, Waveform, NUM_VOICES};

/// Which control the cursor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Osc(usize),
    Attack,
    Decay,
    Sustain,
    Release,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Osc(i) if i + 1 < NUM_VOICES => Focus::Osc(i + 1),
            Focus::Osc(_) => Focus::Attack,
            Focus::Attack => Focus::Decay,
            Focus::Decay => Focus::Sustain,
            Focus::Sustain => Focus::Release,
            Focus::Release => Focus::Osc(0),
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Osc(0) => Focus::Release,
            Focus::Osc(i) => Focus::Osc(i - 1),
            Focus::Attack => Focus::Osc(NUM_VOICES - 1),
            Focus::Decay => Focus::Attack,
            Focus::Sustain => Focus::Decay,
            Focus::Release => Focus::Sustain,
        }
    }
}

/// Render the control strip.
pub fn render_controls(
    frame: &mut Frame,
    area: Rect,
    waveforms: &[Waveform; NUM_VOICES],
    envelope: &EnvelopeParams,
    focus: Focus,
) {
    let block = Block::default().title(" Controls ").borders(Borders::ALL);

    let focused = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let normal = Style::default().fg(Color::White);

    let mut spans: Vec<Span> = Vec::new();
    for (i, waveform) in waveforms.iter().enumerate() {
        let style = if focus == Focus::Osc(i) { focused } else { normal };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!("Osc{} [{}]", i + 1, waveform.label()),
            style,
        ));
    }

    spans.push(Span::raw("   "));
    let envelope_items = [
        (Focus::Attack, format!("A {:.3}s", envelope.attack)),
        (Focus::Decay, format!("D {:.3}s", envelope.decay)),
        (Focus::Sustain, format!("S {:.2}", envelope.sustain)),
        (Focus::Release, format!("R {:.3}s", envelope.release)),
    ];
    for (slot, text) in envelope_items {
        let style = if focus == slot { focused } else { normal };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(text, style));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
