//! Status bar: audio state, sample rate, and per-voice levels.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use keywave::synth::engine::EngineSnapshot;
use keywave::synth::VoiceState;

/// Render the top status bar.
pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    snapshot: Option<&EngineSnapshot>,
    audio_failed: bool,
    sample_rate: f32,
) {
    let block = Block::default().title(" keywave ").borders(Borders::ALL);

    let (audio_text, audio_color) = if audio_failed {
        ("audio unavailable - running silent", Color::Red)
    } else if snapshot.is_some_and(|s| s.activated) {
        ("live", Color::Green)
    } else {
        ("press any key to start audio", Color::Yellow)
    };

    let mut spans = vec![
        Span::styled(format!(" {}  ", audio_text), Style::default().fg(audio_color)),
        Span::styled(
            format!("{:.1}kHz  ", sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if let Some(snapshot) = snapshot {
        for (i, voice) in snapshot.voices.iter().enumerate() {
            let color = match voice.state {
                VoiceState::Idle => Color::DarkGray,
                VoiceState::Attacking => Color::Green,
                VoiceState::Sustaining => Color::Cyan,
                VoiceState::Releasing => Color::Magenta,
            };
            spans.push(Span::styled(
                format!("v{} {:4.2}  ", i + 1, voice.level),
                Style::default().fg(color),
            ));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
