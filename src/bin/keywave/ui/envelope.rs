//! Envelope curve widget: plots the ADSR shape the sliders describe.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use keywave::synth::EnvelopeParams;

/// Render the envelope polyline (normalized to the unit square by
/// [`EnvelopeParams::curve_points`]).
pub fn render_envelope(frame: &mut Frame, area: Rect, envelope: &EnvelopeParams) {
    let block = Block::default().title(" Envelope ").borders(Borders::ALL);

    let points = envelope.curve_points();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Yellow))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
