//! Piano keyboard widget.
//!
//! Draws the three-octave keyboard and records every key's screen
//! rectangle so the input router can hit-test mouse presses. White keys
//! are laid out edge to edge; black keys are drawn afterwards, on top,
//! straddling the boundary to their right.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Paragraph},
    Frame,
};

use keywave::keys::KEY_BINDINGS;

/// A key's screen rectangle, kept for mouse hit-testing.
#[derive(Debug, Clone, Copy)]
pub struct KeyRect {
    pub key: char,
    pub is_white: bool,
    pub rect: Rect,
}

impl KeyRect {
    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.rect.x
            && column < self.rect.x + self.rect.width
            && row >= self.rect.y
            && row < self.rect.y + self.rect.height
    }
}

const WHITE_KEY_COUNT: u16 = 21;

/// Render the keyboard into `area`, refreshing `rects` with the hit
/// rectangles (whites first, blacks after, matching draw order).
pub fn render_keyboard(
    frame: &mut Frame,
    area: Rect,
    is_held: impl Fn(char) -> bool,
    rects: &mut Vec<KeyRect>,
) {
    rects.clear();
    if area.width < WHITE_KEY_COUNT || area.height < 3 {
        return;
    }

    let key_w = (area.width / WHITE_KEY_COUNT).max(2);
    let used_w = key_w * WHITE_KEY_COUNT;
    let x0 = area.x + (area.width - used_w) / 2;

    // White keys first; remember where each black key straddles.
    let mut wx = x0;
    let mut black_anchors = Vec::new();
    for binding in KEY_BINDINGS.iter() {
        if binding.is_white {
            let rect = Rect {
                x: wx,
                y: area.y,
                width: key_w,
                height: area.height,
            };
            draw_key(frame, rect, binding.note, binding.key, true, is_held(binding.key));
            rects.push(KeyRect {
                key: binding.key,
                is_white: true,
                rect,
            });
            wx += key_w;
        } else {
            // Straddles the boundary at the current x (the next white
            // key's left edge), as on a real keyboard.
            black_anchors.push((binding, wx));
        }
    }

    // Black keys on top.
    let black_w = (key_w / 2).max(1);
    let black_h = ((area.height as u32 * 3 / 5) as u16).max(1);
    for (binding, anchor_x) in black_anchors {
        let rect = Rect {
            x: anchor_x.saturating_sub(black_w / 2).max(area.x),
            y: area.y,
            width: black_w,
            height: black_h,
        };
        draw_key(frame, rect, binding.note, binding.key, false, is_held(binding.key));
        rects.push(KeyRect {
            key: binding.key,
            is_white: false,
            rect,
        });
    }
}

fn draw_key(frame: &mut Frame, rect: Rect, note: &str, key: char, is_white: bool, held: bool) {
    let (bg, fg) = match (is_white, held) {
        (true, false) => (Color::White, Color::Black),
        (true, true) => (Color::Cyan, Color::Black),
        (false, false) => (Color::Black, Color::White),
        (false, true) => (Color::Cyan, Color::Black),
    };

    frame.render_widget(Block::default().style(Style::default().bg(bg)), rect);

    // Note name and trigger character in the key's lower half.
    if rect.height >= 3 {
        let label_rect = Rect {
            x: rect.x,
            y: rect.y + rect.height - 3,
            width: rect.width,
            height: 2,
        };
        let label = Paragraph::new(vec![Line::from(note), Line::from(key.to_string())])
            .style(Style::default().fg(fg).bg(bg))
            .centered();
        frame.render_widget(label, label_rect);
    }
}
