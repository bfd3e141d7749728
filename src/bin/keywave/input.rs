//! Input router: raw terminal events become engine commands.
//!
//! The router owns held-key state and the startup gesture gate. It never
//! talks to the engine directly; it appends [`Command`]s to a scratch
//! vector the UI flushes into the command ring each tick.
//!
//! All voices share one frequency, so letting go of one key while
//! another is still down must not leave the instrument silent: whenever
//! a release leaves surviving held keys, the most recently pressed
//! survivor is re-attacked (legato back to the held note).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

use keywave::keys::binding_for;
use keywave::synth::Command;

use crate::ui::keyboard::KeyRect;

/// How long a key counts as held after its last press/repeat, on
/// terminals that never report key release. Repeat events refresh the
/// timer, so the note sustains until the physical key is let go.
const HOLD_TIMEOUT: Duration = Duration::from_millis(250);

pub struct InputRouter {
    /// Currently held note characters and when they were last pressed.
    held: HashMap<char, Instant>,
    /// Set once a real Release event arrives (kitty protocol); the hold
    /// timeout is then unnecessary.
    release_events_seen: bool,
    gesture_seen: bool,
}

impl InputRouter {
    pub fn new() -> Self {
        Self {
            held: HashMap::new(),
            release_events_seen: false,
            gesture_seen: false,
        }
    }

    /// Open the startup gate on the first gesture of any kind.
    pub fn ensure_activated(&mut self, out: &mut Vec<Command>) {
        if !self.gesture_seen {
            self.gesture_seen = true;
            out.push(Command::Activate);
        }
    }

    /// Route a key event if its character is a bound note.
    pub fn handle_key(&mut self, event: KeyEvent, now: Instant, out: &mut Vec<Command>) {
        let KeyCode::Char(c) = event.code else {
            return;
        };
        let Some(binding) = binding_for(c) else {
            return;
        };

        match event.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.ensure_activated(out);
                let already_held = self.held.insert(c, now).is_some();
                if !already_held {
                    out.push(Command::Attack { freq: binding.freq });
                }
            }
            KeyEventKind::Release => {
                self.release_events_seen = true;
                if self.held.remove(&c).is_some() {
                    self.release_or_fall_back(out);
                }
            }
        }
    }

    /// Hit-test a mouse event against the on-screen keyboard.
    pub fn handle_mouse(
        &mut self,
        event: MouseEvent,
        now: Instant,
        key_rects: &[KeyRect],
        out: &mut Vec<Command>,
    ) {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.ensure_activated(out);

                // Black keys sit on top of white keys, so when a press
                // lands in both rectangles the black key wins.
                let mut hit: Option<&KeyRect> = None;
                for rect in key_rects
                    .iter()
                    .filter(|r| r.contains(event.column, event.row))
                {
                    let replace = match hit {
                        None => true,
                        Some(prev) => prev.is_white && !rect.is_white,
                    };
                    if replace {
                        hit = Some(rect);
                    }
                }

                if let Some(rect) = hit {
                    if let Some(binding) = binding_for(rect.key) {
                        self.held.insert(rect.key, now);
                        out.push(Command::Attack { freq: binding.freq });
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                // Button up releases every held key.
                if !self.held.is_empty() {
                    self.held.clear();
                    out.push(Command::Release);
                }
            }
            _ => {}
        }
    }

    /// Expire stale holds on terminals without release events.
    pub fn tick(&mut self, now: Instant, out: &mut Vec<Command>) {
        if self.release_events_seen {
            return;
        }
        let before = self.held.len();
        self.held
            .retain(|_, last| now.duration_since(*last) < HOLD_TIMEOUT);
        if self.held.len() < before {
            self.release_or_fall_back(out);
        }
    }

    /// After keys have left the held set: release the voices if nothing
    /// survives, otherwise re-attack the most recently pressed survivor
    /// so the instrument keeps sounding while a key is physically down.
    fn release_or_fall_back(&mut self, out: &mut Vec<Command>) {
        let survivor = self
            .held
            .iter()
            .max_by_key(|entry| entry.1)
            .map(|entry| *entry.0);

        match survivor.and_then(binding_for) {
            Some(binding) => out.push(Command::Attack { freq: binding.freq }),
            None => out.push(Command::Release),
        }
    }

    pub fn is_held(&self, key: char) -> bool {
        self.held.contains_key(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn repeat(c: char) -> KeyEvent {
        KeyEvent::new_with_kind(KeyCode::Char(c), KeyModifiers::NONE, KeyEventKind::Repeat)
    }

    fn release(c: char) -> KeyEvent {
        KeyEvent::new_with_kind(KeyCode::Char(c), KeyModifiers::NONE, KeyEventKind::Release)
    }

    fn freq_of(c: char) -> f32 {
        binding_for(c).expect("bound key").freq
    }

    #[test]
    fn press_attacks_and_release_silences() {
        let mut router = InputRouter::new();
        let mut out = Vec::new();
        let t0 = Instant::now();

        router.handle_key(press('q'), t0, &mut out);
        assert_eq!(
            out,
            vec![Command::Activate, Command::Attack { freq: freq_of('q') }]
        );

        out.clear();
        router.handle_key(release('q'), t0 + Duration::from_millis(50), &mut out);
        assert_eq!(out, vec![Command::Release]);
        assert!(!router.is_held('q'));
    }

    #[test]
    fn repeat_refreshes_hold_without_retriggering() {
        let mut router = InputRouter::new();
        let mut out = Vec::new();
        let t0 = Instant::now();

        router.handle_key(press('a'), t0, &mut out);
        out.clear();

        router.handle_key(repeat('a'), t0 + Duration::from_millis(200), &mut out);
        assert!(out.is_empty(), "repeat of a held key must not re-attack");

        // The repeat pushed the expiry forward past the original timeout.
        router.tick(t0 + Duration::from_millis(300), &mut out);
        assert!(out.is_empty());
        assert!(router.is_held('a'));
    }

    #[test]
    fn releasing_one_of_two_keys_falls_back_to_the_survivor() {
        let mut router = InputRouter::new();
        let mut out = Vec::new();
        let t0 = Instant::now();

        router.handle_key(press('q'), t0, &mut out);
        router.handle_key(press('a'), t0 + Duration::from_millis(50), &mut out);
        out.clear();

        // Letting go of the first key must not silence the second.
        router.handle_key(release('q'), t0 + Duration::from_millis(100), &mut out);
        assert_eq!(out, vec![Command::Attack { freq: freq_of('a') }]);
        assert!(router.is_held('a'));

        out.clear();
        router.handle_key(release('a'), t0 + Duration::from_millis(150), &mut out);
        assert_eq!(out, vec![Command::Release]);
    }

    #[test]
    fn timeout_expiry_falls_back_to_the_surviving_key() {
        let mut router = InputRouter::new();
        let mut out = Vec::new();
        let t0 = Instant::now();

        // 'q' goes stale while 'a' keeps being refreshed by repeats.
        router.handle_key(press('q'), t0, &mut out);
        router.handle_key(press('a'), t0 + Duration::from_millis(150), &mut out);
        out.clear();

        router.tick(t0 + Duration::from_millis(300), &mut out);
        assert_eq!(out, vec![Command::Attack { freq: freq_of('a') }]);
        assert!(!router.is_held('q'));
        assert!(router.is_held('a'));

        // Once 'a' stops being refreshed too, the voices release.
        out.clear();
        router.tick(t0 + Duration::from_millis(500), &mut out);
        assert_eq!(out, vec![Command::Release]);
        assert!(!router.is_held('a'));
    }

    #[test]
    fn real_release_events_disable_the_timeout() {
        let mut router = InputRouter::new();
        let mut out = Vec::new();
        let t0 = Instant::now();

        router.handle_key(press('q'), t0, &mut out);
        router.handle_key(release('q'), t0 + Duration::from_millis(10), &mut out);
        out.clear();

        // A held key no longer expires; the terminal will tell us.
        router.handle_key(press('a'), t0 + Duration::from_millis(20), &mut out);
        out.clear();
        router.tick(t0 + Duration::from_secs(10), &mut out);
        assert!(out.is_empty());
        assert!(router.is_held('a'));
    }
}
