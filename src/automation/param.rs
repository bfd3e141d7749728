use crate::MIN_TIME;

/*
Parameter Automation Timeline
=============================

This module implements the scheduling substrate for envelope triggering:
a parameter (in practice, a voice's gain) whose future is described by a
short list of time-stamped events, evaluated lazily as audio renders.

Vocabulary
----------

  anchor      A `SetValue` event. Pins the parameter to an exact value at
              an exact time. Everything after it interpolates from here.

  ramp        A `RampTo` event. The parameter moves linearly from wherever
              the previous event left it to `target`, arriving exactly at
              `time`.

  cancel      Dropping every event scheduled after a given instant. An
              in-flight ramp loses its endpoint too, exactly like Web
              Audio's cancelScheduledValues.

  now         The caller's clock, in seconds. The timeline has no clock of
              its own; it answers "what is the value at t" for any t.


The Retrigger Rule
------------------

The single correctness contract that matters here: rescheduling must be
glitch-free. When a key is pressed again mid-release (or released
mid-attack), the new curve has to depart from the value the old curve
would have had at that instant. The calling sequence is always:

    let current = param.value_at(now);   // read BEFORE cancelling
    param.cancel_scheduled(now);         // drop the stale future
    param.set_value_at(now, current);    // anchor continuity
    param.ramp_to(target, now + t);      // schedule the new curve

Reading before cancelling matters: cancelling an in-flight ramp removes
its endpoint, so a later `value_at` would report the pre-ramp value and
the re-anchor would jump. The sequence above keeps `value_at`
continuous across the swap, which is what keeps the speaker from
popping.


Evaluation
----------

`value_at` walks the event list front to back, tracking the value and
time the previous event settled at. A `SetValue` in the future ends the
walk; a `RampTo` spanning `now` interpolates. The list is tiny (an
attack schedules three events), so linear scans beat any cleverness.

Timestamps are strictly increasing. `set_value_at` evicts everything at
or after its own time, and `ramp_to` nudges a non-advancing endpoint
forward by MIN_TIME, so the invariant holds by construction.
*/

/// One scheduled point on an automation timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    /// Pin the parameter to `value` at `time`, holding until the next event.
    SetValue { time: f64, value: f32 },
    /// Ramp linearly from the previous event to `target`, arriving at `time`.
    RampTo { time: f64, target: f32 },
}

impl AutomationEvent {
    /// The instant this event completes.
    pub fn time(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { time, .. } | AutomationEvent::RampTo { time, .. } => time,
        }
    }

    /// The value the parameter holds once this event has completed.
    pub fn settled_value(&self) -> f32 {
        match *self {
            AutomationEvent::SetValue { value, .. } => value,
            AutomationEvent::RampTo { target, .. } => target,
        }
    }
}

/// A parameter whose motion through time is described by scheduled events.
pub struct AutomatedParam {
    events: Vec<AutomationEvent>,
    /// Value before the first event (and after a full cancel).
    initial: f32,
}

impl AutomatedParam {
    pub fn new(initial: f32) -> Self {
        Self {
            events: Vec::new(),
            initial,
        }
    }

    /// Instantaneous value at time `now`.
    ///
    /// This is always computed from the schedule, never cached; trigger
    /// logic depends on reading the true in-flight value.
    pub fn value_at(&self, now: f64) -> f32 {
        let mut prev_value = self.initial;
        let mut prev_time = f64::NEG_INFINITY;

        for event in &self.events {
            match *event {
                AutomationEvent::SetValue { time, value } => {
                    if time > now {
                        return prev_value;
                    }
                    prev_value = value;
                    prev_time = time;
                }
                AutomationEvent::RampTo { time, target } => {
                    if time <= now {
                        prev_value = target;
                        prev_time = time;
                        continue;
                    }
                    if prev_time == f64::NEG_INFINITY || now <= prev_time {
                        return prev_value;
                    }
                    let span = time - prev_time;
                    let progress = ((now - prev_time) / span).clamp(0.0, 1.0) as f32;
                    return prev_value + (target - prev_value) * progress;
                }
            }
        }

        prev_value
    }

    /// Drop every event scheduled strictly after `now`.
    ///
    /// An in-flight ramp loses its endpoint entirely; callers that want
    /// continuity read `value_at(now)` first and re-anchor.
    pub fn cancel_scheduled(&mut self, now: f64) {
        self.events.retain(|e| e.time() <= now);
    }

    /// Anchor an exact value at `time`.
    ///
    /// Events at or after `time` are evicted so timestamps stay strictly
    /// increasing.
    pub fn set_value_at(&mut self, time: f64, value: f32) {
        self.events.retain(|e| e.time() < time);
        self.events.push(AutomationEvent::SetValue { time, value });
    }

    /// Schedule a linear ramp to `target`, ending at `end_time`.
    ///
    /// If `end_time` does not advance past the last scheduled event, it is
    /// nudged forward by MIN_TIME rather than rejected; a zero-length
    /// attack still needs a well-ordered timeline.
    pub fn ramp_to(&mut self, target: f32, end_time: f64) {
        let mut end = end_time;
        if let Some(last) = self.events.last() {
            if end <= last.time() {
                end = last.time() + MIN_TIME;
            }
        }
        self.events.push(AutomationEvent::RampTo { time: end, target });
    }

    /// True if any event endpoint is still in the future at `now`.
    pub fn has_pending(&self, now: f64) -> bool {
        self.events.last().is_some_and(|e| e.time() > now)
    }

    /// Garbage-collect fully elapsed events, keeping the most recent one
    /// as the standing anchor so `value_at` still settles correctly.
    pub fn prune(&mut self, now: f64) {
        while self.events.len() > 1 && self.events[1].time() <= now {
            self.events.remove(0);
        }
    }

    /// Number of scheduled events (anchors included).
    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}
