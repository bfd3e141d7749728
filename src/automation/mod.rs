//! Scheduled parameter automation.
//!
//! These types carry no audio of their own; they describe how a control
//! value (a voice's gain) moves through time. Voices sample the timeline
//! while rendering, so scheduling is allocation-light and the realtime
//! path never blocks.

/// Piecewise-linear automation timeline for a single parameter.
pub mod param;

pub use param::{AutomatedParam, AutomationEvent};
