//! keywave - terminal synthesizer keyboard
//!
//! Run with: cargo run

mod app;
mod input;
mod ui;

use app::Keywave;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    Keywave::new().run()
}
