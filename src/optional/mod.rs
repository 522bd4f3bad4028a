//! Optional extra modules that are disabled by default in the bar.
//!
//! # Implemented
//!
//! * Launcher => Run a command when a block is clicked. Blocks get one through the `on_click`
//! option of their config section.
//!

pub mod launcher;
