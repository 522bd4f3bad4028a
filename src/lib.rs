// this file is basically just to weave together the seperate mod files.
// also the pub use statements bring objects over to our main file.
// By: Curtis Jones <mail@curtisjones.ca>
// Started on: September 07, 2020
//

/// Main loop of the program, polling the blocks and writing the status lines.
pub mod bar;

/// Parsing the config file and adjusting based on command line args provided.
pub mod config;

/// Error type for the widgets and output.
pub mod error;

/// Turning the click events the host writes to stdin into something we can act on.
pub mod input;

/// What goes on the bar and in which order.
pub mod layout;

/// Module containing optional additions to the bar.
pub mod optional;

/// Encoding the status line for i3bar, unibar or a plain terminal.
pub mod output;

/// Colour themes.
pub mod theme;

/// Everything that can show up on the bar.
pub mod widgets;

/// To be used by the binary crate.
pub use bar::Bar;
pub use config::{app, gen_config, Config};
pub use error::{Error, Result};
pub use theme::Theme;
