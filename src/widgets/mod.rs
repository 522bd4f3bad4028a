//! The widgets that make up the bar.
//!
//! # Implemented
//!
//! * Cpu      => load percentage from /proc/stat.
//! * Memory   => used and total memory from /proc/meminfo.
//! * Thermal  => a labelled hwmon temperature sensor.
//! * NetSpeed => download and upload rate of the default route interface.
//! * Clock    => local date and time.
//! * TextBox  => static text, used for the powerline separators.
//! * Spacer   => a fixed gap.
//!

use crate::error::Result;
use std::time::Duration;

pub mod clock;
pub mod cpu;
pub mod memory;
pub mod net_speed;
pub mod thermal;

pub use clock::Clock;
pub use cpu::Cpu;
pub use memory::Memory;
pub use net_speed::NetSpeed;
pub use thermal::Thermal;

/// Anything that can put text on the bar.
pub trait Widget {
    /// Short name, sent to the host so clicks can be traced back.
    fn name(&self) -> &str;

    /// How often to poll. `None` means the text never changes and one poll is enough.
    fn interval(&self) -> Option<Duration>;

    /// Produce the current text.
    fn poll(&mut self) -> Result<String>;

    /// Width in pixels the host should leave after the block.
    fn gap(&self) -> u32 {
        0
    }
}

/// Turn a config interval in seconds into a Duration, refusing anything not positive.
pub fn interval_secs(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        Duration::from_secs(1)
    }
}

/// Static piece of text.
pub struct TextBox {
    text: String,
}

impl TextBox {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }
}

impl Widget for TextBox {
    fn name(&self) -> &str {
        "text"
    }

    fn interval(&self) -> Option<Duration> {
        None
    }

    fn poll(&mut self) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Empty block that only leaves a gap.
pub struct Spacer {
    length: u32,
}

impl Spacer {
    pub fn new(length: u32) -> Self {
        Self { length }
    }
}

impl Widget for Spacer {
    fn name(&self) -> &str {
        "spacer"
    }

    fn interval(&self) -> Option<Duration> {
        None
    }

    fn poll(&mut self) -> Result<String> {
        Ok(String::new())
    }

    fn gap(&self) -> u32 {
        self.length
    }
}
