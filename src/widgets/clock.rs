// Local date and time for the right end of the bar.
// By: Curtis Jones <mail@curtisjones.ca>

use super::Widget;
use crate::error::{Error, Result};
use chrono::Local;
use std::{fmt::Write, time::Duration};

pub const DEFAULT_FORMAT: &str = "\u{f073} %d/%m/%Y \u{f017} %H:%M";

/// Local date and time in a strftime format.
pub struct Clock {
    format: String,
    interval: Duration,
}

impl Clock {
    pub fn new<S: Into<String>>(format: S, interval: Duration) -> Self {
        Self {
            format: format.into(),
            interval,
        }
    }
}

impl Widget for Clock {
    fn name(&self) -> &str {
        "clock"
    }

    fn interval(&self) -> Option<Duration> {
        Some(self.interval)
    }

    fn poll(&mut self) -> Result<String> {
        // Bad specifiers come back as fmt::Error, to_string() would panic on them.
        let mut out = String::new();
        write!(out, "{}", Local::now().format(&self.format))
            .map_err(|_| Error::ClockFormat(self.format.clone()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_local_time() {
        let mut c = Clock::new("%Y", Duration::from_secs(1));
        let year = c.poll().unwrap();
        assert_eq!(year.len(), 4);
        assert!(year.chars().all(|ch| ch.is_ascii_digit()));

        let mut plain = Clock::new("no fields", Duration::from_secs(1));
        assert_eq!(plain.poll().unwrap(), "no fields");

        let mut bad = Clock::new("%Q", Duration::from_secs(1));
        assert!(matches!(bad.poll(), Err(Error::ClockFormat(_))));
    }

    #[test]
    fn default_format_has_the_icons() {
        assert_eq!(DEFAULT_FORMAT, "\u{f073} %d/%m/%Y \u{f017} %H:%M");
        let mut c = Clock::new(DEFAULT_FORMAT, Duration::from_secs(1));
        let text = c.poll().unwrap();
        assert!(text.starts_with("\u{f073} "));
        assert!(text.contains(" \u{f017} "));
        // dd/mm/yyyy, icon, hh:mm
        assert_eq!(text.chars().count(), 2 + 10 + 3 + 5);
    }
}
