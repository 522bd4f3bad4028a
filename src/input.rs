// Turning the lines i3bar/swaybar write to our stdin into click events.
// By: Curtis Jones <mail@curtisjones.ca>
//
// The host sends an endless JSON array, one element per line:
//   [
//   {"name":"cpu","instance":"1","button":1,...}
//   ,{"name":"net","instance":"7","button":3,...}

use crate::error::Result;
use serde::Deserialize;
use std::{io::BufRead, sync::mpsc};
use tracing::{debug, trace, warn};

/// Mouse button i3bar calls a left click.
pub const LEFT_BUTTON: u32 = 1;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ClickEvent {
    #[serde(default)]
    pub name: String,
    /// Index of the block on the bar, as we sent it.
    #[serde(default)]
    pub instance: Option<String>,
    pub button: u32,
}

impl ClickEvent {
    /// Parse one line of the click stream. `Ok(None)` for lines that only carry array syntax.
    pub fn parse_line(line: &str) -> Result<Option<ClickEvent>> {
        let line = line.trim();
        let line = line.strip_prefix(',').unwrap_or(line).trim_start();
        if line.is_empty() || line == "[" || line == "]" {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(line)?))
    }

    /// Block index this click was aimed at.
    pub fn block(&self) -> Option<usize> {
        self.instance.as_ref().and_then(|i| i.parse().ok())
    }

    pub fn is_left(&self) -> bool {
        self.button == LEFT_BUTTON
    }
}

/// The function we dump into a seperate thread to wait for any clicks.
/// Runs until the input closes or the receiving end goes away.
///
/// # Arguments
/// * input: -> anything line based, stdin in practice.
/// * send:  -> sender part of an across thread message pipe.
pub fn input_loop<R: BufRead>(input: R, send: mpsc::Sender<ClickEvent>) {
    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!("stopped reading clicks: {}", e);
                return;
            }
        };
        trace!(line = %line, "click input");
        match ClickEvent::parse_line(&line) {
            Ok(Some(ev)) => {
                if send.send(ev).is_err() {
                    return;
                }
            }
            Ok(None) => (),
            Err(e) => warn!("ignoring click line: {}", e),
        }
    }
    debug!("click input closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_the_click_stream() {
        assert_eq!(ClickEvent::parse_line("[").unwrap(), None);
        assert_eq!(ClickEvent::parse_line("  ").unwrap(), None);

        let first = ClickEvent::parse_line(
            r#"{"name":"cpu","instance":"1","button":1,"x":10,"y":2,"modifiers":[]}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(first.name, "cpu");
        assert_eq!(first.block(), Some(1));
        assert!(first.is_left());

        let next = ClickEvent::parse_line(r#",{"name":"net","instance":"7","button":3}"#)
            .unwrap()
            .unwrap();
        assert_eq!(next.block(), Some(7));
        assert!(!next.is_left());
    }

    #[test]
    fn missing_instance() {
        let ev = ClickEvent::parse_line(r#"{"name":"clock","button":1}"#)
            .unwrap()
            .unwrap();
        assert_eq!(ev.block(), None);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(ClickEvent::parse_line("{not json").is_err());
        assert!(ClickEvent::parse_line(r#"{"name":"cpu"}"#).is_err());
    }

    #[test]
    fn loop_forwards_good_lines_and_skips_bad_ones() {
        let input = "[\n\
                     {\"name\":\"cpu\",\"instance\":\"1\",\"button\":1}\n\
                     nonsense\n\
                     ,{\"name\":\"net\",\"instance\":\"7\",\"button\":1}\n";
        let (tx, rx) = mpsc::channel();
        input_loop(Cursor::new(input), tx);
        let got: Vec<_> = rx.try_iter().map(|e| e.name).collect();
        assert_eq!(got, ["cpu", "net"]);
    }
}
