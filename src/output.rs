// Encoding the bar into whatever protocol the host reads on our stdout.
// By: Curtis Jones <mail@curtisjones.ca>

use crate::{
    error::{Error, Result},
    layout::Block,
    theme::Theme,
};
use serde::{Deserialize, Serialize};
use std::{fmt, io::Write, str::FromStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON protocol spoken by i3bar and swaybar. The only one with clicks.
    #[serde(alias = "swaybar")]
    I3bar,
    /// Markup for unibar, colours given as indices into the theme palette.
    Unibar,
    /// Just the text.
    Plain,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::I3bar
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match &s.trim().to_lowercase()[..] {
            "i3bar" | "swaybar" | "i3" => Ok(OutputFormat::I3bar),
            "unibar" => Ok(OutputFormat::Unibar),
            "plain" | "text" => Ok(OutputFormat::Plain),
            _ => Err(Error::Output(s.to_owned())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::I3bar => "i3bar",
            OutputFormat::Unibar => "unibar",
            OutputFormat::Plain => "plain",
        })
    }
}

impl OutputFormat {
    pub fn accepts_clicks(self) -> bool {
        self == OutputFormat::I3bar
    }
}

#[derive(Serialize)]
struct Header {
    version: u32,
    click_events: bool,
}

#[derive(Serialize)]
struct I3Block<'a> {
    full_text: &'a str,
    name: &'a str,
    instance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    background: Option<&'a str>,
    separator: bool,
    separator_block_width: u32,
}

pub struct Renderer {
    format: OutputFormat,
    theme: Theme,
    first: bool,
}

impl Renderer {
    pub fn new(format: OutputFormat, theme: Theme) -> Self {
        Self {
            format,
            theme,
            first: true,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Anything the host wants before the first status line.
    pub fn header<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.format == OutputFormat::I3bar {
            let header = serde_json::to_string(&Header {
                version: 1,
                click_events: true,
            })?;
            out.write_all(header.as_bytes())?;
            out.write_all(b"\n[\n")?;
            out.flush()?;
        }
        Ok(())
    }

    /// Write one full status line and flush it.
    pub fn line<W: Write>(&mut self, blocks: &[Block], out: &mut W) -> Result<()> {
        let line = match self.format {
            OutputFormat::I3bar => self.i3bar(blocks)?,
            OutputFormat::Unibar => self.unibar(blocks),
            OutputFormat::Plain => blocks.iter().map(|b| b.text()).collect(),
        };
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()?;
        self.first = false;
        Ok(())
    }

    fn i3bar(&self, blocks: &[Block]) -> Result<String> {
        let list: Vec<I3Block> = blocks
            .iter()
            .enumerate()
            .map(|(i, b)| I3Block {
                // Blocks with no text get dropped by swaybar, gap included.
                full_text: match b.text() {
                    "" if b.gap() > 0 => " ",
                    t => t,
                },
                name: b.name(),
                instance: i.to_string(),
                color: b.foreground().map(|c| c.as_str()),
                background: b.background().map(|c| c.as_str()),
                separator: false,
                separator_block_width: b.gap(),
            })
            .collect();
        let json = serde_json::to_string(&list)?;
        Ok(if self.first { json } else { format!(",{}", json) })
    }

    fn unibar(&self, blocks: &[Block]) -> String {
        blocks.iter().fold(String::new(), |mut acc, b| {
            let bg = b.background().and_then(|c| self.theme.index_of(c));
            let fg = b.foreground().and_then(|c| self.theme.index_of(c));
            if let Some(i) = bg {
                acc.push_str(&format!("{{B{}}}", i));
            }
            if let Some(i) = fg {
                acc.push_str(&format!("{{F{}}}", i));
            }
            // Braces would open a format block on the other side.
            acc.extend(b.text().chars().filter(|&c| c != '{' && c != '}'));
            if b.gap() > 0 {
                acc.push(' ');
            }
            if fg.is_some() {
                acc.push_str("{/F}");
            }
            if bg.is_some() {
                acc.push_str("{/B}");
            }
            acc
        })
    }
}

/// Command line colour options for unibar matching the markup we emit.
pub fn unibar_args(theme: &Theme) -> String {
    let palette: Vec<&str> = theme.palette().iter().map(|c| c.as_str()).collect();
    format!(
        "-b {} -F {} -B {}",
        theme.colour(crate::theme::Slot::Base),
        palette.join(" "),
        palette.join(" ")
    )
}
