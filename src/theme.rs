// Colour themes for the bar. Chosen once at startup by name.
// By: Curtis Jones <mail@curtisjones.ca>

use crate::error::{Error, Result};
use std::{fmt, str::FromStr};
use tracing::warn;

/// Theme used when the configured name is not in the table.
pub const DEFAULT_THEME: &str = "dracula";

/// Built in palettes, in slot order: base, fg, cpu, mem, temp, net, date.
const THEMES: [(&str, [&str; 7]); 3] = [
    (
        "dracula",
        [
            "#282c34", "#ffffff", "#bd93f9", "#ff5555", "#f1fa8c", "#6272a4", "#50fa7b",
        ],
    ),
    (
        "nord",
        [
            "#2e3440", "#eceff4", "#5e81ac", "#bf616a", "#d08770", "#81a1c1", "#a3be8c",
        ],
    ),
    (
        "gruvbox",
        [
            "#282828", "#fbf1c7", "#b16286", "#cc241d", "#d79921", "#458588", "#98971a",
        ],
    ),
];

/// A hex colour that has already been checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Colour(String);

impl Colour {
    pub fn parse(s: &str) -> Result<Colour> {
        let s = s.trim();
        let hex = match s.strip_prefix('#') {
            Some(h) => h,
            None => return Err(Error::Colour(s.to_owned())),
        };
        if (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Colour(s.to_lowercase()))
        } else {
            Err(Error::Colour(s.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Semantic colour slots a theme provides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Base,
    Fg,
    Cpu,
    Mem,
    Temp,
    Net,
    Date,
}

impl Slot {
    fn idx(self) -> usize {
        self as usize
    }
}

impl FromStr for Slot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Slot> {
        match &s.trim().to_lowercase()[..] {
            "base" | "background" => Ok(Slot::Base),
            "fg" | "foreground" => Ok(Slot::Fg),
            "cpu" => Ok(Slot::Cpu),
            "mem" | "memory" => Ok(Slot::Mem),
            "temp" | "thermal" => Ok(Slot::Temp),
            "net" | "network" => Ok(Slot::Net),
            "date" | "clock" => Ok(Slot::Date),
            _ => Err(Error::Slot(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    name: String,
    colours: Vec<Colour>,
}

impl Theme {
    /// Look a theme up in the built in table, ignoring case.
    pub fn by_name(name: &str) -> Option<Theme> {
        let name = name.trim().to_lowercase();
        THEMES.iter().find(|(n, _)| *n == name).map(|(n, cols)| Theme {
            name: n.to_string(),
            // The table is fixed and every entry is a valid colour.
            colours: cols.iter().map(|c| Colour(c.to_string())).collect(),
        })
    }

    /// Same as by_name but never fails, unknown names get the default theme.
    pub fn select(name: &str) -> Theme {
        match Theme::by_name(name) {
            Some(t) => t,
            None => {
                let known: Vec<&str> = Theme::names().collect();
                warn!(theme = name, ?known, "unknown theme, using {}", DEFAULT_THEME);
                Theme::default()
            }
        }
    }

    /// Names of every built in theme.
    pub fn names() -> impl Iterator<Item = &'static str> {
        THEMES.iter().map(|(n, _)| *n)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn colour(&self, slot: Slot) -> &Colour {
        &self.colours[slot.idx()]
    }

    pub fn set(&mut self, slot: Slot, colour: Colour) {
        self.colours[slot.idx()] = colour;
    }

    /// Every colour in slot order. Hosts that address colours by index use this.
    pub fn palette(&self) -> &[Colour] {
        &self.colours
    }

    /// Position of a colour in the palette, if it is one of ours.
    pub fn index_of(&self, colour: &Colour) -> Option<usize> {
        self.colours.iter().position(|c| c == colour)
    }
}

impl Default for Theme {
    fn default() -> Theme {
        // DEFAULT_THEME is always in THEMES.
        Theme::by_name(DEFAULT_THEME).unwrap_or_else(|| Theme {
            name: DEFAULT_THEME.to_owned(),
            colours: THEMES[0].1.iter().map(|c| Colour(c.to_string())).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_the_dracula_palette() {
        let t = Theme::default();
        assert_eq!(t.name(), "dracula");
        assert_eq!(t.colour(Slot::Base).as_str(), "#282c34");
        assert_eq!(t.colour(Slot::Fg).as_str(), "#ffffff");
        assert_eq!(t.colour(Slot::Cpu).as_str(), "#bd93f9");
        assert_eq!(t.colour(Slot::Mem).as_str(), "#ff5555");
        assert_eq!(t.colour(Slot::Temp).as_str(), "#f1fa8c");
        assert_eq!(t.colour(Slot::Net).as_str(), "#6272a4");
        assert_eq!(t.colour(Slot::Date).as_str(), "#50fa7b");
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(Theme::by_name("NoRd").unwrap().name(), "nord");
        assert!(Theme::by_name("solarized").is_none());
    }

    #[test]
    fn unknown_theme_falls_back() {
        assert_eq!(Theme::select("does-not-exist"), Theme::default());
        assert_eq!(Theme::select("gruvbox").name(), "gruvbox");
    }

    #[test]
    fn overriding_a_slot() {
        let mut t = Theme::default();
        t.set(Slot::Net, Colour::parse("#123ABC").unwrap());
        assert_eq!(t.colour(Slot::Net).as_str(), "#123abc");
        assert_eq!(t.index_of(&Colour::parse("#123abc").unwrap()), Some(5));
    }

    #[test]
    fn colour_validation() {
        assert!(Colour::parse("#fff").is_ok());
        assert!(Colour::parse(" #a0b1c2 ").is_ok());
        assert!(Colour::parse("fff").is_err());
        assert!(Colour::parse("#ggg").is_err());
        assert!(Colour::parse("#12345").is_err());
    }

    #[test]
    fn slot_aliases() {
        assert_eq!("memory".parse::<Slot>().unwrap(), Slot::Mem);
        assert_eq!("Clock".parse::<Slot>().unwrap(), Slot::Date);
        assert!("battery".parse::<Slot>().is_err());
    }

    #[test]
    fn every_table_entry_is_valid() {
        for (_, cols) in THEMES.iter() {
            for c in cols.iter() {
                assert!(Colour::parse(c).is_ok(), "{}", c);
            }
        }
    }
}
