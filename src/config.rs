// Struct to load config from file and cli args.
// By: Curtis Jones <mail@curtisjones.ca>

use crate::{
    output::OutputFormat,
    theme::{Colour, Slot, Theme},
    widgets::clock,
};
use anyhow::{bail, Context, Result};
use clap::{clap_app, ArgMatches};
use dirs::config_dir;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fs::read_to_string,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Options every polled widget takes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WidgetOptions {
    /// Seconds between polls.
    pub interval: f64,
    /// Command to run in the terminal on left click. Unset means the built in one, empty
    /// means nothing.
    pub on_click: Option<String>,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            interval: 1.0,
            on_click: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThermalOptions {
    pub interval: f64,
    pub on_click: Option<String>,
    /// Label of the hwmon sensor to show.
    pub tag_sensor: String,
}

impl Default for ThermalOptions {
    fn default() -> Self {
        Self {
            interval: 2.0,
            on_click: None,
            tag_sensor: String::from("Package id 0"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClockOptions {
    pub interval: f64,
    pub on_click: Option<String>,
    /// strftime style format.
    pub format: String,
}

impl Default for ClockOptions {
    fn default() -> Self {
        Self {
            interval: 1.0,
            on_click: None,
            format: String::from(clock::DEFAULT_FORMAT),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the bar, picks the default config file.
    #[serde(skip)]
    pub name: String,
    pub theme: String,
    pub output: OutputFormat,
    /// Milliseconds the main loop sleeps between checks.
    pub tick_ms: u64,
    pub terminal: String,
    /// Glyph drawn between two coloured blocks.
    pub separator: String,
    /// Width of the gaps at either end of the bar.
    pub spacer: u32,
    /// Per slot overrides on top of the theme, e.g. `net = "#44475a"`.
    pub colours: BTreeMap<String, String>,
    pub cpu: WidgetOptions,
    pub memory: WidgetOptions,
    pub thermal: ThermalOptions,
    pub net: WidgetOptions,
    pub clock: ClockOptions,
    /// Print a single line and exit.
    #[serde(skip)]
    pub once: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            name: String::from("bar"),
            theme: String::from(crate::theme::DEFAULT_THEME),
            output: OutputFormat::default(),
            tick_ms: 100,
            terminal: String::from("alacritty"),
            separator: String::from("\u{e0b0}"),
            spacer: 5,
            colours: BTreeMap::new(),
            cpu: WidgetOptions::default(),
            memory: WidgetOptions::default(),
            thermal: ThermalOptions::default(),
            net: WidgetOptions::default(),
            clock: ClockOptions::default(),
            once: false,
        }
    }
}

impl Config {
    /// Parse a config file. Keys that are left out keep their defaults.
    pub fn parse(s: &str) -> Result<Config> {
        toml::from_str(s).context("invalid config")
    }

    pub fn from_file(file: &Path) -> Result<Config> {
        let conf_file = read_to_string(file)
            .with_context(|| format!("could not read config {}", file.display()))?;
        Config::parse(&conf_file).with_context(|| format!("in {}", file.display()))
    }

    /// `$XDG_CONFIG_HOME/powerfeed/<name>.toml`, if there is a config dir at all.
    pub fn default_path(name: &str) -> Option<PathBuf> {
        config_dir().map(|mut d| {
            d.push("powerfeed");
            d.push(format!("{}.toml", name));
            d
        })
    }

    /// Override a single value, used for the command line options.
    pub fn change_option(&mut self, opt: &str, val: &str) -> Result<()> {
        match opt {
            "NAME" => self.name = val.to_owned(),
            "THEME" => self.theme = val.to_owned(),
            "OUTPUT" => self.output = val.parse()?,
            "TERMINAL" => self.terminal = val.to_owned(),
            "SEPARATOR" => self.separator = val.to_owned(),
            "TICK" => {
                self.tick_ms = val
                    .parse()
                    .with_context(|| format!("tick must be milliseconds, got {:?}", val))?
            }
            _ => bail!("unknown option {}", opt),
        }
        Ok(())
    }

    /// The `[colours]` table, checked.
    fn overrides(&self) -> Result<Vec<(Slot, Colour)>> {
        self.colours
            .iter()
            .map(|(slot, colour)| {
                let slot: Slot = slot.parse()?;
                let colour = Colour::parse(colour)
                    .with_context(|| format!("colour for {:?}", slot))?;
                Ok((slot, colour))
            })
            .collect()
    }

    /// The selected theme with any colour overrides applied. Call it once, an unknown
    /// theme name is logged every time.
    pub fn theme(&self) -> Result<Theme> {
        let mut theme = Theme::select(&self.theme);
        for (slot, colour) in self.overrides()? {
            theme.set(slot, colour);
        }
        Ok(theme)
    }

    /// Catch nonsense before the bar starts.
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            bail!("tick_ms must be at least 1");
        }
        self.overrides()?;
        Ok(())
    }
}

/// Command line definition. Thankfully the library makes the code pretty readable.
pub fn app<'a, 'b>() -> clap::App<'a, 'b> {
    clap_app!(Powerfeed =>
        (version: env!("CARGO_PKG_VERSION"))
        (author: "Curtis Jones <mail@curtisjones.ca>")
        (about: "Powerline status feed for i3bar, swaybar and unibar!")
        (@arg NO_CONFIG: -C --noconfig                "Skip loading a config file.")
        (@arg CONFIG:    -c --config    +takes_value  "Sets a custom config file")
        (@arg NAME:                     +takes_value  "Bar name, picks the default config file")
        (@arg THEME:     -t --theme     +takes_value  "overrides config file theme (dracula, nord, gruvbox)")
        (@arg OUTPUT:    -o --output    +takes_value  "overrides config file output format (i3bar, unibar, plain)")
        (@arg TERMINAL:  -T --terminal  +takes_value  "overrides config file terminal used for click commands")
        (@arg SEPARATOR: -s --separator +takes_value  "overrides config file powerline separator")
        (@arg TICK:         --tick      +takes_value  "overrides config file main loop tick in ms")
        (@arg ONCE:         --once                    "Print one status line and exit")
        (@arg PALETTE:      --palette                 "Print unibar colour arguments for the theme and exit")
        (@arg VERBOSE:   -v --verbose   ...           "More logging, repeat for even more")
    )
}

/// Making a full Config by loading the config file and mashing the CLI arguments on top.
///
/// # Output
/// Main Config to be used for the Bar.
pub fn gen_config(matches: &ArgMatches) -> Result<Config> {
    let name = matches.value_of("NAME").unwrap_or("bar");

    let mut conf = if matches.is_present("NO_CONFIG") {
        Config::default()
    } else if let Some(file) = matches.value_of("CONFIG") {
        // Explicit file has to exist.
        Config::from_file(Path::new(file))?
    } else {
        match Config::default_path(name) {
            Some(p) if p.exists() => Config::from_file(&p)?,
            Some(p) => {
                debug!(path = %p.display(), "no config file, using defaults");
                Config::default()
            }
            None => Config::default(),
        }
    };

    conf.change_option("NAME", name)?;
    for opt in &["THEME", "OUTPUT", "TERMINAL", "SEPARATOR", "TICK"] {
        if let Some(s) = matches.value_of(opt) {
            conf.change_option(opt, s)?;
        }
    }
    conf.once = matches.is_present("ONCE");

    conf.validate()?;
    Ok(conf)
}
