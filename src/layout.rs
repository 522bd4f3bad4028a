// Blocks and the order they go on the bar in.
// By: Curtis Jones <mail@curtisjones.ca>

use crate::{
    config::Config,
    optional::launcher::Launcher,
    theme::{Colour, Slot, Theme},
    widgets::{interval_secs, Clock, Cpu, Memory, NetSpeed, Spacer, TextBox, Thermal, Widget},
};
use std::time::Instant;
use tracing::{debug, info, warn};

/// When a block next wants polling.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Schedule {
    Now,
    At(Instant),
    Never,
}

/// A widget plus how it looks on the bar.
pub struct Block {
    widget: Box<dyn Widget>,
    background: Option<Colour>,
    foreground: Option<Colour>,
    on_click: Option<Launcher>,
    text: String,
    next: Schedule,
    failing: bool,
}

impl Block {
    pub fn new(widget: Box<dyn Widget>) -> Self {
        Self {
            widget,
            background: None,
            foreground: None,
            on_click: None,
            text: String::new(),
            next: Schedule::Now,
            failing: false,
        }
    }

    pub fn colours(mut self, background: &Colour, foreground: &Colour) -> Self {
        self.background = Some(background.clone());
        self.foreground = Some(foreground.clone());
        self
    }

    pub fn on_click(mut self, launcher: Launcher) -> Self {
        self.on_click = Some(launcher);
        self
    }

    pub fn name(&self) -> &str {
        self.widget.name()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn gap(&self) -> u32 {
        self.widget.gap()
    }

    pub fn background(&self) -> Option<&Colour> {
        self.background.as_ref()
    }

    pub fn foreground(&self) -> Option<&Colour> {
        self.foreground.as_ref()
    }

    pub fn clickable(&self) -> bool {
        self.on_click.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        match self.next {
            Schedule::Now => true,
            Schedule::At(t) => now >= t,
            Schedule::Never => false,
        }
    }

    /// Poll the widget if it is due. A failed poll keeps the old text.
    ///
    /// # Output
    /// true if the text changed and the bar has to be redrawn.
    pub fn update(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.next = match self.widget.interval() {
            Some(i) => Schedule::At(now + i),
            None => Schedule::Never,
        };
        match self.widget.poll() {
            Ok(text) => {
                if self.failing {
                    info!(widget = self.name(), "widget recovered");
                    self.failing = false;
                }
                if text != self.text {
                    self.text = text;
                    return true;
                }
                false
            }
            Err(e) => {
                if self.failing {
                    debug!(widget = self.name(), "still failing: {}", e);
                } else {
                    warn!(widget = self.name(), "poll failed: {}", e);
                    self.failing = true;
                }
                // Static widgets get another go next time round.
                if self.next == Schedule::Never {
                    self.next = Schedule::Now;
                }
                false
            }
        }
    }

    /// Run the click command, if there is one.
    pub fn click(&mut self) -> bool {
        match self.on_click.as_mut() {
            Some(l) => {
                l.spawn();
                true
            }
            None => false,
        }
    }

    pub fn reap(&mut self) {
        if let Some(l) = self.on_click.as_mut() {
            l.reap();
        }
    }
}

/// Pick the click command for a widget: the configured one, or the built in default.
fn launcher(
    terminal: &str,
    configured: &Option<String>,
    default: Option<&str>,
) -> Option<Launcher> {
    let cmd = match configured {
        Some(c) => c.trim(),
        None => default?,
    };
    if cmd.is_empty() {
        None
    } else {
        Some(Launcher::in_terminal(terminal, cmd))
    }
}

fn separator(text: &str, from: &Colour, to: &Colour) -> Block {
    // Drawn in the colour of the block on the left, over the one on the right.
    Block::new(Box::new(TextBox::new(text))).colours(to, from)
}

/// Adds content blocks with a separator between each coloured pair.
struct Builder<'a> {
    theme: &'a Theme,
    separator: &'a str,
    blocks: Vec<Block>,
    last: Option<Slot>,
}

impl<'a> Builder<'a> {
    fn push(&mut self, widget: Box<dyn Widget>, slot: Slot, click: Option<Launcher>) {
        if let Some(prev) = self.last {
            self.blocks.push(separator(
                self.separator,
                self.theme.colour(prev),
                self.theme.colour(slot),
            ));
        }
        let mut b =
            Block::new(widget).colours(self.theme.colour(slot), self.theme.colour(Slot::Fg));
        if let Some(l) = click {
            b = b.on_click(l);
        }
        self.blocks.push(b);
        self.last = Some(slot);
    }

    fn spacer(&mut self, length: u32) {
        self.blocks.push(Block::new(Box::new(Spacer::new(length))));
    }
}

/// The bar: cpu, memory, temperature, network and clock from left to right, joined by
/// powerline separators.
pub fn default_blocks(theme: &Theme, conf: &Config) -> Vec<Block> {
    let term = conf.terminal.as_str();
    let mut b = Builder {
        theme,
        separator: &conf.separator,
        blocks: Vec::new(),
        last: None,
    };

    b.spacer(conf.spacer);
    b.push(
        Box::new(Cpu::new(interval_secs(conf.cpu.interval))),
        Slot::Cpu,
        launcher(term, &conf.cpu.on_click, Some("htop")),
    );
    b.push(
        Box::new(Memory::new(interval_secs(conf.memory.interval))),
        Slot::Mem,
        launcher(term, &conf.memory.on_click, Some("htop")),
    );
    b.push(
        Box::new(Thermal::new(
            conf.thermal.tag_sensor.clone(),
            interval_secs(conf.thermal.interval),
        )),
        Slot::Temp,
        launcher(term, &conf.thermal.on_click, Some("watch -n1 sensors")),
    );
    b.push(
        Box::new(NetSpeed::new(interval_secs(conf.net.interval))),
        Slot::Net,
        launcher(term, &conf.net.on_click, Some("nmtui")),
    );
    b.push(
        Box::new(Clock::new(
            conf.clock.format.clone(),
            interval_secs(conf.clock.interval),
        )),
        Slot::Date,
        launcher(term, &conf.clock.on_click, None),
    );
    b.spacer(conf.spacer);

    if b.blocks.iter().any(|bl| bl.clickable()) && !conf.output.accepts_clicks() {
        debug!(output = %conf.output, "output has no click events, click commands are idle");
    }
    b.blocks
}
