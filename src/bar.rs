// Trying to actually organize this a bit.
// By: Curtis Jones <git@curtisjones.ca>
// Started on August 23, 2020

use super::{
    config::Config,
    error::Result,
    input::{input_loop, ClickEvent},
    layout::{default_blocks, Block},
    output::Renderer,
    theme::Theme,
};
use anyhow::Context;
use signal_hook::iterator::Signals;
use std::{
    io::{self, BufReader, Write},
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};
use tracing::{debug, info, trace, warn};

pub struct Bar {
    name: String,
    blocks: Vec<Block>,
    renderer: Renderer,
    tick: Duration,
    once: bool,
}

impl Bar {
    /// Build the bar described by the config, coloured with an already resolved theme.
    pub fn new(conf: &Config, theme: Theme) -> Bar {
        info!(name = %conf.name, theme = theme.name(), output = %conf.output, "building bar");
        let blocks = default_blocks(&theme, conf);
        let mut bar = Bar::with_blocks(blocks, Renderer::new(conf.output, theme));
        bar.name = conf.name.clone();
        bar.tick = Duration::from_millis(conf.tick_ms.max(1));
        bar.once = conf.once;
        bar
    }

    pub fn with_blocks(blocks: Vec<Block>, renderer: Renderer) -> Bar {
        Bar {
            name: String::from("bar"),
            blocks,
            renderer,
            tick: Duration::from_millis(100),
            once: false,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Poll every block that is due.
    ///
    /// # Output
    /// true if anything on the bar changed.
    pub fn update(&mut self, now: Instant) -> bool {
        // No short circuit, every due block gets polled.
        self.blocks
            .iter_mut()
            .fold(false, |changed, b| b.update(now) || changed)
    }

    pub fn draw<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.renderer.line(&self.blocks, out)
    }

    /// Left clicks on a block with a command launch it.
    ///
    /// # Output
    /// true if something was launched.
    pub fn handle_click(&mut self, ev: &ClickEvent) -> bool {
        if !ev.is_left() {
            trace!(button = ev.button, "ignoring click");
            return false;
        }
        let block = match ev.block().and_then(|i| self.blocks.get_mut(i)) {
            Some(b) => b,
            None => {
                debug!(name = %ev.name, instance = ?ev.instance, "click for no block");
                return false;
            }
        };
        if block.name() != ev.name {
            warn!(expected = block.name(), got = %ev.name, "click name does not match block");
            return false;
        }
        block.click()
    }

    /// Poll everything one time and print a single line.
    pub fn print_once<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.update(Instant::now());
        self.draw(out)
    }

    /// Here is where the real work is done:
    ///  -> checking for any exit signals that may have come in from the os.
    ///  -> handling clicks that came in on stdin.
    ///  -> polling the blocks and redrawing when something changed.
    pub fn event_loop(&mut self) -> anyhow::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();

        if self.once {
            return self.print_once(&mut out).context("could not print status line");
        }

        // Signals that are incoming.
        let signals = Signals::new(&[
            signal_hook::SIGTERM,
            signal_hook::SIGINT,
            signal_hook::SIGQUIT,
            signal_hook::SIGHUP,
        ])
        .context("could not register signal handlers")?;

        // Input thread. Has to be seperate so reading stdin doesn't block polling.
        let clicks = if self.renderer.format().accepts_clicks() {
            let (tx, rx) = mpsc::channel();
            thread::Builder::new()
                .name(String::from("clicks"))
                .spawn(move || input_loop(BufReader::new(io::stdin()), tx))
                .context("could not start click thread")?;
            Some(rx)
        } else {
            None
        };

        match self.renderer.header(&mut out) {
            Err(e) if e.is_closed_pipe() => {
                info!("host closed our stdout before the header, Shutting down...");
                return Ok(());
            }
            r => r?,
        }
        info!(name = %self.name, blocks = self.blocks.len(), "bar running");

        loop {
            // All of the signals basically tell the program to shutdown.
            if signals.pending().count() > 0 {
                info!("Shutting down...");
                break;
            }

            if let Some(rx) = &clicks {
                let events: Vec<ClickEvent> = rx.try_iter().collect();
                for ev in events {
                    self.handle_click(&ev);
                }
            }

            if self.update(Instant::now()) {
                match self.draw(&mut out) {
                    Err(e) if e.is_closed_pipe() => {
                        info!("host closed our stdout, Shutting down...");
                        break;
                    }
                    r => r?,
                }
            }

            self.blocks.iter_mut().for_each(Block::reap);
            thread::sleep(self.tick);
        }
        Ok(())
    }
}
