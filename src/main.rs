// Powerline status feed written in rust.
// By: Curtis Jones
// Started on Ausust 06, 2020

use powerfeed::{app, gen_config, output::unibar_args, Bar};
use std::process;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr, stdout belongs to the bar host.
fn init_logging(verbose: u64) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("powerfeed={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let matches = app().get_matches();
    init_logging(matches.occurrences_of("VERBOSE"));
    debug!("powerfeed v{} starting...", env!("CARGO_PKG_VERSION"));

    // Generate configuration from a file and any command line args.
    let conf = match gen_config(&matches) {
        Ok(c) => c,
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    };

    // Resolved once, an unknown theme name is only warned about here.
    let theme = match conf.theme() {
        Ok(t) => t,
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    };

    if matches.is_present("PALETTE") {
        println!("{}", unibar_args(&theme));
        return;
    }

    // Build the blocks and the output for them.
    let mut bar = Bar::new(&conf, theme);

    // Poll, draw and launch until a signal or the host hangs up.
    if let Err(e) = bar.event_loop() {
        error!("{:#}", e);
        process::exit(1);
    }
}
