//! Host side of the T9 glove: watches the pointer for the keypad's motion gestures and types the
//! text they spell.

mod inject;
mod pointer;

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use t9_glove_lib::compose::{ComposerConfig, DEFAULT_FLUSH_TIMEOUT_MS};
use t9_glove_lib::decode::{DecoderConfig, DEFAULT_COOLDOWN_MS, DEFAULT_NOISE_FLOOR};
use t9_glove_lib::session::Session;
use t9_glove_lib::Millis;

use inject::Injector;
use pointer::PointerTracker;

#[derive(Debug, Parser)]
#[command(name = "t9-glove-host")]
#[command(about = "Types text from T9 glove keypad gestures")]
struct Cli {
    /// Minimum gap between recognised gestures
    #[arg(long, default_value_t = DEFAULT_COOLDOWN_MS)]
    cooldown_ms: Millis,
    /// Idle time after which a multi-tap letter is committed
    #[arg(long, default_value_t = DEFAULT_FLUSH_TIMEOUT_MS)]
    flush_timeout_ms: Millis,
    /// Pointer motion at or below this on both axes is ignored
    #[arg(long, default_value_t = DEFAULT_NOISE_FLOOR)]
    noise_floor: u16,
    /// Accept the nearest key within this many units instead of requiring an exact match
    #[arg(long, default_value_t = 0)]
    tolerance: u16,
    #[arg(long, default_value_t = 10)]
    poll_ms: u64,
    /// Print committed output instead of typing it
    #[arg(long)]
    dry_run: bool,
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if cli.tolerance > 0 {
        warn!(
            "matching within {} units: motion that isn't an exact keypad vector may be typed",
            cli.tolerance
        );
    }

    let start = Instant::now();
    let now = || Millis::try_from(start.elapsed().as_millis()).unwrap_or(Millis::MAX);

    let decoder = DecoderConfig {
        noise_floor: cli.noise_floor,
        cooldown_ms: cli.cooldown_ms,
        tolerance: cli.tolerance,
    };
    let composer = ComposerConfig { flush_timeout_ms: cli.flush_timeout_ms };

    let mut pointer = PointerTracker::spawn()?;
    let mut session = Session::new(decoder, composer, now());
    let mut sink = Injector::new(cli.dry_run);
    let interval = Duration::from_millis(cli.poll_ms);

    info!("listening for keypad gestures, ctrl-c to stop");
    loop {
        if let Err(e) = pointer.ensure_running() {
            session.disconnect();
            return Err(e);
        }
        if let Some(event) = session.poll(pointer.position(), now(), &mut sink) {
            info!("key {:?}", event.key);
        }
        thread::sleep(interval);
    }
}
