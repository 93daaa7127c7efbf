//! Runs a Chip-8 ROM in an SDL2 window.
//!
//! ```bash
//! vip8 roms/pong.ch8 --scale 12 --ips 1000
//! ```
//!
//! Keypad keys are mapped to `1234/QWER/ASDF/ZXCV`. Hold Space to fast forward,
//! hold Backspace to rewind, F5 resets and Escape quits.
//! Logging follows `RUST_LOG`; each `-v` raises the default level.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::error;

use vip8::constants::DEFAULT_INSTRUCTIONS_PER_SECOND;
use vip8::Quirks;

use crate::run::{run, Config};

mod keymap;
mod run;

#[derive(Parser, Debug)]
#[command(version, about = "Runs a Chip-8 ROM", long_about = None)]
struct Args {
    /// Path to the ROM file to run
    rom: PathBuf,

    /// Window pixels per Chip-8 pixel
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=64))]
    scale: u32,

    /// Instructions executed per second
    #[arg(short, long, default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND, value_parser = clap::value_parser!(u32).range(1..))]
    ips: u32,

    /// 8XY6/8XYE shift VY into VX
    #[arg(long)]
    shift_vy: bool,

    /// FX55/FX65 advance I past the registers transferred
    #[arg(long)]
    increment_i: bool,

    /// Clip sprites at the screen edge instead of wrapping them
    #[arg(long)]
    clip: bool,

    /// Seed for the random number generator
    #[arg(long)]
    seed: Option<u64>,

    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            rom: self.rom.clone(),
            scale: self.scale,
            instructions_per_second: self.ips,
            quirks: Quirks {
                shift_uses_vy: self.shift_vy,
                load_store_increments_i: self.increment_i,
                clip_sprites: self.clip,
            },
            seed: self.seed,
        }
    }

    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();

    match run(&args.config()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
