use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::{debug, info};
use sdl2::event::Event;
use thiserror::Error;

use vip8::constants::TIMER_FREQUENCY;
use vip8::{Machine, MachineError, Quirks, RomError, Step};
use vip8_display::Display;

use crate::keymap::{control, keymap, Control};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("unable to open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("unable to load {}: {source}", .path.display())]
    Rom { path: PathBuf, source: RomError },

    #[error("machine fault: {0}")]
    Machine(#[from] MachineError),

    #[error("SDL error: {0}")]
    Sdl(String),
}

/// Everything the driver needs to know before it starts
#[derive(Debug, Clone)]
pub struct Config {
    pub rom: PathBuf,
    pub scale: u32,
    pub instructions_per_second: u32,
    pub quirks: Quirks,
    pub seed: Option<u64>,
}

impl Config {
    /// Instructions executed between two timer ticks
    pub fn steps_per_frame(&self) -> u32 {
        (self.instructions_per_second / TIMER_FREQUENCY).max(1)
    }
}

fn load(config: &Config) -> Result<Machine, RunError> {
    let mut machine = Machine::new().with_quirks(config.quirks);
    if let Some(seed) = config.seed {
        machine = machine.with_seed(seed);
    }

    let file = File::open(&config.rom).map_err(|source| RunError::Open {
        path: config.rom.clone(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let size = machine
        .load_rom(&mut reader)
        .map_err(|source| RunError::Rom {
            path: config.rom.clone(),
            source,
        })?;
    info!("loaded {} ({} bytes)", config.rom.display(), size);
    Ok(machine)
}

/// Runs the ROM until the window is closed or the machine faults.
///
/// Each 1/60s frame runs `steps_per_frame` instructions and then ticks the
/// timers once, so timers decay at 60Hz whatever the instruction rate.
pub fn run(config: &Config) -> Result<(), RunError> {
    let mut machine = load(config)?;

    let sdl = sdl2::init().map_err(RunError::Sdl)?;
    let mut display = Display::new(&sdl, "Vip-8", config.scale).map_err(RunError::Sdl)?;
    let mut events = sdl.event_pump().map_err(RunError::Sdl)?;

    let frame_time = Duration::from_secs(1) / TIMER_FREQUENCY;
    let steps_per_frame = config.steps_per_frame();
    let mut next_frame = Instant::now() + frame_time;

    // Whether or not the frame pacing should be respected
    let mut fast_forward = false;
    // Whether the machine's state should be cycled forwards or backwards
    let mut rewind = false;
    let mut sounding = false;

    'event: loop {
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => match (keymap(key), control(key)) {
                    (Some(kc), _) => machine.key_press(kc),
                    (_, Some(Control::FastForward)) => fast_forward = true,
                    (_, Some(Control::Rewind)) => rewind = true,
                    (_, Some(Control::Reset)) => machine.reset(),
                    (_, Some(Control::Quit)) => break 'event,
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (keymap(key), control(key)) {
                    (Some(kc), _) => machine.key_release(kc),
                    (_, Some(Control::FastForward)) => fast_forward = false,
                    (_, Some(Control::Rewind)) => rewind = false,
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state
        if rewind {
            for _ in 0..steps_per_frame {
                if !machine.rewind() {
                    break;
                }
            }
        } else {
            for _ in 0..steps_per_frame {
                if let Step::AwaitingKey(_) = machine.step()? {
                    break;
                }
            }
            machine.tick_timers();
        }

        if machine.sound_active() != sounding {
            sounding = !sounding;
            debug!("tone {}", if sounding { "on" } else { "off" });
        }

        if let Some(frame) = machine.take_frame() {
            display.render(&frame).map_err(RunError::Sdl)?;
        }

        // Handle timing
        let now = Instant::now();
        if fast_forward || next_frame <= now {
            next_frame = now + frame_time;
        } else {
            std::thread::sleep(next_frame - now);
            next_frame += frame_time;
        }
    }

    info!("window closed");
    Ok(())
}
