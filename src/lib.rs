//! A Chip-8 interpreter core.
//!
//! [`Machine`] owns the whole emulated system. A driver loads a ROM, calls
//! [`Machine::step`] at its chosen instruction rate, calls [`Machine::tick_timers`]
//! at 60Hz, forwards key presses, and renders frames from [`Machine::take_frame`].

pub use error::{MachineError, RomError};
pub use instruction::Instruction;
pub use machine::{Machine, Step};
pub use quirks::Quirks;

pub mod constants;
mod error;
mod instruction;
mod machine;
mod opcode;
mod operations;
mod quirks;
pub mod state;
