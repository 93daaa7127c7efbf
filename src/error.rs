use std::io;

use thiserror::Error;

use crate::constants::MAX_ROM_SIZE;

/// Faults raised while executing a single instruction.
///
/// The instruction that raised one is not applied.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineError {
    #[error("address {addr:#05X} out of range (pc {pc:#05X})")]
    AddressOutOfRange { pc: u16, addr: usize },

    #[error("call stack overflow (pc {pc:#05X})")]
    StackOverflow { pc: u16 },

    #[error("return with empty call stack (pc {pc:#05X})")]
    StackUnderflow { pc: u16 },
}

/// Reasons a ROM image can't be loaded.
#[derive(Error, Debug)]
pub enum RomError {
    #[error("unable to read ROM: {0}")]
    Io(#[from] io::Error),

    #[error("ROM is {size} bytes; at most {max} fit in memory", max = MAX_ROM_SIZE)]
    TooLarge { size: usize },
}
