/// Bytes of addressable memory.
pub const MEMORY_SIZE: usize = 4096;

/// ROMs are loaded here and the program counter starts here.
pub const PROGRAM_START: u16 = 0x200;

/// The largest ROM that fits between `PROGRAM_START` and the end of memory.
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Highest valid memory address.
pub const MAX_ADDRESS: u16 = (MEMORY_SIZE - 1) as u16;

/// Return addresses the call stack can hold.
pub const STACK_DEPTH: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Timers count down at 60Hz regardless of how fast the CPU runs.
pub const TIMER_FREQUENCY: u32 = 60;

/// A reasonable instruction rate for most ROMs.
pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;

/// How many past states are kept around for rewinding.
pub const MAX_SAVED_STATES: usize = 1024;

/// Bytes per glyph in the sprite sheet.
pub const GLYPH_SIZE: u16 = 5;

/// # Sprite Sheet
/// Glyphs for the hexadecimal digits 0..F, 5 bytes each.
/// Each byte is a row of the glyph; only the high nibble is drawn.
/// ```text
/// 0xF0  ****
/// 0x90  *  *
/// 0x90  *  *
/// 0x90  *  *
/// 0xF0  ****
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
