/// # Opcodes
///
/// Every Chip-8 opcode is a big-endian 16-bit word read as four nibbles `[o x y n]`.
/// The first nibble picks an instruction family; within some families the last
/// nibble or the last byte picks the instruction.
///
/// The remaining nibbles are operands:
/// - `x` and `y` name the registers Vx and Vy (or the range V0..=Vx)
/// - `n` is a 4-bit immediate, the height of a sprite
/// - `nn` is an 8-bit immediate
/// - `nnn` is a 12-bit address
pub trait Opcode {
    /// `(o, x, y, n)`
    fn nibbles(&self) -> (u8, u8, u8, u8);

    /// `[_x__]`
    fn x(&self) -> u8;

    /// `[__y_]`
    fn y(&self) -> u8;

    /// `[___n]`
    fn n(&self) -> u8;

    /// `[__nn]`
    fn nn(&self) -> u8;

    /// `[_nnn]`
    fn nnn(&self) -> u16;
}

impl Opcode for u16 {
    fn nibbles(&self) -> (u8, u8, u8, u8) {
        (((self & 0xF000) >> 12) as u8, self.x(), self.y(), self.n())
    }

    fn x(&self) -> u8 {
        ((self & 0x0F00) >> 8) as u8
    }

    fn y(&self) -> u8 {
        ((self & 0x00F0) >> 4) as u8
    }

    fn n(&self) -> u8 {
        (self & 0x000F) as u8
    }

    fn nn(&self) -> u8 {
        (self & 0x00FF) as u8
    }

    fn nnn(&self) -> u16 {
        self & 0x0FFF
    }
}
