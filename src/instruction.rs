use std::fmt;

use rand::Rng;

use crate::opcode::Opcode;
use crate::operations::{self, Outcome};
use crate::quirks::Quirks;
use crate::state::State;

/// A decoded Chip-8 instruction.
///
/// `x` and `y` name registers, `nn` is an immediate byte, `n` an immediate nibble
/// and addresses are 12 bits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Clear,
    Return,
    Jump(u16),
    Call(u16),
    SkipEqImm { x: u8, nn: u8 },
    SkipNeImm { x: u8, nn: u8 },
    SkipEqReg { x: u8, y: u8 },
    LoadImm { x: u8, nn: u8 },
    AddImm { x: u8, nn: u8 },
    Move { x: u8, y: u8 },
    Or { x: u8, y: u8 },
    And { x: u8, y: u8 },
    Xor { x: u8, y: u8 },
    AddReg { x: u8, y: u8 },
    Sub { x: u8, y: u8 },
    ShiftRight { x: u8, y: u8 },
    SubReverse { x: u8, y: u8 },
    ShiftLeft { x: u8, y: u8 },
    SkipNeReg { x: u8, y: u8 },
    LoadIndex(u16),
    JumpOffset(u16),
    Random { x: u8, nn: u8 },
    Draw { x: u8, y: u8, n: u8 },
    SkipPressed { x: u8 },
    SkipNotPressed { x: u8 },
    LoadDelay { x: u8 },
    WaitKey { x: u8 },
    SetDelay { x: u8 },
    SetSound { x: u8 },
    AddIndex { x: u8 },
    LoadGlyph { x: u8 },
    StoreBcd { x: u8 },
    StoreRegisters { x: u8 },
    LoadRegisters { x: u8 },
    /// An opcode with no Chip-8 meaning; skipped over when executed
    Unsupported(u16),
}

impl Instruction {
    /// Selects the correct Instruction for a given Opcode
    pub fn decode(op: u16) -> Self {
        use Instruction::*;

        let (x, y, n, nn, nnn) = (op.x(), op.y(), op.n(), op.nn(), op.nnn());
        match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Clear,
            (0x0, 0x0, 0xE, 0xE) => Return,
            (0x1, ..) => Jump(nnn),
            (0x2, ..) => Call(nnn),
            (0x3, ..) => SkipEqImm { x, nn },
            (0x4, ..) => SkipNeImm { x, nn },
            (0x5, ..) => SkipEqReg { x, y },
            (0x6, ..) => LoadImm { x, nn },
            (0x7, ..) => AddImm { x, nn },
            (0x8, .., 0x0) => Move { x, y },
            (0x8, .., 0x1) => Or { x, y },
            (0x8, .., 0x2) => And { x, y },
            (0x8, .., 0x3) => Xor { x, y },
            (0x8, .., 0x4) => AddReg { x, y },
            (0x8, .., 0x5) => Sub { x, y },
            (0x8, .., 0x6) => ShiftRight { x, y },
            (0x8, .., 0x7) => SubReverse { x, y },
            (0x8, .., 0xE) => ShiftLeft { x, y },
            (0x9, ..) => SkipNeReg { x, y },
            (0xA, ..) => LoadIndex(nnn),
            (0xB, ..) => JumpOffset(nnn),
            (0xC, ..) => Random { x, nn },
            (0xD, ..) => Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => SkipPressed { x },
            (0xE, _, 0xA, 0x1) => SkipNotPressed { x },
            (0xF, _, 0x0, 0x7) => LoadDelay { x },
            (0xF, _, 0x0, 0xA) => WaitKey { x },
            (0xF, _, 0x1, 0x5) => SetDelay { x },
            (0xF, _, 0x1, 0x8) => SetSound { x },
            (0xF, _, 0x1, 0xE) => AddIndex { x },
            (0xF, _, 0x2, 0x9) => LoadGlyph { x },
            (0xF, _, 0x3, 0x3) => StoreBcd { x },
            (0xF, _, 0x5, 0x5) => StoreRegisters { x },
            (0xF, _, 0x6, 0x5) => LoadRegisters { x },
            _ => Unsupported(op),
        }
    }

    /// Applies this instruction to `state`, producing the next state.
    ///
    /// `rng` is only drawn from by `Random`.
    pub fn execute<R: Rng + ?Sized>(self, state: &State, quirks: Quirks, rng: &mut R) -> Outcome {
        use Instruction::*;

        let next = match self {
            Clear => operations::clr(state),
            Return => return operations::rts(state),
            Jump(addr) => operations::jump(state, addr),
            Call(addr) => return operations::call(state, addr),
            SkipEqImm { x, nn } => operations::ske(state, x, nn),
            SkipNeImm { x, nn } => operations::skne(state, x, nn),
            SkipEqReg { x, y } => operations::skre(state, x, y),
            LoadImm { x, nn } => operations::load(state, x, nn),
            AddImm { x, nn } => operations::add(state, x, nn),
            Move { x, y } => operations::mv(state, x, y),
            Or { x, y } => operations::or(state, x, y),
            And { x, y } => operations::and(state, x, y),
            Xor { x, y } => operations::xor(state, x, y),
            AddReg { x, y } => operations::addc(state, x, y),
            Sub { x, y } => operations::sub(state, x, y),
            ShiftRight { x, y } => operations::shr(state, x, y, quirks.shift_uses_vy),
            SubReverse { x, y } => operations::subn(state, x, y),
            ShiftLeft { x, y } => operations::shl(state, x, y, quirks.shift_uses_vy),
            SkipNeReg { x, y } => operations::skrne(state, x, y),
            LoadIndex(addr) => operations::loadi(state, addr),
            JumpOffset(addr) => operations::jumpi(state, addr),
            Random { x, nn } => operations::rnd(state, x, nn, rng.gen()),
            Draw { x, y, n } => return operations::draw(state, x, y, n, quirks.clip_sprites),
            SkipPressed { x } => operations::skpr(state, x),
            SkipNotPressed { x } => operations::skup(state, x),
            LoadDelay { x } => operations::moved(state, x),
            WaitKey { x } => operations::keyd(state, x),
            SetDelay { x } => operations::loadd(state, x),
            SetSound { x } => operations::loads(state, x),
            AddIndex { x } => operations::addi(state, x),
            LoadGlyph { x } => operations::ldspr(state, x),
            StoreBcd { x } => return operations::bcd(state, x),
            StoreRegisters { x } => {
                return operations::stor(state, x, quirks.load_store_increments_i)
            }
            LoadRegisters { x } => {
                return operations::read(state, x, quirks.load_store_increments_i)
            }
            Unsupported(_) => State {
                pc: state.pc + 0x2,
                ..*state
            },
        };
        Ok(next)
    }
}

/// Conventional Chip-8 mnemonics, used when tracing execution
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Clear => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(addr) => write!(f, "JP {:#05X}", addr),
            Call(addr) => write!(f, "CALL {:#05X}", addr),
            SkipEqImm { x, nn } => write!(f, "SE V{:X}, {:#04X}", x, nn),
            SkipNeImm { x, nn } => write!(f, "SNE V{:X}, {:#04X}", x, nn),
            SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImm { x, nn } => write!(f, "LD V{:X}, {:#04X}", x, nn),
            AddImm { x, nn } => write!(f, "ADD V{:X}, {:#04X}", x, nn),
            Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            SubReverse { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x, y } => write!(f, "SHL V{:X}, V{:X}", x, y),
            SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex(addr) => write!(f, "LD I, {:#05X}", addr),
            JumpOffset(addr) => write!(f, "JP V0, {:#05X}", addr),
            Random { x, nn } => write!(f, "RND V{:X}, {:#04X}", x, nn),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipPressed { x } => write!(f, "SKP V{:X}", x),
            SkipNotPressed { x } => write!(f, "SKNP V{:X}", x),
            LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
            Unsupported(op) => write!(f, "??? {:04X}", op),
        }
    }
}
