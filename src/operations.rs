use std::ops::Range;

use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, GLYPH_SIZE, MAX_ADDRESS, MEMORY_SIZE, STACK_DEPTH,
};
use crate::error::MachineError;
use crate::state::State;

/// The result of an operation that can fault
pub type Outcome = Result<State, MachineError>;

/// Range of `len` bytes of memory starting at I
fn at_i(state: &State, len: usize) -> Result<Range<usize>, MachineError> {
    if len == 0 {
        return Ok(0..0);
    }
    let start = state.i as usize;
    let end = start + len;
    if end > MEMORY_SIZE {
        return Err(MachineError::AddressOutOfRange {
            pc: state.pc,
            addr: end - 1,
        });
    }
    Ok(start..end)
}

/// pc += 4 when `cond` holds, otherwise pc += 2
fn skip_if(state: &State, cond: bool) -> State {
    let pc = if cond { state.pc + 0x4 } else { state.pc + 0x2 };
    State { pc, ..*state }
}

/// Writes `result` to Vx and then `flag` to VF.
/// VF is written last so it holds the flag even when x is 0xF.
fn with_flag(state: &State, x: u8, result: u8, flag: bool) -> State {
    let mut v = state.v;
    v[x as usize] = result;
    v[0xF] = u8::from(flag);
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

fn with_vx(state: &State, x: u8, value: u8) -> State {
    let mut v = state.v;
    v[x as usize] = value;
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

/// clear
pub fn clr(state: &State) -> State {
    State {
        pc: state.pc + 0x2,
        frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        draw_flag: true,
        ..*state
    }
}

/// PC = STACK.pop() + 2
pub fn rts(state: &State) -> Outcome {
    if state.sp == 0 {
        return Err(MachineError::StackUnderflow { pc: state.pc });
    }
    let sp = state.sp - 0x1;
    Ok(State {
        pc: state.stack[sp as usize] + 0x2,
        sp,
        ..*state
    })
}

/// PC = addr
pub fn jump(state: &State, addr: u16) -> State {
    State { pc: addr, ..*state }
}

/// STACK.push(PC); PC = addr
pub fn call(state: &State, addr: u16) -> Outcome {
    if state.sp as usize >= STACK_DEPTH {
        return Err(MachineError::StackOverflow { pc: state.pc });
    }
    let mut stack = state.stack;
    stack[state.sp as usize] = state.pc;
    Ok(State {
        pc: addr,
        sp: state.sp + 0x1,
        stack,
        ..*state
    })
}

/// if Vx == nn then pc += 2
pub fn ske(state: &State, x: u8, nn: u8) -> State {
    skip_if(state, state.vx(x) == nn)
}

/// if Vx != nn then pc += 2
pub fn skne(state: &State, x: u8, nn: u8) -> State {
    skip_if(state, state.vx(x) != nn)
}

/// if Vx == Vy then pc += 2
pub fn skre(state: &State, x: u8, y: u8) -> State {
    skip_if(state, state.vx(x) == state.vx(y))
}

/// if Vx != Vy then pc += 2
pub fn skrne(state: &State, x: u8, y: u8) -> State {
    skip_if(state, state.vx(x) != state.vx(y))
}

/// Vx = nn
pub fn load(state: &State, x: u8, nn: u8) -> State {
    with_vx(state, x, nn)
}

/// Vx += nn
/// Overflow wraps and VF is left alone
pub fn add(state: &State, x: u8, nn: u8) -> State {
    with_vx(state, x, state.vx(x).wrapping_add(nn))
}

/// Vx = Vy
pub fn mv(state: &State, x: u8, y: u8) -> State {
    with_vx(state, x, state.vx(y))
}

/// Vx |= Vy
pub fn or(state: &State, x: u8, y: u8) -> State {
    with_vx(state, x, state.vx(x) | state.vx(y))
}

/// Vx &= Vy
pub fn and(state: &State, x: u8, y: u8) -> State {
    with_vx(state, x, state.vx(x) & state.vx(y))
}

/// Vx ^= Vy
pub fn xor(state: &State, x: u8, y: u8) -> State {
    with_vx(state, x, state.vx(x) ^ state.vx(y))
}

/// Vx += Vy; VF = carry
pub fn addc(state: &State, x: u8, y: u8) -> State {
    let (res, carry) = state.vx(x).overflowing_add(state.vx(y));
    with_flag(state, x, res, carry)
}

/// Vx -= Vy; VF = !borrow
pub fn sub(state: &State, x: u8, y: u8) -> State {
    let (res, borrow) = state.vx(x).overflowing_sub(state.vx(y));
    with_flag(state, x, res, !borrow)
}

/// Vx = Vy - Vx; VF = !borrow
pub fn subn(state: &State, x: u8, y: u8) -> State {
    let (res, borrow) = state.vx(y).overflowing_sub(state.vx(x));
    with_flag(state, x, res, !borrow)
}

/// Vx = src >> 1; VF = the bit shifted out
pub fn shr(state: &State, x: u8, y: u8, shift_uses_vy: bool) -> State {
    let src = if shift_uses_vy { state.vx(y) } else { state.vx(x) };
    with_flag(state, x, src >> 1, src & 0x1 == 0x1)
}

/// Vx = src << 1; VF = the bit shifted out
pub fn shl(state: &State, x: u8, y: u8, shift_uses_vy: bool) -> State {
    let src = if shift_uses_vy { state.vx(y) } else { state.vx(x) };
    with_flag(state, x, src << 1, src & 0x80 == 0x80)
}

/// I = addr
pub fn loadi(state: &State, addr: u16) -> State {
    State {
        pc: state.pc + 0x2,
        i: addr,
        ..*state
    }
}

/// PC = V0 + addr
pub fn jumpi(state: &State, addr: u16) -> State {
    State {
        pc: u16::from(state.v[0x0]) + addr,
        ..*state
    }
}

/// Vx = random_byte & nn
pub fn rnd(state: &State, x: u8, nn: u8, random_byte: u8) -> State {
    with_vx(state, x, random_byte & nn)
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the sprite at memory[I..I+n] onto the FrameBuffer at (Vx, Vy).
///
/// The starting position always wraps onto the screen. Pixels that run past the
/// right or bottom edge wrap around too, unless `clip` is set in which case they
/// are dropped. VF is set if any lit pixel is erased.
pub fn draw(state: &State, x: u8, y: u8, n: u8, clip: bool) -> Outcome {
    let rows = at_i(state, n as usize)?;
    let origin_x = state.vx(x) as usize % DISPLAY_WIDTH;
    let origin_y = state.vx(y) as usize % DISPLAY_HEIGHT;

    let mut frame_buffer = state.frame_buffer;
    let mut collision = 0x0;

    for (row, sprite) in state.memory[rows].iter().enumerate() {
        let py = origin_y + row;
        if clip && py >= DISPLAY_HEIGHT {
            break;
        }
        let py = py % DISPLAY_HEIGHT;

        for bit in 0..8 {
            let px = origin_x + bit;
            if clip && px >= DISPLAY_WIDTH {
                break;
            }
            let px = px % DISPLAY_WIDTH;

            let pixel = (sprite >> (7 - bit)) & 0x1;
            collision |= pixel & frame_buffer[py][px];
            frame_buffer[py][px] ^= pixel;
        }
    }

    let mut v = state.v;
    v[0xF] = collision;
    Ok(State {
        pc: state.pc + 0x2,
        v,
        frame_buffer,
        draw_flag: true,
        ..*state
    })
}

/// if Vx.pressed then pc += 2
pub fn skpr(state: &State, x: u8) -> State {
    skip_if(state, state.is_pressed(state.vx(x)))
}

/// if !Vx.pressed then pc += 2
pub fn skup(state: &State, x: u8) -> State {
    skip_if(state, !state.is_pressed(state.vx(x)))
}

/// Vx = DT
pub fn moved(state: &State, x: u8) -> State {
    with_vx(state, x, state.delay_timer)
}

/// Suspend until a key is pressed; the key is written to Vx on resume
pub fn keyd(state: &State, x: u8) -> State {
    State {
        pc: state.pc + 0x2,
        awaiting_key: Some(x),
        ..*state
    }
}

/// DT = Vx
pub fn loadd(state: &State, x: u8) -> State {
    State {
        pc: state.pc + 0x2,
        delay_timer: state.vx(x),
        ..*state
    }
}

/// ST = Vx
pub fn loads(state: &State, x: u8) -> State {
    State {
        pc: state.pc + 0x2,
        sound_timer: state.vx(x),
        ..*state
    }
}

/// I += Vx; VF = I left addressable memory
/// The flag comes from the full sum; I itself wraps at 16 bits.
pub fn addi(state: &State, x: u8) -> State {
    let sum = u32::from(state.i) + u32::from(state.vx(x));
    let mut v = state.v;
    v[0xF] = u8::from(sum > u32::from(MAX_ADDRESS));
    State {
        pc: state.pc + 0x2,
        i: (sum & 0xFFFF) as u16,
        v,
        ..*state
    }
}

/// I = Vx * 5
/// Set I to the memory address of the glyph for digit Vx
/// See constants::SPRITE_SHEET for more details
pub fn ldspr(state: &State, x: u8) -> State {
    State {
        pc: state.pc + 0x2,
        i: u16::from(state.vx(x)) * GLYPH_SIZE,
        ..*state
    }
}

/// mem[I..I+3] = bcd(Vx)
pub fn bcd(state: &State, x: u8) -> Outcome {
    let value = state.vx(x);
    let mut memory = state.memory;
    memory[at_i(state, 3)?].copy_from_slice(&[value / 100, value / 10 % 10, value % 10]);
    Ok(State {
        pc: state.pc + 0x2,
        memory,
        ..*state
    })
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(state: &State, x: u8, increment_i: bool) -> Outcome {
    let count = x as usize + 1;
    let mut memory = state.memory;
    memory[at_i(state, count)?].copy_from_slice(&state.v[..count]);
    Ok(State {
        pc: state.pc + 0x2,
        i: advanced_i(state, count, increment_i),
        memory,
        ..*state
    })
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(state: &State, x: u8, increment_i: bool) -> Outcome {
    let count = x as usize + 1;
    let mut v = state.v;
    v[..count].copy_from_slice(&state.memory[at_i(state, count)?]);
    Ok(State {
        pc: state.pc + 0x2,
        i: advanced_i(state, count, increment_i),
        v,
        ..*state
    })
}

fn advanced_i(state: &State, count: usize, increment_i: bool) -> u16 {
    if increment_i {
        state.i + count as u16
    } else {
        state.i
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins_when_vf_is_destination() {
        let mut state = State::new();
        state.v[0xF] = 0xFF;
        state.v[0x1] = 0x01;
        let state = addc(&state, 0xF, 0x1);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_vf_operand_read_before_flag_write() {
        let mut state = State::new();
        state.v[0x1] = 0x10;
        state.v[0xF] = 0x20;
        // 0x10 - 0x20 borrows, so VF ends up 0 rather than the difference
        let state = sub(&state, 0x1, 0xF);
        assert_eq!(state.v[0x1], 0xF0);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_shr_uses_vy_with_quirk() {
        let mut state = State::new();
        state.v[0x1] = 0x4;
        state.v[0x2] = 0x3;
        let shifted = shr(&state, 0x1, 0x2, true);
        assert_eq!(shifted.v[0x1], 0x1);
        assert_eq!(shifted.v[0xF], 0x1);
        let shifted = shr(&state, 0x1, 0x2, false);
        assert_eq!(shifted.v[0x1], 0x2);
        assert_eq!(shifted.v[0xF], 0x0);
    }

    #[test]
    fn test_draw_wraps_at_right_edge() {
        let mut state = State::new();
        state.v[0x0] = 62;
        // glyph 0 starts with 0xF0: four lit pixels
        let state = draw(&state, 0x0, 0x1, 1, false).unwrap();
        assert_eq!(state.frame_buffer[0][62..64], [1, 1]);
        assert_eq!(state.frame_buffer[0][0..2], [1, 1]);
    }

    #[test]
    fn test_draw_clips_at_right_edge() {
        let mut state = State::new();
        state.v[0x0] = 62;
        let state = draw(&state, 0x0, 0x1, 1, true).unwrap();
        assert_eq!(state.frame_buffer[0][62..64], [1, 1]);
        assert_eq!(state.frame_buffer[0][0..2], [0, 0]);
    }

    #[test]
    fn test_draw_wraps_start_position() {
        let mut state = State::new();
        state.v[0x0] = 64 + 3;
        state.v[0x1] = 32 + 2;
        let state = draw(&state, 0x0, 0x1, 1, true).unwrap();
        assert_eq!(state.frame_buffer[2][3..7], [1, 1, 1, 1]);
    }

    #[test]
    fn test_draw_past_memory_faults() {
        let mut state = State::new();
        state.i = 0xFFE;
        assert_eq!(
            draw(&state, 0x0, 0x0, 3, false),
            Err(MachineError::AddressOutOfRange {
                pc: 0x200,
                addr: 0x1000
            })
        );
    }

    #[test]
    fn test_addi_flags_overflow_past_memory() {
        let mut state = State::new();
        state.i = 0xFFF;
        state.v[0x1] = 0x1;
        let state = addi(&state, 0x1);
        assert_eq!(state.i, 0x1000);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_addi_flags_overflow_when_i_wraps() {
        let mut state = State::new();
        state.i = 0xFF0F;
        state.v[0x1] = 0xFF;
        let state = addi(&state, 0x1);
        assert_eq!(state.i, 0x000E);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_empty_sprite_reads_no_memory() {
        let mut state = State::new();
        state.i = 0xFFFF;
        let state = draw(&state, 0x0, 0x0, 0, false).unwrap();
        assert_eq!(state.pc, 0x202);
        assert_eq!(state.v[0xF], 0x0);
        assert!(state.draw_flag);
    }

    #[test]
    fn test_stor_increments_i_with_quirk() {
        let mut state = State::new();
        state.i = 0x300;
        let state = stor(&state, 0x3, true).unwrap();
        assert_eq!(state.i, 0x304);
    }

    #[test]
    fn test_call_overflow_faults() {
        let mut state = State::new();
        state.sp = STACK_DEPTH as u8;
        assert_eq!(
            call(&state, 0x300),
            Err(MachineError::StackOverflow { pc: 0x200 })
        );
    }

    #[test]
    fn test_rts_underflow_faults() {
        let state = State::new();
        assert_eq!(rts(&state), Err(MachineError::StackUnderflow { pc: 0x200 }));
    }
}
