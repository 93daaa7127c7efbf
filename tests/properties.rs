//! Property-based tests for interpreter invariants.
//!
//! Every program here is assembled by hand and run through the public
//! `Machine` API, so these exercise decode and execute together.

use proptest::prelude::*;
use vip8::constants::{MAX_ROM_SIZE, SPRITE_SHEET};
use vip8::Machine;

/// Flattens opcodes into a big-endian program image
fn assemble(ops: &[u16]) -> Vec<u8> {
    ops.iter().flat_map(|op| op.to_be_bytes()).collect()
}

fn run(program: &[u8], steps: usize) -> Machine {
    let mut machine = Machine::new().with_seed(0);
    machine.load_program(program).unwrap();
    for _ in 0..steps {
        machine.step().unwrap();
    }
    machine
}

/// LD Vr, value for each of V0..=Vx
fn set_registers(values: &[u8]) -> Vec<u16> {
    values
        .iter()
        .enumerate()
        .map(|(r, &value)| 0x6000 | (r as u16) << 8 | u16::from(value))
        .collect()
}

// ========== Arithmetic ==========

proptest! {
    /// 8XY4 sets VF iff the sum overflows and keeps the low byte
    #[test]
    fn prop_add_carries(a in any::<u8>(), b in any::<u8>()) {
        let program = assemble(&[0x6000 | u16::from(a), 0x6100 | u16::from(b), 0x8014]);
        let machine = run(&program, 3);
        let state = machine.state();
        prop_assert_eq!(state.v[0x0], a.wrapping_add(b));
        prop_assert_eq!(state.v[0xF], u8::from(a as u16 + b as u16 > 255));
    }

    /// 8XY5 clears VF iff the subtraction borrows and keeps the low byte
    #[test]
    fn prop_sub_borrows(a in any::<u8>(), b in any::<u8>()) {
        let program = assemble(&[0x6000 | u16::from(a), 0x6100 | u16::from(b), 0x8015]);
        let machine = run(&program, 3);
        let state = machine.state();
        prop_assert_eq!(state.v[0x0], a.wrapping_sub(b));
        prop_assert_eq!(state.v[0xF], u8::from(a >= b));
    }

    /// 8XY7 computes Vy - Vx with the same borrow convention as 8XY5
    #[test]
    fn prop_subn_borrows(a in any::<u8>(), b in any::<u8>()) {
        let program = assemble(&[0x6000 | u16::from(a), 0x6100 | u16::from(b), 0x8017]);
        let machine = run(&program, 3);
        let state = machine.state();
        prop_assert_eq!(state.v[0x0], b.wrapping_sub(a));
        prop_assert_eq!(state.v[0xF], u8::from(b >= a));
    }

    /// CXNN with a zero mask yields zero whatever the random source produces
    #[test]
    fn prop_random_with_zero_mask_is_zero(seed in any::<u64>(), x in 0u16..0xF) {
        let program = assemble(&[0x60FF | x << 8, 0xC000 | x << 8]);
        let mut machine = Machine::new().with_seed(seed);
        machine.load_program(&program).unwrap();
        machine.step().unwrap();
        machine.step().unwrap();
        prop_assert_eq!(machine.state().v[x as usize], 0x00);
    }
}

// ========== Memory ==========

proptest! {
    /// FX55 then FX65 with the same X and I leaves V0..=VX unchanged
    #[test]
    fn prop_store_then_load_round_trips(values in any::<[u8; 16]>(), x in 0u16..=0xF) {
        let mut ops = set_registers(&values);
        ops.extend([0xA400, 0xF055 | x << 8, 0xF065 | x << 8]);
        let machine = run(&assemble(&ops), 16 + 3);
        let state = machine.state();
        prop_assert_eq!(&state.v[..=x as usize], &values[..=x as usize]);
        prop_assert_eq!(&state.memory[0x400..=0x400 + x as usize], &values[..=x as usize]);
        prop_assert_eq!(state.i, 0x400);
    }

    /// A maximum size program is copied byte for byte up to the end of memory
    #[test]
    fn prop_full_size_program_loads(program in prop::collection::vec(any::<u8>(), MAX_ROM_SIZE)) {
        let mut machine = Machine::new();
        prop_assert!(machine.load_program(&program).is_ok());
        prop_assert_eq!(&machine.state().memory[0x200..], &program[..]);
    }

    /// One byte too many is rejected and memory stays as it was
    #[test]
    fn prop_oversized_program_is_rejected(fill in any::<u8>()) {
        let program = vec![fill; MAX_ROM_SIZE + 1];
        let mut machine = Machine::new();
        prop_assert!(machine.load_program(&program).is_err());
        let memory = &machine.state().memory;
        prop_assert_eq!(&memory[..80], &SPRITE_SHEET[..]);
        prop_assert!(memory[80..].iter().all(|&b| b == 0));
    }
}

// ========== Control Flow ==========

proptest! {
    /// CALL followed by RET lands just after the CALL with the stack restored
    #[test]
    fn prop_call_then_return(target in (0x102u16..0x7FF).prop_map(|t| t * 2)) {
        let mut program = vec![0x00; (target - 0x200) as usize + 2];
        program[0..2].copy_from_slice(&(0x2000 | target).to_be_bytes());
        let offset = (target - 0x200) as usize;
        program[offset..offset + 2].copy_from_slice(&[0x00, 0xEE]);

        let mut machine = Machine::new();
        machine.load_program(&program).unwrap();
        machine.step().unwrap();
        prop_assert_eq!(machine.state().pc, target);
        prop_assert_eq!(machine.state().sp, 1);
        machine.step().unwrap();
        prop_assert_eq!(machine.state().pc, 0x202);
        prop_assert_eq!(machine.state().sp, 0);
    }
}

// ========== Drawing ==========

proptest! {
    /// Drawing the same sprite twice restores the blank frame and the second draw
    /// reports a collision exactly when the sprite has a lit pixel
    #[test]
    fn prop_draw_twice_restores_frame(
        sprite in prop::collection::vec(any::<u8>(), 1..=15),
        vx in any::<u8>(),
        vy in any::<u8>(),
    ) {
        let n = sprite.len() as u16;
        let ops = [
            0x6000 | u16::from(vx),
            0x6100 | u16::from(vy),
            0xA300,
            0xD010 | n,
            0xD010 | n,
        ];
        let mut program = assemble(&ops);
        program.resize(0x100, 0x00);
        program.extend(&sprite);

        let mut machine = run(&program, 4);
        let lit = machine.frame().iter().flatten().filter(|&&p| p == 1).count();
        let expected_lit: u32 = sprite.iter().map(|row| row.count_ones()).sum();
        prop_assert_eq!(lit, expected_lit as usize);
        prop_assert_eq!(machine.state().v[0xF], 0);

        machine.step().unwrap();
        prop_assert!(machine.frame().iter().flatten().all(|&p| p == 0));
        prop_assert_eq!(machine.state().v[0xF], u8::from(sprite.iter().any(|&row| row != 0)));
    }

    /// A cleared screen stays blank after drawing an empty sprite
    #[test]
    fn prop_clear_then_blank_sprite(vx in any::<u8>(), vy in any::<u8>(), n in 0u16..=0xF) {
        let ops = [
            0xA000,
            0xD015,
            0x00E0,
            0x6000 | u16::from(vx),
            0x6100 | u16::from(vy),
            0xA300,
            0xD010 | n,
        ];
        let machine = run(&assemble(&ops), ops.len());
        prop_assert!(machine.frame().iter().flatten().all(|&p| p == 0));
        prop_assert_eq!(machine.state().v[0xF], 0);
    }
}
