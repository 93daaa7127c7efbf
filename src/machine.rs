use std::collections::VecDeque;
use std::io::Read;

use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::{MAX_ROM_SIZE, MAX_SAVED_STATES, MEMORY_SIZE, PROGRAM_START};
use crate::error::{MachineError, RomError};
use crate::instruction::Instruction;
use crate::quirks::Quirks;
use crate::state::{FrameBuffer, State};

/// What a call to [`Machine::step`] did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// The instruction ran and the program counter moved on.
    Executed(Instruction),
    /// The opcode means nothing; it was skipped.
    Unsupported(u16),
    /// Nothing ran because register Vx is still waiting for a key press.
    AwaitingKey(u8),
}

/// # Machine
/// The Chip-8 interpreter core.
///
/// Tracks:
///  - current `state`
///  - `previous_states` for rewinding
///  - the loaded `program` so it can be reset
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - stepping and rewinding the CPU
/// - ticking its timers; the caller is expected to do this at 60Hz
/// - inspecting its frame buffer for rendering by some display
pub struct Machine {
    state: State,
    previous_states: VecDeque<State>,
    program: Vec<u8>,
    quirks: Quirks,
    rng: StdRng,
}

impl Machine {
    pub fn new() -> Self {
        Machine {
            state: State::new(),
            previous_states: VecDeque::with_capacity(MAX_SAVED_STATES),
            program: Vec::new(),
            quirks: Quirks::default(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_quirks(self, quirks: Quirks) -> Self {
        Machine { quirks, ..self }
    }

    /// Makes CXNN deterministic
    pub fn with_seed(self, seed: u64) -> Self {
        Machine {
            rng: StdRng::seed_from_u64(seed),
            ..self
        }
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    /// Load a rom from a reader
    ///
    /// The whole image is read before memory is touched, so a failed load leaves
    /// the machine as it was.
    ///
    /// # Arguments
    /// * `reader` a reader that yields a ROM image
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<usize, RomError> {
        let mut rom = Vec::with_capacity(MAX_ROM_SIZE);
        // read one byte past the limit so oversized images can be told apart
        Read::take(reader, MAX_ROM_SIZE as u64 + 1).read_to_end(&mut rom)?;
        self.load_program(&rom)?;
        Ok(rom.len())
    }

    /// Copy a program image into memory at 0x200
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), RomError> {
        if program.is_empty() {
            warn!("loaded an empty program");
        }
        if program.len() > MAX_ROM_SIZE {
            return Err(RomError::TooLarge {
                size: program.len(),
            });
        }

        let start = PROGRAM_START as usize;
        self.state.memory[start..start + program.len()].copy_from_slice(program);
        self.program = program.to_vec();
        info!("loaded {} byte program", program.len());
        Ok(())
    }

    /// Restores the power-on state, keeping the loaded program
    pub fn reset(&mut self) {
        let start = PROGRAM_START as usize;
        self.state = State::new();
        self.state.memory[start..start + self.program.len()].copy_from_slice(&self.program);
        self.previous_states.clear();
        debug!("machine reset");
    }

    /// The FrameBuffer as of the last instruction
    pub fn frame(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Returns the FrameBuffer if the display should be redrawn and clears the redraw flag
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    pub fn is_redraw_pending(&self) -> bool {
        self.state.draw_flag
    }

    pub fn clear_redraw(&mut self) {
        self.state.draw_flag = false;
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.state.sound_timer
    }

    /// Whether a tone should currently be playing
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    /// The register waiting on FX0A, if any
    pub fn awaiting_key(&self) -> Option<u8> {
        self.state.awaiting_key
    }

    /// Set the pressed status of key
    ///
    /// A press that isn't already held resumes an FX0A wait.
    ///
    /// # Arguments
    /// * `key` the keypad index 0x0..=0xF that was pressed
    pub fn key_press(&mut self, key: u8) {
        if key > 0xF {
            warn!("ignoring press of unknown key {:#X}", key);
            return;
        }
        let was_pressed = self.state.keypad[key as usize];
        self.state.keypad[key as usize] = true;

        if let (Some(register), false) = (self.state.awaiting_key, was_pressed) {
            debug!("key {:X} resumes wait on V{:X}", key, register);
            self.state.v[register as usize] = key;
            self.state.awaiting_key = None;
        }
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the keypad index 0x0..=0xF that was released
    pub fn key_release(&mut self, key: u8) {
        if key > 0xF {
            warn!("ignoring release of unknown key {:#X}", key);
            return;
        }
        self.state.keypad[key as usize] = false;
    }

    /// Advances the CPU by a single instruction
    /// - does nothing while awaiting a keypress
    /// - fetches, decodes and executes the next opcode
    ///
    /// Timers are not touched; see [`Machine::tick_timers`].
    /// On error the state is left as it was before the call.
    pub fn step(&mut self) -> Result<Step, MachineError> {
        if let Some(register) = self.state.awaiting_key {
            return Ok(Step::AwaitingKey(register));
        }

        let pc = self.state.pc;
        let op = self.fetch()?;
        let instruction = Instruction::decode(op);
        trace!(
            "{:03X}: {:04X} {} v{:02X?} i{:03X}",
            pc,
            op,
            instruction,
            self.state.v,
            self.state.i
        );

        let next = instruction.execute(&self.state, self.quirks, &mut self.rng)?;
        self.save_state();
        self.state = next;

        match instruction {
            Instruction::Unsupported(op) => {
                debug!("skipping unsupported opcode {:04X} at {:03X}", op, pc);
                Ok(Step::Unsupported(op))
            }
            Instruction::WaitKey { x } => {
                debug!("waiting for a key press into V{:X}", x);
                Ok(Step::Executed(instruction))
            }
            _ => Ok(Step::Executed(instruction)),
        }
    }

    /// Decrements both timers towards 0; call at 60Hz
    pub fn tick_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Reverses the CPU by a single instruction if possible
    ///
    /// Keys keep their current pressed status so a rewind can't leave one stuck.
    /// Returns whether there was anything to rewind.
    pub fn rewind(&mut self) -> bool {
        match self.previous_states.pop_front() {
            Some(state) => {
                self.state = State {
                    keypad: self.state.keypad,
                    draw_flag: true,
                    ..state
                };
                true
            }
            None => false,
        }
    }

    /// Puts the current state in previous_states
    /// - if there are already MAX_SAVED_STATES saved then the oldest is dropped
    fn save_state(&mut self) {
        if self.previous_states.len() == MAX_SAVED_STATES {
            self.previous_states.pop_back();
        }
        self.previous_states.push_front(self.state);
    }

    /// Gets the opcode currently pointed at by the pc.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    fn fetch(&self) -> Result<u16, MachineError> {
        let pc = self.state.pc as usize;
        if pc + 1 >= MEMORY_SIZE {
            return Err(MachineError::AddressOutOfRange {
                pc: self.state.pc,
                addr: pc + 1,
            });
        }
        let left = u16::from(self.state.memory[pc]);
        let right = u16::from(self.state.memory[pc + 1]);
        Ok(left << 8 | right)
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
