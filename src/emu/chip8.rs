use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{
    CallStack, Chip8Error, DISPLAY_X, DISPLAY_Y, Display, FONT, FONT_END_ADDRESS,
    FONT_START_ADDRESS, Opcode, Quirks, StepResult,
};
use crate::u4;

// Standard CHIP-8 memory map
pub const ROM_START_ADDRESS: usize = 0x200;
pub const MEMORY_SIZE: usize = 4096;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - ROM_START_ADDRESS;

/// `pc` and `I` hold 12-bit addresses.
pub(crate) const ADDRESS_MASK: u16 = (MEMORY_SIZE - 1) as u16;

/// CHIP-8 virtual machine state
pub struct Chip8 {
    /// 4KB memory array
    pub(crate) memory: [u8; MEMORY_SIZE],
    /// Display buffer: 64x32 monochrome pixels
    pub(crate) display: Display<bool>,

    /// Program counter: address of the next instruction to execute
    pub(crate) pc: u16,
    /// Index register: used for memory operations
    pub(crate) i: u16,
    /// General-purpose registers V0-VF (VF is used as a flag register)
    pub(crate) v: [u8; 16],
    /// Call stack for subroutine returns
    pub(crate) stack: CallStack,

    /// Delay timer: decrements at 60Hz until it reaches 0
    pub(crate) delay_timer: u8,
    /// Sound timer: decrements at 60Hz, beeps while non-zero
    pub(crate) sound_timer: u8,

    /// Keypad state: 16 keys mapped as booleans (true = pressed)
    pub(crate) keypad: [bool; 16],

    pub(crate) quirks: Quirks,
    pub(crate) rng: StdRng,
}

impl Chip8 {
    /// Creates a machine whose random source is seeded from the OS.
    pub fn new(quirks: Quirks) -> Self {
        Self::with_rng(quirks, StdRng::from_os_rng())
    }

    /// Creates a machine with a deterministic random source.
    pub fn with_seed(quirks: Quirks, seed: u64) -> Self {
        Self::with_rng(quirks, StdRng::seed_from_u64(seed))
    }

    fn with_rng(quirks: Quirks, rng: StdRng) -> Self {
        let mut chip8 = Chip8 {
            memory: [0; MEMORY_SIZE],
            display: [[false; DISPLAY_X]; DISPLAY_Y],
            pc: ROM_START_ADDRESS as u16,
            i: 0,
            v: [0; 16],
            stack: CallStack::new(),
            delay_timer: 0,
            sound_timer: 0,
            keypad: [false; 16],
            quirks,
            rng,
        };
        chip8.reset();
        chip8
    }

    /// Returns the machine to its power-on state. Memory is wiped, so any
    /// program has to be loaded again. Quirks and the random source are kept.
    pub fn reset(&mut self) {
        self.memory = [0; MEMORY_SIZE];
        self.memory[FONT_START_ADDRESS..FONT_END_ADDRESS].copy_from_slice(&FONT);
        self.display = [[false; DISPLAY_X]; DISPLAY_Y];
        self.pc = ROM_START_ADDRESS as u16;
        self.i = 0;
        self.v = [0; 16];
        self.stack.clear();
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.keypad = [false; 16];
    }

    /// Loads a ROM into memory at the program start address. Everything above
    /// the ROM is cleared, so a previous program leaves nothing behind.
    ///
    /// On error nothing is modified.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: rom.len(),
                max_size: MAX_ROM_SIZE,
            });
        }

        let (program, rest) = self.memory[ROM_START_ADDRESS..].split_at_mut(rom.len());
        program.copy_from_slice(rom);
        rest.fill(0);

        // Set program counter to start of ROM
        self.pc = ROM_START_ADDRESS as u16;

        Ok(())
    }

    /// Reads a ROM file from disk and loads it.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), Chip8Error> {
        let path = path.as_ref();
        let rom = std::fs::read(path).map_err(|source| Chip8Error::RomRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.load(&rom)
    }

    /// Executes a single CPU cycle (fetch, decode, execute).
    ///
    /// If the instruction fails the program counter is left on it.
    pub fn step(&mut self) -> Result<StepResult, Chip8Error> {
        let pc = self.pc;
        let opcode = Opcode::decode(self.fetch());

        let result = self.execute(opcode);
        if result.is_err() {
            self.pc = pc;
        }
        result
    }

    /// Updates the delay and sound timers. Should be called at 60Hz.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Returns true if the sound timer is greater than zero, indicating a beep should be played.
    pub fn should_beep(&self) -> bool {
        self.sound_timer > 0
    }

    /// Set the state of a key on the keypad.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.keypad[key] = pressed;
    }

    /// Get the state of a pixel on the display (true = on, false = off).
    pub fn pixel(&self, y: usize, x: usize) -> bool {
        self.display[y][x]
    }

    pub fn display(&self) -> &Display<bool> {
        &self.display
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn v(&self) -> &[u8; 16] {
        &self.v
    }

    /// Return addresses currently on the call stack, oldest first.
    pub fn stack(&self) -> &[u16] {
        self.stack.as_slice()
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn keypad(&self) -> &[bool; 16] {
        &self.keypad
    }

    pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
        &self.memory
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    /// Reads the instruction word at `addr` without executing it.
    pub fn peek_word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([*self.mem(addr), *self.mem(addr.wrapping_add(1))])
    }

    /// Fetches the next 16-bit opcode from memory and advances the program counter.
    fn fetch(&mut self) -> u16 {
        let word = self.peek_word(self.pc);
        self.pc = self.pc.wrapping_add(2) & ADDRESS_MASK;
        word
    }

    /// Memory cell at `addr`. The address space wraps at 4KB.
    pub(crate) fn mem(&self, addr: u16) -> &u8 {
        &self.memory[addr as usize % MEMORY_SIZE]
    }

    pub(crate) fn mem_mut(&mut self, addr: u16) -> &mut u8 {
        &mut self.memory[addr as usize % MEMORY_SIZE]
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new(Quirks::default())
    }
}
