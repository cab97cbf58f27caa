#![allow(dead_code)]

use chip8_vm::emu::{Chip8, Quirks, StepResult};

/// Big-endian byte image of a list of instruction words.
pub fn assemble(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_be_bytes()).collect()
}

/// A COSMAC-mode machine with `words` loaded at 0x200.
pub fn machine(words: &[u16]) -> Chip8 {
    machine_with(Quirks::COSMAC, words)
}

pub fn machine_with(quirks: Quirks, words: &[u16]) -> Chip8 {
    let mut chip8 = Chip8::with_seed(quirks, 0x5EED);
    chip8
        .load(&assemble(words))
        .expect("test program fits in memory");
    chip8
}

/// Steps `count` instructions, failing the test on any error.
pub fn run(chip8: &mut Chip8, count: usize) -> StepResult {
    let mut last = StepResult::Continue;
    for _ in 0..count {
        last = chip8.step().expect("instruction executes");
    }
    last
}
