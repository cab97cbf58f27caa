use std::path::PathBuf;

/// Outcome of a single `Chip8::step`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// The instruction executed normally.
    Continue,
    /// A sprite was drawn; a scheduler may end the frame here to limit the
    /// display update rate to the frame rate.
    Drew,
    /// `Fx0A` found no key pressed and rewound the program counter.
    WaitingForKey,
    /// The word did not decode to a known opcode and was skipped.
    Ignored(u16),
}

/// Error types that can occur while loading or running a program.
#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("Failed to read ROM file {path:?}")]
    RomRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stack overflow: call to {address:#05X} exceeds {depth} nested subroutines")]
    StackOverflow { address: u16, depth: usize },

    #[error("Stack underflow: attempted to return from a subroutine with empty call stack")]
    StackUnderflow,

    #[error("Invalid {name} rate {value}: must be a finite number above zero")]
    InvalidRate { name: &'static str, value: f32 },
}

pub const DISPLAY_X: usize = 64;
pub const DISPLAY_Y: usize = 32;
/// A type alias for the display buffer representation, indexed `[y][x]`.
pub type Display<T> = [[T; DISPLAY_X]; DISPLAY_Y];
