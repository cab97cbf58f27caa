mod chip8;
mod execute;
mod font;
mod io;
mod opcode;
mod quirks;
mod runner;
mod stack;
mod types;

pub use chip8::*;
pub use font::*;
pub use io::*;
pub use opcode::*;
pub use quirks::*;
pub use runner::*;
pub use stack::*;
pub use types::*;
