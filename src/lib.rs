pub mod debugger;
pub mod emu;
mod nibble;

pub use nibble::*;
