use clap::{Parser, Subcommand};
use clap_num::{maybe_hex, maybe_hex_range};

use crate::emu::{Chip8Error, MEMORY_SIZE, Opcode, StepResult};
use crate::u4;

#[derive(Parser)]
#[command(multicall = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    #[command(visible_alias = "r")]
    Run,

    #[command(visible_alias = "p")]
    Pause,

    #[command(visible_alias = "s")]
    Step {
        #[arg(default_value = "1", value_parser = maybe_hex::<u32>)]
        count: u32,
    },

    #[command(name = "break", visible_alias = "b")]
    Breakpoint {
        #[command(subcommand)]
        action: BreakpointAction,
    },

    Set {
        #[arg(value_parser = parse_set_target)]
        target: SetTarget,
        #[arg(value_parser = maybe_hex::<u16>)]
        value: u16,
    },

    #[command(visible_alias = "m")]
    Mem {
        #[arg(default_value = "0x200", value_parser = parse_address)]
        start: u16,
        #[arg(default_value = "64", value_parser = maybe_hex::<u16>)]
        len: u16,
    },

    #[command(visible_alias = "d")]
    Disasm {
        #[arg(value_parser = parse_address)]
        start: Option<u16>,
        #[arg(default_value = "16", value_parser = maybe_hex::<u16>)]
        count: u16,
    },

    Reset,

    #[command(visible_alias = "q")]
    Quit,
}

#[derive(Debug)]
pub enum CommandResult {
    Ok,
    Stepped { last: StepResult, pc: u16 },
    Breakpoints(Vec<u16>),
    MemDump { data: Vec<u8>, offset: u16 },
    Disasm { instructions: Vec<(u16, Opcode)>, offset: u16 },
    Quit,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Error while executing cpu instruction: {0}")]
    Chip8Error(#[from] Chip8Error),
    #[error("Value {value:#X} out of range for {target}")]
    ValueOutOfRange { target: String, value: u16 },
}

#[derive(Subcommand, Clone, Debug)]
pub enum BreakpointAction {
    #[command(visible_alias = "s")]
    Set {
        #[arg(value_parser = parse_address)]
        addr: u16,
    },

    #[command(visible_alias = "c")]
    Clear {
        #[arg(value_parser = parse_address)]
        addr: u16,
    },

    #[command(visible_alias = "l")]
    List,

    #[command(visible_alias = "ca")]
    ClearAll,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetTarget {
    V(u4),
    I,
    Pc,
    DelayTimer,
    SoundTimer,
}

impl SetTarget {
    /// Largest value the target can hold.
    pub fn max_value(self) -> u16 {
        match self {
            SetTarget::V(_) | SetTarget::DelayTimer | SetTarget::SoundTimer => 0xFF,
            SetTarget::I | SetTarget::Pc => (MEMORY_SIZE - 1) as u16,
        }
    }
}

impl std::fmt::Display for SetTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetTarget::V(reg) => write!(f, "V{reg}"),
            SetTarget::I => write!(f, "I"),
            SetTarget::Pc => write!(f, "PC"),
            SetTarget::DelayTimer => write!(f, "DT"),
            SetTarget::SoundTimer => write!(f, "ST"),
        }
    }
}

fn parse_address(s: &str) -> Result<u16, String> {
    maybe_hex_range(s, 0, (MEMORY_SIZE - 1) as u16)
}

fn parse_set_target(s: &str) -> Result<SetTarget, String> {
    let lower = s.to_lowercase();

    match lower.as_str() {
        "index" | "i" => Ok(SetTarget::I),
        "pc" => Ok(SetTarget::Pc),
        "dt" | "delay" => Ok(SetTarget::DelayTimer),
        "st" | "sound" => Ok(SetTarget::SoundTimer),

        _ if lower.starts_with('v') => {
            let hex_str = &lower[1..];
            match u8::from_str_radix(hex_str, 16) {
                Ok(val) if val < 16 => Ok(SetTarget::V(u4::new(val))),
                _ => Err(format!("Invalid register: '{}'", s)),
            }
        }

        _ => Err(format!("Unknown set target: '{}'", s)),
    }
}
