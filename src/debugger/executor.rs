use std::collections::HashSet;

use super::commands::{BreakpointAction, Command, CommandError, CommandResult, SetTarget};
use crate::emu::{Chip8Error, Chip8Runner, Chip8RunnerResult, MEMORY_SIZE, Opcode, StepResult};

pub struct Executor {
    is_running: bool,
    runner: Chip8Runner,
    rom: Vec<u8>,
    breakpoints: HashSet<u16>,
}

impl Executor {
    /// `rom` is kept so that `reset` can reload it.
    pub fn new(runner: Chip8Runner, rom: Vec<u8>) -> Self {
        Self {
            is_running: false,
            runner,
            rom,
            breakpoints: HashSet::new(),
        }
    }

    /// Advances the machine by `dt` while in running mode.
    pub fn poll(&mut self, dt: f32) -> Result<Chip8RunnerResult, Chip8Error> {
        if !self.is_running {
            return Ok(Chip8RunnerResult::Ok);
        }

        let result = self
            .runner
            .update_with_breakpoints(dt, Some(&self.breakpoints));

        if matches!(result, Err(_) | Ok(Chip8RunnerResult::HitBreakpoint)) {
            self.is_running = false;
        }

        result
    }

    pub fn execute(&mut self, command: Command) -> Result<CommandResult, CommandError> {
        match command {
            Command::Run => {
                self.execute_run();
                Ok(CommandResult::Ok)
            }
            Command::Pause => {
                self.execute_pause();
                Ok(CommandResult::Ok)
            }
            Command::Step { count } => self.execute_step(count),
            Command::Breakpoint { action } => Ok(self.handle_breakpoint(action)),
            Command::Set { target, value } => self.handle_set(target, value),
            Command::Mem { start, len } => Ok(self.handle_mem(start, len)),
            Command::Disasm { start, count } => Ok(self.handle_disasm(start, count)),
            Command::Reset => self.handle_reset(),
            Command::Quit => Ok(CommandResult::Quit),
        }
    }

    pub fn execute_run(&mut self) {
        self.is_running = true;
    }

    pub fn execute_pause(&mut self) {
        self.is_running = false;
    }

    /// Single-steps `count` instructions, ignoring breakpoints and timers.
    pub fn execute_step(&mut self, count: u32) -> Result<CommandResult, CommandError> {
        let chip8 = self.runner.chip8_mut();

        let mut last = StepResult::Continue;
        for _ in 0..count {
            last = chip8.step()?;
        }

        Ok(CommandResult::Stepped {
            last,
            pc: chip8.pc(),
        })
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn runner(&self) -> &Chip8Runner {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut Chip8Runner {
        &mut self.runner
    }

    fn handle_breakpoint(&mut self, action: BreakpointAction) -> CommandResult {
        match action {
            BreakpointAction::Set { addr } => {
                self.breakpoints.insert(addr);
            }
            BreakpointAction::Clear { addr } => {
                self.breakpoints.remove(&addr);
            }
            BreakpointAction::ClearAll => {
                self.breakpoints.clear();
            }
            BreakpointAction::List => {
                let mut bps: Vec<u16> = self.breakpoints.iter().copied().collect();
                bps.sort_unstable();
                return CommandResult::Breakpoints(bps);
            }
        };

        CommandResult::Ok
    }

    fn handle_set(&mut self, target: SetTarget, value: u16) -> Result<CommandResult, CommandError> {
        if value > target.max_value() {
            return Err(CommandError::ValueOutOfRange {
                target: target.to_string(),
                value,
            });
        }

        let chip8 = self.runner.chip8_mut();
        match target {
            SetTarget::V(reg) => chip8.v[reg] = value as u8,
            SetTarget::I => chip8.i = value,
            SetTarget::Pc => chip8.pc = value,
            SetTarget::DelayTimer => chip8.delay_timer = value as u8,
            SetTarget::SoundTimer => chip8.sound_timer = value as u8,
        }

        Ok(CommandResult::Ok)
    }

    fn handle_mem(&self, start: u16, len: u16) -> CommandResult {
        let start_idx = usize::from(start).min(MEMORY_SIZE);
        let end = (start_idx + usize::from(len)).min(MEMORY_SIZE);

        CommandResult::MemDump {
            data: self.runner.chip8_ref().memory()[start_idx..end].to_vec(),
            offset: start,
        }
    }

    /// Disassembles `count` words from `start`, or from the program counter.
    fn handle_disasm(&self, start: Option<u16>, count: u16) -> CommandResult {
        let chip8 = self.runner.chip8_ref();
        let offset = start.unwrap_or_else(|| chip8.pc());

        let instructions = (0..count)
            .map(|idx| {
                let word = chip8.peek_word(offset.wrapping_add(idx.wrapping_mul(2)));
                (word, Opcode::decode(word))
            })
            .collect();

        CommandResult::Disasm {
            instructions,
            offset,
        }
    }

    fn handle_reset(&mut self) -> Result<CommandResult, CommandError> {
        self.is_running = false;

        let chip8 = self.runner.chip8_mut();
        chip8.reset();
        chip8.load(&self.rom)?;

        Ok(CommandResult::Ok)
    }
}
