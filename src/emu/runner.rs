use std::collections::HashSet;

use super::{AudioSink, Chip8, Chip8Error, DisplaySink, InputSource, StepResult};
use crate::u4;

/// Pacing of the runner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunnerConfig {
    /// Instructions executed per second.
    pub cpu_hz: f32,
    /// Timer decrements per second.
    pub timer_hz: f32,
    /// End the frame after every draw instruction.
    pub display_wait: bool,
}

impl RunnerConfig {
    /// Both rates must be finite and positive, otherwise the accumulators
    /// either never drain or never fill.
    pub fn validate(&self) -> Result<(), Chip8Error> {
        for (name, value) in [("cpu", self.cpu_hz), ("timer", self.timer_hz)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Chip8Error::InvalidRate { name, value });
            }
        }
        Ok(())
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            cpu_hz: 700.0,
            timer_hz: 60.0,
            display_wait: true,
        }
    }
}

/// High-level emulator runner that manages timing internally.
pub struct Chip8Runner {
    chip8: Chip8,
    config: RunnerConfig,
    cpu_dt_accumulator: f32,
    timer_dt_accumulator: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chip8RunnerResult {
    HitBreakpoint,
    Ok,
}

impl Chip8Runner {
    pub fn new(chip8: Chip8) -> Self {
        Self {
            chip8,
            config: RunnerConfig::default(),
            cpu_dt_accumulator: 0.0,
            timer_dt_accumulator: 0.0,
        }
    }

    /// Fails with [`Chip8Error::InvalidRate`] if either rate is not a finite
    /// positive number.
    pub fn with_config(chip8: Chip8, config: RunnerConfig) -> Result<Self, Chip8Error> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(chip8)
        })
    }

    /// Update emulator by delta time, handles both CPU and timer cycles.
    ///
    /// Runs as many CPU cycles and timer updates as needed based on the elapsed time `dt`.
    /// Returns early if a frame has to be rendered before the next CPU cycle.
    pub fn update(&mut self, dt: f32) -> Result<Chip8RunnerResult, Chip8Error> {
        self.update_with_breakpoints(dt, None)
    }

    /// Like `update` but checks for breakpoints after each CPU cycle.
    pub fn update_with_breakpoints(
        &mut self,
        dt: f32,
        breakpoints: Option<&HashSet<u16>>,
    ) -> Result<Chip8RunnerResult, Chip8Error> {
        let cpu_time_step = 1.0 / self.config.cpu_hz;
        let timer_time_step = 1.0 / self.config.timer_hz;

        self.cpu_dt_accumulator += dt;
        self.timer_dt_accumulator += dt;

        while self.timer_dt_accumulator >= timer_time_step {
            self.timer_dt_accumulator -= timer_time_step;
            self.chip8.tick_timers();
        }

        while self.cpu_dt_accumulator >= cpu_time_step {
            self.cpu_dt_accumulator -= cpu_time_step;

            let cpu_result = self.chip8.step()?;

            if let Some(breakpoints) = breakpoints
                && breakpoints.contains(&self.chip8.pc())
            {
                self.cpu_dt_accumulator = 0.0;
                return Ok(Chip8RunnerResult::HitBreakpoint);
            }

            let end_frame = match cpu_result {
                StepResult::Drew => self.config.display_wait,
                StepResult::WaitingForKey => true,
                StepResult::Continue | StepResult::Ignored(_) => false,
            };

            if end_frame {
                // Stop executing cycles until the next frame.
                // We clear the accumulator to avoid "catching up" in the next frame.
                self.cpu_dt_accumulator = 0.0;
                break;
            }
        }

        Ok(Chip8RunnerResult::Ok)
    }

    /// Runs one frame against a front-end: samples the keypad from `input`,
    /// advances by `dt`, then hands the display and buzzer state to the sinks.
    ///
    /// The sinks are updated even when execution fails, so the last good
    /// frame stays visible.
    pub fn run_frame<I, D, A>(
        &mut self,
        dt: f32,
        input: &I,
        display: &mut D,
        audio: &mut A,
    ) -> Result<Chip8RunnerResult, Chip8Error>
    where
        I: InputSource + ?Sized,
        D: DisplaySink + ?Sized,
        A: AudioSink + ?Sized,
    {
        for key in 0..16 {
            let key = u4::new(key);
            self.chip8.set_key(key, input.is_pressed(key));
        }

        let result = self.update(dt);

        display.present(self.chip8.display());
        audio.set_tone(self.chip8.should_beep());

        result
    }

    /// Returns true if the sound timer is active, indicating a beep should be played.
    pub fn should_beep(&self) -> bool {
        self.chip8.should_beep()
    }

    /// Set the state of a key on the keypad.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.chip8.set_key(key, pressed)
    }

    /// Get the state of a pixel on the display (true = on, false = off).
    pub fn pixel(&self, y: usize, x: usize) -> bool {
        self.chip8.pixel(y, x)
    }

    pub fn config(&self) -> RunnerConfig {
        self.config
    }

    pub fn chip8_ref(&self) -> &Chip8 {
        &self.chip8
    }

    pub fn chip8_mut(&mut self) -> &mut Chip8 {
        &mut self.chip8
    }
}
