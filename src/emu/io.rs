//! Capability traits for the collaborators that sit around the interpreter.
//!
//! The core never talks to a window, audio device or keyboard directly. A
//! front-end implements these traits and hands them to [`Chip8Runner::run_frame`].
//!
//! [`Chip8Runner::run_frame`]: super::Chip8Runner::run_frame

use super::{DISPLAY_X, DISPLAY_Y, Display};
use crate::u4;

/// Source of keypad state.
pub trait InputSource {
    fn is_pressed(&self, key: u4) -> bool;
}

/// Receives the display after each frame.
pub trait DisplaySink {
    fn present(&mut self, display: &Display<bool>);
}

/// Turns the buzzer on and off.
pub trait AudioSink {
    fn set_tone(&mut self, on: bool);
}

impl InputSource for [bool; 16] {
    fn is_pressed(&self, key: u4) -> bool {
        self[key]
    }
}

/// Collaborator with no devices behind it. Keeps the last presented frame and
/// the tone state so they can be inspected.
#[derive(Clone, Debug)]
pub struct Headless {
    pub keys: [bool; 16],
    pub frame: Display<bool>,
    pub frames_presented: usize,
    pub tone: bool,
}

impl Headless {
    pub fn new() -> Self {
        Self {
            keys: [false; 16],
            frame: [[false; DISPLAY_X]; DISPLAY_Y],
            frames_presented: 0,
            tone: false,
        }
    }

    /// Number of lit pixels in the last presented frame.
    pub fn lit_pixels(&self) -> usize {
        self.frame.iter().flatten().filter(|&&on| on).count()
    }
}

impl Default for Headless {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for Headless {
    fn is_pressed(&self, key: u4) -> bool {
        self.keys[key]
    }
}

impl DisplaySink for Headless {
    fn present(&mut self, display: &Display<bool>) {
        self.frame = *display;
        self.frames_presented += 1;
    }
}

impl AudioSink for Headless {
    fn set_tone(&mut self, on: bool) {
        self.tone = on;
    }
}
