use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::Context;
use clap::Parser;
use pixels::{Pixels, SurfaceTexture};
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source, source::SquareWave};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, KeyCode, NamedKey},
    window::{Window, WindowId},
};

use chip8_vm::emu::{
    AudioSink, Chip8, Chip8Runner, DISPLAY_X, DISPLAY_Y, Display, DisplaySink, Mode,
    RunnerConfig,
};

/// The rate at which pixels fade out (phosphor decay).
const DISPLAY_PHOSPHOR_RATE: f32 = 10.0;

/// Frequency of the buzzer tone in Hz.
const TONE_HZ: f32 = 440.0;

/// Mapping from physical keyboard keys to CHIP-8 hex keypad (0x0-0xF).
const KEY_MAP: [KeyCode; 16] = [
    KeyCode::KeyX,   // 0x00
    KeyCode::Digit1, // 0x01
    KeyCode::Digit2, // 0x02
    KeyCode::Digit3, // 0x03
    KeyCode::KeyQ,   // 0x04
    KeyCode::KeyW,   // 0x05
    KeyCode::KeyE,   // 0x06
    KeyCode::KeyA,   // 0x07
    KeyCode::KeyS,   // 0x08
    KeyCode::KeyD,   // 0x09
    KeyCode::KeyZ,   // 0x0A
    KeyCode::KeyC,   // 0x0B
    KeyCode::Digit4, // 0x0C
    KeyCode::KeyR,   // 0x0D
    KeyCode::KeyF,   // 0x0E
    KeyCode::KeyV,   // 0x0F
];

/// Pixel surface the interpreter's display is presented to.
struct Screen {
    pixels: Option<Pixels<'static>>,
    /// Stores the brightness of each pixel (0.0 to 1.0) to implement phosphor decay.
    display_float: Display<f32>,
    /// Time since the previous present, drives the decay.
    dt: f32,
}

impl DisplaySink for Screen {
    fn present(&mut self, display: &Display<bool>) {
        let Some(pixels) = self.pixels.as_mut() else {
            return;
        };

        for (i, pxl) in pixels.frame_mut().chunks_exact_mut(4).enumerate() {
            let x = i % DISPLAY_X;
            let y = i / DISPLAY_X;

            // Lit pixels jump to full brightness, unlit ones fade out over time
            // instead of turning off instantly.
            self.display_float[y][x] = if display[y][x] {
                1.0
            } else {
                (self.display_float[y][x] - DISPLAY_PHOSPHOR_RATE * self.dt).max(0.0)
            };

            let rgba = [0, 0xff, 0, (self.display_float[y][x] * 255.0) as u8];
            pxl.copy_from_slice(&rgba);
        }
    }
}

/// Square wave buzzer.
struct Speaker {
    /// Audio output stream (must be kept alive).
    _stream: OutputStream,
    sink: Sink,
}

impl Speaker {
    fn open() -> anyhow::Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .context("Failed to open audio output stream")?;
        stream.log_on_drop(false);

        let sink = Sink::connect_new(stream.mixer());
        sink.pause();
        sink.append(SquareWave::new(TONE_HZ).amplify(0.5));

        Ok(Self {
            _stream: stream,
            sink,
        })
    }
}

impl AudioSink for Speaker {
    fn set_tone(&mut self, on: bool) {
        if on {
            self.sink.play();
        } else {
            self.sink.pause();
        }
    }
}

struct App {
    window: Option<Arc<Window>>,
    screen: Screen,
    speaker: Speaker,
    keys: [bool; 16],

    runner: Chip8Runner,
    /// Used for delta time calculation.
    last_frame_instant: Instant,

    /// Stores the result of the application to be returned from main.
    exit_result: anyhow::Result<()>,
}

impl App {
    fn new(chip8: Chip8, config: RunnerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            window: None,
            screen: Screen {
                pixels: None,
                display_float: [[0.0; DISPLAY_X]; DISPLAY_Y],
                dt: 0.0,
            },
            speaker: Speaker::open()?,
            keys: [false; 16],

            runner: Chip8Runner::with_config(chip8, config)?,
            last_frame_instant: Instant::now(),
            exit_result: Ok(()),
        })
    }

    fn try_resumed(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = {
            let size = LogicalSize::new(DISPLAY_X as u32 * 10, DISPLAY_Y as u32 * 10);
            let min_size = LogicalSize::new(DISPLAY_X as u32, DISPLAY_Y as u32);

            Arc::new(
                event_loop
                    .create_window(
                        Window::default_attributes()
                            .with_title("chip8-vm")
                            .with_inner_size(size)
                            .with_min_inner_size(min_size),
                    )
                    .context("Failed to create window")?,
            )
        };

        let window_size = window.inner_size();
        let surface_texture =
            SurfaceTexture::new(window_size.width, window_size.height, window.clone());
        let pixels = Pixels::new(DISPLAY_X as u32, DISPLAY_Y as u32, surface_texture)
            .context("Failed to create pixels surface")?;

        self.screen.pixels = Some(pixels);
        window.request_redraw();
        self.window = Some(window);

        // Avoid large dt on first frame
        self.last_frame_instant = Instant::now();
        Ok(())
    }

    fn redraw(&mut self) -> anyhow::Result<()> {
        let now = Instant::now();
        let dt = (now - self.last_frame_instant).as_secs_f32();
        self.last_frame_instant = now;

        self.screen.dt = dt;
        self.runner
            .run_frame(dt, &self.keys, &mut self.screen, &mut self.speaker)
            .context("Chip8 Execution error")?;

        if let Some(pixels) = self.screen.pixels.as_ref() {
            pixels.render().context("Pixels render error")?;
        }
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
        Ok(())
    }

    fn try_window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        event: WindowEvent,
    ) -> anyhow::Result<()> {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(pixels) = self.screen.pixels.as_mut() {
                    pixels
                        .resize_surface(size.width, size.height)
                        .context("Failed to resize pixels surface")?;
                }
            }

            WindowEvent::RedrawRequested => self.redraw()?,

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(key) = KEY_MAP.iter().position(|&k| k == event.physical_key) {
                    self.keys[key] = event.state == ElementState::Pressed;
                }
            }

            _ => (),
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.try_resumed(event_loop) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Err(e) = self.try_window_event(event_loop, event) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }
}

/// CHIP-8 interpreter.
///
/// Keys 1-4, Q-R, A-F, Z-V map to CHIP-8 keys.
/// Escape is used to exit the emulator.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Path to the CHIP-8 ROM file
    rom_path: PathBuf,

    /// Flag and shift semantics to emulate
    #[arg(long, value_enum, default_value_t = Mode::Cosmac)]
    mode: Mode,

    /// Instructions executed per second
    #[arg(long, default_value_t = 700.0, value_parser = parse_rate)]
    cpu_hz: f32,

    /// Seed for the random number generator, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Keep executing after a draw instead of waiting for the next frame
    #[arg(long)]
    no_display_wait: bool,
}

fn parse_rate(s: &str) -> Result<f32, String> {
    let rate: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("rate must be a finite number above zero, got {s}"))
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut chip8 = match args.seed {
        Some(seed) => Chip8::with_seed(args.mode.into(), seed),
        None => Chip8::new(args.mode.into()),
    };
    chip8
        .load_file(&args.rom_path)
        .context("Failed to load ROM into CHIP-8 memory")?;

    let config = RunnerConfig {
        cpu_hz: args.cpu_hz,
        display_wait: !args.no_display_wait,
        ..RunnerConfig::default()
    };

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(chip8, config).context("Failed to initialize application")?;
    event_loop
        .run_app(&mut app)
        .context("Error occurred during event loop execution")?;

    // Return the result captured during the event loop
    app.exit_result
}
