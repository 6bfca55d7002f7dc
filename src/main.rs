//! Game Boy emulator entry point.
//!
//! Loads a cartridge and runs it in a 160×144 window, or under the operator console.
//! Usage: gbm [--scale N] [--console] [--log-level LEVEL] path/to/game.gb

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use gbm::{
    cartridge::cartridge::Cartridge,
    controller::{Key, KeySource, KeyState},
    logger,
    screen::{Frame, SCREEN_HEIGHT, SCREEN_WIDTH, Screen},
    system::GameBoy,
};
use log::{LevelFilter, info, warn};
use minifb::{Scale, Window, WindowOptions};

/// Game Boy (DMG) emulator
#[derive(Parser, Debug)]
#[command(name = "gbm")]
#[command(about = "A cycle-stepped Game Boy emulator", long_about = None)]
struct Args {
    /// Path to the cartridge image
    rom: PathBuf,

    /// Window scale factor (1, 2, 4, 8, 16 or 32)
    #[arg(short, long, default_value = "4")]
    scale: u8,

    /// Drive the emulator from the step/show/run/quit console
    #[arg(short, long)]
    console: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

/// Host window: display sink for the PPU and source of key state.
struct WindowScreen {
    window: Window,
}

impl WindowScreen {
    fn open(scale: Scale) -> Result<Self> {
        let mut window = Window::new(
            "gbm",
            SCREEN_WIDTH,
            SCREEN_HEIGHT,
            WindowOptions {
                scale,
                ..WindowOptions::default()
            },
        )
        .context("failed to create window")?;

        // update_with_buffer blocks to hold this rate, which paces emulation to real time.
        window.set_target_fps(60);
        Ok(Self { window })
    }

    fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(minifb::Key::Escape)
    }

    /// Snapshot the keyboard for the next frame.
    fn keys(&self) -> KeyState {
        KeyState::capture(self)
    }
}

impl Screen for WindowScreen {
    fn present(&mut self, frame: &Frame) {
        if let Err(e) = self
            .window
            .update_with_buffer(frame, SCREEN_WIDTH, SCREEN_HEIGHT)
        {
            warn!("failed to present frame: {}", e);
        }
    }
}

impl KeySource for WindowScreen {
    fn key_pressed(&self, key: Key) -> bool {
        let host = match key {
            Key::Right => minifb::Key::Right,
            Key::Left => minifb::Key::Left,
            Key::Up => minifb::Key::Up,
            Key::Down => minifb::Key::Down,
            Key::A => minifb::Key::Z,
            Key::B => minifb::Key::X,
            Key::Select => minifb::Key::Enter,
            Key::Start => minifb::Key::Space,
        };
        self.window.is_key_down(host)
    }
}

fn window_scale(factor: u8) -> Result<Scale> {
    Ok(match factor {
        1 => Scale::X1,
        2 => Scale::X2,
        4 => Scale::X4,
        8 => Scale::X8,
        16 => Scale::X16,
        32 => Scale::X32,
        _ => bail!("unsupported scale {factor}; use 1, 2, 4, 8, 16 or 32"),
    })
}

/// Free-run one frame at a time until the window closes or execution stops.
fn run(gb: &mut GameBoy, screen: &mut WindowScreen) {
    while screen.is_open() {
        let keys = screen.keys();
        if !gb.run_frame(&keys, screen) {
            warn!("execution stopped at ${:04X}", gb.cpu.regs.pc.wrapping_sub(1));
            return;
        }
    }
}

fn console(gb: &mut GameBoy, screen: &mut WindowScreen) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            return Ok(());
        };
        match line?.trim() {
            "step" => {
                let keys = screen.keys();
                let cycles = gb.step(&keys, screen);
                println!("{} ({} cycles)", gb.cpu.regs, cycles);
            }
            "show" => println!("{}", gb.cpu.regs),
            "run" => run(gb, screen),
            "quit" => return Ok(()),
            "" => {}
            other => println!("unknown command '{}': step, show, run, quit", other),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.log_level).context("failed to install logger")?;

    let cart = Cartridge::open(&args.rom)
        .with_context(|| format!("failed to load {}", args.rom.display()))?;
    let mut gb = GameBoy::new(cart);
    let mut screen = WindowScreen::open(window_scale(args.scale)?)?;

    if args.console {
        console(&mut gb, &mut screen)?;
    } else {
        run(&mut gb, &mut screen);
    }

    info!("{} frames, {} cycles", gb.cpu.bus.ppu.frame_count, gb.cpu.cycles);
    Ok(())
}
