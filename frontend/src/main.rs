use std::{
    io,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{anyhow, ensure, Context, Result};
use chip8vm_core::{
    disassemble, Chip8, Chip8Builder, Chip8Error, Chip8Mode, Color, KeyEvent, Renderer, StepState,
    DEFAULT_BACKGROUND_COLOR, DEFAULT_FOREGROUND_COLOR, PROGRAM_START,
};
use clap::{Parser, ValueEnum};
use log::{debug, error, info, warn};
use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Keycode,
};

use keymap::keymap;
use render::{SdlRenderer, TextRenderer};

mod keymap;
mod render;

/// CHIP-8 virtual machine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Filepath to Chip-8 ROM file that will be executed
    #[clap(index = 1)]
    rom: PathBuf,

    /// Filepath to font file
    #[clap(long)]
    font: Option<PathBuf>,

    /// Background Color as HEX 0xAABBFF [default: 0x000000]
    #[clap(long)]
    background: Option<Color>,

    /// Foreground Color as HEX 0xAABBFF [default: 0xFFFFFF]
    #[clap(long)]
    foreground: Option<Color>,

    /// Display scaling factor
    #[clap(short, long, default_value_t = 10)]
    scale: u32,

    /// Instructions per second
    #[clap(short, long, default_value_t = 700)]
    ips: u32,

    /// Timer ticks per second
    #[clap(long, default_value_t = 60)]
    timer_hz: u32,

    /// PRNG seed
    #[clap(long)]
    seed: Option<u64>,

    /// Interpreter quirks to emulate
    #[clap(long, value_enum, default_value_t = Mode::CosmacVip)]
    mode: Mode,

    /// Log unknown opcodes and keep running instead of halting
    #[clap(long)]
    permissive: bool,

    /// Run this many cycles without a window, then print the screen
    #[clap(long, value_name = "CYCLES")]
    headless: Option<u64>,

    /// Print the ROM as instructions and exit
    #[clap(long)]
    disassemble: bool,

    /// Log every executed instruction
    #[clap(short, long)]
    debug: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    CosmacVip,
    Chip48,
    SuperChip,
}

impl From<Mode> for Chip8Mode {
    fn from(mode: Mode) -> Chip8Mode {
        match mode {
            Mode::CosmacVip => Chip8Mode::CosmacVip,
            Mode::Chip48 => Chip8Mode::Chip48,
            Mode::SuperChip => Chip8Mode::SuperChip,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.debug {
        logger.filter_level(log::LevelFilter::Trace);
    }
    logger.init();

    ensure!(
        (1..=100).contains(&args.scale),
        "Display scaling factor must be between [1-100]"
    );
    ensure!(
        (1..=1_000_000).contains(&args.ips),
        "Instructions per second must be between [1-1000000]"
    );
    ensure!(
        (1..=1000).contains(&args.timer_hz),
        "Timer frequency must be between [1-1000]"
    );

    let rom = std::fs::read(&args.rom)
        .with_context(|| format!("Failed to read ROM file {}", args.rom.display()))?;

    if args.disassemble {
        print_listing(&rom);
        return Ok(());
    }

    let mut builder = Chip8Builder::new()
        .with_rom(rom)
        .with_mode(args.mode.into());

    if let Some(font) = &args.font {
        let font_data = std::fs::read(font)
            .with_context(|| format!("Failed to read font file {}", font.display()))?;
        builder = builder.with_font(font_data);
    }

    if let Some(seed) = args.seed {
        builder = builder.with_rng_seed(seed);
    }

    let mut chip = builder.build().context("Failed to build machine")?;

    match args.headless {
        Some(cycles) => run_headless(&mut chip, &args, cycles),
        None => run_window(&mut chip, &args),
    }
}

/// One line per instruction word, address first.
fn print_listing(rom: &[u8]) {
    for (i, word) in rom.chunks(2).enumerate() {
        let addr = PROGRAM_START as usize + i * 2;
        match word {
            [hi, lo] => {
                let word = u16::from_be_bytes([*hi, *lo]);
                println!("0x{:03X}: {}", addr, disassemble(word));
            }
            [byte] => println!("0x{:03X}: {:02X}", addr, byte),
            _ => unreachable!(),
        }
    }
}

/// Applies the host fault policy to one step result. Only recoverable faults
/// in permissive mode let the machine carry on.
fn check_step(result: Result<StepState, Chip8Error>, permissive: bool) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if permissive && e.is_recoverable() => {
            warn!("{}, skipping", e);
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}

fn run_headless(chip: &mut Chip8, args: &Args, cycles: u64) -> Result<()> {
    // Timers tick on a fixed share of cycles, keeping runs reproducible
    let cycles_per_tick = (args.ips / args.timer_hz).max(1) as u64;

    for cycle in 0..cycles {
        if cycle > 0 && cycle % cycles_per_tick == 0 {
            chip.tick();
        }

        check_step(chip.step(), args.permissive)?;

        if chip.step_state() == StepState::AwaitingKey {
            info!("Waiting for key input after {} cycles, stopping", cycle + 1);
            break;
        }
    }

    let mut renderer = TextRenderer::new(io::stdout().lock());
    renderer.present(chip.display())?;
    Ok(())
}

fn run_window(chip: &mut Chip8, args: &Args) -> Result<()> {
    let foreground = args.foreground.unwrap_or(DEFAULT_FOREGROUND_COLOR);
    let background = args.background.unwrap_or(DEFAULT_BACKGROUND_COLOR);

    let sdl_context = sdl2::init().map_err(|e| anyhow!("SDL init failed: {}", e))?;
    let video_subsystem = sdl_context
        .video()
        .map_err(|e| anyhow!("SDL video init failed: {}", e))?;

    let window = video_subsystem
        .window("chip8vm", 64 * args.scale, 32 * args.scale)
        .position_centered()
        .build()?;

    let canvas = window.into_canvas().build()?;
    let texture_creator = canvas.texture_creator();
    let mut renderer = SdlRenderer::new(canvas, &texture_creator, foreground, background)?;

    let mut event_pump = sdl_context
        .event_pump()
        .map_err(|e| anyhow!("SDL event pump failed: {}", e))?;

    let delta_update = Duration::from_secs(1) / args.ips;
    let delta_timer = Duration::from_secs(1) / args.timer_hz;
    let mut next_update = Instant::now();
    let mut next_timer = next_update + delta_timer;
    let mut sound = false;

    'running: loop {
        // Wait until next update
        let now = Instant::now();
        if let Some(delay) = next_update.checked_duration_since(now) {
            std::thread::sleep(delay);
        }
        next_update += delta_update;

        // Timers only advance between completed steps
        let now = Instant::now();
        while now >= next_timer {
            chip.tick();
            next_timer += delta_timer;
        }

        if chip.sound_active() != sound {
            sound = chip.sound_active();
            debug!("Sound {}", if sound { "on" } else { "off" });
        }

        // Process events
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => {
                    if let Some(k) = keymap(key) {
                        chip.handle_key(KeyEvent::Down(k))?;
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(k) = keymap(key) {
                        chip.handle_key(KeyEvent::Up(k))?;
                    }
                }
                // Key up events are lost while unfocused
                Event::Window {
                    win_event: WindowEvent::FocusLost,
                    ..
                } => chip.release_keys(),
                _ => {}
            }
        }

        // Execute one CHIP-8 instruction
        check_step(chip.step(), args.permissive)?;

        // If display buffer was changed then draw changes on canvas
        if chip.take_dirty() {
            renderer.present(chip.display())?;
        }
    }

    Ok(())
}
