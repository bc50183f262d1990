use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use log::info;

use simul8::constants::hardware::{DEFAULT_CLOCK_RATE, DEFAULT_SCALE_FACTOR, MAX_CLOCK_RATE};
use simul8::drivers::display::DisplayDriver;
use simul8::drivers::input::InputDriver;
use simul8::drivers::keypad::Keypad;
use simul8::{Chip8, Cpu, CpuConfig, DriverConfig};

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 virtual machine", long_about = None)]
struct Args {
    /// Raw CHIP-8 program, loaded verbatim at 0x200
    program: PathBuf,

    /// Virtual ticks (instructions and timer updates) per second
    #[arg(short, long, default_value_t = DEFAULT_CLOCK_RATE, value_parser = clap::value_parser!(u32).range(1..=MAX_CLOCK_RATE as i64))]
    rate: u32,

    /// Window pixels per CHIP-8 pixel
    #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR, value_parser = clap::value_parser!(u32).range(1..))]
    scale: u32,

    /// Seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// Fail when subroutine calls nest deeper than this
    #[arg(long)]
    stack_limit: Option<usize>,

    /// Store 0/1 instead of 0x80 in VF on shift left
    #[arg(long)]
    normalize_shift_flag: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let program = fs::read(&args.program)
        .with_context(|| format!("failed to read program {}", args.program.display()))?;

    let sdl_context = sdl2::init().map_err(anyhow::Error::msg)?;
    let keypad = Rc::new(RefCell::new(Keypad::new()));
    let display = DisplayDriver::new(&sdl_context, "Simul8", args.scale)?;
    let host = InputDriver::new(&sdl_context, Rc::clone(&keypad))?;

    let cpu = Cpu::new(
        display,
        keypad,
        CpuConfig {
            stack_limit: args.stack_limit,
            normalize_shift_flag: args.normalize_shift_flag,
            seed: args.seed,
        },
    );
    let mut chip8 = Chip8::new(cpu, host, DriverConfig { rate: args.rate })?;
    chip8.load(&program)?;

    info!("running {}", args.program.display());
    chip8.run()?;
    Ok(())
}
