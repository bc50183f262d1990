//! CHIP-8 virtual machine.
//!
//! [`cpu::Cpu`] owns all machine state and runs one instruction per tick.
//! [`chip8::Chip8`] drives it at a fixed virtual clock and talks to the host
//! through the capability traits in [`drivers`].

pub mod chip8;
pub mod config;
pub mod constants;
pub mod cpu;
pub mod drivers;
pub mod error;

pub use chip8::{Chip8, FixedTimestep};
pub use config::{CpuConfig, DriverConfig};
pub use cpu::Cpu;
pub use error::{Chip8Error, Result};
