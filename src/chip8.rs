use std::time::{Duration, Instant};

use log::{error, info};

use crate::config::DriverConfig;
use crate::constants::hardware::MAX_CLOCK_RATE;
use crate::cpu::Cpu;
use crate::drivers::{Display, Host, Input};
use crate::error::{Chip8Error, Result};

/// Turns wall-clock time into a whole number of virtual ticks, carrying the
/// remainder into the next frame.
#[derive(Clone, Debug)]
pub struct FixedTimestep {
    tick: Duration,
    accumulator: Duration,
}

impl FixedTimestep {
    pub fn new(rate: u32) -> Result<FixedTimestep> {
        // Faster than 1 GHz the tick rounds down to zero nanoseconds.
        if rate == 0 || rate > MAX_CLOCK_RATE {
            return Err(Chip8Error::InvalidConfig(format!(
                "clock rate must be between 1 and {} Hz, got {}",
                MAX_CLOCK_RATE, rate
            )));
        }
        Ok(FixedTimestep {
            tick: Duration::from_secs(1) / rate,
            accumulator: Duration::ZERO,
        })
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Add `elapsed` and drain as many full ticks as it covers.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed;

        let mut ticks = 0;
        while self.accumulator > self.tick {
            self.accumulator -= self.tick;
            ticks += 1;
        }
        ticks
    }
}

/// Simulation driver: steps the cpu at a fixed virtual clock and presents
/// one frame per loop iteration.
pub struct Chip8<D, I, H> {
    cpu: Cpu<D, I>,
    host: H,
    timestep: FixedTimestep,
}

impl<D: Display, I: Input, H: Host> Chip8<D, I, H> {
    pub fn new(cpu: Cpu<D, I>, host: H, config: DriverConfig) -> Result<Chip8<D, I, H>> {
        Ok(Chip8 {
            cpu,
            host,
            timestep: FixedTimestep::new(config.rate)?,
        })
    }

    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        self.cpu.load(program)
    }

    pub fn cpu(&self) -> &Cpu<D, I> {
        &self.cpu
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Run until the host closes. The first fatal error ends the session and
    /// is handed back to the caller.
    pub fn run(&mut self) -> Result<()> {
        info!("session started, tick {:?}", self.timestep.tick());

        let mut last = Instant::now();
        while !self.host.is_closed() {
            let now = Instant::now();
            let elapsed = now - last;
            last = now;

            if let Err(e) = self.frame(elapsed) {
                error!("session aborted: {}", e);
                return Err(e);
            }
        }

        info!("session closed");
        Ok(())
    }

    /// One loop iteration: catch the cpu up on `elapsed`, then render and
    /// hand control back to the host. Returns the number of cycles run.
    pub fn frame(&mut self, elapsed: Duration) -> Result<u32> {
        let ticks = self.timestep.advance(elapsed);
        for _ in 0..ticks {
            self.cpu.cycle()?;
        }

        self.cpu.display_mut().present()?;
        self.host.pump_events_and_swap()?;
        Ok(ticks)
    }
}
