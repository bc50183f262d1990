use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;

pub mod framebuffer;
pub mod keypad;

#[cfg(feature = "sdl")]
pub mod display;
#[cfg(feature = "sdl")]
pub mod input;

/// Pixel surface the cpu draws on.
pub trait Display {
    fn clear(&mut self);

    /// Flip the pixel at `(x, y)`. Returns true when the flip turned a lit
    /// pixel off.
    fn toggle_pixel(&mut self, x: usize, y: usize) -> bool;

    /// Push the current pixels to whatever is showing them. Called once per
    /// driver frame.
    fn present(&mut self) -> Result<()>;
}

/// The 16-key hex keypad.
pub trait Input {
    fn is_pressed(&self, key: u8) -> bool;

    /// Most recently pressed key since the previous call, if any.
    fn take_pressed(&mut self) -> Option<u8>;
}

/// Window/session lifecycle as seen by the driver loop.
pub trait Host {
    fn is_closed(&self) -> bool;

    fn pump_events_and_swap(&mut self) -> Result<()>;
}

impl<T: Input> Input for Rc<RefCell<T>> {
    fn is_pressed(&self, key: u8) -> bool {
        self.borrow().is_pressed(key)
    }

    fn take_pressed(&mut self) -> Option<u8> {
        self.borrow_mut().take_pressed()
    }
}
