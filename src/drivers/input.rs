use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::Sdl;

use crate::drivers::keypad::Keypad;
use crate::drivers::Host;
use crate::error::{Chip8Error, Result};

/// Owns the SDL event pump. Feeds key transitions into the shared keypad and
/// remembers when the window was asked to close.
pub struct InputDriver {
    event_pump: sdl2::EventPump,
    keypad: Rc<RefCell<Keypad>>,
    closed: bool,
}

impl InputDriver {
    pub fn new(sdl_context: &Sdl, keypad: Rc<RefCell<Keypad>>) -> Result<InputDriver> {
        let event_pump = sdl_context.event_pump().map_err(Chip8Error::Platform)?;
        Ok(InputDriver {
            event_pump,
            keypad,
            closed: false,
        })
    }

    fn get_chip8_key(key: Keycode) -> Option<usize> {
        use sdl2::keyboard::Keycode::*;
        match key {
            Num1 => Some(0x1),
            Num2 => Some(0x2),
            Num3 => Some(0x3),
            Num4 => Some(0xC),
            Q => Some(0x4),
            W => Some(0x5),
            E => Some(0x6),
            R => Some(0xD),
            A => Some(0x7),
            S => Some(0x8),
            D => Some(0x9),
            F => Some(0xE),
            Z => Some(0xA),
            X => Some(0x0),
            C => Some(0xB),
            V => Some(0xF),
            _ => None,
        }
    }
}

impl Host for InputDriver {
    fn is_closed(&self) -> bool {
        self.closed
    }

    fn pump_events_and_swap(&mut self) -> Result<()> {
        let mut keypad = self.keypad.borrow_mut();
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => {
                    debug!("close requested");
                    self.closed = true;
                }
                Event::KeyDown {
                    keycode: Some(keycode),
                    repeat: false,
                    ..
                } => {
                    if let Some(key) = InputDriver::get_chip8_key(keycode) {
                        keypad.key_down(key);
                    }
                }
                Event::KeyUp {
                    keycode: Some(keycode),
                    ..
                } => {
                    if let Some(key) = InputDriver::get_chip8_key(keycode) {
                        keypad.key_up(key);
                    }
                }
                Event::Window {
                    win_event: WindowEvent::FocusLost,
                    ..
                } => keypad.release_all(),
                _ => continue,
            }
        }
        Ok(())
    }
}
