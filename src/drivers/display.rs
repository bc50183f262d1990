use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::Window;
use sdl2::Sdl;

use crate::constants::hardware::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::drivers::framebuffer::{FrameBuffer, Pixel};
use crate::drivers::Display;
use crate::error::{Chip8Error, Result};

/// SDL2 window backed by a `FrameBuffer`. Pixel toggles only touch the
/// buffer; the canvas is redrawn on `present`.
pub struct DisplayDriver {
    canvas: Canvas<Window>,
    buffer: FrameBuffer,
    scale: u32,
}

impl DisplayDriver {
    pub fn new(sdl_context: &Sdl, title: &str, scale: u32) -> Result<DisplayDriver> {
        let video_subsystem = sdl_context.video().map_err(Chip8Error::Platform)?;

        let window = video_subsystem
            .window(
                title,
                SCREEN_WIDTH as u32 * scale,
                SCREEN_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()
            .map_err(|e| Chip8Error::Platform(e.to_string()))?;

        let mut canvas = window
            .into_canvas()
            .present_vsync()
            .build()
            .map_err(|e| Chip8Error::Platform(e.to_string()))?;

        canvas.set_draw_color(Color::RGB(0, 0, 0));
        canvas.clear();
        canvas.present();

        Ok(DisplayDriver {
            canvas,
            buffer: FrameBuffer::new(),
            scale,
        })
    }

    fn get_color(&self, x: usize, y: usize) -> Color {
        match self.buffer.get_pixel(x, y) {
            Pixel::On => Color::RGB(250, 250, 250),
            Pixel::Off => Color::RGB(0, 0, 0),
        }
    }
}

impl Display for DisplayDriver {
    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn toggle_pixel(&mut self, x: usize, y: usize) -> bool {
        self.buffer.toggle_pixel(x, y)
    }

    fn present(&mut self) -> Result<()> {
        let scale = self.scale;
        for y in 0..SCREEN_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                let color = self.get_color(x, y);
                self.canvas.set_draw_color(color);
                let rect = Rect::new(
                    (x as u32 * scale) as i32,
                    (y as u32 * scale) as i32,
                    scale,
                    scale,
                );
                self.canvas.fill_rect(rect).map_err(Chip8Error::Platform)?;
            }
        }
        self.canvas.present();
        Ok(())
    }
}
