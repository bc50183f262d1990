use crate::constants::hardware::{SCREEN_HEIGHT, SCREEN_SIZE, SCREEN_WIDTH};
use crate::drivers::Display;
use crate::error::Result;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Pixel {
    Off,
    On,
}

fn flip(pixel: &Pixel) -> Pixel {
    match pixel {
        Pixel::On => Pixel::Off,
        Pixel::Off => Pixel::On,
    }
}

/// Monochrome 64x32 pixel store. Doubles as a headless display.
#[derive(Clone)]
pub struct FrameBuffer {
    pixels: [Pixel; SCREEN_SIZE],
    presented: usize,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> FrameBuffer {
        FrameBuffer {
            pixels: [Pixel::Off; SCREEN_SIZE],
            presented: 0,
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Pixel {
        self.pixels[FrameBuffer::index(x, y)]
    }

    pub fn pixels(&self) -> &[Pixel; SCREEN_SIZE] {
        &self.pixels
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p == Pixel::On).count()
    }

    /// How many times `present` has been called.
    pub fn frames_presented(&self) -> usize {
        self.presented
    }

    fn index(x: usize, y: usize) -> usize {
        debug_assert!(x < SCREEN_WIDTH && y < SCREEN_HEIGHT);
        x + y * SCREEN_WIDTH
    }
}

impl Display for FrameBuffer {
    fn clear(&mut self) {
        self.pixels = [Pixel::Off; SCREEN_SIZE];
    }

    fn toggle_pixel(&mut self, x: usize, y: usize) -> bool {
        let pixel = &mut self.pixels[FrameBuffer::index(x, y)];
        let was_on = *pixel == Pixel::On;
        *pixel = flip(pixel);
        was_on
    }

    fn present(&mut self) -> Result<()> {
        self.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_blank() {
        let fb = FrameBuffer::new();
        assert_eq!(fb.lit_count(), 0);
    }

    #[test]
    fn should_report_turning_pixel_off() {
        let mut fb = FrameBuffer::new();

        assert!(!fb.toggle_pixel(3, 4));
        assert_eq!(fb.get_pixel(3, 4), Pixel::On);

        assert!(fb.toggle_pixel(3, 4));
        assert_eq!(fb.get_pixel(3, 4), Pixel::Off);
    }

    #[test]
    fn should_clear_every_pixel() {
        let mut fb = FrameBuffer::new();
        fb.toggle_pixel(0, 0);
        fb.toggle_pixel(SCREEN_WIDTH - 1, SCREEN_HEIGHT - 1);
        fb.clear();

        assert_eq!(fb.pixels(), &[Pixel::Off; SCREEN_SIZE]);
    }

    #[test]
    fn should_not_collide_after_clear() {
        let mut fb = FrameBuffer::new();
        fb.toggle_pixel(10, 10);
        fb.clear();

        assert!(!fb.toggle_pixel(10, 10));
    }
}
