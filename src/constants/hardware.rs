pub const MEMORY_SIZE: usize = 4096;
pub const ENTRY_POINT: usize = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - ENTRY_POINT;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
pub const SCREEN_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

pub const REGISTER_COUNT: usize = 16;
pub const FLAG_REGISTER: usize = 0xF;
pub const KEY_COUNT: usize = 16;

/// Classic interpreters nest at most this many calls.
pub const STACK_SIZE: usize = 16;

pub const FONT_ENTRY_POINT: usize = 0x000;
pub const FONT_SPRITE_SIZE: usize = 5;

pub const DEFAULT_CLOCK_RATE: u32 = 60;
pub const MAX_CLOCK_RATE: u32 = 1_000_000_000;
pub const DEFAULT_SCALE_FACTOR: u32 = 10;

pub const FONT: [u8; 16 * FONT_SPRITE_SIZE] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
