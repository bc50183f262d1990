use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::CpuConfig;
use crate::constants::hardware::{
    ENTRY_POINT, FLAG_REGISTER, FONT, FONT_ENTRY_POINT, FONT_SPRITE_SIZE, MAX_PROGRAM_SIZE,
    MEMORY_SIZE, REGISTER_COUNT, SCREEN_HEIGHT, SCREEN_WIDTH, STACK_SIZE,
};
use crate::drivers::{Display, Input};
use crate::error::{Chip8Error, Result};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Opcode(pub u16);

impl Opcode {
    fn nibbles(self) -> (u8, u8, u8, u8) {
        (
            ((self.0 & 0xF000) >> 12) as u8,
            ((self.0 & 0x0F00) >> 8) as u8,
            ((self.0 & 0x00F0) >> 4) as u8,
            (self.0 & 0x000F) as u8,
        )
    }

    fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }

    fn nn(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operand {
    None,
    X(usize),
    XY(usize, usize),
    XNN(usize, u8),
    NNN(u16),
    XYN(usize, usize, usize),
}

type Handler<D, I> = fn(&mut Cpu<D, I>, Operand) -> Result<()>;

struct Instruction<D, I> {
    function: Handler<D, I>,
    operand: Operand,
}

impl<D, I> Instruction<D, I> {
    fn new(function: Handler<D, I>, operand: Operand) -> Instruction<D, I> {
        Instruction { function, operand }
    }
}

/// The CHIP-8 machine: memory, registers, stack and timers, plus the display
/// and keypad it talks to.
///
/// One call to [`Cpu::cycle`] is one virtual tick: at most one instruction
/// runs and both timers count down once.
pub struct Cpu<D, I> {
    memory: [u8; MEMORY_SIZE],
    registers: [u8; REGISTER_COUNT],
    pc: u16,
    idx: u16,
    stack: Vec<u16>,
    delay_timer: u8,
    sound_timer: u8,
    // Register waiting for a key press (Fx0A); execution is halted while set.
    waiting_for_key: Option<usize>,
    current: u16,
    display: D,
    input: I,
    rng: StdRng,
    config: CpuConfig,
}

impl<D: Display, I: Input> Cpu<D, I> {
    pub fn new(display: D, input: I, config: CpuConfig) -> Cpu<D, I> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut memory = [0; MEMORY_SIZE];
        memory[FONT_ENTRY_POINT..FONT_ENTRY_POINT + FONT.len()].copy_from_slice(&FONT);

        Cpu {
            memory,
            registers: [0; REGISTER_COUNT],
            pc: ENTRY_POINT as u16,
            idx: 0,
            stack: Vec::with_capacity(STACK_SIZE),
            delay_timer: 0,
            sound_timer: 0,
            waiting_for_key: None,
            current: ENTRY_POINT as u16,
            display,
            input,
            rng,
            config,
        }
    }

    /// Copy a program into memory at the entry point. Nothing is written when
    /// the program does not fit.
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        self.memory[ENTRY_POINT..ENTRY_POINT + program.len()].copy_from_slice(program);
        info!("loaded {} byte program at {:#05X}", program.len(), ENTRY_POINT);
        Ok(())
    }

    pub fn cycle(&mut self) -> Result<()> {
        match self.waiting_for_key {
            Some(x) => {
                if let Some(key) = self.input.take_pressed() {
                    debug!("key {:X} pressed, resuming with V{:X}", key, x);
                    self.registers[x] = key;
                    self.waiting_for_key = None;
                }
            }
            None => {
                let opcode = self.fetch()?;
                let instruction = self.decode(opcode)?;
                self.execute(instruction)?;
            }
        }

        self.tick_timers();
        Ok(())
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.idx
    }

    pub fn register(&self, x: usize) -> u8 {
        self.registers[x]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn is_paused(&self) -> bool {
        self.waiting_for_key.is_some()
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
        &self.memory
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    fn fetch(&mut self) -> Result<Opcode> {
        let pc = self.pc as usize;
        if pc + 1 >= MEMORY_SIZE {
            return Err(Chip8Error::MemoryOutOfBounds { address: pc + 1 });
        }

        let byte1 = self.memory[pc] as u16;
        let byte2 = self.memory[pc + 1] as u16;

        self.current = self.pc;
        self.pc = self.pc.wrapping_add(2);
        Ok(Opcode(byte1 << 8 | byte2))
    }

    fn decode(&self, opcode: Opcode) -> Result<Instruction<D, I>> {
        let (a, b, c, d) = opcode.nibbles();
        let x = b as usize;
        let y = c as usize;

        let instruction = match (a, b, c, d) {
            (0, 0, 0xE, 0) => Instruction::new(Self::clear, Operand::None),
            (0, 0, 0xE, 0xE) => Instruction::new(Self::ret, Operand::None),
            (1, _, _, _) => Instruction::new(Self::jmp, Operand::NNN(opcode.nnn())),
            (2, _, _, _) => Instruction::new(Self::call, Operand::NNN(opcode.nnn())),
            (3, _, _, _) => Instruction::new(Self::skipx_eq, Operand::XNN(x, opcode.nn())),
            (4, _, _, _) => Instruction::new(Self::skipx_neq, Operand::XNN(x, opcode.nn())),
            (5, _, _, 0) => Instruction::new(Self::skipxy_eq, Operand::XY(x, y)),
            (6, _, _, _) => Instruction::new(Self::setr, Operand::XNN(x, opcode.nn())),
            (7, _, _, _) => Instruction::new(Self::add, Operand::XNN(x, opcode.nn())),
            (8, _, _, 0) => Instruction::new(Self::setxy, Operand::XY(x, y)),
            (8, _, _, 1) => Instruction::new(Self::or, Operand::XY(x, y)),
            (8, _, _, 2) => Instruction::new(Self::and, Operand::XY(x, y)),
            (8, _, _, 3) => Instruction::new(Self::xor, Operand::XY(x, y)),
            (8, _, _, 4) => Instruction::new(Self::add_xy, Operand::XY(x, y)),
            (8, _, _, 5) => Instruction::new(Self::sub_xy, Operand::XY(x, y)),
            (8, _, _, 6) => Instruction::new(Self::shr, Operand::XY(x, y)),
            (8, _, _, 7) => Instruction::new(Self::subn_xy, Operand::XY(x, y)),
            (8, _, _, 0xE) => Instruction::new(Self::shl, Operand::XY(x, y)),
            (9, _, _, 0) => Instruction::new(Self::skipxy_neq, Operand::XY(x, y)),
            (0xA, _, _, _) => Instruction::new(Self::seti, Operand::NNN(opcode.nnn())),
            (0xB, _, _, _) => Instruction::new(Self::jmp_v0, Operand::NNN(opcode.nnn())),
            (0xC, _, _, _) => Instruction::new(Self::rand, Operand::XNN(x, opcode.nn())),
            (0xD, _, _, n) => Instruction::new(Self::draw, Operand::XYN(x, y, n as usize)),
            (0xE, _, 9, 0xE) => Instruction::new(Self::skip_key, Operand::X(x)),
            (0xE, _, 0xA, 1) => Instruction::new(Self::skip_not_key, Operand::X(x)),
            (0xF, _, 0, 7) => Instruction::new(Self::get_delay, Operand::X(x)),
            (0xF, _, 0, 0xA) => Instruction::new(Self::wait_key, Operand::X(x)),
            (0xF, _, 1, 5) => Instruction::new(Self::set_delay, Operand::X(x)),
            (0xF, _, 1, 8) => Instruction::new(Self::set_sound, Operand::X(x)),
            (0xF, _, 1, 0xE) => Instruction::new(Self::add_i, Operand::X(x)),
            (0xF, _, 2, 9) => Instruction::new(Self::font, Operand::X(x)),
            (0xF, _, 3, 3) => Instruction::new(Self::bcd, Operand::X(x)),
            (0xF, _, 5, 5) => Instruction::new(Self::dump, Operand::X(x)),
            (0xF, _, 6, 5) => Instruction::new(Self::fill, Operand::X(x)),
            _ => {
                return Err(Chip8Error::UnknownOpcode {
                    opcode: opcode.0,
                    address: self.current,
                })
            }
        };

        trace!("{:#05X}: {:04X} {:?}", self.current, opcode.0, instruction.operand);
        Ok(instruction)
    }

    fn execute(&mut self, inst: Instruction<D, I>) -> Result<()> {
        (inst.function)(self, inst.operand)
    }

    fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    /// Bounds-check `len` bytes starting at `start`.
    fn check_range(&self, start: usize, len: usize) -> Result<()> {
        if start + len > MEMORY_SIZE {
            return Err(Chip8Error::MemoryOutOfBounds {
                address: start + len - 1,
            });
        }
        Ok(())
    }

    fn clear(&mut self, _: Operand) -> Result<()> {
        self.display.clear();
        Ok(())
    }

    fn ret(&mut self, _: Operand) -> Result<()> {
        match self.stack.pop() {
            Some(ret_addr) => {
                self.pc = ret_addr;
                Ok(())
            }
            None => Err(Chip8Error::StackUnderflow {
                address: self.current,
            }),
        }
    }

    fn jmp(&mut self, op: Operand) -> Result<()> {
        if let Operand::NNN(nnn) = op {
            self.pc = nnn;
        }
        Ok(())
    }

    fn call(&mut self, op: Operand) -> Result<()> {
        if let Operand::NNN(nnn) = op {
            if let Some(limit) = self.config.stack_limit {
                if self.stack.len() >= limit {
                    return Err(Chip8Error::StackOverflow {
                        address: self.current,
                        limit,
                    });
                }
            }
            self.stack.push(self.pc);
            self.pc = nnn;
        }
        Ok(())
    }

    fn skipx_eq(&mut self, op: Operand) -> Result<()> {
        if let Operand::XNN(x, nn) = op {
            if self.registers[x] == nn {
                self.skip();
            }
        }
        Ok(())
    }

    fn skipx_neq(&mut self, op: Operand) -> Result<()> {
        if let Operand::XNN(x, nn) = op {
            if self.registers[x] != nn {
                self.skip();
            }
        }
        Ok(())
    }

    fn skipxy_eq(&mut self, op: Operand) -> Result<()> {
        if let Operand::XY(x, y) = op {
            if self.registers[x] == self.registers[y] {
                self.skip();
            }
        }
        Ok(())
    }

    fn skipxy_neq(&mut self, op: Operand) -> Result<()> {
        if let Operand::XY(x, y) = op {
            if self.registers[x] != self.registers[y] {
                self.skip();
            }
        }
        Ok(())
    }

    fn setr(&mut self, op: Operand) -> Result<()> {
        if let Operand::XNN(x, nn) = op {
            self.registers[x] = nn;
        }
        Ok(())
    }

    fn add(&mut self, op: Operand) -> Result<()> {
        if let Operand::XNN(x, nn) = op {
            self.registers[x] = self.registers[x].wrapping_add(nn);
        }
        Ok(())
    }

    fn setxy(&mut self, op: Operand) -> Result<()> {
        if let Operand::XY(x, y) = op {
            self.registers[x] = self.registers[y];
        }
        Ok(())
    }

    fn or(&mut self, op: Operand) -> Result<()> {
        if let Operand::XY(x, y) = op {
            self.registers[x] |= self.registers[y];
        }
        Ok(())
    }

    fn and(&mut self, op: Operand) -> Result<()> {
        if let Operand::XY(x, y) = op {
            self.registers[x] &= self.registers[y];
        }
        Ok(())
    }

    fn xor(&mut self, op: Operand) -> Result<()> {
        if let Operand::XY(x, y) = op {
            self.registers[x] ^= self.registers[y];
        }
        Ok(())
    }

    // VF is written before Vx in the arithmetic group, so Vx wins when x is F.

    fn add_xy(&mut self, op: Operand) -> Result<()> {
        if let Operand::XY(x, y) = op {
            let (sum, carry) = self.registers[x].overflowing_add(self.registers[y]);
            self.registers[FLAG_REGISTER] = carry as u8;
            self.registers[x] = sum;
        }
        Ok(())
    }

    fn sub_xy(&mut self, op: Operand) -> Result<()> {
        if let Operand::XY(x, y) = op {
            let (vx, vy) = (self.registers[x], self.registers[y]);
            self.registers[FLAG_REGISTER] = (vy > vx) as u8;
            self.registers[x] = vx.wrapping_sub(vy);
        }
        Ok(())
    }

    fn shr(&mut self, op: Operand) -> Result<()> {
        if let Operand::XY(x, _) = op {
            let vx = self.registers[x];
            self.registers[FLAG_REGISTER] = vx & 0x1;
            self.registers[x] = vx >> 1;
        }
        Ok(())
    }

    fn subn_xy(&mut self, op: Operand) -> Result<()> {
        if let Operand::XY(x, y) = op {
            let (vx, vy) = (self.registers[x], self.registers[y]);
            self.registers[FLAG_REGISTER] = (vy > vx) as u8;
            self.registers[x] = vy.wrapping_sub(vx);
        }
        Ok(())
    }

    fn shl(&mut self, op: Operand) -> Result<()> {
        if let Operand::XY(x, _) = op {
            let vx = self.registers[x];
            let high_bit = vx & 0x80;
            self.registers[FLAG_REGISTER] = if self.config.normalize_shift_flag {
                high_bit >> 7
            } else {
                high_bit
            };
            self.registers[x] = vx << 1;
        }
        Ok(())
    }

    fn seti(&mut self, op: Operand) -> Result<()> {
        if let Operand::NNN(nnn) = op {
            self.idx = nnn;
        }
        Ok(())
    }

    fn jmp_v0(&mut self, op: Operand) -> Result<()> {
        if let Operand::NNN(nnn) = op {
            self.pc = nnn + self.registers[0] as u16;
        }
        Ok(())
    }

    fn rand(&mut self, op: Operand) -> Result<()> {
        if let Operand::XNN(x, nn) = op {
            let byte: u8 = self.rng.gen();
            self.registers[x] = byte & nn;
        }
        Ok(())
    }

    fn draw(&mut self, op: Operand) -> Result<()> {
        if let Operand::XYN(x, y, n) = op {
            let start = self.idx as usize;
            self.check_range(start, n)?;

            let origin_x = self.registers[x] as usize;
            let origin_y = self.registers[y] as usize;
            let mut collision = false;

            for (row, &sprite) in self.memory[start..start + n].iter().enumerate() {
                for column in 0..8 {
                    if sprite & (0x80 >> column) == 0 {
                        continue;
                    }
                    let px = (origin_x + column) % SCREEN_WIDTH;
                    let py = (origin_y + row) % SCREEN_HEIGHT;
                    if self.display.toggle_pixel(px, py) {
                        collision = true;
                    }
                }
            }

            self.registers[FLAG_REGISTER] = collision as u8;
        }
        Ok(())
    }

    fn skip_key(&mut self, op: Operand) -> Result<()> {
        if let Operand::X(x) = op {
            if self.input.is_pressed(self.registers[x]) {
                self.skip();
            }
        }
        Ok(())
    }

    fn skip_not_key(&mut self, op: Operand) -> Result<()> {
        if let Operand::X(x) = op {
            if !self.input.is_pressed(self.registers[x]) {
                self.skip();
            }
        }
        Ok(())
    }

    fn get_delay(&mut self, op: Operand) -> Result<()> {
        if let Operand::X(x) = op {
            self.registers[x] = self.delay_timer;
        }
        Ok(())
    }

    fn wait_key(&mut self, op: Operand) -> Result<()> {
        if let Operand::X(x) = op {
            // A press from before the wait started does not count.
            self.input.take_pressed();
            self.waiting_for_key = Some(x);
            debug!("waiting for key into V{:X}", x);
        }
        Ok(())
    }

    fn set_delay(&mut self, op: Operand) -> Result<()> {
        if let Operand::X(x) = op {
            self.delay_timer = self.registers[x];
        }
        Ok(())
    }

    fn set_sound(&mut self, op: Operand) -> Result<()> {
        if let Operand::X(x) = op {
            self.sound_timer = self.registers[x];
        }
        Ok(())
    }

    fn add_i(&mut self, op: Operand) -> Result<()> {
        if let Operand::X(x) = op {
            self.idx = self.idx.wrapping_add(self.registers[x] as u16);
        }
        Ok(())
    }

    fn font(&mut self, op: Operand) -> Result<()> {
        if let Operand::X(x) = op {
            self.idx = (FONT_ENTRY_POINT + self.registers[x] as usize * FONT_SPRITE_SIZE) as u16;
        }
        Ok(())
    }

    fn bcd(&mut self, op: Operand) -> Result<()> {
        if let Operand::X(x) = op {
            let i = self.idx as usize;
            self.check_range(i, 3)?;

            let value = self.registers[x];
            self.memory[i] = value / 100;
            self.memory[i + 1] = (value % 100) / 10;
            self.memory[i + 2] = value % 10;
        }
        Ok(())
    }

    fn dump(&mut self, op: Operand) -> Result<()> {
        if let Operand::X(x) = op {
            let i = self.idx as usize;
            self.check_range(i, x + 1)?;
            self.memory[i..=i + x].copy_from_slice(&self.registers[..=x]);
        }
        Ok(())
    }

    fn fill(&mut self, op: Operand) -> Result<()> {
        if let Operand::X(x) = op {
            let i = self.idx as usize;
            self.check_range(i, x + 1)?;
            self.registers[..=x].copy_from_slice(&self.memory[i..=i + x]);
        }
        Ok(())
    }
}
