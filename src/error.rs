/// Fatal conditions raised while loading or running a program.
///
/// None of these are retried: they point at a malformed program, a bad
/// argument, or a broken host.
#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    #[error("program is too large ({size} bytes), max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("unknown opcode {opcode:#06X} at {address:#05X}")]
    UnknownOpcode { opcode: u16, address: u16 },

    #[error("return with an empty call stack at {address:#05X}")]
    StackUnderflow { address: u16 },

    #[error("call stack exceeded {limit} levels at {address:#05X}")]
    StackOverflow { address: u16, limit: usize },

    #[error("memory access out of bounds at {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("platform error: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;
