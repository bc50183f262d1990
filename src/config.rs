use crate::constants::hardware::DEFAULT_CLOCK_RATE;

/// Behavioural switches for the interpreter core.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuConfig {
    /// Maximum call depth. `None` lets the stack grow without bound.
    pub stack_limit: Option<usize>,
    /// Store 0/1 in VF for `8xyE` instead of the raw high bit (0x80).
    pub normalize_shift_flag: bool,
    /// Seed for `Cxnn`. Entropy-seeded when absent.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// Virtual ticks per second of wall-clock time.
    pub rate: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            rate: DEFAULT_CLOCK_RATE,
        }
    }
}
