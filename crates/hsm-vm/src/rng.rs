//! Per-instance xorshift32 generator.
//!
//! The generator owns no state of its own: it reads and advances the 4-byte
//! seed stored in the instance header, so randomness is deterministic and
//! travels with the instance bytes.

use hsm_bytecode::InstanceView;

/// Substituted for a zero seed, which xorshift would never leave.
pub const ZERO_SEED_REPLACEMENT: u32 = 0x9E37_79B9;

pub struct HsmRng<'s> {
    seed: &'s mut [u8; 4],
}

impl<'s> HsmRng<'s> {
    pub fn new(seed: &'s mut [u8; 4]) -> Self {
        Self { seed }
    }

    pub fn from_view(view: &'s mut InstanceView<'_>) -> Self {
        Self::new(view.seed_mut())
    }

    pub fn state(&self) -> u32 {
        u32::from_le_bytes(*self.seed)
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state();
        if x == 0 {
            x = ZERO_SEED_REPLACEMENT;
        }
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        *self.seed = x.to_le_bytes();
        x
    }

    /// Uniform in `0..bound`. Zero bound yields zero.
    pub fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * bound as u64) >> 32) as u32
    }

    /// Uniform in `min..=max`.
    pub fn range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max as i64 - min as i64 + 1) as u64;
        let offset = (self.next_u32() as u64 * span) >> 32;
        (min as i64 + offset as i64) as i32
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    pub fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }
}
