use crate::constants::{GOLOMB_ESTIMATE_FRACTION_BITS, MAX_GOLOMB_PARAMETER};
use crate::entropy::bit_io::{BitReader, BitWriter};

/// Adaptive Golomb coder for positive integers.
///
/// The code parameter is not configured but estimated from the values seen so
/// far: `estimate` is a 5.3 fixed-point running average of the bit width of
/// past values. Encoder and decoder apply the same update after every value,
/// so two coders fed the same sequence stay bit-for-bit identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdaptiveGolomb {
    estimate: u8,
    observations: u8,
}

impl AdaptiveGolomb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn estimate(&self) -> u8 {
        self.estimate
    }

    pub fn observations(&self) -> u8 {
        self.observations
    }

    /// Parameter used for the next value.
    pub fn parameter(&self) -> u32 {
        (self.estimate >> GOLOMB_ESTIMATE_FRACTION_BITS) as u32
    }

    /// Encodes `x` (x >= 1).
    ///
    /// `x - 1` is split into a prefix of `0` continuation bits, each consuming
    /// `2^k` and raising `k` by one, a `1` terminator, and a `k`-bit remainder.
    pub fn encode(&mut self, writer: &mut BitWriter, x: u32) {
        debug_assert!(x >= 1);
        let mut k = self.parameter();
        let mut value = (x as u64).saturating_sub(1);

        while value >= (1u64 << k) {
            writer.write_bit(0);
            value -= 1u64 << k;
            k += 1;
        }
        writer.write_bit(1);
        writer.write_bits(value, k);

        self.update(x);
    }

    /// Decodes one value. On a truncated stream the result is meaningless and
    /// the reader's end-of-stream flag is set.
    pub fn decode(&mut self, reader: &mut BitReader<'_>) -> u32 {
        let mut k = self.parameter();
        let mut base = 0u64;

        loop {
            if reader.read_bit() == 1 {
                break;
            }
            if reader.eos() || k >= MAX_GOLOMB_PARAMETER {
                break;
            }
            base += 1u64 << k;
            k += 1;
        }

        let value = base + reader.read_bits(k.min(MAX_GOLOMB_PARAMETER));
        let x = (value + 1).min(u32::MAX as u64) as u32;

        self.update(x);
        x
    }

    // Exponential moving average toward the width of `x`, weighted 1, 1/2, 1/4
    // for the first, second and later observations.
    fn update(&mut self, x: u32) {
        let target = required_bits(x) << GOLOMB_ESTIMATE_FRACTION_BITS;
        let estimate = self.estimate as u32;

        let next = match self.observations {
            0 => target,
            1 => (estimate + target) / 2,
            _ => (3 * estimate + target) / 4,
        };
        self.estimate = next as u8;

        if self.observations < 2 {
            self.observations += 1;
        }
    }
}

/// Position of the highest set bit (0 for 0 and 1).
pub fn required_bits(x: u32) -> u32 {
    if x == 0 { 0 } else { 31 - x.leading_zeros() }
}
