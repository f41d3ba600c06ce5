//! Entropy coding for wavelet coefficient bit-planes.
//!
//! - `bit_io`: fixed-capacity bit writer and bit reader.
//! - `golomb`: adaptive Golomb coder whose parameter tracks the bit width of past values.
//! - `rle`: run-length layer turning a binary stream into alternating Golomb-coded runs.

pub mod bit_io;
pub mod golomb;
pub mod rle;

pub use bit_io::{BitReader, BitWriter};
pub use golomb::AdaptiveGolomb;
pub use rle::{RleDecoder, RleEncoder};
