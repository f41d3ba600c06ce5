//! Three-dimensional lifting wavelet and its coefficient codec.
//!
//! - `buffer`: one component's coefficients over a group of frames, with the resolution pyramid.
//! - `lifting`: 1D predict/update filters with 1, 2 or 4 vanishing moments.
//! - `transform`: separable forward and inverse transform over all levels.
//! - `coeff`: bit-plane packing of a whole buffer into a length-bounded packet.

pub mod buffer;
pub mod coeff;
pub mod lifting;
pub mod transform;

pub use buffer::{Level, Subband, WaveletBuffer};
pub use coeff::{Recoding, decode_coeff, decode_coeff_with, encode_coeff, encode_coeff_with};
pub use lifting::{FilterMoments, Moments};
