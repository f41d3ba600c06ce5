//! Buffer-level entry points: transform plus coefficient coding in one call.

use crate::error::WaveletError;
use crate::observer::{CodecObserver, NoopObserver};
use crate::wavelet::buffer::WaveletBuffer;
use crate::wavelet::coeff::{self, Recoding};
use crate::wavelet::lifting::Moments;

/// Transforms `buf` in place and packs its coefficients into `dest`.
///
/// Returns the number of bytes written, never more than `dest.len()`. After
/// the call `buf` holds wavelet coefficients, not samples.
pub fn encode(buf: &mut WaveletBuffer, moments: Moments, dest: &mut [u8]) -> Result<usize, WaveletError> {
    encode_with(buf, moments, Recoding::default(), dest, &mut NoopObserver)
}

pub fn encode_with(
    buf: &mut WaveletBuffer,
    moments: Moments,
    recoding: Recoding,
    dest: &mut [u8],
    observer: &mut dyn CodecObserver,
) -> Result<usize, WaveletError> {
    buf.forward_transform_with(moments, observer);
    coeff::encode_coeff_with(buf, dest, recoding, observer)
}

/// Unpacks `payload` into `buf` and transforms it back to samples.
///
/// `moments` must match the ones used to encode. Truncated payloads decode
/// to an approximation; they are never rejected.
pub fn decode(buf: &mut WaveletBuffer, moments: Moments, payload: &[u8]) {
    decode_with(buf, moments, Recoding::default(), payload, &mut NoopObserver);
}

pub fn decode_with(
    buf: &mut WaveletBuffer,
    moments: Moments,
    recoding: Recoding,
    payload: &[u8],
    observer: &mut dyn CodecObserver,
) {
    coeff::decode_coeff_with(buf, payload, recoding, observer);
    buf.inverse_transform_with(moments, observer);
}
