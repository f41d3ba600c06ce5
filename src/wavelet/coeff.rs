//! Bit-plane coefficient codec.
//!
//! Every coefficient is first recoded into a 15-bit significance value and a
//! sign. Its bits are then spread over run-length coded planes:
//!
//! - significand plane `i` receives bit `i` of the value, from bit 15 down,
//!   until the first set bit (or bit 0) is reached; the sign goes to that same
//!   plane.
//! - insignificand plane `j` receives bit `j` of every bit below the first set
//!   bit.
//!
//! Packet layout: a table of 31 little-endian `u32` byte counts (significand
//! planes 15..0, then insignificand planes 14..0), followed by the plane
//! payloads in the same order.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::constants::{
    BUDGET_DENOMINATOR, INSIGNIFICAND_PLANES, LENGTH_ENTRY_SIZE, LENGTH_TABLE_SIZE,
    SIGNIFICAND_BUDGET_NUMERATOR, SIGNIFICAND_PLANES,
};
use crate::entropy::rle::{RleDecoder, RleEncoder};
use crate::error::WaveletError;
use crate::observer::{CodecObserver, NoopObserver, PlaneClass};
use crate::wavelet::buffer::{Subband, WaveletBuffer};

const SIGN_BIT: u16 = 1 << 15;
const MAGNITUDE_MASK: u16 = SIGN_BIT - 1;

// Zero runs this short are cheaper to decode than to skip.
const MIN_SKIP: usize = 3;

/// How a signed coefficient is folded into a sign and a significance value.
///
/// Both are bijections on `i16`; encoder and decoder must use the same one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Recoding {
    /// Gray code of the two's complement bits. Small values of either sign
    /// have few significant bits.
    Gray = 0,
    /// One's complement of negative values.
    SignMask = 1,
}

impl Default for Recoding {
    fn default() -> Self {
        Recoding::Gray
    }
}

impl Recoding {
    pub fn from_id(id: u8) -> Result<Self, WaveletError> {
        Self::try_from_primitive(id).map_err(|_| WaveletError::InvalidRecoding)
    }

    /// Splits `value` into `(significance, sign)`; `significance < 0x8000`.
    pub fn encode_value(self, value: i16) -> (u16, u8) {
        let bits = value as u16;
        let sign = (bits >> 15) as u8;
        let significance = match self {
            Recoding::Gray => binary_to_gray(bits) & MAGNITUDE_MASK,
            Recoding::SignMask if sign == 0 => bits,
            Recoding::SignMask => !bits & MAGNITUDE_MASK,
        };
        (significance, sign)
    }

    pub fn decode_value(self, significance: u16, sign: u8) -> i16 {
        let significance = significance & MAGNITUDE_MASK;
        let bits = match self {
            Recoding::Gray => gray_to_binary(significance | ((sign as u16 & 1) << 15)),
            Recoding::SignMask if sign & 1 == 0 => significance,
            Recoding::SignMask => !significance,
        };
        bits as i16
    }
}

fn binary_to_gray(bits: u16) -> u16 {
    bits ^ (bits >> 1)
}

fn gray_to_binary(mut bits: u16) -> u16 {
    bits ^= bits >> 1;
    bits ^= bits >> 2;
    bits ^= bits >> 4;
    bits ^= bits >> 8;
    bits
}

/// Flat indices of a buffer in coding order: the 1x1x1 level, then the high
/// subbands of each level from coarsest to finest, subband 1 through 7, each
/// in x, y, t order.
struct Traversal {
    subbands: Vec<Subband>,
    row: usize,
    plane: usize,
    current: usize,
    pos: usize,
    started: bool,
}

impl Traversal {
    fn new(buf: &WaveletBuffer) -> Self {
        let subbands = (0..buf.scales().saturating_sub(1))
            .flat_map(|level| (1..8).filter_map(move |q| buf.subband(level, q)))
            .collect();
        Self {
            subbands,
            row: buf.width(),
            plane: buf.width() * buf.height(),
            current: 0,
            pos: 0,
            started: false,
        }
    }
}

impl Iterator for Traversal {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if !self.started {
            self.started = true;
            return Some(0);
        }
        let sb = *self.subbands.get(self.current)?;
        let x = self.pos % sb.width;
        let y = (self.pos / sb.width) % sb.height;
        let t = self.pos / (sb.width * sb.height);
        self.pos += 1;
        if self.pos == sb.len() {
            self.current += 1;
            self.pos = 0;
        }
        Some(sb.offset + t * self.plane + y * self.row + x)
    }
}

fn encode_value(
    significance: u16,
    sign: u8,
    significand: &mut [RleEncoder],
    insignificand: &mut [RleEncoder],
) {
    let mut i = SIGNIFICAND_PLANES - 1;
    loop {
        let bit = ((significance >> i) & 1) as u8;
        significand[i].write_bit(bit);
        if bit == 1 || i == 0 {
            break;
        }
        i -= 1;
    }
    significand[i].write_bit(sign);
    for j in (0..i).rev() {
        insignificand[j].write_bit(((significance >> j) & 1) as u8);
    }
}

fn decode_value(significand: &mut [RleDecoder<'_>], insignificand: &mut [RleDecoder<'_>]) -> (u16, u8) {
    let mut significance = 0u16;
    let mut i = SIGNIFICAND_PLANES - 1;
    loop {
        let bit = significand[i].read_bit();
        significance |= (bit as u16) << i;
        if bit == 1 || i == 0 {
            break;
        }
        i -= 1;
    }
    let sign = significand[i].read_bit();
    for j in (0..i).rev() {
        significance |= (insignificand[j].read_bit() as u16) << j;
    }
    (significance, sign)
}

/// Number of coefficients, at most `remaining`, that every significand plane
/// agrees are zero. Plane 0 holds the bit and the sign of each such
/// coefficient, so it must cover twice as many symbols.
fn zero_run(significand: &[RleDecoder<'_>], remaining: usize) -> usize {
    let mut run = remaining;
    for (i, plane) in significand.iter().enumerate() {
        if plane.symbol() != 0 {
            return 0;
        }
        let symbols = plane.run_length() as usize;
        run = run.min(if i == 0 { symbols / 2 } else { symbols });
    }
    run
}

/// Splits `budget` over planes ordered most significant first. Each plane may
/// take half of what is left (rounded up), the last one all of it; unused
/// bytes move on to the next plane.
fn allocate(flushed: &[usize], budget: usize) -> Vec<usize> {
    let mut remaining = budget;
    let last = flushed.len().saturating_sub(1);
    flushed
        .iter()
        .enumerate()
        .map(|(k, &size)| {
            let cap = if k == last { remaining } else { remaining.div_ceil(2) };
            let take = size.min(cap);
            remaining -= take;
            take
        })
        .collect()
}

/// Encodes the coefficients of `buf` into `dest` and returns the bytes used.
///
/// Planes that do not fit their share of `dest` are cut short; the decoder
/// reads the missing tail as zeros. Fails only when `dest` cannot hold the
/// length table.
pub fn encode_coeff(buf: &WaveletBuffer, dest: &mut [u8]) -> Result<usize, WaveletError> {
    encode_coeff_with(buf, dest, Recoding::default(), &mut NoopObserver)
}

pub fn encode_coeff_with(
    buf: &WaveletBuffer,
    dest: &mut [u8],
    recoding: Recoding,
    observer: &mut dyn CodecObserver,
) -> Result<usize, WaveletError> {
    if dest.len() < LENGTH_TABLE_SIZE {
        return Err(WaveletError::DestinationTooSmall);
    }
    let payload_budget = dest.len() - LENGTH_TABLE_SIZE;

    let mut significand: Vec<RleEncoder> = (0..SIGNIFICAND_PLANES)
        .map(|_| RleEncoder::new(payload_budget))
        .collect();
    let mut insignificand: Vec<RleEncoder> = (0..INSIGNIFICAND_PLANES)
        .map(|_| RleEncoder::new(payload_budget))
        .collect();

    for index in Traversal::new(buf) {
        let (significance, sign) = recoding.encode_value(buf.data[index]);
        encode_value(significance, sign, &mut significand, &mut insignificand);
    }

    // Payload order: most significant plane first within each class.
    let sig_flushed: Vec<usize> = significand.iter_mut().rev().map(|p| p.flush()).collect();
    let ins_flushed: Vec<usize> = insignificand.iter_mut().rev().map(|p| p.flush()).collect();

    let sig_budget = payload_budget * SIGNIFICAND_BUDGET_NUMERATOR / BUDGET_DENOMINATOR;
    let ins_budget = payload_budget - sig_budget;
    let sig_sizes = allocate(&sig_flushed, sig_budget);
    let ins_sizes = allocate(&ins_flushed, ins_budget);

    let planes = significand
        .iter()
        .rev()
        .zip(sig_flushed.iter().zip(&sig_sizes))
        .enumerate()
        .map(|(k, (plane, sizes))| (PlaneClass::Significand, SIGNIFICAND_PLANES - 1 - k, plane, sizes))
        .chain(
            insignificand
                .iter()
                .rev()
                .zip(ins_flushed.iter().zip(&ins_sizes))
                .enumerate()
                .map(|(k, (plane, sizes))| {
                    (PlaneClass::Insignificand, INSIGNIFICAND_PLANES - 1 - k, plane, sizes)
                }),
        );

    let mut offset = LENGTH_TABLE_SIZE;
    for (entry, (class, bit, plane, (&flushed, &written))) in planes.enumerate() {
        let at = entry * LENGTH_ENTRY_SIZE;
        dest[at..at + LENGTH_ENTRY_SIZE].copy_from_slice(&(written as u32).to_le_bytes());
        dest[offset..offset + written].copy_from_slice(&plane.get_output()[..written]);
        offset += written;

        if written < flushed {
            tracing::debug!(?class, bit, flushed, written, "plane truncated");
        }
        observer.plane_packed(class, bit, flushed, written);
    }

    tracing::debug!(
        coefficients = buf.data.len(),
        bytes = offset,
        limit = dest.len(),
        "coefficients encoded"
    );
    Ok(offset)
}

/// Rebuilds the coefficients of `buf` from a packet made by [`encode_coeff`].
///
/// Short or truncated input is not an error: missing table entries count as
/// empty planes and every plane reads as zeros past its end.
pub fn decode_coeff(buf: &mut WaveletBuffer, src: &[u8]) {
    decode_coeff_with(buf, src, Recoding::default(), &mut NoopObserver);
}

pub fn decode_coeff_with(
    buf: &mut WaveletBuffer,
    src: &[u8],
    recoding: Recoding,
    observer: &mut dyn CodecObserver,
) {
    let entry = |k: usize| -> usize {
        let at = k * LENGTH_ENTRY_SIZE;
        src.get(at..at + LENGTH_ENTRY_SIZE)
            .and_then(|b| <[u8; 4]>::try_from(b).ok())
            .map_or(0, |b| u32::from_le_bytes(b) as usize)
    };

    let mut offset = LENGTH_TABLE_SIZE.min(src.len());
    let mut slices = (0..SIGNIFICAND_PLANES + INSIGNIFICAND_PLANES).map(|k| {
        let start = offset;
        let end = offset.saturating_add(entry(k)).min(src.len());
        offset = end;
        &src[start..end]
    });

    // Table order is most significant first; index planes by bit position.
    let mut significand: Vec<RleDecoder<'_>> = slices
        .by_ref()
        .take(SIGNIFICAND_PLANES)
        .map(RleDecoder::new)
        .collect();
    significand.reverse();
    let mut insignificand: Vec<RleDecoder<'_>> = slices.map(RleDecoder::new).collect();
    insignificand.reverse();

    buf.clear();
    let mut order = Traversal::new(buf);
    let mut remaining = buf.data.len();
    let mut skipped = 0usize;
    while remaining > 0 {
        let run = zero_run(&significand, remaining);
        if run >= MIN_SKIP {
            for (i, plane) in significand.iter_mut().enumerate() {
                let symbols = if i == 0 { 2 * run } else { run };
                plane.skip(symbols as u32);
            }
            // Skipped positions stay zero from the clear above.
            order.nth(run - 1);
            remaining -= run;
            skipped += run;
            observer.zero_run_skipped(run);
            continue;
        }

        let Some(index) = order.next() else { break };
        let (significance, sign) = decode_value(&mut significand, &mut insignificand);
        buf.data[index] = recoding.decode_value(significance, sign);
        remaining -= 1;
    }

    tracing::debug!(
        coefficients = buf.data.len(),
        bytes = src.len(),
        skipped,
        "coefficients decoded"
    );
}
