/// Bits in one coefficient.
pub const COEFF_BITS: usize = 16;

/// One run-length stream per bit position; the top significant bit and the sign share a plane.
pub const SIGNIFICAND_PLANES: usize = COEFF_BITS;

/// The recoded magnitude never sets bit 15, so only bits 14..0 can follow the top set bit.
pub const INSIGNIFICAND_PLANES: usize = COEFF_BITS - 1;

/// Size of one length-table entry in bytes (little-endian u32).
pub const LENGTH_ENTRY_SIZE: usize = 4;

/// Size of the per-packet length table in bytes.
pub const LENGTH_TABLE_SIZE: usize = LENGTH_ENTRY_SIZE * (SIGNIFICAND_PLANES + INSIGNIFICAND_PLANES);

// Budget split between the two plane classes, in eighths of the payload budget.
pub const SIGNIFICAND_BUDGET_NUMERATOR: usize = 7;
pub const BUDGET_DENOMINATOR: usize = 8;

/// Lines shorter than this use the two-moment filters.
pub const MEDIUM_LINE_THRESHOLD: usize = 9;

/// Lines shorter than this use the one-moment (Haar) filters.
pub const SHORT_LINE_THRESHOLD: usize = 5;

/// Upper bound for the Golomb parameter; anything larger is a corrupt stream.
pub const MAX_GOLOMB_PARAMETER: u32 = 32;

/// Fractional bits of the Golomb width estimate (5.3 fixed point).
pub const GOLOMB_ESTIMATE_FRACTION_BITS: u32 = 3;

/// Level shift applied to 8-bit luma and grayscale samples.
pub const SAMPLE_LEVEL_SHIFT: i32 = 128;
