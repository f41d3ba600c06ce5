//! One-dimensional integer lifting steps.
//!
//! A line of `n` samples splits into `ns = ceil(n/2)` even samples `e` and
//! `nd = floor(n/2)` odd samples `o`. The forward step predicts each odd sample
//! from its even neighbours and keeps the residual `d`, then updates each even
//! sample with the neighbouring residuals to get `s`. The result is laid out in
//! place as `[s_0 .. s_ns, d_0 .. d_nd]`.
//!
//! Neighbours outside the line are replaced by the nearest sample inside it.
//! Divisions truncate toward zero and results wrap at 16 bits; the inverse
//! recomputes the very same predictions from the very same operands, so the
//! pair reconstructs every input exactly.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::constants::{MEDIUM_LINE_THRESHOLD, SHORT_LINE_THRESHOLD};
use crate::error::WaveletError;

/// Filter order (number of vanishing moments) of a predict or update step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum FilterMoments {
    One = 1,
    Two = 2,
    Four = 4,
}

impl FilterMoments {
    pub fn from_order(order: u8) -> Result<Self, WaveletError> {
        Self::try_from_primitive(order).map_err(|_| WaveletError::InvalidMoments)
    }
}

/// Analysis (predict) and synthesis (update) filter orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moments {
    pub analysis: FilterMoments,
    pub synthesis: FilterMoments,
}

impl Moments {
    pub fn new(analysis: FilterMoments, synthesis: FilterMoments) -> Self {
        Self {
            analysis,
            synthesis,
        }
    }

    pub fn from_orders(analysis: u8, synthesis: u8) -> Result<Self, WaveletError> {
        Ok(Self::new(
            FilterMoments::from_order(analysis)?,
            FilterMoments::from_order(synthesis)?,
        ))
    }

    /// Orders actually used on a line of `n` samples. Long filters would reach
    /// past both ends of short lines, so those fall back to shorter ones.
    pub fn for_line(self, n: usize) -> Self {
        if n < SHORT_LINE_THRESHOLD {
            Self::new(FilterMoments::One, FilterMoments::One)
        } else if n < MEDIUM_LINE_THRESHOLD {
            Self::new(FilterMoments::Two, FilterMoments::Two)
        } else {
            self
        }
    }
}

impl Default for Moments {
    fn default() -> Self {
        Self::new(FilterMoments::Four, FilterMoments::Four)
    }
}

fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// Prediction for odd sample `i` from the even samples.
fn predict(moments: FilterMoments, i: usize, ns: usize, even: impl Fn(usize) -> i32) -> i32 {
    let e = |k: isize| even(clamp_index(k, ns));
    let i = i as isize;
    match moments {
        FilterMoments::One => e(i),
        FilterMoments::Two => (e(i) + e(i + 1)) / 2,
        FilterMoments::Four => (9 * (e(i) + e(i + 1)) - (e(i - 1) + e(i + 2))) / 16,
    }
}

/// Update for even sample `i` from the residuals.
fn update(moments: FilterMoments, i: usize, nd: usize, detail: impl Fn(usize) -> i32) -> i32 {
    let d = |k: isize| detail(clamp_index(k, nd));
    let j = i as isize;
    match moments {
        // An unpaired trailing even sample has no residual of its own.
        FilterMoments::One if i < nd => d(j) / 2,
        FilterMoments::One => 0,
        FilterMoments::Two => (d(j - 1) + d(j)) / 4,
        FilterMoments::Four => (9 * (d(j - 1) + d(j)) - (d(j - 2) + d(j + 1))) / 32,
    }
}

/// Forward lifting of the `n`-sample line starting at `start` with `stride`.
///
/// `scratch` must hold at least `n` samples.
pub fn forward(
    data: &mut [i16],
    start: usize,
    stride: usize,
    n: usize,
    scratch: &mut [i16],
    moments: Moments,
) {
    debug_assert!(n >= 2);
    debug_assert!(scratch.len() >= n);
    let Moments {
        analysis,
        synthesis,
    } = moments.for_line(n);
    let ns = n.div_ceil(2);
    let nd = n / 2;
    let at = move |i: usize| start + i * stride;

    let x = &mut scratch[..n];
    for (i, sample) in x.iter_mut().enumerate() {
        *sample = data[at(i)];
    }

    for i in 0..nd {
        let p = predict(analysis, i, ns, |k| x[2 * k] as i32);
        data[at(ns + i)] = (x[2 * i + 1] as i32 - p) as i16;
    }

    for i in 0..ns {
        let u = update(synthesis, i, nd, |k| data[at(ns + k)] as i32);
        data[at(i)] = (x[2 * i] as i32 + u) as i16;
    }
}

/// Inverse of [`forward`] for the same line geometry and moments.
pub fn inverse(
    data: &mut [i16],
    start: usize,
    stride: usize,
    n: usize,
    scratch: &mut [i16],
    moments: Moments,
) {
    debug_assert!(n >= 2);
    debug_assert!(scratch.len() >= n);
    let Moments {
        analysis,
        synthesis,
    } = moments.for_line(n);
    let ns = n.div_ceil(2);
    let nd = n / 2;
    let at = move |i: usize| start + i * stride;

    let x = &mut scratch[..n];
    for (i, sample) in x.iter_mut().enumerate() {
        *sample = data[at(i)];
    }
    let (low, high) = x.split_at(ns);

    for i in 0..ns {
        let u = update(synthesis, i, nd, |k| high[k] as i32);
        data[at(2 * i)] = (low[i] as i32 - u) as i16;
    }

    for i in 0..nd {
        let p = predict(analysis, i, ns, |k| data[at(2 * k)] as i32);
        data[at(2 * i + 1)] = (high[i] as i32 + p) as i16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_MOMENTS: [FilterMoments; 3] =
        [FilterMoments::One, FilterMoments::Two, FilterMoments::Four];

    fn roundtrip(input: &[i16], moments: Moments) -> Vec<i16> {
        let mut data = input.to_vec();
        let mut scratch = vec![0i16; input.len()];
        forward(&mut data, 0, 1, input.len(), &mut scratch, moments);
        let transformed = data.clone();
        inverse(&mut data, 0, 1, input.len(), &mut scratch, moments);
        assert_eq!(data, input, "moments {:?}", moments);
        transformed
    }

    #[test]
    fn test_haar_pair() {
        let out = roundtrip(&[10, 14], Moments::default());
        // Short line: Haar. d = 14 - 10, s = 10 + d / 2.
        assert_eq!(out, vec![12, 4]);
    }

    #[test]
    fn test_constant_line_has_zero_detail() {
        for &a in &ALL_MOMENTS {
            for &s in &ALL_MOMENTS {
                let out = roundtrip(&[7; 16], Moments::new(a, s));
                assert!(out[8..].iter().all(|&d| d == 0));
                assert!(out[..8].iter().all(|&v| v == 7));
            }
        }
    }

    #[test]
    fn test_linear_ramp_predicted_exactly_by_two_moments() {
        let ramp: Vec<i16> = (0..12).map(|i| i * 3).collect();
        let out = roundtrip(&ramp, Moments::new(FilterMoments::Two, FilterMoments::Two));
        // Every interior residual is zero; only the replicated right edge is not.
        assert!(out[6..11].iter().all(|&d| d == 0));
    }

    #[test]
    fn test_all_lengths_and_moments_roundtrip() {
        for n in 2..40usize {
            let line: Vec<i16> = (0..n)
                .map(|i| ((i * 7919 + 13) % 511) as i16 - 255)
                .collect();
            for &a in &ALL_MOMENTS {
                for &s in &ALL_MOMENTS {
                    roundtrip(&line, Moments::new(a, s));
                }
            }
        }
    }

    #[test]
    fn test_extreme_values_wrap_consistently() {
        let line = [i16::MAX, i16::MIN, i16::MAX, i16::MIN, 0, i16::MIN, i16::MAX, 1, -1, i16::MAX];
        for &a in &ALL_MOMENTS {
            for &s in &ALL_MOMENTS {
                roundtrip(&line, Moments::new(a, s));
            }
        }
    }

    #[test]
    fn test_strided_line_leaves_other_samples_untouched() {
        let mut data: Vec<i16> = (0..20).collect();
        let original = data.clone();
        let mut scratch = vec![0i16; 10];
        forward(&mut data, 1, 2, 10, &mut scratch, Moments::default());
        for i in (0..20).step_by(2) {
            assert_eq!(data[i], original[i]);
        }
        inverse(&mut data, 1, 2, 10, &mut scratch, Moments::default());
        assert_eq!(data, original);
    }

    #[test]
    fn test_short_line_overrides() {
        let m = Moments::new(FilterMoments::One, FilterMoments::Four);
        assert_eq!(m.for_line(4), Moments::new(FilterMoments::One, FilterMoments::One));
        assert_eq!(m.for_line(5), Moments::new(FilterMoments::Two, FilterMoments::Two));
        assert_eq!(m.for_line(8), Moments::new(FilterMoments::Two, FilterMoments::Two));
        assert_eq!(m.for_line(9), m);
    }

    #[test]
    fn test_moments_from_orders() {
        assert_eq!(
            Moments::from_orders(4, 2),
            Ok(Moments::new(FilterMoments::Four, FilterMoments::Two))
        );
        assert_eq!(Moments::from_orders(3, 2), Err(WaveletError::InvalidMoments));
        assert_eq!(u8::from(FilterMoments::Four), 4);
    }
}
