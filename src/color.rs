//! Interleaved pixel formats to and from planar 16-bit component planes.
//!
//! RGB variants use the reversible color transform
//!
//! ```text
//! Y = ((R + 2G + B) >> 2) - 128      G = (Y + 128) - ((U + V) >> 2)
//! U = B - G                          R = V + G
//! V = R - G                          B = U + G
//! ```
//!
//! The shifts are floor divisions, and `R + 2G + B = (U + V) + 4G`, so an
//! unmodified plane set converts back exactly. Decoded planes may carry
//! coding error; the inverse clamps each sample to `0..=255`.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::constants::SAMPLE_LEVEL_SHIFT;
use crate::error::WaveletError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum PixelFormat {
    /// One byte per pixel.
    Grayscale = 0,
    /// R, G, B.
    Rgb24 = 1,
    /// R, G, B, padding.
    Rgb32 = 2,
    /// R, G, B, alpha.
    Rgba = 3,
}

impl PixelFormat {
    pub fn from_id(id: u8) -> Result<Self, WaveletError> {
        Self::try_from_primitive(id).map_err(|_| WaveletError::InvalidPixelFormat)
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Grayscale => 1,
            PixelFormat::Rgb24 => 3,
            PixelFormat::Rgb32 | PixelFormat::Rgba => 4,
        }
    }

    /// Number of planar components.
    pub fn component_count(self) -> usize {
        match self {
            PixelFormat::Grayscale => 1,
            PixelFormat::Rgb24 | PixelFormat::Rgb32 => 3,
            PixelFormat::Rgba => 4,
        }
    }

    /// Splits `pixels` into component planes of `pixels.len() / bytes_per_pixel` samples each.
    pub fn to_planes(self, pixels: &[u8], planes: &mut [&mut [i16]]) -> Result<(), WaveletError> {
        let count = self.check_shapes(pixels.len(), planes.iter().map(|p| p.len()))?;
        if count == 0 {
            return Ok(());
        }
        match (self, planes) {
            (PixelFormat::Grayscale, [y]) => grayscale_to_y(pixels, y),
            (PixelFormat::Rgb24, [y, u, v]) => rgb24_to_yuv(pixels, y, u, v),
            (PixelFormat::Rgb32, [y, u, v]) => rgb32_to_yuv(pixels, y, u, v),
            (PixelFormat::Rgba, [y, u, v, a]) => rgba_to_yuva(pixels, y, u, v, a),
            _ => return Err(WaveletError::InvalidPlaneCount),
        }
        Ok(())
    }

    /// Interleaves component planes back into `pixels`.
    pub fn from_planes(self, planes: &[&[i16]], pixels: &mut [u8]) -> Result<(), WaveletError> {
        let count = self.check_shapes(pixels.len(), planes.iter().map(|p| p.len()))?;
        if count == 0 {
            return Ok(());
        }
        match (self, planes) {
            (PixelFormat::Grayscale, [y]) => y_to_grayscale(y, pixels),
            (PixelFormat::Rgb24, [y, u, v]) => yuv_to_rgb24(y, u, v, pixels),
            (PixelFormat::Rgb32, [y, u, v]) => yuv_to_rgb32(y, u, v, pixels),
            (PixelFormat::Rgba, [y, u, v, a]) => yuva_to_rgba(y, u, v, a, pixels),
            _ => return Err(WaveletError::InvalidPlaneCount),
        }
        Ok(())
    }

    fn check_shapes(
        self,
        pixel_bytes: usize,
        plane_lens: impl ExactSizeIterator<Item = usize>,
    ) -> Result<usize, WaveletError> {
        if plane_lens.len() != self.component_count() {
            return Err(WaveletError::InvalidPlaneCount);
        }
        if pixel_bytes % self.bytes_per_pixel() != 0 {
            return Err(WaveletError::InvalidPixelBufferSize);
        }
        let count = pixel_bytes / self.bytes_per_pixel();
        for len in plane_lens {
            if len != count {
                return Err(WaveletError::InvalidPlaneSize);
            }
        }
        Ok(count)
    }
}

fn clamp_sample(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

fn forward_rct(r: u8, g: u8, b: u8) -> (i16, i16, i16) {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let y = ((r + 2 * g + b) >> 2) - SAMPLE_LEVEL_SHIFT;
    (y as i16, (b - g) as i16, (r - g) as i16)
}

fn inverse_rct(y: i16, u: i16, v: i16) -> [u8; 3] {
    let (y, u, v) = (y as i32, u as i32, v as i32);
    let g = y + SAMPLE_LEVEL_SHIFT - ((u + v) >> 2);
    [clamp_sample(v + g), clamp_sample(g), clamp_sample(u + g)]
}

pub fn grayscale_to_y(gray: &[u8], y: &mut [i16]) {
    for (dst, &p) in y.iter_mut().zip(gray) {
        *dst = (p as i32 - SAMPLE_LEVEL_SHIFT) as i16;
    }
}

pub fn y_to_grayscale(y: &[i16], gray: &mut [u8]) {
    for (dst, &s) in gray.iter_mut().zip(y) {
        *dst = clamp_sample(s as i32 + SAMPLE_LEVEL_SHIFT);
    }
}

pub fn rgb24_to_yuv(rgb: &[u8], y: &mut [i16], u: &mut [i16], v: &mut [i16]) {
    for (i, px) in rgb.chunks_exact(3).enumerate() {
        (y[i], u[i], v[i]) = forward_rct(px[0], px[1], px[2]);
    }
}

pub fn yuv_to_rgb24(y: &[i16], u: &[i16], v: &[i16], rgb: &mut [u8]) {
    for (i, px) in rgb.chunks_exact_mut(3).enumerate() {
        px.copy_from_slice(&inverse_rct(y[i], u[i], v[i]));
    }
}

pub fn rgb32_to_yuv(rgb: &[u8], y: &mut [i16], u: &mut [i16], v: &mut [i16]) {
    for (i, px) in rgb.chunks_exact(4).enumerate() {
        (y[i], u[i], v[i]) = forward_rct(px[0], px[1], px[2]);
    }
}

pub fn yuv_to_rgb32(y: &[i16], u: &[i16], v: &[i16], rgb: &mut [u8]) {
    for (i, px) in rgb.chunks_exact_mut(4).enumerate() {
        px[..3].copy_from_slice(&inverse_rct(y[i], u[i], v[i]));
        px[3] = 0;
    }
}

pub fn rgba_to_yuva(rgba: &[u8], y: &mut [i16], u: &mut [i16], v: &mut [i16], a: &mut [i16]) {
    for (i, px) in rgba.chunks_exact(4).enumerate() {
        (y[i], u[i], v[i]) = forward_rct(px[0], px[1], px[2]);
        a[i] = px[3] as i16;
    }
}

pub fn yuva_to_rgba(y: &[i16], u: &[i16], v: &[i16], a: &[i16], rgba: &mut [u8]) {
    for (i, px) in rgba.chunks_exact_mut(4).enumerate() {
        px[..3].copy_from_slice(&inverse_rct(y[i], u[i], v[i]));
        px[3] = clamp_sample(a[i] as i32);
    }
}
