use crate::error::WaveletError;

/// Extents of one resolution level and the offsets of its eight subbands.
///
/// Subband `q` is low or high along x, y and t according to bits 0, 1 and 2
/// of `q`. Subband 0 is the next coarser level; the high subbands hold the
/// residuals produced while transforming this level's parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Level {
    pub width: usize,
    pub height: usize,
    pub frames: usize,
    pub offsets: [usize; 8],
}

/// Geometry of one subband inside the flat coefficient array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subband {
    pub offset: usize,
    pub width: usize,
    pub height: usize,
    pub frames: usize,
}

impl Subband {
    pub fn len(&self) -> usize {
        self.width * self.height * self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Coefficients of one color component over `frames` frames, plus the
/// resolution pyramid describing where every subband lives.
///
/// Samples are stored x fastest, then y, then t. Level `scales - 1` is the
/// full resolution, level 0 is 1x1x1.
pub struct WaveletBuffer {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) frames: usize,
    pub(crate) levels: Vec<Level>,
    pub(crate) data: Vec<i16>,
    pub(crate) scratch: Vec<i16>,
}

impl WaveletBuffer {
    pub fn new(width: usize, height: usize, frames: usize) -> Result<Self, WaveletError> {
        if width == 0 || height == 0 || frames == 0 {
            return Err(WaveletError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(frames))
            .ok_or(WaveletError::DimensionOverflow)?;

        let mut extents = vec![(width, height, frames)];
        let (mut w, mut h, mut f) = (width, height, frames);
        while w > 1 || h > 1 || f > 1 {
            w = w.div_ceil(2);
            h = h.div_ceil(2);
            f = f.div_ceil(2);
            extents.push((w, h, f));
        }
        extents.reverse();

        let levels = extents
            .into_iter()
            .map(|(w, h, f)| {
                let row = w;
                let plane = h * width;
                let volume = f * height * width;
                Level {
                    width: w,
                    height: h,
                    frames: f,
                    offsets: [
                        0,
                        row,
                        plane,
                        plane + row,
                        volume,
                        volume + row,
                        volume + plane,
                        volume + plane + row,
                    ],
                }
            })
            .collect();

        Ok(Self {
            width,
            height,
            frames,
            levels,
            data: vec![0; len],
            scratch: vec![0; width.max(height).max(frames)],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Number of resolution levels, including the 1x1x1 level.
    pub fn scales(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, level: usize) -> &Level {
        &self.levels[level]
    }

    /// Samples in one frame.
    pub fn frame_len(&self) -> usize {
        self.width * self.height
    }

    pub fn data(&self) -> &[i16] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [i16] {
        &mut self.data
    }

    pub fn frame(&self, frame: usize) -> Result<&[i16], WaveletError> {
        if frame >= self.frames {
            return Err(WaveletError::InvalidFrameIndex);
        }
        let len = self.frame_len();
        Ok(&self.data[frame * len..(frame + 1) * len])
    }

    pub fn frame_mut(&mut self, frame: usize) -> Result<&mut [i16], WaveletError> {
        if frame >= self.frames {
            return Err(WaveletError::InvalidFrameIndex);
        }
        let len = self.frame_len();
        Ok(&mut self.data[frame * len..(frame + 1) * len])
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Flat index of sample (x, y, t).
    pub fn index(&self, x: usize, y: usize, t: usize) -> usize {
        debug_assert!(x < self.width && y < self.height && t < self.frames);
        (t * self.height + y) * self.width + x
    }

    /// High subband `quadrant` (1..=7) produced when level `level + 1` is
    /// transformed. `None` when it has no samples, i.e. one of its high axes
    /// did not split at this level.
    pub fn subband(&self, level: usize, quadrant: usize) -> Option<Subband> {
        debug_assert!((1..8).contains(&quadrant));
        let low = self.levels.get(level)?;
        let full = self.levels.get(level + 1)?;

        let extent = |bit: usize, lo: usize, hi: usize| {
            if quadrant & bit != 0 { hi - lo } else { lo }
        };
        let subband = Subband {
            offset: low.offsets[quadrant],
            width: extent(1, low.width, full.width),
            height: extent(2, low.height, full.height),
            frames: extent(4, low.frames, full.frames),
        };
        (!subband.is_empty()).then_some(subband)
    }

    /// Flat index of the `pos`-th sample of `subband` in x, y, t order.
    pub fn subband_index(&self, subband: &Subband, pos: usize) -> usize {
        let x = pos % subband.width;
        let y = (pos / subband.width) % subband.height;
        let t = pos / (subband.width * subband.height);
        subband.offset + (t * self.height + y) * self.width + x
    }
}
