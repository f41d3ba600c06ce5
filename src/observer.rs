//! Runtime instrumentation hooks for the transform and the coefficient codec.
//!
//! Every hook has an empty default body, so an observer only implements what
//! it cares about. The codec never keeps an observer beyond the call it was
//! passed to.

/// Which of the two bit-plane families a stream belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneClass {
    /// Top set bit of each coefficient plus its sign.
    Significand,
    /// Bits below the top set bit, stored verbatim.
    Insignificand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformDirection {
    Forward,
    Inverse,
}

pub trait CodecObserver {
    /// A plane was packed: `flushed` bytes were produced, `written` made it into the packet.
    fn plane_packed(&mut self, _class: PlaneClass, _plane: usize, _flushed: usize, _written: usize) {}

    /// The decoder jumped over `coefficients` zero coefficients without reading them.
    fn zero_run_skipped(&mut self, _coefficients: usize) {}

    /// All axes of `level` were transformed.
    fn level_transformed(
        &mut self,
        _direction: TransformDirection,
        _level: usize,
        _extents: (usize, usize, usize),
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CodecObserver for NoopObserver {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneRecord {
    pub class: PlaneClass,
    pub plane: usize,
    pub flushed: usize,
    pub written: usize,
}

impl PlaneRecord {
    pub fn truncated(&self) -> bool {
        self.written < self.flushed
    }
}

/// Keeps everything it is told, for tests and the command-line tool.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub planes: Vec<PlaneRecord>,
    pub skipped_coefficients: usize,
    pub skip_events: usize,
    pub levels: Vec<(TransformDirection, usize)>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn truncated_planes(&self) -> impl Iterator<Item = &PlaneRecord> {
        self.planes.iter().filter(|p| p.truncated())
    }

    pub fn flushed_bytes(&self) -> usize {
        self.planes.iter().map(|p| p.flushed).sum()
    }

    pub fn written_bytes(&self) -> usize {
        self.planes.iter().map(|p| p.written).sum()
    }
}

impl CodecObserver for RecordingObserver {
    fn plane_packed(&mut self, class: PlaneClass, plane: usize, flushed: usize, written: usize) {
        self.planes.push(PlaneRecord {
            class,
            plane,
            flushed,
            written,
        });
    }

    fn zero_run_skipped(&mut self, coefficients: usize) {
        self.skipped_coefficients += coefficients;
        self.skip_events += 1;
    }

    fn level_transformed(
        &mut self,
        direction: TransformDirection,
        level: usize,
        _extents: (usize, usize, usize),
    ) {
        self.levels.push((direction, level));
    }
}
