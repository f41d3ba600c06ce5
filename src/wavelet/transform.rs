//! Separable 3D lifting transform over a [`WaveletBuffer`].
//!
//! The forward transform walks from the finest level down. At each level it
//! lifts every line along x, then y, then t, skipping axes whose extent is 1,
//! which leaves the next coarser level in the low corner of the current box
//! and the seven high subbands around it. The inverse walks back up and undoes
//! t, y and x in that order.

use crate::observer::{CodecObserver, NoopObserver, TransformDirection};
use crate::wavelet::buffer::WaveletBuffer;
use crate::wavelet::lifting::{self, Moments};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    T,
}

impl WaveletBuffer {
    pub fn forward_transform(&mut self, moments: Moments) {
        self.forward_transform_with(moments, &mut NoopObserver);
    }

    pub fn inverse_transform(&mut self, moments: Moments) {
        self.inverse_transform_with(moments, &mut NoopObserver);
    }

    pub fn forward_transform_with(&mut self, moments: Moments, observer: &mut dyn CodecObserver) {
        for level in (1..self.scales()).rev() {
            for axis in [Axis::X, Axis::Y, Axis::T] {
                self.lift_axis(level, axis, moments, TransformDirection::Forward);
            }
            self.report(observer, TransformDirection::Forward, level);
        }
    }

    pub fn inverse_transform_with(&mut self, moments: Moments, observer: &mut dyn CodecObserver) {
        for level in 1..self.scales() {
            for axis in [Axis::T, Axis::Y, Axis::X] {
                self.lift_axis(level, axis, moments, TransformDirection::Inverse);
            }
            self.report(observer, TransformDirection::Inverse, level);
        }
    }

    fn report(&self, observer: &mut dyn CodecObserver, direction: TransformDirection, level: usize) {
        let l = self.levels[level];
        tracing::trace!(?direction, level, l.width, l.height, l.frames, "level transformed");
        observer.level_transformed(direction, level, (l.width, l.height, l.frames));
    }

    fn lift_axis(&mut self, level: usize, axis: Axis, moments: Moments, direction: TransformDirection) {
        let l = self.levels[level];
        let row = self.width;
        let plane = self.width * self.height;

        // (line length, stride, outer extents, outer strides)
        let (n, stride, (outer_a, step_a), (outer_b, step_b)) = match axis {
            Axis::X => (l.width, 1, (l.height, row), (l.frames, plane)),
            Axis::Y => (l.height, row, (l.width, 1), (l.frames, plane)),
            Axis::T => (l.frames, plane, (l.width, 1), (l.height, row)),
        };
        if n < 2 {
            return;
        }

        let lift = match direction {
            TransformDirection::Forward => lifting::forward,
            TransformDirection::Inverse => lifting::inverse,
        };
        for b in 0..outer_b {
            for a in 0..outer_a {
                let start = a * step_a + b * step_b;
                lift(&mut self.data, start, stride, n, &mut self.scratch, moments);
            }
        }
    }
}
