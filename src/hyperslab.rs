//! Write targets and selections within the 5D dataset.
use crate::{
    dims::{ImageDims, Shape},
    pixel::PixelBuffer,
    storage::{Dataset, element_count},
};

/// Frames visited by the colour path beyond `dims.frames`.
///
/// The legacy exporter looped `t <= frames` for colour stacks, reading one
/// frame past the end. This crate visits exactly `frames`.
pub const COLOR_EXTRA_FRAMES: usize = 0;

/// One `(frame, depth, channel)` plane of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Unit {
    pub frame: usize,
    pub depth: usize,
    pub channel: usize,
}

impl Unit {
    pub fn new(frame: usize, depth: usize, channel: usize) -> Self {
        Self {
            frame,
            depth,
            channel,
        }
    }

    pub fn is_origin(&self) -> bool {
        *self == Self::default()
    }

    /// 1-based index of this unit's slice in a stack laid out like `dims`.
    pub fn slice_index(&self, dims: &ImageDims) -> usize {
        self.frame * dims.channels * dims.depth + self.depth * dims.channels + self.channel + 1
    }

    /// Grayscale write order: channel fastest, then depth, then frame.
    pub fn grayscale(dims: ImageDims) -> impl Iterator<Item = Unit> {
        (0..dims.frames).flat_map(move |t| {
            (0..dims.depth).flat_map(move |z| (0..dims.channels).map(move |c| Unit::new(t, z, c)))
        })
    }

    /// Colour visits: one `(t, z)` per source slice, depth within frame.
    ///
    /// Each visit's slice is the `c = 0` slice of the source layout and
    /// expands to three units, one per colour plane.
    pub fn color_visits(dims: ImageDims) -> impl Iterator<Item = Unit> {
        (0..dims.frames + COLOR_EXTRA_FRAMES)
            .flat_map(move |t| (0..dims.depth).map(move |z| Unit::new(t, z, 0)))
    }
}

/// Rectangular selection: `start` and `extent` per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hyperslab {
    pub start: Shape,
    pub extent: Shape,
}

impl Hyperslab {
    /// A single plane at `{t, 0, 0, z, c}`.
    pub fn for_unit(unit: Unit, dims: &ImageDims) -> Self {
        Self {
            start: [
                unit.frame as u64,
                0,
                0,
                unit.depth as u64,
                unit.channel as u64,
            ],
            extent: dims.unit_shape(),
        }
    }

    /// Exclusive end per axis.
    pub fn end(&self) -> Shape {
        std::array::from_fn(|i| self.start[i] + self.extent[i])
    }

    pub fn element_count(&self) -> usize {
        element_count(&self.extent)
    }

    pub fn ranges(&self) -> [std::ops::Range<u64>; 5] {
        let end = self.end();
        std::array::from_fn(|i| self.start[i]..end[i])
    }

    pub fn check_within(&self, shape: &Shape) -> crate::Result<()> {
        if self.end().iter().zip(shape).any(|(e, s)| e > s) {
            return Err(crate::Error::OutOfBounds(format!(
                "{self:?} exceeds dataset extent {shape:?}"
            )));
        }
        Ok(())
    }
}

/// Select `slab` within the dataset and write `buffer` into it.
pub fn write<D: Dataset>(
    dataset: &mut D,
    slab: &Hyperslab,
    buffer: &PixelBuffer,
) -> crate::Result<()> {
    if buffer.len() != slab.element_count() {
        return Err(crate::Error::SliceLength {
            expected: slab.element_count(),
            actual: buffer.len(),
        });
    }
    slab.check_within(&dataset.shape())?;
    log::trace!("writing {:?} at {:?}", buffer.kind(), slab.start);
    dataset.write_slab(slab, buffer)
}
