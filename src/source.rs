//! Read-only view of the host image stack.
use crate::pixel::{PixelBuffer, PixelKind, transpose};

/// Declared pixel representation of a whole stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Single-channel planes of one numeric kind.
    Grayscale(PixelKind),
    /// Interleaved 8-bit RGB planes.
    Rgb,
}

/// One 2D plane borrowed from the image stack, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slice<'a> {
    U8(&'a [u8]),
    U16(&'a [u16]),
    U32(&'a [u32]),
    F32(&'a [f32]),
    /// `rows * columns` interleaved `[r, g, b]` triples.
    Rgb(&'a [u8]),
}

impl Slice<'_> {
    /// Element kind of a grayscale plane, `None` for colour planes.
    pub fn kind(&self) -> Option<PixelKind> {
        match self {
            Slice::U8(_) => Some(PixelKind::U8),
            Slice::U16(_) => Some(PixelKind::U16),
            Slice::U32(_) => Some(PixelKind::U32),
            Slice::F32(_) => Some(PixelKind::F32),
            Slice::Rgb(_) => None,
        }
    }

    /// Transpose a grayscale plane into a typed buffer.
    ///
    /// Returns `Ok(None)` for colour planes, which go through [crate::rgb::split_rgb].
    pub fn transpose(&self, rows: usize, columns: usize) -> crate::Result<Option<PixelBuffer>> {
        let buffer = match self {
            Slice::U8(p) => PixelBuffer::U8(transpose(p, rows, columns)?),
            Slice::U16(p) => PixelBuffer::U16(transpose(p, rows, columns)?),
            Slice::U32(p) => PixelBuffer::U32(transpose(p, rows, columns)?),
            Slice::F32(p) => PixelBuffer::F32(transpose(p, rows, columns)?),
            Slice::Rgb(_) => return Ok(None),
        };
        Ok(Some(buffer))
    }
}

/// Accessors the exporter needs from a host image.
///
/// Slices are ordered channel fastest, then depth, then frame, and addressed
/// from 1: `index = t * channels * depth + z * channels + c + 1`.
pub trait ImageSource {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn frames(&self) -> usize;
    fn depth(&self) -> usize;
    fn channels(&self) -> usize;
    fn color_mode(&self) -> ColorMode;
    fn slice_count(&self) -> usize;
    /// Slice at a 1-based linear index, `None` if out of range.
    fn slice(&self, index: usize) -> Option<Slice<'_>>;
}

#[derive(Debug, Clone, PartialEq)]
enum Planes {
    U8(Vec<Vec<u8>>),
    U16(Vec<Vec<u16>>),
    U32(Vec<Vec<u32>>),
    F32(Vec<Vec<f32>>),
    Rgb(Vec<Vec<u8>>),
}

impl Planes {
    fn len(&self) -> usize {
        match self {
            Planes::U8(p) | Planes::Rgb(p) => p.len(),
            Planes::U16(p) => p.len(),
            Planes::U32(p) => p.len(),
            Planes::F32(p) => p.len(),
        }
    }
}

/// Owned in-memory image stack.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageStack {
    width: usize,
    height: usize,
    frames: usize,
    depth: usize,
    channels: usize,
    planes: Planes,
}

impl ImageStack {
    fn new(width: usize, height: usize, planes: Planes) -> Self {
        let n = planes.len();
        Self {
            width,
            height,
            frames: n,
            depth: 1,
            channels: 1,
            planes,
        }
    }

    pub fn from_u8(width: usize, height: usize, planes: Vec<Vec<u8>>) -> Self {
        Self::new(width, height, Planes::U8(planes))
    }

    pub fn from_u16(width: usize, height: usize, planes: Vec<Vec<u16>>) -> Self {
        Self::new(width, height, Planes::U16(planes))
    }

    pub fn from_u32(width: usize, height: usize, planes: Vec<Vec<u32>>) -> Self {
        Self::new(width, height, Planes::U32(planes))
    }

    pub fn from_f32(width: usize, height: usize, planes: Vec<Vec<f32>>) -> Self {
        Self::new(width, height, Planes::F32(planes))
    }

    /// Interleaved RGB planes, three bytes per pixel.
    pub fn from_rgb(width: usize, height: usize, planes: Vec<Vec<u8>>) -> Self {
        Self::new(width, height, Planes::Rgb(planes))
    }

    /// Interpret the planes as `frames x depth x channels`, channel fastest.
    ///
    /// By default every plane is a separate frame.
    pub fn with_hyperstack(mut self, frames: usize, depth: usize, channels: usize) -> Self {
        self.frames = frames;
        self.depth = depth;
        self.channels = channels;
        self
    }
}

impl ImageSource for ImageStack {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn frames(&self) -> usize {
        self.frames
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn color_mode(&self) -> ColorMode {
        match self.planes {
            Planes::U8(_) => ColorMode::Grayscale(PixelKind::U8),
            Planes::U16(_) => ColorMode::Grayscale(PixelKind::U16),
            Planes::U32(_) => ColorMode::Grayscale(PixelKind::U32),
            Planes::F32(_) => ColorMode::Grayscale(PixelKind::F32),
            Planes::Rgb(_) => ColorMode::Rgb,
        }
    }

    fn slice_count(&self) -> usize {
        self.planes.len()
    }

    fn slice(&self, index: usize) -> Option<Slice<'_>> {
        let i = index.checked_sub(1)?;
        let slice = match &self.planes {
            Planes::U8(p) => Slice::U8(p.get(i)?),
            Planes::U16(p) => Slice::U16(p.get(i)?),
            Planes::U32(p) => Slice::U32(p.get(i)?),
            Planes::F32(p) => Slice::F32(p.get(i)?),
            Planes::Rgb(p) => Slice::Rgb(p.get(i)?),
        };
        Some(slice)
    }
}
