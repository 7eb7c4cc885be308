use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric element kind of a grayscale plane or of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelKind {
    U8,
    U16,
    U32,
    F32,
}

impl PixelKind {
    pub fn bits(self) -> u32 {
        match self {
            PixelKind::U8 => 8,
            PixelKind::U16 => 16,
            PixelKind::U32 | PixelKind::F32 => 32,
        }
    }

    /// Name of the matching zarr v3 core data type.
    pub fn zarr_data_type(self) -> &'static str {
        match self {
            PixelKind::U8 => "uint8",
            PixelKind::U16 => "uint16",
            PixelKind::U32 => "uint32",
            PixelKind::F32 => "float32",
        }
    }
}

impl fmt::Display for PixelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.zarr_data_type())
    }
}

/// One transposed plane, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    F32(Vec<f32>),
}

impl PixelBuffer {
    pub fn kind(&self) -> PixelKind {
        match self {
            PixelBuffer::U8(_) => PixelKind::U8,
            PixelBuffer::U16(_) => PixelKind::U16,
            PixelBuffer::U32(_) => PixelKind::U32,
            PixelBuffer::F32(_) => PixelKind::F32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PixelBuffer::U8(v) => v.len(),
            PixelBuffer::U16(v) => v.len(),
            PixelBuffer::U32(v) => v.len(),
            PixelBuffer::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<u8>> for PixelBuffer {
    fn from(value: Vec<u8>) -> Self {
        Self::U8(value)
    }
}

impl From<Vec<u16>> for PixelBuffer {
    fn from(value: Vec<u16>) -> Self {
        Self::U16(value)
    }
}

impl From<Vec<u32>> for PixelBuffer {
    fn from(value: Vec<u32>) -> Self {
        Self::U32(value)
    }
}

impl From<Vec<f32>> for PixelBuffer {
    fn from(value: Vec<f32>) -> Self {
        Self::F32(value)
    }
}

/// Reorder a row-major `rows x columns` plane so that rows vary fastest.
///
/// The element at row `y`, column `x` of `src` lands at `y + x * rows`.
/// Transposing the output again with `rows` and `columns` swapped restores `src`.
pub fn transpose<T: Copy>(src: &[T], rows: usize, columns: usize) -> crate::Result<Vec<T>> {
    let expected = rows * columns;
    if src.len() != expected {
        return Err(crate::Error::SliceLength {
            expected,
            actual: src.len(),
        });
    }
    let mut out = Vec::with_capacity(expected);
    for x in 0..columns {
        out.extend((0..rows).map(|y| src[x + y * columns]));
    }
    Ok(out)
}
