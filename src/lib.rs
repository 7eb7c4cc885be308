//! Export in-memory image stacks to chunked, compressed 5D zarr arrays.
//!
//! Arrays use the ilastik axis order `(t, x, y, z, c)`: frame, column, row,
//! depth level and channel. Pixel planes arrive row-major from the image
//! source and are transposed so that rows vary fastest within a plane.
pub mod dataset;
pub mod dims;
mod error;
pub mod export;
pub mod hyperslab;
pub mod metadata;
pub mod options;
pub mod pixel;
pub mod rgb;
pub mod source;
pub mod storage;

pub use zarrs;

pub use dims::ImageDims;
pub use error::{Error, Result};
pub use export::{ExportSummary, Exporter};
pub use options::ExportOptions;
pub use pixel::{PixelBuffer, PixelKind};
pub use source::{ColorMode, ImageSource, ImageStack, Slice};
