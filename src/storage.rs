//! Container backends the exporter writes through.
use crate::{
    dims::Shape,
    hyperslab::Hyperslab,
    metadata::DatasetLayout,
    pixel::{PixelBuffer, PixelKind},
};

pub mod memory;
pub mod zarr;

pub use memory::MemoryContainer;
pub use zarr::ZarrContainer;

/// A hierarchy that can hold named datasets.
pub trait Container {
    type Dataset: Dataset;

    /// Create a dataset with `layout.shape` as its current extent.
    ///
    /// Fails with [crate::Error::DatasetExists] if the name is taken.
    fn create_dataset(&mut self, layout: &DatasetLayout) -> crate::Result<Self::Dataset>;

    /// Delete the dataset created for `layout`, if there is one.
    fn remove_dataset(&mut self, layout: &DatasetLayout) -> crate::Result<()>;
}

/// Handle to one open 5D dataset; released on drop.
pub trait Dataset {
    fn kind(&self) -> PixelKind;

    /// Current extent.
    fn shape(&self) -> Shape;

    /// Overwrite the whole current extent with `buffer`.
    fn write_all(&mut self, buffer: &PixelBuffer) -> crate::Result<()>;

    /// Write `buffer` into the selection `slab`.
    fn write_slab(&mut self, slab: &Hyperslab, buffer: &PixelBuffer) -> crate::Result<()>;

    /// Resize the current extent, keeping written data.
    fn set_extent(&mut self, shape: Shape) -> crate::Result<()>;
}

/// Reject buffers whose element kind differs from the dataset's.
pub(crate) fn check_kind(dataset: PixelKind, buffer: &PixelBuffer) -> crate::Result<()> {
    if buffer.kind() != dataset {
        return Err(crate::Error::KindMismatch {
            expected: dataset,
            actual: buffer.kind(),
        });
    }
    Ok(())
}

pub(crate) fn element_count(shape: &Shape) -> usize {
    shape.iter().product::<u64>() as usize
}
