//! Create a dataset, write its first unit, extend it once, then fill it.
use crate::{
    dims::{ImageDims, Shape},
    hyperslab::{self, Hyperslab, Unit},
    metadata::DatasetLayout,
    pixel::PixelBuffer,
    storage::{Container, Dataset},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created with the extent of a single unit; nothing written yet.
    Bounded,
    /// First unit written and extent grown to the final shape.
    Extended,
}

/// One export's hold on its dataset.
///
/// The dataset handle is released when the session is dropped or finished.
#[derive(Debug)]
pub struct DatasetSession<D> {
    dataset: D,
    dims: ImageDims,
    final_shape: Shape,
    state: Lifecycle,
    units_written: usize,
}

impl<D: Dataset> DatasetSession<D> {
    /// Create the dataset with `layout.shape`, which must be one unit.
    ///
    /// `dims` gives the plane size and `final_shape` the extent applied after
    /// the first write.
    pub fn create<C>(
        container: &mut C,
        layout: &DatasetLayout,
        dims: ImageDims,
        final_shape: Shape,
    ) -> crate::Result<Self>
    where
        C: Container<Dataset = D>,
    {
        if layout.shape != dims.unit_shape() {
            return Err(crate::Error::Lifecycle(format!(
                "initial shape {:?} is not a single unit {:?}",
                layout.shape,
                dims.unit_shape()
            )));
        }
        let dataset = container.create_dataset(layout)?;
        log::debug!(
            "created dataset {:?} ({}) shape {:?} chunks {:?} compression {}",
            layout.name,
            layout.kind,
            layout.shape,
            layout.chunk_shape,
            layout.compression.level()
        );
        Ok(Self {
            dataset,
            dims,
            final_shape,
            state: Lifecycle::Bounded,
            units_written: 0,
        })
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn units_written(&self) -> usize {
        self.units_written
    }

    /// Write one unit.
    ///
    /// The first call must target the origin and writes the whole (single
    /// unit) dataset, then grows it to the final shape. Later calls write
    /// hyperslabs.
    pub fn write_unit(&mut self, unit: Unit, buffer: &PixelBuffer) -> crate::Result<()> {
        match self.state {
            Lifecycle::Bounded => {
                if !unit.is_origin() {
                    return Err(crate::Error::Lifecycle(format!(
                        "first write must target the origin, got {unit:?}"
                    )));
                }
                self.dataset.write_all(buffer)?;
                self.dataset.set_extent(self.final_shape)?;
                self.state = Lifecycle::Extended;
            }
            Lifecycle::Extended => {
                let slab = Hyperslab::for_unit(unit, &self.dims);
                hyperslab::write(&mut self.dataset, &slab, buffer)?;
            }
        }
        self.units_written += 1;
        Ok(())
    }

    /// Release the dataset, returning the number of units written.
    pub fn finish(self) -> crate::Result<usize> {
        if self.state == Lifecycle::Bounded {
            return Err(crate::Error::Lifecycle(
                "dataset closed before its first write".into(),
            ));
        }
        Ok(self.units_written)
    }
}
