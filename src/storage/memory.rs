use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use super::{Container, Dataset, check_kind, element_count};
use crate::{
    dims::Shape,
    hyperslab::Hyperslab,
    metadata::DatasetLayout,
    pixel::{PixelBuffer, PixelKind},
};

/// One operation applied to an in-memory dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Full write of the extent current at the time.
    WriteAll { shape: Shape, buffer: PixelBuffer },
    WriteSlab { slab: Hyperslab, buffer: PixelBuffer },
    SetExtent { shape: Shape },
}

/// Snapshot of an in-memory dataset and the operations applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    pub layout: DatasetLayout,
    pub shape: Shape,
    pub operations: Vec<Operation>,
}

impl MemoryRecord {
    /// Number of plane writes, full or selective.
    pub fn write_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| !matches!(op, Operation::SetExtent { .. }))
            .count()
    }

    pub fn extension_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, Operation::SetExtent { .. }))
            .count()
    }
}

type Shared = Arc<Mutex<MemoryRecord>>;

fn lock(record: &Shared) -> MutexGuard<'_, MemoryRecord> {
    record.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Container that records operations instead of storing chunks.
///
/// Clones share the same datasets.
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    datasets: Arc<Mutex<BTreeMap<String, Shared>>>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the dataset created under `name`.
    pub fn dataset(&self, name: &str) -> Option<MemoryRecord> {
        let datasets = self.datasets.lock().unwrap_or_else(PoisonError::into_inner);
        datasets.get(name).map(|r| lock(r).clone())
    }

    pub fn dataset_names(&self) -> Vec<String> {
        let datasets = self.datasets.lock().unwrap_or_else(PoisonError::into_inner);
        datasets.keys().cloned().collect()
    }
}

impl Container for MemoryContainer {
    type Dataset = MemoryDataset;

    fn create_dataset(&mut self, layout: &DatasetLayout) -> crate::Result<Self::Dataset> {
        let mut datasets = self.datasets.lock().unwrap_or_else(PoisonError::into_inner);
        if datasets.contains_key(&layout.name) {
            return Err(crate::Error::DatasetExists(layout.name.clone()));
        }
        let record = Arc::new(Mutex::new(MemoryRecord {
            layout: layout.clone(),
            shape: layout.shape,
            operations: Vec::new(),
        }));
        datasets.insert(layout.name.clone(), record.clone());
        Ok(MemoryDataset {
            kind: layout.kind,
            record,
        })
    }

    fn remove_dataset(&mut self, layout: &DatasetLayout) -> crate::Result<()> {
        let mut datasets = self.datasets.lock().unwrap_or_else(PoisonError::into_inner);
        datasets.remove(&layout.name);
        Ok(())
    }
}

#[derive(Debug)]
pub struct MemoryDataset {
    kind: PixelKind,
    record: Shared,
}

impl Dataset for MemoryDataset {
    fn kind(&self) -> PixelKind {
        self.kind
    }

    fn shape(&self) -> Shape {
        lock(&self.record).shape
    }

    fn write_all(&mut self, buffer: &PixelBuffer) -> crate::Result<()> {
        check_kind(self.kind, buffer)?;
        let mut record = lock(&self.record);
        let expected = element_count(&record.shape);
        if buffer.len() != expected {
            return Err(crate::Error::SliceLength {
                expected,
                actual: buffer.len(),
            });
        }
        let shape = record.shape;
        record.operations.push(Operation::WriteAll {
            shape,
            buffer: buffer.clone(),
        });
        Ok(())
    }

    fn write_slab(&mut self, slab: &Hyperslab, buffer: &PixelBuffer) -> crate::Result<()> {
        check_kind(self.kind, buffer)?;
        let mut record = lock(&self.record);
        slab.check_within(&record.shape)?;
        record.operations.push(Operation::WriteSlab {
            slab: *slab,
            buffer: buffer.clone(),
        });
        Ok(())
    }

    fn set_extent(&mut self, shape: Shape) -> crate::Result<()> {
        let mut record = lock(&self.record);
        record.shape = shape;
        record.operations.push(Operation::SetExtent { shape });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Compression;

    fn layout(name: &str) -> DatasetLayout {
        DatasetLayout::new(
            name,
            PixelKind::U8,
            [1, 2, 2, 1, 1],
            [1, 1, 1, 1, 1],
            Compression::NONE,
        )
        .unwrap()
    }

    #[test]
    fn records_operations_in_order() {
        let mut container = MemoryContainer::new();
        let mut ds = container.create_dataset(&layout("a")).unwrap();
        ds.write_all(&PixelBuffer::U8(vec![1, 2, 3, 4])).unwrap();
        ds.set_extent([2, 2, 2, 1, 1]).unwrap();
        let slab = Hyperslab {
            start: [1, 0, 0, 0, 0],
            extent: [1, 2, 2, 1, 1],
        };
        ds.write_slab(&slab, &PixelBuffer::U8(vec![5, 6, 7, 8]))
            .unwrap();

        let record = container.dataset("a").unwrap();
        assert_eq!(record.shape, [2, 2, 2, 1, 1]);
        assert_eq!(record.write_count(), 2);
        assert_eq!(record.extension_count(), 1);
        assert!(matches!(record.operations[1], Operation::SetExtent { .. }));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut container = MemoryContainer::new();
        let _ds = container.create_dataset(&layout("a")).unwrap();
        assert!(matches!(
            container.create_dataset(&layout("a")),
            Err(crate::Error::DatasetExists(_))
        ));
        assert_eq!(container.dataset_names(), ["a"]);
    }

    #[test]
    fn removed_names_can_be_reused() {
        let mut container = MemoryContainer::new();
        let _ds = container.create_dataset(&layout("a")).unwrap();
        container.remove_dataset(&layout("a")).unwrap();
        assert!(container.dataset("a").is_none());
        assert!(container.create_dataset(&layout("a")).is_ok());
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let mut container = MemoryContainer::new();
        let mut ds = container.create_dataset(&layout("a")).unwrap();
        let err = ds.write_all(&PixelBuffer::U16(vec![0; 4])).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::KindMismatch {
                expected: PixelKind::U8,
                actual: PixelKind::U16
            }
        ));
    }
}
