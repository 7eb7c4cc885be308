use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use zarrs::{
    array::{Array, ArrayMetadata, ArrayMetadataV3, ArraySubset},
    filesystem::FilesystemStore,
    group::{Group, GroupBuilder},
};

use super::{Container, Dataset, check_kind, element_count};
use crate::{
    dims::Shape,
    hyperslab::Hyperslab,
    metadata::DatasetLayout,
    pixel::{PixelBuffer, PixelKind},
};

/// A zarr v3 hierarchy on the local filesystem.
pub struct ZarrContainer {
    root: PathBuf,
    store: Arc<FilesystemStore>,
}

impl std::fmt::Debug for ZarrContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZarrContainer")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl ZarrContainer {
    /// Open an existing hierarchy for writing.
    ///
    /// Fails if `path` does not hold a zarr group.
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let root = container_root(path.as_ref())?;
        if !is_hierarchy(&root) {
            return Err(crate::Error::general(format!(
                "no zarr hierarchy at {}",
                root.display()
            )));
        }
        let store = Arc::new(FilesystemStore::new(&root).map_err(crate::Error::wrap)?);
        Group::open(store.clone(), "/").map_err(crate::Error::wrap)?;
        log::info!("opened zarr container {}", root.display());
        Ok(Self { root, store })
    }

    /// Create a new hierarchy, discarding any hierarchy already at `path`.
    ///
    /// Refuses to touch a file or a non-empty directory that is not a zarr
    /// hierarchy.
    pub fn create(path: impl AsRef<Path>) -> crate::Result<Self> {
        let root = container_root(path.as_ref())?;
        if is_hierarchy(&root) {
            log::debug!("truncating zarr container {}", root.display());
            std::fs::remove_dir_all(&root)?;
        } else {
            let occupied = if root.is_dir() {
                std::fs::read_dir(&root)?.next().is_some()
            } else {
                root.exists()
            };
            if occupied {
                return Err(crate::Error::NotAContainer(root));
            }
        }
        std::fs::create_dir_all(&root)?;
        let store = Arc::new(FilesystemStore::new(&root).map_err(crate::Error::wrap)?);
        GroupBuilder::new()
            .build(store.clone(), "/")
            .map_err(crate::Error::wrap)?
            .store_metadata()
            .map_err(crate::Error::wrap)?;
        log::info!("created zarr container {}", root.display());
        Ok(Self { root, store })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn node_dir(&self, layout: &DatasetLayout) -> PathBuf {
        self.root.join(layout.node_path().trim_start_matches('/'))
    }

    fn node_exists(&self, layout: &DatasetLayout) -> bool {
        self.node_dir(layout).join("zarr.json").exists()
    }
}

fn container_root(path: &Path) -> crate::Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(crate::Error::EmptyPath);
    }
    Ok(path.to_path_buf())
}

fn is_hierarchy(root: &Path) -> bool {
    root.join("zarr.json").is_file()
}

impl Container for ZarrContainer {
    type Dataset = ZarrDataset;

    fn create_dataset(&mut self, layout: &DatasetLayout) -> crate::Result<Self::Dataset> {
        if self.node_exists(layout) {
            return Err(crate::Error::DatasetExists(layout.name.clone()));
        }
        let array = build_array(&self.store, layout)?;
        Ok(ZarrDataset {
            layout: layout.clone(),
            array,
        })
    }

    fn remove_dataset(&mut self, layout: &DatasetLayout) -> crate::Result<()> {
        let dir = self.node_dir(layout);
        if dir.is_dir() {
            std::fs::remove_dir_all(&dir)?;
            log::debug!("removed {}", layout.node_path());
        }
        Ok(())
    }
}

/// Write metadata for `layout` and return a handle to the array.
fn build_array(
    store: &Arc<FilesystemStore>,
    layout: &DatasetLayout,
) -> crate::Result<Array<FilesystemStore>> {
    let metadata = ArrayMetadataV3::try_from(layout)?;
    let array = Array::new_with_metadata(
        store.clone(),
        &layout.node_path(),
        ArrayMetadata::V3(metadata),
    )
    .map_err(crate::Error::wrap)?;
    array.store_metadata().map_err(crate::Error::wrap)?;
    Ok(array)
}

/// Issue a write typed after the buffer's element kind.
fn store_typed(
    array: &Array<FilesystemStore>,
    subset: &ArraySubset,
    buffer: &PixelBuffer,
) -> crate::Result<()> {
    match buffer {
        PixelBuffer::U8(v) => array.store_array_subset(subset, v.as_slice()),
        PixelBuffer::U16(v) => array.store_array_subset(subset, v.as_slice()),
        PixelBuffer::U32(v) => array.store_array_subset(subset, v.as_slice()),
        PixelBuffer::F32(v) => array.store_array_subset(subset, v.as_slice()),
    }
    .map_err(crate::Error::wrap)
}

/// An array inside a [ZarrContainer].
pub struct ZarrDataset {
    layout: DatasetLayout,
    array: Array<FilesystemStore>,
}

impl std::fmt::Debug for ZarrDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZarrDataset")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl Dataset for ZarrDataset {
    fn kind(&self) -> PixelKind {
        self.layout.kind
    }

    fn shape(&self) -> Shape {
        self.layout.shape
    }

    fn write_all(&mut self, buffer: &PixelBuffer) -> crate::Result<()> {
        check_kind(self.layout.kind, buffer)?;
        let expected = element_count(&self.layout.shape);
        if buffer.len() != expected {
            return Err(crate::Error::SliceLength {
                expected,
                actual: buffer.len(),
            });
        }
        store_typed(&self.array, &self.array.subset_all(), buffer)
    }

    fn write_slab(&mut self, slab: &Hyperslab, buffer: &PixelBuffer) -> crate::Result<()> {
        check_kind(self.layout.kind, buffer)?;
        slab.check_within(&self.layout.shape)?;
        let subset = ArraySubset::new_with_ranges(&slab.ranges());
        store_typed(&self.array, &subset, buffer)
    }

    /// Stored chunks keep their keys; only the shape in `zarr.json` changes.
    fn set_extent(&mut self, shape: Shape) -> crate::Result<()> {
        let layout = self.layout.with_shape(shape);
        self.array
            .set_shape(shape.to_vec())
            .map_err(crate::Error::wrap)?;
        self.array.store_metadata().map_err(crate::Error::wrap)?;
        log::debug!(
            "extended {} from {:?} to {:?}",
            layout.node_path(),
            self.layout.shape,
            shape
        );
        self.layout = layout;
        Ok(())
    }
}
