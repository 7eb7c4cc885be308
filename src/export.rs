//! Export orchestration and the container session.
use std::path::Path;

use crate::{
    ColorMode, Error, ExportOptions, ImageDims, ImageSource, PixelBuffer, PixelKind, Slice,
    dataset::DatasetSession,
    dims::Shape,
    hyperslab::Unit,
    metadata::{Compression, DatasetLayout},
    rgb::split_rgb,
    storage::{Container, ZarrContainer, check_kind},
};

/// Outcome of one export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub dataset: String,
    pub kind: PixelKind,
    pub shape: Shape,
    pub chunk_shape: Shape,
    pub units_written: usize,
}

/// Writes image stacks into an open container.
///
/// The exporter is either open (holding a container) or closed. Opening an
/// open exporter or closing a closed one fails without changing anything.
#[derive(Debug)]
pub struct Exporter<C = ZarrContainer> {
    container: Option<C>,
}

impl<C> Default for Exporter<C> {
    fn default() -> Self {
        Self { container: None }
    }
}

impl Exporter<ZarrContainer> {
    /// Open the hierarchy at `path`, creating a new one if that fails.
    ///
    /// An empty path is rejected before either is attempted.
    pub fn new(path: impl AsRef<Path>) -> crate::Result<Self> {
        if path.as_ref().as_os_str().is_empty() {
            return Err(Error::EmptyPath);
        }
        let mut exporter = Self::default();
        if let Err(e) = exporter.open(&path) {
            log::warn!(
                "could not open {}, creating it instead: {e}",
                path.as_ref().display()
            );
            exporter.create(&path)?;
        }
        Ok(exporter)
    }

    /// Open an existing hierarchy for writing.
    pub fn open(&mut self, path: impl AsRef<Path>) -> crate::Result<()> {
        if self.is_open() {
            return Err(Error::AlreadyOpen);
        }
        self.container = Some(ZarrContainer::open(path)?);
        Ok(())
    }

    /// Create a hierarchy at `path`, truncating whatever is there.
    pub fn create(&mut self, path: impl AsRef<Path>) -> crate::Result<()> {
        if self.is_open() {
            return Err(Error::AlreadyOpen);
        }
        self.container = Some(ZarrContainer::create(path)?);
        Ok(())
    }
}

impl<C: Container> Exporter<C> {
    pub fn with_container(container: C) -> Self {
        Self {
            container: Some(container),
        }
    }

    /// Use `container` for later exports.
    pub fn attach(&mut self, container: C) -> crate::Result<()> {
        if self.is_open() {
            return Err(Error::AlreadyOpen);
        }
        self.container = Some(container);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.container.is_some()
    }

    pub fn container(&self) -> Option<&C> {
        self.container.as_ref()
    }

    /// Release the container.
    pub fn close(&mut self) -> crate::Result<()> {
        match self.container.take() {
            Some(_) => Ok(()),
            None => Err(Error::NotOpen),
        }
    }

    /// Export with no compression under the default dataset name.
    pub fn export(&mut self, image: &impl ImageSource) -> crate::Result<ExportSummary> {
        self.export_with(image, &ExportOptions::default())
    }

    pub fn export_with_compression(
        &mut self,
        image: &impl ImageSource,
        compression: u32,
    ) -> crate::Result<ExportSummary> {
        let options = ExportOptions::default().with_compression(Compression::new(compression)?);
        self.export_with(image, &options)
    }

    pub fn export_named(
        &mut self,
        image: &impl ImageSource,
        name: &str,
    ) -> crate::Result<ExportSummary> {
        self.export_with(image, &ExportOptions::default().with_dataset_name(name))
    }

    /// Export `image` as one new 5D dataset.
    ///
    /// Grayscale stacks keep their pixel kind and channel count. Colour stacks
    /// are written as three 8-bit channels. The first plane is read and
    /// checked before the dataset is created, and a dataset whose first write
    /// fails is removed again.
    pub fn export_with(
        &mut self,
        image: &impl ImageSource,
        options: &ExportOptions,
    ) -> crate::Result<ExportSummary> {
        let container = self.container.as_mut().ok_or(Error::NotOpen)?;
        let dims = ImageDims::resolve(image)?;
        if image.slice_count() < dims.slice_count() {
            return Err(Error::InvalidDimensions(format!(
                "stack holds {} slices, {dims:?} needs {}",
                image.slice_count(),
                dims.slice_count()
            )));
        }
        let chunk_shape = dims.chunk_shape();

        let summary = match image.color_mode() {
            ColorMode::Grayscale(kind) => {
                export_stack(container, image, dims, kind, chunk_shape, options)?
            }
            ColorMode::Rgb => export_rgb(container, image, dims, chunk_shape, options)?,
        };
        log::info!(
            "exported {} units to {:?} with shape {:?}",
            summary.units_written,
            summary.dataset,
            summary.shape
        );
        Ok(summary)
    }
}

/// Fetch and transpose the grayscale plane for `unit`.
fn grayscale_plane(
    image: &impl ImageSource,
    dims: &ImageDims,
    unit: Unit,
) -> crate::Result<PixelBuffer> {
    let index = unit.slice_index(dims);
    let slice = image.slice(index).ok_or(Error::MissingSlice(index))?;
    slice
        .transpose(dims.rows, dims.columns)?
        .ok_or(Error::UnexpectedColorSlice(index))
}

/// Fetch the colour slice for `visit` and split it into red, green, blue.
fn color_planes(
    image: &impl ImageSource,
    dims: &ImageDims,
    visit: Unit,
) -> crate::Result<[PixelBuffer; 3]> {
    let index = visit.slice_index(dims);
    let pixels = match image.slice(index) {
        Some(Slice::Rgb(pixels)) => pixels,
        Some(_) => return Err(Error::UnexpectedGrayscaleSlice(index)),
        None => return Err(Error::MissingSlice(index)),
    };
    Ok(split_rgb(pixels, dims.rows, dims.columns)?.into_buffers())
}

/// Write the origin unit, removing the dataset if that fails.
fn write_first<C: Container>(
    container: &mut C,
    session: &mut DatasetSession<C::Dataset>,
    layout: &DatasetLayout,
    buffer: &PixelBuffer,
) -> crate::Result<()> {
    let Err(e) = session.write_unit(Unit::default(), buffer) else {
        return Ok(());
    };
    log::warn!("first write to {:?} failed, removing it: {e}", layout.name);
    container.remove_dataset(layout)?;
    Err(e)
}

fn export_stack<C: Container>(
    container: &mut C,
    image: &impl ImageSource,
    dims: ImageDims,
    kind: PixelKind,
    chunk_shape: Shape,
    options: &ExportOptions,
) -> crate::Result<ExportSummary> {
    let layout = DatasetLayout::new(
        options.dataset_name.as_str(),
        kind,
        dims.unit_shape(),
        chunk_shape,
        options.compression,
    )?;
    let shape = dims.shape();
    let first = grayscale_plane(image, &dims, Unit::default())?;
    check_kind(kind, &first)?;

    let mut session = DatasetSession::create(container, &layout, dims, shape)?;
    write_first(container, &mut session, &layout, &first)?;
    for unit in Unit::grayscale(dims).skip(1) {
        session.write_unit(unit, &grayscale_plane(image, &dims, unit)?)?;
    }

    Ok(ExportSummary {
        dataset: layout.name,
        kind,
        shape,
        chunk_shape,
        units_written: session.finish()?,
    })
}

fn export_rgb<C: Container>(
    container: &mut C,
    image: &impl ImageSource,
    dims: ImageDims,
    chunk_shape: Shape,
    options: &ExportOptions,
) -> crate::Result<ExportSummary> {
    let layout = DatasetLayout::new(
        options.dataset_name.as_str(),
        PixelKind::U8,
        dims.unit_shape(),
        chunk_shape,
        options.compression,
    )?;
    let shape = dims.with_channels(3)?.shape();
    let [red, green, blue] = color_planes(image, &dims, Unit::default())?;

    let mut session = DatasetSession::create(container, &layout, dims, shape)?;
    write_first(container, &mut session, &layout, &red)?;
    session.write_unit(Unit::new(0, 0, 1), &green)?;
    session.write_unit(Unit::new(0, 0, 2), &blue)?;
    for visit in Unit::color_visits(dims).skip(1) {
        let planes = color_planes(image, &dims, visit)?;
        for (channel, buffer) in planes.into_iter().enumerate() {
            session.write_unit(Unit::new(visit.frame, visit.depth, channel), &buffer)?;
        }
    }

    Ok(ExportSummary {
        dataset: layout.name,
        kind: PixelKind::U8,
        shape,
        chunk_shape,
        units_written: session.finish()?,
    })
}
