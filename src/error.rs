use crate::pixel::PixelKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    General(String),
    #[error("a container is already open")]
    AlreadyOpen,
    #[error("no container is open")]
    NotOpen,
    #[error("invalid image dimensions: {0}")]
    InvalidDimensions(String),
    #[error("invalid compression level {0}, expected 0..=9")]
    InvalidCompression(u32),
    #[error("pixel plane has {actual} elements, expected {expected}")]
    SliceLength { expected: usize, actual: usize },
    #[error("expected {expected} pixels, got {actual}")]
    KindMismatch {
        expected: PixelKind,
        actual: PixelKind,
    },
    #[error("slice {0} is missing from the image stack")]
    MissingSlice(usize),
    #[error("slice {0} is a colour slice in a grayscale stack")]
    UnexpectedColorSlice(usize),
    #[error("slice {0} is a grayscale slice in a colour stack")]
    UnexpectedGrayscaleSlice(usize),
    #[error("container path is empty")]
    EmptyPath,
    #[error("{0:?} exists and is not a zarr hierarchy")]
    NotAContainer(std::path::PathBuf),
    #[error("dataset {0:?} already exists")]
    DatasetExists(String),
    #[error("selection out of bounds: {0}")]
    OutOfBounds(String),
    #[error("dataset lifecycle violated: {0}")]
    Lifecycle(String),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Wrapped(Box<dyn std::error::Error>),
}

impl Error {
    pub fn general(message: impl Into<String>) -> Self {
        Self::General(message.into())
    }

    pub fn wrap(error: impl std::error::Error + 'static) -> Self {
        Self::Wrapped(Box::new(error))
    }

    /// Open/close misuse on the exporter handle.
    ///
    /// These leave the handle unchanged and the caller may carry on.
    pub fn is_resource_state(&self) -> bool {
        matches!(self, Self::AlreadyOpen | Self::NotOpen)
    }
}
