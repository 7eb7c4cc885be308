use crate::source::ImageSource;

/// Array shape in `(t, x, y, z, c)` order.
pub type Shape = [u64; 5];

/// Extent of an image along the five exported axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageDims {
    pub frames: usize,
    pub columns: usize,
    pub rows: usize,
    pub depth: usize,
    pub channels: usize,
}

impl ImageDims {
    /// Build dimensions, rejecting any empty axis.
    pub fn new(
        frames: usize,
        columns: usize,
        rows: usize,
        depth: usize,
        channels: usize,
    ) -> crate::Result<Self> {
        let dims = Self {
            frames,
            columns,
            rows,
            depth,
            channels,
        };
        let named = [
            ("frames", frames),
            ("columns", columns),
            ("rows", rows),
            ("depth", depth),
            ("channels", channels),
        ];
        if let Some((name, _)) = named.iter().find(|(_, n)| *n == 0) {
            return Err(crate::Error::InvalidDimensions(format!(
                "{name} must be non-zero in {dims:?}"
            )));
        }
        Ok(dims)
    }

    /// Read dimensions straight from the source; width is columns, height is rows.
    pub fn resolve(image: &impl ImageSource) -> crate::Result<Self> {
        Self::new(
            image.frames(),
            image.width(),
            image.height(),
            image.depth(),
            image.channels(),
        )
    }

    /// Same dimensions with a different channel count.
    pub fn with_channels(self, channels: usize) -> crate::Result<Self> {
        Self::new(self.frames, self.columns, self.rows, self.depth, channels)
    }

    pub fn shape(&self) -> Shape {
        [
            self.frames as u64,
            self.columns as u64,
            self.rows as u64,
            self.depth as u64,
            self.channels as u64,
        ]
    }

    /// Shape of a single written plane.
    pub fn unit_shape(&self) -> Shape {
        [1, self.columns as u64, self.rows as u64, 1, 1]
    }

    /// Chunk shape `{1, columns/8, rows/8, depth, channels}`.
    ///
    /// Planes narrower than 8 pixels get a chunk extent of 1 on that axis.
    pub fn chunk_shape(&self) -> Shape {
        [
            1,
            (self.columns as u64 / 8).max(1),
            (self.rows as u64 / 8).max(1),
            self.depth as u64,
            self.channels as u64,
        ]
    }

    pub fn plane_len(&self) -> usize {
        self.columns * self.rows
    }

    /// Number of slices a grayscale source must provide.
    pub fn slice_count(&self) -> usize {
        self.frames * self.depth * self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_shape_divides_plane_by_eight() {
        let dims = ImageDims::new(4, 64, 32, 5, 2).unwrap();
        assert_eq!(dims.chunk_shape(), [1, 8, 4, 5, 2]);
        assert_eq!(dims.shape(), [4, 64, 32, 5, 2]);
        assert_eq!(dims.unit_shape(), [1, 64, 32, 1, 1]);
    }

    #[test]
    fn chunk_shape_floors_and_clamps() {
        let dims = ImageDims::new(1, 17, 8, 1, 1).unwrap();
        assert_eq!(dims.chunk_shape(), [1, 2, 1, 1, 1]);
        let small = ImageDims::new(1, 5, 3, 1, 1).unwrap();
        assert_eq!(small.chunk_shape(), [1, 1, 1, 1, 1]);
    }

    #[test]
    fn zero_axis_is_rejected() {
        let err = ImageDims::new(2, 16, 16, 0, 1).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidDimensions(ref m) if m.contains("depth")));
        assert!(ImageDims::new(0, 1, 1, 1, 1).is_err());
    }

    #[test]
    fn resolve_reads_source_axes() {
        let stack = crate::source::ImageStack::from_u8(3, 2, vec![vec![0; 6]; 4])
            .with_hyperstack(2, 1, 2);
        let dims = ImageDims::resolve(&stack).unwrap();
        assert_eq!(
            dims,
            ImageDims {
                frames: 2,
                columns: 3,
                rows: 2,
                depth: 1,
                channels: 2
            }
        );
        assert_eq!(dims.slice_count(), 4);
        assert_eq!(dims.with_channels(3).unwrap().shape(), [2, 3, 2, 1, 3]);
    }
}
