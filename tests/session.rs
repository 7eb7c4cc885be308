use zarrs_ilastik::hyperslab::Hyperslab;
use zarrs_ilastik::storage::MemoryContainer;
use zarrs_ilastik::storage::memory::{MemoryRecord, Operation};
use zarrs_ilastik::{
    ColorMode, Error, Exporter, ImageSource, ImageStack, PixelBuffer, PixelKind, Slice,
};

fn exporter() -> (Exporter<MemoryContainer>, MemoryContainer) {
    env_logger::try_init().ok();
    let container = MemoryContainer::new();
    (Exporter::with_container(container.clone()), container)
}

/// `(start, buffer)` of every plane write, in order.
fn writes(record: &MemoryRecord) -> Vec<([u64; 5], PixelBuffer)> {
    record
        .operations
        .iter()
        .filter_map(|op| match op {
            Operation::WriteAll { buffer, .. } => Some(([0; 5], buffer.clone())),
            Operation::WriteSlab {
                slab: Hyperslab { start, .. },
                buffer,
            } => Some((*start, buffer.clone())),
            Operation::SetExtent { .. } => None,
        })
        .collect()
}

#[test]
fn test_grayscale_write_order() {
    let (mut exporter, container) = exporter();
    let planes = vec![vec![0u16; 16 * 16]; 6];
    let stack = ImageStack::from_u16(16, 16, planes).with_hyperstack(1, 3, 2);
    exporter.export(&stack).expect("export");

    let record = container.dataset("exported_data").expect("dataset");
    let starts: Vec<_> = writes(&record)
        .into_iter()
        .map(|(start, _)| (start[3], start[4]))
        .collect();
    assert_eq!(starts, [(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]);
    assert!(
        writes(&record)
            .iter()
            .all(|(_, b)| b.kind() == PixelKind::U16)
    );
}

#[test]
fn test_write_count_and_single_extension() {
    let (mut exporter, container) = exporter();
    let (frames, depth, channels) = (3, 2, 2);
    let planes = vec![vec![0f32; 8 * 8]; frames * depth * channels];
    let stack = ImageStack::from_f32(8, 8, planes).with_hyperstack(frames, depth, channels);
    let summary = exporter.export(&stack).expect("export");
    assert_eq!(summary.units_written, frames * depth * channels);

    let record = container.dataset("exported_data").expect("dataset");
    assert_eq!(record.write_count(), frames * depth * channels);
    assert_eq!(record.extension_count(), 1);
    assert!(matches!(record.operations[0], Operation::WriteAll { .. }));
    assert_eq!(
        record.operations[1],
        Operation::SetExtent {
            shape: [3, 8, 8, 2, 2]
        }
    );
    assert!(
        record.operations[2..]
            .iter()
            .all(|op| matches!(op, Operation::WriteSlab { .. }))
    );
    assert_eq!(record.shape, [3, 8, 8, 2, 2]);
    assert_eq!(record.layout.shape, [1, 8, 8, 1, 1]);
    assert_eq!(record.layout.chunk_shape, [1, 1, 1, 2, 2]);
}

#[test]
fn test_rgb_writes_three_u8_planes_per_visit() {
    let (mut exporter, container) = exporter();
    let (w, h) = (8, 8);
    let planes = vec![vec![9u8; w * h * 3]; 2];
    let stack = ImageStack::from_rgb(w, h, planes).with_hyperstack(1, 2, 1);
    let summary = exporter.export(&stack).expect("export");
    assert_eq!(summary.units_written, 6);
    assert_eq!(summary.shape, [1, 8, 8, 2, 3]);
    assert_eq!(summary.kind, PixelKind::U8);

    let record = container.dataset("exported_data").expect("dataset");
    let writes = writes(&record);
    let targets: Vec<_> = writes.iter().map(|(s, _)| (s[3], s[4])).collect();
    assert_eq!(targets, [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    assert!(writes.iter().all(|(_, b)| b.kind() == PixelKind::U8));
    assert_eq!(record.extension_count(), 1);
}

#[test]
fn test_rgb_frames_are_not_overrun() {
    let (mut exporter, container) = exporter();
    let stack = ImageStack::from_rgb(8, 8, vec![vec![0; 8 * 8 * 3]; 2]);
    exporter.export(&stack).expect("export");
    let record = container.dataset("exported_data").expect("dataset");
    let frames: Vec<_> = writes(&record).iter().map(|(s, _)| s[0]).collect();
    assert_eq!(frames, [0, 0, 0, 1, 1, 1]);
}

#[test]
fn test_attach_when_open_keeps_handle() {
    let (mut exporter, container) = exporter();
    let other = MemoryContainer::new();
    let err = exporter.attach(other.clone()).unwrap_err();
    assert!(matches!(err, Error::AlreadyOpen));
    assert!(err.is_resource_state());

    let stack = ImageStack::from_u8(8, 8, vec![vec![0; 64]]);
    exporter.export(&stack).expect("export");
    assert!(container.dataset("exported_data").is_some());
    assert!(other.dataset_names().is_empty());

    exporter.close().expect("close");
    assert!(matches!(exporter.close(), Err(Error::NotOpen)));
    exporter.attach(other.clone()).expect("attach after close");
    exporter.export(&stack).expect("export");
    assert_eq!(other.dataset_names(), ["exported_data"]);
}

#[test]
fn test_duplicate_dataset_name() {
    let (mut exporter, _container) = exporter();
    let stack = ImageStack::from_u8(8, 8, vec![vec![0; 64]]);
    exporter.export_named(&stack, "raw").expect("export");
    assert!(matches!(
        exporter.export_named(&stack, "raw"),
        Err(Error::DatasetExists(_))
    ));
}

/// Declares one colour mode but hands out 8-bit grayscale slices.
struct Mislabelled {
    mode: ColorMode,
    pixels: Vec<u8>,
}

impl ImageSource for Mislabelled {
    fn width(&self) -> usize {
        4
    }

    fn height(&self) -> usize {
        4
    }

    fn frames(&self) -> usize {
        1
    }

    fn depth(&self) -> usize {
        1
    }

    fn channels(&self) -> usize {
        1
    }

    fn color_mode(&self) -> ColorMode {
        self.mode
    }

    fn slice_count(&self) -> usize {
        1
    }

    fn slice(&self, index: usize) -> Option<Slice<'_>> {
        (index == 1).then_some(Slice::U8(&self.pixels))
    }
}

#[test]
fn test_no_implicit_conversion() {
    let (mut exporter, container) = exporter();
    let image = Mislabelled {
        mode: ColorMode::Grayscale(PixelKind::U16),
        pixels: vec![0; 16],
    };
    let err = exporter.export(&image).unwrap_err();
    assert!(matches!(
        err,
        Error::KindMismatch {
            expected: PixelKind::U16,
            actual: PixelKind::U8
        }
    ));
    assert!(container.dataset("exported_data").is_none());
}

#[test]
fn test_grayscale_slice_in_colour_stack() {
    let (mut exporter, container) = exporter();
    let image = Mislabelled {
        mode: ColorMode::Rgb,
        pixels: vec![0; 16],
    };
    assert!(matches!(
        exporter.export(&image),
        Err(Error::UnexpectedGrayscaleSlice(1))
    ));
    assert!(container.dataset_names().is_empty());
}

#[test]
fn test_short_colour_stack_is_rejected_before_writing() {
    let (mut exporter, container) = exporter();
    let stack = ImageStack::from_rgb(8, 8, vec![vec![0; 8 * 8 * 3]; 3]).with_hyperstack(2, 2, 1);
    assert!(matches!(
        exporter.export(&stack),
        Err(Error::InvalidDimensions(_))
    ));
    assert!(container.dataset_names().is_empty());
}

#[test]
fn test_failed_export_can_be_retried_under_same_name() {
    let (mut exporter, container) = exporter();
    let bad = ImageStack::from_u8(8, 8, vec![vec![0; 63]]);
    assert!(matches!(
        exporter.export(&bad),
        Err(Error::SliceLength { .. })
    ));
    assert!(container.dataset("exported_data").is_none());

    let good = ImageStack::from_u8(8, 8, vec![vec![0; 64]]);
    exporter.export(&good).expect("retry");
    let record = container.dataset("exported_data").expect("dataset");
    assert_eq!(record.write_count(), 1);
}

#[test]
fn test_wrong_plane_size() {
    let (mut exporter, _container) = exporter();
    let stack = ImageStack::from_u8(8, 8, vec![vec![0; 63]]);
    assert!(matches!(
        exporter.export(&stack),
        Err(Error::SliceLength {
            expected: 64,
            actual: 63
        })
    ));
}
