//! Deinterleave colour planes into separate channel buffers.
use crate::pixel::PixelBuffer;

/// Red, green and blue planes of one colour slice, each already transposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPlanes {
    pub red: Vec<u8>,
    pub green: Vec<u8>,
    pub blue: Vec<u8>,
}

impl ColorPlanes {
    /// Planes in channel order `c = 0, 1, 2`.
    pub fn into_buffers(self) -> [PixelBuffer; 3] {
        [
            PixelBuffer::U8(self.red),
            PixelBuffer::U8(self.green),
            PixelBuffer::U8(self.blue),
        ]
    }
}

/// Split `rows * columns` interleaved RGB triples into transposed planes.
pub fn split_rgb(interleaved: &[u8], rows: usize, columns: usize) -> crate::Result<ColorPlanes> {
    let n = rows * columns;
    if interleaved.len() != n * 3 {
        return Err(crate::Error::SliceLength {
            expected: n * 3,
            actual: interleaved.len(),
        });
    }
    let mut planes = ColorPlanes {
        red: vec![0; n],
        green: vec![0; n],
        blue: vec![0; n],
    };
    for (i, px) in interleaved.chunks_exact(3).enumerate() {
        let (y, x) = (i / columns, i % columns);
        let dst = y + x * rows;
        planes.red[dst] = px[0];
        planes.green[dst] = px[1];
        planes.blue[dst] = px[2];
    }
    Ok(planes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::transpose;

    #[test]
    fn planes_match_per_channel_transpose() {
        let (rows, columns) = (2, 3);
        let interleaved: Vec<u8> = (0..18).collect();
        let planes = split_rgb(&interleaved, rows, columns).unwrap();

        for (offset, plane) in [&planes.red, &planes.green, &planes.blue]
            .into_iter()
            .enumerate()
        {
            let channel: Vec<u8> = interleaved.iter().skip(offset).step_by(3).copied().collect();
            assert_eq!(*plane, transpose(&channel, rows, columns).unwrap());
        }
    }

    #[test]
    fn single_pixel() {
        let planes = split_rgb(&[10, 20, 30], 1, 1).unwrap();
        let [r, g, b] = planes.into_buffers();
        assert_eq!(r, PixelBuffer::U8(vec![10]));
        assert_eq!(g, PixelBuffer::U8(vec![20]));
        assert_eq!(b, PixelBuffer::U8(vec![30]));
    }

    #[test]
    fn truncated_slice_is_rejected() {
        assert!(matches!(
            split_rgb(&[0; 11], 2, 2),
            Err(crate::Error::SliceLength {
                expected: 12,
                actual: 11
            })
        ));
    }
}
