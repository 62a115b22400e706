//! # Output Sinks
//!
//! A [`PageSink`] receives the finished pages of a run, in order, and turns
//! them into one document.
//!
//! | Sink | Result |
//! |------|--------|
//! | [`PdfFile`] | Multi-page PDF written to disk |
//! | [`MemorySink`] | Pages kept in memory |

mod pdf;

pub use pdf::{PDF_DPI, PdfFile, encode_pdf};

use image::{ImageFormat, RgbImage};
use std::io::Cursor;

use crate::error::StampError;

/// Destination for the rendered pages of a run.
pub trait PageSink {
    /// Accept the complete, non-empty, ordered page sequence.
    fn write_pages(&mut self, pages: &[RgbImage]) -> Result<(), StampError>;
}

/// Keeps pages in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub pages: Vec<RgbImage>,
}

impl PageSink for MemorySink {
    fn write_pages(&mut self, pages: &[RgbImage]) -> Result<(), StampError> {
        self.pages.extend_from_slice(pages);
        Ok(())
    }
}

/// Encode a single raster as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, StampError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_encode_png_round_trips_dimensions() {
        let image = RgbImage::from_pixel(7, 3, Rgb([1, 2, 3]));
        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let mut sink = MemorySink::default();
        let pages = vec![
            RgbImage::from_pixel(1, 1, Rgb([1, 1, 1])),
            RgbImage::from_pixel(1, 1, Rgb([2, 2, 2])),
        ];
        sink.write_pages(&pages).unwrap();
        assert_eq!(sink.pages, pages);
    }
}
