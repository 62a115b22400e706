//! PDF document assembly.
//!
//! Every page raster becomes one PDF page holding a single Flate-compressed
//! DeviceRGB image that fills the media box. Pages are sized for printing at
//! [`PDF_DPI`].

use image::RgbImage;
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, TextStr};
use std::path::{Path, PathBuf};

use super::PageSink;
use crate::error::StampError;

/// Print resolution of page rasters.
pub const PDF_DPI: f32 = 100.0;

/// Writes pages to a PDF file.
#[derive(Debug, Clone)]
pub struct PdfFile {
    path: PathBuf,
}

impl PdfFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PageSink for PdfFile {
    fn write_pages(&mut self, pages: &[RgbImage]) -> Result<(), StampError> {
        let bytes = encode_pdf(pages)?;
        std::fs::write(&self.path, &bytes)?;
        log::info!("Wrote {} ({} pages, {} bytes)", self.path.display(), pages.len(), bytes.len());
        Ok(())
    }
}

/// Encode page rasters as a multi-page PDF.
pub fn encode_pdf(pages: &[RgbImage]) -> Result<Vec<u8>, StampError> {
    if pages.is_empty() {
        return Err(StampError::Image("a document needs at least one page".into()));
    }

    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();

    let mut page_ids = Vec::with_capacity(pages.len());
    let image_name = Name(b"Im1");

    for raster in pages {
        let page_id = alloc();
        let content_id = alloc();
        let image_id = alloc();
        page_ids.push(page_id);

        let (w, h) = raster.dimensions();
        let width_pt = w as f32 * 72.0 / PDF_DPI;
        let height_pt = h as f32 * 72.0 / PDF_DPI;

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raster.as_raw(), 6);
        {
            let mut xobj = pdf.image_xobject(image_id, &compressed);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w as i32);
            xobj.height(h as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
        }

        let mut content = Content::new();
        content.save_state();
        content.transform([width_pt, 0.0, 0.0, height_pt, 0.0, 0.0]);
        content.x_object(image_name);
        content.restore_state();
        let raw = content.finish();
        let compressed_content = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_id, &compressed_content)
            .filter(Filter::FlateDecode);

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, width_pt, height_pt))
            .parent(pages_id)
            .contents(content_id);
        page.resources().x_objects().pair(image_name, image_id);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);
    pdf.document_info(info_id)
        .producer(TextStr(concat!("serial-stamp ", env!("CARGO_PKG_VERSION"))));

    Ok(pdf.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn test_one_pdf_page_per_raster() {
        let pages = vec![
            RgbImage::from_pixel(100, 50, Rgb([255, 255, 255])),
            RgbImage::from_pixel(100, 50, Rgb([0, 0, 0])),
            RgbImage::from_pixel(100, 50, Rgb([9, 9, 9])),
        ];
        let bytes = encode_pdf(&pages).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(count(&bytes, b"/Type /Page") - count(&bytes, b"/Type /Pages"), 3);
        assert_eq!(count(&bytes, b"/Subtype /Image"), 3);
        assert_eq!(count(&bytes, b"/Count 3"), 1);
    }

    #[test]
    fn test_media_box_at_print_resolution() {
        let pages = vec![RgbImage::from_pixel(200, 100, Rgb([255, 255, 255]))];
        let bytes = encode_pdf(&pages).unwrap();
        assert_eq!(count(&bytes, b"/MediaBox [0 0 144 72]"), 1);
    }

    #[test]
    fn test_empty_document_rejected() {
        assert!(encode_pdf(&[]).is_err());
    }

    #[test]
    fn test_pdf_file_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PdfFile::new(dir.path().join("missing-dir").join("out.pdf"));
        let pages = vec![RgbImage::from_pixel(1, 1, Rgb([0, 0, 0]))];
        assert!(matches!(sink.write_pages(&pages), Err(StampError::Io(_))));
    }
}
