//! Ticket and page rendering.

use image::{DynamicImage, RgbImage, RgbaImage, imageops};

use super::font::{FontBook, FontHandle};
use super::text::draw_text;
use crate::enumerate::Assignment;
use crate::layout::GridGeometry;
use crate::plan::stride_cells;
use crate::spec::{Color, Spec};
use crate::template::substitute;

/// Composite the source image over a canvas filled with `background`.
pub fn compose_template(source: &DynamicImage, background: Color) -> RgbImage {
    let mut canvas = RgbaImage::from_pixel(source.width(), source.height(), background.to_rgba());
    imageops::overlay(&mut canvas, &source.to_rgba8(), 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

/// The substituted text of every text element for one ticket.
pub fn ticket_texts(spec: &Spec, ticket: &Assignment<'_>) -> Vec<String> {
    let params = spec.params.as_deref().unwrap_or(&[]);
    let vars = ticket.variables(params);
    spec.texts
        .iter()
        .map(|text| substitute(&text.template, &vars))
        .collect()
}

/// Renders tickets and pages for one spec.
///
/// The composed template is built once and never modified; every ticket is
/// drawn on its own copy.
pub struct PageRenderer<'a> {
    spec: &'a Spec,
    template: RgbImage,
    geometry: GridGeometry,
    fonts: Vec<FontHandle>,
}

impl<'a> PageRenderer<'a> {
    pub fn new(spec: &'a Spec, source: &DynamicImage, fonts: &mut FontBook) -> Self {
        let template = compose_template(source, spec.output.background_color);
        let geometry = GridGeometry::new(template.width(), template.height(), &spec.layout);
        let fonts = spec
            .texts
            .iter()
            .map(|text| fonts.resolve(text.ttf.as_deref(), text.size))
            .collect();

        Self {
            spec,
            template,
            geometry,
            fonts,
        }
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn template(&self) -> &RgbImage {
        &self.template
    }

    /// Draw one ticket on a fresh copy of the template.
    pub fn render_ticket(&self, ticket: &Assignment<'_>) -> RgbImage {
        let mut image = self.template.clone();
        let texts = ticket_texts(self.spec, ticket);
        for ((element, font), text) in self.spec.texts.iter().zip(&self.fonts).zip(texts) {
            draw_text(&mut image, font, element.position, &text, element.color);
        }
        image
    }

    /// Render the page at `page_offset` within a stack whose ticket block is
    /// `block`. Cells without a ticket stay blank.
    pub fn render_page(&self, page_offset: usize, block: &[Assignment<'_>]) -> RgbImage {
        let (width, height) = self.geometry.page_size();
        let mut page = RgbImage::from_pixel(width, height, self.spec.background.to_rgb());

        let cells = stride_cells(page_offset, block.len(), self.spec.stack_size)
            .take(self.geometry.grid_area());
        for (cell, index) in cells {
            let ticket = self.render_ticket(&block[index]);
            let (left, top) = self.geometry.cell_offset(cell);
            imageops::replace(&mut page, &ticket, left, top);
        }

        page
    }
}
