//! # Generation Engine
//!
//! Drives a whole run: compose the template once, plan the stacks, walk the
//! value space one stack block at a time, render every page of the stack and
//! hand the finished pages to a [`PageSink`].
//!
//! ```text
//! Spec ─▶ ValueSpace ─▶ next_block(W) ─▶ PageRenderer ─▶ pages ─▶ PageSink
//!                           ▲                              │
//!                       StackPlan                   Progress(page, total)
//! ```
//!
//! A run with no pages (zero grid area, zero tickets) writes nothing and
//! draws nothing.

use image::{DynamicImage, RgbImage};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::error::StampError;
use crate::layout::GridGeometry;
use crate::output::{PageSink, PdfFile};
use crate::plan::{PageSlot, StackPlan};
use crate::project::Assets;
use crate::render::{FontBook, FontConfig, PageRenderer, ticket_texts};
use crate::spec::Spec;

/// Reported after each finished page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// 1-based number of the page just rendered.
    pub page: usize,
    pub total: usize,
}

/// Outcome of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub plan: StackPlan,
    pub pages_written: usize,
}

/// Shared flag for stopping a run between pages.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One cell of a [`PageManifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellManifest {
    pub cell: usize,
    /// Index of the ticket in enumeration order.
    pub ticket: usize,
    /// Substituted text of each text element.
    pub texts: Vec<String>,
}

/// What one printed page contains, without the pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageManifest {
    #[serde(flatten)]
    pub slot: PageSlot,
    pub cells: Vec<CellManifest>,
}

/// A spec bound to its decoded source image.
#[derive(Debug, Clone)]
pub struct Engine {
    spec: Spec,
    source: DynamicImage,
    assets: Assets,
    fonts: FontConfig,
}

impl Engine {
    pub fn new(spec: Spec, source: DynamicImage) -> Self {
        Self {
            spec,
            source,
            assets: Assets::default(),
            fonts: FontConfig::default(),
        }
    }

    /// Resolve font references against `assets`.
    pub fn with_assets(mut self, assets: Assets) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_font_config(mut self, fonts: FontConfig) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    pub fn geometry(&self) -> GridGeometry {
        GridGeometry::new(self.source.width(), self.source.height(), &self.spec.layout)
    }

    /// Page and stack counts for this run.
    pub fn plan(&self) -> StackPlan {
        StackPlan::new(
            self.spec.value_space().count(),
            self.spec.layout.grid_area(),
            self.spec.stack_size,
        )
    }

    /// Render every page and write them as one PDF at `output`.
    ///
    /// Nothing is written when the run has no pages.
    pub fn generate(
        &self,
        output: &Path,
        mut progress: impl FnMut(Progress),
    ) -> Result<Summary, StampError> {
        let mut sink = PdfFile::new(output);
        self.generate_into(&mut sink, &mut progress, &CancelToken::new())
    }

    /// Render every page into `sink`, checking `cancel` between pages.
    pub fn generate_into(
        &self,
        sink: &mut dyn PageSink,
        progress: &mut dyn FnMut(Progress),
        cancel: &CancelToken,
    ) -> Result<Summary, StampError> {
        let plan = self.plan();
        if plan.tickets_per_page == 0 {
            log::info!("Grid area is zero; nothing to generate");
            return Ok(Summary {
                plan,
                pages_written: 0,
            });
        }
        if plan.is_empty() {
            log::info!("No tickets; nothing to generate");
            return Ok(Summary {
                plan,
                pages_written: 0,
            });
        }

        log::info!(
            "Generating {} tickets on {} pages ({} stacks of {}, {} per page)",
            plan.ticket_count,
            plan.total_pages,
            plan.stack_count,
            plan.stack_size,
            plan.tickets_per_page
        );

        let started = Instant::now();
        let mut fonts = FontBook::new(self.fonts.clone(), self.assets.clone());
        let renderer = PageRenderer::new(&self.spec, &self.source, &mut fonts);
        let space = self.spec.value_space();
        let mut tickets = space.iter();
        let mut pages: Vec<RgbImage> = Vec::with_capacity(plan.total_pages);

        for stack in 0..plan.stack_count {
            let block = tickets.next_block(plan.window());
            log::debug!("Stack {}: {} tickets", stack, block.len());

            for page_offset in 0..plan.stack_size {
                if cancel.is_cancelled() {
                    log::info!("Generation cancelled after {} pages", pages.len());
                    return Err(StampError::Cancelled);
                }
                pages.push(renderer.render_page(page_offset, &block));
                let update = Progress {
                    page: pages.len(),
                    total: plan.total_pages,
                };
                log::debug!("Rendered page {}/{}", update.page, update.total);
                progress(update);
            }
        }
        log::info!("Rendered {} pages in {:?}", pages.len(), started.elapsed());

        let started = Instant::now();
        sink.write_pages(&pages)?;
        log::info!("Wrote document in {:?}", started.elapsed());

        Ok(Summary {
            plan,
            pages_written: pages.len(),
        })
    }

    /// Render the first page for interactive preview.
    ///
    /// Returns `None` when the grid area is zero. With no tickets the page is
    /// blank.
    pub fn generate_preview(&self) -> Result<Option<RgbImage>, StampError> {
        let tickets_per_page = self.spec.layout.grid_area();
        if tickets_per_page == 0 {
            return Ok(None);
        }

        let mut fonts = FontBook::new(self.fonts.clone(), self.assets.clone());
        let renderer = PageRenderer::new(&self.spec, &self.source, &mut fonts);
        let window = self.spec.stack_size.saturating_mul(tickets_per_page);
        let block = self.spec.value_space().iter().next_block(window);
        Ok(Some(renderer.render_page(0, &block)))
    }

    /// The text content of every page of the run, in output order.
    pub fn manifest(&self) -> Vec<PageManifest> {
        let plan = self.plan();
        let space = self.spec.value_space();
        let mut tickets = space.iter();
        let mut block = Vec::new();
        let mut manifest = Vec::with_capacity(plan.total_pages);

        for slot in plan.pages() {
            if slot.page_offset == 0 {
                block = tickets.next_block(plan.window());
            }
            let base = slot.stack * plan.window();
            let cells = plan
                .cells(slot.page_offset, block.len())
                .take(plan.tickets_per_page)
                .map(|(cell, index)| CellManifest {
                    cell,
                    ticket: base + index,
                    texts: ticket_texts(&self.spec, &block[index]),
                })
                .collect();
            manifest.push(PageManifest { slot, cells });
        }
        manifest
    }
}
