//! PDF emission: write a [`LayoutPlan`] into a new pdfium document.
//!
//! Layout works top-down in millimetres; PDF user space is bottom-up in
//! points. The conversion happens only here.
//!
//! Both faces are embedded once per document from the bytes held by the
//! [`FontSet`]. Each page's content stream is regenerated once after all of
//! its runs are placed rather than after every text object.

use crate::error::BionicPdfError;
use crate::fonts::{Face, FontSet};
use crate::pipeline::layout::{LayoutPlan, PageLayout};
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Render `plan` with `fonts` and serialise the result.
///
/// Any pdfium failure, including the final serialisation, is fatal for the
/// run.
pub fn render_plan(
    pdfium: &Pdfium,
    plan: &LayoutPlan,
    fonts: &FontSet,
) -> Result<Vec<u8>, BionicPdfError> {
    let mut document = pdfium.create_new_pdf().map_err(render_failed)?;

    let regular = document
        .fonts_mut()
        .load_true_type_from_bytes(fonts.face(Face::Regular).data(), true)
        .map_err(render_failed)?;
    let bold = document
        .fonts_mut()
        .load_true_type_from_bytes(fonts.face(Face::Bold).data(), true)
        .map_err(render_failed)?;
    let token = |face: Face| match face {
        Face::Regular => regular,
        Face::Bold => bold,
    };

    let metrics = &plan.metrics;
    let page_height = PdfPoints::from_mm(metrics.page_height_mm);
    let font_size = PdfPoints::new(metrics.font_size_pt);

    for (index, layout) in plan.pages.iter().enumerate() {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::new_custom(
                PdfPoints::from_mm(metrics.page_width_mm),
                page_height,
            ))
            .map_err(render_failed)?;
        page.set_content_regeneration_strategy(PdfPageContentRegenerationStrategy::Manual);

        write_page(&mut page, layout, page_height, font_size, &token)?;

        page.regenerate_content().map_err(render_failed)?;
        debug!("Rendered output page {} ({} runs)", index + 1, layout.runs.len());
    }

    let bytes = document.save_to_bytes().map_err(render_failed)?;
    info!(
        "Rendered {} output pages ({} bytes)",
        plan.pages.len(),
        bytes.len()
    );
    Ok(bytes)
}

fn write_page(
    page: &mut PdfPage,
    layout: &PageLayout,
    page_height: PdfPoints,
    font_size: PdfPoints,
    token: &impl Fn(Face) -> PdfFontToken,
) -> Result<(), BionicPdfError> {
    for run in &layout.runs {
        let x = PdfPoints::from_mm(run.x_mm);
        let y = PdfPoints::new(page_height.value - PdfPoints::from_mm(run.baseline_mm).value);
        page.objects_mut()
            .create_text_object(x, y, &run.text, token(run.face), font_size)
            .map_err(render_failed)?;
    }
    Ok(())
}

fn render_failed(e: PdfiumError) -> BionicPdfError {
    BionicPdfError::RenderFailed {
        detail: format!("{:?}", e),
    }
}
