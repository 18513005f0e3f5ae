//! Applying seam and page stamps to one open document

use crate::bitmap::StampBitmap;
use crate::cancel::CancelFlag;
use crate::constants::DEFAULT_UNITS_PER_INCH;
use crate::jitter::jitter;
use crate::layout::*;
use crate::options::{PageStampOptions, SeamStampOptions};
use crate::render::{PageStamper, create_image_xobject};
use crate::types::*;
use lopdf::Document;
use rand::RngCore;

/// Everything needed to draw on one document
pub(crate) struct StampContext<'a> {
    pub bitmap: &'a StampBitmap,
    pub stamp_width_mm: f32,
    pub cancel: &'a CancelFlag,
}

impl StampContext<'_> {
    fn scale_percent(&self) -> f32 {
        scale_percent(
            self.stamp_width_mm,
            self.bitmap.original_width(),
            DEFAULT_UNITS_PER_INCH,
        )
    }
}

// =============================================================================
// Seam Stamps
// =============================================================================

/// Slice the bitmap across the seam pages; returns the pages stamped
pub(crate) fn apply_seam_stamp(
    doc: &mut Document,
    pages: &mut PageStamper,
    ctx: &StampContext<'_>,
    seam: &SeamStampOptions,
) -> Result<usize> {
    let page_count = pages.page_count();
    if seam.scope == SeamScope::Custom {
        warn_out_of_range(&seam.custom_pages, page_count, "seam");
    }
    let seam_pages = resolve_seam_pages(seam.scope, &seam.custom_pages, page_count);

    if seam_pages.len() < MIN_SEAM_PAGES {
        log::warn!(
            "Seam stamp needs at least {} pages, found {}; skipping",
            MIN_SEAM_PAGES,
            seam_pages.len()
        );
        return Ok(0);
    }

    let plan = plan_slices(ctx.bitmap.width(), seam_pages.len());
    let scale = ctx.scale_percent();
    let quarter_turn = seam.side.is_horizontal();
    log::debug!(
        "Seam plan over {} pages on the {} edge: {:?}",
        seam_pages.len(),
        seam.side.as_str(),
        plan
    );

    let mut stamped = 0;
    for batch in slice_batches(&plan, seam.max_batch_size) {
        ctx.cancel.check()?;
        log::debug!("Seam batch of {} slices", batch.len());

        let slices: Vec<_> = batch
            .iter()
            .map(|&(index, span)| (seam_pages[index], ctx.bitmap.slice(span, quarter_turn)))
            .collect();

        for (page, slice) in slices {
            ctx.cancel.check()?;
            if !page_in_range(page, page_count) {
                continue;
            }

            let metrics = page_metrics(&pages.page_box(doc, page)?);
            let (width, height) = scaled_size(slice.width(), slice.height(), scale);
            let (x, y) = seam_stamp_origin(
                seam.side,
                seam.offset_ratio(),
                metrics.width,
                metrics.height,
                width,
                height,
            );

            let placement = StampPlacement {
                page,
                rect: Rect::new(x, y, width, height),
                rotation_degrees: 0.0,
            };
            log::debug!("Seam slice placement {:?}", placement);
            pages.draw_image(doc, &slice, &placement)?;
            stamped += 1;
        }
    }

    Ok(stamped)
}

// =============================================================================
// Page Stamps
// =============================================================================

/// Draw the whole bitmap on each selected page; returns the stamps drawn
pub(crate) fn apply_page_stamps(
    doc: &mut Document,
    pages: &mut PageStamper,
    ctx: &StampContext<'_>,
    options: &PageStampOptions,
    rng: &mut dyn RngCore,
) -> Result<usize> {
    let page_count = pages.page_count();
    if options.scope == PageScope::Custom {
        warn_out_of_range(&options.custom_pages, page_count, "page stamp");
    }
    let targets = resolve_page_stamp_pages(options.scope, &options.custom_pages, page_count);

    let (width, height) = scaled_size(
        ctx.bitmap.width(),
        ctx.bitmap.height(),
        ctx.scale_percent(),
    );

    if targets.is_empty() {
        return Ok(0);
    }
    let xobject_id = create_image_xobject(doc, ctx.bitmap.image())?;

    let mut applied = 0;
    for page in targets {
        ctx.cancel.check()?;
        if !page_in_range(page, page_count) {
            continue;
        }

        let base = options.position_for(page);
        let (position, rotation_degrees) = if options.randomize {
            let jittered = jitter(base, rng);
            (jittered.position, jittered.rotation_degrees)
        } else {
            (base, 0.0)
        };

        let metrics = page_metrics(&pages.page_box(doc, page)?);
        let (x, y) = page_stamp_origin(
            position.x,
            position.y,
            metrics.width,
            metrics.height,
            width,
            height,
        );

        let placement = StampPlacement {
            page,
            rect: Rect::new(x, y, width, height),
            rotation_degrees,
        };
        log::debug!("Page stamp placement {:?}", placement);
        pages.draw_xobject(doc, xobject_id, &placement)?;
        applied += 1;
    }

    Ok(applied)
}

fn warn_out_of_range(custom_pages: &[u32], page_count: u32, what: &str) {
    let outside: Vec<u32> = custom_pages
        .iter()
        .copied()
        .filter(|&p| !page_in_range(p, page_count))
        .collect();
    if !outside.is_empty() {
        log::warn!(
            "Ignoring {} pages {:?} outside 1..={}",
            what,
            outside,
            page_count
        );
    }
}
