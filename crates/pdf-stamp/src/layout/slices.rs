//! Seam slice planning
//!
//! A seam stamp is cut into one vertical strip per participating page so the
//! strips line up into the whole image when the pages are fanned out.

use super::SliceSpan;

/// Minimum pages needed for a seam
pub const MIN_SEAM_PAGES: usize = 2;

/// Split `total_width` pixel columns into `page_count` contiguous spans.
///
/// The first span is a third of the image; the rest share the remainder
/// evenly and the last one absorbs the rounding. Returns an empty plan when
/// fewer than [`MIN_SEAM_PAGES`] pages take part.
///
/// Spans never start past the last column and are at least one pixel wide,
/// so every page gets something visible even when the image is narrower
/// than the page run.
pub fn plan_slices(total_width: u32, page_count: usize) -> Vec<SliceSpan> {
    if page_count < MIN_SEAM_PAGES || total_width == 0 {
        return Vec::new();
    }

    let total = i64::from(total_width);
    let first = total / 3;
    let rest = (total - first) / (page_count as i64 - 1);

    let mut spans = Vec::with_capacity(page_count);
    let mut cursor = 0i64;

    for index in 0..page_count {
        let planned = if index == 0 {
            first
        } else if index == page_count - 1 {
            total - cursor
        } else {
            rest
        };

        let start = cursor.min(total - 1);
        let width = planned.max(1).min(total - start);

        spans.push(SliceSpan::new(start as u32, width as u32));
        cursor += planned.max(1);
    }

    spans
}

/// Split a plan into batches of at most `batch_size` spans, keeping the
/// page index of each span.
pub fn slice_batches(plan: &[SliceSpan], batch_size: usize) -> Vec<Vec<(usize, SliceSpan)>> {
    let size = batch_size.max(1);
    let indexed: Vec<(usize, SliceSpan)> = plan.iter().copied().enumerate().collect();
    indexed.chunks(size).map(|chunk| chunk.to_vec()).collect()
}
