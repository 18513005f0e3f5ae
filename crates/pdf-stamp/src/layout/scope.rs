//! Page scope resolution
//!
//! Turns a symbolic scope into the sorted, de-duplicated list of 1-based page
//! numbers it covers in a document of `page_count` pages.

use crate::types::{PageScope, SeamScope};

/// Pages that receive a seam slice
pub fn resolve_seam_pages(scope: SeamScope, custom_pages: &[u32], page_count: u32) -> Vec<u32> {
    match scope {
        SeamScope::None => Vec::new(),
        SeamScope::All => (1..=page_count).collect(),
        SeamScope::Odd => (1..=page_count).filter(|p| p % 2 == 1).collect(),
        SeamScope::Even => (1..=page_count).filter(|p| p % 2 == 0).collect(),
        SeamScope::Custom => resolve_custom(custom_pages, page_count),
    }
}

/// Pages that receive a page stamp
pub fn resolve_page_stamp_pages(
    scope: PageScope,
    custom_pages: &[u32],
    page_count: u32,
) -> Vec<u32> {
    match scope {
        PageScope::None => Vec::new(),
        PageScope::All => (1..=page_count).collect(),
        PageScope::SkipFirst if page_count <= 1 => Vec::new(),
        PageScope::SkipFirst => (2..=page_count).collect(),
        PageScope::SkipLast if page_count <= 1 => Vec::new(),
        PageScope::SkipLast => (1..page_count).collect(),
        PageScope::Custom => resolve_custom(custom_pages, page_count),
    }
}

/// Whether a page number exists in a document of `page_count` pages
pub fn page_in_range(page: u32, page_count: u32) -> bool {
    (1..=page_count).contains(&page)
}

fn resolve_custom(custom_pages: &[u32], page_count: u32) -> Vec<u32> {
    let mut pages: Vec<u32> = custom_pages
        .iter()
        .copied()
        .filter(|&p| page_in_range(p, page_count))
        .collect();
    pages.sort_unstable();
    pages.dedup();
    pages
}
