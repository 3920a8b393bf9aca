//! Page-number pagination for public listings.
//!
//! Bad page references never fail a render: anything that is not an
//! integer shows the first page, and numbers outside the valid range show
//! the last one.

use std::num::NonZeroU32;

use serde::Serialize;

pub const DEFAULT_EVENTS_PER_PAGE: u32 = 8;

/// Slice of an ordered result set to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub number: u64,
    pub per_page: u32,
    pub total_items: u64,
    pub num_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page: Option<u64>,
    pub next_page: Option<u64>,
}

impl PageInfo {
    pub fn resolve(page_ref: Option<&str>, total_items: u64, per_page: NonZeroU32) -> Self {
        let per_page_u64 = u64::from(per_page.get());
        // An empty listing still has one (empty) page.
        let num_pages = total_items.div_ceil(per_page_u64).max(1);

        let number = match page_ref.map(str::trim).map(str::parse::<i64>) {
            Some(Ok(requested)) => match u64::try_from(requested) {
                Ok(requested) if (1..=num_pages).contains(&requested) => requested,
                _ => num_pages,
            },
            Some(Err(_)) | None => 1,
        };

        Self {
            number,
            per_page: per_page.get(),
            total_items,
            num_pages,
            has_previous: number > 1,
            has_next: number < num_pages,
            previous_page: (number > 1).then(|| number - 1),
            next_page: (number < num_pages).then(|| number + 1),
        }
    }

    pub fn window(&self) -> PageWindow {
        PageWindow {
            offset: (self.number - 1).saturating_mul(u64::from(self.per_page)),
            limit: self.per_page,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}
