pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One page of a filtered sequence.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based, always within `1..=total_pages`.
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub total_items: usize,
}

impl<T> Page<'_, T> {
    /// 1-based index of the first row on this page, 0 when empty.
    pub fn first_row(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.page_size + 1
        }
    }

    /// 1-based index of the last row on this page, 0 when empty.
    pub fn last_row(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.page_size + self.items.len()
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

fn guard_page_size(page_size: usize) -> usize {
    if page_size == 0 {
        log::warn!("page size 0 is invalid, using 1");
        1
    } else {
        page_size
    }
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    let size = guard_page_size(page_size);
    len.div_ceil(size).max(1)
}

/// Slice `items` into page `page`; out-of-range pages collapse to the nearest valid one.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let page_size = guard_page_size(page_size);
    let total_pages = total_pages(items.len(), page_size);
    let page = page.clamp(1, total_pages);
    let start = ((page - 1) * page_size).min(items.len());
    let end = (page * page_size).min(items.len());
    Page {
        items: &items[start..end],
        page,
        total_pages,
        page_size,
        total_items: items.len(),
    }
}

/// Current page + page size for one list view.
#[derive(Debug, Clone, PartialEq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: guard_page_size(page_size),
        }
    }

    #[cfg(test)]
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Changing the page size always returns to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = guard_page_size(page_size);
        self.page = 1;
    }

    /// Call after any filter change.
    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn go_to(&mut self, page: usize, total_items: usize) {
        self.page = page.clamp(1, total_pages(total_items, self.page_size));
    }

    pub fn next(&mut self, total_items: usize) {
        self.go_to(self.page + 1, total_items);
    }

    pub fn prev(&mut self, total_items: usize) {
        self.go_to(self.page.saturating_sub(1), total_items);
    }

    pub fn last(&mut self, total_items: usize) {
        self.page = total_pages(total_items, self.page_size);
    }

    /// Page for the current filtered set. If the set shrank beneath the current page,
    /// the pager falls back to page 1.
    pub fn view<'a, T>(&mut self, items: &'a [T]) -> Page<'a, T> {
        if self.page > total_pages(items.len(), self.page_size) {
            self.page = 1;
        }
        paginate(items, self.page, self.page_size)
    }
}
