// ==========================================
// SupplySight 库存驾驶舱 - 分页控制
// ==========================================
// 页码从 1 开始
// totalPages = ceil(N / size),N = 0 时为 1（空页）
// 上一页在 1 处截止,下一页在 totalPages 处截止
// ==========================================

/// 默认每页条数
pub const DEFAULT_PAGE_SIZE: usize = 10;

// ==========================================
// Pager - 分页器
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    /// 创建分页器（page_size 为 0 时按 1 处理）
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 总页数（最少 1）
    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.page_size).max(1)
    }

    /// 将页码截止到 [1, totalPages]
    pub fn clamp(&self, page: usize, total_items: usize) -> usize {
        page.clamp(1, self.total_pages(total_items))
    }

    /// 上一页
    pub fn previous(&self, page: usize, total_items: usize) -> usize {
        self.clamp(page.saturating_sub(1), total_items)
    }

    /// 下一页
    pub fn next(&self, page: usize, total_items: usize) -> usize {
        self.clamp(page.saturating_add(1), total_items)
    }

    /// 当前页的半开区间 [start, end)
    pub fn bounds(&self, page: usize, total_items: usize) -> (usize, usize) {
        let page = self.clamp(page, total_items);
        let start = ((page - 1) * self.page_size).min(total_items);
        let end = (page * self.page_size).min(total_items);
        (start, end)
    }

    /// 取当前页切片（页码越界时截止）
    pub fn slice<'a, T>(&self, items: &'a [T], page: usize) -> Page<'a, T> {
        let total_items = items.len();
        let current = self.clamp(page, total_items);
        let (start, end) = self.bounds(current, total_items);
        Page {
            items: &items[start..end],
            page: current,
            total_pages: self.total_pages(total_items),
            total_items,
            start,
        }
    }
}

// ==========================================
// Page - 单页结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 首条记录在全集中的下标
    pub start: usize,
}

impl<'a, T> Page<'a, T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
