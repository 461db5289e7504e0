// ==========================================
// SupplySight 库存驾驶舱 - 筛选状态
// ==========================================
// 归属: 视图层瞬态状态,不持久化
// ==========================================

use crate::domain::types::{DateRange, StatusFilter, WarehouseFilter};

/// 驾驶舱筛选条件
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Filters {
    /// 自由文本搜索（名称 / SKU / ID,不区分大小写）
    pub search: String,
    pub warehouse: WarehouseFilter,
    pub status: StatusFilter,
    /// 趋势图日期范围（不影响产品列表）
    pub date_range: DateRange,
}

impl Filters {
    /// 下发给后端的搜索参数（空白不下发）
    pub fn search_param(&self) -> Option<String> {
        let trimmed = self.search.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}
