// ==========================================
// SupplySight 库存驾驶舱 - 引擎层
// ==========================================
// 职责: 状态分级、聚合指标、筛选、分页
// 红线: 纯函数,无 IO,无副作用
// ==========================================

pub mod filter;
pub mod metrics;
pub mod pagination;
pub mod status;

// 重导出核心函数与类型
pub use filter::{filter_products, matches};
pub use metrics::compute_summary;
pub use pagination::{Page, Pager, DEFAULT_PAGE_SIZE};
pub use status::{classify, classify_product, StatusBreakdown};
