// ==========================================
// SupplySight 库存驾驶舱 - 领域模型层
// ==========================================
// 职责: 定义产品、仓库、KPI、筛选条件等共享形状
// 红线: 不含数据访问逻辑,不含计算逻辑
// ==========================================

pub mod filters;
pub mod kpi;
pub mod product;
pub mod types;

// 重导出核心类型
pub use filters::Filters;
pub use kpi::{KpiPoint, KpiSummary};
pub use product::{Product, Warehouse};
pub use types::{DateRange, ParseFilterError, ProductStatus, StatusFilter, WarehouseFilter};
