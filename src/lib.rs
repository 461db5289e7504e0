// ==========================================
// SupplySight 库存驾驶舱 - 核心库
// ==========================================
// 技术栈: Rust + tokio + reqwest(GraphQL) + SQLite
// 系统定位: 库存监控驾驶舱（业务规则与持久化归后端所有）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 状态分级、指标、筛选、分页
pub mod engine;

// 数据仓储层 - 离线沙箱与种子数据
pub mod repository;

// 数据接口层 - 远程操作、缓存、GraphQL/沙箱数据源
pub mod client;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 视图状态机与终端交互
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    DateRange, Filters, KpiPoint, KpiSummary, Product, ProductStatus, StatusFilter, Warehouse,
    WarehouseFilter,
};

// 引擎
pub use engine::{classify, compute_summary, filter_products, Pager};

// 数据接口
pub use client::{GraphqlGateway, InventoryGateway, SandboxGateway};

// API
pub use api::{ApiError, ApiResult, DashboardApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "SupplySight 库存驾驶舱";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
