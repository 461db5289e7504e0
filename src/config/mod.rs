// ==========================================
// SupplySight 库存驾驶舱 - 配置层
// ==========================================
// 职责: 运行配置管理（数据源、端点、分页、缓存、语言）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, DashboardConfig, DataSource};
