// ==========================================
// SupplySight 库存驾驶舱 - 数据仓储层
// ==========================================
// 职责: 离线沙箱数据源的数据访问（SQLite）
// 红线: Repository 不含展示逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod inventory_repo;
pub mod seed;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use inventory_repo::InventoryRepository;
pub use seed::{demo_dataset, SeedDataset};
