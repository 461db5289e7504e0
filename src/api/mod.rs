// ==========================================
// SupplySight 库存驾驶舱 - API 层
// ==========================================
// 职责: 提供驾驶舱业务接口,供视图控制器与命令行调用
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod validator;

// 重导出核心类型
pub use dashboard_api::{DashboardApi, DashboardSnapshot};
pub use error::{ApiError, ApiResult, ValidationViolation};
pub use validator::{ActionValidator, TransferStockRequest};
