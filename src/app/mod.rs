// ==========================================
// SupplySight 库存驾驶舱 - 应用层
// ==========================================
// 职责: 装配应用状态,驱动视图状态机,解析终端命令
// ==========================================

pub mod commands;
pub mod controller;
pub mod state;
pub mod view;

// 重导出
pub use commands::{parse_command, Command, CommandError};
pub use controller::DashboardController;
pub use state::{get_default_db_path, AppState};
