// ==========================================
// SupplySight 库存驾驶舱 - 视图层
// ==========================================
// store: 状态机（reduce）
// screen: 画面组合
// render: 文本渲染
// ==========================================

pub mod render;
pub mod screen;
pub mod store;

pub use render::render;
pub use screen::DashboardScreen;
pub use store::{
    reduce, DrawerState, Effect, Failure, Notification, NotificationLevel, PendingMutation,
    RequestId, Slot, ViewAction, ViewState,
};
