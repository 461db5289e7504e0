// ==========================================
// SupplySight 库存驾驶舱 - 数据接口层
// ==========================================
// 职责: 描述并调用外部数据 API（6 个逻辑操作）
// 实现:
// - GraphqlGateway: HTTP + GraphQL（生产）
// - SandboxGateway: SQLite 离线沙箱（测试 / 演示）
// ==========================================

pub mod cache;
pub mod error;
pub mod graphql;
pub mod operations;
pub mod sandbox;

use async_trait::async_trait;

use crate::domain::kpi::{KpiPoint, KpiSummary};
use crate::domain::product::{Product, Warehouse};

// 重导出核心类型
pub use cache::{CacheKey, CacheTicket, QueryCache};
pub use error::{GatewayError, GatewayResult};
pub use graphql::GraphqlGateway;
pub use operations::{
    GetKpiSummary, ListKpis, ListProducts, ListWarehouses, Operation, OperationKind,
    TransferStock, UpdateDemand,
};
pub use sandbox::SandboxGateway;

// ==========================================
// InventoryGateway - 外部数据 API
// ==========================================
// 后端拥有业务规则与持久化,客户端只发起请求
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    /// 数据源名称（日志用）
    fn name(&self) -> &'static str;

    async fn list_products(&self, op: &ListProducts) -> GatewayResult<Vec<Product>>;

    async fn list_warehouses(&self) -> GatewayResult<Vec<Warehouse>>;

    async fn list_kpis(&self, op: &ListKpis) -> GatewayResult<Vec<KpiPoint>>;

    async fn get_kpi_summary(&self) -> GatewayResult<KpiSummary>;

    async fn update_demand(&self, op: &UpdateDemand) -> GatewayResult<Product>;

    async fn transfer_stock(&self, op: &TransferStock) -> GatewayResult<Product>;
}
