// ==========================================
// SupplySight 库存驾驶舱 - 离线沙箱数据源
// ==========================================
// 职责: 以 SQLite 仓储复现后端解析器语义,供测试 / 演示 / 离线使用
// - 产品筛选: 复用 engine::filter（与客户端求值器同一实现）
// - 趋势: 按当前产品合计合成逐日样本
// - 汇总: engine::metrics
// - 变更: 仓储层单事务完成,业务拒绝映射为 GatewayError::Rejected
// 不暴露任何网络接口
// ==========================================

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::client::error::{GatewayError, GatewayResult};
use crate::client::operations::{ListKpis, ListProducts, Operation, TransferStock, UpdateDemand};
use crate::client::InventoryGateway;
use crate::domain::filters::Filters;
use crate::domain::kpi::{KpiPoint, KpiSummary};
use crate::domain::product::{Product, Warehouse};
use crate::domain::types::{DateRange, StatusFilter, WarehouseFilter};
use crate::engine::{compute_summary, filter_products};
use crate::repository::error::RepositoryError;
use crate::repository::inventory_repo::InventoryRepository;

// ==========================================
// SandboxGateway
// ==========================================
pub struct SandboxGateway {
    repo: Arc<InventoryRepository>,
    // 固定"今天",测试用
    today: Option<NaiveDate>,
    // 模拟网络延迟
    latency: Option<Duration>,
}

impl SandboxGateway {
    pub fn new(repo: Arc<InventoryRepository>) -> Self {
        Self {
            repo,
            today: None,
            latency: None,
        }
    }

    /// 固定趋势的截止日期
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// 每次调用前等待给定时长
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn repository(&self) -> &Arc<InventoryRepository> {
        &self.repo
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

/// 由查询变量还原筛选条件
///
/// 未知状态值按"不筛选"处理,与后端一致
fn filters_from_variables(op: &ListProducts) -> Filters {
    let status = match op.status.as_deref() {
        Some(raw) => StatusFilter::from_str(raw).unwrap_or_else(|e| {
            tracing::warn!(status = raw, error = %e, "未知状态筛选值,忽略");
            StatusFilter::All
        }),
        None => StatusFilter::All,
    };
    let warehouse = op
        .warehouse
        .as_deref()
        .map(WarehouseFilter::from)
        .unwrap_or_default();

    Filters {
        search: op.search.clone().unwrap_or_default(),
        warehouse,
        status,
        date_range: DateRange::default(),
    }
}

/// 合成趋势样本
///
/// 第 i 天（0 起,最后一天为 today）:
/// - stock  = max(0, Σstock  + 10i - 5·days)
/// - demand = max(0, Σdemand + 8i  - 4·days)
pub fn synthesize_kpis(products: &[Product], range: DateRange, today: NaiveDate) -> Vec<KpiPoint> {
    let days = i64::from(range.days());
    let total_stock: i64 = products.iter().map(|p| i64::from(p.stock)).sum();
    let total_demand: i64 = products.iter().map(|p| i64::from(p.demand)).sum();

    (0..days)
        .map(|i| KpiPoint {
            date: today - ChronoDuration::days(days - 1 - i),
            stock: (total_stock + i * 10 - days * 5).max(0),
            demand: (total_demand + i * 8 - days * 4).max(0),
        })
        .collect()
}

/// 仓储错误 → 后端拒绝（业务类）或原样透传（基础设施类）
fn reject<O: Operation>(err: RepositoryError) -> GatewayError {
    let message = match err {
        RepositoryError::NotFound { entity, id } => format!("{} with id {} not found", entity, id),
        RepositoryError::BusinessRuleViolation(msg) => msg,
        RepositoryError::FieldValueError { field, message } => format!("{}: {}", field, message),
        other => return GatewayError::Repository(other),
    };
    tracing::info!(operation = O::NAME, reason = %message, "沙箱拒绝变更");
    GatewayError::Rejected {
        operation: O::NAME.to_string(),
        messages: vec![message],
    }
}

#[async_trait]
impl InventoryGateway for SandboxGateway {
    fn name(&self) -> &'static str {
        "sandbox"
    }

    async fn list_products(&self, op: &ListProducts) -> GatewayResult<Vec<Product>> {
        self.simulate_latency().await;
        let products = self.repo.list_products()?;
        Ok(filter_products(&products, &filters_from_variables(op)))
    }

    async fn list_warehouses(&self) -> GatewayResult<Vec<Warehouse>> {
        self.simulate_latency().await;
        Ok(self.repo.list_warehouses()?)
    }

    async fn list_kpis(&self, op: &ListKpis) -> GatewayResult<Vec<KpiPoint>> {
        self.simulate_latency().await;
        let products = self.repo.list_products()?;
        Ok(synthesize_kpis(&products, op.range, self.today()))
    }

    async fn get_kpi_summary(&self) -> GatewayResult<KpiSummary> {
        self.simulate_latency().await;
        let products = self.repo.list_products()?;
        Ok(compute_summary(&products))
    }

    async fn update_demand(&self, op: &UpdateDemand) -> GatewayResult<Product> {
        self.simulate_latency().await;
        self.repo
            .update_demand(&op.id, op.demand)
            .map_err(reject::<UpdateDemand>)
    }

    async fn transfer_stock(&self, op: &TransferStock) -> GatewayResult<Product> {
        self.simulate_latency().await;
        self.repo
            .transfer_stock(&op.id, &op.from_warehouse, &op.to_warehouse, op.qty)
            .map_err(reject::<TransferStock>)
    }
}
