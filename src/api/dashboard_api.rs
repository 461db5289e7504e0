// ==========================================
// SupplySight 库存驾驶舱 - 驾驶舱 API
// ==========================================
// 职责: 封装数据接口 + 查询缓存,提供驾驶舱查询与两类变更操作
// 架构: 视图层 → DashboardApi → InventoryGateway（GraphQL / 沙箱）
// 缓存: 按 (操作名, 变量) 缓存查询结果;任一变更成功后失效产品派生查询
// ==========================================

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{ActionValidator, TransferStockRequest};
use crate::client::cache::{CacheKey, QueryCache};
use crate::client::error::GatewayResult;
use crate::client::operations::{
    GetKpiSummary, ListKpis, ListProducts, ListWarehouses, Operation, OperationKind, TransferStock,
    UpdateDemand, PRODUCT_DERIVED_QUERIES,
};
use crate::client::InventoryGateway;
use crate::domain::filters::Filters;
use crate::domain::kpi::{KpiPoint, KpiSummary};
use crate::domain::product::{Product, Warehouse};
use crate::domain::types::DateRange;

/// 驾驶舱首屏数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub products: Vec<Product>,
    pub warehouses: Vec<Warehouse>,
    pub kpis: Vec<KpiPoint>,
    pub summary: KpiSummary,
}

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================

/// 驾驶舱API
///
/// 职责：
/// 1. 查询: 产品（带筛选）、仓库、趋势、汇总,经缓存
/// 2. 变更: 需求调整、跨仓调拨,提交前复核输入,成功后失效缓存
/// 3. 后端拒绝原样上抛,由视图层展示
pub struct DashboardApi {
    gateway: Arc<dyn InventoryGateway>,
    cache: Mutex<QueryCache>,
}

impl DashboardApi {
    /// 创建新的DashboardApi实例
    ///
    /// # 参数
    /// - gateway: 数据接口实现
    /// - cache_ttl: 缓存有效期（None 表示不过期）
    pub fn new(gateway: Arc<dyn InventoryGateway>, cache_ttl: Option<Duration>) -> Self {
        Self {
            gateway,
            cache: Mutex::new(QueryCache::new(cache_ttl)),
        }
    }

    pub fn gateway_name(&self) -> &'static str {
        self.gateway.name()
    }

    fn lock_cache(&self) -> ApiResult<MutexGuard<'_, QueryCache>> {
        self.cache
            .lock()
            .map_err(|e| ApiError::InternalError(format!("缓存锁获取失败: {}", e)))
    }

    /// 经缓存执行查询
    ///
    /// 发出请求前领取票据;请求期间若被变更失效,响应不写回缓存
    async fn cached_query<O, F, Fut>(&self, op: &O, fetch: F) -> ApiResult<O::Output>
    where
        O: Operation,
        F: FnOnce() -> Fut,
        Fut: Future<Output = GatewayResult<O::Output>>,
    {
        ensure_kind::<O>(OperationKind::Query)?;
        let key = CacheKey::for_operation(op)
            .map_err(|e| ApiError::InternalError(format!("变量序列化失败: {}", e)))?;

        let ticket = {
            let mut cache = self.lock_cache()?;
            if let Some(hit) = cache.get::<O::Output>(&key) {
                tracing::debug!(operation = O::NAME, "缓存命中");
                return Ok(hit);
            }
            cache.ticket(key)
        };

        let value = fetch().await.map_err(|e| {
            tracing::warn!(operation = O::NAME, error = %e, "查询失败");
            ApiError::from(e)
        })?;

        self.lock_cache()?.put(ticket, &value);
        Ok(value)
    }

    /// 执行变更;成功后失效产品派生查询,失败原样上抛
    async fn run_mutation<O, F, Fut>(&self, send: F) -> ApiResult<O::Output>
    where
        O: Operation,
        F: FnOnce() -> Fut,
        Fut: Future<Output = GatewayResult<O::Output>>,
    {
        ensure_kind::<O>(OperationKind::Mutation)?;
        let value = send().await.map_err(|e| {
            tracing::warn!(operation = O::NAME, error = %e, "变更失败");
            ApiError::from(e)
        })?;

        let dropped = self.lock_cache()?.invalidate_operations(&PRODUCT_DERIVED_QUERIES);
        tracing::debug!(operation = O::NAME, dropped, "变更成功,已失效产品派生查询");
        Ok(value)
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 查询产品（筛选下发后端）
    #[instrument(skip(self))]
    pub async fn list_products(&self, filters: &Filters) -> ApiResult<Vec<Product>> {
        let op = ListProducts::from_filters(filters);
        self.cached_query(&op, || self.gateway.list_products(&op))
            .await
    }

    /// 查询仓库
    #[instrument(skip(self))]
    pub async fn list_warehouses(&self) -> ApiResult<Vec<Warehouse>> {
        self.cached_query(&ListWarehouses {}, || self.gateway.list_warehouses())
            .await
    }

    /// 查询趋势
    #[instrument(skip(self))]
    pub async fn list_kpis(&self, range: DateRange) -> ApiResult<Vec<KpiPoint>> {
        let op = ListKpis { range };
        self.cached_query(&op, || self.gateway.list_kpis(&op)).await
    }

    /// 查询汇总（卡片唯一数据源）
    #[instrument(skip(self))]
    pub async fn get_kpi_summary(&self) -> ApiResult<KpiSummary> {
        self.cached_query(&GetKpiSummary {}, || self.gateway.get_kpi_summary())
            .await
    }

    /// 并发加载首屏数据
    #[instrument(skip(self))]
    pub async fn load_snapshot(
        &self,
        filters: &Filters,
        range: DateRange,
    ) -> ApiResult<DashboardSnapshot> {
        let (products, warehouses, kpis, summary) = futures::join!(
            self.list_products(filters),
            self.list_warehouses(),
            self.list_kpis(range),
            self.get_kpi_summary(),
        );

        Ok(DashboardSnapshot {
            products: products?,
            warehouses: warehouses?,
            kpis: kpis?,
            summary: summary?,
        })
    }

    // ==========================================
    // 变更接口
    // ==========================================

    /// 调整需求
    ///
    /// # 参数
    /// - product_id: 产品ID
    /// - demand: 新需求（非负,且不超过线上 Int 范围）
    ///
    /// # 返回
    /// - Ok(Product): 后端返回的更新后产品
    /// - Err(ApiError): 输入非法（未发起请求）或远程失败
    #[instrument(skip(self))]
    pub async fn update_demand(&self, product_id: &str, demand: i64) -> ApiResult<Product> {
        if product_id.trim().is_empty() {
            return Err(ApiError::InvalidInput(crate::i18n::t(
                "validation.product_id_missing",
            )));
        }
        let demand = ActionValidator::check_demand(demand)?;

        let op = UpdateDemand {
            id: product_id.to_string(),
            demand,
        };
        let product = self
            .run_mutation::<UpdateDemand, _, _>(|| self.gateway.update_demand(&op))
            .await?;
        tracing::info!(product_id, demand, "需求已更新");
        Ok(product)
    }

    /// 跨仓调拨
    ///
    /// # 参数
    /// - request: 已通过表单校验的调拨请求
    ///
    /// # 返回
    /// - Ok(Product): 目标仓库的产品行
    /// - Err(ApiError): 输入非法（未发起请求）或远程失败（含后端拒绝）
    #[instrument(skip(self))]
    pub async fn transfer_stock(&self, request: &TransferStockRequest) -> ApiResult<Product> {
        ActionValidator::check_transfer_request(request)?;

        let op = TransferStock {
            id: request.product_id.clone(),
            from_warehouse: request.from_warehouse.clone(),
            to_warehouse: request.to_warehouse.clone(),
            qty: request.qty,
        };
        let product = self
            .run_mutation::<TransferStock, _, _>(|| self.gateway.transfer_stock(&op))
            .await?;
        tracing::info!(
            product_id = %request.product_id,
            from = %request.from_warehouse,
            to = %request.to_warehouse,
            qty = request.qty,
            "调拨完成"
        );
        Ok(product)
    }

    /// 清空全部缓存（手动刷新）
    pub fn invalidate_all(&self) -> ApiResult<()> {
        self.lock_cache()?.clear();
        Ok(())
    }
}

/// 操作类型与调用路径一致（查询走缓存,变更走失效）
fn ensure_kind<O: Operation>(expected: OperationKind) -> ApiResult<()> {
    if O::KIND == expected {
        Ok(())
    } else {
        Err(ApiError::InternalError(format!(
            "{} 是 {:?},不能按 {:?} 执行",
            O::NAME,
            O::KIND,
            expected
        )))
    }
}
