// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层/视图层集成测试的通用辅助函数
// - ApiTestEnv: 临时数据库 + 演示数据 + 沙箱数据源 + DashboardApi
// - RecordingGateway: 包装任意数据源,记录调用次数,可按搜索词/产品为查询和变更加延迟
// ==========================================

#![allow(dead_code)]

#[path = "../test_helpers.rs"]
mod test_helpers;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::NamedTempFile;

use supplysight_dashboard::api::DashboardApi;
use supplysight_dashboard::client::error::GatewayResult;
use supplysight_dashboard::client::{
    InventoryGateway, ListKpis, ListProducts, SandboxGateway, TransferStock, UpdateDemand,
};
use supplysight_dashboard::db::open_sqlite_connection;
use supplysight_dashboard::domain::{KpiPoint, KpiSummary, Product, Warehouse};
use supplysight_dashboard::repository::seed::{demo_dataset, reset_with, SeedDataset};
use supplysight_dashboard::repository::InventoryRepository;

pub use test_helpers::test_today;

// ==========================================
// RecordingGateway
// ==========================================

/// 调用计数
#[derive(Debug, Default)]
pub struct CallCounts {
    pub list_products: AtomicUsize,
    pub list_warehouses: AtomicUsize,
    pub list_kpis: AtomicUsize,
    pub get_kpi_summary: AtomicUsize,
    pub update_demand: AtomicUsize,
    pub transfer_stock: AtomicUsize,
}

impl CallCounts {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn mutations(&self) -> usize {
        Self::get(&self.update_demand) + Self::get(&self.transfer_stock)
    }
}

pub struct RecordingGateway {
    inner: Arc<dyn InventoryGateway>,
    pub calls: CallCounts,
    // 搜索词 → 产品查询的额外延迟
    product_delays: Mutex<HashMap<String, Duration>>,
    // 产品ID → 变更的额外延迟
    mutation_delays: Mutex<HashMap<String, Duration>>,
}

impl RecordingGateway {
    pub fn new(inner: Arc<dyn InventoryGateway>) -> Self {
        Self {
            inner,
            calls: CallCounts::default(),
            product_delays: Mutex::new(HashMap::new()),
            mutation_delays: Mutex::new(HashMap::new()),
        }
    }

    /// 带该搜索词的产品查询延迟返回
    pub fn delay_products_for(&self, search: &str, delay: Duration) {
        self.product_delays
            .lock()
            .unwrap()
            .insert(search.to_string(), delay);
    }

    /// 针对该产品的变更延迟返回
    pub fn delay_mutations_for(&self, product_id: &str, delay: Duration) {
        self.mutation_delays
            .lock()
            .unwrap()
            .insert(product_id.to_string(), delay);
    }

    async fn mutation_delay(&self, product_id: &str) {
        let delay = self.mutation_delays.lock().unwrap().get(product_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl InventoryGateway for RecordingGateway {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn list_products(&self, op: &ListProducts) -> GatewayResult<Vec<Product>> {
        self.calls.list_products.fetch_add(1, Ordering::SeqCst);
        let search = op.search.clone().unwrap_or_default();
        let delay = self.product_delays.lock().unwrap().get(&search).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.list_products(op).await
    }

    async fn list_warehouses(&self) -> GatewayResult<Vec<Warehouse>> {
        self.calls.list_warehouses.fetch_add(1, Ordering::SeqCst);
        self.inner.list_warehouses().await
    }

    async fn list_kpis(&self, op: &ListKpis) -> GatewayResult<Vec<KpiPoint>> {
        self.calls.list_kpis.fetch_add(1, Ordering::SeqCst);
        self.inner.list_kpis(op).await
    }

    async fn get_kpi_summary(&self) -> GatewayResult<KpiSummary> {
        self.calls.get_kpi_summary.fetch_add(1, Ordering::SeqCst);
        self.inner.get_kpi_summary().await
    }

    async fn update_demand(&self, op: &UpdateDemand) -> GatewayResult<Product> {
        self.calls.update_demand.fetch_add(1, Ordering::SeqCst);
        self.mutation_delay(&op.id).await;
        self.inner.update_demand(op).await
    }

    async fn transfer_stock(&self, op: &TransferStock) -> GatewayResult<Product> {
        self.calls.transfer_stock.fetch_add(1, Ordering::SeqCst);
        self.mutation_delay(&op.id).await;
        self.inner.transfer_stock(op).await
    }
}

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含仓储、沙箱数据源（外包 RecordingGateway）与 DashboardApi
pub struct ApiTestEnv {
    pub db_path: String,
    pub repo: Arc<InventoryRepository>,
    pub gateway: Arc<RecordingGateway>,
    pub dashboard_api: Arc<DashboardApi>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 演示数据环境
    pub fn new() -> Result<Self, String> {
        Self::with_dataset(demo_dataset())
    }

    /// 指定数据集环境
    ///
    /// # 说明
    /// - 使用临时数据库文件
    /// - 缓存不过期（便于断言命中/失效）
    pub fn with_dataset(dataset: SeedDataset) -> Result<Self, String> {
        supplysight_dashboard::logging::init_test();

        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("创建测试数据库失败: {}", e))?;

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let repo = Arc::new(InventoryRepository::new(Arc::new(Mutex::new(conn))));
        reset_with(&repo, &dataset).map_err(|e| format!("写入种子数据失败: {}", e))?;

        let sandbox = SandboxGateway::new(repo.clone()).with_today(test_today());
        let gateway = Arc::new(RecordingGateway::new(Arc::new(sandbox)));
        let dashboard_api = Arc::new(DashboardApi::new(gateway.clone(), None));

        Ok(Self {
            db_path,
            repo,
            gateway,
            dashboard_api,
            _temp_file: temp_file,
        })
    }

    pub fn product(&self, id: &str) -> Product {
        self.repo
            .find_product(id)
            .expect("查询产品失败")
            .expect("产品不存在")
    }
}
