// ==========================================
// SupplySight 库存驾驶舱 - 应用状态
// ==========================================
// 职责: 装配配置、数据源与 API 实例
// ==========================================

use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::DashboardApi;
use crate::client::{GraphqlGateway, InventoryGateway, SandboxGateway};
use crate::config::{ConfigManager, DashboardConfig, DataSource};
use crate::repository::inventory_repo::InventoryRepository;
use crate::repository::seed::{demo_dataset, load_dataset_csv, seed_if_empty, SeedDataset};

/// 应用状态
///
/// 包含配置、仓储与驾驶舱 API
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 生效配置
    pub config: DashboardConfig,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 沙箱库存仓储（data_source=graphql 时不参与查询）
    pub inventory_repo: Arc<InventoryRepository>,

    /// 驾驶舱API
    pub dashboard_api: Arc<DashboardApi>,
}

impl AppState {
    /// 创建新的AppState实例（配置取自 config_kv）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::build(db_path, |config| config)
    }

    /// 创建AppState,并在加载配置后应用覆写（命令行参数等）
    pub fn with_overrides<F>(db_path: String, overrides: F) -> Result<Self, String>
    where
        F: FnOnce(DashboardConfig) -> DashboardConfig,
    {
        Self::build(db_path, overrides)
    }

    fn build<F>(db_path: String, overrides: F) -> Result<Self, String>
    where
        F: FnOnce(DashboardConfig) -> DashboardConfig,
    {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let mut conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::db::ensure_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        crate::db::install_slow_sql_logging(&mut conn);
        let conn: Arc<Mutex<Connection>> = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let config = overrides(
            config_manager
                .load_dashboard_config()
                .map_err(|e| format!("配置加载失败: {}", e))?,
        );
        crate::i18n::set_locale(&config.locale);

        // ==========================================
        // 数据源
        // ==========================================
        let inventory_repo = Arc::new(InventoryRepository::new(conn.clone()));
        let gateway: Arc<dyn InventoryGateway> = match config.data_source {
            DataSource::Sandbox => {
                let dataset = sandbox_dataset(&config)?;
                let seeded = seed_if_empty(&inventory_repo, &dataset)
                    .map_err(|e| format!("沙箱种子数据写入失败: {}", e))?;
                if seeded {
                    tracing::info!(
                        warehouses = dataset.warehouses.len(),
                        products = dataset.products.len(),
                        "沙箱数据库为空,已写入种子数据"
                    );
                }
                Arc::new(SandboxGateway::new(inventory_repo.clone()))
            }
            DataSource::Graphql => Arc::new(
                GraphqlGateway::new(config.api_endpoint.clone(), config.api_timeout())
                    .map_err(|e| format!("无法创建GraphQL客户端: {}", e))?,
            ),
        };
        tracing::info!(
            data_source = %config.data_source,
            endpoint = %config.api_endpoint,
            "数据源已就绪"
        );

        let dashboard_api = Arc::new(DashboardApi::new(gateway, config.cache_ttl()));

        Ok(Self {
            db_path,
            config,
            config_manager,
            inventory_repo,
            dashboard_api,
        })
    }
}

/// 沙箱种子数据: 配置了 CSV 时从文件导入,否则使用内置演示数据
fn sandbox_dataset(config: &DashboardConfig) -> Result<SeedDataset, String> {
    match (&config.sandbox_warehouses_csv, &config.sandbox_products_csv) {
        (Some(warehouses), Some(products)) => load_dataset_csv(warehouses, products)
            .map_err(|e| format!("沙箱 CSV 导入失败: {}", e)),
        (None, None) => Ok(demo_dataset()),
        _ => Err("sandbox.warehouses_csv 与 sandbox.products_csv 需同时配置".to_string()),
    }
}

/// 获取默认数据库路径
///
/// 优先级: SUPPLYSIGHT_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("SUPPLYSIGHT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./supplysight.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("supplysight-dashboard");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("supplysight.db"),
            Err(e) => tracing::warn!("无法创建数据目录 {}: {}", dir.display(), e),
        }
    }

    path.to_string_lossy().to_string()
}
