// ==========================================
// SupplySight 库存驾驶舱 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::db::open_sqlite_connection;
use crate::domain::types::DateRange;
use crate::engine::pagination::DEFAULT_PAGE_SIZE;

// ==========================================
// DataSource - 数据源
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// 远程 GraphQL 服务
    #[default]
    Graphql,
    /// 本地 SQLite 沙箱
    Sandbox,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Graphql => "graphql",
            DataSource::Sandbox => "sandbox",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graphql" => Ok(DataSource::Graphql),
            "sandbox" => Ok(DataSource::Sandbox),
            other => Err(format!("未知数据源: {}", other)),
        }
    }
}

// ==========================================
// DashboardConfig - 驾驶舱运行配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub data_source: DataSource,
    pub api_endpoint: String,
    pub api_timeout_ms: u64,
    pub page_size: usize,
    pub default_range: DateRange,
    /// 0 表示不过期
    pub cache_ttl_secs: u64,
    pub locale: String,
    pub sandbox_products_csv: Option<PathBuf>,
    pub sandbox_warehouses_csv: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_source: DataSource::Graphql,
            api_endpoint: defaults::API_ENDPOINT.to_string(),
            api_timeout_ms: defaults::API_TIMEOUT_MS,
            page_size: DEFAULT_PAGE_SIZE,
            default_range: DateRange::default(),
            cache_ttl_secs: defaults::CACHE_TTL_SECS,
            locale: defaults::LOCALE.to_string(),
            sandbox_products_csv: None,
            sandbox_warehouses_csv: None,
        }
    }
}

impl DashboardConfig {
    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        if self.cache_ttl_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.cache_ttl_secs))
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 读取配置并解析,缺失或格式错误时使用默认值
    fn parsed_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T::Err: fmt::Display,
    {
        match self.get_global_config_value(key)? {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(e) => {
                    tracing::warn!(key, value = %raw, error = %e, "配置值无效,使用默认值");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    fn optional_path(&self, key: &str) -> Result<Option<PathBuf>, Box<dyn Error>> {
        Ok(self
            .get_global_config_value(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from))
    }

    /// 加载驾驶舱运行配置
    pub fn load_dashboard_config(&self) -> Result<DashboardConfig, Box<dyn Error>> {
        let defaults = DashboardConfig::default();

        let page_size = self.parsed_or(config_keys::PAGE_SIZE, defaults.page_size)?;
        let page_size = if page_size == 0 {
            tracing::warn!("dashboard.page_size 不能为 0,使用默认值");
            defaults.page_size
        } else {
            page_size
        };

        let api_endpoint = self
            .get_global_config_value(config_keys::API_ENDPOINT)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_endpoint);

        let locale = self
            .get_global_config_value(config_keys::UI_LOCALE)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.locale);

        Ok(DashboardConfig {
            data_source: self.parsed_or(config_keys::DATA_SOURCE, defaults.data_source)?,
            api_endpoint,
            api_timeout_ms: self.parsed_or(config_keys::API_TIMEOUT_MS, defaults.api_timeout_ms)?,
            page_size,
            default_range: self.parsed_or(config_keys::DEFAULT_RANGE, defaults.default_range)?,
            cache_ttl_secs: self.parsed_or(config_keys::CACHE_TTL_SECS, defaults.cache_ttl_secs)?,
            locale,
            sandbox_products_csv: self.optional_path(config_keys::SANDBOX_PRODUCTS_CSV)?,
            sandbox_warehouses_csv: self.optional_path(config_keys::SANDBOX_WAREHOUSES_CSV)?,
        })
    }
}

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const API_ENDPOINT: &str = "http://localhost:8000/graphql";
    pub const API_TIMEOUT_MS: u64 = 10_000;
    pub const CACHE_TTL_SECS: u64 = 60;
    pub const LOCALE: &str = "zh-CN";
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 数据源
    pub const DATA_SOURCE: &str = "data_source";
    pub const API_ENDPOINT: &str = "api.endpoint";
    pub const API_TIMEOUT_MS: &str = "api.timeout_ms";

    // 驾驶舱
    pub const PAGE_SIZE: &str = "dashboard.page_size";
    pub const DEFAULT_RANGE: &str = "dashboard.default_range";

    // 缓存
    pub const CACHE_TTL_SECS: &str = "cache.ttl_secs";

    // 界面
    pub const UI_LOCALE: &str = "ui.locale";

    // 沙箱种子数据
    pub const SANDBOX_PRODUCTS_CSV: &str = "sandbox.products_csv";
    pub const SANDBOX_WAREHOUSES_CSV: &str = "sandbox.warehouses_csv";
}
