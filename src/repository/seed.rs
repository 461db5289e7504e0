// ==========================================
// SupplySight 库存驾驶舱 - 沙箱种子数据
// ==========================================
// 来源: 内置演示数据 / CSV 文件
// CSV 表头:
// - warehouses: code,name,city,country
// - products:   id,name,sku,warehouse,stock,demand
// ==========================================

use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use crate::domain::product::{Product, Warehouse};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::inventory_repo::InventoryRepository;

/// 种子数据集
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedDataset {
    pub warehouses: Vec<Warehouse>,
    pub products: Vec<Product>,
}

impl SeedDataset {
    /// 校验: 仓库代码/产品ID唯一,产品引用的仓库必须存在
    pub fn validate(&self) -> RepositoryResult<()> {
        let mut codes = HashSet::new();
        for w in &self.warehouses {
            if w.code.trim().is_empty() {
                return Err(RepositoryError::FieldValueError {
                    field: "code".to_string(),
                    message: "仓库代码不能为空".to_string(),
                });
            }
            if !codes.insert(w.code.as_str()) {
                return Err(RepositoryError::UniqueConstraintViolation(format!(
                    "仓库代码重复: {}",
                    w.code
                )));
            }
        }

        let mut ids = HashSet::new();
        for p in &self.products {
            if p.id.trim().is_empty() {
                return Err(RepositoryError::FieldValueError {
                    field: "id".to_string(),
                    message: "产品ID不能为空".to_string(),
                });
            }
            if !ids.insert(p.id.as_str()) {
                return Err(RepositoryError::UniqueConstraintViolation(format!(
                    "产品ID重复: {}",
                    p.id
                )));
            }
            if !codes.contains(p.warehouse.as_str()) {
                return Err(RepositoryError::ForeignKeyViolation(format!(
                    "产品{}引用了不存在的仓库{}",
                    p.id, p.warehouse
                )));
            }
        }
        Ok(())
    }
}

/// 内置演示数据（3 个仓库,12 个产品）
pub fn demo_dataset() -> SeedDataset {
    let warehouse = |code: &str, name: &str, city: &str| Warehouse {
        code: code.to_string(),
        name: name.to_string(),
        city: city.to_string(),
        country: "India".to_string(),
    };
    let product = |id: &str, name: &str, sku: &str, wh: &str, stock: u32, demand: u32| Product {
        id: id.to_string(),
        name: name.to_string(),
        sku: sku.to_string(),
        warehouse: wh.to_string(),
        stock,
        demand,
    };

    SeedDataset {
        warehouses: vec![
            warehouse("BLR-A", "Bangalore Warehouse A", "Bangalore"),
            warehouse("PNQ-C", "Pune Warehouse C", "Pune"),
            warehouse("DEL-B", "Delhi Warehouse B", "Delhi"),
        ],
        products: vec![
            product("P-1001", "12mm Hex Bolt", "HEX-12-100", "BLR-A", 180, 120),
            product("P-1002", "Steel Washer", "WSR-08-500", "BLR-A", 50, 80),
            product("P-1003", "M8 Nut", "NUT-08-200", "PNQ-C", 80, 80),
            product("P-1004", "Bearing 608ZZ", "BRG-608-50", "DEL-B", 24, 120),
            product("P-1005", "Socket Head Cap Screw", "SHCS-06-75", "BLR-A", 200, 150),
            product("P-1006", "Flat Washer", "FWR-10-300", "PNQ-C", 90, 95),
            product("P-1007", "Ball Bearing 6202", "BB-6202-25", "DEL-B", 45, 60),
            product("P-1008", "Allen Key Set", "AK-SET-01", "BLR-A", 30, 25),
            product("P-1009", "Spring Washer", "SPW-08-400", "PNQ-C", 120, 140),
            product("P-1010", "Thrust Bearing", "TB-51100", "DEL-B", 15, 35),
            product("P-1011", "Hex Nut M10", "HN-M10-250", "BLR-A", 300, 280),
            product("P-1012", "Machine Screw", "MS-04-150", "PNQ-C", 75, 75),
        ],
    }
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> RepositoryResult<Vec<T>> {
    if !path.exists() {
        return Err(RepositoryError::ImportError(format!(
            "文件不存在: {}",
            path.display()
        )));
    }

    let file = File::open(path)
        .map_err(|e| RepositoryError::ImportError(format!("{}: {}", path.display(), e)))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut records = Vec::new();
    for (row_idx, result) in reader.deserialize().enumerate() {
        // 行号从 2 开始（第 1 行为表头）
        let record: T = result.map_err(|e| {
            RepositoryError::ImportError(format!("第{}行解析失败: {}", row_idx + 2, e))
        })?;
        records.push(record);
    }
    Ok(records)
}

/// 从 CSV 文件读取仓库
pub fn load_warehouses_csv(path: &Path) -> RepositoryResult<Vec<Warehouse>> {
    read_csv(path)
}

/// 从 CSV 文件读取产品
pub fn load_products_csv(path: &Path) -> RepositoryResult<Vec<Product>> {
    read_csv(path)
}

/// 从 CSV 文件组装种子数据集
pub fn load_dataset_csv(warehouses_csv: &Path, products_csv: &Path) -> RepositoryResult<SeedDataset> {
    let dataset = SeedDataset {
        warehouses: load_warehouses_csv(warehouses_csv)?,
        products: load_products_csv(products_csv)?,
    };
    dataset.validate()?;
    Ok(dataset)
}

/// 用数据集覆盖仓储内容
pub fn reset_with(repo: &InventoryRepository, dataset: &SeedDataset) -> RepositoryResult<(usize, usize)> {
    dataset.validate()?;
    let counts = repo.replace_all(&dataset.warehouses, &dataset.products)?;
    tracing::info!(warehouses = counts.0, products = counts.1, "沙箱数据已重置");
    Ok(counts)
}

/// 仓储为空时写入数据集
///
/// # 返回
/// - Ok(true): 已写入
/// - Ok(false): 仓储已有数据,未改动
pub fn seed_if_empty(repo: &InventoryRepository, dataset: &SeedDataset) -> RepositoryResult<bool> {
    if repo.count_products()? > 0 || !repo.list_warehouses()?.is_empty() {
        return Ok(false);
    }
    reset_with(repo, dataset)?;
    Ok(true)
}
