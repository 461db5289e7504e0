// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use std::error::Error;
use tempfile::NamedTempFile;

use supplysight_dashboard::db::{ensure_schema, open_sqlite_connection};
use supplysight_dashboard::domain::{Product, Warehouse};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 趋势截止日期（固定,保证断言稳定）
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

pub fn product(id: &str, warehouse: &str, stock: u32, demand: u32) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Item {}", id),
        sku: format!("SKU-{}", id),
        warehouse: warehouse.to_string(),
        stock,
        demand,
    }
}

pub fn warehouse(code: &str) -> Warehouse {
    Warehouse {
        code: code.to_string(),
        name: format!("{} Warehouse", code),
        city: "Bangalore".to_string(),
        country: "India".to_string(),
    }
}
