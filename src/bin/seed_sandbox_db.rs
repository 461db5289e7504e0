// 重置离线沙箱数据库并写入种子数据
//
// 用法:
//   seed_sandbox_db [DB_PATH] [WAREHOUSES_CSV PRODUCTS_CSV]
// 不给 CSV 时写入内置演示数据; 完成后把 data_source 切换为 sandbox

use chrono::Local;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use supplysight_dashboard::app::get_default_db_path;
use supplysight_dashboard::config::{config_keys, ConfigManager, DataSource};
use supplysight_dashboard::db::{ensure_schema, open_sqlite_connection};
use supplysight_dashboard::repository::seed::{demo_dataset, load_dataset_csv, reset_with};
use supplysight_dashboard::repository::InventoryRepository;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    let db_path = args.get(1).cloned().unwrap_or_else(get_default_db_path);

    let dataset = match (args.get(2), args.get(3)) {
        (Some(warehouses), Some(products)) => {
            load_dataset_csv(Path::new(warehouses), Path::new(products))?
        }
        (Some(_), None) => return Err("需要同时提供仓库与产品 CSV".into()),
        _ => demo_dataset(),
    };

    backup_and_reset_db(&db_path)?;

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let repo = InventoryRepository::new(conn.clone());
    let (warehouses, products) = reset_with(&repo, &dataset)?;

    let config = ConfigManager::from_connection(conn)?;
    config.set_global_config_value(config_keys::DATA_SOURCE, DataSource::Sandbox.as_str())?;

    println!("db: {}", db_path);
    println!("warehouses: {}", warehouses);
    println!("products:   {}", products);
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}
