// ==========================================
// SupplySight 库存驾驶舱 - 库存仓储（离线沙箱数据源）
// ==========================================
// 表: warehouse / product
// 红线: Repository 只做数据映射与单条变更的原子性,
//       变更规则与后端接口保持一致（调拨/需求调整）
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::domain::product::{Product, Warehouse};
use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// InventoryRepository - 库存仓储
// ==========================================
pub struct InventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

fn map_product(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        sku: row.get(2)?,
        warehouse: row.get(3)?,
        stock: row.get(4)?,
        demand: row.get(5)?,
    })
}

fn map_warehouse(row: &Row<'_>) -> rusqlite::Result<Warehouse> {
    Ok(Warehouse {
        code: row.get(0)?,
        name: row.get(1)?,
        city: row.get(2)?,
        country: row.get(3)?,
    })
}

const PRODUCT_COLUMNS: &str = "id, name, sku, warehouse, stock, demand";

fn find_product_in(conn: &Connection, id: &str) -> RepositoryResult<Option<Product>> {
    let sql = format!("SELECT {} FROM product WHERE id = ?1", PRODUCT_COLUMNS);
    Ok(conn.query_row(&sql, params![id], map_product).optional()?)
}

impl InventoryRepository {
    /// 创建新的库存仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询全部仓库（按写入顺序）
    pub fn list_warehouses(&self) -> RepositoryResult<Vec<Warehouse>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT code, name, city, country FROM warehouse ORDER BY rowid")?;
        let rows = stmt.query_map([], map_warehouse)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 查询全部产品（按写入顺序）
    pub fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM product ORDER BY rowid", PRODUCT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_product)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 按ID查询产品
    pub fn find_product(&self, id: &str) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        find_product_in(&conn, id)
    }

    /// 产品总数
    pub fn count_products(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM product", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入仓库
    pub fn insert_warehouse(&self, warehouse: &Warehouse) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO warehouse (code, name, city, country) VALUES (?1, ?2, ?3, ?4)",
            params![warehouse.code, warehouse.name, warehouse.city, warehouse.country],
        )?;
        Ok(())
    }

    /// 插入产品
    pub fn insert_product(&self, product: &Product) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO product (id, name, sku, warehouse, stock, demand) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                product.id,
                product.name,
                product.sku,
                product.warehouse,
                product.stock,
                product.demand
            ],
        )?;
        Ok(())
    }

    /// 清空并重写全部库存数据（单事务）
    ///
    /// # 返回
    /// - Ok((仓库数, 产品数))
    pub fn replace_all(
        &self,
        warehouses: &[Warehouse],
        products: &[Product],
    ) -> RepositoryResult<(usize, usize)> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM product", [])?;
        tx.execute("DELETE FROM warehouse", [])?;

        for w in warehouses {
            tx.execute(
                "INSERT INTO warehouse (code, name, city, country) VALUES (?1, ?2, ?3, ?4)",
                params![w.code, w.name, w.city, w.country],
            )?;
        }
        for p in products {
            tx.execute(
                "INSERT INTO product (id, name, sku, warehouse, stock, demand) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![p.id, p.name, p.sku, p.warehouse, p.stock, p.demand],
            )?;
        }

        tx.commit()?;
        Ok((warehouses.len(), products.len()))
    }

    /// 更新需求
    ///
    /// # 返回
    /// - Ok(Product): 更新后的产品
    /// - Err(NotFound): 产品不存在
    pub fn update_demand(&self, id: &str, demand: u32) -> RepositoryResult<Product> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE product SET demand = ?1 WHERE id = ?2",
            params![demand, id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: id.to_string(),
            });
        }

        find_product_in(&conn, id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Product".to_string(),
            id: id.to_string(),
        })
    }

    /// 跨仓调拨（单事务）
    ///
    /// 规则:
    /// 1. 源产品必须存在且位于 from_warehouse
    /// 2. qty > 0,目标仓库不同于源仓库且存在
    /// 3. 源库存不足时拒绝
    /// 4. 目标仓库已有同名同 SKU 的行则累加库存,否则新建 `{id}-{to}` 行（需求为 0）
    ///
    /// # 返回
    /// - Ok(Product): 目标仓库的产品行
    pub fn transfer_stock(
        &self,
        id: &str,
        from_warehouse: &str,
        to_warehouse: &str,
        qty: u32,
    ) -> RepositoryResult<Product> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let source = find_product_in(&tx, id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Product".to_string(),
            id: id.to_string(),
        })?;

        if source.warehouse != from_warehouse {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "Product is not in warehouse {}",
                from_warehouse
            )));
        }
        if qty == 0 {
            return Err(RepositoryError::BusinessRuleViolation(
                "Transfer quantity must be positive".to_string(),
            ));
        }
        if from_warehouse == to_warehouse {
            return Err(RepositoryError::BusinessRuleViolation(
                "Target warehouse must differ from source warehouse".to_string(),
            ));
        }
        if source.stock < qty {
            return Err(RepositoryError::BusinessRuleViolation(
                "Insufficient stock for transfer".to_string(),
            ));
        }

        let target_exists: bool = tx
            .query_row(
                "SELECT 1 FROM warehouse WHERE code = ?1",
                params![to_warehouse],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if !target_exists {
            return Err(RepositoryError::NotFound {
                entity: "Warehouse".to_string(),
                id: to_warehouse.to_string(),
            });
        }

        let sql = format!(
            "SELECT {} FROM product WHERE name = ?1 AND sku = ?2 AND warehouse = ?3 ORDER BY rowid LIMIT 1",
            PRODUCT_COLUMNS
        );
        let destination = tx
            .query_row(
                &sql,
                params![source.name, source.sku, to_warehouse],
                map_product,
            )
            .optional()?;

        tx.execute(
            "UPDATE product SET stock = stock - ?1 WHERE id = ?2",
            params![qty, source.id],
        )?;

        let destination_id = match destination {
            Some(existing) => {
                if existing.stock.checked_add(qty).is_none() {
                    return Err(RepositoryError::FieldValueError {
                        field: "stock".to_string(),
                        message: format!("产品{}库存溢出", existing.id),
                    });
                }
                tx.execute(
                    "UPDATE product SET stock = stock + ?1 WHERE id = ?2",
                    params![qty, existing.id],
                )?;
                existing.id
            }
            None => {
                let new_id = format!("{}-{}", source.id, to_warehouse);
                tx.execute(
                    "INSERT INTO product (id, name, sku, warehouse, stock, demand) VALUES (?1, ?2, ?3, ?4, ?5, 0)",
                    params![new_id, source.name, source.sku, to_warehouse, qty],
                )?;
                new_id
            }
        };

        let result = find_product_in(&tx, &destination_id)?.ok_or_else(|| {
            RepositoryError::InternalError(format!("调拨后目标行缺失: {}", destination_id))
        })?;

        tx.commit()?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, ensure_schema};

    fn setup() -> InventoryRepository {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        let repo = InventoryRepository::new(Arc::new(Mutex::new(conn)));
        for code in ["WH1", "WH2"] {
            repo.insert_warehouse(&Warehouse {
                code: code.to_string(),
                name: format!("仓库{}", code),
                city: "City".to_string(),
                country: "Country".to_string(),
            })
            .unwrap();
        }
        repo.insert_product(&Product {
            id: "A".to_string(),
            name: "Widget".to_string(),
            sku: "W1".to_string(),
            warehouse: "WH1".to_string(),
            stock: 5,
            demand: 10,
        })
        .unwrap();
        repo
    }

    #[test]
    fn test_update_demand_missing_product() {
        let repo = setup();
        let err = repo.update_demand("NOPE", 3).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[test]
    fn test_transfer_creates_destination_row() {
        let repo = setup();
        let dest = repo.transfer_stock("A", "WH1", "WH2", 2).unwrap();
        assert_eq!(dest.id, "A-WH2");
        assert_eq!(dest.stock, 2);
        assert_eq!(dest.demand, 0);
        assert_eq!(repo.find_product("A").unwrap().unwrap().stock, 3);

        // 再次调拨累加到同一行
        let dest = repo.transfer_stock("A", "WH1", "WH2", 3).unwrap();
        assert_eq!(dest.id, "A-WH2");
        assert_eq!(dest.stock, 5);
        assert_eq!(repo.find_product("A").unwrap().unwrap().stock, 0);
        assert_eq!(repo.count_products().unwrap(), 2);
    }

    #[test]
    fn test_transfer_insufficient_stock_rolls_back() {
        let repo = setup();
        let err = repo.transfer_stock("A", "WH1", "WH2", 6).unwrap_err();
        assert!(matches!(err, RepositoryError::BusinessRuleViolation(_)));
        assert_eq!(repo.find_product("A").unwrap().unwrap().stock, 5);
        assert_eq!(repo.count_products().unwrap(), 1);
    }

    #[test]
    fn test_transfer_wrong_source_warehouse() {
        let repo = setup();
        let err = repo.transfer_stock("A", "WH2", "WH1", 1).unwrap_err();
        assert!(matches!(err, RepositoryError::BusinessRuleViolation(_)));
    }

    #[test]
    fn test_transfer_unknown_target() {
        let repo = setup();
        let err = repo.transfer_stock("A", "WH1", "WH9", 1).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
