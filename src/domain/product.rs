// ==========================================
// SupplySight 库存驾驶舱 - 产品与仓库领域模型
// ==========================================
// 生命周期: 由后端创建/更新,前端只读并发起变更请求
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Product - 产品（单仓库存行）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    pub id: String,        // 产品ID（唯一）
    pub name: String,      // 产品名称
    pub sku: String,       // SKU
    pub warehouse: String, // 所在仓库代码（外键 Warehouse.code）
    pub stock: u32,        // 当前库存（非负）
    pub demand: u32,       // 当前需求（非负）
}

impl Product {
    /// 可由库存满足的需求量 min(stock, demand)
    pub fn fulfillable(&self) -> u32 {
        self.stock.min(self.demand)
    }
}

// ==========================================
// Warehouse - 仓库（只读参考数据）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Warehouse {
    pub code: String,    // 仓库代码（唯一）
    pub name: String,    // 仓库名称
    pub city: String,    // 城市
    pub country: String, // 国家
}
