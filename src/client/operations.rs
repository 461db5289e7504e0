// ==========================================
// SupplySight 库存驾驶舱 - 远程操作定义
// ==========================================
// 每个操作结构体同时充当变量集（序列化为 GraphQL variables）
// 文档与后端 schema 保持一致（参数名为 camelCase）
// ==========================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::filters::Filters;
use crate::domain::kpi::{KpiPoint, KpiSummary};
use crate::domain::product::{Product, Warehouse};
use crate::domain::types::DateRange;

/// 操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

/// 远程操作
pub trait Operation: Serialize + Send + Sync {
    /// GraphQL operationName（同时作为缓存键前缀）
    const NAME: &'static str;
    /// 响应 data 下的根字段
    const ROOT_FIELD: &'static str;
    /// GraphQL 文档
    const DOCUMENT: &'static str;
    const KIND: OperationKind;

    type Output: DeserializeOwned + Serialize + Send;
}

// ==========================================
// 查询
// ==========================================

/// ListProducts(search?, status?, warehouse?) -> Product[]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListProducts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,
}

impl ListProducts {
    /// 由筛选条件生成变量（空搜索与 "all" 不下发）
    pub fn from_filters(filters: &Filters) -> Self {
        Self {
            search: filters.search_param(),
            status: filters.status.as_query_param(),
            warehouse: filters.warehouse.as_query_param(),
        }
    }
}

impl Operation for ListProducts {
    const NAME: &'static str = "GetProducts";
    const ROOT_FIELD: &'static str = "products";
    const DOCUMENT: &'static str = r#"
  query GetProducts($search: String, $status: String, $warehouse: String) {
    products(search: $search, status: $status, warehouse: $warehouse) {
      id
      name
      sku
      warehouse
      stock
      demand
    }
  }
"#;
    const KIND: OperationKind = OperationKind::Query;
    type Output = Vec<Product>;
}

/// ListWarehouses() -> Warehouse[]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListWarehouses {}

impl Operation for ListWarehouses {
    const NAME: &'static str = "GetWarehouses";
    const ROOT_FIELD: &'static str = "warehouses";
    const DOCUMENT: &'static str = r#"
  query GetWarehouses {
    warehouses {
      code
      name
      city
      country
    }
  }
"#;
    const KIND: OperationKind = OperationKind::Query;
    type Output = Vec<Warehouse>;
}

/// ListKPIs(range) -> KPIPoint[]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListKpis {
    pub range: DateRange,
}

impl Operation for ListKpis {
    const NAME: &'static str = "GetKPIs";
    const ROOT_FIELD: &'static str = "kpis";
    const DOCUMENT: &'static str = r#"
  query GetKPIs($range: String!) {
    kpis(range: $range) {
      date
      stock
      demand
    }
  }
"#;
    const KIND: OperationKind = OperationKind::Query;
    type Output = Vec<KpiPoint>;
}

/// GetKPISummary() -> {totalStock, totalDemand, fillRate}
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GetKpiSummary {}

impl Operation for GetKpiSummary {
    const NAME: &'static str = "GetKPISummary";
    const ROOT_FIELD: &'static str = "kpiSummary";
    const DOCUMENT: &'static str = r#"
  query GetKPISummary {
    kpiSummary {
      totalStock
      totalDemand
      fillRate
    }
  }
"#;
    const KIND: OperationKind = OperationKind::Query;
    type Output = KpiSummary;
}

// ==========================================
// 变更
// ==========================================

/// UpdateDemand(id, demand) -> Product
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpdateDemand {
    pub id: String,
    pub demand: u32,
}

impl Operation for UpdateDemand {
    const NAME: &'static str = "UpdateDemand";
    const ROOT_FIELD: &'static str = "updateDemand";
    const DOCUMENT: &'static str = r#"
  mutation UpdateDemand($id: String!, $demand: Int!) {
    updateDemand(id: $id, demand: $demand) {
      id
      name
      sku
      warehouse
      stock
      demand
    }
  }
"#;
    const KIND: OperationKind = OperationKind::Mutation;
    type Output = Product;
}

/// TransferStock(id, fromWarehouse, toWarehouse, qty) -> Product
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferStock {
    pub id: String,
    pub from_warehouse: String,
    pub to_warehouse: String,
    pub qty: u32,
}

impl Operation for TransferStock {
    const NAME: &'static str = "TransferStock";
    const ROOT_FIELD: &'static str = "transferStock";
    const DOCUMENT: &'static str = r#"
  mutation TransferStock($id: String!, $fromWarehouse: String!, $toWarehouse: String!, $qty: Int!) {
    transferStock(id: $id, fromWarehouse: $fromWarehouse, toWarehouse: $toWarehouse, qty: $qty) {
      id
      name
      sku
      warehouse
      stock
      demand
    }
  }
"#;
    const KIND: OperationKind = OperationKind::Mutation;
    type Output = Product;
}

/// 变更成功后需要失效的查询
pub const PRODUCT_DERIVED_QUERIES: [&str; 3] =
    [ListProducts::NAME, GetKpiSummary::NAME, ListKpis::NAME];
