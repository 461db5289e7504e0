// ==========================================
// SupplySight 库存驾驶舱 - 筛选/搜索评估器
// ==========================================
// 三个谓词取交集:
// 1) 搜索为空,或 名称/SKU/ID 不区分大小写包含搜索词
// 2) 仓库为 all,或 product.warehouse == 仓库代码
// 3) 状态为 all,或 classify(product) == 状态
// 稳定筛选: 保持原相对顺序
// ==========================================
// 后端按同一语义过滤；本地评估器结果必须与后端一致
// ==========================================

use tracing::instrument;

use crate::domain::filters::Filters;
use crate::domain::product::Product;
use crate::engine::status::classify_product;

/// 判断单个产品是否命中筛选条件
pub fn matches(product: &Product, filters: &Filters) -> bool {
    matches_search(product, &filters.search)
        && filters.warehouse.admits(&product.warehouse)
        && filters.status.admits(classify_product(product))
}

/// 搜索谓词（首尾空白忽略）
pub fn matches_search(product: &Product, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    product.name.to_lowercase().contains(&needle)
        || product.sku.to_lowercase().contains(&needle)
        || product.id.to_lowercase().contains(&needle)
}

/// 筛选产品列表（返回副本,保持原顺序）
#[instrument(skip(products, filters), fields(input = products.len()))]
pub fn filter_products(products: &[Product], filters: &Filters) -> Vec<Product> {
    let result: Vec<Product> = products
        .iter()
        .filter(|p| matches(p, filters))
        .cloned()
        .collect();
    tracing::debug!(output = result.len(), "产品筛选完成");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{DateRange, ProductStatus, StatusFilter, WarehouseFilter};

    fn sample() -> Vec<Product> {
        vec![
            Product {
                id: "A".to_string(),
                name: "Widget".to_string(),
                sku: "W1".to_string(),
                warehouse: "WH1".to_string(),
                stock: 5,
                demand: 10,
            },
            Product {
                id: "B".to_string(),
                name: "Gadget".to_string(),
                sku: "G1".to_string(),
                warehouse: "WH2".to_string(),
                stock: 10,
                demand: 2,
            },
        ]
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_search_case_insensitive() {
        let filters = Filters {
            search: "wid".to_string(),
            ..Filters::default()
        };
        assert_eq!(ids(&filter_products(&sample(), &filters)), vec!["A"]);

        let filters = Filters {
            search: "  g1 ".to_string(),
            ..Filters::default()
        };
        assert_eq!(ids(&filter_products(&sample(), &filters)), vec!["B"]);
    }

    #[test]
    fn test_search_matches_id() {
        let filters = Filters {
            search: "b".to_string(),
            ..Filters::default()
        };
        // "b" 只命中 B 的 ID
        assert_eq!(ids(&filter_products(&sample(), &filters)), vec!["B"]);
    }

    #[test]
    fn test_status_filter() {
        let filters = Filters {
            status: StatusFilter::Only(ProductStatus::Critical),
            ..Filters::default()
        };
        assert_eq!(ids(&filter_products(&sample(), &filters)), vec!["A"]);
    }

    #[test]
    fn test_warehouse_filter() {
        let filters = Filters {
            warehouse: WarehouseFilter::Code("WH2".to_string()),
            ..Filters::default()
        };
        assert_eq!(ids(&filter_products(&sample(), &filters)), vec!["B"]);
    }

    #[test]
    fn test_predicates_are_anded() {
        let filters = Filters {
            search: "widget".to_string(),
            warehouse: WarehouseFilter::Code("WH2".to_string()),
            status: StatusFilter::All,
            date_range: DateRange::D30,
        };
        assert!(filter_products(&sample(), &filters).is_empty());
    }

    #[test]
    fn test_default_filters_keep_order() {
        let products = sample();
        assert_eq!(filter_products(&products, &Filters::default()), products);
    }

    #[test]
    fn test_idempotent() {
        let filters = Filters {
            search: "get".to_string(),
            ..Filters::default()
        };
        let once = filter_products(&sample(), &filters);
        let twice = filter_products(&once, &filters);
        assert_eq!(once, twice);
    }
}
