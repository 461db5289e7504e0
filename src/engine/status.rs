// ==========================================
// SupplySight 库存驾驶舱 - 状态分级引擎
// ==========================================
// 规则: stock > demand → healthy
//       stock = demand → low（含 0/0）
//       stock < demand → critical
// ==========================================

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::product::Product;
use crate::domain::types::ProductStatus;

/// 按 (库存, 需求) 判定状态
///
/// 全函数: 对任意非负整数对有定义
pub fn classify(stock: u32, demand: u32) -> ProductStatus {
    match stock.cmp(&demand) {
        Ordering::Greater => ProductStatus::Healthy,
        Ordering::Equal => ProductStatus::Low,
        Ordering::Less => ProductStatus::Critical,
    }
}

/// 判定单个产品状态
pub fn classify_product(product: &Product) -> ProductStatus {
    classify(product.stock, product.demand)
}

// ==========================================
// StatusBreakdown - 各状态产品数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusBreakdown {
    pub healthy: usize,
    pub low: usize,
    pub critical: usize,
}

impl StatusBreakdown {
    pub fn from_products<'a, I>(products: I) -> Self
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let mut breakdown = StatusBreakdown::default();
        for product in products {
            match classify_product(product) {
                ProductStatus::Healthy => breakdown.healthy += 1,
                ProductStatus::Low => breakdown.low += 1,
                ProductStatus::Critical => breakdown.critical += 1,
            }
        }
        breakdown
    }

    pub fn total(&self) -> usize {
        self.healthy + self.low + self.critical
    }

    /// 出现过的最严重状态
    pub fn worst(&self) -> Option<ProductStatus> {
        if self.critical > 0 {
            Some(ProductStatus::Critical)
        } else if self.low > 0 {
            Some(ProductStatus::Low)
        } else if self.healthy > 0 {
            Some(ProductStatus::Healthy)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_exhaustive_small_grid() {
        for s in 0..30u32 {
            for d in 0..30u32 {
                let status = classify(s, d);
                assert_eq!(status == ProductStatus::Healthy, s > d);
                assert_eq!(status == ProductStatus::Low, s == d);
                assert_eq!(status == ProductStatus::Critical, s < d);
            }
        }
    }

    #[test]
    fn test_classify_zero_zero_is_low() {
        assert_eq!(classify(0, 0), ProductStatus::Low);
    }

    #[test]
    fn test_classify_extremes() {
        assert_eq!(classify(u32::MAX, 0), ProductStatus::Healthy);
        assert_eq!(classify(0, u32::MAX), ProductStatus::Critical);
    }

    #[test]
    fn test_breakdown() {
        let mk = |stock, demand| Product {
            id: "X".to_string(),
            name: "X".to_string(),
            sku: "X".to_string(),
            warehouse: "W".to_string(),
            stock,
            demand,
        };
        let products = vec![mk(5, 10), mk(10, 2), mk(3, 3), mk(1, 9)];
        let breakdown = StatusBreakdown::from_products(&products);
        assert_eq!(breakdown.healthy, 1);
        assert_eq!(breakdown.low, 1);
        assert_eq!(breakdown.critical, 2);
        assert_eq!(breakdown.total(), 4);
        assert_eq!(breakdown.worst(), Some(ProductStatus::Critical));
        assert_eq!(StatusBreakdown::default().worst(), None);
    }
}
