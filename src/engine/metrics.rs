// ==========================================
// SupplySight 库存驾驶舱 - 聚合指标计算
// ==========================================
// 输入: 产品序列（全集,非分页）
// 输出: totalStock / totalDemand / fillRate
// fillRate = round(100 × Σmin(stock, demand) / totalDemand, 1)
//            totalDemand = 0 时为 0
// ==========================================

use tracing::instrument;

use crate::domain::kpi::KpiSummary;
use crate::domain::product::Product;

/// 计算聚合指标
///
/// 单次遍历,与输入顺序无关
#[instrument(skip(products), fields(count = products.len()))]
pub fn compute_summary(products: &[Product]) -> KpiSummary {
    let mut total_stock: u64 = 0;
    let mut total_demand: u64 = 0;
    let mut fulfillable: u64 = 0;

    for product in products {
        total_stock += u64::from(product.stock);
        total_demand += u64::from(product.demand);
        fulfillable += u64::from(product.fulfillable());
    }

    KpiSummary {
        total_stock,
        total_demand,
        fill_rate: fill_rate(fulfillable, total_demand),
    }
}

/// 满足率（百分比,一位小数）
pub fn fill_rate(fulfillable: u64, total_demand: u64) -> f64 {
    if total_demand == 0 {
        return 0.0;
    }
    round_one_decimal(100.0 * fulfillable as f64 / total_demand as f64)
}

/// 四舍五入到一位小数
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
