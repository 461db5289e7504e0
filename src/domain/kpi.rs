// ==========================================
// SupplySight 库存驾驶舱 - KPI 领域模型
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// KpiPoint - 趋势采样点
// ==========================================
// 每个日期一条聚合样本（库存合计 / 需求合计）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiPoint {
    pub date: NaiveDate,
    pub stock: i64,
    pub demand: i64,
}

// ==========================================
// KpiSummary - 聚合指标
// ==========================================
// fill_rate: 百分比,保留一位小数;总需求为 0 时为 0
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub total_stock: u64,
    pub total_demand: u64,
    pub fill_rate: f64,
}
