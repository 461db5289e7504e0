// ==========================================
// SupplySight 库存驾驶舱 - 领域类型定义
// ==========================================
// 状态分级: healthy / low / critical
// 筛选条件: 仓库 / 状态 / 日期范围（线上格式与 GraphQL 接口一致）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 筛选值解析失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("无法识别的{kind}: {value}")]
pub struct ParseFilterError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseFilterError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// 筛选条件中表示"不限"的哨兵值
pub const FILTER_ALL: &str = "all";

// ==========================================
// 产品状态 (Product Status)
// ==========================================
// 派生值,不落库
// 顺序: Healthy < Low < Critical（按严重程度）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Healthy,  // 库存 > 需求
    Low,      // 库存 = 需求
    Critical, // 库存 < 需求
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 3] = [
        ProductStatus::Healthy,
        ProductStatus::Low,
        ProductStatus::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Healthy => "healthy",
            ProductStatus::Low => "low",
            ProductStatus::Critical => "critical",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "healthy" => Ok(ProductStatus::Healthy),
            "low" => Ok(ProductStatus::Low),
            "critical" => Ok(ProductStatus::Critical),
            _ => Err(ParseFilterError::new("状态", s)),
        }
    }
}

// ==========================================
// 状态筛选 (Status Filter)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ProductStatus),
}

impl StatusFilter {
    /// 是否放行该状态
    pub fn admits(&self, status: ProductStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(expected) => *expected == status,
        }
    }

    /// 线上参数（"all" 不下发）
    pub fn as_query_param(&self) -> Option<String> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(status.as_str().to_string()),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str(FILTER_ALL),
            StatusFilter::Only(status) => write!(f, "{}", status),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(FILTER_ALL) {
            return Ok(StatusFilter::All);
        }
        trimmed.parse().map(StatusFilter::Only)
    }
}

// ==========================================
// 仓库筛选 (Warehouse Filter)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum WarehouseFilter {
    #[default]
    All,
    Code(String),
}

impl WarehouseFilter {
    pub fn admits(&self, warehouse_code: &str) -> bool {
        match self {
            WarehouseFilter::All => true,
            WarehouseFilter::Code(code) => code == warehouse_code,
        }
    }

    pub fn as_query_param(&self) -> Option<String> {
        match self {
            WarehouseFilter::All => None,
            WarehouseFilter::Code(code) => Some(code.clone()),
        }
    }
}

impl fmt::Display for WarehouseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarehouseFilter::All => f.write_str(FILTER_ALL),
            WarehouseFilter::Code(code) => f.write_str(code),
        }
    }
}

impl From<&str> for WarehouseFilter {
    fn from(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(FILTER_ALL) {
            WarehouseFilter::All
        } else {
            WarehouseFilter::Code(trimmed.to_string())
        }
    }
}

// ==========================================
// 日期范围 (Date Range)
// ==========================================
// 线上格式: "7d" / "14d" / "30d"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DateRange {
    #[default]
    #[serde(rename = "7d")]
    D7,
    #[serde(rename = "14d")]
    D14,
    #[serde(rename = "30d")]
    D30,
}

impl DateRange {
    pub const ALL: [DateRange; 3] = [DateRange::D7, DateRange::D14, DateRange::D30];

    /// 覆盖天数
    pub fn days(&self) -> u32 {
        match self {
            DateRange::D7 => 7,
            DateRange::D14 => 14,
            DateRange::D30 => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::D7 => "7d",
            DateRange::D14 => "14d",
            DateRange::D30 => "30d",
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "7d" => Ok(DateRange::D7),
            "14d" => Ok(DateRange::D14),
            "30d" => Ok(DateRange::D30),
            _ => Err(ParseFilterError::new("日期范围", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_order_by_severity() {
        assert!(ProductStatus::Critical > ProductStatus::Low);
        assert!(ProductStatus::Low > ProductStatus::Healthy);
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "Critical".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(ProductStatus::Critical)
        );
        assert!("urgent".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_filter_query_params() {
        assert_eq!(StatusFilter::All.as_query_param(), None);
        assert_eq!(
            StatusFilter::Only(ProductStatus::Low).as_query_param(),
            Some("low".to_string())
        );
        assert_eq!(WarehouseFilter::from("all").as_query_param(), None);
        assert_eq!(
            WarehouseFilter::from(" BLR-A ").as_query_param(),
            Some("BLR-A".to_string())
        );
    }

    #[test]
    fn test_date_range_wire_format() {
        assert_eq!(serde_json::to_string(&DateRange::D14).unwrap(), "\"14d\"");
        assert_eq!("30d".parse::<DateRange>().unwrap().days(), 30);
        assert!("90d".parse::<DateRange>().is_err());
    }
}
