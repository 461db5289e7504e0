// ==========================================
// SupplySight 库存驾驶舱 - 操作输入校验器
// ==========================================
// 职责: 在发起远程调用前拦截非法输入（第一道防线）
// - 需求调整: 非负整数
// - 跨仓调拨: 正整数且不超过当前库存,目标仓库已选、存在且不同于源仓库
// 后端仍是权威,可能在并发修改后拒绝已通过本地校验的请求
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::domain::product::{Product, Warehouse};
use crate::i18n::{t, t_with_args};

/// 线上类型为 GraphQL Int（32 位有符号）
pub const MAX_WIRE_INT: i64 = i32::MAX as i64;

// ==========================================
// 违规类型
// ==========================================
pub const QTY_NOT_NUMERIC: &str = "QTY_NOT_NUMERIC";
pub const QTY_NOT_POSITIVE: &str = "QTY_NOT_POSITIVE";
pub const QTY_EXCEEDS_STOCK: &str = "QTY_EXCEEDS_STOCK";
pub const TARGET_MISSING: &str = "TARGET_MISSING";
pub const TARGET_SAME_AS_SOURCE: &str = "TARGET_SAME_AS_SOURCE";
pub const TARGET_UNKNOWN: &str = "TARGET_UNKNOWN";

/// 已通过本地校验的调拨请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStockRequest {
    pub product_id: String,
    pub from_warehouse: String,
    pub to_warehouse: String,
    pub qty: u32,
}

// ==========================================
// ActionValidator - 操作输入校验器
// ==========================================
pub struct ActionValidator;

impl ActionValidator {
    /// 解析需求输入
    ///
    /// # 参数
    /// - raw: 表单原始文本
    ///
    /// # 返回
    /// - Ok(u32): 非负整数需求
    /// - Err(ApiError::InvalidInput): 空 / 非数字 / 小数 / 负数 / 超出范围
    pub fn parse_demand(raw: &str) -> ApiResult<u32> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ApiError::InvalidInput(t("validation.demand_missing")));
        }

        let value = match trimmed.parse::<i64>() {
            Ok(v) => v,
            Err(_) => {
                let key = if trimmed.parse::<f64>().map(f64::is_finite).unwrap_or(false) {
                    "validation.demand_not_integer"
                } else {
                    "validation.demand_not_numeric"
                };
                return Err(ApiError::InvalidInput(t_with_args(key, &[("value", trimmed)])));
            }
        };

        Self::check_demand(value)
    }

    /// 校验已是整数的需求值（API 层提交前复核）
    pub fn check_demand(value: i64) -> ApiResult<u32> {
        let shown = value.to_string();
        if value < 0 {
            return Err(ApiError::InvalidInput(t_with_args(
                "validation.demand_negative",
                &[("value", &shown)],
            )));
        }
        if value > MAX_WIRE_INT {
            return Err(ApiError::InvalidInput(t_with_args(
                "validation.demand_out_of_range",
                &[("value", &shown)],
            )));
        }
        u32::try_from(value).map_err(|e| ApiError::InternalError(e.to_string()))
    }

    /// 可选的调拨目标仓库（排除源仓库）
    pub fn transfer_targets<'a>(product: &Product, warehouses: &'a [Warehouse]) -> Vec<&'a Warehouse> {
        warehouses
            .iter()
            .filter(|w| w.code != product.warehouse)
            .collect()
    }

    /// 校验调拨表单
    ///
    /// # 参数
    /// - product: 当前选中的产品（源仓库即 product.warehouse）
    /// - raw_qty: 数量原始文本
    /// - to_warehouse: 目标仓库代码（None 或空白表示未选择）
    /// - warehouses: 已知仓库列表
    ///
    /// # 返回
    /// - Ok(TransferStockRequest): 全部校验通过
    /// - Err(ApiError::ActionValidationError): 包含全部违规项
    pub fn validate_transfer(
        product: &Product,
        raw_qty: &str,
        to_warehouse: Option<&str>,
        warehouses: &[Warehouse],
    ) -> ApiResult<TransferStockRequest> {
        let mut violations = Vec::new();
        let violation = |kind: &str, reason: String, details: Option<serde_json::Value>| {
            ValidationViolation {
                violation_type: kind.to_string(),
                product_id: product.id.clone(),
                reason,
                details,
            }
        };

        // 数量
        let trimmed = raw_qty.trim();
        let qty = match trimmed.parse::<i64>() {
            Ok(q) if q <= 0 => {
                violations.push(violation(
                    QTY_NOT_POSITIVE,
                    t("validation.qty_not_positive"),
                    Some(json!({ "qty": q })),
                ));
                None
            }
            Ok(q) if q > i64::from(product.stock) => {
                let (qty_s, stock_s) = (q.to_string(), product.stock.to_string());
                violations.push(violation(
                    QTY_EXCEEDS_STOCK,
                    t_with_args(
                        "validation.qty_exceeds_stock",
                        &[("qty", &qty_s), ("stock", &stock_s)],
                    ),
                    Some(json!({ "qty": q, "stock": product.stock })),
                ));
                None
            }
            Ok(q) => u32::try_from(q).ok(),
            Err(_) => {
                violations.push(violation(
                    QTY_NOT_NUMERIC,
                    t_with_args("validation.qty_not_numeric", &[("value", trimmed)]),
                    None,
                ));
                None
            }
        };

        // 目标仓库
        let target = to_warehouse.map(str::trim).filter(|code| !code.is_empty());
        match target {
            None => violations.push(violation(TARGET_MISSING, t("validation.target_missing"), None)),
            Some(code) if code == product.warehouse => violations.push(violation(
                TARGET_SAME_AS_SOURCE,
                t_with_args("validation.target_same_as_source", &[("code", code)]),
                None,
            )),
            Some(code) if !warehouses.iter().any(|w| w.code == code) => {
                violations.push(violation(
                    TARGET_UNKNOWN,
                    t_with_args("validation.target_unknown", &[("code", code)]),
                    None,
                ))
            }
            Some(_) => {}
        }

        match (qty, target) {
            (Some(qty), Some(to)) if violations.is_empty() => Ok(TransferStockRequest {
                product_id: product.id.clone(),
                from_warehouse: product.warehouse.clone(),
                to_warehouse: to.to_string(),
                qty,
            }),
            _ => {
                let count = violations.len().to_string();
                tracing::debug!(product_id = %product.id, violations = violations.len(), "调拨表单校验未通过");
                Err(ApiError::ActionValidationError {
                    reason: t_with_args("validation.transfer_invalid", &[("count", &count)]),
                    violations,
                })
            }
        }
    }

    /// 复核调拨请求的结构约束（不依赖产品快照）
    pub fn check_transfer_request(request: &TransferStockRequest) -> ApiResult<()> {
        if request.product_id.trim().is_empty() {
            return Err(ApiError::InvalidInput(t("validation.product_id_missing")));
        }
        if request.qty == 0 {
            return Err(ApiError::InvalidInput(t("validation.qty_not_positive")));
        }
        if i64::from(request.qty) > MAX_WIRE_INT {
            let shown = request.qty.to_string();
            return Err(ApiError::InvalidInput(t_with_args(
                "validation.qty_not_numeric",
                &[("value", &shown)],
            )));
        }
        if request.to_warehouse.trim().is_empty() {
            return Err(ApiError::InvalidInput(t("validation.target_missing")));
        }
        if request.to_warehouse == request.from_warehouse {
            return Err(ApiError::InvalidInput(t_with_args(
                "validation.target_same_as_source",
                &[("code", &request.to_warehouse)],
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: "P-1001".to_string(),
            name: "12mm Hex Bolt".to_string(),
            sku: "HEX-12-100".to_string(),
            warehouse: "BLR-A".to_string(),
            stock: 180,
            demand: 120,
        }
    }

    fn warehouses() -> Vec<Warehouse> {
        ["BLR-A", "PNQ-C", "DEL-B"]
            .iter()
            .map(|code| Warehouse {
                code: code.to_string(),
                name: code.to_string(),
                city: "City".to_string(),
                country: "India".to_string(),
            })
            .collect()
    }

    fn violation_types(err: ApiError) -> Vec<String> {
        match err {
            ApiError::ActionValidationError { violations, .. } => {
                violations.into_iter().map(|v| v.violation_type).collect()
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_demand_accepts_non_negative_integers() {
        assert_eq!(ActionValidator::parse_demand("0").unwrap(), 0);
        assert_eq!(ActionValidator::parse_demand(" 150 ").unwrap(), 150);
    }

    #[test]
    fn test_parse_demand_rejects_bad_input() {
        for raw in ["", "   ", "abc", "1.5", "-3", "99999999999"] {
            let err = ActionValidator::parse_demand(raw).unwrap_err();
            assert!(matches!(err, ApiError::InvalidInput(_)), "input {:?}", raw);
        }
    }

    #[test]
    fn test_transfer_valid() {
        let request =
            ActionValidator::validate_transfer(&product(), "25", Some("PNQ-C"), &warehouses())
                .unwrap();
        assert_eq!(request.from_warehouse, "BLR-A");
        assert_eq!(request.to_warehouse, "PNQ-C");
        assert_eq!(request.qty, 25);
    }

    #[test]
    fn test_transfer_full_stock_allowed() {
        let request =
            ActionValidator::validate_transfer(&product(), "180", Some("DEL-B"), &warehouses())
                .unwrap();
        assert_eq!(request.qty, 180);
    }

    #[test]
    fn test_transfer_qty_zero_rejected() {
        let err = ActionValidator::validate_transfer(&product(), "0", Some("PNQ-C"), &warehouses())
            .unwrap_err();
        assert_eq!(violation_types(err), vec![QTY_NOT_POSITIVE]);
    }

    #[test]
    fn test_transfer_qty_exceeds_stock_rejected() {
        let err =
            ActionValidator::validate_transfer(&product(), "181", Some("PNQ-C"), &warehouses())
                .unwrap_err();
        assert_eq!(violation_types(err), vec![QTY_EXCEEDS_STOCK]);
    }

    #[test]
    fn test_transfer_same_warehouse_rejected() {
        let err = ActionValidator::validate_transfer(&product(), "5", Some("BLR-A"), &warehouses())
            .unwrap_err();
        assert_eq!(violation_types(err), vec![TARGET_SAME_AS_SOURCE]);
    }

    #[test]
    fn test_transfer_collects_all_violations() {
        let err = ActionValidator::validate_transfer(&product(), "x", None, &warehouses())
            .unwrap_err();
        assert_eq!(violation_types(err), vec![QTY_NOT_NUMERIC, TARGET_MISSING]);

        let err = ActionValidator::validate_transfer(&product(), "-1", Some("NOPE"), &warehouses())
            .unwrap_err();
        assert_eq!(violation_types(err), vec![QTY_NOT_POSITIVE, TARGET_UNKNOWN]);
    }

    #[test]
    fn test_transfer_targets_exclude_source() {
        let whs = warehouses();
        let codes: Vec<&str> = ActionValidator::transfer_targets(&product(), &whs)
            .into_iter()
            .map(|w| w.code.as_str())
            .collect();
        assert_eq!(codes, vec!["PNQ-C", "DEL-B"]);
    }

    #[test]
    fn test_check_transfer_request() {
        let mut request = TransferStockRequest {
            product_id: "P-1001".to_string(),
            from_warehouse: "BLR-A".to_string(),
            to_warehouse: "PNQ-C".to_string(),
            qty: 1,
        };
        assert!(ActionValidator::check_transfer_request(&request).is_ok());

        request.to_warehouse = "BLR-A".to_string();
        assert!(ActionValidator::check_transfer_request(&request).is_err());

        request.to_warehouse = "PNQ-C".to_string();
        request.qty = 0;
        assert!(ActionValidator::check_transfer_request(&request).is_err());
    }
}
