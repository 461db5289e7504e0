// ==========================================
// SupplySight 库存驾驶舱 - GraphQL 数据接口
// ==========================================
// 协议: HTTP POST JSON { query, variables, operationName }
// 每个请求带 x-request-id（uuid v4）,便于与后端日志对齐
// ==========================================

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::instrument;
use uuid::Uuid;

use crate::client::error::{GatewayError, GatewayResult};
use crate::client::operations::{
    GetKpiSummary, ListKpis, ListProducts, ListWarehouses, Operation, TransferStock, UpdateDemand,
};
use crate::client::InventoryGateway;
use crate::domain::kpi::{KpiPoint, KpiSummary};
use crate::domain::product::{Product, Warehouse};

/// 错误响应体在日志与错误中保留的最大字符数
const MAX_ERROR_BODY_CHARS: usize = 512;

// ==========================================
// GraphqlGateway - 生产数据源
// ==========================================
pub struct GraphqlGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl GraphqlGateway {
    /// 创建 GraphQL 数据源
    ///
    /// # 参数
    /// - endpoint: GraphQL 端点 URL
    /// - timeout: 单次请求超时
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> GatewayResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// 执行一个操作并解码根字段
    #[instrument(skip(self, op), fields(operation = O::NAME, kind = ?O::KIND))]
    pub async fn execute<O: Operation>(&self, op: &O) -> GatewayResult<O::Output> {
        let request_id = Uuid::new_v4().to_string();
        let body = json!({
            "operationName": O::NAME,
            "query": O::DOCUMENT,
            "variables": op,
        });

        let started = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-request-id", &request_id)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(request_id = %request_id, error = %e, "GraphQL 请求发送失败");
                GatewayError::from(e)
            })?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        tracing::debug!(
            request_id = %request_id,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "GraphQL 响应"
        );

        decode_response::<O>(status, &text)
    }
}

/// 解码 GraphQL 响应
///
/// # 参数
/// - status: HTTP 状态码
/// - body: 响应体原文
///
/// # 返回
/// - Ok(O::Output): data.<ROOT_FIELD> 的反序列化结果
/// - Err(GatewayError): 状态异常 / 后端拒绝 / 缺少数据 / 形状不符
pub fn decode_response<O: Operation>(status: u16, body: &str) -> GatewayResult<O::Output> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    // errors[] 优先: 后端拒绝时部分服务端会同时返回非 2xx
    if let Some(messages) = parsed.as_ref().and_then(error_messages) {
        return Err(GatewayError::Rejected {
            operation: O::NAME.to_string(),
            messages,
        });
    }

    if !(200..300).contains(&status) {
        return Err(GatewayError::HttpStatus {
            status,
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    let mut parsed = parsed.ok_or_else(|| {
        GatewayError::Decode(format!("{} 响应不是合法 JSON", O::NAME))
    })?;

    let root = parsed
        .get_mut("data")
        .and_then(|data| data.get_mut(O::ROOT_FIELD))
        .map(Value::take)
        .filter(|value| !value.is_null())
        .ok_or_else(|| GatewayError::MissingData {
            operation: O::NAME.to_string(),
        })?;

    Ok(serde_json::from_value(root)?)
}

/// 提取 errors[].message（空数组视为无错误）
fn error_messages(value: &Value) -> Option<Vec<String>> {
    let errors = value.get("errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|err| {
                err.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| err.to_string())
            })
            .collect(),
    )
}

#[async_trait]
impl InventoryGateway for GraphqlGateway {
    fn name(&self) -> &'static str {
        "graphql"
    }

    async fn list_products(&self, op: &ListProducts) -> GatewayResult<Vec<Product>> {
        self.execute(op).await
    }

    async fn list_warehouses(&self) -> GatewayResult<Vec<Warehouse>> {
        self.execute(&ListWarehouses {}).await
    }

    async fn list_kpis(&self, op: &ListKpis) -> GatewayResult<Vec<KpiPoint>> {
        self.execute(op).await
    }

    async fn get_kpi_summary(&self) -> GatewayResult<KpiSummary> {
        self.execute(&GetKpiSummary {}).await
    }

    async fn update_demand(&self, op: &UpdateDemand) -> GatewayResult<Product> {
        self.execute(op).await
    }

    async fn transfer_stock(&self, op: &TransferStock) -> GatewayResult<Product> {
        self.execute(op).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_products() {
        let body = r#"{"data":{"products":[
            {"id":"P-1001","name":"12mm Hex Bolt","sku":"HEX-12-100","warehouse":"BLR-A","stock":180,"demand":120}
        ]}}"#;
        let products = decode_response::<ListProducts>(200, body).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].sku, "HEX-12-100");
        assert_eq!(products[0].stock, 180);
    }

    #[test]
    fn test_decode_summary_camel_case() {
        let body = r#"{"data":{"kpiSummary":{"totalStock":10,"totalDemand":20,"fillRate":50.0}}}"#;
        let summary = decode_response::<GetKpiSummary>(200, body).unwrap();
        assert_eq!(summary.total_stock, 10);
        assert_eq!(summary.total_demand, 20);
        assert_eq!(summary.fill_rate, 50.0);
    }

    #[test]
    fn test_decode_kpis_dates() {
        let body = r#"{"data":{"kpis":[{"date":"2024-03-05","stock":100,"demand":80}]}}"#;
        let points = decode_response::<ListKpis>(200, body).unwrap();
        assert_eq!(points[0].date.to_string(), "2024-03-05");
    }

    #[test]
    fn test_errors_become_rejection_with_messages() {
        let body = r#"{"data":null,"errors":[{"message":"Insufficient stock for transfer"}]}"#;
        let err = decode_response::<TransferStock>(200, body).unwrap_err();
        match err {
            GatewayError::Rejected { operation, messages } => {
                assert_eq!(operation, "TransferStock");
                assert_eq!(messages, vec!["Insufficient stock for transfer".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_2xx_is_http_status() {
        let err = decode_response::<ListWarehouses>(502, "Bad Gateway").unwrap_err();
        assert!(matches!(err, GatewayError::HttpStatus { status: 502, .. }));
    }

    #[test]
    fn test_missing_root_field() {
        let err = decode_response::<ListWarehouses>(200, r#"{"data":{}}"#).unwrap_err();
        assert!(matches!(err, GatewayError::MissingData { .. }));

        let err = decode_response::<ListWarehouses>(200, r#"{"data":{"warehouses":null}}"#)
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingData { .. }));
    }

    #[test]
    fn test_shape_mismatch_is_decode_error() {
        let body = r#"{"data":{"products":[{"id":"P-1"}]}}"#;
        let err = decode_response::<ListProducts>(200, body).unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));

        let err = decode_response::<ListProducts>(200, "<html>").unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn test_empty_errors_array_is_ignored() {
        let body = r#"{"data":{"warehouses":[]},"errors":[]}"#;
        assert!(decode_response::<ListWarehouses>(200, body).unwrap().is_empty());
    }
}
