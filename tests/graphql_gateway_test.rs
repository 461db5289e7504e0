// ==========================================
// GraphQL 数据源集成测试
// ==========================================
// 本地起一个只回放固定响应的 HTTP 服务,验证:
// 1. 请求体: operationName / query / variables
// 2. data.<root> 解码
// 3. errors[] → 后端拒绝,经 DashboardApi 原样上抛
// 4. 非 2xx / 连接失败
// ==========================================

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};

use supplysight_dashboard::api::{ApiError, DashboardApi, TransferStockRequest};
use supplysight_dashboard::client::error::GatewayError;
use supplysight_dashboard::client::{GraphqlGateway, InventoryGateway, ListKpis, ListProducts};
use supplysight_dashboard::domain::{DateRange, Filters, ProductStatus, StatusFilter};

struct StubResponse {
    status: u16,
    body: String,
}

impl StubResponse {
    fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }
}

/// 启动回放服务
///
/// # 返回
/// - 端点 URL
/// - 已收到的请求体（JSON）
fn spawn_stub_server(responses: Vec<StubResponse>) -> (String, Arc<Mutex<Vec<Value>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let queue = Arc::new(Mutex::new(VecDeque::from(responses)));
    let received = Arc::new(Mutex::new(Vec::new()));
    let received_for_thread = Arc::clone(&received);

    thread::spawn(move || {
        while let Ok((mut stream, _)) = listener.accept() {
            let Ok(body) = read_request_body(&mut stream) else {
                break;
            };
            if let Ok(value) = serde_json::from_slice::<Value>(&body) {
                received_for_thread.lock().unwrap().push(value);
            }

            let Some(response) = queue.lock().unwrap().pop_front() else {
                break;
            };
            let _ = write_response(&mut stream, &response);
            let _ = stream.shutdown(Shutdown::Both);
            if queue.lock().unwrap().is_empty() {
                break;
            }
        }
    });

    (format!("http://{addr}/graphql"), received)
}

fn read_request_body(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = [0_u8; 4096];
    let mut request = Vec::new();
    let header_end = loop {
        let read = stream.read(&mut buf)?;
        if read == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        request.extend_from_slice(&buf[..read]);
        if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while request.len() < header_end + content_length {
        let read = stream.read(&mut buf)?;
        if read == 0 {
            break;
        }
        request.extend_from_slice(&buf[..read]);
    }
    Ok(request[header_end..].to_vec())
}

fn write_response(stream: &mut TcpStream, response: &StubResponse) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
        response.status,
        response.body.len()
    );
    stream.write_all(head.as_bytes())?;
    stream.write_all(response.body.as_bytes())?;
    stream.flush()
}

fn gateway(endpoint: &str) -> GraphqlGateway {
    GraphqlGateway::new(endpoint, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_products_query_round_trip() {
    let (endpoint, received) = spawn_stub_server(vec![StubResponse::ok(json!({
        "data": {
            "products": [
                {"id": "P-1", "name": "Hex Bolt", "sku": "HEX-1", "warehouse": "BLR-A", "stock": 5, "demand": 9}
            ]
        }
    }))]);

    let filters = Filters {
        search: "bolt".to_string(),
        status: StatusFilter::Only(ProductStatus::Critical),
        ..Filters::default()
    };
    let products = gateway(&endpoint)
        .list_products(&ListProducts::from_filters(&filters))
        .await
        .unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, "P-1");
    assert_eq!(products[0].demand, 9);

    let requests = received.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["operationName"], "GetProducts");
    assert_eq!(
        requests[0]["variables"],
        json!({"search": "bolt", "status": "critical"})
    );
    assert!(requests[0]["query"].as_str().unwrap().contains("products("));
}

#[tokio::test]
async fn test_kpis_query_sends_range() {
    let (endpoint, received) = spawn_stub_server(vec![StubResponse::ok(json!({
        "data": {
            "kpis": [
                {"date": "2024-03-09", "stock": 100, "demand": 90},
                {"date": "2024-03-10", "stock": 110, "demand": 95}
            ]
        }
    }))]);

    let points = gateway(&endpoint)
        .list_kpis(&ListKpis {
            range: DateRange::D14,
        })
        .await
        .unwrap();

    assert_eq!(points.len(), 2);
    assert_eq!(points[1].stock, 110);
    assert_eq!(received.lock().unwrap()[0]["variables"], json!({"range": "14d"}));
}

#[tokio::test]
async fn test_rejection_surfaces_through_api() {
    let (endpoint, _received) = spawn_stub_server(vec![StubResponse::ok(json!({
        "data": null,
        "errors": [{"message": "Insufficient stock for transfer"}]
    }))]);

    let api = DashboardApi::new(Arc::new(gateway(&endpoint)), None);
    let err = api
        .transfer_stock(&TransferStockRequest {
            product_id: "P-1".to_string(),
            from_warehouse: "BLR-A".to_string(),
            to_warehouse: "DEL-B".to_string(),
            qty: 5,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::RemoteRejected { .. }));
    assert_eq!(err.user_message(), "Insufficient stock for transfer");
}

#[tokio::test]
async fn test_server_error_status() {
    let (endpoint, _received) = spawn_stub_server(vec![StubResponse {
        status: 502,
        body: "bad gateway".to_string(),
    }]);

    let err = gateway(&endpoint).list_warehouses().await.unwrap_err();
    match err {
        GatewayError::HttpStatus { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("期望 HttpStatus,实际: {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // 绑定后立即释放,端口上无人监听
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let err = gateway(&format!("http://{addr}/graphql"))
        .get_kpi_summary()
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));

    let api_err = ApiError::from(err);
    assert_eq!(api_err.code(), "TRANSPORT_ERROR");
}
