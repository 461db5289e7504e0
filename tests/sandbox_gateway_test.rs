// ==========================================
// 沙箱数据源集成测试
// ==========================================
// 测试范围:
// 1. 后端筛选与客户端求值器结果一致
// 2. 趋势样本按日期范围生成
// 3. 调拨: 新建目标行 / 累加已有目标行 / 并发修改后拒绝
// ==========================================

mod test_helpers;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use supplysight_dashboard::api::DashboardApi;

use supplysight_dashboard::client::error::GatewayError;
use supplysight_dashboard::client::{
    InventoryGateway, ListKpis, ListProducts, SandboxGateway, TransferStock, UpdateDemand,
};
use supplysight_dashboard::db::open_sqlite_connection;
use supplysight_dashboard::domain::{
    DateRange, Filters, ProductStatus, StatusFilter, WarehouseFilter,
};
use supplysight_dashboard::engine::filter_products;
use supplysight_dashboard::repository::seed::{demo_dataset, reset_with, SeedDataset};
use supplysight_dashboard::repository::InventoryRepository;
use test_helpers::{product, test_today, warehouse};

fn setup(dataset: SeedDataset) -> (tempfile::NamedTempFile, SandboxGateway) {
    let (temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    let conn = open_sqlite_connection(&db_path).expect("无法打开数据库");
    let repo = Arc::new(InventoryRepository::new(Arc::new(Mutex::new(conn))));
    reset_with(&repo, &dataset).expect("写入种子数据失败");
    (temp_file, SandboxGateway::new(repo).with_today(test_today()))
}

#[tokio::test]
async fn test_server_filter_matches_client_evaluator() {
    let dataset = demo_dataset();
    let (_db, gateway) = setup(dataset.clone());

    let searches = ["", "washer", "BRG", "p-101", "nothing-matches"];
    let warehouses = [
        WarehouseFilter::All,
        WarehouseFilter::Code("BLR-A".to_string()),
        WarehouseFilter::Code("PNQ-C".to_string()),
    ];
    let statuses = [
        StatusFilter::All,
        StatusFilter::Only(ProductStatus::Healthy),
        StatusFilter::Only(ProductStatus::Low),
        StatusFilter::Only(ProductStatus::Critical),
    ];

    for search in searches {
        for warehouse in &warehouses {
            for status in statuses {
                let filters = Filters {
                    search: search.to_string(),
                    warehouse: warehouse.clone(),
                    status,
                    date_range: DateRange::D7,
                };
                let server = gateway
                    .list_products(&ListProducts::from_filters(&filters))
                    .await
                    .unwrap();
                let client = filter_products(&dataset.products, &filters);
                assert_eq!(server, client, "筛选不一致: {:?}", filters);
            }
        }
    }
}

#[tokio::test]
async fn test_kpi_points_follow_range() {
    let (_db, gateway) = setup(demo_dataset());

    for range in DateRange::ALL {
        let points = gateway.list_kpis(&ListKpis { range }).await.unwrap();
        assert_eq!(points.len(), range.days() as usize);
        assert_eq!(points.last().unwrap().date, test_today());
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
    }
}

#[tokio::test]
async fn test_transfer_accumulates_existing_destination_row() {
    let source = product("A", "W1", 40, 10);
    let mut existing = product("A2", "W2", 5, 3);
    // 同名同 SKU 视为同一产品
    existing.name = source.name.clone();
    existing.sku = source.sku.clone();
    let dataset = SeedDataset {
        warehouses: vec![warehouse("W1"), warehouse("W2")],
        products: vec![source, existing],
    };
    let (_db, gateway) = setup(dataset);

    let destination = gateway
        .transfer_stock(&TransferStock {
            id: "A".to_string(),
            from_warehouse: "W1".to_string(),
            to_warehouse: "W2".to_string(),
            qty: 15,
        })
        .await
        .unwrap();

    assert_eq!(destination.id, "A2");
    assert_eq!(destination.stock, 20);
    assert_eq!(destination.demand, 3);

    let all = gateway
        .list_products(&ListProducts::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].stock, 25);
}

#[tokio::test]
async fn test_transfer_rejected_after_concurrent_modification() {
    let (_db, gateway) = setup(demo_dataset());

    // 另一位用户先调走了大部分库存
    gateway
        .transfer_stock(&TransferStock {
            id: "P-1008".to_string(),
            from_warehouse: "BLR-A".to_string(),
            to_warehouse: "PNQ-C".to_string(),
            qty: 25,
        })
        .await
        .unwrap();

    // 基于旧数据（库存 30）发起的调拨
    let err = gateway
        .transfer_stock(&TransferStock {
            id: "P-1008".to_string(),
            from_warehouse: "BLR-A".to_string(),
            to_warehouse: "DEL-B".to_string(),
            qty: 10,
        })
        .await
        .unwrap_err();

    match err {
        GatewayError::Rejected {
            operation,
            messages,
        } => {
            assert_eq!(operation, "TransferStock");
            assert_eq!(messages, vec!["Insufficient stock for transfer".to_string()]);
        }
        other => panic!("期望 Rejected,实际: {:?}", other),
    }

    let remaining = gateway.repository().find_product("P-1008").unwrap().unwrap();
    assert_eq!(remaining.stock, 5);
}

#[tokio::test]
async fn test_update_demand_unknown_product() {
    let (_db, gateway) = setup(demo_dataset());

    let err = gateway
        .update_demand(&UpdateDemand {
            id: "missing".to_string(),
            demand: 1,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Rejected { .. }));
}

#[tokio::test]
async fn test_summary_tracks_mutations() {
    let (_db, gateway) = setup(demo_dataset());

    gateway
        .update_demand(&UpdateDemand {
            id: "P-1004".to_string(),
            demand: 24,
        })
        .await
        .unwrap();

    let summary = gateway.get_kpi_summary().await.unwrap();
    assert_eq!(summary.total_demand, 1260 - 96);
    // Σmin 不变: 1074 / 1164
    assert_eq!(summary.fill_rate, 92.3);
}

#[tokio::test]
async fn test_snapshot_queries_run_concurrently() {
    let (temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    let conn = open_sqlite_connection(&db_path).expect("无法打开数据库");
    let repo = Arc::new(InventoryRepository::new(Arc::new(Mutex::new(conn))));
    reset_with(&repo, &demo_dataset()).expect("写入种子数据失败");
    let gateway = SandboxGateway::new(repo)
        .with_today(test_today())
        .with_latency(Duration::from_millis(150));
    let api = DashboardApi::new(Arc::new(gateway), None);

    let started = Instant::now();
    let snapshot = api
        .load_snapshot(&Filters::default(), DateRange::D14)
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(snapshot.kpis.len(), 14);
    // 四个查询串行至少 600ms
    assert!(elapsed < Duration::from_millis(500), "耗时 {:?}", elapsed);

    // 第二次全部命中缓存
    let started = Instant::now();
    api.load_snapshot(&Filters::default(), DateRange::D14)
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_millis(100));
    drop(temp_file);
}
