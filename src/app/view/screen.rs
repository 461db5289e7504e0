// ==========================================
// SupplySight 库存驾驶舱 - 屏幕视图模型
// ==========================================
// 由 ViewState 组合出一帧完整的驾驶舱画面:
// KPI 卡片 / 趋势图 / 筛选栏 / 产品表（分页）/ 状态分布 / 详情抽屉 / 通知
// 卡片只取后端汇总,不在客户端重算
// ==========================================

use serde::Serialize;

use crate::api::validator::ActionValidator;
use crate::app::view::store::{Notification, ViewState};
use crate::domain::product::{Product, Warehouse};
use crate::domain::types::{DateRange, ProductStatus, FILTER_ALL};
use crate::engine::status::{classify_product, StatusBreakdown};
use crate::i18n::t;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    /// 日期标签,如 "Mar 5"
    pub label: String,
    pub stock: i64,
    pub demand: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterBar {
    pub search: String,
    pub warehouse: String,
    pub warehouse_options: Vec<SelectOption>,
    pub status: String,
    pub status_options: Vec<SelectOption>,
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRow {
    pub product: Product,
    pub status: ProductStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductTable {
    pub rows: Vec<ProductRow>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 首行在结果集中的序号（1 起;空表为 0）
    pub first_index: usize,
    pub last_index: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawerView {
    pub product: Product,
    pub status: ProductStatus,
    pub demand_input: String,
    pub qty_input: String,
    pub target: Option<String>,
    pub targets: Vec<Warehouse>,
    pub demand_submitting: bool,
    pub transfer_submitting: bool,
}

// ==========================================
// DashboardScreen - 一帧驾驶舱画面
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardScreen {
    pub cards: Vec<KpiCard>,
    pub cards_loading: bool,
    pub chart: Vec<ChartPoint>,
    pub chart_loading: bool,
    pub filter_bar: FilterBar,
    pub table: ProductTable,
    pub breakdown: StatusBreakdown,
    pub drawer: Option<DrawerView>,
    #[serde(skip)]
    pub notifications: Vec<Notification>,
}

impl DashboardScreen {
    /// 组合画面
    pub fn compose(state: &ViewState) -> Self {
        let visible = state.visible_products();
        let breakdown = StatusBreakdown::from_products(&visible);

        Self {
            cards: compose_cards(state),
            cards_loading: state.summary_loading && state.summary.is_none(),
            chart: state
                .kpis
                .iter()
                .map(|point| ChartPoint {
                    label: point.date.format("%b %-d").to_string(),
                    stock: point.stock,
                    demand: point.demand,
                })
                .collect(),
            chart_loading: state.kpis_loading && state.kpis.is_empty(),
            filter_bar: compose_filter_bar(state),
            table: compose_table(state, &visible),
            breakdown,
            drawer: compose_drawer(state),
            notifications: state.notifications.clone(),
        }
    }
}

fn compose_cards(state: &ViewState) -> Vec<KpiCard> {
    let Some(summary) = state.summary else {
        return Vec::new();
    };
    vec![
        KpiCard {
            label: t("render.total_stock"),
            value: group_thousands(summary.total_stock),
        },
        KpiCard {
            label: t("render.total_demand"),
            value: group_thousands(summary.total_demand),
        },
        KpiCard {
            label: t("render.fill_rate"),
            value: format!("{:.1}%", summary.fill_rate),
        },
    ]
}

fn compose_filter_bar(state: &ViewState) -> FilterBar {
    let mut warehouse_options = vec![SelectOption {
        value: FILTER_ALL.to_string(),
        label: t("render.all_warehouses"),
    }];
    warehouse_options.extend(state.warehouses.iter().map(|w| SelectOption {
        value: w.code.clone(),
        label: format!("{} ({})", w.name, w.code),
    }));

    let mut status_options = vec![SelectOption {
        value: FILTER_ALL.to_string(),
        label: t("render.all_statuses"),
    }];
    status_options.extend(ProductStatus::ALL.iter().map(|status| SelectOption {
        value: status.as_str().to_string(),
        label: status_label(*status),
    }));

    FilterBar {
        search: state.filters.search.clone(),
        warehouse: state.filters.warehouse.to_string(),
        warehouse_options,
        status: state.filters.status.to_string(),
        status_options,
        range: state.filters.date_range,
    }
}

fn compose_table(state: &ViewState, visible: &[Product]) -> ProductTable {
    let page = state.pager().slice(visible, state.page);
    let rows: Vec<ProductRow> = page
        .items
        .iter()
        .map(|product| ProductRow {
            status: classify_product(product),
            product: product.clone(),
        })
        .collect();

    let (first_index, last_index) = if rows.is_empty() {
        (0, 0)
    } else {
        (page.start + 1, page.start + rows.len())
    };

    ProductTable {
        page: page.page,
        total_pages: page.total_pages,
        total_items: page.total_items,
        first_index,
        last_index,
        has_previous: page.has_previous(),
        has_next: page.has_next(),
        loading: state.products_loading,
        rows,
    }
}

fn compose_drawer(state: &ViewState) -> Option<DrawerView> {
    let drawer = &state.drawer;
    let product = drawer.product.clone()?;
    let targets = ActionValidator::transfer_targets(&product, &state.warehouses)
        .into_iter()
        .cloned()
        .collect();

    Some(DrawerView {
        status: classify_product(&product),
        product,
        demand_input: drawer.demand_input.clone(),
        qty_input: drawer.qty_input.clone(),
        target: drawer.target.clone(),
        targets,
        demand_submitting: drawer.demand_submitting,
        transfer_submitting: drawer.transfer_submitting,
    })
}

/// 状态的本地化名称
pub fn status_label(status: ProductStatus) -> String {
    t(&format!("status.{}", status.as_str()))
}

/// 千分位分组: 1234567 → "1,234,567"
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
