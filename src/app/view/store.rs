// ==========================================
// SupplySight 库存驾驶舱 - 视图状态机
// ==========================================
// reduce(state, action) -> (新状态, 副作用列表)
// - 纯函数: 不做 IO,远程工作以 Effect 描述,由控制器执行
// - 每个查询槽位只接受最近一次发出的请求结果（防止旧响应覆盖）
// - 变更按请求序号逐个跟踪,结果一律接受并通知
// - 提交前校验表单,非法输入只产生错误通知,不产生副作用
// ==========================================

use std::collections::BTreeMap;

use crate::api::error::ApiError;
use crate::api::validator::{ActionValidator, TransferStockRequest};
use crate::domain::filters::Filters;
use crate::domain::kpi::{KpiPoint, KpiSummary};
use crate::domain::product::{Product, Warehouse};
use crate::domain::types::{DateRange, StatusFilter, WarehouseFilter};
use crate::engine::filter::filter_products;
use crate::engine::pagination::{Pager, DEFAULT_PAGE_SIZE};
use crate::i18n::{t, t_with_args};

/// 请求序号（单调递增）
pub type RequestId = u64;

/// 查询槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Products,
    Warehouses,
    Kpis,
    Summary,
}

/// 在途变更
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingMutation {
    UpdateDemand { product_id: String, demand: u32 },
    TransferStock(TransferStockRequest),
}

impl PendingMutation {
    pub fn product_id(&self) -> &str {
        match self {
            Self::UpdateDemand { product_id, .. } => product_id,
            Self::TransferStock(request) => &request.product_id,
        }
    }
}

/// 远程失败（可克隆,便于在状态中保存）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub code: String,
    pub message: String,
}

impl From<ApiError> for Failure {
    fn from(err: ApiError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.user_message(),
        }
    }
}

pub type Outcome<T> = Result<T, Failure>;

// ==========================================
// 通知
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
}

// ==========================================
// 详情抽屉
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DrawerState {
    pub product: Option<Product>,
    pub demand_input: String,
    pub qty_input: String,
    pub target: Option<String>,
    pub demand_submitting: bool,
    pub transfer_submitting: bool,
}

impl DrawerState {
    pub fn is_open(&self) -> bool {
        self.product.is_some()
    }

    fn open(product: Product) -> Self {
        Self {
            demand_input: product.demand.to_string(),
            product: Some(product),
            ..Self::default()
        }
    }
}

// ==========================================
// ViewState - 驾驶舱视图状态
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub filters: Filters,
    pub page: usize,
    pub page_size: usize,

    pub products: Vec<Product>,
    pub products_loading: bool,
    pub warehouses: Vec<Warehouse>,
    pub kpis: Vec<KpiPoint>,
    pub kpis_loading: bool,
    pub summary: Option<KpiSummary>,
    pub summary_loading: bool,

    pub drawer: DrawerState,
    pub notifications: Vec<Notification>,

    /// 各查询槽位最近一次发出、尚未返回的请求
    pub in_flight: BTreeMap<Slot, RequestId>,
    /// 尚未返回的变更（按请求序号）
    pub pending_mutations: BTreeMap<RequestId, PendingMutation>,
    pub next_request_id: RequestId,
    pub next_notification_id: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, DateRange::default())
    }
}

impl ViewState {
    pub fn new(page_size: usize, default_range: DateRange) -> Self {
        Self {
            filters: Filters {
                date_range: default_range,
                ..Filters::default()
            },
            page: 1,
            page_size: page_size.max(1),
            products: Vec::new(),
            products_loading: false,
            warehouses: Vec::new(),
            kpis: Vec::new(),
            kpis_loading: false,
            summary: None,
            summary_loading: false,
            drawer: DrawerState::default(),
            notifications: Vec::new(),
            in_flight: BTreeMap::new(),
            pending_mutations: BTreeMap::new(),
            next_request_id: 1,
            next_notification_id: 1,
        }
    }

    pub fn pager(&self) -> Pager {
        Pager::new(self.page_size)
    }

    /// 当前筛选下可见的产品（客户端求值器复核后端结果）
    pub fn visible_products(&self) -> Vec<Product> {
        filter_products(&self.products, &self.filters)
    }

    /// 无在途请求
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty() && self.pending_mutations.is_empty()
    }

    fn next_id(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    fn issue(&mut self, slot: Slot) -> RequestId {
        let id = self.next_id();
        self.in_flight.insert(slot, id);
        id
    }

    fn begin_mutation(&mut self, mutation: PendingMutation) -> RequestId {
        let id = self.next_id();
        self.pending_mutations.insert(id, mutation);
        id
    }

    /// 取出变更记录;未知序号返回 None
    fn finish_mutation(&mut self, request_id: RequestId) -> Option<PendingMutation> {
        let mutation = self.pending_mutations.remove(&request_id);
        if mutation.is_none() {
            tracing::warn!(request_id, "收到未登记的变更结果");
        }
        mutation
    }

    /// 抽屉的提交中标记跟随当前产品的在途变更
    fn sync_drawer_submitting(&mut self) {
        let Some(selected_id) = self.drawer.product.as_ref().map(|p| p.id.clone()) else {
            return;
        };
        let pending = |want_transfer: bool| {
            self.pending_mutations.values().any(|m| {
                m.product_id() == selected_id
                    && matches!(m, PendingMutation::TransferStock(_)) == want_transfer
            })
        };
        let (demand, transfer) = (pending(false), pending(true));
        self.drawer.demand_submitting = demand;
        self.drawer.transfer_submitting = transfer;
    }

    /// 结果是否属于该槽位最近一次请求;是则结束该槽位
    fn accept(&mut self, slot: Slot, request_id: RequestId) -> bool {
        match self.in_flight.get(&slot) {
            Some(&latest) if latest == request_id => {
                self.in_flight.remove(&slot);
                true
            }
            latest => {
                tracing::debug!(?slot, request_id, ?latest, "丢弃过期响应");
                false
            }
        }
    }

    fn notify(&mut self, level: NotificationLevel, message: String) {
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        self.notifications.push(Notification { id, level, message });
    }

    fn reclamp_page(&mut self) {
        let total = self.visible_products().len();
        self.page = self.pager().clamp(self.page, total);
    }

    fn fetch_products(&mut self) -> Effect {
        self.products_loading = true;
        let request_id = self.issue(Slot::Products);
        Effect::FetchProducts {
            request_id,
            filters: self.filters.clone(),
        }
    }

    fn fetch_warehouses(&mut self) -> Effect {
        let request_id = self.issue(Slot::Warehouses);
        Effect::FetchWarehouses { request_id }
    }

    fn fetch_kpis(&mut self) -> Effect {
        self.kpis_loading = true;
        let request_id = self.issue(Slot::Kpis);
        Effect::FetchKpis {
            request_id,
            range: self.filters.date_range,
        }
    }

    fn fetch_summary(&mut self) -> Effect {
        self.summary_loading = true;
        let request_id = self.issue(Slot::Summary);
        Effect::FetchSummary { request_id }
    }

    /// 变更成功后重新拉取所有产品派生数据
    fn refetch_product_derived(&mut self) -> Vec<Effect> {
        vec![self.fetch_products(), self.fetch_summary(), self.fetch_kpis()]
    }
}

// ==========================================
// 动作 / 副作用
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    /// 首次加载
    Init,
    /// 手动刷新（清空缓存后全部重新拉取）
    Refresh,

    SetSearch(String),
    SetWarehouse(WarehouseFilter),
    SetStatus(StatusFilter),
    SetDateRange(DateRange),

    NextPage,
    PrevPage,
    GoToPage(usize),

    OpenProduct(String),
    CloseDrawer,
    EditDemand(String),
    EditQty(String),
    SelectTarget(Option<String>),
    SubmitDemand,
    SubmitTransfer,

    DismissNotification(u64),
    DismissAll,

    ProductsLoaded {
        request_id: RequestId,
        result: Outcome<Vec<Product>>,
    },
    WarehousesLoaded {
        request_id: RequestId,
        result: Outcome<Vec<Warehouse>>,
    },
    KpisLoaded {
        request_id: RequestId,
        result: Outcome<Vec<KpiPoint>>,
    },
    SummaryLoaded {
        request_id: RequestId,
        result: Outcome<KpiSummary>,
    },
    DemandUpdated {
        request_id: RequestId,
        result: Outcome<Product>,
    },
    StockTransferred {
        request_id: RequestId,
        result: Outcome<Product>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    InvalidateCache,
    FetchProducts {
        request_id: RequestId,
        filters: Filters,
    },
    FetchWarehouses {
        request_id: RequestId,
    },
    FetchKpis {
        request_id: RequestId,
        range: DateRange,
    },
    FetchSummary {
        request_id: RequestId,
    },
    UpdateDemand {
        request_id: RequestId,
        product_id: String,
        demand: u32,
    },
    TransferStock {
        request_id: RequestId,
        request: TransferStockRequest,
    },
}

// ==========================================
// reduce - 状态转换
// ==========================================

/// 状态转换
///
/// # 参数
/// - state: 当前状态（不修改）
/// - action: 动作
///
/// # 返回
/// - (ViewState, Vec<Effect>): 新状态与需要执行的远程工作
pub fn reduce(state: &ViewState, action: ViewAction) -> (ViewState, Vec<Effect>) {
    let mut next = state.clone();
    let effects = apply(&mut next, action);
    (next, effects)
}

fn apply(s: &mut ViewState, action: ViewAction) -> Vec<Effect> {
    match action {
        ViewAction::Init => vec![
            s.fetch_warehouses(),
            s.fetch_products(),
            s.fetch_summary(),
            s.fetch_kpis(),
        ],
        ViewAction::Refresh => vec![
            Effect::InvalidateCache,
            s.fetch_warehouses(),
            s.fetch_products(),
            s.fetch_summary(),
            s.fetch_kpis(),
        ],

        // ===== 筛选: 页码回到 1 并重新拉取产品 =====
        ViewAction::SetSearch(search) => {
            if s.filters.search == search {
                return Vec::new();
            }
            s.filters.search = search;
            s.page = 1;
            vec![s.fetch_products()]
        }
        ViewAction::SetWarehouse(warehouse) => {
            if s.filters.warehouse == warehouse {
                return Vec::new();
            }
            s.filters.warehouse = warehouse;
            s.page = 1;
            vec![s.fetch_products()]
        }
        ViewAction::SetStatus(status) => {
            if s.filters.status == status {
                return Vec::new();
            }
            s.filters.status = status;
            s.page = 1;
            vec![s.fetch_products()]
        }
        ViewAction::SetDateRange(range) => {
            if s.filters.date_range == range {
                return Vec::new();
            }
            s.filters.date_range = range;
            vec![s.fetch_kpis()]
        }

        // ===== 分页 =====
        ViewAction::NextPage => {
            let total = s.visible_products().len();
            s.page = s.pager().next(s.page, total);
            Vec::new()
        }
        ViewAction::PrevPage => {
            let total = s.visible_products().len();
            s.page = s.pager().previous(s.page, total);
            Vec::new()
        }
        ViewAction::GoToPage(page) => {
            let total = s.visible_products().len();
            s.page = s.pager().clamp(page, total);
            Vec::new()
        }

        // ===== 详情抽屉 =====
        ViewAction::OpenProduct(id) => {
            match s.products.iter().find(|p| p.id == id) {
                Some(product) => {
                    s.drawer = DrawerState::open(product.clone());
                    s.sync_drawer_submitting();
                }
                None => s.notify(
                    NotificationLevel::Error,
                    t_with_args("notify.product_not_found", &[("id", &id)]),
                ),
            }
            Vec::new()
        }
        ViewAction::CloseDrawer => {
            s.drawer = DrawerState::default();
            Vec::new()
        }
        ViewAction::EditDemand(raw) => {
            s.drawer.demand_input = raw;
            Vec::new()
        }
        ViewAction::EditQty(raw) => {
            s.drawer.qty_input = raw;
            Vec::new()
        }
        ViewAction::SelectTarget(target) => {
            s.drawer.target = target;
            Vec::new()
        }
        ViewAction::SubmitDemand => submit_demand(s),
        ViewAction::SubmitTransfer => submit_transfer(s),

        // ===== 通知 =====
        ViewAction::DismissNotification(id) => {
            s.notifications.retain(|n| n.id != id);
            Vec::new()
        }
        ViewAction::DismissAll => {
            s.notifications.clear();
            Vec::new()
        }

        // ===== 查询结果 =====
        ViewAction::ProductsLoaded { request_id, result } => {
            if !s.accept(Slot::Products, request_id) {
                return Vec::new();
            }
            s.products_loading = false;
            match result {
                Ok(products) => {
                    s.products = products;
                    s.reclamp_page();
                    refresh_selected(s);
                }
                Err(failure) => load_failed(s, &failure),
            }
            Vec::new()
        }
        ViewAction::WarehousesLoaded { request_id, result } => {
            if !s.accept(Slot::Warehouses, request_id) {
                return Vec::new();
            }
            match result {
                Ok(warehouses) => s.warehouses = warehouses,
                Err(failure) => load_failed(s, &failure),
            }
            Vec::new()
        }
        ViewAction::KpisLoaded { request_id, result } => {
            if !s.accept(Slot::Kpis, request_id) {
                return Vec::new();
            }
            s.kpis_loading = false;
            match result {
                Ok(kpis) => s.kpis = kpis,
                Err(failure) => load_failed(s, &failure),
            }
            Vec::new()
        }
        ViewAction::SummaryLoaded { request_id, result } => {
            if !s.accept(Slot::Summary, request_id) {
                return Vec::new();
            }
            s.summary_loading = false;
            match result {
                Ok(summary) => s.summary = Some(summary),
                Err(failure) => load_failed(s, &failure),
            }
            Vec::new()
        }

        // ===== 变更结果 =====
        ViewAction::DemandUpdated { request_id, result } => {
            if s.finish_mutation(request_id).is_none() {
                return Vec::new();
            }
            let effects = match result {
                Ok(product) => {
                    let demand = product.demand.to_string();
                    s.notify(
                        NotificationLevel::Success,
                        t_with_args(
                            "notify.demand_updated",
                            &[("name", &product.name), ("demand", &demand)],
                        ),
                    );
                    if s.drawer.product.as_ref().map(|p| p.id.as_str()) == Some(product.id.as_str()) {
                        s.drawer.demand_input = demand;
                        s.drawer.product = Some(product);
                    }
                    s.refetch_product_derived()
                }
                Err(failure) => {
                    s.notify(
                        NotificationLevel::Error,
                        t_with_args("notify.demand_failed", &[("message", &failure.message)]),
                    );
                    Vec::new()
                }
            };
            s.sync_drawer_submitting();
            effects
        }
        ViewAction::StockTransferred { request_id, result } => {
            let Some(PendingMutation::TransferStock(request)) = s.finish_mutation(request_id) else {
                return Vec::new();
            };
            let effects = match result {
                Ok(destination) => {
                    let qty = request.qty.to_string();
                    s.notify(
                        NotificationLevel::Success,
                        t_with_args(
                            "notify.stock_transferred",
                            &[
                                ("qty", &qty),
                                ("name", &destination.name),
                                ("to", &destination.warehouse),
                            ],
                        ),
                    );
                    // 抽屉仍停留在调拨源产品时清空表单
                    if s.drawer.product.as_ref().map(|p| p.id.as_str())
                        == Some(request.product_id.as_str())
                    {
                        s.drawer.qty_input.clear();
                        s.drawer.target = None;
                    }
                    s.refetch_product_derived()
                }
                Err(failure) => {
                    s.notify(
                        NotificationLevel::Error,
                        t_with_args("notify.transfer_failed", &[("message", &failure.message)]),
                    );
                    Vec::new()
                }
            };
            s.sync_drawer_submitting();
            effects
        }
    }
}

fn load_failed(s: &mut ViewState, failure: &Failure) {
    s.notify(
        NotificationLevel::Error,
        t_with_args("notify.load_failed", &[("message", &failure.message)]),
    );
}

/// 产品列表刷新后同步抽屉中的产品;产品已不在列表中则关闭抽屉
fn refresh_selected(s: &mut ViewState) {
    let Some(selected_id) = s.drawer.product.as_ref().map(|p| p.id.clone()) else {
        return;
    };
    match s.products.iter().find(|p| p.id == selected_id) {
        Some(fresh) => s.drawer.product = Some(fresh.clone()),
        None => {
            tracing::debug!(product_id = %selected_id, "选中产品已不在列表中,关闭详情");
            s.drawer = DrawerState::default();
        }
    }
}

fn submit_demand(s: &mut ViewState) -> Vec<Effect> {
    let Some(product) = s.drawer.product.clone() else {
        s.notify(NotificationLevel::Error, t("notify.no_product_selected"));
        return Vec::new();
    };
    if s.drawer.demand_submitting {
        return Vec::new();
    }

    match ActionValidator::parse_demand(&s.drawer.demand_input) {
        Ok(demand) => {
            s.drawer.demand_submitting = true;
            let request_id = s.begin_mutation(PendingMutation::UpdateDemand {
                product_id: product.id.clone(),
                demand,
            });
            vec![Effect::UpdateDemand {
                request_id,
                product_id: product.id,
                demand,
            }]
        }
        Err(err) => {
            s.notify(NotificationLevel::Error, err.user_message());
            Vec::new()
        }
    }
}

fn submit_transfer(s: &mut ViewState) -> Vec<Effect> {
    let Some(product) = s.drawer.product.clone() else {
        s.notify(NotificationLevel::Error, t("notify.no_product_selected"));
        return Vec::new();
    };
    if s.drawer.transfer_submitting {
        return Vec::new();
    }

    let validated = ActionValidator::validate_transfer(
        &product,
        &s.drawer.qty_input,
        s.drawer.target.as_deref(),
        &s.warehouses,
    );
    match validated {
        Ok(request) => {
            s.drawer.transfer_submitting = true;
            let request_id = s.begin_mutation(PendingMutation::TransferStock(request.clone()));
            vec![Effect::TransferStock {
                request_id,
                request,
            }]
        }
        Err(err) => {
            s.notify(NotificationLevel::Error, err.user_message());
            Vec::new()
        }
    }
}
