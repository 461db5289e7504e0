// ==========================================
// SupplySight 库存驾驶舱 - 视图控制器
// ==========================================
// 职责: 持有 ViewState,分发动作,执行副作用
// - reduce 产生的 Effect 在 tokio 上并发执行
// - 结果经 mpsc 通道回送为 *Loaded / *Updated 动作
// - 所有状态变更都在控制器所在任务中串行发生
// ==========================================

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::DashboardApi;
use crate::app::view::screen::DashboardScreen;
use crate::app::view::store::{reduce, Effect, Failure, ViewAction, ViewState};

// ==========================================
// DashboardController
// ==========================================
pub struct DashboardController {
    api: Arc<DashboardApi>,
    state: ViewState,
    tx: mpsc::UnboundedSender<ViewAction>,
    rx: mpsc::UnboundedReceiver<ViewAction>,
}

impl DashboardController {
    /// 创建控制器
    ///
    /// # 参数
    /// - api: 驾驶舱API
    /// - initial: 初始视图状态（分页大小、默认日期范围）
    pub fn new(api: Arc<DashboardApi>, initial: ViewState) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            state: initial,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// 组合当前画面
    pub fn screen(&self) -> DashboardScreen {
        DashboardScreen::compose(&self.state)
    }

    /// 分发动作（需在 tokio 运行时内调用）
    pub fn dispatch(&mut self, action: ViewAction) {
        let (next, effects) = reduce(&self.state, action);
        self.state = next;
        for effect in effects {
            self.run_effect(effect);
        }
    }

    /// 等待下一条远程结果并应用
    ///
    /// # 返回
    /// - true: 已应用一条结果
    /// - false: 通道已关闭
    pub async fn next_event(&mut self) -> bool {
        match self.rx.recv().await {
            Some(action) => {
                self.dispatch(action);
                true
            }
            None => false,
        }
    }

    /// 持续应用远程结果,直到没有在途请求
    pub async fn settle(&mut self) {
        while !self.state.is_idle() {
            if !self.next_event().await {
                break;
            }
        }
    }

    /// 分发动作并等待其引发的远程工作完成
    pub async fn dispatch_and_settle(&mut self, action: ViewAction) {
        self.dispatch(action);
        self.settle().await;
    }

    fn run_effect(&self, effect: Effect) {
        if let Effect::InvalidateCache = effect {
            if let Err(e) = self.api.invalidate_all() {
                tracing::warn!(error = %e, "清空缓存失败");
            }
            return;
        }

        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if let Some(action) = execute(&api, effect).await {
                // 控制器已销毁时丢弃结果
                let _ = tx.send(action);
            }
        });
    }
}

/// 执行副作用并转换为结果动作
async fn execute(api: &DashboardApi, effect: Effect) -> Option<ViewAction> {
    let action = match effect {
        Effect::InvalidateCache => return None,
        Effect::FetchProducts {
            request_id,
            filters,
        } => ViewAction::ProductsLoaded {
            request_id,
            result: api.list_products(&filters).await.map_err(Failure::from),
        },
        Effect::FetchWarehouses { request_id } => ViewAction::WarehousesLoaded {
            request_id,
            result: api.list_warehouses().await.map_err(Failure::from),
        },
        Effect::FetchKpis { request_id, range } => ViewAction::KpisLoaded {
            request_id,
            result: api.list_kpis(range).await.map_err(Failure::from),
        },
        Effect::FetchSummary { request_id } => ViewAction::SummaryLoaded {
            request_id,
            result: api.get_kpi_summary().await.map_err(Failure::from),
        },
        Effect::UpdateDemand {
            request_id,
            product_id,
            demand,
        } => ViewAction::DemandUpdated {
            request_id,
            result: api
                .update_demand(&product_id, i64::from(demand))
                .await
                .map_err(Failure::from),
        },
        Effect::TransferStock {
            request_id,
            request,
        } => ViewAction::StockTransferred {
            request_id,
            result: api.transfer_stock(&request).await.map_err(Failure::from),
        },
    };
    Some(action)
}
