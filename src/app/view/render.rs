// ==========================================
// SupplySight 库存驾驶舱 - 文本渲染
// ==========================================
// 将 DashboardScreen 渲染为纯文本（终端输出）
// ==========================================

use std::fmt::Write as _;

use crate::app::view::screen::{status_label, DashboardScreen, DrawerView, ProductTable};
use crate::app::view::store::NotificationLevel;
use crate::domain::types::ProductStatus;
use crate::i18n::{t, t_with_args};

/// 趋势条最大宽度（字符）
const BAR_WIDTH: usize = 30;

/// 渲染整屏
pub fn render(screen: &DashboardScreen) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", t("render.title"));

    render_notifications(&mut out, screen);
    render_cards(&mut out, screen);
    render_chart(&mut out, screen);
    render_filters(&mut out, screen);
    render_table(&mut out, &screen.table);
    if let Some(drawer) = &screen.drawer {
        render_drawer(&mut out, drawer);
    }
    out
}

fn render_notifications(out: &mut String, screen: &DashboardScreen) {
    for n in &screen.notifications {
        let tag = match n.level {
            NotificationLevel::Success => "OK ",
            NotificationLevel::Error => "ERR",
        };
        let _ = writeln!(out, "[{}] #{} {}", tag, n.id, n.message);
    }
}

fn render_cards(out: &mut String, screen: &DashboardScreen) {
    if screen.cards.is_empty() {
        let _ = writeln!(out, "{}", t("render.loading"));
        return;
    }
    let line = screen
        .cards
        .iter()
        .map(|card| format!("{}: {}", card.label, card.value))
        .collect::<Vec<_>>()
        .join("  |  ");
    let _ = writeln!(out, "{}", line);
}

fn render_chart(out: &mut String, screen: &DashboardScreen) {
    let range = screen.filter_bar.range.to_string();
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", t_with_args("render.trend", &[("range", &range)]));
    if screen.chart.is_empty() {
        let key = if screen.chart_loading {
            "render.loading"
        } else {
            "render.no_data"
        };
        let _ = writeln!(out, "  {}", t(key));
        return;
    }

    let max = screen
        .chart
        .iter()
        .map(|p| p.stock.max(p.demand))
        .max()
        .unwrap_or(0)
        .max(1);
    let bar = |value: i64| "#".repeat(bar_len(value, max));

    for point in &screen.chart {
        let _ = writeln!(
            out,
            "  {:>7}  S {:>7} {:<width$}  D {:>7} {}",
            point.label,
            point.stock,
            bar(point.stock),
            point.demand,
            bar(point.demand),
            width = BAR_WIDTH
        );
    }
}

/// 柱长（按 max 缩放到 BAR_WIDTH;i128 计算避免溢出）
fn bar_len(value: i64, max: i64) -> usize {
    let scaled = i128::from(value.max(0)) * BAR_WIDTH as i128 / i128::from(max.max(1));
    scaled.clamp(0, BAR_WIDTH as i128) as usize
}

fn render_filters(out: &mut String, screen: &DashboardScreen) {
    let bar = &screen.filter_bar;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{}: \"{}\"  {}: {}  {}: {}",
        t("render.search"),
        bar.search,
        t("render.warehouse"),
        bar.warehouse,
        t("render.status"),
        bar.status
    );
    let b = &screen.breakdown;
    let _ = writeln!(
        out,
        "{} {}  {} {}  {} {}",
        status_label(ProductStatus::Healthy),
        b.healthy,
        status_label(ProductStatus::Low),
        b.low,
        status_label(ProductStatus::Critical),
        b.critical
    );
}

fn render_table(out: &mut String, table: &ProductTable) {
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<12} {:<24} {:<14} {:<8} {:>7} {:>7}  {}",
        "ID",
        t("render.col_name"),
        "SKU",
        t("render.warehouse"),
        t("render.col_stock"),
        t("render.col_demand"),
        t("render.status")
    );

    if table.rows.is_empty() {
        let key = if table.loading {
            "render.loading"
        } else {
            "render.empty"
        };
        let _ = writeln!(out, "  {}", t(key));
    }
    for row in &table.rows {
        let p = &row.product;
        let _ = writeln!(
            out,
            "{:<12} {:<24} {:<14} {:<8} {:>7} {:>7}  {}",
            p.id,
            truncate(&p.name, 24),
            p.sku,
            p.warehouse,
            p.stock,
            p.demand,
            status_label(row.status)
        );
    }

    let (page, total_pages, count, first, last) = (
        table.page.to_string(),
        table.total_pages.to_string(),
        table.total_items.to_string(),
        table.first_index.to_string(),
        table.last_index.to_string(),
    );
    let _ = writeln!(
        out,
        "{}",
        t_with_args(
            "render.page_footer",
            &[
                ("page", &page),
                ("total", &total_pages),
                ("first", &first),
                ("last", &last),
                ("count", &count),
            ],
        )
    );
}

fn render_drawer(out: &mut String, drawer: &DrawerView) {
    let p = &drawer.product;
    let _ = writeln!(out);
    let _ = writeln!(out, "-- {}: {} ({}) --", t("render.drawer_title"), p.name, p.id);
    let _ = writeln!(
        out,
        "SKU {}  {} {}  {} {}  {} {}  {}",
        p.sku,
        t("render.warehouse"),
        p.warehouse,
        t("render.col_stock"),
        p.stock,
        t("render.col_demand"),
        p.demand,
        status_label(drawer.status)
    );

    let pending = |submitting: bool| if submitting { " ..." } else { "" };
    let _ = writeln!(
        out,
        "  [{}] {}{}",
        t("render.update_demand"),
        drawer.demand_input,
        pending(drawer.demand_submitting)
    );

    let targets = drawer
        .targets
        .iter()
        .map(|w| w.code.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(
        out,
        "  [{}] {} → {}{}  ({}: {})",
        t("render.transfer_stock"),
        if drawer.qty_input.is_empty() { "-" } else { drawer.qty_input.as_str() },
        drawer.target.as_deref().unwrap_or("-"),
        pending(drawer.transfer_submitting),
        t("render.targets"),
        targets
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
