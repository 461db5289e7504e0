// ==========================================
// SupplySight 库存驾驶舱 - 行命令解析
// ==========================================
// 终端交互的输入层: 一行文本 → 一组 ViewAction
// 例:
//   search bolt        warehouse BLR-A      status critical
//   range 30d          next / prev / page 3
//   open P-1001        demand 150           transfer 5 PNQ-C
//   refresh            dismiss [id|all]     quit
// ==========================================

use std::str::FromStr;
use thiserror::Error;

use crate::app::view::store::ViewAction;
use crate::domain::types::{DateRange, StatusFilter, WarehouseFilter};

/// 命令解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("未知命令: {0}（输入 help 查看帮助）")]
    Unknown(String),

    #[error("命令 {command} 缺少参数: {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("命令 {command} 参数无效: {reason}")]
    InvalidArgument {
        command: &'static str,
        reason: String,
    },
}

/// 解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// 依次分发的动作
    Actions(Vec<ViewAction>),
    /// 重新渲染当前画面
    Show,
    Help,
    Quit,
}

/// 帮助文本
pub const HELP: &str = "\
search <text>          按名称/SKU/ID 搜索（无参数清空）
warehouse <code|all>   按仓库筛选
status <healthy|low|critical|all>
range <7d|14d|30d>     趋势日期范围
next | prev | page <n> 翻页
open <id> | close      打开/关闭产品详情
demand <n>             更新需求并提交
qty <n> | target <code> | transfer [<qty> <code>]
refresh                清空缓存并重新加载
dismiss [<id>|all]     关闭通知
show | help | quit";

/// 解析一行命令
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    let actions = match name.to_ascii_lowercase().as_str() {
        "" | "show" => return Ok(Command::Show),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" | "q" => return Ok(Command::Quit),

        "search" => vec![ViewAction::SetSearch(rest.to_string())],
        "warehouse" | "wh" => {
            let code = args.next().ok_or(CommandError::MissingArgument {
                command: "warehouse",
                argument: "code",
            })?;
            vec![ViewAction::SetWarehouse(WarehouseFilter::from(code))]
        }
        "status" => {
            let raw = args.next().ok_or(CommandError::MissingArgument {
                command: "status",
                argument: "status",
            })?;
            let status = StatusFilter::from_str(raw).map_err(|e| CommandError::InvalidArgument {
                command: "status",
                reason: e.to_string(),
            })?;
            vec![ViewAction::SetStatus(status)]
        }
        "range" => {
            let raw = args.next().ok_or(CommandError::MissingArgument {
                command: "range",
                argument: "range",
            })?;
            let range = DateRange::from_str(raw).map_err(|e| CommandError::InvalidArgument {
                command: "range",
                reason: e.to_string(),
            })?;
            vec![ViewAction::SetDateRange(range)]
        }

        "next" | "n" => vec![ViewAction::NextPage],
        "prev" | "p" => vec![ViewAction::PrevPage],
        "page" => {
            let raw = args.next().ok_or(CommandError::MissingArgument {
                command: "page",
                argument: "n",
            })?;
            let page = raw
                .parse::<usize>()
                .map_err(|e| CommandError::InvalidArgument {
                    command: "page",
                    reason: format!("{}: {}", raw, e),
                })?;
            vec![ViewAction::GoToPage(page)]
        }

        "open" => {
            let id = args.next().ok_or(CommandError::MissingArgument {
                command: "open",
                argument: "id",
            })?;
            vec![ViewAction::OpenProduct(id.to_string())]
        }
        "close" => vec![ViewAction::CloseDrawer],

        // 原始文本交给状态机校验,这里不做数值解析
        "demand" => {
            let raw = args.next().ok_or(CommandError::MissingArgument {
                command: "demand",
                argument: "n",
            })?;
            vec![
                ViewAction::EditDemand(raw.to_string()),
                ViewAction::SubmitDemand,
            ]
        }
        "qty" => {
            let raw = args.next().ok_or(CommandError::MissingArgument {
                command: "qty",
                argument: "n",
            })?;
            vec![ViewAction::EditQty(raw.to_string())]
        }
        "target" => vec![ViewAction::SelectTarget(args.next().map(str::to_string))],
        "transfer" => {
            let mut actions = Vec::new();
            if let Some(qty) = args.next() {
                actions.push(ViewAction::EditQty(qty.to_string()));
            }
            if let Some(target) = args.next() {
                actions.push(ViewAction::SelectTarget(Some(target.to_string())));
            }
            actions.push(ViewAction::SubmitTransfer);
            actions
        }

        "refresh" | "r" => vec![ViewAction::Refresh],
        "dismiss" => match args.next() {
            None | Some("all") => vec![ViewAction::DismissAll],
            Some(raw) => {
                let id = raw
                    .trim_start_matches('#')
                    .parse::<u64>()
                    .map_err(|e| CommandError::InvalidArgument {
                        command: "dismiss",
                        reason: format!("{}: {}", raw, e),
                    })?;
                vec![ViewAction::DismissNotification(id)]
            }
        },

        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Command::Actions(actions))
}
