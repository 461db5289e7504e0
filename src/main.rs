// ==========================================
// SupplySight 库存驾驶舱 - 终端主入口
// ==========================================
// 用法:
//   supplysight-dashboard [--db PATH] [--sandbox] [--endpoint URL] [--once [--json]]
// - 默认进入行命令交互（help 查看命令）
// - --once: 加载首屏后输出一次画面并退出
// ==========================================

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, BufReader};

use supplysight_dashboard::app::commands::HELP;
use supplysight_dashboard::app::view::{render, ViewAction, ViewState};
use supplysight_dashboard::app::{
    get_default_db_path, parse_command, AppState, Command, DashboardController,
};
use supplysight_dashboard::config::DataSource;
use supplysight_dashboard::logging;

/// 命令行参数
#[derive(Debug, Default)]
struct CliOptions {
    db_path: Option<String>,
    sandbox: bool,
    endpoint: Option<String>,
    once: bool,
    json: bool,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> anyhow::Result<Self> {
        let mut opts = CliOptions::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => opts.db_path = Some(args.next().context("--db 需要路径参数")?),
                "--endpoint" => opts.endpoint = Some(args.next().context("--endpoint 需要 URL 参数")?),
                "--sandbox" => opts.sandbox = true,
                "--once" => opts.once = true,
                "--json" => opts.json = true,
                "-h" | "--help" => {
                    println!(
                        "supplysight-dashboard [--db PATH] [--sandbox] [--endpoint URL] [--once [--json]]"
                    );
                    std::process::exit(0);
                }
                other => bail!("未知参数: {}", other),
            }
        }
        Ok(opts)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let opts = CliOptions::parse(std::env::args().skip(1))?;

    tracing::info!("==================================================");
    tracing::info!("{} v{}", supplysight_dashboard::APP_NAME, supplysight_dashboard::VERSION);
    tracing::info!("==================================================");

    let db_path = opts.db_path.clone().unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let app = AppState::with_overrides(db_path, |mut config| {
        if opts.sandbox {
            config.data_source = DataSource::Sandbox;
        }
        if let Some(endpoint) = &opts.endpoint {
            config.api_endpoint = endpoint.clone();
        }
        config
    })
    .map_err(anyhow::Error::msg)
    .context("无法初始化AppState")?;

    let initial = ViewState::new(app.config.page_size, app.config.default_range);
    let mut controller = DashboardController::new(app.dashboard_api.clone(), initial);
    controller.dispatch_and_settle(ViewAction::Init).await;

    if opts.once {
        let screen = controller.screen();
        if opts.json {
            println!("{}", serde_json::to_string_pretty(&screen)?);
        } else {
            print!("{}", render(&screen));
        }
        return Ok(());
    }

    print!("{}", render(&controller.screen()));
    println!("> help 查看命令");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{}", HELP),
            Ok(Command::Show) => print!("{}", render(&controller.screen())),
            Ok(Command::Actions(actions)) => {
                for action in actions {
                    controller.dispatch(action);
                }
                controller.settle().await;
                print!("{}", render(&controller.screen()));
            }
            Err(e) => println!("{}", e),
        }
    }

    tracing::info!("退出");
    Ok(())
}
