//! Back-office Server - 管理后台 REST API
//!
//! # 架构概述
//!
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储，通用实体仓储
//! - **认证** (`auth`): Argon2 + 服务端会话 (Cookie)
//! - **服务** (`services`): 实体族写入流程、图片生命周期、图床客户端
//! - **HTTP API** (`api`): 五个实体族的 CRUD 路由与管理员会话接口
//!
//! # 模块结构
//!
//! ```text
//! backoffice-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # 密码哈希、会话、Cookie、提取器
//! ├── services/      # 实体服务、图片处理、图床
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 日志、字段校验
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentAdmin, SessionAuthenticator};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(
            target: "security",
            $($key = $value,)*
            level = $level,
            event = $event
        );
    };
}

/// 日志文件保留天数
const LOG_RETENTION_DAYS: u64 = 14;

/// 设置运行环境: 加载 `.env`，初始化日志
///
/// 日志参数来自 `LOG_LEVEL` / `LOG_JSON` / `LOG_DIR`。
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    // .env 不存在时忽略
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let json = std::env::var("LOG_JSON")
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false);
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty());

    init_logger_with_file(log_level.as_deref(), json, log_dir.as_deref())?;

    if let Some(dir) = &log_dir {
        match cleanup_old_logs(dir, LOG_RETENTION_DAYS) {
            Ok(0) => {}
            Ok(removed) => tracing::info!(removed, "Old log files removed"),
            Err(e) => tracing::warn!(error = %e, dir = %dir, "Failed to clean up old logs"),
        }
    }
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____             __           __________
   / __ )____ ______/ /______  / __/ __(_)_______
  / __  / __ `/ ___/ //_/ __ \/ /_/ /_/ / ___/ _ \
 / /_/ / /_/ / /__/ ,< / /_/ / __/ __/ / /__/  __/
/_____/\__,_/\___/_/|_|\____/_/ /_/ /_/\___/\___/
    "#
    );
}
