//! PrintMart Store Server - 印刷电商平台后端
//!
//! # 架构概述
//!
//! 本模块是 Store Server 的主入口，提供以下核心功能：
//!
//! - **订单生命周期** (`orders`): 状态流转、配送员指派、收益结算
//! - **配送计价** (`pricing`): 距离阶梯计价和分成计算
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! store-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (models + repositories)
//! ├── orders/        # 订单生命周期引擎 + 收益计算
//! ├── pricing/       # 配送计价
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod orders;
pub mod pricing;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use crate::db::DbService;
pub use crate::orders::{EarningsCalculator, OrderLifecycle};
pub use crate::pricing::PricingResolver;
pub use crate::utils::{AppError, AppResult};

// Re-export logger functions
pub use crate::utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_logger();
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____       _       __  __  ___           __
   / __ \_____(_)___  / /_/  |/  /___ ______/ /_
  / /_/ / ___/ / __ \/ __/ /|_/ / __ `/ ___/ __/
 / ____/ /  / / / / / /_/ /  / / /_/ / /  / /_
/_/   /_/  /_/_/ /_/\__/_/  /_/\__,_/_/   \__/
    "#
    );
}
