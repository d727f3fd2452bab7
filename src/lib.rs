// ==========================================
// CRM 核心库 - 合同状态派生 + 工单优先级评分
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 纯函数业务规则层 (列表渲染/报表按需调用)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "fa");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 日历 - 伊朗太阳历 (Jalali)
pub mod calendar;

// 时钟能力
pub mod clock;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据仓储层 - 快照读取与状态回写
pub mod repository;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

pub use calendar::{parse_jalali, DateParseError, JalaliDate};
pub use clock::{Clock, FixedClock, SystemClock};

pub use domain::types::{ContractLevel, ContractStatus, CustomerLevel, TicketPriority};
pub use domain::{CrmSnapshot, Customer, PurchaseContract, SupportContract, Ticket};

pub use engine::{
    RankedTicket, ScoreBreakdown, StatusChange, StatusResolver, StatusSweepReport, TicketQueue,
    TicketScorer,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
