// ==========================================
// CRM 核心 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不读写数据库，所有规则必须输出 reason
// 红线: 引擎不抛错，异常数据降级为保守默认值
// ==========================================

pub mod status_resolver;
pub mod ticket_queue;
pub mod ticket_scorer;

// 重导出核心引擎
pub use status_resolver::{ContractKind, StatusChange, StatusResolver, StatusSweepReport};
pub use ticket_queue::{RankedTicket, TicketQueue};
pub use ticket_scorer::{
    contract_weight, customer_weight, priority_weight, BestContract, ScoreBreakdown, TicketScorer,
};
