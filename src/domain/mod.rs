// ==========================================
// CRM 核心 - 领域模型层
// ==========================================
// 职责: 定义客户/合同/工单的只读记录与等级类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod contract;
pub mod customer;
pub mod ticket;
pub mod types;

// 重导出核心类型
pub use contract::{PurchaseContract, SupportContract};
pub use customer::Customer;
pub use ticket::Ticket;
pub use types::{ContractLevel, ContractStatus, CustomerLevel, TicketPriority};

use serde::{Deserialize, Serialize};

// ==========================================
// CrmSnapshot - 一次渲染/报表所用的内存快照
// ==========================================
/// 引擎每次调用都基于调用方传入的快照重新计算，不做缓存
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrmSnapshot {
    pub customers: Vec<Customer>,
    pub support_contracts: Vec<SupportContract>,
    pub purchase_contracts: Vec<PurchaseContract>,
    pub tickets: Vec<Ticket>,
}

impl CrmSnapshot {
    /// 按 id 查找客户
    pub fn find_customer(&self, customer_id: i64) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == customer_id)
    }
}
