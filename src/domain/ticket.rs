// ==========================================
// CRM 核心 - 工单实体
// ==========================================

use crate::domain::types::TicketPriority;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 支持工单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub title: String,
    /// None: 优先级缺失或无法识别
    pub priority: Option<TicketPriority>,
    /// 创建时间，用作同分工单的次级排序键
    pub created_at: Option<NaiveDateTime>,
}
