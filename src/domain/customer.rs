// ==========================================
// CRM 核心 - 客户实体
// ==========================================

use crate::domain::types::CustomerLevel;
use serde::{Deserialize, Serialize};

/// 客户记录（持久化由外部 CRUD 层负责）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    /// None: 数据库中的等级值无法识别
    pub level: Option<CustomerLevel>,
}

impl Customer {
    pub fn new(id: i64, name: impl Into<String>, level: Option<CustomerLevel>) -> Self {
        Self {
            id,
            name: name.into(),
            level,
        }
    }
}
