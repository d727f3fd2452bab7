// ==========================================
// CRM 核心 - 合同实体
// ==========================================
// 日期字段保留原始存储格式 (伊朗太阳历 YYYY/MM/DD 字符串)
// 解析在引擎边界进行，失败时按"未到期"处理
// ==========================================

use crate::calendar::parse_jalali;
use crate::domain::types::{ContractLevel, ContractStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// SupportContract - 支持合同
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportContract {
    pub id: i64,
    /// None: 尚未分配客户
    pub customer_id: Option<i64>,
    pub title: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub level: Option<ContractLevel>,
    pub status: ContractStatus,
}

impl SupportContract {
    /// 结束日期（公历），无法解析时为 None
    pub fn end(&self) -> Option<NaiveDate> {
        self.end_date
            .as_deref()
            .and_then(|s| parse_jalali(s).ok())
            .map(|d| d.to_gregorian())
    }

    pub fn belongs_to(&self, customer_id: i64) -> bool {
        self.customer_id == Some(customer_id)
    }
}

// ==========================================
// PurchaseContract - 销售合同
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseContract {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub title: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: ContractStatus,
}


