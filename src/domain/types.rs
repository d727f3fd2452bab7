// ==========================================
// CRM 核心 - 领域类型定义
// ==========================================
// 等级制枚举: 序号越小越有利 (A / Gold / Urgent 最优)
// 数据库存储: 英文标识 (to_db_str), 兼容波斯语标签读取
// ==========================================

use crate::i18n::t;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 客户等级 (Customer Level)
// ==========================================
// 顺序: A < B < C < D (A 最优)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CustomerLevel {
    A,
    B,
    C,
    D,
}

impl fmt::Display for CustomerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl CustomerLevel {
    /// 从字符串解析客户等级，无法识别时返回 None
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(CustomerLevel::A),
            "B" => Some(CustomerLevel::B),
            "C" => Some(CustomerLevel::C),
            "D" => Some(CustomerLevel::D),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CustomerLevel::A => "A",
            CustomerLevel::B => "B",
            CustomerLevel::C => "C",
            CustomerLevel::D => "D",
        }
    }

    /// 当前语言下的显示标签
    pub fn label(&self) -> String {
        match self {
            CustomerLevel::A => t("customer_level.a"),
            CustomerLevel::B => t("customer_level.b"),
            CustomerLevel::C => t("customer_level.c"),
            CustomerLevel::D => t("customer_level.d"),
        }
    }
}

// ==========================================
// 支持合同等级 (Contract Level)
// ==========================================
// 顺序: Gold < Silver < Bronze (Gold 最优)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContractLevel {
    Gold,
    Silver,
    Bronze,
}

impl fmt::Display for ContractLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ContractLevel {
    /// 从字符串解析合同等级（英文不区分大小写，或波斯语标签）
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "gold" | "طلایی" => Some(ContractLevel::Gold),
            "silver" | "نقره‌ای" | "نقره ای" | "نقره" => Some(ContractLevel::Silver),
            "bronze" | "برنزی" => Some(ContractLevel::Bronze),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ContractLevel::Gold => "Gold",
            ContractLevel::Silver => "Silver",
            ContractLevel::Bronze => "Bronze",
        }
    }

    pub fn label(&self) -> String {
        match self {
            ContractLevel::Gold => t("contract_level.gold"),
            ContractLevel::Silver => t("contract_level.silver"),
            ContractLevel::Bronze => t("contract_level.bronze"),
        }
    }
}

// ==========================================
// 工单优先级 (Ticket Priority)
// ==========================================
// 顺序: Urgent < Medium < Low (Urgent 最紧急)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TicketPriority {
    Urgent,
    Medium,
    Low,
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl TicketPriority {
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "urgent" | "فوری" => Some(TicketPriority::Urgent),
            "medium" | "متوسط" => Some(TicketPriority::Medium),
            "low" | "کم" | "پایین" => Some(TicketPriority::Low),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            TicketPriority::Urgent => "Urgent",
            TicketPriority::Medium => "Medium",
            TicketPriority::Low => "Low",
        }
    }

    pub fn label(&self) -> String {
        match self {
            TicketPriority::Urgent => t("ticket_priority.urgent"),
            TicketPriority::Medium => t("ticket_priority.medium"),
            TicketPriority::Low => t("ticket_priority.low"),
        }
    }
}

// ==========================================
// 合同状态 (Contract Status)
// ==========================================
// Cancelled / PendingApproval: 人工设定，日期重算不得覆盖
// Active / Expired: 按日期自动派生
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractStatus {
    Active,
    PendingApproval,
    Expired,
    Cancelled,
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ContractStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.to_lowercase().replace(['_', ' '], "").as_str() {
            "active" | "فعال" => Some(ContractStatus::Active),
            "pendingapproval" | "pending" | "درانتظارتایید" | "درانتظارتأیید" => {
                Some(ContractStatus::PendingApproval)
            }
            "expired" | "منقضیشده" | "منقضی" => Some(ContractStatus::Expired),
            "cancelled" | "canceled" | "لغوشده" | "لغو" => Some(ContractStatus::Cancelled),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ContractStatus::Active => "Active",
            ContractStatus::PendingApproval => "PendingApproval",
            ContractStatus::Expired => "Expired",
            ContractStatus::Cancelled => "Cancelled",
        }
    }

    /// 是否为人工冻结状态（日期重算不可覆盖）
    pub fn is_sticky(&self) -> bool {
        matches!(self, ContractStatus::Cancelled | ContractStatus::PendingApproval)
    }

    pub fn label(&self) -> String {
        match self {
            ContractStatus::Active => t("contract_status.active"),
            ContractStatus::PendingApproval => t("contract_status.pending_approval"),
            ContractStatus::Expired => t("contract_status.expired"),
            ContractStatus::Cancelled => t("contract_status.cancelled"),
        }
    }
}
