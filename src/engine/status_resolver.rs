// ==========================================
// CRM 核心 - 合同状态派生引擎
// ==========================================
// 职责: 根据开始/结束日期与当前存储状态派生合同有效状态
// 红线: Cancelled / PendingApproval 为人工状态，日期重算不得覆盖
// 红线: 日期无法解析时视为"未到期"(Active)，不抛错
// ==========================================
// 输入: 合同记录 + 注入时钟
// 输出: ContractStatus / StatusSweepReport (不写库)
// ==========================================

use crate::calendar::parse_jalali;
use crate::clock::Clock;
use crate::domain::types::ContractStatus;
use crate::domain::{CrmSnapshot, PurchaseContract, SupportContract};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

// ==========================================
// 状态变更记录
// ==========================================

/// 合同类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractKind {
    Support,
    Purchase,
}

impl ContractKind {
    /// 对应的数据表名
    pub fn table_name(&self) -> &'static str {
        match self {
            ContractKind::Support => "support_contracts",
            ContractKind::Purchase => "purchase_contracts",
        }
    }
}

/// 单个合同的状态变化
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub kind: ContractKind,
    pub contract_id: i64,
    pub from: ContractStatus,
    pub to: ContractStatus,
}

/// 批量状态重算结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSweepReport {
    pub run_id: String,
    pub evaluated_at: NaiveDateTime,
    pub support_total: usize,
    pub purchase_total: usize,
    /// 人工状态（跳过日期计算）的合同数
    pub sticky_count: usize,
    /// 仅包含派生状态与存储状态不一致的合同
    pub changes: Vec<StatusChange>,
}

impl StatusSweepReport {
    pub fn total(&self) -> usize {
        self.support_total + self.purchase_total
    }
}

// ==========================================
// StatusResolver - 合同状态派生引擎
// ==========================================
#[derive(Clone)]
pub struct StatusResolver {
    clock: Arc<dyn Clock>,
}

impl StatusResolver {
    /// 创建状态派生引擎
    ///
    /// # 参数
    /// - clock: 时钟能力（生产环境用 SystemClock，测试用 FixedClock）
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // ==========================================
    // 支持合同状态
    // ==========================================

    /// 派生合同状态（读取注入时钟）
    pub fn resolve_status(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        current_status: ContractStatus,
    ) -> ContractStatus {
        Self::resolve_status_at(start_date, end_date, current_status, self.clock.now())
    }

    /// 派生合同状态
    ///
    /// 规则（顺序执行，命中即返回）:
    /// 1) current_status ∈ {Cancelled, PendingApproval} → 原样返回
    /// 2) end_date 无法解析 → Active
    /// 3) 今日 00:00 > end_date 23:59:59.999 → Expired，否则 Active
    ///
    /// start_date 不参与判定
    pub fn resolve_status_at(
        _start_date: Option<&str>,
        end_date: Option<&str>,
        current_status: ContractStatus,
        now: NaiveDateTime,
    ) -> ContractStatus {
        if current_status.is_sticky() {
            return current_status;
        }

        let end = match end_date.and_then(|s| parse_jalali(s).ok()) {
            Some(d) => d.to_gregorian(),
            None => return ContractStatus::Active,
        };

        Self::resolve_end_date(end, now)
    }

    /// 已解析结束日期的判定（规则 3）
    pub fn resolve_end_date(end: NaiveDate, now: NaiveDateTime) -> ContractStatus {
        let today_start = now.date().and_time(NaiveTime::MIN);
        if today_start > end_of_day(end) {
            ContractStatus::Expired
        } else {
            ContractStatus::Active
        }
    }

    /// 支持合同记录的有效状态
    pub fn resolve_support_contract(&self, contract: &SupportContract) -> ContractStatus {
        Self::resolve_support_contract_at(contract, self.clock.now())
    }

    pub fn resolve_support_contract_at(
        contract: &SupportContract,
        now: NaiveDateTime,
    ) -> ContractStatus {
        Self::resolve_status_at(
            contract.start_date.as_deref(),
            contract.end_date.as_deref(),
            contract.status,
            now,
        )
    }

    /// 支持合同当前是否有效（评分引擎使用）
    pub fn is_active_support_contract_at(contract: &SupportContract, now: NaiveDateTime) -> bool {
        Self::resolve_support_contract_at(contract, now) == ContractStatus::Active
    }

    // ==========================================
    // 销售合同状态
    // ==========================================

    /// 派生销售合同状态（读取注入时钟）
    pub fn resolve_purchase_contract_status(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> ContractStatus {
        Self::resolve_purchase_contract_status_at(start_date, end_date, self.clock.now())
    }

    /// 派生销售合同状态
    ///
    /// - 任一日期无法解析 → Active
    /// - now ∈ [start 00:00:00, end 23:59:59.999] → Active
    /// - 其他 → Expired
    pub fn resolve_purchase_contract_status_at(
        start_date: Option<&str>,
        end_date: Option<&str>,
        now: NaiveDateTime,
    ) -> ContractStatus {
        let start = start_date.and_then(|s| parse_jalali(s).ok());
        let end = end_date.and_then(|s| parse_jalali(s).ok());

        match (start, end) {
            (Some(start), Some(end)) => {
                let window_start = start.to_gregorian().and_time(NaiveTime::MIN);
                let window_end = end_of_day(end.to_gregorian());
                if now >= window_start && now <= window_end {
                    ContractStatus::Active
                } else {
                    ContractStatus::Expired
                }
            }
            _ => ContractStatus::Active,
        }
    }

    /// 销售合同记录的有效状态
    ///
    /// 人工状态同样不可被日期覆盖
    pub fn resolve_purchase_contract(&self, contract: &PurchaseContract) -> ContractStatus {
        Self::resolve_purchase_contract_at(contract, self.clock.now())
    }

    pub fn resolve_purchase_contract_at(
        contract: &PurchaseContract,
        now: NaiveDateTime,
    ) -> ContractStatus {
        if contract.status.is_sticky() {
            return contract.status;
        }
        Self::resolve_purchase_contract_status_at(
            contract.start_date.as_deref(),
            contract.end_date.as_deref(),
            now,
        )
    }

    // ==========================================
    // 批量重算
    // ==========================================

    /// 对快照中所有合同重算状态
    pub fn sweep(&self, snapshot: &CrmSnapshot) -> StatusSweepReport {
        Self::sweep_at(snapshot, self.clock.now())
    }

    /// 对快照中所有合同重算状态，仅收集发生变化的合同
    #[instrument(skip(snapshot), fields(
        support = snapshot.support_contracts.len(),
        purchase = snapshot.purchase_contracts.len()
    ))]
    pub fn sweep_at(snapshot: &CrmSnapshot, now: NaiveDateTime) -> StatusSweepReport {
        let mut changes = Vec::new();
        let mut sticky_count = 0;

        for contract in &snapshot.support_contracts {
            if contract.status.is_sticky() {
                sticky_count += 1;
                continue;
            }
            let derived = Self::resolve_support_contract_at(contract, now);
            if derived != contract.status {
                changes.push(StatusChange {
                    kind: ContractKind::Support,
                    contract_id: contract.id,
                    from: contract.status,
                    to: derived,
                });
            }
        }

        for contract in &snapshot.purchase_contracts {
            if contract.status.is_sticky() {
                sticky_count += 1;
                continue;
            }
            let derived = Self::resolve_purchase_contract_at(contract, now);
            if derived != contract.status {
                changes.push(StatusChange {
                    kind: ContractKind::Purchase,
                    contract_id: contract.id,
                    from: contract.status,
                    to: derived,
                });
            }
        }

        tracing::info!(
            changed = changes.len(),
            sticky = sticky_count,
            "合同状态重算完成"
        );

        StatusSweepReport {
            run_id: Uuid::new_v4().to_string(),
            evaluated_at: now,
            support_total: snapshot.support_contracts.len(),
            purchase_total: snapshot.purchase_contracts.len(),
            sticky_count,
            changes,
        }
    }
}

/// 当日 23:59:59.999
fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}
