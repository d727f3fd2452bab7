// ==========================================
// CRM 核心 - 工单优先级评分引擎
// ==========================================
// 职责: 客户等级 × 最优有效支持合同等级 × 工单优先级
// 红线: 分数仅作排序键，越小越紧急
// 红线: 缺失引用/未知等级一律降级为最不紧急的兜底权重，不抛错
// ==========================================
// 依赖: StatusResolver (判定支持合同是否有效)
// ==========================================

use crate::clock::Clock;
use crate::domain::types::{ContractLevel, CustomerLevel, TicketPriority};
use crate::domain::{Customer, SupportContract, Ticket};
use crate::engine::status_resolver::StatusResolver;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// 客户缺失或等级无法识别时的客户权重
pub const FALLBACK_CUSTOMER_WEIGHT: u32 = 4;
/// 无有效支持合同（或客户缺失）时的合同权重，劣于任何真实合同等级
pub const NO_ACTIVE_CONTRACT_WEIGHT: u32 = 4;
/// 优先级缺失或无法识别时的优先级权重
pub const FALLBACK_PRIORITY_WEIGHT: u32 = 3;

// ==========================================
// 等级 → 权重
// ==========================================

/// 客户等级权重: A=1, B=2, C=3, D=4
pub fn customer_weight(level: Option<CustomerLevel>) -> u32 {
    match level {
        Some(CustomerLevel::A) => 1,
        Some(CustomerLevel::B) => 2,
        Some(CustomerLevel::C) => 3,
        Some(CustomerLevel::D) => 4,
        None => FALLBACK_CUSTOMER_WEIGHT,
    }
}

/// 合同等级权重: Gold=1, Silver=2, Bronze=3
pub fn contract_weight(level: Option<ContractLevel>) -> u32 {
    match level {
        Some(ContractLevel::Gold) => 1,
        Some(ContractLevel::Silver) => 2,
        Some(ContractLevel::Bronze) => 3,
        None => NO_ACTIVE_CONTRACT_WEIGHT,
    }
}

/// 工单优先级权重: Urgent=1, Medium=2, Low=3
pub fn priority_weight(priority: Option<TicketPriority>) -> u32 {
    match priority {
        Some(TicketPriority::Urgent) => 1,
        Some(TicketPriority::Medium) => 2,
        Some(TicketPriority::Low) => 3,
        None => FALLBACK_PRIORITY_WEIGHT,
    }
}

// ==========================================
// 评分明细
// ==========================================

/// 客户的最优有效支持合同
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestContract {
    pub contract_id: i64,
    pub weight: u32,
}

/// 单个工单的评分明细
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub ticket_id: i64,
    pub customer_found: bool,
    pub customer_weight: u32,
    pub contract_weight: u32,
    pub best_contract_id: Option<i64>,
    pub priority_weight: u32,
    pub score: u32,
    /// 人类可读的判定因子
    pub factors: Vec<String>,
}

// ==========================================
// TicketScorer - 工单评分引擎
// ==========================================
#[derive(Clone)]
pub struct TicketScorer {
    resolver: StatusResolver,
}

impl TicketScorer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::from_resolver(StatusResolver::new(clock))
    }

    pub fn from_resolver(resolver: StatusResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &StatusResolver {
        &self.resolver
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算工单分数（读取注入时钟）
    pub fn score_ticket(
        &self,
        ticket: &Ticket,
        customers: &[Customer],
        contracts: &[SupportContract],
    ) -> u32 {
        Self::score_ticket_at(ticket, customers, contracts, self.resolver.clock().now())
    }

    /// 计算工单分数
    ///
    /// score = customer_weight × contract_weight × priority_weight
    pub fn score_ticket_at(
        ticket: &Ticket,
        customers: &[Customer],
        contracts: &[SupportContract],
        now: NaiveDateTime,
    ) -> u32 {
        Self::explain_at(ticket, customers, contracts, now).score
    }

    /// 计算评分明细（读取注入时钟）
    pub fn explain(
        &self,
        ticket: &Ticket,
        customers: &[Customer],
        contracts: &[SupportContract],
    ) -> ScoreBreakdown {
        Self::explain_at(ticket, customers, contracts, self.resolver.clock().now())
    }

    /// 计算评分明细
    ///
    /// 步骤:
    /// 1) 按 customer_id 查找客户，缺失 → 客户权重 4
    /// 2) 客户存在时，在其有效支持合同中取最小合同权重
    ///    无有效合同或客户缺失 → 4
    /// 3) 工单优先级权重，缺失 → 3
    /// 4) 三者相乘
    pub fn explain_at(
        ticket: &Ticket,
        customers: &[Customer],
        contracts: &[SupportContract],
        now: NaiveDateTime,
    ) -> ScoreBreakdown {
        let customer = find_customer(ticket, customers);
        let best = customer.and_then(|c| best_active_contract(c.id, contracts, now));
        compose(ticket, customer, best)
    }

    // ==========================================
    // 批量预计算
    // ==========================================

    /// 预计算每个客户的最优有效支持合同
    ///
    /// 与 explain_at 逐个过滤的结果一致；整队列评分时避免 O(工单 × 合同) 扫描
    pub fn best_contracts_at(
        contracts: &[SupportContract],
        now: NaiveDateTime,
    ) -> HashMap<i64, BestContract> {
        let mut best: HashMap<i64, BestContract> = HashMap::new();

        for contract in contracts {
            let Some(customer_id) = contract.customer_id else {
                continue;
            };
            if !StatusResolver::is_active_support_contract_at(contract, now) {
                continue;
            }
            let candidate = candidate(contract);
            best.entry(customer_id)
                .and_modify(|current| {
                    if candidate.weight < current.weight {
                        *current = candidate;
                    }
                })
                .or_insert(candidate);
        }

        best
    }

    /// 基于预计算结果的评分明细
    pub fn explain_with_index(
        ticket: &Ticket,
        customers: &[Customer],
        best_contracts: &HashMap<i64, BestContract>,
    ) -> ScoreBreakdown {
        let customer = find_customer(ticket, customers);
        let best = customer.and_then(|c| best_contracts.get(&c.id).copied());
        compose(ticket, customer, best)
    }
}

// ==========================================
// 内部函数
// ==========================================

fn find_customer<'a>(ticket: &Ticket, customers: &'a [Customer]) -> Option<&'a Customer> {
    let customer = ticket
        .customer_id
        .and_then(|id| customers.iter().find(|c| c.id == id));
    if customer.is_none() {
        tracing::debug!(
            ticket_id = ticket.id,
            customer_id = ?ticket.customer_id,
            "工单关联客户不存在，使用兜底权重"
        );
    }
    customer
}

/// 客户的最优（权重最小）有效支持合同，同权重取先出现者
fn best_active_contract(
    customer_id: i64,
    contracts: &[SupportContract],
    now: NaiveDateTime,
) -> Option<BestContract> {
    contracts
        .iter()
        .filter(|c| c.belongs_to(customer_id))
        .filter(|c| StatusResolver::is_active_support_contract_at(c, now))
        .map(candidate)
        .fold(None, |acc: Option<BestContract>, candidate| match acc {
            Some(current) if current.weight <= candidate.weight => Some(current),
            _ => Some(candidate),
        })
}

fn candidate(contract: &SupportContract) -> BestContract {
    if contract.level.is_none() {
        tracing::debug!(
            contract_id = contract.id,
            "支持合同等级无法识别，使用兜底权重"
        );
    }
    BestContract {
        contract_id: contract.id,
        weight: contract_weight(contract.level),
    }
}

fn compose(
    ticket: &Ticket,
    customer: Option<&Customer>,
    best: Option<BestContract>,
) -> ScoreBreakdown {
    let mut factors = Vec::with_capacity(3);

    let customer_w = match customer {
        Some(c) => {
            let w = customer_weight(c.level);
            match c.level {
                Some(level) => factors.push(format!("customer_level={} (w={})", level, w)),
                None => {
                    tracing::debug!(customer_id = c.id, "客户等级无法识别，使用兜底权重");
                    factors.push(format!("customer_level=unknown (w={})", w));
                }
            }
            w
        }
        None => {
            factors.push(format!(
                "customer_missing: customer_id={:?} (w={})",
                ticket.customer_id, FALLBACK_CUSTOMER_WEIGHT
            ));
            FALLBACK_CUSTOMER_WEIGHT
        }
    };

    let contract_w = match best {
        Some(b) => {
            factors.push(format!("best_active_contract={} (w={})", b.contract_id, b.weight));
            b.weight
        }
        None => {
            factors.push(format!("no_active_contract (w={})", NO_ACTIVE_CONTRACT_WEIGHT));
            NO_ACTIVE_CONTRACT_WEIGHT
        }
    };

    let priority_w = priority_weight(ticket.priority);
    match ticket.priority {
        Some(p) => factors.push(format!("priority={} (w={})", p, priority_w)),
        None => {
            tracing::debug!(ticket_id = ticket.id, "工单优先级无法识别，使用兜底权重");
            factors.push(format!("priority=unknown (w={})", priority_w));
        }
    }

    ScoreBreakdown {
        ticket_id: ticket.id,
        customer_found: customer.is_some(),
        customer_weight: customer_w,
        contract_weight: contract_w,
        best_contract_id: best.map(|b| b.contract_id),
        priority_weight: priority_w,
        score: customer_w * contract_w * priority_w,
        factors,
    }
}
