// ==========================================
// CRM 核心 - 工单队列排序
// ==========================================
// 排序键:
// 1) score 升序 (越小越紧急)
// 2) created_at 降序 (新工单优先，缺失时间排最后)
// 3) ticket_id 升序 (保证全序)
// ==========================================

use crate::domain::{CrmSnapshot, Customer, SupportContract, Ticket};
use crate::engine::ticket_scorer::{ScoreBreakdown, TicketScorer};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::instrument;

/// 已评分的工单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedTicket {
    pub ticket: Ticket,
    pub breakdown: ScoreBreakdown,
}

impl RankedTicket {
    pub fn score(&self) -> u32 {
        self.breakdown.score
    }
}

// ==========================================
// TicketQueue - 工单队列
// ==========================================
#[derive(Clone)]
pub struct TicketQueue {
    scorer: TicketScorer,
}

impl TicketQueue {
    pub fn new(scorer: TicketScorer) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &TicketScorer {
        &self.scorer
    }

    /// 对快照中的全部工单排序（读取注入时钟）
    pub fn rank_snapshot(&self, snapshot: &CrmSnapshot) -> Vec<RankedTicket> {
        self.rank(
            &snapshot.tickets,
            &snapshot.customers,
            &snapshot.support_contracts,
        )
    }

    /// 对工单排序（读取注入时钟）
    pub fn rank(
        &self,
        tickets: &[Ticket],
        customers: &[Customer],
        contracts: &[SupportContract],
    ) -> Vec<RankedTicket> {
        Self::rank_at(
            tickets,
            customers,
            contracts,
            self.scorer.resolver().clock().now(),
        )
    }

    /// 对工单排序
    #[instrument(skip_all, fields(count = tickets.len()))]
    pub fn rank_at(
        tickets: &[Ticket],
        customers: &[Customer],
        contracts: &[SupportContract],
        now: NaiveDateTime,
    ) -> Vec<RankedTicket> {
        let index = TicketScorer::best_contracts_at(contracts, now);

        let mut ranked: Vec<RankedTicket> = tickets
            .iter()
            .map(|t| RankedTicket {
                ticket: t.clone(),
                breakdown: TicketScorer::explain_with_index(t, customers, &index),
            })
            .collect();

        ranked.sort_by(Self::compare);
        ranked
    }

    /// 比较两个已评分工单
    pub fn compare(a: &RankedTicket, b: &RankedTicket) -> Ordering {
        a.score()
            .cmp(&b.score())
            .then_with(|| match (a.ticket.created_at, b.ticket.created_at) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| a.ticket.id.cmp(&b.ticket.id))
    }
}
