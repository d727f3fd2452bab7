// ==========================================
// CRM 核心 - 快照仓储
// ==========================================
// 数据表由外部 CRUD 层维护:
// - customers(id, name, level)
// - support_contracts(id, customer_id, title, start_date, end_date, level, status)
// - purchase_contracts(id, customer_id, title, start_date, end_date, status)
// - tickets(id, customer_id, title, priority, created_at)
// 红线: 枚举列宽松解析，无法识别的值转为 None，不中断读取
// ==========================================

use crate::db::{open_sqlite_connection, table_exists};
use crate::domain::types::{ContractLevel, ContractStatus, CustomerLevel, TicketPriority};
use crate::domain::{CrmSnapshot, Customer, PurchaseContract, SupportContract, Ticket};
use crate::engine::status_resolver::StatusChange;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::instrument;

/// created_at 列可能出现的时间格式
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

// ==========================================
// CrmSnapshotRepository - 快照仓储
// ==========================================
pub struct CrmSnapshotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CrmSnapshotRepository {
    /// 创建新的仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn ensure_table(conn: &Connection, table: &str) -> RepositoryResult<()> {
        if table_exists(conn, table)? {
            Ok(())
        } else {
            Err(RepositoryError::MissingTable(table.to_string()))
        }
    }

    // ==========================================
    // 读取
    // ==========================================

    /// 读取全部客户
    pub fn load_customers(&self) -> RepositoryResult<Vec<Customer>> {
        let conn = self.get_conn()?;
        Self::ensure_table(&conn, "customers")?;

        let mut stmt = conn.prepare("SELECT id, name, level FROM customers ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            let level: Option<String> = row.get(2)?;
            Ok(Customer {
                id: row.get(0)?,
                name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                level: level.as_deref().and_then(CustomerLevel::from_str),
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 读取全部支持合同
    pub fn load_support_contracts(&self) -> RepositoryResult<Vec<SupportContract>> {
        let conn = self.get_conn()?;
        Self::ensure_table(&conn, "support_contracts")?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, customer_id, title, start_date, end_date, level, status
            FROM support_contracts
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let level: Option<String> = row.get(5)?;
            let status: Option<String> = row.get(6)?;
            Ok(SupportContract {
                id,
                customer_id: row.get(1)?,
                title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                start_date: row.get(3)?,
                end_date: row.get(4)?,
                level: level.as_deref().and_then(ContractLevel::from_str),
                status: parse_status("support_contracts", id, status.as_deref()),
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 读取全部销售合同
    pub fn load_purchase_contracts(&self) -> RepositoryResult<Vec<PurchaseContract>> {
        let conn = self.get_conn()?;
        Self::ensure_table(&conn, "purchase_contracts")?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, customer_id, title, start_date, end_date, status
            FROM purchase_contracts
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let status: Option<String> = row.get(5)?;
            Ok(PurchaseContract {
                id,
                customer_id: row.get(1)?,
                title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                start_date: row.get(3)?,
                end_date: row.get(4)?,
                status: parse_status("purchase_contracts", id, status.as_deref()),
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 读取全部工单
    pub fn load_tickets(&self) -> RepositoryResult<Vec<Ticket>> {
        let conn = self.get_conn()?;
        Self::ensure_table(&conn, "tickets")?;

        let mut stmt = conn.prepare(
            "SELECT id, customer_id, title, priority, created_at FROM tickets ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            let priority: Option<String> = row.get(3)?;
            let created_at: Option<String> = row.get(4)?;
            Ok(Ticket {
                id: row.get(0)?,
                customer_id: row.get(1)?,
                title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                priority: priority.as_deref().and_then(TicketPriority::from_str),
                created_at: created_at.as_deref().and_then(parse_datetime),
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 读取完整快照
    #[instrument(skip(self))]
    pub fn load_snapshot(&self) -> RepositoryResult<CrmSnapshot> {
        let snapshot = CrmSnapshot {
            customers: self.load_customers()?,
            support_contracts: self.load_support_contracts()?,
            purchase_contracts: self.load_purchase_contracts()?,
            tickets: self.load_tickets()?,
        };

        tracing::debug!(
            customers = snapshot.customers.len(),
            support_contracts = snapshot.support_contracts.len(),
            purchase_contracts = snapshot.purchase_contracts.len(),
            tickets = snapshot.tickets.len(),
            "快照读取完成"
        );

        Ok(snapshot)
    }

    // ==========================================
    // 回写
    // ==========================================

    /// 在单个事务中回写状态重算结果
    ///
    /// 仅当存储状态（按读取时的宽松规则解析）仍等于 change.from 时更新；
    /// 读取后被人工修改或已删除的合同跳过。
    /// 存储值为波斯语标签、NULL 或无法识别的字符串时同样可以回写为规范值。
    ///
    /// # 返回
    /// - 实际更新的行数
    #[instrument(skip(self, changes), fields(count = changes.len()))]
    pub fn apply_status_changes(&self, changes: &[StatusChange]) -> RepositoryResult<usize> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut updated = 0;
        for change in changes {
            let table = change.kind.table_name();

            let stored: Option<Option<String>> = tx
                .query_row(
                    &format!("SELECT status FROM {} WHERE id = ?1", table),
                    params![change.contract_id],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(raw) = stored else {
                tracing::warn!(table, contract_id = change.contract_id, "合同不存在，跳过回写");
                continue;
            };
            if stored_status(raw.as_deref()) != change.from {
                tracing::warn!(
                    table,
                    contract_id = change.contract_id,
                    raw_status = ?raw,
                    "合同状态已被修改，跳过回写"
                );
                continue;
            }

            updated += tx.execute(
                &format!("UPDATE {} SET status = ?1 WHERE id = ?2", table),
                params![change.to.to_db_str(), change.contract_id],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(updated)
    }
}

// ==========================================
// 解析辅助函数
// ==========================================

/// 状态列解析
///
/// 缺失或无法识别时按 Active 处理（日期派生），只有人工状态才具有粘性
fn parse_status(table: &str, id: i64, raw: Option<&str>) -> ContractStatus {
    if raw.and_then(ContractStatus::from_str).is_none() {
        tracing::warn!(
            table,
            contract_id = id,
            raw_status = ?raw,
            "合同状态无法识别，按日期派生处理"
        );
    }
    stored_status(raw)
}

/// 存储状态 → 领域状态（不记录日志）
fn stored_status(raw: Option<&str>) -> ContractStatus {
    raw.and_then(ContractStatus::from_str)
        .unwrap_or(ContractStatus::Active)
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}
