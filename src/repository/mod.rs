// ==========================================
// CRM 核心 - 数据仓储层
// ==========================================
// 职责: 从 CRUD 层数据表读取快照；回写状态重算结果
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod error;
pub mod snapshot_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use snapshot_repo::CrmSnapshotRepository;
