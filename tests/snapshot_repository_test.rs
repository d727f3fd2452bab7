// ==========================================
// CrmSnapshotRepository 集成测试
// ==========================================
// 测试目标: 快照读取（宽松枚举解析）与状态回写
// ==========================================

mod test_helpers;

use crm_core::engine::{ContractKind, StatusChange};
use crm_core::repository::{CrmSnapshotRepository, RepositoryError};
use crm_core::{ContractLevel, ContractStatus, CustomerLevel, TicketPriority};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use test_helpers::{create_test_db, insert_standard_scenario, open_test_connection, read_status};

fn setup() -> (tempfile::NamedTempFile, String) {
    let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_standard_scenario(&conn).expect("Failed to insert scenario");
    (temp_file, db_path)
}

#[test]
fn test_load_snapshot_counts() {
    let (_temp_file, db_path) = setup();
    let repo = CrmSnapshotRepository::new(&db_path).expect("Failed to create repo");

    let snapshot = repo.load_snapshot().expect("Failed to load snapshot");
    assert_eq!(snapshot.customers.len(), 4);
    assert_eq!(snapshot.support_contracts.len(), 6);
    assert_eq!(snapshot.purchase_contracts.len(), 3);
    assert_eq!(snapshot.tickets.len(), 6);
}

#[test]
fn test_lenient_enum_parsing() {
    let (_temp_file, db_path) = setup();
    let repo = CrmSnapshotRepository::new(&db_path).expect("Failed to create repo");
    let snapshot = repo.load_snapshot().unwrap();

    // 未知客户等级 → None
    assert_eq!(snapshot.find_customer(1).unwrap().level, Some(CustomerLevel::A));
    assert_eq!(snapshot.find_customer(4).unwrap().level, None);

    // 波斯语标签
    let c11 = snapshot.support_contracts.iter().find(|c| c.id == 11).unwrap();
    assert_eq!(c11.level, Some(ContractLevel::Silver));
    assert_eq!(c11.status, ContractStatus::Active);

    // 未分配客户的合同
    let c40 = snapshot.support_contracts.iter().find(|c| c.id == 40).unwrap();
    assert_eq!(c40.customer_id, None);
    assert_eq!(c40.status, ContractStatus::PendingApproval);
    assert_eq!(c40.end(), None);

    let t4 = snapshot.tickets.iter().find(|t| t.id == 4).unwrap();
    assert_eq!(t4.priority, Some(TicketPriority::Urgent));
    assert_eq!(t4.created_at, None);

    let t6 = snapshot.tickets.iter().find(|t| t.id == 6).unwrap();
    assert_eq!(t6.priority, None);
    assert!(t6.created_at.is_some());
}

#[test]
fn test_unknown_status_loads_as_active() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    test_helpers::insert_support_contract(
        &conn,
        1,
        Some(1),
        Some("1403/01/01"),
        Some("1403/02/01"),
        Some("Gold"),
        Some("Archived"),
    )
    .unwrap();
    test_helpers::insert_support_contract(&conn, 2, Some(1), None, None, None, None).unwrap();

    let repo = CrmSnapshotRepository::new(&db_path).unwrap();
    let contracts = repo.load_support_contracts().unwrap();
    assert_eq!(contracts[0].status, ContractStatus::Active);
    assert_eq!(contracts[1].status, ContractStatus::Active);
    assert_eq!(contracts[1].level, None);
}

#[test]
fn test_missing_table_is_reported() {
    let conn = Connection::open_in_memory().unwrap();
    let repo = CrmSnapshotRepository::from_connection(Arc::new(Mutex::new(conn)));

    match repo.load_customers() {
        Err(RepositoryError::MissingTable(table)) => assert_eq!(table, "customers"),
        other => panic!("expected MissingTable, got {:?}", other),
    }
}

#[test]
fn test_apply_status_changes() {
    let (_temp_file, db_path) = setup();
    let repo = CrmSnapshotRepository::new(&db_path).unwrap();

    let changes = vec![
        StatusChange {
            kind: ContractKind::Support,
            contract_id: 21,
            from: ContractStatus::Active,
            to: ContractStatus::Expired,
        },
        StatusChange {
            kind: ContractKind::Purchase,
            contract_id: 100,
            from: ContractStatus::Expired,
            to: ContractStatus::Active,
        },
        // 存储状态已不是 Active（人工取消），不得覆盖
        StatusChange {
            kind: ContractKind::Support,
            contract_id: 30,
            from: ContractStatus::Active,
            to: ContractStatus::Expired,
        },
    ];

    let updated = repo.apply_status_changes(&changes).unwrap();
    assert_eq!(updated, 2);

    let conn = open_test_connection(&db_path).unwrap();
    assert_eq!(read_status(&conn, "support_contracts", 21).unwrap(), "Expired");
    assert_eq!(read_status(&conn, "purchase_contracts", 100).unwrap(), "Active");
    assert_eq!(read_status(&conn, "support_contracts", 30).unwrap(), "Cancelled");
}

#[test]
fn test_apply_no_changes() {
    let (_temp_file, db_path) = setup();
    let repo = CrmSnapshotRepository::new(&db_path).unwrap();
    assert_eq!(repo.apply_status_changes(&[]).unwrap(), 0);
}
