// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use rusqlite::{params, Connection};
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    crm_core::logging::init_test();

    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = Connection::open(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(Connection::open(db_path)?)
}

/// 初始化数据库 schema（与 CRUD 层表结构一致）
fn init_schema(conn: &Connection) -> Result<(), Box<dyn Error>> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS customers (
            id INTEGER PRIMARY KEY,
            name TEXT,
            level TEXT
        );

        CREATE TABLE IF NOT EXISTS support_contracts (
            id INTEGER PRIMARY KEY,
            customer_id INTEGER,
            title TEXT,
            start_date TEXT,
            end_date TEXT,
            level TEXT,
            status TEXT
        );

        CREATE TABLE IF NOT EXISTS purchase_contracts (
            id INTEGER PRIMARY KEY,
            customer_id INTEGER,
            title TEXT,
            start_date TEXT,
            end_date TEXT,
            status TEXT
        );

        CREATE TABLE IF NOT EXISTS tickets (
            id INTEGER PRIMARY KEY,
            customer_id INTEGER,
            title TEXT,
            priority TEXT,
            created_at TEXT
        );
        "#,
    )?;
    Ok(())
}

/// 写入 global 配置
pub fn insert_config(conn: &Connection, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

pub fn insert_customer(
    conn: &Connection,
    id: i64,
    name: &str,
    level: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT INTO customers (id, name, level) VALUES (?1, ?2, ?3)",
        params![id, name, level],
    )?;
    Ok(())
}

pub fn insert_support_contract(
    conn: &Connection,
    id: i64,
    customer_id: Option<i64>,
    start_date: Option<&str>,
    end_date: Option<&str>,
    level: Option<&str>,
    status: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    conn.execute(
        r#"
        INSERT INTO support_contracts (id, customer_id, title, start_date, end_date, level, status)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            id,
            customer_id,
            format!("قرارداد پشتیبانی {}", id),
            start_date,
            end_date,
            level,
            status
        ],
    )?;
    Ok(())
}

pub fn insert_purchase_contract(
    conn: &Connection,
    id: i64,
    customer_id: Option<i64>,
    start_date: Option<&str>,
    end_date: Option<&str>,
    status: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    conn.execute(
        r#"
        INSERT INTO purchase_contracts (id, customer_id, title, start_date, end_date, status)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            id,
            customer_id,
            format!("قرارداد فروش {}", id),
            start_date,
            end_date,
            status
        ],
    )?;
    Ok(())
}

pub fn insert_ticket(
    conn: &Connection,
    id: i64,
    customer_id: Option<i64>,
    priority: Option<&str>,
    created_at: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    conn.execute(
        r#"
        INSERT INTO tickets (id, customer_id, title, priority, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![id, customer_id, format!("تیکت {}", id), priority, created_at],
    )?;
    Ok(())
}

/// 读取合同存储状态
pub fn read_status(conn: &Connection, table: &str, id: i64) -> Result<String, Box<dyn Error>> {
    let sql = format!("SELECT status FROM {} WHERE id = ?1", table);
    Ok(conn.query_row(&sql, params![id], |row| row.get(0))?)
}

/// 标准场景数据（评分基准日 1403/05/10）
///
/// - 客户 1 (A): Gold 有效 + Silver 有效
/// - 客户 2 (B): Silver 有效 + Gold 已过期
/// - 客户 3 (D): Gold 已取消
/// - 客户 4 (等级未知): 无合同
/// - 工单 1..6 见各断言
pub fn insert_standard_scenario(conn: &Connection) -> Result<(), Box<dyn Error>> {
    insert_customer(conn, 1, "شرکت الف", Some("A"))?;
    insert_customer(conn, 2, "شرکت ب", Some("B"))?;
    insert_customer(conn, 3, "شرکت د", Some("D"))?;
    insert_customer(conn, 4, "شرکت ناشناس", Some("Z"))?;

    let support: [(i64, Option<i64>, Option<&str>, &str, &str, &str); 6] = [
        (10, Some(1), Some("1403/01/01"), "1403/12/30", "Gold", "Active"),
        (11, Some(1), Some("1403/01/01"), "1403/12/30", "نقره‌ای", "فعال"),
        (20, Some(2), Some("1403/01/01"), "1403/05/10", "Silver", "Expired"),
        (21, Some(2), Some("1402/01/01"), "1403/05/09", "Gold", "Active"),
        (30, Some(3), Some("1403/01/01"), "1403/12/30", "Gold", "Cancelled"),
        (40, None, None, "bad-date", "Bronze", "PendingApproval"),
    ];
    for (id, customer_id, start, end, level, status) in support {
        insert_support_contract(
            conn,
            id,
            customer_id,
            start,
            Some(end),
            Some(level),
            Some(status),
        )?;
    }

    let purchase: [(i64, i64, &str, &str, &str); 3] = [
        (100, 1, "1403/01/01", "1403/06/31", "Expired"),
        (101, 2, "1403/06/01", "1403/09/01", "Active"),
        (102, 3, "1402/01/01", "1402/12/29", "Cancelled"),
    ];
    for (id, customer_id, start, end, status) in purchase {
        insert_purchase_contract(
            conn,
            id,
            Some(customer_id),
            Some(start),
            Some(end),
            Some(status),
        )?;
    }

    insert_ticket(conn, 1, Some(1), Some("Urgent"), Some("2024-07-01 09:00:00"))?;
    insert_ticket(conn, 2, Some(2), Some("Medium"), Some("2024-07-02 09:00:00"))?;
    insert_ticket(conn, 3, Some(3), Some("Low"), Some("2024-07-03 09:00:00"))?;
    insert_ticket(conn, 4, Some(4), Some("فوری"), None)?;
    insert_ticket(conn, 5, Some(99), Some("Medium"), Some("2024-07-05 09:00:00"))?;
    insert_ticket(conn, 6, Some(1), Some("critical"), Some("2024-07-06 09:00:00"))?;

    Ok(())
}
