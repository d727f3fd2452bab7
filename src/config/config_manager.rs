// ==========================================
// CRM 核心 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// 非法配置值一律回退默认值并告警
// ==========================================

use crate::clock::{SystemClock, TEHRAN_OFFSET_MINUTES};
use crate::config::engine_config_trait::EngineConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 配置键
pub mod config_keys {
    pub const UTC_OFFSET_MINUTES: &str = "clock/utc_offset_minutes";
    pub const LOCALE: &str = "ui/locale";
}

/// 支持的界面语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["fa", "en"];
pub const DEFAULT_LOCALE: &str = "fa";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// config_kv 表不存在时视为未配置
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        if !crate::db::table_exists(&conn, "config_kv")? {
            return Ok(None);
        }

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 按配置时区构造系统时钟
    pub async fn build_clock(&self) -> Result<SystemClock, Box<dyn Error>> {
        let minutes = self.get_utc_offset_minutes().await?;
        Ok(SystemClock::from_offset_minutes(minutes).unwrap_or_default())
    }
}

// ==========================================
// EngineConfigReader Trait 实现
// ==========================================
#[async_trait]
impl EngineConfigReader for ConfigManager {
    async fn get_utc_offset_minutes(&self) -> Result<i32, Box<dyn Error>> {
        let default = TEHRAN_OFFSET_MINUTES.to_string();
        let value = self.get_config_or_default(config_keys::UTC_OFFSET_MINUTES, &default)?;

        match value.trim().parse::<i32>() {
            // FixedOffset 要求严格小于 24 小时
            Ok(minutes) if minutes.unsigned_abs() < 24 * 60 => Ok(minutes),
            _ => {
                tracing::warn!(
                    config_key = config_keys::UTC_OFFSET_MINUTES,
                    raw_value = %value,
                    "时区偏移配置非法，使用默认值"
                );
                Ok(TEHRAN_OFFSET_MINUTES)
            }
        }
    }

    async fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::LOCALE, DEFAULT_LOCALE)?;
        let locale = value.trim().to_lowercase();

        if SUPPORTED_LOCALES.contains(&locale.as_str()) {
            Ok(locale)
        } else {
            tracing::warn!(
                config_key = config_keys::LOCALE,
                raw_value = %value,
                "界面语言配置不受支持，使用默认值"
            );
            Ok(DEFAULT_LOCALE.to_string())
        }
    }
}
