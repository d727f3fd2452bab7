// ==========================================
// CRM 核心 - 引擎配置读取 Trait
// ==========================================
// 职责: 定义引擎/报表所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// EngineConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait EngineConfigReader: Send + Sync {
    /// 本地时间相对 UTC 的偏移（分钟）
    ///
    /// # 默认值
    /// - 210 (Asia/Tehran, +03:30)
    async fn get_utc_offset_minutes(&self) -> Result<i32, Box<dyn Error>>;

    /// 界面语言
    ///
    /// # 返回
    /// - "fa" 或 "en"
    ///
    /// # 默认值
    /// - "fa"
    async fn get_locale(&self) -> Result<String, Box<dyn Error>>;
}
