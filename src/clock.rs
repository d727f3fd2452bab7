// ==========================================
// CRM 核心 - 时钟能力
// ==========================================
// 引擎不直接读取系统时间，由调用方注入 Clock
// 返回值为本地挂钟时间 (NaiveDateTime)，时区由实现决定
// ==========================================

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};

/// 德黑兰标准时间偏移 (+03:30)，单位: 分钟
pub const TEHRAN_OFFSET_MINUTES: i32 = 210;

/// 时钟能力
pub trait Clock: Send + Sync {
    /// 当前本地时间
    fn now(&self) -> NaiveDateTime;

    /// 当前本地日期
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

// ==========================================
// SystemClock - 系统挂钟 (固定时区偏移)
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// 德黑兰时区
    pub fn tehran() -> Self {
        // 210 分钟在 FixedOffset 合法范围内
        Self::from_offset_minutes(TEHRAN_OFFSET_MINUTES).unwrap_or_else(|| Self::new(Utc.fix()))
    }

    /// 按 UTC 偏移分钟数构造，超出 ±24h 返回 None
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::tehran()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}

// ==========================================
// FixedClock - 固定时间 (测试/报表回放)
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// 指定日期的 00:00:00
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(date.and_time(NaiveTime::MIN))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_today() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let clock = FixedClock::at_date(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.now().time(), NaiveTime::MIN);
    }

    #[test]
    fn test_system_clock_offset() {
        let clock = SystemClock::tehran();
        assert_eq!(clock.offset().local_minus_utc(), 210 * 60);
        assert!(SystemClock::from_offset_minutes(24 * 60).is_none());
        assert!(SystemClock::from_offset_minutes(-180).is_some());
    }
}
