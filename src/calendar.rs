// ==========================================
// CRM 核心 - 伊朗太阳历 (Jalali / Solar Hijri)
// ==========================================
// 存储格式: YYYY/MM/DD (仅用于展示与存储)
// 比较逻辑: 一律先转换为 chrono::NaiveDate (公历)
// 闰年算法: 33 年断点表 (Borkowski)
// ==========================================

use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;
use thiserror::Error;

/// 闰年断点表（太阳历年份）
const BREAKS: [i32; 20] = [
    -61, 9, 38, 199, 426, 686, 756, 818, 1111, 1181, 1210, 1635, 2060, 2097, 2192, 2262, 2324,
    2394, 2456, 3178,
];

/// 支持的最小年份
pub const MIN_YEAR: i32 = 1;
/// 支持的最大年份（断点表上界 - 1）
pub const MAX_YEAR: i32 = 3177;

/// 日期解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("日期格式错误 (期望 YYYY/MM/DD): {0}")]
    Malformed(String),

    #[error("日期字段越界 (field={field}): {value}")]
    OutOfRange { field: &'static str, value: i32 },
}

// ==========================================
// JalaliDate - 太阳历日期
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JalaliDate {
    year: i32,
    month: u32,
    day: u32,
}

impl JalaliDate {
    /// 构造并校验太阳历日期
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, DateParseError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(DateParseError::OutOfRange {
                field: "year",
                value: year,
            });
        }
        if !(1..=12).contains(&month) {
            return Err(DateParseError::OutOfRange {
                field: "month",
                value: month as i32,
            });
        }
        if day < 1 || day > month_length(year, month) {
            return Err(DateParseError::OutOfRange {
                field: "day",
                value: day as i32,
            });
        }
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// 转换为公历日期
    pub fn to_gregorian(&self) -> NaiveDate {
        let (_, gy, march) = jal_cal(self.year);
        let m = self.month as i64;
        let offset = (m - 1) * 31 - (m / 7) * (m - 7) + self.day as i64 - 1;
        nowruz(gy, march) + Duration::days(offset)
    }

    /// 从公历日期转换
    ///
    /// 超出 [1, 3177] 太阳历年范围的日期返回 None
    pub fn from_gregorian(date: NaiveDate) -> Option<Self> {
        let gy = date.year();
        let mut jy = gy - 621;
        if !(MIN_YEAR..=MAX_YEAR).contains(&jy) {
            return None;
        }

        let (leap, _, march) = jal_cal(jy);
        let mut k = (date - nowruz(gy, march)).num_days();

        if k >= 0 {
            if k <= 185 {
                let month = 1 + (k / 31) as u32;
                let day = (k % 31) as u32 + 1;
                return Some(Self { year: jy, month, day });
            }
            k -= 186;
        } else {
            jy -= 1;
            if jy < MIN_YEAR {
                return None;
            }
            k += 179;
            if leap == 1 {
                k += 1;
            }
        }

        let month = 7 + (k / 30) as u32;
        let day = (k % 30) as u32 + 1;
        Some(Self { year: jy, month, day })
    }

    /// 是否为太阳历闰年
    pub fn is_leap_year(year: i32) -> bool {
        (MIN_YEAR..=MAX_YEAR).contains(&year) && jal_cal(year).0 == 0
    }
}

impl fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

/// 月份天数: 1-6 月 31 天, 7-11 月 30 天, 12 月 29 天 (闰年 30 天)
pub fn month_length(year: i32, month: u32) -> u32 {
    match month {
        1..=6 => 31,
        7..=11 => 30,
        12 if JalaliDate::is_leap_year(year) => 30,
        12 => 29,
        _ => 0,
    }
}

/// 严格解析 YYYY/MM/DD
///
/// - 长度必须为 10，第 5、8 位为 `/`，其余为数字
/// - 波斯数字 (۰-۹) 与阿拉伯-印度数字 (٠-٩) 会先归一化为 ASCII
/// - 不做首尾去空白
pub fn parse_jalali(raw: &str) -> Result<JalaliDate, DateParseError> {
    let normalized: String = raw.chars().map(normalize_digit).collect();
    let bytes = normalized.as_bytes();

    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'/',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(DateParseError::Malformed(raw.to_string()));
    }

    // 已校验全为 ASCII 数字，parse 不会失败
    let year: i32 = normalized[0..4]
        .parse()
        .map_err(|_| DateParseError::Malformed(raw.to_string()))?;
    let month: u32 = normalized[5..7]
        .parse()
        .map_err(|_| DateParseError::Malformed(raw.to_string()))?;
    let day: u32 = normalized[8..10]
        .parse()
        .map_err(|_| DateParseError::Malformed(raw.to_string()))?;

    JalaliDate::new(year, month, day)
}

/// 公历日期格式化为太阳历字符串（超出范围时返回 None）
pub fn format_jalali(date: NaiveDate) -> Option<String> {
    JalaliDate::from_gregorian(date).map(|d| d.to_string())
}

fn normalize_digit(c: char) -> char {
    match c {
        '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
        '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
        _ => c,
    }
}

/// 公历 gy 年 3 月 march 日 (太阳历元旦)
fn nowruz(gy: i32, march: i32) -> NaiveDate {
    // march 取值恒在 [19, 22]，与 gy 组合必为合法日期
    NaiveDate::from_ymd_opt(gy, 3, march as u32).unwrap_or(NaiveDate::MIN)
}

/// 计算太阳历年 jy 的闰年余数、对应公历年、元旦所在三月日期
///
/// 返回: (leap, gy, march)，leap == 0 表示闰年
fn jal_cal(jy: i32) -> (i32, i32, i32) {
    let gy = jy + 621;
    let mut leap_j = -14;
    let mut jp = BREAKS[0];
    let mut jump = 0;

    for &jm in BREAKS.iter().skip(1) {
        jump = jm - jp;
        if jy < jm {
            break;
        }
        leap_j += (jump / 33) * 8 + (jump % 33) / 4;
        jp = jm;
    }

    let mut n = jy - jp;
    leap_j += (n / 33) * 8 + ((n % 33) + 3) / 4;
    if jump % 33 == 4 && jump - n == 4 {
        leap_j += 1;
    }

    let leap_g = gy / 4 - ((gy / 100 + 1) * 3) / 4 - 150;
    let march = 20 + leap_j - leap_g;

    if jump - n < 6 {
        n = n - jump + ((jump + 4) / 33) * 33;
    }
    let mut leap = (((n + 1) % 33) - 1) % 4;
    if leap == -1 {
        leap = 4;
    }

    (leap, gy, march)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_known_conversions() {
        let cases = [
            ((1403, 1, 1), g(2024, 3, 20)),
            ((1402, 12, 29), g(2024, 3, 19)),
            ((1399, 12, 30), g(2021, 3, 20)),
            ((1400, 1, 1), g(2021, 3, 21)),
            ((1357, 11, 22), g(1979, 2, 11)),
            ((1404, 7, 24), g(2025, 10, 16)),
            ((1405, 7, 24), g(2026, 10, 16)),
        ];
        for ((y, m, d), greg) in cases {
            let j = JalaliDate::new(y, m, d).unwrap();
            assert_eq!(j.to_gregorian(), greg, "{} -> gregorian", j);
            assert_eq!(JalaliDate::from_gregorian(greg), Some(j), "{} -> jalali", greg);
        }
    }

    #[test]
    fn test_roundtrip_every_day_2015_to_2026() {
        let mut day = g(2015, 1, 1);
        let end = g(2026, 12, 31);
        while day <= end {
            let j = JalaliDate::from_gregorian(day).unwrap();
            assert_eq!(j.to_gregorian(), day);
            day += Duration::days(1);
        }
    }

    #[test]
    fn test_leap_years() {
        assert!(JalaliDate::is_leap_year(1399));
        assert!(JalaliDate::is_leap_year(1403));
        assert!(!JalaliDate::is_leap_year(1400));
        assert!(!JalaliDate::is_leap_year(1404));
        assert_eq!(month_length(1403, 12), 30);
        assert_eq!(month_length(1404, 12), 29);
    }

    #[test]
    fn test_parse_valid() {
        let d = parse_jalali("1403/05/17").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (1403, 5, 17));
        assert_eq!(d.to_string(), "1403/05/17");
    }

    #[test]
    fn test_parse_persian_digits() {
        let d = parse_jalali("۱۴۰۳/۰۱/۰۱").unwrap();
        assert_eq!(d, JalaliDate::new(1403, 1, 1).unwrap());
        let d = parse_jalali("١٤٠٣/٠١/٠٢").unwrap();
        assert_eq!(d, JalaliDate::new(1403, 1, 2).unwrap());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in [
            "",
            "not-a-date",
            "1403-01-01",
            "1403/1/01",
            "1403/01/1",
            " 1403/01/01",
            "1403/01/01 ",
            "14030/01/01",
            "140a/01/01",
            "1403/01/01/",
        ] {
            assert!(
                matches!(parse_jalali(raw), Err(DateParseError::Malformed(_))),
                "should reject {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(matches!(
            parse_jalali("1403/13/01"),
            Err(DateParseError::OutOfRange { field: "month", .. })
        ));
        assert!(matches!(
            parse_jalali("1403/07/31"),
            Err(DateParseError::OutOfRange { field: "day", .. })
        ));
        assert!(matches!(
            parse_jalali("1404/12/30"),
            Err(DateParseError::OutOfRange { field: "day", .. })
        ));
        assert!(matches!(
            parse_jalali("0000/01/01"),
            Err(DateParseError::OutOfRange { field: "year", .. })
        ));
        assert!(parse_jalali("1403/12/30").is_ok());
    }

    #[test]
    fn test_format_jalali() {
        assert_eq!(format_jalali(g(2024, 3, 20)).as_deref(), Some("1403/01/01"));
    }
}
