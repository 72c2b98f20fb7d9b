// ==========================================
// PlantX 运维智能中台 - 时间戳解析与格式化
// ==========================================
// 职责: 宽松解析人工录入/记录存储返回的时间, 统一输出 UTC ISO-8601
// 约定: 无时区输入按 UTC 解释; 仅日期输入取当日 00:00 UTC
// ==========================================

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

// 带时间部分的无时区格式
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// 仅日期格式
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

/// 宽松解析时间
///
/// # 返回
/// - Some(DateTime<Utc>): 解析成功
/// - None: 空串或任何格式都无法解析
pub fn parse_flexible(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    // 带时区: RFC 3339 / RFC 2822
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }

    // PocketBase 风格: "2024-02-01 10:00:00.000Z"
    if let Some(stripped) = value.strip_suffix('Z') {
        if let Some(dt) = parse_naive_datetime(stripped) {
            return Some(dt);
        }
    }

    if let Some(dt) = parse_naive_datetime(value) {
        return Some(dt);
    }

    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(value, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
    })
}

fn parse_naive_datetime(value: &str) -> Option<DateTime<Utc>> {
    NAIVE_DATETIME_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(value, fmt)
            .ok()
            .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
    })
}

/// 格式化为 ISO-8601（UTC，毫秒精度，Z 结尾）
pub fn format_iso(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// serde 辅助: Option<DateTime<Utc>> <-> ISO-8601 字符串
///
/// 反序列化时接受 null / 空串 / 任意可宽松解析的格式
pub mod option_iso {
    use super::{format_iso, parse_flexible};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&format_iso(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_flexible))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_date_only_is_midnight_utc() {
        let dt = parse_flexible("2024-01-22").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 22));
        assert_eq!(dt.hour(), 0);
        assert_eq!(format_iso(&dt), "2024-01-22T00:00:00.000Z");
    }

    #[test]
    fn test_parse_rfc3339_converts_to_utc() {
        let dt = parse_flexible("2024-01-25T17:00:00+02:00").unwrap();
        assert_eq!(format_iso(&dt), "2024-01-25T15:00:00.000Z");
    }

    #[test]
    fn test_parse_pocketbase_style() {
        let dt = parse_flexible("2024-02-01 08:30:00.000Z").unwrap();
        assert_eq!(format_iso(&dt), "2024-02-01T08:30:00.000Z");
    }

    #[test]
    fn test_parse_us_and_named_month() {
        assert_eq!(
            format_iso(&parse_flexible("02/01/2024").unwrap()),
            "2024-02-01T00:00:00.000Z"
        );
        assert_eq!(
            format_iso(&parse_flexible("March 5, 2024").unwrap()),
            "2024-03-05T00:00:00.000Z"
        );
        assert_eq!(
            format_iso(&parse_flexible("05-Mar-2024").unwrap()),
            "2024-03-05T00:00:00.000Z"
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_flexible("not a date").is_none());
        assert!(parse_flexible("").is_none());
        assert!(parse_flexible("2024-13-45").is_none());
    }
}
