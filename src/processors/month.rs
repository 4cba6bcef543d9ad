//! 月份提取：日期、Excel 序列号、数字字面量、"N月" 文本、合同/资源编号。

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::CellValue;
use crate::utils::text::leading_integer;

/// 1970-01-01 对应的 Excel 序列号
const EXCEL_UNIX_EPOCH: f64 = 25569.0;

static ANCHORED_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\s*月?$").expect("valid anchored month regex"));

static SEARCH_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})月?").expect("valid month search regex"));

/// 月份编码方式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MonthMode {
    /// 日期单元格，或 YYYY-MM-DD / YYYY/MM/DD 文本
    Date,
    /// 大于 12 的数字按 Excel 序列号换算（UTC）
    ExcelSerial,
    /// 1..=12 的数字（小数向下取整）
    Literal,
    /// "<数字>月" 文本；anchored 时整串必须匹配，否则取第一处
    Text {
        #[serde(default)]
        anchored: bool,
    },
    /// 编号中 marker 之后的一位：数字 1-9，或 letters 中的字母（依次为 10、11、12）
    CodeMarker { marker: String, letters: String },
    /// 编号第 start 个字符起 len 位的整数，能被 divisor 整除时取商
    CodeOffset {
        start: usize,
        len: usize,
        divisor: u32,
    },
    /// 编号按 separator 拆分后第 index 段的前 take 位整数
    CodeSegment {
        separator: String,
        index: usize,
        take: usize,
    },
}

impl MonthMode {
    pub fn anchored_text() -> Self {
        MonthMode::Text { anchored: true }
    }

    pub fn search_text() -> Self {
        MonthMode::Text { anchored: false }
    }
}

fn valid_month(value: i64) -> Option<u8> {
    (1..=12).contains(&value).then_some(value as u8)
}

/// Excel 序列号转日期（按 UTC 计算，舍去时间部分）
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = (serial - EXCEL_UNIX_EPOCH).floor() as i64;
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::try_days(days)?)
}

/// 解析 ISO 风格的日期文本
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }
    None
}

/// 按单一模式提取月份；不匹配或不在 1..=12 时返回 None
pub fn month_from_value(value: &CellValue, mode: &MonthMode) -> Option<u8> {
    match mode {
        MonthMode::Date => match value {
            CellValue::Date(date) => Some(date.month() as u8),
            CellValue::Text(text) => parse_date_text(text).map(|date| date.month() as u8),
            _ => None,
        },
        MonthMode::ExcelSerial => match value {
            CellValue::Number(serial) if *serial > 12.0 => {
                serial_to_date(*serial).map(|date| date.month() as u8)
            }
            _ => None,
        },
        MonthMode::Literal => match value {
            CellValue::Number(n) if n.is_finite() => valid_month(n.floor() as i64),
            _ => None,
        },
        MonthMode::Text { anchored } => {
            let CellValue::Text(text) = value else {
                return None;
            };
            let pattern = if *anchored {
                &ANCHORED_MONTH
            } else {
                &SEARCH_MONTH
            };
            let captures = pattern.captures(text.trim())?;
            valid_month(captures.get(1)?.as_str().parse().ok()?)
        }
        MonthMode::CodeMarker { marker, letters } => {
            month_from_marker(&value.display().to_uppercase(), marker, letters)
        }
        MonthMode::CodeOffset {
            start,
            len,
            divisor,
        } => {
            let code = value.display();
            if code.chars().count() < start + len || *divisor == 0 {
                return None;
            }
            let slice: String = code.chars().skip(*start).take(*len).collect();
            let number = leading_integer(&slice)?;
            let divisor = i64::from(*divisor);
            if number % divisor != 0 {
                return None;
            }
            valid_month(number / divisor)
        }
        MonthMode::CodeSegment {
            separator,
            index,
            take,
        } => {
            let code = value.display();
            let segment = code.split(separator.as_str()).nth(*index)?;
            let head: String = segment.chars().take(*take).collect();
            valid_month(leading_integer(&head)?)
        }
    }
}

/// 第一处"marker + 有效字符"决定月份
fn month_from_marker(code: &str, marker: &str, letters: &str) -> Option<u8> {
    if marker.is_empty() {
        return None;
    }
    let marker = marker.to_uppercase();
    let letters = letters.to_uppercase();
    for (position, _) in code.match_indices(marker.as_str()) {
        let Some(next) = code[position + marker.len()..].chars().next() else {
            continue;
        };
        if let Some(digit) = next.to_digit(10) {
            return valid_month(i64::from(digit));
        }
        if let Some(offset) = letters.chars().position(|letter| letter == next) {
            return valid_month(10 + offset as i64);
        }
    }
    None
}

/// 依次尝试各模式，取第一个成功的结果
pub fn month_from_modes(value: &CellValue, modes: &[MonthMode]) -> Option<u8> {
    modes.iter().find_map(|mode| month_from_value(value, mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn marker_mode() -> MonthMode {
        MonthMode::CodeMarker {
            marker: "K5".to_string(),
            letters: "ABC".to_string(),
        }
    }

    #[test]
    fn test_marker_code() {
        assert_eq!(month_from_value(&CellValue::text("K5A001"), &marker_mode()), Some(10));
        assert_eq!(month_from_value(&CellValue::text("xk5c9"), &marker_mode()), Some(12));
        assert_eq!(month_from_value(&CellValue::text("HK53B12"), &marker_mode()), Some(3));
        assert_eq!(month_from_value(&CellValue::text("K50"), &marker_mode()), None);
        assert_eq!(month_from_value(&CellValue::text("K5D1"), &marker_mode()), None);
        assert_eq!(month_from_value(&CellValue::text("K5DK57"), &marker_mode()), Some(7));
    }

    #[test]
    fn test_marker_is_case_insensitive() {
        let lower = MonthMode::CodeMarker {
            marker: "k5".to_string(),
            letters: "abc".to_string(),
        };
        assert_eq!(month_from_value(&CellValue::text("K5A001"), &lower), Some(10));
        assert_eq!(month_from_value(&CellValue::text("sgk5b7"), &lower), Some(11));
    }

    #[test]
    fn test_offset_code() {
        let mode = MonthMode::CodeOffset {
            start: 7,
            len: 3,
            divisor: 10,
        };
        assert_eq!(month_from_value(&CellValue::text("SD25XX0030A"), &mode), Some(3));
        assert_eq!(month_from_value(&CellValue::text("SD25XX0120A"), &mode), Some(12));
        assert_eq!(month_from_value(&CellValue::text("SD25XX0035A"), &mode), None);
        assert_eq!(month_from_value(&CellValue::text("SD25XX0130A"), &mode), None);
        assert_eq!(month_from_value(&CellValue::text("SHORT"), &mode), None);
    }

    #[test]
    fn test_segment_code() {
        let mode = MonthMode::CodeSegment {
            separator: "-".to_string(),
            index: 2,
            take: 2,
        };
        assert_eq!(month_from_value(&CellValue::text("25XSH-SJ-2C043"), &mode), Some(2));
        assert_eq!(month_from_value(&CellValue::text("25XSH-SJ-11043"), &mode), Some(11));
        assert_eq!(month_from_value(&CellValue::text("25XSH-SJ"), &mode), None);
        assert_eq!(month_from_value(&CellValue::text("25XSH-SJ-C043"), &mode), None);
    }

    #[test]
    fn test_text_modes() {
        let anchored = MonthMode::anchored_text();
        let search = MonthMode::search_text();
        assert_eq!(month_from_value(&CellValue::text("3月"), &anchored), Some(3));
        assert_eq!(month_from_value(&CellValue::text("12"), &anchored), Some(12));
        assert_eq!(month_from_value(&CellValue::text("2025年3月"), &anchored), None);
        assert_eq!(month_from_value(&CellValue::text("签订于3月"), &search), Some(3));
        assert_eq!(month_from_value(&CellValue::text("13月"), &search), None);
        assert_eq!(month_from_value(&CellValue::Number(3.0), &anchored), None);
    }

    #[test]
    fn test_literal_and_serial() {
        assert_eq!(month_from_value(&CellValue::Number(7.0), &MonthMode::Literal), Some(7));
        assert_eq!(month_from_value(&CellValue::Number(7.9), &MonthMode::Literal), Some(7));
        assert_eq!(month_from_value(&CellValue::Number(0.0), &MonthMode::Literal), None);
        assert_eq!(month_from_value(&CellValue::Number(13.0), &MonthMode::Literal), None);
        // 45658 = 2025-01-01
        assert_eq!(
            month_from_value(&CellValue::Number(45658.0), &MonthMode::ExcelSerial),
            Some(1)
        );
        assert_eq!(month_from_value(&CellValue::Number(12.0), &MonthMode::ExcelSerial), None);
    }

    #[test]
    fn test_date_mode_accepts_iso_text() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 30).unwrap();
        assert_eq!(month_from_value(&CellValue::Date(date), &MonthMode::Date), Some(4));
        assert_eq!(month_from_value(&CellValue::text("2025/04/30"), &MonthMode::Date), Some(4));
        assert_eq!(month_from_value(&CellValue::text("4月"), &MonthMode::Date), None);
    }

    #[test]
    fn test_modes_fall_through() {
        let modes = vec![
            MonthMode::Date,
            MonthMode::ExcelSerial,
            MonthMode::Literal,
            MonthMode::search_text(),
        ];
        assert_eq!(month_from_modes(&CellValue::Number(45717.0), &modes), Some(3));
        assert_eq!(month_from_modes(&CellValue::Number(5.0), &modes), Some(5));
        assert_eq!(month_from_modes(&CellValue::text("6月"), &modes), Some(6));
        assert_eq!(month_from_modes(&CellValue::Empty, &modes), None);
    }

    #[test]
    fn test_random_months_round_trip_through_every_encoding() {
        let mut rng = StdRng::seed_from_u64(20250301);
        let letters = ['A', 'B', 'C'];

        for _ in 0..200 {
            let month: u8 = rng.random_range(1..=12);
            let year: i32 = rng.random_range(2000..=2030);
            let day: u32 = rng.random_range(1..=28);
            let date = NaiveDate::from_ymd_opt(year, u32::from(month), day).unwrap();

            assert_eq!(month_from_value(&CellValue::Date(date), &MonthMode::Date), Some(month));

            let serial = (date - NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()).num_days() as f64
                + EXCEL_UNIX_EPOCH
                + rng.random_range(0.0..0.99);
            assert_eq!(
                month_from_value(&CellValue::Number(serial), &MonthMode::ExcelSerial),
                Some(month)
            );

            assert_eq!(
                month_from_value(&CellValue::Number(f64::from(month)), &MonthMode::Literal),
                Some(month)
            );
            assert_eq!(
                month_from_value(&CellValue::text(format!("{month}月")), &MonthMode::anchored_text()),
                Some(month)
            );

            let code_char = if month < 10 {
                char::from(b'0' + month)
            } else {
                letters[usize::from(month - 10)]
            };
            assert_eq!(
                month_from_value(&CellValue::text(format!("HK5{code_char}B01")), &marker_mode()),
                Some(month)
            );

            let offset = MonthMode::CodeOffset {
                start: 7,
                len: 3,
                divisor: 10,
            };
            let code = format!("SD25XX0{:03}Z", u32::from(month) * 10);
            assert_eq!(month_from_value(&CellValue::text(code), &offset), Some(month));
        }
    }
}
