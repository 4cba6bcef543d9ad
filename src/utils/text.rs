use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)").expect("valid leading number regex"));

static LEADING_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+").expect("valid leading digits regex"));

/// 全角字符转半角
pub fn fullwidth_to_halfwidth(c: char) -> char {
    match c {
        '\u{3000}' => ' ',
        '\u{FF01}'..='\u{FF5E}' => char::from_u32((c as u32) - 0xFEE0).unwrap_or(c),
        _ => c,
    }
}

/// 标题比较用的规范化：全角转半角并去掉所有空白
pub fn normalize_label(input: &str) -> String {
    input
        .chars()
        .map(fullwidth_to_halfwidth)
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// 解析字符串开头的数字（"12.5mm" → 12.5），没有数字时返回 None
pub fn leading_number(input: &str) -> Option<f64> {
    LEADING_NUMBER
        .find(input.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// 解析字符串开头的整数（"2C043" → 2）
pub fn leading_integer(input: &str) -> Option<i64> {
    LEADING_DIGITS
        .find(input.trim_start())
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("准发在库量（33）"), "准发在库量(33)");
        assert_eq!(normalize_label(" 合同 编号\u{3000}"), "合同编号");
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("08.00"), Some(8.0));
        assert_eq!(leading_number(" 12.5mm"), Some(12.5));
        assert_eq!(leading_number("abc"), None);
        assert_eq!(leading_integer("2C043"), Some(2));
        assert_eq!(leading_integer("C043"), None);
    }
}
