//! Number formatting for the processing summary.

/// Formats a number with comma separators for thousands.
///
/// # Examples
///
/// ```
/// use admission_log_tools::utils::format::format_number;
///
/// assert_eq!(format_number(1234), "1,234");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - head) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Share of `part` in `total` as a percentage with two decimals.
///
/// An empty total yields `0.00%`.
pub fn format_percentage(part: usize, total: usize) -> String {
    if total == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", part as f64 / total as f64 * 100.0)
}
