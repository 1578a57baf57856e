//! Display formatting for dollar amounts.

const GROUPING_SEPARATOR: char = ',';
const SYMBOL: &str = "$";

/// Formats `value` with two decimals and thousands grouping, e.g. `1,234.56`.
pub fn format_number(value: f64) -> String {
    let body = format!("{:.2}", value.abs());
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body.as_str(), "00"));
    let grouped = group_digits(int_part, GROUPING_SEPARATOR);
    if value < 0.0 && body.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        format!("-{}.{}", grouped, frac_part)
    } else {
        format!("{}.{}", grouped, frac_part)
    }
}

/// Currency rendering used for balances, e.g. `$1,234.56` or `-$40.00`.
pub fn format_currency(value: f64) -> String {
    let number = format_number(value);
    match number.strip_prefix('-') {
        Some(magnitude) => format!("-{}{}", SYMBOL, magnitude),
        None => format!("{}{}", SYMBOL, number),
    }
}

/// Transaction amount with an explicit direction, e.g. `+$500.00` or `-$900.00`.
pub fn format_signed(value: f64) -> String {
    if value < 0.0 {
        format_currency(value)
    } else {
        format!("+{}", format_currency(value))
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index != 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}
