//! Utility functions and helpers

use rust_decimal::Decimal;

/// Format a run of digits with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let mut count = 0;
    for c in s.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

/// Format an amount for display: two decimals, thousands separators
pub fn format_amount(amount: Decimal) -> String {
    let rounded = format!("{:.2}", amount.round_dp(2).abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, format_number(int_part), frac_part)
}

/// Generate a unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
