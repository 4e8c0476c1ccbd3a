//! Display formatting for dashboard figures.
//!
//! Output never depends on the host locale: `.` is the decimal separator,
//! `,` groups thousands. Non-finite inputs render as `"N/A"`.

const NOT_AVAILABLE: &str = "N/A";

/// BTC amount with satoshi precision, e.g. `"0.05000000 BTC"`.
pub fn format_btc(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    // Avoid printing "-0.00000000" for negative zero.
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:.8} BTC")
}

/// USD amount with cents and thousands grouping, e.g. `"-$1,234.50"`.
pub fn format_usd(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let cents = (value.abs() * 100.0).round();
    let whole = (cents / 100.0).trunc() as u64;
    let frac = (cents % 100.0) as u64;
    let sign = if value < 0.0 && cents > 0.0 { "-" } else { "" };
    format!("{sign}${}.{frac:02}", group_thousands(whole))
}

/// Signed change from `previous` to `current`, e.g. `"+5.26%"`.
///
/// A zero or non-finite baseline yields `"0.00%"` since no meaningful
/// percentage exists.
pub fn calculate_percentage_change(current: f64, previous: f64) -> String {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return "0.00%".to_string();
    }
    let change = (current - previous) / previous * 100.0;
    let rounded = (change * 100.0).round() / 100.0;
    if rounded == 0.0 {
        "0.00%".to_string()
    } else if rounded > 0.0 {
        format!("+{rounded:.2}%")
    } else {
        format!("{rounded:.2}%")
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
