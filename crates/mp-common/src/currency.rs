//! Naira formatting and the loan repayment calculator.

pub const NAIRA: char = '₦';

/// Format as `₦1,234` (or `₦1,234.50` with decimals).
pub fn format_naira(amount: f64, show_decimals: bool) -> String {
    let precision = if show_decimals { 2 } else { 0 };
    let rendered = format!("{:.*}", precision, amount.abs());
    let (whole, fraction) = match rendered.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (rendered.as_str(), None),
    };

    let mut out = String::with_capacity(rendered.len() + 4);
    if amount < 0.0 && rendered.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push(NAIRA);
    out.push_str(&group_thousands(whole));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parse user-entered currency text; anything unparseable is zero.
pub fn parse_currency(value: &str) -> f64 {
    let cleaned: String = value
        .chars()
        .filter(|c| *c != NAIRA && *c != ',' && !c.is_whitespace())
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Short form for stat cards: `₦1.5M`, `₦25k`.
pub fn format_compact(amount: f64) -> String {
    if amount >= 1_000_000.0 {
        format!("{}{:.1}M", NAIRA, amount / 1_000_000.0)
    } else if amount >= 1_000.0 {
        format!("{}{:.0}k", NAIRA, amount / 1_000.0)
    } else {
        format_naira(amount, false)
    }
}

/// Fixed monthly instalment for an amortized loan.
///
/// `annual_rate` is a fraction (0.24 for 24%). A zero rate splits the
/// principal evenly; a zero term yields zero.
pub fn monthly_payment(principal: f64, annual_rate: f64, term_months: u32) -> f64 {
    if term_months == 0 {
        return 0.0;
    }
    let monthly_rate = annual_rate / 12.0;
    if monthly_rate == 0.0 {
        return principal / term_months as f64;
    }
    let growth = (1.0 + monthly_rate).powi(term_months as i32);
    principal * monthly_rate * growth / (growth - 1.0)
}
