use rust_decimal::Decimal;

pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

/// Dollar amount with two fractional digits and thousands separators.
pub fn format_cost(amount: Decimal) -> String {
    let rounded = amount.abs().round_dp(2);
    let text = format!("{:.2}", rounded);
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(250), "250ms");
        assert_eq!(format_duration(1500), "1.5s");
        assert_eq!(format_duration(125_000), "2m 5s");
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(Decimal::new(2715, 2)), "$27.15");
        assert_eq!(format_cost(Decimal::new(3258, 1)), "$325.80");
        assert_eq!(format_cost(Decimal::new(123456789, 2)), "$1,234,567.89");
        assert_eq!(format_cost(Decimal::ZERO), "$0.00");
        assert_eq!(format_cost(Decimal::new(-5, 0)), "-$5.00");
    }
}
