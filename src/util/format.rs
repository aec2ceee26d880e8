//! Number formatting for prices, costs and token counts.

/// Per-million price, e.g. `$2.50`. Sub-cent prices keep four decimals.
#[must_use]
pub fn format_price(value: f64) -> String {
    if value > 0.0 && value < 0.01 {
        format!("${value:.4}")
    } else {
        format!("${value:.2}")
    }
}

/// Estimated spend, e.g. `$0.006875`.
#[must_use]
pub fn format_cost(value: f64) -> String {
    format!("${value:.6}")
}

/// Context window in compact form: `128K`, `1M`, `1.5M`.
#[must_use]
pub fn format_context(tokens: u64) -> String {
    fn compact(value: u64, divisor: u64, suffix: &str) -> String {
        let major = value / divisor;
        let minor = (value % divisor) / (divisor / 10);
        if minor == 0 {
            format!("{major}{suffix}")
        } else {
            format!("{major}.{minor}{suffix}")
        }
    }

    if tokens >= 1_000_000 {
        compact(tokens, 1_000_000, "M")
    } else if tokens >= 1_000 {
        compact(tokens, 1_000, "K")
    } else {
        tokens.to_string()
    }
}

/// Token count with thousands separators, e.g. `12,500`.
#[must_use]
pub fn format_tokens(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `yes`/`no` for capability flags.
#[must_use]
pub const fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices() {
        assert_eq!(format_price(2.5), "$2.50");
        assert_eq!(format_price(0.0), "$0.00");
        assert_eq!(format_price(0.0075), "$0.0075");
    }

    #[test]
    fn costs_keep_six_decimals() {
        assert_eq!(format_cost(0.006_875), "$0.006875");
    }

    #[test]
    fn context_sizes() {
        assert_eq!(format_context(128_000), "128K");
        assert_eq!(format_context(1_000_000), "1M");
        assert_eq!(format_context(1_500_000), "1.5M");
        assert_eq!(format_context(8_192), "8.1K");
        assert_eq!(format_context(512), "512");
    }

    #[test]
    fn token_separators() {
        assert_eq!(format_tokens(0), "0");
        assert_eq!(format_tokens(999), "999");
        assert_eq!(format_tokens(12_500), "12,500");
        assert_eq!(format_tokens(1_234_567), "1,234,567");
    }
}
