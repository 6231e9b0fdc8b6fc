//! Decimal-exact display-amount rendering.
//!
//! Raw token amounts are integers scaled by `10^decimals`. Rendering goes
//! through digit-string arithmetic rather than floating point: f64 loses
//! precision near 2^53, and `10^decimals` overflows even u128 past 38.

/// Renders `raw / 10^decimals` as a fixed-point decimal string, trimming
/// trailing fractional zeros and a bare trailing point. `decimals == 0`
/// returns the raw integer string unchanged.
pub fn format_token_amount(raw: u64, decimals: u8) -> String {
    if decimals == 0 {
        return raw.to_string();
    }

    let digits = raw.to_string();
    let point = decimals as usize;
    let (integer, fraction) = if digits.len() > point {
        let split = digits.len() - point;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{digits:0>point$}"))
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer
    } else {
        format!("{integer}.{fraction}")
    }
}
