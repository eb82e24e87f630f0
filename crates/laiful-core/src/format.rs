//! Text helpers shared by the flows.

use chrono::Utc;
use std::time::Duration;

/// Format an amount with Indonesian digit grouping (`10000` → `10.000`).
///
/// Up to three fraction digits are kept, separated by a comma.
#[must_use]
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = (value.abs() * 1000.0).round() as u64;
    let (int_part, frac_part) = (scaled / 1000, scaled % 1000);

    let mut out = String::new();
    if value < 0.0 && scaled > 0 {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if frac_part > 0 {
        out.push(',');
        out.push_str(format!("{frac_part:03}").trim_end_matches('0'));
    }
    out
}

/// `Rp`-prefixed price; a missing amount renders as zero.
#[must_use]
pub fn rupiah(value: Option<f64>) -> String {
    format!("Rp{}", format_price(value.unwrap_or(0.0)))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Parse a user-typed amount.
///
/// Every non-digit character is stripped (`"Rp 10.000"` → `10000`). Input
/// with a leading minus sign, no digits, or a zero value is rejected.
#[must_use]
pub fn parse_nominal(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    if trimmed.starts_with('-') {
        return None;
    }
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<u64>().ok().filter(|n| *n > 0)
}

/// Locally owned reference id, e.g. `PB-1718000000000`.
#[must_use]
pub fn reference_id(prefix: &str) -> String {
    format!("{prefix}-{}", Utc::now().timestamp_millis())
}

/// Cooldown prompt with the wait rounded up to a tenth of a second.
#[must_use]
pub fn wait_message(wait: Duration) -> String {
    let tenths = wait.as_millis().div_ceil(100);
    let seconds = if tenths % 10 == 0 {
        format!("{}", tenths / 10)
    } else {
        format!("{}.{}", tenths / 10, tenths % 10)
    };
    format!("Tunggu {seconds}s sebelum melanjutkan.")
}

/// Percent-encode a value for use inside a button id.
#[must_use]
pub fn encode_id(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 3);
    for c in text.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '('
            | ')' => result.push(c),
            _ => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    result.push_str(&format!("%{byte:02X}"));
                }
            }
        }
    }
    result
}

/// Decode a value produced by [`encode_id`]; malformed input is returned unchanged.
#[must_use]
pub fn decode_id(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let Some(byte) = text
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            else {
                return text.to_string();
            };
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).unwrap_or_else(|_| text.to_string())
}
