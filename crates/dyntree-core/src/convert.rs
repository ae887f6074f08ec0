//! Numeric formatting and parsing shared by the coercing readers and the
//! serializers.

/// Format a number per the serializer contract:
/// - Integral values that fit in an `i64` have no decimal point (`34`, `-2`)
/// - Other finite values use plain decimal notation, never an exponent
///   (`21.1`, `0.0000001`)
/// - Negative zero normalizes to `0`
/// - Non-finite values format as `NaN`, `inf`, `-inf`; JSON output maps them
///   to `null` before reaching this function
///
/// # Examples
///
/// ```
/// use dyntree_core::format_number;
/// assert_eq!(format_number(34.0), "34");
/// assert_eq!(format_number(21.1), "21.1");
/// assert_eq!(format_number(-0.0), "0");
/// ```
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return (value as i64).to_string();
    }
    // f64's Display never switches to exponent notation.
    format!("{}", value)
}

/// Parse the longest numeric prefix of `text`, C `atof` style: leading
/// whitespace, optional sign, digits, optional fraction, optional exponent.
/// Returns 0 when no digits are found.
///
/// ```
/// use dyntree_core::convert::parse_number_prefix;
/// assert_eq!(parse_number_prefix("  42abc"), 42.0);
/// assert_eq!(parse_number_prefix("-1.5e2 apples"), -150.0);
/// assert_eq!(parse_number_prefix("apples"), 0.0);
/// ```
pub fn parse_number_prefix(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return 0.0;
    }

    // Exponent only counts when at least one digit follows it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}
