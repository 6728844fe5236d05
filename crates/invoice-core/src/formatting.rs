/// Format an amount with thousands separators and a fixed number of decimals.
///
/// # Examples
///
/// ```
/// use invoice_core::formatting::format_amount;
///
/// assert_eq!(format_amount(2524.76, 2), "2,524.76");
/// assert_eq!(format_amount(1234567.0, 0), "1,234,567");
/// assert_eq!(format_amount(0.0, 2), "0.00");
/// assert_eq!(format_amount(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_amount(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::new();
    // Rounding can turn -0.001 into "0.00"; never print "-0.00".
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format an integer count with thousands separators.
///
/// ```
/// use invoice_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1_048_576), "1,048,576");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Insert a `,` every three digits from the right of a run of ASCII digits.
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
