use std::fmt::{Debug, Display, Formatter, Write};

/// Number in the Vietnamese convention: `.` groups the thousands and `,` separates
/// at most three fraction digits, trailing zeros dropped.
pub struct FormattedNumber(pub f64);

impl Debug for FormattedNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for FormattedNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let value = self.0;
        if value.is_nan() {
            return f.write_str("NaN");
        }
        if value.is_infinite() {
            return f.write_str(if value.is_sign_positive() { "∞" } else { "-∞" });
        }

        let rounded = format!("{:.3}", value.abs());
        let (integer, fraction) = rounded.split_once('.').unwrap_or((&rounded, ""));
        let fraction = fraction.trim_end_matches('0');

        // Rounding may leave nothing but zeros, and `-0` is not a thing.
        if value.is_sign_negative() && (integer != "0" || !fraction.is_empty()) {
            f.write_char('-')?;
        }
        for (i, digit) in integer.chars().enumerate() {
            if i != 0 && (integer.len() - i) % 3 == 0 {
                f.write_char('.')?;
            }
            f.write_char(digit)?;
        }
        if !fraction.is_empty() {
            write!(f, ",{fraction}")?;
        }
        Ok(())
    }
}
