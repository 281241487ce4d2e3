//! Rendering of euro amounts held in cents. Integer arithmetic only.

use serde::{Deserialize, Serialize};

/// Separators used when rendering amounts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocaleConfig {
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for LocaleConfig {
    /// French conventions: `1 234,56`.
    fn default() -> Self {
        Self {
            decimal_separator: ',',
            grouping_separator: ' ',
        }
    }
}

/// Formats cents as a grouped decimal number without currency symbol.
pub fn format_cents(locale: &LocaleConfig, cents: i64) -> String {
    let magnitude = cents.unsigned_abs();
    let units = (magnitude / 100).to_string();
    let fraction = magnitude % 100;
    let sign = if cents < 0 { "-" } else { "" };
    format!(
        "{}{}{}{:02}",
        sign,
        group_digits(&units, locale.grouping_separator),
        locale.decimal_separator,
        fraction
    )
}

/// `123456` → `"1 234,56 €"`.
pub fn format_eur(cents: i64) -> String {
    format!("{} €", format_cents(&LocaleConfig::default(), cents))
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    let mut count = 0;
    for ch in digits.chars().rev() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
        count += 1;
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_euros_with_french_separators() {
        assert_eq!(format_eur(123_456), "1 234,56 €");
        assert_eq!(format_eur(5), "0,05 €");
        assert_eq!(format_eur(100_000_000), "1 000 000,00 €");
    }

    #[test]
    fn negative_amounts_keep_the_sign_before_grouping() {
        assert_eq!(format_eur(-123_456), "-1 234,56 €");
        assert_eq!(format_eur(i64::MIN), "-92 233 720 368 547 758,08 €");
    }

    #[test]
    fn custom_separators() {
        let locale = LocaleConfig {
            decimal_separator: '.',
            grouping_separator: ',',
        };
        assert_eq!(format_cents(&locale, 9_876_543), "98,765.43");
    }
}
