//! Display formatting for amounts: grouped thousands, two fraction digits.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use super::expression::{is_decimal_separator, is_operator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub group_separator: char,
    pub decimal_separator: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            group_separator: ' ',
            decimal_separator: ',',
        }
    }
}

impl NumberFormat {
    /// Separators must stay readable by the expression evaluator, which
    /// ignores the group separator and accepts `,` or `.` as decimal point.
    pub fn validate(&self) -> Result<()> {
        if !is_decimal_separator(self.decimal_separator) {
            bail!(
                "Decimal separator must be ',' or '.', got {:?}",
                self.decimal_separator
            );
        }
        let group = self.group_separator;
        if group.is_ascii_digit() || is_operator(group) || is_decimal_separator(group) {
            bail!("Invalid group separator: {:?}", group);
        }
        Ok(())
    }

    /// Renders `amount` like `100 000,50`.
    pub fn format(&self, amount: f64) -> String {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        let fixed = format!("{:.2}", amount.abs());
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, digit) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(self.group_separator);
            }
            grouped.push(digit);
        }

        let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
        format!("{sign}{grouped}{}{frac_part}", self.decimal_separator)
    }

    /// Reads formatted text back into a number, `0` when unparseable.
    pub fn parse(&self, text: &str) -> f64 {
        let normalized: String = text
            .chars()
            .filter(|ch| !ch.is_whitespace() && *ch != self.group_separator)
            .map(|ch| if ch == self.decimal_separator { '.' } else { ch })
            .collect();
        normalized
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .unwrap_or(0.0)
    }
}

pub fn format_amount(amount: f64) -> String {
    NumberFormat::default().format(amount)
}

pub fn parse_amount(text: &str) -> f64 {
    NumberFormat::default().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(format_amount(100000.5), "100 000,50");
        assert_eq!(format_amount(1234567.891), "1 234 567,89");
        assert_eq!(format_amount(999.0), "999,00");
        assert_eq!(format_amount(1000.0), "1 000,00");
        assert_eq!(format_amount(0.0), "0,00");
    }

    #[test]
    fn test_format_negative_and_non_finite() {
        assert_eq!(format_amount(-1500.25), "-1 500,25");
        assert_eq!(format_amount(-0.001), "0,00");
        assert_eq!(format_amount(f64::NAN), "0,00");
        assert_eq!(format_amount(f64::INFINITY), "0,00");
    }

    #[test]
    fn test_parse_formatted_text() {
        assert_eq!(parse_amount("100 000,50"), 100000.5);
        assert_eq!(parse_amount("  42 "), 42.0);
        assert_eq!(parse_amount("12.5"), 12.5);
        assert_eq!(parse_amount("not a number"), 0.0);
        assert_eq!(parse_amount(""), 0.0);
    }

    #[test]
    fn test_parse_inverts_format() {
        for value in [0.0, 0.5, 12.34, 1000.0, 100000.5, 98765432.1] {
            let parsed = parse_amount(&format_amount(value));
            assert!((parsed - value).abs() < 0.005, "{value} -> {parsed}");
        }
    }

    #[test]
    fn test_custom_separators() {
        let format = NumberFormat {
            group_separator: '\'',
            decimal_separator: '.',
        };
        assert!(format.validate().is_ok());
        assert_eq!(format.format(1234567.5), "1'234'567.50");
        assert_eq!(format.parse("1'234'567.50"), 1234567.5);
    }

    #[test]
    fn test_validate_rejects_ambiguous_separators() {
        let bad_decimal = NumberFormat {
            group_separator: ' ',
            decimal_separator: ';',
        };
        assert!(bad_decimal.validate().is_err());

        let bad_group = NumberFormat {
            group_separator: ',',
            decimal_separator: '.',
        };
        assert!(bad_group.validate().is_err());

        let operator_group = NumberFormat {
            group_separator: '-',
            decimal_separator: ',',
        };
        assert!(operator_group.validate().is_err());
    }
}
