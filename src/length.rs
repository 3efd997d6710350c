//! `<number><unit>` values such as `12.5px`, `50%` or `1e3`.

use std::str::FromStr;

use crate::decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    None,
    Percent,
    Px,
    Pt,
    Pc,
    Em,
    Ex,
    Cm,
    Mm,
    In,
    /// The string was not a length at all.
    Invalid,
}

impl Unit {
    pub fn from_suffix(s: &str) -> Unit {
        match s {
            "" => Unit::None,
            "%" => Unit::Percent,
            "px" => Unit::Px,
            "pt" => Unit::Pt,
            "pc" => Unit::Pc,
            "em" => Unit::Em,
            "ex" => Unit::Ex,
            "cm" => Unit::Cm,
            "mm" => Unit::Mm,
            "in" => Unit::In,
            _ => Unit::Invalid,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::None | Unit::Invalid => "",
            Unit::Percent => "%",
            Unit::Px => "px",
            Unit::Pt => "pt",
            Unit::Pc => "pc",
            Unit::Em => "em",
            Unit::Ex => "ex",
            Unit::Cm => "cm",
            Unit::Mm => "mm",
            Unit::In => "in",
        }
    }

    /// No unit and `px` mean the same thing in user space.
    pub fn is_user_unit(self) -> bool {
        matches!(self, Unit::None | Unit::Px)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Length {
    pub value: Decimal,
    pub unit: Unit,
}

impl Length {
    const INVALID: Length = Length {
        value: Decimal::ZERO,
        unit: Unit::Invalid,
    };

    /// Parse a length. Anything that does not fit the grammar comes back with
    /// [`Unit::Invalid`] and a zero value instead of an error.
    pub fn parse(s: &str) -> Length {
        let s = s.trim();
        let split = number_prefix_len(s);
        if split == 0 {
            return Length::INVALID;
        }
        let (num, suffix) = s.split_at(split);
        let Ok(value) = Decimal::from_str(num) else {
            return Length::INVALID;
        };
        match Unit::from_suffix(suffix) {
            Unit::Invalid => Length::INVALID,
            unit => Length { value, unit },
        }
    }

    pub fn is_valid(&self) -> bool {
        self.unit != Unit::Invalid
    }
}

/// Byte length of the leading `±digits[.digits][e±digits]` run of `s`.
/// An `e` not followed by digits is left for the unit (`1em`, `2ex`).
pub fn number_prefix_len(s: &str) -> usize {
    let b = s.as_bytes();
    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let mut digits = 0;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < b.len() && b[i] == b'.' {
        let mut j = i + 1;
        let mut frac = 0;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
            frac += 1;
        }
        if frac > 0 || digits > 0 {
            i = j;
            digits += frac;
        }
    }
    if digits == 0 {
        return 0;
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        let start = j;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        if j > start {
            i = j;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(Length::parse("10"), Length { value: d("10"), unit: Unit::None });
        assert_eq!(Length::parse("12.5px").unit, Unit::Px);
        assert_eq!(Length::parse("50%"), Length { value: d("50"), unit: Unit::Percent });
        assert_eq!(Length::parse("-.5em"), Length { value: d("-0.5"), unit: Unit::Em });
        assert_eq!(Length::parse(" 3in ").unit, Unit::In);
    }

    #[test]
    fn test_parse_scientific() {
        assert_eq!(Length::parse("1e3").value, d("1000"));
        assert_eq!(Length::parse("1.5E-2mm"), Length { value: d("0.015"), unit: Unit::Mm });
        // the exponent needs digits, otherwise `e` starts the unit
        assert_eq!(Length::parse("2ex"), Length { value: d("2"), unit: Unit::Ex });
    }

    #[test]
    fn test_invalid_lengths() {
        assert!(!Length::parse("auto").is_valid());
        assert!(!Length::parse("inherit").is_valid());
        assert!(!Length::parse("10furlongs").is_valid());
        assert!(!Length::parse("").is_valid());
        assert!(!Length::parse(".").is_valid());
        assert_eq!(Length::parse("none").value, Decimal::ZERO);
    }

    #[test]
    fn test_user_units() {
        assert!(Unit::None.is_user_unit());
        assert!(Unit::Px.is_user_unit());
        assert!(!Unit::Percent.is_user_unit());
    }
}
