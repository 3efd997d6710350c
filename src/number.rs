//! Shortest textual form for numbers and coordinate lists.

use crate::decimal::{Decimal, NumericContext};
use crate::length::Length;

/// One token in a coordinate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coord {
    Number(Decimal),
    /// A Bézier control point coordinate, rounded with the control precision.
    Control(Decimal),
    /// An elliptical arc flag.
    Flag(bool),
}

/// Emits numbers under a numeric context.
#[derive(Debug, Clone, Copy)]
pub struct NumberFormat {
    pub ctx: NumericContext,
    /// Keep leading zeros and extra separators some renderers need.
    pub renderer_workaround: bool,
}

impl NumberFormat {
    pub fn new(ctx: NumericContext, renderer_workaround: bool) -> Self {
        Self {
            ctx,
            renderer_workaround,
        }
    }

    /// A plain number at the general precision, leading zero dropped.
    /// Used for lengths and transform arguments, which never take the workaround.
    pub fn number(&self, v: Decimal) -> String {
        format_decimal(v, self.ctx.precision, false)
    }

    /// A length with its unit. `None` for values that are not lengths.
    pub fn length(&self, s: &str) -> Option<String> {
        let len = Length::parse(s);
        if !len.is_valid() {
            return None;
        }
        let mut out = self.number(len.value);
        out.push_str(len.unit.as_str());
        Some(out)
    }

    fn coord(&self, c: Coord) -> String {
        match c {
            Coord::Number(v) => format_decimal(v, self.ctx.precision, self.renderer_workaround),
            Coord::Control(v) => format_decimal(v, self.ctx.control_precision, self.renderer_workaround),
            Coord::Flag(f) => if f { "1" } else { "0" }.to_string(),
        }
    }

    /// Join coordinates with the fewest separators that still parse back the
    /// same way. `force_whitespace` puts a space between every pair of tokens.
    pub fn coords(&self, coords: &[Coord], force_whitespace: bool) -> String {
        let mut out = String::new();
        let mut prev = String::new();
        let mut prev_is_flag = false;
        for (i, &c) in coords.iter().enumerate() {
            let token = self.coord(c);
            let first = token.as_bytes().first().copied().unwrap_or(b'0');
            if i > 0 {
                let needs_space = force_whitespace
                    || first.is_ascii_digit()
                    || (first == b'.' && !(prev.contains('.') || prev.contains('e')));
                let workaround_exponent = self.renderer_workaround && first == b'-' && prev.contains('e');
                if (needs_space && (!prev_is_flag || self.renderer_workaround)) || workaround_exponent {
                    out.push(' ');
                }
            }
            out.push_str(&token);
            prev_is_flag = matches!(c, Coord::Flag(_));
            prev = token;
        }
        out
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::new(NumericContext::default(), false)
    }
}

/// Format `v` with `digits` significant digits, choosing between positional
/// and scientific notation by length.
pub fn format_decimal(v: Decimal, digits: u32, renderer_workaround: bool) -> String {
    let rounded = v.round_sig(digits);
    let exp = if rounded.is_integer() {
        0
    } else {
        rounded.normalize().exponent()
    };
    // requantize the original so 123.4 at two digits keeps its integer part
    let mut plain = v.quantize(exp).to_plain_string();
    if !renderer_workaround {
        if let Some(rest) = plain.strip_prefix("0.") {
            plain = format!(".{rest}");
        } else if let Some(rest) = plain.strip_prefix("-0.") {
            plain = format!("-.{rest}");
        }
    }

    if plain.len() > 3 {
        let normalized = rounded.normalize();
        let adjusted = normalized.adjusted();
        let mantissa = Decimal::new(normalized.coefficient(), normalized.exponent() - adjusted);
        let sci = format!("{}e{}", mantissa.to_plain_string(), adjusted);
        if sci.len() < plain.len() {
            return sci;
        }
    }
    plain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn fmt(s: &str, digits: u32) -> String {
        format_decimal(d(s), digits, false)
    }

    #[test]
    fn test_trailing_zeros_and_integers() {
        assert_eq!(fmt("1.500", 5), "1.5");
        assert_eq!(fmt("100.0", 5), "100");
        assert_eq!(fmt("0", 5), "0");
        assert_eq!(fmt("-0.0", 5), "0");
    }

    #[test]
    fn test_leading_zero_dropped() {
        assert_eq!(fmt("0.5", 5), ".5");
        assert_eq!(fmt("-0.25", 5), "-.25");
        assert_eq!(format_decimal(d("0.5"), 5, true), "0.5");
    }

    #[test]
    fn test_precision_rounding() {
        assert_eq!(fmt("123.456", 5), "123.46");
        assert_eq!(fmt("123.4", 2), "123");
        assert_eq!(fmt("0.123456", 3), ".123");
        assert_eq!(fmt("2.5", 1), "2");
    }

    #[test]
    fn test_scientific_when_shorter() {
        assert_eq!(fmt("10000", 5), "1e4");
        assert_eq!(fmt("4321", 1), "4e3");
        assert_eq!(fmt("45", 1), "45");
        assert_eq!(fmt("0.00001", 5), "1e-5");
        assert_eq!(fmt("1000", 5), "1e3");
        // ties keep the plain form
        assert_eq!(fmt("100", 5), "100");
        assert_eq!(fmt("-0.001", 5), "-.001");
    }

    #[test]
    fn test_coords_separators() {
        let f = NumberFormat::default();
        let n = |s: &str| Coord::Number(d(s));
        assert_eq!(f.coords(&[n("10"), n("-5")], false), "10-5");
        assert_eq!(f.coords(&[n("10"), n("5")], false), "10 5");
        assert_eq!(f.coords(&[n("1.5"), n("0.5")], false), "1.5.5");
        assert_eq!(f.coords(&[n("15"), n("0.5")], false), "15 .5");
        assert_eq!(f.coords(&[n("1e4"), n("0.5")], false), "1e4.5");
        assert_eq!(f.coords(&[n("10"), n("-5")], true), "10 -5");
    }

    #[test]
    fn test_coords_arc_flags() {
        let f = NumberFormat::default();
        let n = |s: &str| Coord::Number(d(s));
        let arc = [n("5"), n("5"), n("0"), Coord::Flag(true), Coord::Flag(false), n("10"), n("10")];
        assert_eq!(f.coords(&arc, false), "5 5 0 1010 10");

        let w = NumberFormat::new(NumericContext::default(), true);
        assert_eq!(w.coords(&arc, false), "5 5 0 1 0 10 10");
    }

    #[test]
    fn test_control_points_use_control_precision() {
        let f = NumberFormat::new(NumericContext::new(5, Some(3)), false);
        let out = f.coords(&[Coord::Control(d("1.23456")), Coord::Number(d("1.23456"))], false);
        assert_eq!(out, "1.23 1.2346");
    }

    #[test]
    fn test_workaround_separates_exponent() {
        let w = NumberFormat::new(NumericContext::default(), true);
        let out = w.coords(&[Coord::Number(d("10000")), Coord::Number(d("-5"))], false);
        assert_eq!(out, "1e4 -5");
    }

    #[test]
    fn test_length_keeps_unit() {
        let f = NumberFormat::default();
        assert_eq!(f.length("10.000px").as_deref(), Some("10px"));
        assert_eq!(f.length("0.50%").as_deref(), Some(".5%"));
        assert_eq!(f.length("auto"), None);
    }
}
