//! Decimal arithmetic with banker's rounding.
//!
//! Binary floats cannot reproduce "round 0.125 to two digits" the way an
//! author reading the SVG expects, so every coordinate the optimizer touches
//! goes through [`Decimal`]. Values are `coefficient × 10^exponent` with the
//! coefficient held to [`WORKING_DIGITS`] significant digits; results of
//! arithmetic are rounded half-to-even to that precision.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// Significant digits every arithmetic result is rounded to.
pub const WORKING_DIGITS: u32 = 18;

/// Largest power of ten an i128 coefficient can be scaled to safely.
const MAX_SCALE_DIGITS: u32 = 37;

#[derive(Debug, Clone, Copy)]
pub struct Decimal {
    coeff: i128,
    exp: i32,
}

fn pow10(n: u32) -> i128 {
    10i128.pow(n)
}

fn digit_count(c: i128) -> u32 {
    if c == 0 { 1 } else { c.unsigned_abs().ilog10() + 1 }
}

/// Drop `drop` trailing digits from `coeff`, rounding half to even.
/// `sticky` records that nonzero digits were already discarded below these.
fn round_half_even(coeff: i128, drop: u32, sticky: bool) -> i128 {
    if drop == 0 {
        return coeff;
    }
    if drop > 38 {
        return 0;
    }
    let div = pow10(drop);
    let q = coeff / div;
    let r = (coeff % div).abs();
    let half = div / 2;
    let up = r > half || (r == half && (sticky || q % 2 != 0));
    if up { q + coeff.signum() } else { q }
}

impl Decimal {
    pub const ZERO: Decimal = Decimal { coeff: 0, exp: 0 };
    pub const ONE: Decimal = Decimal { coeff: 1, exp: 0 };

    /// Build `coeff × 10^exp`, rounding to the working precision.
    pub fn new(coeff: i128, exp: i32) -> Self {
        Self::rounded(coeff, exp, WORKING_DIGITS, false)
    }

    pub fn from_i64(v: i64) -> Self {
        Self::new(v as i128, 0)
    }

    fn rounded(coeff: i128, exp: i32, digits: u32, sticky: bool) -> Self {
        if coeff == 0 {
            return Self::ZERO;
        }
        let n = digit_count(coeff);
        if n <= digits && !sticky {
            return Self { coeff, exp };
        }
        let drop = n.saturating_sub(digits);
        let mut c = round_half_even(coeff, drop, sticky);
        let mut e = exp.saturating_add(drop as i32);
        if digit_count(c) > digits {
            // 999.5 -> 1000: the carry added a digit, and it is a zero
            c /= 10;
            e = e.saturating_add(1);
        }
        if c == 0 {
            return Self::ZERO;
        }
        Self { coeff: c, exp: e }
    }

    /// Convert a binary float through its shortest round-trip representation.
    pub fn from_f64(v: f64) -> Option<Self> {
        if !v.is_finite() {
            return None;
        }
        let mut buf = ryu::Buffer::new();
        buf.format_finite(v).parse().ok()
    }

    pub fn to_f64(self) -> f64 {
        format!("{}e{}", self.coeff, self.exp).parse().unwrap_or(f64::NAN)
    }

    pub fn coefficient(self) -> i128 {
        self.coeff
    }

    pub fn exponent(self) -> i32 {
        self.exp
    }

    pub fn is_zero(self) -> bool {
        self.coeff == 0
    }

    pub fn is_negative(self) -> bool {
        self.coeff < 0
    }

    pub fn abs(self) -> Self {
        Self {
            coeff: self.coeff.abs(),
            exp: self.exp,
        }
    }

    /// Exponent of the most significant digit (`1234` → 3, `0.05` → -2).
    pub fn adjusted(self) -> i32 {
        self.exp + digit_count(self.coeff) as i32 - 1
    }

    pub fn is_integer(self) -> bool {
        if self.exp >= 0 || self.coeff == 0 {
            return true;
        }
        let frac_digits = self.exp.unsigned_abs();
        frac_digits <= 38 && self.coeff % pow10(frac_digits) == 0
    }

    /// Strip trailing zeros from the coefficient.
    pub fn normalize(self) -> Self {
        if self.coeff == 0 {
            return Self::ZERO;
        }
        let mut c = self.coeff;
        let mut e = self.exp;
        while c % 10 == 0 {
            c /= 10;
            e += 1;
        }
        Self { coeff: c, exp: e }
    }

    /// Round to `digits` significant digits.
    pub fn round_sig(self, digits: u32) -> Self {
        Self::rounded(self.coeff, self.exp, digits.max(1), false)
    }

    /// Round (or pad) to exactly the given exponent, like a fixed number of decimals.
    pub fn quantize(self, exp: i32) -> Self {
        if self.coeff == 0 {
            return Self { coeff: 0, exp };
        }
        if exp >= self.exp {
            let drop = (exp - self.exp) as u32;
            let c = round_half_even(self.coeff, drop.min(39), false);
            return Self { coeff: c, exp };
        }
        let grow = (self.exp - exp) as u32;
        if digit_count(self.coeff) + grow > MAX_SCALE_DIGITS {
            return self;
        }
        Self {
            coeff: self.coeff * pow10(grow),
            exp,
        }
    }

    /// Division rounded to the working precision. `None` when dividing by zero.
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.coeff == 0 {
            return None;
        }
        if self.coeff == 0 {
            return Some(Self::ZERO);
        }
        let k = MAX_SCALE_DIGITS - digit_count(self.coeff);
        let num = self.coeff * pow10(k);
        let q = num / rhs.coeff;
        let r = num % rhs.coeff;
        let exp = self.exp.saturating_sub(k as i32).saturating_sub(rhs.exp);
        Some(Self::rounded(q, exp, WORKING_DIGITS, r != 0))
    }

    /// Remainder with the sign of the dividend (truncating division).
    pub fn checked_rem(self, rhs: Self) -> Option<Self> {
        if rhs.coeff == 0 {
            return None;
        }
        let e = self.exp.min(rhs.exp);
        let a = self
            .coeff
            .checked_mul(pow10_checked((self.exp - e) as u32)?)?;
        let b = rhs.coeff.checked_mul(pow10_checked((rhs.exp - e) as u32)?)?;
        Some(Self::new(a % b, e))
    }

    /// Plain positional notation, never an exponent (`1.5E+3` → `1500`).
    pub fn to_plain_string(self) -> String {
        let digits = self.coeff.unsigned_abs().to_string();
        let mut out = String::with_capacity(digits.len() + 4);
        if self.coeff < 0 {
            out.push('-');
        }
        if self.exp >= 0 {
            out.push_str(&digits);
            if self.coeff != 0 {
                out.extend(std::iter::repeat_n('0', self.exp as usize));
            }
            return out;
        }
        let point = digits.len() as i64 + self.exp as i64;
        if point > 0 {
            let (int, frac) = digits.split_at(point as usize);
            out.push_str(int);
            out.push('.');
            out.push_str(frac);
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat_n('0', (-point) as usize));
            out.push_str(&digits);
        }
        out
    }
}

fn pow10_checked(n: u32) -> Option<i128> {
    10i128.checked_pow(n)
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Self) -> Self {
        if self.coeff == 0 {
            return rhs;
        }
        if rhs.coeff == 0 {
            return self;
        }
        let (hi, lo) = if self.exp >= rhs.exp { (self, rhs) } else { (rhs, self) };
        let diff = (hi.exp as i64 - lo.exp as i64) as u64;
        let room = MAX_SCALE_DIGITS - digit_count(hi.coeff);
        if diff <= room as u64 {
            return Decimal::new(hi.coeff * pow10(diff as u32) + lo.coeff, lo.exp);
        }
        // lo sits entirely below the working precision of hi; keep enough of
        // it to round correctly
        let shift = (diff - room as u64).min(39) as u32;
        let lo_c = round_half_even(lo.coeff, shift, false);
        Decimal::rounded(
            hi.coeff * pow10(room) + lo_c,
            hi.exp - room as i32,
            WORKING_DIGITS,
            false,
        )
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Self {
        Self {
            coeff: -self.coeff,
            exp: self.exp,
        }
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Self) -> Self {
        Decimal::new(self.coeff * rhs.coeff, self.exp.saturating_add(rhs.exp))
    }
}

impl std::ops::AddAssign for Decimal {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::SubAssign for Decimal {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let (sa, sb) = (self.coeff.signum(), other.coeff.signum());
        if sa != sb {
            return sa.cmp(&sb);
        }
        if sa == 0 {
            return Ordering::Equal;
        }
        let (aa, ba) = (self.adjusted(), other.adjusted());
        let magnitude = if aa != ba {
            aa.cmp(&ba)
        } else {
            // same leading digit position, so the exponents differ by at most
            // the coefficient length
            let e = self.exp.min(other.exp);
            let a = self.coeff.abs() * pow10((self.exp - e) as u32);
            let b = other.coeff.abs() * pow10((other.exp - e) as u32);
            a.cmp(&b)
        };
        if sa > 0 { magnitude } else { magnitude.reverse() }
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let n = self.normalize();
        n.coeff.hash(state);
        n.exp.hash(state);
    }
}

impl From<i64> for Decimal {
    fn from(v: i64) -> Self {
        Decimal::from_i64(v)
    }
}

/// The string was not a decimal number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDecimalError;

impl fmt::Display for ParseDecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid decimal number")
    }
}

impl std::error::Error for ParseDecimalError {}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    /// Accepts `[+-]digits[.digits][(e|E)[+-]digits]`, with either side of the
    /// point allowed to be empty but not both.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let mut i = 0;
        let negative = match bytes.first() {
            Some(b'-') => {
                i += 1;
                true
            }
            Some(b'+') => {
                i += 1;
                false
            }
            _ => false,
        };

        let mut coeff: i128 = 0;
        let mut exp: i64 = 0;
        let mut sig = 0u32;
        let mut sticky = false;
        let mut any_digit = false;
        let mut seen_point = false;

        while i < bytes.len() {
            let b = bytes[i];
            match b {
                b'0'..=b'9' => {
                    any_digit = true;
                    let d = (b - b'0') as i128;
                    if sig < MAX_SCALE_DIGITS {
                        if coeff != 0 || d != 0 {
                            sig += 1;
                        }
                        coeff = coeff * 10 + d;
                        if seen_point {
                            exp -= 1;
                        }
                    } else {
                        sticky |= d != 0;
                        if !seen_point {
                            exp += 1;
                        }
                    }
                }
                b'.' if !seen_point => seen_point = true,
                _ => break,
            }
            i += 1;
        }
        if !any_digit {
            return Err(ParseDecimalError);
        }

        if i < bytes.len() {
            if bytes[i] != b'e' && bytes[i] != b'E' {
                return Err(ParseDecimalError);
            }
            i += 1;
            let exp_str = &s[i..];
            let digits = exp_str.strip_prefix(['+', '-']).unwrap_or(exp_str);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseDecimalError);
            }
            let e: i64 = exp_str.parse().unwrap_or(if exp_str.starts_with('-') {
                -1_000_000
            } else {
                1_000_000
            });
            exp += e.clamp(-1_000_000, 1_000_000);
        }

        if negative {
            coeff = -coeff;
        }
        let exp = exp.clamp(i32::MIN as i64 / 2, i32::MAX as i64 / 2) as i32;
        Ok(Decimal::rounded(coeff, exp, WORKING_DIGITS, sticky))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain_string())
    }
}

/// The two precisions the optimizer rounds with: one for ordinary numbers and
/// a coarser one for Bézier control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericContext {
    pub precision: u32,
    pub control_precision: u32,
}

impl NumericContext {
    /// A control precision above the general one is ignored.
    pub fn new(precision: u32, control_precision: Option<u32>) -> Self {
        let precision = precision.clamp(1, WORKING_DIGITS);
        let control_precision = match control_precision {
            Some(c) if c >= 1 && c <= precision => c,
            _ => precision,
        };
        Self {
            precision,
            control_precision,
        }
    }

    pub fn round(&self, v: Decimal) -> Decimal {
        v.round_sig(self.precision)
    }

    pub fn round_control(&self, v: Decimal) -> Decimal {
        v.round_sig(self.control_precision)
    }
}

impl Default for NumericContext {
    fn default() -> Self {
        Self::new(5, None)
    }
}
