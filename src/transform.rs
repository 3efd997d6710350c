//! `transform`, `gradientTransform` and `patternTransform` lists: parsing,
//! simplification and re-emission.

use crate::ast::Element;
use crate::decimal::Decimal;
use crate::error::BurnishError;
use crate::length::number_prefix_len;
use crate::number::NumberFormat;
use crate::stats::Statistics;

/// One entry of a transform list. Optional arguments stay optional so the
/// shortest form survives a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// `matrix(a b c d e f)`
    Matrix([Decimal; 6]),
    Translate(Decimal, Option<Decimal>),
    Scale(Decimal, Option<Decimal>),
    /// Angle in degrees, with an optional center.
    Rotate(Decimal, Option<(Decimal, Decimal)>),
    SkewX(Decimal),
    SkewY(Decimal),
}

impl Transform {
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Matrix(_) => "matrix",
            Transform::Translate(..) => "translate",
            Transform::Scale(..) => "scale",
            Transform::Rotate(..) => "rotate",
            Transform::SkewX(_) => "skewX",
            Transform::SkewY(_) => "skewY",
        }
    }

    fn args(&self) -> Vec<Decimal> {
        match *self {
            Transform::Matrix(m) => m.to_vec(),
            Transform::Translate(x, y) | Transform::Scale(x, y) => std::iter::once(x).chain(y).collect(),
            Transform::Rotate(a, None) => vec![a],
            Transform::Rotate(a, Some((cx, cy))) => vec![a, cx, cy],
            Transform::SkewX(a) | Transform::SkewY(a) => vec![a],
        }
    }

    fn is_identity(&self) -> bool {
        let zero = |v: &Decimal| v.is_zero();
        match self {
            Transform::Matrix(m) => *m == [Decimal::ONE, Decimal::ZERO, Decimal::ZERO, Decimal::ONE, Decimal::ZERO, Decimal::ZERO],
            Transform::Translate(x, y) => x.is_zero() && y.as_ref().is_none_or(zero),
            Transform::Scale(x, y) => *x == Decimal::ONE && y.is_none_or(|y| y == Decimal::ONE),
            Transform::Rotate(a, None) => a.is_zero(),
            Transform::Rotate(..) => false,
            Transform::SkewX(a) | Transform::SkewY(a) => a.is_zero(),
        }
    }
}

/// Parse a transform list such as `translate(10) rotate(45 5 5)`.
pub fn parse_transform(s: &str) -> Result<Vec<Transform>, BurnishError> {
    let err = |msg: String| BurnishError::InvalidTransform(msg);
    let mut out = Vec::new();
    let mut rest = s.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
    while !rest.is_empty() {
        let name_len = rest.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(rest.len());
        let (name, tail) = rest.split_at(name_len);
        let tail = tail.trim_start();
        let Some(tail) = tail.strip_prefix('(') else {
            return Err(err(format!("expected '(' after {name:?}")));
        };
        let Some(close) = tail.find(')') else {
            return Err(err(format!("unclosed {name:?}")));
        };
        let args = parse_numbers(&tail[..close]).ok_or_else(|| err(format!("bad arguments to {name:?}")))?;
        out.push(build(name, &args).ok_or_else(|| err(format!("{name}() with {} arguments", args.len())))?);
        rest = tail[close + 1..].trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
    }
    Ok(out)
}

fn parse_numbers(s: &str) -> Option<Vec<Decimal>> {
    let mut out = Vec::new();
    let mut rest = s.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
    while !rest.is_empty() {
        let n = number_prefix_len(rest);
        if n == 0 {
            return None;
        }
        out.push(rest[..n].parse().ok()?);
        rest = rest[n..].trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
    }
    Some(out)
}

fn build(name: &str, args: &[Decimal]) -> Option<Transform> {
    Some(match (name, args) {
        ("matrix", &[a, b, c, d, e, f]) => Transform::Matrix([a, b, c, d, e, f]),
        ("translate", &[x]) => Transform::Translate(x, None),
        ("translate", &[x, y]) => Transform::Translate(x, Some(y)),
        ("scale", &[x]) => Transform::Scale(x, None),
        ("scale", &[x, y]) => Transform::Scale(x, Some(y)),
        ("rotate", &[a]) => Transform::Rotate(a, None),
        ("rotate", &[a, cx, cy]) => Transform::Rotate(a, Some((cx, cy))),
        ("skewX", &[a]) => Transform::SkewX(a),
        ("skewY", &[a]) => Transform::SkewY(a),
        _ => return None,
    })
}

pub fn serialize_transform(list: &[Transform], fmt: &NumberFormat) -> String {
    let mut out = String::new();
    for (i, t) in list.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(t.name());
        out.push('(');
        let args: Vec<String> = t.args().into_iter().map(|v| fmt.number(v)).collect();
        out.push_str(&args.join(" "));
        out.push(')');
    }
    out
}

/// Bring an angle into `[-90, 270)`, where its text is shortest.
pub fn optimize_angle(angle: Decimal) -> Decimal {
    let full = Decimal::from_i64(360);
    let mut angle = angle.checked_rem(full).unwrap_or(angle);
    if angle >= Decimal::from_i64(270) {
        angle -= full;
    } else if angle < Decimal::from_i64(-90) {
        angle += full;
    }
    angle
}

/// Recognize a matrix that is really a translate, scale or rotate.
fn simplify_matrix(m: [Decimal; 6]) -> Option<Transform> {
    let [a, b, c, d, e, f] = m;
    let (zero, one) = (Decimal::ZERO, Decimal::ONE);
    if a == one && c == zero && b == zero && d == one {
        return Some(Transform::Translate(e, Some(f)));
    }
    if c == zero && e == zero && b == zero && f == zero {
        return Some(Transform::Scale(a, Some(d)));
    }
    let unit = |v: Decimal| v >= -one && v <= one;
    let epsilon = Decimal::new(1, -15);
    if a == d && unit(a) && e == zero && -b == c && unit(b) && f == zero && (b * b + a * a - one).abs() < epsilon {
        let (sin, cos) = (b, a);
        let mut angle = Decimal::from_f64(sin.to_f64().asin().to_degrees())?;
        if cos.is_negative() {
            let half = Decimal::from_i64(180);
            angle = if sin.is_negative() { -half - angle } else { half - angle };
        }
        return Some(Transform::Rotate(angle, None));
    }
    None
}

/// Simplify a transform list in place.
pub fn optimize_transform(list: &mut Vec<Transform>) {
    if let [Transform::Matrix(m)] = list[..] {
        if list[0].is_identity() {
            list.clear();
        } else if let Some(t) = simplify_matrix(m) {
            list[0] = t;
        }
    }

    for t in list.iter_mut() {
        *t = match *t {
            Transform::Translate(x, Some(y)) if y.is_zero() => Transform::Translate(x, None),
            Transform::Rotate(a, center) => {
                let center = center.filter(|(cx, cy)| !(cx.is_zero() && cy.is_zero()));
                Transform::Rotate(optimize_angle(a), center)
            }
            Transform::Scale(x, Some(y)) if x == y => Transform::Scale(x, None),
            other => other,
        };
    }

    // fold runs of the same kind into their first member
    let mut i = 1;
    while i < list.len() {
        let folded = match (list[i - 1], list[i]) {
            (Transform::Translate(x1, y1), Transform::Translate(x2, y2)) => {
                let y = match (y1, y2) {
                    (y1, None) => y1,
                    (None, Some(y2)) => Some(y2),
                    (Some(y1), Some(y2)) => Some(y1 + y2),
                };
                Some(Transform::Translate(x1 + x2, y))
            }
            (Transform::Rotate(a1, None), Transform::Rotate(a2, None)) => {
                Some(Transform::Rotate(optimize_angle(a1 + a2), None))
            }
            (Transform::Scale(x1, y1), Transform::Scale(x2, y2)) => {
                let y = match (y1, y2) {
                    (None, None) => None,
                    (Some(y1), Some(y2)) => Some(y1 * y2),
                    (None, Some(y2)) => Some(x1 * y2),
                    (Some(y1), None) => Some(y1 * x2),
                };
                Some(Transform::Scale(x1 * x2, y))
            }
            _ => None,
        };
        match folded {
            Some(t) => {
                list.remove(i);
                if matches!(t, Transform::Translate(..) | Transform::Scale(..)) && t.is_identity() {
                    list.remove(i - 1);
                    i = i.saturating_sub(1).max(1);
                } else {
                    list[i - 1] = t;
                }
            }
            None => i += 1,
        }
    }

    list.retain(|t| !t.is_identity());
}

/// Rewrite every transform attribute below `elem` when the result is shorter.
pub fn optimize_transforms(elem: &mut Element, fmt: &NumberFormat, stats: &mut Statistics) {
    for name in ["transform", "patternTransform", "gradientTransform"] {
        let Some(old) = elem.get_attr(name) else {
            continue;
        };
        if old.is_empty() {
            continue;
        }
        let mut list = match parse_transform(old) {
            Ok(list) => list,
            Err(e) => {
                log::debug!("leaving {name}={old:?} as is: {e}");
                continue;
            }
        };
        optimize_transform(&mut list);
        let new = serialize_transform(&list, fmt);
        if new.len() < old.len() {
            stats.bytes_saved_in_transforms += old.len() - new.len();
            stats.transforms_optimized += 1;
            if new.is_empty() {
                elem.remove_attr(name);
            } else {
                elem.set_attr(name, new);
            }
        }
    }

    for child in elem.child_elements_mut() {
        optimize_transforms(child, fmt, stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn optimized(s: &str) -> String {
        let mut list = parse_transform(s).unwrap();
        optimize_transform(&mut list);
        serialize_transform(&list, &NumberFormat::default())
    }

    #[test]
    fn test_parse_transform_list() {
        let list = parse_transform(" translate(10,20) , rotate(45 1 2)scale(2)").unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].name(), "translate");
        assert!(matches!(list[1], Transform::Rotate(_, Some(_))));
        assert!(parse_transform("rotate(1 2)").is_err());
        assert!(parse_transform("translate(1").is_err());
        assert!(parse_transform("wobble(1)").is_err());
        assert!(parse_transform("").unwrap().is_empty());
    }

    #[test]
    fn test_matrix_to_rotate() {
        assert_eq!(optimized("matrix(0 1 -1 0 0 0)"), "rotate(90)");
        assert_eq!(optimized("matrix(0 -1 1 0 0 0)"), "rotate(-90)");
        assert_eq!(optimized("matrix(-1 0 0 -1 0 0)"), "scale(-1)");
        assert_eq!(optimized("matrix(0.70710678 0.70710678 -0.70710678 0.70710678 0 0)"), "matrix(.70711 .70711 -.70711 .70711 0 0)");
    }

    #[test]
    fn test_matrix_to_translate_and_scale() {
        assert_eq!(optimized("matrix(1 0 0 1 10 0)"), "translate(10)");
        assert_eq!(optimized("matrix(1 0 0 1 10 20)"), "translate(10 20)");
        assert_eq!(optimized("matrix(2 0 0 3 0 0)"), "scale(2 3)");
        assert_eq!(optimized("matrix(1 0 0 1 0 0)"), "");
    }

    #[test]
    fn test_optional_arguments_dropped() {
        assert_eq!(optimized("translate(5 0)"), "translate(5)");
        assert_eq!(optimized("scale(2 2)"), "scale(2)");
        assert_eq!(optimized("rotate(45 0 0)"), "rotate(45)");
        assert_eq!(optimized("rotate(45 1 0)"), "rotate(45 1 0)");
    }

    #[test]
    fn test_angles_normalized() {
        assert_eq!(optimized("rotate(300)"), "rotate(-60)");
        assert_eq!(optimized("rotate(-100)"), "rotate(260)");
        assert_eq!(optimized("rotate(720)"), "");
        assert_eq!(optimized("rotate(-450)"), "rotate(-90)");
    }

    #[test]
    fn test_folding() {
        assert_eq!(optimized("translate(1 2) translate(3 4)"), "translate(4 6)");
        assert_eq!(optimized("translate(1) translate(3 4)"), "translate(4 4)");
        assert_eq!(optimized("translate(1 2) translate(-1 -2) scale(2)"), "scale(2)");
        assert_eq!(optimized("rotate(10) rotate(20)"), "rotate(30)");
        assert_eq!(optimized("rotate(10 5 5) rotate(20)"), "rotate(10 5 5) rotate(20)");
        assert_eq!(optimized("scale(2) scale(3 4)"), "scale(6 8)");
        assert_eq!(optimized("scale(2) scale(.5)"), "");
        assert_eq!(optimized("skewX(0) skewY(10)"), "skewY(10)");
    }

    #[test]
    fn test_optimize_transforms_only_when_shorter() {
        let mut e = Element::new("g");
        e.set_attr("transform", "matrix(1, 0, 0, 1, 0, 0)");
        e.set_attr("gradientTransform", "rotate(45)");
        let mut stats = Statistics::default();
        optimize_transforms(&mut e, &NumberFormat::default(), &mut stats);
        assert!(e.get_attr("transform").is_none());
        assert_eq!(e.get_attr("gradientTransform"), Some("rotate(45)"));
        assert_eq!(stats.transforms_optimized, 1);
        assert_eq!(stats.bytes_saved_in_transforms, 24);
    }

    #[test]
    fn test_bad_transform_left_alone() {
        let mut e = Element::new("g");
        e.set_attr("transform", "translate(1 2 3 4)");
        optimize_transforms(&mut e, &NumberFormat::default(), &mut Statistics::default());
        assert_eq!(e.get_attr("transform"), Some("translate(1 2 3 4)"));
    }
}
