//! Path data rewriting, plus `points` cleanup for polygons and polylines.
//!
//! The rewrite runs in a fixed order: relative coordinates first, then
//! removal of empty and no-op segments, straight curves to lines, merging of
//! consecutive commands, shorthand forms, and merging of collinear segments.
//! The result replaces the original unless it is more than a byte longer.

use crate::ast::Element;
use crate::decimal::{Decimal, NumericContext};
use crate::length::number_prefix_len;
use crate::number::{Coord, NumberFormat};
use crate::path::{Command, CommandData, ControlSegment, CubicSegment, Path, Point, parse_path, serialize_path};
use crate::stats::Statistics;
use crate::style::Style;

/// Element properties that limit what the rewriter may drop.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathContext {
    /// Zero-length segments render as dots or squares.
    pub visible_caps: bool,
    /// Intermediate vertices render markers.
    pub mid_markers: bool,
}

impl PathContext {
    /// Read from the element's attributes and inline style, not the cascade.
    pub fn for_element(elem: &Element) -> Self {
        let style = Style::from_element(elem);
        let is_visible_cap = |v: &str| v == "round" || v == "square";
        let visible_caps = elem.get_attr("stroke-linecap").is_some_and(is_visible_cap)
            || style.get("stroke-linecap").is_some_and(is_visible_cap);
        let mid_markers = elem.has_attr("marker")
            || elem.has_attr("marker-mid")
            || style.contains("marker")
            || style.contains("marker-mid");
        Self {
            visible_caps,
            mid_markers,
        }
    }
}

/// Rewrite the `d` attribute of a path element in place.
pub fn clean_path(elem: &mut Element, fmt: &NumberFormat, stats: &mut Statistics) {
    let Some(old) = elem.get_attr("d").map(str::to_owned) else {
        return;
    };
    let path = match parse_path(&old) {
        Ok(p) => p,
        Err(e) => {
            log::debug!("leaving path data untouched: {e}");
            return;
        }
    };
    let context = PathContext::for_element(elem);
    let (path, removed) = optimize_path(path, context, &fmt.ctx);
    let new = serialize_path(&path, fmt);
    if new.len() <= old.len() + RELATIVE_SLACK {
        stats.path_segments_removed += removed;
        stats.bytes_saved_in_path_data += old.len().saturating_sub(new.len());
        elem.set_attr("d", new);
    }
}

/// Bytes the relative form may exceed the original by and still replace it.
/// A relative step can need a sign its absolute coordinate did not
/// (`V80` from `100` is `v-20`).
const RELATIVE_SLACK: usize = 1;

/// Run every rewrite step. Returns the relative path and the number of
/// segments removed or shortened.
pub fn optimize_path(path: Path, context: PathContext, ctx: &NumericContext) -> (Path, usize) {
    let mut removed = 0;
    let mut cmds = to_relative(path);

    if !context.visible_caps {
        removed += remove_empty_segments(&mut cmds);
        removed += remove_noop_moves(&mut cmds);
    }
    cmds.retain(|c| !c.is_empty() || matches!(c, CommandData::ClosePath));

    let cmds = straighten_curves(cmds);
    let cmds = coalesce(cmds, true);
    let mut cmds = to_shorthand(cmds, &mut removed);
    if !context.mid_markers {
        removed += merge_same_direction(&mut cmds, ctx);
    }
    let cmds = coalesce(cmds, false);

    let path = Path {
        commands: cmds.into_iter().map(Command::relative).collect(),
    };
    (path, removed)
}

/// Convert every command to relative coordinates. The first moveto keeps its
/// absolute position either way.
fn to_relative(path: Path) -> Vec<CommandData> {
    let mut pen = Point::ORIGIN;
    let mut start = Point::ORIGIN;
    let mut out = Vec::with_capacity(path.commands.len());

    for (index, cmd) in path.commands.into_iter().enumerate() {
        let abs = cmd.absolute;
        let data = match cmd.data {
            CommandData::MoveTo(mut pts) => {
                if let Some(first) = pts.first_mut() {
                    if index == 0 {
                        start = *first;
                    } else if abs {
                        start = *first;
                        *first = *first - pen;
                    } else {
                        start = pen + *first;
                    }
                    pen = start;
                }
                for p in pts.iter_mut().skip(1) {
                    if abs {
                        *p = *p - pen;
                    }
                    pen = pen + *p;
                }
                CommandData::MoveTo(pts)
            }
            CommandData::LineTo(mut pts) => {
                relative_points(&mut pts, &mut pen, abs);
                CommandData::LineTo(pts)
            }
            CommandData::SmoothQuadTo(mut pts) => {
                relative_points(&mut pts, &mut pen, abs);
                CommandData::SmoothQuadTo(pts)
            }
            CommandData::Horizontal(mut xs) => {
                for x in &mut xs {
                    if abs {
                        *x -= pen.x;
                    }
                    pen.x += *x;
                }
                CommandData::Horizontal(xs)
            }
            CommandData::Vertical(mut ys) => {
                for y in &mut ys {
                    if abs {
                        *y -= pen.y;
                    }
                    pen.y += *y;
                }
                CommandData::Vertical(ys)
            }
            CommandData::CurveTo(mut segs) => {
                for s in &mut segs {
                    if abs {
                        s.c1 = s.c1 - pen;
                        s.c2 = s.c2 - pen;
                        s.end = s.end - pen;
                    }
                    pen = pen + s.end;
                }
                CommandData::CurveTo(segs)
            }
            CommandData::SmoothCurveTo(mut segs) => {
                relative_control_segments(&mut segs, &mut pen, abs);
                CommandData::SmoothCurveTo(segs)
            }
            CommandData::QuadTo(mut segs) => {
                relative_control_segments(&mut segs, &mut pen, abs);
                CommandData::QuadTo(segs)
            }
            CommandData::Arc(mut segs) => {
                for s in &mut segs {
                    if abs {
                        s.end = s.end - pen;
                    }
                    pen = pen + s.end;
                }
                CommandData::Arc(segs)
            }
            CommandData::ClosePath => {
                pen = start;
                CommandData::ClosePath
            }
        };
        out.push(data);
    }
    out
}

fn relative_points(pts: &mut [Point], pen: &mut Point, abs: bool) {
    for p in pts {
        if abs {
            *p = *p - *pen;
        }
        *pen = *pen + *p;
    }
}

fn relative_control_segments(segs: &mut [ControlSegment], pen: &mut Point, abs: bool) {
    for s in segs {
        if abs {
            s.control = s.control - *pen;
            s.end = s.end - *pen;
        }
        *pen = *pen + s.end;
    }
}

/// Drop parameter groups that do not move the pen.
fn remove_empty_segments(cmds: &mut [CommandData]) -> usize {
    fn retain_counted<T>(items: &mut Vec<T>, keep: impl Fn(usize, &T) -> bool) -> usize {
        let before = items.len();
        let mut i = 0;
        items.retain(|item| {
            let k = keep(i, item);
            i += 1;
            k
        });
        before - items.len()
    }

    let mut removed = 0;
    for cmd in cmds.iter_mut() {
        removed += match cmd {
            // the first moveto pair positions the subpath and always stays
            CommandData::MoveTo(pts) => retain_counted(pts, |i, p| i == 0 || !p.is_origin()),
            CommandData::LineTo(pts) | CommandData::SmoothQuadTo(pts) => retain_counted(pts, |_, p| !p.is_origin()),
            CommandData::CurveTo(segs) => {
                retain_counted(segs, |_, s| !(s.c1.is_origin() && s.c2.is_origin() && s.end.is_origin()))
            }
            CommandData::QuadTo(segs) => retain_counted(segs, |_, s| !(s.control.is_origin() && s.end.is_origin())),
            CommandData::Arc(segs) => retain_counted(segs, |_, s| !s.end.is_origin()),
            CommandData::Horizontal(vals) | CommandData::Vertical(vals) => retain_counted(vals, |_, v| !v.is_zero()),
            CommandData::SmoothCurveTo(_) | CommandData::ClosePath => 0,
        };
    }
    removed
}

/// Remove movetos that draw nothing, walking backwards so a `z` can mark the
/// subpath before it as anchored. The first command is never touched.
fn remove_noop_moves(cmds: &mut Vec<CommandData>) -> usize {
    let mut removed = 0;
    let mut needs_anchor = false;
    let mut index = cmds.len();

    while index > 1 {
        index -= 1;
        match &cmds[index] {
            CommandData::ClosePath => {
                // `mX Yz` closes nothing; with more points the pen position after z matters
                if matches!(&cmds[index - 1], CommandData::MoveTo(pts) if pts.len() == 1) {
                    cmds.remove(index);
                    removed += 1;
                } else {
                    needs_anchor = true;
                }
            }
            CommandData::MoveTo(pts) => {
                let single = pts.len() == 1;
                let at_origin = pts.first().is_some_and(Point::is_origin);
                if index == cmds.len() - 1 && single {
                    cmds.remove(index);
                    removed += 1;
                    continue;
                }
                if needs_anchor {
                    needs_anchor = false;
                } else if at_origin {
                    let rest = match &cmds[index] {
                        CommandData::MoveTo(pts) => pts[1..].to_vec(),
                        _ => Vec::new(),
                    };
                    cmds[index] = CommandData::LineTo(rest);
                    removed += 1;
                }
            }
            _ => {}
        }
    }
    removed
}

/// Both control points on the line through the chord. A closed loop (end at
/// the origin) only counts when the control points are there too.
///
/// Control points are not range-checked against the chord: a curve whose
/// controls overshoot the end point still becomes a straight line.
fn is_straight(seg: &CubicSegment) -> bool {
    let CubicSegment { c1, c2, end } = *seg;
    if end.is_origin() {
        return c1.is_origin() && c2.is_origin();
    }
    if end.x.is_zero() {
        return c1.x.is_zero() && c2.x.is_zero();
    }
    c1.y * end.x == end.y * c1.x && c2.y * end.x == end.y * c2.x
}

/// Replace straight cubic segments with linetos, splitting the curve command.
fn straighten_curves(cmds: Vec<CommandData>) -> Vec<CommandData> {
    let mut out = Vec::with_capacity(cmds.len());
    for (index, cmd) in cmds.into_iter().enumerate() {
        let segs = match cmd {
            CommandData::CurveTo(segs) if index > 0 => segs,
            other => {
                out.push(other);
                continue;
            }
        };
        let mut run = Vec::new();
        for seg in segs {
            if is_straight(&seg) {
                if !run.is_empty() {
                    out.push(CommandData::CurveTo(std::mem::take(&mut run)));
                }
                out.push(CommandData::LineTo(vec![seg.end]));
            } else {
                run.push(seg);
            }
        }
        if !run.is_empty() {
            out.push(CommandData::CurveTo(run));
        }
    }
    out
}

/// Append `next` to `prev` when they are the same command. Explicit movetos
/// never merge; a lineto may continue a moveto's implicit linetos.
fn merge_into(prev: &mut CommandData, next: CommandData, lineto_into_moveto: bool) -> Option<CommandData> {
    match (prev, next) {
        (_, next @ CommandData::MoveTo(_)) => Some(next),
        (CommandData::LineTo(a), CommandData::LineTo(b)) => {
            a.extend(b);
            None
        }
        (CommandData::MoveTo(a), CommandData::LineTo(b)) if lineto_into_moveto => {
            a.extend(b);
            None
        }
        (CommandData::Horizontal(a), CommandData::Horizontal(b)) | (CommandData::Vertical(a), CommandData::Vertical(b)) => {
            a.extend(b);
            None
        }
        (CommandData::CurveTo(a), CommandData::CurveTo(b)) => {
            a.extend(b);
            None
        }
        (CommandData::SmoothCurveTo(a), CommandData::SmoothCurveTo(b)) | (CommandData::QuadTo(a), CommandData::QuadTo(b)) => {
            a.extend(b);
            None
        }
        (CommandData::SmoothQuadTo(a), CommandData::SmoothQuadTo(b)) => {
            a.extend(b);
            None
        }
        (CommandData::Arc(a), CommandData::Arc(b)) => {
            a.extend(b);
            None
        }
        (CommandData::ClosePath, CommandData::ClosePath) => None,
        (_, next) => Some(next),
    }
}

fn coalesce(cmds: Vec<CommandData>, lineto_into_moveto: bool) -> Vec<CommandData> {
    let mut out: Vec<CommandData> = Vec::with_capacity(cmds.len());
    for cmd in cmds {
        let leftover = match out.last_mut() {
            Some(prev) => merge_into(prev, cmd, lineto_into_moveto),
            None => Some(cmd),
        };
        if let Some(cmd) = leftover {
            out.push(cmd);
        }
    }
    out
}

/// Split axis-aligned linetos off into `h`/`v`, and curves whose first
/// control point is implied into `s`/`t`.
fn to_shorthand(cmds: Vec<CommandData>, removed: &mut usize) -> Vec<CommandData> {
    let mut out: Vec<CommandData> = Vec::with_capacity(cmds.len());
    for cmd in cmds {
        match cmd {
            CommandData::LineTo(pts) => split_axis_lines(pts, Vec::new(), false, &mut out, removed),
            CommandData::MoveTo(mut pts) => {
                if pts.is_empty() {
                    continue;
                }
                let tail = pts.split_off(1);
                split_axis_lines(tail, pts, true, &mut out, removed);
            }
            CommandData::CurveTo(segs) => {
                let mut reflected = match out.last() {
                    Some(CommandData::SmoothCurveTo(prev)) => prev.last().map_or(Point::ORIGIN, |s| s.end - s.control),
                    _ => Point::ORIGIN,
                };
                let mut run = Vec::new();
                for seg in segs {
                    if seg.c1 == reflected {
                        if !run.is_empty() {
                            out.push(CommandData::CurveTo(std::mem::take(&mut run)));
                        }
                        out.push(CommandData::SmoothCurveTo(vec![ControlSegment {
                            control: seg.c2,
                            end: seg.end,
                        }]));
                        *removed += 1;
                    } else {
                        run.push(seg);
                    }
                    reflected = seg.end - seg.c2;
                }
                if !run.is_empty() {
                    out.push(CommandData::CurveTo(run));
                }
            }
            CommandData::QuadTo(segs) => {
                // after a `t` the implied control point is a reflection we do not track
                let mut reflected = match out.last() {
                    Some(CommandData::SmoothQuadTo(_)) => None,
                    _ => Some(Point::ORIGIN),
                };
                let mut run = Vec::new();
                for seg in segs {
                    if reflected == Some(seg.control) {
                        if !run.is_empty() {
                            out.push(CommandData::QuadTo(std::mem::take(&mut run)));
                        }
                        out.push(CommandData::SmoothQuadTo(vec![seg.end]));
                        *removed += 1;
                    } else {
                        run.push(seg);
                    }
                    reflected = Some(seg.end - seg.control);
                }
                if !run.is_empty() {
                    out.push(CommandData::QuadTo(run));
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Emit `pts` as linetos, breaking out `h`/`v` for axis-aligned ones. `run`
/// holds points already pending, emitted as a moveto when `run_is_move`.
fn split_axis_lines(
    pts: Vec<Point>,
    mut run: Vec<Point>,
    mut run_is_move: bool,
    out: &mut Vec<CommandData>,
    removed: &mut usize,
) {
    let flush = |run: &mut Vec<Point>, run_is_move: &mut bool, out: &mut Vec<CommandData>| {
        if run.is_empty() {
            return;
        }
        let pts = std::mem::take(run);
        out.push(if *run_is_move {
            CommandData::MoveTo(pts)
        } else {
            CommandData::LineTo(pts)
        });
        *run_is_move = false;
    };

    for p in pts {
        // a zero-length lineto only survives when it draws a cap; keep it a lineto
        if p.is_origin() {
            run.push(p);
        } else if p.x.is_zero() {
            flush(&mut run, &mut run_is_move, out);
            out.push(CommandData::Vertical(vec![p.y]));
            *removed += 1;
        } else if p.y.is_zero() {
            flush(&mut run, &mut run_is_move, out);
            out.push(CommandData::Horizontal(vec![p.x]));
            *removed += 1;
        } else {
            run.push(p);
        }
    }
    flush(&mut run, &mut run_is_move, out);
}

fn is_same_sign(a: Decimal, b: Decimal) -> bool {
    (a <= Decimal::ZERO && b <= Decimal::ZERO) || (a >= Decimal::ZERO && b >= Decimal::ZERO)
}

/// Same quadrant and equal slopes at the working precision.
fn is_same_direction(a: Point, b: Point, ctx: &NumericContext) -> bool {
    if !(is_same_sign(a.x, b.x) && is_same_sign(a.y, b.y)) {
        return false;
    }
    let (Some(s1), Some(s2)) = (a.y.checked_div(a.x), b.y.checked_div(b.x)) else {
        return false;
    };
    ctx.round(Decimal::ONE + (s1 - s2)) == Decimal::ONE
}

/// Sum consecutive segments that keep going the same way.
fn merge_same_direction(cmds: &mut [CommandData], ctx: &NumericContext) -> usize {
    let mut removed = 0;
    for cmd in cmds.iter_mut() {
        match cmd {
            CommandData::Horizontal(vals) | CommandData::Vertical(vals) => {
                let mut i = 0;
                while i + 1 < vals.len() {
                    if is_same_sign(vals[i], vals[i + 1]) {
                        let next = vals.remove(i + 1);
                        vals[i] += next;
                        removed += 1;
                    } else {
                        i += 1;
                    }
                }
            }
            // the moveto's own pair is not drawn
            CommandData::LineTo(pts) => removed += merge_collinear(pts, 0, ctx),
            CommandData::MoveTo(pts) => removed += merge_collinear(pts, 1, ctx),
            _ => {}
        }
    }
    removed
}

fn merge_collinear(pts: &mut Vec<Point>, from: usize, ctx: &NumericContext) -> usize {
    let mut removed = 0;
    let mut i = from;
    while i + 1 < pts.len() {
        if is_same_direction(pts[i], pts[i + 1], ctx) {
            let next = pts.remove(i + 1);
            pts[i] = pts[i] + next;
            removed += 1;
        } else {
            i += 1;
        }
    }
    removed
}

/// Parse a `points` list into numbers. `None` for unparseable or odd-length lists.
pub fn parse_points(s: &str) -> Option<Vec<Decimal>> {
    let mut nums = Vec::new();
    let mut rest = s;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }
        let n = number_prefix_len(rest);
        if n == 0 {
            return None;
        }
        nums.push(rest[..n].parse().ok()?);
        rest = &rest[n..];
    }
    if nums.is_empty() || nums.len() % 2 != 0 {
        return None;
    }
    Some(nums)
}

/// Re-emit a polygon's points, dropping a closing point equal to the start.
pub fn clean_polygon(elem: &mut Element, fmt: &NumberFormat, stats: &mut Statistics) {
    let Some(mut nums) = elem.get_attr("points").and_then(parse_points) else {
        return;
    };
    let n = nums.len();
    if n >= 4 && nums[0] == nums[n - 2] && nums[1] == nums[n - 1] {
        nums.truncate(n - 2);
        stats.points_removed_from_polygon += 1;
    }
    let coords: Vec<Coord> = nums.into_iter().map(Coord::Number).collect();
    elem.set_attr("points", fmt.coords(&coords, true));
}

pub fn clean_polyline(elem: &mut Element, fmt: &NumberFormat) {
    let Some(nums) = elem.get_attr("points").and_then(parse_points) else {
        return;
    };
    let coords: Vec<Coord> = nums.into_iter().map(Coord::Number).collect();
    elem.set_attr("points", fmt.coords(&coords, true));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite_with(d: &str, context: PathContext) -> String {
        let path = parse_path(d).unwrap();
        let ctx = NumericContext::default();
        let (path, _) = optimize_path(path, context, &ctx);
        serialize_path(&path, &NumberFormat::new(ctx, false))
    }

    fn rewrite(d: &str) -> String {
        rewrite_with(d, PathContext::default())
    }

    fn path_elem(d: &str) -> Element {
        let mut e = Element::new("path");
        e.set_attr("d", d);
        e
    }

    #[test]
    fn test_absolute_to_relative() {
        assert_eq!(rewrite("M100 100V80"), "m100 100v-20");
        assert_eq!(rewrite("M10 10L20 30L40 20"), "m10 10 10 20 20-10");
        assert_eq!(rewrite("M10 10H50V50H10Z"), "m10 10h40v40h-40z");
    }

    #[test]
    fn test_second_subpath_moves_relative() {
        assert_eq!(rewrite("M10 10h5zM20 20h5"), "m10 10h5zm10 10h5");
        assert_eq!(rewrite("m10 10h5m10 10h5"), "m10 10h5m10 10h5");
    }

    #[test]
    fn test_straight_curve_becomes_line() {
        assert_eq!(rewrite("M10 10 C20 20 30 30 40 40 L60 60"), "m10 10 50 50");
        assert_eq!(rewrite("m0 0c0 5 0 10 0 20"), "m0 0v20");
        // controls past the end point still lie on the line
        assert_eq!(rewrite("M0 0C0 0 100 100 10 10"), "m0 0 10 10");
        // a loop back to the start is not a line
        assert_eq!(rewrite("m0 0c0 5 0 10 0 0"), "m0 0c0 5 0 10 0 0");
    }

    #[test]
    fn test_empty_segments_respect_linecaps() {
        assert_eq!(rewrite("M0 0 l0 0"), "m0 0");
        let caps = PathContext {
            visible_caps: true,
            mid_markers: false,
        };
        assert_eq!(rewrite_with("M0 0 l0 0", caps), "m0 0 0 0");
        assert_eq!(rewrite("m5 5h0v0h10"), "m5 5h10");
    }

    #[test]
    fn test_noop_moves() {
        // trailing bare moveto
        assert_eq!(rewrite("m0 0h10m5 5"), "m0 0h10");
        // z right after a bare moveto
        assert_eq!(rewrite("m0 0h10m5 5zm1 1h2"), "m0 0h10m5 5m1 1h2");
        // unanchored m0 0 continues as lineto
        assert_eq!(rewrite("m0 0h10m0 0 5 5"), "m0 0h10l5 5");
        // anchored m0 0 must stay
        assert_eq!(rewrite("m0 0h10m0 0 5 5z"), "m0 0h10m0 0 5 5z");
    }

    #[test]
    fn test_shorthand_lines() {
        assert_eq!(rewrite("m0 0l10 0 0 10 5 5"), "m0 0h10v10l5 5");
        assert_eq!(rewrite("m0 0 10 0 0 10"), "m0 0h10v10");
    }

    #[test]
    fn test_shorthand_curves() {
        assert_eq!(rewrite("m0 0c0 0 5 10 10 10"), "m0 0s5 10 10 10");
        assert_eq!(rewrite("m0 0c1 2 5 10 10 10 5 0 5 10 10 10"), "m0 0c1 2 5 10 10 10s5 10 10 10");
        assert_eq!(rewrite("m0 0q0 0 10 10"), "m0 0t10 10");
        assert_eq!(rewrite("m0 0q5 0 10 10 5 10 10 0"), "m0 0q5 0 10 10t10 0");
    }

    #[test]
    fn test_same_direction_merge() {
        assert_eq!(rewrite("m0 0h-100-100"), "m0 0h-200");
        assert_eq!(rewrite("m0 0h300-100"), "m0 0h300-100");
        assert_eq!(rewrite("m0 0l10 10 10 10 5 20"), "m0 0 20 20 5 20");
        assert_eq!(rewrite("m0 0 10 10 10 10"), "m0 0 20 20");
        let markers = PathContext {
            visible_caps: false,
            mid_markers: true,
        };
        assert_eq!(rewrite_with("m0 0h-100-100", markers), "m0 0h-100-100");
    }

    #[test]
    fn test_arcs_keep_flags() {
        assert_eq!(rewrite("M10 10A5 5 0 1 0 20 20"), "m10 10a5 5 0 1010 10");
    }

    #[test]
    fn test_clean_path_length_guard() {
        let mut stats = Statistics::default();
        let mut e = path_elem("M100 100V80");
        clean_path(&mut e, &NumberFormat::default(), &mut stats);
        assert_eq!(e.get_attr("d"), Some("m100 100v-20"));
        assert_eq!(stats.bytes_saved_in_path_data, 0);

        // far from the pen, relative steps cost more than a sign
        let mut e = path_elem("M1000 1000L0 0");
        clean_path(&mut e, &NumberFormat::default(), &mut stats);
        assert_eq!(e.get_attr("d"), Some("M1000 1000L0 0"));

        let mut e = path_elem("M1 1L2 1");
        clean_path(&mut e, &NumberFormat::default(), &mut stats);
        assert_eq!(e.get_attr("d"), Some("m1 1h1"));

        let mut e = path_elem("M 1 1 X");
        clean_path(&mut e, &NumberFormat::default(), &mut stats);
        assert_eq!(e.get_attr("d"), Some("M 1 1 X"));
    }

    #[test]
    fn test_linecap_from_style() {
        let mut e = path_elem("M0 0 L0 0 L10 10");
        e.set_attr("style", "stroke-linecap:round");
        let ctx = PathContext::for_element(&e);
        assert!(ctx.visible_caps);
        assert!(!ctx.mid_markers);
    }

    #[test]
    fn test_parse_points() {
        let nums = parse_points("100,-100,100-100 1e1-5").unwrap();
        assert_eq!(nums.len(), 6);
        assert_eq!(nums[3], "-100".parse().unwrap());
        assert_eq!(nums[4], "10".parse().unwrap());
        assert!(parse_points("1 2 3").is_none());
        assert!(parse_points("1 2 x 3").is_none());
        assert!(parse_points("").is_none());
    }

    #[test]
    fn test_clean_polygon_drops_closing_point() {
        let mut stats = Statistics::default();
        let mut e = Element::new("polygon");
        e.set_attr("points", "0,0 10,0 10,10 0,0");
        clean_polygon(&mut e, &NumberFormat::default(), &mut stats);
        assert_eq!(e.get_attr("points"), Some("0 0 10 0 10 10"));
        assert_eq!(stats.points_removed_from_polygon, 1);

        let mut e = Element::new("polyline");
        e.set_attr("points", "0.50, -1.0  3,4");
        clean_polyline(&mut e, &NumberFormat::default());
        assert_eq!(e.get_attr("points"), Some(".5 -1 3 4"));
    }
}
