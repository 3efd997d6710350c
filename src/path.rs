//! SVG path data model, parser and serializer.
//!
//! SVG path syntax: https://www.w3.org/TR/SVG/paths.html
//!
//! A command letter owns every parameter group that follows it until the next
//! letter, so `M0 0 10 10 20 0` is one [`CommandData::MoveTo`] with three
//! points (the trailing ones are implicit linetos).

use std::ops::{Add, Sub};

use crate::decimal::Decimal;
use crate::error::BurnishError;
use crate::number::{Coord, NumberFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: Decimal,
    pub y: Decimal,
}

impl Point {
    pub const ORIGIN: Point = Point {
        x: Decimal::ZERO,
        y: Decimal::ZERO,
    };

    pub fn new(x: Decimal, y: Decimal) -> Self {
        Self { x, y }
    }

    pub fn is_origin(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubicSegment {
    pub c1: Point,
    pub c2: Point,
    pub end: Point,
}

/// A segment with one explicit control point: the second control point of
/// `S`, or the only control point of `Q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSegment {
    pub control: Point,
    pub end: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcSegment {
    pub rx: Decimal,
    pub ry: Decimal,
    pub rotation: Decimal,
    pub large_arc: bool,
    pub sweep: bool,
    pub end: Point,
}

/// Parameters of one command letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandData {
    /// M/m: the first point moves, the rest are implicit linetos
    MoveTo(Vec<Point>),
    /// L/l
    LineTo(Vec<Point>),
    /// H/h
    Horizontal(Vec<Decimal>),
    /// V/v
    Vertical(Vec<Decimal>),
    /// C/c
    CurveTo(Vec<CubicSegment>),
    /// S/s
    SmoothCurveTo(Vec<ControlSegment>),
    /// Q/q
    QuadTo(Vec<ControlSegment>),
    /// T/t
    SmoothQuadTo(Vec<Point>),
    /// A/a
    Arc(Vec<ArcSegment>),
    /// Z/z
    ClosePath,
}

impl CommandData {
    /// The lowercase command letter.
    pub fn letter(&self) -> char {
        match self {
            CommandData::MoveTo(_) => 'm',
            CommandData::LineTo(_) => 'l',
            CommandData::Horizontal(_) => 'h',
            CommandData::Vertical(_) => 'v',
            CommandData::CurveTo(_) => 'c',
            CommandData::SmoothCurveTo(_) => 's',
            CommandData::QuadTo(_) => 'q',
            CommandData::SmoothQuadTo(_) => 't',
            CommandData::Arc(_) => 'a',
            CommandData::ClosePath => 'z',
        }
    }

    /// Number of parameter groups. `z` has none.
    pub fn len(&self) -> usize {
        match self {
            CommandData::MoveTo(p) | CommandData::LineTo(p) | CommandData::SmoothQuadTo(p) => p.len(),
            CommandData::Horizontal(v) | CommandData::Vertical(v) => v.len(),
            CommandData::CurveTo(s) => s.len(),
            CommandData::SmoothCurveTo(s) | CommandData::QuadTo(s) => s.len(),
            CommandData::Arc(s) => s.len(),
            CommandData::ClosePath => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattened parameters, tagged for the number formatter.
    pub fn coords(&self) -> Vec<Coord> {
        let n = Coord::Number;
        let c = Coord::Control;
        let mut out = Vec::new();
        match self {
            CommandData::MoveTo(pts) | CommandData::LineTo(pts) | CommandData::SmoothQuadTo(pts) => {
                for p in pts {
                    out.extend([n(p.x), n(p.y)]);
                }
            }
            CommandData::Horizontal(vals) | CommandData::Vertical(vals) => {
                out.extend(vals.iter().map(|v| n(*v)));
            }
            CommandData::CurveTo(segs) => {
                for s in segs {
                    out.extend([c(s.c1.x), c(s.c1.y), c(s.c2.x), c(s.c2.y), n(s.end.x), n(s.end.y)]);
                }
            }
            CommandData::SmoothCurveTo(segs) | CommandData::QuadTo(segs) => {
                for s in segs {
                    out.extend([c(s.control.x), c(s.control.y), n(s.end.x), n(s.end.y)]);
                }
            }
            CommandData::Arc(segs) => {
                for s in segs {
                    out.extend([
                        n(s.rx),
                        n(s.ry),
                        n(s.rotation),
                        Coord::Flag(s.large_arc),
                        Coord::Flag(s.sweep),
                        n(s.end.x),
                        n(s.end.y),
                    ]);
                }
            }
            CommandData::ClosePath => {}
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub absolute: bool,
    pub data: CommandData,
}

impl Command {
    pub fn relative(data: CommandData) -> Self {
        Self { absolute: false, data }
    }

    /// The command letter as written.
    pub fn letter(&self) -> char {
        let c = self.data.letter();
        if self.absolute { c.to_ascii_uppercase() } else { c }
    }
}

/// A parsed SVG path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub commands: Vec<Command>,
}

/// Parse SVG path data. The path must start with a moveto.
pub fn parse_path(d: &str) -> Result<Path, BurnishError> {
    let mut parser = PathParser::new(d);
    parser.parse()
}

/// Serialize path data, writing every command letter once.
pub fn serialize_path(path: &Path, fmt: &NumberFormat) -> String {
    let mut out = String::new();
    for cmd in &path.commands {
        out.push(cmd.letter());
        out.push_str(&fmt.coords(&cmd.data.coords(), false));
    }
    out
}

struct PathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> PathParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse(&mut self) -> Result<Path, BurnishError> {
        let mut commands = Vec::new();

        self.skip_whitespace();
        while !self.is_eof() {
            let letter = match self.next() {
                Some(c) if c.is_ascii_alphabetic() => c,
                Some(c) => {
                    return Err(BurnishError::InvalidPath(format!("expected command letter, got {c:?}")));
                }
                None => break,
            };
            if commands.is_empty() && !matches!(letter, 'M' | 'm') {
                return Err(BurnishError::InvalidPath("path must start with a moveto".into()));
            }
            let absolute = letter.is_ascii_uppercase();
            let data = self.parse_command(letter)?;
            commands.push(Command { absolute, data });
            self.skip_whitespace_and_comma();
        }

        if commands.is_empty() {
            return Err(BurnishError::InvalidPath("empty path".into()));
        }
        Ok(Path { commands })
    }

    /// Parse one or more parameter groups for `letter`.
    fn parse_command(&mut self, letter: char) -> Result<CommandData, BurnishError> {
        self.skip_whitespace();
        let data = match letter.to_ascii_lowercase() {
            'm' => CommandData::MoveTo(self.repeat(Self::parse_point)?),
            'l' => CommandData::LineTo(self.repeat(Self::parse_point)?),
            'h' => CommandData::Horizontal(self.repeat(Self::parse_number)?),
            'v' => CommandData::Vertical(self.repeat(Self::parse_number)?),
            'c' => CommandData::CurveTo(self.repeat(|p| {
                let c1 = p.parse_point()?;
                let c2 = p.parse_point()?;
                let end = p.parse_point()?;
                Ok(CubicSegment { c1, c2, end })
            })?),
            's' => CommandData::SmoothCurveTo(self.repeat(Self::parse_control_segment)?),
            'q' => CommandData::QuadTo(self.repeat(Self::parse_control_segment)?),
            't' => CommandData::SmoothQuadTo(self.repeat(Self::parse_point)?),
            'a' => CommandData::Arc(self.repeat(|p| {
                let rx = p.parse_number()?;
                let ry = p.parse_number()?;
                let rotation = p.parse_number()?;
                let large_arc = p.parse_flag()?;
                let sweep = p.parse_flag()?;
                let end = p.parse_point()?;
                Ok(ArcSegment {
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                    end,
                })
            })?),
            'z' => CommandData::ClosePath,
            _ => return Err(BurnishError::InvalidPath(format!("unknown command: {letter}"))),
        };
        Ok(data)
    }

    /// Parse at least one group, then more while a number follows.
    fn repeat<T>(&mut self, mut group: impl FnMut(&mut Self) -> Result<T, BurnishError>) -> Result<Vec<T>, BurnishError> {
        let mut out = vec![group(self)?];
        loop {
            self.skip_whitespace_and_comma();
            if !self.at_number() {
                return Ok(out);
            }
            out.push(group(self)?);
        }
    }

    fn parse_point(&mut self) -> Result<Point, BurnishError> {
        let x = self.parse_number()?;
        let y = self.parse_number()?;
        Ok(Point { x, y })
    }

    fn parse_control_segment(&mut self) -> Result<ControlSegment, BurnishError> {
        let control = self.parse_point()?;
        let end = self.parse_point()?;
        Ok(ControlSegment { control, end })
    }

    fn at_number(&self) -> bool {
        matches!(self.peek(), Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
    }

    fn parse_number(&mut self) -> Result<Decimal, BurnishError> {
        self.skip_whitespace_and_comma();

        let start = self.pos;

        // Optional sign
        if self.peek() == Some('-') || self.peek() == Some('+') {
            self.next();
        }

        // Integer part
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.next();
        }

        // Decimal part
        if self.peek() == Some('.') {
            self.next();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.next();
            }
        }

        // Exponent, only when digits follow
        if matches!(self.peek(), Some('e' | 'E')) {
            let mark = self.pos;
            self.next();
            if self.peek() == Some('-') || self.peek() == Some('+') {
                self.next();
            }
            let digits = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.next();
            }
            if self.pos == digits {
                self.pos = mark;
            }
        }

        let s = &self.input[start..self.pos];
        if s.is_empty() {
            return Err(BurnishError::InvalidPath("expected number".into()));
        }

        s.parse()
            .map_err(|_| BurnishError::InvalidPath(format!("invalid number: {s}")))
    }

    fn parse_flag(&mut self) -> Result<bool, BurnishError> {
        self.skip_whitespace_and_comma();
        match self.next() {
            Some('0') => Ok(false),
            Some('1') => Ok(true),
            Some(c) => Err(BurnishError::InvalidPath(format!("expected flag (0 or 1), got: {c}"))),
            None => Err(BurnishError::InvalidPath("expected flag".into())),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.next();
        }
    }

    fn skip_whitespace_and_comma(&mut self) {
        self.skip_whitespace();
        if self.peek() == Some(',') {
            self.next();
        }
        self.skip_whitespace();
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }
}
