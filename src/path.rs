// Copyright 2026 the vraster authors.
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Paths: a [`Path`] is an ordered list of [`Contour`]s; a contour is a start
//! point, a closed flag, and an ordered sequence of line/quad/cubic commands
//!. [`PathBuilder`] is the fluent constructor; geometry
//! helpers at the bottom of this module (`rectangle`, `circle`, ...) build
//! common shapes directly, mirroring `tiny_skia::PathBuilder::from_rect`.

use crate::geom::{BBox, Point};
use crate::transform::Transform;

/// A single line/quadratic/cubic segment, already in some coordinate space.
///
/// Closed under affine transformation (`transform` maps every control point).
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Primitive {
    Line(Point, Point),
    Quadratic(Point, Point, Point),
    Cubic(Point, Point, Point, Point),
}

impl Primitive {
    #[inline]
    pub fn start(&self) -> Point {
        match *self {
            Primitive::Line(p0, _) => p0,
            Primitive::Quadratic(p0, _, _) => p0,
            Primitive::Cubic(p0, _, _, _) => p0,
        }
    }

    #[inline]
    pub fn end(&self) -> Point {
        match *self {
            Primitive::Line(_, p1) => p1,
            Primitive::Quadratic(_, _, p1) => p1,
            Primitive::Cubic(_, _, _, p1) => p1,
        }
    }

    /// Maps every control point through `ts`.
    pub fn transform(&self, ts: &Transform) -> Primitive {
        match *self {
            Primitive::Line(p0, p1) => Primitive::Line(ts.map_point(p0), ts.map_point(p1)),
            Primitive::Quadratic(p0, c, p1) => {
                Primitive::Quadratic(ts.map_point(p0), ts.map_point(c), ts.map_point(p1))
            }
            Primitive::Cubic(p0, c0, c1, p1) => Primitive::Cubic(
                ts.map_point(p0),
                ts.map_point(c0),
                ts.map_point(c1),
                ts.map_point(p1),
            ),
        }
    }

    /// True if start and end points coincide and (for curves) the control
    /// points also collapse onto that point, i.e. the primitive contributes
    /// no visible geometry.
    pub fn is_degenerate(&self) -> bool {
        match *self {
            Primitive::Line(p0, p1) => p0 == p1,
            Primitive::Quadratic(p0, c, p1) => p0 == p1 && p0 == c,
            Primitive::Cubic(p0, c0, c1, p1) => p0 == p1 && p0 == c0 && p0 == c1,
        }
    }
}

/// One command in a contour, relative to the running "current point."
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum PathCommand {
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
}

/// A single, non-empty subpath: a start point plus an ordered command list.
///
/// # Guarantees
///
/// - `commands` is non-empty.
#[derive(Clone, PartialEq, Debug)]
pub struct Contour {
    pub start: Point,
    pub commands: Vec<PathCommand>,
    pub closed: bool,
}

impl Contour {
    /// The point the contour ends at, ignoring the implicit closing edge.
    pub fn last_point(&self) -> Point {
        match self.commands.last() {
            Some(PathCommand::LineTo(p)) => *p,
            Some(PathCommand::QuadTo(_, p)) => *p,
            Some(PathCommand::CubicTo(_, _, p)) => *p,
            None => self.start,
        }
    }

    /// Expands the contour into its constituent primitives.
    ///
    /// When `closed`, an extra closing `Line` back to `start` is appended if
    /// the contour doesn't already end there.
    pub fn primitives(&self) -> Vec<Primitive> {
        let mut out = Vec::with_capacity(self.commands.len() + 1);
        let mut cur = self.start;
        for cmd in &self.commands {
            match *cmd {
                PathCommand::LineTo(p) => {
                    out.push(Primitive::Line(cur, p));
                    cur = p;
                }
                PathCommand::QuadTo(c, p) => {
                    out.push(Primitive::Quadratic(cur, c, p));
                    cur = p;
                }
                PathCommand::CubicTo(c0, c1, p) => {
                    out.push(Primitive::Cubic(cur, c0, c1, p));
                    cur = p;
                }
            }
        }
        if self.closed && cur != self.start {
            out.push(Primitive::Line(cur, self.start));
        }
        out.retain(|p| !p.is_degenerate());
        out
    }

    fn transform(&self, ts: &Transform) -> Contour {
        let commands = self
            .commands
            .iter()
            .map(|c| match *c {
                PathCommand::LineTo(p) => PathCommand::LineTo(ts.map_point(p)),
                PathCommand::QuadTo(c0, p) => PathCommand::QuadTo(ts.map_point(c0), ts.map_point(p)),
                PathCommand::CubicTo(c0, c1, p) => {
                    PathCommand::CubicTo(ts.map_point(c0), ts.map_point(c1), ts.map_point(p))
                }
            })
            .collect();
        Contour {
            start: ts.map_point(self.start),
            commands,
            closed: self.closed,
        }
    }
}

/// An ordered collection of contours.
///
/// Can be created via [`PathBuilder`], or with one of the geometry helpers
/// (`rectangle`, `circle`, `polygon`, ...) below.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Path {
    pub contours: Vec<Contour>,
}

impl Path {
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Expands every contour into its primitive list; one inner `Vec` per
    /// contour, so callers can tell contour boundaries apart from the flat
    /// segment stream.
    pub fn primitives(&self) -> Vec<Vec<Primitive>> {
        self.contours
            .iter()
            .map(Contour::primitives)
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// Tight-enough bounding box over every control point (a fast, slightly
    /// conservative over-approximation for curves, since control points can
    /// lie outside the curve itself).
    pub fn bounds(&self) -> Option<BBox> {
        let mut iter = self
            .contours
            .iter()
            .flat_map(|c| core::iter::once(c.start).chain(c.commands.iter().flat_map(|cmd| -> Vec<Point> {
                match *cmd {
                    PathCommand::LineTo(p) => vec![p],
                    PathCommand::QuadTo(c, p) => vec![c, p],
                    PathCommand::CubicTo(c0, c1, p) => vec![c0, c1, p],
                }
            })));
        let first = iter.next()?;
        let mut bbox = BBox::from_point(first);
        for p in iter {
            bbox.add_point(p);
        }
        Some(bbox)
    }

    /// Returns a copy of this path with every point mapped through `ts`.
    pub fn transform(&self, ts: &Transform) -> Path {
        if ts.is_identity() {
            return self.clone();
        }
        Path {
            contours: self.contours.iter().map(|c| c.transform(ts)).collect(),
        }
    }
}

/// Builds a [`Path`] one command at a time.
///
/// Calling [`PathBuilder::move_to`] starts a new contour; any prior contour
/// is flushed first. [`PathBuilder::close`] marks the current contour closed
/// (it will be implicitly joined back to its start when flattened) and ends
/// it, so a further `line_to` etc. without an intervening `move_to` starts a
/// fresh contour at the same point.
#[derive(Clone, Debug, Default)]
pub struct PathBuilder {
    contours: Vec<Contour>,
    start: Option<Point>,
    commands: Vec<PathCommand>,
    closed: bool,
    last: Point,
}

impl PathBuilder {
    pub fn new() -> Self {
        PathBuilder::default()
    }

    fn flush(&mut self) {
        if let Some(start) = self.start.take() {
            if !self.commands.is_empty() {
                self.contours.push(Contour {
                    start,
                    commands: core::mem::take(&mut self.commands),
                    closed: self.closed,
                });
            }
        }
        self.commands.clear();
        self.closed = false;
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.flush();
        self.start = Some(Point::from_xy(x, y));
        self.last = Point::from_xy(x, y);
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        if self.start.is_none() {
            return self.move_to(x, y);
        }
        self.last = Point::from_xy(x, y);
        self.commands.push(PathCommand::LineTo(self.last));
        self
    }

    pub fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) -> &mut Self {
        if self.start.is_none() {
            return self.move_to(x, y);
        }
        self.last = Point::from_xy(x, y);
        self.commands
            .push(PathCommand::QuadTo(Point::from_xy(cx, cy), self.last));
        self
    }

    pub fn cubic_to(&mut self, c0x: f32, c0y: f32, c1x: f32, c1y: f32, x: f32, y: f32) -> &mut Self {
        if self.start.is_none() {
            return self.move_to(x, y);
        }
        self.last = Point::from_xy(x, y);
        self.commands.push(PathCommand::CubicTo(
            Point::from_xy(c0x, c0y),
            Point::from_xy(c1x, c1y),
            self.last,
        ));
        self
    }

    /// Marks the current contour as closed and ends it.
    pub fn close(&mut self) -> &mut Self {
        self.closed = true;
        self.flush();
        self
    }

    /// Consumes the builder, producing a [`Path`].
    ///
    /// Contours with no commands (a bare `move_to`) are dropped; if every
    /// contour was degenerate this way, an empty `Path` is returned (which
    /// subsequently produces no output.
    pub fn finish(mut self) -> Path {
        self.flush();
        Path {
            contours: self.contours,
        }
    }
}

// ---- Geometry helpers ----

/// A single straight line segment, as an open one-command path.
pub fn line(p0: Point, p1: Point) -> Path {
    let mut pb = PathBuilder::new();
    pb.move_to(p0.x, p0.y);
    pb.line_to(p1.x, p1.y);
    pb.finish()
}

/// An axis-aligned closed rectangle.
pub fn rectangle(x: f32, y: f32, w: f32, h: f32) -> Path {
    if w <= 0.0 || h <= 0.0 {
        return Path::default();
    }
    let mut pb = PathBuilder::new();
    pb.move_to(x, y);
    pb.line_to(x + w, y);
    pb.line_to(x + w, y + h);
    pb.line_to(x, y + h);
    pb.close();
    pb.finish()
}

/// Magic constant approximating a quarter-circle arc with one cubic Bézier.
const KAPPA: f32 = 0.552_284_75;

/// An axis-aligned rectangle with circular-arc corners of radius `(rx, ry)`.
///
/// Radii are clamped so the two arcs on a given edge never overlap.
pub fn rounded_rectangle(x: f32, y: f32, w: f32, h: f32, rx: f32, ry: f32) -> Path {
    if w <= 0.0 || h <= 0.0 {
        return Path::default();
    }
    let rx = rx.max(0.0).min(w / 2.0);
    let ry = ry.max(0.0).min(h / 2.0);
    if rx == 0.0 || ry == 0.0 {
        return rectangle(x, y, w, h);
    }

    let kx = rx * KAPPA;
    let ky = ry * KAPPA;
    let (l, t, r, b) = (x, y, x + w, y + h);

    let mut pb = PathBuilder::new();
    pb.move_to(l + rx, t);
    pb.line_to(r - rx, t);
    pb.cubic_to(r - rx + kx, t, r, t + ry - ky, r, t + ry);
    pb.line_to(r, b - ry);
    pb.cubic_to(r, b - ry + ky, r - rx + kx, b, r - rx, b);
    pb.line_to(l + rx, b);
    pb.cubic_to(l + rx - kx, b, l, b - ry + ky, l, b - ry);
    pb.line_to(l, t + ry);
    pb.cubic_to(l, t + ry - ky, l + rx - kx, t, l + rx, t);
    pb.close();
    pb.finish()
}

/// An ellipse centered at `center` with radii `(rx, ry)`, approximated with
/// four cubic Bézier arcs.
pub fn ellipse(center: Point, rx: f32, ry: f32) -> Path {
    if rx <= 0.0 || ry <= 0.0 {
        return Path::default();
    }
    let kx = rx * KAPPA;
    let ky = ry * KAPPA;
    let (cx, cy) = (center.x, center.y);

    let mut pb = PathBuilder::new();
    pb.move_to(cx + rx, cy);
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
    pb.close();
    pb.finish()
}

/// A circle centered at `center` with the given `radius`.
pub fn circle(center: Point, radius: f32) -> Path {
    ellipse(center, radius, radius)
}

/// An open polyline through `points`. Fewer than two points produce nothing.
pub fn polyline(points: &[Point]) -> Path {
    if points.len() < 2 {
        return Path::default();
    }
    let mut pb = PathBuilder::new();
    pb.move_to(points[0].x, points[0].y);
    for p in &points[1..] {
        pb.line_to(p.x, p.y);
    }
    pb.finish()
}

/// A closed polygon through `points`. Fewer than three points produce
/// nothing.
pub fn polygon(points: &[Point]) -> Path {
    if points.len() < 3 {
        return Path::default();
    }
    let mut pb = PathBuilder::new();
    pb.move_to(points[0].x, points[0].y);
    for p in &points[1..] {
        pb.line_to(p.x, p.y);
    }
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_has_four_line_primitives() {
        let path = rectangle(5.0, 5.0, 10.0, 10.0);
        let prims = path.primitives();
        assert_eq!(prims.len(), 1);
        assert_eq!(prims[0].len(), 4);
    }

    #[test]
    fn degenerate_polygon_is_empty() {
        let path = polygon(&[Point::zero(), Point::from_xy(1.0, 1.0)]);
        assert!(path.is_empty());
    }

    #[test]
    fn open_polyline_has_no_closing_edge() {
        let path = polyline(&[Point::zero(), Point::from_xy(10.0, 0.0), Point::from_xy(10.0, 10.0)]);
        let prims = &path.primitives()[0];
        assert_eq!(prims.len(), 2);
    }

    #[test]
    fn closing_edge_is_added_once() {
        let mut pb = PathBuilder::new();
        pb.move_to(0.0, 0.0);
        pb.line_to(10.0, 0.0);
        pb.line_to(10.0, 10.0);
        pb.line_to(0.0, 0.0); // already back at start
        pb.close();
        let path = pb.finish();
        assert_eq!(path.primitives()[0].len(), 3);
    }

    #[test]
    fn builder_with_no_commands_is_empty() {
        let mut pb = PathBuilder::new();
        pb.move_to(1.0, 1.0);
        let path = pb.finish();
        assert!(path.is_empty());
    }

    #[test]
    fn transform_maps_all_points() {
        let path = rectangle(0.0, 0.0, 10.0, 10.0);
        let ts = Transform::from_translate(5.0, 5.0);
        let moved = path.transform(&ts);
        assert_eq!(moved.contours[0].start, Point::from_xy(5.0, 5.0));
    }
}
