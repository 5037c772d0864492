// Copyright 2026 the vraster authors.
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Curve flattening: recursive de Casteljau subdivision of quadratic and
//! cubic Béziers into line segments, within a flatness tolerance.

use crate::geom::Point;
use crate::path::{Contour, Primitive};

/// Default flatness tolerance, in pixels: the maximum perpendicular distance
/// a curve may deviate from its chord before it's subdivided further.
pub const DEFAULT_FLATNESS_TOLERANCE: f32 = 0.25;

/// Default bound on recursion depth, guaranteeing termination on degenerate
/// (e.g. looping or cusped) curves.
pub const DEFAULT_MAX_RECURSION_DEPTH: u32 = 16;

/// A contour flattened down to straight segments.
#[derive(Clone, Debug, Default)]
pub struct FlatContour {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl FlatContour {
    /// Iterates the segments `(p0, p1)` of this contour, including the
    /// implicit closing edge when `closed` and not already closed.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        let open_pairs = (0..n.saturating_sub(1)).map(move |i| (self.points[i], self.points[i + 1]));
        let closing = if self.closed && n >= 2 && self.points[0] != self.points[n - 1] {
            Some((self.points[n - 1], self.points[0]))
        } else {
            None
        };
        open_pairs.chain(closing)
    }
}

/// Flattens every primitive of `primitives` into a single polyline, appending
/// to `out`. The first point of the contour must already be in `out` (or
/// `out` is empty, in which case the first primitive's start point seeds it).
pub fn flatten_primitives(primitives: &[Primitive], tolerance: f32, max_depth: u32, out: &mut Vec<Point>) {
    for prim in primitives {
        if out.is_empty() {
            out.push(prim.start());
        }
        match *prim {
            Primitive::Line(_, p1) => out.push(p1),
            Primitive::Quadratic(p0, c, p1) => flatten_quadratic(p0, c, p1, tolerance, max_depth, out),
            Primitive::Cubic(p0, c0, c1, p1) => flatten_cubic(p0, c0, c1, p1, tolerance, max_depth, out),
        }
    }
}

/// Flattens an entire contour into a [`FlatContour`].
pub fn flatten_contour(contour: &Contour, tolerance: f32, max_depth: u32) -> FlatContour {
    let mut points = vec![contour.start];
    // Flatten against the raw command list rather than `Contour::primitives`,
    // which already appends the synthetic closing edge; adding it again here
    // would duplicate it. `FlatContour::segments` adds it back on demand.
    let mut cur = contour.start;
    for cmd in &contour.commands {
        match *cmd {
            crate::path::PathCommand::LineTo(p) => {
                points.push(p);
                cur = p;
            }
            crate::path::PathCommand::QuadTo(c, p) => {
                flatten_quadratic(cur, c, p, tolerance, max_depth, &mut points);
                cur = p;
            }
            crate::path::PathCommand::CubicTo(c0, c1, p) => {
                flatten_cubic(cur, c0, c1, p, tolerance, max_depth, &mut points);
                cur = p;
            }
        }
    }
    points.dedup_by(|a, b| *a == *b);
    FlatContour {
        points,
        closed: contour.closed,
    }
}

/// Perpendicular distance of `p` from the infinite line through `a`-`b`.
fn distance_to_line(p: Point, a: Point, b: Point) -> f32 {
    let d = b - a;
    let len = d.length();
    if len <= f32::EPSILON {
        return p.distance(a);
    }
    (d.x * (a.y - p.y) - d.y * (a.x - p.x)).abs() / len
}

fn flatten_quadratic(p0: Point, c: Point, p1: Point, tolerance: f32, max_depth: u32, out: &mut Vec<Point>) {
    fn recurse(p0: Point, c: Point, p1: Point, tolerance: f32, depth: u32, out: &mut Vec<Point>) {
        if depth == 0 || distance_to_line(c, p0, p1) <= tolerance {
            out.push(p1);
            return;
        }
        // de Casteljau at t = 1/2.
        let p01 = p0.lerp(c, 0.5);
        let p12 = c.lerp(p1, 0.5);
        let mid = p01.lerp(p12, 0.5);
        recurse(p0, p01, mid, tolerance, depth - 1, out);
        recurse(mid, p12, p1, tolerance, depth - 1, out);
    }
    recurse(p0, c, p1, tolerance.max(1e-6), max_depth, out);
}

fn flatten_cubic(
    p0: Point,
    c0: Point,
    c1: Point,
    p1: Point,
    tolerance: f32,
    max_depth: u32,
    out: &mut Vec<Point>,
) {
    fn recurse(p0: Point, c0: Point, c1: Point, p1: Point, tolerance: f32, depth: u32, out: &mut Vec<Point>) {
        let flat = depth == 0
            || (distance_to_line(c0, p0, p1) <= tolerance && distance_to_line(c1, p0, p1) <= tolerance);
        if flat {
            out.push(p1);
            return;
        }
        // de Casteljau at t = 1/2.
        let p01 = p0.lerp(c0, 0.5);
        let p12 = c0.lerp(c1, 0.5);
        let p23 = c1.lerp(p1, 0.5);
        let p012 = p01.lerp(p12, 0.5);
        let p123 = p12.lerp(p23, 0.5);
        let mid = p012.lerp(p123, 0.5);
        recurse(p0, p01, p012, mid, tolerance, depth - 1, out);
        recurse(mid, p123, p23, p1, tolerance, depth - 1, out);
    }
    recurse(p0, c0, c1, p1, tolerance.max(1e-6), max_depth, out);
}
