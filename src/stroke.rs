// Copyright 2026 the vraster authors.
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Stroke-to-fill conversion and dash expansion.
//!
//! A stroked path is converted into an ordinary filled [`Path`] — two offset
//! polylines (at `±width/2`) joined at vertices and capped at endpoints —
//! which the rasterizer then treats exactly like any other fill under the
//! `Winding` rule. Joins are generated on both sides of every vertex rather
//! than only the outer (convex) side, which is geometrically redundant but
//! harmless under non-zero winding since the redundant geometry only ever
//! re-covers area already covered.

use core::f32::consts::PI;

use crate::flatten::{flatten_contour, FlatContour};
use crate::geom::Point;
use crate::path::{Path, PathBuilder};

/// How two stroked segments meet at a shared vertex.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum LineJoin {
    /// Extend the two outer edges to their intersection; if that point is
    /// farther than `limit * width/2` from the vertex, fall back to `Bevel`.
    Miter(f32),
    Round,
    Bevel,
}

impl Default for LineJoin {
    #[inline]
    fn default() -> Self {
        LineJoin::Miter(4.0)
    }
}

/// How a stroke ends at an open path's start/end point.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum LineCap {
    /// A flat cap extended `n` pixels past the endpoint along the tangent
    /// (`n = 0.0` is the plain "butt" cap).
    Straight(f32),
    Round,
}

impl Default for LineCap {
    #[inline]
    fn default() -> Self {
        LineCap::Straight(0.0)
    }
}

/// Stroke style parameters: width, join, and cap.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Stroke {
    pub width: f32,
    pub join: LineJoin,
    pub cap: LineCap,
}

impl Default for Stroke {
    fn default() -> Self {
        Stroke {
            width: 1.0,
            join: LineJoin::default(),
            cap: LineCap::default(),
        }
    }
}

/// A cyclic on/off dash pattern plus a starting phase.
///
/// A pattern that is empty or whose entries sum to zero or less is
/// degenerate and is treated as "no dashing" (the path strokes solid) — the
/// spec is silent on this case, and this mirrors the common convention (e.g.
/// an empty SVG `stroke-dasharray`) rather than producing no output at all.
#[derive(Clone, PartialEq, Debug)]
pub struct DashPattern {
    pub pattern: Vec<f32>,
    pub offset: f32,
}

impl DashPattern {
    fn is_degenerate(&self) -> bool {
        self.pattern.is_empty() || self.pattern.iter().any(|v| !v.is_finite() || *v < 0.0) || self.total() <= 0.0
    }

    fn total(&self) -> f32 {
        self.pattern.iter().sum()
    }
}

/// Converts every contour of `path` into the filled outline of its stroke.
///
/// A zero (or negative) width produces an empty path.
pub fn stroke_to_fill(path: &Path, stroke: &Stroke, tolerance: f32, max_depth: u32) -> Path {
    if stroke.width <= 0.0 {
        return Path::default();
    }
    let hw = stroke.width * 0.5;
    let mut out = PathBuilder::new();
    for contour in &path.contours {
        let flat = flatten_contour(contour, tolerance, max_depth);
        stroke_one_contour(&flat, hw, stroke, &mut out);
    }
    out.finish()
}

/// Expands `path` into the "on" sub-polylines of `dash`, as a multi-contour
/// open [`Path`] ready to be passed to [`stroke_to_fill`].
pub fn dash_path(path: &Path, dash: &DashPattern, tolerance: f32, max_depth: u32) -> Path {
    if dash.is_degenerate() {
        return path.clone();
    }
    let mut out = PathBuilder::new();
    for contour in &path.contours {
        let flat = flatten_contour(contour, tolerance, max_depth);
        dash_one_contour(&flat, dash, &mut out);
    }
    out.finish()
}

/// Dashes, then strokes, `path`.
pub fn dashed_stroke_to_fill(
    path: &Path,
    dash: &DashPattern,
    stroke: &Stroke,
    tolerance: f32,
    max_depth: u32,
) -> Path {
    let dashed = dash_path(path, dash, tolerance, max_depth);
    stroke_to_fill(&dashed, stroke, tolerance, max_depth)
}

fn dash_one_contour(flat: &FlatContour, dash: &DashPattern, out: &mut PathBuilder) {
    let pattern = &dash.pattern;
    let total = dash.total();

    let mut phase = dash.offset.rem_euclid(total);
    let mut idx = 0usize;
    let mut on = true;
    for _ in 0..pattern.len() {
        if phase < pattern[idx] {
            break;
        }
        phase -= pattern[idx];
        idx = (idx + 1) % pattern.len();
        on = !on;
    }
    let mut remaining = (pattern[idx] - phase).max(0.0);

    let mut run: Vec<Point> = Vec::new();

    for (a, b) in flat.segments() {
        let seg_len = (b - a).length();
        if seg_len <= 1e-9 {
            continue;
        }
        let mut pos = 0.0f32;
        loop {
            let mut guard = 0;
            while remaining <= 1e-6 && guard <= pattern.len() {
                if on {
                    flush_run(&mut run, out);
                }
                idx = (idx + 1) % pattern.len();
                on = !on;
                remaining = pattern[idx];
                guard += 1;
            }
            if pos >= seg_len - 1e-6 {
                break;
            }
            let step = remaining.min(seg_len - pos);
            let t0 = pos / seg_len;
            let t1 = (pos + step) / seg_len;
            if on {
                if run.is_empty() {
                    run.push(a.lerp(b, t0));
                }
                run.push(a.lerp(b, t1));
            }
            pos += step;
            remaining -= step;
        }
    }
    if on {
        flush_run(&mut run, out);
    }
}

fn flush_run(run: &mut Vec<Point>, out: &mut PathBuilder) {
    if run.len() >= 2 {
        out.move_to(run[0].x, run[0].y);
        for p in &run[1..] {
            out.line_to(p.x, p.y);
        }
    }
    run.clear();
}

fn dedup_adjacent(pts: &mut Vec<Point>, closed: bool) {
    const EPS: f32 = 1e-6;
    pts.dedup_by(|a, b| a.distance(*b) <= EPS);
    if closed && pts.len() > 1 && pts[0].distance(*pts.last().unwrap()) <= EPS {
        pts.pop();
    }
}

fn stroke_one_contour(flat: &FlatContour, hw: f32, stroke: &Stroke, out: &mut PathBuilder) {
    let mut pts = flat.points.clone();
    dedup_adjacent(&mut pts, flat.closed);
    if pts.len() < 2 {
        return;
    }

    if flat.closed {
        let left = offset_side(&pts, hw, 1.0, stroke.join, true);
        let mut right = offset_side(&pts, hw, -1.0, stroke.join, true);
        right.reverse();
        emit_closed_ring(out, &left);
        emit_closed_ring(out, &right);
    } else {
        let left = offset_side(&pts, hw, 1.0, stroke.join, false);
        let mut right = offset_side(&pts, hw, -1.0, stroke.join, false);
        right.reverse();

        let n = pts.len();
        let end_tangent = (pts[n - 1] - pts[n - 2]).normalized().unwrap_or(Point::from_xy(1.0, 0.0));
        let start_tangent = (pts[1] - pts[0]).normalized().unwrap_or(Point::from_xy(1.0, 0.0));

        let mut outline = left;
        outline.extend(cap_points(
            pts[n - 1],
            *outline.last().unwrap(),
            right[0],
            stroke.cap,
            hw,
            end_tangent,
        ));
        outline.extend(right);
        outline.extend(cap_points(
            pts[0],
            *outline.last().unwrap(),
            outline[0],
            stroke.cap,
            hw,
            -start_tangent,
        ));
        emit_closed_ring(out, &outline);
    }
}

fn emit_closed_ring(out: &mut PathBuilder, ring: &[Point]) {
    if ring.len() < 3 {
        return;
    }
    out.move_to(ring[0].x, ring[0].y);
    for p in &ring[1..] {
        out.line_to(p.x, p.y);
    }
    out.close();
}

/// Offsets a polyline by `hw` along each vertex's outward normal on one
/// side (`sign = 1.0` for left, `-1.0` for right), inserting join geometry
/// at interior vertices (and, if `closed`, at the wrap-around vertex too).
fn offset_side(pts: &[Point], hw: f32, sign: f32, join: LineJoin, closed: bool) -> Vec<Point> {
    let n = pts.len();
    let n_segs = if closed { n } else { n - 1 };

    let normals: Vec<Point> = (0..n_segs)
        .map(|i| {
            let a = pts[i];
            let b = pts[(i + 1) % n];
            let tangent = (b - a).normalized().unwrap_or(Point::from_xy(1.0, 0.0));
            tangent.rotate90_cw().scaled(sign)
        })
        .collect();

    let mut out = Vec::with_capacity(n_segs * 2 + 4);
    for i in 0..n_segs {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        let normal = normals[i];
        out.push(a + normal.scaled(hw));
        out.push(b + normal.scaled(hw));

        let has_next = closed || i < n_segs - 1;
        if has_next {
            let next_normal = normals[(i + 1) % n_segs];
            if (next_normal - normal).length() > 1e-6 {
                append_join(&mut out, b, normal, next_normal, hw, join);
            }
        }
    }
    out
}

fn append_join(out: &mut Vec<Point>, vertex: Point, n0: Point, n1: Point, hw: f32, join: LineJoin) {
    match join {
        LineJoin::Bevel => {}
        LineJoin::Round => {
            let from = vertex + n0.scaled(hw);
            let to = vertex + n1.scaled(hw);
            out.extend(arc_points(vertex, from, to, n1, hw));
        }
        LineJoin::Miter(limit) => {
            if let Some(miter) = miter_point(vertex, n0, n1, hw) {
                if (miter - vertex).length() <= limit * hw {
                    out.push(miter);
                }
            }
        }
    }
}

/// The intersection of the two offset edges meeting at `vertex`, i.e. the
/// tip of a miter join, or `None` if the turn is too close to 180 degrees
/// (the two normals nearly cancel) to have a well-defined tip.
fn miter_point(vertex: Point, n0: Point, n1: Point, hw: f32) -> Option<Point> {
    let sum = n0 + n1;
    let len = sum.length();
    if len <= 1e-6 {
        return None;
    }
    let bisector = sum.scaled(1.0 / len);
    let cos_half = n0.dot(bisector);
    if cos_half.abs() <= 1e-6 {
        return None;
    }
    let dist = hw / cos_half;
    if !dist.is_finite() {
        return None;
    }
    Some(vertex + bisector.scaled(dist))
}

/// Points strictly between `from` and `to` needed to close a cap at `center`
/// (an open path's endpoint) or a round join (a shared stroke vertex).
/// `tangent_out` hints which of the two possible sweep directions is the
/// outward-bulging one.
fn cap_points(center: Point, from: Point, to: Point, cap: LineCap, hw: f32, tangent_out: Point) -> Vec<Point> {
    match cap {
        LineCap::Straight(n) if n <= 0.0 => Vec::new(),
        LineCap::Straight(n) => vec![from + tangent_out.scaled(n), to + tangent_out.scaled(n)],
        LineCap::Round => arc_points(center, from, to, tangent_out, hw),
    }
}

/// Samples the arc around `center` from `from` to `to`, at radius `hw`,
/// taking whichever of the two sweep directions passes closer to
/// `bulge_hint`. Returns only the interior points (excludes `from`/`to`).
fn arc_points(center: Point, from: Point, to: Point, bulge_hint: Point, hw: f32) -> Vec<Point> {
    const TAU: f32 = 2.0 * PI;

    let v0 = (from - center).normalized().unwrap_or(Point::from_xy(1.0, 0.0));
    let v1 = (to - center).normalized().unwrap_or(v0);
    let angle0 = v0.y.atan2(v0.x);
    let angle1 = v1.y.atan2(v1.x);

    let mut d_ccw = angle1 - angle0;
    while d_ccw < 0.0 {
        d_ccw += TAU;
    }
    let d_cw = d_ccw - TAU;

    let hint_angle = bulge_hint.y.atan2(bulge_hint.x);
    let ang_dist = |a: f32, b: f32| {
        let mut d = (a - b) % TAU;
        if d > PI {
            d -= TAU;
        }
        if d < -PI {
            d += TAU;
        }
        d.abs()
    };
    let delta = if ang_dist(angle0 + d_ccw / 2.0, hint_angle) <= ang_dist(angle0 + d_cw / 2.0, hint_angle) {
        d_ccw
    } else {
        d_cw
    };

    let steps = ((delta.abs() / (PI / 8.0)).ceil() as usize).max(1);
    let mut out = Vec::with_capacity(steps.saturating_sub(1));
    for i in 1..steps {
        let t = i as f32 / steps as f32;
        let a = angle0 + delta * t;
        out.push(center + Point::from_xy(a.cos(), a.sin()).scaled(hw));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    #[test]
    fn zero_width_stroke_is_empty() {
        let p = path::line(Point::zero(), Point::from_xy(10.0, 0.0));
        let stroke = Stroke {
            width: 0.0,
            ..Stroke::default()
        };
        let outline = stroke_to_fill(&p, &stroke, 0.25, 16);
        assert!(outline.is_empty());
    }

    #[test]
    fn horizontal_line_stroke_is_a_rectangle() {
        let p = path::line(Point::from_xy(2.0, 10.0), Point::from_xy(18.0, 10.0));
        let stroke = Stroke {
            width: 2.0,
            join: LineJoin::Miter(4.0),
            cap: LineCap::Straight(0.0),
        };
        let outline = stroke_to_fill(&p, &stroke, 0.25, 16);
        assert_eq!(outline.contours.len(), 1);
        let bounds = outline.bounds().unwrap();
        assert!((bounds.top - 9.0).abs() < 1e-3);
        assert!((bounds.bottom - 11.0).abs() < 1e-3);
        assert!((bounds.left - 2.0).abs() < 1e-3);
        assert!((bounds.right - 18.0).abs() < 1e-3);
    }

    #[test]
    fn square_cap_extends_past_endpoint() {
        let p = path::line(Point::from_xy(0.0, 0.0), Point::from_xy(10.0, 0.0));
        let stroke = Stroke {
            width: 2.0,
            join: LineJoin::Miter(4.0),
            cap: LineCap::Straight(3.0),
        };
        let outline = stroke_to_fill(&p, &stroke, 0.25, 16);
        let bounds = outline.bounds().unwrap();
        assert!((bounds.right - 13.0).abs() < 1e-3);
        assert!((bounds.left - -3.0).abs() < 1e-3);
    }

    #[test]
    fn closed_square_stroke_makes_two_rings() {
        let p = path::rectangle(0.0, 0.0, 10.0, 10.0);
        let stroke = Stroke {
            width: 2.0,
            ..Stroke::default()
        };
        let outline = stroke_to_fill(&p, &stroke, 0.25, 16);
        assert_eq!(outline.contours.len(), 2);
    }

    #[test]
    fn degenerate_dash_pattern_falls_back_to_solid() {
        let p = path::line(Point::zero(), Point::from_xy(10.0, 0.0));
        let dash = DashPattern {
            pattern: vec![],
            offset: 0.0,
        };
        let dashed = dash_path(&p, &dash, 0.25, 16);
        assert_eq!(dashed, p);
    }

    #[test]
    fn dash_pattern_splits_line_into_runs() {
        let p = path::line(Point::zero(), Point::from_xy(10.0, 0.0));
        let dash = DashPattern {
            pattern: vec![2.0, 2.0],
            offset: 0.0,
        };
        let dashed = dash_path(&p, &dash, 0.25, 16);
        // on,off,on,off,on -> three "on" runs of length 2 each (2,4..6,8..10)
        assert_eq!(dashed.contours.len(), 3);
    }

    #[test]
    fn short_dash_entry_still_emits_its_run() {
        let p = path::line(Point::zero(), Point::from_xy(1.0, 0.0));
        let dash = DashPattern {
            pattern: vec![0.1, 5.0],
            offset: 0.0,
        };
        let dashed = dash_path(&p, &dash, 0.25, 16);
        assert_eq!(dashed.contours.len(), 1);
    }
}
