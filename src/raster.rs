// Copyright 2026 the vraster authors.
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Analytic-coverage scanline rasterizer.
//!
//! Each edge deposits two kinds of contribution into a per-pixel grid: a
//! local `area` term (the fractional horizontal coverage the edge carves out
//! of the one pixel column it crosses, within one row) and a `delta` term
//! carried into every pixel to its right by a left-to-right running sum.
//! The running sum at a pixel is exactly its (possibly fractional) winding
//! number; applying the fill rule to that value yields coverage in `[0,1]`.
//!
//! `FillRule` (`Winding`/`EvenOdd`) turns that fractional winding number
//! into `[0,1]` coverage; the rasterizer itself works in plain `f32`
//! signed-area accumulation rather than a fixed-point pipeline.

use crate::flatten::flatten_primitives;
use crate::geom::Point;
use crate::path::Primitive;

/// The interior-test rule applied to the accumulated winding number.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum FillRule {
    Winding,
    EvenOdd,
}

impl Default for FillRule {
    #[inline]
    fn default() -> Self {
        FillRule::Winding
    }
}

/// Rasterizes `contours` — already flattened-on-demand primitive lists in
/// final pixel coordinates — into per-pixel coverage, invoking
/// `plot(x, y, coverage)` for every pixel whose coverage is greater than
/// zero. Contours are implicitly closed (an edge is added back to the first
/// point if the flattened polyline didn't already end there), since filling
/// an open contour is otherwise not well-defined.
pub fn rasterize(
    contours: &[Vec<Primitive>],
    width: u32,
    height: u32,
    fill_rule: FillRule,
    tolerance: f32,
    max_depth: u32,
    plot: impl FnMut(u32, u32, f32),
) {
    if width == 0 || height == 0 {
        return;
    }
    let mut buffer = CoverageBuffer::new(width, height);
    let mut points = Vec::new();
    for contour_primitives in contours {
        points.clear();
        flatten_primitives(contour_primitives, tolerance, max_depth, &mut points);
        if points.len() < 2 {
            continue;
        }
        for w in points.windows(2) {
            buffer.add_edge(w[0], w[1]);
        }
        let first = points[0];
        let last = *points.last().unwrap();
        if (first - last).length() > 1e-6 {
            buffer.add_edge(last, first);
        }
    }
    buffer.resolve(fill_rule, plot);
}

struct CoverageBuffer {
    width: u32,
    height: u32,
    area: Vec<f32>,
    delta: Vec<f32>,
}

impl CoverageBuffer {
    fn new(width: u32, height: u32) -> Self {
        let n = width as usize * height as usize;
        CoverageBuffer {
            width,
            height,
            area: vec![0.0; n],
            delta: vec![0.0; n],
        }
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width as usize + x
    }

    /// Deposits the winding contribution of one directed edge. Horizontal
    /// edges (`Δy = 0`) contribute nothing and are skipped.
    fn add_edge(&mut self, p0: Point, p1: Point) {
        let dy_total = p1.y - p0.y;
        if dy_total.abs() <= f32::EPSILON {
            return;
        }
        let dxdy = (p1.x - p0.x) / dy_total;
        let (y_lo, y_hi) = if p0.y < p1.y { (p0.y, p1.y) } else { (p1.y, p0.y) };
        // Sign recovers the original (possibly y-decreasing) direction of
        // travel, which is what makes the winding number meaningful.
        let sign = if p0.y < p1.y { 1.0 } else { -1.0 };

        // Rows are classified by the standard "half-open top" convention: a
        // row `r` owns y in `[r, r+1)`, so an edge whose lower endpoint
        // lands exactly on a row boundary contributes to the row below, not
        // the one above — avoiding double-counting at shared vertices.
        let row_lo = y_lo.floor().max(0.0) as i32;
        let row_hi_excl = (y_hi.ceil() as i32).min(self.height as i32);

        let mut row = row_lo;
        while row < row_hi_excl {
            let row_top = row as f32;
            let row_bot = row_top + 1.0;
            let ya = y_lo.max(row_top);
            let yb = y_hi.min(row_bot);
            if yb > ya {
                let x_at = |y: f32| p0.x + (y - p0.y) * dxdy;
                let xa = x_at(ya);
                let xb = x_at(yb);
                let dy = (yb - ya) * sign;
                self.distribute_row(row as usize, xa, xb, dy);
            }
            row += 1;
        }
    }

    /// Splits one row-clipped edge piece (`xa` at the top of the piece,
    /// `xb` at the bottom, signed height `dy`) across every pixel column it
    /// crosses.
    fn distribute_row(&mut self, row: usize, xa: f32, xb: f32, dy: f32) {
        let dx = xb - xa;
        if dx.abs() < 1e-9 {
            let xi = xa.floor();
            self.add_cell(row, xi, dy, xa - xi);
            return;
        }

        let x_lo = xa.min(xb);
        let x_hi = xa.max(xb);
        let col_first = x_lo.floor() as i32;
        let col_last = x_hi.floor() as i32;

        let mut ts: Vec<f32> = Vec::with_capacity((col_last - col_first + 2).max(2) as usize);
        ts.push(0.0);
        for c in (col_first + 1)..=col_last {
            let t = (c as f32 - xa) / dx;
            if t > 0.0 && t < 1.0 {
                ts.push(t);
            }
        }
        ts.push(1.0);
        ts.sort_by(|a, b| a.total_cmp(b));

        for w in ts.windows(2) {
            let (t0, t1) = (w[0], w[1]);
            if t1 <= t0 {
                continue;
            }
            let x0 = xa + t0 * dx;
            let x1 = xa + t1 * dx;
            let xi = ((x0 + x1) * 0.5).floor();
            let piece_dy = dy * (t1 - t0);
            let avg_frac = ((x0 - xi) + (x1 - xi)) * 0.5;
            self.add_cell(row, xi, piece_dy, avg_frac);
        }
    }

    fn add_cell(&mut self, row: usize, xi: f32, dy: f32, avg_frac: f32) {
        if row >= self.height as usize {
            return;
        }
        if xi < 0.0 {
            // Entirely off the left edge: the whole column's winding
            // carries in from pixel 0 onward.
            let idx = self.idx(0, row);
            self.delta[idx] += dy;
            return;
        }
        let xi = xi as usize;
        if xi >= self.width as usize {
            // Entirely off the right edge: contributes to no visible pixel.
            return;
        }
        let idx = self.idx(xi, row);
        self.area[idx] += dy * (1.0 - avg_frac);
        if xi + 1 < self.width as usize {
            self.delta[self.idx(xi + 1, row)] += dy;
        }
    }

    fn resolve(&self, fill_rule: FillRule, mut plot: impl FnMut(u32, u32, f32)) {
        for y in 0..self.height {
            let mut running = 0.0f32;
            for x in 0..self.width {
                let idx = self.idx(x as usize, y as usize);
                running += self.delta[idx];
                let raw = running + self.area[idx];
                let coverage = match fill_rule {
                    FillRule::Winding => raw.abs().min(1.0),
                    FillRule::EvenOdd => {
                        let m = raw.rem_euclid(2.0);
                        (1.0 - (1.0 - m).abs()).clamp(0.0, 1.0)
                    }
                };
                if coverage > 0.0 {
                    plot(x, y, coverage);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::{DEFAULT_FLATNESS_TOLERANCE, DEFAULT_MAX_RECURSION_DEPTH};
    use crate::path;

    fn collect(contours: &[Vec<Primitive>], width: u32, height: u32, rule: FillRule) -> Vec<(u32, u32, f32)> {
        let mut out = Vec::new();
        rasterize(
            contours,
            width,
            height,
            rule,
            DEFAULT_FLATNESS_TOLERANCE,
            DEFAULT_MAX_RECURSION_DEPTH,
            |x, y, c| out.push((x, y, c)),
        );
        out
    }

    #[test]
    fn aligned_rectangle_is_fully_covered_with_no_partial_pixels() {
        let rect = path::rectangle(5.0, 5.0, 10.0, 10.0);
        let samples = collect(&rect.primitives(), 20, 20, FillRule::Winding);
        assert_eq!(samples.len(), 100);
        for (x, y, c) in &samples {
            assert!((5..15).contains(x) && (5..15).contains(y));
            assert!((*c - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn coverage_is_always_in_unit_range() {
        let rect1 = path::rectangle(0.0, 0.0, 10.0, 10.0);
        let rect2 = path::rectangle(5.0, 5.0, 10.0, 10.0);
        let mut both = rect1.primitives();
        both.extend(rect2.primitives());
        for (_, _, c) in collect(&both, 20, 20, FillRule::Winding) {
            assert!((0.0..=1.0).contains(&c));
        }
    }

    #[test]
    fn winding_and_even_odd_agree_on_a_simple_polygon() {
        let tri = path::polygon(&[
            Point::from_xy(2.0, 2.0),
            Point::from_xy(10.0, 2.0),
            Point::from_xy(6.0, 9.0),
        ]);
        let prims = tri.primitives();
        let winding: std::collections::BTreeMap<(u32, u32), f32> = collect(&prims, 12, 12, FillRule::Winding)
            .into_iter()
            .map(|(x, y, c)| ((x, y), c))
            .collect();
        let even_odd: std::collections::BTreeMap<(u32, u32), f32> = collect(&prims, 12, 12, FillRule::EvenOdd)
            .into_iter()
            .map(|(x, y, c)| ((x, y), c))
            .collect();
        assert_eq!(winding.len(), even_odd.len());
        for (key, value) in &winding {
            assert!((even_odd[key] - value).abs() < 1e-4);
        }
    }

    #[test]
    fn open_contour_is_implicitly_closed_for_fill() {
        let mut pb = path::PathBuilder::new();
        pb.move_to(2.0, 2.0);
        pb.line_to(8.0, 2.0);
        pb.line_to(8.0, 8.0);
        pb.line_to(2.0, 8.0);
        // No `.close()` call.
        let open_path = pb.finish();
        let closed_path = path::rectangle(2.0, 2.0, 6.0, 6.0);
        let a = collect(&open_path.primitives(), 12, 12, FillRule::Winding);
        let b = collect(&closed_path.primitives(), 12, 12, FillRule::Winding);
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn empty_contour_list_produces_nothing() {
        let samples = collect(&[], 10, 10, FillRule::Winding);
        assert!(samples.is_empty());
    }
}
