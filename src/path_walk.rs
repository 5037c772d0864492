// Copyright 2026 the vraster authors.
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Walking a flattened path by arc length, for text-on-path.
//!
//! Grounded on the general parametric-curve-evaluation technique
//! `src/path_geometry.rs` uses internally (segment-relative `t`,
//! linear interpolation of position and tangent), applied here over an
//! already-flattened polyline rather than a single Bézier segment.

use crate::flatten::{flatten_contour, FlatContour};
use crate::geom::Point;
use crate::path::Contour;

/// A path flattened and indexed by cumulative arc length, supporting
/// position/tangent queries at an arbitrary distance along it.
pub struct ArcLengthTable {
    points: Vec<Point>,
    /// `cumulative[i]` is the arc length from `points[0]` to `points[i]`.
    cumulative: Vec<f32>,
}

impl ArcLengthTable {
    /// Builds a table from one already-flattened contour.
    pub fn new(flat: &FlatContour) -> Self {
        let points = flat.points.clone();
        let mut cumulative = Vec::with_capacity(points.len());
        let mut acc = 0.0;
        cumulative.push(0.0);
        for w in points.windows(2) {
            acc += (w[1] - w[0]).length();
            cumulative.push(acc);
        }
        ArcLengthTable { points, cumulative }
    }

    /// Builds a table from an unflattened [`Contour`], flattening first.
    pub fn from_contour(contour: &Contour, tolerance: f32, max_depth: u32) -> Self {
        Self::new(&flatten_contour(contour, tolerance, max_depth))
    }

    /// The total arc length of the path.
    pub fn length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// True if the path has no measurable length (fewer than two points, or
    /// all points coincide).
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2 || self.length() <= f32::EPSILON
    }

    /// Evaluates the path at distance `d` along it (clamped to `[0,
    /// length()]`), with a perpendicular offset `offset` applied along the
    /// local normal.
    ///
    /// Returns `None` for a degenerate (too-short) path.
    pub fn position_at(&self, d: f32, offset: f32) -> Option<(Point, Point)> {
        if self.is_degenerate() {
            return None;
        }
        let d = d.clamp(0.0, self.length());

        // Binary search for the segment whose cumulative range contains `d`.
        let idx = self.cumulative.partition_point(|&c| c < d).clamp(1, self.cumulative.len() - 1);
        let seg_start = self.cumulative[idx - 1];
        let seg_end = self.cumulative[idx];
        let p0 = self.points[idx - 1];
        let p1 = self.points[idx];
        let seg_len = seg_end - seg_start;

        let tangent = if seg_len > f32::EPSILON {
            (p1 - p0).scaled(1.0 / seg_len)
        } else {
            // A zero-length segment in the flattened polyline: fall back to
            // the direction of the next non-degenerate hop, or +x if none.
            (p1 - p0).normalized().unwrap_or(Point::from_xy(1.0, 0.0))
        };
        let local_t = if seg_len > f32::EPSILON { (d - seg_start) / seg_len } else { 0.0 };
        let base = p0.lerp(p1, local_t.clamp(0.0, 1.0));
        let normal = tangent.rotate90_cw();
        Some((base + normal.scaled(offset), tangent))
    }
}
