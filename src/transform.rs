// Copyright 2026 the vraster authors.
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! A 2x3 affine transformation matrix.

use crate::geom::Point;

/// An affine transformation.
///
/// Stored in row-major form:
///
/// ```text
/// | sx kx tx |
/// | ky sy ty |
/// | 0  0  1  |
/// ```
///
/// Composition is associative with [`Transform::identity`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Transform {
    pub sx: f32,
    pub kx: f32,
    pub tx: f32,
    pub ky: f32,
    pub sy: f32,
    pub ty: f32,
}

impl Default for Transform {
    #[inline]
    fn default() -> Self {
        Transform::identity()
    }
}

impl Transform {
    /// The identity transform.
    #[inline]
    pub const fn identity() -> Self {
        Transform {
            sx: 1.0,
            kx: 0.0,
            tx: 0.0,
            ky: 0.0,
            sy: 1.0,
            ty: 0.0,
        }
    }

    /// Creates a transform from its six coefficients.
    #[inline]
    pub fn from_row(sx: f32, ky: f32, kx: f32, sy: f32, tx: f32, ty: f32) -> Self {
        Transform {
            sx,
            kx,
            tx,
            ky,
            sy,
            ty,
        }
    }

    /// A pure translation.
    #[inline]
    pub fn from_translate(tx: f32, ty: f32) -> Self {
        Transform {
            tx,
            ty,
            ..Transform::identity()
        }
    }

    /// A pure (non-uniform) scale.
    #[inline]
    pub fn from_scale(sx: f32, sy: f32) -> Self {
        Transform {
            sx,
            sy,
            ..Transform::identity()
        }
    }

    /// A rotation of `degrees`, clockwise (consistent with Y-down screen space).
    pub fn from_rotate(degrees: f32) -> Self {
        let radians = degrees.to_radians();
        let (sin, cos) = radians.sin_cos();
        Transform {
            sx: cos,
            ky: sin,
            kx: -sin,
            sy: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Transform::identity()
    }

    /// True if this transform only translates (no scale/skew/rotation).
    #[inline]
    pub fn is_translate_only(&self) -> bool {
        self.sx == 1.0 && self.sy == 1.0 && self.kx == 0.0 && self.ky == 0.0
    }

    /// `self` applied after `other`: `result(p) = self(other(p))`.
    pub fn pre_concat(&self, other: Transform) -> Transform {
        Transform {
            sx: self.sx * other.sx + self.kx * other.ky,
            kx: self.sx * other.kx + self.kx * other.sy,
            tx: self.sx * other.tx + self.kx * other.ty + self.tx,
            ky: self.ky * other.sx + self.sy * other.ky,
            sy: self.ky * other.kx + self.sy * other.sy,
            ty: self.ky * other.tx + self.sy * other.ty + self.ty,
        }
    }

    /// `other` applied after `self`: `result(p) = other(self(p))`.
    #[inline]
    pub fn post_concat(&self, other: Transform) -> Transform {
        other.pre_concat(*self)
    }

    pub fn pre_translate(&self, tx: f32, ty: f32) -> Transform {
        self.pre_concat(Transform::from_translate(tx, ty))
    }

    pub fn pre_scale(&self, sx: f32, sy: f32) -> Transform {
        self.pre_concat(Transform::from_scale(sx, sy))
    }

    /// The determinant of the linear (non-translation) part.
    #[inline]
    fn determinant(&self) -> f32 {
        self.sx * self.sy - self.kx * self.ky
    }

    /// Returns the inverse transform, or `None` if this transform is
    /// degenerate (zero determinant, or non-finite).
    pub fn invert(&self) -> Option<Transform> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() <= f32::EPSILON * 16.0 {
            return None;
        }

        let inv_det = 1.0 / det;
        let sx = self.sy * inv_det;
        let ky = -self.ky * inv_det;
        let kx = -self.kx * inv_det;
        let sy = self.sx * inv_det;
        let tx = -(sx * self.tx + kx * self.ty);
        let ty = -(ky * self.tx + sy * self.ty);

        let result = Transform {
            sx,
            kx,
            tx,
            ky,
            sy,
            ty,
        };
        if result.sx.is_finite()
            && result.kx.is_finite()
            && result.tx.is_finite()
            && result.ky.is_finite()
            && result.sy.is_finite()
            && result.ty.is_finite()
        {
            Some(result)
        } else {
            None
        }
    }

    /// Applies the transform to a single point.
    #[inline]
    pub fn map_point(&self, p: Point) -> Point {
        Point::from_xy(
            self.sx * p.x + self.kx * p.y + self.tx,
            self.ky * p.x + self.sy * p.y + self.ty,
        )
    }

    /// Applies only the linear part (no translation) to a vector.
    ///
    /// Used for mapping tangents/normals where translation is meaningless.
    #[inline]
    pub fn map_vector(&self, v: Point) -> Point {
        Point::from_xy(self.sx * v.x + self.kx * v.y, self.ky * v.x + self.sy * v.y)
    }

    /// Applies the transform to every point in-place.
    pub fn map_points(&self, points: &mut [Point]) {
        if self.is_identity() {
            return;
        }
        for p in points {
            *p = self.map_point(*p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_roundtrip() {
        let p = Point::from_xy(3.0, 4.0);
        assert_eq!(Transform::identity().map_point(p), p);
    }

    #[test]
    fn invert_roundtrip() {
        let ts = Transform::from_row(2.0, 0.3, -0.5, 1.5, 10.0, -4.0);
        let inv = ts.invert().unwrap();
        let p = Point::from_xy(12.0, -7.0);
        let mapped = inv.map_point(ts.map_point(p));
        assert!((mapped.x - p.x).abs() < 1e-3);
        assert!((mapped.y - p.y).abs() < 1e-3);
    }

    #[test]
    fn degenerate_has_no_inverse() {
        let ts = Transform::from_row(0.0, 0.0, 0.0, 0.0, 5.0, 5.0);
        assert!(ts.invert().is_none());
    }

    #[test]
    fn pre_concat_order() {
        let t1 = Transform::from_translate(10.0, 0.0);
        let t2 = Transform::from_scale(2.0, 2.0);
        // result(p) = t1(t2(p))
        let combined = t1.pre_concat(t2);
        let p = Point::from_xy(1.0, 1.0);
        assert_eq!(combined.map_point(p), Point::from_xy(12.0, 2.0));
    }
}
