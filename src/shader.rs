// Copyright 2026 the vraster authors.
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Texture trees and their per-pixel evaluator.
//!
//! A [`Texture`] is a recursive, owned expression; [`Texture::evaluate`] walks
//! it at one pixel coordinate to produce a [`Color`]. Grounded on
//! `src/shaders/`'s variant shape (`Shader::{Solid, LinearGradient,
//! RadialGradient, Pattern, ...}`, `GradientStop`, tile-mode naming) but
//! evaluated directly rather than compiled into `src/raster_pipeline.rs`
//! stages — this crate's rasterizer emits coverage samples one at a time,
//! so there's no batch of pixels to justify a staged pipeline.

use std::rc::Rc;

use crate::color::Color;
use crate::geom::Point;
use crate::pixmap::{Image, Mask};
use crate::transform::Transform;

/// The out-of-range policy for a gradient or image-sampling parameter.
///
/// Grounded on `src/shaders/mod.rs`'s `SpreadMode` naming.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum SpreadMode {
    Pad,
    Repeat,
    Reflect,
}

impl Default for SpreadMode {
    #[inline]
    fn default() -> Self {
        SpreadMode::Pad
    }
}

impl SpreadMode {
    /// Maps an unbounded `t` into `[0, 1]` per the sampler policy.
    fn apply(self, t: f32) -> f32 {
        match self {
            SpreadMode::Pad => t.clamp(0.0, 1.0),
            SpreadMode::Repeat => t - t.floor(),
            SpreadMode::Reflect => {
                let m = t.rem_euclid(2.0);
                if m <= 1.0 {
                    m
                } else {
                    2.0 - m
                }
            }
        }
    }

    /// Maps an integer pixel index into range `[0, n)` per the sampler
    /// policy, for nearest/bilinear image lookups.
    fn wrap_index(self, i: i32, n: i32) -> i32 {
        match self {
            SpreadMode::Pad => i.clamp(0, n - 1),
            SpreadMode::Repeat => i.rem_euclid(n),
            SpreadMode::Reflect => {
                let period = 2 * n;
                let m = i.rem_euclid(period);
                if m < n {
                    m
                } else {
                    period - 1 - m
                }
            }
        }
    }
}

/// One `(offset, color)` pair of a [`Gradient`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    #[inline]
    pub fn new(offset: f32, color: Color) -> Self {
        GradientStop {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }
}

/// A sorted, `[0,1]`-bracketed sequence of color stops.
///
/// Grounded on `src/shaders/gradient.rs`'s `Gradient::new` dummy-stop
/// insertion (a stop set that doesn't start at 0 or end at 1 gets synthetic
/// endpoints matching the nearest real stop's color), simplified: no
/// "uniform stops" fast path, since this evaluator has no pipeline stage to
/// specialize.
#[derive(Clone, Debug)]
pub struct Gradient {
    stops: Vec<GradientStop>,
}

impl Gradient {
    /// Builds a gradient from `stops`, sorting by offset, clamping offsets to
    /// be monotonically non-decreasing (equal offsets produce a hard stop),
    /// and bracketing the sequence with synthetic stops at 0 and 1 if the
    /// caller didn't supply them.
    ///
    /// A gradient with fewer than 2 stops after bracketing (i.e. zero stops
    /// supplied) evaluates as fully transparent; a single supplied stop
    /// brackets to two stops of the same color, which evaluates as solid.
    pub fn new(mut stops: Vec<GradientStop>) -> Self {
        stops.sort_by(|a, b| a.offset.partial_cmp(&b.offset).unwrap_or(std::cmp::Ordering::Equal));
        let mut prev = 0.0f32;
        for stop in &mut stops {
            if stop.offset < prev {
                stop.offset = prev;
            }
            prev = stop.offset;
        }
        if let Some(first) = stops.first() {
            if first.offset > 0.0 {
                stops.insert(0, GradientStop::new(0.0, first.color));
            }
        }
        if let Some(last) = stops.last() {
            if last.offset < 1.0 {
                stops.push(GradientStop::new(1.0, last.color));
            }
        }
        Gradient { stops }
    }

    /// Looks up the color at normalized position `t` by binary search for
    /// the bracketing stop pair, then linear interpolation between them.
    fn sample(&self, t: f32) -> Color {
        match self.stops.len() {
            0 => Color::TRANSPARENT,
            1 => self.stops[0].color,
            _ => {
                let t = t.clamp(0.0, 1.0);
                let idx = self
                    .stops
                    .partition_point(|s| s.offset < t)
                    .clamp(1, self.stops.len() - 1);
                let lo = &self.stops[idx - 1];
                let hi = &self.stops[idx];
                let span = hi.offset - lo.offset;
                let local_t = if span <= f32::EPSILON { 0.0 } else { (t - lo.offset) / span };
                lo.color.lerp(hi.color, local_t)
            }
        }
    }

    /// The color of the last stop, used for the degenerate zero-radius
    /// radial gradient.
    fn last_color(&self) -> Color {
        self.stops.last().map(|s| s.color).unwrap_or(Color::TRANSPARENT)
    }
}

/// A recursive texture expression, evaluated per pixel.
///
/// Every constructor is total: there is no invalid combination of arguments,
/// only degenerate ones, and degenerate cases fall back
/// rather than failing (focus clamped inside the circle, zero-size images
/// sample transparent, and so on).
#[derive(Clone, Debug)]
pub enum Texture {
    Solid(Color),
    LinearGradient(Gradient, Point, Point),
    RadialGradient(Gradient, Point, f32),
    RadialGradientFocus(Gradient, Point, f32, Point),
    SampledImage(Rc<Image>),
    WithSampler(SpreadMode, Box<Texture>),
    WithTransform(Transform, Box<Texture>),
    Modulate(Box<Texture>, Box<Texture>),
    /// An already-rasterized single-channel mask, used for compiled clips.
    Raw(Rc<Mask>),
}

impl Texture {
    pub fn solid(color: Color) -> Texture {
        Texture::Solid(color)
    }

    pub fn linear_gradient(stops: Vec<GradientStop>, start: Point, end: Point) -> Texture {
        Texture::LinearGradient(Gradient::new(stops), start, end)
    }

    pub fn radial_gradient(stops: Vec<GradientStop>, center: Point, radius: f32) -> Texture {
        Texture::RadialGradient(Gradient::new(stops), center, radius)
    }

    /// Focus is clamped to lie strictly inside the radius circle (by `ε`) if
    /// the caller places it on or outside.
    pub fn radial_gradient_with_focus(
        stops: Vec<GradientStop>,
        center: Point,
        radius: f32,
        focus: Point,
    ) -> Texture {
        let focus = clamp_focus(center, radius, focus);
        Texture::RadialGradientFocus(Gradient::new(stops), center, radius, focus)
    }

    pub fn sampled_image(image: Rc<Image>) -> Texture {
        Texture::SampledImage(image)
    }

    pub fn with_sampler(mode: SpreadMode, inner: Texture) -> Texture {
        Texture::WithSampler(mode, Box::new(inner))
    }

    pub fn with_transform(transform: Transform, inner: Texture) -> Texture {
        Texture::WithTransform(transform, Box::new(inner))
    }

    pub fn modulate(base: Texture, mask: Texture) -> Texture {
        Texture::Modulate(Box::new(base), Box::new(mask))
    }

    pub fn raw(mask: Rc<Mask>) -> Texture {
        Texture::Raw(mask)
    }

    /// Evaluates the texture at pixel-space point `p` (already the pixel
    /// center, `(x+½, y+½)`).
    pub fn evaluate(&self, p: Point) -> Color {
        self.evaluate_with(p, SpreadMode::default())
    }

    fn evaluate_with(&self, p: Point, sampler: SpreadMode) -> Color {
        match self {
            Texture::Solid(c) => *c,
            Texture::WithTransform(x, inner) => inner.evaluate_with(x.map_point(p), sampler),
            Texture::WithSampler(mode, inner) => inner.evaluate_with(p, *mode),
            Texture::SampledImage(image) => sample_bilinear(image, p, sampler),
            Texture::LinearGradient(gradient, a, b) => {
                let axis = *b - *a;
                let len_sq = axis.dot(axis);
                let t = if len_sq <= f32::EPSILON {
                    0.0
                } else {
                    (p - *a).dot(axis) / len_sq
                };
                gradient.sample(sampler.apply(t))
            }
            Texture::RadialGradient(gradient, center, radius) => {
                if *radius <= f32::EPSILON {
                    gradient.last_color()
                } else {
                    let t = p.distance(*center) / radius;
                    gradient.sample(sampler.apply(t))
                }
            }
            Texture::RadialGradientFocus(gradient, center, radius, focus) => {
                if *radius <= f32::EPSILON {
                    gradient.last_color()
                } else {
                    match radial_focus_t(p, *center, *radius, *focus) {
                        Some(t) => gradient.sample(sampler.apply(t)),
                        None => gradient.last_color(),
                    }
                }
            }
            Texture::Modulate(base, mask) => {
                let base_color = base.evaluate_with(p, SpreadMode::default());
                let mask_value = mask.evaluate_with(p, SpreadMode::default()).luminance();
                base_color.modulate(mask_value)
            }
            Texture::Raw(mask) => {
                let w = mask.width() as i32;
                let h = mask.height() as i32;
                let xi = SpreadMode::Pad.wrap_index(p.x.floor() as i32, w);
                let yi = SpreadMode::Pad.wrap_index(p.y.floor() as i32, h);
                let value = mask.pixel(xi as u32, yi as u32).map(|g| g.0).unwrap_or(0) as f32 / 255.0;
                Color::gray(value)
            }
        }
    }
}

/// Clamps `focus` to lie strictly inside the circle `(center, radius)`,
/// pulling it back to `radius - ε` along the same direction if it's on or
/// outside.
fn clamp_focus(center: Point, radius: f32, focus: Point) -> Point {
    const EPS: f32 = 1e-3;
    let limit = (radius - radius * EPS).max(0.0);
    let offset = focus - center;
    let dist = offset.length();
    if dist < limit || dist <= f32::EPSILON {
        return focus;
    }
    match offset.normalized() {
        Some(dir) => center + dir * limit,
        None => focus,
    }
}

/// SVG-style two-point conical gradient solved for the case where the start
/// radius is zero (a "radial gradient with focus"): `p` lies on the line
/// from `focus` through a point `q` on the circle, and
/// `t = |p-focus| / |q-focus|`.
///
/// With the focus strictly inside the circle, the line from the focus
/// through any point always meets the circle at exactly one point in the
/// forward direction (and one behind it); we solve the quadratic in the
/// scale factor `k` that reaches the circle, and discard the negative root.
fn radial_focus_t(p: Point, center: Point, radius: f32, focus: Point) -> Option<f32> {
    let d = p - focus;
    if d.length() <= f32::EPSILON {
        return Some(0.0);
    }
    let e = focus - center;
    let a = d.dot(d);
    let b = 2.0 * e.dot(d);
    let c = e.dot(e) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_disc = discriminant.sqrt();
    let k1 = (-b + sqrt_disc) / (2.0 * a);
    let k2 = (-b - sqrt_disc) / (2.0 * a);
    let k = if k1 > 0.0 { k1 } else { k2 };
    if k <= f32::EPSILON || !k.is_finite() {
        return None;
    }
    Some((1.0 / k).max(0.0))
}

/// Bilinear image lookup at texture-space point `p`, with per-axis
/// out-of-range handling by `sampler`.
fn sample_bilinear(image: &Image, p: Point, sampler: SpreadMode) -> Color {
    let width = image.width() as i32;
    let height = image.height() as i32;
    if width == 0 || height == 0 {
        return Color::TRANSPARENT;
    }

    // Pixel centers sit at integer+½; shift so the fractional part measures
    // distance from the nearest center below.
    let fx = p.x - 0.5;
    let fy = p.y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let (x0, y0) = (x0 as i32, y0 as i32);

    let fetch = |xi: i32, yi: i32| -> Color {
        let xi = sampler.wrap_index(xi, width);
        let yi = sampler.wrap_index(yi, height);
        image.pixel(xi as u32, yi as u32).map(|px| px.to_color()).unwrap_or(Color::TRANSPARENT)
    };

    let top = fetch(x0, y0).lerp(fetch(x0 + 1, y0), tx);
    let bottom = fetch(x0, y0 + 1).lerp(fetch(x0 + 1, y0 + 1), tx);
    top.lerp(bottom, ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;

    #[test]
    fn solid_evaluates_to_its_color() {
        let t = Texture::solid(Color::from_rgba(0.1, 0.2, 0.3, 0.4));
        assert_eq!(t.evaluate(Point::from_xy(5.0, 5.0)), Color::from_rgba(0.1, 0.2, 0.3, 0.4));
    }

    #[test]
    fn linear_gradient_is_monotone_along_its_axis() {
        let t = Texture::linear_gradient(
            vec![GradientStop::new(0.0, Color::BLACK), GradientStop::new(1.0, Color::WHITE)],
            Point::from_xy(0.0, 0.0),
            Point::from_xy(100.0, 0.0),
        );
        let mut prev = -1.0;
        for x in 0..100 {
            let c = t.evaluate(Point::from_xy(x as f32 + 0.5, 0.5));
            assert!(c.r >= prev - 1e-6);
            prev = c.r;
            let expected = (x as f32 + 0.5) / 100.0;
            assert!((c.r - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn radial_gradient_matches_distance_falloff() {
        let t = Texture::radial_gradient(
            vec![GradientStop::new(0.0, Color::WHITE), GradientStop::new(1.0, Color::TRANSPARENT)],
            Point::from_xy(50.0, 50.0),
            50.0,
        );
        let center = t.evaluate(Point::from_xy(50.5, 50.5));
        assert!(center.a > 0.98);
        let corner = t.evaluate(Point::from_xy(0.5, 0.5));
        assert!(corner.a < 0.05);
    }

    #[test]
    fn radial_gradient_zero_radius_is_last_stop_everywhere() {
        let t = Texture::radial_gradient(
            vec![GradientStop::new(0.0, Color::BLACK), GradientStop::new(1.0, Color::WHITE)],
            Point::from_xy(10.0, 10.0),
            0.0,
        );
        assert_eq!(t.evaluate(Point::from_xy(500.0, -500.0)), Color::WHITE);
    }

    #[test]
    fn gradient_with_one_stop_behaves_as_solid() {
        let t = Texture::linear_gradient(
            vec![GradientStop::new(0.5, Color::from_rgba(1.0, 0.0, 0.0, 1.0))],
            Point::from_xy(0.0, 0.0),
            Point::from_xy(10.0, 0.0),
        );
        let a = t.evaluate(Point::from_xy(0.5, 0.5));
        let b = t.evaluate(Point::from_xy(9.5, 0.5));
        assert_eq!(a, b);
        assert_eq!(a, Color::from_rgba(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn gradient_with_no_stops_is_transparent() {
        let t = Texture::linear_gradient(vec![], Point::from_xy(0.0, 0.0), Point::from_xy(10.0, 0.0));
        assert_eq!(t.evaluate(Point::from_xy(5.0, 0.5)), Color::TRANSPARENT);
    }

    #[test]
    fn focus_outside_circle_is_clamped_inside() {
        let t = Texture::radial_gradient_with_focus(
            vec![GradientStop::new(0.0, Color::WHITE), GradientStop::new(1.0, Color::BLACK)],
            Point::from_xy(0.0, 0.0),
            10.0,
            Point::from_xy(50.0, 0.0),
        );
        // Should not panic and should produce a finite, in-range color.
        let c = t.evaluate(Point::from_xy(1.0, 0.0));
        assert!(c.r.is_finite() && (0.0..=1.0).contains(&c.r));
    }

    #[test]
    fn with_transform_maps_the_lookup_point() {
        let inner = Texture::linear_gradient(
            vec![GradientStop::new(0.0, Color::BLACK), GradientStop::new(1.0, Color::WHITE)],
            Point::from_xy(0.0, 0.0),
            Point::from_xy(10.0, 0.0),
        );
        let shifted = Texture::with_transform(Transform::from_translate(10.0, 0.0), inner.clone());
        // Evaluating at x=0 after a +10 translate should match evaluating
        // the un-translated gradient at x=10.
        let a = shifted.evaluate(Point::from_xy(0.0, 0.0));
        let b = inner.evaluate(Point::from_xy(10.0, 0.0));
        assert_eq!(a, b);
    }

    #[test]
    fn modulate_scales_base_by_mask_luminance() {
        let base = Texture::solid(Color::from_rgba(1.0, 1.0, 1.0, 1.0));
        let mask = Texture::solid(Color::gray(0.5));
        let t = Texture::modulate(base, mask);
        let c = t.evaluate(Point::from_xy(0.0, 0.0));
        assert!((c.a - 0.5).abs() < 1e-3);
    }

    #[test]
    fn sampled_image_nearest_neighbor_at_pixel_centers() {
        let mut img = Image::new(2, 1).unwrap();
        img.set_pixel(0, 0, Rgba8::new(255, 0, 0, 255));
        img.set_pixel(1, 0, Rgba8::new(0, 255, 0, 255));
        let t = Texture::sampled_image(Rc::new(img));
        let left = t.evaluate(Point::from_xy(0.5, 0.5));
        assert!(left.r > 0.9 && left.g < 0.1);
    }

    #[test]
    fn pad_sampler_clamps_image_lookups_past_the_edge() {
        let mut img = Image::new(2, 1).unwrap();
        img.set_pixel(0, 0, Rgba8::new(255, 0, 0, 255));
        img.set_pixel(1, 0, Rgba8::new(0, 255, 0, 255));
        let t = Texture::sampled_image(Rc::new(img));
        let far_right = t.evaluate(Point::from_xy(1000.5, 0.5));
        assert!(far_right.g > 0.9);
    }
}
