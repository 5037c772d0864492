// Copyright 2026 the vraster authors.
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The render context and scene walker: interprets a recorded [`Drawing`]
//! tree into a flat, ordered list of [`DrawOrder`]s, then rasterizes each one
//! onto the destination image.
//!
//! Ambient state (texture, clip, transform) is threaded as an immutable
//! [`RenderCtx`] value passed down the recursive walk rather than mutated in
//! place, so each scope only ever sees the state active at its own nesting
//! level.

use std::rc::Rc;

use crate::color::{Color, Gray8};
use crate::flatten::{DEFAULT_FLATNESS_TOLERANCE, DEFAULT_MAX_RECURSION_DEPTH};
use crate::geom::Point;
use crate::glyph::{GlyphSource, TextRange};
use crate::path::{Path, Primitive};
use crate::path_walk::ArcLengthTable;
use crate::pixmap::{composite_mask_sample, composite_sample, Image, Mask};
use crate::raster::{rasterize, FillRule};
use crate::scene::Drawing;
use crate::shader::Texture;
use crate::stroke::{dashed_stroke_to_fill, stroke_to_fill};
use crate::transform::Transform;

/// Flatness tolerance and recursion-depth bound used throughout one render.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct RenderOptions {
    pub tolerance: f32,
    pub max_depth: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            tolerance: DEFAULT_FLATNESS_TOLERANCE,
            max_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }
}

/// One flattened unit of work for the rasterizer: geometry, already in final
/// pixel coordinates, plus the texture and fill rule to paint it with.
#[derive(Clone, Debug)]
pub struct DrawOrder {
    pub primitives: Vec<Vec<Primitive>>,
    pub texture: Texture,
    pub fill_rule: FillRule,
    pub mask: Option<Texture>,
}

#[derive(Copy, Clone, Debug)]
struct AmbientTransform {
    forward: Transform,
    inverse: Transform,
}

impl Default for AmbientTransform {
    fn default() -> Self {
        AmbientTransform {
            forward: Transform::identity(),
            inverse: Transform::identity(),
        }
    }
}

impl AmbientTransform {
    /// Composes `x` onto the ambient forward transform; falls back to an
    /// identity inverse if the composed transform isn't invertible — shading
    /// still proceeds using that identity inverse, only geometry is affected.
    fn compose(&self, x: Transform) -> AmbientTransform {
        let forward = self.forward.pre_concat(x);
        let inverse = forward.invert().unwrap_or_else(Transform::identity);
        AmbientTransform { forward, inverse }
    }
}

#[derive(Clone)]
struct RenderCtx {
    texture: Texture,
    clip: Option<Texture>,
    transform: AmbientTransform,
}

impl RenderCtx {
    fn new(initial_texture: Texture) -> Self {
        RenderCtx {
            texture: initial_texture,
            clip: None,
            transform: AmbientTransform::default(),
        }
    }
}

/// Flattens `scene` into its draw orders, in painting order — the public
/// inspection/testing entry point.
///
/// The ambient texture before any `SetTexture` is opaque black, matching the
/// common "unset paint is black" convention.
pub fn draw_orders_of(
    width: u32,
    height: u32,
    scene: &Drawing,
    glyphs: Option<&dyn GlyphSource>,
    options: RenderOptions,
) -> Vec<DrawOrder> {
    let ctx = RenderCtx::new(Texture::solid(Color::BLACK));
    let mut orders = Vec::new();
    walk(scene, &ctx, glyphs, &options, width, height, &mut orders);
    orders
}

/// Renders `scene` over an opaque `background`, returning the resulting
/// image. `None` only if `width`/`height` is zero.
pub fn render(
    width: u32,
    height: u32,
    background: Color,
    scene: &Drawing,
    glyphs: Option<&dyn GlyphSource>,
    options: RenderOptions,
) -> Option<Image> {
    let mut image = Image::filled(width, height, background.to_premultiplied_rgba8())?;
    let orders = draw_orders_of(width, height, scene, glyphs, options);
    for order in &orders {
        rasterize(
            &order.primitives,
            width,
            height,
            order.fill_rule,
            options.tolerance,
            options.max_depth,
            |x, y, coverage| {
                let center = Point::from_xy(x as f32 + 0.5, y as f32 + 0.5);
                let src = order.texture.evaluate(center);
                let mask_value = order.mask.as_ref().map(|m| m.evaluate(center).luminance());
                let dst = image.pixel(x, y).unwrap_or(crate::color::Rgba8::TRANSPARENT);
                image.set_pixel(x, y, composite_sample(dst, src, coverage, mask_value));
            },
        );
    }
    Some(image)
}

fn walk(
    drawing: &Drawing,
    ctx: &RenderCtx,
    glyphs: Option<&dyn GlyphSource>,
    options: &RenderOptions,
    width: u32,
    height: u32,
    out: &mut Vec<DrawOrder>,
) {
    match drawing {
        Drawing::SetTexture(texture, inner) => {
            let mut next = ctx.clone();
            next.texture = texture.clone();
            walk(inner, &next, glyphs, options, width, height, out);
        }
        Drawing::WithTransform(x, inner) => {
            let mut next = ctx.clone();
            next.transform = ctx.transform.compose(*x);
            walk(inner, &next, glyphs, options, width, height, out);
        }
        Drawing::WithClipping(clip_sub, inner) => {
            let mask_texture = compile_clip(clip_sub, ctx, glyphs, options, width, height);
            let mut next = ctx.clone();
            next.clip = Some(match &ctx.clip {
                Some(existing) => Texture::modulate(existing.clone(), mask_texture),
                None => mask_texture,
            });
            walk(inner, &next, glyphs, options, width, height, out);
        }
        Drawing::WithPathOrientation(path, baseline, inner) => {
            walk_with_path_orientation(path, *baseline, inner, ctx, glyphs, options, width, height, out);
        }
        Drawing::Fill(method, path) => emit_fill(ctx, *method, path, out),
        Drawing::Stroke(style, path) => {
            let fill_path = stroke_to_fill(path, style, options.tolerance, options.max_depth);
            emit_fill(ctx, FillRule::Winding, &fill_path, out);
        }
        Drawing::DashedStroke(dash, style, path) => {
            // A single merged fill over every dash run's stroked outline.
            // Disjoint dash runs never overlap, so this paints identically
            // to emitting one `Fill` per run — just as one draw order
            // instead of several.
            let fill_path = dashed_stroke_to_fill(path, dash, style, options.tolerance, options.max_depth);
            emit_fill(ctx, FillRule::Winding, &fill_path, out);
        }
        Drawing::TextFill(origin, ranges) => emit_text(ctx, *origin, ranges, glyphs, out),
        Drawing::Sequence(items) => {
            for item in items {
                walk(item, ctx, glyphs, options, width, height, out);
            }
        }
    }
}

fn emit_fill(ctx: &RenderCtx, method: FillRule, path: &Path, out: &mut Vec<DrawOrder>) {
    let transformed = path.transform(&ctx.transform.forward);
    let primitives = transformed.primitives();
    if primitives.is_empty() {
        return;
    }
    // Wrap the ambient texture with the inverse transform so per-pixel
    // lookups (in device pixel space) recover texture-space coordinates.
    let texture = Texture::with_transform(ctx.transform.inverse, ctx.texture.clone());
    out.push(DrawOrder {
        primitives,
        texture,
        fill_rule: method,
        mask: ctx.clip.clone(),
    });
}

fn emit_text(ctx: &RenderCtx, origin: Point, ranges: &[TextRange], glyphs: Option<&dyn GlyphSource>, out: &mut Vec<DrawOrder>) {
    let source = match glyphs {
        Some(source) => source,
        None => return,
    };
    let mut cursor = origin;
    for range in ranges {
        let glyph_paths = source.glyph_outlines(&range.font, range.size_pt, cursor, &range.text);
        let mut rightmost = cursor.x;
        let mut range_ctx = ctx.clone();
        if let Some(texture) = &range.texture {
            range_ctx.texture = texture.clone();
        }
        for glyph_path in &glyph_paths {
            if let Some(bounds) = glyph_path.bounds() {
                rightmost = rightmost.max(bounds.right);
            }
            emit_fill(&range_ctx, FillRule::Winding, glyph_path, out);
        }
        // Each range starts where the previous range's glyphs ended.
        cursor = Point::from_xy(rightmost, cursor.y);
    }
}

/// Renders `clip_sub` into a same-size grayscale mask (a one-shot nested
/// rasterization, ignoring whatever texture its own commands set — only
/// coverage matters for a clip) and wraps it as `Texture::Raw`.
fn compile_clip(
    clip_sub: &Drawing,
    ctx: &RenderCtx,
    glyphs: Option<&dyn GlyphSource>,
    options: &RenderOptions,
    width: u32,
    height: u32,
) -> Texture {
    let mut clip_ctx = ctx.clone();
    clip_ctx.texture = Texture::solid(Color::WHITE);
    clip_ctx.clip = None;

    let mut orders = Vec::new();
    walk(clip_sub, &clip_ctx, glyphs, options, width, height, &mut orders);

    let mut mask = match Mask::new(width, height) {
        Some(mask) => mask,
        None => return Texture::solid(Color::TRANSPARENT),
    };
    for order in &orders {
        rasterize(
            &order.primitives,
            width,
            height,
            order.fill_rule,
            options.tolerance,
            options.max_depth,
            |x, y, coverage| {
                let prev = mask.pixel(x, y).unwrap_or(Gray8(0));
                mask.set_pixel(x, y, composite_mask_sample(prev, coverage));
            },
        );
    }
    Texture::raw(Rc::new(mask))
}

/// Walks `inner`'s draw orders along `path`, offsetting perpendicular to the
/// tangent by `baseline`.
///
/// `inner` is first walked with the transform reset to identity, so its
/// primitives come back in the orientation path's own local frame; the path
/// itself is placed in the current ambient transform's space, matching the
/// "primitives are already in final pixel coordinates" invariant once
/// warping is done. Only the first contour of a multi-contour orientation
/// path is used — walking text along more than one subpath at once isn't
/// meaningfully defined.
#[allow(clippy::too_many_arguments)]
fn walk_with_path_orientation(
    path: &Path,
    baseline: f32,
    inner: &Drawing,
    ctx: &RenderCtx,
    glyphs: Option<&dyn GlyphSource>,
    options: &RenderOptions,
    width: u32,
    height: u32,
    out: &mut Vec<DrawOrder>,
) {
    let placed = path.transform(&ctx.transform.forward);
    let table = match placed.contours.first() {
        Some(contour) => ArcLengthTable::from_contour(contour, options.tolerance, options.max_depth),
        None => return,
    };
    if table.is_degenerate() {
        return;
    }

    let mut local_ctx = ctx.clone();
    local_ctx.transform = AmbientTransform::default();
    let mut local_orders = Vec::new();
    walk(inner, &local_ctx, glyphs, options, width, height, &mut local_orders);

    for order in local_orders {
        let primitives = order
            .primitives
            .iter()
            .map(|contour| contour.iter().map(|p| warp_primitive(p, &table, baseline)).collect())
            .collect();
        out.push(DrawOrder { primitives, ..order });
    }
}

fn warp_primitive(p: &Primitive, table: &ArcLengthTable, baseline: f32) -> Primitive {
    let w = |pt: Point| warp_point(pt, table, baseline);
    match *p {
        Primitive::Line(a, b) => Primitive::Line(w(a), w(b)),
        Primitive::Quadratic(a, c, b) => Primitive::Quadratic(w(a), w(c), w(b)),
        Primitive::Cubic(a, c0, c1, b) => Primitive::Cubic(w(a), w(c0), w(c1), w(b)),
    }
}

fn warp_point(p: Point, table: &ArcLengthTable, baseline: f32) -> Point {
    table.position_at(p.x, p.y + baseline).map(|(pos, _)| pos).unwrap_or(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    #[test]
    fn empty_scene_over_opaque_background_is_solid() {
        let scene = Drawing::default();
        let image = render(20, 20, Color::WHITE, &scene, None, RenderOptions::default()).unwrap();
        for y in 0..20 {
            for x in 0..20 {
                assert_eq!(image.pixel(x, y).unwrap(), crate::color::Rgba8::new(255, 255, 255, 255));
            }
        }
    }

    #[test]
    fn filled_rectangle_paints_exactly_its_area() {
        let rect = path::rectangle(5.0, 5.0, 10.0, 10.0);
        let scene = crate::scene::with_texture(
            Texture::solid(Color::from_rgba(1.0, 0.0, 0.0, 1.0)),
            crate::scene::fill(rect),
        );
        let image = render(20, 20, Color::TRANSPARENT, &scene, None, RenderOptions::default()).unwrap();
        let mut red_count = 0;
        for y in 0..20u32 {
            for x in 0..20u32 {
                let px = image.pixel(x, y).unwrap();
                if (5..15).contains(&x) && (5..15).contains(&y) {
                    assert_eq!(px, crate::color::Rgba8::new(255, 0, 0, 255));
                    red_count += 1;
                } else {
                    assert_eq!(px, crate::color::Rgba8::TRANSPARENT);
                }
            }
        }
        assert_eq!(red_count, 100);
    }

    #[test]
    fn later_draw_orders_paint_over_earlier_ones() {
        // Overlapping supports: later paints over earlier, source-over.
        let overlapping = path::rectangle(0.0, 0.0, 10.0, 10.0);
        let scene = crate::scene::Scene::new()
            .push(crate::scene::with_texture(
                Texture::solid(Color::from_rgba(1.0, 0.0, 0.0, 1.0)),
                crate::scene::fill(overlapping.clone()),
            ))
            .push(crate::scene::with_texture(
                Texture::solid(Color::from_rgba(0.0, 1.0, 0.0, 1.0)),
                crate::scene::fill(overlapping),
            ))
            .clone()
            .finish();
        let image = render(10, 10, Color::TRANSPARENT, &scene, None, RenderOptions::default()).unwrap();
        assert_eq!(image.pixel(5, 5).unwrap(), crate::color::Rgba8::new(0, 255, 0, 255));
    }

    #[test]
    fn clip_restricts_painting_to_the_clip_shape() {
        let square = path::rectangle(0.0, 0.0, 20.0, 20.0);
        let clip_circle = path::circle(Point::from_xy(10.0, 10.0), 5.0);
        let scene = crate::scene::with_texture(
            Texture::solid(Color::from_rgba(0.0, 0.0, 1.0, 1.0)),
            crate::scene::with_clip(crate::scene::fill(clip_circle), crate::scene::fill(square)),
        );
        let image = render(20, 20, Color::TRANSPARENT, &scene, None, RenderOptions::default()).unwrap();
        // Far corner, outside the clip circle, stays transparent.
        assert_eq!(image.pixel(0, 0).unwrap(), crate::color::Rgba8::TRANSPARENT);
        // Clip center is painted.
        assert_eq!(image.pixel(10, 10).unwrap().a, 255);
    }

    #[test]
    fn transform_round_trip_matches_untransformed_render() {
        let rect = path::rectangle(5.0, 5.0, 10.0, 10.0);
        let plain = crate::scene::with_texture(Texture::solid(Color::BLACK), crate::scene::fill(rect.clone()));
        let x = Transform::from_rotate(30.0).pre_translate(2.0, -3.0);
        let inv = x.invert().unwrap();
        let round_tripped = crate::scene::with_transform(
            x,
            crate::scene::with_transform(
                inv,
                crate::scene::with_texture(Texture::solid(Color::BLACK), crate::scene::fill(rect)),
            ),
        );
        let a = render(20, 20, Color::WHITE, &plain, None, RenderOptions::default()).unwrap();
        let b = render(20, 20, Color::WHITE, &round_tripped, None, RenderOptions::default()).unwrap();
        let mut max_diff = 0i32;
        for y in 0..20u32 {
            for x in 0..20u32 {
                let pa = a.pixel(x, y).unwrap();
                let pb = b.pixel(x, y).unwrap();
                max_diff = max_diff.max((pa.a as i32 - pb.a as i32).abs());
            }
        }
        assert!(max_diff <= 1, "max alpha diff was {max_diff}");
    }
}
