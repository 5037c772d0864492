// Copyright 2026 the vraster authors.
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The recorded scene tree and its construction combinators.
//!
//! [`Drawing`] is a recursive command tree rather than a flat command list:
//! ambient state (texture, transform, clip, path orientation) nests by
//! scope instead of applying uniformly to every subsequent command, so each
//! scoping combinator wraps an inner `Drawing` rather than appending to a
//! shared sequence.

use crate::geom::Point;
use crate::glyph::TextRange;
use crate::path::Path;
use crate::raster::FillRule;
use crate::shader::Texture;
use crate::stroke::{DashPattern, Stroke};
use crate::transform::Transform;

/// A recorded scene command. Recursive: every combinator that scopes an
/// ambient value (texture, transform, clip, path orientation) wraps an
/// inner `Drawing`.
#[derive(Clone, Debug)]
pub enum Drawing {
    SetTexture(Texture, Box<Drawing>),
    WithTransform(Transform, Box<Drawing>),
    WithClipping(Box<Drawing>, Box<Drawing>),
    /// `(path, baseline offset, sub)`: re-lays `sub`'s geometry along `path`.
    WithPathOrientation(Path, f32, Box<Drawing>),
    Fill(FillRule, Path),
    Stroke(Stroke, Path),
    DashedStroke(DashPattern, Stroke, Path),
    TextFill(Point, Vec<TextRange>),
    /// Commands painted strictly in order, later over earlier.
    Sequence(Vec<Drawing>),
}

impl Default for Drawing {
    /// The empty scene: an empty sequence, painting nothing.
    fn default() -> Self {
        Drawing::Sequence(Vec::new())
    }
}

/// Fills `path` with the non-zero winding rule.
pub fn fill(path: Path) -> Drawing {
    Drawing::Fill(FillRule::Winding, path)
}

/// Fills `path` with an explicit fill rule.
pub fn fill_with_method(method: FillRule, path: Path) -> Drawing {
    Drawing::Fill(method, path)
}

/// Strokes `path`, converted to a fill by the driver.
pub fn stroke(style: Stroke, path: Path) -> Drawing {
    Drawing::Stroke(style, path)
}

/// Strokes `path` with a dash pattern applied before offsetting.
pub fn dashed_stroke(dash: DashPattern, style: Stroke, path: Path) -> Drawing {
    Drawing::DashedStroke(dash, style, path)
}

/// Replaces the ambient texture for `inner` only.
pub fn with_texture(texture: Texture, inner: Drawing) -> Drawing {
    Drawing::SetTexture(texture, Box::new(inner))
}

/// Clips `inner` to the coverage produced by rendering `clip`.
pub fn with_clip(clip: Drawing, inner: Drawing) -> Drawing {
    Drawing::WithClipping(Box::new(clip), Box::new(inner))
}

/// Composes `transform` onto the ambient transform for `inner`.
pub fn with_transform(transform: Transform, inner: Drawing) -> Drawing {
    Drawing::WithTransform(transform, Box::new(inner))
}

/// Walks `inner`'s draw orders along `path`, offset perpendicular to the
/// tangent by `baseline` — used to bend text (or any other
/// sub-scene) along a curve.
pub fn with_path_orientation(path: Path, baseline: f32, inner: Drawing) -> Drawing {
    Drawing::WithPathOrientation(path, baseline, Box::new(inner))
}

/// Fills glyph outlines for each text range, starting at `origin`.
pub fn print_text(origin: Point, ranges: Vec<TextRange>) -> Drawing {
    Drawing::TextFill(origin, ranges)
}

/// A mutable recorder for building up a [`Drawing::Sequence`] one command at
/// a time — convenience over constructing `Sequence(vec![...])` directly.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    drawings: Vec<Drawing>,
}

impl Scene {
    pub fn new() -> Self {
        Scene::default()
    }

    /// Appends a command, to be painted after everything already recorded.
    pub fn push(&mut self, drawing: Drawing) -> &mut Self {
        self.drawings.push(drawing);
        self
    }

    /// Consumes the recorder, producing one `Drawing`.
    pub fn finish(self) -> Drawing {
        Drawing::Sequence(self.drawings)
    }
}
