// Copyright 2026 the vraster authors.
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The glyph-outline external collaborator interface.
//!
//! This crate does not shape or rasterize fonts itself — `TextFill`
//! delegates to whatever implements [`GlyphSource`] to turn `(font, size,
//! text)` into filled outlines, the same boundary a shaping/hinting library
//! draws against a paint backend that only consumes the resulting curves.

use crate::geom::Point;
use crate::path::Path;
use crate::shader::Texture;

/// Produces glyph outlines for a run of text.
///
/// Implementations own font loading, shaping and hinting; this crate only
/// walks the resulting outlines (cubic/quadratic Bézier contours, in the
/// same pixel space as everything else) through the ordinary fill pipeline.
pub trait GlyphSource {
    /// Returns one [`Path`] per glyph in `text`, already positioned starting
    /// at `origin` (baseline origin, per the external interface's
    /// `glyphs(font, sizePt, origin, text)` signature).
    ///
    /// An implementation with no such font, or for empty `text`, returns an
    /// empty `Vec` — never an error; `TextFill` over no glyphs is simply a
    /// no-op draw order.
    fn glyph_outlines(&self, font: &str, size_pt: f32, origin: Point, text: &str) -> Vec<Path>;
}

/// One contiguous run of text within a `TextFill`, with its own font, size
/// and (optionally) its own texture — distinct ranges of a `printText` call
/// may be styled differently.
#[derive(Clone, Debug)]
pub struct TextRange {
    pub font: String,
    pub size_pt: f32,
    pub text: String,
    pub texture: Option<Texture>,
}

impl TextRange {
    pub fn new(font: impl Into<String>, size_pt: f32, text: impl Into<String>) -> Self {
        TextRange {
            font: font.into(),
            size_pt,
            text: text.into(),
            texture: None,
        }
    }

    /// Overrides the ambient texture for just this range.
    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }
}
