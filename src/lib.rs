/*!
`vraster` is a 2D vector rasterizer: a scene recorder, stroke-to-fill
converter, curve flattener, scanline edge rasterizer with analytic coverage,
shader/texture evaluator, compositor, and path walker for text-on-path.

It does not load fonts, decode images, or encode output — those are the
caller's job, via the [`GlyphSource`] collaborator interface and [`Image`]'s
raw-bytes accessor.
*/

#![warn(missing_debug_implementations)]
#![allow(clippy::too_many_arguments)]

mod color;
mod driver;
mod flatten;
mod geom;
mod glyph;
mod path;
mod path_walk;
mod pixmap;
mod raster;
mod scene;
mod shader;
mod stroke;
mod transform;

pub use color::{Color, Gray8, Pixel, Rgba8};
pub use driver::{draw_orders_of, render, DrawOrder, RenderOptions};
pub use flatten::{DEFAULT_FLATNESS_TOLERANCE, DEFAULT_MAX_RECURSION_DEPTH};
pub use geom::{BBox, Point};
pub use glyph::{GlyphSource, TextRange};
pub use path::{
    circle, ellipse, line, polygon, polyline, rectangle, rounded_rectangle, Contour, Path, PathBuilder, PathCommand,
    Primitive,
};
pub use pixmap::{Image, Mask, Pixmap};
pub use raster::{rasterize, FillRule};
pub use scene::{
    dashed_stroke, fill, fill_with_method, print_text, stroke, with_clip, with_path_orientation, with_texture,
    with_transform, Drawing, Scene,
};
pub use shader::{Gradient, GradientStop, SpreadMode, Texture};
pub use stroke::{dash_path, dashed_stroke_to_fill, stroke_to_fill, DashPattern, LineCap, LineJoin, Stroke};
pub use transform::Transform;
