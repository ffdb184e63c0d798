//! `relief` library crate root.
//!
//! Extruded 3D glyph meshes from font outlines, and a single-baseline text renderer
//! that draws them.
//!
//! Pipeline (leaf-first):
//! - `font`: outline source (`FontFace` over ttf-parser), curve flattening, contour
//!   assembly, triangulation (lyon)
//! - `mesh`: extrusion of a triangulated outline into a closed solid
//! - `text`: per-character mesh cache, layout, and the `TextRenderer3D` entrypoint
//! - `render`: wgpu/winit backend (uploader, glyph pipeline, viewer, app runner)
//!
//! The binary target stays thin and calls into these modules. Logging is left to the
//! caller: the library only emits `log` records.

pub mod font;
pub mod mesh;
pub mod render;
pub mod text;

pub use font::{FontError, FontFace, OutlineSource};
pub use mesh::{MeshData, MeshOptions, Vertex3D};
pub use text::TextRenderer3D;
pub use text::cache::{GlyphCache, SUPPORTED_CODES};
pub use text::layout::TextParams;
