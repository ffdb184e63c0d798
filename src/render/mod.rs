//! Rendering module root.
//!
//! The `render` module owns the window/event-loop integration and the wgpu side of
//! glyph drawing. Mesh building and layout stay backend-agnostic in `mesh` / `text`.

/// winit runner for the viewer.
pub mod app;

/// Device, surface, and depth target.
pub mod gpu;

/// Extruded glyph pipeline plus the wgpu `MeshUploader` / `DrawTarget` implementations.
pub mod glyph_renderer;

/// Time-driven model rotation for the showcase.
pub mod turntable;

/// Extruded text viewer state (camera, pass setup).
pub mod viewer;
