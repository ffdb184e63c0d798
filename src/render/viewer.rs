//! Extruded text viewer state.
//!
//! One string of extruded glyphs, centred on the origin:
//! - perspective camera at (0, 0, 15) looking at the origin
//! - `Turntable` spin around Y with a gentle nod around X
//! - depth-tested glyph pipeline cleared to the shader's shadow tint

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use winit::window::Window;

use crate::font::FontFace;
use crate::render::glyph_renderer::{GlyphBatch, GlyphPipeline, WgpuUploader};
use crate::render::gpu::Gpu;
use crate::render::turntable::Turntable;
use crate::text::TextRenderer3D;
use crate::text::cache::MeshUploader;
use crate::text::layout::TextParams;

/// Clear color; matches the shadow tint in the glyph shader.
const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.188,
    g: 0.003,
    b: 0.314,
    a: 1.0,
};

const EYE: Vec3 = Vec3::new(0.0, 0.0, 15.0);
const FOV_Y_DEG: f32 = 45.0;

/// Where the viewer's glyphs come from.
#[derive(Debug, Clone)]
pub enum FontChoice {
    /// First face of the font file at this path.
    File(PathBuf),
    /// An opened face; keeps its collection index (e.g. from `FontDatabase::resolve_face`).
    Face(FontFace),
}

impl FontChoice {
    /// Build glyph meshes into `text`. Returns the number of cached glyphs.
    pub fn load_into<U: MeshUploader>(&self, text: &mut TextRenderer3D<U>) -> anyhow::Result<usize> {
        match self {
            FontChoice::File(path) => {
                if !text.load_font(path) {
                    anyhow::bail!("font: could not load {}", path.display());
                }
            }
            FontChoice::Face(face) => {
                let report = text.load_source(face);
                log::info!(
                    "face #{}: {} glyphs built, {} missing, {} empty, {} failed",
                    face.index(),
                    report.built,
                    report.missing,
                    report.empty,
                    report.failed
                );
            }
        }
        Ok(text.cache().len())
    }
}

impl fmt::Display for FontChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontChoice::File(path) => write!(f, "{}", path.display()),
            FontChoice::Face(face) => write!(f, "resolved face #{}", face.index()),
        }
    }
}

/// What the viewer shows.
#[derive(Debug, Clone)]
pub struct ViewerScene {
    pub font: FontChoice,
    pub message: String,
    /// Font units -> world units.
    pub scale: f32,
    pub depth_scale: f32,
}

impl ViewerScene {
    pub fn new(font: FontChoice, message: impl Into<String>) -> Self {
        Self {
            font,
            message: message.into(),
            scale: 0.005,
            depth_scale: 1.0,
        }
    }
}

/// Placement that centres `width` (world units) horizontally, baseline just below the origin.
pub fn centred_params(width: f32, scale: f32, depth_scale: f32) -> TextParams {
    TextParams {
        origin_x: -0.5 * width,
        origin_y: -0.5,
        scale,
        depth_scale,
    }
}

/// `projection * view` for the fixed camera.
pub fn view_projection(aspect: f32) -> Mat4 {
    let projection = Mat4::perspective_rh(FOV_Y_DEG.to_radians(), aspect, 0.1, 100.0);
    let view = Mat4::look_at_rh(EYE, Vec3::ZERO, Vec3::Y);
    projection * view
}

pub struct Viewer {
    window: Arc<Window>,
    gpu: Gpu,

    text: TextRenderer3D<WgpuUploader>,
    pipeline: GlyphPipeline,
    message: String,
    params: TextParams,

    turntable: Turntable,
}

impl Viewer {
    pub async fn new(window: Arc<Window>, scene: ViewerScene) -> anyhow::Result<Self> {
        let gpu = Gpu::new(window.clone()).await?;

        let mut text = TextRenderer3D::new(WgpuUploader::new(&gpu.device));
        let glyphs = scene.font.load_into(&mut text)?;
        log::info!("{glyphs} glyph meshes ready from {}", scene.font);

        let width = text.measure_text(&scene.message, scene.scale);
        let params = centred_params(width, scene.scale, scene.depth_scale);

        let pipeline = GlyphPipeline::new(&gpu)?;

        Ok(Self {
            window,
            gpu,
            text,
            pipeline,
            message: scene.message,
            params,
            turntable: Turntable::default(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    /// Draw one frame. Recoverable surface errors just schedule another frame.
    pub fn render(&mut self) -> anyhow::Result<()> {
        let (surface_texture, view) = match self.gpu.acquire_frame() {
            Ok(v) => v,
            Err(wgpu::SurfaceError::Outdated)
            | Err(wgpu::SurfaceError::Lost)
            | Err(wgpu::SurfaceError::Other) => {
                self.gpu.resize(self.gpu.size);
                self.window.request_redraw();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                self.window.request_redraw();
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow::anyhow!("wgpu SurfaceError::OutOfMemory"));
            }
        };

        let model = self.turntable.model();
        let mut batch = GlyphBatch::new(model);
        self.text.render_text(
            &self.message,
            &self.params,
            view_projection(self.gpu.aspect()) * model,
            &mut batch,
        );

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Text Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Text Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.pipeline.draw(&self.gpu, &mut pass, &batch);
        }

        self.gpu.queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        surface_texture.present();

        self.window.request_redraw();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::test_support::RecordingUploader;

    #[test]
    fn missing_file_is_an_error() {
        let mut text = TextRenderer3D::new(RecordingUploader::default());
        let choice = FontChoice::File(PathBuf::from("/no/such/font.ttf"));
        assert!(choice.load_into(&mut text).is_err());
        assert!(text.cache().is_empty());
    }

    #[test]
    fn centred_params_straddle_the_origin() {
        let p = centred_params(4.0, 0.01, 2.0);
        assert_eq!(p.origin_x, -2.0);
        assert_eq!(p.origin_y, -0.5);
        assert_eq!(p.scale, 0.01);
        assert_eq!(p.depth_scale, 2.0);
    }

    #[test]
    fn origin_projects_to_screen_centre() {
        let clip = view_projection(16.0 / 9.0) * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
