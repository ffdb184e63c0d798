//! In-memory collaborators for unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Mat4;

use crate::font::{GlyphHMetrics, OutlineSource, PathCommand, Point2D};
use crate::mesh::Vertex3D;
use crate::text::cache::MeshUploader;
use crate::text::layout::DrawTarget;

/// Clockwise square of side `size` with its corner at the origin, TrueType style
/// (start point repeated before the close).
pub fn square_commands(size: f32) -> Vec<PathCommand> {
    vec![
        PathCommand::MoveTo(Point2D::new(0.0, 0.0)),
        PathCommand::LineTo(Point2D::new(0.0, size)),
        PathCommand::LineTo(Point2D::new(size, size)),
        PathCommand::LineTo(Point2D::new(size, 0.0)),
        PathCommand::LineTo(Point2D::new(0.0, 0.0)),
        PathCommand::Close,
    ]
}

/// Outline source backed by a table of hand-written glyphs.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    glyphs: HashMap<char, (u16, Vec<PathCommand>, f32)>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_glyph(mut self, ch: char, commands: Vec<PathCommand>, advance: f32) -> Self {
        let id = self.glyphs.len() as u16 + 1;
        self.glyphs.insert(ch, (id, commands, advance));
        self
    }
}

impl OutlineSource for ScriptedSource {
    fn glyph_index(&self, ch: char) -> Option<u16> {
        self.glyphs.get(&ch).map(|(id, _, _)| *id)
    }

    fn glyph_outline(&self, glyph: u16) -> Vec<PathCommand> {
        self.glyphs
            .values()
            .find(|(id, _, _)| *id == glyph)
            .map(|(_, cmds, _)| cmds.clone())
            .unwrap_or_default()
    }

    fn h_metrics(&self, ch: char) -> GlyphHMetrics {
        self.glyphs
            .get(&ch)
            .map(|(_, _, advance)| GlyphHMetrics {
                advance_width: *advance,
                left_side_bearing: 0.0,
            })
            .unwrap_or_default()
    }
}

/// Buffers handle that logs its label when dropped.
#[derive(Debug)]
pub struct RecordedBuffers {
    pub label: String,
    released: Rc<RefCell<Vec<String>>>,
}

impl Drop for RecordedBuffers {
    fn drop(&mut self) {
        self.released.borrow_mut().push(self.label.clone());
    }
}

#[derive(Debug, Default)]
pub struct RecordingUploader {
    uploaded: Vec<String>,
    released: Rc<RefCell<Vec<String>>>,
}

impl RecordingUploader {
    pub fn uploads(&self) -> usize {
        self.uploaded.len()
    }

    pub fn released(&self) -> Vec<String> {
        self.released.borrow().clone()
    }
}

impl MeshUploader for RecordingUploader {
    type Buffers = RecordedBuffers;

    fn upload(&mut self, label: &str, _vertices: &[Vertex3D], _indices: &[u32]) -> RecordedBuffers {
        self.uploaded.push(label.to_string());
        RecordedBuffers {
            label: label.to_string(),
            released: Rc::clone(&self.released),
        }
    }
}

/// Draw target that records every draw call.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub draws: Vec<(String, u32, Mat4)>,
}

impl<'a> DrawTarget<'a, RecordedBuffers> for RecordingTarget {
    fn draw_indexed(&mut self, buffers: &'a RecordedBuffers, index_count: u32, transform: Mat4) {
        self.draws.push((buffers.label.clone(), index_count, transform));
    }
}
