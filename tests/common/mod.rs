//! Shared fixtures for integration tests.
//!
//! `test_font()` assembles a tiny TrueType font in memory (`cmap`, `glyf`, `head`, `hhea`,
//! `hmtx`, `loca`, `maxp`), so tests exercise the real ttf-parser path without binary
//! fixtures in the repository.
//!
//! Glyphs:
//! - 0 `.notdef`: empty
//! - 1 space (U+0020): empty, advance 250
//! - 2 `H`: one clockwise square (50,0)..(550,700), advance 600, lsb 50
//! - 3 `O`: 600x700 square with a 300x400 square hole, advance 700
//! - 4 `D`: straight back and a quadratic bowl, advance 650
//!
//! Every other code in 32..=79 maps to glyph 0; codes above 79 are unmapped.
//!
//! `test_collection()` wraps two faces in a `ttcf` collection: face 0 is the font above,
//! face 1 has the same glyphs but maps only the space and `O`.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::Write as _;
use std::rc::Rc;

use glam::Mat4;
use relief::Vertex3D;
use relief::text::cache::MeshUploader;
use relief::text::layout::DrawTarget;

pub const UNITS_PER_EM: u16 = 1000;

pub const SPACE_ADVANCE: f32 = 250.0;
pub const H_ADVANCE: f32 = 600.0;
pub const H_LSB: f32 = 50.0;
pub const O_ADVANCE: f32 = 700.0;
pub const D_ADVANCE: f32 = 650.0;

/// (x, y, on_curve)
type GlyphPoint = (i16, i16, bool);

/// Character code -> glyph id.
const FULL_MAP: &[(u8, u16)] = &[(b' ', 1), (b'H', 2), (b'O', 3), (b'D', 4)];
const O_ONLY_MAP: &[(u8, u16)] = &[(b' ', 1), (b'O', 3)];

fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn push_i16(out: &mut Vec<u8>, v: i16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn pad4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

/// Encode a simple `glyf` entry with 16-bit coordinate deltas.
fn simple_glyph(contours: &[&[GlyphPoint]]) -> Vec<u8> {
    let all: Vec<GlyphPoint> = contours.iter().flat_map(|c| c.iter().copied()).collect();
    let x_min = all.iter().map(|p| p.0).min().unwrap_or(0);
    let y_min = all.iter().map(|p| p.1).min().unwrap_or(0);
    let x_max = all.iter().map(|p| p.0).max().unwrap_or(0);
    let y_max = all.iter().map(|p| p.1).max().unwrap_or(0);

    let mut out = Vec::new();
    push_i16(&mut out, contours.len() as i16);
    push_i16(&mut out, x_min);
    push_i16(&mut out, y_min);
    push_i16(&mut out, x_max);
    push_i16(&mut out, y_max);

    let mut end = 0u16;
    for c in contours {
        end += c.len() as u16;
        push_u16(&mut out, end - 1);
    }
    push_u16(&mut out, 0); // no instructions

    for p in &all {
        out.push(if p.2 { 0x01 } else { 0x00 });
    }

    let (mut px, mut py) = (0i16, 0i16);
    for p in &all {
        push_i16(&mut out, p.0 - px);
        px = p.0;
    }
    for p in &all {
        push_i16(&mut out, p.1 - py);
        py = p.1;
    }

    out
}

fn glyphs() -> Vec<Vec<u8>> {
    let h: &[GlyphPoint] = &[(50, 0, true), (50, 700, true), (550, 700, true), (550, 0, true)];
    let o_outer: &[GlyphPoint] = &[(0, 0, true), (0, 700, true), (600, 700, true), (600, 0, true)];
    let o_inner: &[GlyphPoint] = &[
        (150, 150, true),
        (450, 150, true),
        (450, 550, true),
        (150, 550, true),
    ];
    let d: &[GlyphPoint] = &[
        (0, 0, true),
        (0, 700, true),
        (300, 700, true),
        (600, 350, false),
        (300, 0, true),
    ];

    vec![
        Vec::new(),
        Vec::new(),
        simple_glyph(&[h]),
        simple_glyph(&[o_outer, o_inner]),
        simple_glyph(&[d]),
    ]
}

fn cmap(map: &[(u8, u16)]) -> Vec<u8> {
    const FIRST: u16 = 32;
    const COUNT: u16 = 48; // 32..=79

    let mut out = Vec::new();
    push_u16(&mut out, 0); // version
    push_u16(&mut out, 1); // one encoding record
    push_u16(&mut out, 0); // platform: Unicode
    push_u16(&mut out, 3); // encoding: BMP
    push_u32(&mut out, 12);

    push_u16(&mut out, 6); // format 6: trimmed table
    push_u16(&mut out, 10 + 2 * COUNT);
    push_u16(&mut out, 0); // language
    push_u16(&mut out, FIRST);
    push_u16(&mut out, COUNT);
    for code in FIRST..FIRST + COUNT {
        let gid = map
            .iter()
            .find(|(c, _)| u16::from(*c) == code)
            .map_or(0, |&(_, gid)| gid);
        push_u16(&mut out, gid);
    }
    out
}

fn head() -> Vec<u8> {
    let mut out = Vec::new();
    push_u32(&mut out, 0x0001_0000); // version
    push_u32(&mut out, 0x0001_0000); // font revision
    push_u32(&mut out, 0); // checksum adjustment
    push_u32(&mut out, 0x5F0F_3CF5); // magic
    push_u16(&mut out, 0); // flags
    push_u16(&mut out, UNITS_PER_EM);
    out.extend_from_slice(&[0; 16]); // created, modified
    push_i16(&mut out, 0);
    push_i16(&mut out, 0);
    push_i16(&mut out, 600);
    push_i16(&mut out, 700);
    push_u16(&mut out, 0); // mac style
    push_u16(&mut out, 8); // lowest rec ppem
    push_i16(&mut out, 2); // direction hint
    push_i16(&mut out, 1); // long loca
    push_i16(&mut out, 0); // glyph data format
    out
}

fn hhea(number_of_metrics: u16) -> Vec<u8> {
    let mut out = Vec::new();
    push_u32(&mut out, 0x0001_0000);
    push_i16(&mut out, 800); // ascender
    push_i16(&mut out, -200); // descender
    push_i16(&mut out, 0); // line gap
    out.extend_from_slice(&[0; 24]);
    push_u16(&mut out, number_of_metrics);
    out
}

fn hmtx() -> Vec<u8> {
    let metrics: [(u16, i16); 5] = [
        (500, 0),
        (SPACE_ADVANCE as u16, 0),
        (H_ADVANCE as u16, H_LSB as i16),
        (O_ADVANCE as u16, 0),
        (D_ADVANCE as u16, 0),
    ];
    let mut out = Vec::new();
    for (advance, lsb) in metrics {
        push_u16(&mut out, advance);
        push_i16(&mut out, lsb);
    }
    out
}

fn maxp(num_glyphs: u16) -> Vec<u8> {
    let mut out = Vec::new();
    push_u32(&mut out, 0x0000_5000);
    push_u16(&mut out, num_glyphs);
    out
}

/// Bytes of the test font described in the module docs.
pub fn test_font() -> Vec<u8> {
    font_at(0, FULL_MAP)
}

/// Two-face collection described in the module docs.
pub fn test_collection() -> Vec<u8> {
    const HEADER: usize = 12 + 2 * 4;

    let first = font_at(HEADER, FULL_MAP);
    let second = font_at(HEADER + first.len(), O_ONLY_MAP);

    let mut out = Vec::new();
    out.extend_from_slice(b"ttcf");
    push_u32(&mut out, 0x0001_0000);
    push_u32(&mut out, 2);
    push_u32(&mut out, HEADER as u32);
    push_u32(&mut out, (HEADER + first.len()) as u32);
    out.extend_from_slice(&first);
    out.extend_from_slice(&second);
    out
}

/// One face whose table offsets assume it starts `base` bytes into the file.
fn font_at(base: usize, map: &[(u8, u16)]) -> Vec<u8> {
    let glyphs = glyphs();

    let mut glyf = Vec::new();
    let mut loca = Vec::new();
    for g in &glyphs {
        push_u32(&mut loca, glyf.len() as u32);
        glyf.extend_from_slice(g);
        pad4(&mut glyf);
    }
    push_u32(&mut loca, glyf.len() as u32);

    let num_glyphs = glyphs.len() as u16;

    // Sorted by tag: lookups binary-search the table records.
    let tables: Vec<(&[u8; 4], Vec<u8>)> = vec![
        (b"cmap", cmap(map)),
        (b"glyf", glyf),
        (b"head", head()),
        (b"hhea", hhea(num_glyphs)),
        (b"hmtx", hmtx()),
        (b"loca", loca),
        (b"maxp", maxp(num_glyphs)),
    ];

    let num_tables = tables.len() as u16;
    let mut out = Vec::new();
    push_u32(&mut out, 0x0001_0000);
    push_u16(&mut out, num_tables);
    push_u16(&mut out, 64); // search range
    push_u16(&mut out, 2); // entry selector
    push_u16(&mut out, num_tables * 16 - 64); // range shift

    let directory = 12 + 16 * tables.len();
    let mut offset = base + directory;
    let mut body = Vec::new();
    for (tag, data) in &tables {
        out.extend_from_slice(&tag[..]);
        push_u32(&mut out, 0); // checksum (unchecked)
        push_u32(&mut out, offset as u32);
        push_u32(&mut out, data.len() as u32);

        body.extend_from_slice(data);
        pad4(&mut body);
        offset = base + directory + body.len();
    }

    out.extend_from_slice(&body);
    out
}

/// Write `test_font()` to a temp file that lives as long as the returned handle.
pub fn test_font_file() -> tempfile::NamedTempFile {
    write_temp(&test_font(), ".ttf")
}

/// Write `test_collection()` to a temp file.
pub fn test_collection_file() -> tempfile::NamedTempFile {
    write_temp(&test_collection(), ".ttc")
}

fn write_temp(bytes: &[u8], suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp font file");
    file.write_all(bytes).expect("write temp font file");
    file.flush().expect("flush temp font file");
    file
}

/// Uploaded mesh stand-in; records its label on drop.
#[derive(Debug)]
pub struct FakeBuffers {
    pub label: String,
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
    released: Rc<RefCell<Vec<String>>>,
}

impl Drop for FakeBuffers {
    fn drop(&mut self) {
        self.released.borrow_mut().push(self.label.clone());
    }
}

#[derive(Debug, Default, Clone)]
pub struct FakeUploader {
    pub released: Rc<RefCell<Vec<String>>>,
}

impl MeshUploader for FakeUploader {
    type Buffers = FakeBuffers;

    fn upload(&mut self, label: &str, vertices: &[Vertex3D], indices: &[u32]) -> FakeBuffers {
        FakeBuffers {
            label: label.to_string(),
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
            released: Rc::clone(&self.released),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub draws: Vec<(String, u32, Mat4)>,
}

impl<'a> DrawTarget<'a, FakeBuffers> for RecordingTarget {
    fn draw_indexed(&mut self, buffers: &'a FakeBuffers, index_count: u32, transform: Mat4) {
        self.draws.push((buffers.label.clone(), index_count, transform));
    }
}
