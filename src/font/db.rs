//! Font database.
//!
//! Wraps a `fontdb::Database` so callers can find a font by family instead of by path:
//! - Load system fonts (cross-platform) or individual files/blobs.
//! - Resolve a `FontQuery` (families/weight/italic) with generic-family fallback.
//! - Hand back the resolved face as a `FontFace` (collection index included).

use std::sync::Arc;

use fontdb::{Database, Family, ID, Query, Stretch, Style, Weight};

use crate::font::{FontError, FontFace};

/// Simplified font style selection.
#[derive(Debug, Clone)]
pub struct FontQuery {
    /// Preferred font family names, in priority order.
    /// Generic names (`serif`, `sans-serif`, `monospace`) are understood.
    pub families: Vec<String>,

    /// Weight in CSS-ish terms (100..900). Common:
    /// - 400 = regular
    /// - 700 = bold
    pub weight: u16,

    /// Italic / oblique.
    pub italic: bool,
}

impl Default for FontQuery {
    fn default() -> Self {
        Self {
            families: vec![
                "DejaVu Sans".to_string(),
                "Liberation Sans".to_string(),
                "Arial".to_string(),
                "sans-serif".to_string(),
            ],
            weight: 400,
            italic: false,
        }
    }
}

impl FontQuery {
    pub fn family(name: impl Into<String>) -> Self {
        Self {
            families: vec![name.into()],
            ..Default::default()
        }
    }
}

/// Owned font database.
#[derive(Debug, Default)]
pub struct FontDatabase {
    db: Database,
}

impl FontDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self { db: Database::new() }
    }

    /// Create a database populated with the system's fonts.
    pub fn with_system_fonts() -> Result<Self, FontError> {
        let mut this = Self::new();
        this.load_system_fonts();

        if this.is_empty() {
            return Err(FontError::NoFontsAvailable);
        }
        Ok(this)
    }

    pub fn load_system_fonts(&mut self) {
        self.db.load_system_fonts();
        log::debug!("font database: {} faces after system scan", self.db.len());
    }

    /// Add every face of an in-memory font.
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.db.load_font_data(data);
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Resolve `query` to a face id.
    ///
    /// Resolution strategy:
    /// - Try each named family in order with the requested weight/style.
    /// - Fall back to generic `sans-serif`.
    /// - If still not found, fall back to the first face in the database.
    fn resolve_id(&self, query: &FontQuery) -> Result<ID, FontError> {
        let Some(first) = self.db.faces().next() else {
            return Err(FontError::NoFontsAvailable);
        };

        let style = if query.italic {
            Style::Italic
        } else {
            Style::Normal
        };
        let weight = Weight(query.weight.clamp(1, 1000));

        let families: Vec<Family<'_>> = query
            .families
            .iter()
            .map(|f| f.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.eq_ignore_ascii_case("serif") {
                    Family::Serif
                } else if s.eq_ignore_ascii_case("sans-serif") || s.eq_ignore_ascii_case("sans") {
                    Family::SansSerif
                } else if s.eq_ignore_ascii_case("monospace") || s.eq_ignore_ascii_case("mono") {
                    Family::Monospace
                } else {
                    Family::Name(s)
                }
            })
            .collect();

        let query_with = |families: &[Family<'_>]| {
            self.db.query(&Query {
                families,
                weight,
                style,
                stretch: Stretch::Normal,
            })
        };

        let id = query_with(&families[..])
            .or_else(|| query_with(&[Family::SansSerif][..]))
            .unwrap_or(first.id);

        log::debug!(
            "resolved {:?} to {:?}",
            query.families,
            self.db.face(id).map(|f| f.post_script_name.as_str())
        );
        Ok(id)
    }

    /// Resolve `query` and open the face, whatever its source (file, shared file, memory).
    ///
    /// The face keeps its index, so a face inside a collection opens as itself.
    pub fn resolve_face(&self, query: &FontQuery) -> Result<FontFace, FontError> {
        let id = self.resolve_id(query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::from_bytes(Arc::from(data), index))
            .ok_or_else(|| FontError::ResolveFailed(query.clone()))?
    }
}
