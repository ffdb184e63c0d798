//! Extruded text viewer.
//!
//! Run:
//! - `cargo run -- path/to/font.ttf [text]`
//! - `cargo run` (picks a system sans-serif face via fontdb)

use std::path::PathBuf;

use anyhow::Context as _;

use relief::font::db::{FontDatabase, FontQuery};
use relief::render::app::{AppConfig, run};
use relief::render::viewer::{FontChoice, ViewerScene};

fn main() -> anyhow::Result<()> {
    // Keep logging setup in the binary so the library remains unopinionated.
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let font = match args.next() {
        Some(p) => FontChoice::File(PathBuf::from(p)),
        None => {
            let db = FontDatabase::with_system_fonts().context("font: no system fonts")?;
            let face = db
                .resolve_face(&FontQuery::default())
                .context("font: failed to resolve a default face")?;
            FontChoice::Face(face)
        }
    };
    let text = args.next().unwrap_or_else(|| "KLAPPA".to_string());

    run(
        AppConfig {
            title: "relief: extruded text".to_string(),
            ..Default::default()
        },
        ViewerScene::new(font, text),
    )
}
