use std::{path::Path, sync::Arc};

use anyhow::{Context, Result, anyhow};
use folio_core::config::FontsConfig;
use resvg::usvg::fontdb::{Database, Family, Query, Weight};

/// Font faces available to the renderer. Loaded once and shared read-only.
#[derive(Clone)]
pub struct Fonts {
    family: String,
    db: Arc<Database>,
}

impl Fonts {
    /// Read the regular and bold faces named in the configuration.
    pub fn load(config: &FontsConfig) -> Result<Self> {
        let regular = read_font(&config.regular)?;
        let bold = read_font(&config.bold)?;
        Self::from_data(&config.family, [regular, bold])
    }

    pub fn from_data(family: &str, faces: impl IntoIterator<Item = Vec<u8>>) -> Result<Self> {
        let mut db = Database::new();
        for data in faces {
            let before = db.len();
            db.load_font_data(data);
            if db.len() == before {
                return Err(anyhow!("Font data contains no usable faces"));
            }
        }
        for weight in [Weight::NORMAL, Weight::BOLD] {
            let query = Query { families: &[Family::Name(family)], weight, ..Query::default() };
            if db.query(&query).is_none() {
                tracing::warn!("No face for {} at weight {}", family, weight.0);
            }
        }
        Ok(Self { family: family.to_string(), db: Arc::new(db) })
    }

    /// No faces at all; text elements are skipped when rendering.
    pub fn empty(family: &str) -> Self {
        Self { family: family.to_string(), db: Arc::new(Database::new()) }
    }

    pub fn family(&self) -> &str { &self.family }

    pub fn database(&self) -> Arc<Database> { self.db.clone() }

    pub fn face_count(&self) -> usize { self.db.len() }
}

fn read_font(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))
}
