//! One-time load of the game resource.

use std::path::Path;

use terrain_logic::catalog::ProgressionCatalog;

use crate::bestiary::Bestiary;

#[derive(Debug, Default)]
pub struct GameData {
    catalog: ProgressionCatalog,
    loaded: bool,
}

impl GameData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse resource text. Always succeeds; malformed lines are skipped.
    pub fn load_from_str(&mut self, text: &str) -> bool {
        self.catalog = ProgressionCatalog::from_text(text);
        self.loaded = true;
        log::info!("Loaded game resource: {} entries", self.catalog.store().len());
        true
    }

    /// Read and parse a resource file. Returns false if it cannot be read;
    /// the previous catalog is kept in that case.
    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => self.load_from_str(&text),
            Err(e) => {
                log::error!("Failed to load game resource {}: {}", path.display(), e);
                false
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn catalog(&self) -> &ProgressionCatalog {
        &self.catalog
    }

    pub fn bestiary(&self, total_bosses: u32) -> Bestiary {
        Bestiary::from_catalog(&self.catalog, total_bosses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_str() {
        let mut data = GameData::new();
        assert!(!data.is_loaded());
        assert!(data.load_from_str("mission.ali.01.nom=Sprint\n"));
        assert!(data.is_loaded());
        assert_eq!(data.catalog().missions_for("ali").len(), 1);
    }

    #[test]
    fn test_missing_file_keeps_previous() {
        let mut data = GameData::new();
        data.load_from_str("ennemi.1=Rat\n");
        assert!(!data.load_from_path("/no/such/resource.properties"));
        assert!(data.is_loaded());
        assert_eq!(data.catalog().enemy_names(), vec!["Rat".to_string()]);
    }

    #[test]
    fn test_shipped_resource_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/leTerrain.properties");
        let mut data = GameData::new();
        assert!(data.load_from_path(path));
        assert_eq!(data.bestiary(8).enemy_names().len(), 5);
    }
}
