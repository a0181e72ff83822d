use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tile metadata document: which image draws each tile type.
///
/// ```json
/// { "tileLocations": { "grass": "tiles/grass.png" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMetadata {
    pub tile_locations: BTreeMap<String, String>,
}

impl TileMetadata {
    /// Image path for a tile type, relative to the image directory.
    pub fn path_for(&self, tile_type: &str) -> Option<&str> {
        self.tile_locations.get(tile_type).map(String::as_str)
    }

    /// Builder that registers one tile type.
    pub fn with_tile(mut self, tile_type: impl Into<String>, path: impl Into<String>) -> Self {
        self.tile_locations.insert(tile_type.into(), path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tile_locations() {
        let meta: TileMetadata = serde_json::from_str(
            r#"{ "tileLocations": { "grass": "tiles/grass.png", "sand": "tiles/sand.png" } }"#,
        )
        .unwrap();
        assert_eq!(meta.path_for("sand"), Some("tiles/sand.png"));
        assert_eq!(meta.path_for("lava"), None);
    }
}
