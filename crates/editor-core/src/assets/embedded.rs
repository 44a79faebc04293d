use std::collections::HashMap;

use super::{AssetDatabase, AssetError, AssetId};

/// エンジン組み込みのGizmo設定
pub const GIZMO_SETTINGS_ID: &str = "settings/gizmo.json";

const GIZMO_SETTINGS_JSON: &str = r#"{
    "plane_length": 0.1,
    "axis_length": 1.0,
    "fill_opacity": 0.66,
    "border_opacity": 1.0
}"#;

/// バイナリに埋め込まれたアセット
#[derive(Debug, Clone)]
pub struct EmbeddedAssets {
    assets: HashMap<AssetId, &'static [u8]>,
}

impl EmbeddedAssets {
    /// エンジン標準の埋め込みアセットを登録した状態で作成
    pub fn new() -> Self {
        let mut assets = Self::empty();
        assets.insert(GIZMO_SETTINGS_ID, GIZMO_SETTINGS_JSON.as_bytes());
        assets
    }

    /// 何も登録されていない状態で作成
    pub fn empty() -> Self {
        Self {
            assets: HashMap::new(),
        }
    }

    /// アセットを登録（同じIDは上書き）
    pub fn insert(&mut self, id: impl Into<AssetId>, bytes: &'static [u8]) {
        self.assets.insert(id.into(), bytes);
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl Default for EmbeddedAssets {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetDatabase for EmbeddedAssets {
    fn name(&self) -> &str {
        "embedded"
    }

    fn load_bytes(&self, id: &AssetId) -> Result<Vec<u8>, AssetError> {
        self.assets
            .get(id)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| AssetError::NotFound(id.clone()))
    }

    fn exists(&self, id: &AssetId) -> bool {
        self.assets.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetDatabaseExt;
    use crate::GizmoSettings;

    #[test]
    fn test_builtin_settings_match_defaults() {
        let assets = EmbeddedAssets::new();
        let settings: GizmoSettings = assets.load(&AssetId::new(GIZMO_SETTINGS_ID)).unwrap();
        assert_eq!(settings, GizmoSettings::default());
    }

    #[test]
    fn test_insert_and_load() {
        let mut assets = EmbeddedAssets::empty();
        assert!(assets.is_empty());

        assets.insert("shaders/readme.txt", b"unlit");
        assert_eq!(assets.len(), 1);
        assert!(assets.exists(&AssetId::new("shaders/readme.txt")));
        assert_eq!(assets.load_bytes(&AssetId::new("shaders/readme.txt")).unwrap(), b"unlit");
    }

    #[test]
    fn test_missing_is_not_found() {
        let assets = EmbeddedAssets::empty();
        let err = assets.load_bytes(&AssetId::new("x.json")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }
}
