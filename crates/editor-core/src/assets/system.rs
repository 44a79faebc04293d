use std::path::PathBuf;

use super::embedded::GIZMO_SETTINGS_ID;
use super::{
    AssetDatabase, AssetDatabaseExt, AssetError, AssetId, AssetKind, CompoundAssetDatabase,
    EmbeddedAssets, LooseFileDatabase, SceneAsset,
};
use crate::settings::GizmoSettings;

/// アセットシステムの設定
#[derive(Debug, Clone)]
pub struct AssetSystemConfig {
    /// ファイルアセットのルートディレクトリ
    pub root: PathBuf,
    /// 拡張子とアセット種別の対応
    pub extensions: Vec<(String, AssetKind)>,
}

impl AssetSystemConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }
}

impl Default for AssetSystemConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            extensions: vec![
                (".scene".to_string(), AssetKind::Scene),
                (".json".to_string(), AssetKind::Json),
            ],
        }
    }
}

/// アセットシステム
/// ファイルアセットを優先し、見つからなければ埋め込みアセットを参照する
pub struct AssetSystem {
    database: CompoundAssetDatabase,
    files: LooseFileDatabase,
}

impl AssetSystem {
    pub fn new(config: AssetSystemConfig) -> Self {
        let mut files = LooseFileDatabase::new(config.root);
        for (extension, kind) in config.extensions {
            files.register_extension(&extension, kind);
        }

        let mut database = CompoundAssetDatabase::new();
        database.add_database(files.clone());
        database.add_database(EmbeddedAssets::new());

        log::info!(
            "Asset system ready: root={}, databases={:?}",
            files.root().display(),
            database.database_names()
        );

        Self { database, files }
    }

    /// 統合データベース
    pub fn database(&self) -> &CompoundAssetDatabase {
        &self.database
    }

    /// 拡張子からアセット種別を判定
    pub fn kind_of(&self, id: &AssetId) -> AssetKind {
        self.files.kind_of(id)
    }

    /// シーンを読み込む（`.scene` 以外はエラー）
    pub fn load_scene(&self, id: &AssetId) -> Result<SceneAsset, AssetError> {
        let kind = self.kind_of(id);
        if kind != AssetKind::Scene {
            return Err(AssetError::UnexpectedKind {
                id: id.clone(),
                expected: AssetKind::Scene,
                found: kind,
            });
        }
        self.database.load(id)
    }

    /// Gizmo設定を読み込む
    /// ファイルで上書きされていなければ埋め込みの既定値
    pub fn gizmo_settings(&self) -> Result<GizmoSettings, AssetError> {
        self.database.load(&AssetId::new(GIZMO_SETTINGS_ID))
    }

    /// フレーム更新（現状は何もしない）
    pub fn update(&mut self, _delta_seconds: f32) {}
}

impl AssetDatabase for AssetSystem {
    fn name(&self) -> &str {
        "asset-system"
    }

    fn load_bytes(&self, id: &AssetId) -> Result<Vec<u8>, AssetError> {
        self.database.load_bytes(id)
    }

    fn exists(&self, id: &AssetId) -> bool {
        self.database.exists(id)
    }
}
