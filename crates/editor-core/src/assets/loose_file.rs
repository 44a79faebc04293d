use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use super::{AssetDatabase, AssetError, AssetId, AssetKind};

/// ディレクトリ以下のファイルをそのままアセットとして扱うデータベース
#[derive(Debug, Clone)]
pub struct LooseFileDatabase {
    root: PathBuf,
    extensions: HashMap<String, AssetKind>,
}

impl LooseFileDatabase {
    /// ルートディレクトリを指定して作成
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        // wasm32ではファイルシステムがないため常にここを通る
        if !root.is_dir() {
            log::debug!("Asset root {} is not a directory", root.display());
        }

        let mut db = Self {
            root,
            extensions: HashMap::new(),
        };
        db.register_extension(".json", AssetKind::Json);
        db
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 拡張子とアセット種別の対応を登録（後勝ち）
    pub fn register_extension(&mut self, extension: &str, kind: AssetKind) {
        let extension = normalize_extension(extension);
        log::debug!("Mapping {} assets to {:?}", extension, kind);
        self.extensions.insert(extension, kind);
    }

    /// 拡張子からアセット種別を判定
    pub fn kind_of(&self, id: &AssetId) -> AssetKind {
        match id.extension() {
            Some(ext) => self
                .extensions
                .get(&ext)
                .cloned()
                .unwrap_or(AssetKind::Other(ext)),
            None => AssetKind::Other(String::new()),
        }
    }

    /// AssetIdをルート以下のファイルパスに変換
    /// ルート外を指すIDは拒否する
    pub fn resolve(&self, id: &AssetId) -> Result<PathBuf, AssetError> {
        let relative = Path::new(id.as_str());
        if id.as_str().is_empty() {
            return Err(AssetError::InvalidId(id.to_string()));
        }

        let mut path = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(AssetError::InvalidId(id.to_string()));
                }
            }
        }
        Ok(path)
    }
}

fn normalize_extension(extension: &str) -> String {
    let lower = extension.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

impl AssetDatabase for LooseFileDatabase {
    fn name(&self) -> &str {
        "loose-files"
    }

    fn load_bytes(&self, id: &AssetId) -> Result<Vec<u8>, AssetError> {
        let path = self.resolve(id)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AssetError::NotFound(id.clone()))
            }
            Err(source) => Err(AssetError::Io {
                id: id.clone(),
                source,
            }),
        }
    }

    fn exists(&self, id: &AssetId) -> bool {
        self.resolve(id).map(|p| p.is_file()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetDatabaseExt;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_load_bytes() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "textures/readme.txt", "hello");

        let db = LooseFileDatabase::new(dir.path());
        let bytes = db.load_bytes(&AssetId::new("textures/readme.txt")).unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let db = LooseFileDatabase::new(dir.path());

        let err = db.load_bytes(&AssetId::new("nope.json")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
        assert!(!db.exists(&AssetId::new("nope.json")));
    }

    #[test]
    fn test_parent_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db = LooseFileDatabase::new(dir.path().join("assets"));

        let err = db.resolve(&AssetId::new("../secret.json")).unwrap_err();
        assert!(matches!(err, AssetError::InvalidId(_)));
        assert!(matches!(
            db.resolve(&AssetId::new("/etc/passwd")),
            Err(AssetError::InvalidId(_))
        ));
        assert!(matches!(db.resolve(&AssetId::new("")), Err(AssetError::InvalidId(_))));
    }

    #[test]
    fn test_extension_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = LooseFileDatabase::new(dir.path());
        db.register_extension("SCENE", AssetKind::Scene);

        assert_eq!(db.kind_of(&AssetId::new("levels/a.scene")), AssetKind::Scene);
        assert_eq!(db.kind_of(&AssetId::new("settings.json")), AssetKind::Json);
        assert_eq!(
            db.kind_of(&AssetId::new("model.glb")),
            AssetKind::Other(".glb".to_string())
        );
    }

    #[test]
    fn test_load_json_error_names_asset() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.json", "{ not json");

        let db = LooseFileDatabase::new(dir.path());
        let err = db
            .load::<serde_json::Value>(&AssetId::new("broken.json"))
            .unwrap_err();
        assert!(matches!(err, AssetError::Json { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
