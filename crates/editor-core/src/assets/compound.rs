use super::{AssetDatabase, AssetError, AssetId};

/// 複数のデータベースを登録順に検索するデータベース
/// 先に登録したものが優先される
#[derive(Default)]
pub struct CompoundAssetDatabase {
    databases: Vec<Box<dyn AssetDatabase>>,
}

impl CompoundAssetDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// データベースを末尾（最も低い優先度）に追加
    pub fn add_database(&mut self, database: impl AssetDatabase + 'static) {
        log::debug!(
            "Adding asset database '{}' at priority {}",
            database.name(),
            self.databases.len()
        );
        self.databases.push(Box::new(database));
    }

    /// 登録済みデータベースの名前（優先度順）
    pub fn database_names(&self) -> Vec<&str> {
        self.databases.iter().map(|db| db.name()).collect()
    }

    /// アセットを提供するデータベースの名前
    pub fn source_of(&self, id: &AssetId) -> Option<&str> {
        self.databases
            .iter()
            .find(|db| db.exists(id))
            .map(|db| db.name())
    }
}

impl AssetDatabase for CompoundAssetDatabase {
    fn name(&self) -> &str {
        "compound"
    }

    /// 読めないデータベース（I/Oエラー）は見つからなかったものとして次へ進む
    /// 全て失敗した場合、I/Oエラーがあれば最初のものを返す
    fn load_bytes(&self, id: &AssetId) -> Result<Vec<u8>, AssetError> {
        let mut io_error = None;
        for db in &self.databases {
            match db.load_bytes(id) {
                Ok(bytes) => {
                    log::trace!("Loaded {} from '{}'", id, db.name());
                    return Ok(bytes);
                }
                Err(AssetError::NotFound(_)) => continue,
                Err(e @ AssetError::Io { .. }) => {
                    log::warn!("Asset database '{}' could not read {}: {}", db.name(), id, e);
                    if io_error.is_none() {
                        io_error = Some(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Err(io_error.unwrap_or_else(|| AssetError::NotFound(id.clone())))
    }

    fn exists(&self, id: &AssetId) -> bool {
        self.databases.iter().any(|db| db.exists(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::EmbeddedAssets;

    fn embedded(entries: &[(&str, &'static str)]) -> EmbeddedAssets {
        let mut assets = EmbeddedAssets::empty();
        for &(id, text) in entries {
            assets.insert(id, text.as_bytes());
        }
        assets
    }

    #[test]
    fn test_first_database_wins() {
        let mut db = CompoundAssetDatabase::new();
        db.add_database(embedded(&[("a.json", "first")]));
        db.add_database(embedded(&[("a.json", "second"), ("b.json", "only")]));

        assert_eq!(db.load_bytes(&AssetId::new("a.json")).unwrap(), b"first");
        assert_eq!(db.load_bytes(&AssetId::new("b.json")).unwrap(), b"only");
    }

    #[test]
    fn test_not_found_when_all_miss() {
        let mut db = CompoundAssetDatabase::new();
        db.add_database(embedded(&[]));
        db.add_database(embedded(&[]));

        let err = db.load_bytes(&AssetId::new("missing.json")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(id) if id.as_str() == "missing.json"));
    }

    #[test]
    fn test_empty_compound() {
        let db = CompoundAssetDatabase::new();
        assert!(!db.exists(&AssetId::new("a")));
        assert!(db.database_names().is_empty());
    }

    #[test]
    fn test_invalid_id_stops_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = CompoundAssetDatabase::new();
        db.add_database(crate::assets::LooseFileDatabase::new(dir.path()));
        db.add_database(embedded(&[("../escape.json", "{}")]));

        let err = db.load_bytes(&AssetId::new("../escape.json")).unwrap_err();
        assert!(matches!(err, AssetError::InvalidId(_)));
    }

    #[test]
    fn test_unreadable_database_falls_through() {
        // ルートが通常ファイルなので読み込みはI/Oエラーになる
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut db = CompoundAssetDatabase::new();
        db.add_database(crate::assets::LooseFileDatabase::new(file.path()));
        db.add_database(embedded(&[("a.json", "fallback")]));

        let id = AssetId::new("a.json");
        assert!(db.exists(&id));
        assert_eq!(db.load_bytes(&id).unwrap(), b"fallback");
    }

    #[test]
    fn test_io_error_reported_when_all_miss() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut db = CompoundAssetDatabase::new();
        db.add_database(crate::assets::LooseFileDatabase::new(file.path()));
        db.add_database(embedded(&[]));

        let err = db.load_bytes(&AssetId::new("a.json")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn test_source_of() {
        let mut db = CompoundAssetDatabase::new();
        db.add_database(embedded(&[("a.json", "{}")]));
        assert_eq!(db.source_of(&AssetId::new("a.json")), Some("embedded"));
        assert_eq!(db.source_of(&AssetId::new("b.json")), None);
    }
}
