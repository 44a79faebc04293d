//! アセットシステム
//!
//! ファイルベースのアセットと埋め込みアセットを1つのデータベースとして扱う

mod compound;
mod embedded;
mod loose_file;
mod scene;
mod system;

pub use compound::CompoundAssetDatabase;
pub use embedded::EmbeddedAssets;
pub use loose_file::LooseFileDatabase;
pub use scene::{SceneAsset, SceneObject};
pub use system::{AssetSystem, AssetSystemConfig};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// アセット操作のエラー
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(AssetId),

    #[error("Invalid asset id: {0}")]
    InvalidId(String),

    #[error("Asset {id} has kind {found:?}, expected {expected:?}")]
    UnexpectedKind {
        id: AssetId,
        expected: AssetKind,
        found: AssetKind,
    },

    #[error("I/O error reading {id}: {source}")]
    Io {
        id: AssetId,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {id}: {source}")]
    Json {
        id: AssetId,
        #[source]
        source: serde_json::Error,
    },
}

/// アセットID
/// アセットルートからの相対パス（区切りは `/`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(String);

impl AssetId {
    /// 新しいAssetIdを作成（`\` は `/` に正規化）
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into().replace('\\', "/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 先頭のドットを含む小文字の拡張子（例: ".scene"）
    pub fn extension(&self) -> Option<String> {
        let file_name = self.0.rsplit('/').next()?;
        let dot = file_name.rfind('.')?;
        if dot == 0 {
            return None;
        }
        Some(file_name[dot..].to_lowercase())
    }
}

impl From<&str> for AssetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 拡張子から決まるアセットの種類
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Scene,
    Json,
    Other(String),
}

/// アセットデータベース
pub trait AssetDatabase {
    /// ログ表示用の名前
    fn name(&self) -> &str;

    /// アセットの生データを読み込む
    /// 見つからない場合は `AssetError::NotFound`
    fn load_bytes(&self, id: &AssetId) -> Result<Vec<u8>, AssetError>;

    /// アセットが存在するか
    fn exists(&self, id: &AssetId) -> bool;
}

/// 型付き読み込み
pub trait AssetDatabaseExt: AssetDatabase {
    /// JSONとしてデシリアライズして読み込む
    fn load<T: DeserializeOwned>(&self, id: &AssetId) -> Result<T, AssetError> {
        let bytes = self.load_bytes(id)?;
        serde_json::from_slice(&bytes).map_err(|source| AssetError::Json {
            id: id.clone(),
            source,
        })
    }
}

impl<D: AssetDatabase + ?Sized> AssetDatabaseExt for D {}
