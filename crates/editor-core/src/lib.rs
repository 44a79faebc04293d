pub mod math;
pub mod components;
pub mod settings;
pub mod assets;

// Re-exports
pub use components::{ModelUniform, Transform};
pub use settings::GizmoSettings;
pub use assets::{
    AssetDatabase, AssetDatabaseExt, AssetError, AssetId, AssetKind, AssetSystem,
    AssetSystemConfig, CompoundAssetDatabase, EmbeddedAssets, LooseFileDatabase, SceneAsset,
};
