//! シェーダーモジュール
//!
//! WGSLシェーダーを外部ファイルから読み込む

/// ライティングなし頂点カラーシェーダー
pub const UNLIT_SHADER: &str = include_str!("unlit.wgsl");

/// 頂点シェーダー名とエントリポイントの対応
pub fn vertex_entry_point(name: &str) -> Option<&'static str> {
    match name {
        "unlit-vertex" => Some("vs_main"),
        _ => None,
    }
}

/// フラグメントシェーダー名とエントリポイントの対応
pub fn fragment_entry_point(name: &str) -> Option<&'static str> {
    match name {
        "unlit-frag" => Some("fs_main"),
        _ => None,
    }
}
