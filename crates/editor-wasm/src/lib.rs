// crates/editor-wasm/src/lib.rs

mod renderer;
mod utils;

use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use editor_core::{AssetSystem, AssetSystemConfig, GizmoSettings, SceneAsset, Transform};
use glam::{Quat, Vec3};

use renderer::Renderer;
use utils::console_log;

// パニック時のスタックトレース表示とログ出力先の登録
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
    utils::init_logger(log::LevelFilter::Info);
}

/// Editor構造体
/// アセットとビューポートを統合し、JSから操作可能なAPIを提供
#[wasm_bindgen]
pub struct Editor {
    assets: AssetSystem,
    renderer: Renderer,
}

#[wasm_bindgen]
impl Editor {
    /// 新しいEditorを作成（非同期）
    pub async fn create(canvas: HtmlCanvasElement) -> Result<Editor, JsValue> {
        console_log!("Creating Editor...");

        let assets = AssetSystem::new(AssetSystemConfig::default());
        let settings = assets.gizmo_settings().unwrap_or_else(|e| {
            log::warn!("Falling back to default gizmo settings: {}", e);
            GizmoSettings::default()
        });

        let renderer = Renderer::create(canvas, settings).await?;
        console_log!("Editor created successfully");
        Ok(Self { assets, renderer })
    }

    // ========================================================================
    // Gizmo
    // ========================================================================

    /// Gizmo位置を設定
    pub fn set_gizmo_position(&mut self, x: f32, y: f32, z: f32) {
        self.renderer.gizmo.transform.position = Vec3::new(x, y, z);
    }

    /// Gizmo回転を設定（クォータニオン）
    pub fn set_gizmo_rotation(&mut self, x: f32, y: f32, z: f32, w: f32) {
        self.renderer.gizmo.transform.rotation = Quat::from_xyzw(x, y, z, w).normalize();
    }

    /// Gizmoスケールを設定
    pub fn set_gizmo_scale(&mut self, x: f32, y: f32, z: f32) {
        self.renderer.gizmo.transform.scale = Vec3::new(x, y, z);
    }

    /// Gizmo Transformを取得（{ position, rotation, scale }）
    pub fn gizmo_transform(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.renderer.gizmo.transform)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Gizmo Transformを設定
    pub fn set_gizmo_transform(&mut self, value: JsValue) -> Result<(), JsValue> {
        let transform: Transform =
            serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.renderer.gizmo.transform = transform;
        Ok(())
    }

    /// Gizmo設定をJSONで上書き（省略したフィールドは既定値）
    pub fn set_gizmo_settings(&mut self, json: &str) -> Result<(), JsValue> {
        let settings: GizmoSettings =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.renderer.set_gizmo_settings(settings)
    }

    /// シーンJSON内のオブジェクトにGizmoを合わせる
    /// 見つかった場合は true
    pub fn select_scene_object(&mut self, scene_json: &str, name: &str) -> Result<bool, JsValue> {
        let scene: SceneAsset =
            serde_json::from_str(scene_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        match scene.find(name) {
            Some(object) => {
                self.renderer.gizmo.transform = object.transform;
                Ok(true)
            }
            None => {
                console_log!("Object '{}' not found in scene '{}'", name, scene.name);
                Ok(false)
            }
        }
    }

    // ========================================================================
    // カメラ操作
    // ========================================================================

    /// カメラをターゲット周りで回転
    pub fn orbit_camera(&mut self, delta_x: f32, delta_y: f32) {
        self.renderer.camera.orbit(delta_x, delta_y);
    }

    /// カメラをズーム
    pub fn zoom_camera(&mut self, delta: f32) {
        self.renderer.camera.zoom(delta);
    }

    /// カメラターゲットを設定
    pub fn set_camera_target(&mut self, x: f32, y: f32, z: f32) {
        self.renderer.camera.set_target(Vec3::new(x, y, z));
    }

    /// カメラ位置を取得（x, y, zの配列）
    pub fn camera_position(&self) -> Vec<f32> {
        self.renderer.camera.position.to_array().to_vec()
    }

    // ========================================================================
    // フレーム
    // ========================================================================

    /// フレーム更新（アセット更新 → 描画）
    pub fn tick(&mut self, delta_time: f32) -> Result<u32, JsValue> {
        self.assets.update(delta_time);
        self.render_frame()
    }

    /// 描画のみ行い、描画したアイテム数を返す
    pub fn render_frame(&mut self) -> Result<u32, JsValue> {
        self.renderer.render_frame().map(|drawn| drawn as u32)
    }

    /// Canvasリサイズ
    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
    }

    /// 幅取得
    pub fn width(&self) -> u32 {
        self.renderer.width()
    }

    /// 高さ取得
    pub fn height(&self) -> u32 {
        self.renderer.height()
    }
}
