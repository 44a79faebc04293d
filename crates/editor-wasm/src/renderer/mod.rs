//! Rendererモジュール
//!
//! エディタのビューポート描画（背景クリア → Standardステージ → オーバーレイ）

mod depth;
mod gpu_context;

pub use gpu_context::GpuContext;

use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::utils::console_log;

use editor_core::GizmoSettings;
use editor_renderer::{
    AxesGizmo, Camera, GraphicsError, RenderItem, RenderQueue, WgpuGraphics, STANDARD_STAGE,
};

/// 背景色
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.2,
    b: 0.3,
    a: 1.0,
};

fn graphics_error(e: GraphicsError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Renderer構造体
pub struct Renderer {
    ctx: GpuContext,
    graphics: WgpuGraphics,
    render_queue: RenderQueue,

    pub camera: Camera,
    pub gizmo: AxesGizmo<WgpuGraphics>,

    #[allow(dead_code)]
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl Renderer {
    /// 新しいRendererを作成（非同期）
    pub async fn create(canvas: HtmlCanvasElement, settings: GizmoSettings) -> Result<Renderer, JsValue> {
        let ctx = GpuContext::new(canvas).await?;

        let mut graphics = WgpuGraphics::new(
            ctx.device.clone(),
            ctx.queue.clone(),
            ctx.format(),
            Some(depth::DEPTH_FORMAT),
        );
        let gizmo = AxesGizmo::with_settings(&mut graphics, settings).map_err(graphics_error)?;

        let camera = Camera::new(ctx.aspect());
        let (depth_texture, depth_view) = depth::create_texture(&ctx.device, ctx.width(), ctx.height());

        console_log!("Renderer initialized successfully");

        Ok(Self {
            ctx,
            graphics,
            render_queue: RenderQueue::new(),
            camera,
            gizmo,
            depth_texture,
            depth_view,
        })
    }

    /// Gizmo設定を差し替え（バッファは再利用）
    pub fn set_gizmo_settings(&mut self, settings: GizmoSettings) -> Result<(), JsValue> {
        self.gizmo
            .set_settings(&mut self.graphics, settings)
            .map_err(graphics_error)
    }

    /// 1フレーム描画し、描画したアイテム数を返す
    pub fn render_frame(&mut self) -> Result<usize, JsValue> {
        let frame = self.ctx.acquire_frame()?;

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Editor Frame Encoder"),
            });

        // 背景と深度をクリア
        {
            let _clear_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
        }

        // Standardステージ
        self.graphics.set_camera(&self.camera);
        let frustum = self.camera.frustum();
        let mut items: [&mut dyn RenderItem<WgpuGraphics>; 1] = [&mut self.gizmo];
        let result = self
            .render_queue
            .render_stage(&mut items, &mut self.graphics, STANDARD_STAGE, &frustum);

        // 失敗時も記録済みの描画を流して次フレームに残さない
        self.graphics
            .flush(&mut encoder, &frame.view, Some(&self.depth_view));

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.output.present();

        result.map_err(graphics_error)
    }

    /// Canvas サイズ変更
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.resize(width, height);

            let (depth_texture, depth_view) = depth::create_texture(&self.ctx.device, width, height);
            self.depth_texture = depth_texture;
            self.depth_view = depth_view;

            self.camera.set_aspect(width as f32 / height as f32);

            console_log!("Resized to {}x{}", width, height);
        }
    }

    pub fn width(&self) -> u32 {
        self.ctx.width()
    }

    pub fn height(&self) -> u32 {
        self.ctx.height()
    }
}
