// crates/editor-renderer/src/gizmo.rs
//! 軸Gizmo描画
//! 選択オブジェクトの位置にXYZ軸と3枚の平面ハンドルを描画する。
//! 平面は毎フレーム視点側の象限に移動し、深度テストなしで常に手前に表示される。

use editor_core::math::sign_vec3;
use editor_core::{GizmoSettings, Transform};
use glam::{Mat4, Vec3};

use crate::bounds::BoundingBox;
use crate::graphics::{
    BlendState, ColoredVertex, DepthComparison, DepthStencilState, FaceCullingMode, GlobalInput,
    GlobalSource, GraphicsDevice, GraphicsError, MaterialDescription, PerObjectInput,
    PrimitiveTopology, RasterizerState, RenderContext, TriangleFillMode, VertexElementFormat,
    VertexInputElement, VertexSemantic,
};
use crate::render_item::{RenderItem, RenderOrderKey, STANDARD_STAGE};
use crate::state::StateScope;

/// 参加するパイプラインステージ
const STAGES: &[&str] = &[STANDARD_STAGE];

/// 頂点数: 軸 6 + 平面 3x4 + 枠線 3x4
pub const VERTEX_COUNT: usize = 30;
/// 軸の線分インデックス数
pub const AXIS_INDEX_COUNT: u32 = 6;
/// 平面1枚あたりの三角形インデックス数
pub const PLANE_INDEX_COUNT: u32 = 6;
/// 平面1枚あたりの枠線インデックス数
pub const BORDER_INDEX_COUNT: u32 = 8;
/// インデックス総数: 軸 6 + 平面 3x6 + 枠線 3x8
pub const INDEX_COUNT: usize = (AXIS_INDEX_COUNT + 3 * (PLANE_INDEX_COUNT + BORDER_INDEX_COUNT)) as usize;

/// 固定のインデックス配列（構築後は変更しない）
pub const GIZMO_INDICES: [u16; INDEX_COUNT] = [
    // 軸
    0, 1, 2, 3, 4, 5,
    // 平面（XY, YZ, XZ）
    6, 7, 8, 6, 8, 9,
    10, 11, 12, 10, 12, 13,
    14, 15, 16, 14, 16, 17,
    // 平面の枠線（XY, YZ, XZ）
    18, 19, 19, 20, 20, 21, 21, 18,
    22, 23, 23, 24, 24, 25, 25, 22,
    26, 27, 27, 28, 28, 29, 29, 26,
];

/// 軸の色定数
pub const COLOR_X: [f32; 3] = [1.0, 0.0, 0.0]; // 赤
pub const COLOR_Y: [f32; 3] = [0.0, 1.0, 0.0]; // 緑
pub const COLOR_Z: [f32; 3] = [0.0, 0.0, 1.0]; // 青

fn with_alpha(rgb: [f32; 3], alpha: f32) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], alpha]
}

/// 平面ハンドル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoPlane {
    XY,
    YZ,
    XZ,
}

impl GizmoPlane {
    /// 頂点・インデックスバッファ上の並び順
    pub const BUFFER_ORDER: [GizmoPlane; 3] = [GizmoPlane::XY, GizmoPlane::YZ, GizmoPlane::XZ];

    /// 描画順（各平面の塗りの直後にその枠線を描く）
    pub const DRAW_ORDER: [GizmoPlane; 3] = [GizmoPlane::XZ, GizmoPlane::XY, GizmoPlane::YZ];

    fn slot(self) -> u32 {
        match self {
            GizmoPlane::XY => 0,
            GizmoPlane::YZ => 1,
            GizmoPlane::XZ => 2,
        }
    }

    /// 塗りの開始インデックス
    pub fn fill_start(self) -> u32 {
        AXIS_INDEX_COUNT + self.slot() * PLANE_INDEX_COUNT
    }

    /// 枠線の開始インデックス
    pub fn border_start(self) -> u32 {
        AXIS_INDEX_COUNT + 3 * PLANE_INDEX_COUNT + self.slot() * BORDER_INDEX_COUNT
    }

    /// 法線方向の軸の色（XYは青、YZは赤、XZは緑）
    pub fn color(self) -> [f32; 3] {
        match self {
            GizmoPlane::XY => COLOR_Z,
            GizmoPlane::YZ => COLOR_X,
            GizmoPlane::XZ => COLOR_Y,
        }
    }

    /// 原点中心の四隅（半辺長 `half`）
    fn corners(self, half: f32) -> [Vec3; 4] {
        match self {
            GizmoPlane::XY => [
                Vec3::new(-half, half, 0.0),
                Vec3::new(-half, -half, 0.0),
                Vec3::new(half, -half, 0.0),
                Vec3::new(half, half, 0.0),
            ],
            GizmoPlane::YZ => [
                Vec3::new(0.0, -half, half),
                Vec3::new(0.0, -half, -half),
                Vec3::new(0.0, half, -half),
                Vec3::new(0.0, half, half),
            ],
            GizmoPlane::XZ => [
                Vec3::new(-half, 0.0, half),
                Vec3::new(-half, 0.0, -half),
                Vec3::new(half, 0.0, -half),
                Vec3::new(half, 0.0, half),
            ],
        }
    }
}

/// 各平面を視点側へずらす方向（成分は -1 / 0 / +1）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneOffsets {
    pub xy: Vec3,
    pub yz: Vec3,
    pub xz: Vec3,
}

impl PlaneOffsets {
    /// 全て正の象限（構築時の初期値）
    pub const POSITIVE: Self = Self {
        xy: Vec3::new(1.0, 1.0, 0.0),
        yz: Vec3::new(0.0, 1.0, 1.0),
        xz: Vec3::new(1.0, 0.0, 1.0),
    };

    /// 視点位置から計算
    /// 視点をGizmoのローカル空間（回転の逆変換）に移し、各成分の符号を取る
    pub fn toward_viewer(transform: &Transform, viewer_position: Vec3) -> Self {
        let s = sign_vec3(transform.to_local_direction(viewer_position));
        Self {
            xy: Vec3::new(s.x, s.y, 0.0),
            yz: Vec3::new(0.0, s.y, s.z),
            xz: Vec3::new(s.x, 0.0, s.z),
        }
    }

    pub fn get(&self, plane: GizmoPlane) -> Vec3 {
        match plane {
            GizmoPlane::XY => self.xy,
            GizmoPlane::YZ => self.yz,
            GizmoPlane::XZ => self.xz,
        }
    }
}

/// Gizmoの全頂点を生成
/// 軸の頂点はオフセットに依存しない
pub fn build_vertices(offsets: &PlaneOffsets, settings: &GizmoSettings) -> [ColoredVertex; VERTEX_COUNT] {
    let half = settings.plane_length;
    let axis = settings.axis_length;
    let solid = settings.border_opacity;

    let mut vertices = [ColoredVertex::new(Vec3::ZERO, [0.0; 4]); VERTEX_COUNT];

    // 軸（Zは -Z 方向が前方）
    let axes = [
        (Vec3::new(axis, 0.0, 0.0), COLOR_X),
        (Vec3::new(0.0, axis, 0.0), COLOR_Y),
        (Vec3::new(0.0, 0.0, -axis), COLOR_Z),
    ];
    for (i, (end, rgb)) in axes.into_iter().enumerate() {
        vertices[i * 2] = ColoredVertex::new(Vec3::ZERO, with_alpha(rgb, solid));
        vertices[i * 2 + 1] = ColoredVertex::new(end, with_alpha(rgb, solid));
    }

    // 平面（半透明）と枠線（不透明）
    for plane in GizmoPlane::BUFFER_ORDER {
        let offset = offsets.get(plane) * half;
        let fill = with_alpha(plane.color(), settings.fill_opacity);
        let border = with_alpha(plane.color(), solid);
        let fill_base = 6 + plane.slot() as usize * 4;
        let border_base = 18 + plane.slot() as usize * 4;

        for (i, corner) in plane.corners(half).into_iter().enumerate() {
            vertices[fill_base + i] = ColoredVertex::new(offset + corner, fill);
            vertices[border_base + i] = ColoredVertex::new(offset + corner, border);
        }
    }

    vertices
}

/// Gizmo用マテリアル（ライティングなし・頂点カラー）
pub fn material_description() -> MaterialDescription {
    MaterialDescription {
        vertex_shader: "unlit-vertex".to_string(),
        fragment_shader: "unlit-frag".to_string(),
        vertex_inputs: vec![
            VertexInputElement::new("in_position", VertexSemantic::Position, VertexElementFormat::Float3),
            VertexInputElement::new("in_color", VertexSemantic::Color, VertexElementFormat::Float4),
        ],
        global_inputs: vec![
            GlobalInput {
                buffer_name: "ProjectionMatrixBuffer".to_string(),
                source: GlobalSource::ProjectionMatrix,
            },
            GlobalInput {
                buffer_name: "ViewMatrixBuffer".to_string(),
                source: GlobalSource::ViewMatrix,
            },
        ],
        per_object_inputs: vec![PerObjectInput {
            buffer_name: "WorldMatrixBuffer".to_string(),
            size: 64,
        }],
    }
}

/// 軸Gizmo
pub struct AxesGizmo<C: GraphicsDevice> {
    /// エディタの選択ロジックが更新する
    pub transform: Transform,
    settings: GizmoSettings,
    vertex_buffer: C::VertexBuffer,
    index_buffer: C::IndexBuffer,
    material: C::Material,
    depth_stencil: DepthStencilState,
    rasterizer: RasterizerState,
    offsets: PlaneOffsets,
}

impl<C: GraphicsDevice> AxesGizmo<C> {
    /// 既定の設定で作成
    pub fn new(device: &mut C) -> Result<Self, GraphicsError> {
        Self::with_settings(device, GizmoSettings::default())
    }

    /// バッファ・マテリアル・描画ステートを作成
    pub fn with_settings(device: &mut C, settings: GizmoSettings) -> Result<Self, GraphicsError> {
        let vertex_buffer = device.create_vertex_buffer(VERTEX_COUNT)?;
        let index_buffer = device.create_index_buffer(&GIZMO_INDICES)?;
        let material = device.create_material(&material_description())?;

        let mut gizmo = Self {
            transform: Transform::identity(),
            settings,
            vertex_buffer,
            index_buffer,
            material,
            depth_stencil: DepthStencilState::new(false, DepthComparison::Always),
            rasterizer: RasterizerState::new(FaceCullingMode::None, TriangleFillMode::Solid, true, true),
            offsets: PlaneOffsets::POSITIVE,
        };
        gizmo.set_plane_vertices(device, PlaneOffsets::POSITIVE)?;

        log::debug!("Created axes gizmo ({} vertices, {} indices)", VERTEX_COUNT, GIZMO_INDICES.len());
        Ok(gizmo)
    }

    pub fn settings(&self) -> &GizmoSettings {
        &self.settings
    }

    /// 設定を差し替えて既存の頂点バッファを書き直す
    /// バッファ・マテリアルは再作成しない
    pub fn set_settings(&mut self, device: &mut C, settings: GizmoSettings) -> Result<(), GraphicsError> {
        self.settings = settings;
        self.set_plane_vertices(device, self.offsets)
    }

    /// 最後に適用した平面オフセット
    pub fn plane_offsets(&self) -> PlaneOffsets {
        self.offsets
    }

    pub fn vertex_buffer(&self) -> &C::VertexBuffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &C::IndexBuffer {
        &self.index_buffer
    }

    /// World行列（スケール → 回転 → 平行移動）
    pub fn world_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }

    /// 頂点バッファを再構築（インデックスは変更しない）
    pub fn set_plane_vertices(&mut self, device: &mut C, offsets: PlaneOffsets) -> Result<(), GraphicsError> {
        let vertices = build_vertices(&offsets, &self.settings);
        device.write_vertices(&mut self.vertex_buffer, &vertices)?;
        self.offsets = offsets;
        Ok(())
    }
}

impl<C: RenderContext> RenderItem<C> for AxesGizmo<C> {
    /// 単位立方体 [-1, 1]^3 をWorld行列で変換したAABB
    fn bounds(&self) -> BoundingBox {
        BoundingBox::unit().transform(&self.world_matrix())
    }

    /// 常に最後に描画する
    fn render_order_key(&self, _viewer_position: Vec3) -> RenderOrderKey {
        RenderOrderKey::MAX
    }

    fn stages(&self) -> &'static [&'static str] {
        STAGES
    }

    fn render(&mut self, context: &mut C, stage: &str) -> Result<(), GraphicsError> {
        if stage != STANDARD_STAGE {
            return Ok(());
        }

        context.apply_world_matrix(self.world_matrix())?;
        context.set_vertex_buffer(&self.vertex_buffer);
        context.set_index_buffer(&self.index_buffer);
        context.set_material(&self.material);

        // ここから先のステート変更はスコープ終了時に元に戻る
        let mut scope = StateScope::new(context);
        scope.set_depth_stencil_state(self.depth_stencil);
        scope.set_rasterizer_state(self.rasterizer);
        scope.draw_indexed(AXIS_INDEX_COUNT, 0, PrimitiveTopology::LineList)?;

        scope.set_blend_state(BlendState::AlphaBlend);
        let offsets = PlaneOffsets::toward_viewer(&self.transform, scope.viewer_position());
        self.set_plane_vertices(&mut scope, offsets)?;

        for plane in GizmoPlane::DRAW_ORDER {
            scope.draw_indexed(PLANE_INDEX_COUNT, plane.fill_start(), PrimitiveTopology::TriangleList)?;
            scope.draw_indexed(BORDER_INDEX_COUNT, plane.border_start(), PrimitiveTopology::LineList)?;
        }

        Ok(())
    }
}
