//! Per-stage visibility pass: filter, cull, sort, draw

use crate::bounds::Frustum;
use crate::graphics::{GraphicsError, RenderContext};
use crate::render_item::{RenderItem, RenderOrderKey};

/// Reusable scratch list of visible items for one stage
#[derive(Debug, Default)]
pub struct RenderQueue {
    visible: Vec<(RenderOrderKey, usize)>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices of items that take part in `stage` and survive culling,
    /// ordered by ascending key (ties keep input order)
    pub fn collect<C: RenderContext + ?Sized>(
        &mut self,
        items: &[&mut dyn RenderItem<C>],
        stage: &str,
        frustum: &Frustum,
        viewer_position: glam::Vec3,
    ) -> Vec<usize> {
        self.visible.clear();
        for (index, item) in items.iter().enumerate() {
            if !item.stages().contains(&stage) {
                continue;
            }
            if item.cull(frustum) {
                continue;
            }
            self.visible.push((item.render_order_key(viewer_position), index));
        }
        self.visible.sort_by_key(|(key, _)| *key);
        self.visible.iter().map(|(_, index)| *index).collect()
    }

    /// Draw all visible items of `stage`; returns how many were drawn
    pub fn render_stage<C: RenderContext + ?Sized>(
        &mut self,
        items: &mut [&mut dyn RenderItem<C>],
        context: &mut C,
        stage: &str,
        frustum: &Frustum,
    ) -> Result<usize, GraphicsError> {
        let order = self.collect(items, stage, frustum, context.viewer_position());
        for &index in &order {
            items[index].render(context, stage)?;
        }
        log::trace!("Stage '{}': drew {} of {} items", stage, order.len(), items.len());
        Ok(order.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::BoundingBox;
    use crate::gizmo::AxesGizmo;
    use crate::graphics::PrimitiveTopology;
    use crate::render_item::STANDARD_STAGE;
    use crate::testing::RecordingContext;
    use glam::{Mat4, Vec3};

    struct Marker {
        id: u32,
        center: Vec3,
        stages: &'static [&'static str],
        rendered: Vec<String>,
    }

    impl Marker {
        fn new(id: u32, center: Vec3) -> Self {
            Self {
                id,
                center,
                stages: &[STANDARD_STAGE],
                rendered: Vec::new(),
            }
        }
    }

    impl RenderItem<RecordingContext> for Marker {
        fn bounds(&self) -> BoundingBox {
            BoundingBox::unit().transform(&Mat4::from_translation(self.center))
        }

        fn render_order_key(&self, viewer_position: Vec3) -> RenderOrderKey {
            RenderOrderKey::from_distance(self.center.distance(viewer_position))
        }

        fn stages(&self) -> &'static [&'static str] {
            self.stages
        }

        fn render(&mut self, context: &mut RecordingContext, stage: &str) -> Result<(), GraphicsError> {
            self.rendered.push(stage.to_string());
            context.note(format!("marker {}", self.id));
            Ok(())
        }
    }

    fn wide_frustum() -> Frustum {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::orthographic_rh(-10.0, 10.0, -10.0, 10.0, 0.1, 100.0);
        Frustum::from_view_projection(&(proj * view))
    }

    #[test]
    fn test_sorted_front_to_back() {
        let mut far = Marker::new(1, Vec3::new(0.0, 0.0, -10.0));
        let mut near = Marker::new(2, Vec3::new(0.0, 0.0, 5.0));
        let mut items: [&mut dyn RenderItem<RecordingContext>; 2] = [&mut far, &mut near];

        let mut queue = RenderQueue::new();
        let order = queue.collect(&items, STANDARD_STAGE, &wide_frustum(), Vec3::new(0.0, 0.0, 20.0));
        assert_eq!(order, vec![1, 0]);

        let mut context = RecordingContext::new();
        context.set_viewer_position(Vec3::new(0.0, 0.0, 20.0));
        let drawn = queue
            .render_stage(&mut items, &mut context, STANDARD_STAGE, &wide_frustum())
            .unwrap();
        assert_eq!(drawn, 2);
        assert_eq!(context.notes(), vec!["marker 2", "marker 1"]);
    }

    #[test]
    fn test_culled_and_other_stage_items_skipped() {
        let mut visible = Marker::new(1, Vec3::ZERO);
        let mut outside = Marker::new(2, Vec3::new(500.0, 0.0, 0.0));
        let mut shadow_only = Marker::new(3, Vec3::ZERO);
        shadow_only.stages = &["ShadowMap"];

        let mut context = RecordingContext::new();
        let mut queue = RenderQueue::new();
        {
            let mut items: [&mut dyn RenderItem<RecordingContext>; 3] =
                [&mut visible, &mut outside, &mut shadow_only];
            let drawn = queue
                .render_stage(&mut items, &mut context, STANDARD_STAGE, &wide_frustum())
                .unwrap();
            assert_eq!(drawn, 1);
        }

        assert_eq!(visible.rendered, vec![STANDARD_STAGE.to_string()]);
        assert!(outside.rendered.is_empty());
        assert!(shadow_only.rendered.is_empty());
    }

    #[test]
    fn test_gizmo_drawn_after_scene_items() {
        let viewer = Vec3::new(0.0, 0.0, 20.0);
        let mut context = RecordingContext::new();
        context.set_viewer_position(viewer);
        let mut gizmo = AxesGizmo::new(&mut context).unwrap();
        let mut near = Marker::new(1, Vec3::new(0.0, 0.0, 5.0));
        let mut far = Marker::new(2, Vec3::new(0.0, 0.0, -5.0));

        let mut queue = RenderQueue::new();
        {
            // Gizmoを先頭に積んでも最後に描画される
            let mut items: [&mut dyn RenderItem<RecordingContext>; 3] = [&mut gizmo, &mut near, &mut far];
            assert_eq!(queue.collect(&items, STANDARD_STAGE, &wide_frustum(), viewer), vec![1, 2, 0]);

            // 最初の描画呼び出しを失敗させ、その時点でマーカーが描画済みであることを確認
            context.fail_draw_at = Some(0);
            let result = queue.render_stage(&mut items, &mut context, STANDARD_STAGE, &wide_frustum());
            assert!(result.is_err());
            assert_eq!(context.notes(), vec!["marker 1", "marker 2"]);
            assert!(context.draws.is_empty());
        }

        let mut context = RecordingContext::new();
        context.set_viewer_position(viewer);
        let mut gizmo = AxesGizmo::new(&mut context).unwrap();
        let mut items: [&mut dyn RenderItem<RecordingContext>; 3] = [&mut gizmo, &mut near, &mut far];
        let drawn = queue
            .render_stage(&mut items, &mut context, STANDARD_STAGE, &wide_frustum())
            .unwrap();
        assert_eq!(drawn, 3);
        assert_eq!(context.notes(), vec!["marker 1", "marker 2"]);
        assert_eq!(context.draws.len(), 7);
    }

    #[test]
    fn test_error_propagates() {
        struct Broken;

        impl RenderItem<RecordingContext> for Broken {
            fn bounds(&self) -> BoundingBox {
                BoundingBox::unit()
            }
            fn render_order_key(&self, _viewer_position: Vec3) -> RenderOrderKey {
                RenderOrderKey::MIN
            }
            fn stages(&self) -> &'static [&'static str] {
                &[STANDARD_STAGE]
            }
            fn render(&mut self, context: &mut RecordingContext, _stage: &str) -> Result<(), GraphicsError> {
                // Nothing bound
                context.draw_indexed(3, 0, PrimitiveTopology::TriangleList)
            }
        }

        let mut broken = Broken;
        let mut items: [&mut dyn RenderItem<RecordingContext>; 1] = [&mut broken];
        let mut context = RecordingContext::new();
        let result = RenderQueue::new().render_stage(&mut items, &mut context, STANDARD_STAGE, &wide_frustum());
        assert!(matches!(result, Err(GraphicsError::MissingBinding(_))));
    }
}
