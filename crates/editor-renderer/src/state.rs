//! Scoped pipeline-state overrides

use std::ops::{Deref, DerefMut};

use crate::graphics::{PipelineStates, RenderContext};

/// Snapshots the context's depth-stencil, rasterizer and blend state and
/// puts them back when dropped, including on early return through `?`.
pub struct StateScope<'a, C: RenderContext + ?Sized> {
    context: &'a mut C,
    saved: PipelineStates,
}

impl<'a, C: RenderContext + ?Sized> StateScope<'a, C> {
    pub fn new(context: &'a mut C) -> Self {
        let saved = context.pipeline_states();
        Self { context, saved }
    }

    /// State that will be restored on drop
    pub fn saved(&self) -> PipelineStates {
        self.saved
    }
}

impl<C: RenderContext + ?Sized> Deref for StateScope<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.context
    }
}

impl<C: RenderContext + ?Sized> DerefMut for StateScope<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.context
    }
}

impl<C: RenderContext + ?Sized> Drop for StateScope<'_, C> {
    fn drop(&mut self) {
        self.context.set_pipeline_states(self.saved);
    }
}
