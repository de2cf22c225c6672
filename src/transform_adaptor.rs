//! Affine transform stage of the vertex pipeline.

use crate::basics::{is_vertex, VertexSource};
use crate::trans_affine::TransAffine;

/// Maps every vertex of the wrapped source through a [`TransAffine`].
///
/// END_POLY and STOP pass through untouched since their coordinates carry
/// no geometry.
pub struct TransformAdaptor<VS: VertexSource> {
    source: VS,
    mtx: TransAffine,
}

impl<VS: VertexSource> TransformAdaptor<VS> {
    pub fn new(source: VS, mtx: TransAffine) -> Self {
        Self { source, mtx }
    }

    pub fn set_transform(&mut self, mtx: TransAffine) {
        self.mtx = mtx;
    }

    pub fn transform(&self) -> &TransAffine {
        &self.mtx
    }

    pub fn source_mut(&mut self) -> &mut VS {
        &mut self.source
    }
}

impl<VS: VertexSource> VertexSource for TransformAdaptor<VS> {
    fn rewind(&mut self, path_id: u32) {
        self.source.rewind(path_id);
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        let cmd = self.source.vertex(x, y);
        if is_vertex(cmd) {
            self.mtx.transform(x, y);
        }
        cmd
    }
}
