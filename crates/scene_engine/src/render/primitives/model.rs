//! GPU-resident model

use std::sync::Arc;

use crate::assets::ModelData;
use crate::render::backend::{BackendError, BackendResult, GpuBuffer, GraphicsBackend, VertexLayout};

/// Vertex data uploaded to a device buffer
///
/// Keeps the shared [`ModelData`] it was built from, so several models
/// created from one cache entry point at the same parsed vertices.
pub struct Model {
    buffer: Box<dyn GpuBuffer>,
    data: Arc<ModelData>,
    layout: VertexLayout,
}

impl Model {
    /// Create a buffer on `backend` and upload `data` into it
    ///
    /// Empty vertex data is rejected.
    pub fn upload(backend: &dyn GraphicsBackend, data: Arc<ModelData>) -> BackendResult<Self> {
        if data.is_empty() {
            return Err(BackendError::Upload("model has no vertices".to_string()));
        }

        let layout = VertexLayout::from_stride(data.stride());
        let mut buffer = backend.create_buffer();
        buffer.upload_interleaved(data.vertices(), data.vertex_count(), &layout)?;

        log::trace!(
            "Uploaded model: {} vertices, stride {}, normals: {}, texcoords: {}",
            data.vertex_count(),
            data.stride(),
            layout.has_normals(),
            layout.has_texcoords()
        );

        Ok(Self { buffer, data, layout })
    }

    /// Draw every vertex as a triangle list
    pub fn draw(&self) {
        self.buffer.draw_triangles();
    }

    /// Whether the buffer holds vertices
    pub fn is_loaded(&self) -> bool {
        self.buffer.vertex_count() > 0
    }

    /// Number of uploaded vertices
    pub fn vertex_count(&self) -> usize {
        self.buffer.vertex_count()
    }

    /// Layout the vertices were uploaded with
    pub const fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    /// Source vertex data
    pub const fn data(&self) -> &Arc<ModelData> {
        &self.data
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("vertex_count", &self.vertex_count())
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}
