//! Headless rendering backend
//!
//! Implements the backend traits without a graphics device. Every program
//! activation, uniform write, texture bind and draw is appended to a shared
//! [`RenderEvent`] journal, which tests and the demo inspect after a frame.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::backend::{
    BackendError, BackendResult, GpuBuffer, GraphicsBackend, ShaderProgram, Texture, UniformValue,
    VertexLayout,
};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// A program became active
    UseProgram {
        /// Program id
        shader: u32,
    },
    /// A program was deactivated
    Unuse {
        /// Program id
        shader: u32,
    },
    /// A declared uniform was written
    SetUniform {
        /// Program id
        shader: u32,
        /// Uniform name
        name: String,
        /// Written value
        value: UniformValue,
    },
    /// A texture was bound
    BindTexture {
        /// Texture id
        texture: u32,
        /// Texture unit
        unit: u32,
    },
    /// A texture was unbound
    UnbindTexture {
        /// Texture id
        texture: u32,
    },
    /// Vertex data was uploaded
    Upload {
        /// Buffer id
        buffer: u32,
        /// Vertices uploaded
        vertex_count: usize,
        /// Floats per vertex
        stride: usize,
    },
    /// Triangles were drawn
    Draw {
        /// Buffer id
        buffer: u32,
        /// Program active at draw time
        shader: Option<u32>,
        /// Vertices drawn
        vertex_count: usize,
    },
}

/// Journal shared by every resource of one [`HeadlessBackend`]
#[derive(Debug, Default)]
pub struct RenderLog {
    events: Vec<RenderEvent>,
    active_shader: Option<u32>,
}

impl RenderLog {
    fn push(&mut self, event: RenderEvent) {
        match &event {
            RenderEvent::UseProgram { shader } => self.active_shader = Some(*shader),
            RenderEvent::Unuse { shader } if self.active_shader == Some(*shader) => self.active_shader = None,
            _ => {}
        }
        self.events.push(event);
    }

    /// Recorded events, oldest first
    pub fn events(&self) -> &[RenderEvent] {
        &self.events
    }

    /// Currently active program
    pub const fn active_shader(&self) -> Option<u32> {
        self.active_shader
    }
}

type SharedLog = Rc<RefCell<RenderLog>>;

/// Shader program that records what is written to it
///
/// By default every uniform name is accepted. [`with_uniforms`](Self::with_uniforms)
/// restricts the program to a declared set, mimicking a GLSL program that
/// does not use some uniforms.
#[derive(Debug)]
pub struct RecordingShader {
    id: u32,
    declared: Option<HashSet<String>>,
    locations: RefCell<HashMap<String, i32>>,
    values: RefCell<HashMap<String, UniformValue>>,
    write_counts: RefCell<HashMap<String, usize>>,
    use_count: Cell<usize>,
    active: Cell<bool>,
    log: SharedLog,
}

impl RecordingShader {
    /// A program with its own private journal
    pub fn new(id: u32) -> Self {
        Self::with_log(id, Rc::default())
    }

    fn with_log(id: u32, log: SharedLog) -> Self {
        Self {
            id,
            declared: None,
            locations: RefCell::new(HashMap::new()),
            values: RefCell::new(HashMap::new()),
            write_counts: RefCell::new(HashMap::new()),
            use_count: Cell::new(0),
            active: Cell::new(false),
            log,
        }
    }

    /// Restrict the program to the given uniform names
    #[must_use]
    pub fn with_uniforms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Program id
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Last value written to `name`
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.values.borrow().get(name).copied()
    }

    /// How many times `name` was written
    pub fn write_count(&self, name: &str) -> usize {
        self.write_counts.borrow().get(name).copied().unwrap_or(0)
    }

    /// Names that received at least one write
    pub fn written_uniforms(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// How many times the program was activated
    pub fn use_count(&self) -> usize {
        self.use_count.get()
    }

    /// Whether the program is currently active
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Forget recorded values and counters (keeps declared uniforms)
    pub fn reset(&self) {
        self.values.borrow_mut().clear();
        self.write_counts.borrow_mut().clear();
        self.use_count.set(0);
    }
}

impl ShaderProgram for RecordingShader {
    fn use_program(&self) {
        self.active.set(true);
        self.use_count.set(self.use_count.get() + 1);
        self.log.borrow_mut().push(RenderEvent::UseProgram { shader: self.id });
    }

    fn unuse(&self) {
        self.active.set(false);
        self.log.borrow_mut().push(RenderEvent::Unuse { shader: self.id });
    }

    fn uniform_location(&self, name: &str) -> Option<i32> {
        if let Some(declared) = &self.declared {
            if !declared.contains(name) {
                return None;
            }
        }

        let mut locations = self.locations.borrow_mut();
        let next = i32::try_from(locations.len()).unwrap_or(i32::MAX);
        Some(*locations.entry(name.to_string()).or_insert(next))
    }

    fn set_uniform(&self, name: &str, value: UniformValue) {
        if self.uniform_location(name).is_none() {
            log::trace!("Shader {} ignores undeclared uniform '{}'", self.id, name);
            return;
        }

        self.values.borrow_mut().insert(name.to_string(), value);
        *self.write_counts.borrow_mut().entry(name.to_string()).or_insert(0) += 1;
        self.log.borrow_mut().push(RenderEvent::SetUniform {
            shader: self.id,
            name: name.to_string(),
            value,
        });
    }
}

/// Vertex buffer that keeps the uploaded data
#[derive(Debug)]
pub struct RecordingBuffer {
    id: u32,
    data: Vec<f32>,
    vertex_count: usize,
    draw_count: Cell<usize>,
    log: SharedLog,
}

impl RecordingBuffer {
    /// Buffer id
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Uploaded data as the bytes a device would receive
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Uploaded data
    pub fn floats(&self) -> &[f32] {
        &self.data
    }

    /// How many draws were issued
    pub fn draw_count(&self) -> usize {
        self.draw_count.get()
    }
}

impl GpuBuffer for RecordingBuffer {
    fn upload_interleaved(&mut self, data: &[f32], vertex_count: usize, layout: &VertexLayout) -> BackendResult<()> {
        if layout.stride() == 0 || data.len() != vertex_count * layout.stride() {
            return Err(BackendError::Upload(format!(
                "{} floats for {} vertices of stride {}",
                data.len(),
                vertex_count,
                layout.stride()
            )));
        }

        self.data = data.to_vec();
        self.vertex_count = vertex_count;
        self.log.borrow_mut().push(RenderEvent::Upload {
            buffer: self.id,
            vertex_count,
            stride: layout.stride(),
        });
        Ok(())
    }

    fn draw_triangles(&self) {
        self.draw_count.set(self.draw_count.get() + 1);
        let mut log = self.log.borrow_mut();
        let shader = log.active_shader();
        log.push(RenderEvent::Draw {
            buffer: self.id,
            shader,
            vertex_count: self.vertex_count,
        });
    }

    fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

/// Texture whose image header was read from disk
#[derive(Debug)]
pub struct HeadlessTexture {
    id: u32,
    path: String,
    width: u32,
    height: u32,
    bound_unit: Cell<Option<u32>>,
    log: SharedLog,
}

impl HeadlessTexture {
    /// Texture id
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Source image path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Image size in pixels
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Unit the texture is bound to, if any
    pub fn bound_unit(&self) -> Option<u32> {
        self.bound_unit.get()
    }
}

impl Texture for HeadlessTexture {
    fn bind(&self, unit: u32) {
        self.bound_unit.set(Some(unit));
        self.log.borrow_mut().push(RenderEvent::BindTexture { texture: self.id, unit });
    }

    fn unbind(&self) {
        self.bound_unit.set(None);
        self.log.borrow_mut().push(RenderEvent::UnbindTexture { texture: self.id });
    }

    fn is_loaded(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Backend without a device
///
/// Shader sources and images are still read from disk, so missing files fail
/// the same way they would with a real device.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    log: SharedLog,
    next_id: Cell<u32>,
    declared_uniforms: Option<Vec<String>>,
    shaders: RefCell<Vec<Rc<RecordingShader>>>,
}

impl HeadlessBackend {
    /// Create a backend whose shaders accept every uniform
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict every shader created afterwards to the given uniform names
    #[must_use]
    pub fn with_uniforms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared_uniforms = Some(names.into_iter().map(Into::into).collect());
        self
    }

    fn allocate_id(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    /// Create a recording shader directly, without shader files
    pub fn recording_shader(&self) -> Rc<RecordingShader> {
        let mut shader = RecordingShader::with_log(self.allocate_id(), Rc::clone(&self.log));
        if let Some(names) = &self.declared_uniforms {
            shader = shader.with_uniforms(names.iter().cloned());
        }

        let shader = Rc::new(shader);
        self.shaders.borrow_mut().push(Rc::clone(&shader));
        shader
    }

    /// Every shader created so far, in creation order
    pub fn shaders(&self) -> Vec<Rc<RecordingShader>> {
        self.shaders.borrow().clone()
    }

    /// Snapshot of the event journal
    pub fn events(&self) -> Vec<RenderEvent> {
        self.log.borrow().events().to_vec()
    }

    /// Number of draw events recorded
    pub fn draw_count(&self) -> usize {
        self.log
            .borrow()
            .events()
            .iter()
            .filter(|e| matches!(e, RenderEvent::Draw { .. }))
            .count()
    }

    /// Drop recorded events (e.g. between frames)
    pub fn clear_events(&self) {
        self.log.borrow_mut().events.clear();
    }

    fn read_shader_source(path: &str) -> BackendResult<String> {
        let source = std::fs::read_to_string(path).map_err(|e| BackendError::ShaderCompile {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        if source.trim().is_empty() {
            return Err(BackendError::ShaderCompile {
                path: path.to_string(),
                reason: "empty shader source".to_string(),
            });
        }
        Ok(source)
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn create_buffer(&self) -> Box<dyn GpuBuffer> {
        Box::new(RecordingBuffer {
            id: self.allocate_id(),
            data: Vec::new(),
            vertex_count: 0,
            draw_count: Cell::new(0),
            log: Rc::clone(&self.log),
        })
    }

    fn create_shader(&self, vertex_path: &str, fragment_path: &str) -> BackendResult<Rc<dyn ShaderProgram>> {
        Self::read_shader_source(vertex_path)?;
        Self::read_shader_source(fragment_path)?;

        let shader = self.recording_shader();
        log::debug!("Created shader {} from {} + {}", shader.id(), vertex_path, fragment_path);
        Ok(shader as Rc<dyn ShaderProgram>)
    }

    fn load_texture(&self, path: &str) -> BackendResult<Rc<dyn Texture>> {
        let (width, height) = image::image_dimensions(path).map_err(|e| BackendError::TextureLoad {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        log::debug!("Loaded texture {} ({}x{})", path, width, height);
        let texture: Rc<dyn Texture> = Rc::new(HeadlessTexture {
            id: self.allocate_id(),
            path: path.to_string(),
            width,
            height,
            bound_unit: Cell::new(None),
            log: Rc::clone(&self.log),
        });
        Ok(texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn shader_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn test_restricted_shader_ignores_unknown_uniforms() {
        let shader = RecordingShader::new(1).with_uniforms(["modelMatrix"]);
        assert!(shader.has_uniform("modelMatrix"));
        assert!(!shader.has_uniform("cameraPosition"));

        shader.set_uniform("cameraPosition", Vec3::x().into());
        assert_eq!(shader.uniform("cameraPosition"), None);
        assert_eq!(shader.write_count("cameraPosition"), 0);
    }

    #[test]
    fn test_locations_are_stable() {
        let shader = RecordingShader::new(1);
        let first = shader.uniform_location("a");
        let second = shader.uniform_location("b");
        assert_ne!(first, second);
        assert_eq!(shader.uniform_location("a"), first);
    }

    #[test]
    fn test_draw_records_active_shader() {
        let backend = HeadlessBackend::new();
        let shader = backend.recording_shader();
        let mut buffer = backend.create_buffer();
        buffer
            .upload_interleaved(&[0.0; 9], 3, &VertexLayout::from_stride(3))
            .unwrap();

        shader.use_program();
        buffer.draw_triangles();
        shader.unuse();

        let events = backend.events();
        assert!(events.contains(&RenderEvent::Draw {
            buffer: 2,
            shader: Some(shader.id()),
            vertex_count: 3,
        }));
        assert_eq!(backend.draw_count(), 1);
    }

    #[test]
    fn test_buffer_exposes_uploaded_bytes() {
        let mut buffer = RecordingBuffer {
            id: 7,
            data: Vec::new(),
            vertex_count: 0,
            draw_count: Cell::new(0),
            log: Rc::default(),
        };
        buffer
            .upload_interleaved(&[1.0; 12], 2, &VertexLayout::from_stride(6))
            .unwrap();

        assert_eq!(buffer.bytes().len(), 48);
        assert_eq!(buffer.floats().len(), 12);
        assert_eq!(buffer.vertex_count(), 2);
    }

    #[test]
    fn test_upload_rejects_mismatched_length() {
        let backend = HeadlessBackend::new();
        let mut buffer = backend.create_buffer();
        let result = buffer.upload_interleaved(&[0.0; 10], 3, &VertexLayout::from_stride(3));
        assert!(matches!(result, Err(BackendError::Upload(_))));
        assert_eq!(buffer.vertex_count(), 0);
    }

    #[test]
    fn test_create_shader_reads_sources() {
        let vertex = shader_file("void main() {}");
        let fragment = shader_file("void main() {}");
        let backend = HeadlessBackend::new();

        let shader = backend.create_shader(
            vertex.path().to_str().unwrap(),
            fragment.path().to_str().unwrap(),
        );
        assert!(shader.is_ok());
        assert_eq!(backend.shaders().len(), 1);
    }

    #[test]
    fn test_create_shader_missing_file_fails() {
        let backend = HeadlessBackend::new();
        let result = backend.create_shader("does/not/exist.vert", "does/not/exist.frag");
        assert!(matches!(result, Err(BackendError::ShaderCompile { .. })));
        assert!(backend.shaders().is_empty());
    }

    #[test]
    fn test_empty_shader_source_fails() {
        let vertex = shader_file("   \n");
        let fragment = shader_file("void main() {}");
        let backend = HeadlessBackend::new();

        let result = backend.create_shader(
            vertex.path().to_str().unwrap(),
            fragment.path().to_str().unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_texture_fails() {
        let backend = HeadlessBackend::new();
        assert!(matches!(
            backend.load_texture("missing.png"),
            Err(BackendError::TextureLoad { .. })
        ));
    }
}
