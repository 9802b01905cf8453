//! Backend abstraction traits for the rendering system
//!
//! The scene never talks to a graphics API directly. Shader programs, vertex
//! buffers and textures are reached through the traits in this module; a
//! windowed application supplies GL-backed implementations, while
//! [`HeadlessBackend`](super::headless::HeadlessBackend) records every call.

use std::rc::Rc;

use crate::foundation::math::{Mat3, Mat4, Vec2, Vec3, Vec4};

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// A value that can be written to a shader uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `float`
    Float(f32),
    /// `int` (also used for sampler units and boolean flags)
    Int(i32),
    /// `bool`
    Bool(bool),
    /// `vec2`
    Vec2(Vec2),
    /// `vec3`
    Vec3(Vec3),
    /// `vec4`
    Vec4(Vec4),
    /// `mat3`
    Mat3(Mat3),
    /// `mat4`
    Mat4(Mat4),
}

impl UniformValue {
    /// The `mat4` payload, if this is one
    pub const fn as_mat4(&self) -> Option<&Mat4> {
        if let Self::Mat4(m) = self { Some(m) } else { None }
    }

    /// The `vec3` payload, if this is one
    pub const fn as_vec3(&self) -> Option<&Vec3> {
        if let Self::Vec3(v) = self { Some(v) } else { None }
    }

    /// The `float` payload, if this is one
    pub const fn as_float(&self) -> Option<f32> {
        if let Self::Float(f) = self { Some(*f) } else { None }
    }

    /// The `int` payload, if this is one
    pub const fn as_int(&self) -> Option<i32> {
        if let Self::Int(i) = self { Some(*i) } else { None }
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec2> for UniformValue {
    fn from(value: Vec2) -> Self {
        Self::Vec2(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        Self::Vec3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        Self::Vec4(value)
    }
}

impl From<Mat3> for UniformValue {
    fn from(value: Mat3) -> Self {
        Self::Mat3(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        Self::Mat4(value)
    }
}

/// A linked shader program
///
/// Programs are shared between drawable objects (`Rc<dyn ShaderProgram>`),
/// so every method takes `&self`.
pub trait ShaderProgram {
    /// Make this the active program
    fn use_program(&self);

    /// Deactivate this program
    fn unuse(&self);

    /// Location of a uniform, `None` if the program does not declare it
    fn uniform_location(&self, name: &str) -> Option<i32>;

    /// Whether the program declares `name`
    fn has_uniform(&self, name: &str) -> bool {
        self.uniform_location(name).is_some()
    }

    /// Write a uniform; writing an undeclared uniform does nothing
    fn set_uniform(&self, name: &str, value: UniformValue);
}

/// One attribute inside an interleaved vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader attribute location
    pub location: u32,
    /// Number of floats
    pub components: usize,
    /// Offset in floats from the start of the vertex
    pub offset: usize,
}

/// Interleaved vertex layout derived from the stride
///
/// Position is always present (location 0). A stride of 6 or more adds a
/// normal (location 1), a stride of 8 or more adds a texture coordinate
/// (location 2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    stride: usize,
    attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Attribute location of the position
    pub const POSITION: u32 = 0;
    /// Attribute location of the normal
    pub const NORMAL: u32 = 1;
    /// Attribute location of the texture coordinate
    pub const TEXCOORD: u32 = 2;

    /// Derive the layout for `stride` floats per vertex
    pub fn from_stride(stride: usize) -> Self {
        let mut attributes = vec![VertexAttribute {
            location: Self::POSITION,
            components: 3,
            offset: 0,
        }];

        if stride >= 6 {
            attributes.push(VertexAttribute {
                location: Self::NORMAL,
                components: 3,
                offset: 3,
            });
        }

        if stride >= 8 {
            attributes.push(VertexAttribute {
                location: Self::TEXCOORD,
                components: 2,
                offset: 6,
            });
        }

        Self { stride, attributes }
    }

    /// Floats per vertex
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Bytes per vertex
    pub const fn stride_bytes(&self) -> usize {
        self.stride * std::mem::size_of::<f32>()
    }

    /// Enabled attributes in location order
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Whether normals are part of the vertex
    pub fn has_normals(&self) -> bool {
        self.attributes.iter().any(|a| a.location == Self::NORMAL)
    }

    /// Whether texture coordinates are part of the vertex
    pub fn has_texcoords(&self) -> bool {
        self.attributes.iter().any(|a| a.location == Self::TEXCOORD)
    }
}

/// A vertex buffer on the graphics device
pub trait GpuBuffer {
    /// Upload interleaved vertex data, replacing any previous contents
    fn upload_interleaved(&mut self, data: &[f32], vertex_count: usize, layout: &VertexLayout) -> BackendResult<()>;

    /// Issue a triangle-list draw of the uploaded vertices
    fn draw_triangles(&self);

    /// Number of uploaded vertices
    fn vertex_count(&self) -> usize;
}

/// A 2D texture on the graphics device
pub trait Texture {
    /// Bind to a texture unit
    fn bind(&self, unit: u32);

    /// Unbind from whatever unit it is bound to
    fn unbind(&self);

    /// Whether the image was loaded successfully
    fn is_loaded(&self) -> bool;
}

/// Factory for device resources
pub trait GraphicsBackend {
    /// Create an empty vertex buffer
    fn create_buffer(&self) -> Box<dyn GpuBuffer>;

    /// Compile and link a program from a vertex and a fragment shader file
    fn create_shader(&self, vertex_path: &str, fragment_path: &str) -> BackendResult<Rc<dyn ShaderProgram>>;

    /// Load a texture from an image file
    fn load_texture(&self, path: &str) -> BackendResult<Rc<dyn Texture>>;
}

/// Backend errors
#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    /// Shader compilation or linking failed
    #[error("Shader compilation failed for {path}: {reason}")]
    ShaderCompile {
        /// Offending shader file
        path: String,
        /// Compiler message
        reason: String,
    },

    /// Texture could not be loaded
    #[error("Texture load failed for {path}: {reason}")]
    TextureLoad {
        /// Offending image file
        path: String,
        /// Loader message
        reason: String,
    },

    /// Vertex data does not match the declared layout
    #[error("Vertex upload rejected: {0}")]
    Upload(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_position_only() {
        let layout = VertexLayout::from_stride(3);
        assert_eq!(layout.attributes().len(), 1);
        assert!(!layout.has_normals());
        assert!(!layout.has_texcoords());
        assert_eq!(layout.stride_bytes(), 12);
    }

    #[test]
    fn test_layout_with_normals() {
        let layout = VertexLayout::from_stride(6);
        assert!(layout.has_normals());
        assert!(!layout.has_texcoords());
        assert_eq!(layout.attributes()[1].offset, 3);
    }

    #[test]
    fn test_layout_full() {
        let layout = VertexLayout::from_stride(8);
        assert!(layout.has_normals());
        assert!(layout.has_texcoords());
        assert_eq!(layout.attributes()[2], VertexAttribute { location: 2, components: 2, offset: 6 });
    }

    #[test]
    fn test_uniform_value_conversions() {
        assert_eq!(UniformValue::from(1.5_f32).as_float(), Some(1.5));
        assert_eq!(UniformValue::from(3_i32).as_int(), Some(3));
        assert_eq!(UniformValue::from(Vec3::x()).as_vec3(), Some(&Vec3::x()));
        assert!(UniformValue::from(Mat4::identity()).as_mat4().is_some());
        assert!(UniformValue::Bool(true).as_mat4().is_none());
    }
}
