//! Drawable scene objects

use std::rc::Rc;
use std::sync::Arc;

use crate::assets::{ModelCache, ModelData};
use crate::foundation::math::{Mat4, Vec3};
use crate::render::{GraphicsBackend, Model, ShaderProgram, Texture};
use crate::transform::{ComponentHandle, TransformComponent, Transformation};

use super::SceneObject;

/// Default Phong exponent
pub const DEFAULT_SHININESS: f32 = 32.0;

/// A model placed in the world with a transform, a shader and a material
///
/// The model and shader are optional until assigned; an object missing
/// either is skipped at draw time.
pub struct DrawableObject {
    id: i32,
    model: Option<Model>,
    transformation: Transformation,
    shader: Option<Rc<dyn ShaderProgram>>,
    texture: Option<Rc<dyn Texture>>,
    object_color: Vec3,
    shininess: f32,
}

impl Default for DrawableObject {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawableObject {
    /// White object with no model, shader or transform
    pub fn new() -> Self {
        Self {
            id: 0,
            model: None,
            transformation: Transformation::new(),
            shader: None,
            texture: None,
            object_color: Vec3::new(1.0, 1.0, 1.0),
            shininess: DEFAULT_SHININESS,
        }
    }

    /// Load the float array `array` from a header file
    ///
    /// Returns `false` and leaves the model unset on failure.
    pub fn load_model(&mut self, cache: &ModelCache, backend: &dyn GraphicsBackend, path: &str, array: &str) -> bool {
        let data = cache.load_model(path, array);
        self.upload(backend, data, &format!("{path}#{array}"))
    }

    /// Load a one-vertex-per-line text file
    pub fn load_model_from_text(&mut self, cache: &ModelCache, backend: &dyn GraphicsBackend, path: &str) -> bool {
        let data = cache.load_model_from_text(path);
        self.upload(backend, data, path)
    }

    /// Load a Wavefront OBJ file
    pub fn load_model_from_obj(&mut self, cache: &ModelCache, backend: &dyn GraphicsBackend, path: &str) -> bool {
        let data = cache.load_model_from_obj(path);
        self.upload(backend, data, path)
    }

    fn upload(&mut self, backend: &dyn GraphicsBackend, data: Option<Arc<ModelData>>, source: &str) -> bool {
        let Some(data) = data else {
            log::error!("Object {}: no vertex data from {}", self.id, source);
            return false;
        };

        match Model::upload(backend, data) {
            Ok(model) => {
                log::debug!("Object {}: model {} ready ({} vertices)", self.id, source, model.vertex_count());
                self.model = Some(model);
                true
            }
            Err(e) => {
                log::error!("Object {}: failed to upload {}: {}", self.id, source, e);
                false
            }
        }
    }

    /// Issue the draw call
    ///
    /// The shader must already be active with its uniforms written. Returns
    /// `false` (with a log line) when no model or shader is assigned.
    pub fn draw(&self) -> bool {
        match (&self.model, &self.shader) {
            (Some(model), Some(_)) => {
                model.draw();
                true
            }
            (None, _) => {
                log::warn!("Object {} has no model, skipping draw", self.id);
                false
            }
            (_, None) => {
                log::warn!("Object {} has no shader, skipping draw", self.id);
                false
            }
        }
    }

    /// Advance the transform by `delta_time` seconds
    pub fn update(&mut self, delta_time: f32) {
        self.transformation.advance(delta_time);
    }

    /// Append a static transform component
    pub fn add_static_transform(&mut self, component: TransformComponent) -> ComponentHandle {
        self.transformation.add_static(component)
    }

    /// Append a dynamic transform component
    pub fn add_dynamic_transform(&mut self, component: TransformComponent) -> ComponentHandle {
        self.transformation.add_dynamic(component)
    }

    /// The object's transform composite
    pub const fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    /// Mutable transform composite
    pub fn transformation_mut(&mut self) -> &mut Transformation {
        &mut self.transformation
    }

    /// Combined model matrix
    pub fn model_matrix(&self) -> Mat4 {
        self.transformation.matrix()
    }

    /// Assign a shader owned by the scene
    pub fn set_shader(&mut self, shader: Rc<dyn ShaderProgram>) {
        self.shader = Some(shader);
    }

    /// Assigned shader
    pub fn shader(&self) -> Option<&Rc<dyn ShaderProgram>> {
        self.shader.as_ref()
    }

    /// Assign a texture
    pub fn set_texture(&mut self, texture: Rc<dyn Texture>) {
        self.texture = Some(texture);
    }

    /// Remove the texture
    pub fn clear_texture(&mut self) {
        self.texture = None;
    }

    /// Assigned texture
    pub fn texture(&self) -> Option<&Rc<dyn Texture>> {
        self.texture.as_ref()
    }

    /// Loaded model
    pub const fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Whether a model is loaded
    pub const fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Base color
    pub fn set_object_color(&mut self, color: Vec3) {
        self.object_color = color;
    }

    /// Base color
    pub fn object_color(&self) -> Vec3 {
        self.object_color
    }

    /// Phong exponent
    pub fn set_shininess(&mut self, shininess: f32) {
        self.shininess = shininess;
    }

    /// Phong exponent
    pub const fn shininess(&self) -> f32 {
        self.shininess
    }

    /// Assign an id
    pub fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    /// Object id
    pub const fn id(&self) -> i32 {
        self.id
    }
}

impl SceneObject for DrawableObject {
    fn update(&mut self, delta_time: f32) {
        Self::update(self, delta_time);
    }

    fn drawable(&self) -> &DrawableObject {
        self
    }

    fn drawable_mut(&mut self) -> &mut DrawableObject {
        self
    }
}

impl std::fmt::Debug for DrawableObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawableObject")
            .field("id", &self.id)
            .field("model", &self.model)
            .field("has_shader", &self.shader.is_some())
            .field("has_texture", &self.texture.is_some())
            .field("object_color", &self.object_color)
            .field("shininess", &self.shininess)
            .finish_non_exhaustive()
    }
}
