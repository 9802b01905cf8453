//! # Scene
//!
//! A scene owns its objects, camera and shaders, and references lights it
//! does not own. Rendering walks the objects in insertion order and writes
//! the per-object uniform set before each draw.
//!
//! ## Uniforms
//!
//! | Name | Type | Written |
//! |------|------|---------|
//! | `modelMatrix`, `normalMatrix` | mat4, mat3 | always |
//! | `viewMatrix`, `projectionMatrix` | mat4 | always |
//! | `cameraPosition` | vec3 | with a camera, if declared |
//! | `numLights`, `lights[i].*` | int, struct | if declared |
//! | `spotlight.*` | struct | spotlight set, else `enabled = 0` |
//! | `objectColor`, `shininess` | vec3, float | if declared |
//! | `textureUnitID`, `useTexture` | int | if declared |

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::foundation::math::{utils, Mat4, Vec3};
use crate::render::{
    Camera, CameraObserver, GraphicsBackend, Light, LightId, LightObserver, LightSlot, ShaderProgram, SpotLight,
    UniformValue, SPOTLIGHT_BLOCK,
};

use super::{LightObject, SceneError, SceneObject, MAX_SCENE_LIGHTS};

/// Counters from one [`Scene::render`] pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Objects drawn
    pub drawn: usize,
    /// Objects skipped for a missing shader or model
    pub skipped: usize,
    /// Point lights uploaded per drawn object (0 when nothing was drawn)
    pub lights_bound: usize,
}

/// The scene's observer half, shared with the camera and the lights
#[derive(Debug)]
struct SceneLink {
    view: Cell<Mat4>,
    projection: Cell<Mat4>,
    lights: RefCell<Vec<(LightId, Weak<RefCell<Light>>)>>,
    camera_changes: Cell<u64>,
    light_changes: Cell<u64>,
}

impl SceneLink {
    fn new() -> Self {
        Self {
            view: Cell::new(Mat4::identity()),
            projection: Cell::new(Mat4::identity()),
            lights: RefCell::new(Vec::new()),
            camera_changes: Cell::new(0),
            light_changes: Cell::new(0),
        }
    }

    fn tracks(&self, id: LightId) -> bool {
        self.lights.borrow().iter().any(|(tracked, _)| *tracked == id)
    }

    /// Lights still alive, in registration order
    fn live_lights(&self) -> Vec<Rc<RefCell<Light>>> {
        let mut lights = self.lights.borrow_mut();
        lights.retain(|(_, weak)| weak.strong_count() > 0);
        lights.iter().filter_map(|(_, weak)| weak.upgrade()).collect()
    }
}

impl CameraObserver for SceneLink {
    fn on_camera_changed(&self, camera: &Camera) {
        self.view.set(camera.view_matrix());
        self.projection.set(camera.projection_matrix());
        self.camera_changes.set(self.camera_changes.get() + 1);
    }
}

impl LightObserver for SceneLink {
    fn on_light_changed(&self, _light: &Light) {
        self.light_changes.set(self.light_changes.get() + 1);
    }

    fn on_light_destroyed(&self, light: &Light) {
        let id = light.id();
        match self.lights.try_borrow_mut() {
            Ok(mut lights) => lights.retain(|(tracked, _)| *tracked != id),
            // dead weak entries are pruned on the next render anyway
            Err(_) => log::debug!("Light {:?} destroyed during light iteration", id),
        }
        log::debug!("Light {:?} removed from scene", id);
    }
}

/// Objects, a camera, lights and shaders rendered together
pub struct Scene {
    objects: Vec<Box<dyn SceneObject>>,
    camera: Option<Camera>,
    spotlight: Option<Rc<RefCell<SpotLight>>>,
    shaders: Vec<Rc<dyn ShaderProgram>>,
    camera_observers: Vec<Rc<dyn CameraObserver>>,
    link: Rc<SceneLink>,
    camera_link: Rc<dyn CameraObserver>,
    light_link: Rc<dyn LightObserver>,
    max_lights: usize,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene without a camera
    pub fn new() -> Self {
        let link = Rc::new(SceneLink::new());
        let camera_link: Rc<dyn CameraObserver> = link.clone();
        let light_link: Rc<dyn LightObserver> = link.clone();

        Self {
            objects: Vec::new(),
            camera: None,
            spotlight: None,
            shaders: Vec::new(),
            camera_observers: Vec::new(),
            link,
            camera_link,
            light_link,
            max_lights: MAX_SCENE_LIGHTS,
        }
    }

    /// Builder: cap the number of point lights uploaded per object
    #[must_use]
    pub fn with_max_lights(mut self, max_lights: usize) -> Self {
        self.set_max_lights(max_lights);
        self
    }

    /// Cap the number of point lights uploaded per object (1..=20)
    pub fn set_max_lights(&mut self, max_lights: usize) {
        self.max_lights = max_lights.clamp(1, MAX_SCENE_LIGHTS);
    }

    /// Current light cap
    pub const fn max_lights(&self) -> usize {
        self.max_lights
    }

    // ===== OBJECTS =====

    /// Take ownership of an object; a light it carries is registered too
    pub fn add_object<O: SceneObject + 'static>(&mut self, object: O) {
        self.add_boxed_object(Box::new(object));
    }

    /// [`add_object`](Self::add_object) for an already boxed object
    pub fn add_boxed_object(&mut self, object: Box<dyn SceneObject>) {
        if let Some(light) = object.light() {
            self.add_light(&light);
        }
        log::debug!("Object {} added to scene ({} total)", object.id(), self.objects.len() + 1);
        self.objects.push(object);
    }

    /// Take ownership of a light object and register its light
    pub fn add_light_object(&mut self, object: LightObject) {
        self.add_object(object);
    }

    /// Remove and drop the first object with `id`
    ///
    /// A light carried by the object is dropped with it and leaves every
    /// scene that tracked it.
    pub fn remove_object(&mut self, id: i32) -> bool {
        let Some(index) = self.objects.iter().position(|object| object.id() == id) else {
            log::warn!("No object with id {} to remove", id);
            return false;
        };
        drop(self.objects.remove(index));
        true
    }

    /// Object at `index` in render order
    pub fn object(&self, index: usize) -> Option<&dyn SceneObject> {
        match self.objects.get(index) {
            Some(object) => Some(object.as_ref()),
            None => {
                log::error!("{}", SceneError::IndexOutOfRange { index, len: self.objects.len() });
                None
            }
        }
    }

    /// Mutable object at `index` in render order
    pub fn object_mut(&mut self, index: usize) -> Option<&mut (dyn SceneObject + 'static)> {
        let len = self.objects.len();
        match self.objects.get_mut(index) {
            Some(object) => Some(&mut **object),
            None => {
                log::error!("{}", SceneError::IndexOutOfRange { index, len });
                None
            }
        }
    }

    /// Objects in render order
    pub fn objects(&self) -> impl Iterator<Item = &dyn SceneObject> + '_ {
        self.objects.iter().map(|object| object.as_ref() as &dyn SceneObject)
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when the scene has no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Drop every object; camera, lights and shaders stay
    pub fn clear(&mut self) {
        log::debug!("Clearing {} objects", self.objects.len());
        self.objects.clear();
    }

    // ===== LIGHTS =====

    /// Track a light without owning it
    ///
    /// Returns `false` if the light is already tracked or currently borrowed.
    pub fn add_light(&mut self, light: &Rc<RefCell<Light>>) -> bool {
        let Ok(mut borrowed) = light.try_borrow_mut() else {
            log::warn!("Light is busy, not added to scene");
            return false;
        };

        let id = borrowed.id();
        if self.link.tracks(id) {
            log::debug!("Light {:?} already in scene", id);
            return false;
        }

        borrowed.attach(&self.light_link);
        self.link.lights.borrow_mut().push((id, Rc::downgrade(light)));
        log::debug!("Light {:?} added to scene", id);
        true
    }

    /// Stop tracking a light; the light itself is untouched
    pub fn remove_light(&mut self, id: LightId) -> bool {
        let removed = {
            let mut lights = self.link.lights.borrow_mut();
            let index = lights.iter().position(|(tracked, _)| *tracked == id);
            index.map(|index| lights.remove(index))
        };

        let Some((_, weak)) = removed else {
            return false;
        };
        if let Some(light) = weak.upgrade() {
            if let Ok(mut light) = light.try_borrow_mut() {
                light.detach(&self.light_link);
            }
        }
        true
    }

    /// Lights still alive, in registration order
    pub fn lights(&self) -> Vec<Rc<RefCell<Light>>> {
        self.link.live_lights()
    }

    /// Number of live lights
    pub fn light_count(&self) -> usize {
        self.link.live_lights().len()
    }

    /// Light change notifications received so far
    pub fn light_change_count(&self) -> u64 {
        self.link.light_changes.get()
    }

    /// Set or clear the spotlight
    pub fn set_spotlight(&mut self, spotlight: Option<Rc<RefCell<SpotLight>>>) {
        self.spotlight = spotlight;
    }

    /// The spotlight, if any
    pub fn spotlight(&self) -> Option<&Rc<RefCell<SpotLight>>> {
        self.spotlight.as_ref()
    }

    // ===== CAMERA =====

    /// Install a camera, returning the previous one
    ///
    /// The cached view and projection are taken from the new camera at once,
    /// and every kept camera observer is moved over and notified.
    pub fn set_camera(&mut self, mut camera: Camera) -> Option<Camera> {
        camera.attach(&self.camera_link);
        for observer in &self.camera_observers {
            camera.attach(observer);
        }

        self.link.on_camera_changed(&camera);
        for observer in &self.camera_observers {
            observer.on_camera_changed(&camera);
        }

        let mut previous = self.camera.replace(camera);
        if let Some(old) = previous.as_mut() {
            old.detach(&self.camera_link);
            for observer in &self.camera_observers {
                old.detach(observer);
            }
        }
        previous
    }

    /// The camera, if any
    pub const fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// Mutable camera; changes reach the scene through its observer link
    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    /// Eye position of the camera, if any
    pub fn camera_position(&self) -> Option<Vec3> {
        self.camera.as_ref().map(Camera::position)
    }

    /// Keep `observer` alive and attach it to the current and future cameras
    pub fn add_camera_observer(&mut self, observer: Rc<dyn CameraObserver>) {
        if let Some(camera) = self.camera.as_mut() {
            camera.attach(&observer);
            observer.on_camera_changed(camera);
        }
        self.camera_observers.push(observer);
    }

    /// Camera change notifications received so far
    pub fn camera_change_count(&self) -> u64 {
        self.link.camera_changes.get()
    }

    /// Override the cached view matrix until the next camera change
    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.link.view.set(view);
    }

    /// Override the cached projection matrix until the next camera change
    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.link.projection.set(projection);
    }

    /// Cached view matrix
    pub fn view_matrix(&self) -> Mat4 {
        self.link.view.get()
    }

    /// Cached projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        self.link.projection.get()
    }

    // ===== SHADERS =====

    /// Compile a shader the scene will own
    ///
    /// Returns a shared handle for objects, or `None` (logged) on failure.
    pub fn create_shader(
        &mut self,
        backend: &dyn GraphicsBackend,
        vertex_path: &str,
        fragment_path: &str,
    ) -> Option<Rc<dyn ShaderProgram>> {
        match backend.create_shader(vertex_path, fragment_path) {
            Ok(shader) => {
                log::info!("Shader created: {} + {}", vertex_path, fragment_path);
                self.shaders.push(Rc::clone(&shader));
                Some(shader)
            }
            Err(e) => {
                log::error!("Failed to create shader: {}", e);
                None
            }
        }
    }

    /// Shaders owned by the scene
    pub fn shaders(&self) -> &[Rc<dyn ShaderProgram>] {
        &self.shaders
    }

    // ===== FRAME =====

    /// Advance every object by `delta_time` seconds, in insertion order
    pub fn update(&mut self, delta_time: f32) {
        for object in &mut self.objects {
            object.update(delta_time);
        }
    }

    /// Draw every object that has a shader and a model
    pub fn render(&self) -> RenderStats {
        let lights = self.link.live_lights();
        let bound = &lights[..lights.len().min(self.max_lights)];
        let mut stats = RenderStats::default();

        let view = self.link.view.get();
        let projection = self.link.projection.get();
        let camera_position = self.camera_position();

        for object in &self.objects {
            let drawable = object.drawable();
            let (Some(shader), true) = (drawable.shader(), drawable.has_model()) else {
                log::warn!("Object {} has no shader or model, skipping", drawable.id());
                stats.skipped += 1;
                continue;
            };
            let shader: &dyn ShaderProgram = &**shader;

            shader.use_program();

            let model = drawable.model_matrix();
            shader.set_uniform("modelMatrix", model.into());
            shader.set_uniform("normalMatrix", utils::normal_matrix(&model).into());
            shader.set_uniform("viewMatrix", view.into());
            shader.set_uniform("projectionMatrix", projection.into());

            if let Some(position) = camera_position {
                set_if_present(shader, "cameraPosition", position);
            }

            Self::upload_lights(shader, bound);
            self.upload_spotlight(shader);

            set_if_present(shader, "objectColor", drawable.object_color());
            set_if_present(shader, "shininess", drawable.shininess());

            let texture = drawable.texture().filter(|texture| texture.is_loaded());
            match texture {
                Some(texture) => {
                    texture.bind(0);
                    set_if_present(shader, "textureUnitID", 0_i32);
                    set_if_present(shader, "useTexture", 1_i32);
                }
                None => set_if_present(shader, "useTexture", 0_i32),
            }

            drawable.draw();

            if let Some(texture) = texture {
                texture.unbind();
            }
            shader.unuse();
            stats.drawn += 1;
            stats.lights_bound = bound.len();
        }

        log::trace!("Rendered {} objects ({} skipped)", stats.drawn, stats.skipped);
        stats
    }

    fn upload_lights(shader: &dyn ShaderProgram, lights: &[Rc<RefCell<Light>>]) {
        if shader.has_uniform("numLights") {
            let count = i32::try_from(lights.len()).unwrap_or(i32::MAX);
            shader.set_uniform("numLights", count.into());
        }

        for (index, light) in lights.iter().enumerate() {
            match light.try_borrow() {
                Ok(light) => light.apply_to_shader(shader, LightSlot::Indexed(index)),
                Err(_) => log::warn!("Light {} is busy, not uploaded", index),
            }
        }
    }

    fn upload_spotlight(&self, shader: &dyn ShaderProgram) {
        let spotlight = self.spotlight.as_ref().and_then(|spotlight| spotlight.try_borrow().ok());
        match spotlight {
            Some(spotlight) => spotlight.apply_to_shader(shader, SPOTLIGHT_BLOCK),
            None => set_if_present(shader, &format!("{SPOTLIGHT_BLOCK}.enabled"), 0_i32),
        }
    }
}

fn set_if_present<V: Into<UniformValue>>(shader: &dyn ShaderProgram, name: &str, value: V) {
    if shader.has_uniform(name) {
        shader.set_uniform(name, value.into());
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        if let Some(camera) = self.camera.as_mut() {
            camera.detach(&self.camera_link);
        }

        let lights = self.link.live_lights();
        for light in lights {
            if let Ok(mut light) = light.try_borrow_mut() {
                light.detach(&self.light_link);
            }
        }
        log::debug!("Scene dropped ({} objects)", self.objects.len());
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("objects", &self.objects.len())
            .field("camera", &self.camera.is_some())
            .field("lights", &self.link.lights.borrow().len())
            .field("spotlight", &self.spotlight.is_some())
            .field("shaders", &self.shaders.len())
            .field("max_lights", &self.max_lights)
            .finish_non_exhaustive()
    }
}
