//! End-to-end scene tests against the headless backend

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use approx::assert_relative_eq;

use crate::assets::{AssetError, ModelCache, ModelData, ModelParser};
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::render::{
    Camera, CameraObserver, HeadlessBackend, Light, RecordingShader, RenderEvent, ShaderProgram, SpotLight, Texture,
    UniformValue,
};
use crate::transform::TransformComponent;

use super::{DrawableObject, LightObject, RenderStats, Scene, SceneError, SceneManager, SceneObject, SpotLightTracker};

/// Returns one triangle for every source
struct TriangleParser;

impl ModelParser for TriangleParser {
    fn parse_header(&self, _path: &Path, _array: &str) -> Result<ModelData, AssetError> {
        ModelData::new(vec![0.0; 18], 6)
    }

    fn parse_text(&self, _path: &Path) -> Result<ModelData, AssetError> {
        ModelData::new(vec![0.0; 18], 6)
    }

    fn parse_obj(&self, _path: &Path) -> Result<ModelData, AssetError> {
        ModelData::new(vec![0.0; 24], 8)
    }
}

#[derive(Default)]
struct FakeTexture {
    loaded: bool,
    bound: Cell<Option<u32>>,
    binds: Cell<usize>,
}

impl Texture for FakeTexture {
    fn bind(&self, unit: u32) {
        self.bound.set(Some(unit));
        self.binds.set(self.binds.get() + 1);
    }

    fn unbind(&self) {
        self.bound.set(None);
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }
}

struct Fixture {
    backend: HeadlessBackend,
    cache: ModelCache,
}

impl Fixture {
    fn new() -> Self {
        Self {
            backend: HeadlessBackend::new(),
            cache: ModelCache::with_parser(Box::new(TriangleParser)),
        }
    }

    /// Object with a loaded model and a fresh recording shader
    fn object(&self, id: i32) -> (DrawableObject, Rc<RecordingShader>) {
        let shader = self.backend.recording_shader();
        let mut object = DrawableObject::new();
        object.set_id(id);
        assert!(object.load_model(&self.cache, &self.backend, "models/x.h", "x"));
        object.set_shader(shader.clone());
        (object, shader)
    }
}

fn camera_at_z5() -> Camera {
    Camera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::zeros(), Vec3::y(), 45.0, 4.0 / 3.0, 0.1, 100.0)
}

fn mat4_uniform(shader: &RecordingShader, name: &str) -> Mat4 {
    match shader.uniform(name) {
        Some(UniformValue::Mat4(matrix)) => matrix,
        other => panic!("{name} is not a mat4: {other:?}"),
    }
}

#[test]
fn test_translated_object_uploads_translation() {
    let fixture = Fixture::new();
    let mut scene = Scene::new();
    scene.set_camera(camera_at_z5());

    let (mut object, shader) = fixture.object(1);
    object.add_static_transform(TransformComponent::translate(Vec3::new(2.0, 0.0, 0.0)));
    object.add_static_transform(TransformComponent::scale(Vec3::new(1.0, 1.0, 1.0)));
    scene.add_object(object);

    let stats = scene.render();
    assert_eq!(stats.drawn, 1);

    let expected = Mat4::translation(Vec3::new(2.0, 0.0, 0.0));
    assert_relative_eq!(mat4_uniform(&shader, "modelMatrix"), expected, epsilon = 1e-6);

    let view = Mat4::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::zeros(), Vec3::y());
    assert_relative_eq!(mat4_uniform(&shader, "viewMatrix"), view, epsilon = 1e-5);
    assert_eq!(shader.uniform("cameraPosition"), Some(UniformValue::Vec3(Vec3::new(0.0, 0.0, 5.0))));
}

#[test]
fn test_normal_matrix_is_inverse_transpose() {
    let fixture = Fixture::new();
    let mut scene = Scene::new();

    let (mut object, shader) = fixture.object(1);
    object.add_static_transform(TransformComponent::uniform_scale(2.0));
    scene.add_object(object);
    scene.render();

    let expected = utils::normal_matrix(&Mat4::scaling(Vec3::repeat(2.0)));
    assert_eq!(shader.uniform("normalMatrix"), Some(UniformValue::Mat3(expected)));
}

#[test]
fn test_objects_share_cached_model_data() {
    let fixture = Fixture::new();
    let (a, _) = fixture.object(1);
    let (b, _) = fixture.object(2);

    let mut c = DrawableObject::new();
    assert!(c.load_model(&fixture.cache, &fixture.backend, "models/x.h", "y"));

    let data = |object: &DrawableObject| Arc::clone(object.model().unwrap().data());
    assert!(Arc::ptr_eq(&data(&a), &data(&b)));
    assert!(!Arc::ptr_eq(&data(&a), &data(&c)));
    assert_eq!(fixture.cache.len(), 2);
}

#[test]
fn test_scene_manager_unknown_switch_keeps_current() {
    let mut manager = SceneManager::new();
    manager.add_scene(1, Scene::new());
    manager.add_scene(2, Scene::new());

    assert!(manager.switch_scene(1).is_ok());
    assert_eq!(manager.switch_scene(99), Err(SceneError::UnknownScene(99)));
    assert_eq!(manager.current_id(), Some(1));
}

#[test]
fn test_dropped_light_is_not_rendered() {
    let fixture = Fixture::new();
    let mut scene = Scene::new();
    let (object, shader) = fixture.object(1);
    scene.add_object(object);

    let light = Rc::new(RefCell::new(Light::new()));
    assert!(scene.add_light(&light));
    assert_eq!(scene.render().lights_bound, 1);
    assert_eq!(shader.uniform("numLights"), Some(UniformValue::Int(1)));

    drop(light);
    assert_eq!(scene.light_count(), 0);

    shader.reset();
    let stats = scene.render();
    assert_eq!(stats.lights_bound, 0);
    assert_eq!(shader.uniform("numLights"), Some(UniformValue::Int(0)));
    assert_eq!(shader.uniform("lights[0].position"), None);
}

#[test]
fn test_removing_light_object_removes_its_light() {
    let mut scene = Scene::new();
    let mut firefly = LightObject::orbiting(Vec3::zeros(), 2.0);
    firefly.drawable_mut().set_id(7);
    scene.add_light_object(firefly);
    assert_eq!(scene.light_count(), 1);

    assert!(scene.remove_object(7));
    assert!(!scene.remove_object(7));
    assert_eq!(scene.light_count(), 0);
    assert!(scene.is_empty());
}

#[test]
fn test_light_added_twice_notifies_once() {
    let mut scene = Scene::new();
    let light = Rc::new(RefCell::new(Light::new()));

    assert!(scene.add_light(&light));
    assert!(!scene.add_light(&light));
    assert_eq!(light.borrow().observer_count(), 1);

    light.borrow_mut().set_intensity(4.0);
    assert_eq!(scene.light_change_count(), 1);
}

#[test]
fn test_remove_light_detaches() {
    let mut scene = Scene::new();
    let light = Rc::new(RefCell::new(Light::new()));
    scene.add_light(&light);

    let id = light.borrow().id();
    assert!(scene.remove_light(id));
    assert!(!scene.remove_light(id));
    assert_eq!(light.borrow().observer_count(), 0);
}

#[test]
fn test_scene_drop_detaches_from_lights() {
    let light = Rc::new(RefCell::new(Light::new()));
    {
        let mut scene = Scene::new();
        scene.add_light(&light);
        assert_eq!(light.borrow().observer_count(), 1);
    }
    assert_eq!(light.borrow().observer_count(), 0);
    light.borrow_mut().set_position(Vec3::zeros());
}

#[test]
fn test_camera_changes_refresh_cached_matrices() {
    let mut scene = Scene::new();
    scene.set_camera(camera_at_z5());
    let changes = scene.camera_change_count();

    let camera = scene.camera_mut().unwrap();
    camera.set_position(Vec3::new(1.0, 2.0, 3.0));
    camera.set_aspect_ratio(2.0);
    let (view, projection) = (camera.view_matrix(), camera.projection_matrix());

    assert_eq!(scene.camera_change_count(), changes + 2);
    assert_eq!(scene.view_matrix(), view);
    assert_eq!(scene.projection_matrix(), projection);
}

#[test]
fn test_replaced_camera_is_detached() {
    let mut scene = Scene::new();
    assert!(scene.set_camera(camera_at_z5()).is_none());

    let old = scene.set_camera(camera_at_z5()).unwrap();
    assert_eq!(old.observer_count(), 0);
    assert_eq!(scene.camera().unwrap().observer_count(), 1);
}

#[test]
fn test_manual_matrices_until_next_camera_change() {
    let mut scene = Scene::new();
    let projection = Mat4::perspective(60.0, 1.0, 0.5, 50.0);
    scene.set_projection_matrix(projection);
    scene.set_view_matrix(Mat4::translation(Vec3::z()));
    assert_eq!(scene.projection_matrix(), projection);

    scene.set_camera(camera_at_z5());
    assert_eq!(scene.projection_matrix(), scene.camera().unwrap().projection_matrix());
}

#[test]
fn test_objects_without_shader_or_model_are_skipped() {
    let fixture = Fixture::new();
    let mut scene = Scene::new();

    let mut no_shader = DrawableObject::new();
    no_shader.load_model(&fixture.cache, &fixture.backend, "models/x.h", "x");
    scene.add_object(no_shader);

    let mut no_model = DrawableObject::new();
    no_model.set_shader(fixture.backend.recording_shader());
    scene.add_object(no_model);

    let (object, _) = fixture.object(3);
    scene.add_object(object);

    assert_eq!(scene.render(), RenderStats { drawn: 1, skipped: 2, lights_bound: 0 });
    assert_eq!(fixture.backend.draw_count(), 1);
}

#[test]
fn test_no_lights_bound_when_nothing_is_drawn() {
    let fixture = Fixture::new();
    let mut scene = Scene::new();

    let mut no_shader = DrawableObject::new();
    no_shader.load_model(&fixture.cache, &fixture.backend, "models/x.h", "x");
    scene.add_object(no_shader);

    let light = Rc::new(RefCell::new(Light::new()));
    assert!(scene.add_light(&light));

    assert_eq!(scene.render(), RenderStats { drawn: 0, skipped: 1, lights_bound: 0 });

    let (object, _) = fixture.object(2);
    scene.add_object(object);
    assert_eq!(scene.render(), RenderStats { drawn: 1, skipped: 1, lights_bound: 1 });
}

#[test]
fn test_render_sequence_per_object() {
    let fixture = Fixture::new();
    let mut scene = Scene::new();
    let (object, shader) = fixture.object(1);
    scene.add_object(object);
    fixture.backend.clear_events();

    scene.render();

    let events = fixture.backend.events();
    assert_eq!(events.first(), Some(&RenderEvent::UseProgram { shader: shader.id() }));
    assert_eq!(events.last(), Some(&RenderEvent::Unuse { shader: shader.id() }));
    assert!(events
        .iter()
        .any(|event| matches!(event, RenderEvent::Draw { shader: Some(id), .. } if *id == shader.id())));
    assert!(!shader.is_active());
}

#[test]
fn test_textured_object_binds_unit_zero() {
    let fixture = Fixture::new();
    let mut scene = Scene::new();
    let (mut object, shader) = fixture.object(1);
    let texture = Rc::new(FakeTexture { loaded: true, ..FakeTexture::default() });
    object.set_texture(texture.clone());
    scene.add_object(object);

    scene.render();

    assert_eq!(texture.binds.get(), 1);
    assert_eq!(texture.bound.get(), None);
    assert_eq!(shader.uniform("useTexture"), Some(UniformValue::Int(1)));
    assert_eq!(shader.uniform("textureUnitID"), Some(UniformValue::Int(0)));
}

#[test]
fn test_unloaded_texture_is_ignored() {
    let fixture = Fixture::new();
    let mut scene = Scene::new();
    let (mut object, shader) = fixture.object(1);
    let texture = Rc::new(FakeTexture::default());
    object.set_texture(texture.clone());
    scene.add_object(object);

    scene.render();

    assert_eq!(texture.binds.get(), 0);
    assert_eq!(shader.uniform("useTexture"), Some(UniformValue::Int(0)));
    assert_eq!(shader.uniform("textureUnitID"), None);
}

#[test]
fn test_spotlight_block_or_disabled_sentinel() {
    let fixture = Fixture::new();
    let mut scene = Scene::new();
    let (object, shader) = fixture.object(1);
    scene.add_object(object);

    scene.render();
    assert_eq!(shader.uniform("spotlight.enabled"), Some(UniformValue::Int(0)));
    assert_eq!(shader.uniform("spotlight.cutOff"), None);

    scene.set_spotlight(Some(Rc::new(RefCell::new(SpotLight::default()))));
    scene.render();
    assert_eq!(shader.uniform("spotlight.enabled"), Some(UniformValue::Int(1)));
    let cut_off = shader.uniform("spotlight.cutOff").and_then(|value| value.as_float()).unwrap();
    assert_relative_eq!(cut_off, utils::deg_to_rad(12.5).cos(), epsilon = 1e-6);
}

#[test]
fn test_restricted_shader_receives_only_declared_uniforms() {
    let backend = HeadlessBackend::new().with_uniforms(["modelMatrix", "normalMatrix", "viewMatrix", "projectionMatrix"]);
    let cache = ModelCache::with_parser(Box::new(TriangleParser));
    let mut scene = Scene::new();
    scene.set_camera(camera_at_z5());
    scene.add_light(&Rc::new(RefCell::new(Light::new())));

    let shader = backend.recording_shader();
    let mut object = DrawableObject::new();
    object.load_model(&cache, &backend, "models/x.h", "x");
    object.set_shader(shader.clone());
    scene.add_object(object);

    assert_eq!(scene.render().drawn, 1);
    assert_eq!(
        shader.written_uniforms(),
        vec!["modelMatrix", "normalMatrix", "projectionMatrix", "viewMatrix"]
    );
}

#[test]
fn test_light_upload_is_capped() {
    let fixture = Fixture::new();
    let mut scene = Scene::new();
    let (object, shader) = fixture.object(1);
    scene.add_object(object);

    let lights: Vec<_> = (0..25).map(|_| Rc::new(RefCell::new(Light::new()))).collect();
    for light in &lights {
        scene.add_light(light);
    }

    assert_eq!(scene.render().lights_bound, 20);
    assert_eq!(shader.uniform("numLights"), Some(UniformValue::Int(20)));
    assert!(shader.uniform("lights[19].intensity").is_some());
    assert!(shader.uniform("lights[20].intensity").is_none());

    scene.set_max_lights(2);
    shader.reset();
    scene.render();
    assert_eq!(shader.uniform("numLights"), Some(UniformValue::Int(2)));
    assert!(shader.uniform("lights[2].intensity").is_none());
}

#[test]
fn test_max_lights_is_clamped() {
    assert_eq!(Scene::new().with_max_lights(0).max_lights(), 1);
    assert_eq!(Scene::new().with_max_lights(100).max_lights(), 20);
}

#[test]
fn test_spotlight_tracker_follows_camera() {
    let spotlight = Rc::new(RefCell::new(SpotLight::default()));
    let mut scene = Scene::new();
    scene.set_spotlight(Some(Rc::clone(&spotlight)));
    scene.add_camera_observer(Rc::new(SpotLightTracker::new(Rc::clone(&spotlight))));

    scene.set_camera(camera_at_z5());
    assert_eq!(spotlight.borrow().position(), Vec3::new(0.0, 0.0, 5.0));

    scene.camera_mut().unwrap().set_position(Vec3::new(1.0, 1.0, 1.0));
    assert_eq!(spotlight.borrow().position(), Vec3::new(1.0, 1.0, 1.0));
    assert_relative_eq!(spotlight.borrow().direction(), -Vec3::z(), epsilon = 1e-5);
}

#[test]
fn test_observer_added_after_camera_is_notified_immediately() {
    #[derive(Default)]
    struct Counter(Cell<usize>);

    impl CameraObserver for Counter {
        fn on_camera_changed(&self, _camera: &Camera) {
            self.0.set(self.0.get() + 1);
        }
    }

    let mut scene = Scene::new();
    scene.set_camera(camera_at_z5());

    let counter = Rc::new(Counter::default());
    scene.add_camera_observer(counter.clone());
    assert_eq!(counter.0.get(), 1);

    scene.camera_mut().unwrap().set_position(Vec3::zeros());
    assert_eq!(counter.0.get(), 2);
}

#[test]
fn test_update_runs_in_insertion_order() {
    let fixture = Fixture::new();
    let mut scene = Scene::new();

    let (mut spinning, shader) = fixture.object(1);
    spinning.add_dynamic_transform(TransformComponent::dynamic_rotate(Vec3::y(), 0.0, 90.0));
    scene.add_object(spinning);
    scene.add_light_object(LightObject::orbiting(Vec3::zeros(), 2.0));

    scene.update(1.0);
    scene.render();

    let expected = Mat4::rotation_degrees(Vec3::y(), 90.0);
    assert_relative_eq!(mat4_uniform(&shader, "modelMatrix"), expected, epsilon = 1e-5);

    let firefly_position = scene.lights()[0].borrow().position();
    assert_eq!(shader.uniform("lights[0].position"), Some(UniformValue::Vec3(firefly_position)));
}

#[test]
fn test_object_lookup_out_of_range() {
    let fixture = Fixture::new();
    let mut scene = Scene::new();
    let (object, _) = fixture.object(5);
    scene.add_object(object);

    assert_eq!(scene.object(0).map(|object| object.id()), Some(5));
    assert!(scene.object(1).is_none());
    assert!(scene.object_mut(3).is_none());

    scene.object_mut(0).unwrap().drawable_mut().set_shininess(8.0);
    assert_eq!(scene.object(0).unwrap().drawable().shininess(), 8.0);

    scene.clear();
    assert!(scene.object(0).is_none());
}

#[test]
fn test_create_shader_owns_program() {
    use std::io::Write;

    let mut vertex = tempfile::Builder::new().suffix(".vert").tempfile().unwrap();
    let mut fragment = tempfile::Builder::new().suffix(".frag").tempfile().unwrap();
    writeln!(vertex, "void main() {{ gl_Position = vec4(0.0); }}").unwrap();
    writeln!(fragment, "void main() {{}}").unwrap();

    let backend = HeadlessBackend::new();
    let mut scene = Scene::new();

    let shader = scene.create_shader(&backend, vertex.path().to_str().unwrap(), fragment.path().to_str().unwrap());
    assert!(shader.is_some());
    assert!(scene.create_shader(&backend, "missing.vert", "missing.frag").is_none());
    assert_eq!(scene.shaders().len(), 1);

    let shader: Rc<dyn ShaderProgram> = shader.unwrap();
    assert!(shader.has_uniform("modelMatrix"));
}
