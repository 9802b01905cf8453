//! Demo scene construction
//!
//! Four scenes, switched with the number keys:
//!
//! 1. Yard: terrain, characters, a fence, a car and fireflies
//! 2. Lighting test: four spheres (one spinning) under three colored lights
//! 3. Forest: trees and bushes lit by moonlight and a firefly swarm
//! 4. Solar system: a sun, an orbiting earth and its moon

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use scene_engine::core::{AssetConfig, CameraConfig};
use scene_engine::prelude::*;
use scene_engine::render::Attenuation;
use scene_engine::scene::Territory;

/// Ids of the scenes built by [`SceneFactory::build_all`]
pub const YARD_SCENE: i32 = 1;
/// Lighting test scene id
pub const LIGHTING_SCENE: i32 = 2;
/// Forest scene id
pub const FOREST_SCENE: i32 = 3;
/// Solar system scene id
pub const SOLAR_SCENE: i32 = 4;

const SHADER_NAMES: [&str; 4] = ["constant", "lambert", "phong", "blinn"];

const FIREFLY_COLOR: Vec3 = Vec3::new(1.0, 1.0, 0.3);

/// Shaders compiled for one scene
struct Shaders {
    constant: Option<Rc<dyn ShaderProgram>>,
    lambert: Option<Rc<dyn ShaderProgram>>,
    phong: Option<Rc<dyn ShaderProgram>>,
    blinn: Option<Rc<dyn ShaderProgram>>,
}

/// Firefly swarm layout: a `columns` x `rows` grid of territories
struct Swarm {
    columns: i32,
    rows: i32,
    spacing: f32,
    radius: f32,
    min_height: f32,
    max_height: f32,
}

/// Builds the demo scenes from the asset directory
pub struct SceneFactory<'a> {
    backend: &'a dyn GraphicsBackend,
    cache: &'a ModelCache,
    assets: &'a AssetConfig,
    camera: &'a CameraConfig,
    aspect: f32,
    rng: StdRng,
    lights: Vec<Rc<RefCell<Light>>>,
}

impl<'a> SceneFactory<'a> {
    /// Create a factory; `seed` fixes every random placement
    pub fn new(
        backend: &'a dyn GraphicsBackend,
        cache: &'a ModelCache,
        assets: &'a AssetConfig,
        camera: &'a CameraConfig,
        aspect: f32,
        seed: u64,
    ) -> Self {
        Self {
            backend,
            cache,
            assets,
            camera,
            aspect,
            rng: StdRng::seed_from_u64(seed),
            lights: Vec::new(),
        }
    }

    /// Build every demo scene into `manager`; the yard becomes current
    ///
    /// Scenes only observe their fixed lights, so the returned handles must
    /// outlive the manager for those lights to keep shining.
    #[must_use]
    pub fn build_all(mut self, manager: &mut SceneManager, max_lights: usize) -> Vec<Rc<RefCell<Light>>> {
        let scenes = [
            (YARD_SCENE, self.yard()),
            (LIGHTING_SCENE, self.lighting_test()),
            (FOREST_SCENE, self.forest()),
            (SOLAR_SCENE, self.solar_system()),
        ];

        for (id, mut scene) in scenes {
            scene.set_max_lights(max_lights);
            log::info!("Scene {}: {} objects, {} lights", id, scene.len(), scene.light_count());
            manager.add_scene(id, scene);
        }

        self.lights
    }

    // ===== SCENES =====

    fn yard(&mut self) -> Scene {
        let mut scene = self.scene_with_camera(Vec3::new(0.0, 2.0, 8.0), Vec3::new(0.0, 1.0, 0.0), self.camera.far);
        let shaders = self.compile_shaders(&mut scene);

        if let Some(mut terrain) = self.obj_object(1, "models/terrain.obj", shaders.lambert.as_ref()) {
            self.texture(&mut terrain, "textures/grass.png");
            scene.add_object(terrain);
        }

        if let Some(mut hero) = self.obj_object(2, "models/character.obj", shaders.phong.as_ref()) {
            hero.add_static_transform(TransformComponent::translate(Vec3::new(-2.0, 0.0, 0.0)));
            self.texture(&mut hero, "textures/character_green.png");
            scene.add_object(hero);
        }

        if let Some(mut spinner) = self.obj_object(3, "models/character.obj", shaders.phong.as_ref()) {
            spinner.add_dynamic_transform(TransformComponent::translate(Vec3::new(2.0, 0.0, 0.0)));
            spinner.add_dynamic_transform(TransformComponent::dynamic_rotate(Vec3::y(), 0.0, 60.0));
            self.texture(&mut spinner, "textures/character_red.png");
            scene.add_object(spinner);
        }

        let fence = [
            (Vec3::new(0.0, 1.0, -6.0), 0.0),
            (Vec3::new(0.0, 1.0, 6.0), 180.0),
            (Vec3::new(-6.0, 1.0, 0.0), 90.0),
            (Vec3::new(6.0, 1.0, 0.0), -90.0),
        ];
        for (id, (position, yaw)) in (10..).zip(fence) {
            let Some(mut panel) = self.text_object(id, "models/square.txt", shaders.lambert.as_ref()) else {
                continue;
            };
            panel.add_static_transform(TransformComponent::translate(position));
            panel.add_static_transform(TransformComponent::rotate(Vec3::y(), yaw));
            panel.add_static_transform(TransformComponent::scale(Vec3::new(6.0, 1.0, 1.0)));
            self.texture(&mut panel, "textures/wooden_fence.png");
            scene.add_object(panel);
        }

        if let Some(mut car) = self.obj_object(20, "models/car.obj", shaders.phong.as_ref()) {
            car.set_object_color(Vec3::new(0.8, 0.2, 0.4));
            car.set_shininess(64.0);
            car.add_static_transform(TransformComponent::translate(Vec3::new(10.0, 0.0, 10.0)));
            car.add_static_transform(TransformComponent::uniform_scale(0.25));
            scene.add_object(car);
        }

        if let Some(mut tree) = self.header_object(21, "models/tree.h", "tree", shaders.lambert.as_ref()) {
            tree.set_object_color(Vec3::new(0.2, 0.6, 0.2));
            tree.add_static_transform(TransformComponent::translate(Vec3::new(5.0, 0.0, 5.0)));
            scene.add_object(tree);
        }

        let sun = Light::new()
            .with_position(Vec3::new(10.0, 50.0, 10.0))
            .with_color(Vec3::new(1.0, 0.95, 0.8))
            .with_intensity(2.0)
            .with_attenuation(Attenuation::new(1.0, 0.001, 0.000_001));
        self.keep_light(&mut scene, sun);

        Self::add_flashlight(&mut scene);

        let swarm = Swarm {
            columns: 3,
            rows: 3,
            spacing: 6.0,
            radius: 3.0,
            min_height: 0.3,
            max_height: 2.5,
        };
        self.add_fireflies(&mut scene, &swarm, 100, shaders.constant.as_ref());
        scene
    }

    fn lighting_test(&mut self) -> Scene {
        let mut scene = self.scene_with_camera(Vec3::new(0.0, 3.0, 15.0), Vec3::zeros(), self.camera.far);
        let shaders = self.compile_shaders(&mut scene);

        let lights = [
            (Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)),
            (Vec3::new(-7.0, 0.0, 0.0), Vec3::new(1.0, 0.2, 0.2)),
            (Vec3::new(7.0, 0.0, 0.0), Vec3::new(0.2, 1.0, 0.2)),
        ];
        for (position, color) in lights {
            self.keep_light(&mut scene, Light::new().with_position(position).with_color(color));
        }

        let spheres = [
            (Vec3::new(3.0, 0.0, 0.0), shaders.phong.as_ref(), 8.0),
            (Vec3::new(-3.0, 0.0, 0.0), shaders.blinn.as_ref(), 16.0),
            (Vec3::new(0.0, 3.0, 0.0), shaders.lambert.as_ref(), 32.0),
            (Vec3::new(0.0, -3.0, 0.0), shaders.phong.as_ref(), 128.0),
        ];
        for (id, (position, shader, shininess)) in (1..).zip(spheres) {
            // Alternate the two sphere sources so both loaders are exercised
            let sphere = if id % 2 == 0 {
                self.text_object(id, "models/sphere.txt", shader)
            } else {
                self.header_object(id, "models/sphere.h", "sphere", shader)
            };
            let Some(mut sphere) = sphere else {
                continue;
            };
            sphere.set_object_color(Vec3::new(0.2, 0.3, 1.0));
            sphere.set_shininess(shininess);
            sphere.add_static_transform(TransformComponent::translate(position));
            if id == 1 {
                sphere.add_dynamic_transform(TransformComponent::dynamic_rotate(Vec3::y(), 0.0, 45.0));
            }
            sphere.add_static_transform(TransformComponent::uniform_scale(1.5));
            scene.add_object(sphere);
        }

        scene
    }

    fn forest(&mut self) -> Scene {
        let mut scene = self.scene_with_camera(Vec3::new(0.0, 5.0, 20.0), Vec3::new(0.0, 2.0, 0.0), 200.0);
        let shaders = self.compile_shaders(&mut scene);

        let moon = Light::new()
            .with_position(Vec3::new(-30.0, 60.0, -30.0))
            .with_color(Vec3::new(0.5, 0.6, 0.9))
            .with_intensity(0.6)
            .with_attenuation(Attenuation::new(1.0, 0.0, 0.0));
        self.keep_light(&mut scene, moon);
        Self::add_flashlight(&mut scene);

        if let Some(mut ground) = self.text_object(1, "models/plain.txt", shaders.lambert.as_ref()) {
            ground.set_object_color(Vec3::new(0.15, 0.35, 0.1));
            ground.add_static_transform(TransformComponent::scale(Vec3::new(40.0, 1.0, 40.0)));
            scene.add_object(ground);
        }

        for index in 0..50 {
            if let Some(mut tree) = self.header_object(100 + index, "models/tree.h", "tree", shaders.phong.as_ref()) {
                tree.set_object_color(Vec3::new(0.1, 0.5, 0.15));
                self.scatter(&mut tree, 35.0, 0.8..1.4);
                scene.add_object(tree);
            }

            if let Some(mut bush) = self.header_object(200 + index, "models/bushes.h", "bushes", shaders.lambert.as_ref()) {
                bush.set_object_color(Vec3::new(0.25, 0.55, 0.2));
                self.scatter(&mut bush, 35.0, 0.6..1.2);
                scene.add_object(bush);
            }
        }

        let swarm = Swarm {
            columns: 4,
            rows: 3,
            spacing: 9.0,
            radius: 3.5,
            min_height: 0.3,
            max_height: 2.8,
        };
        self.add_fireflies(&mut scene, &swarm, 300, shaders.constant.as_ref());
        scene
    }

    fn solar_system(&mut self) -> Scene {
        let mut scene = self.scene_with_camera(Vec3::new(0.0, 15.0, 30.0), Vec3::zeros(), 500.0);
        let shaders = self.compile_shaders(&mut scene);

        let sunlight = Light::new()
            .with_position(Vec3::zeros())
            .with_color(Vec3::new(1.0, 0.95, 0.85))
            .with_intensity(3.0)
            .with_attenuation(Attenuation::new(1.0, 0.0, 0.0));
        self.keep_light(&mut scene, sunlight);

        if let Some(mut sun) = self.header_object(1, "models/sphere.h", "sphere", shaders.constant.as_ref()) {
            sun.set_object_color(Vec3::new(1.0, 0.85, 0.2));
            sun.add_static_transform(TransformComponent::uniform_scale(3.0));
            scene.add_object(sun);
        }

        // Orbit: spin around the sun, move out, then spin on the own axis
        let orbit = [
            TransformComponent::dynamic_rotate(Vec3::y(), 0.0, 50.0),
            TransformComponent::translate(Vec3::new(12.0, 0.0, 0.0)),
            TransformComponent::dynamic_rotate(Vec3::y(), 0.0, 5.0),
        ];

        if let Some(mut earth) = self.header_object(2, "models/sphere.h", "sphere", shaders.phong.as_ref()) {
            for component in orbit.clone() {
                earth.add_dynamic_transform(component);
            }
            earth.add_static_transform(TransformComponent::uniform_scale(1.5));
            self.texture(&mut earth, "textures/earth.png");
            scene.add_object(earth);
        }

        // The moon repeats the earth's chain, then circles it
        if let Some(mut moon) = self.header_object(3, "models/sphere.h", "sphere", shaders.blinn.as_ref()) {
            moon.set_object_color(Vec3::new(0.7, 0.7, 0.7));
            for component in orbit.into_iter().chain([
                TransformComponent::dynamic_rotate(Vec3::y(), 0.0, 90.0),
                TransformComponent::translate(Vec3::new(3.0, 0.0, 0.0)),
                TransformComponent::dynamic_rotate(Vec3::y(), 0.0, 30.0),
            ]) {
                moon.add_dynamic_transform(component);
            }
            moon.add_static_transform(TransformComponent::uniform_scale(0.5));
            scene.add_object(moon);
        }

        scene
    }

    // ===== HELPERS =====

    fn scene_with_camera(&self, eye: Vec3, target: Vec3, far: f32) -> Scene {
        let mut scene = Scene::new();
        scene.set_camera(Camera::looking_at(
            eye,
            target,
            Vec3::y(),
            self.camera.fov_degrees,
            self.aspect,
            self.camera.near,
            far,
        ));
        scene
    }

    fn compile_shaders(&self, scene: &mut Scene) -> Shaders {
        let [constant, lambert, phong, blinn] = SHADER_NAMES.map(|name| {
            let vertex = self.path(&format!("shaders/{name}_vertex.glsl"));
            let fragment = self.path(&format!("shaders/{name}_fragment.glsl"));
            scene.create_shader(self.backend, &vertex, &fragment)
        });

        Shaders {
            constant,
            lambert,
            phong,
            blinn,
        }
    }

    fn path(&self, relative: &str) -> String {
        self.assets.resolve(relative).to_string_lossy().into_owned()
    }

    /// Objects whose model fails to load are dropped (`None`)
    fn header_object(&self, id: i32, path: &str, array: &str, shader: Option<&Rc<dyn ShaderProgram>>) -> Option<DrawableObject> {
        let mut object = Self::object(id, shader);
        object.load_model(self.cache, self.backend, &self.path(path), array).then_some(object)
    }

    fn text_object(&self, id: i32, path: &str, shader: Option<&Rc<dyn ShaderProgram>>) -> Option<DrawableObject> {
        let mut object = Self::object(id, shader);
        object.load_model_from_text(self.cache, self.backend, &self.path(path)).then_some(object)
    }

    fn obj_object(&self, id: i32, path: &str, shader: Option<&Rc<dyn ShaderProgram>>) -> Option<DrawableObject> {
        let mut object = Self::object(id, shader);
        object.load_model_from_obj(self.cache, self.backend, &self.path(path)).then_some(object)
    }

    fn object(id: i32, shader: Option<&Rc<dyn ShaderProgram>>) -> DrawableObject {
        let mut object = DrawableObject::new();
        object.set_id(id);
        if let Some(shader) = shader {
            object.set_shader(Rc::clone(shader));
        }
        object
    }

    fn texture(&self, object: &mut DrawableObject, path: &str) {
        let path = self.path(path);
        match self.backend.load_texture(&path) {
            Ok(texture) => object.set_texture(texture),
            Err(e) => log::warn!("Object {}: texture unavailable: {}", object.id(), e),
        }
    }

    /// Random spot outside the clearing around the origin, random yaw and size
    fn scatter(&mut self, object: &mut DrawableObject, half_extent: f32, scale: std::ops::Range<f32>) {
        let position = loop {
            let candidate = Vec3::new(
                self.rng.gen_range(-half_extent..half_extent),
                0.0,
                self.rng.gen_range(-half_extent..half_extent),
            );
            if candidate.norm() > 3.0 {
                break candidate;
            }
        };

        object.add_static_transform(TransformComponent::translate(position));
        object.add_static_transform(TransformComponent::rotate(Vec3::y(), self.rng.gen_range(0.0..360.0)));
        object.add_static_transform(TransformComponent::uniform_scale(self.rng.gen_range(scale)));
    }

    fn keep_light(&mut self, scene: &mut Scene, light: Light) {
        let light = Rc::new(RefCell::new(light));
        scene.add_light(&light);
        self.lights.push(light);
    }

    fn add_flashlight(scene: &mut Scene) {
        let mut flashlight = SpotLight::new(Vec3::zeros(), -Vec3::z());
        flashlight.set_color(Vec3::new(1.0, 1.0, 0.9));
        flashlight.set_intensity(10.0);
        flashlight.set_cut_off(10.0, 20.0);
        flashlight.set_attenuation(1.0, 0.022, 0.019);

        let flashlight = Rc::new(RefCell::new(flashlight));
        scene.set_spotlight(Some(Rc::clone(&flashlight)));
        scene.add_camera_observer(Rc::new(SpotLightTracker::new(flashlight)));
    }

    #[allow(clippy::cast_precision_loss)]
    fn add_fireflies(&mut self, scene: &mut Scene, swarm: &Swarm, first_id: i32, shader: Option<&Rc<dyn ShaderProgram>>) {
        let width = (swarm.columns - 1) as f32 * swarm.spacing;
        let depth = (swarm.rows - 1) as f32 * swarm.spacing;

        let sphere = self.path("models/sphere.h");
        for row in 0..swarm.rows {
            for column in 0..swarm.columns {
                let id = first_id + row * swarm.columns + column;
                let center = Vec3::new(
                    column as f32 * swarm.spacing - width / 2.0,
                    0.0,
                    row as f32 * swarm.spacing - depth / 2.0,
                );
                let territory = Territory::new(center, swarm.radius, swarm.min_height, swarm.max_height);

                let mut firefly = LightObject::wandering(territory, self.rng.gen())
                    .with_light(FIREFLY_COLOR, 2.5, Attenuation::new(1.0, 0.22, 0.20));
                firefly.set_speed(self.rng.gen_range(1.5..2.5));

                let body = firefly.drawable_mut();
                if !body.load_model(self.cache, self.backend, &sphere, "sphere") {
                    continue;
                }
                body.set_id(id);
                body.set_object_color(FIREFLY_COLOR);
                body.add_static_transform(TransformComponent::uniform_scale(0.05));
                if let Some(shader) = shader {
                    body.set_shader(Rc::clone(shader));
                }

                scene.add_light_object(firefly);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const TRIANGLE_HEADER: &str = "const float sphere[] = {
    0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 1.0f,
    1.0f, 0.0f, 0.0f, 0.0f, 0.0f, 1.0f,
    0.0f, 1.0f, 0.0f, 0.0f, 0.0f, 1.0f,
};
";

    const TRIANGLE_TEXT: &str = "0 0 0 0 0 1\n1 0 0 0 0 1\n0 1 0 0 0 1\n";

    fn asset_dir(with_header_sphere: bool) -> TempDir {
        let dir = TempDir::new().unwrap();
        let models = dir.path().join("models");
        fs::create_dir(&models).unwrap();
        fs::write(models.join("sphere.txt"), TRIANGLE_TEXT).unwrap();
        if with_header_sphere {
            fs::write(models.join("sphere.h"), TRIANGLE_HEADER).unwrap();
        }
        dir
    }

    fn assets(dir: &Path) -> AssetConfig {
        AssetConfig::new().with_assets_dir(dir.to_string_lossy())
    }

    #[test]
    fn test_lighting_scene_drops_objects_without_model() {
        let backend = HeadlessBackend::new();
        let camera = CameraConfig::default();

        let complete = asset_dir(true);
        let cache = ModelCache::new();
        let complete_assets = assets(complete.path());
        let mut factory = SceneFactory::new(&backend, &cache, &complete_assets, &camera, 1.0, 1);
        assert_eq!(factory.lighting_test().len(), 4);

        let partial = asset_dir(false);
        let cache = ModelCache::new();
        let partial_assets = assets(partial.path());
        let mut factory = SceneFactory::new(&backend, &cache, &partial_assets, &camera, 1.0, 1);
        let scene = factory.lighting_test();
        assert_eq!(scene.len(), 2);
        assert!(scene.objects().all(|object| object.drawable().model().is_some()));
    }

    #[test]
    fn test_fireflies_need_their_body_model() {
        let backend = HeadlessBackend::new();
        let camera = CameraConfig::default();

        let complete = asset_dir(true);
        let cache = ModelCache::new();
        let complete_assets = assets(complete.path());
        let mut factory = SceneFactory::new(&backend, &cache, &complete_assets, &camera, 1.0, 1);
        let forest = factory.forest();
        assert_eq!(forest.len(), 12);
        assert_eq!(forest.light_count(), 13);

        let partial = asset_dir(false);
        let cache = ModelCache::new();
        let partial_assets = assets(partial.path());
        let mut factory = SceneFactory::new(&backend, &cache, &partial_assets, &camera, 1.0, 1);
        let forest = factory.forest();
        assert!(forest.is_empty());
        assert_eq!(forest.light_count(), 1);
    }
}
