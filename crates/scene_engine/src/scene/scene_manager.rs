//! Scene Manager - owns every scene and tracks the current one
//!
//! Switching is a map lookup; scenes keep their state (object transforms,
//! camera, light positions) while they are not current.

use std::collections::HashMap;

use super::{RenderStats, Scene, SceneError};

/// Scenes keyed by integer id, with at most one current
#[derive(Debug, Default)]
pub struct SceneManager {
    /// Every registered scene
    scenes: HashMap<i32, Scene>,

    /// Id of the current scene; always a key of `scenes`
    current: Option<i32>,
}

impl SceneManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `scene` under `id`
    ///
    /// The first scene added becomes current. Adding an id that already
    /// exists replaces (and drops) the old scene.
    pub fn add_scene(&mut self, id: i32, scene: Scene) {
        if self.scenes.insert(id, scene).is_some() {
            log::warn!("Scene {} replaced", id);
        } else {
            log::info!("Scene {} added ({} total)", id, self.scenes.len());
        }

        if self.current.is_none() {
            self.current = Some(id);
            log::info!("Scene {} is now current", id);
        }
    }

    /// Make scene `id` current
    ///
    /// # Errors
    /// [`SceneError::UnknownScene`] if no scene has this id; the current
    /// scene is left unchanged.
    pub fn switch_scene(&mut self, id: i32) -> Result<(), SceneError> {
        if !self.scenes.contains_key(&id) {
            let error = SceneError::UnknownScene(id);
            log::error!("Cannot switch scene: {}", error);
            return Err(error);
        }

        if self.current != Some(id) {
            log::info!("Switched to scene {}", id);
        }
        self.current = Some(id);
        Ok(())
    }

    /// The current scene
    pub fn current(&self) -> Option<&Scene> {
        self.current.and_then(|id| self.scenes.get(&id))
    }

    /// The current scene, mutably
    pub fn current_mut(&mut self) -> Option<&mut Scene> {
        self.current.and_then(|id| self.scenes.get_mut(&id))
    }

    /// Id of the current scene
    pub const fn current_id(&self) -> Option<i32> {
        self.current
    }

    /// Scene by id
    pub fn scene(&self, id: i32) -> Option<&Scene> {
        self.scenes.get(&id)
    }

    /// Scene by id, mutably
    pub fn scene_mut(&mut self, id: i32) -> Option<&mut Scene> {
        self.scenes.get_mut(&id)
    }

    /// Registered ids, ascending
    pub fn scene_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.scenes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of scenes
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// True when no scene was added
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Update the current scene only
    pub fn update(&mut self, delta_time: f32) {
        if let Some(scene) = self.current_mut() {
            scene.update(delta_time);
        }
    }

    /// Render the current scene; empty stats without one
    pub fn render(&self) -> RenderStats {
        self.current().map(Scene::render).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_manager() {
        let mut manager = SceneManager::new();
        assert!(manager.is_empty());
        assert!(manager.current().is_none());
        assert_eq!(manager.render(), RenderStats::default());
        assert_eq!(manager.switch_scene(1), Err(SceneError::UnknownScene(1)));
    }

    #[test]
    fn test_first_scene_becomes_current() {
        let mut manager = SceneManager::new();
        manager.add_scene(3, Scene::new());
        manager.add_scene(1, Scene::new());

        assert_eq!(manager.current_id(), Some(3));
        assert_eq!(manager.scene_ids(), vec![1, 3]);
    }

    #[test]
    fn test_switch_and_unknown_switch() {
        let mut manager = SceneManager::new();
        manager.add_scene(1, Scene::new());
        manager.add_scene(2, Scene::new());

        assert!(manager.switch_scene(2).is_ok());
        assert_eq!(manager.current_id(), Some(2));

        assert_eq!(manager.switch_scene(42), Err(SceneError::UnknownScene(42)));
        assert_eq!(manager.current_id(), Some(2));
    }

    #[test]
    fn test_replacing_current_scene_keeps_it_current() {
        let mut manager = SceneManager::new();
        manager.add_scene(1, Scene::new());
        manager.add_scene(1, Scene::new().with_max_lights(4));

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.current_id(), Some(1));
        assert_eq!(manager.current().map(Scene::max_lights), Some(4));
    }
}
