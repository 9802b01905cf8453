//! Scene engine demo
//!
//! Builds the four demo scenes and drives them headlessly with a scripted
//! input sequence: walk around the yard, toggle the flashlight, then visit
//! every other scene. Each recorded frame is summarized in the log.
//!
//! Usage: `scene_demo [config.toml] [frames]`

mod scene_factory;

use std::cell::Cell;

use scene_engine::foundation::logging;
use scene_engine::prelude::*;

use scene_factory::SceneFactory;

const DEFAULT_CONFIG_PATH: &str = "scene_demo/config.toml";
const DEFAULT_FRAMES: u64 = 600;
const FRAME_TIME: f32 = 1.0 / 60.0;
const RANDOM_SEED: u64 = 7;

/// Demo errors
#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid frame count {0:?}")]
    FrameCount(String),
}

/// Replays a fixed key and mouse timeline, one step per frame
struct ScriptedInput {
    frame: Cell<u64>,
}

impl ScriptedInput {
    fn new() -> Self {
        Self { frame: Cell::new(0) }
    }

    fn advance(&self) {
        self.frame.set(self.frame.get() + 1);
    }

    /// Script position in [0, 600)
    fn step(&self) -> u64 {
        self.frame.get() % 600
    }
}

impl InputSource for ScriptedInput {
    fn is_key_down(&self, key: Key) -> bool {
        let step = self.step();
        match key {
            Key::W => (10..70).contains(&step),
            Key::D => (70..100).contains(&step),
            Key::Space => (100..120).contains(&step),
            Key::F => (150..152).contains(&step) || (200..202).contains(&step),
            Key::Num2 => (250..252).contains(&step),
            Key::Num3 => (350..352).contains(&step),
            Key::Num4 => (450..452).contains(&step),
            Key::Num1 => (550..552).contains(&step),
            _ => false,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn cursor_position(&self) -> (f64, f64) {
        let step = self.step() as f64;
        (400.0 + step * 2.0, 300.0 - step * 0.5)
    }

    fn is_look_active(&self) -> bool {
        (120..150).contains(&self.step())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC occurred: {panic_info}");
    }));

    run().map_err(|e| {
        log::error!("{}", e);
        e.into()
    })
}

fn run() -> Result<(), DemoError> {
    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let frames = match args.next() {
        Some(value) => value.parse::<u64>().map_err(|_| DemoError::FrameCount(value))?,
        None => DEFAULT_FRAMES,
    };

    let config = ApplicationConfig::load_or_default(&config_path)?;
    logging::init_with_level(&config.engine.log_level);
    config.validate().map_err(DemoError::InvalidConfig)?;

    log::info!("Starting {} ({}x{})", config.window.title, config.window.width, config.window.height);
    log::info!("Assets: {}", config.assets.assets_dir);

    let backend = HeadlessBackend::new();
    let cache = ModelCache::new();
    let mut manager = SceneManager::new();

    let factory = SceneFactory::new(
        &backend,
        &cache,
        &config.assets,
        &config.camera,
        config.window.aspect_ratio(),
        RANDOM_SEED,
    );
    let _fixed_lights = factory.build_all(&mut manager, config.engine.max_lights);

    let input = ScriptedInput::new();
    let mut controller = CameraController::from_config(&config.controls);
    let mut timer = Timer::new();

    for _ in 0..frames {
        timer.tick_fixed(FRAME_TIME);
        if !frame(&mut manager, &mut controller, &input, &timer) {
            break;
        }
        input.advance();

        let stats = manager.render();
        if timer.frame_count() % 60 == 0 || (config.engine.debug_mode && stats.skipped > 0) {
            log::info!(
                "Frame {} scene {:?}: {} drawn, {} skipped, {} lights, {} draw calls",
                timer.frame_count(),
                manager.current_id(),
                stats.drawn,
                stats.skipped,
                stats.lights_bound,
                backend.draw_count(),
            );
        }
        backend.clear_events();
    }

    log::info!(
        "Ran {} frames ({:.1}s simulated, {:.0} fps)",
        timer.frame_count(),
        timer.total_time(),
        timer.average_fps()
    );
    if config.assets.log_cache_stats {
        cache.log_stats();
    }
    Ok(())
}

/// Apply input for one frame and advance the current scene
///
/// Returns `false` once quitting was requested.
fn frame(manager: &mut SceneManager, controller: &mut CameraController, input: &dyn InputSource, timer: &Timer) -> bool {
    for action in controller.poll_actions(input) {
        match action {
            ControllerAction::SwitchScene(id) => {
                if let Err(e) = manager.switch_scene(id) {
                    log::warn!("Staying on scene {:?}: {}", manager.current_id(), e);
                }
            }
            ControllerAction::ToggleFlashlight => toggle_flashlight(manager),
            ControllerAction::Quit => {
                log::info!("Quit requested");
                return false;
            }
        }
    }

    if let Some(camera) = manager.current_mut().and_then(Scene::camera_mut) {
        controller.update(input, camera, timer.delta_time());
    }
    manager.update(timer.delta_time());
    true
}

fn toggle_flashlight(manager: &SceneManager) {
    let Some(spotlight) = manager.current().and_then(Scene::spotlight) else {
        log::debug!("Current scene has no flashlight");
        return;
    };

    let mut spotlight = spotlight.borrow_mut();
    let enabled = !spotlight.is_enabled();
    spotlight.set_enabled(enabled);
    log::info!("Flashlight {}", if enabled { "on" } else { "off" });
}
