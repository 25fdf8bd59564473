use fastrand::Rng;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext};

pub mod animation;
pub mod config;
pub mod error;
pub mod interaction;
pub mod math;
pub mod mesh;
pub mod particles;
pub mod render;
pub mod sampling;
pub mod scene;

pub use config::SceneConfig;
pub use error::{EngineError, Result};
pub use scene::{AppState, SceneComposer, StateHolder};

use interaction::OrbitCamera;
use mesh::mesh_for_shape;
use particles::StarField;
use render::RenderPipeline;

/// Install the panic hook and route `log` output to the browser console
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(target_arch = "wasm32")]
    {
        // A second init (hot reload) keeps the first logger
        let _ = console_log::init_with_level(log::Level::Info);
    }
}

/// Everything that changes per frame, independent of the GPU
pub struct TreeScene {
    state: StateHolder,
    composer: SceneComposer,
    camera: OrbitCamera,
    /// Seconds since creation, accumulated in f64 so long sessions keep
    /// sub-millisecond steps
    time: f64,
}

impl TreeScene {
    pub fn new(config: &SceneConfig, rng: &mut Rng) -> Self {
        Self {
            state: StateHolder::new(config.state),
            composer: SceneComposer::new(config, rng),
            camera: OrbitCamera::new(config.camera.clone()),
            time: 0.0,
        }
    }

    /// Advance the clock by `dt` seconds and update every field
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.time += f64::from(dt);
        self.composer.update(self.time(), dt, self.state.get());
    }

    pub fn toggle(&mut self) -> AppState {
        self.state.toggle()
    }

    pub fn set_state(&mut self, state: AppState) {
        self.state.set(state);
    }

    pub fn state(&self) -> AppState {
        self.state.get()
    }

    /// Clock as fed to the fields and shaders
    pub fn time(&self) -> f32 {
        self.time as f32
    }

    pub fn elapsed(&self) -> f64 {
        self.time
    }

    pub fn composer(&self) -> &SceneComposer {
        &self.composer
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }
}

/// Seed for the layout RNG: the configured one, else `fallback`
pub fn resolve_seed(configured: Option<u64>, fallback: impl FnOnce() -> u64) -> u64 {
    configured.unwrap_or_else(fallback)
}

fn host_seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

/// Scene handle exposed to JavaScript
#[wasm_bindgen]
pub struct ArixTree {
    scene: TreeScene,
    pipeline: RenderPipeline,
}

#[wasm_bindgen]
impl ArixTree {
    /// Create the reference scene on `canvas`
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> std::result::Result<ArixTree, JsValue> {
        Self::build(canvas, SceneConfig::default()).map_err(JsValue::from)
    }

    /// Create a scene from a YAML configuration document
    pub fn with_config(canvas: HtmlCanvasElement, yaml: &str) -> std::result::Result<ArixTree, JsValue> {
        let config = SceneConfig::from_yaml(yaml)?;
        Self::build(canvas, config).map_err(JsValue::from)
    }

    fn build(canvas: HtmlCanvasElement, config: SceneConfig) -> Result<ArixTree> {
        let width = canvas.width() as i32;
        let height = canvas.height() as i32;

        let gl = canvas
            .get_context("webgl2")
            .map_err(|e| EngineError::Context(format!("{:?}", e)))?
            .ok_or_else(|| EngineError::Context("webgl2 not supported".to_string()))?
            .dyn_into::<WebGl2RenderingContext>()
            .map_err(|_| EngineError::Context("not a WebGL2 context".to_string()))?;

        let seed = resolve_seed(config.seed, host_seed);
        log::info!("Building scene with seed {}", seed);
        let mut rng = Rng::with_seed(seed);

        let scene = TreeScene::new(&config, &mut rng);
        let stars = StarField::new(&config.stars, &mut rng);

        let mut pipeline = RenderPipeline::new(gl, width, height, config.render.clone())?;
        pipeline.upload_foliage(scene.composer().foliage().attributes())?;
        pipeline.upload_stars(&stars.get_particle_data())?;
        for layer in scene.composer().ornaments() {
            let appearance = layer.kind().appearance();
            pipeline.upload_ornament_layer(
                &mesh_for_shape(appearance.shape),
                appearance,
                layer.color(),
                layer.transforms(),
            )?;
        }

        Ok(Self { scene, pipeline })
    }

    /// Advance by `dt` seconds and draw a frame
    pub fn render(&mut self, dt: f32) {
        self.scene.step(dt);

        let composer = self.scene.composer();
        for (i, layer) in composer.ornaments().iter().enumerate() {
            self.pipeline.update_ornament_instances(i, layer.transforms());
        }

        self.pipeline.render(
            self.scene.time(),
            &composer.foliage().uniforms(),
            &composer.group_matrix(),
            self.scene.camera(),
        );
    }

    /// Flip between scattered and assembled; returns the new state name
    pub fn toggle(&mut self) -> String {
        self.scene.toggle().to_string()
    }

    pub fn set_scattered(&mut self) {
        self.scene.set_state(AppState::Scattered);
    }

    pub fn set_tree(&mut self) {
        self.scene.set_state(AppState::TreeShape);
    }

    /// Status line text, e.g. "TREE SHAPE"
    pub fn state_label(&self) -> String {
        self.scene.state().status_label()
    }

    /// Caption for the toggle button
    pub fn action_label(&self) -> String {
        self.scene.state().action_label().to_string()
    }

    pub fn is_tree(&self) -> bool {
        self.scene.state().is_tree()
    }

    /// Foliage morph progress in [0, 1]
    pub fn morph_progress(&self) -> f32 {
        self.scene.composer().foliage().morph().progress()
    }

    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        self.scene.camera_mut().orbit(delta_x, delta_y);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.scene.camera_mut().zoom(delta);
    }

    pub fn resize(&mut self, width: i32, height: i32) -> std::result::Result<(), JsValue> {
        self.pipeline.resize(width, height).map_err(JsValue::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_scene(state: AppState) -> TreeScene {
        let mut config = SceneConfig {
            state,
            ..Default::default()
        };
        config.foliage.count = 200;
        for layer in &mut config.ornaments {
            layer.count = 10;
        }
        TreeScene::new(&config, &mut Rng::with_seed(11))
    }

    #[test]
    fn test_resolve_seed_prefers_config() {
        assert_eq!(resolve_seed(Some(7), || 99), 7);
        assert_eq!(resolve_seed(None, || 99), 99);
    }

    #[test]
    fn test_toggle_then_settle() {
        let mut scene = small_scene(AppState::TreeShape);
        assert_eq!(scene.composer().foliage().morph().progress(), 0.0);
        for _ in 0..120 {
            scene.step(1.0 / 60.0);
        }
        assert_eq!(scene.composer().foliage().morph().progress(), 1.0);
        assert!(scene.composer().ornaments().iter().all(|o| o.morph().progress() == 1.0));

        assert_eq!(scene.toggle(), AppState::Scattered);
        for _ in 0..120 {
            scene.step(1.0 / 60.0);
        }
        assert_eq!(scene.composer().foliage().morph().progress(), 0.0);
        assert!(scene.composer().ornaments().iter().all(|o| o.morph().progress() == 0.0));
    }

    #[test]
    fn test_bad_delta_is_ignored() {
        let mut scene = small_scene(AppState::Scattered);
        scene.set_state(AppState::TreeShape);
        scene.step(f32::NAN);
        scene.step(-1.0);
        assert_eq!(scene.time(), 0.0);
        assert_eq!(scene.composer().foliage().morph().progress(), 0.0);
    }

    #[test]
    fn test_clock_accumulates() {
        let mut scene = small_scene(AppState::TreeShape);
        scene.step(0.5);
        scene.step(0.25);
        assert!((scene.time() - 0.75).abs() < 1e-6);
        assert!((scene.composer().rotation() - 0.75 * 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_clock_keeps_small_steps_late_in_session() {
        let mut scene = small_scene(AppState::TreeShape);
        scene.step(10_000.0);
        for _ in 0..1000 {
            scene.step(1e-4);
        }
        // 0.1 s of 0.1 ms frames would vanish in an f32 sum at this magnitude
        assert!((scene.elapsed() - 10_000.1).abs() < 1e-6);
    }
}
