pub mod pipeline;
pub mod settings;
pub mod shaders;
pub mod webgl;

pub use pipeline::RenderPipeline;
pub use settings::{LightingConfig, RenderSettings};
pub use webgl::WebGLContext;
