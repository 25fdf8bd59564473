//! Error types for the tree engine

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors raised while setting up GPU resources or loading configuration.
///
/// Per-frame animation never fails; everything here happens at construction,
/// upload or resize time.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Shader compilation failed: {0}")]
    Shader(String),

    #[error("Program linking failed: {0}")]
    Program(String),

    #[error("Failed to create {0}")]
    Resource(&'static str),

    #[error("Framebuffer incomplete: {0}")]
    Framebuffer(u32),

    #[error("Rendering context unavailable: {0}")]
    Context(String),

    #[error("YAML parse error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Invalid colour '{0}', expected #RRGGBB")]
    InvalidColor(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl From<EngineError> for JsValue {
    fn from(err: EngineError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            EngineError::InvalidColor("red".into()).to_string(),
            "Invalid colour 'red', expected #RRGGBB"
        );
        assert_eq!(
            EngineError::Resource("buffer").to_string(),
            "Failed to create buffer"
        );
    }

    #[test]
    fn test_yaml_error_converts() {
        let err: EngineError = serde_yaml::from_str::<Vec<u32>>("{not: [a list")
            .unwrap_err()
            .into();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
