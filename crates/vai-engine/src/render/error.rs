use crate::layout::LayoutError;
use crate::shader::ShaderError;

/// Engine construction failure. Per-frame problems never surface as errors;
/// see [`FrameOutcome`](super::FrameOutcome).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("invalid engine configuration: {0}")]
    Config(String),

    #[error("failed to build render pipeline: {0}")]
    Pipeline(String),
}
