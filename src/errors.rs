use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("capability not available: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("network request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("LLM request failed: {0}")]
    Prompt(#[from] rig::completion::PromptError),

    #[error("image generation failed: {0}")]
    ImageGeneration(#[from] rig::image_generation::ImageGenerationError),

    #[error("internal error: {0}")]
    Other(String),
}

impl AgentError {
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported(feature.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(value: anyhow::Error) -> Self {
        Self::Other(value.to_string())
    }
}
