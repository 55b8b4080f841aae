use thiserror::Error;

#[derive(Error, Debug)]
pub enum TestLensError {
    #[error("Invalid repository path: {0}")]
    Repository(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TestLensError>;
