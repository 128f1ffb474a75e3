use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error on configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A required setting is absent or empty
    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Path {0} does not exist")]
    MissingPath(String),

    #[error("Path {0} is not a mapping")]
    NotAMapping(String),

    #[error("{0} is not a directory")]
    NotADirectory(String),

    #[error("Password encryption error: {0}")]
    Encryption(String),
}

impl ConfigError {
    pub fn not_configured(path: &[&str]) -> Self {
        ConfigError::NotConfigured(path.join("."))
    }

    pub fn encryption(message: impl std::fmt::Display) -> Self {
        ConfigError::Encryption(message.to_string())
    }
}
