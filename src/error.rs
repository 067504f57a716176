use std::path::PathBuf;

/// Errors from the host side of the gallery: config files, the terminal, logging.
///
/// Layout, projection and gesture handling never fail; they normalize their
/// inputs instead.
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    /// Terminal or other I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be read
    #[error("failed to read config '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid YAML for a gallery config
    #[error("failed to parse config '{}': {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Log sink could not be set up
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, GalleryError>;
