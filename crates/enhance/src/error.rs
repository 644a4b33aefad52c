use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    ConfigSyntax(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Selector(#[from] html::SelectorError),
}

/// Why viewport observation could not start. Both cases only disable highlighting.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ObserveError {
    #[error("the host does not support viewport intersection observation")]
    Unsupported,

    #[error("none of the tracked headings have layout geometry")]
    NoTargets,
}

pub type Result<T> = std::result::Result<T, EnhanceError>;
