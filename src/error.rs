//! Crate-wide error type.
//!
//! Only lifecycle misuse and configuration problems surface as [`Error`].
//! Native collaborator hiccups during polling are absorbed by the device
//! (last-known values are kept) and only logged.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum Error {
    #[error("device has no components attached yet")]
    NotPrepared,

    #[error("components were already attached to this device")]
    AlreadyPrepared,

    #[error("device is closed")]
    Closed,

    #[error("native backend error: {0}")]
    Native(String),

    #[error("device not found: {0}")]
    DeviceNotFound(Uuid),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
