//! Error type for the rig.  Runtime glitches (lost hands, stalled clocks,
//! commands in the wrong state) are not errors; only setup can fail.

use std::path::PathBuf;

use hand_signal::SignalError;
use spiral_path::PathError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RigError>;

#[derive(Error, Debug)]
pub enum RigError {
    #[error("flight path: {0}")]
    Path(#[from] PathError),

    #[error("gesture pipeline: {0}")]
    Signal(#[from] SignalError),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path:   PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid config: {field} = {value} ({reason})")]
    Config {
        field:  &'static str,
        value:  f64,
        reason: &'static str,
    },

    #[error("preview window: {0}")]
    Window(String),
}
