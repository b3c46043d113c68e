use std::io;
use std::path::PathBuf;

/// Errors an applet reports as `ER` with a non-zero exit.
#[derive(Debug, thiserror::Error)]
pub enum AppletError {
    /// A data source could not be opened or read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A data source was readable but not in the expected format.
    #[error("malformed input at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// The external process could not be started.
    #[error("cannot spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The configuration file exists but could not be used.
    #[error("invalid config at {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, AppletError>;
