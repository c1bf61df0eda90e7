use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The live mount table could not be read right now.
    #[error("mount table unavailable ({detail}): {source}")]
    ResourceUnavailable {
        detail: String,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    PolicyViolation(String),

    #[error("failed to launch {program}: {source}")]
    HelperLaunch {
        program: String,
        #[source]
        source: io::Error,
    },
}
