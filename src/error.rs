use std::path::PathBuf;

use thiserror::Error;

// Everything that can go wrong on the data side of the engine. These never
// escape the public play/stop entry points; they get logged and the call
// turns into a no-op (or the offending step is skipped).
#[derive(Debug, Error)]
pub enum MusicError {
    #[error("invalid root note: {0:?}")]
    InvalidRoot(String),

    #[error("unknown sequence: {0}")]
    UnknownSequence(String),

    #[error("unknown song: {0}")]
    UnknownSong(String),

    #[error("unknown pattern: {0}")]
    UnknownPattern(String),

    #[error("song step is missing its sequence or root: {0}")]
    IncompleteStep(String),

    #[error("song {0} has no steps")]
    EmptySong(String),

    #[error("{0} is neither a sequence nor an sfx-enabled song")]
    NotSfx(String),

    #[error("empty note entry")]
    EmptyNote,

    #[error("unable to read music data from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse music data from {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
