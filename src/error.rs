// Error type shared by the widgets and the output encoders.
// By: Curtis Jones <mail@curtisjones.ca>

use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A counter or stat file could not be read.
    #[error("could not read {}: {}", .path.display(), .source)]
    Read { path: PathBuf, source: io::Error },

    /// A file was read fine but its contents did not make sense.
    #[error("could not parse {what} from {}: {value:?}", .path.display())]
    Parse {
        what: &'static str,
        path: PathBuf,
        value: String,
    },

    #[error("no thermal sensor labelled {0:?}")]
    NoSensor(String),

    #[error("bad clock format {0:?}")]
    ClockFormat(String),

    #[error("invalid colour {0:?}, expected #rgb or #rrggbb")]
    Colour(String),

    #[error("unknown theme slot {0:?}")]
    Slot(String),

    #[error("unknown output format {0:?}, expected i3bar, unibar or plain")]
    Output(String),

    /// Click events coming in or status lines going out.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not write status line: {0}")]
    Write(#[from] io::Error),
}

impl Error {
    /// The host went away and nobody reads our stdout any more.
    pub fn is_closed_pipe(&self) -> bool {
        match self {
            Error::Write(e) => e.kind() == io::ErrorKind::BrokenPipe,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Read a whole file, tagging the error with the path.
pub(crate) fn read_file(path: PathBuf) -> Result<String> {
    std::fs::read_to_string(&path).map_err(|source| Error::Read { path, source })
}
