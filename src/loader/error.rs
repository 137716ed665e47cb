use std::path::PathBuf;

use thiserror::Error;

/// Why the piano samples could not be made ready.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no audio output")]
    NoOutput,

    #[error("failed to read {path}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("unsupported format in {path}: {detail}")]
    Unsupported { path: PathBuf, detail: String },

    #[error("{path} has no audio frames")]
    Empty { path: PathBuf },

    #[error("failed to start sample loader: {0}")]
    Thread(#[from] std::io::Error),

    #[error("sample loader stopped before finishing")]
    LoaderGone,
}
