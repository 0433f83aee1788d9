use std::path::PathBuf;

use thiserror::Error;

/// Failure categories for the extraction pipeline.
///
/// `Read`, `Parse` and `Network` are per-document: the orchestrator logs them
/// with the offending filename and keeps the record with null fields so the
/// batch continues. `Write` surfaces at the final persistence step and is
/// fatal, since it means losing the whole run's output.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot read PDF {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("model response has no recognizable field structure ({} bytes)", raw.len())]
    Parse { raw: String },

    #[error("completion request failed: {0}")]
    Network(String),

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
