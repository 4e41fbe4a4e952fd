use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("unable to read '{path}': {source}")]
    ReadFailed { path: PathBuf, source: io::Error },

    #[error("unable to write '{path}': {source}")]
    WriteFailed { path: PathBuf, source: io::Error },

    #[error("verification failed {file}. Expected {algorithm} hash of {expected}, found {actual}")]
    VerificationFailed {
        file:      PathBuf,
        algorithm: &'static str,
        expected:  String,
        actual:    String,
    },

    #[error("unable to verify '{file}'. No digest files found. Looked for {tried:?}")]
    VerificationImpossible { file: PathBuf, tried: Vec<PathBuf> },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
