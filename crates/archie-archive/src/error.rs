use std::io;

use archie_verify::VerifyError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported file type '{filename}'. Supported types are zip, tar.gz, jar, war, ear, rar and pdf")]
    UnsupportedContainerType { filename: String },

    #[error("cannot write entry '{entry}' to this container: {reason}")]
    UnsupportedOutputTarget { entry: String, reason: &'static str },

    #[error("unable to read '{path}': {source}")]
    ReadFailed { path: String, source: io::Error },

    #[error("unable to write '{path}': {source}")]
    WriteFailed { path: String, source: io::Error },

    #[error("transformation of '{entry}' failed: {source}")]
    TransformFailed { entry: String, source: io::Error },

    #[error("registry builder did not converge after {rounds} consumer rounds")]
    BuilderDidNotConverge { rounds: usize },

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn read(path: impl Into<String>, source: io::Error) -> Self {
        Self::ReadFailed {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<String>, source: io::Error) -> Self {
        Self::WriteFailed {
            path: path.into(),
            source,
        }
    }
}

/// Recover an [`Error`] that travelled through an `io::Error`, or classify
/// the failure with `fallback`.
pub(crate) fn lift(e: io::Error, fallback: impl FnOnce(io::Error) -> Error) -> Error {
    if !e.get_ref().is_some_and(|inner| inner.is::<Error>()) {
        return fallback(e);
    }
    let kind = e.kind();
    match e.into_inner().map(|inner| inner.downcast::<Error>()) {
        Some(Ok(err)) => *err,
        Some(Err(other)) => fallback(io::Error::new(kind, other)),
        None => fallback(io::Error::from(kind)),
    }
}

pub(crate) fn zip_io(e: zip::result::ZipError) -> io::Error {
    match e {
        zip::result::ZipError::Io(e) => e,
        other => io::Error::other(other),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
