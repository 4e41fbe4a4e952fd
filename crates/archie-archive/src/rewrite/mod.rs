//! Entry-by-entry container rewriting.
//!
//! Every rewrite walks the same states: open source, before-archive hooks,
//! then for each source entry skip check, before-entry hooks, classify and
//! write, after-entry hooks, and finally after-archive hooks and close.
//! Source and destination streams are borrowed through [`NonClosing`], so a
//! rewrite never closes a stream it was handed.
//!
//! [`NonClosing`]: crate::io::NonClosing

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use std::sync::Arc;

use archie_verify::{Digests, Sidecars};
use tracing::{debug, trace};

use crate::entry::RewriteReport;
use crate::error::lift;
use crate::format::ArchiveFormat;
use crate::options::RewriteOptions;
use crate::registry::Registry;
use crate::{Error, Result};

mod passthrough;
mod tar;
mod zip;

pub(crate) const SOURCE: &str = "<source>";
pub(crate) const DESTINATION: &str = "<destination>";

/// Rewrites containers of one format against a shared [`Registry`].
#[derive(Clone, Debug)]
pub struct Rewriter {
    format:   ArchiveFormat,
    registry: Arc<Registry>,
    options:  RewriteOptions,
}

/// Pick a rewriter from the file name of `path`.
pub fn rewriter_for(path: &Path, registry: Arc<Registry>) -> Result<Rewriter> {
    Ok(Rewriter::new(ArchiveFormat::from_path(path)?, registry))
}

impl Rewriter {
    pub fn new(format: ArchiveFormat, registry: Arc<Registry>) -> Self {
        Self {
            format,
            registry,
            options: RewriteOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RewriteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Rewrite `src` into `dest`. Neither stream is closed.
    pub fn rewrite<R, W>(&self, src: &mut R, dest: &mut W) -> Result<RewriteReport>
    where
        R: Read + Seek,
        W: Write + Seek,
    {
        match self.format {
            ArchiveFormat::Zip | ArchiveFormat::Jar => zip::rewrite(self, src, dest),
            ArchiveFormat::TarGz | ArchiveFormat::PassThrough => self.rewrite_stream(src, dest),
        }
    }

    /// Rewrite an in-memory container, e.g. one embedded in another.
    pub fn rewrite_bytes(&self, src: &[u8]) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        self.rewrite(&mut Cursor::new(src), &mut out)?;
        Ok(out.into_inner())
    }

    pub fn rewrite_file(&self, src: &Path, dest: &Path) -> Result<RewriteReport> {
        let mut input = open(src)?;
        let file = File::create(dest).map_err(|e| Error::write(dest.display().to_string(), e))?;
        let mut output = BufWriter::new(file);

        let report = self.rewrite(&mut input, &mut output)?;
        output
            .flush()
            .map_err(|e| Error::write(dest.display().to_string(), e))?;
        debug!(src = %src.display(), dest = %dest.display(), entries = report.entries_written, "rewrote file");
        Ok(report)
    }

    /// Rewrite a file and leave `.md5`, `.sha1` and `.sha256` sidecars next
    /// to `dest`.
    ///
    /// tar.gz and pass-through output is digested while it is written. Zip
    /// output needs a seekable destination for its central directory, so it
    /// is digested in one read pass once complete.
    pub fn rewrite_file_with_sidecars(
        &self,
        src: &Path,
        dest: &Path,
    ) -> Result<(RewriteReport, Digests)> {
        let sidecars = Sidecars::new(dest);
        if self.format.is_zip_family() {
            let report = self.rewrite_file(src, dest)?;
            let digests = sidecars.generate(true)?;
            return Ok((report, digests));
        }

        let mut input = open(src)?;
        let mut output = sidecars.create()?;
        match self.rewrite_stream(&mut input, &mut output) {
            Ok(report) => Ok((report, output.finish()?)),
            Err(e) => {
                output.abandon();
                Err(e)
            }
        }
    }

    fn rewrite_stream<R: Read, W: Write>(&self, src: &mut R, dest: &mut W) -> Result<RewriteReport> {
        match self.format {
            ArchiveFormat::TarGz => tar::rewrite(self, src, dest),
            ArchiveFormat::PassThrough => passthrough::rewrite(src, dest),
            ArchiveFormat::Zip | ArchiveFormat::Jar => Err(Error::write(
                DESTINATION,
                io::Error::new(io::ErrorKind::Unsupported, "zip output needs a seekable stream"),
            )),
        }
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| Error::read(path.display().to_string(), e))
}

/// Hook failures surface as write failures unless the hook reported a
/// typed error.
pub(crate) fn hook_failed(at: &str, e: io::Error) -> Error {
    lift(e, |e| Error::write(at, e))
}

pub(crate) fn transform_failed(entry: &str, e: io::Error) -> Error {
    Error::TransformFailed {
        entry:  entry.to_string(),
        source: e,
    }
}

pub(crate) fn write_failed(entry: &str, e: io::Error) -> Error {
    lift(e, |e| Error::write(entry, e))
}

pub(crate) fn trace_state(format: ArchiveFormat, state: &'static str) {
    trace!(?format, state, "rewrite");
}
