use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{Algorithm, DigestChain, DigestReader, DigestWriter, Result, VerifyError};

/// Hex digests of one file under every standard algorithm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Digests {
    pub md5:    String,
    pub sha1:   String,
    pub sha256: String,
    pub bytes:  u64,
}

impl Digests {
    fn from_chain(chain: &mut DigestChain) -> Self {
        Self {
            md5:    chain.hex(Algorithm::Md5).unwrap_or_default(),
            sha1:   chain.hex(Algorithm::Sha1).unwrap_or_default(),
            sha256: chain.hex(Algorithm::Sha256).unwrap_or_default(),
            bytes:  chain.byte_count(),
        }
    }

    pub fn get(&self, algorithm: Algorithm) -> &str {
        match algorithm {
            Algorithm::Md5 => &self.md5,
            Algorithm::Sha1 => &self.sha1,
            Algorithm::Sha256 => &self.sha256,
        }
    }
}

/// A file together with its `.md5`, `.sha1` and `.sha256` sidecars.
#[derive(Clone, Debug)]
pub struct Sidecars {
    target: PathBuf,
}

impl Sidecars {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// `<target>.<ext>` for the given algorithm.
    pub fn path(&self, algorithm: Algorithm) -> PathBuf {
        let mut name = OsString::from(self.target.as_os_str());
        name.push(".");
        name.push(algorithm.extension());
        PathBuf::from(name)
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        Algorithm::ALL.iter().map(|a| self.path(*a)).collect()
    }

    fn present(&self) -> Vec<Algorithm> {
        Algorithm::ALL
            .into_iter()
            .filter(|a| self.path(*a).exists())
            .collect()
    }

    /// Stored digest for `algorithm`, or `None` when the sidecar is absent.
    pub fn stored(&self, algorithm: Algorithm) -> Result<Option<String>> {
        let path = self.path(algorithm);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|e| VerifyError::ReadFailed { path, source: e })?;
        Ok(Some(text.trim().to_string()))
    }

    /// Digest the target in one read pass.
    pub fn compute(&self) -> Result<Digests> {
        let file = File::open(&self.target).map_err(|e| self.read_failed(e))?;
        let mut reader = DigestReader::standard(file);
        reader.drain().map_err(|e| self.read_failed(e))?;
        Ok(Digests::from_chain(reader.digests_mut()))
    }

    /// Write every absent sidecar, or all of them when `overwrite` is set.
    pub fn generate(&self, overwrite: bool) -> Result<Digests> {
        let digests = self.compute()?;
        for algorithm in Algorithm::ALL {
            let path = self.path(algorithm);
            if overwrite || !path.exists() {
                write_sidecar(&path, digests.get(algorithm))?;
            }
        }
        debug!(file = %self.target.display(), overwrite, "generated sidecars");
        Ok(digests)
    }

    /// Fail on the first sidecar that disagrees with the target's content.
    pub fn verify(&self) -> Result<()> {
        let present = self.present();
        if present.is_empty() {
            return Err(VerifyError::VerificationImpossible {
                file:  self.target.clone(),
                tried: self.paths(),
            });
        }

        let digests = self.compute()?;
        for algorithm in present {
            let expected = self.stored(algorithm)?.unwrap_or_default();
            let actual = digests.get(algorithm);
            if expected != actual {
                return Err(VerifyError::VerificationFailed {
                    file: self.target.clone(),
                    algorithm: algorithm.name(),
                    expected,
                    actual: actual.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Check every present sidecar, reporting each problem on `out`.
    ///
    /// Returns `false` when any sidecar disagrees or none exist.
    pub fn verify_to<W: Write>(&self, out: &mut W) -> Result<bool> {
        let name = self.display_name();
        let present = self.present();
        if present.is_empty() {
            let looked_for = self
                .paths()
                .iter()
                .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                out,
                "Unable to verify '{name}'.  No digest files found.  Looked for: {looked_for}"
            )?;
            return Ok(false);
        }

        let digests = self.compute()?;
        let mut passed = true;
        for algorithm in present {
            let expected = self.stored(algorithm)?.unwrap_or_default();
            let actual = digests.get(algorithm);
            if expected != actual {
                warn!(file = %name, algorithm = algorithm.name(), %expected, %actual, "digest mismatch");
                writeln!(
                    out,
                    "Verification failed {name}.  Expected {} hash of {expected}, found {actual}",
                    algorithm.name()
                )?;
                passed = false;
            }
        }
        Ok(passed)
    }

    /// Open the target for writing; sidecars appear when the writer finishes.
    pub fn create(&self) -> Result<SidecarWriter> {
        let file = File::create(&self.target).map_err(|e| VerifyError::WriteFailed {
            path:   self.target.clone(),
            source: e,
        })?;
        Ok(SidecarWriter {
            sidecars: self.clone(),
            inner:    Some(DigestWriter::standard(BufWriter::new(file))),
        })
    }

    fn display_name(&self) -> String {
        self.target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.target.display().to_string())
    }

    fn read_failed(&self, source: io::Error) -> VerifyError {
        VerifyError::ReadFailed {
            path: self.target.clone(),
            source,
        }
    }
}

fn write_sidecar(path: &Path, hex: &str) -> Result<()> {
    fs::write(path, hex).map_err(|e| VerifyError::WriteFailed {
        path:   path.to_path_buf(),
        source: e,
    })
}

/// Digesting write path for a [`Sidecars`] target.
///
/// Call [`SidecarWriter::finish`] to flush the file and write the three
/// sidecars. Dropping an unfinished writer does the same on a best-effort
/// basis, unless the thread is panicking.
pub struct SidecarWriter {
    sidecars: Sidecars,
    inner:    Option<DigestWriter<BufWriter<File>>>,
}

impl SidecarWriter {
    pub fn finish(mut self) -> Result<Digests> {
        self.complete()
    }

    /// Close the target without writing any sidecar.
    pub fn abandon(mut self) {
        self.inner.take();
    }

    fn complete(&mut self) -> Result<Digests> {
        let Some(writer) = self.inner.take() else {
            return Err(VerifyError::Io(io::Error::other("sidecar writer already finished")));
        };
        let (mut file, mut chain) = writer.into_parts();
        file.flush().map_err(|e| VerifyError::WriteFailed {
            path:   self.sidecars.target.clone(),
            source: e,
        })?;
        drop(file);

        let digests = Digests::from_chain(&mut chain);
        for algorithm in Algorithm::ALL {
            write_sidecar(&self.sidecars.path(algorithm), digests.get(algorithm))?;
        }
        debug!(file = %self.sidecars.target.display(), bytes = digests.bytes, "wrote file with sidecars");
        Ok(digests)
    }

    fn writer(&mut self) -> io::Result<&mut DigestWriter<BufWriter<File>>> {
        self.inner
            .as_mut()
            .ok_or_else(|| io::Error::other("sidecar writer already finished"))
    }
}

impl Write for SidecarWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer()?.flush()
    }
}

impl Drop for SidecarWriter {
    fn drop(&mut self) {
        if self.inner.is_some() && !std::thread::panicking() {
            if let Err(e) = self.complete() {
                warn!(file = %self.sidecars.target.display(), error = %e, "failed to write sidecars on drop");
            }
        }
    }
}
